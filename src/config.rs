use std::path::PathBuf;
use std::time::Duration;

use log::{debug, info};
use serde::Deserialize;

use crate::probe::{MARGIN_H, MARGIN_V, MIN_SIZE, SizeRule};
use crate::request::Level;

// ---------------------------------------------------------------------------
// ConfigFile — deserialized from TOML (all fields optional)
// ---------------------------------------------------------------------------

#[derive(Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub level: Option<String>,
    pub share_base: Option<String>,
    pub min_size: Option<u32>,
    pub margin_h: Option<u32>,
    pub margin_v: Option<u32>,
    #[serde(default)]
    pub viewer: ViewerConfigFile,
}

#[derive(Default, Deserialize)]
#[serde(default)]
pub struct ViewerConfigFile {
    pub frame_budget_ms: Option<u64>,
    pub size_step: Option<u32>,
    pub save_path: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Config — resolved (all fields concrete)
// ---------------------------------------------------------------------------

pub struct Config {
    pub level: Level,
    pub share_base: String,
    pub rule: SizeRule,
    pub viewer: ViewerConfig,
}

pub struct ViewerConfig {
    pub frame_budget: Duration,
    pub size_step: u32,
    pub save_path: PathBuf,
}

impl ConfigFile {
    /// Merge CLI values (overwrites non-None fields).
    pub fn merge_cli(&mut self, level: Option<String>) {
        if let Some(ref v) = level {
            debug!("config: CLI override level={v}");
            self.level = level;
        }
    }

    /// Resolve to a Config by applying defaults to missing fields. Fails on
    /// an unparseable level — invalid input is rejected at the boundary.
    pub fn resolve(self) -> anyhow::Result<Config> {
        let level: Level = self.level.as_deref().unwrap_or("L").parse()?;
        let config = Config {
            level,
            share_base: self
                .share_base
                .unwrap_or_else(|| "https://qr.example.net/".into()),
            rule: SizeRule {
                min_size: self.min_size.unwrap_or(MIN_SIZE).max(1),
                margin_h: self.margin_h.unwrap_or(MARGIN_H),
                margin_v: self.margin_v.unwrap_or(MARGIN_V),
            },
            viewer: ViewerConfig {
                frame_budget: Duration::from_millis(self.viewer.frame_budget_ms.unwrap_or(32)),
                size_step: self.viewer.size_step.unwrap_or(16).max(1),
                save_path: self.viewer.save_path.unwrap_or_else(|| "qr.png".into()),
            },
        };
        info!(
            "config: resolved level={}, share_base={}, min_size={}, margin_h={}, \
             margin_v={}, frame_budget={}ms, size_step={}, save_path={}",
            config.level,
            config.share_base,
            config.rule.min_size,
            config.rule.margin_h,
            config.rule.margin_v,
            config.viewer.frame_budget.as_millis(),
            config.viewer.size_step,
            config.viewer.save_path.display(),
        );
        Ok(config)
    }
}

/// Resolve the XDG config path for qrview.
fn config_path() -> Option<PathBuf> {
    let config_dir = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
    Some(config_dir.join("qrview").join("config.toml"))
}

/// Load config file. Returns `ConfigFile::default()` if no file exists.
/// Returns an error if the file exists but cannot be parsed.
pub fn load_config() -> anyhow::Result<ConfigFile> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            info!("config: no HOME or XDG_CONFIG_HOME set, using defaults");
            return Ok(ConfigFile::default());
        }
    };
    debug!("config: looking for {}", path.display());
    match std::fs::read_to_string(&path) {
        Ok(text) => {
            info!("config: loaded from {}", path.display());
            let cfg: ConfigFile = toml::from_str(&text)
                .map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", path.display()))?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("config: {} not found, using defaults", path.display());
            Ok(ConfigFile::default())
        }
        Err(e) => Err(anyhow::anyhow!("failed to read {}: {e}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml() {
        let cfg: ConfigFile = toml::from_str("").unwrap();
        let resolved = cfg.resolve().unwrap();
        assert_eq!(resolved.level, Level::L);
        assert_eq!(resolved.rule.min_size, 128);
        assert_eq!(resolved.rule.margin_h, 20);
        assert_eq!(resolved.rule.margin_v, 60);
        assert_eq!(resolved.viewer.size_step, 16);
        assert_eq!(resolved.viewer.frame_budget.as_millis(), 32);
        assert_eq!(resolved.viewer.save_path, PathBuf::from("qr.png"));
    }

    #[test]
    fn partial_toml() {
        let text = r#"
            level = "Q"
            min_size = 96
            [viewer]
            size_step = 32
        "#;
        let cfg: ConfigFile = toml::from_str(text).unwrap();
        let resolved = cfg.resolve().unwrap();
        assert_eq!(resolved.level, Level::Q);
        assert_eq!(resolved.rule.min_size, 96);
        assert_eq!(resolved.viewer.size_step, 32);
        // Defaults for unspecified fields
        assert_eq!(resolved.rule.margin_h, 20);
        assert_eq!(resolved.viewer.frame_budget.as_millis(), 32);
    }

    #[test]
    fn invalid_toml() {
        let text = "this is not valid toml [[[";
        let result = toml::from_str::<ConfigFile>(text);
        assert!(result.is_err());
    }

    #[test]
    fn invalid_level_rejected_at_resolve() {
        let cfg: ConfigFile = toml::from_str("level = \"Z\"").unwrap();
        assert!(cfg.resolve().is_err());
    }

    #[test]
    fn cli_overrides() {
        let mut cfg: ConfigFile = toml::from_str("level = \"M\"").unwrap();
        cfg.merge_cli(Some("h".into()));
        let resolved = cfg.resolve().unwrap();
        assert_eq!(resolved.level, Level::H); // CLI wins, case-insensitive
    }

    #[test]
    fn zero_min_size_clamped() {
        let cfg: ConfigFile = toml::from_str("min_size = 0").unwrap();
        let resolved = cfg.resolve().unwrap();
        assert_eq!(resolved.rule.min_size, 1);
    }
}
