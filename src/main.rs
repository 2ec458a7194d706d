use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use qrview::config;
use qrview::encode;
use qrview::permalink;
use qrview::request::GenerationRequest;
use qrview::viewer::{self, ViewerOptions};

#[derive(Parser)]
#[command(name = "qrview", about = "Terminal QR code generator with live resizing")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Initial text, or a share URL whose #fragment supplies it
    #[arg(global = true)]
    input: Option<String>,

    /// Error-correction level: L, M, Q or H
    #[arg(long, global = true)]
    level: Option<String>,

    /// Fixed symbol size in pixels (the viewer starts in manual mode)
    #[arg(long, global = true)]
    size: Option<u32>,

    /// Log output file path (enables logging when specified)
    #[arg(long, global = true)]
    log: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Encode text to a PNG file without entering the viewer
    Render {
        /// Text to encode
        text: String,

        /// Output PNG file
        #[arg(short, long, default_value = "qr.png")]
        output: PathBuf,
    },
}

/// Default pixel size for non-interactive rendering (no terminal to probe).
const RENDER_SIZE: u32 = 512;

fn main() {
    let cli = Cli::parse();

    if let Some(log_path) = &cli.log {
        let file = std::fs::File::create(log_path).expect("failed to open log file");
        env_logger::Builder::from_default_env()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();
    } else if cli.command.is_some() {
        env_logger::init();
    }
    // viewer mode + no --log → logger not initialized (alternate screen stays clean)

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut cfg = config::load_config()?;
    cfg.merge_cli(cli.level);
    let config = cfg.resolve()?;

    match cli.command {
        Some(Command::Render { text, output }) => {
            cmd_render(&text, config.level, cli.size.unwrap_or(RENDER_SIZE), &output)
        }
        None => {
            let initial_text = cli
                .input
                .as_deref()
                .map(permalink::initial_text)
                .unwrap_or_default();
            viewer::run(
                ViewerOptions { initial_text, level: config.level, manual_size: cli.size },
                &config,
            )
        }
    }
}

fn cmd_render(text: &str, level: qrview::request::Level, size: u32, output: &Path) -> Result<()> {
    if text.is_empty() {
        anyhow::bail!("nothing to encode: text is empty");
    }
    let request = GenerationRequest::new(text, level, size)?;
    let png = encode::encode_png(&request)?;
    fs::write(output, &png).with_context(|| format!("failed to write {}", output.display()))?;
    eprintln!("rendered {} byte(s) of text -> {} ({} bytes)", text.len(), output.display(), png.len());
    Ok(())
}
