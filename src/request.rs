//! Generation requests and their canonical identity keys.
//!
//! A `RequestKey` is the equality oracle for the regeneration pipeline: two
//! requests produce the same key iff all three fields are equal. Pure logic,
//! no I/O.

use std::fmt;
use std::str::FromStr;

use anyhow::bail;

/// QR error-correction level. Higher levels survive more damage but produce
/// denser symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    L,
    M,
    Q,
    H,
}

impl Level {
    pub const ALL: [Level; 4] = [Level::L, Level::M, Level::Q, Level::H];

    /// Next level in L → M → Q → H → L order (viewer level cycling).
    pub fn cycle(self) -> Level {
        match self {
            Level::L => Level::M,
            Level::M => Level::Q,
            Level::Q => Level::H,
            Level::H => Level::L,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::L => "L",
            Level::M => "M",
            Level::Q => "Q",
            Level::H => "H",
        }
    }
}

impl FromStr for Level {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "L" | "l" => Ok(Level::L),
            "M" | "m" => Ok(Level::M),
            "Q" | "q" => Ok(Level::Q),
            "H" | "h" => Ok(Level::H),
            _ => bail!("unknown error-correction level '{s}' (expected L, M, Q or H)"),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable generation request. Identity is the exact field triple, not
/// object reference; a new one is built on every input or size change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub text: String,
    pub level: Level,
    pub size: u32,
}

impl GenerationRequest {
    /// Build a request, rejecting invalid input at the boundary.
    pub fn new(text: impl Into<String>, level: Level, size: u32) -> anyhow::Result<Self> {
        if size == 0 {
            bail!("size must be a positive number of pixels");
        }
        Ok(Self { text: text.into(), level, size })
    }

    pub fn key(&self) -> RequestKey {
        RequestKey::of(self)
    }
}

/// Canonical identity of a request.
///
/// The encoding is length-prefixed so text containing the `:` delimiter
/// cannot collide with another triple: the prefix pins the exact byte range
/// of the text, and level/size are fixed-format suffixes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey(String);

impl RequestKey {
    fn of(req: &GenerationRequest) -> Self {
        RequestKey(format!(
            "{}:{}:{}:{}",
            req.text.len(),
            req.text,
            req.level,
            req.size
        ))
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(text: &str, level: Level, size: u32) -> GenerationRequest {
        GenerationRequest::new(text, level, size).unwrap()
    }

    #[test]
    fn equal_fields_equal_keys() {
        assert_eq!(req("hello", Level::M, 200).key(), req("hello", Level::M, 200).key());
    }

    #[test]
    fn any_field_difference_changes_key() {
        let base = req("hello", Level::M, 200);
        assert_ne!(base.key(), req("hello!", Level::M, 200).key());
        assert_ne!(base.key(), req("hello", Level::Q, 200).key());
        assert_ne!(base.key(), req("hello", Level::M, 201).key());
    }

    #[test]
    fn delimiter_in_text_does_not_collide() {
        // Without the length prefix these two would serialize identically
        // around the separators.
        let a = req("a:M", Level::L, 1);
        let b = req("a", Level::M, 1);
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn multibyte_text_keys() {
        assert_eq!(req("こんにちは", Level::L, 128).key(), req("こんにちは", Level::L, 128).key());
        assert_ne!(req("こんにちは", Level::L, 128).key(), req("こんばんは", Level::L, 128).key());
    }

    #[test]
    fn zero_size_rejected() {
        assert!(GenerationRequest::new("x", Level::L, 0).is_err());
    }

    #[test]
    fn level_parse_roundtrip() {
        for level in Level::ALL {
            assert_eq!(level.as_str().parse::<Level>().unwrap(), level);
            assert_eq!(level.as_str().to_lowercase().parse::<Level>().unwrap(), level);
        }
        assert!("X".parse::<Level>().is_err());
        assert!("".parse::<Level>().is_err());
    }

    #[test]
    fn level_cycle_covers_all() {
        assert_eq!(Level::L.cycle(), Level::M);
        assert_eq!(Level::M.cycle(), Level::Q);
        assert_eq!(Level::Q.cycle(), Level::H);
        assert_eq!(Level::H.cycle(), Level::L);
    }
}
