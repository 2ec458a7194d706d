//! Share permalinks: fragment decoding at startup, URL derivation on demand.
//!
//! The fragment is read once when the program starts; the shareable URL is
//! recomputed from the current text whenever the user asks for it — a
//! derived value, never stored state.

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};

/// Characters escaped in the fragment. Mirrors `encodeURIComponent` closely
/// enough that `#`, `%` and whitespace always round-trip.
const FRAGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`');

/// Extract the initial text from a CLI argument that may be a share URL.
///
/// `https://host/#hello%20world` yields `hello world`; any non-URL argument
/// (including one containing `#`) is taken as literal text, and a URL
/// without a fragment is itself the text — the common case of encoding a
/// link.
pub fn initial_text(arg: &str) -> String {
    let is_url = arg.starts_with("http://") || arg.starts_with("https://");
    match arg.split_once('#') {
        Some((_, fragment)) if is_url && !fragment.is_empty() => decode_fragment(fragment),
        _ => arg.to_string(),
    }
}

/// Percent-decode a fragment. Invalid UTF-8 sequences are replaced rather
/// than rejected — a mangled permalink still yields editable text.
pub fn decode_fragment(fragment: &str) -> String {
    percent_decode_str(fragment).decode_utf8_lossy().into_owned()
}

/// Derive the shareable URL for the current text.
pub fn share_url(base: &str, text: &str) -> String {
    format!("{base}#{}", utf8_percent_encode(text, FRAGMENT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_decodes_spaces() {
        assert_eq!(initial_text("https://qr.example.net/#hello%20world"), "hello world");
    }

    #[test]
    fn url_without_fragment_is_literal_text() {
        assert_eq!(
            initial_text("https://example.net/some/page"),
            "https://example.net/some/page"
        );
    }

    #[test]
    fn url_with_empty_fragment_is_literal_text() {
        assert_eq!(initial_text("https://example.net/#"), "https://example.net/#");
    }

    #[test]
    fn plain_text_with_hash_is_untouched() {
        assert_eq!(initial_text("issue #42"), "issue #42");
    }

    #[test]
    fn share_url_encodes_reserved_characters() {
        let url = share_url("https://qr.example.net/", "50% #off & more?");
        assert_eq!(url, "https://qr.example.net/#50%25%20%23off%20%26%20more%3F");
    }

    #[test]
    fn arbitrary_text_round_trips() {
        let cases = [
            "hello world",
            "a#b%c&d+e?f",
            "日本語のテキスト",
            "line\nbreak\ttab",
            "100% #1 <tag> \"quoted\" `tick`",
        ];
        for text in cases {
            let url = share_url("https://qr.example.net/", text);
            let fragment = url.split_once('#').unwrap().1;
            assert_eq!(decode_fragment(fragment), text, "case: {text:?}");
        }
    }

    #[test]
    fn decode_tolerates_invalid_sequences() {
        // Truncated escape and invalid UTF-8 must not panic.
        assert_eq!(decode_fragment("abc%2"), "abc%2");
        assert_eq!(decode_fragment("%FF"), "\u{FFFD}");
    }
}
