use crate::config::FingerprintConfig;
use crate::strip::strip_injected;

/// Derives the fingerprint of one paragraph.
///
/// Injected fragments are stripped, leading/trailing whitespace is trimmed,
/// and the first `cfg.max_chars` characters are returned. No case folding or
/// whitespace collapsing happens: fingerprints compare byte-for-byte.
///
/// An empty or whitespace-only paragraph yields an empty fingerprint. Callers
/// must not relocate against an empty fingerprint, since the empty prefix
/// matches everything.
///
/// # Examples
///
/// ```rust
/// use fingerprint::{extract, FingerprintConfig};
///
/// let cfg = FingerprintConfig::default();
/// let fp = extract("  In a hole in the ground there lived a hobbit.  ", &cfg);
/// assert_eq!(fp, "In a hole in the ground there li");
/// assert_eq!(fp.chars().count(), 32);
/// ```
pub fn extract(paragraph_text: &str, cfg: &FingerprintConfig) -> String {
    let visible = strip_injected(paragraph_text, cfg);
    char_prefix(visible.trim(), cfg.max_chars).to_string()
}

/// [`extract`] under the default configuration.
pub fn extract_fingerprint(paragraph_text: &str) -> String {
    extract(paragraph_text, &FingerprintConfig::default())
}

/// Returns the first `max_chars` Unicode scalar values of `text`.
pub fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Whether a paragraph fingerprint matches a captured context fingerprint.
///
/// Exact, case-sensitive prefix test. An empty context never matches.
pub fn is_match(fingerprint: &str, context: &str) -> bool {
    !context.is_empty() && fingerprint.starts_with(context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InjectedFragment;

    #[test]
    fn short_paragraph_kept_whole() {
        assert_eq!(extract_fingerprint("  Short.\n"), "Short.");
    }

    #[test]
    fn whitespace_only_is_empty() {
        assert_eq!(extract_fingerprint(""), "");
        assert_eq!(extract_fingerprint(" \t\n\u{a0} "), "");
    }

    #[test]
    fn prefix_counts_chars_not_bytes() {
        let text = "天地玄黄宇宙洪荒日月盈昃辰宿列张寒来暑往秋收冬藏闰余成岁律吕调阳云腾致雨露结为霜";
        let fp = extract_fingerprint(text);
        assert_eq!(fp.chars().count(), 32);
        assert!(text.starts_with(&fp));
    }

    #[test]
    fn inner_whitespace_preserved() {
        assert_eq!(extract_fingerprint("a  b\tc"), "a  b\tc");
    }

    #[test]
    fn case_is_preserved() {
        assert_eq!(extract_fingerprint("MiXeD"), "MiXeD");
        assert!(!is_match("mixed case", "MiXeD"));
    }

    #[test]
    fn badge_digits_do_not_leak() {
        let cfg = FingerprintConfig::markup();
        let fp = extract(
            r#"Short line <span class="na-comment-count">7</span>"#,
            &cfg,
        );
        assert_eq!(fp, "Short line");
    }

    #[test]
    fn literal_strip_then_trim() {
        let cfg = FingerprintConfig {
            injected: vec![InjectedFragment::text("💬 2")],
            ..Default::default()
        };
        assert_eq!(extract("Dialogue opens here. 💬 2", &cfg), "Dialogue opens here.");
    }

    #[test]
    fn custom_length() {
        let cfg = FingerprintConfig {
            max_chars: 5,
            ..Default::default()
        };
        assert_eq!(extract("abcdefgh", &cfg), "abcde");
    }

    #[test]
    fn empty_context_never_matches() {
        assert!(!is_match("anything", ""));
        assert!(!is_match("", ""));
        assert!(is_match("Gamma text", "Gamma"));
        assert!(!is_match("Gamma text", "Gamma text and more"));
    }

    #[test]
    fn deterministic() {
        let input = "Repeatable paragraph text, twice over.";
        assert_eq!(extract_fingerprint(input), extract_fingerprint(input));
    }
}
