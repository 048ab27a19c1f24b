//! Filename helpers: turn OneNote display names into safe path components.

use once_cell::sync::Lazy;
use regex::Regex;

/// Device names Windows refuses as file or directory names.
pub const RESERVED_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Suffix appended to a reserved device name.
pub const RESERVED_SUFFIX: &str = "_note";

static RE_FORBIDDEN: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[<>:"\\/|?*]"#).unwrap());

/// Make `name` usable as a single path component.
///
/// Reserved device names get [`RESERVED_SUFFIX`]; otherwise every character
/// of `< > : " \ / | ? *` becomes `_`. Surrounding whitespace is trimmed and
/// non-ASCII text is kept. Applying it twice gives the same result.
pub fn safe_name(name: &str) -> String {
    let trimmed = name.trim();
    if RESERVED_NAMES.contains(&trimmed) {
        return format!("{trimmed}{RESERVED_SUFFIX}");
    }
    RE_FORBIDDEN.replace_all(trimmed, "_").into_owned()
}

/// Replace spaces with underscores (asset filenames only).
pub fn replace_whitespace(name: &str) -> String {
    name.replace(' ', "_")
}

/// Shorten `s` to `len` characters by cutting out its middle.
pub fn truncate_middle(s: &str, len: usize) -> String {
    const ELLIPSIS: &str = "...";

    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= len {
        return s.to_string();
    }
    if len <= ELLIPSIS.len() {
        return chars[..len].iter().collect();
    }

    let keep = len - ELLIPSIS.len();
    let head = keep / 2;
    let tail = keep - head;

    let mut out: String = chars[..head].iter().collect();
    out.push_str(ELLIPSIS);
    out.extend(&chars[chars.len() - tail..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_name_unchanged() {
        assert_eq!(safe_name("test"), "test");
    }

    #[test]
    fn non_ascii_preserved() {
        assert_eq!(safe_name("hä hä"), "hä hä");
    }

    #[test]
    fn every_forbidden_char_replaced() {
        assert_eq!(
            safe_name(r#"file<>:"/\|?*name"#),
            format!("file{}name", "_".repeat(9))
        );
    }

    #[test]
    fn reserved_names_get_suffix() {
        for n in RESERVED_NAMES {
            assert_eq!(safe_name(n), format!("{n}_note"));
        }
    }

    #[test]
    fn reserved_match_is_case_sensitive() {
        assert_eq!(safe_name("con"), "con");
        assert_eq!(safe_name("LPT10"), "LPT10");
    }

    #[test]
    fn reserved_after_trim() {
        assert_eq!(safe_name("  CON "), "CON_note");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(safe_name("  Meeting notes \t"), "Meeting notes");
    }

    #[test]
    fn idempotent() {
        for s in [
            "  a:b ",
            "CON",
            " PRN ",
            "x/y\\z",
            "ünïcödé?",
            "",
            "   ",
            "007 Q3 <draft>",
        ] {
            let once = safe_name(s);
            assert_eq!(safe_name(&once), once, "input {s:?}");
        }
    }

    #[test]
    fn whitespace_to_underscore() {
        assert_eq!(replace_whitespace("001 My Page"), "001_My_Page");
        assert_eq!(replace_whitespace("nospace"), "nospace");
    }

    #[test]
    fn truncate_short_string_untouched() {
        assert_eq!(truncate_middle("short", 10), "short");
    }

    #[test]
    fn truncate_keeps_both_ends() {
        let out = truncate_middle("abcdefghijklmnopqrstuvwxyz", 10);
        assert_eq!(out.chars().count(), 10);
        assert_eq!(out, "abc...wxyz");
    }

    #[test]
    fn truncate_counts_chars_not_bytes() {
        let out = truncate_middle("ääääääääää", 7);
        assert_eq!(out, "ää...ää");
    }

    #[test]
    fn truncate_tiny_width() {
        assert_eq!(truncate_middle("abcdef", 2), "ab");
    }
}
