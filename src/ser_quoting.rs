//! Controls quoting behavior of the serializer.

use crate::schema::plain_resolves_to_str;

/// Returns true if `s` can be written as a plain scalar and read back unchanged, as far as
/// the YAML structure is concerned. Whether the text would resolve to another type is
/// checked separately.
#[inline]
pub(crate) fn is_plain_safe(s: &str) -> bool {
    let Some(first) = s.chars().next() else {
        return false;
    };
    if first.is_whitespace()
        || matches!(
            first,
            '-' | '?'
                | ':'
                | ','
                | '['
                | ']'
                | '{'
                | '}'
                | '#'
                | '&'
                | '*'
                | '!'
                | '|'
                | '>'
                | '\''
                | '"'
                | '%'
                | '@'
                | '`'
        )
    {
        return false;
    }
    if s.ends_with(char::is_whitespace) || s.ends_with(':') || s.starts_with("...") {
        return false;
    }
    if s.chars().any(is_special_char) {
        return false;
    }
    // Flow indicators are only harmful inside flow collections, but they are cheap to quote.
    if s.contains(": ") || s.contains(" #") || s.contains([',', '[', ']', '{', '}']) {
        return false;
    }
    true
}

/// Returns true if an untagged string must be quoted to load back as the same string.
#[inline]
pub(crate) fn needs_quotes(s: &str) -> bool {
    !is_plain_safe(s) || !plain_resolves_to_str(s)
}

/// Determines if a string requires double quotes when `quote_all` is enabled: single
/// quotes cannot express escapes.
#[inline]
pub(crate) fn needs_double_quotes(s: &str) -> bool {
    s.chars().any(|c| c == '\'' || c == '\\' || is_special_char(c))
}

/// Characters that are only safe inside a double-quoted scalar as escapes.
#[inline]
fn is_special_char(c: char) -> bool {
    c.is_control() || matches!(c, '\u{2028}' | '\u{2029}' | '\u{FEFF}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_candidates() {
        for s in ["hello", "hello world", "a:b", "a#b", "ünïcödé", "path/to/file", ".5x"] {
            assert!(is_plain_safe(s), "{s:?}");
        }
        for s in [
            "", " lead", "trail ", "- item", "key: value", "a #comment", "ends:", "[x]", "a,b",
            "*ref", "&anchor", "!tag", "...", "line\nbreak", "tab\there", "\u{2028}",
        ] {
            assert!(!is_plain_safe(s), "{s:?}");
        }
    }

    #[test]
    fn strings_that_resolve_elsewhere_need_quotes() {
        for s in ["true", "NULL", "~", "12", "0x1F", "1e3", ".inf", ".NaN"] {
            assert!(needs_quotes(s), "{s:?}");
        }
        for s in ["yes", "no", "0b11", "1_000", "1.2.3"] {
            assert!(!needs_quotes(s), "{s:?}");
        }
    }

    #[test]
    fn double_quotes_for_escapes() {
        assert!(needs_double_quotes("it's"));
        assert!(needs_double_quotes("a\\b"));
        assert!(needs_double_quotes("a\nb"));
        assert!(!needs_double_quotes("plain text"));
    }
}
