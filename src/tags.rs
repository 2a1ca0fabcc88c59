//! Tag spelling: canonical core-schema URIs, normalization, and the inverse shorthand
//! used when emitting.

use saphyr_parser::Tag as ParserTag;

/// Prefix the `!!` handle expands to.
pub const CORE_PREFIX: &str = "tag:yaml.org,2002:";

pub const TAG_NULL: &str = "tag:yaml.org,2002:null";
pub const TAG_BOOL: &str = "tag:yaml.org,2002:bool";
pub const TAG_INT: &str = "tag:yaml.org,2002:int";
pub const TAG_FLOAT: &str = "tag:yaml.org,2002:float";
pub const TAG_STR: &str = "tag:yaml.org,2002:str";
pub const TAG_SEQ: &str = "tag:yaml.org,2002:seq";
pub const TAG_MAP: &str = "tag:yaml.org,2002:map";

/// The non-specific tag.
pub const TAG_NON_SPECIFIC: &str = "!";

/// Normalize a tag to its canonical spelling.
///
/// - `!!suffix` expands to `tag:yaml.org,2002:suffix`.
/// - `!<uri>` (verbatim) becomes `uri`.
/// - The bare `!`, local tags `!name` and full URIs are returned unchanged.
///
/// Normalizing an already normalized tag is a no-op.
///
/// ```rust
/// assert_eq!(yaml12::normalize_tag("!!int"), "tag:yaml.org,2002:int");
/// assert_eq!(yaml12::normalize_tag("!<tag:example.com,2024:x>"), "tag:example.com,2024:x");
/// assert_eq!(yaml12::normalize_tag("!local"), "!local");
/// assert_eq!(yaml12::normalize_tag("!"), "!");
/// ```
pub fn normalize_tag(tag: &str) -> String {
    if let Some(suffix) = tag.strip_prefix("!!") {
        return format!("{CORE_PREFIX}{suffix}");
    }
    if let Some(inner) = tag.strip_prefix("!<").and_then(|t| t.strip_suffix('>')) {
        return normalize_tag(inner);
    }
    tag.to_owned()
}

/// Spell a tag reported by the parser. Handles declared with `%TAG` are already expanded
/// into `handle`; `!` alone arrives as an empty handle with suffix `!`.
pub(crate) fn tag_from_parser(tag: &ParserTag) -> String {
    normalize_tag(&format!("{}{}", tag.handle, tag.suffix))
}

/// The core-schema kind named by a normalized tag, if any.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CoreTag {
    Null,
    Bool,
    Int,
    Float,
    Str,
    Seq,
    Map,
}

impl CoreTag {
    pub(crate) fn from_tag(tag: &str) -> Option<CoreTag> {
        Some(match tag {
            TAG_NULL => CoreTag::Null,
            TAG_BOOL => CoreTag::Bool,
            TAG_INT => CoreTag::Int,
            TAG_FLOAT => CoreTag::Float,
            TAG_STR => CoreTag::Str,
            TAG_SEQ => CoreTag::Seq,
            TAG_MAP => CoreTag::Map,
            _ => return None,
        })
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            CoreTag::Null => TAG_NULL,
            CoreTag::Bool => TAG_BOOL,
            CoreTag::Int => TAG_INT,
            CoreTag::Float => TAG_FLOAT,
            CoreTag::Str => TAG_STR,
            CoreTag::Seq => TAG_SEQ,
            CoreTag::Map => TAG_MAP,
        }
    }
}

/// Characters allowed in a tag URI or local tag name when written without `!<...>`.
fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '-' | '#' | ';' | '/' | '?' | ':' | '@' | '&' | '=' | '+' | '$' | '_' | '.' | '~'
                | '*' | '\'' | '(' | ')' | '%'
        )
}

/// Spelling of a normalized tag in YAML source, or `None` if it cannot be written.
///
/// Core-schema URIs use the `!!` shorthand, local tags and `!` are written verbatim, any
/// other URI uses the verbatim `!<uri>` form.
pub(crate) fn tag_to_source(tag: &str) -> Option<String> {
    if tag == TAG_NON_SPECIFIC {
        return Some(tag.to_owned());
    }
    if let Some(suffix) = tag.strip_prefix(CORE_PREFIX) {
        if !suffix.is_empty() && suffix.chars().all(|c| is_tag_char(c) && c != '!') {
            return Some(format!("!!{suffix}"));
        }
    }
    if let Some(name) = tag.strip_prefix('!') {
        if !name.is_empty() && name.chars().all(|c| is_tag_char(c) && c != '!') {
            return Some(tag.to_owned());
        }
        return None;
    }
    if !tag.is_empty() && tag.chars().all(|c| is_tag_char(c) || matches!(c, ',' | '[' | ']' | '!')) {
        return Some(format!("!<{tag}>"));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_is_idempotent() {
        for tag in ["!!str", "!foo", "!", "!<tag:x.org,1:y>", "tag:yaml.org,2002:map", "!<!bar>", "!<!!int>"] {
            let once = normalize_tag(tag);
            assert_eq!(normalize_tag(&once), once, "{tag}");
        }
    }

    #[test]
    fn parser_tags_are_spelled() {
        let core = ParserTag {
            handle: CORE_PREFIX.to_owned(),
            suffix: "str".to_owned(),
        };
        assert_eq!(tag_from_parser(&core), TAG_STR);
        let local = ParserTag {
            handle: "!".to_owned(),
            suffix: "foo".to_owned(),
        };
        assert_eq!(tag_from_parser(&local), "!foo");
        let bare = ParserTag {
            handle: String::new(),
            suffix: "!".to_owned(),
        };
        assert_eq!(tag_from_parser(&bare), "!");
    }

    #[test]
    fn source_spelling() {
        assert_eq!(tag_to_source(TAG_INT).as_deref(), Some("!!int"));
        assert_eq!(tag_to_source("!").as_deref(), Some("!"));
        assert_eq!(tag_to_source("!point").as_deref(), Some("!point"));
        assert_eq!(
            tag_to_source("tag:example.com,2024:pt").as_deref(),
            Some("!<tag:example.com,2024:pt>")
        );
        assert_eq!(tag_to_source("!has space"), None);
        assert_eq!(tag_to_source(""), None);
    }

    #[test]
    fn core_tags_round_trip() {
        for core in [CoreTag::Null, CoreTag::Bool, CoreTag::Int, CoreTag::Float, CoreTag::Str, CoreTag::Seq, CoreTag::Map] {
            assert_eq!(CoreTag::from_tag(core.as_str()), Some(core));
        }
        assert_eq!(CoreTag::from_tag("!int"), None);
    }
}
