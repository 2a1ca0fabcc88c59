//! Per-call registry of tag handlers.

use std::collections::HashMap;
use std::fmt;

use crate::error::Error;
use crate::tags::normalize_tag;
use crate::value::{Tagged, Value};

/// A caller-supplied transformation for one tag.
///
/// It receives the tagged node with its inner value already dispatched (scalar text is
/// passed verbatim as a string) and returns the value that replaces it.
pub type TagHandler<'h, E> = Box<dyn Fn(Tagged) -> Result<Value, E> + 'h>;

/// Maps normalized tags to handlers.
///
/// Handlers are borrowed for the duration of a single parse call, so they may capture
/// local state. Their errors are returned from the parse call unchanged.
///
/// ```rust
/// use yaml12::{TagHandlers, Value};
///
/// let handlers = TagHandlers::<yaml12::Error>::new()
///     .with("!upper", |t| Ok(Value::from(t.as_str().unwrap_or_default().to_uppercase())));
/// let value = yaml12::parse_with_handlers("name: !upper app\n", &handlers).unwrap();
/// assert_eq!(value["name"].as_str(), Some("APP"));
/// ```
pub struct TagHandlers<'h, E = Error> {
    handlers: HashMap<String, TagHandler<'h, E>, ahash::RandomState>,
}

impl<'h, E> TagHandlers<'h, E> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::default(),
        }
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with<F>(mut self, tag: &str, handler: F) -> Self
    where
        F: Fn(Tagged) -> Result<Value, E> + 'h,
    {
        self.insert(tag, handler);
        self
    }

    /// Register `handler` for `tag`. The tag is normalized first, so `!!int` and
    /// `tag:yaml.org,2002:int` name the same handler. Replaces any previous handler.
    pub fn insert<F>(&mut self, tag: &str, handler: F)
    where
        F: Fn(Tagged) -> Result<Value, E> + 'h,
    {
        self.handlers.insert(normalize_tag(tag), Box::new(handler));
    }

    /// Handler for an already normalized tag.
    pub(crate) fn get(&self, tag: &str) -> Option<&TagHandler<'h, E>> {
        self.handlers.get(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.handlers.contains_key(&normalize_tag(tag))
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<E> Default for TagHandlers<'_, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for TagHandlers<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_normalized_on_insert() {
        let handlers = TagHandlers::<Error>::new().with("!!int", |t| Ok(t.into_value()));
        assert!(handlers.contains("tag:yaml.org,2002:int"));
        assert!(handlers.contains("!<tag:yaml.org,2002:int>"));
        assert!(handlers.get("tag:yaml.org,2002:int").is_some());
        assert!(!handlers.contains("!int"));
    }

    #[test]
    fn later_registration_replaces() {
        let handlers = TagHandlers::<Error>::new()
            .with("!a", |_| Ok(Value::Int(1)))
            .with("!a", |_| Ok(Value::Int(2)));
        assert_eq!(handlers.len(), 1);
        let handler = handlers.get("!a").unwrap();
        let out = handler(Tagged::new(Value::Null, "!a")).unwrap();
        assert_eq!(out, Value::Int(2));
    }
}
