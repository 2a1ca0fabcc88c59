//! Turns a composed [`Document`] into a [`Value`], running tag handlers bottom-up.
//!
//! Children are dispatched before their parent, so a handler always sees final values
//! inside the [`Tagged`] it receives. Only explicit tags reach handlers; implicitly
//! resolved nodes are built natively from the core schema.

use nohash_hasher::IntSet;

use crate::budget::BudgetBreach;
use crate::error::Error;
use crate::handlers::TagHandlers;
use crate::mapping_key::MappingKey;
use crate::node::{Document, Node, NodeId, NodeKind};
use crate::options::{DuplicateKeyPolicy, Options};
use crate::schema::{check_collection_tag, construct_scalar};
use crate::tags::CoreTag;
use crate::value::{Mapping, Tagged, Value};

/// Why dispatch stopped: the engine failed, or a handler returned its own error.
#[derive(Debug)]
pub(crate) enum DispatchError<E> {
    Engine(Error),
    Handler(E),
}

impl<E> From<Error> for DispatchError<E> {
    fn from(err: Error) -> Self {
        DispatchError::Engine(err)
    }
}

pub(crate) fn dispatch_document<E>(
    doc: &Document,
    handlers: &TagHandlers<'_, E>,
    options: &Options,
) -> Result<Value, DispatchError<E>> {
    let mut dispatcher = Dispatcher {
        doc,
        handlers,
        options,
        active: IntSet::default(),
        expanded: 0,
    };
    dispatcher.dispatch(doc.root(), 0)
}

struct Dispatcher<'d, 'h, E> {
    doc: &'d Document,
    handlers: &'d TagHandlers<'h, E>,
    options: &'d Options,
    /// Nodes on the path from the root to the node being dispatched.
    active: IntSet<NodeId>,
    /// Nodes materialized so far, counting each alias expansion again.
    expanded: usize,
}

impl<'d, 'h, E> Dispatcher<'d, 'h, E> {
    fn dispatch(&mut self, id: NodeId, depth: usize) -> Result<Value, DispatchError<E>> {
        let doc = self.doc;
        let node = doc.node(id);
        if depth > self.options.max_depth {
            return Err(Error::depth(self.options.max_depth)
                .with_location(node.location)
                .into());
        }
        self.expanded += 1;
        if self.expanded > self.options.alias_limits.max_total_expanded_nodes {
            let breach = BudgetBreach::ExpandedNodes {
                nodes: self.expanded,
            };
            return Err(Error::budget(breach, self.options.max_depth)
                .with_location(node.location)
                .into());
        }
        if !self.active.insert(id) {
            return Err(Error::cyclic().with_location(node.location).into());
        }
        let result = self.dispatch_node(node, depth);
        self.active.remove(&id);
        result
    }

    fn dispatch_node(&mut self, node: &'d Node, depth: usize) -> Result<Value, DispatchError<E>> {
        let handlers = self.handlers;
        let handler = if node.explicit_tag {
            handlers.get(&node.tag)
        } else {
            None
        };
        let core = CoreTag::from_tag(&node.tag);

        let inner = match &node.kind {
            NodeKind::Scalar { value, .. } => match core {
                Some(core) if handler.is_none() => {
                    construct_scalar(value, core).map_err(|e| e.with_location(node.location))?
                }
                _ => Value::String(value.clone()),
            },
            NodeKind::Sequence(items) => {
                if handler.is_none() {
                    check_collection_tag(core, true).map_err(|e| e.with_location(node.location))?;
                }
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.dispatch(*item, depth + 1)?);
                }
                Value::Sequence(out)
            }
            NodeKind::Mapping(entries) => {
                if handler.is_none() {
                    check_collection_tag(core, false).map_err(|e| e.with_location(node.location))?;
                }
                Value::Mapping(self.dispatch_mapping(entries, depth)?)
            }
        };

        match handler {
            Some(handler) => {
                handler(Tagged::from_normalized(inner, node.tag.clone())).map_err(DispatchError::Handler)
            }
            None if core.is_none() => Ok(Value::from(Tagged::from_normalized(
                inner,
                node.tag.clone(),
            ))),
            None => Ok(inner),
        }
    }

    fn dispatch_mapping(
        &mut self,
        entries: &'d [(NodeId, NodeId)],
        depth: usize,
    ) -> Result<Mapping, DispatchError<E>> {
        let mut map = Mapping::with_capacity_and_hasher(entries.len(), ahash::RandomState::new());
        for (key_id, value_id) in entries {
            let key = into_key(self.dispatch(*key_id, depth + 1)?);
            let value = self.dispatch(*value_id, depth + 1)?;
            match self.options.duplicate_keys {
                DuplicateKeyPolicy::Error => {
                    if map.contains_key(&key) {
                        let location = self.doc.node(*key_id).location;
                        return Err(Error::compose("duplicate mapping key after applying tag handlers")
                            .with_location(location)
                            .into());
                    }
                    map.insert(key, value);
                }
                DuplicateKeyPolicy::FirstWins => {
                    map.entry(key).or_insert(value);
                }
                DuplicateKeyPolicy::LastWins => {
                    map.insert(key, value);
                }
            }
        }
        Ok(map)
    }
}

/// Wrap a collection-shaped key; scalar keys are used as they are.
fn into_key(value: Value) -> Value {
    match value {
        Value::Key(_) => value,
        value if value.is_collection() => Value::Key(MappingKey::new(value)),
        value => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::compose_stream;

    fn dispatch_with(text: &str, handlers: &TagHandlers<'_, Error>, options: &Options) -> Result<Value, Error> {
        let docs = compose_stream(text, options)?;
        match dispatch_document(&docs[0], handlers, options) {
            Ok(v) => Ok(v),
            Err(DispatchError::Engine(e)) | Err(DispatchError::Handler(e)) => Err(e),
        }
    }

    fn dispatch(text: &str) -> Result<Value, Error> {
        dispatch_with(text, &TagHandlers::new(), &Options::default())
    }

    #[test]
    fn explicit_core_tags_resolve_natively() {
        let v = dispatch("[!!str 12, !!int '7', !!float 3, !!bool TRUE, !!null '']").unwrap();
        assert_eq!(
            v,
            Value::from(vec![
                Value::from("12"),
                Value::Int(7),
                Value::Float(3.0),
                Value::Bool(true),
                Value::Null
            ])
        );
    }

    #[test]
    fn invalid_core_payload_is_an_error() {
        let err = dispatch("a: !!int abc\n").unwrap_err();
        match err {
            Error::Compose { location, .. } => assert_eq!(location.line(), 1),
            other => panic!("unexpected {other:?}"),
        }
        assert!(dispatch("!!map [1]").is_err());
        assert!(dispatch("!!seq {a: 1}").is_err());
    }

    #[test]
    fn unknown_tags_stay_tagged() {
        let v = dispatch("!foo 001").unwrap();
        let tagged = v.as_tagged().unwrap();
        assert_eq!(tagged.tag(), "!foo");
        assert_eq!(tagged.value, Value::from("001"));
    }

    #[test]
    fn handler_sees_dispatched_children() {
        let handlers = TagHandlers::<Error>::new()
            .with("!sum", |t| {
                let total = t.value().as_sequence().map_or(0, |items| {
                    items.iter().filter_map(Value::as_i64).sum::<i64>()
                });
                Ok(Value::Int(total))
            })
            .with("!double", |t| {
                let n: i64 = t.as_str().and_then(|s| s.parse().ok()).unwrap_or(0);
                Ok(Value::Int(n * 2))
            });
        let v = dispatch_with("!sum [1, !double 5, 3]", &handlers, &Options::default()).unwrap();
        assert_eq!(v, Value::Int(14));
    }

    #[test]
    fn handler_for_core_tag_receives_text() {
        let handlers = TagHandlers::<Error>::new().with("!!int", |t| Ok(Value::from(format!("<{}>", t.as_str().unwrap_or("")))));
        let v = dispatch_with("[!!int 0x10, 16]", &handlers, &Options::default()).unwrap();
        assert_eq!(v, Value::from(vec![Value::from("<0x10>"), Value::Int(16)]));
    }

    #[test]
    fn collection_keys_are_wrapped() {
        let v = dispatch("? [a, b]\n: 1\n? !t {x: 1}\n: 2\nplain: 3\n").unwrap();
        let map = v.as_mapping().unwrap();
        let keys: Vec<_> = map.keys().collect();
        assert!(matches!(keys[0], Value::Key(_)));
        assert!(matches!(keys[1], Value::Key(_)));
        assert!(matches!(keys[2], Value::String(_)));
    }

    #[test]
    fn aliases_expand_to_copies() {
        let v = dispatch("a: &x {k: v}\nb: *x\n").unwrap();
        assert_eq!(v["a"], v["b"]);
        assert_eq!(v["b"]["k"].as_str(), Some("v"));
    }

    #[test]
    fn cycles_are_rejected() {
        assert!(matches!(dispatch("&a [*a]"), Err(Error::CyclicValue { .. })));
        assert!(matches!(dispatch("&a {k: [*a]}"), Err(Error::CyclicValue { .. })));
    }

    #[test]
    fn alias_expansion_is_bounded() {
        let mut options = Options::default();
        options.alias_limits.max_total_expanded_nodes = 30;
        let text = "a: &a [x, x, x]\nb: &b [*a, *a, *a]\nc: &c [*b, *b, *b]\n";
        let err = dispatch_with(text, &TagHandlers::new(), &options).unwrap_err();
        assert!(matches!(
            err,
            Error::Budget { breach: BudgetBreach::ExpandedNodes { .. }, .. }
        ));
    }

    #[test]
    fn handler_collisions_follow_policy() {
        let handlers = TagHandlers::<Error>::new().with("!k", |_| Ok(Value::from("same")));
        let text = "!k a: 1\n!k b: 2\n";

        let err = dispatch_with(text, &handlers, &Options::default()).unwrap_err();
        assert!(matches!(err, Error::Compose { .. }));

        let first = crate::options! { duplicate_keys: DuplicateKeyPolicy::FirstWins };
        let v = dispatch_with(text, &handlers, &first).unwrap();
        assert_eq!(v["same"], Value::Int(1));

        let last = crate::options! { duplicate_keys: DuplicateKeyPolicy::LastWins };
        let v = dispatch_with(text, &handlers, &last).unwrap();
        assert_eq!(v["same"], Value::Int(2));
        assert_eq!(v.as_mapping().map(|m| m.len()), Some(1));
    }
}
