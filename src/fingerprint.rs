//! Structural identity of values and nodes.
//!
//! Two representations are computed from the same structure:
//! - [`Fingerprint`], a canonical tree that is equal exactly when the values are equal;
//! - a 64-bit digest used for `Hash`, with a fixed seed so hashes are stable across runs.
//!
//! Both ignore mapping entry order and respect sequence order. Floats are canonicalized so
//! that all NaNs are equal and `-0.0 == 0.0`.

use std::hash::{BuildHasher, Hasher};

use ahash::RandomState;
use nohash_hasher::{IntMap, IntSet};

use crate::budget::BudgetBreach;
use crate::error::Error;
use crate::node::{Document, NodeId, NodeKind};
use crate::schema::construct_scalar;
use crate::tags::CoreTag;
use crate::value::{Value, float_bits};

/// Canonical structural form of a [`Value`].
///
/// `a.fingerprint() == b.fingerprint()` if and only if `a == b`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Fingerprint {
    Null,
    Bool(bool),
    Int(i64),
    /// Canonical bit pattern.
    Float(u64),
    Str(String),
    Seq(Vec<Fingerprint>),
    /// Entries sorted, so the order of the source mapping does not matter.
    Map(Vec<(Fingerprint, Fingerprint)>),
    Tagged(String, Box<Fingerprint>),
    /// Identity of an opaque handler object.
    Opaque(usize),
}

impl Fingerprint {
    pub(crate) fn of(value: &Value) -> Fingerprint {
        match value {
            Value::Null => Fingerprint::Null,
            Value::Bool(b) => Fingerprint::Bool(*b),
            Value::Int(i) => Fingerprint::Int(*i),
            Value::Float(f) => Fingerprint::Float(float_bits(*f)),
            Value::String(s) => Fingerprint::Str(s.clone()),
            Value::Sequence(items) => Fingerprint::Seq(items.iter().map(Fingerprint::of).collect()),
            Value::Mapping(map) => {
                let mut entries: Vec<_> = map
                    .iter()
                    .map(|(k, v)| (Fingerprint::of(k), Fingerprint::of(v)))
                    .collect();
                entries.sort();
                Fingerprint::Map(entries)
            }
            Value::Tagged(tagged) => {
                Fingerprint::Tagged(tagged.tag().to_owned(), Box::new(Fingerprint::of(&tagged.value)))
            }
            Value::Key(key) => Fingerprint::of(key.value()),
            Value::Opaque(opaque) => Fingerprint::Opaque(opaque.identity()),
        }
    }
}

fn seeded() -> RandomState {
    RandomState::with_seeds(
        0x243f_6a88_85a3_08d3,
        0x1319_8a2e_0370_7344,
        0xa409_3822_299f_31d0,
        0x082e_fa98_ec4e_6c89,
    )
}

const KIND_NULL: u8 = 0;
const KIND_BOOL: u8 = 1;
const KIND_INT: u8 = 2;
const KIND_FLOAT: u8 = 3;
const KIND_STR: u8 = 4;
const KIND_SEQ: u8 = 5;
const KIND_MAP: u8 = 6;
const KIND_TAGGED: u8 = 7;
const KIND_OPAQUE: u8 = 8;

/// Fixed-seed structural digest; equal values have equal digests.
pub(crate) fn digest(value: &Value) -> u64 {
    match value {
        Value::Null => {
            let mut h = seeded().build_hasher();
            h.write_u8(KIND_NULL);
            h.finish()
        }
        Value::Bool(b) => {
            let mut h = seeded().build_hasher();
            h.write_u8(KIND_BOOL);
            h.write_u8(*b as u8);
            h.finish()
        }
        Value::Int(i) => {
            let mut h = seeded().build_hasher();
            h.write_u8(KIND_INT);
            h.write_i64(*i);
            h.finish()
        }
        Value::Float(f) => {
            let mut h = seeded().build_hasher();
            h.write_u8(KIND_FLOAT);
            h.write_u64(float_bits(*f));
            h.finish()
        }
        Value::String(s) => str_digest(s),
        Value::Sequence(items) => seq_digest(items.iter().map(digest)),
        Value::Mapping(map) => map_digest(map.iter().map(|(k, v)| (digest(k), digest(v)))),
        Value::Tagged(tagged) => tagged_digest(tagged.tag(), digest(&tagged.value)),
        Value::Key(key) => key.digest(),
        Value::Opaque(opaque) => {
            let mut h = seeded().build_hasher();
            h.write_u8(KIND_OPAQUE);
            h.write_usize(opaque.identity());
            h.finish()
        }
    }
}

/// Digest of `Value::String(s)`, computable from a borrowed `&str`.
pub(crate) fn str_digest(s: &str) -> u64 {
    let mut h = seeded().build_hasher();
    h.write_u8(KIND_STR);
    h.write(s.as_bytes());
    h.write_u8(0xff);
    h.finish()
}

fn seq_digest(items: impl ExactSizeIterator<Item = u64>) -> u64 {
    let mut h = seeded().build_hasher();
    h.write_u8(KIND_SEQ);
    h.write_usize(items.len());
    for item in items {
        h.write_u64(item);
    }
    h.finish()
}

/// Entries are combined with a wrapping sum, so their order does not matter.
fn map_digest(entries: impl ExactSizeIterator<Item = (u64, u64)>) -> u64 {
    let len = entries.len();
    let sum = entries.fold(0u64, |acc, (k, v)| acc.wrapping_add(entry_digest(k, v)));
    let mut h = seeded().build_hasher();
    h.write_u8(KIND_MAP);
    h.write_usize(len);
    h.write_u64(sum);
    h.finish()
}

fn tagged_digest(tag: &str, inner: u64) -> u64 {
    let mut h = seeded().build_hasher();
    h.write_u8(KIND_TAGGED);
    h.write(tag.as_bytes());
    h.write_u8(0xff);
    h.write_u64(inner);
    h.finish()
}

fn entry_digest(key: u64, value: u64) -> u64 {
    let mut h = seeded().build_hasher();
    h.write_u64(key);
    h.write_u64(value);
    h.finish()
}

/// Structural identity of the nodes of one composed document, following aliases.
///
/// Digests and fingerprints agree with those of the value a node would dispatch to without
/// handlers, except that content invalid for an explicit core tag is kept as tagged text
/// instead of failing. `open` holds the nodes still under construction by the composer;
/// reaching one, or re-entering a node on the current path, is a cycle.
///
/// Visits are counted over the whole document against `max_nodes`. Digests of finished
/// nodes are memoized, so an anchored subtree is walked once however often it is aliased.
pub(crate) struct NodeIdentity {
    max_depth: usize,
    max_nodes: usize,
    visited: usize,
    path: IntSet<NodeId>,
    digests: IntMap<NodeId, u64>,
}

impl NodeIdentity {
    pub(crate) fn new(max_depth: usize, max_nodes: usize) -> Self {
        Self {
            max_depth,
            max_nodes,
            visited: 0,
            path: IntSet::default(),
            digests: IntMap::default(),
        }
    }

    /// Forget everything learned about the previous document.
    pub(crate) fn reset(&mut self) {
        self.visited = 0;
        self.path.clear();
        self.digests.clear();
    }

    pub(crate) fn visited(&self) -> usize {
        self.visited
    }

    pub(crate) fn digest(
        &mut self,
        doc: &Document,
        open: &IntSet<NodeId>,
        id: NodeId,
    ) -> Result<u64, Error> {
        self.digest_at(doc, open, id, 0)
    }

    /// Full fingerprint; only needed when two digests collide.
    pub(crate) fn fingerprint(
        &mut self,
        doc: &Document,
        open: &IntSet<NodeId>,
        id: NodeId,
    ) -> Result<Fingerprint, Error> {
        self.fingerprint_at(doc, open, id, 0)
    }

    fn enter(
        &mut self,
        doc: &Document,
        open: &IntSet<NodeId>,
        id: NodeId,
        depth: usize,
    ) -> Result<(), Error> {
        let location = doc.node(id).location;
        if depth > self.max_depth {
            return Err(Error::depth(self.max_depth).with_location(location));
        }
        self.visited += 1;
        if self.visited > self.max_nodes {
            let breach = BudgetBreach::ExpandedNodes { nodes: self.visited };
            return Err(Error::budget(breach, self.max_nodes).with_location(location));
        }
        if open.contains(&id) || !self.path.insert(id) {
            return Err(Error::cyclic().with_location(location));
        }
        Ok(())
    }

    fn digest_at(
        &mut self,
        doc: &Document,
        open: &IntSet<NodeId>,
        id: NodeId,
        depth: usize,
    ) -> Result<u64, Error> {
        if let Some(&known) = self.digests.get(&id) {
            self.visited += 1;
            return Ok(known);
        }
        self.enter(doc, open, id, depth)?;
        let node = doc.node(id);
        let core = CoreTag::from_tag(&node.tag);
        let inner = match &node.kind {
            NodeKind::Scalar { value, .. } => match core {
                Some(core) => match construct_scalar(value, core) {
                    Ok(native) => digest(&native),
                    Err(_) => tagged_digest(&node.tag, str_digest(value)),
                },
                None => str_digest(value),
            },
            NodeKind::Sequence(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.digest_at(doc, open, *item, depth + 1)?);
                }
                seq_digest(out.into_iter())
            }
            NodeKind::Mapping(entries) => {
                let mut out = Vec::with_capacity(entries.len());
                for (k, v) in entries {
                    out.push((
                        self.digest_at(doc, open, *k, depth + 1)?,
                        self.digest_at(doc, open, *v, depth + 1)?,
                    ));
                }
                map_digest(out.into_iter())
            }
        };
        self.path.remove(&id);
        let result = match core {
            Some(_) => inner,
            None => tagged_digest(&node.tag, inner),
        };
        self.digests.insert(id, result);
        Ok(result)
    }

    fn fingerprint_at(
        &mut self,
        doc: &Document,
        open: &IntSet<NodeId>,
        id: NodeId,
        depth: usize,
    ) -> Result<Fingerprint, Error> {
        self.enter(doc, open, id, depth)?;
        let node = doc.node(id);
        let core = CoreTag::from_tag(&node.tag);
        let inner = match &node.kind {
            NodeKind::Scalar { value, .. } => match core {
                Some(core) => match construct_scalar(value, core) {
                    Ok(native) => Fingerprint::of(&native),
                    Err(_) => Fingerprint::Tagged(
                        node.tag.clone(),
                        Box::new(Fingerprint::Str(value.clone())),
                    ),
                },
                None => Fingerprint::Str(value.clone()),
            },
            NodeKind::Sequence(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.fingerprint_at(doc, open, *item, depth + 1)?);
                }
                Fingerprint::Seq(out)
            }
            NodeKind::Mapping(entries) => {
                let mut out = Vec::with_capacity(entries.len());
                for (k, v) in entries {
                    out.push((
                        self.fingerprint_at(doc, open, *k, depth + 1)?,
                        self.fingerprint_at(doc, open, *v, depth + 1)?,
                    ));
                }
                out.sort();
                Fingerprint::Map(out)
            }
        };
        self.path.remove(&id);
        Ok(match core {
            Some(_) => inner,
            None => Fingerprint::Tagged(node.tag.clone(), Box::new(inner)),
        })
    }
}
