//! The post-dispatch value tree.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Index;
use std::sync::Arc;

use indexmap::{Equivalent, IndexMap};
use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::fingerprint::{Fingerprint, digest, str_digest};
use crate::mapping_key::MappingKey;
use crate::tags::normalize_tag;

/// Insertion-ordered mapping. Equality ignores entry order.
pub type Mapping = IndexMap<Value, Value, ahash::RandomState>;

/// A YAML value after tag handlers have run.
///
/// Equality is structural: mapping entry order is ignored, sequence order is not,
/// all NaNs are equal and `-0.0 == 0.0`. A [`Value::Key`] compares equal to the value it
/// wraps. `Hash` agrees with `Eq`.
#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Sequence(Vec<Value>),
    Mapping(Mapping),
    /// A node whose tag was not consumed by a handler.
    Tagged(Box<Tagged>),
    /// A sequence- or mapping-shaped mapping key.
    Key(MappingKey),
    /// A host object produced by a tag handler.
    Opaque(Opaque),
}

/// A value together with the tag it was written with.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tagged {
    pub value: Value,
    tag: String,
}

impl Tagged {
    /// Tag `value`, normalizing the tag (`!!int` becomes `tag:yaml.org,2002:int`).
    pub fn new(value: Value, tag: impl AsRef<str>) -> Self {
        Self {
            value,
            tag: normalize_tag(tag.as_ref()),
        }
    }

    pub(crate) fn from_normalized(value: Value, tag: String) -> Self {
        Self { value, tag }
    }

    /// The normalized tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Inner string, if the tagged node was a scalar.
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_str()
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn into_parts(self) -> (Value, String) {
        (self.value, self.tag)
    }
}

/// A handler-produced object the engine cannot look into.
///
/// Compares and hashes by identity: clones of one `Opaque` are equal, two separately
/// created objects never are, whatever they contain.
#[derive(Clone)]
pub struct Opaque(Arc<dyn Any + Send + Sync>);

impl Opaque {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Opaque(Arc::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    pub(crate) fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for Opaque {}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opaque({:#x})", self.identity())
    }
}

impl Value {
    /// Wrap `value` as a composite mapping key.
    pub fn key(value: impl Into<Value>) -> Value {
        Value::Key(MappingKey::new(value.into()))
    }

    /// Tag `value` with `tag` (normalized).
    pub fn tagged(value: impl Into<Value>, tag: impl AsRef<str>) -> Value {
        Value::Tagged(Box::new(Tagged::new(value.into(), tag)))
    }

    pub fn opaque<T: Any + Send + Sync>(value: T) -> Value {
        Value::Opaque(Opaque::new(value))
    }

    /// The value with one level of [`Value::Key`] removed.
    pub fn unkeyed(&self) -> &Value {
        match self {
            Value::Key(key) => key.value(),
            other => other,
        }
    }

    /// Canonical structural form; two values are equal iff their fingerprints are.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(self)
    }

    pub fn is_null(&self) -> bool {
        matches!(self.unkeyed(), Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.unkeyed() {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self.unkeyed() {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Floats, and integers widened to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self.unkeyed() {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self.unkeyed() {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&Vec<Value>> {
        match self.unkeyed() {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self.unkeyed() {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_tagged(&self) -> Option<&Tagged> {
        match self.unkeyed() {
            Value::Tagged(tagged) => Some(tagged),
            _ => None,
        }
    }

    pub fn as_key(&self) -> Option<&MappingKey> {
        match self {
            Value::Key(key) => Some(key),
            _ => None,
        }
    }

    /// `true` for sequences and mappings, directly or behind one tag.
    pub fn is_collection(&self) -> bool {
        match self.unkeyed() {
            Value::Sequence(_) | Value::Mapping(_) => true,
            Value::Tagged(t) => matches!(t.value, Value::Sequence(_) | Value::Mapping(_)),
            _ => false,
        }
    }

    /// Look up `index` in a sequence or mapping.
    ///
    /// A tagged collection or a composite key is looked into transparently.
    pub fn get<I: ValueIndex>(&self, index: I) -> Option<&Value> {
        index.index_into(self.indexable()?)
    }

    /// The collection lookups and iteration go to: this value, or the collection behind
    /// one level of key wrapper and one level of tag.
    pub(crate) fn indexable(&self) -> Option<&Value> {
        let target = match self.unkeyed() {
            Value::Tagged(t) => &t.value,
            other => other,
        };
        match target {
            Value::Sequence(_) | Value::Mapping(_) => Some(target),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self.unkeyed(), other.unkeyed()) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => float_bits(*a) == float_bits(*b),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Sequence(a), Value::Sequence(b)) => a == b,
            (Value::Mapping(a), Value::Mapping(b)) => a == b,
            (Value::Tagged(a), Value::Tagged(b)) => a == b,
            (Value::Opaque(a), Value::Opaque(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(digest(self));
    }
}

/// Bits of `f` with all NaNs and both zeros collapsed.
pub(crate) fn float_bits(f: f64) -> u64 {
    if f.is_nan() {
        f64::NAN.to_bits()
    } else if f == 0.0 {
        0u64
    } else {
        f.to_bits()
    }
}

/// Borrowed string probe for mapping lookups without allocating a `Value`.
struct StrProbe<'a>(&'a str);

impl Hash for StrProbe<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(str_digest(self.0));
    }
}

impl Equivalent<Value> for StrProbe<'_> {
    fn equivalent(&self, key: &Value) -> bool {
        key.as_str() == Some(self.0)
    }
}

mod private {
    pub trait Sealed {}
    impl Sealed for usize {}
    impl Sealed for str {}
    impl Sealed for String {}
    impl Sealed for super::Value {}
    impl<T: ?Sized + Sealed> Sealed for &T {}
}

/// Types usable to look into a [`Value`]: `usize` for sequence positions (or integer
/// mapping keys), `&str` / `String` for string keys, and `Value` for any key.
pub trait ValueIndex: private::Sealed {
    #[doc(hidden)]
    fn index_into<'v>(&self, v: &'v Value) -> Option<&'v Value>;
}

impl ValueIndex for usize {
    fn index_into<'v>(&self, v: &'v Value) -> Option<&'v Value> {
        match v {
            Value::Sequence(items) => items.get(*self),
            Value::Mapping(map) => {
                let key = Value::Int(i64::try_from(*self).ok()?);
                map.get(&key)
            }
            _ => None,
        }
    }
}

impl ValueIndex for str {
    fn index_into<'v>(&self, v: &'v Value) -> Option<&'v Value> {
        match v {
            Value::Mapping(map) => map.get(&StrProbe(self)),
            _ => None,
        }
    }
}

impl ValueIndex for String {
    fn index_into<'v>(&self, v: &'v Value) -> Option<&'v Value> {
        self.as_str().index_into(v)
    }
}

impl ValueIndex for Value {
    fn index_into<'v>(&self, v: &'v Value) -> Option<&'v Value> {
        match v {
            Value::Mapping(map) => map.get(self),
            Value::Sequence(items) => {
                let idx = usize::try_from(self.as_i64()?).ok()?;
                items.get(idx)
            }
            _ => None,
        }
    }
}

impl<T: ?Sized + ValueIndex> ValueIndex for &T {
    fn index_into<'v>(&self, v: &'v Value) -> Option<&'v Value> {
        (**self).index_into(v)
    }
}

static NULL: Value = Value::Null;

/// Missing entries index to `Value::Null`, like `serde_json`.
impl<I: ValueIndex> Index<I> for Value {
    type Output = Value;

    fn index(&self, index: I) -> &Value {
        self.get(index).unwrap_or(&NULL)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Mapping(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
            Value::Tagged(tagged) => tagged.value.serialize(serializer),
            Value::Key(key) => key.value().serialize(serializer),
            Value::Opaque(_) => Err(S::Error::custom("opaque handler value cannot be serialized")),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

macro_rules! from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Sequence(v.into_iter().map(Into::into).collect())
    }
}

impl From<Mapping> for Value {
    fn from(v: Mapping) -> Self {
        Value::Mapping(v)
    }
}

impl From<Tagged> for Value {
    fn from(v: Tagged) -> Self {
        Value::Tagged(Box::new(v))
    }
}

impl From<MappingKey> for Value {
    fn from(v: MappingKey) -> Self {
        Value::Key(v)
    }
}

impl From<Opaque> for Value {
    fn from(v: Opaque) -> Self {
        Value::Opaque(v)
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Value::Sequence(iter.into_iter().collect())
    }
}

impl<K: Into<Value>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Mapping(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(v: &Value) -> u64 {
        let mut h = DefaultHasher::new();
        v.hash(&mut h);
        h.finish()
    }

    fn map(entries: &[(&str, i64)]) -> Value {
        entries.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn mapping_equality_ignores_order() {
        let a = map(&[("a", 1), ("b", 2)]);
        let b = map(&[("b", 2), ("a", 1)]);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn sequence_equality_respects_order() {
        let a = Value::from(vec![1, 2]);
        let b = Value::from(vec![2, 1]);
        assert_ne!(a, b);
    }

    #[test]
    fn floats_compare_canonically() {
        assert_eq!(Value::Float(f64::NAN), Value::Float(-f64::NAN));
        assert_eq!(Value::Float(-0.0), Value::Float(0.0));
        assert_eq!(hash_of(&Value::Float(-0.0)), hash_of(&Value::Float(0.0)));
        assert_ne!(Value::Float(1.0), Value::Int(1));
    }

    #[test]
    fn key_equals_wrapped_value() {
        let seq = Value::from(vec!["a", "b"]);
        let key = Value::key(seq.clone());
        assert_eq!(key, seq);
        assert_eq!(hash_of(&key), hash_of(&seq));
    }

    #[test]
    fn tagged_equality_needs_same_tag() {
        assert_eq!(Value::tagged("x", "!!str"), Value::tagged("x", "tag:yaml.org,2002:str"));
        assert_ne!(Value::tagged("x", "!a"), Value::tagged("x", "!b"));
        assert_ne!(Value::tagged("x", "!a"), Value::from("x"));
    }

    #[test]
    fn opaque_compares_by_identity() {
        let a = Value::opaque(5u8);
        let b = Value::opaque(5u8);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        let Value::Opaque(inner) = &a else { unreachable!() };
        assert_eq!(inner.downcast_ref::<u8>(), Some(&5));
    }

    #[test]
    fn indexing() {
        let v: Value = [
            (Value::from("foo"), Value::Int(1)),
            (Value::Int(2), Value::from("bar")),
        ]
        .into_iter()
        .collect();
        assert_eq!(v["foo"], Value::Int(1));
        assert_eq!(v[2], Value::from("bar"));
        assert_eq!(v[&Value::Int(2)], Value::from("bar"));
        assert!(v["missing"].is_null());
        let seq = Value::from(vec![10, 20]);
        assert_eq!(seq[1], Value::Int(20));
        assert_eq!(seq.get(5), None);
    }

    #[test]
    fn tagged_collections_are_indexable() {
        let v = Value::tagged(map(&[("bar", 1)]), "!foo");
        assert_eq!(v["bar"], Value::Int(1));
        assert!(v.is_collection());
        assert!(!Value::tagged("s", "!foo").is_collection());
    }

    #[test]
    fn serializes_through_serde() {
        let v: Value = [
            (Value::from("name"), Value::tagged("app", "!upper")),
            (Value::from("ports"), Value::from(vec![80, 443])),
        ]
        .into_iter()
        .collect();
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, r#"{"name":"app","ports":[80,443]}"#);
        assert!(serde_json::to_string(&Value::opaque(1u8)).is_err());
    }
}
