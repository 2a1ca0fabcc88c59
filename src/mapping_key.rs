use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Index;

use serde::{Serialize, Serializer};

use crate::fingerprint::digest;
use crate::value::{Value, ValueIndex};

/// A sequence- or mapping-shaped value used as a mapping key.
///
/// The wrapper is read-only: lookups, iteration and length delegate to the wrapped value,
/// looking through one level of [`Tagged`](crate::Tagged). Equality is structural and the
/// hash is computed once, at construction.
///
/// ```rust
/// use yaml12::{MappingKey, Value};
///
/// let doc = yaml12::parse("? [a, b, c]\n: found\n").unwrap();
/// let probe = MappingKey::new(Value::from(vec!["a", "b", "c"]));
/// assert_eq!(doc[&Value::Key(probe.clone())].as_str(), Some("found"));
/// assert_eq!(probe.len(), 3);
/// assert_eq!(probe[1].as_str(), Some("b"));
/// ```
#[derive(Clone)]
pub struct MappingKey {
    value: Box<Value>,
    digest: u64,
}

impl MappingKey {
    /// Wrap `value`. An already wrapped key is not wrapped twice.
    pub fn new(value: Value) -> Self {
        let value = match value {
            Value::Key(key) => return key,
            other => other,
        };
        let digest = digest(&value);
        Self {
            value: Box::new(value),
            digest,
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        *self.value
    }

    pub(crate) fn digest(&self) -> u64 {
        self.digest
    }

    /// Element at a sequence position, or the value under a mapping key.
    pub fn get<I: ValueIndex>(&self, index: I) -> Option<&Value> {
        self.value.get(index)
    }

    /// Number of elements or entries; `0` when the wrapped value is not a collection.
    pub fn len(&self) -> usize {
        match self.value.indexable() {
            Some(Value::Sequence(items)) => items.len(),
            Some(Value::Mapping(map)) => map.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sequence elements, or mapping keys.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &Value> + '_> {
        match self.value.indexable() {
            Some(Value::Sequence(items)) => Box::new(items.iter()),
            Some(Value::Mapping(map)) => Box::new(map.keys()),
            _ => Box::new(std::iter::empty()),
        }
    }
}

impl PartialEq for MappingKey {
    fn eq(&self, other: &Self) -> bool {
        self.digest == other.digest && self.value == other.value
    }
}

impl Eq for MappingKey {}

impl Hash for MappingKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.digest);
    }
}

impl fmt::Debug for MappingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MappingKey").field(&self.value).finish()
    }
}

impl<I: ValueIndex> Index<I> for MappingKey {
    type Output = Value;

    fn index(&self, index: I) -> &Value {
        &self.value[index]
    }
}

impl<'a> IntoIterator for &'a MappingKey {
    type Item = &'a Value;
    type IntoIter = Box<dyn Iterator<Item = &'a Value> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Serialize for MappingKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}
