use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use yaml12::{Error, MappingKey, TagHandlers, Value, parse, parse_with_handlers};

fn first_key(doc: &Value) -> &Value {
    doc.as_mapping()
        .and_then(|map| map.keys().next())
        .expect("non-empty mapping")
}

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn sequence_key_becomes_mapping_key() {
    let doc = parse("? [a, b, c]\n: 1\n").unwrap();

    let key = first_key(&doc).as_key().expect("composite key");
    assert_eq!(key.value(), &Value::from(vec!["a", "b", "c"]));
    let items: Vec<&str> = key.iter().filter_map(Value::as_str).collect();
    assert_eq!(items, ["a", "b", "c"]);
    assert_eq!(key[1].as_str(), Some("b"));
    assert_eq!(key.len(), 3);

    let probe = Value::Key(MappingKey::new(Value::from(vec!["a", "b", "c"])));
    assert_eq!(doc[&probe], Value::Int(1));
    // An unwrapped sequence finds the same entry.
    assert_eq!(doc[&Value::from(vec!["a", "b", "c"])], Value::Int(1));
}

#[test]
fn mapping_key_becomes_mapping_key() {
    let doc = parse("? {foo: 1, bar: [2]}\n: value\n").unwrap();

    let key = first_key(&doc).as_key().expect("composite key");
    assert!(key.value().as_mapping().is_some());
    assert_eq!(key.value()["foo"], Value::Int(1));
    assert_eq!(key["foo"], Value::Int(1));
    let names: Vec<&str> = key.into_iter().filter_map(Value::as_str).collect();
    assert_eq!(names, ["foo", "bar"]);

    let probe: Value = [("foo", Value::Int(1)), ("bar", Value::from(vec![2]))]
        .into_iter()
        .collect();
    assert_eq!(doc[&Value::key(probe)].as_str(), Some("value"));
}

#[test]
fn scalar_keys_stay_plain() {
    let doc = parse("foo: 1\n2: bar").unwrap();

    assert_eq!(doc["foo"], Value::Int(1));
    assert_eq!(doc[2], Value::from("bar"));
    let map = doc.as_mapping().unwrap();
    assert!(map.keys().all(|k| k.as_key().is_none()));
    assert_eq!(map.keys().nth(1), Some(&Value::Int(2)));
}

#[test]
fn handler_returning_mapping_is_wrapped() {
    let handlers = TagHandlers::<Error>::new().with("!wrap", |tagged| {
        Ok([("key", tagged.into_value())].into_iter().collect())
    });
    let doc = parse_with_handlers("? !wrap foo\n: bar", &handlers).unwrap();

    let key = first_key(&doc).as_key().expect("handler output used as key is wrapped");
    let expected: Value = [("key", "foo")].into_iter().collect();
    assert_eq!(key.value(), &expected);
    assert_eq!(doc[&Value::key(expected)].as_str(), Some("bar"));
}

#[test]
fn mapping_key_survives_format_and_parse() {
    let inner: Value = [("foo", Value::from(vec![1, 2]))].into_iter().collect();
    let original: Value = [(Value::key(inner.clone()), Value::from("value"))]
        .into_iter()
        .collect();

    let encoded = yaml12::format(&original).unwrap();
    let reparsed = parse(&encoded).unwrap();

    let key = first_key(&reparsed).as_key().expect("composite key after reparse");
    assert_eq!(key.value(), &inner);
    assert_eq!(reparsed, original);
}

#[test]
fn tagged_mapping_key_delegates_to_inner_value() {
    let doc = parse("? !foo {bar: 1}\n: baz\n").unwrap();

    let key = first_key(&doc).as_key().expect("composite key");
    let tagged = key.value().as_tagged().expect("tag kept on the key");
    assert_eq!(tagged.tag(), "!foo");
    let expected: Value = [("bar", 1)].into_iter().collect();
    assert_eq!(tagged.value(), &expected);
    assert_eq!(key["bar"], Value::Int(1));
    assert_eq!(key.iter().collect::<Vec<_>>(), [&Value::from("bar")]);

    let probe = Value::Key(MappingKey::new(key.value().clone()));
    assert_eq!(doc[&probe].as_str(), Some("baz"));
}

#[test]
fn mapping_keys_hash_by_structure() {
    let k1 = MappingKey::new([("b", 2), ("a", 1)].into_iter().collect());
    let k2 = MappingKey::new([("a", 1), ("b", 2)].into_iter().collect());

    assert_eq!(k1, k2);
    assert_eq!(hash_of(&k1), hash_of(&k2));
    assert_eq!(hash_of(&Value::Key(k1.clone())), hash_of(k1.value()));
}

#[test]
fn collection_values_stay_plain() {
    let doc = parse("top:\n  - [1, 2]\n  - {foo: bar}\n").unwrap();

    let items = &doc["top"];
    assert_eq!(items[0], Value::from(vec![1, 2]));
    assert!(items[0].as_key().is_none());
    let inner = items[1].as_mapping().expect("plain mapping");
    assert!(inner.keys().all(|k| k.as_key().is_none()));
}

#[test]
fn keys_equal_by_structure_are_duplicates() {
    let err = parse("? [1, 2]\n: a\n? [1, 2]\n: b\n").unwrap_err();
    assert!(matches!(err.without_snippet(), Error::Compose { .. }), "{err}");

    let err = parse("? {x: 1, y: 2}\n: a\n? {y: 2, x: 1}\n: b\n").unwrap_err();
    assert!(matches!(err.without_snippet(), Error::Compose { .. }), "{err}");
}
