use indoc::indoc;
use yaml12::{Mapping, Value, format, format_multi, parse, parse_multi};

fn assert_round_trip(value: &Value) {
    let text = format(value).unwrap_or_else(|e| panic!("{value:?}: {e}"));
    let back = parse(&text).unwrap_or_else(|e| panic!("{text}\n{e}"));
    assert_eq!(&back, value, "emitted:\n{text}");
}

fn assert_text_round_trip(text: &str) {
    let value = parse(text).unwrap();
    assert_round_trip(&value);
}

#[test]
fn documents_round_trip() {
    let docs = [
        indoc! {"
            name: app
            version: 3
            ratio: 0.75
            enabled: true
            owner: ~
            tags: [a, b, c]
            nested:
              deep:
                deeper: [1, [2, [3]]]
        "},
        "- 1\n- two\n- 3.5\n- null\n- false\n- []\n- {}\n",
        "? [a, b]\n: 1\n? {x: 1, y: [2]}\n: two\n",
        "!foo 001",
        "a: !local {x: 1}\nb: !<tag:example.com,2024:v> [1, 2]\nc: ! text\n",
        "? !point {x: 1}\n: origin\n",
        "[.inf, -.inf, .nan, -0.0, 1e300, 4e-6]",
        "0x10: hex\n-1: neg\n1.5: float\nnull: none\ntrue: yes\n",
        "'': empty\n' padded ': x\n'#hash': y\n'a: b': z\n",
    ];
    for text in docs {
        assert_text_round_trip(text);
    }
}

#[test]
fn strings_that_need_quoting_round_trip() {
    let strings = [
        "", " ", "true", "False", "null", "~", "12", "-7", "0x1F", "1e3", ".inf", ".NaN",
        "- item", "? q", ": c", "key: value", "trailing:", "a #comment", "#start", "&anchor",
        "*alias", "!tag", "|literal", ">folded", "'single'", "\"double\"", "%directive",
        "@at", "`tick", "[flow]", "{flow}", "a, b", "---", "...", " leading", "trailing ",
        "line\nbreak", "tab\there", "back\\slash", "bell\u{7}", "nel\u{85}", "sep\u{2028}",
        "\u{FEFF}bom", "ünïcödé", "日本語", "emoji 🎉",
    ];
    for s in strings {
        assert_round_trip(&Value::from(s));
        let as_key: Value = [(s, 1)].into_iter().collect();
        assert_round_trip(&as_key);
    }
}

#[test]
fn numbers_round_trip() {
    for i in [0, 1, -1, 42, i64::MAX, i64::MIN] {
        assert_round_trip(&Value::Int(i));
    }
    for f in [0.0, -0.0, 1.0, -2.5, 0.1, 1e-7, 1.7976931348623157e308, f64::MIN_POSITIVE, f64::NAN, f64::INFINITY] {
        assert_round_trip(&Value::Float(f));
    }
}

#[test]
fn composite_keys_round_trip() {
    let seq_key = Value::key(vec!["a", "b"]);
    let map_key = Value::key([("x", 1), ("y", 2)].into_iter().collect::<Value>());
    let tagged_key = Value::key(Value::tagged([("k", "v")].into_iter().collect::<Value>(), "!t"));
    let empty_key = Value::key(Value::Sequence(Vec::new()));
    let value: Value = [
        (seq_key, Value::Int(1)),
        (map_key, Value::from(vec![1, 2])),
        (tagged_key, [("inner", true)].into_iter().collect()),
        (empty_key, Value::Null),
    ]
    .into_iter()
    .collect();
    assert_round_trip(&value);
}

#[test]
fn tagged_values_round_trip() {
    let point: Value = [("x", 1), ("y", 2)].into_iter().collect();
    let value = Value::from(vec![
        Value::tagged("001", "!foo"),
        Value::tagged("", "!empty"),
        Value::tagged("a: b", "!quoted"),
        Value::tagged("text", "!"),
        Value::tagged(point.clone(), "!point"),
        Value::tagged(Value::from(vec![1]), "tag:example.com,2024:list"),
        Value::tagged(Value::Sequence(Vec::new()), "!none"),
    ]);
    assert_round_trip(&value);
    assert_round_trip(&Value::tagged(point, "!point"));
}

#[test]
fn tagged_non_string_scalars_reload_as_text() {
    let value = Value::tagged(5, "!n");
    let text = format(&value).unwrap();
    assert_eq!(text, "!n 5\n");
    assert_eq!(parse(&text).unwrap(), Value::tagged("5", "!n"));
}

#[test]
fn long_keys_round_trip() {
    let key = "k".repeat(2000);
    let value: Value = [(key.as_str(), "v")].into_iter().collect();
    let text = format(&value).unwrap();
    assert!(text.starts_with("? "), "{text}");
    assert_eq!(parse(&text).unwrap(), value);
}

#[test]
fn mapping_order_is_preserved_on_output() {
    let value = parse("z: 1\na: 2\nm: 3\n").unwrap();
    assert_eq!(format(&value).unwrap(), "z: 1\na: 2\nm: 3\n");
    let reordered = parse("a: 2\nm: 3\nz: 1\n").unwrap();
    assert_eq!(value, reordered);
}

#[test]
fn multi_document_streams_round_trip() {
    let values = vec![
        Value::Null,
        [("a", 1)].into_iter().collect(),
        Value::from(vec!["x", "y"]),
        Value::tagged([("k", 1)].into_iter().collect::<Value>(), "!doc"),
        Value::from("last"),
    ];
    let text = format_multi(&values).unwrap();
    assert_eq!(parse_multi(&text).unwrap(), values);
}

#[test]
fn deep_nesting_round_trips() {
    let mut value = Value::from("leaf");
    for depth in 0..40 {
        value = if depth % 2 == 0 {
            Value::from(vec![value])
        } else {
            let mut map = Mapping::default();
            map.insert(Value::from("k"), value);
            Value::Mapping(map)
        };
    }
    assert_round_trip(&value);
}
