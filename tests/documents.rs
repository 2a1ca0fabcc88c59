use indoc::indoc;
use yaml12::{Error, NodeKind, Options, ScalarStyle, Value, compose, parse, parse_multi};

#[test]
fn empty_streams() {
    assert_eq!(parse("").unwrap(), Value::Null);
    assert_eq!(parse("# comment only\n\n").unwrap(), Value::Null);
    assert!(parse_multi("").unwrap().is_empty());
    assert!(parse_multi("# nothing\n").unwrap().is_empty());
}

#[test]
fn explicit_empty_document_is_null() {
    assert_eq!(parse("---\n").unwrap(), Value::Null);
    assert_eq!(parse("---\n...\n").unwrap(), Value::Null);
}

#[test]
fn several_documents() {
    let values = parse_multi(indoc! {"
        --- 1
        ---
        a: b
        ...
        ---
        - x
    "})
    .unwrap();
    assert_eq!(values.len(), 3);
    assert_eq!(values[0], Value::Int(1));
    assert_eq!(values[1]["a"].as_str(), Some("b"));
    assert_eq!(values[2], Value::from(vec!["x"]));
}

#[test]
fn single_document_entry_point_rejects_streams() {
    let err = parse("--- 1\n--- 2\n--- 3\n").unwrap_err();
    assert!(matches!(err, Error::MultipleDocuments { documents: 3 }), "{err}");
    assert!(err.to_string().contains("parse_multi"));
}

#[test]
fn anchors_do_not_cross_documents() {
    assert!(parse_multi("--- &a 1\n--- *a\n").is_err());
}

#[test]
fn each_document_checks_its_own_keys() {
    let values = parse_multi("a: 1\n---\na: 2\n").unwrap();
    assert_eq!(values[0]["a"], Value::Int(1));
    assert_eq!(values[1]["a"], Value::Int(2));
}

#[test]
fn compose_exposes_the_node_graph() {
    let docs = compose("first: &v 'one'\nsecond: *v\nthird: !x 3\n", &Options::default()).unwrap();
    assert_eq!(docs.len(), 1);
    let doc = &docs[0];

    let root = doc.node(doc.root());
    assert_eq!(root.tag, "tag:yaml.org,2002:map");
    assert!(!root.explicit_tag);
    let NodeKind::Mapping(entries) = &root.kind else {
        panic!("root is a mapping");
    };
    assert_eq!(entries.len(), 3);

    // The alias shares the anchored node.
    assert_eq!(entries[0].1, entries[1].1);
    let first = doc.node(entries[0].1);
    assert_eq!(first.tag, "tag:yaml.org,2002:str");
    assert!(first.anchor.is_some());
    assert_eq!(
        first.kind,
        NodeKind::Scalar {
            value: "one".into(),
            style: ScalarStyle::SingleQuoted
        }
    );
    assert_eq!(first.location.line(), 1);

    let third = doc.node(entries[2].1);
    assert_eq!(third.tag, "!x");
    assert!(third.explicit_tag);
    assert_eq!(third.location.line(), 3);
    assert!(doc.len() >= 6);
}

#[test]
fn compose_reports_errors_with_snippets() {
    let err = compose("a: [1, 2\n", &Options::default()).unwrap_err();
    assert!(matches!(err, Error::WithSnippet { .. }), "{err:?}");
    assert!(matches!(err.without_snippet(), Error::Scan { .. }));
}
