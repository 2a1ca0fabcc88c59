use yaml12::{Error, TagHandlers, parse, parse_with_options};

#[test]
fn scan_errors_carry_location_and_snippet() {
    let text = "a: 1\nb: [1, 2\nc: 3\n";
    let err = parse(text).unwrap_err();

    assert!(matches!(err, Error::WithSnippet { .. }), "{err:?}");
    assert!(matches!(err.without_snippet(), Error::Scan { .. }));
    let location = err.location().expect("scan errors are located");
    assert!(location.line() >= 2, "{location:?}");

    let rendered = err.to_string();
    assert!(rendered.contains("<input>"), "{rendered}");
    assert!(rendered.contains('^'), "{rendered}");
}

#[test]
fn duplicate_key_points_at_second_key() {
    let err = parse("first: 1\nsecond: 2\nfirst: 3\n").unwrap_err();
    let location = err.location().unwrap();
    assert_eq!((location.line(), location.column()), (3, 1));

    let rendered = err.to_string();
    assert!(rendered.contains("duplicate mapping key"), "{rendered}");
    assert!(rendered.contains("first: 3"), "{rendered}");
}

#[test]
fn snippets_can_be_disabled() {
    let handlers = TagHandlers::<Error>::new();

    let options = yaml12::options! { with_snippet: false };
    let err = parse_with_options("a: !!int x\n", &handlers, options).unwrap_err();
    assert!(matches!(err, Error::Compose { .. }), "{err:?}");
    assert!(
        err.to_string()
            .starts_with("invalid value `x` for tag `tag:yaml.org,2002:int` at line 1"),
        "{err}"
    );

    let options = yaml12::options! { crop_radius: 0 };
    let err = parse_with_options("a: !!int x\n", &handlers, options).unwrap_err();
    assert!(matches!(err, Error::Compose { .. }), "{err:?}");
}

#[test]
fn errors_without_location_are_not_decorated() {
    let err = parse("--- 1\n--- 2\n").unwrap_err();
    assert!(err.location().is_none());
    assert_eq!(
        err.to_string(),
        "expected a single YAML document, found 2; use parse_multi"
    );
}

#[test]
fn io_errors_surface_as_io() {
    let handlers = TagHandlers::<Error>::new();
    let err = yaml12::read("/definitely/not/here.yaml", &handlers).unwrap_err();
    match err {
        Error::Io { cause } => assert_eq!(cause.kind(), std::io::ErrorKind::NotFound),
        other => panic!("expected Io, got {other:?}"),
    }
}

#[test]
fn reader_decodes_utf16_big_endian() {
    let mut bytes = vec![0xFE, 0xFF];
    for unit in "k: [1, 2]\n".encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    let doc = yaml12::from_reader(bytes.as_slice(), &TagHandlers::<Error>::new()).unwrap();
    assert_eq!(doc["k"][1].as_i64(), Some(2));
}

#[test]
fn error_is_std_error() {
    let err: Box<dyn std::error::Error + Send + Sync> = Box::new(parse("[").unwrap_err());
    assert!(err.source().is_some());
}
