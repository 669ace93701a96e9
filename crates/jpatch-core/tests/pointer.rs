use jpatch_core::{escape_token, unescape_token, Pointer, PointerError};

#[test]
fn rfc6901_examples_resolve() {
    let doc = jpatch_core::Node::from_json_str(
        r#"{"foo":["bar","baz"],"":0,"a/b":1,"c%d":2,"e^f":3,"g|h":4,"i\\j":5,"k\"l":6," ":7,"m~n":8}"#,
    )
    .unwrap();
    let cases = [
        ("/foo/0", "\"bar\""),
        ("/a~1b", "1"),
        ("/c%d", "2"),
        ("/e^f", "3"),
        ("/g|h", "4"),
        ("/i\\j", "5"),
        ("/k\"l", "6"),
        ("/ ", "7"),
        ("/m~0n", "8"),
    ];
    for (raw, expected) in cases {
        let pointer = Pointer::parse(raw).unwrap();
        let found = doc.lookup(&pointer).unwrap();
        assert_eq!(found.to_json_string(), expected, "{raw}");
    }
    assert_eq!(doc.lookup(&Pointer::root()).unwrap(), &doc);
}

#[test]
fn syntax_errors() {
    assert_eq!(
        Pointer::parse("a/b").unwrap_err(),
        PointerError::MissingDelimiter { raw: "a/b".into() }
    );
    assert_eq!(
        Pointer::parse("/a//c").unwrap_err(),
        PointerError::EmptyReferenceToken { raw: "/a//c".into() }
    );
    assert!(Pointer::parse("/").is_err());
}

#[test]
fn tokens_are_never_reinterpreted_at_parse_time() {
    let pointer: Pointer = "/0/-/01".parse().unwrap();
    assert_eq!(pointer.tokens(), ["0", "-", "01"]);
}

#[test]
fn escape_helpers_are_inverse() {
    for token in ["", "plain", "a/b", "~", "~1", "/~0/"] {
        assert_eq!(unescape_token(&escape_token(token)), token);
    }
}

#[test]
fn display_shows_raw_value() {
    let pointer = Pointer::parse("/a~1b/c").unwrap();
    assert_eq!(pointer.to_string(), "/a~1b/c");
    assert_eq!(pointer.last(), Some("c"));
}
