use jpatch_core::{Node, PatchDocument, Pointer};

#[test]
fn jpatch_core_readme_example() -> Result<(), Box<dyn std::error::Error>> {
    let doc = Node::from_json_str(r#"{"foo":"bar"}"#)?;
    let patch = PatchDocument::from_json_str(
        r#"[{"op":"add","path":"/baz","value":"qux"},{"op":"test","path":"/foo","value":"bar"}]"#,
    )?;
    assert_eq!(patch.len(), 2);

    let patched = doc.apply_patch(&patch)?;
    assert_eq!(patched.to_json_string(), r#"{"baz":"qux","foo":"bar"}"#);

    let baz = patched.lookup(&Pointer::parse("/baz")?)?;
    assert_eq!(baz, &Node::from("qux"));
    Ok(())
}
