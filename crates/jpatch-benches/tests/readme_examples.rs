use jpatch_benches::available_corpora;
use jpatch_core::Pointer;

#[test]
fn jpatch_benches_readme_example() -> Result<(), Box<dyn std::error::Error>> {
    let corpus =
        available_corpora().iter().find(|c| c.name() == "nested-config").expect("registered corpus");
    let dataset = corpus.load()?;
    assert_eq!(dataset.patch().len(), 5);

    let patched = dataset.document().apply_patch(dataset.patch())?;
    let copied = patched.lookup(&Pointer::parse("/items/1")?)?;
    println!("{}", patched.to_json_string());
    assert_eq!(copied.to_json_string(), "9");
    assert!(patched.lookup(&Pointer::parse("/sibling")?).is_err());
    Ok(())
}
