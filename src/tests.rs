/*
    Strata (Layered Text Annotation Engine)
        Layers, spans and relations over stand-off annotated text

        Licensed under the GNU General Public License v3
*/

#[cfg(test)]
use crate::*;

#[test]
fn basespan_ordering_follows_flattened_leaves() -> StrataResult<()> {
    let a = (0, 4).to_base_span()?;
    let b = (0, 7).to_base_span()?;
    let c = (5, 7).to_base_span()?;
    assert!(a < b);
    assert!(b < c);
    let env = [(0, 4), (5, 7)].to_base_span()?;
    assert!(a < env);
    assert!(env < b);
    Ok(())
}

#[test]
fn basespan_equality_is_structural() -> StrataResult<()> {
    let flat = [(0, 2), (3, 5)].to_base_span()?;
    let nested = BaseSpan::enveloping(vec![
        [(0, 2)].to_base_span()?,
        [(3, 5)].to_base_span()?,
    ])?;
    assert_eq!(flat.flatten(), nested.flatten());
    assert_ne!(flat, nested);
    assert_eq!(flat.level(), 1);
    assert_eq!(nested.level(), 2);
    Ok(())
}

#[test]
fn basespan_mixed_levels_are_rejected() -> StrataResult<()> {
    let result = BaseSpan::enveloping(vec![(0, 2).to_base_span()?, [(3, 5)].to_base_span()?]);
    assert!(matches!(result, Err(StrataError::LevelMismatch(0, 1, _))));
    assert!(BaseSpan::enveloping(vec![]).is_err());
    assert!((4, 2).to_base_span().is_err());
    Ok(())
}

#[test]
fn basespan_reduce_to_lower_level() -> StrataResult<()> {
    let sentence = BaseSpan::enveloping(vec![
        [(0, 2), (3, 5)].to_base_span()?,
        [(6, 8)].to_base_span()?,
    ])?;
    assert_eq!(sentence.start(), 0);
    assert_eq!(sentence.end(), 8);
    let words = sentence.reduce(0)?;
    assert_eq!(words.len(), 3);
    assert_eq!(words[2], (6, 8).to_base_span()?);
    assert_eq!(sentence.reduce(2)?, vec![sentence.clone()]);
    assert!(sentence.reduce(3).is_err());
    Ok(())
}

#[test]
fn basespan_shift() -> StrataResult<()> {
    let span = [(2, 4), (5, 9)].to_base_span()?;
    assert_eq!(span.shift(3)?, [(5, 7), (8, 12)].to_base_span()?);
    assert_eq!(span.shift(-2)?, [(0, 2), (3, 7)].to_base_span()?);
    assert!(span.shift(-3).is_err());
    Ok(())
}

#[test]
fn parse_json_raw_location() -> StrataResult<()> {
    let span: BaseSpan = serde_json::from_str("[[0, 2], [3, 5]]")
        .map_err(|e| StrataError::SerializationError(e.to_string()))?;
    assert_eq!(span, [(0, 2), (3, 5)].to_base_span()?);
    let json = serde_json::to_string(&span)
        .map_err(|e| StrataError::SerializationError(e.to_string()))?;
    assert_eq!(json, "[[0,2],[3,5]]");
    assert!(serde_json::from_str::<BaseSpan>("[[0, 2], [3]]").is_err());
    Ok(())
}

#[test]
fn parse_json_annotation_values() {
    let value: AnnotationValue = serde_json::from_str("1").unwrap();
    assert_eq!(value, AnnotationValue::Int(1));
    let value: AnnotationValue = serde_json::from_str("0.5").unwrap();
    assert_eq!(value, AnnotationValue::Float(0.5));
    let value: AnnotationValue = serde_json::from_str("null").unwrap();
    assert!(value.is_null());
    let value: AnnotationValue = serde_json::from_str(r#"["a", true]"#).unwrap();
    assert_eq!(
        value,
        AnnotationValue::List(vec!["a".into(), AnnotationValue::Bool(true)])
    );
}

#[test]
fn parse_json_layer() -> StrataResult<()> {
    let json = r#"{
        "name": "words",
        "attributes": ["normalized_form"],
        "ambiguous": true,
        "meta": {"tokenizer": "simple"},
        "spans": [
            {"base_span": [0, 7], "annotations": [{"normalized_form": null}]},
            {"base_span": [8, 13], "annotations": [{"normalized_form": "lause"}, {"normalized_form": "lausu"}]}
        ]
    }"#;
    let layer = Layer::from_json_str(json, Config::default())?;
    assert_eq!(layer.name(), "words");
    assert_eq!(layer.len(), 2);
    assert!(layer.ambiguous());
    assert_eq!(layer.parent(), None);
    assert_eq!(
        layer.meta().get("tokenizer"),
        Some(&AnnotationValue::from("simple"))
    );
    let span = layer.span(&(8, 13).to_base_span()?).unwrap();
    assert_eq!(span.annotations().len(), 2);
    assert_eq!(span.values("normalized_form").len(), 2);
    assert!(layer.check_span_consistency().is_none());
    Ok(())
}

#[test]
fn parse_json_layer_schema_violation() {
    let json = r#"{
        "name": "words",
        "attributes": ["normalized_form"],
        "spans": [
            {"base_span": [0, 7], "annotations": [{"normalized_form": null}, {"normalized_form": "x"}]}
        ]
    }"#;
    assert!(matches!(
        Layer::from_json_str(json, Config::default()),
        Err(StrataError::SchemaError(..))
    ));
}

#[test]
fn parse_json_layer_error_path() {
    let json = r#"{"name": "words", "attributes": ["lemma"], "spans": [{"base_span": [0], "annotations": []}]}"#;
    match Layer::from_json_str(json, Config::default()) {
        Err(StrataError::JsonError(e, _, _)) => {
            assert!(e.path().to_string().starts_with("spans[0]"));
        }
        other => panic!("expected a json error, got {:?}", other),
    }
}

#[test]
fn layer_json_string() -> StrataResult<()> {
    let mut layer = Layer::new("words", ["lemma"]).build()?;
    layer.add_annotation((0, 4), AnnotationBuilder::new().with_attribute("lemma", "mees"))?;
    let json = layer.to_json_string(&Config::default().with_dataformat(DataFormat::Json { compact: true }))?;
    assert_eq!(
        json,
        r#"{"name":"words","attributes":["lemma"],"secondary_attributes":[],"parent":null,"enveloping":null,"ambiguous":false,"serialisation_module":null,"meta":{},"spans":[{"base_span":[0,4],"annotations":[{"lemma":"mees"}]}]}"#
    );
    Ok(())
}

#[test]
fn identifiers() {
    assert!(layer::is_identifier("morph_analysis"));
    assert!(layer::is_identifier("_x1"));
    assert!(!layer::is_identifier("1x"));
    assert!(!layer::is_identifier("a-b"));
    assert!(!layer::is_identifier(""));
}

#[test]
fn char_offsets() {
    assert_eq!(text::char_len("Tõnis ütles"), 11);
    let text = Text::new("Tõnis ütles");
    assert_eq!(text.len(), 11);
    assert_eq!(text.slice(6, 11).unwrap(), "ütles");
    assert_eq!(text.utf8byte(6).unwrap(), 7);
    assert!(text.slice(6, 12).is_err());
}

#[test]
fn strategy_from_str() {
    assert_eq!("MAX".parse::<Strategy>().unwrap(), Strategy::Max);
    assert_eq!("MIN".parse::<Strategy>().unwrap(), Strategy::Min);
    assert_eq!("ALL".parse::<Strategy>().unwrap(), Strategy::All);
    assert!("max".parse::<Strategy>().is_err());
    assert_eq!(Strategy::default().to_string(), "MAX");
}
