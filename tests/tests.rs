use std::env;

use strata::*;

mod common;
use common::*;

#[test]
fn instantiation() -> Result<(), StrataError> {
    let text = setup_example_1()?;
    assert_eq!(text.len(), 27);
    assert_eq!(text.layer_names().collect::<Vec<_>>(), vec!["morph_analysis", "sentences", "words"]);
    let sorted: Vec<&str> = text.sorted_layers().iter().map(|layer| layer.name()).collect();
    assert_eq!(sorted, vec!["words", "morph_analysis", "sentences"]);
    assert_eq!(text.layer("words").unwrap().len(), 6);
    assert_eq!(text.layer("sentences").unwrap().span_level(), Some(1));
    Ok(())
}

#[test]
fn add_annotation_ambiguity() -> Result<(), StrataError> {
    let mut layer = Layer::new("test", ["x"]).build()?;
    layer.add_annotation((0, 3), AnnotationBuilder::new().with_attribute("x", 1))?;
    let result = layer.add_annotation((0, 3), AnnotationBuilder::new().with_attribute("x", 1));
    assert!(matches!(result, Err(StrataError::DuplicateSpan(..))));
    assert_eq!(layer.len(), 1);

    let mut layer = Layer::new("test", ["x"]).with_ambiguous(true).build()?;
    layer.add_annotation((0, 3), AnnotationBuilder::new().with_attribute("x", 1))?;
    layer.add_annotation((0, 3), AnnotationBuilder::new().with_attribute("x", 1))?;
    assert_eq!(layer.len(), 1);
    let span = layer.get((0, 3))?.and_then(|selection| selection.as_span()).unwrap();
    assert_eq!(span.annotations().len(), 2);
    Ok(())
}

#[test]
fn spans_are_sorted() -> Result<(), StrataError> {
    let mut layer = Layer::new("test", ["x"]).build()?;
    for (start, end) in [(5, 7), (0, 7), (0, 4), (2, 3)] {
        layer.add_annotation((start, end), AnnotationBuilder::new())?;
    }
    let locations: Vec<(usize, usize)> = layer.iter().map(|span| (span.start(), span.end())).collect();
    assert_eq!(locations, vec![(0, 4), (0, 7), (2, 3), (5, 7)]);
    assert!(layer.check_span_consistency().is_none());
    Ok(())
}

#[test]
fn schema_closure() -> Result<(), StrataError> {
    let mut layer = Layer::new("test", ["lemma", "partofspeech"])
        .with_default_value("partofspeech", "S")
        .build()?;
    let annotation = layer.add_annotation(
        (0, 4),
        AnnotationBuilder::new()
            .with_attribute("lemma", "mees")
            .with_attribute("unknown", 1),
    )?;
    assert_eq!(annotation.keys().collect::<Vec<_>>(), vec!["lemma", "partofspeech"]);
    assert_eq!(annotation.get("partofspeech"), Some(&AnnotationValue::from("S")));
    assert!(annotation.get("unknown").is_none());

    let unset = layer.add_annotation((5, 8), AnnotationBuilder::new())?;
    assert_eq!(unset.get("lemma"), Some(&AnnotationValue::Null));
    Ok(())
}

#[test]
fn layer_schema_validation() {
    assert!(Layer::new("1words", ["x"]).build().is_err());
    assert!(Layer::new("words", ["x", "x"]).build().is_err());
    assert!(Layer::new("words", ["x-y"]).build().is_err());
    assert!(Layer::new("words", ["x"])
        .with_secondary_attributes(["y"])
        .build()
        .is_err());
    assert!(Layer::new("words", ["x"])
        .with_parent("a")
        .with_enveloping("b")
        .build()
        .is_err());
    assert!(Layer::new("words", ["x"])
        .with_default_value("y", 1)
        .build()
        .is_err());
}

#[test]
fn location_type_is_checked() -> Result<(), StrataError> {
    let text = setup_example_1()?;
    let mut sentences = text.layer("sentences").unwrap().empty_copy();
    assert!(matches!(
        sentences.add_annotation((0, 14), AnnotationBuilder::new()),
        Err(StrataError::TypeMismatch(..))
    ));
    let mut words = text.layer("words").unwrap().empty_copy();
    assert!(matches!(
        words.add_annotation([(0, 7), (8, 13)], AnnotationBuilder::new()),
        Err(StrataError::TypeMismatch(..))
    ));
    Ok(())
}

#[test]
fn get_on_empty_layer() -> Result<(), StrataError> {
    let layer = Layer::new("test", ["x"]).build()?;
    assert!(layer.get((0, 3))?.is_none());
    Ok(())
}

#[test]
fn get_by_enveloping_location() -> Result<(), StrataError> {
    let text = setup_example_1()?;
    let words = text.layer("words").unwrap();
    assert!(words.get((0, 3))?.is_none());
    let word = words.get((8, 13))?.and_then(|selection| selection.as_span()).unwrap();
    assert_eq!(word.base_span(), &(8, 13).to_base_span()?);

    let sentence = text.layer("sentences").unwrap().span_by_index(1).unwrap();
    let selection = words.get(sentence.base_span())?.unwrap();
    let snapshot = selection.into_layer().unwrap();
    assert_eq!(snapshot.len(), 3);
    assert_eq!(snapshot.text(&text)?, vec!["Teine", "lause", "."]);
    Ok(())
}

#[test]
fn select_and_filter() -> Result<(), StrataError> {
    let text = setup_example_1()?;
    let morph = text.layer("morph_analysis").unwrap();
    let selected = morph.select(&[1, 3])?;
    assert_eq!(selected.text(&text)?, vec!["lause", "Teine"]);
    let ambiguous = morph.filter(|span| span.annotations().len() > 1)?;
    assert_eq!(ambiguous.len(), 1);
    assert_eq!(ambiguous.text(&text)?, vec!["Teine"]);
    Ok(())
}

#[test]
fn layer_text() -> Result<(), StrataError> {
    let text = setup_example_1()?;
    let words = text.layer("words").unwrap();
    assert_eq!(
        words.text(&text)?,
        vec!["Esimene", "lause", ".", "Teine", "lause", "."]
    );
    let sentences = text.layer("sentences").unwrap();
    assert_eq!(sentences.enclosing_text(&text)?, EXAMPLE_1);
    let first = sentences.span_by_index(0).unwrap();
    assert_eq!(text.enclosing_text(first.base_span())?, "Esimene lause.");
    Ok(())
}

#[test]
fn navigate_dependencies() -> Result<(), StrataError> {
    let text = setup_example_1()?;
    let morph = text.layer("morph_analysis").unwrap();
    let span = morph.span_by_index(3).unwrap();
    let parent = text.parent_span(morph, span).unwrap();
    assert_eq!(text.slice(parent.start(), parent.end())?, "Teine");

    let sentences = text.layer("sentences").unwrap();
    let words = text.sub_spans(sentences, sentences.span_by_index(0).unwrap())?;
    assert_eq!(words.len(), 3);
    assert!(text.sub_spans(morph, span).is_err());

    assert_eq!(
        text.layer_dependencies("sentences", false).into_iter().collect::<Vec<_>>(),
        vec!["words".to_string()]
    );
    assert_eq!(
        text.layer_dependencies("words", true).into_iter().collect::<Vec<_>>(),
        vec!["morph_analysis".to_string(), "sentences".to_string()]
    );
    Ok(())
}

#[test]
fn add_layer_dependencies() -> Result<(), StrataError> {
    let mut text = Text::new("Tere!");
    let morph = Layer::new("morph", ["lemma"]).with_parent("words").build()?;
    assert!(matches!(text.add_layer(morph), Err(StrataError::DependencyError(..))));
    let words = Layer::new("words", Vec::<String>::new()).build()?;
    text.add_layer(words.clone())?;
    assert!(matches!(text.add_layer(words), Err(StrataError::DependencyError(..))));
    let relations = RelationLayer::new("words", ["a"], Vec::<String>::new()).build()?;
    assert!(matches!(
        text.add_relation_layer(relations),
        Err(StrataError::DependencyError(..))
    ));
    Ok(())
}

#[test]
fn pop_layer_cascading() -> Result<(), StrataError> {
    let mut text = setup_example_1()?;
    let words = text.pop_layer("words", true)?;
    assert_eq!(words.len(), 6);
    assert_eq!(text.layer_names().count(), 0);
    assert!(matches!(text.pop_layer("words", false), Err(StrataError::NotFound(..))));

    let mut text = setup_example_1()?;
    text.pop_layer("morph_analysis", false)?;
    assert_eq!(text.layer_names().collect::<Vec<_>>(), vec!["sentences", "words"]);
    Ok(())
}

#[test]
fn remove_and_clear_spans() -> Result<(), StrataError> {
    let mut text = setup_example_1()?;
    let sentences = text.layer_mut("sentences").unwrap();
    let removed = sentences.remove_span([(0, 7), (8, 13), (13, 14)])?;
    assert_eq!(removed.annotations().len(), 1);
    assert_eq!(sentences.len(), 1);
    assert!(sentences.remove_span([(0, 7)]).is_err());
    sentences.clear_spans();
    assert!(sentences.is_empty());
    assert_eq!(sentences.span_level(), Some(1));
    Ok(())
}

#[test]
fn layer_diff() -> Result<(), StrataError> {
    let text = setup_example_1()?;
    let words = text.layer("words").unwrap();
    let copy = words.clone();
    assert!(words.diff(&copy).is_none());
    assert_eq!(words, &copy);

    let other = Layer::new("tokens", ["normalized_form"]).build()?;
    assert_eq!(
        words.diff(&other),
        Some("Layer names are different: words!=tokens".to_string())
    );

    let mut fewer = words.clone();
    fewer.remove_span((0, 7))?;
    assert_eq!(words.diff(&fewer), Some("words layer spans differ".to_string()));

    let mut changed = setup_example_1()?;
    changed.meta_mut().clear();
    assert_eq!(text.diff(&changed), Some("Different metadata.".to_string()));
    Ok(())
}

#[test]
fn secondary_attributes_are_ignored_in_comparison() -> Result<(), StrataError> {
    let build = |value: &str| -> Result<Layer, StrataError> {
        let mut layer = Layer::new("test", ["lemma", "note"])
            .with_secondary_attributes(["note"])
            .build()?;
        layer.add_annotation(
            (0, 4),
            AnnotationBuilder::new()
                .with_attribute("lemma", "mees")
                .with_attribute("note", value),
        )?;
        Ok(layer)
    };
    assert!(build("a")?.diff(&build("b")?).is_none());
    Ok(())
}

#[test]
fn attribute_values() -> Result<(), StrataError> {
    let text = setup_example_1()?;
    let morph = text.layer("morph_analysis").unwrap();
    match morph.attribute_values(&["lemma"], &[], None)? {
        AttributeTable::AmbiguousList(values) => {
            assert_eq!(values.len(), 6);
            assert_eq!(values[3], vec![AnnotationValue::from("teine"), AnnotationValue::from("teine")]);
        }
        other => panic!("unexpected table {:?}", other),
    }
    let table = morph.attribute_values(&["lemma", "partofspeech"], &["text"], Some(&text))?;
    assert!(matches!(table, AttributeTable::AmbiguousTupleList(_)));
    assert_eq!(table.len(), 6);
    assert!(matches!(
        morph.attribute_values(&["lemma"], &["text"], None),
        Err(StrataError::MissingArgument(..))
    ));
    assert!(matches!(
        morph.attribute_values(&["form"], &[], None),
        Err(StrataError::NotFound(..))
    ));
    let csv = table.to_csv_string(&["text", "lemma", "partofspeech"])?;
    assert!(csv.starts_with("text,lemma,partofspeech\n"));
    assert!(csv.contains("Teine,teine,P"));
    Ok(())
}

#[test]
fn dict_roundtrip_layers() -> Result<(), StrataError> {
    let text = setup_example_1()?;
    for name in ["words", "morph_analysis", "sentences"] {
        let layer = text.layer(name).unwrap();
        let restored = dict_to_layer(layer_to_dict(layer), Config::default())?;
        assert_eq!(layer.diff(&restored), None);
    }
    let mut flat = Layer::new("flat", ["x"]).build()?;
    flat.add_annotation((2, 5), AnnotationBuilder::new().with_attribute("x", 1.5))?;
    let restored = dict_to_layer(layer_to_dict(&flat), Config::default())?;
    assert_eq!(flat.diff(&restored), None);
    Ok(())
}

#[test]
fn json_roundtrip_text() -> Result<(), StrataError> {
    let text = setup_example_relations()?;
    let json = text.to_json_string(&Config::default())?;
    let restored = Text::from_json_str(&json, Config::default())?;
    assert_eq!(text.diff(&restored), None);
    assert_eq!(restored.meta().get("source"), Some(&AnnotationValue::from("test")));
    Ok(())
}

#[test]
fn json_roundtrip_file() -> Result<(), StrataError> {
    let text = setup_example_clauses()?;
    let path = env::temp_dir().join("strata_json_roundtrip_file.json");
    let filename = path.to_string_lossy().to_string();
    text.to_json_file(&filename, &Config::default())?;
    let restored = Text::from_json_file(&filename, Config::default())?;
    assert_eq!(text, restored);
    std::fs::remove_file(&path).ok();
    Ok(())
}

#[test]
fn json_dependency_order_independent() -> Result<(), StrataError> {
    let text = setup_example_1()?;
    let mut dict = text_to_dict(&text);
    dict.layers.reverse();
    let restored = dict_to_text(dict, Config::default())?;
    assert_eq!(text.diff(&restored), None);
    Ok(())
}

#[test]
fn text_config_propagates() -> Result<(), StrataError> {
    let mut text = setup_example_1()?;
    text.set_config(Config::default().with_ngram_separator("_"));
    assert_eq!(text.layer("words").unwrap().config().ngram_separator(), "_");
    Ok(())
}
