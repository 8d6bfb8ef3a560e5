use strata::*;

mod common;
use common::*;

fn locations<'a>(spans: impl IntoIterator<Item = &'a Span>) -> Vec<(usize, usize)> {
    spans.into_iter().map(|span| (span.start(), span.end())).collect()
}

#[test]
fn consecutive_spans() -> Result<(), StrataError> {
    let text = setup_example_1()?;
    let words = text.layer("words").unwrap();
    assert_eq!(iterate_consecutive_spans(words, &text, 1, any_gap)?.count(), 5);
    let touching: Vec<(usize, usize)> = iterate_touching_spans(words, &text)?
        .map(|pair| pair.map(|(a, b)| (a.end(), b.start())))
        .collect::<Result<_, _>>()?;
    assert_eq!(touching, vec![(13, 13), (26, 26)]);
    assert_eq!(iterate_hovering_spans(words, &text, 1, 1)?.count(), 3);
    let non_empty_gaps = iterate_consecutive_spans(words, &text, 1, |gap: &str| !gap.is_empty())?;
    assert_eq!(non_empty_gaps.count(), 3);
    Ok(())
}

#[test]
fn consecutive_spans_skip_covered_gaps() -> Result<(), StrataError> {
    let text = Text::new("aa bb cc");
    let spans = vec![
        (0, 2).to_base_span()?,
        (3, 5).to_base_span()?,
        (6, 8).to_base_span()?,
    ];
    let pairs: Vec<(usize, usize)> = iterate_consecutive_spans(&spans, &text, 10, any_gap)?
        .map(|pair| pair.map(|(a, b)| (a.start(), b.start())))
        .collect::<Result<_, _>>()?;
    assert_eq!(pairs, vec![(0, 3), (3, 6)]);
    Ok(())
}

#[test]
fn consecutive_spans_beyond_text() -> Result<(), StrataError> {
    let text = setup_example_1()?;
    let short = Text::new("Esimene");
    let result = iterate_touching_spans(text.layer("words").unwrap(), &short);
    assert!(matches!(result, Err(StrataError::InvalidArgument(..))));
    Ok(())
}

#[test]
fn intersecting_spans() -> Result<(), StrataError> {
    let layer = setup_conflicting_layer(&[(0, 4, 0), (0, 7, 0), (5, 7, 0), (6, 9, 0)])?;
    let kinds: Vec<((usize, usize), (usize, usize), Intersection)> =
        iterate_intersecting_spans(&layer, true, true, true)
            .map(|(a, b, kind)| ((a.start(), a.end()), (b.start(), b.end()), kind))
            .collect();
    assert_eq!(
        kinds,
        vec![
            ((0, 4), (0, 7), Intersection::Nested),
            ((0, 7), (5, 7), Intersection::Nested),
            ((0, 7), (6, 9), Intersection::Overlapped),
            ((5, 7), (6, 9), Intersection::Overlapped),
        ]
    );
    assert_eq!(iterate_nested_spans(&layer).count(), 2);
    assert_eq!(iterate_overlapping_spans(&layer).count(), 2);

    let equal = vec![
        [(0, 2), (3, 5)].to_base_span()?,
        [(0, 5)].to_base_span()?,
    ];
    let found: Vec<Intersection> = iterate_intersecting_spans(&equal, false, true, false)
        .map(|(_, _, kind)| kind)
        .collect();
    assert_eq!(found, vec![Intersection::Equal]);
    Ok(())
}

#[test]
fn starting_and_ending_spans() -> Result<(), StrataError> {
    let layer = setup_conflicting_layer(&[(0, 4, 0), (0, 7, 0), (2, 3, 0), (5, 7, 0)])?;
    assert_eq!(
        locations(iterate_starting_spans(&layer)),
        vec![(0, 4), (0, 7), (2, 3)]
    );
    assert_eq!(locations(iterate_ending_spans(&layer)), vec![(0, 7), (5, 7)]);
    Ok(())
}

#[test]
fn resolve_conflicts_max() -> Result<(), StrataError> {
    let mut layer = setup_conflicting_layer(&[(0, 4, 0), (0, 7, 0), (5, 7, 0)])?;
    let mut status = ConflictStatus::default();
    resolve_conflicts(&mut layer, Strategy::Max, None, false, Some(&mut status))?;
    assert_eq!(locations(&layer), vec![(0, 7)]);
    assert_eq!(status.number_of_conflicts, 2);
    Ok(())
}

#[test]
fn resolve_conflicts_min() -> Result<(), StrataError> {
    let mut layer = setup_conflicting_layer(&[(0, 4, 0), (0, 7, 0), (5, 7, 0)])?;
    resolve_conflicts(&mut layer, Strategy::Min, None, false, None)?;
    assert_eq!(locations(&layer), vec![(0, 4), (5, 7)]);
    Ok(())
}

#[test]
fn resolve_conflicts_priority_first() -> Result<(), StrataError> {
    let mut layer = setup_conflicting_layer(&[(0, 4, 1), (0, 7, 2), (5, 7, 1)])?;
    resolve_conflicts(&mut layer, Strategy::Max, Some("priority"), false, None)?;
    assert_eq!(locations(&layer), vec![(0, 4), (5, 7)]);
    Ok(())
}

#[test]
fn resolve_conflicts_keep_equal() -> Result<(), StrataError> {
    let mut layer = setup_conflicting_layer(&[(0, 4, 0), (2, 6, 0)])?;
    resolve_conflicts(&mut layer, Strategy::All, Some("priority"), true, None)?;
    assert_eq!(layer.len(), 2);
    resolve_conflicts(&mut layer, Strategy::All, Some("priority"), false, None)?;
    assert_eq!(locations(&layer), vec![(0, 4)]);
    Ok(())
}

#[test]
fn resolve_conflicts_soundness() -> Result<(), StrataError> {
    let spans = [
        (0, 3, 2),
        (1, 5, 1),
        (2, 9, 3),
        (4, 6, 1),
        (6, 8, 2),
        (7, 12, 0),
        (10, 11, 1),
        (13, 15, 2),
    ];
    for strategy in [Strategy::Max, Strategy::Min, Strategy::All] {
        let mut layer = setup_conflicting_layer(&spans)?;
        resolve_conflicts(&mut layer, strategy, Some("priority"), false, None)?;
        assert!(!layer.is_empty());
        assert_eq!(iterate_intersecting_spans(&layer, true, true, true).count(), 0);
        assert!(layer.check_span_consistency().is_none());
    }
    Ok(())
}

#[test]
fn resolve_conflicts_errors() -> Result<(), StrataError> {
    let mut layer = setup_conflicting_layer(&[(0, 4, 0), (2, 6, 0)])?;
    assert!(matches!(
        resolve_conflicts(&mut layer, Strategy::Max, Some("weight"), false, None),
        Err(StrataError::NotFound(..))
    ));
    let mut layer = Layer::new("candidates", ["priority"]).build()?;
    layer.add_annotation((0, 4), AnnotationBuilder::new().with_attribute("priority", "high"))?;
    layer.add_annotation((2, 6), AnnotationBuilder::new().with_attribute("priority", "low"))?;
    assert!(matches!(
        resolve_conflicts(&mut layer, Strategy::Max, Some("priority"), false, None),
        Err(StrataError::InvalidArgument(..))
    ));
    Ok(())
}

#[test]
fn resolve_conflicts_collapses_ambiguity() -> Result<(), StrataError> {
    let mut layer = Layer::new("candidates", ["priority", "label"])
        .with_ambiguous(true)
        .build()?;
    for (priority, label) in [(2, "a"), (1, "b"), (1, "c")] {
        layer.add_annotation(
            (0, 4),
            AnnotationBuilder::new()
                .with_attribute("priority", priority)
                .with_attribute("label", label),
        )?;
    }
    let mut keep_equal = layer.clone();
    resolve_conflicts(&mut layer, Strategy::Max, Some("priority"), false, None)?;
    let span = layer.span_by_index(0).unwrap();
    assert_eq!(span.values("label"), vec![&AnnotationValue::from("b")]);

    resolve_conflicts(&mut keep_equal, Strategy::Max, Some("priority"), true, None)?;
    assert_eq!(keep_equal.span_by_index(0).unwrap().annotations().len(), 2);
    Ok(())
}

#[test]
fn flatten_enveloping_layer() -> Result<(), StrataError> {
    let text = setup_example_1()?;
    let flat = flatten(text.layer("sentences").unwrap(), "sentence_words", None, None, None)?;
    assert_eq!(flat.name(), "sentence_words");
    assert!(flat.ambiguous());
    assert!(flat.enveloping().is_none());
    assert_eq!(flat.len(), 6);
    assert_eq!(flat.text(&text)?, text.layer("words").unwrap().text(&text)?);
    Ok(())
}

#[test]
fn flatten_with_mapping() -> Result<(), StrataError> {
    let text = setup_example_1()?;
    let morph = text.layer("morph_analysis").unwrap();
    let lemmas = flatten(
        morph,
        "lemmas",
        Some(&["lemma"]),
        Some(&[("lemma", "base")]),
        Some(DisambiguationStrategy::PickFirst),
    )?;
    assert_eq!(lemmas.attributes(), &["base".to_string()]);
    assert!(!lemmas.ambiguous());
    assert!(lemmas.parent().is_none());
    let teine = lemmas.span_by_index(3).unwrap();
    assert_eq!(teine.annotations().len(), 1);
    assert_eq!(teine.value("base"), Some(&AnnotationValue::from("teine")));
    assert!(matches!(
        flatten(morph, "x", Some(&["form"]), None, None),
        Err(StrataError::NotFound(..))
    ));
    Ok(())
}

#[test]
fn flatten_pick_first_is_idempotent() -> Result<(), StrataError> {
    let layer = setup_conflicting_layer(&[(0, 4, 1), (2, 6, 2), (8, 9, 3)])?;
    let flat = flatten(&layer, "candidates", None, None, Some(DisambiguationStrategy::PickFirst))?;
    assert_eq!(layer.diff(&flat), None);
    Ok(())
}

#[test]
fn ngram_fingerprint() -> Result<(), StrataError> {
    let mut layer = Layer::new("morph_analysis", ["lemma"]).with_ambiguous(true).build()?;
    let lemmas = ["ööbik", "laulma", "puu", "otsas", "."];
    let mut start = 0;
    for lemma in lemmas {
        layer.add_annotation((start, start + 3), AnnotationBuilder::new().with_attribute("lemma", lemma))?;
        start += 4;
    }
    let index = create_ngram_fingerprint_index(&layer, "lemma", 2)?;
    assert!(index.contains("puu-otsas"));
    assert!(index.contains("otsas-."));
    assert!(index.contains("puu"));
    assert!(!index.contains("ööbik-puu"));
    assert_eq!(index.len(), 9);

    layer.add_annotation((8, 11), AnnotationBuilder::new().with_attribute("lemma", "puus"))?;
    let index = create_ngram_fingerprint_index(&layer, "lemma", 2)?;
    assert!(index.contains("laulma-puu"));
    assert!(index.contains("laulma-puus"));
    assert!(index.contains("puus-otsas"));

    assert!(create_ngram_fingerprint_index(&layer, "lemma", 0).is_err());
    assert!(create_ngram_fingerprint_index(&layer, "form", 1).is_err());
    Ok(())
}

#[test]
fn ngram_separator_from_config() -> Result<(), StrataError> {
    let mut text = setup_example_1()?;
    text.set_config(Config::default().with_ngram_separator("_"));
    let index = create_ngram_fingerprint_index(text.layer("morph_analysis").unwrap(), "lemma", 3)?;
    assert!(index.contains("esimene_lause_."));
    assert!(index.contains("teine_lause"));
    Ok(())
}

#[test]
fn split_by_sentences_rebases() -> Result<(), StrataError> {
    let text = setup_example_1()?;
    let parts = split_by_sentences(&text, None, false)?;
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0].text(), "Esimene lause.");
    assert_eq!(parts[1].text(), "Teine lause.");
    assert_eq!(parts[0].len() + 1 + parts[1].len(), text.len());
    for part in parts.iter() {
        let words = part.layer("words").unwrap();
        assert_eq!(words.span_by_index(0).unwrap().start(), 0);
        assert_eq!(words.len(), 3);
        assert_eq!(part.layer("sentences").unwrap().len(), 1);
        assert_eq!(part.meta().get("source"), Some(&AnnotationValue::from("test")));
        for name in part.layer_names() {
            assert!(part.layer(name).unwrap().check_span_consistency().is_none());
        }
    }
    assert_eq!(
        locations(parts[1].layer("words").unwrap()),
        vec![(0, 5), (6, 11), (11, 12)]
    );
    let morph = parts[1].layer("morph_analysis").unwrap();
    assert_eq!(morph.span_by_index(0).unwrap().annotations().len(), 2);
    assert_eq!(morph.text(&parts[1])?, vec!["Teine", "lause", "."]);
    Ok(())
}

#[test]
fn split_keeps_selected_layers() -> Result<(), StrataError> {
    let text = setup_example_1()?;
    let parts = split_by(&text, "sentences", Some(&["words", "sentences"]), false)?;
    assert!(parts[0].layer("morph_analysis").is_none());
    assert_eq!(
        layers_to_keep_default(&text, "sentences")?.into_iter().collect::<Vec<_>>(),
        vec!["morph_analysis".to_string(), "sentences".to_string(), "words".to_string()]
    );
    assert!(matches!(
        extract_sections(&text, &[(0, 14)], Some(&["morph_analysis"]), false),
        Err(StrataError::DependencyError(..))
    ));
    assert!(matches!(
        extract_sections(&text, &[(0, 14)], Some(&["tokens"]), false),
        Err(StrataError::NotFound(..))
    ));
    Ok(())
}

#[test]
fn split_preserves_content() -> Result<(), StrataError> {
    let text = setup_example_1()?;
    let sections = [(0, 8), (8, 15), (15, 27)];
    let parts = extract_sections(&text, &sections, None, false)?;
    let total: usize = parts.iter().map(|part| part.len()).sum();
    assert_eq!(total, text.len());
    let joined: String = parts.iter().map(|part| part.text()).collect();
    assert_eq!(joined, text.text());
    Ok(())
}

#[test]
fn extract_section_trim_overlapping() -> Result<(), StrataError> {
    let text = setup_example_1()?;
    let trimmed = extract_section(&text, 3, 10, Some(&["words"]), true)?;
    assert_eq!(trimmed.text(), "mene la");
    assert_eq!(locations(trimmed.layer("words").unwrap()), vec![(0, 4), (5, 7)]);
    let strict = extract_section(&text, 3, 10, Some(&["words"]), false)?;
    assert!(strict.layer("words").unwrap().is_empty());
    Ok(())
}

#[test]
fn extract_section_inside_discontinuous_gap() -> Result<(), StrataError> {
    let text = setup_example_clauses()?;
    for trim_overlapping in [false, true] {
        let section = extract_section(&text, 4, 21, Some(&["words", "clauses"]), trim_overlapping)?;
        assert_eq!(section.text(), ", keda kohtasime,");
        let clauses = section.layer("clauses").unwrap();
        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses.text(&section)?, vec![",", "keda", "kohtasime", ","]);
        assert_eq!(
            clauses.span_by_index(0).unwrap().value("clause_type"),
            Some(&AnnotationValue::from("embedded"))
        );
    }
    Ok(())
}

#[test]
fn split_sequential_equals_parallel() -> Result<(), StrataError> {
    let mut text = setup_example_1()?;
    let parallel = split_by_sentences(&text, None, false)?;
    text.set_config(Config::default().with_parallel(false));
    let sequential = split_by_sentences(&text, None, false)?;
    assert_eq!(parallel.len(), sequential.len());
    for (a, b) in parallel.iter().zip(sequential.iter()) {
        assert_eq!(a.diff(b), None);
    }
    Ok(())
}

#[test]
fn split_relation_layers() -> Result<(), StrataError> {
    let mut text = setup_example_1()?;
    let mut coreference = RelationLayer::new("coreference", ["mention", "entity"], ["rel_type"]).build()?;
    coreference.add_annotation(
        RelationBuilder::new()
            .with_span("mention", (15, 20))
            .with_span("entity", (0, 7))
            .with_attribute("rel_type", "anaphora"),
    )?;
    coreference.add_annotation(
        RelationBuilder::new()
            .with_span("mention", (21, 26))
            .with_span("entity", (15, 20))
            .with_attribute("rel_type", "other"),
    )?;
    text.add_relation_layer(coreference)?;
    let parts = split_by_sentences(&text, Some(&["words", "coreference"]), false)?;
    assert!(parts[0].relation_layer("coreference").unwrap().is_empty());
    let second = parts[1].relation_layer("coreference").unwrap();
    assert_eq!(second.len(), 1);
    let relation = second.relation_by_index(0).unwrap();
    assert_eq!(relation.text(&parts[1])?, vec![vec!["lause"], vec!["Teine"]]);
    assert_eq!(relation.value("rel_type"), Some(&AnnotationValue::from("other")));
    Ok(())
}

#[test]
fn group_consecutive() -> Result<(), StrataError> {
    let text = setup_example_clauses()?;
    let spans = [(0, 4), (22, 25), (26, 32), (32, 33)];
    assert_eq!(
        group_consecutive_spans(&text, &spans, false)?,
        vec![vec![(0, 4)], vec![(22, 25), (26, 32), (32, 33)]]
    );
    assert_eq!(
        group_consecutive_spans(&text, &spans, true)?,
        vec![vec![(0, 4)], vec![(21, 25), (26, 32), (32, 33)]]
    );
    assert_eq!(
        group_consecutive_spans_reduced(&text, &spans, true)?,
        vec![(0, 4), (21, 33)]
    );
    assert!(group_consecutive_spans(&text, &[], true)?.is_empty());
    Ok(())
}

#[test]
fn split_by_clauses_discontinuous() -> Result<(), StrataError> {
    let text = setup_example_clauses()?;
    let parts = split_by_clauses(&text, None, true)?;
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0].text(), "Mees oli tuttav.");
    assert_eq!(parts[1].text(), ", keda kohtasime,");
    assert!(parts[0].layer("sentences").is_none());

    let words = parts[0].layer("words").unwrap();
    assert_eq!(locations(words), vec![(0, 4), (5, 8), (9, 15), (15, 16)]);
    let clauses = parts[0].layer("clauses").unwrap();
    assert_eq!(clauses.len(), 1);
    assert_eq!(clauses.text(&parts[0])?, vec!["Mees", "oli", "tuttav", "."]);
    assert_eq!(
        clauses.span_by_index(0).unwrap().value("clause_type"),
        Some(&AnnotationValue::from("regular"))
    );

    let clauses = parts[1].layer("clauses").unwrap();
    assert_eq!(clauses.len(), 1);
    assert_eq!(clauses.text(&parts[1])?, vec![",", "keda", "kohtasime", ","]);
    assert_eq!(
        locations(parts[1].layer("words").unwrap()),
        vec![(0, 1), (2, 6), (7, 16), (16, 17)]
    );
    Ok(())
}

#[test]
fn extract_discontinuous() -> Result<(), StrataError> {
    let text = setup_example_clauses()?;
    let parts = extract_discontinuous_sections(&text, &[vec![(0, 4), (21, 33)]], Some(&["words"]), false)?;
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].text(), "Mees oli tuttav.");
    assert_eq!(parts[0].layer("words").unwrap().len(), 4);
    assert!(extract_discontinuous_sections(&text, &[vec![]], None, false).is_err());
    Ok(())
}

#[test]
fn shift_spans() -> Result<(), StrataError> {
    let text = setup_example_1()?;
    let sentence = text.layer("sentences").unwrap().span_by_index(1).unwrap();
    let shifted = shift_span(sentence, -15)?;
    assert_eq!(shifted.base_span(), &[(0, 5), (6, 11), (11, 12)].to_base_span()?);
    assert_eq!(shifted.annotations().len(), 1);
    assert!(shifted.handle().is_none());
    assert!(shift_span(sentence, -16).is_err());
    Ok(())
}

#[test]
fn join_split_texts() -> Result<(), StrataError> {
    let text = setup_example_1()?;
    let parts = split_by_sentences(&text, None, false)?;
    let joined = join_texts(&[&parts[0], &parts[1]], None)?;
    assert_eq!(joined.text(), text.text());
    for name in text.layer_names() {
        assert_eq!(joined.layer(name).unwrap().diff(text.layer(name).unwrap()), None);
    }
    assert!(joined.meta().is_empty());
    Ok(())
}

#[test]
fn join_with_separators() -> Result<(), StrataError> {
    let text = setup_example_relations()?;
    let joined = join_texts(&[&text, &text], Some(&["\n"]))?;
    assert_eq!(joined.len(), 55);
    assert_eq!(joined.layer("words").unwrap().len(), 12);
    let coreference = joined.relation_layer("coreference").unwrap();
    assert_eq!(coreference.len(), 4);
    let relation = coreference.relation_by_index(2).unwrap();
    assert_eq!(relation.span("mention").unwrap().start(), 43);
    assert_eq!(relation.text(&joined)?, vec![vec!["Teine"], vec!["Esimene"]]);

    assert!(matches!(
        join_texts(&[&text, &text], Some(&[])),
        Err(StrataError::InvalidArgument(..))
    ));
    assert!(matches!(join_texts(&[], None), Err(StrataError::InvalidArgument(..))));
    Ok(())
}

#[test]
fn join_layers_checks_schema() -> Result<(), StrataError> {
    let text = setup_example_1()?;
    let words = text.layer("words").unwrap();
    let morph = text.layer("morph_analysis").unwrap();
    assert!(matches!(
        join_layers(&[(words, &text), (morph, &text)], &[" "]),
        Err(StrataError::SchemaError(..))
    ));
    let joined = join_layers(&[(words, &text), (words, &text)], &[""])?;
    assert_eq!(joined.len(), 12);
    assert_eq!(joined.span_by_index(6).unwrap().start(), 27);
    Ok(())
}
