#![allow(dead_code)]
use strata::*;

pub const EXAMPLE_1: &str = "Esimene lause. Teine lause.";

pub const EXAMPLE_CLAUSES: &str = "Mees, keda kohtasime, oli tuttav.";

fn add_words(text: &mut Text, words: &[(usize, usize)]) -> Result<(), StrataError> {
    let mut layer = Layer::new("words", ["normalized_form"])
        .with_ambiguous(true)
        .build()?;
    for (start, end) in words {
        layer.add_annotation((*start, *end), AnnotationBuilder::new())?;
    }
    text.add_layer(layer)
}

/// Two sentences with words, sentences and an ambiguous morphological layer derived from words
pub fn setup_example_1() -> Result<Text, StrataError> {
    let mut text = Text::new(EXAMPLE_1).with_meta("source", "test");
    let words = [(0, 7), (8, 13), (13, 14), (15, 20), (21, 26), (26, 27)];
    add_words(&mut text, &words)?;

    let mut sentences = Layer::new("sentences", Vec::<String>::new())
        .with_enveloping("words")
        .build()?;
    sentences.add_annotation([(0, 7), (8, 13), (13, 14)], AnnotationBuilder::new())?;
    sentences.add_annotation([(15, 20), (21, 26), (26, 27)], AnnotationBuilder::new())?;
    text.add_layer(sentences)?;

    let mut morph = Layer::new("morph_analysis", ["lemma", "partofspeech"])
        .with_parent("words")
        .with_ambiguous(true)
        .build()?;
    let analyses: [((usize, usize), &[(&str, &str)]); 6] = [
        ((0, 7), &[("esimene", "O")]),
        ((8, 13), &[("lause", "S")]),
        ((13, 14), &[(".", "Z")]),
        ((15, 20), &[("teine", "O"), ("teine", "P")]),
        ((21, 26), &[("lause", "S")]),
        ((26, 27), &[(".", "Z")]),
    ];
    for (location, alternatives) in analyses.iter() {
        for (lemma, partofspeech) in alternatives.iter() {
            morph.add_annotation(
                *location,
                AnnotationBuilder::new()
                    .with_attribute("lemma", *lemma)
                    .with_attribute("partofspeech", *partofspeech),
            )?;
        }
    }
    text.add_layer(morph)?;
    Ok(text)
}

/// A sentence with an embedded clause, the main clause is discontinuous
pub fn setup_example_clauses() -> Result<Text, StrataError> {
    let mut text = Text::new(EXAMPLE_CLAUSES);
    let words = [
        (0, 4),
        (4, 5),
        (6, 10),
        (11, 20),
        (20, 21),
        (22, 25),
        (26, 32),
        (32, 33),
    ];
    add_words(&mut text, &words)?;

    let mut sentences = Layer::new("sentences", Vec::<String>::new())
        .with_enveloping("words")
        .build()?;
    sentences.add_annotation(words.as_slice(), AnnotationBuilder::new())?;
    text.add_layer(sentences)?;

    let mut clauses = Layer::new("clauses", ["clause_type"])
        .with_enveloping("words")
        .build()?;
    clauses.add_annotation(
        [(0, 4), (22, 25), (26, 32), (32, 33)],
        AnnotationBuilder::new().with_attribute("clause_type", "regular"),
    )?;
    clauses.add_annotation(
        [(4, 5), (6, 10), (11, 20), (20, 21)],
        AnnotationBuilder::new().with_attribute("clause_type", "embedded"),
    )?;
    text.add_layer(clauses)?;
    Ok(text)
}

/// Named entities with a coreference relation layer on top of example 1
pub fn setup_example_relations() -> Result<Text, StrataError> {
    let mut text = setup_example_1()?;
    let mut coreference = RelationLayer::new("coreference", ["mention", "entity"], ["rel_type"])
        .build()?;
    coreference.add_annotation(
        RelationBuilder::new()
            .with_span("mention", (15, 20))
            .with_span("entity", (0, 7))
            .with_attribute("rel_type", "anaphora"),
    )?;
    coreference.add_annotation(
        RelationBuilder::new()
            .with_span("mention", (21, 26))
            .with_span("entity", (8, 13))
            .with_attribute("rel_type", "repetition"),
    )?;
    text.add_relation_layer(coreference)?;
    Ok(text)
}

/// A flat layer with overlapping candidate spans for conflict resolution
pub fn setup_conflicting_layer(spans: &[(usize, usize, i64)]) -> Result<Layer, StrataError> {
    let mut layer = Layer::new("candidates", ["priority"]).build()?;
    for (start, end, priority) in spans {
        layer.add_annotation(
            (*start, *end),
            AnnotationBuilder::new().with_attribute("priority", *priority),
        )?;
    }
    Ok(layer)
}
