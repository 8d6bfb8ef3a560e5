/*
    Strata (Layered Text Annotation Engine)
        Layers, spans and relations over stand-off annotated text

        Licensed under the GNU General Public License v3
*/

//! This module contains the dict form of layers, relation layers and texts: plain serde structures
//! that mirror the model and are used for JSON (de)serialisation.
//!
//! Locations serialise as raw locations: `[start, end]` for elementary spans and nested lists thereof for
//! enveloping spans. Layer default values are not part of the dict form.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

use crate::annotation::Annotation;
use crate::basespan::BaseSpan;
use crate::config::{Config, Configurable};
use crate::error::{StrataError, StrataResult};
use crate::file::*;
use crate::json::{FromJson, ToJson};
use crate::layer::{Layer, LayerBuilder};
use crate::relationlayer::{Relation, RelationLayer, RelationLayerBuilder};
use crate::span::Span;
use crate::text::Text;
use crate::types::*;
use crate::value::AnnotationValue;

type AttributeMap = BTreeMap<String, AnnotationValue>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SpanDict {
    pub base_span: BaseSpan,
    pub annotations: Vec<AttributeMap>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LayerDict {
    pub name: String,
    pub attributes: Vec<String>,
    #[serde(default)]
    pub secondary_attributes: Vec<String>,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub enveloping: Option<String>,
    #[serde(default)]
    pub ambiguous: bool,
    #[serde(default)]
    pub serialisation_module: Option<String>,
    #[serde(default)]
    pub meta: AttributeMap,
    pub spans: Vec<SpanDict>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RelationDict {
    /// `(span name, location)` pairs
    pub spans: Vec<(String, BaseSpan)>,
    pub annotations: Vec<AttributeMap>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RelationLayerDict {
    pub name: String,
    pub span_names: Vec<String>,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub secondary_attributes: Vec<String>,
    #[serde(default)]
    pub ambiguous: bool,
    #[serde(default)]
    pub serialisation_module: Option<String>,
    #[serde(default)]
    pub meta: AttributeMap,
    pub relations: Vec<RelationDict>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TextDict {
    pub text: String,
    #[serde(default)]
    pub meta: AttributeMap,
    /// Span layers in dependency order
    #[serde(default)]
    pub layers: Vec<LayerDict>,
    #[serde(default)]
    pub relation_layers: Vec<RelationLayerDict>,
}

/// Converts a layer to its dict form
pub fn layer_to_dict(layer: &Layer) -> LayerDict {
    LayerDict {
        name: layer.name().to_string(),
        attributes: layer.attributes().to_vec(),
        secondary_attributes: layer.secondary_attributes().to_vec(),
        parent: layer.parent().map(|s| s.to_string()),
        enveloping: layer.enveloping().map(|s| s.to_string()),
        ambiguous: layer.ambiguous(),
        serialisation_module: layer.serialisation_module().map(|s| s.to_string()),
        meta: layer.meta().clone(),
        spans: layer
            .iter()
            .map(|span| SpanDict {
                base_span: span.base_span().clone(),
                annotations: span
                    .annotations()
                    .iter()
                    .map(|annotation| annotation.attributes().clone())
                    .collect(),
            })
            .collect(),
    }
}

/// Builds a layer from its dict form. Every span is validated against the schema; with
/// `validate_on_load` set in the configuration the span consistency of the result is checked as well.
pub fn dict_to_layer(dict: LayerDict, config: Config) -> StrataResult<Layer> {
    debug(&config, || {
        format!(
            "dict_to_layer: name={}, spans={}",
            dict.name,
            dict.spans.len()
        )
    });
    let validate = config.validate_on_load();
    let mut builder = LayerBuilder::new(dict.name)
        .with_attributes(dict.attributes)
        .with_secondary_attributes(dict.secondary_attributes)
        .with_ambiguous(dict.ambiguous)
        .with_config(config);
    if let Some(parent) = dict.parent {
        builder = builder.with_parent(parent);
    }
    if let Some(enveloping) = dict.enveloping {
        builder = builder.with_enveloping(enveloping);
    }
    if let Some(module) = dict.serialisation_module {
        builder = builder.with_serialisation_module(module);
    }
    for (key, value) in dict.meta {
        builder = builder.with_meta(key, value);
    }
    let mut layer = builder.build()?;
    for span_dict in dict.spans {
        let mut span = Span::new(span_dict.base_span);
        for attributes in span_dict.annotations {
            span = span.with_annotation(Annotation::new(attributes));
        }
        layer.add_span(span)?;
    }
    if validate {
        if let Some(msg) = layer.check_span_consistency() {
            return Err(StrataError::SchemaError(msg, "dict_to_layer"));
        }
    }
    Ok(layer)
}

/// Converts a relation layer to its dict form
pub fn relation_layer_to_dict(layer: &RelationLayer) -> RelationLayerDict {
    RelationLayerDict {
        name: layer.name().to_string(),
        span_names: layer.span_names().to_vec(),
        attributes: layer.attributes().to_vec(),
        secondary_attributes: layer.secondary_attributes().to_vec(),
        ambiguous: layer.ambiguous(),
        serialisation_module: layer.serialisation_module().map(|s| s.to_string()),
        meta: layer.meta().clone(),
        relations: layer
            .iter()
            .map(|relation| RelationDict {
                spans: relation
                    .spans()
                    .iter()
                    .map(|span| (span.name().to_string(), span.base_span().clone()))
                    .collect(),
                annotations: relation
                    .annotations()
                    .iter()
                    .map(|annotation| annotation.attributes().clone())
                    .collect(),
            })
            .collect(),
    }
}

/// Builds a relation layer from its dict form
pub fn dict_to_relation_layer(dict: RelationLayerDict, config: Config) -> StrataResult<RelationLayer> {
    debug(&config, || {
        format!(
            "dict_to_relation_layer: name={}, relations={}",
            dict.name,
            dict.relations.len()
        )
    });
    let validate = config.validate_on_load();
    let mut builder = RelationLayerBuilder::new(dict.name)
        .with_span_names(dict.span_names)
        .with_attributes(dict.attributes)
        .with_secondary_attributes(dict.secondary_attributes)
        .with_ambiguous(dict.ambiguous)
        .with_serialisation_module(dict.serialisation_module)
        .with_config(config);
    for (key, value) in dict.meta {
        builder = builder.with_meta(key, value);
    }
    let mut layer = builder.build()?;
    for relation_dict in dict.relations {
        let mut relation = Relation::new(relation_dict.spans)?;
        for attributes in relation_dict.annotations {
            relation = relation.with_annotation(Annotation::new(attributes));
        }
        layer.add_relation(relation)?;
    }
    if validate {
        if let Some(msg) = layer.check_relation_consistency() {
            return Err(StrataError::SchemaError(msg, "dict_to_relation_layer"));
        }
    }
    Ok(layer)
}

/// Converts a text with all its layers to its dict form, layers are listed in dependency order
pub fn text_to_dict(text: &Text) -> TextDict {
    TextDict {
        text: text.text().to_string(),
        meta: text.meta().clone(),
        layers: text.sorted_layers().into_iter().map(layer_to_dict).collect(),
        relation_layers: text
            .sorted_relation_layers()
            .into_iter()
            .map(relation_layer_to_dict)
            .collect(),
    }
}

/// Builds a text from its dict form. Layers are added in dependency order regardless of the order in the dict.
pub fn dict_to_text(dict: TextDict, config: Config) -> StrataResult<Text> {
    debug(&config, || {
        format!(
            "dict_to_text: layers={}, relation_layers={}",
            dict.layers.len(),
            dict.relation_layers.len()
        )
    });
    let mut text = Text::new(dict.text).with_config(config.clone());
    for (key, value) in dict.meta {
        text.meta_mut().insert(key, value);
    }
    let mut layers: BTreeMap<String, Layer> = BTreeMap::new();
    for layer_dict in dict.layers {
        let layer = dict_to_layer(layer_dict, config.clone())?;
        if layers.contains_key(layer.name()) {
            return Err(StrataError::DependencyError(
                format!("duplicate layer name {:?}", layer.name()),
                "dict_to_text",
            ));
        }
        layers.insert(layer.name().to_string(), layer);
    }
    let order: Vec<String> = Text::topological_sort(layers.values())
        .into_iter()
        .map(|layer| layer.name().to_string())
        .collect();
    for name in order {
        if let Some(layer) = layers.remove(&name) {
            text.add_layer(layer)?;
        }
    }
    for layer_dict in dict.relation_layers {
        text.add_relation_layer(dict_to_relation_layer(layer_dict, config.clone())?)?;
    }
    Ok(text)
}

impl Serialize for Layer {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        layer_to_dict(self).serialize(serializer)
    }
}

impl Serialize for RelationLayer {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        relation_layer_to_dict(self).serialize(serializer)
    }
}

impl Serialize for Text {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        text_to_dict(self).serialize(serializer)
    }
}

impl ToJson for Layer {}
impl ToJson for RelationLayer {}
impl ToJson for Text {}

/// Parses a dict structure from a JSON string, reporting the path of any error
fn parse_json_str<'a, T: Deserialize<'a>>(string: &'a str, contextmsg: &'static str) -> StrataResult<T> {
    let deserializer = &mut serde_json::Deserializer::from_str(string);
    serde_path_to_error::deserialize(deserializer)
        .map_err(|e| StrataError::JsonError(e, "(string)".to_string(), contextmsg))
}

/// Parses a dict structure from a JSON file, reporting the path of any error
fn parse_json_file<T: for<'de> Deserialize<'de>>(
    filename: &str,
    config: &Config,
    contextmsg: &'static str,
) -> StrataResult<T> {
    debug(config, || format!("parse_json_file: filename={:?}", filename));
    let reader = open_file_reader(filename, config)?;
    let deserializer = &mut serde_json::Deserializer::from_reader(reader);
    serde_path_to_error::deserialize(deserializer)
        .map_err(|e| StrataError::JsonError(e, filename.to_string(), contextmsg))
}

impl FromJson for Layer {
    fn from_json_file(filename: &str, config: Config) -> StrataResult<Self> {
        let dict: LayerDict = parse_json_file(filename, &config, "Reading layer from file")?;
        dict_to_layer(dict, config)
    }

    fn from_json_str(string: &str, config: Config) -> StrataResult<Self> {
        let dict: LayerDict = parse_json_str(string, "Reading layer from string")?;
        dict_to_layer(dict, config)
    }
}

impl FromJson for RelationLayer {
    fn from_json_file(filename: &str, config: Config) -> StrataResult<Self> {
        let dict: RelationLayerDict =
            parse_json_file(filename, &config, "Reading relation layer from file")?;
        dict_to_relation_layer(dict, config)
    }

    fn from_json_str(string: &str, config: Config) -> StrataResult<Self> {
        let dict: RelationLayerDict =
            parse_json_str(string, "Reading relation layer from string")?;
        dict_to_relation_layer(dict, config)
    }
}

impl FromJson for Text {
    fn from_json_file(filename: &str, config: Config) -> StrataResult<Self> {
        let dict: TextDict = parse_json_file(filename, &config, "Reading text from file")?;
        dict_to_text(dict, config)
    }

    fn from_json_str(string: &str, config: Config) -> StrataResult<Self> {
        let dict: TextDict = parse_json_str(string, "Reading text from string")?;
        dict_to_text(dict, config)
    }
}
