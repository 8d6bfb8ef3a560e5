/*
    Strata (Layered Text Annotation Engine)
        Layers, spans and relations over stand-off annotated text

        Licensed under the GNU General Public License v3
*/

//! This module contains the [`Text`] container: the raw text together with its layers and relation layers.
//!
//! All offsets in this library are in unicode codepoints, not bytes. The text keeps an index from
//! character positions to UTF-8 byte positions so slicing is cheap.

use sealed::sealed;
use std::collections::{BTreeMap, BTreeSet};

use crate::basespan::BaseSpan;
use crate::config::{Config, Configurable};
use crate::error::{StrataError, StrataResult};
use crate::layer::Layer;
use crate::relationlayer::RelationLayer;
use crate::span::Span;
use crate::types::*;
use crate::value::AnnotationValue;

/// Number of unicode codepoints in a string
pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// The raw text and all layers that annotate it.
///
/// Layer names are unique across span layers and relation layers. A layer can only be added
/// after its parent (or the layer it envelops) has been added. Layers inherit the configuration
/// of the text when they are added.
#[derive(Debug, Clone)]
pub struct Text {
    text: String,
    /// UTF-8 byte position of every character, plus one final entry for the end of the text
    positions: Vec<usize>,
    meta: BTreeMap<String, AnnotationValue>,
    layers: BTreeMap<String, Layer>,
    relation_layers: BTreeMap<String, RelationLayer>,
    config: Config,
}

impl Text {
    pub fn new(text: impl Into<String>) -> Self {
        let text: String = text.into();
        let positions = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        Self {
            text,
            positions,
            meta: BTreeMap::new(),
            layers: BTreeMap::new(),
            relation_layers: BTreeMap::new(),
            config: Config::default(),
        }
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<AnnotationValue>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Returns the raw text
    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    /// Length of the text in unicode codepoints
    pub fn len(&self) -> usize {
        self.positions.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn meta(&self) -> &BTreeMap<String, AnnotationValue> {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut BTreeMap<String, AnnotationValue> {
        &mut self.meta
    }

    /// Converts a unicode character position to a UTF-8 byte position
    pub fn utf8byte(&self, charpos: usize) -> StrataResult<usize> {
        self.positions.get(charpos).copied().ok_or_else(|| {
            StrataError::InvalidArgument(
                format!("position {} is out of bounds (text length {})", charpos, self.len()),
                "Text::utf8byte",
            )
        })
    }

    /// Returns the text between two character positions
    pub fn slice(&self, start: usize, end: usize) -> StrataResult<&str> {
        if start > end {
            return Err(StrataError::InvalidArgument(
                format!("start {} is greater than end {}", start, end),
                "Text::slice",
            ));
        }
        let begin = self.utf8byte(start)?;
        let stop = self.utf8byte(end)?;
        Ok(&self.text[begin..stop])
    }

    /// The text of every leaf interval of a base span
    pub fn span_text(&self, base_span: &BaseSpan) -> StrataResult<Vec<&str>> {
        base_span
            .leaves()
            .map(|(start, end)| self.slice(start, end))
            .collect()
    }

    /// The text from the start to the end of a base span, including gaps
    pub fn enclosing_text(&self, base_span: &BaseSpan) -> StrataResult<&str> {
        self.slice(base_span.start(), base_span.end())
    }

    /// Adds a layer. The name must be unused and its parent or enveloped layer must already be present.
    pub fn add_layer(&mut self, mut layer: Layer) -> StrataResult<()> {
        debug(&self.config, || {
            format!("Text::add_layer: name={}, spans={}", layer.name(), layer.len())
        });
        self.check_new_name(layer.name(), "Text::add_layer")?;
        if let Some(parent) = layer.parent() {
            if !self.layers.contains_key(parent) {
                return Err(StrataError::DependencyError(
                    format!(
                        "can't add layer {:?} before adding its parent {:?}",
                        layer.name(),
                        parent
                    ),
                    "Text::add_layer",
                ));
            }
        }
        if let Some(enveloping) = layer.enveloping() {
            if !self.layers.contains_key(enveloping) {
                return Err(StrataError::DependencyError(
                    format!(
                        "can't add enveloping layer {:?} before adding the layer it envelops ({:?})",
                        layer.name(),
                        enveloping
                    ),
                    "Text::add_layer",
                ));
            }
        }
        layer.set_config(self.config.clone());
        self.layers.insert(layer.name().to_string(), layer);
        Ok(())
    }

    /// Adds a relation layer, the name must be unused
    pub fn add_relation_layer(&mut self, mut layer: RelationLayer) -> StrataResult<()> {
        debug(&self.config, || {
            format!("Text::add_relation_layer: name={}", layer.name())
        });
        self.check_new_name(layer.name(), "Text::add_relation_layer")?;
        layer.set_config(self.config.clone());
        self.relation_layers.insert(layer.name().to_string(), layer);
        Ok(())
    }

    fn check_new_name(&self, name: &str, contextmsg: &'static str) -> StrataResult<()> {
        if self.layers.contains_key(name) {
            Err(StrataError::DependencyError(
                format!("this text already has a span layer with name {:?}", name),
                contextmsg,
            ))
        } else if self.relation_layers.contains_key(name) {
            Err(StrataError::DependencyError(
                format!("this text already has a relation layer with name {:?}", name),
                contextmsg,
            ))
        } else {
            Ok(())
        }
    }

    /// Removes a span layer and returns it. If `cascading` is set, all layers that (transitively)
    /// depend on it are removed as well.
    pub fn pop_layer(&mut self, name: &str, cascading: bool) -> StrataResult<Layer> {
        if !self.layers.contains_key(name) {
            return Err(StrataError::NotFound(
                format!("layer {:?}", name),
                "Text::pop_layer",
            ));
        }
        let dependants = if cascading {
            self.layer_dependencies(name, true)
        } else {
            BTreeSet::new()
        };
        debug(&self.config, || {
            format!("Text::pop_layer: name={}, dependants={:?}", name, dependants)
        });
        for dependant in dependants {
            self.layers.remove(&dependant);
        }
        self.layers.remove(name).ok_or_else(|| {
            StrataError::NotFound(format!("layer {:?}", name), "Text::pop_layer")
        })
    }

    /// Removes a relation layer and returns it
    pub fn pop_relation_layer(&mut self, name: &str) -> StrataResult<RelationLayer> {
        self.relation_layers.remove(name).ok_or_else(|| {
            StrataError::NotFound(
                format!("relation layer {:?}", name),
                "Text::pop_relation_layer",
            )
        })
    }

    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.get(name)
    }

    /// Mutable access to a layer, for instance to resolve conflicts in place
    pub fn layer_mut(&mut self, name: &str) -> Option<&mut Layer> {
        self.layers.get_mut(name)
    }

    pub fn relation_layer(&self, name: &str) -> Option<&RelationLayer> {
        self.relation_layers.get(name)
    }

    pub fn relation_layer_mut(&mut self, name: &str) -> Option<&mut RelationLayer> {
        self.relation_layers.get_mut(name)
    }

    /// Names of all span layers, alphabetically
    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.layers.keys().map(|name| name.as_str())
    }

    /// Names of all relation layers, alphabetically
    pub fn relation_layer_names(&self) -> impl Iterator<Item = &str> {
        self.relation_layers.keys().map(|name| name.as_str())
    }

    /// Orders layers by dependencies (parent and enveloped layers first) and then by name, so the
    /// order is uniquely determined. Layers with dependencies that are not in the collection are appended at the end.
    pub fn topological_sort<'a>(layers: impl IntoIterator<Item = &'a Layer>) -> Vec<&'a Layer> {
        let mut remaining: Vec<&Layer> = layers.into_iter().collect();
        remaining.sort_by(|a, b| a.name().cmp(b.name()));
        let known: BTreeSet<&str> = remaining.iter().map(|layer| layer.name()).collect();
        let mut sorted: Vec<&Layer> = Vec::with_capacity(remaining.len());
        let mut sorted_names: BTreeSet<&str> = BTreeSet::new();
        while !remaining.is_empty() {
            let ready = remaining.iter().position(|layer| {
                layer.parent().map_or(true, |p| sorted_names.contains(p))
                    && layer.enveloping().map_or(true, |e| sorted_names.contains(e))
            });
            let position = ready.or_else(|| {
                remaining.iter().position(|layer| {
                    layer.parent().map_or(false, |p| !known.contains(p))
                        || layer.enveloping().map_or(false, |e| !known.contains(e))
                })
            });
            match position {
                Some(position) => {
                    let layer = remaining.remove(position);
                    sorted_names.insert(layer.name());
                    sorted.push(layer);
                }
                None => {
                    // cyclic dependencies, keep the alphabetical order for the rest
                    sorted.append(&mut remaining);
                }
            }
        }
        sorted
    }

    /// The span layers of this text in dependency order
    pub fn sorted_layers(&self) -> Vec<&Layer> {
        Self::topological_sort(self.layers.values())
    }

    /// The relation layers of this text in alphabetical order
    pub fn sorted_relation_layers(&self) -> Vec<&RelationLayer> {
        self.relation_layers.values().collect()
    }

    /// Returns the names of all layers that the given layer (transitively) depends on through its
    /// parent and enveloped layer. With `reverse`, returns all layers that depend on the given layer instead.
    pub fn layer_dependencies(&self, name: &str, reverse: bool) -> BTreeSet<String> {
        let mut result: BTreeSet<String> = BTreeSet::new();
        let mut queue: Vec<String> = vec![name.to_string()];
        while let Some(current) = queue.pop() {
            let found: Vec<String> = if reverse {
                self.layers
                    .values()
                    .filter(|layer| {
                        layer.parent() == Some(current.as_str())
                            || layer.enveloping() == Some(current.as_str())
                    })
                    .map(|layer| layer.name().to_string())
                    .collect()
            } else {
                self.layers
                    .get(&current)
                    .map(|layer| {
                        layer
                            .parent()
                            .into_iter()
                            .chain(layer.enveloping())
                            .map(|name| name.to_string())
                            .collect()
                    })
                    .unwrap_or_default()
            };
            for name in found {
                if result.insert(name.clone()) {
                    queue.push(name);
                }
            }
        }
        result.remove(name);
        result
    }

    /// Resolves the span of a derived layer to the span at the same location in its parent layer
    pub fn parent_span(&self, layer: &Layer, span: &Span) -> Option<&Span> {
        self.layer(layer.parent()?)?.span(span.base_span())
    }

    /// Resolves the children of an enveloping span to the spans of the enveloped layer
    pub fn sub_spans(&self, layer: &Layer, span: &Span) -> StrataResult<Vec<&Span>> {
        let enveloped_name = layer.enveloping().ok_or_else(|| {
            StrataError::TypeMismatch(
                format!("layer {:?} is not enveloping", layer.name()),
                "Text::sub_spans",
            )
        })?;
        let enveloped = self.layer(enveloped_name).ok_or_else(|| {
            StrataError::NotFound(format!("layer {:?}", enveloped_name), "Text::sub_spans")
        })?;
        span.base_span()
            .spans()
            .iter()
            .map(|child| {
                enveloped.span(child).ok_or_else(|| {
                    StrataError::NotFound(
                        format!("span {} in layer {:?}", child, enveloped_name),
                        "Text::sub_spans",
                    )
                })
            })
            .collect()
    }

    /// Returns a brief message explaining why two texts differ, `None` if they are equivalent
    pub fn diff(&self, other: &Text) -> Option<String> {
        if self.text != other.text {
            return Some("The raw text is different.".to_string());
        }
        if !self.layers.keys().eq(other.layers.keys()) {
            return Some(format!(
                "Different layer names: {:?} != {:?}",
                self.layers.keys().collect::<Vec<_>>(),
                other.layers.keys().collect::<Vec<_>>()
            ));
        }
        if !self.relation_layers.keys().eq(other.relation_layers.keys()) {
            return Some(format!(
                "Different relation layer names: {:?} != {:?}",
                self.relation_layers.keys().collect::<Vec<_>>(),
                other.relation_layers.keys().collect::<Vec<_>>()
            ));
        }
        if self.meta != other.meta {
            return Some("Different metadata.".to_string());
        }
        for (layer, other_layer) in self.layers.values().zip(other.layers.values()) {
            if let Some(difference) = layer.diff(other_layer) {
                return Some(difference);
            }
        }
        for (layer, other_layer) in self
            .relation_layers
            .values()
            .zip(other.relation_layers.values())
        {
            if let Some(difference) = layer.diff(other_layer) {
                return Some(difference);
            }
        }
        None
    }
}

impl PartialEq for Text {
    fn eq(&self, other: &Self) -> bool {
        self.diff(other).is_none()
    }
}

impl Configurable for Text {
    fn config(&self) -> &Config {
        &self.config
    }

    fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Sets the configuration of the text and all its layers
    fn set_config(&mut self, config: Config) -> &mut Self {
        for layer in self.layers.values_mut() {
            layer.set_config(config.clone());
        }
        for layer in self.relation_layers.values_mut() {
            layer.set_config(config.clone());
        }
        self.config = config;
        self
    }
}

#[sealed]
impl TypeInfo for Text {
    fn typeinfo() -> Type {
        Type::Text
    }
}
