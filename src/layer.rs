/*
    Strata (Layered Text Annotation Engine)
        Layers, spans and relations over stand-off annotated text

        Licensed under the GNU General Public License v3
*/

//! This module contains the [`Layer`], the central entity of the model: a named collection of
//! spans sharing one attribute schema, and the [`LayerBuilder`] to construct it.

use regex::Regex;
use sealed::sealed;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use crate::annotation::{Annotation, AnnotationBuilder};
use crate::basespan::{BaseSpan, ToBaseSpan};
use crate::config::{Config, Configurable};
use crate::error::{StrataError, StrataResult};
use crate::span::Span;
use crate::spanlist::SpanList;
use crate::text::Text;
use crate::types::*;
use crate::value::AnnotationValue;

/// Checks whether a name can be used for layers, attributes and span names
pub(crate) fn is_identifier(name: &str) -> bool {
    static IDENTIFIER: OnceLock<Option<Regex>> = OnceLock::new();
    match IDENTIFIER.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").ok()) {
        Some(regex) => regex.is_match(name),
        None => false,
    }
}

/// Validates a list of attribute names: identifiers and no duplicates
pub(crate) fn check_attribute_names(
    attributes: &[String],
    contextmsg: &'static str,
) -> StrataResult<()> {
    let mut seen = BTreeSet::new();
    for attribute in attributes {
        if !is_identifier(attribute) {
            return Err(StrataError::SchemaError(
                format!("attribute name must be an identifier: {:?}", attribute),
                contextmsg,
            ));
        }
        if !seen.insert(attribute.as_str()) {
            return Err(StrataError::SchemaError(
                format!("repetitive attribute name: {:?}", attribute),
                contextmsg,
            ));
        }
    }
    Ok(())
}

/// Builder for a new [`Layer`]. The layer is validated when calling [`LayerBuilder::build`].
///
/// Example:
///
/// ```
/// # use strata::*;
/// # fn main() -> Result<(), StrataError> {
/// let layer = LayerBuilder::new("morph")
///     .with_attributes(["lemma", "partofspeech"])
///     .with_parent("words")
///     .with_ambiguous(true)
///     .build()?;
/// assert!(layer.ambiguous());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct LayerBuilder {
    name: String,
    attributes: Vec<String>,
    secondary_attributes: Vec<String>,
    default_values: BTreeMap<String, AnnotationValue>,
    parent: Option<String>,
    enveloping: Option<String>,
    ambiguous: bool,
    serialisation_module: Option<String>,
    meta: BTreeMap<String, AnnotationValue>,
    config: Config,
}

impl LayerBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_attributes<S: Into<String>>(
        mut self,
        attributes: impl IntoIterator<Item = S>,
    ) -> Self {
        self.attributes = attributes.into_iter().map(|s| s.into()).collect();
        self
    }

    /// Secondary attributes are excluded from comparisons, they must also be declared as attributes
    pub fn with_secondary_attributes<S: Into<String>>(
        mut self,
        attributes: impl IntoIterator<Item = S>,
    ) -> Self {
        self.secondary_attributes = attributes.into_iter().map(|s| s.into()).collect();
        self
    }

    /// Sets the value an attribute gets when a new annotation does not provide one
    pub fn with_default_value(
        mut self,
        attribute: impl Into<String>,
        value: impl Into<AnnotationValue>,
    ) -> Self {
        self.default_values.insert(attribute.into(), value.into());
        self
    }

    /// Makes this a derived layer, aligned with the spans of the parent layer
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Makes this an enveloping layer, its spans wrap spans of the enveloped layer
    pub fn with_enveloping(mut self, enveloping: impl Into<String>) -> Self {
        self.enveloping = Some(enveloping.into());
        self
    }

    pub fn with_ambiguous(mut self, ambiguous: bool) -> Self {
        self.ambiguous = ambiguous;
        self
    }

    pub fn with_serialisation_module(mut self, module: impl Into<String>) -> Self {
        self.serialisation_module = Some(module.into());
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<AnnotationValue>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Validates the schema and returns the empty layer
    pub fn build(self) -> StrataResult<Layer> {
        if !is_identifier(&self.name) {
            return Err(StrataError::SchemaError(
                format!("layer name must be an identifier, got {:?}", self.name),
                "LayerBuilder::build",
            ));
        }
        if self.parent.is_some() && self.enveloping.is_some() {
            return Err(StrataError::SchemaError(
                format!("layer {:?} can't be derived AND enveloping", self.name),
                "LayerBuilder::build",
            ));
        }
        check_attribute_names(&self.attributes, "LayerBuilder::build")?;
        for attribute in self.secondary_attributes.iter() {
            if !self.attributes.contains(attribute) {
                return Err(StrataError::SchemaError(
                    format!(
                        "secondary attribute {:?} is not an attribute of layer {:?}",
                        attribute, self.name
                    ),
                    "LayerBuilder::build",
                ));
            }
        }
        for attribute in self.default_values.keys() {
            if !self.attributes.contains(attribute) {
                return Err(StrataError::SchemaError(
                    format!(
                        "default value for undeclared attribute {:?} in layer {:?}",
                        attribute, self.name
                    ),
                    "LayerBuilder::build",
                ));
            }
        }
        debug(&self.config, || {
            format!(
                "LayerBuilder::build: name={}, attributes={:?}, parent={:?}, enveloping={:?}, ambiguous={}",
                self.name, self.attributes, self.parent, self.enveloping, self.ambiguous
            )
        });
        Ok(Layer {
            name: self.name,
            attributes: self.attributes,
            secondary_attributes: self.secondary_attributes,
            default_values: self.default_values,
            parent: self.parent,
            enveloping: self.enveloping,
            ambiguous: self.ambiguous,
            serialisation_module: self.serialisation_module,
            meta: self.meta,
            spans: SpanList::new(),
            config: self.config,
        })
    }
}

/// A named collection of spans sharing one attribute schema.
///
/// A layer is either flat (no parent, not enveloping), derived (its spans align with the spans of
/// a `parent` layer) or enveloping (its spans wrap spans of the `enveloping` layer). Every mutation
/// validates the structural invariants: spans are sorted, locations are unique, every span has at
/// least one annotation (exactly one if the layer is not ambiguous), every annotation carries
/// exactly the declared attributes and all spans share one span level.
#[derive(Debug, Clone)]
pub struct Layer {
    name: String,
    attributes: Vec<String>,
    secondary_attributes: Vec<String>,
    default_values: BTreeMap<String, AnnotationValue>,
    parent: Option<String>,
    enveloping: Option<String>,
    ambiguous: bool,
    serialisation_module: Option<String>,
    meta: BTreeMap<String, AnnotationValue>,
    spans: SpanList,
    config: Config,
}

/// The result of [`Layer::get`]: a single span, or a snapshot layer when the probe had to be
/// reduced to several spans of this layer.
#[derive(Debug, Clone)]
pub enum Selection<'a> {
    Span(&'a Span),
    Layer(Layer),
}

impl<'a> Selection<'a> {
    pub fn as_span(&self) -> Option<&'a Span> {
        match self {
            Self::Span(span) => Some(span),
            Self::Layer(_) => None,
        }
    }

    pub fn into_layer(self) -> Option<Layer> {
        match self {
            Self::Span(_) => None,
            Self::Layer(layer) => Some(layer),
        }
    }
}

impl Layer {
    /// Shortcut to start building a new layer with a name and attributes
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        attributes: impl IntoIterator<Item = S>,
    ) -> LayerBuilder {
        LayerBuilder::new(name).with_attributes(attributes)
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// The declared attribute names, in order
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn secondary_attributes(&self) -> &[String] {
        &self.secondary_attributes
    }

    pub fn default_values(&self) -> &BTreeMap<String, AnnotationValue> {
        &self.default_values
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn enveloping(&self) -> Option<&str> {
        self.enveloping.as_deref()
    }

    pub fn ambiguous(&self) -> bool {
        self.ambiguous
    }

    pub fn serialisation_module(&self) -> Option<&str> {
        self.serialisation_module.as_deref()
    }

    pub fn set_serialisation_module(&mut self, module: Option<String>) {
        self.serialisation_module = module;
    }

    pub fn meta(&self) -> &BTreeMap<String, AnnotationValue> {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut BTreeMap<String, AnnotationValue> {
        &mut self.meta
    }

    /// The level shared by all spans of this layer, `None` if no span was ever added
    pub fn span_level(&self) -> Option<usize> {
        self.spans.span_level()
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Iterates over the spans in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &Span> {
        self.spans.iter()
    }

    /// Low-level access to the span container
    pub fn span_list(&self) -> &SpanList {
        &self.spans
    }

    /// Returns the span at exactly this location
    pub fn span(&self, base_span: &BaseSpan) -> Option<&Span> {
        self.spans.get(base_span)
    }

    /// Returns the span with this handle
    pub fn span_by_handle(&self, handle: SpanHandle) -> Option<&Span> {
        self.spans.get_by_handle(handle)
    }

    /// Returns the span at a position in sorted order
    pub fn span_by_index(&self, index: usize) -> Option<&Span> {
        self.spans.get_by_index(index)
    }

    /// Start of the first span
    pub fn start(&self) -> Option<usize> {
        self.spans.get_by_index(0).map(|span| span.start())
    }

    /// The farthest end over all spans. Spans are sorted by start so this is not necessarily the last span's end.
    pub fn end(&self) -> Option<usize> {
        self.iter().map(|span| span.end()).max()
    }

    /// Creates an empty layer with the same schema, settings and metadata
    pub fn empty_copy(&self) -> Layer {
        Layer {
            name: self.name.clone(),
            attributes: self.attributes.clone(),
            secondary_attributes: self.secondary_attributes.clone(),
            default_values: self.default_values.clone(),
            parent: self.parent.clone(),
            enveloping: self.enveloping.clone(),
            ambiguous: self.ambiguous,
            serialisation_module: self.serialisation_module.clone(),
            meta: self.meta.clone(),
            spans: SpanList::new(),
            config: self.config.clone(),
        }
    }

    fn check_location_type(&self, base_span: &BaseSpan, contextmsg: &'static str) -> StrataResult<()> {
        if self.enveloping.is_some() && !base_span.is_enveloping() {
            Err(StrataError::TypeMismatch(
                format!(
                    "Cannot add {} to enveloping layer {:?}. Enveloping span is required.",
                    base_span, self.name
                ),
                contextmsg,
            ))
        } else if self.enveloping.is_none() && base_span.is_enveloping() {
            Err(StrataError::TypeMismatch(
                format!(
                    "Cannot add {} to non-enveloping layer {:?}. Elementary span is required.",
                    base_span, self.name
                ),
                contextmsg,
            ))
        } else {
            Ok(())
        }
    }

    /// Adds a complete span to this layer and returns its handle.
    ///
    /// The span must have at least one annotation, exactly one if the layer is not ambiguous,
    /// and every annotation must carry exactly the attributes of the layer.
    /// Fails on a duplicate location or a span level mismatch.
    pub fn add_span(&mut self, span: Span) -> StrataResult<SpanHandle> {
        debug(&self.config, || {
            format!("Layer::add_span: layer={}, span={}", self.name, span)
        });
        self.check_location_type(span.base_span(), "Layer::add_span")?;
        if span.annotations().is_empty() {
            return Err(StrataError::SchemaError(
                format!("the span {} has no annotations", span.base_span()),
                "Layer::add_span",
            ));
        }
        if !self.ambiguous && span.annotations().len() > 1 {
            return Err(StrataError::SchemaError(
                format!(
                    "the layer {:?} is not ambiguous but the span {} has {} annotations",
                    self.name,
                    span.base_span(),
                    span.annotations().len()
                ),
                "Layer::add_span",
            ));
        }
        for annotation in span.annotations() {
            if let Some(msg) = annotation.schema_diff(&self.attributes) {
                return Err(StrataError::SchemaError(
                    format!("{} in layer {:?}", msg, self.name),
                    "Layer::add_span",
                ));
            }
        }
        self.spans.insert(span)
    }

    /// Adds a new annotation at the given location and returns it.
    ///
    /// The location can be anything implementing [`ToBaseSpan`], for instance `(start, end)` or,
    /// for enveloping layers, a list of `(start, end)` tuples. Attribute values are resolved from the layer's default values
    /// and the builder, attributes the layer does not declare are discarded. A new span is created if
    /// none exists at the location yet; otherwise the annotation is appended if the layer is ambiguous,
    /// and an error is returned if it isn't.
    pub fn add_annotation(
        &mut self,
        location: impl ToBaseSpan,
        builder: AnnotationBuilder,
    ) -> StrataResult<&Annotation> {
        let base_span = location.to_base_span()?;
        self.check_location_type(&base_span, "Layer::add_annotation")?;
        debug(&self.config, || {
            format!(
                "Layer::add_annotation: layer={}, base_span={}",
                self.name, base_span
            )
        });
        let annotation: Annotation = builder.build(&self.attributes, &self.default_values);
        if self.spans.contains(&base_span) {
            if !self.ambiguous {
                return Err(StrataError::DuplicateSpan(
                    base_span.to_string(),
                    "Layer::add_annotation",
                ));
            }
            let span = self.spans.get_mut(&base_span).ok_or_else(|| {
                StrataError::NotFound(base_span.to_string(), "Layer::add_annotation")
            })?;
            Ok(span.push_annotation(annotation))
        } else {
            let handle = self
                .spans
                .insert(Span::new(base_span.clone()).with_annotation(annotation))?;
            let span = self.spans.get_by_handle(handle).ok_or_else(|| {
                StrataError::NotFound(base_span.to_string(), "Layer::add_annotation")
            })?;
            span.annotations().last().ok_or_else(|| {
                StrataError::NotFound(base_span.to_string(), "Layer::add_annotation")
            })
        }
    }

    /// Replaces all annotations of the span at `location`. Used by code that rewrites
    /// a layer in place; the same rules as for [`Layer::add_span`] apply.
    pub fn set_annotations(
        &mut self,
        location: impl ToBaseSpan,
        builders: Vec<AnnotationBuilder>,
    ) -> StrataResult<()> {
        let base_span = location.to_base_span()?;
        if builders.is_empty() {
            return Err(StrataError::SchemaError(
                format!("the span {} would have no annotations", base_span),
                "Layer::set_annotations",
            ));
        }
        if !self.ambiguous && builders.len() > 1 {
            return Err(StrataError::SchemaError(
                format!(
                    "the layer {:?} is not ambiguous, got {} annotations",
                    self.name,
                    builders.len()
                ),
                "Layer::set_annotations",
            ));
        }
        let annotations: Vec<Annotation> = builders
            .iter()
            .map(|builder| builder.build(&self.attributes, &self.default_values))
            .collect();
        let span = self.spans.get_mut(&base_span).ok_or_else(|| {
            StrataError::NotFound(base_span.to_string(), "Layer::set_annotations")
        })?;
        span.replace_annotations(annotations);
        Ok(())
    }

    /// Keeps only the annotations of the span at `location` for which `keep` holds (given the index and annotation).
    /// Refuses to remove all annotations.
    pub(crate) fn retain_annotations(
        &mut self,
        base_span: &BaseSpan,
        keep: impl FnMut(usize, &Annotation) -> bool,
    ) -> StrataResult<()> {
        let span = self.spans.get_mut(base_span).ok_or_else(|| {
            StrataError::NotFound(base_span.to_string(), "Layer::retain_annotations")
        })?;
        let backup = span.annotations().to_vec();
        span.retain_annotations(keep);
        if span.annotations().is_empty() {
            span.replace_annotations(backup);
            return Err(StrataError::SchemaError(
                format!("the span {} would have no annotations", base_span),
                "Layer::retain_annotations",
            ));
        }
        Ok(())
    }

    /// Mutable access to a span, to change annotation values in place
    pub fn span_mut(&mut self, base_span: &BaseSpan) -> Option<&mut Span> {
        self.spans.get_mut(base_span)
    }

    /// Mutable access to a span by handle
    pub fn span_mut_by_handle(&mut self, handle: SpanHandle) -> Option<&mut Span> {
        self.spans.get_mut_by_handle(handle)
    }

    /// Resolves a location to the span of this layer.
    ///
    /// Returns `Ok(None)` if the layer is empty or nothing matches. If the probe is at a higher level
    /// than this layer, it is reduced to this layer's level: a single result yields the span, several
    /// results yield a snapshot [`Layer`] over exactly those spans, in which case all of them must be found.
    pub fn get(&self, item: impl ToBaseSpan) -> StrataResult<Option<Selection<'_>>> {
        let level = match self.span_level() {
            Some(level) if !self.is_empty() => level,
            _ => return Ok(None),
        };
        let item = item.to_base_span()?;
        if item.level() == level {
            return Ok(self.span(&item).map(Selection::Span));
        }
        if item.level() < level {
            return Ok(None);
        }
        let reduced = item.reduce(level)?;
        Ok(Some(Selection::Layer(self.get_many(&reduced)?)))
    }

    /// Returns a snapshot layer over the spans at exactly these locations; all must be found.
    pub fn get_many(&self, items: &[BaseSpan]) -> StrataResult<Layer> {
        let mut layer = self.empty_copy();
        for item in items {
            let span = self
                .span(item)
                .ok_or_else(|| StrataError::NotFound(item.to_string(), "Layer::get_many"))?;
            if !layer.spans.contains(item) {
                layer.spans.insert(span.clone())?;
            }
        }
        Ok(layer)
    }

    /// Returns a snapshot layer over the spans at these positions (in sorted order)
    pub fn select(&self, indices: &[usize]) -> StrataResult<Layer> {
        let mut layer = self.empty_copy();
        for index in indices {
            let span = self.span_by_index(*index).ok_or_else(|| {
                StrataError::NotFound(format!("span index {}", index), "Layer::select")
            })?;
            if !layer.spans.contains(span.base_span()) {
                layer.spans.insert(span.clone())?;
            }
        }
        Ok(layer)
    }

    /// Returns a snapshot layer over the spans for which the predicate holds
    pub fn filter(&self, predicate: impl Fn(&Span) -> bool) -> StrataResult<Layer> {
        let mut layer = self.empty_copy();
        for span in self.iter().filter(|span| predicate(span)) {
            layer.spans.insert(span.clone())?;
        }
        Ok(layer)
    }

    /// Removes the span at this location and returns it
    pub fn remove_span(&mut self, location: impl ToBaseSpan) -> StrataResult<Span> {
        let base_span = location.to_base_span()?;
        debug(&self.config, || {
            format!("Layer::remove_span: layer={}, base_span={}", self.name, base_span)
        });
        self.spans
            .remove(&base_span)
            .ok_or_else(|| StrataError::NotFound(base_span.to_string(), "Layer::remove_span"))
    }

    /// Removes all spans. The span level is preserved, so the layer still only accepts spans of the level it was built to.
    pub fn clear_spans(&mut self) {
        self.spans.clear();
    }

    /// Compares two annotations, disregarding the secondary attributes of this layer
    pub fn annotations_equal(&self, a: &Annotation, b: &Annotation) -> bool {
        a.equals_ignoring(b, &self.secondary_attributes)
    }

    fn spans_equal(&self, a: &Span, b: &Span) -> bool {
        a.base_span() == b.base_span()
            && a.annotations().len() == b.annotations().len()
            && a.annotations().iter().all(|x| {
                b.annotations()
                    .iter()
                    .any(|y| self.annotations_equal(x, y))
            })
            && b.annotations().iter().all(|y| {
                a.annotations()
                    .iter()
                    .any(|x| self.annotations_equal(x, y))
            })
    }

    /// Checks the span consistency of the layer, returns `None` if everything is fine,
    /// otherwise a message describing the first violation found.
    pub fn check_span_consistency(&self) -> Option<String> {
        let mut previous: Option<&Span> = None;
        for handle in self.spans.handles() {
            let span = match self.spans.get_by_handle(handle) {
                Some(span) => span,
                None => return Some(format!("dangling span handle {:?} in layer {:?}", handle, self.name)),
            };
            if span.handle() != Some(handle) {
                return Some(format!(
                    "the span {} is not owned by layer {:?}",
                    span.base_span(),
                    self.name
                ));
            }
            if let Some(previous) = previous {
                match previous.base_span().cmp(span.base_span()) {
                    std::cmp::Ordering::Equal => {
                        return Some(format!(
                            "duplicate base span {} in layer {:?}",
                            span.base_span(),
                            self.name
                        ))
                    }
                    std::cmp::Ordering::Greater => {
                        return Some(format!(
                            "the spans of layer {:?} are not sorted: {} > {}",
                            self.name,
                            previous.base_span(),
                            span.base_span()
                        ))
                    }
                    std::cmp::Ordering::Less => {}
                }
            }
            previous = Some(span);
            if Some(span.level()) != self.span_level() {
                return Some(format!(
                    "the span {} has level {} but layer {:?} has span level {:?}",
                    span.base_span(),
                    span.level(),
                    self.name,
                    self.span_level()
                ));
            }
            let annotations = span.annotations();
            if annotations.is_empty() {
                return Some(format!("the span {} has no annotations", span.base_span()));
            }
            if !self.ambiguous && annotations.len() > 1 {
                return Some(format!(
                    "the layer is not ambiguous but the span {} has {} annotations",
                    span.base_span(),
                    annotations.len()
                ));
            }
            for annotation in annotations {
                if annotation.owner() != Some(handle) {
                    return Some(format!(
                        "an annotation of span {} belongs to another span",
                        span.base_span()
                    ));
                }
                if let Some(msg) = annotation.schema_diff(&self.attributes) {
                    return Some(format!("{} in layer {:?}", msg, self.name));
                }
            }
        }
        None
    }

    /// Returns a brief message explaining why two layers differ, `None` if they are equivalent
    pub fn diff(&self, other: &Layer) -> Option<String> {
        if self.name != other.name {
            return Some(format!(
                "Layer names are different: {}!={}",
                self.name, other.name
            ));
        }
        if self.attributes != other.attributes {
            return Some(format!(
                "{} layer attributes differ: {:?} != {:?}",
                self.name, self.attributes, other.attributes
            ));
        }
        if self.secondary_attributes != other.secondary_attributes {
            return Some(format!(
                "{} layer secondary_attributes differ: {:?} != {:?}",
                self.name, self.secondary_attributes, other.secondary_attributes
            ));
        }
        if self.ambiguous != other.ambiguous {
            return Some(format!(
                "{} layer ambiguous differs: {} != {}",
                self.name, self.ambiguous, other.ambiguous
            ));
        }
        if self.parent != other.parent {
            return Some(format!(
                "{} layer parent differs: {:?} != {:?}",
                self.name, self.parent, other.parent
            ));
        }
        if self.enveloping != other.enveloping {
            return Some(format!(
                "{} layer enveloping differs: {:?} != {:?}",
                self.name, self.enveloping, other.enveloping
            ));
        }
        if self.serialisation_module != other.serialisation_module {
            return Some(format!(
                "{} layer serialisation_module differs: {:?} != {:?}",
                self.name, self.serialisation_module, other.serialisation_module
            ));
        }
        if self.len() != other.len()
            || !self
                .iter()
                .zip(other.iter())
                .all(|(a, b)| self.spans_equal(a, b))
        {
            return Some(format!("{} layer spans differ", self.name));
        }
        None
    }

    /// Returns the text of all spans; enveloping spans contribute the text of each leaf
    pub fn text<'t>(&self, text: &'t Text) -> StrataResult<Vec<&'t str>> {
        let mut result = Vec::with_capacity(self.len());
        for span in self.iter() {
            result.extend(text.span_text(span.base_span())?);
        }
        Ok(result)
    }

    /// Returns the text from the start of the first span until the farthest end
    pub fn enclosing_text<'t>(&self, text: &'t Text) -> StrataResult<&'t str> {
        match (self.start(), self.end()) {
            (Some(start), Some(end)) => text.slice(start, end),
            _ => Ok(""),
        }
    }
}

impl PartialEq for Layer {
    fn eq(&self, other: &Self) -> bool {
        self.diff(other).is_none()
    }
}

impl<'a> IntoIterator for &'a Layer {
    type Item = &'a Span;
    type IntoIter = Box<dyn Iterator<Item = &'a Span> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

impl Configurable for Layer {
    fn config(&self) -> &Config {
        &self.config
    }

    fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    fn set_config(&mut self, config: Config) -> &mut Self {
        self.config = config;
        self
    }
}

#[sealed]
impl TypeInfo for Layer {
    fn typeinfo() -> Type {
        Type::Layer
    }
}
