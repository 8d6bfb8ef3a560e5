/*
    Strata (Layered Text Annotation Engine)
        Layers, spans and relations over stand-off annotated text

        Licensed under the GNU General Public License v3
*/

//! This module contains the [`RelationLayer`], a collection of n-ary [`Relation`]s. A relation
//! consists of named, independently located spans ([`NamedSpan`]) and one or more annotations
//! ([`RelationAnnotation`]).
//!
//! A relation does not need to fill in all span names declared by its layer, but it must have at
//! least one named span.

use sealed::sealed;
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt;

use crate::annotation::{Annotation, AnnotationBuilder};
use crate::basespan::{BaseSpan, ToBaseSpan};
use crate::config::{Config, Configurable};
use crate::error::{StrataError, StrataResult};
use crate::layer::{check_attribute_names, is_identifier};
use crate::span::SpanLike;
use crate::text::Text;
use crate::types::*;
use crate::value::AnnotationValue;

/// The annotation type of relations, structurally identical to [`Annotation`] but owned by a [`Relation`]
pub type RelationAnnotation = Annotation<RelationHandle>;

/// The default serialisation module of relation layers
pub const RELATIONS_SERIALISATION_MODULE: &str = "relations_v0";

/// A named span of a [`Relation`]: the role (name) and its location
#[derive(Debug, Clone)]
pub struct NamedSpan {
    name: String,
    base_span: BaseSpan,
    relation: Option<RelationHandle>,
}

impl NamedSpan {
    pub fn new(name: impl Into<String>, base_span: BaseSpan) -> Self {
        Self {
            name: name.into(),
            base_span,
            relation: None,
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn base_span(&self) -> &BaseSpan {
        &self.base_span
    }

    /// Handle of the relation this named span belongs to, if bound
    pub fn relation(&self) -> Option<RelationHandle> {
        self.relation
    }

    pub fn start(&self) -> usize {
        self.base_span.start()
    }

    pub fn end(&self) -> usize {
        self.base_span.end()
    }

    /// Returns the `(name, base span)` pair
    pub fn as_tuple(&self) -> (&str, &BaseSpan) {
        (self.name.as_str(), &self.base_span)
    }

    /// The text of each leaf of this named span
    pub fn text<'t>(&self, text: &'t Text) -> StrataResult<Vec<&'t str>> {
        text.span_text(&self.base_span)
    }

    /// The text from start to end, including any gaps
    pub fn enclosing_text<'t>(&self, text: &'t Text) -> StrataResult<&'t str> {
        text.enclosing_text(&self.base_span)
    }
}

impl PartialEq for NamedSpan {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.base_span == other.base_span
    }
}

impl fmt::Display for NamedSpan {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "NamedSpan({}: {})", self.name, self.base_span)
    }
}

impl ToBaseSpan for &NamedSpan {
    fn to_base_span(self) -> StrataResult<BaseSpan> {
        Ok(self.base_span.clone())
    }
}

impl SpanLike for NamedSpan {
    fn base_span(&self) -> &BaseSpan {
        &self.base_span
    }
}

/// An n-ary relation between named spans, carrying one or more annotations
#[derive(Debug, Clone)]
pub struct Relation {
    handle: Option<RelationHandle>,
    spans: Vec<NamedSpan>,
    annotations: SmallVec<[RelationAnnotation; 1]>,
    span_level: usize,
}

impl Relation {
    /// Creates a new unbound relation without annotations. At least one named span is required and all must share one level.
    pub fn new<S: Into<String>>(spans: impl IntoIterator<Item = (S, BaseSpan)>) -> StrataResult<Self> {
        let spans: Vec<NamedSpan> = spans
            .into_iter()
            .map(|(name, base_span)| NamedSpan::new(name, base_span))
            .collect();
        let span_level = spans
            .first()
            .map(|span| span.base_span.level())
            .ok_or_else(|| {
                StrataError::MissingArgument(
                    "at least one named span must be provided".to_string(),
                    "Relation::new",
                )
            })?;
        for span in spans.iter() {
            if span.base_span.level() != span_level {
                return Err(StrataError::LevelMismatch(
                    span_level,
                    span.base_span.level(),
                    "Relation::new",
                ));
            }
        }
        Ok(Self {
            handle: None,
            spans,
            annotations: SmallVec::new(),
            span_level,
        })
    }

    /// Builder method to add an annotation to an unbound relation
    pub fn with_annotation(mut self, annotation: RelationAnnotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn handle(&self) -> Option<RelationHandle> {
        self.handle
    }

    pub(crate) fn bind(&mut self, handle: RelationHandle) {
        self.handle = Some(handle);
        for span in self.spans.iter_mut() {
            span.relation = Some(handle);
        }
        for annotation in self.annotations.iter_mut() {
            annotation.bind(handle);
        }
    }

    /// The named spans, in the order of the span names of the layer
    pub fn spans(&self) -> &[NamedSpan] {
        &self.spans
    }

    pub fn span_names(&self) -> impl Iterator<Item = &str> {
        self.spans.iter().map(|span| span.name())
    }

    pub fn base_spans(&self) -> impl Iterator<Item = &BaseSpan> {
        self.spans.iter().map(|span| span.base_span())
    }

    /// Returns the named span with this name, if the relation has it
    pub fn span(&self, name: &str) -> Option<&NamedSpan> {
        self.spans.iter().find(|span| span.name == name)
    }

    pub fn span_level(&self) -> usize {
        self.span_level
    }

    pub fn annotations(&self) -> &[RelationAnnotation] {
        &self.annotations
    }

    pub fn annotations_mut(&mut self) -> &mut [RelationAnnotation] {
        &mut self.annotations
    }

    /// Value of an attribute in the first annotation
    pub fn value(&self, attribute: &str) -> Option<&AnnotationValue> {
        self.annotations.first().and_then(|a| a.get(attribute))
    }

    /// Values of an attribute over all annotations
    pub fn values(&self, attribute: &str) -> Vec<&AnnotationValue> {
        self.annotations
            .iter()
            .filter_map(|a| a.get(attribute))
            .collect()
    }

    /// The text of every named span
    pub fn text<'t>(&self, text: &'t Text) -> StrataResult<Vec<Vec<&'t str>>> {
        self.spans.iter().map(|span| span.text(text)).collect()
    }

    /// Checks whether the relation has exactly these named spans, regardless of order
    fn matches<S: AsRef<str>>(&self, spans: &[(S, BaseSpan)]) -> bool {
        self.spans.len() == spans.len()
            && spans.iter().all(|(name, base_span)| {
                self.spans
                    .iter()
                    .any(|span| span.name == name.as_ref() && &span.base_span == base_span)
            })
    }

    fn push_annotation(&mut self, mut annotation: RelationAnnotation) -> &RelationAnnotation {
        if let Some(handle) = self.handle {
            annotation.bind(handle);
        }
        let position = match self.annotations.iter().position(|a| *a == annotation) {
            Some(position) => position,
            None => {
                self.annotations.push(annotation);
                self.annotations.len() - 1
            }
        };
        &self.annotations[position]
    }

    /// Sorts the named spans by the given span name order
    fn sort_spans(&mut self, span_names: &[String]) {
        self.spans.sort_by_key(|span| {
            span_names
                .iter()
                .position(|name| *name == span.name)
                .unwrap_or(span_names.len())
        });
    }
}

impl PartialEq for Relation {
    /// Relations are equal if they have the same named spans (in any order) and the same annotations
    fn eq(&self, other: &Self) -> bool {
        self.spans.len() == other.spans.len()
            && self.spans.iter().all(|s| other.spans.contains(s))
            && self.annotations.len() == other.annotations.len()
            && self
                .annotations
                .iter()
                .all(|a| other.annotations.contains(a))
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Relation([")?;
        for (i, span) in self.spans.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", span)?;
        }
        write!(f, "], [")?;
        for (i, annotation) in self.annotations.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", annotation)?;
        }
        write!(f, "])")
    }
}

/// Builds a new relation annotation: the named spans and the attribute values.
/// Span names and attributes that the layer does not declare are discarded.
///
/// ```
/// # use strata::*;
/// # fn main() -> Result<(), StrataError> {
/// let mut layer = RelationLayer::new("coref", ["mention", "entity"], ["rel_id"]).build()?;
/// layer.add_annotation(
///     RelationBuilder::new()
///         .with_span("mention", (0, 3))
///         .with_span("entity", (7, 13))
///         .with_attribute("rel_id", 0),
/// )?;
/// assert_eq!(layer.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct RelationBuilder {
    spans: Vec<(String, BaseSpan)>,
    annotation: AnnotationBuilder,
    error: Option<StrataError>,
}

impl RelationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns a location to a span name. An invalid location is reported when the builder is used.
    pub fn with_span(mut self, name: impl Into<String>, location: impl ToBaseSpan) -> Self {
        match location.to_base_span() {
            Ok(base_span) => self.spans.push((name.into(), base_span)),
            Err(e) => {
                if self.error.is_none() {
                    self.error = Some(e)
                }
            }
        }
        self
    }

    pub fn with_attribute(
        mut self,
        attribute: impl Into<String>,
        value: impl Into<AnnotationValue>,
    ) -> Self {
        self.annotation = self.annotation.with_attribute(attribute, value);
        self
    }

    pub fn with_attributes<K, V>(mut self, attributes: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<AnnotationValue>,
    {
        self.annotation = self.annotation.with_attributes(attributes);
        self
    }
}

/// Builder for a new [`RelationLayer`], validated when calling [`RelationLayerBuilder::build`].
#[derive(Debug, Clone)]
pub struct RelationLayerBuilder {
    name: String,
    span_names: Vec<String>,
    attributes: Vec<String>,
    secondary_attributes: Vec<String>,
    default_values: BTreeMap<String, AnnotationValue>,
    ambiguous: bool,
    serialisation_module: Option<String>,
    meta: BTreeMap<String, AnnotationValue>,
    config: Config,
}

impl RelationLayerBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            span_names: Vec::new(),
            attributes: Vec::new(),
            secondary_attributes: Vec::new(),
            default_values: BTreeMap::new(),
            ambiguous: false,
            serialisation_module: Some(RELATIONS_SERIALISATION_MODULE.to_string()),
            meta: BTreeMap::new(),
            config: Config::default(),
        }
    }

    pub fn with_span_names<S: Into<String>>(mut self, span_names: impl IntoIterator<Item = S>) -> Self {
        self.span_names = span_names.into_iter().map(|s| s.into()).collect();
        self
    }

    pub fn with_attributes<S: Into<String>>(mut self, attributes: impl IntoIterator<Item = S>) -> Self {
        self.attributes = attributes.into_iter().map(|s| s.into()).collect();
        self
    }

    pub fn with_secondary_attributes<S: Into<String>>(
        mut self,
        attributes: impl IntoIterator<Item = S>,
    ) -> Self {
        self.secondary_attributes = attributes.into_iter().map(|s| s.into()).collect();
        self
    }

    pub fn with_default_value(
        mut self,
        attribute: impl Into<String>,
        value: impl Into<AnnotationValue>,
    ) -> Self {
        self.default_values.insert(attribute.into(), value.into());
        self
    }

    pub fn with_ambiguous(mut self, ambiguous: bool) -> Self {
        self.ambiguous = ambiguous;
        self
    }

    pub fn with_serialisation_module(mut self, module: Option<String>) -> Self {
        self.serialisation_module = module;
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

    pub fn build(self) -> StrataResult<RelationLayer> {
        if !is_identifier(&self.name) {
            return Err(StrataError::SchemaError(
                format!("layer name must be an identifier, got {:?}", self.name),
                "RelationLayerBuilder::build",
            ));
        }
        if self.span_names.is_empty() {
            return Err(StrataError::SchemaError(
                "span_names cannot be empty, at least one span name must be specified".to_string(),
                "RelationLayerBuilder::build",
            ));
        }
        check_attribute_names(&self.span_names, "RelationLayerBuilder::build")?;
        check_attribute_names(&self.attributes, "RelationLayerBuilder::build")?;
        let common: Vec<&String> = self
            .span_names
            .iter()
            .filter(|name| self.attributes.contains(name))
            .collect();
        if !common.is_empty() {
            return Err(StrataError::SchemaError(
                format!(
                    "span_names cannot have overlapping values with attributes: {:?}",
                    common
                ),
                "RelationLayerBuilder::build",
            ));
        }
        for attribute in self.secondary_attributes.iter() {
            if !self.attributes.contains(attribute) {
                return Err(StrataError::SchemaError(
                    format!(
                        "secondary attribute {:?} not listed in attributes {:?}",
                        attribute, self.attributes
                    ),
                    "RelationLayerBuilder::build",
                ));
            }
        }
        for attribute in self.default_values.keys() {
            if !self.attributes.contains(attribute) {
                return Err(StrataError::SchemaError(
                    format!("default value for undeclared attribute {:?}", attribute),
                    "RelationLayerBuilder::build",
                ));
            }
        }
        debug(&self.config, || {
            format!(
                "RelationLayerBuilder::build: name={}, span_names={:?}, attributes={:?}",
                self.name, self.span_names, self.attributes
            )
        });
        Ok(RelationLayer {
            name: self.name,
            span_names: self.span_names,
            attributes: self.attributes,
            secondary_attributes: self.secondary_attributes,
            default_values: self.default_values,
            ambiguous: self.ambiguous,
            serialisation_module: self.serialisation_module,
            meta: self.meta,
            relations: Vec::new(),
            span_level: None,
            config: self.config,
        })
    }
}

/// A collection of [`Relation`]s sharing span names and an attribute schema.
/// Relations are kept in insertion order.
#[derive(Debug, Clone)]
pub struct RelationLayer {
    name: String,
    span_names: Vec<String>,
    attributes: Vec<String>,
    secondary_attributes: Vec<String>,
    default_values: BTreeMap<String, AnnotationValue>,
    ambiguous: bool,
    serialisation_module: Option<String>,
    meta: BTreeMap<String, AnnotationValue>,
    relations: Store<Relation>,
    /// Level of the named spans, fixed by the first relation and kept when relations are removed
    span_level: Option<usize>,
    config: Config,
}

impl RelationLayer {
    /// Shortcut to start building a new relation layer
    pub fn new<S: Into<String>, T: Into<String>>(
        name: impl Into<String>,
        span_names: impl IntoIterator<Item = S>,
        attributes: impl IntoIterator<Item = T>,
    ) -> RelationLayerBuilder {
        RelationLayerBuilder::new(name)
            .with_span_names(span_names)
            .with_attributes(attributes)
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn span_names(&self) -> &[String] {
        &self.span_names
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn secondary_attributes(&self) -> &[String] {
        &self.secondary_attributes
    }

    pub fn default_values(&self) -> &BTreeMap<String, AnnotationValue> {
        &self.default_values
    }

    pub fn ambiguous(&self) -> bool {
        self.ambiguous
    }

    pub fn serialisation_module(&self) -> Option<&str> {
        self.serialisation_module.as_deref()
    }

    pub fn meta(&self) -> &BTreeMap<String, AnnotationValue> {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut BTreeMap<String, AnnotationValue> {
        &mut self.meta
    }

    /// The level shared by all named spans, `None` if no relation was ever added
    pub fn span_level(&self) -> Option<usize> {
        self.span_level
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Iterates over the relations in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Relation> {
        self.relations.iter().filter_map(|relation| relation.as_ref())
    }

    pub fn relation(&self, handle: RelationHandle) -> Option<&Relation> {
        self.relations
            .get(handle.as_usize())
            .and_then(|relation| relation.as_ref())
    }

    pub fn relation_mut(&mut self, handle: RelationHandle) -> Option<&mut Relation> {
        self.relations
            .get_mut(handle.as_usize())
            .and_then(|relation| relation.as_mut())
    }

    /// Returns the relation at this position in insertion order
    pub fn relation_by_index(&self, index: usize) -> Option<&Relation> {
        self.iter().nth(index)
    }

    /// Creates an empty layer with the same schema and settings
    pub fn empty_copy(&self) -> RelationLayer {
        RelationLayer {
            name: self.name.clone(),
            span_names: self.span_names.clone(),
            attributes: self.attributes.clone(),
            secondary_attributes: self.secondary_attributes.clone(),
            default_values: self.default_values.clone(),
            ambiguous: self.ambiguous,
            serialisation_module: self.serialisation_module.clone(),
            meta: self.meta.clone(),
            relations: Vec::new(),
            span_level: None,
            config: self.config.clone(),
        }
    }

    /// Finds the relation with exactly these named spans (in any order).
    /// Returns `None` if the layer is empty or no such relation exists.
    pub fn get<S: AsRef<str>>(&self, spans: &[(S, BaseSpan)]) -> Option<&Relation> {
        self.iter().find(|relation| relation.matches(spans))
    }

    fn find_handle<S: AsRef<str>>(&self, spans: &[(S, BaseSpan)]) -> Option<RelationHandle> {
        self.iter()
            .find(|relation| relation.matches(spans))
            .and_then(|relation| relation.handle())
    }

    /// Fails if a relation other than `handle` has exactly these named spans
    fn check_duplicate<S: AsRef<str>>(
        &self,
        handle: RelationHandle,
        spans: &[(S, BaseSpan)],
        contextmsg: &'static str,
    ) -> StrataResult<()> {
        match self
            .iter()
            .find(|relation| relation.handle() != Some(handle) && relation.matches(spans))
        {
            Some(other) => Err(StrataError::DuplicateSpan(other.to_string(), contextmsg)),
            None => Ok(()),
        }
    }

    fn check_span_name(&self, name: &str, contextmsg: &'static str) -> StrataResult<()> {
        if self.span_names.iter().any(|n| n == name) {
            Ok(())
        } else {
            Err(StrataError::NotFound(
                format!(
                    "span name {:?}, valid span names are {:?}",
                    name, self.span_names
                ),
                contextmsg,
            ))
        }
    }

    /// Adds a new relation annotation and returns it.
    ///
    /// At least one declared span name must be given. If a relation with exactly these named
    /// spans exists, the annotation is added to it (only if the layer is ambiguous); otherwise a new
    /// relation is created, which must match the span level of the layer.
    pub fn add_annotation(&mut self, builder: RelationBuilder) -> StrataResult<&RelationAnnotation> {
        if let Some(error) = builder.error {
            return Err(error);
        }
        let spans: Vec<(String, BaseSpan)> = self
            .span_names
            .iter()
            .filter_map(|name| {
                builder
                    .spans
                    .iter()
                    .find(|(n, _)| n == name)
                    .map(|(n, base_span)| (n.clone(), base_span.clone()))
            })
            .collect();
        if spans.is_empty() {
            return Err(StrataError::MissingArgument(
                format!(
                    "no named spans in {:?}, at least one of {:?} must be defined",
                    builder.spans.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>(),
                    self.span_names
                ),
                "RelationLayer::add_annotation",
            ));
        }
        debug(&self.config, || {
            format!(
                "RelationLayer::add_annotation: layer={}, spans={:?}",
                self.name, spans
            )
        });
        let annotation: RelationAnnotation = builder
            .annotation
            .build(&self.attributes, &self.default_values);
        match self.find_handle(&spans) {
            Some(handle) => {
                let ambiguous = self.ambiguous;
                let relation = self.relation_mut(handle).ok_or_else(|| {
                    StrataError::NotFound(
                        format!("relation {:?}", handle),
                        "RelationLayer::add_annotation",
                    )
                })?;
                if !ambiguous && !relation.annotations.is_empty() {
                    return Err(StrataError::DuplicateSpan(
                        relation.to_string(),
                        "RelationLayer::add_annotation",
                    ));
                }
                Ok(relation.push_annotation(annotation))
            }
            None => {
                let relation = Relation::new(spans)?.with_annotation(annotation);
                let handle = self.insert(relation)?;
                self.relation(handle)
                    .and_then(|relation| relation.annotations.last())
                    .ok_or_else(|| {
                        StrataError::NotFound(
                            format!("relation {:?}", handle),
                            "RelationLayer::add_annotation",
                        )
                    })
            }
        }
    }

    fn insert(&mut self, mut relation: Relation) -> StrataResult<RelationHandle> {
        if let Some(span_level) = self.span_level() {
            if span_level != relation.span_level {
                return Err(StrataError::LevelMismatch(
                    span_level,
                    relation.span_level,
                    "RelationLayer: this layer has a different span level than the new relation",
                ));
            }
        }
        relation.sort_spans(&self.span_names);
        self.span_level = Some(relation.span_level);
        let handle = RelationHandle::new(self.relations.len());
        relation.bind(handle);
        self.relations.push(Some(relation));
        Ok(handle)
    }

    /// Adds a complete relation and returns its handle. All span names must be declared,
    /// the annotations must match the schema and the ambiguity of the layer, and no relation may
    /// exist at exactly the same named spans.
    pub fn add_relation(&mut self, relation: Relation) -> StrataResult<RelationHandle> {
        for span in relation.spans() {
            self.check_span_name(span.name(), "RelationLayer::add_relation")?;
        }
        if relation.annotations.is_empty() {
            return Err(StrataError::SchemaError(
                format!("the relation {} has no annotations", relation),
                "RelationLayer::add_relation",
            ));
        }
        if !self.ambiguous && relation.annotations.len() > 1 {
            return Err(StrataError::SchemaError(
                format!(
                    "the layer {:?} is not ambiguous but the relation has {} annotations",
                    self.name,
                    relation.annotations.len()
                ),
                "RelationLayer::add_relation",
            ));
        }
        for annotation in relation.annotations() {
            if let Some(msg) = annotation.schema_diff(&self.attributes) {
                return Err(StrataError::SchemaError(
                    format!("{} in relation layer {:?}", msg, self.name),
                    "RelationLayer::add_relation",
                ));
            }
        }
        let spans: Vec<(&str, BaseSpan)> = relation
            .spans()
            .iter()
            .map(|span| (span.name(), span.base_span().clone()))
            .collect();
        if self.get(&spans).is_some() {
            return Err(StrataError::DuplicateSpan(
                relation.to_string(),
                "RelationLayer::add_relation",
            ));
        }
        self.insert(relation)
    }

    /// Assigns a location to a span name of an existing relation, replacing any previous location
    pub fn set_span(
        &mut self,
        handle: RelationHandle,
        name: &str,
        location: impl ToBaseSpan,
    ) -> StrataResult<()> {
        self.check_span_name(name, "RelationLayer::set_span")?;
        let base_span = location.to_base_span()?;
        let current = self.relation(handle).ok_or_else(|| {
            StrataError::NotFound(format!("relation {:?}", handle), "RelationLayer::set_span")
        })?;
        let mut spans: Vec<(&str, BaseSpan)> = current
            .spans()
            .iter()
            .filter(|span| span.name() != name)
            .map(|span| (span.name(), span.base_span().clone()))
            .collect();
        spans.push((name, base_span.clone()));
        self.check_duplicate(handle, &spans, "RelationLayer::set_span")?;
        let span_names = self.span_names.clone();
        let relation = self.relation_mut(handle).ok_or_else(|| {
            StrataError::NotFound(format!("relation {:?}", handle), "RelationLayer::set_span")
        })?;
        if base_span.level() != relation.span_level {
            return Err(StrataError::LevelMismatch(
                relation.span_level,
                base_span.level(),
                "RelationLayer::set_span",
            ));
        }
        match relation.spans.iter_mut().find(|span| span.name == name) {
            Some(span) => span.base_span = base_span,
            None => {
                let mut span = NamedSpan::new(name, base_span);
                span.relation = Some(handle);
                relation.spans.push(span);
                relation.sort_spans(&span_names);
            }
        }
        Ok(())
    }

    /// Removes a named span from a relation. The last named span of a relation can not be removed.
    pub fn remove_span(&mut self, handle: RelationHandle, name: &str) -> StrataResult<NamedSpan> {
        if let Some(current) = self.relation(handle) {
            let spans: Vec<(&str, BaseSpan)> = current
                .spans()
                .iter()
                .filter(|span| span.name() != name)
                .map(|span| (span.name(), span.base_span().clone()))
                .collect();
            if !spans.is_empty() && spans.len() < current.spans().len() {
                self.check_duplicate(handle, &spans, "RelationLayer::remove_span")?;
            }
        }
        let relation = self.relation_mut(handle).ok_or_else(|| {
            StrataError::NotFound(format!("relation {:?}", handle), "RelationLayer::remove_span")
        })?;
        let position = relation
            .spans
            .iter()
            .position(|span| span.name == name)
            .ok_or_else(|| {
                StrataError::NotFound(format!("span name {:?}", name), "RelationLayer::remove_span")
            })?;
        if relation.spans.len() == 1 {
            return Err(StrataError::MissingArgument(
                format!(
                    "cannot remove the last span of the relation, a relation must have at least one span: {}",
                    relation
                ),
                "RelationLayer::remove_span",
            ));
        }
        Ok(relation.spans.remove(position))
    }

    /// Removes a relation from the layer and returns it
    pub fn remove_relation(&mut self, handle: RelationHandle) -> StrataResult<Relation> {
        debug(&self.config, || {
            format!("RelationLayer::remove_relation: layer={}, {:?}", self.name, handle)
        });
        self.relations
            .get_mut(handle.as_usize())
            .and_then(|relation| relation.take())
            .ok_or_else(|| {
                StrataError::NotFound(
                    format!("relation {:?}", handle),
                    "RelationLayer::remove_relation",
                )
            })
    }

    /// Removes all relations
    pub fn clear_relations(&mut self) {
        self.relations.clear();
    }

    /// Checks the consistency of all relations, returns `None` if everything is fine
    pub fn check_relation_consistency(&self) -> Option<String> {
        let span_level = self.span_level();
        for (i, slot) in self.relations.iter().enumerate() {
            let relation = match slot {
                Some(relation) => relation,
                None => continue,
            };
            if relation.handle().map(|h| h.as_usize()) != Some(i) {
                return Some(format!(
                    "the relation {} is not owned by relation layer {:?}",
                    relation, self.name
                ));
            }
            if relation.spans.is_empty() {
                return Some(format!("a relation in layer {:?} has no named spans", self.name));
            }
            for (j, span) in relation.spans.iter().enumerate() {
                if !self.span_names.contains(&span.name) {
                    return Some(format!(
                        "unknown span name {:?} in relation layer {:?}",
                        span.name, self.name
                    ));
                }
                if relation.spans[..j].iter().any(|s| s.name == span.name) {
                    return Some(format!(
                        "repeated span name {:?} in relation {}",
                        span.name, relation
                    ));
                }
                if Some(span.base_span.level()) != span_level {
                    return Some(format!(
                        "the named span {} has level {} but layer {:?} has span level {:?}",
                        span,
                        span.base_span.level(),
                        self.name,
                        span_level
                    ));
                }
            }
            let spans: Vec<(&str, BaseSpan)> = relation
                .spans
                .iter()
                .map(|span| (span.name(), span.base_span().clone()))
                .collect();
            if let Some(other) = self.relations[..i]
                .iter()
                .flatten()
                .find(|other| other.matches(&spans))
            {
                return Some(format!(
                    "the relations {} and {} have the same named spans",
                    other, relation
                ));
            }
            if relation.annotations.is_empty() {
                return Some(format!("the relation {} has no annotations", relation));
            }
            if !self.ambiguous && relation.annotations.len() > 1 {
                return Some(format!(
                    "the layer is not ambiguous but the relation {} has {} annotations",
                    relation,
                    relation.annotations.len()
                ));
            }
            for annotation in relation.annotations() {
                if annotation.owner() != relation.handle() {
                    return Some(format!(
                        "an annotation of relation {} belongs to another relation",
                        relation
                    ));
                }
                if let Some(msg) = annotation.schema_diff(&self.attributes) {
                    return Some(format!("{} in relation layer {:?}", msg, self.name));
                }
            }
        }
        None
    }

    /// Returns a brief message explaining why two relation layers differ, `None` if they are equivalent
    pub fn diff(&self, other: &RelationLayer) -> Option<String> {
        if self.name != other.name {
            return Some(format!(
                "Layer names are different: {}!={}",
                self.name, other.name
            ));
        }
        if self.span_names != other.span_names {
            return Some(format!(
                "{} layer span_names differ: {:?} != {:?}",
                self.name, self.span_names, other.span_names
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
        if self.serialisation_module != other.serialisation_module {
            return Some(format!(
                "{} layer serialisation_module differs: {:?} != {:?}",
                self.name, self.serialisation_module, other.serialisation_module
            ));
        }
        if self.len() != other.len() || !self.iter().zip(other.iter()).all(|(a, b)| a == b) {
            return Some(format!("{} layer relations differ", self.name));
        }
        None
    }
}

impl PartialEq for RelationLayer {
    fn eq(&self, other: &Self) -> bool {
        self.diff(other).is_none()
    }
}

impl<'a> IntoIterator for &'a RelationLayer {
    type Item = &'a Relation;
    type IntoIter = Box<dyn Iterator<Item = &'a Relation> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

impl Configurable for RelationLayer {
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
impl TypeInfo for RelationLayer {
    fn typeinfo() -> Type {
        Type::RelationLayer
    }
}
