/*
    Strata (Layered Text Annotation Engine)
        Layers, spans and relations over stand-off annotated text

        Licensed under the GNU General Public License v3
*/

//! This module contains the [`Annotation`] type: a mapping from attribute names to values,
//! as well as the [`AnnotationBuilder`] that is used to add new annotations to layers.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{StrataError, StrataResult};
use crate::types::*;
use crate::value::AnnotationValue;

/// An annotation maps the attribute names of its layer to values.
///
/// It holds a non-owning back-reference (a handle) to the span (or relation) that owns it, the
/// handle type `H` determines which. Annotations on relations are exposed as [`crate::RelationAnnotation`].
/// Equality only considers the attributes, not the owner.
#[derive(Debug, Clone)]
pub struct Annotation<H: Handle = SpanHandle> {
    owner: Option<H>,
    attributes: BTreeMap<String, AnnotationValue>,
}

impl<H: Handle> Default for Annotation<H> {
    fn default() -> Self {
        Self {
            owner: None,
            attributes: BTreeMap::new(),
        }
    }
}

impl<H: Handle> PartialEq for Annotation<H> {
    fn eq(&self, other: &Self) -> bool {
        self.attributes == other.attributes
    }
}

impl<H: Handle> Annotation<H> {
    /// Creates a new unbound annotation with exactly the given attributes.
    pub fn new(attributes: BTreeMap<String, AnnotationValue>) -> Self {
        Self {
            owner: None,
            attributes,
        }
    }

    /// Returns a handle to the span (or relation) owning this annotation, `None` if it is not bound yet.
    pub fn owner(&self) -> Option<H> {
        self.owner
    }

    pub(crate) fn bind(&mut self, owner: H) {
        self.owner = Some(owner);
    }

    /// Get the value of an attribute
    pub fn get(&self, attribute: &str) -> Option<&AnnotationValue> {
        self.attributes.get(attribute)
    }

    /// Sets the value of an existing attribute. New attributes can not be introduced this
    /// way as every annotation must carry exactly the attributes of its layer.
    pub fn set(
        &mut self,
        attribute: &str,
        value: impl Into<AnnotationValue>,
    ) -> StrataResult<()> {
        if let Some(slot) = self.attributes.get_mut(attribute) {
            *slot = value.into();
            Ok(())
        } else {
            Err(StrataError::SchemaError(
                format!("annotation has no attribute {:?}", attribute),
                "Annotation::set",
            ))
        }
    }

    pub fn contains(&self, attribute: &str) -> bool {
        self.attributes.contains_key(attribute)
    }

    /// Iterates over attribute names and values, ordered by name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnnotationValue)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Returns the underlying attribute map
    pub fn attributes(&self) -> &BTreeMap<String, AnnotationValue> {
        &self.attributes
    }

    /// Compares attributes, skipping the `secondary` ones
    pub fn equals_ignoring(&self, other: &Self, secondary: &[String]) -> bool {
        let is_primary = |k: &String| !secondary.contains(k);
        self.attributes
            .iter()
            .filter(|(k, _)| is_primary(k))
            .eq(other.attributes.iter().filter(|(k, _)| is_primary(k)))
    }

    /// Re-targets the annotation to another owner type, keeping the attributes
    pub(crate) fn retarget<O: Handle>(&self) -> Annotation<O> {
        Annotation {
            owner: None,
            attributes: self.attributes.clone(),
        }
    }

    /// Checks that the attribute names equal `schema` exactly, returns a diagnostic otherwise
    pub(crate) fn schema_diff(&self, schema: &[String]) -> Option<String> {
        let extra: Vec<&str> = self
            .keys()
            .filter(|k| !schema.iter().any(|a| a == k))
            .collect();
        let missing: Vec<&str> = schema
            .iter()
            .map(|a| a.as_str())
            .filter(|a| !self.contains(a))
            .collect();
        if extra.is_empty() && missing.is_empty() {
            None
        } else {
            Some(format!(
                "extra annotation attributes: {:?}, missing annotation attributes: {:?}",
                extra, missing
            ))
        }
    }
}

impl<H: Handle> fmt::Display for Annotation<H> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.attributes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}: {}", key, value)?;
        }
        write!(f, "}}")
    }
}

/// Builds the attributes of a new annotation. Values come from three levels,
/// in increasing priority: the layer's default values, attributes passed in bulk via
/// [`AnnotationBuilder::with_attributes`], and attributes set one by one via [`AnnotationBuilder::with_attribute`].
/// Attributes that the layer does not declare are silently discarded when building.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationBuilder {
    dict: BTreeMap<String, AnnotationValue>,
    overrides: BTreeMap<String, AnnotationValue>,
}

impl AnnotationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a single attribute, takes precedence over bulk attributes
    pub fn with_attribute(
        mut self,
        attribute: impl Into<String>,
        value: impl Into<AnnotationValue>,
    ) -> Self {
        self.overrides.insert(attribute.into(), value.into());
        self
    }

    /// Sets attributes in bulk
    pub fn with_attributes<K, V>(mut self, attributes: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<AnnotationValue>,
    {
        for (key, value) in attributes {
            self.dict.insert(key.into(), value.into());
        }
        self
    }

    /// Resolves the attribute values for the given schema
    pub(crate) fn build<H: Handle>(
        &self,
        schema: &[String],
        defaults: &BTreeMap<String, AnnotationValue>,
    ) -> Annotation<H> {
        let mut attributes = BTreeMap::new();
        for attribute in schema {
            let value = self
                .overrides
                .get(attribute)
                .or_else(|| self.dict.get(attribute))
                .or_else(|| defaults.get(attribute))
                .cloned()
                .unwrap_or_default();
            attributes.insert(attribute.clone(), value);
        }
        Annotation::new(attributes)
    }
}

impl<H: Handle> From<&Annotation<H>> for AnnotationBuilder {
    fn from(annotation: &Annotation<H>) -> Self {
        Self {
            dict: annotation.attributes.clone(),
            overrides: BTreeMap::new(),
        }
    }
}
