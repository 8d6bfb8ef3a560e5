/*
    Strata (Layered Text Annotation Engine)
        Layers, spans and relations over stand-off annotated text

        Licensed under the GNU General Public License v3
*/

//! ## Introduction
//!
//! Strata is a library for layered stand-off annotation of text. A [`Text`] holds a raw string
//! and any number of named layers on top of it. Every layer is a sorted collection of spans
//! that point into the text by character offsets, and every span carries one or more annotations
//! (attribute-value records). Layers can build on each other: a layer can envelop another layer
//! (sentences made of words) or be a derived layer that annotates exactly the spans of its parent
//! (morphological analyses of words). Relation layers link several named locations together
//! (a mention and the entity it refers to, for instance).
//!
//! **What can you do with this library?**
//!
//! * Build texts with layers of (ambiguous) annotations, and query them by location or by attribute.
//! * Validate layers against their schema, and diff layers and texts with readable messages.
//! * Serialise texts and layers to and from JSON.
//! * Iterate over consecutive, touching or intersecting pairs of spans.
//! * Resolve conflicts between overlapping spans, flatten enveloping layers, and compute n-gram fingerprints.
//! * Split texts into sections (also discontinuous ones, such as clauses) and join them back together.
//!
//! All offsets are in unicode codepoints.
//!
//! Main types:
//! * [`Text`]
//! * [`Layer`] and [`LayerBuilder`]
//! * [`Span`] and [`BaseSpan`]
//! * [`Annotation`] and [`AnnotationBuilder`]
//! * [`RelationLayer`], [`Relation`] and [`RelationBuilder`]
//! * [`AnnotationValue`]

mod annotation;
mod attributes;
mod basespan;
mod config;
mod dict;
mod error;
mod file;
mod json;
mod layer;
mod operations;
mod relationlayer;
mod span;
mod spanlist;
mod text;
mod types;
mod value;

// Our internal crate structure is not very relevant to the outside world,
// expose all structs and traits in the root namespace, and be explicit about it:

pub use annotation::{Annotation, AnnotationBuilder};
pub use attributes::AttributeTable;
pub use basespan::{BaseSpan, ElementaryBaseSpan, EnvelopingBaseSpan, RawLocation, ToBaseSpan};
pub use config::{Config, Configurable};
pub use dict::{
    dict_to_layer, dict_to_relation_layer, dict_to_text, layer_to_dict, relation_layer_to_dict,
    text_to_dict, LayerDict, RelationDict, RelationLayerDict, SpanDict, TextDict,
};
pub use error::{StrataError, StrataResult};
pub use json::{FromJson, ToJson};
pub use layer::{Layer, LayerBuilder, Selection};
pub use operations::*;
pub use relationlayer::{
    NamedSpan, Relation, RelationAnnotation, RelationBuilder, RelationLayer,
    RelationLayerBuilder, RELATIONS_SERIALISATION_MODULE,
};
pub use span::{Span, SpanLike};
pub use spanlist::SpanList;
pub use text::Text;
pub use types::*;
pub use value::AnnotationValue;

mod tests;
