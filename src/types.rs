/*
    Strata (Layered Text Annotation Engine)
        Layers, spans and relations over stand-off annotated text

        Licensed under the GNU General Public License v3
*/

//! This module contains some common types and traits that are shared throughout the library.

use sealed::sealed;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

use crate::config::Config;

/// Type for arena elements. Removed elements leave a `None` behind so handles of other elements remain valid.
pub type Store<T> = Vec<Option<T>>;
//                       ^------- may be None when an element gets removed

/// The handle trait is implemented on the handle types. They refer to an item
/// in a [`Store`] by index. Handles are lightweight and do not borrow anything, they can be passed and copied freely.
/// They serve as the non-owning back-references of the model (annotation to span, named span to relation).
/// This is a sealed trait, not implementable outside this crate.
#[sealed(pub(crate))] //<-- this ensures nobody outside this crate can implement the trait
pub trait Handle:
    Clone + Copy + core::fmt::Debug + PartialEq + Eq + PartialOrd + Ord + Hash
{
    /// Create a new handle for an internal index. You shouldn't need to use this as handles will always be generated for you by higher-level functions.
    fn new(intid: usize) -> Self;
    /// Returns the internal index for this handle
    fn as_usize(&self) -> usize;
}

/// Handle to a [`crate::Span`] in the store of its [`crate::SpanList`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpanHandle(u32);

#[sealed]
impl Handle for SpanHandle {
    fn new(intid: usize) -> Self {
        Self(intid as u32)
    }
    fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

/// Handle to a [`crate::Relation`] in its [`crate::RelationLayer`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelationHandle(u32);

#[sealed]
impl Handle for RelationHandle {
    fn new(intid: usize) -> Self {
        Self(intid as u32)
    }
    fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Annotation,
    Span,
    Layer,
    Relation,
    RelationLayer,
    Text,
    Config,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Self::Annotation => "Annotation",
            Self::Span => "Span",
            Self::Layer => "Layer",
            Self::Relation => "Relation",
            Self::RelationLayer => "RelationLayer",
            Self::Text => "Text",
            Self::Config => "Config",
        };
        write!(f, "{}", s)
    }
}

/// Provides the type of a structure, used in (debug) messages.
#[sealed(pub(crate))]
pub trait TypeInfo {
    fn typeinfo() -> Type;
}

/// The format used for serialisation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataFormat {
    /// JSON in the dict form, optionally without whitespace
    Json { compact: bool },
}

impl Default for DataFormat {
    fn default() -> Self {
        Self::Json { compact: false }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Json { compact: false } => write!(f, "json"),
            Self::Json { compact: true } => write!(f, "json (compact)"),
        }
    }
}

/// Prints a debug message to standard error output, only if debug mode is enabled in the configuration.
/// The message is produced by a closure so nothing is formatted when debugging is off.
pub(crate) fn debug<F>(config: &Config, message_func: F)
where
    F: FnOnce() -> String,
{
    if config.debug() {
        eprintln!("[STRATA DEBUG] {}", message_func());
    }
}
