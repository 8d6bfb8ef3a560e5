/*
    Strata (Layered Text Annotation Engine)
        Layers, spans and relations over stand-off annotated text

        Licensed under the GNU General Public License v3
*/

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The value of an attribute in an [`crate::Annotation`].
/// In the dict form, values serialise as plain JSON values.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(untagged)]
pub enum AnnotationValue {
    ///No value
    #[default]
    Null,
    Bool(bool),
    Int(isize),
    Float(f64),
    String(String),

    ///Value is an ordered list
    List(Vec<AnnotationValue>),

    ///Value is a nested mapping
    Map(BTreeMap<String, AnnotationValue>),
}

impl AnnotationValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Numeric view on the value, booleans and non-numeric values have none
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for AnnotationValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Null => write!(f, "None"),
            Self::Bool(true) => write!(f, "True"),
            Self::Bool(false) => write!(f, "False"),
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::String(v) => write!(f, "{}", v),
            Self::List(v) => {
                write!(f, "[")?;
                for (i, item) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Self::Map(v) => {
                write!(f, "{{")?;
                for (i, (key, item)) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, item)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<&str> for AnnotationValue {
    fn from(item: &str) -> Self {
        Self::String(item.to_string())
    }
}

impl From<String> for AnnotationValue {
    fn from(item: String) -> Self {
        Self::String(item)
    }
}

impl From<&String> for AnnotationValue {
    fn from(item: &String) -> Self {
        Self::String(item.clone())
    }
}

impl From<f64> for AnnotationValue {
    fn from(item: f64) -> Self {
        Self::Float(item)
    }
}

impl From<f32> for AnnotationValue {
    fn from(item: f32) -> Self {
        Self::Float(item as f64)
    }
}

impl From<isize> for AnnotationValue {
    fn from(item: isize) -> Self {
        Self::Int(item)
    }
}

impl From<i64> for AnnotationValue {
    fn from(item: i64) -> Self {
        Self::Int(item as isize)
    }
}

impl From<i32> for AnnotationValue {
    fn from(item: i32) -> Self {
        Self::Int(item as isize)
    }
}

impl From<usize> for AnnotationValue {
    fn from(item: usize) -> Self {
        Self::Int(item as isize)
    }
}

impl From<u32> for AnnotationValue {
    fn from(item: u32) -> Self {
        Self::Int(item as isize)
    }
}

impl From<bool> for AnnotationValue {
    fn from(item: bool) -> Self {
        Self::Bool(item)
    }
}

impl From<Vec<AnnotationValue>> for AnnotationValue {
    fn from(item: Vec<AnnotationValue>) -> Self {
        Self::List(item)
    }
}

impl<T> From<Option<T>> for AnnotationValue
where
    T: Into<AnnotationValue>,
{
    fn from(item: Option<T>) -> Self {
        match item {
            Some(item) => item.into(),
            None => Self::Null,
        }
    }
}

// These PartialEq implementation allow for more direct comparisons

impl PartialEq<str> for AnnotationValue {
    fn eq(&self, other: &str) -> bool {
        match self {
            Self::String(v) => v == other,
            _ => false,
        }
    }
}

impl PartialEq<&str> for AnnotationValue {
    fn eq(&self, other: &&str) -> bool {
        match self {
            Self::String(v) => v == *other,
            _ => false,
        }
    }
}

impl PartialEq<AnnotationValue> for str {
    fn eq(&self, other: &AnnotationValue) -> bool {
        match other {
            AnnotationValue::String(v) => v.as_str() == self,
            _ => false,
        }
    }
}

impl PartialEq<f64> for AnnotationValue {
    fn eq(&self, other: &f64) -> bool {
        match self {
            Self::Float(v) => v == other,
            _ => false,
        }
    }
}

impl PartialEq<isize> for AnnotationValue {
    fn eq(&self, other: &isize) -> bool {
        match self {
            Self::Int(v) => v == other,
            _ => false,
        }
    }
}

impl PartialEq<bool> for AnnotationValue {
    fn eq(&self, other: &bool) -> bool {
        match self {
            Self::Bool(v) => v == other,
            _ => false,
        }
    }
}
