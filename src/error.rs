/*
    Strata (Layered Text Annotation Engine)
        Layers, spans and relations over stand-off annotated text

        Licensed under the GNU General Public License v3
*/

//! This module contains the error type used throughout the library.

use std::error::Error;
use std::fmt;
use std::io;

// ------------------------------ ERROR DEFINITIONS & IMPLEMENTATIONS -------------------------------------------------------------

/// Every fallible operation in this library returns this error type. The last
/// string member of each variant is a context message naming the operation that failed.
#[derive(Debug)]
pub enum StrataError {
    /// An annotation or layer does not comply with the declared attribute schema
    SchemaError(String, &'static str),

    /// A span (or relation) already exists at this location and the layer is not ambiguous
    DuplicateSpan(String, &'static str),

    /// The span level differs from the established one: (expected, given)
    LevelMismatch(usize, usize, &'static str),

    /// An elementary location was passed where an enveloping one is expected, or vice versa, or a raw location is malformed
    TypeMismatch(String, &'static str),

    /// A mandatory argument is missing, for instance a relation without any named spans
    MissingArgument(String, &'static str),

    /// The requested item (layer, span, attribute, span name) does not exist
    NotFound(String, &'static str),

    /// This combination of layer settings is not supported by the operation
    Unsupported(String, &'static str),

    /// An argument has an invalid value
    InvalidArgument(String, &'static str),

    /// Layer dependencies (parent or enveloped layers) are not satisfied
    DependencyError(String, &'static str),

    IOError(io::Error, String, &'static str),
    JsonError(
        serde_path_to_error::Error<serde_json::Error>,
        String,
        &'static str,
    ),
    SerializationError(String),
    CsvError(String),
}

/// Shortcut for results carrying a [`StrataError`]
pub type StrataResult<T> = Result<T, StrataError>;

impl From<&StrataError> for String {
    /// Returns the error message as a String
    fn from(error: &StrataError) -> String {
        match error {
            StrataError::SchemaError(msg, contextmsg) => {
                format!("SchemaError: {} ({})", msg, contextmsg)
            }
            StrataError::DuplicateSpan(location, contextmsg) => format!(
                "DuplicateSpan: the layer is not ambiguous and already contains this span: {} ({})",
                location, contextmsg
            ),
            StrataError::LevelMismatch(expected, given, contextmsg) => format!(
                "LevelMismatch: expected span level {}, got {} ({})",
                expected, given, contextmsg
            ),
            StrataError::TypeMismatch(msg, contextmsg) => {
                format!("TypeMismatch: {} ({})", msg, contextmsg)
            }
            StrataError::MissingArgument(msg, contextmsg) => {
                format!("MissingArgument: {} ({})", msg, contextmsg)
            }
            StrataError::NotFound(item, contextmsg) => {
                format!("NotFound: no such item: {} ({})", item, contextmsg)
            }
            StrataError::Unsupported(msg, contextmsg) => {
                format!("Unsupported: {} ({})", msg, contextmsg)
            }
            StrataError::InvalidArgument(msg, contextmsg) => {
                format!("InvalidArgument: {} ({})", msg, contextmsg)
            }
            StrataError::DependencyError(msg, contextmsg) => {
                format!("DependencyError: {} ({})", msg, contextmsg)
            }
            StrataError::IOError(err, filename, contextmsg) => format!(
                "IOError: Error reading or writing file {}: {} ({})",
                filename, err, contextmsg
            ),
            StrataError::JsonError(err, filename, contextmsg) => format!(
                "JsonError: Error parsing JSON {}: {} ({})",
                filename, err, contextmsg
            ),
            StrataError::SerializationError(msg) => {
                format!("SerializationError: Error during serialization: {}", msg)
            }
            StrataError::CsvError(msg) => format!("CsvError: {}", msg),
        }
    }
}

impl fmt::Display for StrataError {
    /// Formats the error message for printing
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let errmsg: String = String::from(self);
        write!(f, "[StrataError] {}", errmsg)
    }
}

impl Error for StrataError {}

impl From<csv::Error> for StrataError {
    fn from(err: csv::Error) -> Self {
        Self::CsvError(format!("{}", err))
    }
}
