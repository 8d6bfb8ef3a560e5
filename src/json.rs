/*
    Strata (Layered Text Annotation Engine)
        Layers, spans and relations over stand-off annotated text

        Licensed under the GNU General Public License v3
*/

//! This module contains the [`ToJson`] and [`FromJson`] traits that are used
//! in serialisation to/from the JSON dict form. The dict structures themselves
//! live in the [`crate::dict`] module.

use crate::config::Config;
use crate::error::StrataError;
use crate::file::*;
use crate::types::*;

pub trait ToJson
where
    Self: TypeInfo + serde::Serialize,
{
    /// Writes a serialisation to any writer
    /// Lower-level function
    fn to_json_writer<W>(&self, writer: W, compact: bool) -> Result<(), StrataError>
    where
        W: std::io::Write,
    {
        match compact {
            false => serde_json::to_writer_pretty(writer, &self).map_err(|e| {
                StrataError::SerializationError(format!(
                    "Writing {} to file: {}",
                    Self::typeinfo(),
                    e
                ))
            }),
            true => serde_json::to_writer(writer, &self).map_err(|e| {
                StrataError::SerializationError(format!(
                    "Writing {} to file: {}",
                    Self::typeinfo(),
                    e
                ))
            }),
        }
    }

    /// Writes this structure to a file
    /// The actual dataformat can be set via `config`, the default is pretty-printed JSON.
    fn to_json_file(&self, filename: &str, config: &Config) -> Result<(), StrataError> {
        debug(config, || {
            format!("{}.to_json_file: filename={:?}", Self::typeinfo(), filename)
        });
        let DataFormat::Json { compact } = config.dataformat();
        let writer = open_file_writer(filename, config)?;
        self.to_json_writer(writer, compact)
    }

    /// Serializes this structure to one string.
    fn to_json_string(&self, config: &Config) -> Result<String, StrataError> {
        match config.dataformat() {
            DataFormat::Json { compact: false } => serde_json::to_string_pretty(&self)
                .map_err(|e| {
                    StrataError::SerializationError(format!(
                        "Writing {} to string: {}",
                        Self::typeinfo(),
                        e
                    ))
                }),
            DataFormat::Json { compact: true } => serde_json::to_string(&self).map_err(|e| {
                StrataError::SerializationError(format!(
                    "Writing {} to string: {}",
                    Self::typeinfo(),
                    e
                ))
            }),
        }
    }
}

pub trait FromJson
where
    Self: TypeInfo + Sized,
{
    fn from_json_file(filename: &str, config: Config) -> Result<Self, StrataError>;

    fn from_json_str(string: &str, config: Config) -> Result<Self, StrataError>;
}
