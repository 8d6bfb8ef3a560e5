/*
    Strata (Layered Text Annotation Engine)
        Layers, spans and relations over stand-off annotated text

        Licensed under the GNU General Public License v3
*/

use sealed::sealed;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::StrataError;
use crate::file::*;
use crate::json::*;
use crate::types::*;

pub trait Configurable: Sized {
    //// Obtain the configuration
    fn config(&self) -> &Config;

    //// Obtain the configuration mutably
    fn config_mut(&mut self) -> &mut Config;

    ///Builder pattern to associate a configuration
    fn with_config(mut self, config: Config) -> Self {
        self.set_config(config);
        self
    }

    ///Setter to associate a configuration
    fn set_config(&mut self, config: Config) -> &mut Self;
}

/// This holds the configuration. A single configuration is shared by a [`crate::Text`] and all of its layers.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Debug mode
    pub(crate) debug: bool,

    /// The working directory
    pub(crate) workdir: Option<PathBuf>,

    /// The chosen dataformat for serialisation, defaults to pretty-printed JSON.
    pub(crate) dataformat: DataFormat,

    /// Separator between the members of an n-gram in a fingerprint index
    pub(crate) ngram_separator: String,

    /// Check the span consistency of every layer that is constructed from its dict form
    pub(crate) validate_on_load: bool,

    /// Extract sections in parallel
    pub(crate) parallel: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            workdir: None,
            dataformat: DataFormat::Json { compact: false },
            ngram_separator: "-".to_string(),
            validate_on_load: true,
            parallel: true,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable debug mode. In debug mode, verbose output will be printed to standard error output
    pub fn with_debug(mut self, value: bool) -> Self {
        self.debug = value;
        self
    }

    /// Is debug mode enabled or not?
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Sets the working directory, relative file names are resolved against it
    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(workdir.into());
        self
    }

    ///  Return the working directory, if set
    pub fn workdir(&self) -> Option<&Path> {
        self.workdir.as_ref().map(|x| x.as_path())
    }

    /// Sets chosen dataformat for serialisation
    pub fn with_dataformat(mut self, value: DataFormat) -> Self {
        self.dataformat = value;
        self
    }

    /// Returns the configured dataformat for serialisation.
    pub fn dataformat(&self) -> DataFormat {
        self.dataformat
    }

    /// Sets the separator that joins the members of an n-gram
    pub fn with_ngram_separator(mut self, value: impl Into<String>) -> Self {
        self.ngram_separator = value.into();
        self
    }

    pub fn ngram_separator(&self) -> &str {
        self.ngram_separator.as_str()
    }

    /// Enable or disable the consistency check on layers loaded from their dict form
    pub fn with_validate_on_load(mut self, value: bool) -> Self {
        self.validate_on_load = value;
        self
    }

    pub fn validate_on_load(&self) -> bool {
        self.validate_on_load
    }

    /// Enable or disable parallel extraction of sections
    pub fn with_parallel(mut self, value: bool) -> Self {
        self.parallel = value;
        self
    }

    pub fn parallel(&self) -> bool {
        self.parallel
    }

    /// Loads configuration from a JSON file
    pub fn from_file(filename: &str) -> Result<Self, StrataError> {
        let reader = open_file_reader(filename, &Config::default())?;
        let deserializer = &mut serde_json::Deserializer::from_reader(reader);
        let result: Result<Self, _> = serde_path_to_error::deserialize(deserializer);
        result.map_err(|e| {
            StrataError::JsonError(e, filename.to_string(), "Reading config from file")
        })
    }
}

#[sealed]
impl TypeInfo for Config {
    fn typeinfo() -> Type {
        Type::Config
    }
}

impl ToJson for Config {}
