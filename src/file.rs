/*
    Strata (Layered Text Annotation Engine)
        Layers, spans and relations over stand-off annotated text

        Licensed under the GNU General Public License v3
*/

//! This module contains some common helper functions for dealing with file I/O

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::StrataError;
use crate::types::*;

/// Get a file for reading or writing, this resolves relative files against the working directory
pub(crate) fn get_filepath(filename: &str, workdir: Option<&Path>) -> Result<PathBuf, StrataError> {
    if filename == "-" {
        //designates stdin or stdout
        return Ok(filename.into());
    }
    if filename.starts_with("https://") || filename.starts_with("http://") {
        return Err(StrataError::InvalidArgument(
            filename.to_string(),
            "Loading URLs is not supported",
        ));
    }
    let path = if let Some(stripped) = filename.strip_prefix("file://") {
        PathBuf::from(stripped)
    } else {
        PathBuf::from(filename)
    };
    if path.is_absolute() {
        Ok(path)
    } else {
        //check whether we can find one in our workdir first
        if let Some(workdir) = workdir {
            let path = workdir.join(&path);
            if path.is_file() {
                return Ok(path);
            }
        }

        //final fallback is simply relative to the current working directly
        Ok(path)
    }
}

/// Auxiliary function to help open files
pub(crate) fn open_file(filename: &str, config: &Config) -> Result<File, StrataError> {
    let found_filename = get_filepath(filename, config.workdir())?;
    debug(config, || format!("open_file: {:?}", found_filename));
    File::open(found_filename.as_path()).map_err(|e| {
        StrataError::IOError(
            e,
            found_filename.to_string_lossy().into_owned(),
            "Opening file for reading failed",
        )
    })
}

/// Auxiliary function to help create files
pub(crate) fn create_file(filename: &str, config: &Config) -> Result<File, StrataError> {
    let found_filename = get_filepath(filename, config.workdir())?;
    debug(config, || format!("create_file: {:?}", found_filename));
    File::create(found_filename.as_path()).map_err(|e| {
        StrataError::IOError(
            e,
            found_filename.to_string_lossy().into_owned(),
            "Opening file for writing failed",
        )
    })
}

/// Opens a buffered reader, `-` reads from standard input
pub(crate) fn open_file_reader(
    filename: &str,
    config: &Config,
) -> Result<Box<dyn BufRead>, StrataError> {
    if filename == "-" {
        Ok(Box::new(std::io::stdin().lock()))
    } else {
        Ok(Box::new(BufReader::new(open_file(filename, config)?)))
    }
}

/// Opens a buffered writer, `-` writes to standard output
pub(crate) fn open_file_writer(
    filename: &str,
    config: &Config,
) -> Result<Box<dyn Write>, StrataError> {
    if filename == "-" {
        Ok(Box::new(std::io::stdout()))
    } else {
        Ok(Box::new(BufWriter::new(create_file(filename, config)?)))
    }
}
