/*
    Strata (Layered Text Annotation Engine)
        Layers, spans and relations over stand-off annotated text

        Licensed under the GNU General Public License v3
*/

//! Attribute projections: a matrix-shaped view over the spans of a layer and a selection of its
//! attributes, exportable to CSV.

use std::fmt;

use crate::config::Configurable;
use crate::error::{StrataError, StrataResult};
use crate::layer::Layer;
use crate::span::Span;
use crate::text::Text;
use crate::types::*;
use crate::value::AnnotationValue;

/// Pseudo-attributes that are derived from the location of a span rather than its annotations
const INDEX_ATTRIBUTES: [&str; 3] = ["start", "end", "text"];

/// The result of [`Layer::attribute_values`]. The shape depends on whether the layer is ambiguous
/// and on whether a single attribute (without index attributes) was requested.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeTable {
    /// One value per span
    List(Vec<AnnotationValue>),
    /// One row of values per span
    TupleList(Vec<Vec<AnnotationValue>>),
    /// One list of values (one per annotation) per span
    AmbiguousList(Vec<Vec<AnnotationValue>>),
    /// One list of rows (one per annotation) per span
    AmbiguousTupleList(Vec<Vec<Vec<AnnotationValue>>>),
}

impl AttributeTable {
    /// Number of spans covered by this table
    pub fn len(&self) -> usize {
        match self {
            Self::List(v) => v.len(),
            Self::TupleList(v) => v.len(),
            Self::AmbiguousList(v) => v.len(),
            Self::AmbiguousTupleList(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over all rows, ambiguous tables yield one row per annotation
    fn rows(&self) -> Vec<Vec<&AnnotationValue>> {
        match self {
            Self::List(v) => v.iter().map(|value| vec![value]).collect(),
            Self::TupleList(v) => v.iter().map(|row| row.iter().collect()).collect(),
            Self::AmbiguousList(v) => v
                .iter()
                .flat_map(|values| values.iter().map(|value| vec![value]))
                .collect(),
            Self::AmbiguousTupleList(v) => v
                .iter()
                .flat_map(|rows| rows.iter().map(|row| row.iter().collect()))
                .collect(),
        }
    }

    /// Writes the table as CSV, with a header row. Values are rendered via their `Display` implementation.
    pub fn to_csv_writer<W: std::io::Write>(
        &self,
        writer: W,
        header: &[&str],
    ) -> StrataResult<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(header)?;
        for row in self.rows() {
            if row.len() != header.len() {
                return Err(StrataError::CsvError(format!(
                    "row has {} columns, header has {}",
                    row.len(),
                    header.len()
                )));
            }
            writer.write_record(row.iter().map(|value| value.to_string()))?;
        }
        writer.flush().map_err(|e| {
            StrataError::IOError(e, "(csv)".to_string(), "AttributeTable::to_csv_writer")
        })?;
        Ok(())
    }

    /// Returns the table as a CSV string
    pub fn to_csv_string(&self, header: &[&str]) -> StrataResult<String> {
        let mut buffer: Vec<u8> = Vec::new();
        self.to_csv_writer(&mut buffer, header)?;
        String::from_utf8(buffer).map_err(|e| StrataError::CsvError(format!("{}", e)))
    }
}

impl fmt::Display for AttributeTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, row) in self.rows().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for (j, value) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, "\t")?;
                }
                write!(f, "{}", value)?;
            }
        }
        Ok(())
    }
}

impl Layer {
    /// Projects the spans of this layer on the given attributes.
    ///
    /// `index_attributes` may contain `start`, `end` and `text`; these are prepended to every row
    /// and `text` requires the `text` argument. Requesting one attribute without index attributes
    /// yields a [`AttributeTable::List`] (or [`AttributeTable::AmbiguousList`]), anything else a tuple list.
    pub fn attribute_values(
        &self,
        attributes: &[&str],
        index_attributes: &[&str],
        text: Option<&Text>,
    ) -> StrataResult<AttributeTable> {
        for attribute in attributes {
            if !self.attributes().iter().any(|a| a == attribute) {
                return Err(StrataError::NotFound(
                    format!("attribute {:?} in layer {:?}", attribute, self.name()),
                    "Layer::attribute_values",
                ));
            }
        }
        for attribute in index_attributes {
            if !INDEX_ATTRIBUTES.contains(attribute) {
                return Err(StrataError::InvalidArgument(
                    format!(
                        "unknown index attribute {:?}, expected one of {:?}",
                        attribute, INDEX_ATTRIBUTES
                    ),
                    "Layer::attribute_values",
                ));
            }
            if *attribute == "text" && text.is_none() {
                return Err(StrataError::MissingArgument(
                    "the text index attribute requires a text".to_string(),
                    "Layer::attribute_values",
                ));
            }
        }
        debug(self.config(), || {
            format!(
                "Layer::attribute_values: layer={}, attributes={:?}, index_attributes={:?}",
                self.name(),
                attributes,
                index_attributes
            )
        });
        let single = attributes.len() == 1 && index_attributes.is_empty();

        let index_row = |span: &Span| -> StrataResult<Vec<AnnotationValue>> {
            let mut row = Vec::with_capacity(index_attributes.len());
            for attribute in index_attributes {
                row.push(match *attribute {
                    "start" => AnnotationValue::from(span.start()),
                    "end" => AnnotationValue::from(span.end()),
                    _ => match text {
                        Some(text) => AnnotationValue::from(text.enclosing_text(span.base_span())?),
                        None => AnnotationValue::Null,
                    },
                });
            }
            Ok(row)
        };

        if self.ambiguous() {
            if single {
                Ok(AttributeTable::AmbiguousList(
                    self.iter()
                        .map(|span| span.values(attributes[0]).into_iter().cloned().collect())
                        .collect(),
                ))
            } else {
                let mut table = Vec::with_capacity(self.len());
                for span in self.iter() {
                    let index = index_row(span)?;
                    table.push(
                        span.annotations()
                            .iter()
                            .map(|annotation| {
                                let mut row = index.clone();
                                row.extend(attributes.iter().map(|attribute| {
                                    annotation.get(attribute).cloned().unwrap_or_default()
                                }));
                                row
                            })
                            .collect(),
                    );
                }
                Ok(AttributeTable::AmbiguousTupleList(table))
            }
        } else if single {
            Ok(AttributeTable::List(
                self.iter()
                    .map(|span| span.value(attributes[0]).cloned().unwrap_or_default())
                    .collect(),
            ))
        } else {
            let mut table = Vec::with_capacity(self.len());
            for span in self.iter() {
                let mut row = index_row(span)?;
                row.extend(
                    attributes
                        .iter()
                        .map(|attribute| span.value(attribute).cloned().unwrap_or_default()),
                );
                table.push(row);
            }
            Ok(AttributeTable::TupleList(table))
        }
    }
}
