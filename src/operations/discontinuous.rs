/*
    Strata (Layered Text Annotation Engine)
        Layers, spans and relations over stand-off annotated text

        Licensed under the GNU General Public License v3
*/

//! Splitting by layers with discontinuous spans, such as clauses that are interrupted by an embedded clause.
//! A section is a list of subsections; the text of the resulting [`Text`] is their concatenation.

use std::collections::BTreeSet;

use crate::config::Configurable;
use crate::error::{StrataError, StrataResult};
use crate::operations::splitting::{extract_all, layers_to_keep_default};
use crate::text::Text;
use crate::types::*;

fn is_whitespace(s: &str) -> bool {
    !s.is_empty() && s.chars().all(char::is_whitespace)
}

/// Groups consecutive `(start, end)` locations: a location joins the group of its predecessor if it
/// starts right where the predecessor ends or if only whitespace lies between them.
///
/// With `correct_left_boundary`, a location that starts a new group and is preceded by a whitespace
/// character is extended one character to the left, so the whitespace separating it from the previous
/// group is preserved when the groups are concatenated.
pub fn group_consecutive_spans(
    text: &Text,
    spans: &[(usize, usize)],
    correct_left_boundary: bool,
) -> StrataResult<Vec<Vec<(usize, usize)>>> {
    let mut groups: Vec<Vec<(usize, usize)>> = Vec::new();
    let mut previous: Option<(usize, usize)> = None;
    for (start, end) in spans.iter().copied() {
        let mut location = (start, end);
        match previous {
            None => groups.push(vec![location]),
            Some((_, previous_end)) => {
                let joined = previous_end == start
                    || (previous_end < start && is_whitespace(text.slice(previous_end, start)?));
                if joined {
                    if let Some(group) = groups.last_mut() {
                        group.push(location);
                    }
                } else {
                    if correct_left_boundary
                        && start > 0
                        && text
                            .slice(start - 1, start)?
                            .chars()
                            .all(char::is_whitespace)
                    {
                        location = (start - 1, end);
                    }
                    groups.push(vec![location]);
                }
            }
        }
        previous = Some(location);
    }
    Ok(groups)
}

/// Like [`group_consecutive_spans`], but every group is reduced to a single `(start, end)`
/// location from the start of its first member to the end of its last.
pub fn group_consecutive_spans_reduced(
    text: &Text,
    spans: &[(usize, usize)],
    correct_left_boundary: bool,
) -> StrataResult<Vec<(usize, usize)>> {
    Ok(group_consecutive_spans(text, spans, correct_left_boundary)?
        .into_iter()
        .filter_map(|group| match (group.first(), group.last()) {
            (Some(first), Some(last)) => Some((first.0, last.1)),
            _ => None,
        })
        .collect())
}

/// Splits a text into one new text per section, where every section consists of one or more
/// `(start, end)` subsections. The text of every new text is the concatenation of the text of its
/// subsections and all spans are re-based accordingly. See [`crate::extract_sections`] for the
/// handling of `layers_to_keep` and `trim_overlapping`.
pub fn extract_discontinuous_sections(
    text: &Text,
    sections: &[Vec<(usize, usize)>],
    layers_to_keep: Option<&[&str]>,
    trim_overlapping: bool,
) -> StrataResult<Vec<Text>> {
    for section in sections {
        if section.is_empty() {
            return Err(StrataError::InvalidArgument(
                "a section must consist of at least one subsection".to_string(),
                "extract_discontinuous_sections",
            ));
        }
    }
    extract_all(text, sections, layers_to_keep, trim_overlapping)
}

/// Splits a text by a layer with discontinuous spans: every span becomes a section whose subsections
/// are the groups of consecutive sub-spans of the span.
pub(crate) fn split_by_discontinuous_layer(
    text: &Text,
    layer: &str,
    layers_to_keep: &[&str],
    trim_overlapping: bool,
) -> StrataResult<Vec<Text>> {
    let split_layer = text.layer(layer).ok_or_else(|| {
        StrataError::NotFound(format!("layer {:?}", layer), "split_by_discontinuous_layer")
    })?;
    let mut sections = Vec::with_capacity(split_layer.len());
    for span in split_layer.iter() {
        let locations: Vec<(usize, usize)> = span
            .base_span()
            .spans()
            .iter()
            .map(|child| (child.start(), child.end()))
            .collect();
        sections.push(group_consecutive_spans_reduced(text, &locations, true)?);
    }
    debug(text.config(), || {
        format!(
            "split_by_discontinuous_layer: layer={}, sections={:?}",
            layer, sections
        )
    });
    extract_discontinuous_sections(text, &sections, Some(layers_to_keep), trim_overlapping)
}

/// Splits a text by its `clauses` layer. Without explicit `layers_to_keep`, the layers returned by
/// [`crate::layers_to_keep_default`] for `clauses` are kept.
pub fn split_by_clauses(
    text: &Text,
    layers_to_keep: Option<&[&str]>,
    trim_overlapping: bool,
) -> StrataResult<Vec<Text>> {
    let default_keep: BTreeSet<String>;
    let layers_to_keep: Vec<&str> = match layers_to_keep {
        Some(layers_to_keep) => layers_to_keep.to_vec(),
        None => {
            default_keep = layers_to_keep_default(text, "clauses")?;
            default_keep.iter().map(|name| name.as_str()).collect()
        }
    };
    split_by_discontinuous_layer(text, "clauses", &layers_to_keep, trim_overlapping)
}
