/*
    Strata (Layered Text Annotation Engine)
        Layers, spans and relations over stand-off annotated text

        Licensed under the GNU General Public License v3
*/

//! Joining (concatenation) of texts and layers, the inverse of splitting.

use crate::config::Configurable;
use crate::error::{StrataError, StrataResult};
use crate::layer::Layer;
use crate::relationlayer::{Relation, RelationLayer};
use crate::span::Span;
use crate::text::{char_len, Text};
use crate::types::*;

/// Returns an unbound copy of the span with all annotations, moved by `offset` characters (which may be negative)
pub fn shift_span(span: &Span, offset: isize) -> StrataResult<Span> {
    let mut shifted = Span::new(span.base_span().shift(offset)?);
    for annotation in span.annotations() {
        shifted = shifted.with_annotation(annotation.clone());
    }
    Ok(shifted)
}

fn check_separators(parts: usize, separators: &[&str], contextmsg: &'static str) -> StrataResult<()> {
    if parts == 0 {
        Err(StrataError::InvalidArgument(
            "cannot join an empty list".to_string(),
            contextmsg,
        ))
    } else if separators.len() + 1 != parts {
        Err(StrataError::InvalidArgument(
            format!(
                "the number of separators ({}) does not match the number of items to join ({}), expecting {} separators",
                separators.len(),
                parts,
                parts - 1
            ),
            contextmsg,
        ))
    } else {
        Ok(())
    }
}

/// Offsets at which every part starts in the joined text
fn offsets(texts: &[&Text], separators: &[&str]) -> Vec<isize> {
    let mut result = Vec::with_capacity(texts.len());
    let mut shift = 0;
    for (i, text) in texts.iter().enumerate() {
        result.push(shift as isize);
        if let Some(separator) = separators.get(i) {
            shift += text.len() + char_len(separator);
        }
    }
    result
}

/// Joins the layers into one detached layer. Every layer is given together with the text it
/// annotates; the texts are assumed to be concatenated with the separators in between, so there
/// must be exactly one separator less than there are layers.
///
/// All layers must share name, parent, enveloped layer, attributes, secondary attributes and ambiguity.
/// Metadata is not merged, the new layer takes the default values and serialisation module of the first layer.
pub fn join_layers(layers: &[(&Layer, &Text)], separators: &[&str]) -> StrataResult<Layer> {
    check_separators(layers.len(), separators, "join_layers")?;
    let (first, _) = layers[0];
    for (layer, _) in layers.iter() {
        let mismatch = if layer.name() != first.name() {
            Some("name")
        } else if layer.parent() != first.parent() {
            Some("parent")
        } else if layer.enveloping() != first.enveloping() {
            Some("enveloped layer")
        } else if layer.attributes() != first.attributes() {
            Some("attributes")
        } else if layer.secondary_attributes() != first.secondary_attributes() {
            Some("secondary attributes")
        } else if layer.ambiguous() != first.ambiguous() {
            Some("ambiguity")
        } else {
            None
        };
        if let Some(property) = mismatch {
            return Err(StrataError::SchemaError(
                format!(
                    "not all layers have the same {}: {:?} vs {:?}",
                    property,
                    first.name(),
                    layer.name()
                ),
                "join_layers",
            ));
        }
    }
    let texts: Vec<&Text> = layers.iter().map(|(_, text)| *text).collect();
    let offsets = offsets(&texts, separators);

    let mut joined = first.empty_copy();
    joined.meta_mut().clear();
    for ((layer, _), offset) in layers.iter().zip(offsets) {
        for span in layer.iter() {
            joined.add_span(shift_span(span, offset)?)?;
        }
    }
    debug(first.config(), || {
        format!(
            "join_layers: layer={}, parts={}, spans={}",
            joined.name(),
            layers.len(),
            joined.len()
        )
    });
    Ok(joined)
}

fn join_relation_layers(
    layers: &[&RelationLayer],
    offsets: &[isize],
) -> StrataResult<RelationLayer> {
    let mut joined = layers[0].empty_copy();
    joined.meta_mut().clear();
    for (layer, offset) in layers.iter().zip(offsets) {
        for relation in layer.iter() {
            let spans = relation
                .spans()
                .iter()
                .map(|span| Ok((span.name().to_string(), span.base_span().shift(*offset)?)))
                .collect::<StrataResult<Vec<_>>>()?;
            let mut shifted = Relation::new(spans)?;
            for annotation in relation.annotations() {
                shifted = shifted.with_annotation(annotation.clone());
            }
            joined.add_relation(shifted)?;
        }
    }
    Ok(joined)
}

/// Joins texts into one text, with `separators` between every two texts (a single space if `None`).
///
/// All texts must have the same span layers and relation layers. The layers are joined with
/// [`join_layers`] and added in dependency order; metadata of the texts is not carried over.
pub fn join_texts(texts: &[&Text], separators: Option<&[&str]>) -> StrataResult<Text> {
    let default_separators: Vec<&str> = vec![" "; texts.len().saturating_sub(1)];
    let separators = separators.unwrap_or(default_separators.as_slice());
    check_separators(texts.len(), separators, "join_texts")?;
    let first = texts[0];
    let layer_names: Vec<&str> = first.layer_names().collect();
    let relation_layer_names: Vec<&str> = first.relation_layer_names().collect();
    for text in texts.iter() {
        if text.layer_names().ne(layer_names.iter().copied())
            || text.relation_layer_names().ne(relation_layer_names.iter().copied())
        {
            return Err(StrataError::SchemaError(
                format!(
                    "not all texts have the same layers: {:?} vs {:?}",
                    layer_names,
                    text.layer_names().collect::<Vec<_>>()
                ),
                "join_texts",
            ));
        }
    }

    let mut raw = String::new();
    for (i, text) in texts.iter().enumerate() {
        if i > 0 {
            raw.push_str(separators[i - 1]);
        }
        raw.push_str(text.text());
    }
    let mut joined = Text::new(raw).with_config(first.config().clone());
    for layer in first.sorted_layers() {
        let parts = texts
            .iter()
            .map(|text| {
                text.layer(layer.name())
                    .map(|layer| (layer, *text))
                    .ok_or_else(|| StrataError::NotFound(format!("layer {:?}", layer.name()), "join_texts"))
            })
            .collect::<StrataResult<Vec<_>>>()?;
        joined.add_layer(join_layers(&parts, separators)?)?;
    }
    let offsets = offsets(texts, separators);
    for layer in first.sorted_relation_layers() {
        let parts = texts
            .iter()
            .map(|text| {
                text.relation_layer(layer.name()).ok_or_else(|| {
                    StrataError::NotFound(format!("relation layer {:?}", layer.name()), "join_texts")
                })
            })
            .collect::<StrataResult<Vec<_>>>()?;
        joined.add_relation_layer(join_relation_layers(&parts, &offsets)?)?;
    }
    debug(first.config(), || {
        format!("join_texts: parts={}, length={}", texts.len(), joined.len())
    });
    Ok(joined)
}
