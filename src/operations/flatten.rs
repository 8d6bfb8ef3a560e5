/*
    Strata (Layered Text Annotation Engine)
        Layers, spans and relations over stand-off annotated text

        Licensed under the GNU General Public License v3
*/

use crate::annotation::AnnotationBuilder;
use crate::basespan::BaseSpan;
use crate::config::Configurable;
use crate::error::{StrataError, StrataResult};
use crate::layer::{Layer, LayerBuilder};
use crate::types::*;

/// How [`flatten`] handles spans with multiple annotations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisambiguationStrategy {
    /// Keep only the first annotation of every span; the output layer is not ambiguous
    PickFirst,
}

/// Converts a layer into a detached flat layer of elementary spans: one span per leaf interval of
/// every span in the input layer.
///
/// Without a disambiguation strategy the output layer is ambiguous and every leaf receives every
/// annotation of every span it belongs to. With [`DisambiguationStrategy::PickFirst`] only the first
/// annotation is kept and a leaf that was already added is skipped.
///
/// `output_attributes` selects the attributes of the input layer to keep (default: all), and
/// `attribute_mapping` renames them via `(old name, new name)` pairs (default: identity over the output attributes).
pub fn flatten(
    layer: &Layer,
    output_layer: &str,
    output_attributes: Option<&[&str]>,
    attribute_mapping: Option<&[(&str, &str)]>,
    disambiguation_strategy: Option<DisambiguationStrategy>,
) -> StrataResult<Layer> {
    let output_attributes: Vec<&str> = match output_attributes {
        Some(attributes) => attributes.to_vec(),
        None => layer.attributes().iter().map(|a| a.as_str()).collect(),
    };
    let mapping: Vec<(&str, &str)> = match attribute_mapping {
        Some(mapping) => mapping.to_vec(),
        None => output_attributes.iter().map(|a| (*a, *a)).collect(),
    };
    for (old, _) in mapping.iter() {
        if !layer.attributes().iter().any(|a| a == old) {
            return Err(StrataError::NotFound(
                format!("attribute {:?} in layer {:?}", old, layer.name()),
                "flatten",
            ));
        }
    }
    debug(layer.config(), || {
        format!(
            "flatten: layer={}, output_layer={}, mapping={:?}, strategy={:?}",
            layer.name(),
            output_layer,
            mapping,
            disambiguation_strategy
        )
    });

    let pick_first = disambiguation_strategy == Some(DisambiguationStrategy::PickFirst);
    let mut result = LayerBuilder::new(output_layer)
        .with_attributes(mapping.iter().map(|(_, new)| *new))
        .with_ambiguous(!pick_first)
        .with_config(layer.config().clone())
        .build()?;

    for span in layer.iter() {
        for (start, end) in span.base_span().leaves() {
            let location = (start, end);
            if pick_first {
                if result.span(&BaseSpan::elementary(start, end)?).is_some() {
                    continue;
                }
                if let Some(annotation) = span.annotations().first() {
                    result.add_annotation(
                        location,
                        AnnotationBuilder::new().with_attributes(mapping.iter().map(
                            |(old, new)| (*new, annotation.get(old).cloned().unwrap_or_default()),
                        )),
                    )?;
                }
            } else {
                for annotation in span.annotations() {
                    result.add_annotation(
                        location,
                        AnnotationBuilder::new().with_attributes(mapping.iter().map(
                            |(old, new)| (*new, annotation.get(old).cloned().unwrap_or_default()),
                        )),
                    )?;
                }
            }
        }
    }
    Ok(result)
}
