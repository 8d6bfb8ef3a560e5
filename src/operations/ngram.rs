/*
    Strata (Layered Text Annotation Engine)
        Layers, spans and relations over stand-off annotated text

        Licensed under the GNU General Public License v3
*/

use std::collections::BTreeSet;

use crate::config::Configurable;
use crate::error::{StrataError, StrataResult};
use crate::layer::Layer;
use crate::types::*;

/// Builds the n-gram fingerprint of a layer attribute: every contiguous 1-gram up to `n`-gram over
/// the attribute values of consecutive spans, its members joined by the configured n-gram separator.
/// Ambiguous spans contribute all their distinct values, the fingerprint contains the Cartesian product.
///
/// ```
/// # use strata::*;
/// # fn main() -> Result<(), StrataError> {
/// let mut layer = Layer::new("morph", ["lemma"]).build()?;
/// for (i, lemma) in ["mis", "kell", "on"].iter().enumerate() {
///     layer.add_annotation((i * 5, i * 5 + 4), AnnotationBuilder::new().with_attribute("lemma", *lemma))?;
/// }
/// let index = create_ngram_fingerprint_index(&layer, "lemma", 2)?;
/// assert!(index.contains("mis-kell"));
/// assert!(!index.contains("mis-on"));
/// # Ok(())
/// # }
/// ```
pub fn create_ngram_fingerprint_index(
    layer: &Layer,
    attribute: &str,
    n: usize,
) -> StrataResult<BTreeSet<String>> {
    if n == 0 {
        return Err(StrataError::InvalidArgument(
            "n-gram length must be at least 1".to_string(),
            "create_ngram_fingerprint_index",
        ));
    }
    if !layer.attributes().iter().any(|a| a == attribute) {
        return Err(StrataError::NotFound(
            format!("attribute {:?} in layer {:?}", attribute, layer.name()),
            "create_ngram_fingerprint_index",
        ));
    }
    let separator = layer.config().ngram_separator();

    // distinct values per span, in order of first occurrence
    let values: Vec<Vec<String>> = layer
        .iter()
        .map(|span| {
            let mut distinct: Vec<String> = Vec::new();
            for value in span.values(attribute) {
                let value = value.to_string();
                if !distinct.contains(&value) {
                    distinct.push(value);
                }
            }
            distinct
        })
        .collect();

    let mut index = BTreeSet::new();
    for size in 1..=n {
        for window in values.windows(size) {
            let mut grams: Vec<String> = vec![String::new()];
            for (i, alternatives) in window.iter().enumerate() {
                grams = grams
                    .iter()
                    .flat_map(|prefix| {
                        alternatives.iter().map(move |value| {
                            if i == 0 {
                                value.clone()
                            } else {
                                format!("{}{}{}", prefix, separator, value)
                            }
                        })
                    })
                    .collect();
            }
            index.extend(grams);
        }
    }
    debug(layer.config(), || {
        format!(
            "create_ngram_fingerprint_index: layer={}, attribute={}, n={}, size={}",
            layer.name(),
            attribute,
            n,
            index.len()
        )
    });
    Ok(index)
}
