/*
    Strata (Layered Text Annotation Engine)
        Layers, spans and relations over stand-off annotated text

        Licensed under the GNU General Public License v3
*/

//! Splitting a text into sections. Every section becomes a new [`Text`] with copies of the selected
//! layers, re-based to the coordinates of the section. Parent and enveloping relationships are
//! rebuilt against the new layers of the section.

use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap};

use crate::annotation::AnnotationBuilder;
use crate::basespan::BaseSpan;
use crate::config::Configurable;
use crate::error::{StrataError, StrataResult};
use crate::layer::Layer;
use crate::operations::discontinuous::split_by_discontinuous_layer;
use crate::relationlayer::{Relation, RelationLayer};
use crate::text::Text;
use crate::types::*;

/// Maps a span of an original layer (location and layer name) to its location in the section
type SpanMap = HashMap<(BaseSpan, String), BaseSpan>;

/// Checks that every layer to keep exists and that its parent or enveloped layer is kept as well
pub(crate) fn check_layers_to_keep(text: &Text, layers_to_keep: &[&str]) -> StrataResult<()> {
    for name in layers_to_keep {
        if let Some(layer) = text.layer(name) {
            if let Some(parent) = layer.parent() {
                if !layers_to_keep.contains(&parent) {
                    return Err(StrataError::DependencyError(
                        format!("parent of {} missing in layers to keep: {}", name, parent),
                        "extract_sections",
                    ));
                }
            }
            if let Some(enveloping) = layer.enveloping() {
                if !layers_to_keep.contains(&enveloping) {
                    return Err(StrataError::DependencyError(
                        format!(
                            "enveloped layer of {} missing in layers to keep: {}",
                            name, enveloping
                        ),
                        "extract_sections",
                    ));
                }
            }
        } else if text.relation_layer(name).is_none() {
            return Err(StrataError::NotFound(
                format!("layer {:?}", name),
                "extract_sections",
            ));
        }
    }
    Ok(())
}

/// Clips or checks an interval against a subsection, returns the resulting interval if it is to be kept
fn fit(
    span_start: usize,
    span_end: usize,
    start: usize,
    end: usize,
    trim_overlapping: bool,
) -> Option<(usize, usize)> {
    if trim_overlapping {
        let span_start = span_start.max(start);
        let span_end = span_end.min(end);
        if span_start >= span_end {
            None
        } else {
            Some((span_start, span_end))
        }
    } else if span_start < start || end < span_end {
        None
    } else {
        Some((span_start, span_end))
    }
}

/// Moves a location into the coordinates of the concatenated subsections, every leaf must fit entirely in one subsection
fn rebase(base_span: &BaseSpan, subsections: &[(usize, usize)]) -> StrataResult<Option<BaseSpan>> {
    match base_span {
        BaseSpan::Elementary(span) => {
            let mut section_size = 0;
            for (start, end) in subsections {
                if *start <= span.start() && span.end() <= *end {
                    return Ok(Some(BaseSpan::elementary(
                        section_size + span.start() - start,
                        section_size + span.end() - start,
                    )?));
                }
                section_size += end - start;
            }
            Ok(None)
        }
        BaseSpan::Enveloping(span) => {
            let mut children = Vec::with_capacity(span.spans().len());
            for child in span.spans() {
                match rebase(child, subsections)? {
                    Some(child) => children.push(child),
                    None => return Ok(None),
                }
            }
            Ok(Some(BaseSpan::enveloping(children)?))
        }
    }
}

fn extract_derived_layer(layer: &Layer, new_layer: &mut Layer, map: &mut SpanMap) -> StrataResult<()> {
    let parent = layer.parent().unwrap_or_default().to_string();
    if !layer.ambiguous() {
        return Err(StrataError::Unsupported(
            format!("not ambiguous layer with parent: {}", layer.name()),
            "extract_sections",
        ));
    }
    for span in layer.iter() {
        let new_base_span = match map.get(&(span.base_span().clone(), parent.clone())) {
            Some(base_span) => base_span.clone(),
            None => continue,
        };
        for annotation in span.annotations() {
            new_layer.add_annotation(&new_base_span, AnnotationBuilder::from(annotation))?;
        }
        map.insert(
            (span.base_span().clone(), layer.name().to_string()),
            new_base_span,
        );
    }
    Ok(())
}

fn extract_enveloping_layer(
    layer: &Layer,
    new_layer: &mut Layer,
    map: &mut SpanMap,
    subsections: &[(usize, usize)],
    trim_overlapping: bool,
) -> StrataResult<()> {
    let enveloped = layer.enveloping().unwrap_or_default().to_string();
    if layer.ambiguous() {
        return Err(StrataError::Unsupported(
            format!("ambiguous enveloping layer: {}", layer.name()),
            "extract_sections",
        ));
    }
    for (start, end) in subsections.iter().copied() {
        for span in layer.iter() {
            let key = (span.base_span().clone(), layer.name().to_string());
            if map.contains_key(&key) {
                continue;
            }
            if fit(span.start(), span.end(), start, end, trim_overlapping).is_none() {
                continue;
            }
            // a section that falls entirely in a gap of a discontinuous span does not get the span
            let children = span.base_span().spans();
            if children
                .windows(2)
                .any(|pair| pair[0].end() <= start && end <= pair[1].start())
            {
                continue;
            }
            let new_children: Vec<BaseSpan> = children
                .iter()
                .filter_map(|child| map.get(&(child.clone(), enveloped.clone())).cloned())
                .collect();
            if new_children.is_empty() {
                continue;
            }
            let new_base_span = BaseSpan::enveloping(new_children)?;
            if let Some(annotation) = span.annotations().first() {
                new_layer.add_annotation(&new_base_span, AnnotationBuilder::from(annotation))?;
                map.insert(key, new_base_span);
            }
        }
    }
    Ok(())
}

fn extract_flat_layer(
    layer: &Layer,
    new_layer: &mut Layer,
    map: &mut SpanMap,
    subsections: &[(usize, usize)],
    trim_overlapping: bool,
) -> StrataResult<()> {
    let mut section_size = 0;
    for (start, end) in subsections.iter().copied() {
        for span in layer.iter() {
            let (span_start, span_end) =
                match fit(span.start(), span.end(), start, end, trim_overlapping) {
                    Some(interval) => interval,
                    None => continue,
                };
            let new_base_span = BaseSpan::elementary(
                section_size + span_start - start,
                section_size + span_end - start,
            )?;
            for annotation in span.annotations() {
                new_layer.add_annotation(&new_base_span, AnnotationBuilder::from(annotation))?;
            }
            map.insert(
                (span.base_span().clone(), layer.name().to_string()),
                new_base_span,
            );
        }
        section_size += end - start;
    }
    Ok(())
}

fn extract_relation_layer(
    layer: &RelationLayer,
    subsections: &[(usize, usize)],
) -> StrataResult<RelationLayer> {
    let mut new_layer = layer.empty_copy();
    'relations: for relation in layer.iter() {
        let mut spans = Vec::with_capacity(relation.spans().len());
        for span in relation.spans() {
            match rebase(span.base_span(), subsections)? {
                Some(base_span) => spans.push((span.name().to_string(), base_span)),
                None => continue 'relations,
            }
        }
        let mut new_relation = Relation::new(spans)?;
        for annotation in relation.annotations() {
            new_relation = new_relation.with_annotation(annotation.retarget());
        }
        new_layer.add_relation(new_relation)?;
    }
    Ok(new_layer)
}

/// Extracts one (possibly discontinuous) section: the text of the section is the concatenation of the subsections
pub(crate) fn extract_subsections(
    text: &Text,
    subsections: &[(usize, usize)],
    layers_to_keep: Option<&[&str]>,
    trim_overlapping: bool,
) -> StrataResult<Text> {
    let mut raw = String::new();
    for (start, end) in subsections {
        raw.push_str(text.slice(*start, *end)?);
    }
    debug(text.config(), || {
        format!("extract_subsections: subsections={:?}", subsections)
    });
    let mut new_text = Text::new(raw).with_config(text.config().clone());
    for (key, value) in text.meta() {
        new_text.meta_mut().insert(key.clone(), value.clone());
    }
    let kept = |name: &str| layers_to_keep.map_or(true, |keep| keep.contains(&name));

    let mut map: SpanMap = HashMap::new();
    for layer in text.sorted_layers() {
        if !kept(layer.name()) {
            continue;
        }
        let mut new_layer = layer.empty_copy();
        if layer.parent().is_some() {
            extract_derived_layer(layer, &mut new_layer, &mut map)?;
        } else if layer.enveloping().is_some() {
            extract_enveloping_layer(layer, &mut new_layer, &mut map, subsections, trim_overlapping)?;
        } else {
            extract_flat_layer(layer, &mut new_layer, &mut map, subsections, trim_overlapping)?;
        }
        debug(text.config(), || {
            format!(
                "extract_subsections: layer={}, spans {} -> {}",
                layer.name(),
                layer.len(),
                new_layer.len()
            )
        });
        new_text.add_layer(new_layer)?;
    }
    for layer in text.sorted_relation_layers() {
        if kept(layer.name()) {
            new_text.add_relation_layer(extract_relation_layer(layer, subsections)?)?;
        }
    }
    Ok(new_text)
}

/// Runs the extraction for every section, in parallel if the configuration says so
pub(crate) fn extract_all(
    text: &Text,
    sections: &[Vec<(usize, usize)>],
    layers_to_keep: Option<&[&str]>,
    trim_overlapping: bool,
) -> StrataResult<Vec<Text>> {
    if let Some(layers_to_keep) = layers_to_keep {
        check_layers_to_keep(text, layers_to_keep)?;
    }
    debug(text.config(), || {
        format!(
            "extract_sections: sections={}, layers_to_keep={:?}, trim_overlapping={}",
            sections.len(),
            layers_to_keep,
            trim_overlapping
        )
    });
    if text.config().parallel() {
        sections
            .par_iter()
            .map(|subsections| {
                extract_subsections(text, subsections, layers_to_keep, trim_overlapping)
            })
            .collect()
    } else {
        sections
            .iter()
            .map(|subsections| {
                extract_subsections(text, subsections, layers_to_keep, trim_overlapping)
            })
            .collect()
    }
}

/// Splits a text into one new text per `(start, end)` section.
///
/// Only the layers in `layers_to_keep` are copied (all layers if `None`); the parent or enveloped
/// layer of every kept layer must be kept too. Spans that do not fit entirely in a section are
/// dropped, unless `trim_overlapping` is set, in which case they are clipped to the section.
/// Relation layers are kept when listed (or when `layers_to_keep` is `None`), with those relations
/// whose named spans lie inside the section.
///
/// Derived layers must be ambiguous and enveloping layers must not be ambiguous, other combinations
/// are not supported.
pub fn extract_sections(
    text: &Text,
    sections: &[(usize, usize)],
    layers_to_keep: Option<&[&str]>,
    trim_overlapping: bool,
) -> StrataResult<Vec<Text>> {
    let sections: Vec<Vec<(usize, usize)>> =
        sections.iter().map(|section| vec![*section]).collect();
    extract_all(text, &sections, layers_to_keep, trim_overlapping)
}

/// Extracts a single section, see [`extract_sections`]
pub fn extract_section(
    text: &Text,
    start: usize,
    end: usize,
    layers_to_keep: Option<&[&str]>,
    trim_overlapping: bool,
) -> StrataResult<Text> {
    if let Some(layers_to_keep) = layers_to_keep {
        check_layers_to_keep(text, layers_to_keep)?;
    }
    extract_subsections(text, &[(start, end)], layers_to_keep, trim_overlapping)
}

/// The layers that are kept by default when splitting by `layer`: the layer itself, all layers it
/// depends on, and (repeatedly) all layers whose parent is among those.
pub fn layers_to_keep_default(text: &Text, layer: &str) -> StrataResult<BTreeSet<String>> {
    if text.layer(layer).is_none() {
        return Err(StrataError::NotFound(
            format!("layer {:?}", layer),
            "layers_to_keep_default",
        ));
    }
    let mut keep = text.layer_dependencies(layer, false);
    keep.insert(layer.to_string());
    loop {
        let derived: Vec<String> = text
            .layer_names()
            .filter_map(|name| text.layer(name))
            .filter(|candidate| {
                !keep.contains(candidate.name())
                    && candidate.parent().map_or(false, |parent| keep.contains(parent))
            })
            .map(|candidate| candidate.name().to_string())
            .collect();
        if derived.is_empty() {
            break;
        }
        keep.extend(derived);
    }
    Ok(keep)
}

/// Splits a text into one text per span of `layer`. Without explicit `layers_to_keep`,
/// [`layers_to_keep_default`] is used. The `clauses` layer has discontinuous spans and is split
/// via [`crate::split_by_clauses`].
pub fn split_by(
    text: &Text,
    layer: &str,
    layers_to_keep: Option<&[&str]>,
    trim_overlapping: bool,
) -> StrataResult<Vec<Text>> {
    let split_layer = text.layer(layer).ok_or_else(|| {
        StrataError::NotFound(format!("layer {:?}", layer), "split_by")
    })?;
    let default_keep;
    let layers_to_keep: Vec<&str> = match layers_to_keep {
        Some(layers_to_keep) => layers_to_keep.to_vec(),
        None => {
            default_keep = layers_to_keep_default(text, layer)?;
            default_keep.iter().map(|name| name.as_str()).collect()
        }
    };
    if layer == "clauses" {
        return split_by_discontinuous_layer(text, layer, &layers_to_keep, trim_overlapping);
    }
    let sections: Vec<(usize, usize)> = split_layer
        .iter()
        .map(|span| (span.start(), span.end()))
        .collect();
    extract_sections(text, &sections, Some(&layers_to_keep), trim_overlapping)
}

/// Splits a text by its `sentences` layer
pub fn split_by_sentences(
    text: &Text,
    layers_to_keep: Option<&[&str]>,
    trim_overlapping: bool,
) -> StrataResult<Vec<Text>> {
    split_by(text, "sentences", layers_to_keep, trim_overlapping)
}
