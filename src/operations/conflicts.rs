/*
    Strata (Layered Text Annotation Engine)
        Layers, spans and relations over stand-off annotated text

        Licensed under the GNU General Public License v3
*/

//! Conflict resolution: removes spans from a layer until no two spans intersect, according to a
//! priority attribute and a strategy that prefers long or short spans.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::annotation::Annotation;
use crate::basespan::BaseSpan;
use crate::config::Configurable;
use crate::error::{StrataError, StrataResult};
use crate::layer::Layer;
use crate::operations::iterators::iterate_intersecting_spans;
use crate::span::SpanLike;
use crate::types::*;

/// Which of two conflicting spans (with equal priority) wins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// The longest span wins
    #[default]
    Max,
    /// The shortest span wins
    Min,
    /// Length is not considered, only priorities decide
    All,
}

impl FromStr for Strategy {
    type Err = StrataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MAX" => Ok(Self::Max),
            "MIN" => Ok(Self::Min),
            "ALL" => Ok(Self::All),
            _ => Err(StrataError::InvalidArgument(
                format!(
                    "unknown conflict resolving strategy {:?}, expected MAX, MIN or ALL",
                    s
                ),
                "Strategy::from_str",
            )),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Max => write!(f, "MAX"),
            Self::Min => write!(f, "MIN"),
            Self::All => write!(f, "ALL"),
        }
    }
}

/// Collects statistics of a conflict resolution run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConflictStatus {
    /// Number of pairwise intersections before resolution
    pub number_of_conflicts: usize,
}

/// Totally ordered priority value
#[derive(Debug, Clone, Copy)]
struct Priority(f64);

impl PartialEq for Priority {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Priority {}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// A base span remembering its position in the layer
struct Indexed<'a> {
    index: usize,
    base_span: &'a BaseSpan,
}

impl<'a> SpanLike for Indexed<'a> {
    fn base_span(&self) -> &BaseSpan {
        self.base_span
    }
}

fn priority_of(annotation: &Annotation, attribute: &str) -> StrataResult<f64> {
    annotation
        .get(attribute)
        .and_then(|value| value.as_f64())
        .ok_or_else(|| {
            StrataError::InvalidArgument(
                format!(
                    "priority attribute {:?} must have a numeric value, got {}",
                    attribute,
                    annotation
                        .get(attribute)
                        .map(|v| v.to_string())
                        .unwrap_or_default()
                ),
                "resolve_conflicts",
            )
        })
}

/// Keeps only the annotations with the lowest priority on every span of an ambiguous layer.
fn collapse_annotations(layer: &mut Layer, attribute: &str, keep_equal: bool) -> StrataResult<()> {
    let mut plans: Vec<(BaseSpan, Vec<bool>)> = Vec::new();
    for span in layer.iter() {
        let priorities = span
            .annotations()
            .iter()
            .map(|annotation| priority_of(annotation, attribute))
            .collect::<StrataResult<Vec<f64>>>()?;
        let best = priorities
            .iter()
            .copied()
            .map(Priority)
            .min()
            .map(|p| p.0)
            .unwrap_or_default();
        let mut found = false;
        let keep: Vec<bool> = priorities
            .iter()
            .map(|p| {
                let is_best = Priority(*p) == Priority(best);
                let result = is_best && (keep_equal || !found);
                found |= is_best;
                result
            })
            .collect();
        if keep.iter().any(|k| !k) {
            plans.push((span.base_span().clone(), keep));
        }
    }
    for (base_span, keep) in plans {
        layer.retain_annotations(&base_span, |i, _| keep.get(i).copied().unwrap_or(false))?;
    }
    Ok(())
}

/// Removes intersecting spans from the layer.
///
/// The spans are ranked by `(priority, strategy, location)`: the value of `priority_attribute` in the
/// (first) annotation of the span, lower is better; the span length as preferred by the `strategy`;
/// and finally the location itself, unless `keep_equal` is set, in which case spans with an equal rank all survive.
/// Spans are visited best first and every intersecting span with a worse rank is removed.
///
/// If the layer is ambiguous and a priority attribute is given, every span first keeps only its best
/// annotations (all of them if `keep_equal`, otherwise the first).
///
/// The number of pairwise intersections found is reported in `status`, if given.
pub fn resolve_conflicts(
    layer: &mut Layer,
    strategy: Strategy,
    priority_attribute: Option<&str>,
    keep_equal: bool,
    status: Option<&mut ConflictStatus>,
) -> StrataResult<()> {
    if let Some(attribute) = priority_attribute {
        if !layer.attributes().iter().any(|a| a == attribute) {
            return Err(StrataError::NotFound(
                format!("attribute {:?} in layer {:?}", attribute, layer.name()),
                "resolve_conflicts",
            ));
        }
    }
    if let (true, Some(attribute)) = (layer.ambiguous(), priority_attribute) {
        collapse_annotations(layer, attribute, keep_equal)?;
    }
    if layer.len() < 2 {
        if let Some(status) = status {
            status.number_of_conflicts = 0;
        }
        return Ok(());
    }

    let to_delete: Vec<BaseSpan> = {
        let spans: Vec<Indexed> = layer
            .iter()
            .enumerate()
            .map(|(index, span)| Indexed {
                index,
                base_span: span.base_span(),
            })
            .collect();

        let mut graph: BTreeMap<usize, BTreeSet<usize>> = BTreeMap::new();
        let mut number_of_conflicts = 0;
        for (a, b, _) in iterate_intersecting_spans(&spans, true, true, true) {
            number_of_conflicts += 1;
            graph.entry(a.index).or_default().insert(b.index);
            graph.entry(b.index).or_default().insert(a.index);
        }
        debug(layer.config(), || {
            format!(
                "resolve_conflicts: layer={}, strategy={}, conflicts={}",
                layer.name(),
                strategy,
                number_of_conflicts
            )
        });
        if let Some(status) = status {
            status.number_of_conflicts = number_of_conflicts;
        }

        let mut keys = Vec::with_capacity(spans.len());
        for span in layer.iter() {
            let priority = match (priority_attribute, span.annotations().first()) {
                (Some(attribute), Some(annotation)) => priority_of(annotation, attribute)?,
                _ => 0.0,
            };
            let length = match strategy {
                Strategy::Max => span.start() as isize - span.end() as isize,
                Strategy::Min => span.end() as isize - span.start() as isize,
                Strategy::All => 0,
            };
            let tie_breaker = if keep_equal {
                None
            } else {
                Some(span.base_span())
            };
            keys.push((Priority(priority), length, tie_breaker));
        }

        let mut order: Vec<usize> = (0..spans.len()).collect();
        order.sort_by(|a, b| keys[*a].cmp(&keys[*b]));

        let mut deleted: BTreeSet<usize> = BTreeSet::new();
        for node in order {
            let neighbours = match graph.get(&node) {
                Some(neighbours) => neighbours.clone(),
                None => continue,
            };
            for neighbour in neighbours {
                if keys[neighbour] <= keys[node] {
                    continue;
                }
                deleted.insert(neighbour);
                if let Some(edges) = graph.remove(&neighbour) {
                    for other in edges {
                        let now_empty = match graph.get_mut(&other) {
                            Some(other_edges) => {
                                other_edges.remove(&neighbour);
                                other_edges.is_empty()
                            }
                            None => false,
                        };
                        if now_empty {
                            graph.remove(&other);
                        }
                    }
                }
            }
        }
        deleted
            .into_iter()
            .map(|index| spans[index].base_span.clone())
            .collect()
    };

    debug(layer.config(), || {
        format!(
            "resolve_conflicts: layer={}, removing {} spans",
            layer.name(),
            to_delete.len()
        )
    });
    for base_span in to_delete {
        layer.remove_span(&base_span)?;
    }
    Ok(())
}
