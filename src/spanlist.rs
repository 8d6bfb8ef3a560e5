/*
    Strata (Layered Text Annotation Engine)
        Layers, spans and relations over stand-off annotated text

        Licensed under the GNU General Public License v3
*/

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::basespan::BaseSpan;
use crate::error::{StrataError, StrataResult};
use crate::span::Span;
use crate::types::*;

/// An ordered container of spans, sorted by base span. Spans live in an arena and are addressed
/// by [`SpanHandle`]. A separate ordering and a hash map from [`BaseSpan`] to handle provide
/// positional and location-based lookup.
///
/// The span level is unset until the first span is inserted and is fixed from then on,
/// even when all spans are cleared again.
#[derive(Debug, Clone, Default)]
pub struct SpanList {
    spans: Store<Span>,
    order: Vec<SpanHandle>,
    index: HashMap<BaseSpan, SpanHandle>,
    span_level: Option<usize>,
}

impl SpanList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The level shared by all spans, `None` if no span was ever added
    pub fn span_level(&self) -> Option<usize> {
        self.span_level
    }

    fn resolve(&self, handle: SpanHandle) -> Option<&Span> {
        self.spans.get(handle.as_usize()).and_then(|s| s.as_ref())
    }

    /// Iterates over the spans in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &Span> {
        self.order.iter().filter_map(move |handle| self.resolve(*handle))
    }

    /// Iterates over the handles in sorted order
    pub fn handles(&self) -> impl Iterator<Item = SpanHandle> + '_ {
        self.order.iter().copied()
    }

    /// Returns the span at the given location
    pub fn get(&self, base_span: &BaseSpan) -> Option<&Span> {
        self.index
            .get(base_span)
            .and_then(|handle| self.resolve(*handle))
    }

    pub(crate) fn get_mut(&mut self, base_span: &BaseSpan) -> Option<&mut Span> {
        let handle = *self.index.get(base_span)?;
        self.spans
            .get_mut(handle.as_usize())
            .and_then(|s| s.as_mut())
    }

    /// Returns the span by its handle
    pub fn get_by_handle(&self, handle: SpanHandle) -> Option<&Span> {
        self.resolve(handle)
    }

    pub(crate) fn get_mut_by_handle(&mut self, handle: SpanHandle) -> Option<&mut Span> {
        self.spans
            .get_mut(handle.as_usize())
            .and_then(|s| s.as_mut())
    }

    /// Returns the span at the given position in sorted order
    pub fn get_by_index(&self, index: usize) -> Option<&Span> {
        self.order
            .get(index)
            .and_then(|handle| self.resolve(*handle))
    }

    pub fn contains(&self, base_span: &BaseSpan) -> bool {
        self.index.contains_key(base_span)
    }

    /// Returns the position of the span with this location in sorted order (binary search)
    pub fn position(&self, base_span: &BaseSpan) -> Option<usize> {
        if !self.contains(base_span) {
            return None;
        }
        self.search(base_span).ok()
    }

    fn search(&self, base_span: &BaseSpan) -> Result<usize, usize> {
        self.order.binary_search_by(|handle| match self.resolve(*handle) {
            Some(span) => span.base_span().cmp(base_span),
            None => Ordering::Less,
        })
    }

    /// Inserts a span at its sorted position, binding it to a new handle.
    /// Fails if the location is already taken or the level differs from the established span level.
    pub(crate) fn insert(&mut self, mut span: Span) -> StrataResult<SpanHandle> {
        let level = span.level();
        if let Some(span_level) = self.span_level {
            if span_level != level {
                return Err(StrataError::LevelMismatch(
                    span_level,
                    level,
                    "SpanList::insert",
                ));
            }
        }
        if self.index.contains_key(span.base_span()) {
            return Err(StrataError::DuplicateSpan(
                span.base_span().to_string(),
                "SpanList::insert",
            ));
        }
        let position = match self.search(span.base_span()) {
            Ok(position) | Err(position) => position,
        };
        let handle = SpanHandle::new(self.spans.len());
        span.bind(handle);
        self.index.insert(span.base_span().clone(), handle);
        self.order.insert(position, handle);
        self.spans.push(Some(span));
        self.span_level = Some(level);
        Ok(handle)
    }

    /// Removes the span at the given location, the handles of other spans remain valid
    pub(crate) fn remove(&mut self, base_span: &BaseSpan) -> Option<Span> {
        let handle = self.index.remove(base_span)?;
        if let Ok(position) = self.search(base_span) {
            self.order.remove(position);
        } else {
            self.order.retain(|h| *h != handle);
        }
        self.spans.get_mut(handle.as_usize()).and_then(|s| s.take())
    }

    /// Removes all spans but keeps the span level
    pub(crate) fn clear(&mut self) {
        self.spans.clear();
        self.order.clear();
        self.index.clear();
    }
}
