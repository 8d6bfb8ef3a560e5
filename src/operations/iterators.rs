/*
    Strata (Layered Text Annotation Engine)
        Layers, spans and relations over stand-off annotated text

        Licensed under the GNU General Public License v3
*/

//! Iterators over pairs of spans: consecutive spans (with a bounded gap between them) and intersecting spans.
//!
//! All iterators accept anything that yields references to [`SpanLike`] items: a [`crate::Layer`],
//! a slice of spans, a vector of base spans, and so on. The input is sorted by base span first; for a
//! layer this is a no-op.

use crate::error::{StrataError, StrataResult};
use crate::span::SpanLike;
use crate::text::Text;

fn sorted<'a, T: SpanLike + 'a>(spans: impl IntoIterator<Item = &'a T>) -> Vec<&'a T> {
    let mut spans: Vec<&'a T> = spans.into_iter().collect();
    spans.sort_by(|a, b| a.base_span().cmp(b.base_span()));
    spans
}

/// Accepts any gap
pub fn any_gap(_gap: &str) -> bool {
    true
}

/// Iterator over pairs of consecutive spans, see [`iterate_consecutive_spans`]
pub struct ConsecutiveSpans<'a, T, F> {
    spans: Vec<&'a T>,
    text: &'a Text,
    min_gap: usize,
    max_gap: usize,
    gap_validator: F,
    i: usize,
    j: usize,
    min_b_end: usize,
}

impl<'a, T, F> Iterator for ConsecutiveSpans<'a, T, F>
where
    T: SpanLike,
    F: Fn(&str) -> bool,
{
    type Item = StrataResult<(&'a T, &'a T)>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.i < self.spans.len() {
            let a = self.spans[self.i];
            while self.j < self.spans.len() {
                let b = self.spans[self.j];
                self.j += 1;
                if b.start() < a.end() {
                    continue;
                }
                let gap = b.start() - a.end();
                if gap > self.max_gap || b.start() >= self.min_b_end {
                    break;
                }
                self.min_b_end = self.min_b_end.min(b.end());
                if gap >= self.min_gap {
                    let gap_text = match self.text.slice(a.end(), b.start()) {
                        Ok(gap_text) => gap_text,
                        Err(err) => {
                            self.i = self.spans.len();
                            return Some(Err(err));
                        }
                    };
                    if (self.gap_validator)(gap_text) {
                        return Some(Ok((a, b)));
                    }
                }
            }
            self.i += 1;
            self.j = self.i + 1;
            self.min_b_end = usize::MAX;
        }
        None
    }
}

fn consecutive<'a, T, F>(
    spans: impl IntoIterator<Item = &'a T>,
    text: &'a Text,
    min_gap: usize,
    max_gap: usize,
    gap_validator: F,
) -> StrataResult<ConsecutiveSpans<'a, T, F>>
where
    T: SpanLike + 'a,
    F: Fn(&str) -> bool,
{
    let spans = sorted(spans);
    if let Some(end) = spans.iter().map(|span| span.end()).max() {
        if end > text.len() {
            return Err(StrataError::InvalidArgument(
                format!("span end {} exceeds the text length {}", end, text.len()),
                "iterate_consecutive_spans",
            ));
        }
    }
    Ok(ConsecutiveSpans {
        spans,
        text,
        min_gap,
        max_gap,
        gap_validator,
        i: 0,
        j: 1,
        min_b_end: usize::MAX,
    })
}

/// Yields pairs `(a, b)` of spans where `b` follows `a` with a gap of at most `max_gap` characters,
/// no other span lies entirely within the gap, and `gap_validator` accepts the text of the gap.
///
/// Fails upfront if a span ends beyond the text. The iterator stops after yielding an error.
pub fn iterate_consecutive_spans<'a, T, F>(
    spans: impl IntoIterator<Item = &'a T>,
    text: &'a Text,
    max_gap: usize,
    gap_validator: F,
) -> StrataResult<ConsecutiveSpans<'a, T, F>>
where
    T: SpanLike + 'a,
    F: Fn(&str) -> bool,
{
    consecutive(spans, text, 0, max_gap, gap_validator)
}

/// Yields pairs of spans where the second starts exactly where the first ends
pub fn iterate_touching_spans<'a, T>(
    spans: impl IntoIterator<Item = &'a T>,
    text: &'a Text,
) -> StrataResult<ConsecutiveSpans<'a, T, fn(&str) -> bool>>
where
    T: SpanLike + 'a,
{
    consecutive(spans, text, 0, 0, any_gap as fn(&str) -> bool)
}

/// Yields pairs of consecutive spans with a gap of `min_gap..=max_gap` characters
pub fn iterate_hovering_spans<'a, T>(
    spans: impl IntoIterator<Item = &'a T>,
    text: &'a Text,
    min_gap: usize,
    max_gap: usize,
) -> StrataResult<ConsecutiveSpans<'a, T, fn(&str) -> bool>>
where
    T: SpanLike + 'a,
{
    consecutive(spans, text, min_gap, max_gap, any_gap as fn(&str) -> bool)
}

/// Yields the spans that start before any span ends, the outermost left boundaries of a cluster of overlapping spans
pub fn iterate_starting_spans<'a, T>(
    spans: impl IntoIterator<Item = &'a T>,
) -> impl Iterator<Item = &'a T>
where
    T: SpanLike + 'a,
{
    let spans = sorted(spans);
    let min_end = spans.iter().map(|span| span.end()).min().unwrap_or(0);
    spans.into_iter().filter(move |span| span.start() < min_end)
}

/// Yields the spans that end after every span has started, the outermost right boundaries of a cluster of overlapping spans
pub fn iterate_ending_spans<'a, T>(
    spans: impl IntoIterator<Item = &'a T>,
) -> impl Iterator<Item = &'a T>
where
    T: SpanLike + 'a,
{
    let spans = sorted(spans);
    let max_start = spans.iter().map(|span| span.start()).max().unwrap_or(0);
    spans.into_iter().filter(move |span| span.end() > max_start)
}

/// How two intersecting spans relate to each other
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intersection {
    /// Both spans have the same start and end
    Equal,
    /// One span lies within the other
    Nested,
    /// The spans overlap partially
    Overlapped,
}

/// Iterator over pairs of intersecting spans, see [`iterate_intersecting_spans`]
pub struct IntersectingSpans<'a, T> {
    spans: Vec<&'a T>,
    yield_nested: bool,
    yield_equal: bool,
    yield_overlapped: bool,
    i: usize,
    j: usize,
}

impl<'a, T: SpanLike> IntersectingSpans<'a, T> {
    fn classify(a: &T, b: &T) -> Intersection {
        if a.start() == b.start() && a.end() == b.end() {
            Intersection::Equal
        } else if (a.start() <= b.start() && b.end() <= a.end())
            || (a.start() == b.start() && a.end() < b.end())
        {
            Intersection::Nested
        } else {
            Intersection::Overlapped
        }
    }
}

impl<'a, T: SpanLike> Iterator for IntersectingSpans<'a, T> {
    type Item = (&'a T, &'a T, Intersection);

    fn next(&mut self) -> Option<Self::Item> {
        while self.i < self.spans.len() {
            let a = self.spans[self.i];
            while self.j < self.spans.len() {
                let b = self.spans[self.j];
                self.j += 1;
                if a.end() <= b.start() {
                    self.j = self.spans.len();
                    break;
                }
                let kind = Self::classify(a, b);
                let wanted = match kind {
                    Intersection::Equal => self.yield_equal,
                    Intersection::Nested => self.yield_nested,
                    Intersection::Overlapped => self.yield_overlapped,
                };
                if wanted {
                    return Some((a, b, kind));
                }
            }
            self.i += 1;
            self.j = self.i + 1;
        }
        None
    }
}

/// Yields every pair of spans whose intervals intersect, with the kind of intersection.
/// Each kind can be included or excluded independently.
pub fn iterate_intersecting_spans<'a, T>(
    spans: impl IntoIterator<Item = &'a T>,
    yield_nested: bool,
    yield_equal: bool,
    yield_overlapped: bool,
) -> IntersectingSpans<'a, T>
where
    T: SpanLike + 'a,
{
    IntersectingSpans {
        spans: sorted(spans),
        yield_nested,
        yield_equal,
        yield_overlapped,
        i: 0,
        j: 1,
    }
}

/// Yields pairs of spans where one lies within the other (but they are not equal)
pub fn iterate_nested_spans<'a, T>(
    spans: impl IntoIterator<Item = &'a T>,
) -> impl Iterator<Item = (&'a T, &'a T)>
where
    T: SpanLike + 'a,
{
    iterate_intersecting_spans(spans, true, false, false).map(|(a, b, _)| (a, b))
}

/// Yields pairs of partially overlapping spans
pub fn iterate_overlapping_spans<'a, T>(
    spans: impl IntoIterator<Item = &'a T>,
) -> impl Iterator<Item = (&'a T, &'a T)>
where
    T: SpanLike + 'a,
{
    iterate_intersecting_spans(spans, false, false, true).map(|(a, b, _)| (a, b))
}
