/*
    Strata (Layered Text Annotation Engine)
        Layers, spans and relations over stand-off annotated text

        Licensed under the GNU General Public License v3
*/

//! This module contains the [`BaseSpan`] location descriptors. A base span is either an
//! [`ElementaryBaseSpan`] (a half-open interval in unicode codepoints) or an [`EnvelopingBaseSpan`]
//! that wraps other base spans of one level lower.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

use crate::error::{StrataError, StrataResult};

/// An immutable, hashable and totally ordered location descriptor.
///
/// Ordering is lexicographic over the flattened sequence of `(start, end)` leaf intervals.
/// Equality is structural: two base spans with identical leaves but different nesting are not equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BaseSpan {
    Elementary(ElementaryBaseSpan),
    Enveloping(EnvelopingBaseSpan),
}

/// A single text interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementaryBaseSpan {
    start: usize,
    end: usize,
}

/// Wraps a non-empty sequence of base spans that all share one level
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnvelopingBaseSpan {
    spans: Vec<BaseSpan>,
    start: usize,
    end: usize,
    level: usize,
}

impl ElementaryBaseSpan {
    /// Creates a new elementary base span, `start` may not exceed `end`
    pub fn new(start: usize, end: usize) -> StrataResult<Self> {
        if start > end {
            return Err(StrataError::InvalidArgument(
                format!("start {} is greater than end {}", start, end),
                "ElementaryBaseSpan::new",
            ));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }
}

impl EnvelopingBaseSpan {
    /// Creates a new enveloping base span. The children must be non-empty and of equal level.
    pub fn new(spans: Vec<BaseSpan>) -> StrataResult<Self> {
        let first = spans.first().ok_or_else(|| {
            StrataError::TypeMismatch(
                "an enveloping base span needs at least one child".to_string(),
                "EnvelopingBaseSpan::new",
            )
        })?;
        let child_level = first.level();
        let mut start = first.start();
        let mut end = first.end();
        for span in spans.iter().skip(1) {
            if span.level() != child_level {
                return Err(StrataError::LevelMismatch(
                    child_level,
                    span.level(),
                    "EnvelopingBaseSpan::new: all children must have the same level",
                ));
            }
            start = start.min(span.start());
            end = end.max(span.end());
        }
        Ok(Self {
            spans,
            start,
            end,
            level: child_level + 1,
        })
    }

    /// The wrapped base spans, one level down
    pub fn spans(&self) -> &[BaseSpan] {
        &self.spans
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn level(&self) -> usize {
        self.level
    }
}

impl BaseSpan {
    /// Shortcut to create an elementary base span
    pub fn elementary(start: usize, end: usize) -> StrataResult<Self> {
        Ok(Self::Elementary(ElementaryBaseSpan::new(start, end)?))
    }

    /// Shortcut to create an enveloping base span
    pub fn enveloping(spans: Vec<BaseSpan>) -> StrataResult<Self> {
        Ok(Self::Enveloping(EnvelopingBaseSpan::new(spans)?))
    }

    pub fn start(&self) -> usize {
        match self {
            Self::Elementary(span) => span.start,
            Self::Enveloping(span) => span.start,
        }
    }

    pub fn end(&self) -> usize {
        match self {
            Self::Elementary(span) => span.end,
            Self::Enveloping(span) => span.end,
        }
    }

    /// Nesting depth, 0 for elementary spans
    pub fn level(&self) -> usize {
        match self {
            Self::Elementary(_) => 0,
            Self::Enveloping(span) => span.level,
        }
    }

    /// Length of the enclosing interval (in unicode codepoints)
    pub fn len(&self) -> usize {
        self.end() - self.start()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_enveloping(&self) -> bool {
        matches!(self, Self::Enveloping(_))
    }

    /// Returns the children of an enveloping base span, an empty slice for elementary ones
    pub fn spans(&self) -> &[BaseSpan] {
        match self {
            Self::Elementary(_) => &[],
            Self::Enveloping(span) => span.spans(),
        }
    }

    /// Iterates over the leaf intervals in order
    pub fn leaves(&self) -> Box<dyn Iterator<Item = (usize, usize)> + '_> {
        match self {
            Self::Elementary(span) => Box::new(std::iter::once((span.start, span.end))),
            Self::Enveloping(span) => Box::new(span.spans.iter().flat_map(|s| s.leaves())),
        }
    }

    /// Returns the ordered sequence of leaf `(start, end)` intervals
    pub fn flatten(&self) -> Vec<(usize, usize)> {
        self.leaves().collect()
    }

    /// Projects this base span down to `level`: returns the descendants at that level, in order.
    /// Reducing to the span's own level returns the span itself.
    pub fn reduce(&self, level: usize) -> StrataResult<Vec<BaseSpan>> {
        let mut result = Vec::new();
        self.reduce_into(level, &mut result)?;
        Ok(result)
    }

    fn reduce_into(&self, level: usize, result: &mut Vec<BaseSpan>) -> StrataResult<()> {
        let own_level = self.level();
        if level == own_level {
            result.push(self.clone());
            Ok(())
        } else if level > own_level {
            Err(StrataError::LevelMismatch(
                own_level,
                level,
                "BaseSpan::reduce: can not reduce to a higher level",
            ))
        } else {
            for span in self.spans() {
                span.reduce_into(level, result)?;
            }
            Ok(())
        }
    }

    /// Returns a copy with every leaf interval moved by `offset` (which may be negative).
    pub fn shift(&self, offset: isize) -> StrataResult<BaseSpan> {
        match self {
            Self::Elementary(span) => {
                let start = span.start as isize + offset;
                let end = span.end as isize + offset;
                if start < 0 {
                    return Err(StrataError::InvalidArgument(
                        format!("shifting {} by {} yields a negative offset", self, offset),
                        "BaseSpan::shift",
                    ));
                }
                BaseSpan::elementary(start as usize, end as usize)
            }
            Self::Enveloping(span) => BaseSpan::enveloping(
                span.spans
                    .iter()
                    .map(|s| s.shift(offset))
                    .collect::<StrataResult<Vec<_>>>()?,
            ),
        }
    }

    /// Converts this base span to its raw (serialisable) location
    pub fn to_raw(&self) -> RawLocation {
        match self {
            Self::Elementary(span) => RawLocation::Elementary(span.start, span.end),
            Self::Enveloping(span) => {
                RawLocation::Enveloping(span.spans.iter().map(|s| s.to_raw()).collect())
            }
        }
    }
}

impl Ord for BaseSpan {
    fn cmp(&self, other: &Self) -> Ordering {
        self.leaves()
            .cmp(other.leaves())
            .then_with(|| self.level().cmp(&other.level()))
            .then_with(|| match (self, other) {
                (Self::Enveloping(a), Self::Enveloping(b)) => a.spans.cmp(&b.spans),
                _ => Ordering::Equal,
            })
    }
}

impl PartialOrd for BaseSpan {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for BaseSpan {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Elementary(span) => write!(f, "({}, {})", span.start, span.end),
            Self::Enveloping(span) => {
                write!(f, "[")?;
                for (i, child) in span.spans.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", child)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// The raw, serialisable form of a location: `[start, end]` or a (nested) list thereof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawLocation {
    Elementary(usize, usize),
    Enveloping(Vec<RawLocation>),
}

impl TryFrom<RawLocation> for BaseSpan {
    type Error = StrataError;
    fn try_from(raw: RawLocation) -> Result<Self, Self::Error> {
        match raw {
            RawLocation::Elementary(start, end) => BaseSpan::elementary(start, end),
            RawLocation::Enveloping(children) => BaseSpan::enveloping(
                children
                    .into_iter()
                    .map(BaseSpan::try_from)
                    .collect::<StrataResult<Vec<_>>>()?,
            ),
        }
    }
}

impl Serialize for BaseSpan {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_raw().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BaseSpan {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawLocation::deserialize(deserializer)?;
        BaseSpan::try_from(raw).map_err(|e| D::Error::custom(format!("{}", e)))
    }
}

/// Anything that can be normalised to a [`BaseSpan`]: raw `(start, end)` tuples,
/// lists of tuples (enveloping), raw locations, base spans and spans.
pub trait ToBaseSpan {
    fn to_base_span(self) -> StrataResult<BaseSpan>;
}

impl ToBaseSpan for BaseSpan {
    fn to_base_span(self) -> StrataResult<BaseSpan> {
        Ok(self)
    }
}

impl ToBaseSpan for &BaseSpan {
    fn to_base_span(self) -> StrataResult<BaseSpan> {
        Ok(self.clone())
    }
}

impl ToBaseSpan for (usize, usize) {
    fn to_base_span(self) -> StrataResult<BaseSpan> {
        BaseSpan::elementary(self.0, self.1)
    }
}

impl ToBaseSpan for &[(usize, usize)] {
    fn to_base_span(self) -> StrataResult<BaseSpan> {
        BaseSpan::enveloping(
            self.iter()
                .map(|(start, end)| BaseSpan::elementary(*start, *end))
                .collect::<StrataResult<Vec<_>>>()?,
        )
    }
}

impl<const N: usize> ToBaseSpan for [(usize, usize); N] {
    fn to_base_span(self) -> StrataResult<BaseSpan> {
        self.as_slice().to_base_span()
    }
}

impl ToBaseSpan for Vec<(usize, usize)> {
    fn to_base_span(self) -> StrataResult<BaseSpan> {
        self.as_slice().to_base_span()
    }
}

impl ToBaseSpan for Vec<BaseSpan> {
    fn to_base_span(self) -> StrataResult<BaseSpan> {
        BaseSpan::enveloping(self)
    }
}

impl ToBaseSpan for RawLocation {
    fn to_base_span(self) -> StrataResult<BaseSpan> {
        BaseSpan::try_from(self)
    }
}
