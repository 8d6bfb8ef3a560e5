/*
    Strata (Layered Text Annotation Engine)
        Layers, spans and relations over stand-off annotated text

        Licensed under the GNU General Public License v3
*/

use smallvec::SmallVec;
use std::fmt;

use crate::annotation::Annotation;
use crate::basespan::{BaseSpan, ToBaseSpan};
use crate::error::StrataResult;
use crate::types::*;
use crate::value::AnnotationValue;

/// A span owns a location ([`BaseSpan`]) and a non-empty list of annotations on it.
/// Enveloping spans are ordinary spans whose base span is enveloping; their sub-spans can
/// be resolved through [`crate::Text::sub_spans`].
#[derive(Debug, Clone)]
pub struct Span {
    handle: Option<SpanHandle>,
    base_span: BaseSpan,
    annotations: SmallVec<[Annotation; 1]>,
}

impl Span {
    /// Creates a new span without annotations, it is not bound to any layer yet.
    pub fn new(base_span: BaseSpan) -> Self {
        Self {
            handle: None,
            base_span,
            annotations: SmallVec::new(),
        }
    }

    /// Builder method to add an annotation to an unbound span
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Returns the handle of this span in its layer, if bound
    pub fn handle(&self) -> Option<SpanHandle> {
        self.handle
    }

    pub(crate) fn bind(&mut self, handle: SpanHandle) {
        self.handle = Some(handle);
        for annotation in self.annotations.iter_mut() {
            annotation.bind(handle);
        }
    }

    pub fn base_span(&self) -> &BaseSpan {
        &self.base_span
    }

    pub fn start(&self) -> usize {
        self.base_span.start()
    }

    pub fn end(&self) -> usize {
        self.base_span.end()
    }

    pub fn level(&self) -> usize {
        self.base_span.level()
    }

    pub fn is_enveloping(&self) -> bool {
        self.base_span.is_enveloping()
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Mutable access to the annotations, allows changing values in place
    /// but not adding or removing annotations.
    pub fn annotations_mut(&mut self) -> &mut [Annotation] {
        &mut self.annotations
    }

    pub(crate) fn push_annotation(&mut self, mut annotation: Annotation) -> &Annotation {
        if let Some(handle) = self.handle {
            annotation.bind(handle);
        }
        self.annotations.push(annotation);
        let last = self.annotations.len() - 1;
        &self.annotations[last]
    }

    pub(crate) fn replace_annotations(&mut self, annotations: Vec<Annotation>) {
        self.annotations = annotations.into_iter().collect();
        if let Some(handle) = self.handle {
            for annotation in self.annotations.iter_mut() {
                annotation.bind(handle);
            }
        }
    }

    pub(crate) fn retain_annotations(&mut self, mut keep: impl FnMut(usize, &Annotation) -> bool) {
        let mut index = 0;
        self.annotations.retain(|annotation| {
            let result = keep(index, annotation);
            index += 1;
            result
        });
    }

    /// Value of an attribute in the first annotation. Convenient for unambiguous layers.
    pub fn value(&self, attribute: &str) -> Option<&AnnotationValue> {
        self.annotations.first().and_then(|a| a.get(attribute))
    }

    /// Values of an attribute over all annotations
    pub fn values(&self, attribute: &str) -> Vec<&AnnotationValue> {
        self.annotations
            .iter()
            .filter_map(|a| a.get(attribute))
            .collect()
    }
}

impl PartialEq for Span {
    /// Spans are equal if their base spans are equal and they carry the same annotations, in any order.
    fn eq(&self, other: &Self) -> bool {
        self.base_span == other.base_span
            && self.annotations.len() == other.annotations.len()
            && self
                .annotations
                .iter()
                .all(|a| other.annotations.contains(a))
            && other
                .annotations
                .iter()
                .all(|a| self.annotations.contains(a))
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Span({}, [", self.base_span)?;
        for (i, annotation) in self.annotations.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", annotation)?;
        }
        write!(f, "])")
    }
}

impl ToBaseSpan for &Span {
    fn to_base_span(self) -> StrataResult<BaseSpan> {
        Ok(self.base_span.clone())
    }
}

/// Anything that has a location. The span iterators and conflict resolution work on this.
pub trait SpanLike {
    fn base_span(&self) -> &BaseSpan;

    fn start(&self) -> usize {
        self.base_span().start()
    }

    fn end(&self) -> usize {
        self.base_span().end()
    }
}

impl SpanLike for BaseSpan {
    fn base_span(&self) -> &BaseSpan {
        self
    }
}

impl SpanLike for Span {
    fn base_span(&self) -> &BaseSpan {
        &self.base_span
    }
}

impl<T: SpanLike> SpanLike for &T {
    fn base_span(&self) -> &BaseSpan {
        T::base_span(*self)
    }
}
