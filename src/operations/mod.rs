/*
    Strata (Layered Text Annotation Engine)
        Layers, spans and relations over stand-off annotated text

        Licensed under the GNU General Public License v3
*/

//! Operations on layers and texts that go beyond adding and querying annotations:
//! iterating over span pairs, resolving conflicts, flattening, n-gram fingerprints,
//! splitting texts into sections and joining them back together.

mod conflicts;
mod discontinuous;
mod flatten;
mod iterators;
mod join;
mod ngram;
mod splitting;

pub use conflicts::{resolve_conflicts, ConflictStatus, Strategy};
pub use discontinuous::{
    extract_discontinuous_sections, group_consecutive_spans, group_consecutive_spans_reduced,
    split_by_clauses,
};
pub use flatten::{flatten, DisambiguationStrategy};
pub use iterators::{
    any_gap, iterate_consecutive_spans, iterate_ending_spans, iterate_hovering_spans,
    iterate_intersecting_spans, iterate_nested_spans, iterate_overlapping_spans,
    iterate_starting_spans, iterate_touching_spans, ConsecutiveSpans, IntersectingSpans,
    Intersection,
};
pub use join::{join_layers, join_texts, shift_span};
pub use ngram::create_ngram_fingerprint_index;
pub use splitting::{
    extract_section, extract_sections, layers_to_keep_default, split_by, split_by_sentences,
};
