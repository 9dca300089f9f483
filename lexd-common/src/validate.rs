//! Label consistency checks against the current corpus
//!
//! Labels address document text by byte offset. Documents change when
//! the corpus is rebuilt, so a label is only trustworthy while the text
//! at its offset still spells the labeled form.

use crate::model::AnnotatedOccurrence;
use std::collections::HashMap;

/// True when `text` spells `form` at `byte_offset`.
///
/// Offsets outside the text, or landing off a UTF-8 boundary, do not
/// match.
pub fn occurrence_matches(text: &str, byte_offset: i64, form: &str) -> bool {
    let Ok(start) = usize::try_from(byte_offset) else {
        return false;
    };
    let Some(end) = start.checked_add(form.len()) else {
        return false;
    };
    matches!(text.get(start..end), Some(slice) if slice == form)
}

/// Return the labels whose recorded offset no longer matches their form.
///
/// A label whose document is absent from `docs` is skipped, not flagged:
/// corpus pruning routinely drops documents, and those labels are merely
/// orphaned rather than wrong.
pub fn find_stale<'a>(
    labels: &'a [AnnotatedOccurrence],
    docs: &HashMap<String, String>,
) -> Vec<&'a AnnotatedOccurrence> {
    labels
        .iter()
        .filter(|label| match docs.get(&label.doc_id) {
            Some(text) => !occurrence_matches(text, label.byte_offset, &label.form),
            None => false,
        })
        .collect()
}
