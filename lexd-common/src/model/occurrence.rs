//! Corpus occurrences and their labels

use serde::{Deserialize, Serialize};

/// Quality rating the oracle assigns to a (occurrence, sense) pairing.
///
/// Stored as the integers 0..=3. Ratings 2 and 3 count as usable labels,
/// 0 and 1 as evidence the entry's senses do not cover the occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Rating {
    Wrong = 0,
    Poor = 1,
    Good = 2,
    Excellent = 3,
}

impl Rating {
    pub fn is_good(self) -> bool {
        matches!(self, Rating::Good | Rating::Excellent)
    }
}

impl From<Rating> for i64 {
    fn from(rating: Rating) -> i64 {
        rating as i64
    }
}

impl TryFrom<i64> for Rating {
    type Error = String;

    fn try_from(value: i64) -> std::result::Result<Self, String> {
        match value {
            0 => Ok(Rating::Wrong),
            1 => Ok(Rating::Poor),
            2 => Ok(Rating::Good),
            3 => Ok(Rating::Excellent),
            other => Err(format!("rating out of range 0..=3: {}", other)),
        }
    }
}

/// One location of a form in the corpus, addressed by byte offset into
/// the document text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Occurrence {
    pub doc_id: String,
    pub byte_offset: i64,
}

/// A labeled occurrence: which sense the oracle picked for the form at
/// this corpus location, and how well it fit.
///
/// `(form, doc_id, byte_offset)` identifies the row; relabeling the same
/// location replaces the previous sense key and rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedOccurrence {
    pub form: String,
    pub doc_id: String,
    pub byte_offset: i64,
    pub sense_key: String,
    pub rating: Rating,
}
