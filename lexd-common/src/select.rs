//! Target selection: where the labeling budget goes next
//!
//! Forms compete for oracle attention by a Thompson-flavored draw: each
//! form's unlabeled occurrences are tried against its estimated bad-label
//! rate, and the forms with the most speculative hits take the top slots.
//! Forms whose senses keep earning bad labels, and forms with lots of
//! unlabeled text, both rise; fully labeled, well-covered forms sink.

use crate::model::AnnotatedOccurrence;
use crate::{Error, Result};
use rand::Rng;
use rand_distr::{Binomial, Distribution};
use std::collections::{HashMap, HashSet};

/// Per-form labeling statistics feeding the selection draw.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateStats {
    pub form: String,
    /// Occurrences of the form in the corpus.
    pub total: u64,
    /// Distinct labeled locations rated 0 or 1.
    pub n_bad: u64,
    /// Distinct labeled locations rated 2 or 3.
    pub n_good: u64,
    /// Corpus occurrences with no label yet.
    pub unlabeled: u64,
    /// Posterior mean of the bad-label rate: `(n_bad + 1) / (n_labeled + 2)`.
    /// An unlabeled form starts at 0.5 rather than a fake certainty.
    pub bad_rate: f64,
}

/// Compute selection statistics for every corpus form worth labeling.
///
/// Skips forms containing no ASCII letter (tokenizer punctuation
/// artifacts) and forms that redirect elsewhere. Labeled locations are
/// counted distinct by `(doc_id, byte_offset)` so duplicate label rows
/// never inflate the counts, and `unlabeled` clamps at zero when labels
/// outnumber what the current corpus holds. Candidates come back sorted
/// by form so a seeded run consumes randomness in a fixed order.
pub fn candidate_stats(
    totals: &HashMap<String, u64>,
    labels: &[AnnotatedOccurrence],
    redirect_forms: &HashSet<String>,
) -> Vec<CandidateStats> {
    let mut bad_locations: HashMap<&str, HashSet<(&str, i64)>> = HashMap::new();
    let mut good_locations: HashMap<&str, HashSet<(&str, i64)>> = HashMap::new();
    for label in labels {
        let per_form = if label.rating.is_good() {
            &mut good_locations
        } else {
            &mut bad_locations
        };
        per_form
            .entry(label.form.as_str())
            .or_default()
            .insert((label.doc_id.as_str(), label.byte_offset));
    }

    let mut forms: Vec<&String> = totals.keys().collect();
    forms.sort();

    let mut stats = Vec::with_capacity(forms.len());
    for form in forms {
        if !form.chars().any(|c| c.is_ascii_alphabetic()) {
            continue;
        }
        if redirect_forms.contains(form.as_str()) {
            continue;
        }

        let total = totals[form];
        let n_bad = bad_locations.get(form.as_str()).map_or(0, |s| s.len() as u64);
        let n_good = good_locations.get(form.as_str()).map_or(0, |s| s.len() as u64);
        let n_labeled = n_bad + n_good;
        let unlabeled = total.saturating_sub(n_labeled);
        let bad_rate = (n_bad as f64 + 1.0) / (n_labeled as f64 + 2.0);

        stats.push(CandidateStats {
            form: form.clone(),
            total,
            n_bad,
            n_good,
            unlabeled,
            bad_rate,
        });
    }
    stats
}

/// Pick the `top_n` forms most worth relabeling.
///
/// Each candidate draws one `Binomial(unlabeled, bad_rate)` sample: the
/// number of its unlabeled occurrences that would hypothetically come
/// back badly labeled. Highest draws win. The sort is stable over
/// form-ordered candidates, so equal scores resolve alphabetically and
/// a fixed seed reproduces the exact selection.
pub fn select_top_n<R: Rng + ?Sized>(
    totals: &HashMap<String, u64>,
    labels: &[AnnotatedOccurrence],
    redirect_forms: &HashSet<String>,
    top_n: usize,
    rng: &mut R,
) -> Result<Vec<String>> {
    let stats = candidate_stats(totals, labels, redirect_forms);

    let mut scored = Vec::with_capacity(stats.len());
    for candidate in stats {
        let distribution = Binomial::new(candidate.unlabeled, candidate.bad_rate)
            .map_err(|e| Error::Validation(format!("binomial draw for {}: {}", candidate.form, e)))?;
        let score = distribution.sample(rng);
        scored.push((score, candidate.form));
    }

    scored.sort_by(|a, b| b.0.cmp(&a.0));
    Ok(scored.into_iter().take(top_n).map(|(_, form)| form).collect())
}
