//! Dictionary entries and their senses

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Part-of-speech tag attached to a sense by the tagging stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Preposition,
    Conjunction,
    Pronoun,
    Determiner,
    Interjection,
    Other,
}

/// One sense of a word form.
///
/// Senses are value objects: stages never mutate one in place, they
/// propose a replacement list through the change queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sense {
    pub definition: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subsenses: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<PartOfSpeech>,
}

impl Sense {
    pub fn new(definition: impl Into<String>) -> Self {
        Sense {
            definition: definition.into(),
            subsenses: Vec::new(),
            pos: None,
        }
    }
}

/// A dictionary entry: a word form with its ordered senses, or a
/// one-hop redirect to a canonical form.
///
/// Redirect entries carry no senses. The write path does not enforce
/// that invariant; the `repair-redirects` pass restores it (clearing
/// senses) so a half-finished dedup stage cannot wedge writers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub form: String,
    #[serde(default)]
    pub senses: Vec<Sense>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

impl Entry {
    pub fn new(form: impl Into<String>) -> Self {
        Entry {
            form: form.into(),
            senses: Vec::new(),
            redirect: None,
        }
    }

    pub fn redirect_to(form: impl Into<String>, target: impl Into<String>) -> Self {
        Entry {
            form: form.into(),
            senses: Vec::new(),
            redirect: Some(target.into()),
        }
    }

    pub fn is_redirect(&self) -> bool {
        self.redirect.is_some()
    }
}

/// Normalization used to decide whether two definitions say the same thing.
fn normalized(definition: &str) -> String {
    definition.trim().to_lowercase()
}

/// Merge newly induced senses into an existing entry.
///
/// Append-only: existing senses are never removed or reordered (labels
/// reference them by positional sense key). A new sense is appended only
/// when its normalized definition is not already present. The existing
/// entry's redirect is preserved.
pub fn merge_entry(existing: &Entry, incoming: &Entry) -> Entry {
    let mut merged = existing.clone();
    let mut seen: HashSet<String> = existing
        .senses
        .iter()
        .map(|s| normalized(&s.definition))
        .collect();
    for sense in &incoming.senses {
        if seen.insert(normalized(&sense.definition)) {
            merged.senses.push(sense.clone());
        }
    }
    merged
}

/// Case-variant pairs worth sending to the dedup oracle: `(form, lower)`
/// where both entries exist and neither already redirects.
pub fn redirect_candidates(entries: &HashMap<String, Entry>) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = entries
        .iter()
        .filter_map(|(form, entry)| {
            let lower = form.to_lowercase();
            if lower == *form {
                return None;
            }
            let target = entries.get(&lower)?;
            if entry.is_redirect() || target.is_redirect() {
                return None;
            }
            Some((form.clone(), lower))
        })
        .collect();
    pairs.sort();
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_with(form: &str, definitions: &[&str]) -> Entry {
        Entry {
            form: form.to_string(),
            senses: definitions.iter().map(|d| Sense::new(*d)).collect(),
            redirect: None,
        }
    }

    #[test]
    fn merge_appends_only_new_definitions() {
        let existing = entry_with("bank", &["a financial institution", "land beside a river"]);
        let incoming = entry_with(
            "bank",
            &["A financial institution ", "a row of similar things"],
        );

        let merged = merge_entry(&existing, &incoming);
        let defs: Vec<&str> = merged.senses.iter().map(|s| s.definition.as_str()).collect();
        assert_eq!(
            defs,
            vec![
                "a financial institution",
                "land beside a river",
                "a row of similar things"
            ]
        );
    }

    #[test]
    fn merge_never_removes_or_reorders() {
        let existing = entry_with("run", &["to move quickly", "a sequence"]);
        let incoming = entry_with("run", &[]);

        let merged = merge_entry(&existing, &incoming);
        assert_eq!(merged, existing);
    }

    #[test]
    fn merge_preserves_redirect() {
        let mut existing = entry_with("Bank", &[]);
        existing.redirect = Some("bank".to_string());
        let incoming = entry_with("Bank", &["a financial institution"]);

        let merged = merge_entry(&existing, &incoming);
        assert_eq!(merged.redirect.as_deref(), Some("bank"));
    }

    #[test]
    fn redirect_candidates_pairs_case_variants() {
        let mut entries = HashMap::new();
        entries.insert("Apple".to_string(), entry_with("Apple", &["the company"]));
        entries.insert("apple".to_string(), entry_with("apple", &["the fruit"]));
        entries.insert("banana".to_string(), entry_with("banana", &["the fruit"]));

        let pairs = redirect_candidates(&entries);
        assert_eq!(pairs, vec![("Apple".to_string(), "apple".to_string())]);
    }

    #[test]
    fn redirect_candidates_skip_existing_redirects() {
        let mut entries = HashMap::new();
        entries.insert(
            "Apple".to_string(),
            Entry::redirect_to("Apple", "apple"),
        );
        entries.insert("apple".to_string(), entry_with("apple", &["the fruit"]));

        assert!(redirect_candidates(&entries).is_empty());
    }

    #[test]
    fn entry_json_omits_empty_optional_fields() {
        let entry = entry_with("tree", &["a woody plant"]);
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("redirect"));
        assert!(!json.contains("subsenses"));
        assert!(!json.contains("pos"));

        let back: Entry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
