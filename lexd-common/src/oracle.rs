//! Typed decoding of oracle responses
//!
//! The oracle (an LLM behind an external transport) answers each stage
//! with JSON. This module is the contract: every stage gets a strict
//! deserializer that fails closed. Unknown fields, wrong types,
//! out-of-range ratings, and malformed sense keys are all rejected as
//! [`Error::MalformedOracleResponse`] so the caller re-asks instead of
//! curating garbage.

use crate::model::{parse_sense_key, PartOfSpeech, Rating, Sense};
use crate::{Error, Result};
use serde::Deserialize;

/// One sense induced from corpus occurrences of a form.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InducedSense {
    pub definition: String,
    #[serde(default)]
    pub subsenses: Vec<String>,
}

impl From<InducedSense> for Sense {
    fn from(induced: InducedSense) -> Sense {
        Sense {
            definition: induced.definition,
            subsenses: induced.subsenses,
            pos: None,
        }
    }
}

/// The labeling stage's verdict for one occurrence.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SenseJudgment {
    pub sense_key: String,
    pub rating: Rating,
}

/// The dedup stage's verdict on a candidate redirect pair.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RedirectVerdict {
    pub is_redirect: bool,
    pub reason: String,
}

/// The tagging stage's part-of-speech verdict for one sense.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PosVerdict {
    pub pos: PartOfSpeech,
}

/// The consolidation stage's full rewrite of an entry's senses.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SenseRewrite {
    pub senses: Vec<Sense>,
}

fn decode<T: for<'de> Deserialize<'de>>(stage: &str, raw: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(|e| Error::MalformedOracleResponse(format!("{}: {}", stage, e)))
}

/// Decode a sense induction response: a JSON array of senses.
pub fn decode_induction(raw: &str) -> Result<Vec<InducedSense>> {
    decode("sense induction", raw)
}

/// Decode a labeling response, additionally requiring a well-formed
/// sense key.
pub fn decode_labeling(raw: &str) -> Result<SenseJudgment> {
    let judgment: SenseJudgment = decode("sense labeling", raw)?;
    parse_sense_key(&judgment.sense_key)
        .map_err(|e| Error::MalformedOracleResponse(format!("sense labeling: {}", e)))?;
    Ok(judgment)
}

/// Decode a redirect-dedup response.
pub fn decode_redirect(raw: &str) -> Result<RedirectVerdict> {
    decode("redirect dedup", raw)
}

/// Decode a part-of-speech tagging response.
pub fn decode_pos(raw: &str) -> Result<PosVerdict> {
    decode("pos tagging", raw)
}

/// Decode a sense rewrite response.
pub fn decode_rewrite(raw: &str) -> Result<SenseRewrite> {
    decode("sense rewrite", raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn induction_accepts_documented_shape() {
        let raw = r#"[
            {"definition": "a woody plant", "subsenses": ["a small shrub"]},
            {"definition": "a branching diagram"}
        ]"#;
        let senses = decode_induction(raw).unwrap();
        assert_eq!(senses.len(), 2);
        assert_eq!(senses[0].subsenses, vec!["a small shrub"]);
        assert!(senses[1].subsenses.is_empty());
    }

    #[test]
    fn induction_rejects_unknown_fields() {
        let raw = r#"[{"definition": "a woody plant", "confidence": 0.9}]"#;
        assert!(matches!(
            decode_induction(raw),
            Err(Error::MalformedOracleResponse(_))
        ));
    }

    #[test]
    fn labeling_accepts_documented_shape() {
        let judgment = decode_labeling(r#"{"sense_key": "3b", "rating": 2}"#).unwrap();
        assert_eq!(judgment.sense_key, "3b");
        assert_eq!(judgment.rating, Rating::Good);
    }

    #[test]
    fn labeling_rejects_out_of_range_rating() {
        assert!(matches!(
            decode_labeling(r#"{"sense_key": "1", "rating": 5}"#),
            Err(Error::MalformedOracleResponse(_))
        ));
    }

    #[test]
    fn labeling_rejects_malformed_sense_key() {
        assert!(matches!(
            decode_labeling(r#"{"sense_key": "bogus", "rating": 2}"#),
            Err(Error::MalformedOracleResponse(_))
        ));
    }

    #[test]
    fn labeling_rejects_missing_fields() {
        assert!(decode_labeling(r#"{"rating": 2}"#).is_err());
        assert!(decode_labeling(r#"{"sense_key": "1"}"#).is_err());
    }

    #[test]
    fn redirect_accepts_documented_shape() {
        let verdict =
            decode_redirect(r#"{"is_redirect": true, "reason": "capitalization variant"}"#)
                .unwrap();
        assert!(verdict.is_redirect);
    }

    #[test]
    fn redirect_rejects_wrong_types() {
        assert!(decode_redirect(r#"{"is_redirect": "yes", "reason": "r"}"#).is_err());
    }

    #[test]
    fn pos_accepts_known_tags_only() {
        assert_eq!(
            decode_pos(r#"{"pos": "noun"}"#).unwrap().pos,
            PartOfSpeech::Noun
        );
        assert!(decode_pos(r#"{"pos": "gerund"}"#).is_err());
    }

    #[test]
    fn rewrite_accepts_full_sense_lists() {
        let raw = r#"{"senses": [
            {"definition": "a financial institution"},
            {"definition": "land beside a river", "pos": "noun"}
        ]}"#;
        let rewrite = decode_rewrite(raw).unwrap();
        assert_eq!(rewrite.senses.len(), 2);
        assert_eq!(rewrite.senses[1].pos, Some(PartOfSpeech::Noun));
    }

    #[test]
    fn truncated_payloads_fail_closed() {
        assert!(decode_rewrite(r#"{"senses": [{"definition": "partial"#).is_err());
    }
}
