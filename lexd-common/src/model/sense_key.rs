//! Sense key encoding and parsing
//!
//! Senses are addressed by compact keys shared with reviewers and the
//! oracle: `"3"` is the third top-level sense, `"3b"` its second subsense.
//! Internally everything is 0-based; keys are 1-based for humans.

use crate::{Error, Result};

/// Encode 0-based sense indices as a display key.
///
/// `sense_key(2, None)` is `"3"`; `sense_key(2, Some(1))` is `"3b"`.
pub fn sense_key(top: usize, sub: Option<usize>) -> String {
    match sub {
        Some(s) => {
            debug_assert!(s < 26, "subsense index beyond 'z'");
            format!("{}{}", top + 1, (b'a' + s as u8) as char)
        }
        None => format!("{}", top + 1),
    }
}

/// Parse a display key back to 0-based `(top, subsense)` indices.
///
/// Accepts surrounding whitespace and an upper- or lowercase subsense
/// letter. Rejects empty strings, non-numeric prefixes, and `"0"`
/// (numbering starts at 1).
pub fn parse_sense_key(key: &str) -> Result<(usize, Option<usize>)> {
    let key = key.trim();
    if key.is_empty() {
        return Err(Error::InvalidKey("empty sense key".to_string()));
    }

    let (num_part, sub) = match key.chars().last() {
        Some(c) if c.is_ascii_alphabetic() => {
            let sub = (c.to_ascii_lowercase() as u8 - b'a') as usize;
            (&key[..key.len() - 1], Some(sub))
        }
        _ => (key, None),
    };

    let top = num_part
        .parse::<usize>()
        .map_err(|_| Error::InvalidKey(format!("unparseable sense key: {}", key)))?;
    if top == 0 {
        return Err(Error::InvalidKey(format!(
            "sense numbering starts at 1: {}",
            key
        )));
    }

    Ok((top - 1, sub))
}
