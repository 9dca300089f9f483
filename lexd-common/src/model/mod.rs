//! Core data model shared by every lexd stage

pub mod change;
pub mod entry;
pub mod occurrence;
pub mod sense_key;
pub mod target;

pub use change::{Change, ChangeKind, ChangeStatus};
pub use entry::{merge_entry, redirect_candidates, Entry, PartOfSpeech, Sense};
pub use occurrence::{AnnotatedOccurrence, Occurrence, Rating};
pub use sense_key::{parse_sense_key, sense_key};
pub use target::UpdateTarget;
