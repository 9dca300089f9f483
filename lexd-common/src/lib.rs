//! # LEXD Common Library
//!
//! Shared code for the lexd curation tools including:
//! - Dictionary data model (entries, senses, sense keys)
//! - Durable stores over SQLite (entries, labeled occurrences, changes)
//! - Read-only corpus access and context extraction
//! - Target selection (where the labeling budget goes next)
//! - Label consistency validation
//! - Oracle payload decoding
//! - Configuration loading

pub mod config;
pub mod corpus;
pub mod db;
pub mod error;
pub mod model;
pub mod oracle;
pub mod select;
pub mod validate;

pub use error::{Error, Result};
pub use model::{AnnotatedOccurrence, Change, ChangeKind, ChangeStatus, Entry, Rating, Sense};
