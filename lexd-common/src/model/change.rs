//! Proposed entry changes and their review lifecycle

use crate::model::Sense;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What kind of edit a change proposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Full rewrite of an entry's sense list (consolidation stage).
    Rewrite,
    /// Part-of-speech tags added to senses.
    PosTag,
    /// Removal of senses the labeling evidence rates poorly.
    Prune,
}

impl ChangeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeKind::Rewrite => "rewrite",
            ChangeKind::PosTag => "pos_tag",
            ChangeKind::Prune => "prune",
        }
    }
}

impl std::str::FromStr for ChangeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "rewrite" => Ok(ChangeKind::Rewrite),
            "pos_tag" => Ok(ChangeKind::PosTag),
            "prune" => Ok(ChangeKind::Prune),
            other => Err(Error::Validation(format!("unknown change kind: {}", other))),
        }
    }
}

/// Review status of a change. `Pending` is the only non-terminal state;
/// a change is reviewed exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeStatus {
    Pending,
    Approved,
    Rejected,
}

impl ChangeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeStatus::Pending => "pending",
            ChangeStatus::Approved => "approved",
            ChangeStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, ChangeStatus::Pending)
    }
}

impl std::str::FromStr for ChangeStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(ChangeStatus::Pending),
            "approved" => Ok(ChangeStatus::Approved),
            "rejected" => Ok(ChangeStatus::Rejected),
            other => Err(Error::Validation(format!(
                "unknown change status: {}",
                other
            ))),
        }
    }
}

/// A proposed edit to one entry, awaiting human review.
///
/// `before` is the sense list at proposal time (shown to the reviewer as
/// the diff base), `after` the full proposed replacement. Approval writes
/// `after` over whatever the entry holds at that moment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub id: Uuid,
    pub kind: ChangeKind,
    pub form: String,
    pub before: Vec<Sense>,
    pub after: Vec<Sense>,
    /// Kind-specific payload (e.g. which senses a prune removed and why).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Value>,
    pub status: ChangeStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl Change {
    /// Build a fresh pending change with a random id, stamped now.
    pub fn pending(
        kind: ChangeKind,
        form: impl Into<String>,
        before: Vec<Sense>,
        after: Vec<Sense>,
        extra: Option<serde_json::Value>,
    ) -> Self {
        Change {
            id: Uuid::new_v4(),
            kind,
            form: form.into(),
            before,
            after,
            extra,
            status: ChangeStatus::Pending,
            created_at: Utc::now(),
            reviewed_at: None,
        }
    }
}
