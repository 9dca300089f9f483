//! Selector output records

use serde::{Deserialize, Serialize};

/// One unit of labeling work chosen by the target selector: a form, and
/// optionally a specific sense the downstream stage should concentrate on.
///
/// Written as a standalone JSON file per form so the oracle-facing stages
/// can pick work items up independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateTarget {
    pub form: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sense: Option<String>,
}

impl UpdateTarget {
    pub fn for_form(form: impl Into<String>) -> Self {
        UpdateTarget {
            form: form.into(),
            sense: None,
        }
    }
}
