//! Memory entry model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User-asserted fact persisted outside the conversation.
///
/// Entries have no identity beyond their list position; the store supports
/// appending and clearing, never per-entry deletion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryEntry {
    /// The remembered text.
    pub text: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl MemoryEntry {
    /// Build an entry stamped with the current time.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}
