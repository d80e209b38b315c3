use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Measurements;

/// An append-only log entry recording the state of a jar at some date.
///
/// Two kinds of entries share this shape:
///
/// - manual observations, written by an annotate-update, which carry `notes`
///   and are dated at the moment of the call;
/// - refresh snapshots, which carry no notes and are dated at the previous
///   refresh (or the jar's start).
///
/// Entries are kept in the order the operations happened, which is not
/// necessarily date order: a refresh snapshot is appended last even though
/// its date usually precedes the manual entries before it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub measurements: Measurements,
}

impl HistoryEntry {
    /// A manual observation with free-text notes.
    pub fn observation(date: DateTime<Utc>, notes: impl Into<String>, measurements: Measurements) -> Self {
        Self {
            date,
            notes: Some(notes.into()),
            measurements,
        }
    }

    /// The snapshot archived when a batch ends.
    pub fn snapshot(date: DateTime<Utc>, measurements: Measurements) -> Self {
        Self {
            date,
            notes: None,
            measurements,
        }
    }

    pub fn is_snapshot(&self) -> bool {
        self.notes.is_none()
    }
}
