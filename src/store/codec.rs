//! Encoding of the history log as stored in a jar row.
//!
//! The blob is a JSON array of entries in operation order, the same shape the
//! chart UI reads. An empty blob is an empty history.

use kombucha_core::{HistoryEntry, JarId};

use crate::error::{Result, StoreError};

pub const EMPTY_HISTORY: &str = "[]";

/// Entries are plain data and always serialize, so an error here can only
/// mean the write itself cannot go ahead; it is reported as such.
pub fn encode(history: &[HistoryEntry]) -> Result<String> {
    serde_json::to_string(history).map_err(|e| StoreError::StorageUnavailable(e.to_string()))
}

pub fn decode(jar_id: JarId, blob: &str) -> Result<Vec<HistoryEntry>> {
    if blob.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(blob).map_err(|source| StoreError::MalformedHistory { jar_id, source })
}
