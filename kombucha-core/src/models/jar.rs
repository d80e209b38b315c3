use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{HistoryEntry, Measurements};

/// Identifier of a jar. Assigned by storage, monotonically increasing.
pub type JarId = i64;

/// Grams of sugar in one spoon.
pub const GRAMS_PER_SPOON: f64 = 4.0;

/// The starting parameters of a jar.
///
/// Everything except `start_date` is fixed at creation. `start_date` marks
/// the beginning of the current fermentation cycle and moves forward on
/// every refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JarParameters {
    pub name: String,
    /// Liters.
    pub volume: f64,
    pub sugar_spoons: i64,
    pub tea_type: String,
    /// Free text, not used by the model.
    pub additives: String,
    pub start_date: DateTime<Utc>,
}

impl JarParameters {
    pub fn sugar_grams(&self) -> f64 {
        self.sugar_spoons as f64 * GRAMS_PER_SPOON
    }
}

/// A tracked jar.
///
/// # Measurement cache
///
/// `current_measurements` holds the last estimate that was *persisted*, by
/// create, annotate-update or refresh. It goes stale as time passes and is
/// never authoritative for display: reads recompute from `start_date`.
/// It exists because a refresh archives exactly this persisted value, not a
/// fresh estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JarRecord {
    pub id: JarId,
    #[serde(flatten)]
    pub parameters: JarParameters,
    pub last_refresh_date: DateTime<Utc>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(flatten)]
    pub current_measurements: Measurements,
}

/// Input for creating a new jar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateJarInput {
    pub name: String,
    pub volume: f64,
    pub sugar_spoons: i64,
    pub tea_type: String,
    #[serde(default)]
    pub additives: String,
}

impl CreateJarInput {
    /// Parameters for a cycle starting at `start_date`.
    pub fn into_parameters(self, start_date: DateTime<Utc>) -> JarParameters {
        JarParameters {
            name: self.name,
            volume: self.volume,
            sugar_spoons: self.sugar_spoons,
            tea_type: self.tea_type,
            additives: self.additives,
            start_date,
        }
    }
}

/// Input for annotating a jar with a manual observation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotateJarInput {
    /// Free-text notes. Older clients send this field as `updates`.
    #[serde(alias = "updates")]
    pub notes: String,
}

/// Result of an annotate-update: the recomputed values and the entry that
/// was appended to the jar's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotateOutcome {
    pub measurements: Measurements,
    pub entry: HistoryEntry,
}

/// Response body for a newly created jar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedJar {
    pub id: JarId,
}
