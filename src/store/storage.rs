//! The persistence contract the jar store is written against.

use chrono::{DateTime, Utc};
use kombucha_core::{JarId, JarParameters, Measurements};

use crate::error::Result;

/// A jar as persisted: flat fields, with the history kept as an encoded blob.
#[derive(Debug, Clone, PartialEq)]
pub struct JarFields {
    pub parameters: JarParameters,
    /// `None` in rows written before refresh dates were tracked.
    pub last_refresh_date: Option<DateTime<Utc>>,
    /// Encoded history, see [`super::codec`].
    pub history: String,
    pub measurements: Measurements,
}

/// A stored jar and its id.
#[derive(Debug, Clone, PartialEq)]
pub struct JarRow {
    pub id: JarId,
    pub fields: JarFields,
}

/// A partial field set for [`Storage::update`]. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JarChanges {
    pub start_date: Option<DateTime<Utc>>,
    pub last_refresh_date: Option<DateTime<Utc>>,
    pub history: Option<String>,
    pub measurements: Option<Measurements>,
}

impl JarChanges {
    pub fn is_empty(&self) -> bool {
        self.start_date.is_none()
            && self.last_refresh_date.is_none()
            && self.history.is_none()
            && self.measurements.is_none()
    }

    /// Applies the changes to `fields` in place.
    pub fn apply_to(self, fields: &mut JarFields) {
        if let Some(start_date) = self.start_date {
            fields.parameters.start_date = start_date;
        }
        if let Some(last_refresh_date) = self.last_refresh_date {
            fields.last_refresh_date = Some(last_refresh_date);
        }
        if let Some(history) = self.history {
            fields.history = history;
        }
        if let Some(measurements) = self.measurements {
            fields.measurements = measurements;
        }
    }
}

/// Key-value storage of jar rows.
///
/// Every method is a single atomic operation. `update` and `delete` report
/// whether a row with the id existed.
pub trait Storage: Send + Sync {
    fn get(&self, id: JarId) -> Result<Option<JarRow>>;

    /// All rows, ordered by id.
    fn get_all(&self) -> Result<Vec<JarRow>>;

    /// Stores a new row and returns its generated id.
    fn insert(&self, fields: JarFields) -> Result<JarId>;

    fn update(&self, id: JarId, changes: JarChanges) -> Result<bool>;

    fn delete(&self, id: JarId) -> Result<bool>;
}
