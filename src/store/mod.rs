//! Jar store and history manager.
//!
//! [`JarStore`] owns the lifecycle of jar records on top of a [`Storage`]
//! backend. Every read recomputes measurements from the jar's start date;
//! mutations persist the recomputed values alongside the history log.
//!
//! # History protocol
//!
//! - An annotate-update appends an observation dated now, carrying the
//!   freshly estimated measurements.
//! - A refresh appends a snapshot dated at the previous refresh (or start)
//!   carrying the *persisted* measurements, then restarts the cycle clock.
//!   Snapshot and reset go to storage as one write.
//!
//! # Concurrency
//!
//! Operations that read-modify-write a jar run under that jar's own mutex, so
//! two updates on the same jar can never lose an entry. Different jars never
//! contend.

pub mod codec;
mod memory;
mod storage;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use kombucha_core::estimator::{self, elapsed_days};
use kombucha_core::{
    AnnotateOutcome, CreateJarInput, HistoryEntry, JarId, JarRecord, Measurements, TimelinePoint,
};

use crate::clock::{Clock, SystemClock};
use crate::error::{Result, StoreError};

pub use memory::MemoryStorage;
pub use storage::{JarChanges, JarFields, JarRow, Storage};

/// Manages jar records and their history. Cheap to clone.
#[derive(Clone)]
pub struct JarStore {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    locks: Arc<Mutex<HashMap<JarId, Arc<Mutex<()>>>>>,
}

impl JarStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self::with_clock(storage, Arc::new(SystemClock))
    }

    pub fn with_clock(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            clock,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    // ============================================================
    // Reads
    // ============================================================

    /// All jars with measurements computed as of now.
    ///
    /// The persisted measurement cache is left untouched.
    pub fn list(&self) -> Result<Vec<JarRecord>> {
        let now = self.clock.now();
        let rows = self.storage.get_all()?;
        tracing::debug!("Listing {} jars", rows.len());
        Ok(rows.into_iter().map(|row| self.live_record(row, now)).collect())
    }

    /// One jar with measurements computed as of now.
    pub fn get(&self, id: JarId) -> Result<JarRecord> {
        let now = self.clock.now();
        let row = self.fetch(id)?;
        Ok(self.live_record(row, now))
    }

    /// The chart series for one jar, see [`kombucha_core::timeline`].
    pub fn timeline(&self, id: JarId) -> Result<Vec<TimelinePoint>> {
        let now = self.clock.now();
        let record = self.live_record(self.fetch(id)?, now);
        Ok(kombucha_core::timeline(&record, now))
    }

    // ============================================================
    // Mutations
    // ============================================================

    /// Starts tracking a new jar. Its cycle starts now.
    pub fn create(&self, input: CreateJarInput) -> Result<JarId> {
        let now = self.clock.now();
        let parameters = input.into_parameters(now);
        let measurements = estimator::initial(&parameters);
        let name = parameters.name.clone();

        let id = self.storage.insert(JarFields {
            parameters,
            last_refresh_date: Some(now),
            history: codec::EMPTY_HISTORY.to_string(),
            measurements,
        })?;

        tracing::info!("Created jar {} ({})", id, name);
        Ok(id)
    }

    /// Records a manual observation.
    ///
    /// Every call appends a new entry, even when nothing has changed since
    /// the previous one.
    pub fn annotate(&self, id: JarId, notes: impl Into<String>) -> Result<AnnotateOutcome> {
        self.with_jar_lock(id, || self.annotate_locked(id, notes.into()))
    }

    fn annotate_locked(&self, id: JarId, notes: String) -> Result<AnnotateOutcome> {
        let row = self.fetch(id)?;
        let now = self.clock.now();
        let mut history = self.load_history(&row);

        let parameters = &row.fields.parameters;
        let measurements = estimator::estimate(parameters, elapsed_days(parameters.start_date, now));
        let entry = HistoryEntry::observation(now, notes, measurements);
        history.push(entry.clone());

        let changes = JarChanges {
            history: Some(codec::encode(&history)?),
            measurements: Some(measurements),
            ..JarChanges::default()
        };
        if !self.storage.update(id, changes)? {
            return Err(StoreError::NotFound(id));
        }

        tracing::info!("Annotated jar {} ({} history entries)", id, history.len());
        Ok(AnnotateOutcome { measurements, entry })
    }

    /// Ends the current batch and starts a new one in the same jar.
    ///
    /// The persisted measurements are archived as a snapshot dated at the
    /// previous refresh, then the cycle restarts now. Returns the
    /// start-of-cycle measurements.
    pub fn refresh(&self, id: JarId) -> Result<Measurements> {
        self.with_jar_lock(id, || self.refresh_locked(id))
    }

    fn refresh_locked(&self, id: JarId) -> Result<Measurements> {
        let row = self.fetch(id)?;
        let now = self.clock.now();
        let mut history = self.load_history(&row);

        let previous_refresh = row
            .fields
            .last_refresh_date
            .unwrap_or(row.fields.parameters.start_date);
        history.push(HistoryEntry::snapshot(previous_refresh, row.fields.measurements));

        let mut parameters = row.fields.parameters;
        parameters.start_date = now;
        let measurements = estimator::initial(&parameters);

        let changes = JarChanges {
            start_date: Some(now),
            last_refresh_date: Some(now),
            history: Some(codec::encode(&history)?),
            measurements: Some(measurements),
        };
        if !self.storage.update(id, changes)? {
            return Err(StoreError::NotFound(id));
        }

        tracing::info!("Refreshed jar {}, new cycle started at {}", id, now.to_rfc3339());
        Ok(measurements)
    }

    /// Removes a jar and its history for good.
    pub fn delete(&self, id: JarId) -> Result<()> {
        self.with_jar_lock(id, || {
            if !self.storage.delete(id)? {
                return Err(StoreError::NotFound(id));
            }
            tracing::info!("Deleted jar {}", id);
            Ok(())
        })
    }

    /// Creates the demo jar if the store has no jars yet.
    pub fn seed_demo_jar(&self) -> Result<Option<JarId>> {
        if !self.storage.get_all()?.is_empty() {
            return Ok(None);
        }
        self.create(CreateJarInput {
            name: "First jar".to_string(),
            volume: 1.0,
            sugar_spoons: 5,
            tea_type: "black".to_string(),
            additives: "berries".to_string(),
        })
        .map(Some)
    }

    // ============================================================
    // Helpers
    // ============================================================

    fn fetch(&self, id: JarId) -> Result<JarRow> {
        self.storage.get(id)?.ok_or(StoreError::NotFound(id))
    }

    /// Runs `op` inside the jar's critical section.
    ///
    /// The lock entry lives only while some caller holds or waits on it, so
    /// ids that never resolve to a jar leave nothing behind.
    fn with_jar_lock<T>(&self, id: JarId, op: impl FnOnce() -> Result<T>) -> Result<T> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(id).or_default())
        };

        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            op()
        };
        drop(lock);

        // Clones are only taken under the map lock, so a count of one means
        // nobody else is holding or waiting on this jar.
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if locks.get(&id).is_some_and(|entry| Arc::strong_count(entry) == 1) {
            locks.remove(&id);
        }

        result
    }

    /// Decodes the row's history. An unreadable blob is logged and replaced
    /// by an empty history; the next write persists the replacement.
    fn load_history(&self, row: &JarRow) -> Vec<HistoryEntry> {
        match codec::decode(row.id, &row.fields.history) {
            Ok(history) => history,
            Err(e) => {
                tracing::warn!("{}; continuing with an empty history", e);
                Vec::new()
            }
        }
    }

    fn live_record(&self, row: JarRow, now: DateTime<Utc>) -> JarRecord {
        let history = self.load_history(&row);
        let JarFields {
            parameters,
            last_refresh_date,
            ..
        } = row.fields;
        let current_measurements =
            estimator::estimate(&parameters, elapsed_days(parameters.start_date, now));

        JarRecord {
            id: row.id,
            last_refresh_date: last_refresh_date.unwrap_or(parameters.start_date),
            history,
            current_measurements,
            parameters,
        }
    }
}

impl fmt::Debug for JarStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JarStore").finish_non_exhaustive()
    }
}
