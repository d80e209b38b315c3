//! In-process [`Storage`] backed by a map. Nothing survives the process.

use std::collections::BTreeMap;
use std::sync::Mutex;

use kombucha_core::JarId;

use super::storage::{JarChanges, JarFields, JarRow, Storage};
use crate::error::{Result, StoreError};

#[derive(Debug, Default)]
pub struct MemoryStorage {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    last_id: JarId,
    rows: BTreeMap<JarId, JarFields>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| StoreError::StorageUnavailable("memory storage lock poisoned".into()))
    }
}

impl Storage for MemoryStorage {
    fn get(&self, id: JarId) -> Result<Option<JarRow>> {
        let inner = self.lock()?;
        Ok(inner.rows.get(&id).map(|fields| JarRow {
            id,
            fields: fields.clone(),
        }))
    }

    fn get_all(&self) -> Result<Vec<JarRow>> {
        let inner = self.lock()?;
        Ok(inner
            .rows
            .iter()
            .map(|(id, fields)| JarRow {
                id: *id,
                fields: fields.clone(),
            })
            .collect())
    }

    fn insert(&self, fields: JarFields) -> Result<JarId> {
        let mut inner = self.lock()?;
        inner.last_id += 1;
        let id = inner.last_id;
        inner.rows.insert(id, fields);
        Ok(id)
    }

    fn update(&self, id: JarId, changes: JarChanges) -> Result<bool> {
        let mut inner = self.lock()?;
        match inner.rows.get_mut(&id) {
            Some(fields) => {
                changes.apply_to(fields);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete(&self, id: JarId) -> Result<bool> {
        let mut inner = self.lock()?;
        Ok(inner.rows.remove(&id).is_some())
    }
}
