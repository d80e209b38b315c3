mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Context;
use chrono::{DateTime, Utc};
use kombucha_core::estimator;
use kombucha_core::{JarId, JarParameters, Measurements};
use rusqlite::{Connection, Row, ToSql};

use crate::error::{Result, StoreError};
use crate::store::{JarChanges, JarFields, JarRow, Storage};

const JAR_COLUMNS: &str = "id, name, volume, sugar_spoons, tea_type, additives, start_date, last_refresh_date, updates,
     organic_acids, vitamin_c, vitamin_b1, vitamin_b2, probiotics, sweetness_level, carbonation, ph, alcohol";

/// SQLite-backed jar [`Storage`].
///
/// Uses the legacy `kombucha_jars` table layout, so an
/// existing `kombucha.db` can be opened directly.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let conn = Connection::open(&path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        tracing::info!("Opened jar database at {}", path.display());
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> anyhow::Result<Self> {
        Self::open(default_path()?)
    }

    pub fn open_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> anyhow::Result<()> {
        let conn = self.conn()?;
        let applied = schema::run_migrations(&conn)?;
        if !applied.is_empty() {
            tracing::info!("Jar database migrated to {}", applied.join(", "));
        }
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::StorageUnavailable("database lock poisoned".into()))
    }
}

/// `<platform data dir>/kombucha/kombucha.db`.
fn default_path() -> anyhow::Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "kombucha")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(dirs.data_dir().join("kombucha.db"))
}

impl Storage for Database {
    fn get(&self, id: JarId) -> Result<Option<JarRow>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {JAR_COLUMNS} FROM kombucha_jars WHERE id = ?"
        ))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            Ok(Some(read_jar(row)?))
        } else {
            Ok(None)
        }
    }

    fn get_all(&self) -> Result<Vec<JarRow>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {JAR_COLUMNS} FROM kombucha_jars ORDER BY id"
        ))?;

        let jars = stmt
            .query_map([], |row| read_jar(row))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(jars)
    }

    fn insert(&self, fields: JarFields) -> Result<JarId> {
        let conn = self.conn()?;
        let p = &fields.parameters;
        let m = &fields.measurements;

        conn.execute(
            "INSERT INTO kombucha_jars (
                name, volume, sugar_spoons, tea_type, additives,
                start_date, last_refresh_date, updates,
                organic_acids, vitamin_c, vitamin_b1, vitamin_b2,
                probiotics, sweetness_level, carbonation, ph, alcohol
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            rusqlite::params![
                &p.name,
                p.volume,
                p.sugar_spoons,
                &p.tea_type,
                &p.additives,
                p.start_date.to_rfc3339(),
                fields.last_refresh_date.map(|d| d.to_rfc3339()),
                &fields.history,
                m.organic_acids,
                m.vitamin_c,
                m.vitamin_b1,
                m.vitamin_b2,
                m.probiotics,
                m.sweetness_level,
                m.carbonation,
                m.ph,
                m.alcohol,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    fn update(&self, id: JarId, changes: JarChanges) -> Result<bool> {
        let conn = self.conn()?;

        if changes.is_empty() {
            let exists: i64 = conn.query_row(
                "SELECT COUNT(*) FROM kombucha_jars WHERE id = ?",
                [id],
                |row| row.get(0),
            )?;
            return Ok(exists > 0);
        }

        let mut updates = Vec::new();
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(start_date) = changes.start_date {
            updates.push("start_date = ?");
            params.push(Box::new(start_date.to_rfc3339()));
        }
        if let Some(last_refresh_date) = changes.last_refresh_date {
            updates.push("last_refresh_date = ?");
            params.push(Box::new(last_refresh_date.to_rfc3339()));
        }
        if let Some(history) = changes.history {
            updates.push("updates = ?");
            params.push(Box::new(history));
        }
        if let Some(m) = changes.measurements {
            updates.extend([
                "organic_acids = ?",
                "vitamin_c = ?",
                "vitamin_b1 = ?",
                "vitamin_b2 = ?",
                "probiotics = ?",
                "sweetness_level = ?",
                "carbonation = ?",
                "ph = ?",
                "alcohol = ?",
            ]);
            params.extend(
                [
                    m.organic_acids,
                    m.vitamin_c,
                    m.vitamin_b1,
                    m.vitamin_b2,
                    m.probiotics,
                    m.sweetness_level,
                    m.carbonation,
                    m.ph,
                    m.alcohol,
                ]
                .into_iter()
                .map(|v| Box::new(v) as Box<dyn ToSql>),
            );
        }

        params.push(Box::new(id));

        let sql = format!("UPDATE kombucha_jars SET {} WHERE id = ?", updates.join(", "));
        let params_ref: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let rows = conn.execute(&sql, params_ref.as_slice())?;

        Ok(rows > 0)
    }

    fn delete(&self, id: JarId) -> Result<bool> {
        let conn = self.conn()?;
        let rows = conn.execute("DELETE FROM kombucha_jars WHERE id = ?", [id])?;
        Ok(rows > 0)
    }
}

fn read_jar(row: &Row<'_>) -> rusqlite::Result<JarRow> {
    let id: JarId = row.get(0)?;
    let parameters = JarParameters {
        name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        volume: row.get::<_, Option<f64>>(2)?.unwrap_or_default(),
        sugar_spoons: row.get::<_, Option<i64>>(3)?.unwrap_or_default(),
        tea_type: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        additives: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        start_date: parse_datetime(id, row.get::<_, Option<String>>(6)?),
    };

    // NULL cache columns come from rows written before the cache existed;
    // they read as the start-of-cycle estimate.
    let initial = estimator::initial(&parameters);
    let cached = |column: usize, fallback: f64| -> rusqlite::Result<f64> {
        Ok(row.get::<_, Option<f64>>(column)?.unwrap_or(fallback))
    };
    let measurements = Measurements {
        organic_acids: cached(9, initial.organic_acids)?,
        vitamin_c: cached(10, initial.vitamin_c)?,
        vitamin_b1: cached(11, initial.vitamin_b1)?,
        vitamin_b2: cached(12, initial.vitamin_b2)?,
        probiotics: cached(13, initial.probiotics)?,
        sweetness_level: cached(14, initial.sweetness_level)?,
        carbonation: cached(15, initial.carbonation)?,
        ph: cached(16, initial.ph)?,
        alcohol: cached(17, initial.alcohol)?,
    };

    Ok(JarRow {
        id,
        fields: JarFields {
            parameters,
            last_refresh_date: row
                .get::<_, Option<String>>(7)?
                .map(|s| parse_datetime(id, Some(s))),
            history: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
            measurements,
        },
    })
}

fn parse_datetime(id: JarId, s: Option<String>) -> DateTime<Utc> {
    let parsed = s
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));

    parsed.unwrap_or_else(|| {
        tracing::warn!("Jar {} has an unreadable date {:?}, using now", id, s);
        Utc::now()
    })
}
