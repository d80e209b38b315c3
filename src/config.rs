//! Server configuration loaded from environment variables.

use std::path::PathBuf;

use anyhow::Context;

use crate::db::Database;

/// Database path that selects an in-memory SQLite database.
pub const MEMORY_DATABASE: &str = ":memory:";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3002;

#[derive(Clone, Debug, PartialEq)]
pub struct ServerConfig {
    /// Address to bind (from KOMBUCHA_HOST)
    pub host: String,
    /// HTTP port (from KOMBUCHA_PORT, falling back to PORT)
    pub port: u16,
    /// SQLite file (from KOMBUCHA_DB_PATH). `None` uses the platform data directory.
    pub database_path: Option<PathBuf>,
    /// Allowed CORS origins (from KOMBUCHA_CORS_ORIGINS, comma-separated).
    /// `None` allows any origin.
    pub cors_origins: Option<Vec<String>>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_path: None,
            cors_origins: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let host = lookup("KOMBUCHA_HOST").unwrap_or(defaults.host);

        let port = match lookup("KOMBUCHA_PORT").or_else(|| lookup("PORT")) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("Invalid port: {raw}"))?,
            None => defaults.port,
        };

        let database_path = lookup("KOMBUCHA_DB_PATH")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let cors_origins = lookup("KOMBUCHA_CORS_ORIGINS").map(|s| {
            s.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        Ok(Self {
            host,
            port,
            database_path,
            cors_origins,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Opens and migrates the configured database.
    pub fn open_database(&self) -> anyhow::Result<Database> {
        let db = match &self.database_path {
            Some(path) if path.as_os_str() == MEMORY_DATABASE => Database::open_memory()?,
            Some(path) => Database::open(path.clone())?,
            None => Database::open_default()?,
        };
        db.migrate().context("Failed to migrate jar database")?;
        Ok(db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_address(), "127.0.0.1:3002");
    }

    #[test]
    fn kombucha_port_wins_over_port() {
        let config =
            ServerConfig::from_lookup(lookup(&[("PORT", "8080"), ("KOMBUCHA_PORT", "9000")]))
                .unwrap();
        assert_eq!(config.port, 9000);

        let config = ServerConfig::from_lookup(lookup(&[("PORT", "8080")])).unwrap();
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn rejects_unparseable_port() {
        assert!(ServerConfig::from_lookup(lookup(&[("KOMBUCHA_PORT", "lots")])).is_err());
    }

    #[test]
    fn splits_cors_origins() {
        let config = ServerConfig::from_lookup(lookup(&[(
            "KOMBUCHA_CORS_ORIGINS",
            "http://localhost:3000, https://example.github.io,",
        )]))
        .unwrap();
        assert_eq!(
            config.cors_origins,
            Some(vec![
                "http://localhost:3000".to_string(),
                "https://example.github.io".to_string()
            ])
        );
    }

    #[test]
    fn memory_database_path_opens_without_touching_disk() {
        let config =
            ServerConfig::from_lookup(lookup(&[("KOMBUCHA_DB_PATH", MEMORY_DATABASE)])).unwrap();
        assert!(config.open_database().is_ok());
    }
}
