//! Kombucha jar tracking server.
//!
//! The [`store::JarStore`] owns jar records and their history log and runs
//! the fermentation estimator from `kombucha-core` on every read and
//! mutation. [`db::Database`] persists records in SQLite and [`api`]
//! exposes the store over HTTP.

pub mod api;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod store;

pub use kombucha_core::models;
