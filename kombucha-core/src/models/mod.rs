//! Domain models for the kombucha tracker.
//!
//! # Core Concepts
//!
//! - [`JarParameters`]: What the user put in the jar, plus the start of the
//!   current fermentation cycle.
//! - [`JarRecord`]: One tracked jar with its history log and the cached
//!   result of the last persisted estimate.
//! - [`HistoryEntry`]: Append-only log entry, either a manual observation
//!   (has notes) or the snapshot written when a batch is refreshed (no notes).
//! - [`Measurements`]: The nine estimated quantities, always produced together.

mod history;
mod jar;
mod measurements;

pub use history::*;
pub use jar::*;
pub use measurements::*;
