//! Core library for the kombucha tracker.
//!
//! Holds the jar domain types and the fermentation [`estimator`], a pure
//! function from jar parameters and elapsed time to a [`Measurements`]
//! profile. Nothing in this crate performs I/O; persistence and transport
//! live in the `kombucha-tracker` crate.

pub mod estimator;
pub mod models;
pub mod timeline;

pub use estimator::{elapsed_days, estimate, GREEN_TEA_TOKEN};
pub use models::*;
pub use timeline::{timeline, TimelinePoint};
