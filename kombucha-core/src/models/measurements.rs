use serde::{Deserialize, Serialize};

/// The estimated chemical and biological profile of a jar at one instant.
///
/// Each field is already rounded to its display precision by the estimator.
/// Values are never partially populated: a `Measurements` either comes out
/// of [`crate::estimate`] whole or is read back whole from storage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    /// Organic acids, mg/L (2 decimals).
    pub organic_acids: f64,
    /// Vitamin C, mg/100ml (1 decimal).
    pub vitamin_c: f64,
    /// Vitamin B1, mg/100ml (1 decimal).
    pub vitamin_b1: f64,
    /// Vitamin B2, mg/100ml (1 decimal).
    pub vitamin_b2: f64,
    /// Probiotic count, CFU/ml (whole number).
    pub probiotics: f64,
    /// Remaining sweetness, percent of the starting level (1 decimal).
    pub sweetness_level: f64,
    /// Carbonation, 0..=10 (1 decimal).
    pub carbonation: f64,
    /// Acidity (1 decimal).
    pub ph: f64,
    /// Alcohol by volume, percent (2 decimals).
    pub alcohol: f64,
}
