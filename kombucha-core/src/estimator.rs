//! Fermentation estimator.
//!
//! [`estimate`] maps a jar's parameters and the number of days since the
//! start of its cycle to a full [`Measurements`] profile. The curves are
//! illustrative heuristics, not a validated fermentation model; their shape
//! and constants are fixed.
//!
//! | Quantity        | Curve                                             | Rounding |
//! |-----------------|---------------------------------------------------|----------|
//! | organic_acids   | `S0 * (1 - e^(-0.15 t))`                          | 2 dp     |
//! | vitamin_c       | `5 * tea_factor * ln(t + 1)`                      | 1 dp     |
//! | vitamin_b1      | `min(10, 2 * ln(t + 1))`                          | 1 dp     |
//! | vitamin_b2      | `min(10, 2.5 * ln(t + 1))`                        | 1 dp     |
//! | probiotics      | logistic from 1000 towards 1e6, rate 0.8          | integer  |
//! | sweetness_level | `100 * e^(-0.1 t)`                                | 1 dp     |
//! | carbonation     | `min(10, 0.1 * co2_moles)`                        | 1 dp     |
//! | ph              | `4.5 - 0.05 t + 0.001 t^2`                        | 1 dp     |
//! | alcohol         | `3 * (1 - e^(-0.1 t))`                            | 2 dp     |

use chrono::{DateTime, Utc};

use crate::models::{JarParameters, Measurements};

/// Tea type (compared case-insensitively) that doubles vitamin C production.
/// Every other tea type uses a factor of 1.
pub const GREEN_TEA_TOKEN: &str = "green";

/// Molar mass of glucose, g/mol.
const GLUCOSE_MOLAR_MASS: f64 = 180.16;
/// Molar mass of acetic acid, g/mol.
const ACETIC_ACID_MOLAR_MASS: f64 = 60.05;
/// Moles of acid yielded per mole of sugar.
const ACID_YIELD: f64 = 3.0;
const ACID_RATE: f64 = 0.15;

const VITAMIN_C_BASE: f64 = 5.0;
const VITAMIN_B1_COEFF: f64 = 2.0;
const VITAMIN_B2_COEFF: f64 = 2.5;
const VITAMIN_B_CAP: f64 = 10.0;

/// Probiotic carrying capacity, CFU/ml.
pub const PROBIOTICS_MAX: f64 = 1e6;
/// Probiotic count at the start of a cycle, CFU/ml.
pub const PROBIOTICS_INITIAL: f64 = 1000.0;
const PROBIOTICS_RATE: f64 = 0.8;

const SWEETNESS_INITIAL: f64 = 100.0;
const SWEETNESS_DECAY: f64 = 0.1;

const CO2_PER_SUGAR_MOLE: f64 = 2.0;
const CARBONATION_SCALE: f64 = 0.1;
const CARBONATION_CAP: f64 = 10.0;

const PH_INITIAL: f64 = 4.5;
const PH_LINEAR: f64 = 0.05;
const PH_QUADRATIC: f64 = 0.001;

/// Maximum alcohol by volume, percent.
pub const ALCOHOL_MAX: f64 = 3.0;
const ALCOHOL_RATE: f64 = 0.1;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Fractional days between `start` and `now`.
///
/// A `now` earlier than `start` (clock skew) yields zero.
pub fn elapsed_days(start: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let millis = (now - start).num_milliseconds() as f64;
    (millis / 1000.0 / SECONDS_PER_DAY).max(0.0)
}

/// Estimates the jar's profile `elapsed_days` into its cycle.
///
/// Total and deterministic. Negative or NaN input is treated as zero.
pub fn estimate(parameters: &JarParameters, elapsed_days: f64) -> Measurements {
    let t = clamp_days(elapsed_days);
    let sugar_g = parameters.sugar_grams();
    let tea_factor = tea_factor(&parameters.tea_type);

    Measurements {
        organic_acids: round_to(curves::organic_acids(sugar_g, t), 2),
        vitamin_c: round_to(curves::vitamin_c(tea_factor, t), 1),
        vitamin_b1: round_to(curves::vitamin_b1(t), 1),
        vitamin_b2: round_to(curves::vitamin_b2(t), 1),
        probiotics: curves::probiotics(t).round(),
        sweetness_level: round_to(curves::sweetness(t), 1),
        carbonation: round_to(curves::carbonation(sugar_g), 1),
        ph: round_to(curves::ph(t), 1),
        alcohol: round_to(curves::alcohol(t), 2),
    }
}

/// Estimate at the start of a cycle.
pub fn initial(parameters: &JarParameters) -> Measurements {
    estimate(parameters, 0.0)
}

/// 2.0 for green tea, 1.0 for anything else.
pub fn tea_factor(tea_type: &str) -> f64 {
    if tea_type.to_lowercase() == GREEN_TEA_TOKEN {
        2.0
    } else {
        1.0
    }
}

fn clamp_days(days: f64) -> f64 {
    if days.is_nan() {
        0.0
    } else {
        days.max(0.0)
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// The unrounded curves behind [`estimate`].
pub mod curves {
    use super::*;

    /// Organic-acid yield of `sugar_g` grams of sugar converted completely, mg/L.
    pub fn acid_potential(sugar_g: f64) -> f64 {
        (sugar_g / GLUCOSE_MOLAR_MASS) * ACID_YIELD * ACETIC_ACID_MOLAR_MASS * 1000.0
    }

    pub fn organic_acids(sugar_g: f64, t: f64) -> f64 {
        acid_potential(sugar_g) * (1.0 - (-ACID_RATE * t).exp())
    }

    pub fn vitamin_c(tea_factor: f64, t: f64) -> f64 {
        VITAMIN_C_BASE * tea_factor * (t + 1.0).ln()
    }

    pub fn vitamin_b1(t: f64) -> f64 {
        (VITAMIN_B1_COEFF * (t + 1.0).ln()).min(VITAMIN_B_CAP)
    }

    pub fn vitamin_b2(t: f64) -> f64 {
        (VITAMIN_B2_COEFF * (t + 1.0).ln()).min(VITAMIN_B_CAP)
    }

    /// Logistic growth from [`PROBIOTICS_INITIAL`] towards [`PROBIOTICS_MAX`].
    ///
    /// The spread is divided by the starting count so the curve is exactly
    /// [`PROBIOTICS_INITIAL`] at `t = 0`. The undivided form
    /// `max / (1 + (max - initial) e^(-rt))` starts near 1 and reads about
    /// 2975 at day 10 where this one reads 748992, so probiotics values
    /// cached by servers that used it will not match the live estimate.
    pub fn probiotics(t: f64) -> f64 {
        let spread = (PROBIOTICS_MAX - PROBIOTICS_INITIAL) / PROBIOTICS_INITIAL;
        PROBIOTICS_MAX / (1.0 + spread * (-PROBIOTICS_RATE * t).exp())
    }

    pub fn sweetness(t: f64) -> f64 {
        SWEETNESS_INITIAL * (-SWEETNESS_DECAY * t).exp()
    }

    /// Carbonation only depends on the sugar charge, not on time.
    pub fn carbonation(sugar_g: f64) -> f64 {
        let co2_moles = (sugar_g / GLUCOSE_MOLAR_MASS) * CO2_PER_SUGAR_MOLE;
        (co2_moles * CARBONATION_SCALE).min(CARBONATION_CAP)
    }

    pub fn ph(t: f64) -> f64 {
        PH_INITIAL - PH_LINEAR * t + PH_QUADRATIC * t * t
    }

    pub fn alcohol(t: f64) -> f64 {
        ALCOHOL_MAX * (1.0 - (-ALCOHOL_RATE * t).exp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn jar(sugar_spoons: i64, tea_type: &str) -> JarParameters {
        JarParameters {
            name: "Test jar".to_string(),
            volume: 1.0,
            sugar_spoons,
            tea_type: tea_type.to_string(),
            additives: String::new(),
            start_date: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    fn sample_days() -> impl Iterator<Item = f64> {
        (0..=600).map(|i| i as f64 * 0.25)
    }

    #[test]
    fn start_of_cycle_is_exact_for_any_jar() {
        for (spoons, tea) in [(0, "black"), (5, "green"), (40, "GREEN"), (12, "oolong")] {
            let m = estimate(&jar(spoons, tea), 0.0);
            assert_eq!(m.organic_acids, 0.0);
            assert_eq!(m.vitamin_c, 0.0);
            assert_eq!(m.vitamin_b1, 0.0);
            assert_eq!(m.vitamin_b2, 0.0);
            assert_eq!(m.probiotics, 1000.0);
            assert_eq!(m.sweetness_level, 100.0);
            assert_eq!(m.ph, 4.5);
            assert_eq!(m.alcohol, 0.0);
        }
    }

    #[test]
    fn carbonation_is_zero_at_start_for_small_sugar_charges() {
        assert_eq!(estimate(&jar(5, "black"), 0.0).carbonation, 0.0);
        assert_eq!(estimate(&jar(0, "black"), 0.0).carbonation, 0.0);
    }

    #[test]
    fn probiotics_start_from_the_initial_count() {
        let undivided = |t: f64| {
            PROBIOTICS_MAX / (1.0 + (PROBIOTICS_MAX - PROBIOTICS_INITIAL) * (-PROBIOTICS_RATE * t).exp())
        };
        assert_eq!(curves::probiotics(0.0), PROBIOTICS_INITIAL);
        assert!(undivided(0.0) < 2.0);
        assert_eq!(undivided(10.0).round(), 2975.0);
        assert_eq!(curves::probiotics(10.0).round(), 748992.0);
    }

    #[test]
    fn ten_days_of_black_tea_with_five_spoons() {
        let m = estimate(&jar(5, "black"), 10.0);
        assert_eq!(m.organic_acids, 15536.53);
        assert_eq!(m.vitamin_c, 12.0);
        assert_eq!(m.vitamin_b1, 4.8);
        assert_eq!(m.vitamin_b2, 6.0);
        assert_eq!(m.probiotics, 748992.0);
        assert_eq!(m.sweetness_level, 36.8);
        assert_eq!(m.carbonation, 0.0);
        assert_eq!(m.ph, 4.1);
        assert_eq!(m.alcohol, 1.9);
    }

    #[test]
    fn green_tea_doubles_vitamin_c_regardless_of_case() {
        let black = estimate(&jar(5, "black"), 10.0);
        let green = estimate(&jar(5, "Green"), 10.0);
        assert_eq!(green.vitamin_c, 24.0);
        assert!(green.vitamin_c > black.vitamin_c);
        assert_eq!(green.organic_acids, black.organic_acids);
        assert_eq!(tea_factor("GREEN"), 2.0);
        assert_eq!(tea_factor("green tea"), 1.0);
        assert_eq!(tea_factor("herbal"), 1.0);
    }

    #[test]
    fn negative_elapsed_time_is_treated_as_zero() {
        let parameters = jar(5, "black");
        assert_eq!(estimate(&parameters, -3.5), estimate(&parameters, 0.0));
        assert_eq!(estimate(&parameters, f64::NAN), estimate(&parameters, 0.0));
    }

    #[test]
    fn elapsed_days_is_fractional_and_never_negative() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(elapsed_days(start, start + Duration::hours(36)), 1.5);
        assert_eq!(elapsed_days(start, start - Duration::hours(2)), 0.0);
    }

    #[test]
    fn sweetness_decays_within_bounds() {
        let mut previous = f64::INFINITY;
        for t in sample_days() {
            let s = curves::sweetness(t);
            assert!(s > 0.0 && s <= 100.0, "sweetness {s} out of range at t={t}");
            assert!(s <= previous);
            previous = s;
        }
    }

    #[test]
    fn probiotics_grow_towards_but_never_reach_capacity() {
        // Past ~50 days the gap to capacity drops below f64 resolution.
        let mut previous = 0.0;
        for t in sample_days().take_while(|t| *t <= 40.0) {
            let p = curves::probiotics(t);
            assert!(p >= PROBIOTICS_INITIAL && p < PROBIOTICS_MAX, "probiotics {p} at t={t}");
            assert!(p >= previous);
            previous = p;
        }
    }

    #[test]
    fn alcohol_rises_below_its_ceiling() {
        let mut previous = 0.0;
        for t in sample_days() {
            let a = curves::alcohol(t);
            assert!((0.0..ALCOHOL_MAX).contains(&a), "alcohol {a} at t={t}");
            assert!(a >= previous);
            previous = a;
        }
    }

    #[test]
    fn vitamin_b1_never_exceeds_b2() {
        let parameters = jar(5, "black");
        for t in sample_days() {
            assert!(curves::vitamin_b1(t) <= curves::vitamin_b2(t));
            let m = estimate(&parameters, t);
            assert!(m.vitamin_b1 <= m.vitamin_b2);
        }
    }

    #[test]
    fn vitamin_b_curves_are_capped() {
        let m = estimate(&jar(5, "black"), 10_000.0);
        assert_eq!(m.vitamin_b1, 10.0);
        assert_eq!(m.vitamin_b2, 10.0);
    }

    #[test]
    fn carbonation_is_capped_at_ten() {
        // 20_000 spoons is 80 kg of sugar, well past the cap.
        assert_eq!(estimate(&jar(20_000, "black"), 1.0).carbonation, 10.0);
        assert_eq!(estimate(&jar(1000, "black"), 1.0).carbonation, 4.4);
    }
}
