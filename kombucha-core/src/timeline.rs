//! The time series a chart draws for one jar.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::estimator::{self, elapsed_days};
use crate::models::{JarRecord, Measurements};

/// One point of a jar's chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub measurements: Measurements,
}

/// Builds the chart series for `record` as of `now`.
///
/// The series starts with the start-of-cycle estimate at `start_date`,
/// continues with every history entry in stored order (so dates may go
/// backwards after a refresh snapshot), and ends with the live estimate
/// at `now`.
pub fn timeline(record: &JarRecord, now: DateTime<Utc>) -> Vec<TimelinePoint> {
    let parameters = &record.parameters;
    let mut points = Vec::with_capacity(record.history.len() + 2);

    points.push(TimelinePoint {
        date: parameters.start_date,
        notes: None,
        measurements: estimator::initial(parameters),
    });

    points.extend(record.history.iter().map(|entry| TimelinePoint {
        date: entry.date,
        notes: entry.notes.clone(),
        measurements: entry.measurements,
    }));

    points.push(TimelinePoint {
        date: now,
        notes: None,
        measurements: estimator::estimate(parameters, elapsed_days(parameters.start_date, now)),
    });

    points
}
