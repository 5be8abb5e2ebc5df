//! Key metrics over a filtered view
//!
//! This module computes the four headline figures shown above the charts
//! and the intermediate values of their animated counters.

use std::fmt;

use arrow::array::Array;
use log::debug;
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::models::HospitalTable;

/// Gender value counted in `male_count`
pub const MALE: &str = "Male";
/// Gender value counted in `female_count`
pub const FEMALE: &str = "Female";

/// Aggregate figures for one filtered view
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    /// Number of distinct patient identifiers
    pub total_patients: usize,
    /// Mean age rounded to one decimal; `None` when no ages are available
    pub avg_age: Option<f64>,
    /// Rows whose gender is exactly "Male"
    pub male_count: usize,
    /// Rows whose gender is exactly "Female"
    pub female_count: usize,
    /// Rows with any other (or no) gender value; excluded from both counts above
    pub other_count: usize,
    /// Number of rows summarised
    pub row_count: usize,
}

/// Summarise a view
///
/// Repeat admissions of one patient count once in `total_patients` but once
/// per row in the gender counts.
#[must_use]
pub fn summarize(view: &HospitalTable) -> MetricsSnapshot {
    let total_patients = view
        .patient_ids()
        .iter()
        .flatten()
        .collect::<FxHashSet<_>>()
        .len();

    let ages = view.ages();
    let known_ages = ages.len() - ages.null_count();
    let avg_age = (known_ages > 0).then(|| {
        let sum: i64 = ages.iter().flatten().sum();
        round_one_decimal(sum as f64 / known_ages as f64)
    });

    let mut male_count = 0;
    let mut female_count = 0;
    for gender in view.genders().iter() {
        match gender {
            Some(MALE) => male_count += 1,
            Some(FEMALE) => female_count += 1,
            _ => {}
        }
    }
    let row_count = view.num_rows();

    let snapshot = MetricsSnapshot {
        total_patients,
        avg_age,
        male_count,
        female_count,
        other_count: row_count - male_count - female_count,
        row_count,
    };
    debug!("Computed metrics: {snapshot:?}");
    snapshot
}

/// Round to one decimal, halves to even
fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

impl MetricsSnapshot {
    /// Whether the snapshot summarises no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Counter values at a fraction of the final figures
    ///
    /// Counts are truncated and the mean is rounded to one decimal, so the
    /// frame at `1.0` equals the snapshot itself.
    #[must_use]
    pub fn at_fraction(&self, fraction: f64) -> CounterFrame {
        let fraction = fraction.clamp(0.0, 1.0);
        let scale = |count: usize| (count as f64 * fraction).floor() as usize;
        CounterFrame {
            fraction,
            total_patients: scale(self.total_patients),
            avg_age: self.avg_age.map(|age| round_one_decimal(age * fraction)),
            male_count: scale(self.male_count),
            female_count: scale(self.female_count),
        }
    }

    /// Evenly spaced counter frames ending at the final values
    ///
    /// Frame `k` (1-based) shows the figures at `k / steps`; zero steps
    /// produce no frames.
    #[must_use]
    pub fn counter_frames(&self, steps: usize) -> Vec<CounterFrame> {
        (1..=steps)
            .map(|k| self.at_fraction(k as f64 / steps as f64))
            .collect()
    }
}

impl fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Key Metrics:")?;
        writeln!(f, "  Total Patients: {}", self.total_patients)?;
        match self.avg_age {
            Some(age) => writeln!(f, "  Avg Age: {age:.1}")?,
            None => writeln!(f, "  Avg Age: no data")?,
        }
        writeln!(f, "  Male Patients: {}", self.male_count)?;
        writeln!(f, "  Female Patients: {}", self.female_count)?;
        if self.other_count > 0 {
            writeln!(f, "  Other/Unrecorded Gender: {}", self.other_count)?;
        }
        Ok(())
    }
}

/// Intermediate values of the animated metric counters
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CounterFrame {
    /// Progress of the animation in `[0, 1]`
    pub fraction: f64,
    /// Displayed patient count
    pub total_patients: usize,
    /// Displayed mean age
    pub avg_age: Option<f64>,
    /// Displayed male count
    pub male_count: usize,
    /// Displayed female count
    pub female_count: usize,
}
