//! Age trend by admission date.

use chrono::NaiveDateTime;
use itertools::Itertools;
use serde::Serialize;

use super::{group_in_order, rows};
use crate::models::HospitalTable;

/// One marker of a line series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LinePoint {
    /// X: admission date
    pub admission_date: NaiveDateTime,
    /// Y: age
    pub age: i64,
}

/// Points of one department, ordered by admission date
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineSeries {
    /// Department the series belongs to
    pub department: String,
    /// Points sorted ascending by date; equal dates keep row order
    pub points: Vec<LinePoint>,
}

/// One series per department, in order of first appearance
///
/// Rows without a department, date or age cannot be plotted and are left out.
#[must_use]
pub fn line_series(view: &HospitalTable) -> Vec<LineSeries> {
    let plottable = rows(view).filter_map(|row| {
        Some((
            row.department?,
            LinePoint {
                admission_date: row.admission_date?,
                age: row.age?,
            },
        ))
    });

    group_in_order(plottable)
        .into_iter()
        .map(|(department, points)| LineSeries {
            department: department.to_string(),
            points: points
                .into_iter()
                .sorted_by_key(|point| point.admission_date)
                .collect(),
        })
        .collect()
}
