//! Patient distribution by department.

use serde::Serialize;

use super::{group_in_order, rows};
use crate::models::HospitalTable;

/// Size of the hole in the middle of the donut
pub const PIE_HOLE: f64 = 0.4;
/// Offset by which every slice is pulled out of the donut
pub const SLICE_PULL: f64 = 0.05;

/// One department slice
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    /// Department name
    pub department: String,
    /// Summed age of the department's rows
    pub value: i64,
    /// Fraction of the total value, 0 when the total is 0
    pub share: f64,
    /// Pull-out offset of the slice
    pub pull: f64,
}

/// Donut chart of summed age per department
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChart {
    /// Relative size of the hole
    pub hole: f64,
    /// Slices in order of first appearance
    pub slices: Vec<PieSlice>,
}

impl PieChart {
    /// Sum of all slice values
    #[must_use]
    pub fn total(&self) -> i64 {
        self.slices.iter().map(|slice| slice.value).sum()
    }
}

/// Build the pie chart, or `None` when the view has no departments
#[must_use]
pub fn pie_chart(view: &HospitalTable) -> Option<PieChart> {
    let groups = group_in_order(
        rows(view).filter_map(|row| Some((row.department?, row.age.unwrap_or_default()))),
    );
    if groups.is_empty() {
        return None;
    }

    let sums: Vec<(&str, i64)> = groups
        .into_iter()
        .map(|(department, ages)| (department, ages.into_iter().sum()))
        .collect();
    let total: i64 = sums.iter().map(|(_, value)| value).sum();

    let slices = sums
        .into_iter()
        .map(|(department, value)| PieSlice {
            department: department.to_string(),
            value,
            share: if total > 0 {
                value as f64 / total as f64
            } else {
                0.0
            },
            pull: SLICE_PULL,
        })
        .collect();

    Some(PieChart {
        hole: PIE_HOLE,
        slices,
    })
}
