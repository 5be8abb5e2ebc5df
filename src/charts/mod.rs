//! Chart data projection
//!
//! Each projection turns a filtered view into the tuples one chart panel
//! needs. Projections never fail: an empty view yields empty chart data
//! (or no pie chart at all).

pub mod line;
pub mod pie;
pub mod scatter;
pub mod sunburst;

use std::hash::Hash;

use arrow::array::Array;
use chrono::NaiveDateTime;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::models::HospitalTable;

pub use line::{LinePoint, LineSeries, line_series};
pub use pie::{PIE_HOLE, PieChart, PieSlice, SLICE_PULL, pie_chart};
pub use scatter::{AnimatedScatter, ScatterPoint, ScatterSeries, animated_scatter};
pub use sunburst::{Sunburst, SunburstBranch, SunburstLeaf, SunburstNode, sunburst};

/// Data for every chart panel of the dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSet {
    /// Age trend by admission date, one series per department
    pub line: Vec<LineSeries>,
    /// Admissions over time, animated by admission date
    pub scatter: AnimatedScatter,
    /// Summed age by department; `None` when there is nothing to show
    pub pie: Option<PieChart>,
    /// Department → gender breakdown
    pub sunburst: Sunburst,
}

/// Project a view into all chart data sets
#[must_use]
pub fn project(view: &HospitalTable) -> ChartSet {
    ChartSet {
        line: line_series(view),
        scatter: animated_scatter(view),
        pie: pie_chart(view),
        sunburst: sunburst(view),
    }
}

/// Borrowed view of one row's required fields
#[derive(Debug, Clone, Copy)]
pub(crate) struct RowRef<'a> {
    pub patient_id: Option<&'a str>,
    pub age: Option<i64>,
    pub gender: Option<&'a str>,
    pub department: Option<&'a str>,
    pub admission_date: Option<NaiveDateTime>,
}

/// Iterate the rows of a table in order
pub(crate) fn rows(table: &HospitalTable) -> impl Iterator<Item = RowRef<'_>> {
    let ids = table.patient_ids();
    let ages = table.ages();
    let genders = table.genders();
    let departments = table.departments();

    (0..table.num_rows()).map(move |row| RowRef {
        patient_id: (!ids.is_null(row)).then(|| ids.value(row)),
        age: (!ages.is_null(row)).then(|| ages.value(row)),
        gender: (!genders.is_null(row)).then(|| genders.value(row)),
        department: (!departments.is_null(row)).then(|| departments.value(row)),
        admission_date: table.admission_date(row),
    })
}

/// Group items by key, keeping groups in order of first appearance and
/// items in input order within each group
pub(crate) fn group_in_order<K, T, I>(items: I) -> Vec<(K, Vec<T>)>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = (K, T)>,
{
    let mut index: FxHashMap<K, usize> = FxHashMap::default();
    let mut groups: Vec<(K, Vec<T>)> = Vec::new();

    for (key, item) in items {
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push((key, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(item);
    }
    groups
}
