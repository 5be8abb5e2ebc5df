//! Department/gender selection and the filtered view it produces.

use std::collections::BTreeSet;
use std::ops::Deref;
use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};
use crate::filter::core::{AndFilter, BatchFilter, ValueSetFilter};
use crate::models::HospitalTable;
use crate::schema::{DEPARTMENT, GENDER};

/// The departments and genders currently selected in the dashboard
///
/// An empty set in either dimension selects nothing; there is no implicit
/// "select all".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    /// Selected departments (exact, case-sensitive)
    pub departments: BTreeSet<String>,
    /// Selected genders (exact, case-sensitive)
    pub genders: BTreeSet<String>,
}

impl FilterSelection {
    /// Create a selection from any iterables of strings
    pub fn new<D, G>(departments: D, genders: G) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        G: IntoIterator,
        G::Item: Into<String>,
    {
        Self {
            departments: departments.into_iter().map(Into::into).collect(),
            genders: genders.into_iter().map(Into::into).collect(),
        }
    }

    /// Select every department and gender present in the table
    #[must_use]
    pub fn all(table: &HospitalTable) -> Self {
        Self::new(table.distinct_departments(), table.distinct_genders())
    }

    /// Whether either dimension is empty, which makes every view empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.departments.is_empty() || self.genders.is_empty()
    }

    /// Check that every selected value occurs in the table
    pub fn validate(&self, table: &HospitalTable) -> Result<()> {
        let departments = table.distinct_departments();
        let genders = table.distinct_genders();

        let unknown = |selected: &BTreeSet<String>, present: &[String]| -> Vec<String> {
            selected
                .iter()
                .filter(|value| !present.contains(*value))
                .cloned()
                .collect()
        };

        let unknown_departments = unknown(&self.departments, &departments);
        if !unknown_departments.is_empty() {
            return Err(DashboardError::filter(format!(
                "Unknown department(s): {}",
                unknown_departments.join(", ")
            )));
        }
        let unknown_genders = unknown(&self.genders, &genders);
        if !unknown_genders.is_empty() {
            return Err(DashboardError::filter(format!(
                "Unknown gender(s): {}",
                unknown_genders.join(", ")
            )));
        }
        Ok(())
    }

    /// Drop selected values that do not occur in the table
    #[must_use]
    pub fn restricted_to(&self, table: &HospitalTable) -> Self {
        let departments = table.distinct_departments();
        let genders = table.distinct_genders();
        Self {
            departments: self
                .departments
                .iter()
                .filter(|d| departments.contains(*d))
                .cloned()
                .collect(),
            genders: self
                .genders
                .iter()
                .filter(|g| genders.contains(*g))
                .cloned()
                .collect(),
        }
    }

    /// Batch filter equivalent to this selection
    #[must_use]
    pub fn to_filter(&self) -> AndFilter {
        let departments: Arc<dyn BatchFilter + Send + Sync> =
            Arc::new(ValueSetFilter::new(DEPARTMENT, self.departments.clone()));
        let genders: Arc<dyn BatchFilter + Send + Sync> =
            Arc::new(ValueSetFilter::new(GENDER, self.genders.clone()));
        AndFilter::new(vec![departments, genders])
    }
}

/// Rows of a table matching a selection, in original order
#[derive(Debug, Clone)]
pub struct FilteredView {
    rows: HospitalTable,
    source_rows: usize,
}

impl FilteredView {
    /// Number of rows in the table the view was derived from
    #[must_use]
    pub fn source_rows(&self) -> usize {
        self.source_rows
    }

    /// The matching rows
    #[must_use]
    pub fn table(&self) -> &HospitalTable {
        &self.rows
    }
}

impl Deref for FilteredView {
    type Target = HospitalTable;

    fn deref(&self) -> &Self::Target {
        &self.rows
    }
}

/// Apply a selection to a table
///
/// Keeps row `r` iff `r.department ∈ selection.departments` and
/// `r.gender ∈ selection.genders`.
pub fn apply(table: &HospitalTable, selection: &FilterSelection) -> Result<FilteredView> {
    let filtered = selection.to_filter().filter(table.batch())?;
    debug!(
        "Selection kept {} of {} rows ({} department(s), {} gender(s))",
        filtered.num_rows(),
        table.num_rows(),
        selection.departments.len(),
        selection.genders.len()
    );
    Ok(FilteredView {
        rows: HospitalTable::from_conformed(filtered),
        source_rows: table.num_rows(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AdmissionRecord;
    use chrono::{NaiveDate, NaiveDateTime};

    fn date(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn table() -> HospitalTable {
        HospitalTable::from_records(&[
            AdmissionRecord::new("1", 30, "Male", "Cardiology", date(1)),
            AdmissionRecord::new("2", 40, "Female", "Cardiology", date(2)),
            AdmissionRecord::new("3", 50, "Female", "Neurology", date(3)),
            AdmissionRecord::new("4", 60, "Other", "Oncology", date(4)),
        ])
        .unwrap()
    }

    fn ids(view: &FilteredView) -> Vec<String> {
        view.to_records()
            .into_iter()
            .filter_map(|r| r.patient_id)
            .collect()
    }

    #[test]
    fn test_all_selection_keeps_everything() {
        let table = table();
        let selection = FilterSelection::all(&table);
        assert!(selection.validate(&table).is_ok());

        let view = apply(&table, &selection).unwrap();
        assert_eq!(view.num_rows(), 4);
        assert_eq!(view.source_rows(), 4);
    }

    #[test]
    fn test_rows_must_match_both_dimensions() {
        let selection = FilterSelection::new(["Cardiology", "Neurology"], ["Female"]);
        let view = apply(&table(), &selection).unwrap();
        assert_eq!(ids(&view), vec!["2", "3"]);
    }

    #[test]
    fn test_empty_dimension_yields_empty_view() {
        let table = table();
        let no_departments = FilterSelection::new(Vec::<String>::new(), table.distinct_genders());
        assert!(no_departments.is_empty());
        assert_eq!(apply(&table, &no_departments).unwrap().num_rows(), 0);

        let no_genders = FilterSelection::new(table.distinct_departments(), Vec::<String>::new());
        assert_eq!(apply(&table, &no_genders).unwrap().num_rows(), 0);
    }

    #[test]
    fn test_validate_rejects_values_not_in_table() {
        let table = table();
        let selection = FilterSelection::new(["Cardiology", "Radiology"], ["Male"]);
        let err = selection.validate(&table).unwrap_err();
        assert!(err.to_string().contains("Radiology"));

        let restricted = selection.restricted_to(&table);
        assert_eq!(restricted, FilterSelection::new(["Cardiology"], ["Male"]));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let selection = FilterSelection::new(["cardiology"], ["male"]);
        assert_eq!(apply(&table(), &selection).unwrap().num_rows(), 0);
    }

    #[test]
    fn test_null_categories_excluded_from_default_view() {
        let table = HospitalTable::from_records(&[
            AdmissionRecord::new("1", 30, "Male", "Cardiology", date(1)),
            AdmissionRecord {
                department: None,
                ..AdmissionRecord::new("2", 50, "Female", "Cardiology", date(2))
            },
            AdmissionRecord {
                gender: None,
                ..AdmissionRecord::new("3", 70, "Male", "Neurology", date(3))
            },
        ])
        .unwrap();

        let selection = FilterSelection::all(&table);
        assert_eq!(selection.departments.len(), 2);
        assert_eq!(selection.genders.len(), 2);

        let view = apply(&table, &selection).unwrap();
        assert_eq!(view.num_rows(), 1);
        assert_eq!(view.patient_ids().value(0), "1");
    }
}
