//! Core filtering functionality for admission batches
//!
//! Filters build a boolean mask over a record batch and keep the rows where
//! the mask is true. Arrow's filter kernel preserves row order, so every
//! filter here is stable.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, BooleanArray};
use arrow::compute::filter as arrow_filter;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;

use crate::error::{DashboardError, Result};

/// Filter a record batch based on a boolean mask
///
/// # Arguments
/// * `batch` - The record batch to filter
/// * `mask` - The boolean mask indicating which rows to keep
///
/// # Returns
/// A new record batch with only rows where mask is true
pub fn filter_record_batch(batch: &RecordBatch, mask: &BooleanArray) -> Result<RecordBatch> {
    if batch.num_rows() != mask.len() {
        return Err(DashboardError::filter(format!(
            "Mask length ({}) doesn't match batch row count ({})",
            mask.len(),
            batch.num_rows()
        )));
    }

    let filtered_columns: Vec<ArrayRef> = batch
        .columns()
        .iter()
        .map(|col| arrow_filter(col, mask))
        .collect::<arrow::error::Result<_>>()?;

    Ok(RecordBatch::try_new(batch.schema(), filtered_columns)?)
}

/// Trait for objects that can filter record batches
pub trait BatchFilter: std::fmt::Debug {
    /// Compute the row mask for a batch
    ///
    /// Null mask entries are treated as "drop".
    fn mask(&self, batch: &RecordBatch) -> Result<BooleanArray>;

    /// Returns the set of column names required by this filter
    fn required_columns(&self) -> HashSet<String>;

    /// Filter a record batch
    fn filter(&self, batch: &RecordBatch) -> Result<RecordBatch> {
        let mask = self.mask(batch)?;
        filter_record_batch(batch, &mask)
    }
}

/// A filter that always includes all rows
#[derive(Debug, Clone, Default)]
pub struct IncludeAllFilter;

impl BatchFilter for IncludeAllFilter {
    fn mask(&self, batch: &RecordBatch) -> Result<BooleanArray> {
        Ok(BooleanArray::from(vec![true; batch.num_rows()]))
    }

    fn required_columns(&self) -> HashSet<String> {
        HashSet::new()
    }
}

/// A filter that excludes all rows
#[derive(Debug, Clone, Default)]
pub struct ExcludeAllFilter;

impl BatchFilter for ExcludeAllFilter {
    fn mask(&self, batch: &RecordBatch) -> Result<BooleanArray> {
        Ok(BooleanArray::from(vec![false; batch.num_rows()]))
    }

    fn required_columns(&self) -> HashSet<String> {
        HashSet::new()
    }
}

/// Keep rows whose string column value is one of a set of values
///
/// Matching is exact and case-sensitive; null cells never match. An empty
/// value set matches nothing.
#[derive(Debug, Clone)]
pub struct ValueSetFilter {
    column: String,
    values: BTreeSet<String>,
}

impl ValueSetFilter {
    /// Create a new value-set filter
    #[must_use]
    pub fn new(column: impl Into<String>, values: BTreeSet<String>) -> Self {
        Self {
            column: column.into(),
            values,
        }
    }

    /// Column the filter reads
    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Accepted values
    #[must_use]
    pub fn values(&self) -> &BTreeSet<String> {
        &self.values
    }
}

impl BatchFilter for ValueSetFilter {
    fn mask(&self, batch: &RecordBatch) -> Result<BooleanArray> {
        let column = batch
            .column_by_name(&self.column)
            .ok_or_else(|| DashboardError::column_not_found(&self.column))?;
        if column.data_type() != &DataType::Utf8 {
            return Err(DashboardError::column_type(&self.column, "string"));
        }

        if self.values.is_empty() {
            return ExcludeAllFilter.mask(batch);
        }

        Ok(column
            .as_string::<i32>()
            .iter()
            .map(|value| Some(value.is_some_and(|v| self.values.contains(v))))
            .collect())
    }

    fn required_columns(&self) -> HashSet<String> {
        HashSet::from([self.column.clone()])
    }
}

/// A filter that combines multiple filters with a logical AND
#[derive(Debug, Clone)]
pub struct AndFilter {
    filters: Vec<Arc<dyn BatchFilter + Send + Sync>>,
}

impl AndFilter {
    /// Create a new AND filter
    #[must_use]
    pub fn new(filters: Vec<Arc<dyn BatchFilter + Send + Sync>>) -> Self {
        Self { filters }
    }
}

impl BatchFilter for AndFilter {
    fn mask(&self, batch: &RecordBatch) -> Result<BooleanArray> {
        let Some((first, rest)) = self.filters.split_first() else {
            return IncludeAllFilter.mask(batch);
        };

        let mut combined = first.mask(batch)?;
        for filter in rest {
            if combined.true_count() == 0 {
                break;
            }
            let next = filter.mask(batch)?;
            combined = arrow::compute::and(&combined, &next)?;
        }
        Ok(combined)
    }

    fn required_columns(&self) -> HashSet<String> {
        self.filters
            .iter()
            .flat_map(|filter| filter.required_columns())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Int64Array, StringArray};

    fn batch() -> RecordBatch {
        RecordBatch::try_from_iter(vec![
            (
                "Department",
                Arc::new(StringArray::from(vec![
                    Some("Cardiology"),
                    Some("Neurology"),
                    None,
                    Some("cardiology"),
                    Some("Cardiology"),
                ])) as ArrayRef,
            ),
            (
                "Age",
                Arc::new(Int64Array::from(vec![30, 40, 50, 60, 70])) as ArrayRef,
            ),
        ])
        .unwrap()
    }

    fn shared<F: BatchFilter + Send + Sync + 'static>(filter: F) -> Arc<dyn BatchFilter + Send + Sync> {
        Arc::new(filter)
    }

    fn values(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    fn ages(batch: &RecordBatch) -> Vec<i64> {
        batch
            .column_by_name("Age")
            .unwrap()
            .as_primitive::<arrow::datatypes::Int64Type>()
            .values()
            .to_vec()
    }

    #[test]
    fn test_value_set_filter_is_exact_and_stable() {
        let filter = ValueSetFilter::new("Department", values(&["Cardiology"]));
        let result = filter.filter(&batch()).unwrap();
        assert_eq!(ages(&result), vec![30, 70]);
    }

    #[test]
    fn test_empty_value_set_matches_nothing() {
        let filter = ValueSetFilter::new("Department", BTreeSet::new());
        let result = filter.filter(&batch()).unwrap();
        assert_eq!(result.num_rows(), 0);
        assert_eq!(result.schema(), batch().schema());
    }

    #[test]
    fn test_missing_and_mistyped_columns() {
        let missing = ValueSetFilter::new("Gender", values(&["Male"]));
        assert!(matches!(
            missing.filter(&batch()),
            Err(DashboardError::Schema(_))
        ));

        let mistyped = ValueSetFilter::new("Age", values(&["30"]));
        assert!(mistyped.filter(&batch()).is_err());
    }

    #[test]
    fn test_and_filter_combines_masks() {
        let and = AndFilter::new(vec![
            shared(ValueSetFilter::new("Department", values(&["Cardiology", "Neurology"]))),
            shared(ExcludeAllFilter),
        ]);
        assert_eq!(and.filter(&batch()).unwrap().num_rows(), 0);

        let and = AndFilter::new(vec![
            shared(ValueSetFilter::new("Department", values(&["Cardiology", "Neurology"]))),
            shared(IncludeAllFilter),
        ]);
        assert_eq!(ages(&and.filter(&batch()).unwrap()), vec![30, 40, 70]);
        assert_eq!(and.required_columns(), HashSet::from(["Department".to_string()]));

        let empty = AndFilter::new(Vec::new());
        assert_eq!(empty.filter(&batch()).unwrap().num_rows(), 5);
    }

    #[test]
    fn test_mask_length_mismatch_is_rejected() {
        let mask = BooleanArray::from(vec![true, false]);
        assert!(filter_record_batch(&batch(), &mask).is_err());
    }
}
