//! In-memory admission table backed by an Arrow record batch.

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, AsArray, Int64Array, StringArray, TimestampMillisecondArray,
};
use arrow::compute::concat_batches;
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, NaiveDateTime};
use rustc_hash::FxHashSet;

use crate::error::Result;
use crate::models::record::AdmissionRecord;
use crate::schema::{
    ADMISSION_DATE, AGE, DEPARTMENT, GENDER, PATIENT_ID, admission_schema, conform_batch,
};

/// Admission records conformed to the canonical schema
///
/// Construction always goes through [`conform_batch`], so the typed column
/// accessors can rely on the canonical Arrow types.
#[derive(Debug, Clone)]
pub struct HospitalTable {
    batch: RecordBatch,
    patient_id: usize,
    age: usize,
    gender: usize,
    department: usize,
    admission_date: usize,
}

impl HospitalTable {
    /// Conform and wrap a record batch
    pub fn try_new(batch: &RecordBatch) -> Result<Self> {
        let batch = conform_batch(batch)?;
        Ok(Self::from_conformed(batch))
    }

    /// Conform and concatenate several batches sharing one schema
    pub fn from_batches(batches: &[RecordBatch]) -> Result<Self> {
        match batches {
            [] => Ok(Self::empty()),
            [single] => Self::try_new(single),
            [first, ..] => {
                let combined = concat_batches(&first.schema(), batches)?;
                Self::try_new(&combined)
            }
        }
    }

    /// Build a table from row records
    pub fn from_records(records: &[AdmissionRecord]) -> Result<Self> {
        let patient_ids: StringArray = records.iter().map(|r| r.patient_id.as_deref()).collect();
        let ages: Int64Array = records.iter().map(|r| r.age.map(i64::from)).collect();
        let genders: StringArray = records.iter().map(|r| r.gender.as_deref()).collect();
        let departments: StringArray = records.iter().map(|r| r.department.as_deref()).collect();
        let dates: TimestampMillisecondArray = records
            .iter()
            .map(|r| r.admission_date.map(|ts| ts.and_utc().timestamp_millis()))
            .collect();

        let batch = RecordBatch::try_new(
            admission_schema(),
            vec![
                Arc::new(patient_ids) as ArrayRef,
                Arc::new(ages),
                Arc::new(genders),
                Arc::new(departments),
                Arc::new(dates),
            ],
        )?;
        Self::try_new(&batch)
    }

    /// A table with the canonical schema and no rows
    #[must_use]
    pub fn empty() -> Self {
        Self::from_conformed(RecordBatch::new_empty(admission_schema()))
    }

    /// Wrap a batch already produced by [`conform_batch`] or derived from one
    pub(crate) fn from_conformed(batch: RecordBatch) -> Self {
        let schema = batch.schema();
        let index = |name: &str| schema.index_of(name).unwrap_or_default();
        Self {
            patient_id: index(PATIENT_ID),
            age: index(AGE),
            gender: index(GENDER),
            department: index(DEPARTMENT),
            admission_date: index(ADMISSION_DATE),
            batch,
        }
    }

    /// Underlying record batch, including pass-through columns
    #[must_use]
    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Number of rows
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Whether the table has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batch.num_rows() == 0
    }

    /// Patient identifier column
    #[must_use]
    pub fn patient_ids(&self) -> &StringArray {
        self.batch.column(self.patient_id).as_string()
    }

    /// Age column
    #[must_use]
    pub fn ages(&self) -> &Int64Array {
        self.batch.column(self.age).as_primitive()
    }

    /// Gender column
    #[must_use]
    pub fn genders(&self) -> &StringArray {
        self.batch.column(self.gender).as_string()
    }

    /// Department column
    #[must_use]
    pub fn departments(&self) -> &StringArray {
        self.batch.column(self.department).as_string()
    }

    /// Admission date column (milliseconds since the epoch)
    #[must_use]
    pub fn admission_dates(&self) -> &TimestampMillisecondArray {
        self.batch.column(self.admission_date).as_primitive()
    }

    /// Admission timestamp of one row
    #[must_use]
    pub fn admission_date(&self, row: usize) -> Option<NaiveDateTime> {
        let dates = self.admission_dates();
        if dates.is_null(row) {
            return None;
        }
        millis_to_datetime(dates.value(row))
    }

    /// Distinct departments in order of first appearance
    #[must_use]
    pub fn distinct_departments(&self) -> Vec<String> {
        distinct_in_order(self.departments())
    }

    /// Distinct genders in order of first appearance
    #[must_use]
    pub fn distinct_genders(&self) -> Vec<String> {
        distinct_in_order(self.genders())
    }

    /// Materialise the required columns as row records
    #[must_use]
    pub fn to_records(&self) -> Vec<AdmissionRecord> {
        let ids = self.patient_ids();
        let ages = self.ages();
        let genders = self.genders();
        let departments = self.departments();

        (0..self.num_rows())
            .map(|row| AdmissionRecord {
                patient_id: string_at(ids, row),
                age: if ages.is_null(row) {
                    None
                } else {
                    u32::try_from(ages.value(row)).ok()
                },
                gender: string_at(genders, row),
                department: string_at(departments, row),
                admission_date: self.admission_date(row),
            })
            .collect()
    }
}

/// Convert epoch milliseconds to a naive UTC timestamp
#[must_use]
pub fn millis_to_datetime(millis: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(millis).map(|ts| ts.naive_utc())
}

fn string_at(array: &StringArray, row: usize) -> Option<String> {
    (!array.is_null(row)).then(|| array.value(row).to_string())
}

fn distinct_in_order(array: &StringArray) -> Vec<String> {
    let mut seen = FxHashSet::default();
    array
        .iter()
        .flatten()
        .filter(|value| seen.insert(*value))
        .map(str::to_string)
        .collect()
}
