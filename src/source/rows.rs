//! Conversion of driver rows into an Arrow record batch.

use std::sync::Arc;

use arrow::array::{ArrayRef, Int64Array, StringArray, TimestampMillisecondArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::Row;
use sqlx::mysql::MySqlRow;
use sqlx::sqlite::SqliteRow;

use crate::error::{DashboardError, Result};
use crate::schema::date_utils::parse_timestamp;
use crate::schema::{ADMISSION_DATE, AGE, DEPARTMENT, GENDER, PATIENT_ID, timestamp_type};
use crate::utils::log_warning;

/// Typed cell access shared by the supported drivers
///
/// Each getter returns `None` when the cell's SQL type cannot be decoded
/// as the requested Rust type, and `Some(None)` for SQL `NULL`.
pub(crate) trait RowCells {
    fn string(&self, idx: usize) -> Option<Option<String>>;
    fn integer(&self, idx: usize) -> Option<Option<i64>>;
    fn float(&self, idx: usize) -> Option<Option<f64>>;
    fn datetime(&self, idx: usize) -> Option<Option<NaiveDateTime>>;
    fn date(&self, idx: usize) -> Option<Option<NaiveDate>>;
}

impl RowCells for MySqlRow {
    fn string(&self, idx: usize) -> Option<Option<String>> {
        self.try_get::<Option<String>, _>(idx).ok()
    }

    fn integer(&self, idx: usize) -> Option<Option<i64>> {
        if let Ok(value) = self.try_get::<Option<i64>, _>(idx) {
            return Some(value);
        }
        // BIGINT UNSIGNED and friends
        match self.try_get::<Option<u64>, _>(idx) {
            Ok(Some(value)) => i64::try_from(value).ok().map(Some),
            Ok(None) => Some(None),
            Err(_) => None,
        }
    }

    fn float(&self, idx: usize) -> Option<Option<f64>> {
        self.try_get::<Option<f64>, _>(idx).ok()
    }

    fn datetime(&self, idx: usize) -> Option<Option<NaiveDateTime>> {
        self.try_get::<Option<NaiveDateTime>, _>(idx).ok()
    }

    fn date(&self, idx: usize) -> Option<Option<NaiveDate>> {
        self.try_get::<Option<NaiveDate>, _>(idx).ok()
    }
}

impl RowCells for SqliteRow {
    fn string(&self, idx: usize) -> Option<Option<String>> {
        self.try_get::<Option<String>, _>(idx).ok()
    }

    fn integer(&self, idx: usize) -> Option<Option<i64>> {
        self.try_get::<Option<i64>, _>(idx).ok()
    }

    fn float(&self, idx: usize) -> Option<Option<f64>> {
        self.try_get::<Option<f64>, _>(idx).ok()
    }

    fn datetime(&self, idx: usize) -> Option<Option<NaiveDateTime>> {
        self.try_get::<Option<NaiveDateTime>, _>(idx).ok()
    }

    fn date(&self, idx: usize) -> Option<Option<NaiveDate>> {
        self.try_get::<Option<NaiveDate>, _>(idx).ok()
    }
}

/// Build a record batch from driver rows
///
/// `columns` are the result column names in query order. Required columns
/// get their canonical types; any other column is rendered as text.
pub(crate) fn rows_to_batch<R: RowCells>(columns: &[String], rows: &[R]) -> Result<RecordBatch> {
    let mut fields = Vec::with_capacity(columns.len());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(columns.len());

    for (idx, name) in columns.iter().enumerate() {
        let (data_type, array): (DataType, ArrayRef) = match name.as_str() {
            PATIENT_ID => (DataType::Utf8, Arc::new(identifier_column(rows, idx, name)?)),
            AGE => (DataType::Int64, Arc::new(integer_column(rows, idx, name)?)),
            GENDER | DEPARTMENT => (DataType::Utf8, Arc::new(string_column(rows, idx, name)?)),
            ADMISSION_DATE => (timestamp_type(), Arc::new(timestamp_column(rows, idx, name)?)),
            _ => (DataType::Utf8, Arc::new(text_column(rows, idx))),
        };
        fields.push(Field::new(name, data_type, true));
        arrays.push(array);
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = if arrays.is_empty() {
        RecordBatch::new_empty(schema)
    } else {
        RecordBatch::try_new(schema, arrays)?
    };
    Ok(batch)
}

fn identifier_column<R: RowCells>(rows: &[R], idx: usize, name: &str) -> Result<StringArray> {
    rows.iter()
        .map(|row| {
            row.string(idx)
                .or_else(|| row.integer(idx).map(|v| v.map(|id| id.to_string())))
                .ok_or_else(|| DashboardError::column_type(name, "identifier"))
        })
        .collect::<Result<Vec<_>>>()
        .map(StringArray::from)
}

fn integer_column<R: RowCells>(rows: &[R], idx: usize, name: &str) -> Result<Int64Array> {
    rows.iter()
        .map(|row| {
            row.integer(idx)
                .ok_or_else(|| DashboardError::column_type(name, "integer"))
        })
        .collect::<Result<Vec<_>>>()
        .map(Int64Array::from)
}

fn string_column<R: RowCells>(rows: &[R], idx: usize, name: &str) -> Result<StringArray> {
    rows.iter()
        .map(|row| {
            row.string(idx)
                .ok_or_else(|| DashboardError::column_type(name, "string"))
        })
        .collect::<Result<Vec<_>>>()
        .map(StringArray::from)
}

fn timestamp_column<R: RowCells>(
    rows: &[R],
    idx: usize,
    name: &str,
) -> Result<TimestampMillisecondArray> {
    let mut unparsed = 0usize;
    let mut values = Vec::with_capacity(rows.len());

    for row in rows {
        let value = if let Some(ts) = row.datetime(idx) {
            ts
        } else if let Some(date) = row.date(idx) {
            date.and_then(|d| d.and_hms_opt(0, 0, 0))
        } else if let Some(text) = row.string(idx) {
            let parsed = text.as_deref().and_then(parse_timestamp);
            if parsed.is_none() && text.is_some_and(|t| !t.trim().is_empty()) {
                unparsed += 1;
            }
            parsed
        } else {
            return Err(DashboardError::column_type(name, "date"));
        };
        values.push(value.map(|ts| ts.and_utc().timestamp_millis()));
    }

    if unparsed > 0 {
        let column: &dyn std::fmt::Display = &name;
        log_warning(
            &format!("{unparsed} unparseable date value(s) set to null in column"),
            Some(column),
        );
    }
    Ok(TimestampMillisecondArray::from(values))
}

fn text_column<R: RowCells>(rows: &[R], idx: usize) -> StringArray {
    rows.iter()
        .map(|row| {
            row.string(idx)
                .or_else(|| row.integer(idx).map(|v| v.map(|n| n.to_string())))
                .or_else(|| row.float(idx).map(|v| v.map(|n| n.to_string())))
                .or_else(|| row.datetime(idx).map(|v| v.map(|ts| ts.to_string())))
                .or_else(|| row.date(idx).map(|v| v.map(|d| d.to_string())))
                .flatten()
        })
        .collect()
}
