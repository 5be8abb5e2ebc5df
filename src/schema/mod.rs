//! Admission table schema and conformance checks.
//!
//! Every table entering the pipeline is conformed to [`admission_schema`]:
//! required columns must exist and hold values that can be adapted to the
//! canonical Arrow types. Extra columns are passed through untouched.

pub mod date_utils;

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, Int64Array, StringArray, TimestampMillisecondArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};
use arrow::record_batch::RecordBatch;
use log::{debug, warn};

use crate::error::{DashboardError, Result};

/// Patient identifier column
pub const PATIENT_ID: &str = "Patient_ID";
/// Age column
pub const AGE: &str = "Age";
/// Gender column
pub const GENDER: &str = "Gender";
/// Department column
pub const DEPARTMENT: &str = "Department";
/// Admission date column
pub const ADMISSION_DATE: &str = "Admission_Date";

/// Columns every admission table must provide
pub const REQUIRED_COLUMNS: [&str; 5] = [PATIENT_ID, AGE, GENDER, DEPARTMENT, ADMISSION_DATE];

/// Canonical type of the admission date column
#[must_use]
pub fn timestamp_type() -> DataType {
    DataType::Timestamp(TimeUnit::Millisecond, None)
}

/// Canonical Arrow schema of the required columns
#[must_use]
pub fn admission_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new(PATIENT_ID, DataType::Utf8, true),
        Field::new(AGE, DataType::Int64, true),
        Field::new(GENDER, DataType::Utf8, true),
        Field::new(DEPARTMENT, DataType::Utf8, true),
        Field::new(ADMISSION_DATE, timestamp_type(), true),
    ]))
}

/// Names of required columns absent from a schema
#[must_use]
pub fn missing_columns(schema: &Schema) -> Vec<&'static str> {
    REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|name| schema.index_of(name).is_err())
        .collect()
}

/// Names of required columns absent from a list of column names
#[must_use]
pub fn missing_column_names(names: &[String]) -> Vec<&'static str> {
    REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|required| !names.iter().any(|name| name == required))
        .collect()
}

/// Schema error listing missing required columns
#[must_use]
pub fn missing_columns_error(missing: &[&str]) -> DashboardError {
    DashboardError::schema(format!(
        "Missing required column(s): {}",
        missing.join(", ")
    ))
}

/// Conform a batch to the canonical admission schema
///
/// Required columns are adapted to their canonical types and keep their
/// position; extra columns are carried through as-is.
pub fn conform_batch(batch: &RecordBatch) -> Result<RecordBatch> {
    let schema = batch.schema();
    let missing = missing_columns(&schema);
    if !missing.is_empty() {
        return Err(missing_columns_error(&missing));
    }

    let mut fields = Vec::with_capacity(schema.fields().len());
    let mut columns = Vec::with_capacity(schema.fields().len());

    for (field, column) in schema.fields().iter().zip(batch.columns()) {
        let adapted = match field.name().as_str() {
            PATIENT_ID => adapt_identifier(column, PATIENT_ID)?,
            AGE => adapt_age(column)?,
            GENDER | DEPARTMENT => adapt_category(column, field.name())?,
            ADMISSION_DATE => adapt_timestamp(column)?,
            _ => {
                fields.push(field.as_ref().clone());
                columns.push(column.clone());
                continue;
            }
        };
        fields.push(Field::new(field.name(), adapted.data_type().clone(), true));
        columns.push(adapted);
    }

    let conformed = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?;
    debug!(
        "Conformed batch with {} rows and {} columns",
        conformed.num_rows(),
        conformed.num_columns()
    );
    Ok(conformed)
}

fn adapt_identifier(column: &ArrayRef, name: &str) -> Result<ArrayRef> {
    match column.data_type() {
        DataType::Utf8 => Ok(column.clone()),
        DataType::LargeUtf8
        | DataType::Utf8View
        | DataType::Dictionary(_, _)
        | DataType::Null => Ok(cast(column, &DataType::Utf8)?),
        t if t.is_integer() => Ok(cast(column, &DataType::Utf8)?),
        _ => Err(DashboardError::column_type(name, "identifier")),
    }
}

fn adapt_category(column: &ArrayRef, name: &str) -> Result<ArrayRef> {
    match column.data_type() {
        DataType::Utf8 => Ok(column.clone()),
        DataType::LargeUtf8 | DataType::Utf8View | DataType::Null => {
            Ok(cast(column, &DataType::Utf8)?)
        }
        DataType::Dictionary(_, value) if value.as_ref() == &DataType::Utf8 => {
            Ok(cast(column, &DataType::Utf8)?)
        }
        _ => Err(DashboardError::column_type(name, "string")),
    }
}

fn adapt_age(column: &ArrayRef) -> Result<ArrayRef> {
    let data_type = column.data_type();
    if !(data_type.is_integer() || data_type == &DataType::Null) {
        return Err(DashboardError::column_type(AGE, "integer"));
    }

    let ages = cast(column, &DataType::Int64)?;
    let typed: &Int64Array = ages.as_primitive();
    if let Some(negative) = typed.iter().flatten().find(|age| *age < 0) {
        return Err(DashboardError::schema(format!(
            "Column '{AGE}' contains negative value {negative}"
        )));
    }
    Ok(ages)
}

fn adapt_timestamp(column: &ArrayRef) -> Result<ArrayRef> {
    match column.data_type() {
        DataType::Timestamp(TimeUnit::Millisecond, None) => Ok(column.clone()),
        DataType::Timestamp(_, _) | DataType::Date32 | DataType::Date64 | DataType::Null => {
            Ok(cast(column, &timestamp_type())?)
        }
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {
            let strings = cast(column, &DataType::Utf8)?;
            Ok(Arc::new(parse_timestamp_strings(strings.as_string::<i32>())))
        }
        _ => Err(DashboardError::column_type(ADMISSION_DATE, "date")),
    }
}

/// Parse a string column into millisecond timestamps
///
/// Unparseable values become null and are reported once as a warning.
#[must_use]
pub fn parse_timestamp_strings(strings: &StringArray) -> TimestampMillisecondArray {
    let mut unparsed = 0usize;
    let values: TimestampMillisecondArray = strings
        .iter()
        .map(|value| {
            let value = value?;
            let parsed = date_utils::parse_timestamp(value);
            if parsed.is_none() && !value.trim().is_empty() {
                unparsed += 1;
            }
            parsed.map(|ts| ts.and_utc().timestamp_millis())
        })
        .collect();

    if unparsed > 0 {
        warn!("{unparsed} value(s) in '{ADMISSION_DATE}' could not be parsed as dates and were set to null");
    }
    values
}
