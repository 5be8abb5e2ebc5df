//! Data source adapters
//!
//! A [`TableSource`] produces the complete admission table in one call.
//! Either the whole table is returned, already conformed to the canonical
//! schema, or an error is; partial data is never handed out.

mod rows;
pub mod sql;

use std::future::Future;
use std::time::Instant;

use arrow::record_batch::RecordBatch;

use crate::error::Result;
use crate::models::HospitalTable;
use crate::utils::{log_operation_complete, log_operation_start};

pub use sql::SqlSource;

/// Something that can load the admission table
pub trait TableSource {
    /// Short description used in log messages
    fn describe(&self) -> String;

    /// Load every admission row
    ///
    /// # Errors
    /// Returns a connection error when the store is unreachable and a
    /// schema error when required columns are absent or mistyped.
    fn load(&self) -> impl Future<Output = Result<HospitalTable>> + Send;
}

/// Source backed by Arrow batches that are already in memory
#[derive(Debug, Clone, Default)]
pub struct BatchSource {
    batches: Vec<RecordBatch>,
}

impl BatchSource {
    /// Create a source from record batches sharing one schema
    #[must_use]
    pub fn new(batches: Vec<RecordBatch>) -> Self {
        Self { batches }
    }

    /// Create a source from a single batch
    #[must_use]
    pub fn from_batch(batch: RecordBatch) -> Self {
        Self::new(vec![batch])
    }

    /// Load synchronously
    pub fn load_now(&self) -> Result<HospitalTable> {
        let start = Instant::now();
        let description = self.describe();
        log_operation_start("Loading admissions from", &description);
        let table = HospitalTable::from_batches(&self.batches)?;
        log_operation_complete("loaded", &description, table.num_rows(), Some(start.elapsed()));
        Ok(table)
    }
}

impl TableSource for BatchSource {
    fn describe(&self) -> String {
        format!("{} in-memory batch(es)", self.batches.len())
    }

    async fn load(&self) -> Result<HospitalTable> {
        self.load_now()
    }
}
