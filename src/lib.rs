//! A Rust library behind a hospital admissions dashboard: loading the
//! admission table, filtering it by department and gender, and computing the
//! key metrics and chart data for each selection.

pub mod charts;
pub mod config;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod models;
pub mod schema;
pub mod session;
pub mod source;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use config::{ConnectionConfig, DashboardConfig, Driver, OutputFormat};
pub use error::{DashboardError, Result};
pub use models::{AdmissionRecord, HospitalTable};
pub use session::{DashboardFrame, DashboardSession, LiveIndicator};

// Arrow types
pub use arrow::datatypes::Schema as ArrowSchema;
pub use arrow::record_batch::RecordBatch;

// Loading
pub use source::{BatchSource, SqlSource, TableSource};

// Filtering capabilities
pub use filter::{BatchFilter, FilterSelection, FilteredView, apply, filter_record_batch};

// Aggregation and projection
pub use charts::{ChartSet, project};
pub use metrics::{CounterFrame, MetricsSnapshot, summarize};
