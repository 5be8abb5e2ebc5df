//! Admission data model.

pub mod record;
pub mod table;

pub use record::AdmissionRecord;
pub use table::{HospitalTable, millis_to_datetime};
