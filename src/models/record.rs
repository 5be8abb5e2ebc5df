//! Row-level admission record.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One hospital admission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionRecord {
    /// Opaque patient identifier, shared by repeat visits
    pub patient_id: Option<String>,
    /// Age in years at admission
    pub age: Option<u32>,
    /// Gender as recorded (open-ended)
    pub gender: Option<String>,
    /// Admitting department (open-ended)
    pub department: Option<String>,
    /// Admission date and time
    pub admission_date: Option<NaiveDateTime>,
}

impl AdmissionRecord {
    /// Create a fully populated record
    #[must_use]
    pub fn new(
        patient_id: impl Into<String>,
        age: u32,
        gender: impl Into<String>,
        department: impl Into<String>,
        admission_date: NaiveDateTime,
    ) -> Self {
        Self {
            patient_id: Some(patient_id.into()),
            age: Some(age),
            gender: Some(gender.into()),
            department: Some(department.into()),
            admission_date: Some(admission_date),
        }
    }
}
