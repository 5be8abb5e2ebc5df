use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use hospital_dashboard::{AdmissionRecord, HospitalTable};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{Connection, Executor};
use tempfile::TempDir;

/// Table name used by the test databases
pub const TEST_TABLE: &str = "hospitaldata";

/// Midnight on the given day of January 2024
#[must_use]
pub fn jan(day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid test date")
}

/// Two Cardiology admissions: a 30 year old man and a 40 year old woman
#[must_use]
pub fn scenario_table() -> HospitalTable {
    HospitalTable::from_records(&[
        AdmissionRecord::new("P1", 30, "Male", "Cardiology", jan(1)),
        AdmissionRecord::new("P2", 40, "Female", "Cardiology", jan(2)),
    ])
    .expect("scenario table")
}

/// A mixed table with repeat visits and several departments
#[must_use]
pub fn ward_table() -> HospitalTable {
    HospitalTable::from_records(&sample_records()).expect("ward table")
}

#[must_use]
pub fn sample_records() -> Vec<AdmissionRecord> {
    vec![
        AdmissionRecord::new("P1", 30, "Male", "Cardiology", jan(5)),
        AdmissionRecord::new("P2", 40, "Female", "Neurology", jan(3)),
        AdmissionRecord::new("P3", 65, "Female", "Cardiology", jan(1)),
        AdmissionRecord::new("P1", 31, "Male", "Cardiology", jan(9)),
        AdmissionRecord::new("P4", 8, "Male", "Pediatrics", jan(2)),
        AdmissionRecord::new("P5", 52, "Female", "Neurology", jan(7)),
    ]
}

/// Create a SQLite database holding `rows` in a temporary directory
///
/// `columns` is the column list of the `CREATE TABLE` statement; each row is
/// a list of SQL literals in the same order. The returned `TempDir` must be
/// kept alive for as long as the database is used.
pub async fn sqlite_db(columns: &str, rows: &[&str]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("hospital.db");

    let options = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true);
    let mut conn = SqliteConnection::connect_with(&options)
        .await
        .expect("create test database");

    conn.execute(format!("CREATE TABLE {TEST_TABLE} ({columns})").as_str())
        .await
        .expect("create table");
    for row in rows {
        conn.execute(format!("INSERT INTO {TEST_TABLE} VALUES ({row})").as_str())
            .await
            .expect("insert row");
    }
    conn.close().await.expect("close test database");

    (dir, path)
}

/// SQLite database with the full admission schema
pub async fn admissions_db() -> (TempDir, PathBuf) {
    sqlite_db(
        "Patient_ID TEXT, Age INTEGER, Gender TEXT, Department TEXT, Admission_Date TEXT, Ward TEXT",
        &[
            "'P1', 30, 'Male', 'Cardiology', '2024-01-05 08:15:00', 'A'",
            "'P2', 40, 'Female', 'Neurology', '2024-01-03 10:00:00', 'B'",
            "'P3', 65, 'Female', 'Cardiology', '2024-01-01 23:45:00', 'A'",
            "'P1', 31, 'Male', 'Cardiology', '2024-01-09 07:30:00', NULL",
            "'P4', NULL, 'Male', 'Pediatrics', '2024-01-02 12:00:00', 'C'",
        ],
    )
    .await
}
