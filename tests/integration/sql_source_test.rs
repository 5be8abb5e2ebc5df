use arrow::array::Array;
use hospital_dashboard::schema::{ADMISSION_DATE, AGE};
use hospital_dashboard::{ConnectionConfig, DashboardError, DashboardSession, SqlSource, TableSource};

use crate::utils::{TEST_TABLE, admissions_db, sqlite_db};

#[tokio::test]
async fn test_sqlite_source_loads_whole_table() {
    let (_dir, path) = admissions_db().await;
    let source = SqlSource::new(ConnectionConfig::sqlite(&path).with_table(TEST_TABLE)).unwrap();

    let table = source.load().await.unwrap();
    assert_eq!(table.num_rows(), 5);
    assert_eq!(
        table.distinct_departments(),
        vec!["Cardiology", "Neurology", "Pediatrics"]
    );
    assert_eq!(table.distinct_genders(), vec!["Male", "Female"]);

    let schema = table.batch().schema();
    assert_eq!(
        schema.field_with_name(AGE).unwrap().data_type(),
        &arrow::datatypes::DataType::Int64
    );
    assert!(schema.field_with_name("Ward").is_ok());
    assert!(schema.field_with_name(ADMISSION_DATE).is_ok());

    assert!(table.ages().is_null(4));
    assert_eq!(
        table.admission_date(0).unwrap().to_string(),
        "2024-01-05 08:15:00"
    );
}

#[tokio::test]
async fn test_query_reads_configured_table() {
    let source = SqlSource::new(ConnectionConfig::default()).unwrap();
    assert_eq!(source.query().unwrap(), "SELECT * FROM hospitaldata;");
}

#[tokio::test]
async fn test_missing_column_is_schema_error() {
    let (_dir, path) = sqlite_db(
        "Patient_ID TEXT, Age INTEGER, Gender TEXT, Admission_Date TEXT",
        &["'P1', 30, 'Male', '2024-01-01 00:00:00'"],
    )
    .await;
    let source = SqlSource::new(ConnectionConfig::sqlite(&path).with_table(TEST_TABLE)).unwrap();

    let err = source.load().await.unwrap_err();
    assert!(matches!(err, DashboardError::Schema(_)));
    assert!(err.to_string().contains("Department"));
    assert!(err.is_load_failure());
}

#[tokio::test]
async fn test_empty_table_loads_without_rows() {
    let (_dir, path) = sqlite_db(
        "Patient_ID TEXT, Age INTEGER, Gender TEXT, Department TEXT, Admission_Date TEXT",
        &[],
    )
    .await;
    let source = SqlSource::new(ConnectionConfig::sqlite(&path).with_table(TEST_TABLE)).unwrap();

    let table = source.load().await.unwrap();
    assert!(table.is_empty());
    assert!(table.distinct_departments().is_empty());
}

#[tokio::test]
async fn test_missing_database_is_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.db");
    let source = SqlSource::new(ConnectionConfig::sqlite(&path)).unwrap();

    let err = source.load().await.unwrap_err();
    assert!(matches!(err, DashboardError::Connection { .. }));
    assert!(!path.exists());
}

#[tokio::test]
async fn test_unknown_table_is_query_error() {
    let (_dir, path) = admissions_db().await;
    let source = SqlSource::new(ConnectionConfig::sqlite(&path).with_table("admissions")).unwrap();

    let err = source.load().await.unwrap_err();
    assert!(matches!(err, DashboardError::Query { .. }));
}

#[tokio::test]
async fn test_session_over_sqlite_source() {
    let (_dir, path) = admissions_db().await;
    let source = SqlSource::new(ConnectionConfig::sqlite(&path).with_table(TEST_TABLE)).unwrap();

    let mut session = DashboardSession::open(&source, 5).await.unwrap();
    session.select_departments(["Cardiology"]).unwrap();
    let frame = session.render().unwrap();

    assert_eq!(frame.metrics.row_count, 3);
    assert_eq!(frame.metrics.total_patients, 2);
    assert_eq!(frame.metrics.avg_age, Some(42.0));

    session.reload(&source).await.unwrap();
    assert_eq!(
        session.selection().departments.iter().collect::<Vec<_>>(),
        vec!["Cardiology"]
    );
}
