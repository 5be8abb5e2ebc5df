use arrow::array::Array;
use hospital_dashboard::{DashboardError, FilterSelection, HospitalTable, apply, summarize};

use crate::utils::ward_table;

fn selections(table: &HospitalTable) -> Vec<FilterSelection> {
    vec![
        FilterSelection::all(table),
        FilterSelection::new(["Cardiology"], ["Male", "Female"]),
        FilterSelection::new(["Neurology", "Pediatrics"], ["Male"]),
        FilterSelection::new(["Cardiology"], Vec::<String>::new()),
        FilterSelection::default(),
    ]
}

#[test]
fn test_view_rows_satisfy_selection() {
    let table = ward_table();
    for selection in selections(&table) {
        let view = apply(&table, &selection).unwrap();
        assert!(view.num_rows() <= table.num_rows());
        assert_eq!(view.source_rows(), table.num_rows());

        for row in 0..view.num_rows() {
            assert!(selection.departments.contains(view.departments().value(row)));
            assert!(selection.genders.contains(view.genders().value(row)));
        }
    }
}

#[test]
fn test_filtering_is_idempotent() {
    let table = ward_table();
    for selection in selections(&table) {
        let once = apply(&table, &selection).unwrap();
        let twice = apply(once.table(), &selection).unwrap();
        assert_eq!(once.to_records(), twice.to_records());
    }
}

#[test]
fn test_distinct_patients_never_exceed_rows() {
    let table = ward_table();
    for selection in selections(&table) {
        let metrics = summarize(&apply(&table, &selection).unwrap());
        assert!(metrics.total_patients <= metrics.row_count);
    }
}

#[test]
fn test_view_keeps_original_row_order() {
    let table = ward_table();
    let view = apply(&table, &FilterSelection::new(["Cardiology"], ["Male", "Female"])).unwrap();
    let ids: Vec<&str> = (0..view.num_rows())
        .map(|row| view.patient_ids().value(row))
        .collect();
    assert_eq!(ids, vec!["P1", "P3", "P1"]);
}

#[test]
fn test_unknown_value_rejected_by_validate() {
    let table = ward_table();
    let selection = FilterSelection::new(["Oncology"], ["Male"]);
    let err = selection.validate(&table).unwrap_err();
    assert!(matches!(err, DashboardError::Filter(_)));
    assert!(err.to_string().contains("Oncology"));

    let restricted = selection.restricted_to(&table);
    assert!(restricted.departments.is_empty());
    assert!(apply(&table, &restricted).unwrap().is_empty());
}

#[test]
fn test_null_gender_never_selected() {
    let mut records = crate::utils::sample_records();
    records[0].gender = None;
    let table = HospitalTable::from_records(&records).unwrap();

    let view = apply(&table, &FilterSelection::all(&table)).unwrap();
    assert_eq!(view.num_rows(), records.len() - 1);
    assert_eq!(view.genders().null_count(), 0);
}
