use hospital_dashboard::charts::line_series;
use hospital_dashboard::{
    BatchSource, DashboardSession, FilterSelection, HospitalTable, apply, project, summarize,
};

use crate::utils::{jan, scenario_table, ward_table};

#[test]
fn test_all_selected_scenario() {
    let table = scenario_table();
    let view = apply(&table, &FilterSelection::all(&table)).unwrap();
    let metrics = summarize(&view);

    assert_eq!(metrics.total_patients, 2);
    assert_eq!(metrics.avg_age, Some(35.0));
    assert_eq!(metrics.male_count, 1);
    assert_eq!(metrics.female_count, 1);
}

#[test]
fn test_single_gender_scenario() {
    let table = scenario_table();
    let selection = FilterSelection::new(["Cardiology"], ["Male"]);
    let view = apply(&table, &selection).unwrap();
    let metrics = summarize(&view);

    assert_eq!(view.num_rows(), 1);
    assert_eq!(metrics.avg_age, Some(30.0));
    assert_eq!(metrics.female_count, 0);
}

#[test]
fn test_no_department_scenario() {
    let table = scenario_table();
    let selection = FilterSelection::new(Vec::<String>::new(), ["Male", "Female"]);
    let view = apply(&table, &selection).unwrap();
    let metrics = summarize(&view);
    let charts = project(&view);

    assert!(view.is_empty());
    assert_eq!(metrics.total_patients, 0);
    assert_eq!(metrics.avg_age, None);
    assert!(charts.line.is_empty());
    assert!(charts.scatter.is_empty());
    assert!(charts.pie.is_none());
    assert!(charts.sunburst.branches.is_empty());
}

#[test]
fn test_line_series_sorted_within_department() {
    let table = ward_table();
    for series in line_series(&table) {
        let dates: Vec<_> = series.points.iter().map(|p| p.admission_date).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted, "series {} out of order", series.department);
    }
}

#[test]
fn test_chart_totals_agree() {
    let table = ward_table();
    let charts = project(&table);
    let pie = charts.pie.unwrap();

    assert_eq!(pie.total(), charts.sunburst.total());
    assert_eq!(pie.total(), 30 + 40 + 65 + 31 + 8 + 52);
    assert_eq!(charts.scatter.frames.first(), Some(&jan(1)));
    assert_eq!(charts.scatter.frames.last(), Some(&jan(9)));
}

#[tokio::test]
async fn test_session_renders_json_frame() {
    let source = BatchSource::from_batch(ward_table().batch().clone());
    let mut session = DashboardSession::open(&source, 4).await.unwrap();
    session.select_genders(["Female"]).unwrap();

    let frame = session.render_at(jan(10)).unwrap();
    assert_eq!(frame.metrics.female_count, 3);
    assert_eq!(frame.metrics.male_count, 0);
    assert_eq!(frame.counter_frames.len(), 4);
    assert_eq!(frame.counter_frames[3].female_count, 3);
    assert!(frame.indicator.pulse_on);

    let json = serde_json::to_value(&frame).unwrap();
    assert_eq!(json["metrics"]["female_count"], 3);
    assert_eq!(json["indicator"]["last_updated"], "2024-01-10 00:00:00");
    assert_eq!(json["charts"]["pie"]["hole"], 0.4);
}

#[test]
fn test_empty_table_renders() {
    let session = DashboardSession::from_table(HospitalTable::empty(), 5);
    let frame = session.render_at(jan(1)).unwrap();

    assert!(frame.metrics.is_empty());
    assert!(frame.selection.is_empty());
    assert_eq!(frame.counter_frames.len(), 5);
}
