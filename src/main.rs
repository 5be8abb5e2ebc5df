use anyhow::Context;
use hospital_dashboard::charts::ChartSet;
use hospital_dashboard::utils::logging::{create_spinner, finish_and_clear, finish_progress_bar};
use hospital_dashboard::{
    DashboardConfig, DashboardFrame, DashboardSession, OutputFormat, SqlSource,
};
use log::{error, info};

/// Comma-separated department selection; unset selects every department
const DEPARTMENTS_ENV: &str = "DASHBOARD_DEPARTMENTS";
/// Comma-separated gender selection; unset selects every gender
const GENDERS_ENV: &str = "DASHBOARD_GENDERS";

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn print_charts(charts: &ChartSet) {
    println!("Age Trends by Department:");
    for series in &charts.line {
        println!("  {}: {} point(s)", series.department, series.points.len());
    }

    println!(
        "Patient Admissions Over Time: {} frame(s)",
        charts.scatter.frames.len()
    );

    match &charts.pie {
        Some(pie) => {
            println!("Patient Distribution by Department:");
            for slice in &pie.slices {
                println!(
                    "  {}: {} ({:.1}%)",
                    slice.department,
                    slice.value,
                    slice.share * 100.0
                );
            }
        }
        None => println!("Patient Distribution by Department: no data"),
    }

    println!("Department-Gender Breakdown:");
    for branch in &charts.sunburst.branches {
        let genders: Vec<String> = branch
            .children
            .iter()
            .map(|leaf| format!("{} {}", leaf.gender, leaf.value))
            .collect();
        println!("  {} ({}): {}", branch.department, branch.value, genders.join(", "));
    }
}

fn print_frame(frame: &DashboardFrame) {
    println!("Hospital Admissions Dashboard");
    println!("{}", frame.indicator.label());
    println!();
    print!("{}", frame.metrics);
    println!();
    print_charts(&frame.charts);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = DashboardConfig::from_env().context("Invalid dashboard configuration")?;
    info!("Using {}", config.connection);

    let source = SqlSource::new(config.connection.clone())?;

    let spinner = create_spinner(Some("Loading admissions..."));
    let opened = DashboardSession::open(&source, config.counter_steps).await;
    let mut session = match opened {
        Ok(session) => {
            finish_progress_bar(&spinner, Some("Admissions loaded"));
            session
        }
        Err(e) => {
            finish_and_clear(&spinner);
            error!("Could not load admissions: {e}");
            return Err(e).context(format!("Failed to load data from {}", config.connection));
        }
    };

    let mut selection = session.selection().clone();
    if let Ok(value) = std::env::var(DEPARTMENTS_ENV) {
        selection.departments = parse_list(&value).into_iter().collect();
    }
    if let Ok(value) = std::env::var(GENDERS_ENV) {
        selection.genders = parse_list(&value).into_iter().collect();
    }
    if &selection != session.selection() {
        session
            .select(selection)
            .context("Invalid department/gender selection")?;
    }

    let frame = session.render()?;
    match config.output {
        OutputFormat::Text => print_frame(&frame),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&frame)?),
    }

    let selection = session.selection();
    info!(
        "Rendered {} row(s) for {} department(s) and {} gender(s)",
        frame.metrics.row_count,
        selection.departments.len(),
        selection.genders.len()
    );
    Ok(())
}
