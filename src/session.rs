//! Dashboard session
//!
//! A session owns one snapshot of the admission table and the current
//! selection. Every render recomputes the view, the key metrics and the chart
//! data from scratch; nothing is cached between renders.

use std::sync::Arc;
use std::time::Instant;

use chrono::{Local, NaiveDateTime, Timelike};
use log::{debug, info};
use serde::Serialize;

use crate::charts::{self, ChartSet};
use crate::error::Result;
use crate::filter::{self, FilterSelection};
use crate::metrics::{self, CounterFrame, MetricsSnapshot};
use crate::models::HospitalTable;
use crate::source::TableSource;

/// Timestamp format of the live indicator
pub const LAST_UPDATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// "Last updated" badge shown next to the dashboard title
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiveIndicator {
    /// Render time, formatted with [`LAST_UPDATED_FORMAT`]
    pub last_updated: String,
    /// Pulse dot state: on for even seconds, off for odd
    pub pulse_on: bool,
}

impl LiveIndicator {
    /// Badge state for a render at `now`
    #[must_use]
    pub fn at(now: NaiveDateTime) -> Self {
        Self {
            last_updated: now.format(LAST_UPDATED_FORMAT).to_string(),
            pulse_on: now.second() % 2 == 0,
        }
    }

    /// Badge text, e.g. `LIVE | Last Updated: 2024-01-03 09:30:42`
    #[must_use]
    pub fn label(&self) -> String {
        format!("LIVE | Last Updated: {}", self.last_updated)
    }
}

/// Everything needed to draw the dashboard once
#[derive(Debug, Clone, Serialize)]
pub struct DashboardFrame {
    /// Selection the frame was rendered for
    pub selection: FilterSelection,
    /// Final key metrics
    pub metrics: MetricsSnapshot,
    /// Animated counter values, ending at `metrics`
    pub counter_frames: Vec<CounterFrame>,
    /// Chart panel data
    pub charts: ChartSet,
    /// Live badge
    pub indicator: LiveIndicator,
}

/// One user's view of the dashboard
#[derive(Debug, Clone)]
pub struct DashboardSession {
    table: Arc<HospitalTable>,
    selection: FilterSelection,
    counter_steps: usize,
}

impl DashboardSession {
    /// Load the table from `source` and select every value present
    ///
    /// # Errors
    /// Propagates load failures from the source.
    pub async fn open<S: TableSource>(source: &S, counter_steps: usize) -> Result<Self> {
        let table = source.load().await?;
        Ok(Self::from_table(table, counter_steps))
    }

    /// Start a session over an already loaded table
    #[must_use]
    pub fn from_table(table: HospitalTable, counter_steps: usize) -> Self {
        let selection = FilterSelection::all(&table);
        info!(
            "Session opened over {} rows ({} department(s), {} gender(s))",
            table.num_rows(),
            selection.departments.len(),
            selection.genders.len()
        );
        Self {
            table: Arc::new(table),
            selection,
            counter_steps,
        }
    }

    /// Shared handle to the current table snapshot
    #[must_use]
    pub fn table(&self) -> Arc<HospitalTable> {
        Arc::clone(&self.table)
    }

    /// Department filter options in order of first appearance
    #[must_use]
    pub fn departments(&self) -> Vec<String> {
        self.table.distinct_departments()
    }

    /// Gender filter options in order of first appearance
    #[must_use]
    pub fn genders(&self) -> Vec<String> {
        self.table.distinct_genders()
    }

    /// Departments and genders currently selected
    #[must_use]
    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    /// Replace the whole selection
    ///
    /// # Errors
    /// Returns a filter error if a value does not occur in the table; the
    /// previous selection is kept in that case.
    pub fn select(&mut self, selection: FilterSelection) -> Result<()> {
        selection.validate(&self.table)?;
        debug!("Selection changed to {selection:?}");
        self.selection = selection;
        Ok(())
    }

    /// Replace the selected departments, keeping the genders
    pub fn select_departments<I>(&mut self, departments: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let selection = FilterSelection {
            departments: departments.into_iter().map(Into::into).collect(),
            genders: self.selection.genders.clone(),
        };
        self.select(selection)
    }

    /// Replace the selected genders, keeping the departments
    pub fn select_genders<I>(&mut self, genders: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let selection = FilterSelection {
            departments: self.selection.departments.clone(),
            genders: genders.into_iter().map(Into::into).collect(),
        };
        self.select(selection)
    }

    /// Rows matching the current selection
    pub fn view(&self) -> Result<filter::FilteredView> {
        filter::apply(&self.table, &self.selection)
    }

    /// Render with the current local time on the live badge
    pub fn render(&self) -> Result<DashboardFrame> {
        self.render_at(Local::now().naive_local())
    }

    /// Render with a fixed time on the live badge
    pub fn render_at(&self, now: NaiveDateTime) -> Result<DashboardFrame> {
        let start = Instant::now();
        let view = self.view()?;

        let (metrics, charts) = rayon::join(
            || metrics::summarize(view.table()),
            || charts::project(view.table()),
        );

        debug!(
            "Rendered {} of {} rows in {:?}",
            view.num_rows(),
            view.source_rows(),
            start.elapsed()
        );

        Ok(DashboardFrame {
            selection: self.selection.clone(),
            counter_frames: metrics.counter_frames(self.counter_steps),
            metrics,
            charts,
            indicator: LiveIndicator::at(now),
        })
    }

    /// Swap in a fresh table from `source`
    ///
    /// Selected values that no longer occur are dropped. On failure the
    /// session keeps its current snapshot.
    pub async fn reload<S: TableSource>(&mut self, source: &S) -> Result<()> {
        let table = source.load().await?;
        self.selection = self.selection.restricted_to(&table);
        self.table = Arc::new(table);
        info!("Session reloaded with {} rows", self.table.num_rows());
        Ok(())
    }
}
