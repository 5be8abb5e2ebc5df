//! Animated scatter of admissions over time.
//!
//! The animation has one frame per distinct admission date, in ascending
//! order. Every point records the index of the frame it belongs to.

use chrono::NaiveDateTime;
use itertools::Itertools;
use serde::Serialize;

use super::{group_in_order, rows};
use crate::models::HospitalTable;

/// One admission in the scatter plot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScatterPoint {
    /// Animation group: the same patient is tracked across frames
    pub patient_id: Option<String>,
    /// X: admission date (also the frame key)
    pub admission_date: NaiveDateTime,
    /// Y: age
    pub age: i64,
    /// Marker size, equal to the age
    pub size: i64,
    /// Index into [`AnimatedScatter::frames`]
    pub frame: usize,
}

/// Points of one department, in row order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScatterSeries {
    /// Department (marker colour)
    pub department: String,
    /// Points of this department
    pub points: Vec<ScatterPoint>,
}

/// Scatter data with its animation frame sequence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnimatedScatter {
    /// Sorted distinct admission dates; one animation frame each
    pub frames: Vec<NaiveDateTime>,
    /// One series per department, in order of first appearance
    pub series: Vec<ScatterSeries>,
}

impl AnimatedScatter {
    /// Whether there is nothing to plot
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Points shown in one frame, with their department
    pub fn frame_points(&self, frame: usize) -> impl Iterator<Item = (&str, &ScatterPoint)> {
        self.series.iter().flat_map(move |series| {
            series
                .points
                .iter()
                .filter(move |point| point.frame == frame)
                .map(move |point| (series.department.as_str(), point))
        })
    }
}

/// Build the animated scatter data for a view
#[must_use]
pub fn animated_scatter(view: &HospitalTable) -> AnimatedScatter {
    let plottable: Vec<_> = rows(view)
        .filter_map(|row| {
            Some((
                row.department?,
                (row.patient_id, row.admission_date?, row.age?),
            ))
        })
        .collect();

    let frames: Vec<NaiveDateTime> = plottable
        .iter()
        .map(|(_, (_, date, _))| *date)
        .sorted()
        .dedup()
        .collect();

    let series = group_in_order(plottable)
        .into_iter()
        .map(|(department, points)| ScatterSeries {
            department: department.to_string(),
            points: points
                .into_iter()
                .map(|(patient_id, admission_date, age)| ScatterPoint {
                    patient_id: patient_id.map(str::to_string),
                    admission_date,
                    age,
                    size: age,
                    frame: frames.binary_search(&admission_date).unwrap_or_default(),
                })
                .collect(),
        })
        .collect();

    AnimatedScatter { frames, series }
}
