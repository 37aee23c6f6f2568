use chrono::NaiveDateTime;

use super::model::{ColumnKind, Dataset, Region, CLEANING_COLUMN, REGION_COLUMN, TIMESTAMP_COLUMN};
use crate::error::{DashboardError, Result};

/// Suffix of derived standard-score columns.
pub const ZSCORE_SUFFIX: &str = "_zscore";

/// A single region's line: `(timestamp, value)` points in row order.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesLine {
    pub region: Region,
    pub points: Vec<(NaiveDateTime, f64)>,
}

/// Plot-ready projection of `Timestamp`, `Region` and one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub metric: String,
    pub lines: Vec<SeriesLine>,
}

/// Numeric columns suitable for a raw time-series view, in column order.
pub fn selectable_metrics(dataset: &Dataset) -> Vec<String> {
    dataset
        .columns
        .iter()
        .filter(|c| dataset.kind(c) == Some(ColumnKind::Numeric))
        .filter(|c| c.as_str() != REGION_COLUMN && c.as_str() != CLEANING_COLUMN)
        .filter(|c| !c.ends_with(ZSCORE_SUFFIX))
        .cloned()
        .collect()
}

pub fn default_metric(dataset: &Dataset) -> Option<String> {
    selectable_metrics(dataset).into_iter().next()
}

/// Project `metric` into one line per region (first-appearance order).
///
/// Rows with a null timestamp or value contribute no point. Fails with
/// `SchemaGap` when the dataset has no timestamp column and `EmptyResult`
/// when `metric` is not a selectable column.
pub fn project(dataset: &Dataset, metric: &str) -> Result<TimeSeries> {
    if !dataset.has_column(TIMESTAMP_COLUMN) {
        return Err(DashboardError::SchemaGap(TIMESTAMP_COLUMN.to_string()));
    }
    if !selectable_metrics(dataset).iter().any(|m| m == metric) {
        return Err(DashboardError::EmptyResult(format!(
            "Metric '{metric}' not available for time series plot."
        )));
    }

    let mut lines: Vec<SeriesLine> = dataset
        .regions()
        .into_iter()
        .map(|region| SeriesLine {
            region,
            points: Vec::new(),
        })
        .collect();

    for row in &dataset.rows {
        let (Some(ts), Some(value)) = (row.timestamp, row.number(metric)) else {
            continue;
        };
        if let Some(line) = lines.iter_mut().find(|l| l.region == row.region) {
            line.points.push((ts, value));
        }
    }

    Ok(TimeSeries {
        metric: metric.to_string(),
        lines,
    })
}
