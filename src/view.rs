use chrono::NaiveDateTime;
use serde::Serialize;

use crate::color::{to_hex, RegionColors};
use crate::data::model::Dataset;
use crate::data::timeseries::TimeSeries;
use crate::error::{DashboardError, Result};
use crate::stats::descriptive::{box_summary, BoxSummary};
use crate::stats::summary::{SummaryTable, STATISTICS};

/// Box-plot charts drawn from the display subset: (column, title).
pub const DISTRIBUTION_CHARTS: [(&str, &str); 2] = [
    ("GHI", "Global Horizontal Irradiance (GHI)"),
    ("DNI", "Direct Normal Irradiance (DNI)"),
];

pub const IRRADIANCE_UNIT: &str = "W/m²";

// ---------------------------------------------------------------------------
// Distribution (box plot) chart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionBox {
    pub region: String,
    pub color: String,
    #[serde(flatten)]
    pub summary: BoxSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionChart {
    pub metric: String,
    pub title: String,
    pub unit: String,
    pub boxes: Vec<RegionBox>,
}

/// One box per region (first-appearance order) of `metric`'s non-null values.
pub fn distribution_chart(
    dataset: &Dataset,
    metric: &str,
    title: &str,
    colors: &RegionColors,
) -> Result<DistributionChart> {
    if !dataset.has_column(metric) {
        return Err(DashboardError::SchemaGap(metric.to_string()));
    }
    let boxes = dataset
        .regions()
        .into_iter()
        .filter_map(|region| {
            let values: Vec<f64> = dataset
                .rows
                .iter()
                .filter(|r| r.region == region)
                .filter_map(|r| r.number(metric))
                .collect();
            box_summary(&values).map(|summary| RegionBox {
                region: region.label().to_string(),
                color: to_hex(colors.color_for(region)),
                summary,
            })
        })
        .collect();

    Ok(DistributionChart {
        metric: metric.to_string(),
        title: title.to_string(),
        unit: IRRADIANCE_UNIT.to_string(),
        boxes,
    })
}

// ---------------------------------------------------------------------------
// Summary table
// ---------------------------------------------------------------------------

/// Display strings for the summary table, already ranked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Format every statistic to two decimals. Row order is taken from `table`,
/// which is ranked on the raw values.
pub fn format_summary(table: &SummaryTable) -> FormattedTable {
    let rows = table
        .rows
        .iter()
        .map(|row| {
            let mut cells = vec![row.region.label().to_string()];
            for stats in &row.stats {
                cells.extend(
                    STATISTICS
                        .iter()
                        .filter_map(|stat| stats.get(stat))
                        .map(|v| format!("{v:.2}")),
                );
            }
            cells
        })
        .collect();
    FormattedTable {
        columns: table.column_names(),
        rows,
    }
}

// ---------------------------------------------------------------------------
// Time-series chart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartLine {
    pub region: String,
    pub color: String,
    pub points: Vec<(NaiveDateTime, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesChart {
    pub metric: String,
    pub title: String,
    pub lines: Vec<ChartLine>,
}

pub fn time_series_chart(series: &TimeSeries, colors: &RegionColors) -> TimeSeriesChart {
    TimeSeriesChart {
        metric: series.metric.clone(),
        title: format!("{} Over Time", series.metric),
        lines: series
            .lines
            .iter()
            .map(|line| ChartLine {
                region: line.region.label().to_string(),
                color: to_hex(colors.color_for(line.region)),
                points: line.points.clone(),
            })
            .collect(),
    }
}
