use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::descriptive::{describe, MetricStats};
use crate::data::model::{Dataset, Metric, Region, REGION_COLUMN};
use crate::error::{DashboardError, Result};

/// Metrics summarized per region, in column order.
pub const SUMMARY_METRICS: [&str; 5] = ["GHI", "DNI", "DHI", "Tamb", "TModA"];

/// Statistic suffixes, in column order.
pub const STATISTICS: [&str; 3] = ["mean", "median", "std"];

/// Column the table is ranked by, descending.
pub fn sort_column() -> String {
    format!("{}_mean", Metric::Ghi.column())
}

/// One region's statistics, parallel to [`SummaryTable::metrics`].
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub region: Region,
    pub stats: Vec<MetricStats>,
}

/// One row per region, columns `<metric>_<statistic>`.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTable {
    pub metrics: Vec<String>,
    pub rows: Vec<SummaryRow>,
}

impl SummaryTable {
    pub fn column_names(&self) -> Vec<String> {
        let mut names = vec![REGION_COLUMN.to_string()];
        for metric in &self.metrics {
            for stat in STATISTICS {
                names.push(format!("{metric}_{stat}"));
            }
        }
        names
    }
}

#[cfg(test)]
impl SummaryTable {
    fn has_column(&self, column: &str) -> bool {
        self.split_column(column).is_some()
    }

    /// Value of `<metric>_<statistic>` for `region`.
    fn value(&self, region: Region, column: &str) -> Option<f64> {
        let (idx, stat) = self.split_column(column)?;
        let row = self.rows.iter().find(|r| r.region == region)?;
        row.stats.get(idx)?.get(stat)
    }

    /// A column's values, top to bottom.
    fn column_values(&self, column: &str) -> Vec<f64> {
        let Some((idx, stat)) = self.split_column(column) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .filter_map(|r| r.stats.get(idx)?.get(stat))
            .collect()
    }

    fn split_column<'a>(&self, column: &'a str) -> Option<(usize, &'a str)> {
        let (metric, stat) = column.rsplit_once('_')?;
        if !STATISTICS.contains(&stat) {
            return None;
        }
        let idx = self.metrics.iter().position(|m| m == metric)?;
        Some((idx, stat))
    }
}

/// Group `dataset` by region and compute mean/median/std of every candidate
/// metric present as a column. Nulls are skipped.
///
/// Rows are ranked by `GHI_mean` descending when GHI is summarized (NaN
/// last), otherwise left in region order.
pub fn summarize(dataset: &Dataset, candidates: &[&str]) -> Result<SummaryTable> {
    if dataset.is_empty() {
        return Err(DashboardError::EmptyResult(
            "No data available to generate the summary table.".into(),
        ));
    }

    let metrics: Vec<String> = candidates
        .iter()
        .filter(|m| dataset.has_column(m))
        .map(|m| m.to_string())
        .collect();
    if metrics.is_empty() {
        return Err(DashboardError::SchemaGap(candidates.join(", ")));
    }

    let mut groups: BTreeMap<Region, Vec<Vec<f64>>> = BTreeMap::new();
    for row in &dataset.rows {
        let samples = groups
            .entry(row.region)
            .or_insert_with(|| vec![Vec::new(); metrics.len()]);
        for (i, metric) in metrics.iter().enumerate() {
            if let Some(v) = row.number(metric) {
                samples[i].push(v);
            }
        }
    }

    let mut rows: Vec<SummaryRow> = groups
        .into_iter()
        .map(|(region, samples)| SummaryRow {
            region,
            stats: samples.iter().map(|s| describe(s)).collect(),
        })
        .collect();

    if let Some(ghi_idx) = metrics.iter().position(|m| m == Metric::Ghi.column()) {
        rows.sort_by(|a, b| descending_nan_last(a.stats[ghi_idx].mean, b.stats[ghi_idx].mean));
    }

    Ok(SummaryTable { metrics, rows })
}

/// Statistics of one metric across every row, regardless of region.
pub fn overall(dataset: &Dataset, metric: &str) -> MetricStats {
    let values: Vec<f64> = dataset.rows.iter().filter_map(|r| r.number(metric)).collect();
    describe(&values)
}

fn descending_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.total_cmp(&a),
    }
}
