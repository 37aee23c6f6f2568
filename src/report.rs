//! Plain-text rendering of a [`DashboardView`].

use std::fmt::Write;

use crate::state::{DashboardView, Notice, NoticeLevel, Section};
use crate::view::{DistributionChart, FormattedTable, TimeSeriesChart};

pub fn render(view: &DashboardView) -> String {
    let mut out = String::new();

    heading(&mut out, "Solar Irradiance Dashboard");
    notices(&mut out, view, Section::Data);
    if view.halted {
        return out;
    }
    if !view.columns.is_empty() {
        let _ = writeln!(out, "Columns in dataset: {}", view.columns.join(", "));
    }

    heading(&mut out, "Solar Irradiance Comparison (daytime)");
    notices(&mut out, view, Section::Irradiance);
    for chart in &view.distributions {
        distribution(&mut out, chart);
    }

    heading(&mut out, "Top Regions Summary");
    notices(&mut out, view, Section::Summary);
    if let Some(table) = &view.summary {
        summary_table(&mut out, table);
    }
    if let Some(mean) = view.overall_ghi_mean {
        let _ = writeln!(out, "Overall GHI mean: {mean:.2} W/m²");
    }

    heading(&mut out, "Time Series Viewer");
    notices(&mut out, view, Section::TimeSeries);
    if !view.metric_options.is_empty() {
        let _ = writeln!(out, "Metrics: {}", view.metric_options.join(", "));
    }
    if let Some(chart) = &view.time_series {
        time_series(&mut out, chart);
    }
    out
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n== {title} ==");
}

fn notices(out: &mut String, view: &DashboardView, section: Section) {
    for Notice { level, message, .. } in view.notices_in(section) {
        let tag = match level {
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        let _ = writeln!(out, "[{tag}] {message}");
    }
}

fn distribution(out: &mut String, chart: &DistributionChart) {
    let _ = writeln!(out, "{} ({})", chart.title, chart.unit);
    for b in &chart.boxes {
        let s = &b.summary;
        let _ = writeln!(
            out,
            "  {:<24} n={:<6} whiskers {:.2}..{:.2}  q1 {:.2}  median {:.2}  q3 {:.2}",
            b.region, s.count, s.lower_whisker, s.upper_whisker, s.q1, s.median, s.q3
        );
    }
}

/// Left-aligned first column, right-aligned numbers.
pub fn summary_table(out: &mut String, table: &FormattedTable) {
    let widths: Vec<usize> = (0..table.columns.len())
        .map(|i| {
            table
                .rows
                .iter()
                .filter_map(|r| r.get(i))
                .map(|c| c.chars().count())
                .chain(std::iter::once(table.columns[i].chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (cell, &w))| {
                if i == 0 {
                    format!("{cell:<w$}")
                } else {
                    format!("{cell:>w$}")
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
    };

    let _ = writeln!(out, "{}", line(&table.columns));
    for row in &table.rows {
        let _ = writeln!(out, "{}", line(row));
    }
}

fn time_series(out: &mut String, chart: &TimeSeriesChart) {
    let _ = writeln!(out, "{}", chart.title);
    for l in &chart.lines {
        let (Some(first), Some(last)) = (l.points.first(), l.points.last()) else {
            let _ = writeln!(out, "  {:<24} no points", l.region);
            continue;
        };
        let min = l.points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
        let max = l.points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
        let _ = writeln!(
            out,
            "  {:<24} {} points  {} .. {}  range {:.2}..{:.2}",
            l.region,
            l.points.len(),
            first.0,
            last.0,
            min,
            max
        );
    }
}
