use std::sync::Arc;

use serde::Serialize;

use crate::color::RegionColors;
use crate::config::DashboardConfig;
use crate::data::combine::Combiner;
use crate::data::filter::{daytime_rows, display_subset, DisplaySubset};
use crate::data::loader::DatasetLoader;
use crate::data::model::{Dataset, Metric, Region, TIMESTAMP_COLUMN};
use crate::data::timeseries::{default_metric, project, selectable_metrics};
use crate::error::DashboardError;
use crate::stats::summary::{overall, summarize, SUMMARY_METRICS};
use crate::view::{
    distribution_chart, format_summary, time_series_chart, DistributionChart, FormattedTable,
    TimeSeriesChart, DISTRIBUTION_CHARTS, IRRADIANCE_UNIT,
};

// ---------------------------------------------------------------------------
// Notices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Part of the dashboard a notice belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Section {
    Data,
    Irradiance,
    Summary,
    TimeSeries,
}

/// A user-visible message shown in place of (or above) a view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub section: Section,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Dashboard view
// ---------------------------------------------------------------------------

/// Everything one pipeline run produces.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardView {
    pub notices: Vec<Notice>,
    pub selected_regions: Vec<String>,
    /// Zero regions selected; nothing past the prompt was computed.
    pub halted: bool,
    pub row_count: usize,
    pub columns: Vec<String>,
    /// The daytime subset was empty and every row is shown instead.
    pub daytime_fallback: bool,
    pub distributions: Vec<DistributionChart>,
    pub summary: Option<FormattedTable>,
    /// GHI mean over every displayed row, all regions pooled.
    pub overall_ghi_mean: Option<f64>,
    pub metric_options: Vec<String>,
    pub selected_metric: Option<String>,
    pub time_series: Option<TimeSeriesChart>,
}

impl DashboardView {
    fn notify(&mut self, level: NoticeLevel, section: Section, message: impl Into<String>) {
        let message = message.into();
        match level {
            NoticeLevel::Info => log::info!("[{section:?}] {message}"),
            NoticeLevel::Warning => log::warn!("[{section:?}] {message}"),
            NoticeLevel::Error => log::error!("[{section:?}] {message}"),
        }
        self.notices.push(Notice {
            level,
            section,
            message,
        });
    }

    pub fn notices_in(&self, section: Section) -> impl Iterator<Item = &Notice> {
        self.notices.iter().filter(move |n| n.section == section)
    }
}

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

/// User selections plus the memoized data sources. Each [`refresh`] is one
/// full pipeline run: combine → filter → aggregate → views.
///
/// [`refresh`]: DashboardState::refresh
pub struct DashboardState {
    combiner: Combiner,
    threshold: f64,
    colors: RegionColors,
    /// Region labels, in selection order.
    pub selected_regions: Vec<String>,
    /// Time-series metric; `None` picks the first selectable one.
    pub selected_metric: Option<String>,
}

impl DashboardState {
    pub fn new(config: &DashboardConfig) -> Self {
        let ttl = config.cache_ttl();
        let loader = DatasetLoader::new(config.data_dirs.clone(), ttl);
        Self::with_combiner(
            Combiner::new(loader, ttl),
            config.daytime_threshold,
            config.regions.clone(),
        )
    }

    pub fn with_combiner(combiner: Combiner, threshold: f64, regions: Vec<String>) -> Self {
        Self {
            combiner,
            threshold,
            colors: RegionColors::default(),
            selected_regions: regions,
            selected_metric: None,
        }
    }

    pub fn select_regions(&mut self, regions: Vec<String>) {
        self.selected_regions = regions;
    }

    pub fn select_metric(&mut self, metric: Option<String>) {
        self.selected_metric = metric;
    }

    pub fn refresh(&self) -> DashboardView {
        let mut view = DashboardView {
            selected_regions: self.selected_regions.clone(),
            ..Default::default()
        };

        if self.selected_regions.is_empty() {
            view.halted = true;
            view.notify(
                NoticeLevel::Warning,
                Section::Data,
                "Please select at least one region to view data.",
            );
            return view;
        }

        let outcome = self.combiner.combine(&self.selected_regions);
        for err in &outcome.errors {
            view.notify(NoticeLevel::Error, Section::Data, err.to_string());
        }
        let combined = outcome.dataset;
        if combined.is_empty() {
            let files: Vec<&str> = Region::ALL.iter().map(|r| r.file_name()).collect();
            view.notify(
                NoticeLevel::Error,
                Section::Data,
                format!(
                    "Failed to load data for the selected regions. Check that {} exist in 'data/' \
                     and have columns like Timestamp, GHI, DNI.",
                    files.join(", ")
                ),
            );
        } else {
            view.row_count = combined.len();
            view.columns = combined.columns.clone();
            view.notify(
                NoticeLevel::Info,
                Section::Data,
                format!("Data loaded successfully with {} rows.", combined.len()),
            );
        }

        let subset = self.display_rows(&combined, &mut view);
        view.daytime_fallback = subset.is_fallback();
        let display = subset.dataset();

        self.irradiance_section(display, &mut view);
        self.summary_section(display, &mut view);
        self.time_series_section(&combined, &mut view);
        view
    }

    fn display_rows(&self, combined: &Arc<Dataset>, view: &mut DashboardView) -> DisplaySubset {
        let ghi = Metric::Ghi.column();
        if !combined.is_empty() && !combined.has_column(ghi) {
            view.notify(
                NoticeLevel::Warning,
                Section::Irradiance,
                format!(
                    "{}; daytime filter skipped, using all data.",
                    DashboardError::SchemaGap(ghi.to_string())
                ),
            );
            return DisplaySubset::AllRows(Arc::clone(combined));
        }

        let subset = display_subset(combined, daytime_rows(combined, self.threshold));
        if subset.is_fallback() {
            view.notify(
                NoticeLevel::Warning,
                Section::Irradiance,
                format!(
                    "No data points with GHI > {} {IRRADIANCE_UNIT} found. Using all data for plots.",
                    self.threshold
                ),
            );
        }
        subset
    }

    fn irradiance_section(&self, display: &Dataset, view: &mut DashboardView) {
        if display.is_empty() {
            view.notify(
                NoticeLevel::Info,
                Section::Irradiance,
                "No data available for irradiance comparison.",
            );
            return;
        }
        for (metric, title) in DISTRIBUTION_CHARTS {
            match distribution_chart(display, metric, title, &self.colors) {
                Ok(chart) => view.distributions.push(chart),
                Err(e) => view.notify(NoticeLevel::Warning, Section::Irradiance, e.to_string()),
            }
        }
    }

    fn summary_section(&self, display: &Dataset, view: &mut DashboardView) {
        match summarize(display, &SUMMARY_METRICS) {
            Ok(table) => {
                let ghi = Metric::Ghi.column();
                if table.metrics.iter().any(|m| m == ghi) {
                    view.overall_ghi_mean = Some(overall(display, ghi).mean);
                }
                view.summary = Some(format_summary(&table));
            }
            Err(DashboardError::SchemaGap(_)) => view.notify(
                NoticeLevel::Warning,
                Section::Summary,
                "No suitable metrics available for the summary table.",
            ),
            Err(e) => view.notify(NoticeLevel::Info, Section::Summary, e.to_string()),
        }
    }

    fn time_series_section(&self, combined: &Dataset, view: &mut DashboardView) {
        if combined.is_empty() || !combined.has_column(TIMESTAMP_COLUMN) {
            view.notify(
                NoticeLevel::Info,
                Section::TimeSeries,
                "Timestamp column or data not available for time series viewer.",
            );
            return;
        }

        view.metric_options = selectable_metrics(combined);
        let Some(metric) = self
            .selected_metric
            .clone()
            .or_else(|| default_metric(combined))
        else {
            view.notify(
                NoticeLevel::Info,
                Section::TimeSeries,
                "No numeric metrics available for time series plot.",
            );
            return;
        };

        match project(combined, &metric) {
            Ok(series) => view.time_series = Some(time_series_chart(&series, &self.colors)),
            Err(e) => view.notify(NoticeLevel::Warning, Section::TimeSeries, e.to_string()),
        }
        view.selected_metric = Some(metric);
    }
}
