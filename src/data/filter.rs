use std::sync::Arc;

use super::model::Dataset;

/// GHI (W/m²) above which an observation counts as daytime.
pub const DAYTIME_GHI_THRESHOLD: f64 = 10.0;

// ---------------------------------------------------------------------------
// Daytime filter
// ---------------------------------------------------------------------------

/// Rows whose GHI strictly exceeds `threshold`. Rows with a null GHI never
/// pass. Whether the GHI column exists at all is the caller's concern.
pub fn daytime_rows(dataset: &Dataset, threshold: f64) -> Dataset {
    dataset.filter_rows(|row| row.ghi.is_some_and(|ghi| ghi > threshold))
}

// ---------------------------------------------------------------------------
// Display policy
// ---------------------------------------------------------------------------

/// The rows the distribution charts and the summary table are drawn from.
#[derive(Debug, Clone)]
pub enum DisplaySubset {
    /// The daytime rows (possibly empty when the input itself was empty).
    Daytime(Arc<Dataset>),
    /// No daytime rows survived, so every row is shown instead.
    AllRows(Arc<Dataset>),
}

impl DisplaySubset {
    pub fn dataset(&self) -> &Arc<Dataset> {
        match self {
            DisplaySubset::Daytime(ds) | DisplaySubset::AllRows(ds) => ds,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, DisplaySubset::AllRows(_))
    }
}

/// Never show a blank page: an empty daytime subset of a non-empty dataset
/// falls back to the full dataset.
pub fn display_subset(full: &Arc<Dataset>, daytime: Dataset) -> DisplaySubset {
    if daytime.is_empty() && !full.is_empty() {
        DisplaySubset::AllRows(Arc::clone(full))
    } else {
        DisplaySubset::Daytime(Arc::new(daytime))
    }
}
