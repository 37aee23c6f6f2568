use thiserror::Error;

// ---------------------------------------------------------------------------
// Pipeline errors
// ---------------------------------------------------------------------------

/// Every failure the pipeline can report.
///
/// Payloads are plain strings so results (including failures) can be held in
/// the memo tables and cloned out on a cache hit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DashboardError {
    /// Unknown region identifier.
    #[error("No file mapping found for region: {0}")]
    Configuration(String),

    /// Backing file absent from every candidate directory.
    #[error("File not found: {file} (searched: {searched})")]
    NotFound { file: String, searched: String },

    /// File could not be read or parsed.
    #[error("Error loading {file}: {reason}")]
    Parse { file: String, reason: String },

    /// An expected column is missing; only the affected view degrades.
    #[error("Column '{0}' not found in data")]
    SchemaGap(String),

    /// Nothing to show: no region loaded, or a requested column is unavailable.
    #[error("{0}")]
    EmptyResult(String),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
