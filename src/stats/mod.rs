//! Statistics: descriptive measures and the per-region summary table.

pub mod descriptive;
pub mod summary;
