//! Comparative solar irradiance dashboard: per-region CSV datasets are
//! loaded, combined, filtered to daytime and summarized into plot-ready views.

pub mod cache;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod report;
pub mod state;
pub mod stats;
pub mod view;
