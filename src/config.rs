use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::filter::DAYTIME_GHI_THRESHOLD;
use crate::data::loader::DEFAULT_DATA_DIRS;
use crate::data::model::Region;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.toml";

/// Memo lifetime for loaded datasets.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

/// Dashboard settings. Every field is optional in the TOML file.
///
/// ```toml
/// data_dirs = ["data", "../data"]
/// cache_ttl_secs = 3600
/// daytime_threshold = 10.0
/// regions = ["Benin (Malanville)", "Togo (Dapaong QC)"]
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    pub data_dirs: Vec<PathBuf>,
    pub cache_ttl_secs: u64,
    pub daytime_threshold: f64,
    /// Initial region selection.
    pub regions: Vec<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dirs: DEFAULT_DATA_DIRS.iter().map(PathBuf::from).collect(),
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            daytime_threshold: DAYTIME_GHI_THRESHOLD,
            regions: Region::ALL.iter().map(|r| r.label().to_string()).collect(),
        }
    }
}

impl DashboardConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

pub fn parse_config(text: &str) -> Result<DashboardConfig> {
    toml::from_str(text).context("parsing dashboard config")
}

/// Load `path`, or `dashboard.toml` if present, or fall back to defaults.
/// An explicitly named file must exist.
pub fn load_config(path: Option<&Path>) -> Result<DashboardConfig> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default.is_file() {
                log::debug!("no {DEFAULT_CONFIG_FILE}, using default settings");
                return Ok(DashboardConfig::default());
            }
            default
        }
    };
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config = parse_config(&text).with_context(|| format!("in {}", path.display()))?;
    log::info!("Loaded settings from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = DashboardConfig::default();
        assert_eq!(cfg.data_dirs, vec![PathBuf::from("data"), PathBuf::from("../data")]);
        assert_eq!(cfg.cache_ttl(), Duration::from_secs(3600));
        assert_eq!(cfg.daytime_threshold, 10.0);
        assert_eq!(cfg.regions.len(), 3);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let cfg = parse_config("cache_ttl_secs = 60\nregions = [\"togo\"]\n").unwrap();
        assert_eq!(cfg.cache_ttl_secs, 60);
        assert_eq!(cfg.regions, vec!["togo"]);
        assert_eq!(cfg.daytime_threshold, DAYTIME_GHI_THRESHOLD);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(parse_config("treshold = 5.0\n").is_err());
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn test_explicit_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.toml");
        std::fs::write(&path, "data_dirs = [\"/srv/solar\"]\ndaytime_threshold = 20.0\n").unwrap();
        let cfg = load_config(Some(&path)).unwrap();
        assert_eq!(cfg.data_dirs, vec![PathBuf::from("/srv/solar")]);
        assert_eq!(cfg.daytime_threshold, 20.0);
    }
}
