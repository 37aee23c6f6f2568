use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::model::{
    CellValue, Dataset, MeasurementRow, Metric, Region, REGION_COLUMN, TIMESTAMP_COLUMN,
};
use crate::cache::{Clock, Memo};
use crate::error::{DashboardError, Result};

/// Candidate base directories, tried in order: project root, then one level
/// up for runs started from a subdirectory.
pub const DEFAULT_DATA_DIRS: [&str; 2] = ["data", "../data"];

const DATETIME_FORMATS: [&str; 8] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

// ---------------------------------------------------------------------------
// Loader with per-region memo
// ---------------------------------------------------------------------------

/// Resolves regions to files and reads them, memoizing each region's outcome.
pub struct DatasetLoader {
    search_dirs: Vec<PathBuf>,
    cache: Memo<Region, Result<Arc<Dataset>>>,
}

impl DatasetLoader {
    pub fn new(search_dirs: Vec<PathBuf>, ttl: Duration) -> Self {
        Self {
            search_dirs,
            cache: Memo::new(ttl),
        }
    }

    pub fn with_clock(search_dirs: Vec<PathBuf>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            search_dirs,
            cache: Memo::with_clock(ttl, clock),
        }
    }

    pub fn load_region(&self, region: Region) -> Result<Arc<Dataset>> {
        self.cache
            .get_or_compute(region, || self.read_region(region).map(Arc::new))
    }

    fn read_region(&self, region: Region) -> Result<Dataset> {
        let path = resolve_path(region.file_name(), &self.search_dirs)?;
        let dataset = read_region_csv(&path, region)?;
        log::info!(
            "Loaded {} with {} rows and columns: {}",
            region.file_name(),
            dataset.len(),
            dataset.columns.join(", ")
        );
        Ok(dataset)
    }
}

// ---------------------------------------------------------------------------
// Path resolution
// ---------------------------------------------------------------------------

/// First existing `<dir>/<file_name>` among `search_dirs`.
pub fn resolve_path(file_name: &str, search_dirs: &[PathBuf]) -> Result<PathBuf> {
    search_dirs
        .iter()
        .map(|dir| dir.join(file_name))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| DashboardError::NotFound {
            file: file_name.to_string(),
            searched: search_dirs
                .iter()
                .map(|d| d.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
        })
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one observation per record.
/// `Timestamp` is parsed into a date-time (unparseable → null), known metric
/// columns into typed fields, everything else into `extra`. Every row is
/// stamped with `region`.
pub fn read_region_csv(path: &Path, region: Region) -> Result<Dataset> {
    let file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let parse_err = |reason: String| DashboardError::Parse {
        file: file.clone(),
        reason,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(|e| parse_err(e.to_string()))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| parse_err(e.to_string()))?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if h.is_empty() {
                format!("Unnamed: {i}")
            } else {
                h.to_string()
            }
        })
        .collect();
    if headers.is_empty() {
        return Err(parse_err("no columns to parse from file".into()));
    }

    let mut rows = Vec::new();
    let mut bad_timestamps = 0usize;
    let mut bad_numbers = 0usize;

    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| parse_err(format!("row {row_no}: {e}")))?;
        if record.len() > headers.len() {
            return Err(parse_err(format!(
                "row {row_no}: expected {} fields, saw {}",
                headers.len(),
                record.len()
            )));
        }

        let mut row = MeasurementRow::new(region);
        for (col_idx, name) in headers.iter().enumerate() {
            let raw = record.get(col_idx).unwrap_or("");
            if name == TIMESTAMP_COLUMN {
                row.timestamp = parse_timestamp(raw);
                if row.timestamp.is_none() && !raw.trim().is_empty() {
                    bad_timestamps += 1;
                }
            } else if name == REGION_COLUMN {
                // Overwritten by the region tag.
                continue;
            } else if let Some(metric) = Metric::from_column(name) {
                let cell = CellValue::parse(raw);
                let value = cell.as_f64();
                if value.is_none() && !cell.is_null() {
                    bad_numbers += 1;
                }
                *row.metric_mut(metric) = value;
            } else {
                row.extra.insert(name.clone(), CellValue::parse(raw));
            }
        }
        rows.push(row);
    }

    if bad_timestamps > 0 || bad_numbers > 0 {
        log::debug!(
            "{file}: coerced {bad_timestamps} timestamps and {bad_numbers} metric values to null"
        );
    }

    let mut columns = headers;
    if !columns.iter().any(|c| c == REGION_COLUMN) {
        columns.push(REGION_COLUMN.to_string());
    }
    Ok(Dataset::new(columns, rows))
}

/// Parse a timestamp cell; `None` when no known layout matches.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use std::fs;

    const BENIN_CSV: &str = "\
Timestamp,GHI,DNI,DHI,Tamb,TModA,Cleaning,Comments
2021-08-09 00:01,-1.2,-0.2,-1.1,26.2,24.7,0,
2021-08-09 12:00,850.5,600.1,210.0,31.0,45.2,0,
not a date,420.0,300.0,100.0,29.5,38.0,1,wiped
";

    fn data_dir_with(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, body) in files {
            fs::write(dir.path().join(name), body).unwrap();
        }
        dir
    }

    #[test]
    fn test_load_parses_rows_and_tags_region() {
        let dir = data_dir_with(&[("benin_clean.csv", BENIN_CSV)]);
        let loader = DatasetLoader::new(vec![dir.path().to_path_buf()], Duration::from_secs(3600));

        let ds = loader.load_region(Region::Benin).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(
            ds.columns,
            vec!["Timestamp", "GHI", "DNI", "DHI", "Tamb", "TModA", "Cleaning", "Comments", "Region"]
        );
        assert!(ds.rows.iter().all(|r| r.region == Region::Benin));
        assert_eq!(ds.rows[1].ghi, Some(850.5));
        assert_eq!(ds.rows[1].tmod_a, Some(45.2));
        assert_eq!(
            ds.rows[0].timestamp,
            NaiveDate::from_ymd_opt(2021, 8, 9).and_then(|d| d.and_hms_opt(0, 1, 0))
        );
        assert_eq!(ds.rows[2].timestamp, None);
        assert_eq!(ds.rows[2].extra_cell("Comments"), &CellValue::String("wiped".into()));
    }

    #[test]
    fn test_second_candidate_directory_is_used() {
        let dir = data_dir_with(&[("togo_clean.csv", "Timestamp,GHI\n2022-01-01 10:00,500\n")]);
        let missing = dir.path().join("nope");
        let loader = DatasetLoader::new(
            vec![missing, dir.path().to_path_buf()],
            Duration::from_secs(3600),
        );
        assert_eq!(loader.load_region(Region::Togo).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let loader = DatasetLoader::new(vec![dir.path().to_path_buf()], Duration::from_secs(3600));
        match loader.load_region(Region::SierraLeone) {
            Err(DashboardError::NotFound { file, .. }) => {
                assert_eq!(file, "sierra_leone_clean.csv")
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = data_dir_with(&[("benin_clean.csv", "Timestamp,GHI\n2021-01-01,1,2,3\n")]);
        let loader = DatasetLoader::new(vec![dir.path().to_path_buf()], Duration::from_secs(3600));
        assert!(matches!(
            loader.load_region(Region::Benin),
            Err(DashboardError::Parse { .. })
        ));
    }

    #[test]
    fn test_empty_file_is_parse_error() {
        let dir = data_dir_with(&[("benin_clean.csv", "")]);
        let loader = DatasetLoader::new(vec![dir.path().to_path_buf()], Duration::from_secs(3600));
        assert!(matches!(
            loader.load_region(Region::Benin),
            Err(DashboardError::Parse { .. })
        ));
    }

    #[test]
    fn test_reload_within_ttl_is_served_from_cache() {
        let dir = data_dir_with(&[("benin_clean.csv", BENIN_CSV)]);
        let clock = Arc::new(ManualClock::new());
        let loader = DatasetLoader::with_clock(
            vec![dir.path().to_path_buf()],
            Duration::from_secs(3600),
            clock.clone(),
        );

        let first = loader.load_region(Region::Benin).unwrap();
        fs::remove_file(dir.path().join("benin_clean.csv")).unwrap();
        let second = loader.load_region(Region::Benin).unwrap();
        assert_eq!(first.len(), second.len());
        assert_eq!(first.columns, second.columns);

        clock.advance(Duration::from_secs(3600));
        assert!(matches!(
            loader.load_region(Region::Benin),
            Err(DashboardError::NotFound { .. })
        ));
    }

    #[test]
    fn test_timestamp_layouts() {
        let expected = NaiveDate::from_ymd_opt(2021, 8, 9).and_then(|d| d.and_hms_opt(13, 5, 0));
        assert_eq!(parse_timestamp("2021-08-09 13:05:00"), expected);
        assert_eq!(parse_timestamp("2021-08-09T13:05"), expected);
        assert_eq!(parse_timestamp("2021-08-09T14:05:00+01:00"), expected);
        assert_eq!(
            parse_timestamp("2021-08-09"),
            NaiveDate::from_ymd_opt(2021, 8, 9).and_then(|d| d.and_hms_opt(0, 0, 0))
        );
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp(""), None);
    }
}
