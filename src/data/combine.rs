use std::sync::Arc;
use std::time::Duration;

use super::loader::DatasetLoader;
use super::model::{Dataset, Region};
use crate::cache::Memo;
use crate::error::DashboardError;

/// Result of combining several regions.
#[derive(Debug, Clone)]
pub struct CombineOutcome {
    /// Concatenation of every region that loaded with at least one row.
    pub dataset: Arc<Dataset>,
    /// Per-region failures, followed by an `EmptyResult` when nothing loaded.
    pub errors: Vec<DashboardError>,
}

impl CombineOutcome {
    /// True when no region contributed any rows.
    pub fn is_total_failure(&self) -> bool {
        self.dataset.is_empty()
    }
}

/// Loads regions through a [`DatasetLoader`] and concatenates them, memoized
/// by the ordered list of distinct regions.
pub struct Combiner {
    loader: DatasetLoader,
    cache: Memo<Vec<Region>, CombineOutcome>,
}

impl Combiner {
    pub fn new(loader: DatasetLoader, ttl: Duration) -> Self {
        Self {
            loader,
            cache: Memo::new(ttl),
        }
    }

    /// Resolve `labels` to regions and combine them. Any alias of a region
    /// (label, file stem or short key) selects the same region once.
    /// Unknown labels are reported ahead of the load errors.
    pub fn combine(&self, labels: &[String]) -> CombineOutcome {
        let (regions, mut errors) = resolve_labels(labels);
        let mut outcome = self
            .cache
            .get_or_compute(regions.clone(), || combine_with(&self.loader, &regions));
        errors.append(&mut outcome.errors);
        outcome.errors = errors;
        outcome
    }
}

/// Distinct regions in first-selection order, plus one `Configuration`
/// error per label that names no region.
fn resolve_labels(labels: &[String]) -> (Vec<Region>, Vec<DashboardError>) {
    let mut regions: Vec<Region> = Vec::with_capacity(labels.len());
    let mut errors = Vec::new();
    for label in labels {
        match label.parse::<Region>() {
            Ok(region) if !regions.contains(&region) => regions.push(region),
            Ok(_) => {}
            Err(e) => {
                log::warn!("{label}: {e}");
                errors.push(e);
            }
        }
    }
    (regions, errors)
}

/// Load every region once and concatenate the non-empty results. A failing
/// region never prevents its siblings from loading.
pub fn combine_with(loader: &DatasetLoader, regions: &[Region]) -> CombineOutcome {
    let mut parts = Vec::new();
    let mut errors = Vec::new();

    for &region in regions {
        match loader.load_region(region) {
            Ok(ds) if ds.is_empty() => {
                log::warn!("{}: file has no rows, skipping", region.label());
            }
            Ok(ds) => parts.push(ds),
            Err(e) => {
                log::warn!("{}: {e}", region.label());
                errors.push(e);
            }
        }
    }

    if parts.is_empty() {
        let err = DashboardError::EmptyResult("No data loaded for any selected regions.".into());
        log::error!("{err}");
        errors.push(err);
        return CombineOutcome {
            dataset: Arc::new(Dataset::default()),
            errors,
        };
    }

    let dataset = Dataset::concat(parts.iter().map(Arc::as_ref));
    log::info!("Combined data with {} rows.", dataset.len());
    CombineOutcome {
        dataset: Arc::new(dataset),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn write_region(dir: &std::path::Path, region: Region, rows: &[(&str, f64)]) {
        let mut body = String::from("Timestamp,GHI,Tamb\n");
        for (ts, ghi) in rows {
            body.push_str(&format!("{ts},{ghi},25.0\n"));
        }
        fs::write(dir.join(region.file_name()), body).unwrap();
    }

    fn all_regions_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        write_region(dir.path(), Region::Benin, &[("2021-08-09 12:00", 800.0), ("2021-08-09 13:00", 700.0)]);
        write_region(dir.path(), Region::SierraLeone, &[("2021-10-30 12:00", 500.0)]);
        write_region(
            dir.path(),
            Region::Togo,
            &[("2021-10-25 12:00", 900.0), ("2021-10-25 13:00", 5.0), ("2021-10-25 14:00", 0.0)],
        );
        dir
    }

    fn labels(regions: &[Region]) -> Vec<String> {
        regions.iter().map(|r| r.label().to_string()).collect()
    }

    fn combiner(dir: &std::path::Path) -> Combiner {
        let ttl = Duration::from_secs(3600);
        Combiner::new(DatasetLoader::new(vec![PathBuf::from(dir)], ttl), ttl)
    }

    #[test]
    fn test_row_count_is_sum_of_region_counts() {
        let dir = all_regions_dir();
        let c = combiner(dir.path());
        let subsets: Vec<Vec<Region>> = vec![
            vec![Region::Benin],
            vec![Region::SierraLeone],
            vec![Region::Togo],
            vec![Region::Benin, Region::SierraLeone],
            vec![Region::Benin, Region::Togo],
            vec![Region::SierraLeone, Region::Togo],
            Region::ALL.to_vec(),
        ];
        for subset in subsets {
            let expected: usize = subset
                .iter()
                .map(|r| c.loader.load_region(*r).unwrap().len())
                .sum();
            let outcome = c.combine(&labels(&subset));
            assert_eq!(outcome.dataset.len(), expected, "{subset:?}");
            assert!(outcome.errors.is_empty());
            assert!(outcome.dataset.rows.iter().all(|row| subset.contains(&row.region)));
        }
    }

    #[test]
    fn test_rows_follow_selection_order() {
        let dir = all_regions_dir();
        let c = combiner(dir.path());
        let outcome = c.combine(&labels(&[Region::Togo, Region::Benin]));
        assert_eq!(outcome.dataset.regions(), vec![Region::Togo, Region::Benin]);
    }

    #[test]
    fn test_missing_region_does_not_block_siblings() {
        let dir = tempfile::tempdir().unwrap();
        write_region(dir.path(), Region::Benin, &[("2021-08-09 12:00", 800.0)]);
        let c = combiner(dir.path());

        let outcome = c.combine(&labels(&Region::ALL));
        assert_eq!(outcome.dataset.len(), 1);
        assert_eq!(outcome.errors.len(), 2);
        assert!(outcome
            .errors
            .iter()
            .all(|e| matches!(e, DashboardError::NotFound { .. })));
        assert!(!outcome.is_total_failure());
    }

    #[test]
    fn test_single_missing_region_is_total_failure() {
        let dir = tempfile::tempdir().unwrap();
        let c = combiner(dir.path());

        let outcome = c.combine(&labels(&[Region::Togo]));
        assert!(outcome.is_total_failure());
        assert_eq!(outcome.dataset.len(), 0);
        assert!(matches!(
            outcome.errors.last(),
            Some(DashboardError::EmptyResult(_))
        ));
    }

    #[test]
    fn test_header_only_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_region(dir.path(), Region::Benin, &[]);
        write_region(dir.path(), Region::Togo, &[("2021-10-25 12:00", 900.0)]);
        let c = combiner(dir.path());

        let outcome = c.combine(&labels(&[Region::Benin, Region::Togo]));
        assert_eq!(outcome.dataset.regions(), vec![Region::Togo]);
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn test_duplicate_labels_load_once() {
        let dir = all_regions_dir();
        let c = combiner(dir.path());
        let mut selection = labels(&[Region::Benin]);
        selection.push(Region::Benin.label().to_string());
        assert_eq!(c.combine(&selection).dataset.len(), 2);
    }

    #[test]
    fn test_aliases_of_one_region_load_once() {
        let dir = all_regions_dir();
        let c = combiner(dir.path());
        let selection = vec![
            "benin".to_string(),
            Region::Benin.label().to_string(),
            "benin_clean".to_string(),
        ];

        let outcome = c.combine(&selection);
        assert_eq!(outcome.dataset.len(), 2);
        assert_eq!(outcome.dataset.regions(), vec![Region::Benin]);
        assert!(outcome.errors.is_empty());

        let canonical = c.combine(&labels(&[Region::Benin]));
        assert!(Arc::ptr_eq(&outcome.dataset, &canonical.dataset));
    }

    #[test]
    fn test_only_unknown_labels_is_total_failure() {
        let dir = all_regions_dir();
        let c = combiner(dir.path());

        let outcome = c.combine(&["Atlantis".to_string()]);
        assert!(outcome.is_total_failure());
        assert_eq!(
            outcome.errors,
            vec![
                DashboardError::Configuration("Atlantis".into()),
                DashboardError::EmptyResult("No data loaded for any selected regions.".into()),
            ]
        );
    }

    #[test]
    fn test_repeat_selection_hits_cache() {
        let dir = all_regions_dir();
        let c = combiner(dir.path());
        let selection = labels(&[Region::Benin, Region::Togo]);

        let first = c.combine(&selection);
        fs::remove_file(dir.path().join(Region::Togo.file_name())).unwrap();
        let second = c.combine(&selection);
        assert!(Arc::ptr_eq(&first.dataset, &second.dataset));
    }

    #[test]
    fn test_unknown_label_is_reported_and_skipped() {
        let dir = all_regions_dir();
        let c = combiner(dir.path());
        let selection = vec!["Mars (Olympus)".to_string(), Region::Benin.label().to_string()];

        let outcome = c.combine(&selection);
        assert_eq!(outcome.dataset.len(), 2);
        assert_eq!(
            outcome.errors,
            vec![DashboardError::Configuration("Mars (Olympus)".into())]
        );
    }
}
