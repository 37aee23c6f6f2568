//! Descriptive statistics over plain `f64` samples.

use serde::Serialize;
use statrs::statistics::Statistics;

/// Mean, median and sample standard deviation of one sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (Bessel's correction); NaN below two values.
    pub std: f64,
}

impl MetricStats {
    /// Value of a statistic by its column suffix.
    pub fn get(&self, statistic: &str) -> Option<f64> {
        match statistic {
            "mean" => Some(self.mean),
            "median" => Some(self.median),
            "std" => Some(self.std),
            _ => None,
        }
    }
}

/// Compute descriptive statistics. An empty sample yields NaN everywhere.
pub fn describe(values: &[f64]) -> MetricStats {
    let sorted = sorted_copy(values);
    MetricStats {
        count: values.len(),
        mean: values.iter().mean(),
        median: median_of_sorted(&sorted),
        std: values.iter().std_dev(),
    }
}

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        f64::NAN
    } else if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

/// Percentile using linear interpolation (NumPy compatible).
pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
    let n = sorted_values.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return sorted_values[0];
    }

    let rank = (p / 100.0) * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (rank.ceil() as usize).min(n - 1);
    let frac = rank - lower as f64;

    if lower == upper {
        sorted_values[lower]
    } else {
        sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
    }
}

/// Five-number summary for a box plot. Whiskers reach the most extreme
/// samples within 1.5 IQR of the quartiles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoxSummary {
    pub count: usize,
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
}

pub fn box_summary(values: &[f64]) -> Option<BoxSummary> {
    if values.is_empty() {
        return None;
    }
    let sorted = sorted_copy(values);
    let q1 = percentile(&sorted, 25.0);
    let q3 = percentile(&sorted, 75.0);
    let iqr = q3 - q1;
    let low_fence = q1 - 1.5 * iqr;
    let high_fence = q3 + 1.5 * iqr;

    let lower_whisker = sorted
        .iter()
        .copied()
        .find(|v| *v >= low_fence)
        .unwrap_or(q1);
    let upper_whisker = sorted
        .iter()
        .rev()
        .copied()
        .find(|v| *v <= high_fence)
        .unwrap_or(q3);

    Some(BoxSummary {
        count: sorted.len(),
        lower_whisker,
        q1,
        median: median_of_sorted(&sorted),
        q3,
        upper_whisker,
    })
}
