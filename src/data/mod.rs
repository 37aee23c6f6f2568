/// Data layer: core types, loading, combining and filtering.
///
/// Architecture:
/// ```text
///  data/<region>.csv   (one file per region)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  resolve region → file → Dataset (memoized)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ combine   │  concatenate selected regions, skip failures (memoized)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  GHI > threshold → daytime rows, fallback policy
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ timeseries │  selectable metrics → per-region lines
///   └────────────┘
/// ```

pub mod combine;
pub mod filter;
pub mod loader;
pub mod model;
pub mod timeseries;
