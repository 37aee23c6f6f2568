use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;

use crate::error::DashboardError;

pub const TIMESTAMP_COLUMN: &str = "Timestamp";
/// Tag column added by the loader; never present in a source file.
pub const REGION_COLUMN: &str = "Region";
pub const CLEANING_COLUMN: &str = "Cleaning";

// ---------------------------------------------------------------------------
// CellValue – a single cell of an unrecognised column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value inferred from CSV text.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl CellValue {
    /// Infer the value type of a raw CSV field.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
        if s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false") {
            return CellValue::Bool(s.eq_ignore_ascii_case("true"));
        }
        CellValue::String(s.to_string())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// Region – the closed set of measurement sites
// ---------------------------------------------------------------------------

/// Measurement sites. Variant order is the alphabetical order of the labels,
/// which is the group-key order of the summary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    Benin,
    SierraLeone,
    Togo,
}

impl Region {
    pub const ALL: [Region; 3] = [Region::Benin, Region::SierraLeone, Region::Togo];

    /// Human-readable label; also the value stamped on every row.
    pub fn label(self) -> &'static str {
        match self {
            Region::Benin => "Benin (Malanville)",
            Region::SierraLeone => "Sierra Leone (Bumbuna)",
            Region::Togo => "Togo (Dapaong QC)",
        }
    }

    /// Backing file name under the data directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Region::Benin => "benin_clean.csv",
            Region::SierraLeone => "sierra_leone_clean.csv",
            Region::Togo => "togo_clean.csv",
        }
    }

    fn short_key(self) -> &'static str {
        match self {
            Region::Benin => "benin",
            Region::SierraLeone => "sierra_leone",
            Region::Togo => "togo",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Region {
    type Err = DashboardError;

    /// Accepts the full label, the file stem or the short key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Region::ALL
            .into_iter()
            .find(|r| {
                r.label() == wanted
                    || r.short_key().eq_ignore_ascii_case(wanted)
                    || r.file_name()
                        .trim_end_matches(".csv")
                        .eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| DashboardError::Configuration(wanted.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Metric – measurement columns the pipeline depends on
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    /// Global horizontal irradiance; drives the daytime filter and sorting.
    Ghi,
    /// Direct normal irradiance.
    Dni,
    /// Diffuse horizontal irradiance.
    Dhi,
    /// Ambient temperature.
    Tamb,
    /// Module A temperature.
    TModA,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Ghi,
        Metric::Dni,
        Metric::Dhi,
        Metric::Tamb,
        Metric::TModA,
    ];

    pub fn column(self) -> &'static str {
        match self {
            Metric::Ghi => "GHI",
            Metric::Dni => "DNI",
            Metric::Dhi => "DHI",
            Metric::Tamb => "Tamb",
            Metric::TModA => "TModA",
        }
    }

    pub fn from_column(name: &str) -> Option<Self> {
        Metric::ALL.into_iter().find(|m| m.column() == name)
    }
}

// ---------------------------------------------------------------------------
// MeasurementRow – one timestamped observation
// ---------------------------------------------------------------------------

/// One row of a region file. Known metrics are typed fields; every other
/// source column lives in `extra`.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementRow {
    pub timestamp: Option<NaiveDateTime>,
    pub region: Region,
    pub ghi: Option<f64>,
    pub dni: Option<f64>,
    pub dhi: Option<f64>,
    pub tamb: Option<f64>,
    pub tmod_a: Option<f64>,
    pub extra: BTreeMap<String, CellValue>,
}

impl MeasurementRow {
    pub fn new(region: Region) -> Self {
        Self {
            timestamp: None,
            region,
            ghi: None,
            dni: None,
            dhi: None,
            tamb: None,
            tmod_a: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Ghi => self.ghi,
            Metric::Dni => self.dni,
            Metric::Dhi => self.dhi,
            Metric::Tamb => self.tamb,
            Metric::TModA => self.tmod_a,
        }
    }

    pub fn metric_mut(&mut self, metric: Metric) -> &mut Option<f64> {
        match metric {
            Metric::Ghi => &mut self.ghi,
            Metric::Dni => &mut self.dni,
            Metric::Dhi => &mut self.dhi,
            Metric::Tamb => &mut self.tamb,
            Metric::TModA => &mut self.tmod_a,
        }
    }

    /// Numeric value of any column, known or extra. `None` for nulls and
    /// non-numeric cells.
    pub fn number(&self, column: &str) -> Option<f64> {
        match Metric::from_column(column) {
            Some(m) => self.metric(m),
            None => self.extra.get(column).and_then(CellValue::as_f64),
        }
    }

    /// Cell view of an extra column; missing columns read as null.
    pub fn extra_cell(&self, column: &str) -> &CellValue {
        self.extra.get(column).unwrap_or(&CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// Dataset – rows plus column index
// ---------------------------------------------------------------------------

/// Inferred column type, mirroring the dtype a dataframe would assign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Timestamp,
    Numeric,
    Boolean,
    Text,
}

/// Ordered rows with their column names and pre-computed column kinds.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    pub rows: Vec<MeasurementRow>,
    /// Column names in source order (union in first-seen order after concat).
    pub columns: Vec<String>,
    pub kinds: BTreeMap<String, ColumnKind>,
}

impl Dataset {
    /// Build the column index from the given columns and rows.
    pub fn new(columns: Vec<String>, rows: Vec<MeasurementRow>) -> Self {
        let kinds = columns
            .iter()
            .map(|c| (c.clone(), infer_kind(c, &rows)))
            .collect();
        Dataset {
            rows,
            columns,
            kinds,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn kind(&self, column: &str) -> Option<ColumnKind> {
        self.kinds.get(column).copied()
    }

    /// Distinct regions in order of first appearance.
    pub fn regions(&self) -> Vec<Region> {
        let mut seen = Vec::new();
        for row in &self.rows {
            if !seen.contains(&row.region) {
                seen.push(row.region);
            }
        }
        seen
    }

    /// Rows satisfying `keep`, with the column set unchanged.
    pub fn filter_rows(&self, keep: impl Fn(&MeasurementRow) -> bool) -> Dataset {
        let rows = self.rows.iter().filter(|r| keep(r)).cloned().collect();
        Dataset::new(self.columns.clone(), rows)
    }

    /// Concatenate datasets in order. The column set is the union in
    /// first-seen order; rows lacking a column read as null for it.
    pub fn concat<'a>(parts: impl IntoIterator<Item = &'a Dataset>) -> Dataset {
        let mut columns: Vec<String> = Vec::new();
        let mut rows = Vec::new();
        for part in parts {
            for col in &part.columns {
                if !columns.contains(col) {
                    columns.push(col.clone());
                }
            }
            rows.extend(part.rows.iter().cloned());
        }
        Dataset::new(columns, rows)
    }
}

fn infer_kind(column: &str, rows: &[MeasurementRow]) -> ColumnKind {
    if column == TIMESTAMP_COLUMN {
        return ColumnKind::Timestamp;
    }
    if column == REGION_COLUMN {
        return ColumnKind::Text;
    }
    if Metric::from_column(column).is_some() {
        return ColumnKind::Numeric;
    }

    let mut kind: Option<ColumnKind> = None;
    for row in rows {
        let cell_kind = match row.extra_cell(column) {
            CellValue::Null => continue,
            CellValue::Integer(_) | CellValue::Float(_) => ColumnKind::Numeric,
            CellValue::Bool(_) => ColumnKind::Boolean,
            CellValue::String(_) => return ColumnKind::Text,
        };
        match kind {
            None => kind = Some(cell_kind),
            Some(k) if k != cell_kind => return ColumnKind::Text,
            Some(_) => {}
        }
    }
    // An all-null column reads as floating point.
    kind.unwrap_or(ColumnKind::Numeric)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(region: Region, ghi: Option<f64>) -> MeasurementRow {
        let mut r = MeasurementRow::new(region);
        r.ghi = ghi;
        r
    }

    #[test]
    fn test_cell_value_inference() {
        assert_eq!(CellValue::parse(""), CellValue::Null);
        assert_eq!(CellValue::parse(" 42 "), CellValue::Integer(42));
        assert_eq!(CellValue::parse("3.5"), CellValue::Float(3.5));
        assert_eq!(CellValue::parse("True"), CellValue::Bool(true));
        assert_eq!(CellValue::parse("north"), CellValue::String("north".into()));
    }

    #[test]
    fn test_region_parsing() {
        assert_eq!("Benin (Malanville)".parse::<Region>(), Ok(Region::Benin));
        assert_eq!("sierra_leone".parse::<Region>(), Ok(Region::SierraLeone));
        assert_eq!("TOGO_CLEAN".parse::<Region>(), Ok(Region::Togo));
        assert_eq!(
            "Atlantis".parse::<Region>(),
            Err(DashboardError::Configuration("Atlantis".into()))
        );
    }

    #[test]
    fn test_region_order_follows_labels() {
        let mut labels: Vec<&str> = Region::ALL.iter().map(|r| r.label()).collect();
        labels.sort();
        let ordered: Vec<&str> = Region::ALL.iter().map(|r| r.label()).collect();
        assert_eq!(labels, ordered);
    }

    #[test]
    fn test_concat_unions_columns_in_first_seen_order() {
        let mut a_row = row(Region::Benin, Some(1.0));
        a_row.extra.insert("RH".into(), CellValue::Float(40.0));
        let a = Dataset::new(
            vec!["GHI".into(), "RH".into(), REGION_COLUMN.into()],
            vec![a_row],
        );

        let mut b_row = row(Region::Togo, Some(2.0));
        b_row.extra.insert("WS".into(), CellValue::Integer(3));
        let b = Dataset::new(
            vec!["GHI".into(), "WS".into(), REGION_COLUMN.into()],
            vec![b_row],
        );

        let combined = Dataset::concat(&[a, b]);
        assert_eq!(combined.columns, vec!["GHI", "RH", "Region", "WS"]);
        assert_eq!(combined.len(), 2);
        assert_eq!(combined.rows[1].number("RH"), None);
        assert_eq!(combined.rows[0].number("WS"), None);
        assert_eq!(combined.kind("WS"), Some(ColumnKind::Numeric));
        assert_eq!(combined.regions(), vec![Region::Benin, Region::Togo]);
    }

    #[test]
    fn test_kind_inference_for_extras() {
        let mut r1 = MeasurementRow::new(Region::Benin);
        r1.extra.insert("Cleaning".into(), CellValue::Bool(false));
        r1.extra.insert("Note".into(), CellValue::String("ok".into()));
        r1.extra.insert("Mixed".into(), CellValue::Integer(1));
        let mut r2 = MeasurementRow::new(Region::Benin);
        r2.extra.insert("Mixed".into(), CellValue::Bool(true));

        let ds = Dataset::new(
            vec![
                "Cleaning".into(),
                "Note".into(),
                "Mixed".into(),
                "Empty".into(),
                TIMESTAMP_COLUMN.into(),
            ],
            vec![r1, r2],
        );
        assert_eq!(ds.kind("Cleaning"), Some(ColumnKind::Boolean));
        assert_eq!(ds.kind("Note"), Some(ColumnKind::Text));
        assert_eq!(ds.kind("Mixed"), Some(ColumnKind::Text));
        assert_eq!(ds.kind("Empty"), Some(ColumnKind::Numeric));
        assert_eq!(ds.kind(TIMESTAMP_COLUMN), Some(ColumnKind::Timestamp));
        assert_eq!(ds.kind("Missing"), None);
    }
}
