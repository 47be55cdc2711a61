use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize, Serializer};

use crate::headcon::tools::error::{Result, ToolError};

/// Format shared by every record date and every entry of the plot axis.
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// Production period a quantity is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shift {
    Day,
    Night,
    /// The source carried no recognisable shift code.
    #[serde(alias = "")]
    Unknown,
}

/// Provenance of a record. Assigned by the extractor, never inferred later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Manual,
    Database,
}

/// One normalized consumption observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalRecord {
    /// Calendar day in `DD-MM-YYYY` form. Aggregation matches on this string.
    pub date: String,
    pub shift: Shift,
    pub head_type: String,
    pub head_surface: String,
    pub quantity: u32,
    #[serde(rename = "type")]
    pub source: Source,
}

impl CanonicalRecord {
    /// Identity of the series this record contributes to.
    pub fn series_key(&self) -> SeriesKey {
        SeriesKey::new(self.head_type.clone(), self.head_surface.clone())
    }
}

/// Month and year an extraction or aggregation is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPeriod")]
pub struct ReportingPeriod {
    month: u32,
    year: i32,
}

#[derive(Deserialize)]
struct RawPeriod {
    month: u32,
    year: i32,
}

impl TryFrom<RawPeriod> for ReportingPeriod {
    type Error = ToolError;

    fn try_from(raw: RawPeriod) -> Result<Self> {
        ReportingPeriod::new(raw.month, raw.year)
    }
}

impl ReportingPeriod {
    /// Validates that `month`/`year` name a calendar month chrono can represent
    /// together with the month that follows it.
    pub fn new(month: u32, year: i32) -> Result<Self> {
        let period = Self { month, year };
        let (next_month, next_year) = period.following_month();
        let valid = (1..=12).contains(&month)
            && NaiveDate::from_ymd_opt(year, month, 1).is_some()
            && NaiveDate::from_ymd_opt(next_year, next_month, 1).is_some();
        if valid {
            Ok(period)
        } else {
            Err(ToolError::InvalidPeriod { month, year })
        }
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Month and year directly after this period; December rolls into January.
    pub fn following_month(&self) -> (u32, i32) {
        if self.month >= 12 {
            (1, self.year.saturating_add(1))
        } else {
            (self.month + 1, self.year)
        }
    }

    /// Last calendar day of the period.
    pub fn last_day(&self) -> NaiveDate {
        let (next_month, next_year) = self.following_month();
        NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .and_then(|first| first.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// Number of days in the period (28 to 31).
    pub fn day_count(&self) -> u32 {
        self.last_day().day()
    }

    /// Every day of the period in ascending order.
    pub fn days(&self) -> Vec<NaiveDate> {
        (1..=self.day_count())
            .filter_map(|day| NaiveDate::from_ymd_opt(self.year, self.month, day))
            .collect()
    }

    /// Returns `true` when `date` is the first day of the month after the period.
    pub fn is_rollover_date(&self, date: NaiveDate) -> bool {
        let (next_month, next_year) = self.following_month();
        date.day() == 1 && date.month() == next_month && date.year() == next_year
    }
}

impl fmt::Display for ReportingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:04}", self.month, self.year)
    }
}

/// Formats a date the way records and the plot axis carry it.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Identity of one aggregated line: the `(head type, head surface)` pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeriesKey {
    pub head_type: String,
    pub head_surface: String,
}

impl SeriesKey {
    pub fn new(head_type: impl Into<String>, head_surface: impl Into<String>) -> Self {
        Self {
            head_type: head_type.into(),
            head_surface: head_surface.into(),
        }
    }

    /// Display label used by chart consumers, e.g. `AHEAD - TEK (3122)`.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.head_type, self.head_surface)
    }
}

/// Six index-aligned quantity sequences for one series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesBucket {
    #[serde(rename = "manualQty")]
    pub manual_total: Vec<u64>,
    #[serde(rename = "databaseQty")]
    pub database_total: Vec<u64>,
    #[serde(rename = "manualDayQty")]
    pub manual_day: Vec<u64>,
    #[serde(rename = "manualNightQty")]
    pub manual_night: Vec<u64>,
    #[serde(rename = "databaseDayQty")]
    pub database_day: Vec<u64>,
    #[serde(rename = "databaseNightQty")]
    pub database_night: Vec<u64>,
}

impl SeriesBucket {
    /// Creates a bucket with every sequence zero-filled to `len` entries.
    pub fn zeroed(len: usize) -> Self {
        Self {
            manual_total: vec![0; len],
            database_total: vec![0; len],
            manual_day: vec![0; len],
            manual_night: vec![0; len],
            database_day: vec![0; len],
            database_night: vec![0; len],
        }
    }

    /// Adds `quantity` at `index` into the total for `source` and, when the
    /// shift is known, into the matching day/night sequence.
    pub fn add(&mut self, index: usize, source: Source, shift: Shift, quantity: u64) {
        let (total, day, night) = match source {
            Source::Manual => (
                &mut self.manual_total,
                &mut self.manual_day,
                &mut self.manual_night,
            ),
            Source::Database => (
                &mut self.database_total,
                &mut self.database_day,
                &mut self.database_night,
            ),
        };
        total[index] += quantity;
        match shift {
            Shift::Day => day[index] += quantity,
            Shift::Night => night[index] += quantity,
            Shift::Unknown => {}
        }
    }
}

/// Monthly sums for one series, the data behind the overview bar chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesOverview {
    pub label: String,
    pub manual: u64,
    pub database: u64,
}

/// Result of one aggregation call: a fixed day axis and the series over it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlotDataset {
    /// Every day of the target month, ascending, formatted with [`DATE_FORMAT`].
    pub dates: Vec<String>,
    pub series: BTreeMap<SeriesKey, SeriesBucket>,
}

impl PlotDataset {
    /// Looks up a series by its head type and surface.
    pub fn get(&self, head_type: &str, head_surface: &str) -> Option<&SeriesBucket> {
        self.series.get(&SeriesKey::new(head_type, head_surface))
    }

    /// Per-series monthly totals for both sources.
    pub fn overview(&self) -> Vec<SeriesOverview> {
        self.series
            .iter()
            .map(|(key, bucket)| SeriesOverview {
                label: key.label(),
                manual: bucket.manual_total.iter().sum(),
                database: bucket.database_total.iter().sum(),
            })
            .collect()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SeriesView<'a> {
    head_type: &'a str,
    head_surface: &'a str,
    #[serde(flatten)]
    bucket: &'a SeriesBucket,
}

#[derive(Serialize)]
struct PlotView<'a> {
    dates: &'a [String],
    data: BTreeMap<String, SeriesView<'a>>,
}

impl Serialize for PlotDataset {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let data = self
            .series
            .iter()
            .map(|(key, bucket)| {
                let view = SeriesView {
                    head_type: &key.head_type,
                    head_surface: &key.head_surface,
                    bucket,
                };
                (key.label(), view)
            })
            .collect();
        PlotView {
            dates: &self.dates,
            data,
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn periods_outside_the_calendar_are_rejected() {
        assert!(ReportingPeriod::new(0, 2024).is_err());
        assert!(ReportingPeriod::new(13, 2024).is_err());
        assert!(ReportingPeriod::new(12, 2024).is_ok());
        assert!(serde_json::from_str::<ReportingPeriod>(r#"{"month": 14, "year": 2024}"#).is_err());
    }

    #[test]
    fn period_knows_its_length() {
        let february = ReportingPeriod::new(2, 2024).unwrap();
        assert_eq!(february.day_count(), 29);
        assert_eq!(february.days().len(), 29);
        assert_eq!(ReportingPeriod::new(2, 2023).unwrap().day_count(), 28);
        assert_eq!(ReportingPeriod::new(12, 2023).unwrap().following_month(), (1, 2024));
    }

    #[test]
    fn records_use_the_wire_field_names() {
        let record = CanonicalRecord {
            date: "15-04-2024".to_string(),
            shift: Shift::Unknown,
            head_type: "FEMTO".to_string(),
            head_surface: String::new(),
            quantity: 5,
            source: Source::Database,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["headType"], "FEMTO");
        assert_eq!(json["type"], "database");
        assert_eq!(json["shift"], "Unknown");

        let legacy = r#"{"date":"15-04-2024","shift":"","headType":"DFH","headSurface":"","quantity":2,"type":"manual"}"#;
        let parsed: CanonicalRecord = serde_json::from_str(legacy).unwrap();
        assert_eq!(parsed.shift, Shift::Unknown);
        assert_eq!(parsed.source, Source::Manual);
    }

    #[test]
    fn series_label_joins_type_and_surface() {
        assert_eq!(SeriesKey::new("AHEAD - TEK", "3122").label(), "AHEAD - TEK (3122)");
        assert_eq!(SeriesKey::new("FEMTO", "").label(), "FEMTO ()");
    }
}
