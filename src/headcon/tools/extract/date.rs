//! Date handling for the database export: layout translation, separator
//! normalization and the month-boundary correction.
//!
//! Export layouts are written as reference dates in the style of Go's `time`
//! package (`02/01/2006 15:04` means day/month/year hour:minute). Patterns that
//! already contain a `%` are taken as chrono `strftime` formats; composite
//! specifiers such as `%F` and `%D` are expanded before use.
//!
//! Cells typed as dates in the workbook reach the extractor as day-first text
//! (`DD/MM/YYYY`, plus `HH:MM:SS` when a time is set), whatever number format
//! Excel displays them with. Exports whose dates are date-typed cells need a
//! day-first layout such as `02/01/2006`.

use chrono::format::{Item, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime};

use crate::headcon::tools::error::{Result, ToolError};
use crate::headcon::tools::model::ReportingPeriod;

/// Reference-date tokens and their chrono equivalents, longest first so that
/// `2006` wins over `2` and `15` over `1`.
const LAYOUT_TOKENS: [(&str, &str); 19] = [
    ("January", "%B"),
    ("Monday", "%A"),
    ("2006", "%Y"),
    ("Jan", "%b"),
    ("Mon", "%a"),
    ("01", "%m"),
    ("02", "%d"),
    ("03", "%I"),
    ("04", "%M"),
    ("05", "%S"),
    ("06", "%y"),
    ("15", "%H"),
    ("PM", "%p"),
    ("pm", "%p"),
    ("1", "%m"),
    ("2", "%d"),
    ("3", "%I"),
    ("4", "%M"),
    ("5", "%S"),
];

/// A parsed export date layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateLayout {
    layout: String,
    format: String,
    has_time: bool,
}

impl DateLayout {
    /// Translates `layout` into a chrono format. Separators are normalized the
    /// same way as the date text, so `02-01-2006` and `02/01/2006` are
    /// equivalent.
    pub fn parse(layout: &str) -> Result<Self> {
        let normalized = normalize_layout_separators(layout.trim());
        let format = if normalized.contains('%') {
            expand_composite_specifiers(&normalized)
        } else {
            translate_reference_layout(&normalized)
        };

        let invalid = |reason: &str| ToolError::InvalidDateLayout {
            layout: layout.to_string(),
            reason: reason.to_string(),
        };

        if StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
            return Err(invalid("unsupported format specifier"));
        }
        let plain = format
            .replace("%-", "%")
            .replace("%_", "%")
            .replace("%0", "%");
        let has_day = ["%d", "%e"].iter().any(|spec| plain.contains(spec));
        let has_month = ["%m", "%b", "%B"].iter().any(|spec| plain.contains(spec));
        let has_year = ["%Y", "%y"].iter().any(|spec| plain.contains(spec));
        if !(has_day && has_month && has_year) {
            return Err(invalid("layout must carry a day, a month and a year"));
        }

        let has_time = ["%H", "%I", "%M", "%S"]
            .iter()
            .any(|spec| plain.contains(spec));

        Ok(Self {
            layout: layout.to_string(),
            format,
            has_time,
        })
    }

    /// The layout as supplied by the caller.
    pub fn as_str(&self) -> &str {
        &self.layout
    }

    /// The chrono format the layout translated to.
    pub fn chrono_format(&self) -> &str {
        &self.format
    }

    /// Parses a date cell. Dashes are replaced with slashes before parsing; any
    /// time of day is discarded.
    pub fn parse_date(&self, text: &str) -> Option<NaiveDate> {
        let text = normalize_separators(text.trim());
        if self.has_time {
            NaiveDateTime::parse_from_str(&text, &self.format)
                .ok()
                .map(|moment| moment.date())
        } else {
            NaiveDate::parse_from_str(&text, &self.format).ok()
        }
    }
}

/// Replaces `-` separators with `/`.
pub fn normalize_separators(text: &str) -> String {
    text.replace('-', "/")
}

/// Like [`normalize_separators`], but leaves strftime flags such as `%-d` alone.
fn normalize_layout_separators(layout: &str) -> String {
    let mut normalized = String::with_capacity(layout.len());
    let mut previous = None;
    for c in layout.chars() {
        if c == '-' && previous != Some('%') {
            normalized.push('/');
        } else {
            normalized.push(c);
        }
        previous = Some(c);
    }
    normalized
}

/// Composite strftime specifiers, spelled with `/` because date text has its
/// dashes normalized before parsing.
const COMPOSITE_SPECIFIERS: [(char, &str); 7] = [
    ('F', "%Y/%m/%d"),
    ('D', "%m/%d/%y"),
    ('x', "%m/%d/%y"),
    ('v', "%e/%b/%Y"),
    ('T', "%H:%M:%S"),
    ('R', "%H:%M"),
    ('r', "%I:%M:%S %p"),
];

fn expand_composite_specifiers(format: &str) -> String {
    let mut expanded = String::with_capacity(format.len() * 2);
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            expanded.push(c);
            continue;
        }
        match chars.next() {
            Some(spec) => match COMPOSITE_SPECIFIERS.iter().find(|(name, _)| *name == spec) {
                Some((_, expansion)) => expanded.push_str(expansion),
                None => {
                    expanded.push('%');
                    expanded.push(spec);
                }
            },
            None => expanded.push('%'),
        }
    }
    expanded
}

fn translate_reference_layout(layout: &str) -> String {
    let mut format = String::with_capacity(layout.len() * 2);
    let mut rest = layout;
    'outer: while let Some(c) = rest.chars().next() {
        for (token, spec) in LAYOUT_TOKENS {
            if let Some(stripped) = rest.strip_prefix(token) {
                format.push_str(spec);
                rest = stripped;
                continue 'outer;
            }
        }
        format.push(c);
        rest = &rest[c.len_utf8()..];
    }
    format
}

/// Re-dates an entry stamped on the first day of the following month to the
/// last day of `period`. Other dates pass through unchanged.
pub fn correct_rollover(date: NaiveDate, period: &ReportingPeriod) -> NaiveDate {
    if period.is_rollover_date(date) {
        period.last_day()
    } else {
        date
    }
}

/// A layout the database export is known to use, with a human-readable label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateLayoutEntry {
    pub label: &'static str,
    pub layout: &'static str,
}

const fn entry(label: &'static str, layout: &'static str) -> DateLayoutEntry {
    DateLayoutEntry { label, layout }
}

pub const KNOWN_LAYOUTS: [DateLayoutEntry; 22] = [
    entry("d/m/yy", "2/1/06"),
    entry("d/m/yyyy", "2/1/2006"),
    entry("dd/mm/yy", "02/01/06"),
    entry("dd/mm/yyyy", "02/01/2006"),
    entry("m/d/yy", "1/2/06"),
    entry("m/d/yyyy", "1/2/2006"),
    entry("mm/dd/yy", "01/02/06"),
    entry("mm/dd/yyyy", "01/02/2006"),
    entry("m/d/yy hh:mm", "1/2/06 15:04"),
    entry("m/d/yy hh:mm:ss", "1/2/06 15:04:05"),
    entry("m/d/yyyy hh:mm", "1/2/2006 15:04"),
    entry("m/d/yyyy hh:mm:ss", "1/2/2006 15:04:05"),
    entry("mm/dd/yyyy hh:mm", "01/02/2006 15:04"),
    entry("mm/dd/yyyy hh:mm:ss", "01/02/2006 15:04:05"),
    entry("mm/dd/yy hh:mm", "01/02/06 15:04"),
    entry("mm/dd/yy hh:mm:ss", "01/02/06 15:04:05"),
    entry("d/m/yy hh:mm", "2/1/06 15:04"),
    entry("d/m/yy hh:mm:ss", "2/1/06 15:04:05"),
    entry("dd/mm/yy hh:mm", "02/01/06 15:04"),
    entry("dd/mm/yy hh:mm:ss", "02/01/06 15:04:05"),
    entry("dd/mm/yyyy hh:mm", "02/01/2006 15:04"),
    entry("dd/mm/yyyy hh:mm:ss", "02/01/2006 15:04:05"),
];

/// Known layouts whose reference text is as long as `hint`, the sample date
/// read from the export. Which of them is right (day-first or month-first)
/// still has to be chosen by the caller.
pub fn candidate_layouts(hint: &str) -> Vec<&'static DateLayoutEntry> {
    let width = hint.trim().chars().count();
    KNOWN_LAYOUTS
        .iter()
        .filter(|entry| entry.layout.chars().count() == width)
        .collect()
}
