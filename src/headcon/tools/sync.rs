use std::path::Path;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::headcon::tools::aggregate::aggregate as build_plot;
use crate::headcon::tools::config::JobConfig;
use crate::headcon::tools::error::{Result, ToolError};
use crate::headcon::tools::extract::{self, DateLayout, candidate_layouts};
use crate::headcon::tools::io::{SheetSource, Workbook};
use crate::headcon::tools::model::{CanonicalRecord, PlotDataset, ReportingPeriod, SeriesOverview};

/// Cell holding a sample export date, used as the layout hint.
pub const DATE_HINT_CELL: &str = "A3";

/// Lists the sheets of the workbook at `input`.
#[instrument(level = "info", skip_all, fields(input = %input.display()))]
pub fn list_sheets(input: &Path) -> Result<Vec<String>> {
    let workbook = Workbook::open(input)?;
    Ok(workbook.sheet_names())
}

/// Reads the manual log at `input`, one sheet per day of `period`.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), sheet_count = sheets.len(), %period)
)]
pub fn extract_manual<N: AsRef<str>>(
    input: &Path,
    sheets: &[N],
    period: &ReportingPeriod,
) -> Result<Vec<CanonicalRecord>> {
    let mut workbook = Workbook::open(input)?;
    let records = extract::extract_manual(&mut workbook, sheets, period)?;
    info!(record_count = records.len(), "extracted manual records");
    Ok(records)
}

/// Returns the raw text of the export's sample date cell. Callers match it
/// against [`candidate_layouts`](crate::extract::candidate_layouts).
#[instrument(level = "info", skip_all, fields(input = %input.display(), sheet))]
pub fn detect_date_format(input: &Path, sheet: &str) -> Result<String> {
    let mut workbook = Workbook::open(input)?;
    let grid = workbook.sheet(sheet)?;
    Ok(grid.cell_ref(DATE_HINT_CELL)?.to_string())
}

/// Reads one sheet of the database export at `input`.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), sheet, %period, layout = layout.as_str())
)]
pub fn extract_database(
    input: &Path,
    sheet: &str,
    period: &ReportingPeriod,
    layout: &DateLayout,
) -> Result<Vec<CanonicalRecord>> {
    let mut workbook = Workbook::open(input)?;
    let records = extract::extract_database(&mut workbook, sheet, period, layout)?;
    info!(record_count = records.len(), "extracted database records");
    Ok(records)
}

/// Builds the plot dataset for `period` from both record sets.
#[instrument(
    level = "info",
    skip_all,
    fields(manual = manual.len(), database = database.len(), %period)
)]
pub fn aggregate(
    manual: &[CanonicalRecord],
    database: &[CanonicalRecord],
    period: &ReportingPeriod,
) -> PlotDataset {
    let plot = build_plot(manual, database, period);
    info!(series_count = plot.series.len(), "built plot dataset");
    plot
}

/// Picks the first known layout that both fits the hint's width and parses it.
/// Day-first layouts are tried before month-first ones.
pub fn infer_layout(hint: &str) -> Result<DateLayout> {
    candidate_layouts(hint)
        .into_iter()
        .filter_map(|entry| DateLayout::parse(entry.layout).ok())
        .find(|layout| layout.parse_date(hint).is_some())
        .ok_or_else(|| ToolError::InvalidDateLayout {
            layout: hint.to_string(),
            reason: "no known layout parses the sample date".to_string(),
        })
}

/// Everything a job run produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReport {
    pub manual: Vec<CanonicalRecord>,
    pub database: Vec<CanonicalRecord>,
    pub plot: PlotDataset,
    pub overview: Vec<SeriesOverview>,
}

/// Runs the extractors the job names and aggregates their records.
#[instrument(level = "info", skip_all, fields(month = job.month, year = job.year))]
pub fn run_job(job: &JobConfig) -> Result<JobReport> {
    let period = job.period()?;

    let manual = match &job.manual {
        Some(input) => match &input.sheets {
            Some(sheets) => extract_manual(&input.input, sheets, &period)?,
            None => {
                let sheets = list_sheets(&input.input)?;
                extract_manual(&input.input, &sheets, &period)?
            }
        },
        None => Vec::new(),
    };

    let database = match &job.database {
        Some(input) => {
            let layout = match &input.layout {
                Some(layout) => DateLayout::parse(layout)?,
                None => {
                    let hint = detect_date_format(&input.input, &input.sheet)?;
                    let layout = infer_layout(&hint)?;
                    info!(hint = %hint, layout = layout.as_str(), "inferred date layout");
                    layout
                }
            };
            extract_database(&input.input, &input.sheet, &period, &layout)?
        }
        None => Vec::new(),
    };

    if manual.is_empty() && database.is_empty() {
        warn!("job produced no records");
    }

    let plot = aggregate(&manual, &database, &period);
    let overview = plot.overview();
    Ok(JobReport {
        manual,
        database,
        plot,
        overview,
    })
}
