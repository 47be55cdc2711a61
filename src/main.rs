use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use headcon_tools::config::JobConfig;
use headcon_tools::extract::{DateLayout, candidate_layouts};
use headcon_tools::model::{CanonicalRecord, ReportingPeriod};
use headcon_tools::sync;
use headcon_tools::{Result, ToolError};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_tracing().and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Sheets { input } => {
            for name in sync::list_sheets(&input)? {
                println!("{name}");
            }
            Ok(())
        }
        Command::DateFormat { input, sheet } => {
            let hint = sync::detect_date_format(&input, &sheet)?;
            println!("sample: {hint}");
            for entry in candidate_layouts(&hint) {
                let parses = DateLayout::parse(entry.layout)
                    .ok()
                    .and_then(|layout| layout.parse_date(&hint))
                    .is_some();
                let marker = if parses { "*" } else { " " };
                println!("{marker} {:<22} {}", entry.label, entry.layout);
            }
            Ok(())
        }
        Command::Manual {
            input,
            sheets,
            period,
            output,
        } => {
            let period = period.resolve()?;
            let sheets = if sheets.is_empty() {
                sync::list_sheets(&input)?
            } else {
                sheets
            };
            let records = sync::extract_manual(&input, &sheets, &period)?;
            emit(&records, output.as_deref())
        }
        Command::Database {
            input,
            sheet,
            layout,
            period,
            output,
        } => {
            let period = period.resolve()?;
            let layout = DateLayout::parse(&layout)?;
            let records = sync::extract_database(&input, &sheet, &period, &layout)?;
            emit(&records, output.as_deref())
        }
        Command::Plot {
            manual,
            database,
            period,
            overview,
            output,
        } => {
            let period = period.resolve()?;
            let manual = load_records(manual.as_deref())?;
            let database = load_records(database.as_deref())?;
            let plot = sync::aggregate(&manual, &database, &period);
            if overview {
                emit(&plot.overview(), output.as_deref())
            } else {
                emit(&plot, output.as_deref())
            }
        }
        Command::Run { job, output } => {
            let job = JobConfig::load(&job)?;
            let report = sync::run_job(&job)?;
            emit(&report, output.as_deref())
        }
    }
}

fn load_records(path: Option<&Path>) -> Result<Vec<CanonicalRecord>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    if !path.exists() {
        return Err(ToolError::MissingInput(path.to_path_buf()));
    }
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

fn emit<T: Serialize + ?Sized>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => std::fs::write(path, json)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}")?;
        }
    }
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Extract head consumption from manual logs and database exports."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the sheets of a workbook.
    Sheets {
        /// Workbook path.
        #[arg(long)]
        input: PathBuf,
    },

    /// Show the sample date of a database export and the layouts that fit it.
    DateFormat {
        /// Database export path.
        #[arg(long)]
        input: PathBuf,

        /// Sheet holding the export rows.
        #[arg(long)]
        sheet: String,
    },

    /// Extract records from a manual log (one sheet per day).
    Manual {
        /// Manual log path.
        #[arg(long)]
        input: PathBuf,

        /// Day sheets to read; every sheet when omitted.
        #[arg(long = "sheet")]
        sheets: Vec<String>,

        #[command(flatten)]
        period: PeriodArgs,

        /// Write JSON here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Extract records from a database export sheet.
    Database {
        /// Database export path.
        #[arg(long)]
        input: PathBuf,

        /// Sheet holding the export rows.
        #[arg(long)]
        sheet: String,

        /// Date layout, e.g. `02/01/2006` or `%d/%m/%Y`.
        #[arg(long)]
        layout: String,

        #[command(flatten)]
        period: PeriodArgs,

        /// Write JSON here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Aggregate previously extracted records into a plot dataset.
    Plot {
        /// JSON file of manual records.
        #[arg(long)]
        manual: Option<PathBuf>,

        /// JSON file of database records.
        #[arg(long)]
        database: Option<PathBuf>,

        #[command(flatten)]
        period: PeriodArgs,

        /// Emit monthly totals per series instead of the daily dataset.
        #[arg(long)]
        overview: bool,

        /// Write JSON here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Run extraction and aggregation as described by a JSON job file.
    Run {
        /// Job file path.
        #[arg(long)]
        job: PathBuf,

        /// Write JSON here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct PeriodArgs {
    /// Target month (1-12).
    #[arg(long)]
    month: u32,

    /// Target year.
    #[arg(long)]
    year: i32,
}

impl PeriodArgs {
    fn resolve(&self) -> Result<ReportingPeriod> {
        ReportingPeriod::new(self.month, self.year)
    }
}
