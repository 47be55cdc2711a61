use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::headcon::tools::error::{Result, ToolError};
use crate::headcon::tools::model::ReportingPeriod;

/// A complete extraction-and-aggregation run, loaded from JSON.
///
/// ```json
/// {
///   "month": 4,
///   "year": 2024,
///   "manual": { "input": "manual.xlsx", "sheets": ["1", "2"] },
///   "database": { "input": "export.xlsx", "sheet": "Sheet1", "layout": "02/01/2006" }
/// }
/// ```
///
/// Relative input paths resolve against the directory of the job file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobConfig {
    pub month: u32,
    pub year: i32,
    #[serde(default)]
    pub manual: Option<ManualInput>,
    #[serde(default)]
    pub database: Option<DatabaseInput>,
}

/// Manual log input. Without `sheets`, every sheet of the workbook is read.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ManualInput {
    pub input: PathBuf,
    #[serde(default)]
    pub sheets: Option<Vec<String>>,
}

/// Database export input. Without `layout`, the layout is inferred from the
/// sample date cell.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DatabaseInput {
    pub input: PathBuf,
    pub sheet: String,
    #[serde(default)]
    pub layout: Option<String>,
}

impl JobConfig {
    /// Reads a job file and resolves its input paths.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ToolError::MissingInput(path.to_path_buf()));
        }
        let data = fs::read_to_string(path)?;
        let mut config: JobConfig = serde_json::from_str(&data)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    pub fn period(&self) -> Result<ReportingPeriod> {
        ReportingPeriod::new(self.month, self.year)
    }

    fn resolve_paths(&mut self, base: &Path) {
        if let Some(manual) = &mut self.manual {
            manual.input = resolve(base, &manual.input);
        }
        if let Some(database) = &mut self.database {
            database.input = resolve(base, &database.input);
        }
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_relative() {
        base.join(path)
    } else {
        path.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_inputs_resolve_against_the_job_directory() {
        let temp_dir = tempfile::tempdir().expect("temporary directory");
        let job_path = temp_dir.path().join("job.json");
        fs::write(
            &job_path,
            r#"{"month": 4, "year": 2024, "manual": {"input": "manual.xlsx"}}"#,
        )
        .expect("job written");

        let config = JobConfig::load(&job_path).expect("job loaded");
        assert_eq!(config.period().unwrap().month(), 4);
        assert!(config.database.is_none());
        let manual = config.manual.as_ref().expect("manual input");
        assert_eq!(manual.input, temp_dir.path().join("manual.xlsx"));
        assert!(manual.sheets.is_none());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let parsed = serde_json::from_str::<JobConfig>(r#"{"month": 4, "year": 2024, "extra": 1}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn invalid_month_is_reported() {
        let config: JobConfig = serde_json::from_str(r#"{"month": 13, "year": 2024}"#).unwrap();
        assert!(matches!(
            config.period(),
            Err(ToolError::InvalidPeriod { month: 13, .. })
        ));
    }
}
