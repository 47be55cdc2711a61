//! Core library for the headcon command line application.
//!
//! The library turns head-consumption spreadsheets into a month-long, per-day
//! time series. Two spreadsheet layouts are supported: the hand-maintained
//! manual log (one sheet per day, fixed cell positions) and the database
//! export (one row per entry, free-text categories). The modules keep
//! responsibilities narrow: workbook access lives under [`headcon::tools::io`],
//! the record and plot types in [`headcon::tools::model`], the layout decoders
//! in [`headcon::tools::extract`], the day-axis fold in
//! [`headcon::tools::aggregate`], job files in [`headcon::tools::config`],
//! and the file-level entry points in [`headcon::tools::sync`].

pub mod headcon;

pub use headcon::tools::{Result, ToolError, aggregate, config, error, extract, io, model, sync};
