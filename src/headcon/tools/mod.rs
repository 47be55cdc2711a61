pub mod aggregate;
pub mod config;
pub mod error;
pub mod extract;
pub mod io;
pub mod model;
pub mod sync;

pub use error::{Result, ToolError};
