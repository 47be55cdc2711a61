//! Layout decoders that turn sheets into [`CanonicalRecord`]s.
//!
//! [`CanonicalRecord`]: crate::model::CanonicalRecord

pub mod classify;
pub mod database;
pub mod date;
pub mod manual;

pub use database::extract_database;
pub use date::{DateLayout, DateLayoutEntry, KNOWN_LAYOUTS, candidate_layouts};
pub use manual::extract_manual;
