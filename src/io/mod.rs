//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - derived-view CSV and dashboard JSON exports (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
