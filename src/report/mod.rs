//! Reporting utilities: run summary, derived table, and chart text.

mod format;

pub use format::*;
