//! Per-row derived fields.
//!
//! - runtime text to minutes (`runtime`)
//! - gross profit, release year, and the full derived view (`metrics`)

pub mod metrics;
pub mod runtime;

pub use metrics::*;
pub use runtime::*;
