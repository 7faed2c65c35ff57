//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the source row (`MovieRecord`) and its derived view (`DerivedFields`)
//! - the fixed chart sequence (`ChartKind`) and chart-ready series (`Chart`)
//! - run configuration (`DashboardConfig`, `RuntimeMode`)

pub mod types;

pub use types::*;
