//! `imdb-dash` library crate.
//!
//! The binary (`imdb`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the text report and the terminal dashboard share one pipeline
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod charts;
pub mod cli;
pub mod derive;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod tui;
