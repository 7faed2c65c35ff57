//! Plot rendering.

pub mod ascii;

pub use ascii::render_chart;
pub(crate) use ascii::truncate;
