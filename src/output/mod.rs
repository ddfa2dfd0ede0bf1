//! Output formatting module
//!
//! Renders check results for the terminal or for machine consumption.

mod formatter;

pub use formatter::{OutputFormat, ResultFormatter};
