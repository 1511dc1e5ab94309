//! Output formatting for pass results.
//!
//! - [`summary`] - per-record outcome table
//! - [`terminal`] - field formatting helpers

mod summary;
mod terminal;

pub use summary::{print_summary, summary_lines};
pub use terminal::format_field;
