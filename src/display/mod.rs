//! Terminal display utilities for CLI output.
//!
//! Provides styled tables, spinners, and themed status lines.

pub mod progress;
pub mod tables;
pub mod theme;

pub use progress::{create_spinner, with_spinner};
pub use tables::{create_health_summary_table, create_index_summary_table, create_search_table};
pub use theme::{THEME, Theme};
