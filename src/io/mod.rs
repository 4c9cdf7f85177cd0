//! Input/Output handling for the CLI.
//!
//! This module provides:
//! - Output formatting (text, JSON)
//! - Consistent error handling and exit codes
//! - Plan export to text files

pub mod exit_code;
pub mod export;
pub mod format;

pub use exit_code::ExitCode;
pub use export::{export_file_name, export_plan, export_with_config};
pub use format::{ErrorDetails, JsonResponse, OutputFormat, ResponseMeta};
