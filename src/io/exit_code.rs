//! Exit codes for CLI operations following Unix conventions.
//!
//! # Exit Code Semantics
//!
//! - `0`: Success
//! - `1`: General error - unspecified failure
//! - `2`: Blocking error - the advisory feature cannot work at all
//! - `3-125`: Specific recoverable errors
//! - `126-255`: Reserved by shell

use crate::error::AdvisorError;

/// Standard exit codes for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Operation succeeded (code 0)
    Success = 0,

    /// Unspecified error occurred (code 1)
    GeneralError = 1,

    /// Critical error that should halt automation (code 2)
    BlockingError = 2,

    /// Search ran but matched nothing (code 3)
    NotFound = 3,

    /// Health metrics rejected by validation (code 4)
    InvalidInput = 4,

    /// File I/O error (code 5)
    IoError = 5,

    /// Configuration error (code 6)
    ConfigError = 6,

    /// Knowledge base could not be loaded or built (code 7)
    KnowledgeUnavailable = 7,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl ExitCode {
    /// Convert an `AdvisorError` to the appropriate exit code.
    pub fn from_error(error: &AdvisorError) -> Self {
        match error {
            AdvisorError::InvalidInput { .. } | AdvisorError::Parse { .. } => {
                ExitCode::InvalidInput
            }
            AdvisorError::StoreInit(_) | AdvisorError::KnowledgeUnavailable { .. } => {
                ExitCode::KnowledgeUnavailable
            }
            // The provider went away mid-run
            AdvisorError::Retrieval(_) => ExitCode::BlockingError,
            AdvisorError::Composition { .. } => ExitCode::GeneralError,
            AdvisorError::Export { .. } => ExitCode::IoError,
        }
    }
}
