//! Error types for the health advisory pipeline
//!
//! Every stage returns an explicit error value so callers can tell
//! recoverable outcomes (fallbacks, warnings) from fatal ones.

use crate::knowledge::KnowledgeError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub field: &'static str,
    pub reason: String,
}

impl FieldError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Main error type for advisory operations
#[derive(Error, Debug)]
pub enum AdvisorError {
    /// One or more input fields are out of range
    #[error("Invalid health metrics: {}", join_fields(.errors))]
    InvalidInput { errors: Vec<FieldError> },

    /// Malformed blood pressure reading
    #[error("Invalid blood pressure '{input}': {reason}. Use systolic/diastolic (e.g., 120/80)")]
    Parse { input: String, reason: String },

    /// The knowledge store could not be loaded or built
    #[error("Failed to initialize knowledge base: {0}")]
    StoreInit(#[source] KnowledgeError),

    /// The advisor was created without a usable knowledge store
    #[error("Health knowledge base unavailable: {reason}")]
    KnowledgeUnavailable { reason: String },

    /// The embedding provider could not be reached at query time
    #[error("Guidance retrieval failed: {0}")]
    Retrieval(#[source] KnowledgeError),

    /// Rendering the plan failed; no partial plan is produced
    #[error("Failed to compose diet plan: {reason}")]
    Composition { reason: String },

    /// Writing an exported plan failed
    #[error("Failed to export plan to {}: {source}", .path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl AdvisorError {
    /// Get a stable status code for this error type.
    ///
    /// Used in JSON responses for programmatic error handling.
    pub fn status_code(&self) -> String {
        match self {
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::Parse { .. } => "PARSE_ERROR",
            Self::StoreInit(_) => "STORE_INIT_ERROR",
            Self::KnowledgeUnavailable { .. } => "KNOWLEDGE_UNAVAILABLE",
            Self::Retrieval(_) => "RETRIEVAL_ERROR",
            Self::Composition { .. } => "COMPOSITION_ERROR",
            Self::Export { .. } => "EXPORT_ERROR",
        }
        .to_string()
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::InvalidInput { .. } => vec![
                "Age must be between 18 and 100",
                "Weight and height must be positive numbers",
            ],
            Self::Parse { .. } => vec!["Enter blood pressure as systolic/diastolic, e.g. 120/80"],
            Self::StoreInit(_) | Self::KnowledgeUnavailable { .. } => vec![
                "Run 'health-advisor index --force' to rebuild the knowledge base",
                "Check that the embedding model can be downloaded or is cached",
            ],
            Self::Retrieval(_) => vec![
                "Check that the embedding model is available",
                "Set embedding.backend = \"hashed\" to run without a model download",
            ],
            Self::Composition { .. } => vec!["Check your inputs and try again"],
            Self::Export { .. } => vec![
                "Check that the export directory is writable",
                "Pass --output-dir to write the plan somewhere else",
            ],
        }
    }

    /// Whether the error disables the whole advisory feature rather than one request.
    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(
            self,
            Self::StoreInit(_) | Self::KnowledgeUnavailable { .. } | Self::Retrieval(_)
        )
    }
}

/// Result type alias for advisory operations
pub type AdvisorResult<T> = Result<T, AdvisorError>;
