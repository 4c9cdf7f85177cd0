//! Metadata tracking for knowledge store persistence.
//!
//! Records the embedding model, vector dimension and corpus version so a
//! persisted index is never paired with an incompatible embedder.

use super::KnowledgeError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub(super) const METADATA_FILE: &str = "metadata.json";

/// Metadata for knowledge store persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeMetadata {
    /// Name of the embedding model used
    pub model_name: String,

    /// Dimension of embeddings
    pub dimension: usize,

    /// Number of documents stored
    pub document_count: usize,

    /// Version of the built-in corpus the index was built from
    pub corpus_version: u32,

    /// Unix timestamp when created
    pub created_at: u64,

    /// Unix timestamp when last updated
    pub updated_at: u64,

    /// Version of the metadata format
    pub version: u32,
}

impl KnowledgeMetadata {
    /// Current metadata version
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new(
        model_name: String,
        dimension: usize,
        document_count: usize,
        corpus_version: u32,
    ) -> Self {
        let now = utc_timestamp();
        Self {
            model_name,
            dimension,
            document_count,
            corpus_version,
            created_at: now,
            updated_at: now,
            version: Self::CURRENT_VERSION,
        }
    }

    /// Save metadata to `<path>/metadata.json`
    pub fn save(&self, path: &Path) -> Result<(), KnowledgeError> {
        let json = serde_json::to_string_pretty(self).map_err(|e| KnowledgeError::Storage {
            message: format!("Failed to serialize metadata: {e}"),
            suggestion: "This is likely a bug in the code".to_string(),
        })?;

        std::fs::write(path.join(METADATA_FILE), json).map_err(|e| KnowledgeError::Storage {
            message: format!("Failed to write metadata: {e}"),
            suggestion: "Check disk space and file permissions".to_string(),
        })
    }

    /// Load metadata from `<path>/metadata.json`
    pub fn load(path: &Path) -> Result<Self, KnowledgeError> {
        let json = std::fs::read_to_string(path.join(METADATA_FILE)).map_err(|e| {
            KnowledgeError::Storage {
                message: format!("Failed to read metadata: {e}"),
                suggestion: "Check if the knowledge index exists at the specified path"
                    .to_string(),
            }
        })?;

        let metadata: Self = serde_json::from_str(&json).map_err(|e| KnowledgeError::Storage {
            message: format!("Failed to parse metadata: {e}"),
            suggestion: "The metadata file may be corrupted. Run 'health-advisor index --force'."
                .to_string(),
        })?;

        if metadata.version > Self::CURRENT_VERSION {
            return Err(KnowledgeError::Storage {
                message: format!(
                    "Metadata version {} is newer than supported version {}",
                    metadata.version,
                    Self::CURRENT_VERSION
                ),
                suggestion: "Upgrade health-advisor or rebuild the index".to_string(),
            });
        }

        Ok(metadata)
    }

    /// Check if metadata file exists
    pub fn exists(path: &Path) -> bool {
        path.join(METADATA_FILE).exists()
    }
}

fn utc_timestamp() -> u64 {
    Utc::now().timestamp().max(0) as u64
}
