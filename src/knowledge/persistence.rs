//! On-disk layout of the knowledge index.
//!
//! ```text
//! <index_path>/
//!   metadata.json    model, dimension, corpus version, timestamps
//!   documents.json   documents with their vectors, corpus order
//! ```

use super::metadata::METADATA_FILE;
use super::{KnowledgeError, KnowledgeMetadata, StoredDocument};
use std::path::{Path, PathBuf};

const DOCUMENTS_FILE: &str = "documents.json";

/// Everything read back from disk.
#[derive(Debug, Clone)]
pub struct PersistedKnowledge {
    pub metadata: KnowledgeMetadata,
    pub documents: Vec<StoredDocument>,
}

/// Manages persistence of the knowledge index
#[derive(Debug, Clone)]
pub struct KnowledgePersistence {
    base_path: PathBuf,
}

impl KnowledgePersistence {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn documents_path(&self) -> PathBuf {
        self.base_path.join(DOCUMENTS_FILE)
    }

    /// Both files must be present for the index to count as persisted.
    #[must_use]
    pub fn exists(&self) -> bool {
        KnowledgeMetadata::exists(&self.base_path) && self.documents_path().exists()
    }

    /// Load metadata and documents
    #[must_use = "Load errors should be handled appropriately"]
    pub fn load(&self) -> Result<PersistedKnowledge, KnowledgeError> {
        let metadata = KnowledgeMetadata::load(&self.base_path)?;

        let bytes = std::fs::read(self.documents_path()).map_err(|e| KnowledgeError::Storage {
            message: format!("Failed to read documents: {e}"),
            suggestion: "Run 'health-advisor index --force' to rebuild the knowledge base"
                .to_string(),
        })?;
        let documents: Vec<StoredDocument> =
            serde_json::from_slice(&bytes).map_err(|e| KnowledgeError::Storage {
                message: format!("Failed to parse documents: {e}"),
                suggestion: "The index may be corrupted. Run 'health-advisor index --force'."
                    .to_string(),
            })?;

        if documents.len() != metadata.document_count {
            tracing::warn!(
                "Expected {} documents but found {}",
                metadata.document_count,
                documents.len()
            );
        }

        for stored in &documents {
            if stored.vector.len() != metadata.dimension {
                return Err(KnowledgeError::DimensionMismatch {
                    expected: metadata.dimension,
                    actual: stored.vector.len(),
                    suggestion:
                        "Metadata and stored vectors disagree. The index may be corrupted."
                            .to_string(),
                });
            }
        }

        Ok(PersistedKnowledge {
            metadata,
            documents,
        })
    }

    /// Replace the persisted index.
    ///
    /// The old index is cleared first and metadata is written last, so a
    /// failed save leaves nothing `exists()` accepts.
    #[must_use = "Save errors should be handled to ensure data is persisted"]
    pub fn save(
        &self,
        metadata: &KnowledgeMetadata,
        documents: &[StoredDocument],
    ) -> Result<(), KnowledgeError> {
        std::fs::create_dir_all(&self.base_path).map_err(|e| KnowledgeError::Storage {
            message: format!("Failed to create knowledge directory: {e}"),
            suggestion: "Check directory permissions".to_string(),
        })?;
        self.clear()?;

        let bytes = serde_json::to_vec_pretty(documents).map_err(|e| KnowledgeError::Storage {
            message: format!("Failed to serialize documents: {e}"),
            suggestion: "This is likely a bug in the code".to_string(),
        })?;

        let path = self.documents_path();
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, bytes)
            .and_then(|()| std::fs::rename(&tmp, &path))
            .map_err(|e| KnowledgeError::Storage {
                message: format!("Failed to write documents: {e}"),
                suggestion: "Check disk space and file permissions".to_string(),
            })?;

        metadata.save(&self.base_path)
    }

    /// Remove the persisted index so the next initialization rebuilds it.
    pub fn clear(&self) -> Result<(), KnowledgeError> {
        for path in [self.base_path.join(METADATA_FILE), self.documents_path()] {
            if path.exists() {
                std::fs::remove_file(&path).map_err(|e| KnowledgeError::Storage {
                    message: format!("Failed to remove {}: {e}", path.display()),
                    suggestion: "Check file permissions".to_string(),
                })?;
            }
        }
        Ok(())
    }
}
