//! Embedding-backed store over the clinical guidance corpus

use super::corpus::{CORPUS_VERSION, default_corpus};
use super::embedding::{EmbeddingGenerator, cosine_similarity};
use super::{
    KnowledgeDocument, KnowledgeMetadata, KnowledgePersistence, RetrievedContext, ScoredDocument,
    StoredDocument,
};
use std::sync::Arc;

/// Error type for knowledge store operations
#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    #[error("Failed to initialize embedding model: {0}")]
    ModelInit(String),

    #[error("Embedding provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Failed to generate embedding: {0}")]
    Embedding(String),

    #[error("Storage error: {message}\nSuggestion: {suggestion}")]
    Storage { message: String, suggestion: String },

    #[error("Dimension mismatch: expected {expected}, got {actual}\nSuggestion: {suggestion}")]
    DimensionMismatch {
        expected: usize,
        actual: usize,
        suggestion: String,
    },

    #[error("Retrieval depth must be at least 1")]
    InvalidTopK,
}

impl KnowledgeError {
    /// A one-off provider hiccup that retrieval may treat as "no results".
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Embedding(_))
    }
}

/// Read-only similarity search over guidance documents.
///
/// The advisory pipeline depends on this trait rather than on
/// [`KnowledgeStore`] so tests can inject fixed contexts.
pub trait KnowledgeSource: Send + Sync {
    /// Return up to `k` documents ranked by similarity to `query`.
    fn retrieve(&self, query: &str, k: usize) -> Result<RetrievedContext, KnowledgeError>;

    /// Number of documents available for retrieval.
    fn document_count(&self) -> usize;
}

/// Knowledge store holding the embedded corpus.
pub struct KnowledgeStore {
    documents: Vec<StoredDocument>,
    embedder: Arc<dyn EmbeddingGenerator>,
    metadata: KnowledgeMetadata,
}

impl std::fmt::Debug for KnowledgeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeStore")
            .field("document_count", &self.documents.len())
            .field("model", &self.embedder.model_name())
            .field("metadata", &self.metadata)
            .finish()
    }
}

impl KnowledgeStore {
    /// Load the persisted store, or build the default corpus and persist it.
    ///
    /// Fails when the persisted index was built with a different embedding
    /// model or dimension; the caller must treat the store as unusable.
    pub fn initialize(
        persistence: &KnowledgePersistence,
        embedder: Arc<dyn EmbeddingGenerator>,
    ) -> Result<Self, KnowledgeError> {
        if persistence.exists() {
            tracing::info!(
                "Loading knowledge base from {}",
                persistence.base_path().display()
            );
            return Self::load(persistence, embedder);
        }

        tracing::info!(
            "No knowledge base at {}, building default corpus",
            persistence.base_path().display()
        );
        Self::rebuild(persistence, embedder)
    }

    /// Embed the default corpus and overwrite whatever is persisted.
    pub fn rebuild(
        persistence: &KnowledgePersistence,
        embedder: Arc<dyn EmbeddingGenerator>,
    ) -> Result<Self, KnowledgeError> {
        let store = Self::build(default_corpus(), embedder)?;
        persistence.save(&store.metadata, &store.documents)?;
        tracing::info!(
            "Knowledge base saved ({} documents, model {})",
            store.documents.len(),
            store.metadata.model_name
        );
        Ok(store)
    }

    /// Build an in-memory store from `documents` without touching disk.
    pub fn build(
        documents: Vec<KnowledgeDocument>,
        embedder: Arc<dyn EmbeddingGenerator>,
    ) -> Result<Self, KnowledgeError> {
        let texts: Vec<&str> = documents.iter().map(|d| d.text.as_str()).collect();
        let vectors = embedder.generate_embeddings(&texts)?;

        if vectors.len() != documents.len() {
            return Err(KnowledgeError::Embedding(format!(
                "Expected {} embeddings, provider returned {}",
                documents.len(),
                vectors.len()
            )));
        }

        let dimension = embedder.dimension();
        let mut stored = Vec::with_capacity(documents.len());
        for (document, vector) in documents.into_iter().zip(vectors) {
            if vector.len() != dimension {
                return Err(KnowledgeError::DimensionMismatch {
                    expected: dimension,
                    actual: vector.len(),
                    suggestion: "The embedding provider returned inconsistent vectors".to_string(),
                });
            }
            stored.push(StoredDocument { document, vector });
        }

        let metadata = KnowledgeMetadata::new(
            embedder.model_name().to_string(),
            dimension,
            stored.len(),
            CORPUS_VERSION,
        );

        Ok(Self {
            documents: stored,
            embedder,
            metadata,
        })
    }

    fn load(
        persistence: &KnowledgePersistence,
        embedder: Arc<dyn EmbeddingGenerator>,
    ) -> Result<Self, KnowledgeError> {
        let persisted = persistence.load()?;
        let metadata = persisted.metadata;

        if metadata.model_name != embedder.model_name() {
            return Err(KnowledgeError::Storage {
                message: format!(
                    "Knowledge base was built with model '{}' but '{}' is configured",
                    metadata.model_name,
                    embedder.model_name()
                ),
                suggestion: "Run 'health-advisor index --force' to rebuild with the configured model"
                    .to_string(),
            });
        }

        if metadata.dimension != embedder.dimension() {
            return Err(KnowledgeError::DimensionMismatch {
                expected: embedder.dimension(),
                actual: metadata.dimension,
                suggestion: "Run 'health-advisor index --force' to rebuild the knowledge base"
                    .to_string(),
            });
        }

        if metadata.corpus_version != CORPUS_VERSION {
            tracing::warn!(
                "Knowledge base corpus version {} differs from built-in version {CORPUS_VERSION}; \
                 run 'health-advisor index --force' to refresh it",
                metadata.corpus_version
            );
        }

        tracing::debug!("Loaded {} knowledge documents", persisted.documents.len());

        Ok(Self {
            documents: persisted.documents,
            embedder,
            metadata,
        })
    }

    #[must_use]
    pub fn metadata(&self) -> &KnowledgeMetadata {
        &self.metadata
    }

    pub fn documents(&self) -> impl Iterator<Item = &KnowledgeDocument> {
        self.documents.iter().map(|stored| &stored.document)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl KnowledgeSource for KnowledgeStore {
    fn retrieve(&self, query: &str, k: usize) -> Result<RetrievedContext, KnowledgeError> {
        if k == 0 {
            return Err(KnowledgeError::InvalidTopK);
        }
        if self.documents.is_empty() {
            return Ok(RetrievedContext::empty());
        }

        let query_vector = self.embedder.embed(query)?;
        if query_vector.len() != self.metadata.dimension {
            return Err(KnowledgeError::DimensionMismatch {
                expected: self.metadata.dimension,
                actual: query_vector.len(),
                suggestion: "Run 'health-advisor index --force' to rebuild the knowledge base"
                    .to_string(),
            });
        }

        let mut hits: Vec<ScoredDocument> = self
            .documents
            .iter()
            .enumerate()
            .map(|(position, stored)| ScoredDocument {
                document: stored.document.clone(),
                score: cosine_similarity(&query_vector, &stored.vector),
                position,
            })
            .collect();

        // Stable sort keeps corpus order among equal scores
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(k);

        tracing::debug!("Retrieved {} documents for query '{query}'", hits.len());
        Ok(RetrievedContext::new(hits))
    }

    fn document_count(&self) -> usize {
        self.documents.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::HashedEmbeddingGenerator;
    use tempfile::TempDir;

    fn hashed() -> Arc<dyn EmbeddingGenerator> {
        Arc::new(HashedEmbeddingGenerator::default())
    }

    /// Embeds every text to the same vector so all scores tie.
    struct ConstantEmbedding;

    impl EmbeddingGenerator for ConstantEmbedding {
        fn generate_embeddings(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, KnowledgeError> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }

        fn dimension(&self) -> usize {
            2
        }

        fn model_name(&self) -> &str {
            "constant"
        }
    }

    #[test]
    fn test_initialize_builds_then_loads() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = KnowledgePersistence::new(temp_dir.path().join("knowledge"));

        let built = KnowledgeStore::initialize(&persistence, hashed()).unwrap();
        assert_eq!(built.len(), 4);
        assert!(persistence.exists());

        let loaded = KnowledgeStore::initialize(&persistence, hashed()).unwrap();
        assert_eq!(loaded.len(), 4);
        assert_eq!(loaded.metadata().model_name, "hashed-bow");
        assert_eq!(
            loaded.documents().map(|d| d.text.clone()).collect::<Vec<_>>(),
            built.documents().map(|d| d.text.clone()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_initialize_rejects_other_model() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = KnowledgePersistence::new(temp_dir.path());
        KnowledgeStore::initialize(&persistence, hashed()).unwrap();

        let result = KnowledgeStore::initialize(&persistence, Arc::new(ConstantEmbedding));
        assert!(matches!(result, Err(KnowledgeError::Storage { .. })));
    }

    #[test]
    fn test_retrieve_ranks_matching_document_first() {
        let store = KnowledgeStore::build(default_corpus(), hashed()).unwrap();

        let context = store
            .retrieve("cholesterol: reduce saturated fats, omega-3 fish", 2)
            .unwrap();
        assert_eq!(context.len(), 2);
        assert!(context.hits()[0].document.text.contains("High Cholesterol"));
        assert!(context.hits()[0].score >= context.hits()[1].score);
    }

    #[test]
    fn test_retrieve_ties_follow_corpus_order() {
        let documents = vec![
            KnowledgeDocument::new("first"),
            KnowledgeDocument::new("second"),
            KnowledgeDocument::new("third"),
        ];
        let store = KnowledgeStore::build(documents, Arc::new(ConstantEmbedding)).unwrap();

        let context = store.retrieve("anything", 2).unwrap();
        let texts: Vec<&str> = context.texts().collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[test]
    fn test_retrieve_is_deterministic() {
        let store = KnowledgeStore::build(default_corpus(), hashed()).unwrap();
        let first = store.retrieve("Obese Hypertension", 2).unwrap();
        let second = store.retrieve("Obese Hypertension", 2).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_retrieve_with_more_k_than_documents() {
        let store = KnowledgeStore::build(default_corpus(), hashed()).unwrap();
        assert_eq!(store.retrieve("weight", 10).unwrap().len(), 4);
    }

    #[test]
    fn test_retrieve_rejects_zero_k() {
        let store = KnowledgeStore::build(default_corpus(), hashed()).unwrap();
        assert!(matches!(
            store.retrieve("weight", 0),
            Err(KnowledgeError::InvalidTopK)
        ));
    }

    #[test]
    fn test_empty_store_returns_empty_context() {
        let store = KnowledgeStore::build(Vec::new(), hashed()).unwrap();
        assert!(store.retrieve("Normal weight", 2).unwrap().is_empty());
    }

    #[test]
    fn test_transient_classification() {
        assert!(KnowledgeError::Embedding("timeout".into()).is_transient());
        assert!(!KnowledgeError::ProviderUnavailable("gone".into()).is_transient());
        assert!(!KnowledgeError::InvalidTopK.is_transient());
    }
}
