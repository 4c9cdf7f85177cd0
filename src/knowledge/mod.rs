//! Clinical guidance knowledge store
//!
//! A small fixed corpus embedded once, persisted under the configured
//! index path, and searched by cosine similarity.

mod corpus;
mod embedding;
mod metadata;
mod persistence;
mod store;
mod types;

pub use corpus::{CORPUS_VERSION, default_corpus};
pub use embedding::{
    DEFAULT_HASHED_DIMENSION, EmbeddingGenerator, FastEmbedGenerator, HASHED_MODEL_NAME,
    HashedEmbeddingGenerator, cosine_similarity, parse_embedding_model,
};
pub use metadata::KnowledgeMetadata;
pub use persistence::{KnowledgePersistence, PersistedKnowledge};
pub use store::{KnowledgeError, KnowledgeSource, KnowledgeStore};
pub use types::{KnowledgeDocument, RetrievedContext, ScoredDocument, StoredDocument};
