//! Embedding generation for the knowledge store.
//!
//! The store only sees the [`EmbeddingGenerator`] trait. Two providers ship
//! with the crate: fastembed for real semantic vectors and a hashed
//! bag-of-words generator that needs no model download.

use super::KnowledgeError;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::path::PathBuf;
use std::sync::Mutex;

/// Default dimension for the hashed generator (matches bge-small).
pub const DEFAULT_HASHED_DIMENSION: usize = 384;

/// Name recorded in metadata for the hashed generator.
pub const HASHED_MODEL_NAME: &str = "hashed-bow";

/// Trait for generating embeddings from text.
///
/// Implementations must be deterministic for a fixed input so retrieval
/// ranking is reproducible.
pub trait EmbeddingGenerator: Send + Sync {
    /// Generate embeddings for multiple texts, one vector per input.
    fn generate_embeddings(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, KnowledgeError>;

    /// Dimension of the vectors produced by this generator.
    #[must_use]
    fn dimension(&self) -> usize;

    /// Identifier persisted alongside stored vectors.
    fn model_name(&self) -> &str;

    /// Embed a single text.
    fn embed(&self, text: &str) -> Result<Vec<f32>, KnowledgeError> {
        self.generate_embeddings(&[text])?
            .into_iter()
            .next()
            .ok_or_else(|| KnowledgeError::Embedding("provider returned no vector".to_string()))
    }
}

/// FastEmbed implementation.
///
/// Defaults to BGESmallENV15 (384 dimensions). The model is downloaded to
/// the cache directory on first use.
pub struct FastEmbedGenerator {
    model: Mutex<TextEmbedding>,
    model_name: String,
    dimension: usize,
}

impl std::fmt::Debug for FastEmbedGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastEmbedGenerator")
            .field("model_name", &self.model_name)
            .field("dimension", &self.dimension)
            .field("model", &"<TextEmbedding>")
            .finish()
    }
}

impl FastEmbedGenerator {
    /// Create a generator for the named model.
    ///
    /// # Errors
    /// Returns `ModelInit` if the model name is unknown or the model fails
    /// to download or load.
    pub fn new(
        model_name: &str,
        cache_dir: PathBuf,
        show_download_progress: bool,
    ) -> Result<Self, KnowledgeError> {
        let model = parse_embedding_model(model_name)?;

        let mut text_model = TextEmbedding::try_new(
            InitOptions::new(model)
                .with_cache_dir(cache_dir)
                .with_show_download_progress(show_download_progress),
        )
        .map_err(|e| KnowledgeError::ModelInit(format!(
            "{e}. Ensure you have internet connection for first-time model download"
        )))?;

        // Probe the output size instead of trusting a lookup table
        let probe = text_model
            .embed(vec!["dimension probe"], None)
            .map_err(|e| KnowledgeError::ModelInit(format!("Model probe failed: {e}")))?;
        let dimension = probe
            .into_iter()
            .next()
            .map(|v| v.len())
            .ok_or_else(|| KnowledgeError::ModelInit("Model probe returned no vector".into()))?;

        tracing::debug!("Loaded embedding model {model_name} ({dimension} dimensions)");

        Ok(Self {
            model: Mutex::new(text_model),
            model_name: model_name.to_string(),
            dimension,
        })
    }
}

impl EmbeddingGenerator for FastEmbedGenerator {
    fn generate_embeddings(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, KnowledgeError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let text_strings: Vec<String> = texts.iter().map(|&s| s.to_string()).collect();

        let embeddings = self
            .model
            .lock()
            .map_err(|_| {
                KnowledgeError::ProviderUnavailable(
                    "Failed to acquire embedding model lock - model may be poisoned".to_string(),
                )
            })?
            .embed(text_strings, None)
            .map_err(|e| KnowledgeError::Embedding(format!("Failed to generate embeddings: {e}")))?;

        for embedding in &embeddings {
            if embedding.len() != self.dimension {
                return Err(KnowledgeError::DimensionMismatch {
                    expected: self.dimension,
                    actual: embedding.len(),
                    suggestion: "The embedding model changed while loaded".to_string(),
                });
            }
        }

        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Deterministic embedding generator based on feature hashing.
///
/// Each lowercase alphanumeric token is hashed into one bucket with a
/// hash-derived sign, then the vector is L2-normalized. Texts sharing
/// vocabulary score high under cosine similarity.
#[derive(Debug, Clone)]
pub struct HashedEmbeddingGenerator {
    dimension: usize,
}

impl Default for HashedEmbeddingGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_HASHED_DIMENSION)
    }
}

impl HashedEmbeddingGenerator {
    /// Create a generator producing `dimension`-sized vectors (minimum 1).
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        for token in tokenize(text) {
            let hash = fnv1a_64(token.as_bytes());
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }
        normalize(&mut vector);
        vector
    }
}

impl EmbeddingGenerator for HashedEmbeddingGenerator {
    fn generate_embeddings(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, KnowledgeError> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        HASHED_MODEL_NAME
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}

fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    hash
}

fn normalize(vector: &mut [f32]) {
    let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if magnitude > 0.0 {
        for value in vector.iter_mut() {
            *value /= magnitude;
        }
    }
}

/// Calculate cosine similarity between two vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot_product / (magnitude_a * magnitude_b)
}

/// Map a configured model name to a fastembed model.
pub fn parse_embedding_model(name: &str) -> Result<EmbeddingModel, KnowledgeError> {
    match name {
        "BGESmallENV15" => Ok(EmbeddingModel::BGESmallENV15),
        "BGEBaseENV15" => Ok(EmbeddingModel::BGEBaseENV15),
        "AllMiniLML6V2" => Ok(EmbeddingModel::AllMiniLML6V2),
        "AllMiniLML12V2" => Ok(EmbeddingModel::AllMiniLML12V2),
        other => Err(KnowledgeError::ModelInit(format!(
            "Unknown embedding model '{other}' (expected BGESmallENV15, BGEBaseENV15, AllMiniLML6V2 or AllMiniLML12V2)"
        ))),
    }
}
