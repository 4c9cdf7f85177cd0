use serde::{Deserialize, Serialize};

/// A short clinical guidance passage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeDocument {
    pub text: String,
}

impl KnowledgeDocument {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// First line of the document, used as a display title.
    #[must_use]
    pub fn headline(&self) -> &str {
        self.text.lines().next().unwrap_or("").trim()
    }
}

/// A document with its persisted embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDocument {
    pub document: KnowledgeDocument,
    pub vector: Vec<f32>,
}

/// A retrieval hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredDocument {
    pub document: KnowledgeDocument,
    pub score: f32,
    /// Position in the corpus; ties in score are ordered by this.
    pub position: usize,
}

/// Ranked retrieval output, best match first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RetrievedContext {
    hits: Vec<ScoredDocument>,
}

impl RetrievedContext {
    /// Wrap hits that are already ranked.
    #[must_use]
    pub fn new(hits: Vec<ScoredDocument>) -> Self {
        Self { hits }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a context from plain texts in the given rank order.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let hits = texts
            .into_iter()
            .enumerate()
            .map(|(position, text)| ScoredDocument {
                document: KnowledgeDocument::new(text),
                score: 0.0,
                position,
            })
            .collect();
        Self { hits }
    }

    #[must_use]
    pub fn hits(&self) -> &[ScoredDocument] {
        &self.hits
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.hits.iter().map(|hit| hit.document.text.as_str())
    }

    /// Document texts joined by newlines, in rank order.
    #[must_use]
    pub fn joined_text(&self) -> String {
        self.texts().collect::<Vec<_>>().join("\n")
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}
