//! Guidance retrieval for a classified subject

use crate::classify::ConditionSet;
use crate::error::{AdvisorError, AdvisorResult};
use crate::knowledge::{KnowledgeSource, RetrievedContext};
use std::sync::Arc;

/// Documents retrieved per request unless configured otherwise.
pub const DEFAULT_TOP_K: usize = 2;

/// Queries the knowledge source with the subject's condition labels.
#[derive(Clone)]
pub struct GuidanceRetriever {
    source: Arc<dyn KnowledgeSource>,
    top_k: usize,
}

impl GuidanceRetriever {
    pub fn new(source: Arc<dyn KnowledgeSource>) -> Self {
        Self {
            source,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Override the retrieval depth. Values below 1 are rejected at query time.
    #[must_use]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    #[must_use]
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Retrieve the most relevant guidance for `conditions`.
    ///
    /// A transient embedding failure is logged and yields an empty context.
    /// Any other store failure is returned as `AdvisorError::Retrieval`.
    pub fn retrieve_guidance(&self, conditions: &ConditionSet) -> AdvisorResult<RetrievedContext> {
        let query = build_query(conditions);

        match self.source.retrieve(&query, self.top_k) {
            Ok(context) => {
                tracing::debug!(
                    "Guidance query '{query}' matched {} of {} documents",
                    context.len(),
                    self.source.document_count()
                );
                Ok(context)
            }
            Err(e) if e.is_transient() => {
                tracing::warn!("Guidance retrieval failed, continuing without context: {e}");
                Ok(RetrievedContext::empty())
            }
            Err(e) => Err(AdvisorError::Retrieval(e)),
        }
    }
}

impl std::fmt::Debug for GuidanceRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuidanceRetriever")
            .field("document_count", &self.source.document_count())
            .field("top_k", &self.top_k)
            .finish()
    }
}

/// Condition labels joined by single spaces, weight category first.
#[must_use]
pub fn build_query(conditions: &ConditionSet) -> String {
    conditions.labels().join(" ")
}

/// A source that always fails, for exercising error paths.
#[cfg(test)]
pub(crate) struct FailingSource(pub fn() -> crate::knowledge::KnowledgeError);

#[cfg(test)]
impl KnowledgeSource for FailingSource {
    fn retrieve(
        &self,
        _query: &str,
        _k: usize,
    ) -> Result<RetrievedContext, crate::knowledge::KnowledgeError> {
        Err((self.0)())
    }

    fn document_count(&self) -> usize {
        0
    }
}
