//! Recommendation extraction from retrieved guidance.

use crate::knowledge::RetrievedContext;
use serde::Serialize;

/// Marker that introduces a recommendation line in guidance documents.
pub const RECOMMENDATION_MARKER: &str = "- ";

/// Used whenever no recommendation line can be extracted.
pub const DEFAULT_RECOMMENDATIONS: [&str; 3] = [
    "Balanced nutrition with variety of foods",
    "Stay hydrated (8 glasses of water daily)",
    "Regular meal timings",
];

/// Where a recommendation list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationSource {
    Retrieved,
    Default,
}

/// Recommendations in display order. Either all extracted or all default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendationList {
    items: Vec<String>,
    source: RecommendationSource,
}

impl RecommendationList {
    /// Build from extracted lines. An empty input gives the default list.
    pub fn from_lines(lines: Vec<String>) -> Self {
        if lines.is_empty() {
            return Self::default_list();
        }
        Self {
            items: lines,
            source: RecommendationSource::Retrieved,
        }
    }

    #[must_use]
    pub fn default_list() -> Self {
        Self {
            items: DEFAULT_RECOMMENDATIONS.iter().map(|s| s.to_string()).collect(),
            source: RecommendationSource::Default,
        }
    }

    #[must_use]
    pub fn items(&self) -> &[String] {
        &self.items
    }

    #[must_use]
    pub fn source(&self) -> RecommendationSource {
        self.source
    }

    #[must_use]
    pub fn is_default(&self) -> bool {
        self.source == RecommendationSource::Default
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Turns retrieved guidance into a recommendation list.
pub trait RecommendationComposer: Send + Sync {
    fn compose(&self, context: &RetrievedContext) -> RecommendationList;
}

/// Keeps every trimmed line that starts with [`RECOMMENDATION_MARKER`].
///
/// The marker stays part of the stored line.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerComposer;

impl RecommendationComposer for MarkerComposer {
    fn compose(&self, context: &RetrievedContext) -> RecommendationList {
        let joined = context.joined_text();
        let lines: Vec<String> = joined
            .lines()
            .map(str::trim)
            .filter(|line| line.starts_with(RECOMMENDATION_MARKER))
            .map(str::to_string)
            .collect();

        if lines.is_empty() {
            tracing::debug!(
                "No recommendation lines in {} retrieved documents, using defaults",
                context.len()
            );
        }
        RecommendationList::from_lines(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_marker_lines_in_order() {
        let context = RetrievedContext::from_texts([
            "Condition: Test\n  - Reduce sodium\nNot a bullet",
            "- Eat fish twice weekly",
        ]);
        let list = MarkerComposer.compose(&context);
        assert_eq!(list.items(), ["- Reduce sodium", "- Eat fish twice weekly"]);
        assert_eq!(list.source(), RecommendationSource::Retrieved);
    }

    #[test]
    fn test_no_marker_lines_gives_default() {
        let context = RetrievedContext::from_texts(["Condition: Test\n-no space\n* star"]);
        let list = MarkerComposer.compose(&context);
        assert!(list.is_default());
        assert_eq!(list.items(), DEFAULT_RECOMMENDATIONS);
    }

    #[test]
    fn test_empty_context_gives_default() {
        let list = MarkerComposer.compose(&RetrievedContext::empty());
        assert_eq!(list.len(), 3);
        assert!(list.is_default());
    }

    #[test]
    fn test_corpus_document_yields_its_bullets() {
        let corpus = crate::knowledge::default_corpus();
        let context = RetrievedContext::from_texts([corpus[0].text.clone()]);
        let list = MarkerComposer.compose(&context);
        assert!(!list.is_default());
        assert!(list.items().iter().all(|item| item.starts_with("- ")));
        assert!(list.len() >= 3);
    }
}
