//! End-to-end advisory pipeline.
//!
//! Stages run in a fixed order: validate, derive, classify, retrieve,
//! compose, render. Each stage returns an explicit result and the first
//! fatal error stops the request.

use crate::classify::{ConditionSet, classify};
use crate::compose::{MarkerComposer, RecommendationComposer};
use crate::config::{EmbeddingBackend, EmbeddingConfig, Settings};
use crate::error::{AdvisorError, AdvisorResult};
use crate::knowledge::{
    EmbeddingGenerator, FastEmbedGenerator, HashedEmbeddingGenerator, KnowledgeError,
    KnowledgePersistence, KnowledgeSource, KnowledgeStore,
};
use crate::metrics::{DerivedMetrics, HealthProfile, validate};
use crate::render::{DietPlan, PlanRenderer};
use crate::retrieve::GuidanceRetriever;
use chrono::Utc;
use std::sync::Arc;

/// Result of a successful request.
#[derive(Debug)]
pub struct Advice {
    pub plan: DietPlan,
    /// Non-fatal problems, e.g. an unreadable blood pressure.
    pub warnings: Vec<AdvisorError>,
}

impl Advice {
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

enum Backend {
    Ready(GuidanceRetriever),
    Unavailable(String),
}

/// Runs requests against a shared, read-only knowledge source.
pub struct Advisor {
    backend: Backend,
    composer: Box<dyn RecommendationComposer>,
    renderer: PlanRenderer,
}

impl Advisor {
    pub fn new(source: Arc<dyn KnowledgeSource>) -> Self {
        Self {
            backend: Backend::Ready(GuidanceRetriever::new(source)),
            composer: Box::new(MarkerComposer),
            renderer: PlanRenderer,
        }
    }

    /// An advisor whose store failed to initialize.
    ///
    /// Every request fails with `KnowledgeUnavailable`.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            backend: Backend::Unavailable(reason.into()),
            composer: Box::new(MarkerComposer),
            renderer: PlanRenderer,
        }
    }

    #[must_use]
    pub fn with_composer(mut self, composer: Box<dyn RecommendationComposer>) -> Self {
        self.composer = composer;
        self
    }

    #[must_use]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.backend = match self.backend {
            Backend::Ready(retriever) => Backend::Ready(retriever.with_top_k(top_k)),
            unavailable => unavailable,
        };
        self
    }

    /// Produce a diet plan for `profile`.
    pub fn advise(&self, profile: &HealthProfile) -> AdvisorResult<Advice> {
        let retriever = match &self.backend {
            Backend::Ready(retriever) => retriever,
            Backend::Unavailable(reason) => {
                return Err(AdvisorError::KnowledgeUnavailable {
                    reason: reason.clone(),
                });
            }
        };

        let validated = validate(profile)?;
        let metrics = validated.metrics;
        let derived = DerivedMetrics::from_metrics(&metrics)?;
        let conditions: ConditionSet = classify(&metrics, &derived);
        tracing::info!("BMI {} classified as: {conditions}", derived.bmi);

        let context = retriever.retrieve_guidance(&conditions)?;
        let recommendations = self.composer.compose(&context);
        tracing::debug!(
            "Composed {} recommendations ({:?})",
            recommendations.len(),
            recommendations.source()
        );

        let plan = self.renderer.render(
            &metrics,
            &derived,
            &conditions,
            recommendations,
            Utc::now(),
        )?;

        Ok(Advice {
            plan,
            warnings: validated.warnings,
        })
    }
}

/// Create the embedding provider selected in `config`.
pub fn create_embedder(
    config: &EmbeddingConfig,
) -> Result<Arc<dyn EmbeddingGenerator>, KnowledgeError> {
    match config.backend {
        EmbeddingBackend::Fastembed => {
            let generator = FastEmbedGenerator::new(
                &config.model,
                config.cache_dir.clone(),
                config.show_download_progress,
            )?;
            Ok(Arc::new(generator))
        }
        EmbeddingBackend::Hashed => Ok(Arc::new(HashedEmbeddingGenerator::new(config.dimension))),
    }
}

/// Load or build the knowledge store described by `settings`.
///
/// With `rebuild` set the persisted index is replaced. Any failure is
/// reported as `StoreInit`.
pub fn open_knowledge_store(settings: &Settings, rebuild: bool) -> AdvisorResult<KnowledgeStore> {
    let persistence = KnowledgePersistence::new(&settings.knowledge.index_path);
    let embedder = create_embedder(&settings.embedding).map_err(AdvisorError::StoreInit)?;

    let store = if rebuild {
        KnowledgeStore::rebuild(&persistence, embedder)
    } else {
        KnowledgeStore::initialize(&persistence, embedder)
    };
    store.map_err(AdvisorError::StoreInit)
}

impl Advisor {
    /// Build an advisor from settings.
    ///
    /// A store that fails to initialize is logged once and yields an
    /// advisor that rejects every request.
    pub fn from_settings(settings: &Settings) -> Self {
        match open_knowledge_store(settings, false) {
            Ok(store) => Self::new(Arc::new(store)).with_top_k(settings.knowledge.top_k),
            Err(e) => {
                tracing::error!("{e}");
                Self::unavailable(e.to_string())
            }
        }
    }
}

impl std::fmt::Debug for Advisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_struct("Advisor");
        match &self.backend {
            Backend::Ready(retriever) => debug.field("retriever", retriever),
            Backend::Unavailable(reason) => debug.field("unavailable", reason),
        };
        debug.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::{DEFAULT_RECOMMENDATIONS, RecommendationList};
    use crate::knowledge::{KnowledgeError, RetrievedContext};
    use crate::retrieve::FailingSource;
    use tempfile::TempDir;

    struct FixedSource(RetrievedContext);

    impl KnowledgeSource for FixedSource {
        fn retrieve(&self, _query: &str, k: usize) -> Result<RetrievedContext, KnowledgeError> {
            let hits = self.0.hits().iter().take(k).cloned().collect();
            Ok(RetrievedContext::new(hits))
        }

        fn document_count(&self) -> usize {
            self.0.len()
        }
    }

    struct UppercaseComposer;

    impl RecommendationComposer for UppercaseComposer {
        fn compose(&self, context: &RetrievedContext) -> RecommendationList {
            RecommendationList::from_lines(context.texts().map(str::to_uppercase).collect())
        }
    }

    fn profile() -> HealthProfile {
        HealthProfile {
            age: 30,
            weight_kg: 70.0,
            height_cm: 170.0,
            blood_pressure: "120/80".to_string(),
            fasting_glucose: 100.0,
            total_cholesterol: 180.0,
        }
    }

    fn empty_advisor() -> Advisor {
        Advisor::new(Arc::new(FixedSource(RetrievedContext::empty())))
    }

    #[test]
    fn test_empty_retrieval_uses_defaults() {
        let advice = empty_advisor().advise(&profile()).unwrap();
        assert_eq!(advice.plan.bmi, 24.2);
        assert_eq!(advice.plan.conditions, vec!["Normal weight"]);
        assert_eq!(advice.plan.recommendations.items(), DEFAULT_RECOMMENDATIONS);
        assert!(!advice.has_warnings());
    }

    #[test]
    fn test_unavailable_rejects_before_validation() {
        let advisor = Advisor::unavailable("model download failed");

        let mut invalid = profile();
        invalid.age = 5;
        assert!(matches!(
            advisor.advise(&invalid),
            Err(AdvisorError::KnowledgeUnavailable { .. })
        ));
    }

    #[test]
    fn test_invalid_input_stops_pipeline() {
        let mut invalid = profile();
        invalid.height_cm = 0.0;
        assert!(matches!(
            empty_advisor().advise(&invalid),
            Err(AdvisorError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_bad_blood_pressure_is_a_warning() {
        let mut p = profile();
        p.blood_pressure = "abc".to_string();
        let advice = empty_advisor().advise(&p).unwrap();
        assert!(advice.has_warnings());
        assert!(!advice.plan.conditions.contains(&"Hypertension"));
    }

    #[test]
    fn test_retrieval_error_propagates() {
        let advisor = Advisor::new(Arc::new(FailingSource(|| {
            KnowledgeError::ProviderUnavailable("offline".to_string())
        })));
        let err = advisor.advise(&profile()).unwrap_err();
        assert!(err.is_global());
    }

    #[test]
    fn test_custom_composer_and_depth() {
        let source = FixedSource(RetrievedContext::from_texts(["first", "second", "third"]));
        let advisor = Advisor::new(Arc::new(source))
            .with_composer(Box::new(UppercaseComposer))
            .with_top_k(1);
        let advice = advisor.advise(&profile()).unwrap();
        assert_eq!(advice.plan.recommendations.items(), ["FIRST"]);
        assert!(advice.plan.text.contains("\n- FIRST\n"));
    }

    fn hashed_settings(index_path: std::path::PathBuf) -> Settings {
        let mut settings = Settings::default();
        settings.knowledge.index_path = index_path;
        settings.embedding.backend = EmbeddingBackend::Hashed;
        settings
    }

    #[test]
    fn test_from_settings_builds_store() {
        let temp_dir = TempDir::new().unwrap();
        let settings = hashed_settings(temp_dir.path().join("knowledge"));

        let advisor = Advisor::from_settings(&settings);
        assert!(advisor.advise(&profile()).is_ok());
        assert!(temp_dir.path().join("knowledge").join("metadata.json").exists());
    }

    #[test]
    fn test_from_settings_with_unwritable_index_is_unavailable() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("not-a-dir");
        std::fs::write(&blocker, "file").unwrap();

        let advisor = Advisor::from_settings(&hashed_settings(blocker.join("knowledge")));
        assert!(matches!(
            advisor.advise(&profile()),
            Err(AdvisorError::KnowledgeUnavailable { .. })
        ));
    }

    #[test]
    fn test_rebuild_replaces_index() {
        let temp_dir = TempDir::new().unwrap();
        let settings = hashed_settings(temp_dir.path().to_path_buf());

        let first = open_knowledge_store(&settings, false).unwrap();
        let rebuilt = open_knowledge_store(&settings, true).unwrap();
        assert_eq!(first.len(), rebuilt.len());
    }
}
