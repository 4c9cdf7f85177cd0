#![allow(dead_code)]

use health_advisor::config::EmbeddingBackend;
use health_advisor::knowledge::{
    HashedEmbeddingGenerator, KnowledgeError, KnowledgePersistence, KnowledgeSource,
    KnowledgeStore, RetrievedContext,
};
use health_advisor::{HealthProfile, Settings};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

pub fn profile(
    age: u32,
    weight_kg: f64,
    height_cm: f64,
    blood_pressure: &str,
    fasting_glucose: f64,
    total_cholesterol: f64,
) -> HealthProfile {
    HealthProfile {
        age,
        weight_kg,
        height_cm,
        blood_pressure: blood_pressure.to_string(),
        fasting_glucose,
        total_cholesterol,
    }
}

/// Healthy adult with the CLI's default form values.
pub fn healthy_profile() -> HealthProfile {
    profile(30, 70.0, 170.0, "120/80", 100.0, 180.0)
}

/// Obese subject with every risk factor.
pub fn high_risk_profile() -> HealthProfile {
    profile(45, 95.0, 170.0, "150/95", 130.0, 210.0)
}

/// A knowledge source that never returns anything.
pub struct EmptySource;

impl KnowledgeSource for EmptySource {
    fn retrieve(&self, _query: &str, _k: usize) -> Result<RetrievedContext, KnowledgeError> {
        Ok(RetrievedContext::empty())
    }

    fn document_count(&self) -> usize {
        0
    }
}

/// Builds (and persists) the default corpus with the hashed embedder.
pub fn create_hashed_store(index_path: &Path) -> KnowledgeStore {
    let persistence = KnowledgePersistence::new(index_path);
    KnowledgeStore::initialize(&persistence, Arc::new(HashedEmbeddingGenerator::default()))
        .expect("Failed to build knowledge store")
}

/// Settings with an isolated index directory and no model download.
pub fn create_test_settings() -> (Settings, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut settings = Settings::default();
    settings.knowledge.index_path = temp_dir.path().join("knowledge");
    settings.embedding.backend = EmbeddingBackend::Hashed;
    settings.export.directory = temp_dir.path().join("plans");
    (settings, temp_dir)
}
