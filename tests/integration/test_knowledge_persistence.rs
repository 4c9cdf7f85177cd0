//! Knowledge base build, reload and rebuild on disk.

use crate::common::{create_hashed_store, create_test_settings};
use health_advisor::config::EmbeddingBackend;
use health_advisor::knowledge::{KnowledgeMetadata, KnowledgePersistence, KnowledgeSource};
use health_advisor::{AdvisorError, KnowledgeError, open_knowledge_store};
use tempfile::TempDir;

#[test]
fn test_store_is_persisted_and_reloaded() {
    let temp_dir = TempDir::new().unwrap();
    let index_path = temp_dir.path().join("knowledge");

    let built = create_hashed_store(&index_path);
    let metadata = KnowledgeMetadata::load(&index_path).unwrap();
    assert_eq!(metadata.document_count, 4);
    assert_eq!(metadata.model_name, "hashed-bow");

    let reloaded = create_hashed_store(&index_path);
    let query = "Obese Hypertension";
    assert_eq!(
        built.retrieve(query, 2).unwrap(),
        reloaded.retrieve(query, 2).unwrap()
    );
}

#[test]
fn test_dimension_change_requires_rebuild() {
    let (mut settings, _temp_dir) = create_test_settings();
    open_knowledge_store(&settings, false).unwrap();

    settings.embedding.dimension = 64;
    let err = open_knowledge_store(&settings, false).unwrap_err();
    assert!(matches!(
        err,
        AdvisorError::StoreInit(KnowledgeError::DimensionMismatch { .. })
    ));

    let rebuilt = open_knowledge_store(&settings, true).unwrap();
    assert_eq!(rebuilt.metadata().dimension, 64);
}

#[test]
fn test_corrupted_documents_fail_store_init() {
    let (settings, _temp_dir) = create_test_settings();
    open_knowledge_store(&settings, false).unwrap();

    std::fs::write(
        settings.knowledge.index_path.join("documents.json"),
        "not json",
    )
    .unwrap();

    assert!(matches!(
        open_knowledge_store(&settings, false),
        Err(AdvisorError::StoreInit(KnowledgeError::Storage { .. }))
    ));
}

#[test]
fn test_clear_forces_rebuild_on_next_open() {
    let (settings, _temp_dir) = create_test_settings();
    assert_eq!(settings.embedding.backend, EmbeddingBackend::Hashed);
    open_knowledge_store(&settings, false).unwrap();

    let persistence = KnowledgePersistence::new(&settings.knowledge.index_path);
    persistence.clear().unwrap();
    assert!(!persistence.exists());

    let store = open_knowledge_store(&settings, false).unwrap();
    assert_eq!(store.document_count(), 4);
    assert!(persistence.exists());
}

#[test]
#[ignore = "Downloads the BGESmallENV15 embedding model"]
fn test_fastembed_store_ranks_hypertension_guidance() {
    let (mut settings, temp_dir) = create_test_settings();
    settings.embedding.backend = EmbeddingBackend::Fastembed;
    settings.embedding.cache_dir = temp_dir.path().join("models");

    let store = open_knowledge_store(&settings, false).unwrap();
    let context = store.retrieve("Obese Hypertension", 2).unwrap();
    assert_eq!(context.len(), 2);
    assert!(
        context
            .texts()
            .any(|text| text.contains("Hypertension | High Blood Pressure"))
    );

    let reloaded = open_knowledge_store(&settings, false).unwrap();
    assert_eq!(reloaded.metadata().model_name, "BGESmallENV15");
}
