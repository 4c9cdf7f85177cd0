//! End-to-end plan generation through the public `Advisor` API.

use crate::common::{
    EmptySource, create_hashed_store, create_test_settings, healthy_profile, high_risk_profile,
    profile,
};
use health_advisor::{
    Advisor, AdvisorError, DEFAULT_RECOMMENDATIONS, MEAL_TEMPLATE, RecommendationSource,
};
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn test_healthy_subject_gets_default_plan() {
    let advisor = Advisor::new(Arc::new(EmptySource));
    let advice = advisor.advise(&healthy_profile()).unwrap();
    let plan = &advice.plan;

    assert_eq!(plan.bmi, 24.2);
    assert_eq!(plan.conditions, vec!["Normal weight"]);
    assert_eq!(plan.recommendations.items(), DEFAULT_RECOMMENDATIONS);
    assert_eq!(plan.recommendations.source(), RecommendationSource::Default);
    for slot in MEAL_TEMPLATE {
        assert!(
            plan.text.contains(&format!("**{}:** {}", slot.meal, slot.suggestion)),
            "missing meal slot {}",
            slot.meal
        );
    }
    assert!(!advice.has_warnings());
}

#[test]
fn test_high_risk_subject_gets_every_condition() {
    let temp_dir = TempDir::new().unwrap();
    let store = create_hashed_store(temp_dir.path());
    let advisor = Advisor::new(Arc::new(store));

    let advice = advisor.advise(&high_risk_profile()).unwrap();
    let plan = &advice.plan;

    assert_eq!(plan.bmi, 32.9);
    assert_eq!(
        plan.conditions,
        vec![
            "Obese",
            "Hypertension",
            "High Blood Sugar",
            "High Cholesterol"
        ]
    );
    assert!(plan.text.contains("- **BMI:** 32.9 (Obese)"));

    // Two retrieved documents with four bullets each
    assert_eq!(plan.recommendations.source(), RecommendationSource::Retrieved);
    assert_eq!(plan.recommendations.len(), 8);
    assert!(
        plan.recommendations
            .items()
            .iter()
            .all(|item| item.starts_with("- "))
    );
}

#[test]
fn test_identical_requests_render_identical_text() {
    let temp_dir = TempDir::new().unwrap();
    let advisor = Advisor::new(Arc::new(create_hashed_store(temp_dir.path())));

    let first = advisor.advise(&high_risk_profile()).unwrap();
    let second = advisor.advise(&high_risk_profile()).unwrap();
    assert_eq!(first.plan.text, second.plan.text);
    assert_eq!(first.plan.recommendations, second.plan.recommendations);
}

#[test]
fn test_unreadable_blood_pressure_continues_without_hypertension() {
    let advisor = Advisor::new(Arc::new(EmptySource));
    let advice = advisor
        .advise(&profile(50, 80.0, 175.0, "abc", 140.0, 190.0))
        .unwrap();

    assert!(advice.has_warnings());
    assert!(matches!(advice.warnings[0], AdvisorError::Parse { .. }));
    assert_eq!(advice.plan.conditions, vec!["Overweight", "High Blood Sugar"]);
    assert_eq!(advice.plan.metrics.blood_pressure(), None);
}

#[test]
fn test_boundary_readings_are_inclusive() {
    let advisor = Advisor::new(Arc::new(EmptySource));
    let advice = advisor
        .advise(&profile(40, 70.0, 170.0, "140/90", 126.0, 200.0))
        .unwrap();
    assert_eq!(
        advice.plan.conditions,
        vec![
            "Normal weight",
            "Hypertension",
            "High Blood Sugar",
            "High Cholesterol"
        ]
    );

    let below = advisor
        .advise(&profile(40, 70.0, 170.0, "139/89", 125.0, 199.0))
        .unwrap();
    assert_eq!(below.plan.conditions, vec!["Normal weight"]);
}

#[test]
fn test_invalid_fields_are_reported_together() {
    let advisor = Advisor::new(Arc::new(EmptySource));
    match advisor.advise(&profile(12, -1.0, 170.0, "120/80", 100.0, 180.0)) {
        Err(AdvisorError::InvalidInput { errors }) => {
            let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
            assert_eq!(fields, vec!["age", "weight_kg"]);
        }
        other => panic!("expected InvalidInput, got {other:?}"),
    }
}

#[test]
fn test_unavailable_knowledge_base_rejects_every_request() {
    let advisor = Advisor::unavailable("Failed to initialize embedding model");
    for request in [healthy_profile(), high_risk_profile()] {
        let err = advisor.advise(&request).unwrap_err();
        assert!(matches!(err, AdvisorError::KnowledgeUnavailable { .. }));
        assert!(err.is_global());
    }
}

#[test]
fn test_advisor_from_settings_uses_configured_depth() {
    let (mut settings, _temp_dir) = create_test_settings();
    settings.knowledge.top_k = 1;

    let advisor = Advisor::from_settings(&settings);
    let advice = advisor.advise(&high_risk_profile()).unwrap();

    // One document, four bullets
    assert_eq!(advice.plan.recommendations.len(), 4);
}
