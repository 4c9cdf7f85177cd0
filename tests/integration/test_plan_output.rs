//! Plan export and JSON output.

use crate::common::{EmptySource, create_test_settings, healthy_profile, high_risk_profile};
use health_advisor::Advisor;
use health_advisor::io::{ExitCode, JsonResponse, export_file_name, export_with_config};
use std::sync::Arc;

#[test]
fn test_export_uses_configured_directory_and_prefix() {
    let (mut settings, _temp_dir) = create_test_settings();
    settings.export.file_prefix = "my_plan".to_string();

    let advice = Advisor::new(Arc::new(EmptySource))
        .advise(&healthy_profile())
        .unwrap();
    let path = export_with_config(&advice.plan, &settings.export, None).unwrap();

    assert_eq!(path.parent().unwrap(), settings.export.directory);
    assert_eq!(
        path.file_name().unwrap().to_str().unwrap(),
        export_file_name("my_plan", advice.plan.generated_at)
    );
    assert_eq!(std::fs::read_to_string(path).unwrap(), advice.plan.text);
}

#[test]
fn test_plan_json_response_shape() {
    let advice = Advisor::new(Arc::new(EmptySource))
        .advise(&healthy_profile())
        .unwrap();
    let response = JsonResponse::success(&advice.plan).with_warnings(&advice.warnings);
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["status"], "success");
    assert_eq!(json["exit_code"], ExitCode::Success as u8);
    assert_eq!(json["data"]["bmi"], 24.2);
    assert_eq!(json["data"]["conditions"][0], "Normal weight");
    assert_eq!(json["data"]["recommendations"]["source"], "default");
    assert_eq!(json["data"]["meal_plan"].as_array().unwrap().len(), 5);
    assert!(json["data"]["generated_at"].is_string());
}

#[test]
fn test_plan_json_uses_condition_labels() {
    let advice = Advisor::new(Arc::new(EmptySource))
        .advise(&high_risk_profile())
        .unwrap();
    let json = serde_json::to_value(JsonResponse::success(&advice.plan)).unwrap();

    assert_eq!(
        json["data"]["conditions"],
        serde_json::json!([
            "Obese",
            "Hypertension",
            "High Blood Sugar",
            "High Cholesterol"
        ])
    );
}

#[test]
fn test_error_json_response_shape() {
    let err = Advisor::unavailable("model missing")
        .advise(&healthy_profile())
        .unwrap_err();
    let json = serde_json::to_value(JsonResponse::from_error(&err)).unwrap();

    assert_eq!(json["status"], "error");
    assert_eq!(json["code"], "KNOWLEDGE_UNAVAILABLE");
    assert_eq!(json["exit_code"], ExitCode::KnowledgeUnavailable as u8);
    assert!(!json["error"]["suggestions"].as_array().unwrap().is_empty());
}

#[test]
fn test_export_failure_maps_to_io_exit_code() {
    let (mut settings, temp_dir) = create_test_settings();
    let blocker = temp_dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();
    settings.export.directory = blocker.join("plans");

    let advice = Advisor::new(Arc::new(EmptySource))
        .advise(&healthy_profile())
        .unwrap();
    let err = export_with_config(&advice.plan, &settings.export, None).unwrap_err();
    let json = serde_json::to_value(JsonResponse::from_error(&err)).unwrap();

    assert_eq!(json["code"], "EXPORT_ERROR");
    assert_eq!(json["exit_code"], ExitCode::IoError as u8);
}
