//! Table formatting utilities for structured output.

use crate::knowledge::{KnowledgeMetadata, RetrievedContext};
use crate::render::DietPlan;
use comfy_table::{
    Attribute, Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
};
use std::path::Path;

fn styled_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.apply_modifier(UTF8_ROUND_CORNERS);
    table.set_header(
        headers
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );
    table
}

/// Metric/value summary shown above a rendered plan.
pub fn create_health_summary_table(plan: &DietPlan) -> String {
    let mut table = styled_table(&["Metric", "Value"]);
    let metrics = &plan.metrics;

    table.add_row(vec!["Age".to_string(), plan.age.to_string()]);
    table.add_row(vec![
        "Weight / Height".to_string(),
        format!("{} kg / {} cm", metrics.weight_kg(), metrics.height_cm()),
    ]);
    table.add_row(vec!["BMI".to_string(), format!("{:.1}", plan.bmi)]);
    table.add_row(vec![
        "Blood pressure".to_string(),
        metrics
            .blood_pressure()
            .map_or_else(|| "unreadable".to_string(), |bp| bp.to_string()),
    ]);
    table.add_row(vec![
        "Fasting glucose".to_string(),
        format!("{} mg/dL", metrics.fasting_glucose()),
    ]);
    table.add_row(vec![
        "Total cholesterol".to_string(),
        format!("{} mg/dL", metrics.total_cholesterol()),
    ]);

    // comfy-table handles its own colors better than ANSI strings
    for label in &plan.conditions {
        let color = if *label == "Normal weight" {
            Color::Green
        } else {
            Color::Red
        };
        let name = if *label == plan.primary_condition() {
            "Weight category"
        } else {
            "Condition"
        };
        table.add_row(vec![
            Cell::new(name),
            Cell::new(label).fg(color).add_attribute(Attribute::Bold),
        ]);
    }

    table.to_string()
}

/// Ranked search hits: rank, headline, score.
pub fn create_search_table(context: &RetrievedContext) -> String {
    let mut table = styled_table(&["#", "Document", "Score"]);
    for (rank, hit) in context.hits().iter().enumerate() {
        table.add_row(vec![
            (rank + 1).to_string(),
            hit.document.headline().to_string(),
            format!("{:.3}", hit.score),
        ]);
    }
    table.to_string()
}

/// Summary printed after building or loading the knowledge base.
pub fn create_index_summary_table(metadata: &KnowledgeMetadata, index_path: &Path) -> String {
    let mut table = styled_table(&["Property", "Value"]);
    table.add_row(vec!["Location".to_string(), index_path.display().to_string()]);
    table.add_row(vec!["Documents".to_string(), metadata.document_count.to_string()]);
    table.add_row(vec!["Model".to_string(), metadata.model_name.clone()]);
    table.add_row(vec!["Dimension".to_string(), metadata.dimension.to_string()]);
    table.add_row(vec![
        "Corpus version".to_string(),
        metadata.corpus_version.to_string(),
    ]);
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::compose::RecommendationList;
    use crate::knowledge::{
        HashedEmbeddingGenerator, KnowledgeSource, KnowledgeStore, default_corpus,
    };
    use crate::metrics::{DerivedMetrics, HealthProfile, validate};
    use crate::render::PlanRenderer;
    use chrono::Utc;
    use std::sync::Arc;

    #[test]
    fn test_health_summary_marks_weight_category() {
        let profile = HealthProfile {
            age: 45,
            weight_kg: 95.0,
            height_cm: 170.0,
            blood_pressure: "150/95".to_string(),
            fasting_glucose: 100.0,
            total_cholesterol: 180.0,
        };
        let metrics = validate(&profile).unwrap().metrics;
        let derived = DerivedMetrics::from_metrics(&metrics).unwrap();
        let conditions = classify(&metrics, &derived);
        let plan = PlanRenderer
            .render(
                &metrics,
                &derived,
                &conditions,
                RecommendationList::default_list(),
                Utc::now(),
            )
            .unwrap();

        let table = create_health_summary_table(&plan);
        assert_eq!(table.matches("Weight category").count(), 1);
        assert!(table.contains("Obese"));
        assert!(table.contains("Hypertension"));
        assert!(table.contains("150/95"));
    }

    #[test]
    fn test_search_table_lists_headlines() {
        let store = KnowledgeStore::build(
            default_corpus(),
            Arc::new(HashedEmbeddingGenerator::default()),
        )
        .unwrap();
        let context = store.retrieve("blood pressure sodium", 4).unwrap();

        let table = create_search_table(&context);
        assert!(table.contains("Condition: Hypertension"));
        assert!(table.contains("Score"));
    }

    #[test]
    fn test_index_summary_table() {
        let metadata = KnowledgeMetadata::new("hashed-bow".to_string(), 384, 4, 1);
        let table = create_index_summary_table(&metadata, Path::new("/tmp/knowledge"));
        assert!(table.contains("hashed-bow"));
        assert!(table.contains("/tmp/knowledge"));
    }
}
