//! Built-in clinical guidance corpus.

use super::KnowledgeDocument;

/// Bumped whenever the default documents change so stale indexes are detected.
pub const CORPUS_VERSION: u32 = 1;

struct GuidanceEntry {
    condition: &'static str,
    criteria: &'static str,
    recommendations: &'static [&'static str],
}

const DEFAULT_GUIDANCE: &[GuidanceEntry] = &[
    GuidanceEntry {
        condition: "Hypertension | High Blood Pressure",
        criteria: "BP > 140/90 mmHg",
        recommendations: &[
            "Sodium restriction <1500mg/day",
            "Potassium-rich foods: bananas, spinach, sweet potatoes",
            "Whole grains and lean proteins",
            "Limit alcohol/caffeine",
        ],
    },
    GuidanceEntry {
        condition: "Diabetes | High Blood Sugar",
        criteria: "Fasting glucose > 126 mg/dL",
        recommendations: &[
            "Low glycemic index foods",
            "Balanced carbohydrate distribution",
            "High fiber intake",
            "Healthy fats: avocado, nuts",
        ],
    },
    GuidanceEntry {
        condition: "Hyperlipidemia | High Cholesterol",
        criteria: "LDL > 130 mg/dL",
        recommendations: &[
            "Reduce saturated fats",
            "Omega-3 sources: fish, flaxseeds",
            "Soluble fiber: oats, beans",
            "Plant sterols/stanols",
        ],
    },
    GuidanceEntry {
        condition: "Weight Management",
        criteria: "BMI > 25",
        recommendations: &[
            "Calorie deficit: 500-750 kcal/day",
            "High protein intake",
            "Portion control",
            "Regular exercise",
        ],
    },
];

impl GuidanceEntry {
    fn to_document(&self) -> KnowledgeDocument {
        let mut text = format!(
            "Condition: {}\nDiagnostic Criteria: {}\nRecommendations:",
            self.condition, self.criteria
        );
        for recommendation in self.recommendations {
            text.push_str("\n- ");
            text.push_str(recommendation);
        }
        KnowledgeDocument::new(text)
    }
}

/// The default corpus, in insertion order.
#[must_use]
pub fn default_corpus() -> Vec<KnowledgeDocument> {
    DEFAULT_GUIDANCE.iter().map(GuidanceEntry::to_document).collect()
}
