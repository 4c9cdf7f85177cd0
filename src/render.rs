//! Diet plan assembly and text rendering.

use crate::classify::ConditionSet;
use crate::compose::{RECOMMENDATION_MARKER, RecommendationList};
use crate::error::{AdvisorError, AdvisorResult};
use crate::metrics::{DerivedMetrics, HealthMetrics};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write;

/// One entry of the sample daily meal plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MealSlot {
    pub meal: &'static str,
    pub suggestion: &'static str,
}

/// The fixed five-slot meal template, in serving order.
pub const MEAL_TEMPLATE: [MealSlot; 5] = [
    MealSlot {
        meal: "Breakfast",
        suggestion: "Whole grain cereal with fruits and nuts",
    },
    MealSlot {
        meal: "Morning Snack",
        suggestion: "Greek yogurt or fresh fruit",
    },
    MealSlot {
        meal: "Lunch",
        suggestion: "Grilled protein with vegetables and quinoa",
    },
    MealSlot {
        meal: "Afternoon Snack",
        suggestion: "Vegetable sticks with hummus",
    },
    MealSlot {
        meal: "Dinner",
        suggestion: "High-fiber meal with lean protein and salad",
    },
];

pub const LIFESTYLE_ADVICE: [&str; 4] = [
    "Engage in 30 minutes of moderate exercise daily",
    "Practice stress-reduction techniques",
    "Get 7-8 hours of quality sleep",
    "Regular health checkups",
];

pub const CLOSING_NOTE: &str = "*Based on analysis of your health metrics and medical guidelines*";

pub const DISCLAIMER: &str = "**Disclaimer:** This system provides general health information and \
should not be used as a substitute for professional medical advice. Always consult a qualified \
healthcare provider before making any changes to your diet or lifestyle.";

/// A finished plan. Built only by [`PlanRenderer::render`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DietPlan {
    pub age: u32,
    pub metrics: HealthMetrics,
    pub bmi: f64,
    pub conditions: Vec<&'static str>,
    pub recommendations: RecommendationList,
    pub meal_plan: Vec<MealSlot>,
    pub generated_at: DateTime<Utc>,
    /// Markdown-style document. Never contains `generated_at`.
    pub text: String,
}

impl DietPlan {
    /// The header label, always the weight category.
    #[must_use]
    pub fn primary_condition(&self) -> &'static str {
        self.conditions.first().copied().unwrap_or_default()
    }
}

/// Renders diet plans from classified metrics and recommendations.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanRenderer;

impl PlanRenderer {
    /// Assemble the plan and its text.
    ///
    /// Fails with `Composition` on empty recommendations or a non-finite BMI.
    pub fn render(
        &self,
        metrics: &HealthMetrics,
        derived: &DerivedMetrics,
        conditions: &ConditionSet,
        recommendations: RecommendationList,
        generated_at: DateTime<Utc>,
    ) -> AdvisorResult<DietPlan> {
        if recommendations.is_empty() {
            return Err(AdvisorError::Composition {
                reason: "recommendation list is empty".to_string(),
            });
        }
        if !derived.bmi.is_finite() {
            return Err(AdvisorError::Composition {
                reason: format!("BMI {} is not a finite number", derived.bmi),
            });
        }

        let text = render_text(metrics.age(), derived.bmi, conditions, &recommendations)
            .map_err(|e| AdvisorError::Composition {
                reason: format!("failed to format plan: {e}"),
            })?;

        Ok(DietPlan {
            age: metrics.age(),
            metrics: metrics.clone(),
            bmi: derived.bmi,
            conditions: conditions.labels(),
            recommendations,
            meal_plan: MEAL_TEMPLATE.to_vec(),
            generated_at,
            text,
        })
    }
}

fn render_text(
    age: u32,
    bmi: f64,
    conditions: &ConditionSet,
    recommendations: &RecommendationList,
) -> Result<String, std::fmt::Error> {
    let mut out = String::new();

    writeln!(out, "## Personalized Diet Plan for {age} Year Old")?;
    writeln!(out)?;
    writeln!(out, "### Health Summary:")?;
    writeln!(out, "- **BMI:** {bmi:.1} ({})", conditions.primary())?;
    writeln!(out, "- **Identified Conditions:** {conditions}")?;
    writeln!(out)?;

    writeln!(out, "### Dietary Recommendations:")?;
    for item in recommendations.items() {
        // Extracted lines already carry the marker
        if item.starts_with(RECOMMENDATION_MARKER) {
            writeln!(out, "{item}")?;
        } else {
            writeln!(out, "{RECOMMENDATION_MARKER}{item}")?;
        }
    }
    writeln!(out)?;

    writeln!(out, "### Sample Daily Meal Plan:")?;
    for slot in &MEAL_TEMPLATE {
        writeln!(out, "**{}:** {}", slot.meal, slot.suggestion)?;
    }
    writeln!(out)?;

    writeln!(out, "### Lifestyle Advice:")?;
    for advice in LIFESTYLE_ADVICE {
        writeln!(out, "- {advice}")?;
    }
    writeln!(out)?;

    writeln!(out, "{CLOSING_NOTE}")?;
    writeln!(out)?;
    writeln!(out, "---")?;
    writeln!(out, "{DISCLAIMER}")?;

    Ok(out)
}
