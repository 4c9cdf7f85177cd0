//! Personalized diet plans from health metrics and retrieved clinical guidance.
//!
//! The pipeline validates raw metrics, classifies risk conditions with fixed
//! clinical thresholds, retrieves matching guidance from an embedded
//! knowledge base, and renders a plan document.

pub mod classify;
pub mod compose;
pub mod config;
pub mod display;
pub mod error;
pub mod io;
pub mod knowledge;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod render;
pub mod retrieve;

// Explicit exports for better API clarity
pub use classify::{ConditionSet, RiskFactor, WeightCategory, classify};
pub use compose::{
    DEFAULT_RECOMMENDATIONS, MarkerComposer, RecommendationComposer, RecommendationList,
    RecommendationSource,
};
pub use config::Settings;
pub use error::{AdvisorError, AdvisorResult, FieldError};
pub use knowledge::{KnowledgeError, KnowledgeSource, KnowledgeStore, RetrievedContext};
pub use metrics::{
    BloodPressure, DerivedMetrics, HealthMetrics, HealthProfile, compute_bmi,
    parse_blood_pressure, validate,
};
pub use pipeline::{Advice, Advisor, create_embedder, open_knowledge_store};
pub use render::{DietPlan, MEAL_TEMPLATE, PlanRenderer};
pub use retrieve::{DEFAULT_TOP_K, GuidanceRetriever};
