//! Threshold rules mapping validated metrics to condition labels.

use crate::metrics::{DerivedMetrics, HealthMetrics};
use std::fmt;

/// Systolic reading at or above which hypertension is flagged (mmHg).
pub const SYSTOLIC_THRESHOLD: u16 = 140;
/// Diastolic reading at or above which hypertension is flagged (mmHg).
pub const DIASTOLIC_THRESHOLD: u16 = 90;
/// Fasting glucose at or above which high blood sugar is flagged (mg/dL).
pub const GLUCOSE_THRESHOLD: f64 = 126.0;
/// Total cholesterol at or above which high cholesterol is flagged (mg/dL).
pub const CHOLESTEROL_THRESHOLD: f64 = 200.0;

/// BMI bracket. Each boundary belongs to the upper bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeightCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl WeightCategory {
    #[must_use]
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            Self::Underweight
        } else if bmi < 25.0 {
            Self::Normal
        } else if bmi < 30.0 {
            Self::Overweight
        } else {
            Self::Obese
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Underweight => "Underweight",
            Self::Normal => "Normal weight",
            Self::Overweight => "Overweight",
            Self::Obese => "Obese",
        }
    }
}

impl fmt::Display for WeightCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Additional risk conditions, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RiskFactor {
    Hypertension,
    HighBloodSugar,
    HighCholesterol,
}

impl RiskFactor {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Hypertension => "Hypertension",
            Self::HighBloodSugar => "High Blood Sugar",
            Self::HighCholesterol => "High Cholesterol",
        }
    }
}

impl fmt::Display for RiskFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordered conditions: exactly one weight category, then any risk factors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionSet {
    weight: WeightCategory,
    risks: Vec<RiskFactor>,
}

impl ConditionSet {
    pub fn new(weight: WeightCategory) -> Self {
        Self {
            weight,
            risks: Vec::new(),
        }
    }

    /// Append a risk factor. Returns false if it was already present.
    pub fn insert(&mut self, risk: RiskFactor) -> bool {
        if self.risks.contains(&risk) {
            return false;
        }
        self.risks.push(risk);
        true
    }

    #[must_use]
    pub fn weight(&self) -> WeightCategory {
        self.weight
    }

    #[must_use]
    pub fn risks(&self) -> &[RiskFactor] {
        &self.risks
    }

    #[must_use]
    pub fn contains(&self, risk: RiskFactor) -> bool {
        self.risks.contains(&risk)
    }

    /// The header label: always the weight category.
    #[must_use]
    pub fn primary(&self) -> &'static str {
        self.weight.label()
    }

    /// All labels, weight category first.
    pub fn labels(&self) -> Vec<&'static str> {
        std::iter::once(self.weight.label())
            .chain(self.risks.iter().map(RiskFactor::label))
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        1 + self.risks.len()
    }

    /// Never true; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Display for ConditionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.labels().join(", "))
    }
}

/// Evaluate every rule against `metrics`.
///
/// The weight bracket uses the rounded BMI from `derived`. Hypertension is
/// skipped when no blood pressure reading is available.
pub fn classify(metrics: &HealthMetrics, derived: &DerivedMetrics) -> ConditionSet {
    let mut conditions = ConditionSet::new(WeightCategory::from_bmi(derived.bmi));

    let hypertensive = metrics.blood_pressure().is_some_and(|bp| {
        bp.systolic >= SYSTOLIC_THRESHOLD || bp.diastolic >= DIASTOLIC_THRESHOLD
    });
    if hypertensive {
        conditions.insert(RiskFactor::Hypertension);
    }
    if metrics.fasting_glucose() >= GLUCOSE_THRESHOLD {
        conditions.insert(RiskFactor::HighBloodSugar);
    }
    if metrics.total_cholesterol() >= CHOLESTEROL_THRESHOLD {
        conditions.insert(RiskFactor::HighCholesterol);
    }

    tracing::debug!("Classified BMI {} as {conditions}", derived.bmi);
    conditions
}
