//! Health metric validation and derived quantities.
//!
//! Raw form input arrives as a [`HealthProfile`]. [`validate`] turns it
//! into immutable [`HealthMetrics`], rejecting out-of-range fields and
//! downgrading an unreadable blood pressure to a warning.

use crate::error::{AdvisorError, AdvisorResult, FieldError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// Accepted age range in years.
pub const AGE_RANGE: RangeInclusive<u32> = 18..=100;

/// Unvalidated health metrics as entered by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthProfile {
    pub age: u32,
    pub weight_kg: f64,
    pub height_cm: f64,
    /// "systolic/diastolic", e.g. "120/80"
    pub blood_pressure: String,
    /// mg/dL
    pub fasting_glucose: f64,
    /// mg/dL
    pub total_cholesterol: f64,
}

/// A parsed blood pressure reading in mmHg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloodPressure {
    pub systolic: u16,
    pub diastolic: u16,
}

impl fmt::Display for BloodPressure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.systolic, self.diastolic)
    }
}

/// Validated metrics.
///
/// Fields are private so a value can only come from [`validate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthMetrics {
    age: u32,
    weight_kg: f64,
    height_cm: f64,
    blood_pressure: Option<BloodPressure>,
    fasting_glucose: f64,
    total_cholesterol: f64,
}

impl HealthMetrics {
    #[must_use]
    pub fn age(&self) -> u32 {
        self.age
    }

    #[must_use]
    pub fn weight_kg(&self) -> f64 {
        self.weight_kg
    }

    #[must_use]
    pub fn height_cm(&self) -> f64 {
        self.height_cm
    }

    /// `None` when the entered reading could not be parsed.
    #[must_use]
    pub fn blood_pressure(&self) -> Option<BloodPressure> {
        self.blood_pressure
    }

    #[must_use]
    pub fn fasting_glucose(&self) -> f64 {
        self.fasting_glucose
    }

    #[must_use]
    pub fn total_cholesterol(&self) -> f64 {
        self.total_cholesterol
    }
}

/// Quantities computed from [`HealthMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedMetrics {
    /// Body mass index rounded to one decimal
    pub bmi: f64,
}

impl DerivedMetrics {
    pub fn from_metrics(metrics: &HealthMetrics) -> AdvisorResult<Self> {
        let bmi = compute_bmi(metrics.weight_kg, metrics.height_cm)?;
        Ok(Self {
            bmi: round_one_decimal(bmi),
        })
    }
}

/// Validation output: the metrics plus any non-fatal problems.
#[derive(Debug)]
pub struct ValidatedProfile {
    pub metrics: HealthMetrics,
    /// Parse failures that were tolerated, e.g. a malformed blood pressure.
    pub warnings: Vec<AdvisorError>,
}

/// Body mass index: `weight_kg / (height_cm / 100)^2`.
///
/// # Errors
/// `InvalidInput` when either value is not a positive finite number.
pub fn compute_bmi(weight_kg: f64, height_cm: f64) -> AdvisorResult<f64> {
    let mut errors = Vec::new();
    if let Err(e) = check_positive("weight_kg", weight_kg) {
        errors.push(e);
    }
    if let Err(e) = check_positive("height_cm", height_cm) {
        errors.push(e);
    }
    if !errors.is_empty() {
        return Err(AdvisorError::InvalidInput { errors });
    }

    let height_m = height_cm / 100.0;
    Ok(weight_kg / (height_m * height_m))
}

/// Parse a "systolic/diastolic" reading such as "120/80".
///
/// Whitespace around either number is ignored.
pub fn parse_blood_pressure(text: &str) -> AdvisorResult<BloodPressure> {
    let parse_error = |reason: String| AdvisorError::Parse {
        input: text.to_string(),
        reason,
    };

    let parts: Vec<&str> = text.split('/').collect();
    let [systolic, diastolic] = parts.as_slice() else {
        return Err(parse_error(format!(
            "expected two values separated by '/', found {}",
            parts.len()
        )));
    };

    let parse_part = |name: &str, raw: &str| {
        raw.trim()
            .parse::<u16>()
            .map_err(|_| parse_error(format!("{name} value '{}' is not a whole number", raw.trim())))
    };

    Ok(BloodPressure {
        systolic: parse_part("systolic", *systolic)?,
        diastolic: parse_part("diastolic", *diastolic)?,
    })
}

/// Validate every field of `profile`.
///
/// All range failures are collected into one `InvalidInput` error. A
/// blood pressure that fails to parse is not fatal: the reading is left
/// out and the parse error is returned as a warning.
pub fn validate(profile: &HealthProfile) -> AdvisorResult<ValidatedProfile> {
    let mut errors = Vec::new();

    if !AGE_RANGE.contains(&profile.age) {
        errors.push(FieldError::new(
            "age",
            format!(
                "must be between {} and {}, got {}",
                AGE_RANGE.start(),
                AGE_RANGE.end(),
                profile.age
            ),
        ));
    }
    for (field, value) in [
        ("weight_kg", profile.weight_kg),
        ("height_cm", profile.height_cm),
    ] {
        if let Err(e) = check_positive(field, value) {
            errors.push(e);
        }
    }
    for (field, value) in [
        ("fasting_glucose", profile.fasting_glucose),
        ("total_cholesterol", profile.total_cholesterol),
    ] {
        if !value.is_finite() || value < 0.0 {
            errors.push(FieldError::new(
                field,
                format!("must be a non-negative number, got {value}"),
            ));
        }
    }

    if !errors.is_empty() {
        return Err(AdvisorError::InvalidInput { errors });
    }

    let mut warnings = Vec::new();
    let blood_pressure = match parse_blood_pressure(&profile.blood_pressure) {
        Ok(reading) => Some(reading),
        Err(e) => {
            tracing::warn!("{e}");
            warnings.push(e);
            None
        }
    };

    Ok(ValidatedProfile {
        metrics: HealthMetrics {
            age: profile.age,
            weight_kg: profile.weight_kg,
            height_cm: profile.height_cm,
            blood_pressure,
            fasting_glucose: profile.fasting_glucose,
            total_cholesterol: profile.total_cholesterol,
        },
        warnings,
    })
}

fn check_positive(field: &'static str, value: f64) -> Result<(), FieldError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(FieldError::new(
            field,
            format!("must be a positive number, got {value}"),
        ))
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
