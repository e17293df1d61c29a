//! Dosage calculation inputs and outputs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Unit a weight is entered in.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lbs,
}

impl WeightUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeightUnit::Kg => "kg",
            WeightUnit::Lbs => "lbs",
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeightUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kg" | "kgs" | "kilogram" | "kilograms" => Ok(WeightUnit::Kg),
            "lb" | "lbs" | "pound" | "pounds" => Ok(WeightUnit::Lbs),
            other => Err(format!("unknown weight unit: {}", other)),
        }
    }
}

/// A weight as entered by the user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WeightInput {
    pub magnitude: f64,
    pub unit: WeightUnit,
}

impl WeightInput {
    pub fn new(magnitude: f64, unit: WeightUnit) -> Self {
        Self { magnitude, unit }
    }

    pub fn kg(magnitude: f64) -> Self {
        Self::new(magnitude, WeightUnit::Kg)
    }

    pub fn lbs(magnitude: f64) -> Self {
        Self::new(magnitude, WeightUnit::Lbs)
    }
}

/// Computed administration plan for one weight/medication pair.
///
/// `total_dose_mg` is kept at full precision; rounding is a display concern.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DosagePlan {
    /// Weight the plan was computed for, in kg
    pub weight_kg: f64,
    /// Total dose per administration, in mg
    pub total_dose_mg: f64,
    pub frequency_per_day: u32,
    pub duration_days: Option<u32>,
    pub notes: Option<String>,
}

impl DosagePlan {
    /// Format the dose for display with the given number of decimals.
    pub fn display_dose(&self, decimals: usize) -> String {
        format!("{:.*} mg", decimals, self.total_dose_mg)
    }
}

/// Result of resolving a weight against a medication's bands.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PlanOutcome {
    /// A band matched and a plan was computed.
    Plan(DosagePlan),
    /// No band covers the weight. Informational, not an error.
    NoMatch { weight_kg: f64 },
}

impl PlanOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, PlanOutcome::Plan(_))
    }

    pub fn plan(&self) -> Option<&DosagePlan> {
        match self {
            PlanOutcome::Plan(plan) => Some(plan),
            PlanOutcome::NoMatch { .. } => None,
        }
    }

    /// Weight the outcome was resolved for, in kg.
    pub fn weight_kg(&self) -> f64 {
        match self {
            PlanOutcome::Plan(plan) => plan.weight_kg,
            PlanOutcome::NoMatch { weight_kg } => *weight_kg,
        }
    }
}
