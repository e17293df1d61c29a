//! Per-user records: calculation history and preferences.

use serde::{Deserialize, Serialize};

use super::{DosagePlan, Species, WeightUnit};

/// A saved dosage calculation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalculationRecord {
    pub id: String,
    pub user_id: String,
    pub medication_id: String,
    pub weight_kg: f64,
    pub total_dose_mg: f64,
    pub frequency_per_day: u32,
    pub duration_days: Option<u32>,
    pub created_at: String,
}

impl CalculationRecord {
    /// Create a record for a computed plan.
    pub fn from_plan(user_id: &str, medication_id: &str, plan: &DosagePlan) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            medication_id: medication_id.to_string(),
            weight_kg: plan.weight_kg,
            total_dose_mg: plan.total_dose_mg,
            frequency_per_day: plan.frequency_per_day,
            duration_days: plan.duration_days,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Display preferences for a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserPreferences {
    pub user_id: String,
    /// Species filter applied when listing medications
    pub default_species: Option<Species>,
    /// Unit weights are entered in
    pub weight_unit: WeightUnit,
}

impl UserPreferences {
    /// Defaults for a user with no saved preferences.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            default_species: None,
            weight_unit: WeightUnit::Kg,
        }
    }
}
