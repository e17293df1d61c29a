//! Weight conversion and band matching.
//!
//! Everything here is pure: plain data in, plain data out. Bands are scanned
//! in catalog order and the first band covering the weight wins, even when a
//! later band is narrower.

use crate::models::{DosageGuideline, DosagePlan, MedicationWithGuidelines, PlanOutcome, WeightInput, WeightUnit};

use super::DosageError;

/// Kilograms per pound.
pub const KG_PER_LB: f64 = 0.453592;

/// Convert a weight to kilograms.
///
/// Fails with `InvalidWeight` for NaN, infinite or negative magnitudes.
pub fn convert_weight(magnitude: f64, unit: WeightUnit) -> Result<f64, DosageError> {
    if !magnitude.is_finite() {
        return Err(DosageError::InvalidWeight(format!("{} is not a finite number", magnitude)));
    }
    if magnitude < 0.0 {
        return Err(DosageError::InvalidWeight(format!("{} is negative", magnitude)));
    }
    // -0.0 passes the sign check above
    let magnitude = magnitude.abs();

    Ok(match unit {
        WeightUnit::Kg => magnitude,
        WeightUnit::Lbs => magnitude * KG_PER_LB,
    })
}

/// Parse a weight as typed by a user and convert it to kilograms.
pub fn parse_weight(text: &str, unit: WeightUnit) -> Result<f64, DosageError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(DosageError::InvalidWeight("no weight entered".to_string()));
    }
    let magnitude: f64 = trimmed
        .parse()
        .map_err(|_| DosageError::InvalidWeight(format!("'{}' is not a number", trimmed)))?;
    convert_weight(magnitude, unit)
}

/// First guideline (in collection order) whose band covers `weight_kg`.
pub fn find_guideline(guidelines: &[DosageGuideline], weight_kg: f64) -> Option<&DosageGuideline> {
    guidelines.iter().find(|g| g.covers(weight_kg))
}

/// Resolve a weight against a medication's bands.
///
/// A weight outside every band (including a medication with no bands) is
/// `PlanOutcome::NoMatch`, not an error.
pub fn compute_plan(
    medication: &MedicationWithGuidelines,
    weight: WeightInput,
) -> Result<PlanOutcome, DosageError> {
    let weight_kg = convert_weight(weight.magnitude, weight.unit)?;
    Ok(plan_for_kg(&medication.dosage_guidelines, weight_kg))
}

pub(crate) fn plan_for_kg(guidelines: &[DosageGuideline], weight_kg: f64) -> PlanOutcome {
    match find_guideline(guidelines, weight_kg) {
        Some(g) => PlanOutcome::Plan(DosagePlan {
            weight_kg,
            total_dose_mg: weight_kg * g.dosage_mg_per_kg,
            frequency_per_day: g.frequency_per_day,
            duration_days: g.duration_days,
            notes: g.notes.clone(),
        }),
        None => PlanOutcome::NoMatch { weight_kg },
    }
}

impl PlanOutcome {
    /// Collapse into a single `Result`, treating `NoMatch` as an error.
    pub fn into_plan(self, medication: &str) -> Result<DosagePlan, DosageError> {
        match self {
            PlanOutcome::Plan(plan) => Ok(plan),
            PlanOutcome::NoMatch { weight_kg } => Err(DosageError::NoMatchingGuideline {
                medication: medication.to_string(),
                weight_kg,
            }),
        }
    }
}
