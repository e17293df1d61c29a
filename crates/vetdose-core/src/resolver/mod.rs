//! Dosage resolver.
//!
//! Pipeline: Weight Input → kg Conversion → Band Match → Dosage Plan
//!
//! [`dosage`] holds the pure functions. [`DosageCalculator`] loads a catalog
//! entry from the database, runs them, and records the result in the user's
//! history.

mod dosage;
mod lookup;

pub use dosage::*;
pub use lookup::*;

use crate::db::Database;
use crate::models::{CalculationRecord, MedicationWithGuidelines, PlanOutcome, WeightUnit};
use thiserror::Error;

/// Outcomes of a calculation that the caller must show the user.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DosageError {
    #[error("Invalid weight: {0}")]
    InvalidWeight(String),

    #[error("No dosage guideline for {medication} covers {weight_kg} kg")]
    NoMatchingGuideline { medication: String, weight_kg: f64 },
}

/// Resolver errors.
#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("Database error: {0}")]
    Database(#[from] crate::db::DbError),

    #[error("Medication not found: {0}")]
    MedicationNotFound(String),

    #[error(transparent)]
    Dosage(#[from] DosageError),
}

pub type ResolverResult<T> = Result<T, ResolverError>;

/// A resolved calculation, with the catalog entry it was resolved against.
#[derive(Debug, Clone, PartialEq)]
pub struct Calculation {
    pub medication: MedicationWithGuidelines,
    pub outcome: PlanOutcome,
}

/// Runs dosage calculations against the catalog.
pub struct DosageCalculator<'a> {
    db: &'a Database,
}

impl<'a> DosageCalculator<'a> {
    /// Create a new calculator.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Calculate a dose for a medication from a typed weight.
    ///
    /// When `user_id` is given and a band matched, the plan is saved to that
    /// user's history. An unparseable weight is `DosageError::InvalidWeight`;
    /// a weight outside every band is `PlanOutcome::NoMatch`.
    pub fn calculate(
        &self,
        medication_id: &str,
        weight_text: &str,
        unit: WeightUnit,
        user_id: Option<&str>,
    ) -> ResolverResult<Calculation> {
        let medication = self
            .db
            .get_medication(medication_id)?
            .ok_or_else(|| ResolverError::MedicationNotFound(medication_id.to_string()))?;

        let weight_kg = parse_weight(weight_text, unit)?;
        let outcome = plan_for_kg(&medication.dosage_guidelines, weight_kg);

        match (&outcome, user_id) {
            (PlanOutcome::Plan(plan), Some(user)) => {
                let record = CalculationRecord::from_plan(user, medication_id, plan);
                self.db.insert_calculation(&record)?;
                tracing::debug!(
                    medication_id,
                    weight_kg,
                    total_dose_mg = plan.total_dose_mg,
                    "Saved calculation"
                );
            }
            (PlanOutcome::NoMatch { .. }, _) => {
                tracing::info!(
                    medication = %medication.medication.name,
                    weight_kg,
                    "No dosage guideline covers weight"
                );
            }
            _ => {}
        }

        Ok(Calculation { medication, outcome })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewDosageGuideline, NewMedication, Species};

    fn setup_db_with_catalog() -> (Database, String) {
        let mut db = Database::open_in_memory().unwrap();

        let new = NewMedication::new("Amoxicillin", Species::Both, "Antibiotic").with_guideline(
            NewDosageGuideline {
                min_weight_kg: 1.0,
                max_weight_kg: 10.0,
                dosage_mg_per_kg: 4.0,
                frequency_per_day: 2,
                duration_days: Some(7),
                notes: Some("Give with food".into()),
            },
        );
        let med = db.insert_medication(&new).unwrap();

        (db, med.medication.id)
    }

    #[test]
    fn test_calculate_and_record() {
        let (db, id) = setup_db_with_catalog();
        let calculator = DosageCalculator::new(&db);

        let calc = calculator.calculate(&id, "5", WeightUnit::Kg, Some("u1")).unwrap();
        let plan = calc.outcome.plan().unwrap();
        assert_eq!(plan.total_dose_mg, 20.0);
        assert_eq!(plan.notes.as_deref(), Some("Give with food"));

        let history = db.list_calculations("u1", 10).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].medication_id, id);
    }

    #[test]
    fn test_anonymous_calculation_not_recorded() {
        let (db, id) = setup_db_with_catalog();
        let calculator = DosageCalculator::new(&db);

        calculator.calculate(&id, "5", WeightUnit::Kg, None).unwrap();
        assert!(db.list_calculations("u1", 10).unwrap().is_empty());
    }

    #[test]
    fn test_no_match_not_recorded() {
        let (db, id) = setup_db_with_catalog();
        let calculator = DosageCalculator::new(&db);

        let calc = calculator.calculate(&id, "15", WeightUnit::Kg, Some("u1")).unwrap();
        assert!(!calc.outcome.is_match());
        assert!(db.list_calculations("u1", 10).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_weight() {
        let (db, id) = setup_db_with_catalog();
        let calculator = DosageCalculator::new(&db);

        let result = calculator.calculate(&id, "heavy", WeightUnit::Kg, Some("u1"));
        assert!(matches!(
            result,
            Err(ResolverError::Dosage(DosageError::InvalidWeight(_)))
        ));
    }

    #[test]
    fn test_unknown_medication() {
        let (db, _) = setup_db_with_catalog();
        let calculator = DosageCalculator::new(&db);

        let result = calculator.calculate("missing", "5", WeightUnit::Kg, None);
        assert!(matches!(result, Err(ResolverError::MedicationNotFound(_))));
    }
}
