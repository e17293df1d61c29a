//! Vetdose Core Library
//!
//! Local veterinary medication catalog with weight-banded dosage resolution.
//!
//! # Architecture
//!
//! ```text
//! Catalog (SQLite) ──► MedicationWithGuidelines
//!                               │
//!   "11" + lbs ──► parse_weight ──► kg
//!                               │
//!                         find_guideline  (first band with min <= kg <= max)
//!                               │
//!                 ┌─────────────┴─────────────┐
//!                 ▼                           ▼
//!          PlanOutcome::Plan            PlanOutcome::NoMatch
//!   (kg × mg/kg, freq, duration)        (advisory only)
//!                 │
//!                 ▼
//!       calculation_history (per user)
//! ```
//!
//! # Modules
//!
//! - [`db`]: SQLite catalog, favorites, history and preferences
//! - [`models`]: Domain types (Medication, DosageGuideline, DosagePlan, etc.)
//! - [`resolver`]: Weight conversion, band matching, dosage calculation
//! - [`config`]: TOML configuration
//! - [`logging`]: Tracing subscriber setup

pub mod config;
pub mod db;
pub mod logging;
pub mod models;
pub mod resolver;

// Re-export commonly used types
pub use config::Config;
pub use db::Database;
pub use models::{
    CalculationRecord, DosageGuideline, DosagePlan, Medication, MedicationWithGuidelines,
    NewDosageGuideline, NewMedication, PlanOutcome, Species, UserPreferences, WeightInput,
    WeightUnit,
};
pub use resolver::{
    compute_plan, convert_weight, find_guideline, parse_weight, DosageCalculator, DosageError,
};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum VetDoseError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid weight: {0}")]
    InvalidWeight(String),
}

impl From<db::DbError> for VetDoseError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::NotFound(what) => VetDoseError::NotFound(what),
            db::DbError::Constraint(msg) => VetDoseError::InvalidInput(msg),
            other => VetDoseError::DatabaseError(other.to_string()),
        }
    }
}

impl From<resolver::ResolverError> for VetDoseError {
    fn from(e: resolver::ResolverError) -> Self {
        match e {
            resolver::ResolverError::Database(db) => db.into(),
            resolver::ResolverError::MedicationNotFound(id) => VetDoseError::NotFound(id),
            resolver::ResolverError::Dosage(d) => d.into(),
        }
    }
}

impl From<DosageError> for VetDoseError {
    fn from(e: DosageError) -> Self {
        match e {
            DosageError::InvalidWeight(msg) => VetDoseError::InvalidWeight(msg),
            other => VetDoseError::InvalidInput(other.to_string()),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for VetDoseError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        VetDoseError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<VetDoseCore>, VetDoseError> {
    let db = Database::open(&path)?;
    Ok(Arc::new(VetDoseCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<VetDoseCore>, VetDoseError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(VetDoseCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

/// Install the tracing subscriber. RUST_LOG overrides `level`.
#[uniffi::export]
pub fn init_logging(level: String) {
    logging::init_with_level(&level);
}

/// Convert a weight to kilograms (`unit` is "kg" or "lbs").
#[uniffi::export]
pub fn convert_weight_to_kg(magnitude: f64, unit: String) -> Result<f64, VetDoseError> {
    Ok(convert_weight(magnitude, parse_unit(&unit)?)?)
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI.
#[derive(uniffi::Object)]
pub struct VetDoseCore {
    db: Arc<Mutex<Database>>,
}

#[uniffi::export]
impl VetDoseCore {
    // =========================================================================
    // Catalog Operations
    // =========================================================================

    /// Validate and add a medication with its dosage guidelines.
    pub fn add_medication(&self, medication: FfiNewMedication) -> Result<FfiMedication, VetDoseError> {
        let mut db = self.db.lock()?;
        let new: NewMedication = medication.try_into()?;
        let inserted = db.insert_medication(&new)?;
        Ok(inserted.into())
    }

    /// Get a medication and its guidelines by ID.
    pub fn get_medication(&self, id: String) -> Result<Option<FfiMedication>, VetDoseError> {
        let db = self.db.lock()?;
        let medication = db.get_medication(&id)?;
        Ok(medication.map(|m| m.into()))
    }

    /// List medications, optionally filtered by species ("dog", "cat", "both").
    pub fn list_medications(&self, species: Option<String>) -> Result<Vec<FfiMedication>, VetDoseError> {
        let filter = species.as_deref().map(parse_species).transpose()?;
        let db = self.db.lock()?;
        let medications = db.list_medications(filter)?;
        Ok(medications.into_iter().map(|m| m.into()).collect())
    }

    /// Delete a medication.
    pub fn delete_medication(&self, id: String) -> Result<bool, VetDoseError> {
        let db = self.db.lock()?;
        Ok(db.delete_medication(&id)?)
    }

    // =========================================================================
    // Favorites
    // =========================================================================

    /// Flip a favorite; returns the new state.
    pub fn toggle_favorite(&self, user_id: String, medication_id: String) -> Result<bool, VetDoseError> {
        let db = self.db.lock()?;
        Ok(db.toggle_favorite(&user_id, &medication_id)?)
    }

    /// The user's favorite medications.
    pub fn list_favorites(&self, user_id: String) -> Result<Vec<FfiMedication>, VetDoseError> {
        let db = self.db.lock()?;
        let medications = db.list_favorite_medications(&user_id)?;
        Ok(medications.into_iter().map(|m| m.into()).collect())
    }

    // =========================================================================
    // Dosage Calculation
    // =========================================================================

    /// Calculate a dose for a typed weight.
    ///
    /// A weight outside every band returns `matched = false`, not an error.
    pub fn calculate_dosage(
        &self,
        medication_id: String,
        weight: String,
        unit: String,
        user_id: Option<String>,
    ) -> Result<FfiDosageResult, VetDoseError> {
        let unit = parse_unit(&unit)?;
        let db = self.db.lock()?;
        let calculator = DosageCalculator::new(&db);
        let calc = calculator.calculate(&medication_id, &weight, unit, user_id.as_deref())?;
        Ok(calc.outcome.into())
    }

    /// The user's most recent calculations, newest first.
    pub fn list_calculations(
        &self,
        user_id: String,
        limit: u32,
    ) -> Result<Vec<FfiCalculationRecord>, VetDoseError> {
        let db = self.db.lock()?;
        let records = db.list_calculations(&user_id, limit as usize)?;
        Ok(records.into_iter().map(|r| r.into()).collect())
    }

    // =========================================================================
    // Preferences
    // =========================================================================

    pub fn get_preferences(&self, user_id: String) -> Result<FfiUserPreferences, VetDoseError> {
        let db = self.db.lock()?;
        Ok(db.get_preferences(&user_id)?.into())
    }

    pub fn set_preferences(&self, preferences: FfiUserPreferences) -> Result<(), VetDoseError> {
        let prefs: UserPreferences = preferences.try_into()?;
        let db = self.db.lock()?;
        db.set_preferences(&prefs)?;
        Ok(())
    }
}

fn parse_unit(unit: &str) -> Result<WeightUnit, VetDoseError> {
    unit.parse().map_err(VetDoseError::InvalidInput)
}

fn parse_species(species: &str) -> Result<Species, VetDoseError> {
    species.parse().map_err(VetDoseError::InvalidInput)
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe dosage guideline.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDosageGuideline {
    pub min_weight_kg: f64,
    pub max_weight_kg: f64,
    pub dosage_mg_per_kg: f64,
    pub frequency_per_day: u32,
    pub duration_days: Option<u32>,
    pub notes: Option<String>,
}

impl From<DosageGuideline> for FfiDosageGuideline {
    fn from(g: DosageGuideline) -> Self {
        Self {
            min_weight_kg: g.min_weight_kg,
            max_weight_kg: g.max_weight_kg,
            dosage_mg_per_kg: g.dosage_mg_per_kg,
            frequency_per_day: g.frequency_per_day,
            duration_days: g.duration_days,
            notes: g.notes,
        }
    }
}

impl From<FfiDosageGuideline> for NewDosageGuideline {
    fn from(g: FfiDosageGuideline) -> Self {
        NewDosageGuideline {
            min_weight_kg: g.min_weight_kg,
            max_weight_kg: g.max_weight_kg,
            dosage_mg_per_kg: g.dosage_mg_per_kg,
            frequency_per_day: g.frequency_per_day,
            duration_days: g.duration_days,
            notes: g.notes,
        }
    }
}

/// FFI-safe medication with guidelines.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMedication {
    pub id: String,
    pub name: String,
    pub generic_name: Option<String>,
    pub species: String,
    pub category: String,
    pub description: Option<String>,
    pub dosage_guidelines: Vec<FfiDosageGuideline>,
}

impl From<MedicationWithGuidelines> for FfiMedication {
    fn from(m: MedicationWithGuidelines) -> Self {
        Self {
            id: m.medication.id,
            name: m.medication.name,
            generic_name: m.medication.generic_name,
            species: m.medication.species.to_string(),
            category: m.medication.category,
            description: m.medication.description,
            dosage_guidelines: m.dosage_guidelines.into_iter().map(|g| g.into()).collect(),
        }
    }
}

/// FFI-safe medication submission.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewMedication {
    pub name: String,
    pub generic_name: Option<String>,
    pub species: String,
    pub category: String,
    pub description: Option<String>,
    pub dosage_guidelines: Vec<FfiDosageGuideline>,
}

impl TryFrom<FfiNewMedication> for NewMedication {
    type Error = VetDoseError;

    fn try_from(m: FfiNewMedication) -> Result<Self, Self::Error> {
        Ok(NewMedication {
            species: parse_species(&m.species)?,
            name: m.name,
            generic_name: m.generic_name,
            category: m.category,
            description: m.description,
            dosage_guidelines: m.dosage_guidelines.into_iter().map(|g| g.into()).collect(),
        })
    }
}

/// FFI-safe calculation result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDosageResult {
    /// False when no band covers the weight
    pub matched: bool,
    pub weight_kg: f64,
    pub total_dose_mg: Option<f64>,
    pub frequency_per_day: Option<u32>,
    pub duration_days: Option<u32>,
    pub notes: Option<String>,
}

impl From<PlanOutcome> for FfiDosageResult {
    fn from(outcome: PlanOutcome) -> Self {
        match outcome {
            PlanOutcome::Plan(plan) => Self {
                matched: true,
                weight_kg: plan.weight_kg,
                total_dose_mg: Some(plan.total_dose_mg),
                frequency_per_day: Some(plan.frequency_per_day),
                duration_days: plan.duration_days,
                notes: plan.notes,
            },
            PlanOutcome::NoMatch { weight_kg } => Self {
                matched: false,
                weight_kg,
                total_dose_mg: None,
                frequency_per_day: None,
                duration_days: None,
                notes: None,
            },
        }
    }
}

/// FFI-safe calculation history entry.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCalculationRecord {
    pub id: String,
    pub medication_id: String,
    pub weight_kg: f64,
    pub total_dose_mg: f64,
    pub frequency_per_day: u32,
    pub duration_days: Option<u32>,
    pub created_at: String,
}

impl From<CalculationRecord> for FfiCalculationRecord {
    fn from(r: CalculationRecord) -> Self {
        Self {
            id: r.id,
            medication_id: r.medication_id,
            weight_kg: r.weight_kg,
            total_dose_mg: r.total_dose_mg,
            frequency_per_day: r.frequency_per_day,
            duration_days: r.duration_days,
            created_at: r.created_at,
        }
    }
}

/// FFI-safe user preferences.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiUserPreferences {
    pub user_id: String,
    pub default_species: Option<String>,
    pub weight_unit: String,
}

impl From<UserPreferences> for FfiUserPreferences {
    fn from(p: UserPreferences) -> Self {
        Self {
            user_id: p.user_id,
            default_species: p.default_species.map(|s| s.to_string()),
            weight_unit: p.weight_unit.to_string(),
        }
    }
}

impl TryFrom<FfiUserPreferences> for UserPreferences {
    type Error = VetDoseError;

    fn try_from(p: FfiUserPreferences) -> Result<Self, Self::Error> {
        Ok(UserPreferences {
            default_species: p.default_species.as_deref().map(parse_species).transpose()?,
            weight_unit: parse_unit(&p.weight_unit)?,
            user_id: p.user_id,
        })
    }
}
