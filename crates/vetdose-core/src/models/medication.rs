//! Medication catalog models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lowest weight a submitted band may start or end at (kg).
pub const MIN_BAND_WEIGHT_KG: f64 = 0.1;

/// Lowest dose rate a submitted band may carry (mg/kg).
pub const MIN_DOSE_RATE_MG_PER_KG: f64 = 0.001;

/// Species a medication is labelled for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Dog,
    Cat,
    Both,
}

impl Species {
    /// Database / wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Species::Dog => "dog",
            Species::Cat => "cat",
            Species::Both => "both",
        }
    }

    /// Whether a medication tagged `self` should be listed under `filter`.
    ///
    /// A `Both` filter lists everything; a `Dog` or `Cat` filter lists
    /// medications tagged with that species or with `Both`.
    pub fn is_listed_under(&self, filter: Species) -> bool {
        match filter {
            Species::Both => true,
            _ => *self == filter || *self == Species::Both,
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Species {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dog" | "dogs" | "canine" => Ok(Species::Dog),
            "cat" | "cats" | "feline" => Ok(Species::Cat),
            "both" => Ok(Species::Both),
            other => Err(format!("unknown species: {}", other)),
        }
    }
}

/// A medication in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Medication {
    /// Unique identifier (UUID)
    pub id: String,
    /// Trade or primary name
    pub name: String,
    /// Generic (active ingredient) name
    pub generic_name: Option<String>,
    /// Species the medication is labelled for
    pub species: Species,
    /// Category label (e.g., "Antibiotic", "NSAID")
    pub category: String,
    /// Free-text description
    pub description: Option<String>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

/// A weight band with its dosing instructions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DosageGuideline {
    pub id: String,
    pub medication_id: String,
    /// Lower bound of the band, inclusive
    pub min_weight_kg: f64,
    /// Upper bound of the band, inclusive
    pub max_weight_kg: f64,
    /// Dose rate in mg per kg of body weight
    pub dosage_mg_per_kg: f64,
    /// Administrations per day
    pub frequency_per_day: u32,
    /// Treatment duration in days
    pub duration_days: Option<u32>,
    pub notes: Option<String>,
    pub created_at: String,
}

impl DosageGuideline {
    /// Check if a weight falls inside this band (both ends inclusive).
    pub fn covers(&self, weight_kg: f64) -> bool {
        weight_kg >= self.min_weight_kg && weight_kg <= self.max_weight_kg
    }
}

/// A medication together with its guidelines, in catalog order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicationWithGuidelines {
    #[serde(flatten)]
    pub medication: Medication,
    #[serde(default)]
    pub dosage_guidelines: Vec<DosageGuideline>,
}

/// Submission payload for a new guideline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewDosageGuideline {
    pub min_weight_kg: f64,
    pub max_weight_kg: f64,
    pub dosage_mg_per_kg: f64,
    pub frequency_per_day: u32,
    #[serde(default)]
    pub duration_days: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Submission payload for a new medication with its dosing table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewMedication {
    pub name: String,
    #[serde(default)]
    pub generic_name: Option<String>,
    pub species: Species,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    pub dosage_guidelines: Vec<NewDosageGuideline>,
}

impl NewMedication {
    /// Create a submission with required fields and no guidelines.
    pub fn new(name: impl Into<String>, species: Species, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            generic_name: None,
            species,
            category: category.into(),
            description: None,
            dosage_guidelines: Vec::new(),
        }
    }

    /// Append a band (builder style).
    pub fn with_guideline(mut self, guideline: NewDosageGuideline) -> Self {
        self.dosage_guidelines.push(guideline);
        self
    }

    /// Validate the submission, returning every problem found.
    ///
    /// An empty vector means the submission may be written to the catalog.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push("Medication name is required".to_string());
        }
        if self.category.trim().is_empty() {
            errors.push("Category is required".to_string());
        }
        if self.dosage_guidelines.is_empty() {
            errors.push("At least one dosage guideline is required".to_string());
        }

        for (i, g) in self.dosage_guidelines.iter().enumerate() {
            let band = i + 1;
            if !g.min_weight_kg.is_finite() || g.min_weight_kg < MIN_BAND_WEIGHT_KG {
                errors.push(format!("Guideline {}: minimum weight must be greater than 0", band));
            }
            if !g.max_weight_kg.is_finite() || g.max_weight_kg < MIN_BAND_WEIGHT_KG {
                errors.push(format!("Guideline {}: maximum weight must be greater than 0", band));
            }
            if g.max_weight_kg < g.min_weight_kg {
                errors.push(format!(
                    "Guideline {}: maximum weight must be greater than or equal to minimum weight",
                    band
                ));
            }
            if !g.dosage_mg_per_kg.is_finite() || g.dosage_mg_per_kg < MIN_DOSE_RATE_MG_PER_KG {
                errors.push(format!("Guideline {}: dosage must be greater than 0", band));
            }
            if g.frequency_per_day < 1 {
                errors.push(format!("Guideline {}: frequency must be at least 1", band));
            }
            if g.duration_days == Some(0) {
                errors.push(format!("Guideline {}: duration must be at least 1 day", band));
            }
        }

        errors
    }
}
