use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use vetdose_core::models::{MedicationWithGuidelines, NewMedication, PlanOutcome, Species, WeightUnit};
use vetdose_core::resolver::{find_medications_by_name, DosageCalculator, ResolverError};
use vetdose_core::{Config, Database, DosageError};

/// Candidates listed when a medication name has no exact match.
const MAX_SUGGESTIONS: usize = 3;

#[derive(Parser)]
#[command(name = "vetdose")]
#[command(about = "Veterinary medication dosage calculator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override catalog database path
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Read configuration from this file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List medications
    List {
        /// Only medications for this species (dog, cat, both)
        #[arg(long)]
        species: Option<Species>,
    },

    /// Show a medication and its dosage table
    Show {
        /// Medication name or ID
        medication: String,
    },

    /// Add a medication from a JSON file
    Add { file: PathBuf },

    /// Import a JSON array of medications
    Import { file: PathBuf },

    /// Calculate a dose for an animal's weight
    Calc {
        /// Medication name or ID
        medication: String,

        /// Animal weight
        #[arg(allow_hyphen_values = true)]
        weight: String,

        /// Unit of the weight (kg, lbs)
        #[arg(long)]
        unit: Option<WeightUnit>,

        /// Save the calculation to this user's history
        #[arg(long)]
        user: Option<String>,
    },

    /// Toggle a medication as a favorite
    Favorite {
        /// Medication name or ID
        medication: String,

        #[arg(long)]
        user: String,
    },

    /// List a user's favorite medications
    Favorites {
        #[arg(long)]
        user: String,
    },

    /// Show a user's recent calculations
    History {
        #[arg(long)]
        user: String,

        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(Config::locate);
    let config = match &config_path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    vetdose_core::logging::init_with_level(&config.logging.level);
    match &config_path {
        Some(path) => tracing::info!("Loaded config from {:?}", path),
        None => tracing::info!("No config file found, using defaults"),
    }

    let db_path = cli.db.clone().unwrap_or_else(|| config.database.path.clone());
    let mut db = Database::open(&db_path)
        .with_context(|| format!("failed to open catalog at {}", db_path.display()))?;
    tracing::debug!("Using catalog at {:?}", db_path);

    match cli.command {
        Commands::List { species } => cmd_list(&db, species),
        Commands::Show { medication } => cmd_show(&db, &medication),
        Commands::Add { file } => cmd_add(&mut db, &file),
        Commands::Import { file } => cmd_import(&mut db, &file),
        Commands::Calc {
            medication,
            weight,
            unit,
            user,
        } => cmd_calc(&db, &config, &medication, &weight, unit, user.as_deref()),
        Commands::Favorite { medication, user } => cmd_favorite(&db, &medication, &user),
        Commands::Favorites { user } => cmd_favorites(&db, &user),
        Commands::History { user, limit } => cmd_history(&db, &user, limit),
    }
}

fn cmd_list(db: &Database, species: Option<Species>) -> Result<()> {
    let medications = db.list_medications(species)?;
    if medications.is_empty() {
        println!("No medications in catalog.");
        return Ok(());
    }
    for m in &medications {
        print_summary(m);
    }
    Ok(())
}

fn cmd_show(db: &Database, query: &str) -> Result<()> {
    let m = resolve_medication(db, query)?;
    print_summary(&m);
    if let Some(description) = &m.medication.description {
        println!("  {}", description);
    }
    println!("  id: {}", m.medication.id);
    if m.dosage_guidelines.is_empty() {
        println!("  (no dosage guidelines)");
    }
    for g in &m.dosage_guidelines {
        let duration = g
            .duration_days
            .map(|d| format!(" for {} days", d))
            .unwrap_or_default();
        println!(
            "  {}-{} kg: {} mg/kg, {}x daily{}",
            g.min_weight_kg, g.max_weight_kg, g.dosage_mg_per_kg, g.frequency_per_day, duration
        );
        if let Some(notes) = &g.notes {
            println!("      {}", notes);
        }
    }
    Ok(())
}

fn cmd_add(db: &mut Database, file: &Path) -> Result<()> {
    let new: NewMedication = read_json(file)?;
    let inserted = db.insert_medication(&new)?;
    println!(
        "Added {} ({} dosage guidelines) with id {}",
        inserted.medication.name,
        inserted.dosage_guidelines.len(),
        inserted.medication.id
    );
    Ok(())
}

fn cmd_import(db: &mut Database, file: &Path) -> Result<()> {
    let batch: Vec<NewMedication> = read_json(file)?;
    let inserted = db.insert_medications(&batch)?;
    println!("Imported {} medications", inserted.len());
    Ok(())
}

fn cmd_calc(
    db: &Database,
    config: &Config,
    query: &str,
    weight: &str,
    unit: Option<WeightUnit>,
    user: Option<&str>,
) -> Result<()> {
    let m = resolve_medication(db, query)?;

    let unit = match (unit, user) {
        (Some(unit), _) => unit,
        (None, Some(user)) => db.get_preferences(user)?.weight_unit,
        (None, None) => config.display.default_unit,
    };

    let calculator = DosageCalculator::new(db);
    let calc = match calculator.calculate(&m.medication.id, weight, unit, user) {
        Ok(calc) => calc,
        Err(ResolverError::Dosage(DosageError::InvalidWeight(msg))) => {
            bail!("Please enter a valid weight ({})", msg)
        }
        Err(e) => return Err(e.into()),
    };

    match calc.outcome {
        PlanOutcome::Plan(plan) => {
            println!("{} for {:.2} kg:", m.medication.name, plan.weight_kg);
            println!("  Dose:      {}", plan.display_dose(config.display.dose_decimals));
            println!("  Frequency: {}x daily", plan.frequency_per_day);
            if let Some(days) = plan.duration_days {
                println!("  Duration:  {} days", days);
            }
            if let Some(notes) = plan.notes {
                println!("  Notes:     {}", notes);
            }
        }
        PlanOutcome::NoMatch { weight_kg } => {
            println!(
                "No dosage guideline for {} covers {:.2} kg. Consult the product literature.",
                m.medication.name, weight_kg
            );
        }
    }
    Ok(())
}

fn cmd_favorite(db: &Database, query: &str, user: &str) -> Result<()> {
    let m = resolve_medication(db, query)?;
    if db.toggle_favorite(user, &m.medication.id)? {
        println!("Added {} to favorites", m.medication.name);
    } else {
        println!("Removed {} from favorites", m.medication.name);
    }
    Ok(())
}

fn cmd_favorites(db: &Database, user: &str) -> Result<()> {
    let favorites = db.list_favorite_medications(user)?;
    if favorites.is_empty() {
        println!("No favorites yet.");
    }
    for m in &favorites {
        print_summary(m);
    }
    Ok(())
}

fn cmd_history(db: &Database, user: &str, limit: usize) -> Result<()> {
    let records = db.list_calculations(user, limit)?;
    if records.is_empty() {
        println!("No calculations saved.");
    }
    for r in &records {
        let name = db
            .get_medication(&r.medication_id)?
            .map(|m| m.medication.name)
            .unwrap_or_else(|| r.medication_id.clone());
        println!(
            "{}  {}  {:.2} kg -> {:.2} mg, {}x daily",
            r.created_at, name, r.weight_kg, r.total_dose_mg, r.frequency_per_day
        );
    }
    Ok(())
}

/// Resolve a medication by ID, or by name or generic name ignoring case.
///
/// Near misses are only offered as suggestions; a dose is never computed
/// for a medication the user did not name.
fn resolve_medication(db: &Database, query: &str) -> Result<MedicationWithGuidelines> {
    if let Some(m) = db.get_medication(query)? {
        return Ok(m);
    }

    let wanted = query.trim().to_lowercase();
    let mut catalog = db.list_medications(None)?;
    let exact = catalog.iter().position(|m| {
        m.medication.name.to_lowercase() == wanted
            || m.medication.generic_name.as_deref().map(str::to_lowercase).as_deref() == Some(wanted.as_str())
    });
    if let Some(index) = exact {
        return Ok(catalog.swap_remove(index));
    }

    let suggestions: Vec<String> = find_medications_by_name(&catalog, &wanted, MAX_SUGGESTIONS)
        .into_iter()
        .map(|found| found.medication.medication.name.clone())
        .collect();
    if suggestions.is_empty() {
        bail!("No medication named '{}'", query.trim());
    }
    bail!(
        "No medication named '{}'. Did you mean {}?",
        query.trim(),
        suggestions.join(", ")
    )
}

fn print_summary(m: &MedicationWithGuidelines) {
    let generic = m
        .medication
        .generic_name
        .as_ref()
        .map(|g| format!(" ({})", g))
        .unwrap_or_default();
    println!(
        "{}{} [{}] - {}",
        m.medication.name, generic, m.medication.species, m.medication.category
    );
}

fn read_json<T: serde::de::DeserializeOwned>(file: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("invalid medication JSON in {}", file.display()))
}
