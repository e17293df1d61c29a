//! SQLite schema definition.

/// Complete database schema for vetdose.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Medication Catalog
-- ============================================================================

CREATE TABLE IF NOT EXISTS medications (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    generic_name TEXT,
    species TEXT NOT NULL CHECK (species IN ('dog', 'cat', 'both')),
    category TEXT NOT NULL,
    description TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_medications_name ON medications(name);
CREATE INDEX IF NOT EXISTS idx_medications_species ON medications(species);

-- Weight bands; position preserves submission order for first-match lookup
CREATE TABLE IF NOT EXISTS dosage_guidelines (
    id TEXT PRIMARY KEY,
    medication_id TEXT NOT NULL REFERENCES medications(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    min_weight_kg REAL NOT NULL,
    max_weight_kg REAL NOT NULL,
    dosage_mg_per_kg REAL NOT NULL,
    frequency_per_day INTEGER NOT NULL CHECK (frequency_per_day >= 1),
    duration_days INTEGER CHECK (duration_days IS NULL OR duration_days >= 1),
    notes TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    CHECK (min_weight_kg <= max_weight_kg),
    UNIQUE (medication_id, position)
);

CREATE INDEX IF NOT EXISTS idx_guidelines_medication ON dosage_guidelines(medication_id, position);

-- ============================================================================
-- Per-user data
-- ============================================================================

CREATE TABLE IF NOT EXISTS user_favorites (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    medication_id TEXT NOT NULL REFERENCES medications(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE (user_id, medication_id)
);

CREATE INDEX IF NOT EXISTS idx_favorites_user ON user_favorites(user_id);

CREATE TABLE IF NOT EXISTS calculation_history (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    medication_id TEXT NOT NULL REFERENCES medications(id) ON DELETE CASCADE,
    weight_kg REAL NOT NULL,
    total_dose_mg REAL NOT NULL,
    frequency_per_day INTEGER NOT NULL,
    duration_days INTEGER,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_history_user ON calculation_history(user_id, created_at);

CREATE TABLE IF NOT EXISTS user_preferences (
    user_id TEXT PRIMARY KEY,
    preferences TEXT NOT NULL DEFAULT '{}',     -- JSON object
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
