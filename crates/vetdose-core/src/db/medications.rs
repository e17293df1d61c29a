//! Medication catalog database operations.

use rusqlite::{params, OptionalExtension, Transaction};

use super::{Database, DbError, DbResult};
use crate::models::{DosageGuideline, Medication, MedicationWithGuidelines, NewMedication, Species};

impl Database {
    /// Validate and insert a new medication with its guidelines.
    ///
    /// Guidelines are stored in submission order. Nothing is written if
    /// validation fails.
    pub fn insert_medication(&mut self, new: &NewMedication) -> DbResult<MedicationWithGuidelines> {
        check_submission(new)?;

        let tx = self.transaction()?;
        let inserted = insert_in_tx(&tx, new)?;
        tx.commit()?;

        tracing::info!(
            medication_id = %inserted.medication.id,
            name = %inserted.medication.name,
            bands = inserted.dosage_guidelines.len(),
            "Added medication"
        );
        Ok(inserted)
    }

    /// Validate and insert a batch of medications atomically.
    ///
    /// Every submission is validated before anything is written.
    pub fn insert_medications(
        &mut self,
        batch: &[NewMedication],
    ) -> DbResult<Vec<MedicationWithGuidelines>> {
        for new in batch {
            check_submission(new)?;
        }

        let tx = self.transaction()?;
        let mut inserted = Vec::with_capacity(batch.len());
        for new in batch {
            inserted.push(insert_in_tx(&tx, new)?);
        }
        tx.commit()?;

        tracing::info!(count = inserted.len(), "Imported medications");
        Ok(inserted)
    }

    /// Get a medication and its guidelines by ID.
    pub fn get_medication(&self, id: &str) -> DbResult<Option<MedicationWithGuidelines>> {
        let medication = self
            .conn
            .query_row(
                r#"
                SELECT id, name, generic_name, species, category, description,
                       created_at, updated_at
                FROM medications
                WHERE id = ?
                "#,
                [id],
                map_medication_row,
            )
            .optional()?;

        match medication {
            Some(row) => {
                let medication: Medication = row.try_into()?;
                let dosage_guidelines = self.list_guidelines(&medication.id)?;
                Ok(Some(MedicationWithGuidelines {
                    medication,
                    dosage_guidelines,
                }))
            }
            None => Ok(None),
        }
    }

    /// List medications ordered by name.
    ///
    /// A `Dog` or `Cat` filter also returns medications labelled `Both`.
    pub fn list_medications(&self, species: Option<Species>) -> DbResult<Vec<MedicationWithGuidelines>> {
        let filter = species.filter(|s| *s != Species::Both);

        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, name, generic_name, species, category, description,
                   created_at, updated_at
            FROM medications
            WHERE ?1 IS NULL OR species = ?1 OR species = 'both'
            ORDER BY name COLLATE NOCASE, name
            "#,
        )?;

        let rows = stmt.query_map([filter.map(|s| s.as_str())], map_medication_row)?;

        let mut medications = Vec::new();
        for row in rows {
            let medication: Medication = row?.try_into()?;
            let dosage_guidelines = self.list_guidelines(&medication.id)?;
            medications.push(MedicationWithGuidelines {
                medication,
                dosage_guidelines,
            });
        }
        Ok(medications)
    }

    /// Get the guidelines of a medication in catalog order.
    pub fn list_guidelines(&self, medication_id: &str) -> DbResult<Vec<DosageGuideline>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, medication_id, min_weight_kg, max_weight_kg, dosage_mg_per_kg,
                   frequency_per_day, duration_days, notes, created_at
            FROM dosage_guidelines
            WHERE medication_id = ?
            ORDER BY position
            "#,
        )?;

        let rows = stmt.query_map([medication_id], |row| {
            Ok(DosageGuideline {
                id: row.get(0)?,
                medication_id: row.get(1)?,
                min_weight_kg: row.get(2)?,
                max_weight_kg: row.get(3)?,
                dosage_mg_per_kg: row.get(4)?,
                frequency_per_day: row.get(5)?,
                duration_days: row.get(6)?,
                notes: row.get(7)?,
                created_at: row.get(8)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Delete a medication. Guidelines, favorites and history go with it.
    pub fn delete_medication(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM medications WHERE id = ?", [id])?;
        if rows_affected > 0 {
            tracing::info!(medication_id = %id, "Deleted medication");
        }
        Ok(rows_affected > 0)
    }
}

fn check_submission(new: &NewMedication) -> DbResult<()> {
    let errors = new.validate();
    if errors.is_empty() {
        return Ok(());
    }
    tracing::warn!(name = %new.name, ?errors, "Rejected medication submission");
    Err(DbError::Constraint(errors.join("; ")))
}

fn insert_in_tx(tx: &Transaction<'_>, new: &NewMedication) -> DbResult<MedicationWithGuidelines> {
    let now = chrono::Utc::now().to_rfc3339();
    let medication = Medication {
        id: uuid::Uuid::new_v4().to_string(),
        name: new.name.trim().to_string(),
        generic_name: new.generic_name.clone(),
        species: new.species,
        category: new.category.trim().to_string(),
        description: new.description.clone(),
        created_at: now.clone(),
        updated_at: now.clone(),
    };

    tx.execute(
        r#"
        INSERT INTO medications (
            id, name, generic_name, species, category, description, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
        params![
            medication.id,
            medication.name,
            medication.generic_name,
            medication.species.as_str(),
            medication.category,
            medication.description,
            medication.created_at,
            medication.updated_at,
        ],
    )?;

    let mut dosage_guidelines = Vec::with_capacity(new.dosage_guidelines.len());
    for (position, g) in new.dosage_guidelines.iter().enumerate() {
        let guideline = DosageGuideline {
            id: uuid::Uuid::new_v4().to_string(),
            medication_id: medication.id.clone(),
            min_weight_kg: g.min_weight_kg,
            max_weight_kg: g.max_weight_kg,
            dosage_mg_per_kg: g.dosage_mg_per_kg,
            frequency_per_day: g.frequency_per_day,
            duration_days: g.duration_days,
            notes: g.notes.clone(),
            created_at: now.clone(),
        };

        tx.execute(
            r#"
            INSERT INTO dosage_guidelines (
                id, medication_id, position, min_weight_kg, max_weight_kg,
                dosage_mg_per_kg, frequency_per_day, duration_days, notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                guideline.id,
                guideline.medication_id,
                position as i64,
                guideline.min_weight_kg,
                guideline.max_weight_kg,
                guideline.dosage_mg_per_kg,
                guideline.frequency_per_day,
                guideline.duration_days,
                guideline.notes,
                guideline.created_at,
            ],
        )?;
        dosage_guidelines.push(guideline);
    }

    Ok(MedicationWithGuidelines {
        medication,
        dosage_guidelines,
    })
}

fn map_medication_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MedicationRow> {
    Ok(MedicationRow {
        id: row.get(0)?,
        name: row.get(1)?,
        generic_name: row.get(2)?,
        species: row.get(3)?,
        category: row.get(4)?,
        description: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

/// Intermediate row struct for database mapping.
struct MedicationRow {
    id: String,
    name: String,
    generic_name: Option<String>,
    species: String,
    category: String,
    description: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<MedicationRow> for Medication {
    type Error = DbError;

    fn try_from(row: MedicationRow) -> Result<Self, Self::Error> {
        Ok(Medication {
            species: row.species.parse().map_err(DbError::Constraint)?,
            id: row.id,
            name: row.name,
            generic_name: row.generic_name,
            category: row.category,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewDosageGuideline;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn band(min: f64, max: f64, rate: f64) -> NewDosageGuideline {
        NewDosageGuideline {
            min_weight_kg: min,
            max_weight_kg: max,
            dosage_mg_per_kg: rate,
            frequency_per_day: 2,
            duration_days: Some(7),
            notes: None,
        }
    }

    fn submission(name: &str, species: Species) -> NewMedication {
        NewMedication::new(name, species, "Antibiotic").with_guideline(band(1.0, 10.0, 4.0))
    }

    #[test]
    fn test_insert_and_get() {
        let mut db = setup_db();

        let mut new = submission("Amoxicillin", Species::Both);
        new.generic_name = Some("amoxicillin trihydrate".into());
        new.dosage_guidelines.push(band(10.0, 40.0, 3.0));

        let inserted = db.insert_medication(&new).unwrap();
        let retrieved = db.get_medication(&inserted.medication.id).unwrap().unwrap();

        assert_eq!(retrieved.medication.name, "Amoxicillin");
        assert_eq!(retrieved.medication.species, Species::Both);
        assert_eq!(retrieved.medication.generic_name, Some("amoxicillin trihydrate".into()));
        assert_eq!(retrieved.dosage_guidelines.len(), 2);
        assert_eq!(retrieved, inserted);
    }

    #[test]
    fn test_guidelines_keep_submission_order() {
        let mut db = setup_db();

        // Deliberately not sorted by weight
        let new = NewMedication::new("Meloxicam", Species::Dog, "NSAID")
            .with_guideline(band(20.0, 40.0, 0.1))
            .with_guideline(band(1.0, 20.0, 0.2))
            .with_guideline(band(5.0, 15.0, 0.3));

        let inserted = db.insert_medication(&new).unwrap();
        let guidelines = db.list_guidelines(&inserted.medication.id).unwrap();

        let rates: Vec<f64> = guidelines.iter().map(|g| g.dosage_mg_per_kg).collect();
        assert_eq!(rates, vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_inverted_band_rejected_at_write() {
        let mut db = setup_db();

        let new = NewMedication::new("Bad", Species::Cat, "Other").with_guideline(band(10.0, 1.0, 1.0));
        let result = db.insert_medication(&new);

        assert!(matches!(result, Err(DbError::Constraint(_))));
        assert!(db.list_medications(None).unwrap().is_empty());
    }

    #[test]
    fn test_batch_is_all_or_nothing() {
        let mut db = setup_db();

        let good = submission("Good", Species::Dog);
        let bad = NewMedication::new("Bad", Species::Dog, "Other");
        let result = db.insert_medications(&[good, bad]);

        assert!(result.is_err());
        assert!(db.list_medications(None).unwrap().is_empty());
    }

    #[test]
    fn test_list_by_species_includes_both() {
        let mut db = setup_db();
        db.insert_medication(&submission("Dogonly", Species::Dog)).unwrap();
        db.insert_medication(&submission("Catonly", Species::Cat)).unwrap();
        db.insert_medication(&submission("Anyone", Species::Both)).unwrap();

        let names = |list: Vec<MedicationWithGuidelines>| -> Vec<String> {
            list.into_iter().map(|m| m.medication.name).collect()
        };

        assert_eq!(
            names(db.list_medications(Some(Species::Dog)).unwrap()),
            vec!["Anyone", "Dogonly"]
        );
        assert_eq!(
            names(db.list_medications(Some(Species::Cat)).unwrap()),
            vec!["Anyone", "Catonly"]
        );
        assert_eq!(db.list_medications(Some(Species::Both)).unwrap().len(), 3);
        assert_eq!(db.list_medications(None).unwrap().len(), 3);
    }

    #[test]
    fn test_list_ignores_case_when_sorting() {
        let mut db = setup_db();
        db.insert_medication(&submission("Zeniquin", Species::Dog)).unwrap();
        db.insert_medication(&submission("amoxicillin", Species::Both)).unwrap();
        db.insert_medication(&submission("Baytril", Species::Both)).unwrap();

        let names: Vec<String> = db
            .list_medications(None)
            .unwrap()
            .into_iter()
            .map(|m| m.medication.name)
            .collect();
        assert_eq!(names, vec!["amoxicillin", "Baytril", "Zeniquin"]);
    }

    #[test]
    fn test_delete_cascades_guidelines() {
        let mut db = setup_db();
        let inserted = db.insert_medication(&submission("Temp", Species::Dog)).unwrap();
        let id = inserted.medication.id;

        assert!(db.delete_medication(&id).unwrap());
        assert!(db.get_medication(&id).unwrap().is_none());
        assert!(db.list_guidelines(&id).unwrap().is_empty());
        assert!(!db.delete_medication(&id).unwrap());
    }

    #[test]
    fn test_get_missing() {
        let db = setup_db();
        assert!(db.get_medication("nope").unwrap().is_none());
    }
}
