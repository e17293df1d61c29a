//! User favorite medications.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::models::MedicationWithGuidelines;

impl Database {
    /// Mark a medication as a favorite. Adding twice is a no-op.
    pub fn add_favorite(&self, user_id: &str, medication_id: &str) -> DbResult<()> {
        if self.get_medication(medication_id)?.is_none() {
            return Err(DbError::NotFound(format!("medication {}", medication_id)));
        }

        self.conn.execute(
            r#"
            INSERT INTO user_favorites (id, user_id, medication_id, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(user_id, medication_id) DO NOTHING
            "#,
            params![
                uuid::Uuid::new_v4().to_string(),
                user_id,
                medication_id,
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Remove a favorite. Returns whether one existed.
    pub fn remove_favorite(&self, user_id: &str, medication_id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "DELETE FROM user_favorites WHERE user_id = ? AND medication_id = ?",
            [user_id, medication_id],
        )?;
        Ok(rows_affected > 0)
    }

    /// Check whether a medication is one of the user's favorites.
    pub fn is_favorite(&self, user_id: &str, medication_id: &str) -> DbResult<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM user_favorites WHERE user_id = ? AND medication_id = ?",
                [user_id, medication_id],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Flip the favorite state. Returns the new state.
    pub fn toggle_favorite(&self, user_id: &str, medication_id: &str) -> DbResult<bool> {
        let now_favorite = if self.is_favorite(user_id, medication_id)? {
            self.remove_favorite(user_id, medication_id)?;
            false
        } else {
            self.add_favorite(user_id, medication_id)?;
            true
        };
        tracing::debug!(user_id, medication_id, now_favorite, "Toggled favorite");
        Ok(now_favorite)
    }

    /// IDs of the user's favorite medications.
    pub fn list_favorite_ids(&self, user_id: &str) -> DbResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT medication_id FROM user_favorites WHERE user_id = ? ORDER BY created_at",
        )?;
        let rows = stmt.query_map([user_id], |row| row.get(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// The user's favorite medications with their guidelines, ordered by name.
    pub fn list_favorite_medications(&self, user_id: &str) -> DbResult<Vec<MedicationWithGuidelines>> {
        let mut medications = Vec::new();
        for id in self.list_favorite_ids(user_id)? {
            if let Some(medication) = self.get_medication(&id)? {
                medications.push(medication);
            }
        }
        medications.sort_by_cached_key(|m| m.medication.name.to_lowercase());
        Ok(medications)
    }
}
