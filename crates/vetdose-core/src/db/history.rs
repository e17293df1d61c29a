//! Saved calculation history.

use rusqlite::params;

use super::{Database, DbResult};
use crate::models::CalculationRecord;

impl Database {
    /// Append a calculation to the user's history.
    pub fn insert_calculation(&self, record: &CalculationRecord) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO calculation_history (
                id, user_id, medication_id, weight_kg, total_dose_mg,
                frequency_per_day, duration_days, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                record.id,
                record.user_id,
                record.medication_id,
                record.weight_kg,
                record.total_dose_mg,
                record.frequency_per_day,
                record.duration_days,
                record.created_at,
            ],
        )?;
        Ok(())
    }

    /// Most recent calculations for a user, newest first.
    pub fn list_calculations(&self, user_id: &str, limit: usize) -> DbResult<Vec<CalculationRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, user_id, medication_id, weight_kg, total_dose_mg,
                   frequency_per_day, duration_days, created_at
            FROM calculation_history
            WHERE user_id = ?
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?
            "#,
        )?;

        let rows = stmt.query_map(params![user_id, limit as i64], |row| {
            Ok(CalculationRecord {
                id: row.get(0)?,
                user_id: row.get(1)?,
                medication_id: row.get(2)?,
                weight_kg: row.get(3)?,
                total_dose_mg: row.get(4)?,
                frequency_per_day: row.get(5)?,
                duration_days: row.get(6)?,
                created_at: row.get(7)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Delete a user's history. Returns the number of records removed.
    pub fn clear_calculations(&self, user_id: &str) -> DbResult<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM calculation_history WHERE user_id = ?", [user_id])?;
        Ok(removed)
    }
}
