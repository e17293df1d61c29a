//! User preference storage.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};
use crate::models::UserPreferences;

impl Database {
    /// Get a user's preferences, falling back to defaults.
    pub fn get_preferences(&self, user_id: &str) -> DbResult<UserPreferences> {
        let stored: Option<String> = self
            .conn
            .query_row(
                "SELECT preferences FROM user_preferences WHERE user_id = ?",
                [user_id],
                |row| row.get(0),
            )
            .optional()?;

        match stored {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(UserPreferences::new(user_id)),
        }
    }

    /// Save a user's preferences.
    pub fn set_preferences(&self, prefs: &UserPreferences) -> DbResult<()> {
        let json = serde_json::to_string(prefs)?;
        self.conn.execute(
            r#"
            INSERT INTO user_preferences (user_id, preferences, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(user_id) DO UPDATE SET
                preferences = excluded.preferences,
                updated_at = datetime('now')
            "#,
            params![prefs.user_id, json],
        )?;
        Ok(())
    }
}
