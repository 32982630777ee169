use anyhow::{Context, Result};
use chrono::Utc;
use log::warn;
use rusqlite::{params, OptionalExtension};

use crate::db::connection::Database;
use crate::db::helpers::{parse_path, parse_percentage};
use crate::models::{ExerciseKey, PersistedProgress, Point};

const FIELD_PATH: &str = "path";
const FIELD_PERCENTAGE: &str = "percentage";

impl Database {
    /// Overwrite the stored stroke and score for an exercise.
    pub fn save_progress(
        &self,
        key: ExerciseKey,
        session_id: &str,
        path: &[Point],
        percentage: f64,
    ) -> Result<()> {
        let path_json = serde_json::to_string(path).context("failed to serialize stroke path")?;
        let percentage_text = percentage.to_string();
        let now = Utc::now().to_rfc3339();

        self.with_conn(|conn| {
            let tx = conn
                .transaction()
                .context("failed to open progress transaction")?;
            for (field, value) in [
                (FIELD_PATH, path_json.as_str()),
                (FIELD_PERCENTAGE, percentage_text.as_str()),
            ] {
                tx.execute(
                    "INSERT INTO progress (unit_id, sub_unit_id, field, value, session_id, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                     ON CONFLICT (unit_id, sub_unit_id, field) DO UPDATE
                     SET value = excluded.value,
                         session_id = excluded.session_id,
                         updated_at = excluded.updated_at",
                    params![key.unit, key.sub_unit, field, value, session_id, now],
                )
                .with_context(|| format!("failed to store {field} for {key}"))?;
            }
            tx.commit().context("failed to commit progress")?;
            Ok(())
        })
    }

    /// Stored progress for an exercise, if any. Malformed rows are logged
    /// and read as absent so a corrupt store never blocks the exercise.
    pub fn load_progress(&self, key: ExerciseKey) -> Result<Option<PersistedProgress>> {
        let (path_raw, percentage_raw) = self.with_conn(|conn| {
            let field_value = |field: &str| -> Result<Option<String>> {
                conn.query_row(
                    "SELECT value FROM progress
                     WHERE unit_id = ?1 AND sub_unit_id = ?2 AND field = ?3",
                    params![key.unit, key.sub_unit, field],
                    |row| row.get(0),
                )
                .optional()
                .with_context(|| format!("failed to read {field} for {key}"))
            };
            Ok((field_value(FIELD_PATH)?, field_value(FIELD_PERCENTAGE)?))
        })?;

        let (Some(path_raw), Some(percentage_raw)) = (path_raw, percentage_raw) else {
            return Ok(None);
        };

        let path = match parse_path(&path_raw) {
            Ok(path) => path,
            Err(err) => {
                warn!("discarding stored path for {key}: {err:#}");
                return Ok(None);
            }
        };
        let percentage = match parse_percentage(&percentage_raw) {
            Ok(percentage) => percentage,
            Err(err) => {
                warn!("discarding stored percentage for {key}: {err:#}");
                return Ok(None);
            }
        };

        Ok(Some(PersistedProgress { path, percentage }))
    }

    /// Remove both stored fields for an exercise. A later load reads as
    /// absent.
    pub fn clear_progress(&self, key: ExerciseKey) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "DELETE FROM progress WHERE unit_id = ?1 AND sub_unit_id = ?2",
                params![key.unit, key.sub_unit],
            )
            .with_context(|| format!("failed to clear progress for {key}"))?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::params;

    use crate::db::Database;
    use crate::models::{ExerciseKey, Point};

    fn sample_path() -> Vec<Point> {
        vec![Point::new(1.5, 2.0), Point::new(3.0, 4.25)]
    }

    #[test]
    fn save_then_load_round_trips() {
        let db = Database::open_in_memory().unwrap();
        let key = ExerciseKey::new(1, 2);

        db.save_progress(key, "session-a", &sample_path(), 42.5)
            .unwrap();
        let progress = db.load_progress(key).unwrap().unwrap();
        assert_eq!(progress.path, sample_path());
        assert_eq!(progress.percentage, 42.5);
    }

    #[test]
    fn save_overwrites_the_previous_record() {
        let db = Database::open_in_memory().unwrap();
        let key = ExerciseKey::new(1, 2);

        db.save_progress(key, "session-a", &sample_path(), 42.5)
            .unwrap();
        db.save_progress(key, "session-b", &vec![Point::new(9.0, 9.0)], 88.0)
            .unwrap();

        let progress = db.load_progress(key).unwrap().unwrap();
        assert_eq!(progress.path, vec![Point::new(9.0, 9.0)]);
        assert_eq!(progress.percentage, 88.0);
    }

    #[test]
    fn clear_makes_a_later_load_absent() {
        let db = Database::open_in_memory().unwrap();
        let key = ExerciseKey::new(2, 7);

        db.save_progress(key, "session-a", &sample_path(), 70.0)
            .unwrap();
        db.clear_progress(key).unwrap();
        assert!(db.load_progress(key).unwrap().is_none());

        // Clearing an already-absent key is fine too.
        db.clear_progress(key).unwrap();
    }

    #[test]
    fn keys_do_not_interfere() {
        let db = Database::open_in_memory().unwrap();
        let first = ExerciseKey::new(1, 1);
        let second = ExerciseKey::new(1, 2);

        db.save_progress(first, "session-a", &sample_path(), 10.0)
            .unwrap();
        db.save_progress(second, "session-b", &sample_path(), 90.0)
            .unwrap();
        db.clear_progress(first).unwrap();

        assert!(db.load_progress(first).unwrap().is_none());
        assert_eq!(db.load_progress(second).unwrap().unwrap().percentage, 90.0);
    }

    #[test]
    fn malformed_stored_path_reads_as_absent() {
        let db = Database::open_in_memory().unwrap();
        let key = ExerciseKey::new(3, 3);
        db.save_progress(key, "session-a", &sample_path(), 55.0)
            .unwrap();

        db.with_conn(|conn| {
            conn.execute(
                "UPDATE progress SET value = 'not json' WHERE field = 'path'",
                params![],
            )?;
            Ok(())
        })
        .unwrap();

        assert!(db.load_progress(key).unwrap().is_none());
    }

    #[test]
    fn malformed_stored_percentage_reads_as_absent() {
        let db = Database::open_in_memory().unwrap();
        let key = ExerciseKey::new(3, 4);
        db.save_progress(key, "session-a", &sample_path(), 55.0)
            .unwrap();

        db.with_conn(|conn| {
            conn.execute(
                "UPDATE progress SET value = 'NaN%' WHERE field = 'percentage'",
                params![],
            )?;
            Ok(())
        })
        .unwrap();

        assert!(db.load_progress(key).unwrap().is_none());
    }
}
