use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use serenity::model::id::UserId;
use crate::error::BenchError;
use crate::models::bench_db_models::Submission;
use super::database::{Database, from_sql_id, to_sql_id};

const SUBMISSION_COLUMNS: &str = "user_id, gpu_model, benchmark_score, verified, submitted_at";

fn submission_from_row(row: &Row<'_>) -> rusqlite::Result<Submission> {
    Ok(Submission {
        user_id: UserId::new(from_sql_id(row.get(0)?)),
        gpu_model: row.get(1)?,
        score: row.get(2)?,
        verified: row.get(3)?,
        submitted_at: row.get(4)?
    })
}

impl Database {
    /// Replaces whatever the user had before; the new row always starts unverified.
    pub fn upsert_submission(&self, user_id: UserId, gpu_model: &str, score: i64) -> Result<Submission, BenchError> {
        let submission = Submission {
            user_id,
            gpu_model: gpu_model.to_string(),
            score,
            verified: false,
            submitted_at: Utc::now()
        };

        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO gpubenchmarks (user_id, gpu_model, benchmark_score, verified, submitted_at) VALUES (?1, ?2, ?3, 0, ?4)",
                params![to_sql_id(user_id.get()), submission.gpu_model, submission.score, submission.submitted_at]
            )?;
            Ok(())
        })?;

        Ok(submission)
    }

    pub fn get_submission(&self, user_id: UserId) -> Result<Option<Submission>, BenchError> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {SUBMISSION_COLUMNS} FROM gpubenchmarks WHERE user_id = ?1"),
                [to_sql_id(user_id.get())],
                submission_from_row
            ).optional()
        })
    }

    /// Marks a submission verified. Returns `None` when the user never submitted.
    pub fn verify_submission(&self, user_id: UserId) -> Result<Option<Submission>, BenchError> {
        self.with_conn(|conn| {
            let updated = conn.execute("UPDATE gpubenchmarks SET verified = 1 WHERE user_id = ?1", [to_sql_id(user_id.get())])?;
            if updated == 0 {
                return Ok(None);
            }

            conn.query_row(
                &format!("SELECT {SUBMISSION_COLUMNS} FROM gpubenchmarks WHERE user_id = ?1"),
                [to_sql_id(user_id.get())],
                submission_from_row
            ).optional()
        })
    }

    pub fn remove_submission(&self, user_id: UserId) -> Result<bool, BenchError> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM gpubenchmarks WHERE user_id = ?1", [to_sql_id(user_id.get())])?;
            Ok(removed > 0)
        })
    }

    /// Highest verified scores first. Tie order is whatever SQLite returns.
    pub fn top_submissions(&self, limit: u32) -> Result<Vec<Submission>, BenchError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SUBMISSION_COLUMNS} FROM gpubenchmarks WHERE verified = 1 ORDER BY benchmark_score DESC LIMIT ?1"
            ))?;
            let rows = stmt.query_map([limit], submission_from_row)?;
            rows.collect()
        })
    }

    pub fn pending_submissions(&self) -> Result<Vec<Submission>, BenchError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SUBMISSION_COLUMNS} FROM gpubenchmarks WHERE verified = 0 ORDER BY submitted_at"
            ))?;
            let rows = stmt.query_map([], submission_from_row)?;
            rows.collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: u64) -> UserId {
        UserId::new(id)
    }

    #[test]
    fn resubmitting_replaces_the_row_and_resets_verification() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_submission(user(1), "RTX 4090", 100).unwrap();
        db.verify_submission(user(1)).unwrap();

        db.upsert_submission(user(1), "RX 7900 XTX", 250).unwrap();

        let stored = db.get_submission(user(1)).unwrap().unwrap();
        assert_eq!(stored.gpu_model, "RX 7900 XTX");
        assert_eq!(stored.score, 250);
        assert!(!stored.verified);
        assert_eq!(db.pending_submissions().unwrap().len(), 1);
        assert!(db.top_submissions(5).unwrap().is_empty());
    }

    #[test]
    fn missing_users_are_not_errors() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_submission(user(2), "RTX 3090", 10).unwrap();

        assert!(db.get_submission(user(1)).unwrap().is_none());
        assert!(db.verify_submission(user(1)).unwrap().is_none());
        assert!(!db.remove_submission(user(1)).unwrap());

        // Nothing else was touched.
        let other = db.get_submission(user(2)).unwrap().unwrap();
        assert!(!other.verified);
        assert_eq!(db.pending_submissions().unwrap().len(), 1);
    }

    #[test]
    fn verify_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_submission(user(1), "RTX 4090", 100).unwrap();

        let first = db.verify_submission(user(1)).unwrap().unwrap();
        let second = db.verify_submission(user(1)).unwrap().unwrap();

        assert!(first.verified);
        assert_eq!(first, second);
    }

    #[test]
    fn remove_deletes_the_row() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_submission(user(1), "RTX 4090", 100).unwrap();

        assert!(db.remove_submission(user(1)).unwrap());
        assert!(db.get_submission(user(1)).unwrap().is_none());
        assert!(!db.remove_submission(user(1)).unwrap());
    }

    #[test]
    fn top_only_lists_verified_rows_by_score() {
        let db = Database::open_in_memory().unwrap();
        for (id, score) in [(1, 500), (2, 900), (3, 100), (4, 700), (5, 300), (6, 800), (7, 1000)] {
            db.upsert_submission(user(id), "RTX 4090", score).unwrap();
        }
        for id in 1..=6 {
            db.verify_submission(user(id)).unwrap();
        }

        let top = db.top_submissions(5).unwrap();
        let scores = top.iter().map(|s| s.score).collect::<Vec<_>>();

        assert_eq!(scores, vec![900, 800, 700, 500, 300]);
        assert!(top.iter().all(|s| s.verified));
    }

    #[test]
    fn pending_never_lists_verified_rows() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_submission(user(1), "RTX 4090", 100).unwrap();
        db.upsert_submission(user(2), "RTX 4080", 90).unwrap();
        db.verify_submission(user(1)).unwrap();

        let pending = db.pending_submissions().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].user_id, user(2));
        assert!(pending.iter().all(|s| !s.verified));
    }

    #[test]
    fn removing_a_catalog_model_keeps_stored_submissions() {
        let db = Database::open_in_memory().unwrap();
        db.add_gpu_model("RTX 4090").unwrap();
        db.upsert_submission(user(1), "RTX 4090", 12345).unwrap();
        db.verify_submission(user(1)).unwrap();

        assert!(db.remove_gpu_model("RTX 4090").unwrap());

        let stored = db.get_submission(user(1)).unwrap().unwrap();
        assert_eq!(stored.gpu_model, "RTX 4090");
        assert_eq!(stored.score, 12345);
        assert!(stored.verified);
    }

    #[test]
    fn large_snowflakes_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let id = user(119087962200735745);
        db.upsert_submission(id, "RTX 5090", 1).unwrap();

        assert_eq!(db.get_submission(id).unwrap().unwrap().user_id, id);
    }
}
