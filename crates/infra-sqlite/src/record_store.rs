// SQLite RecordStore Implementation

use async_trait::async_trait;
use mediaforge_core::domain::{JobId, UnitInput, UnitResult};
use mediaforge_core::error::{EngineError, Result};
use mediaforge_core::port::{Clock, RecordStore};
use sqlx::{Row, SqlitePool};
use std::sync::Arc;
use tracing::debug;

// Helper to convert sqlx::Error to EngineError with a useful message
fn map_sqlx_error(err: sqlx::Error) -> EngineError {
    match &err {
        sqlx::Error::Database(db_err) => {
            if let Some(code) = db_err.code() {
                EngineError::RecordStore(format!(
                    "database error [{}]: {}",
                    code.as_ref(),
                    db_err.message()
                ))
            } else {
                EngineError::RecordStore(format!("database error: {}", db_err.message()))
            }
        }
        sqlx::Error::RowNotFound => EngineError::RecordStore("row not found".to_string()),
        sqlx::Error::PoolTimedOut => {
            // Keep the transport wording so the classifier sees a timeout
            EngineError::RecordStore("connection pool timed out".to_string())
        }
        _ => EngineError::RecordStore(err.to_string()),
    }
}

pub struct SqliteRecordStore {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl SqliteRecordStore {
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    /// Seed the ordered unit inputs for a job (authoring/import surface).
    /// Replaces any previous unit list for the job.
    pub async fn insert_units(&self, job_id: &JobId, descriptions: &[String]) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        sqlx::query("DELETE FROM brief_units WHERE job_id = ?")
            .bind(job_id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        for (position, description) in descriptions.iter().enumerate() {
            sqlx::query(
                "INSERT INTO brief_units (job_id, position, description) VALUES (?, ?, ?)",
            )
            .bind(job_id)
            .bind(position as i64)
            .bind(description)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        debug!(job_id = %job_id, units = descriptions.len(), "Seeded brief units");
        Ok(())
    }

    /// Read back the persisted results for a job (ordered by position)
    pub async fn fetch_results(&self, job_id: &JobId) -> Result<Vec<UnitResult>> {
        let rows = sqlx::query(
            r#"
            SELECT description, refined_instruction, artifact_refs, error_message
            FROM unit_results
            WHERE job_id = ?
            ORDER BY position ASC
            "#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let artifact_refs: String = row.get("artifact_refs");
            let artifacts: Vec<String> = serde_json::from_str(&artifact_refs)?;
            results.push(UnitResult {
                input: UnitInput::new(row.get::<String, _>("description")),
                refined_instruction: row.get("refined_instruction"),
                artifacts,
                error_message: row.get("error_message"),
            });
        }
        Ok(results)
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn fetch_units(&self, job_id: &JobId) -> Result<Vec<UnitInput>> {
        let rows = sqlx::query(
            "SELECT description FROM brief_units WHERE job_id = ? ORDER BY position ASC",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|row| UnitInput::new(row.get::<String, _>("description")))
            .collect())
    }

    async fn persist_results(&self, job_id: &JobId, results: &[UnitResult]) -> Result<()> {
        let now = self.clock.now_millis();
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        // Replace the previous attempt wholesale; results are written once
        // per attempt, never unit-by-unit
        sqlx::query("DELETE FROM unit_results WHERE job_id = ?")
            .bind(job_id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        for (position, result) in results.iter().enumerate() {
            let artifact_refs = serde_json::to_string(&result.artifacts)?;
            sqlx::query(
                r#"
                INSERT INTO unit_results (
                    job_id, position, description, refined_instruction,
                    artifact_refs, error_message, recorded_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(job_id)
            .bind(position as i64)
            .bind(result.input.as_str())
            .bind(&result.refined_instruction)
            .bind(&artifact_refs)
            .bind(&result.error_message)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        debug!(job_id = %job_id, results = results.len(), "Persisted unit results");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations};
    use mediaforge_core::port::clock::mocks::TestClock;

    async fn store() -> SqliteRecordStore {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteRecordStore::new(pool, Arc::new(TestClock::new(42_000)))
    }

    #[tokio::test]
    async fn test_fetch_units_preserves_order() {
        let s = store().await;
        let job_id = "job-1".to_string();
        s.insert_units(&job_id, &["first".into(), "second".into(), "third".into()])
            .await
            .unwrap();

        let units = s.fetch_units(&job_id).await.unwrap();

        let descriptions: Vec<&str> = units.iter().map(|u| u.as_str()).collect();
        assert_eq!(descriptions, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_fetch_units_unknown_job_is_empty() {
        let s = store().await;
        let units = s.fetch_units(&"missing".to_string()).await.unwrap();
        assert!(units.is_empty());
    }

    #[tokio::test]
    async fn test_persist_and_fetch_results_round_trip() {
        let s = store().await;
        let job_id = "job-1".to_string();
        let results = vec![
            UnitResult::generated(
                UnitInput::new("a beach"),
                "refined beach".to_string(),
                vec!["https://cdn.invalid/renders/r1/0.mp4".to_string()],
            ),
            UnitResult::failed(UnitInput::new("a cliff"), "quota exhausted"),
        ];

        s.persist_results(&job_id, &results).await.unwrap();
        let loaded = s.fetch_results(&job_id).await.unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].artifacts.len(), 1);
        assert!(loaded[0].error_message.is_none());
        assert!(loaded[1].artifacts.is_empty());
        assert_eq!(loaded[1].error_message.as_deref(), Some("quota exhausted"));
    }

    #[tokio::test]
    async fn test_persist_replaces_previous_attempt() {
        let s = store().await;
        let job_id = "job-1".to_string();

        s.persist_results(
            &job_id,
            &[UnitResult::failed(UnitInput::new("a"), "network error")],
        )
        .await
        .unwrap();
        s.persist_results(
            &job_id,
            &[UnitResult::generated(
                UnitInput::new("a"),
                "refined a".to_string(),
                vec![],
            )],
        )
        .await
        .unwrap();

        let loaded = s.fetch_results(&job_id).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded[0].error_message.is_none());
    }
}
