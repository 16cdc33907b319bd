//! Evaluation storage. Append-only: there is no update or delete path.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::evaluation::{EvaluationRow, NewEvaluation};

#[async_trait]
pub trait EvaluationStore: Send + Sync {
    /// Appends one row, stamped with the current UTC time.
    async fn insert(&self, evaluation: NewEvaluation) -> Result<EvaluationRow, AppError>;

    /// All evaluations for an application, newest first.
    async fn list_for_application(&self, application_id: i32)
        -> Result<Vec<EvaluationRow>, AppError>;
}

const RETURNING_COLUMNS: &str = "id, application_id, score, result, comments, strengths, \
    weaknesses, COALESCE(reasons, '') AS reasons, evaluation_date";

#[derive(Clone)]
pub struct PgEvaluationStore {
    pool: PgPool,
}

impl PgEvaluationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EvaluationStore for PgEvaluationStore {
    async fn insert(&self, evaluation: NewEvaluation) -> Result<EvaluationRow, AppError> {
        let sql = format!(
            r#"
            INSERT INTO evaluations
                (application_id, score, result, comments, strengths, weaknesses, reasons, evaluation_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {RETURNING_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, EvaluationRow>(&sql)
            .bind(evaluation.application_id)
            .bind(evaluation.score)
            .bind(&evaluation.result)
            .bind(&evaluation.comments)
            .bind(&evaluation.strengths)
            .bind(&evaluation.weaknesses)
            .bind(&evaluation.reasons)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;

        Ok(row)
    }

    async fn list_for_application(
        &self,
        application_id: i32,
    ) -> Result<Vec<EvaluationRow>, AppError> {
        let sql = format!(
            "SELECT {RETURNING_COLUMNS} FROM evaluations \
             WHERE application_id = $1 ORDER BY evaluation_date DESC, id DESC"
        );

        let rows = sqlx::query_as::<_, EvaluationRow>(&sql)
            .bind(application_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }
}

#[cfg(test)]
pub use memory::MemoryEvaluationStore;
