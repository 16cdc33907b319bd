use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A persisted evaluation. Immutable once written; re-evaluating an
/// application appends a new row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct EvaluationRow {
    pub id: i32,
    pub application_id: i32,
    pub score: i32,
    /// "Passed" | "Failed" | "Pending", kept as text to tolerate model drift.
    pub result: String,
    pub comments: String,
    pub strengths: String,
    pub weaknesses: String,
    pub reasons: String,
    pub evaluation_date: DateTime<Utc>,
}

/// Resolved evaluation fields, ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvaluation {
    pub application_id: i32,
    pub score: i32,
    pub result: String,
    pub comments: String,
    pub strengths: String,
    pub weaknesses: String,
    pub reasons: String,
}
