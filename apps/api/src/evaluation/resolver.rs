//! Verdict Resolver & Persister.
//!
//! Reconciles the model's verdict with the score-threshold policy and writes
//! exactly one evaluation row per call. A failed model call is persisted as a
//! `Pending` row instead of being retried.

use std::fmt;

use tracing::{info, warn};

use crate::errors::AppError;
use crate::evaluation::normalizer::ModelVerdict;
use crate::evaluation::store::EvaluationStore;
use crate::llm_client::ModelInvocationError;
use crate::models::evaluation::{EvaluationRow, NewEvaluation};

/// Scores at or above this pass when the model gave no explicit result.
pub const PASS_THRESHOLD: i32 = 70;
pub const MIN_SCORE: i32 = 0;
pub const MAX_SCORE: i32 = 100;

pub const NO_COMMENTS_SENTINEL: &str = "No comments provided by model.";
pub const LIST_SEPARATOR: &str = " | ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationOutcome {
    Passed,
    Failed,
    Pending,
}

impl EvaluationOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "Passed",
            Self::Failed => "Failed",
            Self::Pending => "Pending",
        }
    }
}

impl fmt::Display for EvaluationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn clamp_score(score: i64) -> i32 {
    score.clamp(MIN_SCORE as i64, MAX_SCORE as i64) as i32
}

/// Score policy: `>= 70` passes, `1..=69` fails, `0` is inconclusive.
pub fn derive_outcome(clamped_score: i32) -> EvaluationOutcome {
    if clamped_score >= PASS_THRESHOLD {
        EvaluationOutcome::Passed
    } else if clamped_score > 0 {
        EvaluationOutcome::Failed
    } else {
        EvaluationOutcome::Pending
    }
}

/// Pure resolution of a verdict into storable fields.
pub fn resolve(application_id: i32, verdict: &ModelVerdict) -> NewEvaluation {
    let score = clamp_score(verdict.score.unwrap_or(0));

    // An explicit model classification is trusted verbatim.
    let result = match verdict.result.as_deref() {
        Some(result) if !result.trim().is_empty() => result.to_string(),
        _ => derive_outcome(score).to_string(),
    };

    let comments = verdict
        .comments
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or(NO_COMMENTS_SENTINEL)
        .to_string();

    NewEvaluation {
        application_id,
        score,
        result,
        comments,
        strengths: verdict.strengths.join(LIST_SEPARATOR),
        weaknesses: verdict.weaknesses.join(LIST_SEPARATOR),
        reasons: verdict.reasons.join(LIST_SEPARATOR),
    }
}

/// Sentinel row for a model call that failed.
pub fn invocation_failure(application_id: i32, error: &ModelInvocationError) -> NewEvaluation {
    NewEvaluation {
        application_id,
        score: 0,
        result: EvaluationOutcome::Pending.to_string(),
        comments: format!("Error calling model: {error}"),
        strengths: String::new(),
        weaknesses: String::new(),
        reasons: String::new(),
    }
}

/// Resolves the outcome of one pipeline run and persists exactly one row.
/// Storage failures propagate; model failures never do.
pub async fn resolve_and_persist(
    store: &dyn EvaluationStore,
    application_id: i32,
    outcome: Result<ModelVerdict, ModelInvocationError>,
) -> Result<EvaluationRow, AppError> {
    let evaluation = match outcome {
        Ok(verdict) => resolve(application_id, &verdict),
        Err(error) => {
            warn!("Model call failed for application {application_id}: {error}; persisting Pending evaluation");
            invocation_failure(application_id, &error)
        }
    };

    let row = store.insert(evaluation).await?;
    info!(
        "Persisted evaluation {} for application {}: result={}, score={}",
        row.id, row.application_id, row.result, row.score
    );
    Ok(row)
}
