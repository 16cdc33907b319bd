//! Axum route handlers for the Evaluation API.

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use crate::errors::AppError;
use crate::models::evaluation::EvaluationRow;
use crate::state::AppState;

fn validate_application_id(application_id: i32) -> Result<(), AppError> {
    if application_id <= 0 {
        return Err(AppError::Validation(format!(
            "application_id must be positive, got {application_id}"
        )));
    }
    Ok(())
}

/// POST /api/v1/evaluations/:application_id
///
/// Evaluates the application's résumé against its vacancy and returns the
/// persisted evaluation. Model failures still yield a `Pending` evaluation.
///
/// The run is spawned so that a dropped client connection cannot abort it
/// between the model call and the persistence write.
pub async fn handle_create_evaluation(
    State(state): State<AppState>,
    Path(application_id): Path<i32>,
) -> Result<Json<EvaluationRow>, AppError> {
    validate_application_id(application_id)?;
    info!("Evaluation requested for application {application_id}");

    let pipeline = state.pipeline.clone();
    let source = state.applications.clone();
    let evaluation = tokio::spawn(async move {
        pipeline
            .evaluate_application(source.as_ref(), application_id)
            .await
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Evaluation task failed: {e}")))??;

    Ok(Json(evaluation))
}

/// GET /api/v1/applications/:application_id/evaluations
///
/// Full evaluation history for an application, newest first.
pub async fn handle_list_evaluations(
    State(state): State<AppState>,
    Path(application_id): Path<i32>,
) -> Result<Json<Vec<EvaluationRow>>, AppError> {
    validate_application_id(application_id)?;

    let evaluations = state.evaluations.list_for_application(application_id).await?;
    if evaluations.is_empty() {
        return Err(AppError::NotFound(format!(
            "No evaluations found for application {application_id}"
        )));
    }

    Ok(Json(evaluations))
}

/// GET /api/v1/applications/:application_id/evaluations/latest
pub async fn handle_latest_evaluation(
    State(state): State<AppState>,
    Path(application_id): Path<i32>,
) -> Result<Json<EvaluationRow>, AppError> {
    validate_application_id(application_id)?;

    state
        .evaluations
        .list_for_application(application_id)
        .await?
        .into_iter()
        .next()
        .map(Json)
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "No evaluations found for application {application_id}"
            ))
        })
}
