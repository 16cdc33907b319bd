use std::sync::Arc;

use crate::applications::ApplicationSource;
use crate::evaluation::pipeline::EvaluationPipeline;
use crate::evaluation::store::EvaluationStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Prompt → model → extraction → persistence, with its model client and store.
    pub pipeline: EvaluationPipeline,
    /// Read-only loader for vacancy + résumé snapshots.
    pub applications: Arc<dyn ApplicationSource>,
    /// Same store the pipeline writes to; used for history reads.
    pub evaluations: Arc<dyn EvaluationStore>,
}
