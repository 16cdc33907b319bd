mod applications;
mod config;
mod db;
mod errors;
mod evaluation;
mod llm_client;
mod models;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::applications::PgApplicationSource;
use crate::config::Config;
use crate::db::{create_pool, ensure_evaluations_table};
use crate::evaluation::normalizer::ReasonClassifier;
use crate::evaluation::pipeline::EvaluationPipeline;
use crate::evaluation::store::{EvaluationStore, PgEvaluationStore};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Gesthum evaluation API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    ensure_evaluations_table(&db).await?;

    // Initialize model client (credential injected, never exported to the process env)
    let model = llm_client::from_config(&config);
    info!(
        "Model client initialized (backend: {}, model: {})",
        model.backend(),
        config.evaluation_model
    );

    let classifier = config
        .negative_keywords
        .clone()
        .map(ReasonClassifier::new)
        .unwrap_or_default();

    let evaluations: Arc<dyn EvaluationStore> = Arc::new(PgEvaluationStore::new(db.clone()));
    let pipeline = EvaluationPipeline::new(
        model,
        evaluations.clone(),
        config.evaluation_model.clone(),
        classifier,
    );

    // Build app state
    let state = AppState {
        pipeline,
        applications: Arc::new(PgApplicationSource::new(db)),
        evaluations,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the SPA host once it is configurable

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
