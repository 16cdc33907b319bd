use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

const MAX_CONNECTIONS: u32 = 10;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect(database_url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the `evaluations` table if it does not exist yet.
/// No uniqueness on `application_id`: every run appends a row.
pub async fn ensure_evaluations_table(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS evaluations (
            id              SERIAL PRIMARY KEY,
            application_id  INT NOT NULL,
            score           INT NOT NULL DEFAULT 0,
            result          TEXT NOT NULL,
            comments        TEXT NOT NULL,
            strengths       TEXT NOT NULL DEFAULT '',
            weaknesses      TEXT NOT NULL DEFAULT '',
            reasons         TEXT,
            evaluation_date TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create evaluations table")?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS evaluations_application_id_idx \
         ON evaluations (application_id, evaluation_date DESC)",
    )
    .execute(pool)
    .await
    .context("Failed to create evaluations index")?;

    info!("Evaluations table ready");
    Ok(())
}
