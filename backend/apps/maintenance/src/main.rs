//! Account Maintenance Entry Point
//!
//! Applies schema migrations and removes expired registration confirmations.
//! Uses `anyhow` for startup errors.

use account::PgAccountRepository;
use anyhow::Context;
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use std::env;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "maintenance=info,account=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    let store = PgAccountRepository::new(pool);
    store
        .migrate()
        .await
        .context("failed to apply account migrations")?;

    // A failed sweep is reported but does not fail the run
    match store.cleanup_expired_confirmations(Utc::now()).await {
        Ok(deleted) => {
            tracing::info!(confirmations_deleted = deleted, "Confirmation cleanup completed");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Confirmation cleanup failed");
        }
    }

    Ok(())
}
