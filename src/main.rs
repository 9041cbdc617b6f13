//! Bootstrap binary: connects to the configured database and creates the
//! schema from the entity definitions.

use dotenvy::dotenv;
use lendhub::config;
use lendhub::errors::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Env vars can also be set externally, so a missing .env is fine
    dotenv().ok();

    let url = config::get_database_url();
    let db = config::create_connection().await?;
    config::create_tables(&db).await?;
    info!("database schema ready at {url}");

    Ok(())
}
