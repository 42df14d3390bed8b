use std::sync::Arc;

use tracing::info;

use crate::config::AppConfig;
use crate::database::connection::DbConnection;
use crate::server::state::AppState;

pub mod constants;
pub mod handlers;
pub mod router;
pub mod state;

pub async fn run_all(config: &AppConfig) -> anyhow::Result<()> {
    let app_state = Arc::new(AppState::try_init(config).await?);
    router::serve(app_state).await?;
    Ok(())
}

/// Applies the schema migration once and exits, without starting the server.
pub async fn run_migration(config: &AppConfig) -> anyhow::Result<()> {
    let db_connection = DbConnection::connect(&config.database).await?;
    db_connection.migrate().await?;
    info!("migration completed");
    Ok(())
}
