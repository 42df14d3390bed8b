use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tracing::info;

use crate::server::constants::{MAX_UPLOAD_BYTES, UPLOAD_BODY_OVERHEAD};
use crate::server::handlers::{download, migrate, resources, upload};
use crate::server::state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/api/resources",
            get(resources::list_resources).post(resources::create_resource),
        )
        .route(
            "/api/resources/:id",
            get(resources::get_resource)
                .put(resources::update_resource)
                .delete(resources::delete_resource),
        )
        .route(
            "/api/upload",
            post(upload::upload_file)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + UPLOAD_BODY_OVERHEAD)),
        )
        .route("/api/download", get(download::download_file))
        .route("/api/migrate", get(migrate::run_migration))
        .with_state(state)
}

pub async fn serve(state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = state.config.server.address.clone();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("starting server on: {}", listener.local_addr()?);
    axum::serve(listener, app(state)).await?;
    Ok(())
}
