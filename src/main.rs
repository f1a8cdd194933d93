use axum::routing::{get, post};
use axum::Router;
use tracing_subscriber::EnvFilter;

use doc_search::api;
use doc_search::config::Config;
use doc_search::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    tracing::info!(
        "Document index: {} ({})",
        config.index.base_url,
        config.index.index_name
    );
    tracing::info!("Sparse model: {}", config.model.sparse_model_id);

    let state = AppState::new(config)?;

    // Adopt a model some other process already deployed.
    state.deployment.refresh(state.model.as_ref()).await;

    let app = Router::new()
        .route("/search", get(api::search::search))
        .route("/deploy_model", get(api::deploy::deploy_model))
        .route("/documents", post(api::documents::bulk_upsert))
        .route("/documents/{id}", get(api::documents::get_document))
        .route("/reindex", post(api::documents::reindex))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind(&state.config.bind_addr).await?;
    tracing::info!("Server listening on {}", state.config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
