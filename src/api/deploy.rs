use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::api::error_response;
use crate::model::DeployOutcome;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DeployResponse {
    pub message: String,
}

/// GET /deploy_model - idempotent deployment trigger for the sparse model.
/// Succeeds with a differing message whether deployment ran or was already
/// done.
pub async fn deploy_model(
    State(state): State<AppState>,
) -> Result<Json<DeployResponse>, (StatusCode, String)> {
    match state.deployment.ensure_deployed(state.model.as_ref()).await {
        Ok(DeployOutcome::Deployed) => Ok(Json(DeployResponse {
            message: "sparse model deployed.".to_string(),
        })),
        Ok(DeployOutcome::AlreadyDeployed) => Ok(Json(DeployResponse {
            message: "sparse model already deployed.".to_string(),
        })),
        Err(e) => Err(error_response(e)),
    }
}
