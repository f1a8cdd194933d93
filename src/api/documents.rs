use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::error_response;
use crate::corpus;
use crate::index::BulkReceipt;
use crate::models::{Document, DocumentUpsert};
use crate::state::AppState;

/// POST /documents - bulk upsert. Individual failures are collected in the
/// receipt; the successful subset is still indexed.
pub async fn bulk_upsert(
    State(state): State<AppState>,
    Json(documents): Json<Vec<DocumentUpsert>>,
) -> Result<Json<BulkReceipt>, (StatusCode, String)> {
    if documents.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "At least one document is required".to_string(),
        ));
    }

    let receipt = state
        .index
        .bulk_upsert(&documents)
        .await
        .map_err(error_response)?;

    Ok(Json(receipt))
}

/// GET /documents/{id} - point lookup.
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Document>, (StatusCode, String)> {
    match state.index.get_by_id(&id).await.map_err(error_response)? {
        Some(doc) => Ok(Json(doc)),
        None => Err((StatusCode::NOT_FOUND, format!("No document with id {id}"))),
    }
}

/// POST /reindex - load the configured corpus source and upsert it.
pub async fn reindex(
    State(state): State<AppState>,
) -> Result<Json<BulkReceipt>, (StatusCode, String)> {
    let path = state.config.corpus_path.clone();
    let documents = tokio::task::spawn_blocking(move || corpus::load_corpus(&path))
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Corpus load task failed: {e}"),
            )
        })?
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("Failed to load corpus: {e}")))?;

    if documents.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Corpus source contains no documents".to_string(),
        ));
    }

    tracing::info!("reindexing {} documents", documents.len());
    let receipt = state
        .index
        .bulk_upsert(&documents)
        .await
        .map_err(error_response)?;

    Ok(Json(receipt))
}
