use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::Query;

use crate::api::error_response;
use crate::models::{SearchParams, SearchResponse};
use crate::query;
use crate::search::{assemble, highlight};
use crate::state::AppState;

/// GET /search - the hybrid retrieval pipeline:
///   1. Extract structured filters from the query string
///   2. Plan the lexical + semantic sub-queries (semantic only while the
///      sparse model is ready; otherwise lexical-only)
///   3. Execute both against the document index in one round
///   4. RRF-fuse the rankings, page the fused list, post-process facets
///   5. Highlight matches per mode and render summaries for display
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let parsed = query::parse(&params.query, &params.file_type);

    let semantic_ready = state.deployment.is_ready();
    if !semantic_ready && !parsed.residual.is_empty() {
        tracing::debug!("sparse model not ready; serving lexical-only results");
    }

    let plan = query::plan(&parsed.residual, parsed.filters, params.mode, semantic_ready);

    let limit = state.config.page_size;
    let results = state
        .index
        .execute(&plan, params.from_, limit)
        .await
        .map_err(error_response)?;

    let mut set = assemble(results, params.from_, limit);

    for hit in &mut set.hits {
        highlight::annotate(hit, params.mode, &parsed.residual);
        highlight::render_summary(hit);
    }

    Ok(Json(SearchResponse {
        results: set.hits,
        query: parsed.echoed_query,
        from_: set.offset,
        total: set.total_matches,
        aggs: set.facets,
    }))
}
