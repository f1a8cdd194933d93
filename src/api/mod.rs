//! Axum HTTP handlers: thin adapters over the search core.

pub mod deploy;
pub mod documents;
pub mod search;

use axum::http::StatusCode;

use crate::error::SearchError;

/// Map a pipeline error onto an HTTP response. Backend unavailability is a
/// gateway failure; a missing model surfaces as service-unavailable.
pub(crate) fn error_response(err: SearchError) -> (StatusCode, String) {
    let status = match err {
        SearchError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        SearchError::BackendUnavailable(_) => StatusCode::BAD_GATEWAY,
    };
    (status, err.to_string())
}
