use thiserror::Error;

/// Errors surfaced by the search pipeline and its collaborators.
///
/// Parsing never fails: malformed filter syntax in the query string is
/// treated as plain text, so there is no parse variant here. Partial bulk
/// indexing failures are likewise not an error: they are reported per
/// document in [`crate::index::BulkReceipt`] while the call succeeds.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The learned-sparse model is not deployed or not ready. Recoverable:
    /// callers degrade to lexical-only retrieval.
    #[error("sparse model unavailable: {0}")]
    ModelUnavailable(String),

    /// The document index is unreachable or returned an error. Fatal to the
    /// request; surfaced to the caller as a service error.
    #[error("document index unavailable: {0}")]
    BackendUnavailable(String),
}

impl SearchError {
    pub(crate) fn backend(err: impl std::fmt::Display) -> Self {
        Self::BackendUnavailable(err.to_string())
    }
}
