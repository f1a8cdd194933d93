//! The embedding / model-deployment collaborator: maps free text into the
//! representations the retrieval modes need, and tracks whether the
//! learned-sparse model is ready for inference.

pub mod deploy;

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::SearchError;

pub use deploy::{DeployOutcome, DeployState, DeploymentTracker};

/// Term→weight mapping produced by the learned-sparse encoder.
pub type SparseVector = BTreeMap<String, f32>;

/// The embedding service. Deployment of the underlying model is an
/// external, asynchronous process: `deploy` only triggers it, and
/// `is_deployed` polls the eventually-consistent readiness state.
#[async_trait]
pub trait SparseModel: Send + Sync {
    /// Whether the learned-sparse model is deployed and ready to serve
    /// inference.
    async fn is_deployed(&self) -> Result<bool, SearchError>;

    /// Trigger deployment. Idempotent: safe to call when already deployed
    /// or mid-deployment.
    async fn deploy(&self) -> Result<(), SearchError>;

    /// Expand text into a sparse term-weight vector. Fails with
    /// `ModelUnavailable` when the model is not ready.
    async fn embed_sparse(&self, text: &str) -> Result<SparseVector, SearchError>;

    /// Encode text into a fixed-length dense vector. Not used by the hybrid
    /// retrieval path today; kept for dense-vector retrieval.
    async fn embed_dense(&self, text: &str) -> Result<Vec<f32>, SearchError>;
}
