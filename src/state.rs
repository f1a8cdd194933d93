use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::index::{DocumentIndex, ElasticBackend};
use crate::model::{DeploymentTracker, SparseModel};

/// Shared application state. The index and model handles are constructed
/// once at startup and passed by reference everywhere; nothing here is an
/// ambient global.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub index: Arc<dyn DocumentIndex>,
    pub model: Arc<dyn SparseModel>,
    pub deployment: Arc<DeploymentTracker>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.index.request_timeout_secs))
            .build()?;

        let backend = Arc::new(ElasticBackend::new(
            http_client,
            &config.index,
            &config.model,
        ));
        let deployment = Arc::new(DeploymentTracker::new(&config.model));

        Ok(Self {
            config,
            index: backend.clone(),
            model: backend,
            deployment,
        })
    }

    /// Build state over explicit collaborators; used by tests and alternate
    /// backends.
    pub fn with_collaborators(
        config: Config,
        index: Arc<dyn DocumentIndex>,
        model: Arc<dyn SparseModel>,
    ) -> Self {
        let deployment = Arc::new(DeploymentTracker::new(&config.model));
        Self {
            config,
            index,
            model,
            deployment,
        }
    }
}
