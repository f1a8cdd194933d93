use std::time::Duration;

use parking_lot::RwLock;

use crate::config::ModelConfig;
use crate::error::SearchError;
use crate::model::SparseModel;

/// Deployment lifecycle of the learned-sparse model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployState {
    NotRequested,
    Requested,
    Polling,
    Ready,
    Failed(String),
}

/// What one `ensure_deployed` call actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployOutcome {
    Deployed,
    AlreadyDeployed,
}

/// Tracks the eventually-consistent deployment state of the sparse model.
///
/// Search requests consult [`is_ready`](Self::is_ready) cheaply and degrade
/// to lexical-only retrieval when the model is not ready; they never wait on
/// deployment. The deployment endpoint drives
/// [`ensure_deployed`](Self::ensure_deployed), which polls with backoff
/// under a bounded attempt count and a hard timeout.
pub struct DeploymentTracker {
    state: RwLock<DeployState>,
    max_polls: u32,
    poll_interval: Duration,
    hard_timeout: Duration,
}

impl DeploymentTracker {
    pub fn new(config: &ModelConfig) -> Self {
        Self {
            state: RwLock::new(DeployState::NotRequested),
            max_polls: config.max_polls,
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            hard_timeout: Duration::from_secs(config.deploy_timeout_secs),
        }
    }

    pub fn state(&self) -> DeployState {
        self.state.read().clone()
    }

    pub fn is_ready(&self) -> bool {
        *self.state.read() == DeployState::Ready
    }

    fn set(&self, next: DeployState) {
        *self.state.write() = next;
    }

    /// One startup poll: adopt an already-deployed model without triggering
    /// anything. Backend errors leave the state untouched.
    pub async fn refresh(&self, model: &dyn SparseModel) {
        match model.is_deployed().await {
            Ok(true) => self.set(DeployState::Ready),
            Ok(false) => {}
            Err(e) => tracing::warn!("deployment status check failed: {e}"),
        }
    }

    /// Idempotently bring the model to the Ready state.
    ///
    /// Returns [`DeployOutcome::AlreadyDeployed`] without side effects when
    /// the model is already ready. Otherwise triggers deployment and polls
    /// readiness with doubling backoff, giving up after the configured
    /// attempt limit or the hard timeout, so it never blocks forever. A
    /// failed attempt leaves the tracker in `Failed` and may be retried.
    pub async fn ensure_deployed(
        &self,
        model: &dyn SparseModel,
    ) -> Result<DeployOutcome, SearchError> {
        if self.is_ready() {
            return Ok(DeployOutcome::AlreadyDeployed);
        }

        if model.is_deployed().await? {
            self.set(DeployState::Ready);
            return Ok(DeployOutcome::AlreadyDeployed);
        }

        self.set(DeployState::Requested);
        if let Err(e) = model.deploy().await {
            self.set(DeployState::Failed(e.to_string()));
            return Err(e);
        }

        self.set(DeployState::Polling);
        match tokio::time::timeout(self.hard_timeout, self.poll_until_ready(model)).await {
            Ok(Ok(outcome)) => Ok(outcome),
            Ok(Err(e)) => {
                self.set(DeployState::Failed(e.to_string()));
                Err(e)
            }
            Err(_) => {
                let reason = format!(
                    "deployment did not become ready within {}s",
                    self.hard_timeout.as_secs()
                );
                self.set(DeployState::Failed(reason.clone()));
                Err(SearchError::ModelUnavailable(reason))
            }
        }
    }

    async fn poll_until_ready(&self, model: &dyn SparseModel) -> Result<DeployOutcome, SearchError> {
        let mut interval = self.poll_interval;

        for _ in 0..self.max_polls {
            if model.is_deployed().await? {
                self.set(DeployState::Ready);
                return Ok(DeployOutcome::Deployed);
            }
            tokio::time::sleep(interval).await;
            interval = (interval * 2).min(Duration::from_secs(30));
        }

        Err(SearchError::ModelUnavailable(format!(
            "deployment not ready after {} polls",
            self.max_polls
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SparseVector;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Becomes deployed after a fixed number of readiness checks.
    struct CountdownModel {
        checks_until_ready: AtomicU32,
        deploy_calls: AtomicU32,
    }

    impl CountdownModel {
        fn new(checks_until_ready: u32) -> Self {
            Self {
                checks_until_ready: AtomicU32::new(checks_until_ready),
                deploy_calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl SparseModel for CountdownModel {
        async fn is_deployed(&self) -> Result<bool, SearchError> {
            let remaining = self.checks_until_ready.load(Ordering::SeqCst);
            if remaining == 0 {
                return Ok(true);
            }
            self.checks_until_ready.store(remaining - 1, Ordering::SeqCst);
            Ok(false)
        }

        async fn deploy(&self) -> Result<(), SearchError> {
            self.deploy_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn embed_sparse(&self, _text: &str) -> Result<SparseVector, SearchError> {
            Ok(SparseVector::new())
        }

        async fn embed_dense(&self, _text: &str) -> Result<Vec<f32>, SearchError> {
            Ok(vec![])
        }
    }

    fn tracker(max_polls: u32) -> DeploymentTracker {
        DeploymentTracker::new(&ModelConfig {
            max_polls,
            poll_interval_secs: 1,
            deploy_timeout_secs: 3600,
            ..ModelConfig::default()
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_deployed_short_circuits() {
        let t = tracker(5);
        let model = CountdownModel::new(0);
        let outcome = t.ensure_deployed(&model).await.unwrap();
        assert_eq!(outcome, DeployOutcome::AlreadyDeployed);
        assert_eq!(model.deploy_calls.load(Ordering::SeqCst), 0);
        assert!(t.is_ready());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deploys_then_polls_to_ready() {
        let t = tracker(10);
        let model = CountdownModel::new(3);
        let outcome = t.ensure_deployed(&model).await.unwrap();
        assert_eq!(outcome, DeployOutcome::Deployed);
        assert_eq!(model.deploy_calls.load(Ordering::SeqCst), 1);
        assert_eq!(t.state(), DeployState::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_budget_exhaustion_fails_without_hanging() {
        let t = tracker(2);
        let model = CountdownModel::new(u32::MAX);
        let err = t.ensure_deployed(&model).await.unwrap_err();
        assert!(matches!(err, SearchError::ModelUnavailable(_)));
        assert!(matches!(t.state(), DeployState::Failed(_)));
        assert!(!t.is_ready());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_call_after_ready_is_idempotent() {
        let t = tracker(10);
        let model = CountdownModel::new(1);
        t.ensure_deployed(&model).await.unwrap();
        let outcome = t.ensure_deployed(&model).await.unwrap();
        assert_eq!(outcome, DeployOutcome::AlreadyDeployed);
        assert_eq!(model.deploy_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_adopts_externally_deployed_model() {
        let t = tracker(5);
        let model = CountdownModel::new(0);
        assert!(!t.is_ready());
        t.refresh(&model).await;
        assert!(t.is_ready());
    }
}
