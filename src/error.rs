// Error types for collection rounds and report encoding

use std::time::Duration;

use crate::models::MetricDomain;

/// Failure of a single domain's collection. Always recoverable: the aggregator
/// records it in the round's outcome map and keeps the previous value.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    /// The OS or a library could not provide the data (permission denied, missing
    /// mount point, lock poisoned, ...).
    #[error("{0}")]
    Unavailable(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("docker: {0}")]
    Docker(#[from] bollard::errors::Error),

    #[error("kubernetes: {0}")]
    Kubernetes(#[from] kube::Error),

    /// Invalid connection settings for an optional domain (kubeconfig, docker
    /// socket). Retried on every round.
    #[error("configuration: {0}")]
    Configuration(String),

    #[error("no collector registered for domain `{0}`")]
    NotRegistered(MetricDomain),

    /// The collector task panicked or was cancelled.
    #[error("collector task failed: {0}")]
    Task(String),
}

impl CollectError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        CollectError::Unavailable(msg.into())
    }
}

impl From<tokio::task::JoinError> for CollectError {
    fn from(e: tokio::task::JoinError) -> Self {
        CollectError::Task(e.to_string())
    }
}

/// Failure to encode a snapshot into a downloadable report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("csv buffer: {0}")]
    Io(#[from] std::io::Error),

    #[error("pdf rendering failed: {0}")]
    Pdf(String),
}
