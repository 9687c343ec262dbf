// Optional collectors that talk to the Docker engine and a Kubernetes API server

use super::Collector;
use crate::docker_repo::DockerRepo;
use crate::error::CollectError;
use crate::kube_repo::KubeRepo;
use crate::models::{MetricDomain, MetricPayload};
use std::path::PathBuf;
use std::time::Duration;

pub struct DockerCollector {
    repo: DockerRepo,
    timeout: Duration,
}

impl DockerCollector {
    pub fn new(timeout: Duration) -> Self {
        Self {
            repo: DockerRepo::new(),
            timeout,
        }
    }
}

#[async_trait::async_trait]
impl Collector for DockerCollector {
    fn domain(&self) -> MetricDomain {
        MetricDomain::Docker
    }

    async fn collect(&self) -> Result<MetricPayload, CollectError> {
        let stats = self.repo.get_docker_stats(self.timeout).await?;
        Ok(MetricPayload::Docker(Box::new(stats)))
    }
}

pub struct KubernetesCollector {
    repo: KubeRepo,
    timeout: Duration,
}

impl KubernetesCollector {
    pub fn new(kubeconfig_path: Option<PathBuf>, timeout: Duration) -> Self {
        Self {
            repo: KubeRepo::new(kubeconfig_path),
            timeout,
        }
    }
}

#[async_trait::async_trait]
impl Collector for KubernetesCollector {
    fn domain(&self) -> MetricDomain {
        MetricDomain::Kubernetes
    }

    async fn collect(&self) -> Result<MetricPayload, CollectError> {
        let stats = self.repo.get_kubernetes_stats(self.timeout).await?;
        Ok(MetricPayload::Kubernetes(Box::new(stats)))
    }
}
