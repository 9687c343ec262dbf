// Kubernetes cluster inventory via kube-rs

mod mapping;

use crate::error::CollectError;
use crate::models::KubernetesStats;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{
    Namespace, Node, PersistentVolume, PersistentVolumeClaim, Pod, Service,
};
use kube::api::{Api, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::instrument;

/// Cluster-wide client built from an explicit kubeconfig, or inferred from the
/// environment (KUBECONFIG, ~/.kube/config, in-cluster service account).
pub struct KubeRepo {
    kubeconfig_path: Option<PathBuf>,
    client: Mutex<Option<Client>>,
}

impl KubeRepo {
    pub fn new(kubeconfig_path: Option<PathBuf>) -> Self {
        Self {
            kubeconfig_path,
            client: Mutex::new(None),
        }
    }

    async fn client(&self) -> Result<Client, CollectError> {
        let mut guard = self.client.lock().await;
        if let Some(client) = guard.as_ref() {
            return Ok(client.clone());
        }
        let config = match &self.kubeconfig_path {
            Some(path) => {
                let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                    CollectError::Configuration(format!("kubeconfig {}: {e}", path.display()))
                })?;
                Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                    .await
                    .map_err(|e| {
                        CollectError::Configuration(format!("kubeconfig {}: {e}", path.display()))
                    })?
            }
            None => Config::infer()
                .await
                .map_err(|e| CollectError::Configuration(format!("kubernetes config: {e}")))?,
        };
        let client = Client::try_from(config)?;
        *guard = Some(client.clone());
        Ok(client)
    }

    /// Lists deployments, namespaces, volumes, claims, nodes, pods and services
    /// across all namespaces, bounded by `timeout`.
    #[instrument(skip(self), fields(repo = "kube", operation = "get_kubernetes_stats"))]
    pub async fn get_kubernetes_stats(
        &self,
        timeout: Duration,
    ) -> Result<KubernetesStats, CollectError> {
        let client = self.client().await?;
        match tokio::time::timeout(timeout, fetch_kubernetes_stats(client)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(?timeout, operation = "get_kubernetes_stats", "kubernetes call timed out");
                Err(CollectError::Timeout(timeout))
            }
        }
    }
}

async fn fetch_kubernetes_stats(client: Client) -> Result<KubernetesStats, CollectError> {
    let lp = ListParams::default();
    let deployments_api = Api::<Deployment>::all(client.clone());
    let namespaces_api = Api::<Namespace>::all(client.clone());
    let pvs_api = Api::<PersistentVolume>::all(client.clone());
    let pvcs_api = Api::<PersistentVolumeClaim>::all(client.clone());
    let nodes_api = Api::<Node>::all(client.clone());
    let pods_api = Api::<Pod>::all(client.clone());
    let services_api = Api::<Service>::all(client);
    let (deployments, namespaces, pvs, pvcs, nodes, pods, services) = tokio::try_join!(
        deployments_api.list(&lp),
        namespaces_api.list(&lp),
        pvs_api.list(&lp),
        pvcs_api.list(&lp),
        nodes_api.list(&lp),
        pods_api.list(&lp),
        services_api.list(&lp),
    )?;

    Ok(KubernetesStats {
        deployments: deployments.items.iter().map(mapping::deployment).collect(),
        namespaces: namespaces.items.iter().map(mapping::namespace_info).collect(),
        persistent_volumes: pvs.items.iter().map(mapping::persistent_volume).collect(),
        persistent_volume_claims: pvcs
            .items
            .iter()
            .map(mapping::persistent_volume_claim)
            .collect(),
        nodes: nodes.items.iter().map(mapping::node).collect(),
        pods: pods.items.iter().map(mapping::pod).collect(),
        services: services.items.iter().map(mapping::service).collect(),
    })
}
