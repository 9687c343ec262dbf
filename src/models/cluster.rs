// Kubernetes cluster object models

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentInfo {
    pub name: String,
    pub namespace: String,
    pub available_replicas: i32,
    pub ready_replicas: i32,
    pub updated_replicas: i32,
    pub total_replicas: i32,
    pub created: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceInfo {
    pub name: String,
    pub created: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeAddressInfo {
    pub kind: String,
    pub address: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    pub name: String,
    pub created: Option<String>,
    pub unschedulable: bool,
    pub addresses: Vec<NodeAddressInfo>,
    pub pod_cidrs: Vec<String>,
    pub volumes_in_use: Vec<String>,
    pub volumes_attached: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodContainerInfo {
    pub name: String,
    pub image: String,
    pub ports: Vec<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodInfo {
    pub name: String,
    pub namespace: String,
    pub created: Option<String>,
    pub phase: String,
    pub host_ip: String,
    pub pod_ip: String,
    pub node_name: String,
    pub scheduler_name: String,
    pub containers: Vec<PodContainerInfo>,
    pub volumes: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePortInfo {
    pub name: String,
    pub protocol: String,
    pub port: i32,
    pub node_port: Option<i32>,
    pub target_port: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfo {
    pub name: String,
    pub namespace: String,
    pub created: Option<String>,
    #[serde(rename = "type")]
    pub type_: String,
    pub cluster_ip: String,
    pub cluster_ips: Vec<String>,
    pub external_ips: Vec<String>,
    pub external_name: String,
    pub load_balancer_ip: String,
    pub ports: Vec<ServicePortInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistentVolumeInfo {
    pub name: String,
    pub created: Option<String>,
    pub capacity: BTreeMap<String, String>,
    pub access_modes: Vec<String>,
    pub reclaim_policy: String,
    pub status: String,
    pub storage_class: String,
    pub volume_mode: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistentVolumeClaimInfo {
    pub name: String,
    pub namespace: String,
    pub created: Option<String>,
    pub status: String,
    pub access_modes: Vec<String>,
    pub storage_class: String,
    pub volume_mode: String,
    pub capacity: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KubernetesStats {
    pub deployments: Vec<DeploymentInfo>,
    pub namespaces: Vec<NamespaceInfo>,
    pub persistent_volumes: Vec<PersistentVolumeInfo>,
    pub persistent_volume_claims: Vec<PersistentVolumeClaimInfo>,
    pub nodes: Vec<NodeInfo>,
    pub pods: Vec<PodInfo>,
    pub services: Vec<ServiceInfo>,
}
