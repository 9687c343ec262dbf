// Docker engine, container, image and volume models

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Docker container state; serializes to lowercase JSON (e.g. "running").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerState {
    Created,
    Running,
    Paused,
    Restarting,
    Removing,
    Exited,
    Dead,
    #[serde(other)]
    Unknown,
}

impl ContainerState {
    /// Parse from Docker API state string (e.g. "running", "exited").
    pub fn from_docker(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "created" => ContainerState::Created,
            "running" => ContainerState::Running,
            "paused" => ContainerState::Paused,
            "restarting" => ContainerState::Restarting,
            "removing" => ContainerState::Removing,
            "exited" => ContainerState::Exited,
            "dead" => ContainerState::Dead,
            _ => ContainerState::Unknown,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerInfo {
    pub id: String,
    pub image: String,
    pub names: Vec<String>,
    pub state: ContainerState,
    pub status: String,
    pub root_size_bytes: i64,
}

/// One-shot resource sample of a running container.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerUsage {
    pub name: String,
    pub cpu_percent: f64,
    /// Cumulative CPU time in nanoseconds.
    pub cpu_time_ns: u64,
    pub memory_usage_bytes: u64,
    pub memory_limit_bytes: u64,
    #[serde(default)]
    pub block_read_bytes: u64,
    #[serde(default)]
    pub block_write_bytes: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInfo {
    pub id: String,
    pub tags: Vec<String>,
    pub created: String,
    pub containers: i64,
    pub size_bytes: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    pub name: String,
    pub mount_point: String,
    pub scope: String,
    pub driver: String,
    /// -1 when the engine did not report usage data.
    pub size_bytes: i64,
    pub created: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DockerStats {
    /// Engine name, e.g. `docker-desktop`.
    pub engine_name: String,
    pub containers_running: i64,
    pub containers_paused: i64,
    pub containers_stopped: i64,
    pub ncpu: i64,
    pub mem_total: i64,
    pub containers_disk_usage: i64,
    pub images_disk_usage: i64,
    pub platform_name: String,
    pub api_version: String,
    pub os: String,
    pub arch: String,
    pub total_containers: usize,
    pub total_images: usize,
    pub total_volumes: usize,
    /// Resource samples keyed by container id.
    pub container_usage: BTreeMap<String, ContainerUsage>,
    pub containers: Vec<ContainerInfo>,
    pub images: Vec<ImageInfo>,
    pub volumes: Vec<VolumeInfo>,
}
