// Docker engine, container, image and volume stats via bollard

mod stats;

use crate::error::CollectError;
use crate::models::{ContainerState, DockerStats};
use bollard::Docker;
use bollard::query_parameters::{
    ListContainersOptions, ListImagesOptions, ListVolumesOptions, StatsOptions,
};
use futures_util::StreamExt;
use futures_util::future::join_all;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::instrument;

/// Lazily connected Docker client. A failed connection is not cached, so the
/// next round tries again.
pub struct DockerRepo {
    client: Mutex<Option<Docker>>,
}

impl Default for DockerRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl DockerRepo {
    pub fn new() -> Self {
        Self {
            client: Mutex::new(None),
        }
    }

    async fn client(&self) -> Result<Docker, CollectError> {
        let mut guard = self.client.lock().await;
        if let Some(docker) = guard.as_ref() {
            return Ok(docker.clone());
        }
        let docker = Docker::connect_with_local_defaults()
            .map_err(|e| CollectError::Configuration(format!("docker connection: {e}")))?;
        *guard = Some(docker.clone());
        Ok(docker)
    }

    /// Engine info plus containers, images, volumes and one-shot usage of every
    /// running container. The whole exchange is bounded by `timeout`.
    #[instrument(skip(self), fields(repo = "docker", operation = "get_docker_stats"))]
    pub async fn get_docker_stats(&self, timeout: Duration) -> Result<DockerStats, CollectError> {
        let docker = self.client().await?;
        match tokio::time::timeout(timeout, fetch_docker_stats(&docker)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(?timeout, operation = "get_docker_stats", "docker call timed out");
                Err(CollectError::Timeout(timeout))
            }
        }
    }
}

async fn fetch_docker_stats(docker: &Docker) -> Result<DockerStats, CollectError> {
    let info = docker.info().await?;
    let version = docker.version().await?;

    let containers = docker
        .list_containers(Some(ListContainersOptions {
            all: true,
            size: true,
            ..Default::default()
        }))
        .await?;
    let images = docker
        .list_images(Some(ListImagesOptions {
            all: true,
            ..Default::default()
        }))
        .await?;
    let volumes = docker
        .list_volumes(Some(ListVolumesOptions::default()))
        .await?
        .volumes
        .unwrap_or_default();

    let containers: Vec<_> = containers.iter().map(stats::container_from_summary).collect();
    let images: Vec<_> = images.iter().map(stats::image_from_summary).collect();
    let volumes: Vec<_> = volumes.iter().map(stats::volume_from_api).collect();

    let running: Vec<(String, String)> = containers
        .iter()
        .filter(|c| c.state == ContainerState::Running)
        .map(|c| {
            let name = c.names.first().cloned().unwrap_or_else(|| c.id.clone());
            (c.id.clone(), name)
        })
        .collect();

    let samples = join_all(running.into_iter().map(|(id, name)| async move {
        let options = StatsOptions {
            stream: false,
            one_shot: false,
        };
        let mut stream = docker.stats(&id, Some(options));
        match stream.next().await {
            Some(Ok(s)) => stats::usage_from_stats(&s, &name).map(|u| (id, u)),
            Some(Err(e)) => {
                tracing::warn!(error = %e, container = %name, operation = "container_stats", "stats unavailable");
                None
            }
            None => None,
        }
    }))
    .await;

    let platform_name = version
        .platform
        .as_ref()
        .map(|p| p.name.clone())
        .unwrap_or_default();

    Ok(DockerStats {
        engine_name: info.name.unwrap_or_default(),
        containers_running: info.containers_running.unwrap_or(0),
        containers_paused: info.containers_paused.unwrap_or(0),
        containers_stopped: info.containers_stopped.unwrap_or(0),
        ncpu: info.ncpu.unwrap_or(0),
        mem_total: info.mem_total.unwrap_or(0),
        containers_disk_usage: containers.iter().map(|c| c.root_size_bytes).sum(),
        images_disk_usage: images.iter().map(|i| i.size_bytes).sum(),
        platform_name,
        api_version: version.api_version.unwrap_or_default(),
        os: version.os.unwrap_or_default(),
        arch: version.arch.unwrap_or_default(),
        total_containers: containers.len(),
        total_images: images.len(),
        total_volumes: volumes.len(),
        container_usage: samples.into_iter().flatten().collect(),
        containers,
        images,
        volumes,
    })
}
