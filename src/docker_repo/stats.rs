// Convert raw Docker API responses into the docker payload models.

use crate::models::{ContainerInfo, ContainerState, ContainerUsage, ImageInfo, VolumeInfo};
use bollard::models::{ContainerStatsResponse, ContainerSummary, ImageSummary, Volume};

/// Turns a one-shot stats response (with Docker's own cpu/precpu pair) into a
/// resource sample. None when the cpu sections are missing.
pub(crate) fn usage_from_stats(s: &ContainerStatsResponse, name: &str) -> Option<ContainerUsage> {
    let cpu_stats = s.cpu_stats.as_ref()?;
    let precpu_stats = s.precpu_stats.as_ref()?;

    let cpu_usage = cpu_stats.cpu_usage.as_ref()?;
    let precpu_usage = precpu_stats.cpu_usage.as_ref()?;

    let total_usage = cpu_usage.total_usage.unwrap_or(0);
    let cpu_delta = total_usage as i64 - precpu_usage.total_usage.unwrap_or(0) as i64;
    let system_delta = cpu_stats.system_cpu_usage.unwrap_or(0) as i64
        - precpu_stats.system_cpu_usage.unwrap_or(0) as i64;
    let online = cpu_stats
        .online_cpus
        .filter(|n| *n > 0)
        .map(|n| n as f64)
        .or_else(|| {
            cpu_usage
                .percpu_usage
                .as_ref()
                .map(|v| v.len() as f64)
                .filter(|n| *n > 0.0)
        })
        .unwrap_or(1.0);
    let cpu_percent = if system_delta > 0 && cpu_delta > 0 {
        (cpu_delta as f64 / system_delta as f64) * online * 100.0
    } else {
        0.0
    };

    let memory_usage_bytes = s.memory_stats.as_ref().and_then(|m| m.usage).unwrap_or(0);
    let memory_limit_bytes = s.memory_stats.as_ref().and_then(|m| m.limit).unwrap_or(0);

    let (block_read_bytes, block_write_bytes) = s
        .blkio_stats
        .as_ref()
        .and_then(|b| b.io_service_bytes_recursive.as_ref())
        .map_or((0u64, 0u64), |b| {
            let mut read = 0u64;
            let mut write = 0u64;
            for e in b {
                if e.op
                    .as_ref()
                    .is_some_and(|op| op.eq_ignore_ascii_case("read"))
                {
                    read += e.value.unwrap_or(0);
                } else if e
                    .op
                    .as_ref()
                    .is_some_and(|op| op.eq_ignore_ascii_case("write"))
                {
                    write += e.value.unwrap_or(0);
                }
            }
            (read, write)
        });

    Some(ContainerUsage {
        name: name.to_string(),
        cpu_percent,
        cpu_time_ns: total_usage,
        memory_usage_bytes,
        memory_limit_bytes,
        block_read_bytes,
        block_write_bytes,
    })
}

pub(crate) fn container_from_summary(c: &ContainerSummary) -> ContainerInfo {
    ContainerInfo {
        id: c.id.clone().unwrap_or_default(),
        image: c.image.clone().unwrap_or_default(),
        names: c
            .names
            .as_ref()
            .map(|n| n.iter().map(|s| s.trim_start_matches('/').to_string()).collect())
            .unwrap_or_default(),
        state: c
            .state
            .as_ref()
            .map(|s| ContainerState::from_docker(&s.to_string()))
            .unwrap_or(ContainerState::Unknown),
        status: c.status.clone().unwrap_or_default(),
        root_size_bytes: c.size_root_fs.unwrap_or(0),
    }
}

pub(crate) fn image_from_summary(i: &ImageSummary) -> ImageInfo {
    let created = chrono::DateTime::from_timestamp(i.created, 0)
        .map(|t| t.to_rfc2822())
        .unwrap_or_default();
    ImageInfo {
        id: i.id.clone(),
        tags: i.repo_tags.clone(),
        created,
        containers: i.containers,
        size_bytes: i.size,
    }
}

pub(crate) fn volume_from_api(v: &Volume) -> VolumeInfo {
    VolumeInfo {
        name: v.name.clone(),
        mount_point: v.mountpoint.clone(),
        scope: v.scope.as_ref().map(|s| s.to_string()).unwrap_or_default(),
        driver: v.driver.clone(),
        size_bytes: v.usage_data.as_ref().map(|u| u.size).unwrap_or(-1),
        created: v.created_at.clone().unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bollard::models::{
        ContainerBlkioStatEntry, ContainerBlkioStats, ContainerCpuStats, ContainerCpuUsage,
        ContainerMemoryStats, ContainerStatsResponse,
    };

    fn minimal_cpu_stats(total_usage: u64, system_cpu_usage: u64) -> ContainerCpuStats {
        ContainerCpuStats {
            cpu_usage: Some(ContainerCpuUsage {
                total_usage: Some(total_usage),
                ..Default::default()
            }),
            system_cpu_usage: Some(system_cpu_usage),
            online_cpus: Some(2),
            throttling_data: None,
        }
    }

    #[test]
    fn usage_is_none_when_cpu_stats_missing() {
        let s = ContainerStatsResponse {
            cpu_stats: None,
            precpu_stats: Some(minimal_cpu_stats(0, 0)),
            ..Default::default()
        };
        assert!(usage_from_stats(&s, "name").is_none());
    }

    #[test]
    fn usage_is_none_when_precpu_stats_missing() {
        let s = ContainerStatsResponse {
            cpu_stats: Some(minimal_cpu_stats(100, 1000)),
            precpu_stats: None,
            ..Default::default()
        };
        assert!(usage_from_stats(&s, "name").is_none());
    }

    #[test]
    fn usage_computes_cpu_memory_and_block_io() {
        let s = ContainerStatsResponse {
            cpu_stats: Some(minimal_cpu_stats(100_000_000, 1_000_000_000)),
            precpu_stats: Some(minimal_cpu_stats(50_000_000, 500_000_000)),
            memory_stats: Some(ContainerMemoryStats {
                usage: Some(256 * 1024 * 1024),
                limit: Some(512 * 1024 * 1024),
                ..Default::default()
            }),
            blkio_stats: Some(ContainerBlkioStats {
                io_service_bytes_recursive: Some(vec![
                    ContainerBlkioStatEntry {
                        op: Some("read".to_string()),
                        value: Some(100),
                        ..Default::default()
                    },
                    ContainerBlkioStatEntry {
                        op: Some("Write".to_string()),
                        value: Some(200),
                        ..Default::default()
                    },
                ]),
                ..Default::default()
            }),
            ..Default::default()
        };
        let out = usage_from_stats(&s, "web").unwrap();
        assert_eq!(out.name, "web");
        assert!((out.cpu_percent - 20.0).abs() < 0.01);
        assert_eq!(out.cpu_time_ns, 100_000_000);
        assert_eq!(out.memory_usage_bytes, 256 * 1024 * 1024);
        assert_eq!(out.memory_limit_bytes, 512 * 1024 * 1024);
        assert_eq!(out.block_read_bytes, 100);
        assert_eq!(out.block_write_bytes, 200);
    }

    #[test]
    fn usage_zero_system_delta_returns_zero_cpu_percent() {
        let s = ContainerStatsResponse {
            cpu_stats: Some(minimal_cpu_stats(100, 500)),
            precpu_stats: Some(minimal_cpu_stats(50, 500)),
            ..Default::default()
        };
        let out = usage_from_stats(&s, "n").unwrap();
        assert_eq!(out.cpu_percent, 0.0);
    }

    #[test]
    fn image_created_is_rendered_as_date() {
        let image = ImageSummary {
            id: "sha256:abc".into(),
            repo_tags: vec!["nginx:latest".into()],
            created: 0,
            containers: 2,
            size: 1024,
            ..Default::default()
        };
        let info = image_from_summary(&image);
        assert_eq!(info.tags, vec!["nginx:latest".to_string()]);
        assert!(info.created.contains("1970"));
        assert_eq!(info.containers, 2);
    }

    #[test]
    fn container_names_lose_leading_slash() {
        let summary = ContainerSummary {
            id: Some("abc".into()),
            names: Some(vec!["/sleepy_chaum".into()]),
            status: Some("Up 2 hours".into()),
            ..Default::default()
        };
        let info = container_from_summary(&summary);
        assert_eq!(info.names, vec!["sleepy_chaum".to_string()]);
        assert_eq!(info.state, ContainerState::Unknown);
        assert_eq!(info.root_size_bytes, 0);
    }
}
