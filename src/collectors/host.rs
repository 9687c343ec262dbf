// Host-local collectors backed by the shared sysinfo sampler

use super::Collector;
use crate::error::CollectError;
use crate::models::{MetricDomain, MetricPayload};
use crate::sysinfo_repo::SysinfoRepo;
use std::sync::Arc;

pub struct CpuCollector {
    repo: Arc<SysinfoRepo>,
}

impl CpuCollector {
    pub fn new(repo: Arc<SysinfoRepo>) -> Self {
        Self { repo }
    }
}

#[async_trait::async_trait]
impl Collector for CpuCollector {
    fn domain(&self) -> MetricDomain {
        MetricDomain::Cpu
    }

    async fn collect(&self) -> Result<MetricPayload, CollectError> {
        Ok(MetricPayload::Cpu(self.repo.get_cpu_stats().await?))
    }
}

pub struct MemoryCollector {
    repo: Arc<SysinfoRepo>,
}

impl MemoryCollector {
    pub fn new(repo: Arc<SysinfoRepo>) -> Self {
        Self { repo }
    }
}

#[async_trait::async_trait]
impl Collector for MemoryCollector {
    fn domain(&self) -> MetricDomain {
        MetricDomain::Memory
    }

    async fn collect(&self) -> Result<MetricPayload, CollectError> {
        Ok(MetricPayload::Memory(self.repo.get_memory_stats().await?))
    }
}

pub struct DiskCollector {
    repo: Arc<SysinfoRepo>,
}

impl DiskCollector {
    pub fn new(repo: Arc<SysinfoRepo>) -> Self {
        Self { repo }
    }
}

#[async_trait::async_trait]
impl Collector for DiskCollector {
    fn domain(&self) -> MetricDomain {
        MetricDomain::Disk
    }

    async fn collect(&self) -> Result<MetricPayload, CollectError> {
        Ok(MetricPayload::Disk(self.repo.get_disk_stats().await?))
    }
}

pub struct NetworkCollector {
    repo: Arc<SysinfoRepo>,
}

impl NetworkCollector {
    pub fn new(repo: Arc<SysinfoRepo>) -> Self {
        Self { repo }
    }
}

#[async_trait::async_trait]
impl Collector for NetworkCollector {
    fn domain(&self) -> MetricDomain {
        MetricDomain::Network
    }

    async fn collect(&self) -> Result<MetricPayload, CollectError> {
        Ok(MetricPayload::Network(self.repo.get_network_stats().await?))
    }
}

pub struct HostCollector {
    repo: Arc<SysinfoRepo>,
}

impl HostCollector {
    pub fn new(repo: Arc<SysinfoRepo>) -> Self {
        Self { repo }
    }
}

#[async_trait::async_trait]
impl Collector for HostCollector {
    fn domain(&self) -> MetricDomain {
        MetricDomain::Host
    }

    async fn collect(&self) -> Result<MetricPayload, CollectError> {
        Ok(MetricPayload::Host(self.repo.get_host_stats().await?))
    }
}

pub struct UserCollector {
    repo: Arc<SysinfoRepo>,
}

impl UserCollector {
    pub fn new(repo: Arc<SysinfoRepo>) -> Self {
        Self { repo }
    }
}

#[async_trait::async_trait]
impl Collector for UserCollector {
    fn domain(&self) -> MetricDomain {
        MetricDomain::User
    }

    async fn collect(&self) -> Result<MetricPayload, CollectError> {
        Ok(MetricPayload::User(self.repo.get_user_stats().await?))
    }
}
