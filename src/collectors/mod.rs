// Collector contract and the registry the aggregator is built from

mod host;
mod remote;

pub use host::{
    CpuCollector, DiskCollector, HostCollector, MemoryCollector, NetworkCollector, UserCollector,
};
pub use remote::{DockerCollector, KubernetesCollector};

use crate::error::CollectError;
use crate::models::{MetricDomain, MetricPayload};
use crate::sysinfo_repo::SysinfoRepo;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Default bound on a single docker or kubernetes collection.
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(10);

/// Produces one domain's payload. Implementations must be idempotent, safe to
/// call from any task, and turn expected failures into `CollectError` values.
#[async_trait::async_trait]
pub trait Collector: Send + Sync {
    fn domain(&self) -> MetricDomain;

    async fn collect(&self) -> Result<MetricPayload, CollectError>;
}

/// Which optional domains to register and how to reach them.
#[derive(Debug, Clone)]
pub struct CollectorOptions {
    pub enable_docker: bool,
    pub enable_kubernetes: bool,
    pub kubeconfig_path: Option<PathBuf>,
    pub remote_timeout: Duration,
}

impl Default for CollectorOptions {
    fn default() -> Self {
        Self {
            enable_docker: false,
            enable_kubernetes: false,
            kubeconfig_path: None,
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }
}

/// Ordered set of collectors, at most one per domain.
#[derive(Clone, Default)]
pub struct CollectorRegistry {
    collectors: Vec<Arc<dyn Collector>>,
}

impl CollectorRegistry {
    /// Registers the given collectors in order. A later collector for an already
    /// registered domain replaces the earlier one in place.
    pub fn new(collectors: Vec<Arc<dyn Collector>>) -> Self {
        let mut registry = Self::default();
        for c in collectors {
            registry.register(c);
        }
        registry
    }

    pub fn register(&mut self, collector: Arc<dyn Collector>) {
        let domain = collector.domain();
        match self.collectors.iter_mut().find(|c| c.domain() == domain) {
            Some(slot) => *slot = collector,
            None => self.collectors.push(collector),
        }
    }

    /// The six host-local collectors, plus docker and kubernetes when enabled.
    pub fn from_options(options: &CollectorOptions) -> Self {
        let mut domains = MetricDomain::HOST_LOCAL.to_vec();
        if options.enable_docker {
            domains.push(MetricDomain::Docker);
        }
        if options.enable_kubernetes {
            domains.push(MetricDomain::Kubernetes);
        }
        Self::for_domains(&domains, options)
    }

    /// Collectors for exactly `domains`, regardless of the enable flags.
    /// Host-local collectors share one sysinfo sampler, created on the first
    /// host-local domain only.
    pub fn for_domains(domains: &[MetricDomain], options: &CollectorOptions) -> Self {
        let mut sysinfo: Option<Arc<SysinfoRepo>> = None;
        let mut host = || {
            sysinfo
                .get_or_insert_with(|| Arc::new(SysinfoRepo::new()))
                .clone()
        };
        let collectors = domains
            .iter()
            .map(|d| -> Arc<dyn Collector> {
                match d {
                    MetricDomain::Cpu => Arc::new(CpuCollector::new(host())),
                    MetricDomain::Memory => Arc::new(MemoryCollector::new(host())),
                    MetricDomain::Disk => Arc::new(DiskCollector::new(host())),
                    MetricDomain::Network => Arc::new(NetworkCollector::new(host())),
                    MetricDomain::Host => Arc::new(HostCollector::new(host())),
                    MetricDomain::User => Arc::new(UserCollector::new(host())),
                    MetricDomain::Docker => Arc::new(DockerCollector::new(options.remote_timeout)),
                    MetricDomain::Kubernetes => Arc::new(KubernetesCollector::new(
                        options.kubeconfig_path.clone(),
                        options.remote_timeout,
                    )),
                }
            })
            .collect();
        Self::new(collectors)
    }

    pub fn get(&self, domain: MetricDomain) -> Option<Arc<dyn Collector>> {
        self.collectors.iter().find(|c| c.domain() == domain).cloned()
    }

    pub fn domains(&self) -> Vec<MetricDomain> {
        self.collectors.iter().map(|c| c.domain()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Collector>> {
        self.collectors.iter()
    }

    pub fn len(&self) -> usize {
        self.collectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collectors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_register_host_domains_only() {
        let registry = CollectorRegistry::from_options(&CollectorOptions::default());
        assert_eq!(registry.domains(), MetricDomain::HOST_LOCAL.to_vec());
        assert!(registry.get(MetricDomain::Docker).is_none());
    }

    #[test]
    fn optional_domains_follow_flags() {
        let options = CollectorOptions {
            enable_docker: true,
            enable_kubernetes: true,
            ..Default::default()
        };
        let registry = CollectorRegistry::from_options(&options);
        assert_eq!(registry.len(), 8);
        assert_eq!(registry.domains(), MetricDomain::ALL.to_vec());
    }

    #[test]
    fn for_domains_keeps_order_and_dedups() {
        let registry = CollectorRegistry::for_domains(
            &[MetricDomain::Disk, MetricDomain::Cpu, MetricDomain::Disk],
            &CollectorOptions::default(),
        );
        assert_eq!(
            registry.domains(),
            vec![MetricDomain::Disk, MetricDomain::Cpu]
        );
    }

    #[test]
    fn remote_only_domains_skip_host_collectors() {
        let registry = CollectorRegistry::for_domains(
            &[MetricDomain::Docker, MetricDomain::Kubernetes],
            &CollectorOptions::default(),
        );
        assert_eq!(
            registry.domains(),
            vec![MetricDomain::Docker, MetricDomain::Kubernetes]
        );
        assert!(registry.get(MetricDomain::Cpu).is_none());
    }
}
