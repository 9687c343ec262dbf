// Metric domains, the tagged payload union and the consumer-facing snapshot

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::{
    CpuStats, DiskStats, DockerStats, HostStats, KubernetesStats, MemoryStats, NetworkStats,
    UserStats,
};

/// One category of telemetry. Ordering follows declaration order, which is also
/// the order domains appear in snapshots and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricDomain {
    Cpu,
    Memory,
    Disk,
    Network,
    Host,
    User,
    Docker,
    Kubernetes,
}

impl MetricDomain {
    pub const ALL: [MetricDomain; 8] = [
        MetricDomain::Cpu,
        MetricDomain::Memory,
        MetricDomain::Disk,
        MetricDomain::Network,
        MetricDomain::Host,
        MetricDomain::User,
        MetricDomain::Docker,
        MetricDomain::Kubernetes,
    ];

    /// Domains backed by the local OS only (always registered).
    pub const HOST_LOCAL: [MetricDomain; 6] = [
        MetricDomain::Cpu,
        MetricDomain::Memory,
        MetricDomain::Disk,
        MetricDomain::Network,
        MetricDomain::Host,
        MetricDomain::User,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MetricDomain::Cpu => "cpu",
            MetricDomain::Memory => "memory",
            MetricDomain::Disk => "disk",
            MetricDomain::Network => "network",
            MetricDomain::Host => "host",
            MetricDomain::User => "user",
            MetricDomain::Docker => "docker",
            MetricDomain::Kubernetes => "kubernetes",
        }
    }
}

impl fmt::Display for MetricDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown metric domain `{0}` (expected one of: cpu, memory, disk, network, host, user, docker, kubernetes)")]
pub struct UnknownDomain(pub String);

impl FromStr for MetricDomain {
    type Err = UnknownDomain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        MetricDomain::ALL
            .into_iter()
            .find(|d| d.as_str() == wanted)
            .ok_or_else(|| UnknownDomain(s.to_string()))
    }
}

/// Result of one successful collection, tagged by domain.
///
/// Serializes untagged: the domain is carried by the snapshot key.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MetricPayload {
    Cpu(CpuStats),
    Memory(MemoryStats),
    Disk(DiskStats),
    Network(NetworkStats),
    Host(HostStats),
    User(UserStats),
    Docker(Box<DockerStats>),
    Kubernetes(Box<KubernetesStats>),
}

impl MetricPayload {
    pub fn domain(&self) -> MetricDomain {
        match self {
            MetricPayload::Cpu(_) => MetricDomain::Cpu,
            MetricPayload::Memory(_) => MetricDomain::Memory,
            MetricPayload::Disk(_) => MetricDomain::Disk,
            MetricPayload::Network(_) => MetricDomain::Network,
            MetricPayload::Host(_) => MetricDomain::Host,
            MetricPayload::User(_) => MetricDomain::User,
            MetricPayload::Docker(_) => MetricDomain::Docker,
            MetricPayload::Kubernetes(_) => MetricDomain::Kubernetes,
        }
    }
}

/// Copy of the aggregator store handed to consumers. Serializes as a JSON object
/// keyed by domain name.
pub type Snapshot = BTreeMap<MetricDomain, MetricPayload>;
