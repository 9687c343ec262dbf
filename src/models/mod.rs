// Domain models: one payload type per metric domain plus the snapshot types

mod cluster;
mod container;
mod domain;
mod network;
mod storage;
mod system;

pub use cluster::{
    DeploymentInfo, KubernetesStats, NamespaceInfo, NodeAddressInfo, NodeInfo,
    PersistentVolumeClaimInfo, PersistentVolumeInfo, PodContainerInfo, PodInfo, ServiceInfo,
    ServicePortInfo,
};
pub use container::{
    ContainerInfo, ContainerState, ContainerUsage, DockerStats, ImageInfo, VolumeInfo,
};
pub use domain::{MetricDomain, MetricPayload, Snapshot, UnknownDomain};
pub use network::{ConnectionStat, InterfaceIo, NetworkStats};
pub use storage::{DiskStats, DiskUsage, PartitionStat};
pub use system::{
    CpuProcess, CpuStats, HostStats, MemoryProcess, MemoryStats, SwapMemory, UserStats,
    VirtualMemory, percent_of,
};
