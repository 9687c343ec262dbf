// Shared test helpers: scripted collectors with deterministic payloads

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use sysmon::collectors::Collector;
use sysmon::error::CollectError;
use sysmon::models::*;

/// Payload for `domain` carrying `marker` in a string field, so tests can tell
/// which collection produced a stored value.
pub fn marked_payload(domain: MetricDomain, marker: &str) -> MetricPayload {
    let m = marker.to_string();
    match domain {
        MetricDomain::Cpu => MetricPayload::Cpu(CpuStats {
            model: m,
            ..Default::default()
        }),
        MetricDomain::Memory => MetricPayload::Memory(MemoryStats {
            processes: vec![MemoryProcess {
                name: m,
                ..Default::default()
            }],
            ..Default::default()
        }),
        MetricDomain::Disk => MetricPayload::Disk(DiskStats {
            partitions: vec![PartitionStat {
                device: m,
                ..Default::default()
            }],
            ..Default::default()
        }),
        MetricDomain::Network => MetricPayload::Network(NetworkStats {
            os: m,
            ..Default::default()
        }),
        MetricDomain::Host => MetricPayload::Host(HostStats {
            hostname: m,
            ..Default::default()
        }),
        MetricDomain::User => MetricPayload::User(UserStats {
            username: m,
            ..Default::default()
        }),
        MetricDomain::Docker => MetricPayload::Docker(Box::new(DockerStats {
            engine_name: m,
            ..Default::default()
        })),
        MetricDomain::Kubernetes => MetricPayload::Kubernetes(Box::new(KubernetesStats {
            namespaces: vec![NamespaceInfo {
                name: m,
                created: None,
            }],
            ..Default::default()
        })),
    }
}

/// Reads back the marker written by `marked_payload`.
pub fn marker_of(payload: &MetricPayload) -> String {
    match payload {
        MetricPayload::Cpu(c) => c.model.clone(),
        MetricPayload::Memory(m) => m.processes.first().map(|p| p.name.clone()).unwrap_or_default(),
        MetricPayload::Disk(d) => d.partitions.first().map(|p| p.device.clone()).unwrap_or_default(),
        MetricPayload::Network(n) => n.os.clone(),
        MetricPayload::Host(h) => h.hostname.clone(),
        MetricPayload::User(u) => u.username.clone(),
        MetricPayload::Docker(d) => d.engine_name.clone(),
        MetricPayload::Kubernetes(k) => k.namespaces.first().map(|n| n.name.clone()).unwrap_or_default(),
    }
}

/// Succeeds with `"<domain>-<call>"` markers until told to fail. Optional
/// per-call delays (in call order) are applied before returning.
pub struct ScriptedCollector {
    domain: MetricDomain,
    failing: AtomicBool,
    calls: AtomicUsize,
    delays: Mutex<Vec<Duration>>,
}

impl ScriptedCollector {
    pub fn ok(domain: MetricDomain) -> Arc<Self> {
        Arc::new(Self {
            domain,
            failing: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            delays: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(domain: MetricDomain) -> Arc<Self> {
        let c = Self::ok(domain);
        c.set_failing(true);
        c
    }

    /// Each call takes the next delay; calls beyond the list return immediately.
    pub fn with_delays(domain: MetricDomain, delays: Vec<Duration>) -> Arc<Self> {
        let c = Self::ok(domain);
        *c.delays.lock().unwrap() = delays;
        c
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Collector for ScriptedCollector {
    fn domain(&self) -> MetricDomain {
        self.domain
    }

    async fn collect(&self) -> Result<MetricPayload, CollectError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.delays.lock().unwrap().get(call).copied();
        if let Some(d) = delay {
            tokio::time::sleep(d).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(CollectError::unavailable(format!("{} unavailable", self.domain)));
        }
        let marker = match delay {
            Some(d) => format!("{}-{}ms", self.domain, d.as_millis()),
            None => format!("{}-{}", self.domain, call + 1),
        };
        Ok(marked_payload(self.domain, &marker))
    }
}

/// Panics inside `collect`, standing in for a collector bug.
pub struct PanickingCollector(pub MetricDomain);

#[async_trait::async_trait]
impl Collector for PanickingCollector {
    fn domain(&self) -> MetricDomain {
        self.0
    }

    async fn collect(&self) -> Result<MetricPayload, CollectError> {
        panic!("collector for {} blew up", self.0);
    }
}

/// CPU payload whose fields are all derived from one counter, so a torn write
/// would show up as disagreeing fields.
pub struct ConsistentCpuCollector {
    counter: AtomicUsize,
}

impl ConsistentCpuCollector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            counter: AtomicUsize::new(0),
        })
    }
}

#[async_trait::async_trait]
impl Collector for ConsistentCpuCollector {
    fn domain(&self) -> MetricDomain {
        MetricDomain::Cpu
    }

    async fn collect(&self) -> Result<MetricPayload, CollectError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) as u32 + 1;
        tokio::task::yield_now().await;
        Ok(MetricPayload::Cpu(CpuStats {
            model: format!("gen-{n}"),
            physical_cores: n,
            logical_cores: n * 2,
            per_core_percent: vec![n as f64; 4],
            average_percent: n as f64,
            processes: vec![],
        }))
    }
}
