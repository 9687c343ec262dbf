// Aggregation engine: runs collectors and keeps the latest payload per domain.

use crate::collectors::{Collector, CollectorRegistry};
use crate::error::CollectError;
use crate::models::{MetricDomain, MetricPayload, Snapshot};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;
use tracing::instrument;

/// Failed domains of one aggregate round. Empty means every collector succeeded.
pub type OutcomeMap = BTreeMap<MetricDomain, CollectError>;

/// Shares one store between the scheduler, the HTTP handlers and the CLI.
/// Cloning is cheap; clones see the same store.
#[derive(Clone)]
pub struct Aggregator {
    registry: Arc<CollectorRegistry>,
    store: Arc<RwLock<HashMap<MetricDomain, MetricPayload>>>,
}

impl Aggregator {
    pub fn new(registry: CollectorRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            store: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Registered domains in registry order.
    pub fn domains(&self) -> Vec<MetricDomain> {
        self.registry.domains()
    }

    /// Runs the collector for `domain` and replaces its entry on success.
    /// On failure the previous entry stays in place.
    #[instrument(skip(self), fields(operation = "collect_domain"))]
    pub async fn collect_domain(&self, domain: MetricDomain) -> Result<(), CollectError> {
        let collector = self
            .registry
            .get(domain)
            .ok_or(CollectError::NotRegistered(domain))?;
        run_and_store(&self.store, collector.as_ref()).await
    }

    /// Every registered collector, one after another. A failure never stops the round.
    pub async fn collect_all_sequential(&self) -> OutcomeMap {
        let mut outcomes = OutcomeMap::new();
        for collector in self.registry.iter() {
            if let Err(e) = run_and_store(&self.store, collector.as_ref()).await {
                outcomes.insert(collector.domain(), e);
            }
        }
        outcomes
    }

    /// One task per registered collector; returns once all of them have finished.
    pub async fn collect_all_concurrent(&self) -> OutcomeMap {
        let outcomes: Arc<Mutex<OutcomeMap>> = Arc::new(Mutex::new(OutcomeMap::new()));

        let handles: Vec<_> = self
            .registry
            .iter()
            .map(|collector| {
                let collector = collector.clone();
                let store = self.store.clone();
                let outcomes = outcomes.clone();
                let domain = collector.domain();
                let handle = tokio::spawn(async move {
                    if let Err(e) = run_and_store(&store, collector.as_ref()).await {
                        record(&outcomes, domain, e);
                    }
                });
                (domain, handle)
            })
            .collect();

        for (domain, handle) in handles {
            if let Err(e) = handle.await {
                tracing::warn!(domain = %domain, error = %e, "collector task failed");
                record(&outcomes, domain, CollectError::from(e));
            }
        }

        let mut map = outcomes.lock().unwrap_or_else(|p| p.into_inner());
        std::mem::take(&mut *map)
    }

    /// Independent copy of every stored payload, ordered by domain.
    pub async fn snapshot(&self) -> Snapshot {
        let store = self.store.read().await;
        store.iter().map(|(d, p)| (*d, p.clone())).collect()
    }

    pub async fn get(&self, domain: MetricDomain) -> Option<MetricPayload> {
        self.store.read().await.get(&domain).cloned()
    }

    pub async fn clear(&self) {
        self.store.write().await.clear();
    }
}

async fn run_and_store(
    store: &RwLock<HashMap<MetricDomain, MetricPayload>>,
    collector: &dyn Collector,
) -> Result<(), CollectError> {
    let domain = collector.domain();
    match collector.collect().await {
        Ok(payload) => {
            store.write().await.insert(domain, payload);
            tracing::debug!(domain = %domain, "collected");
            Ok(())
        }
        Err(e) => {
            tracing::warn!(domain = %domain, error = %e, "collection failed");
            Err(e)
        }
    }
}

fn record(outcomes: &Mutex<OutcomeMap>, domain: MetricDomain, error: CollectError) {
    let mut map = outcomes.lock().unwrap_or_else(|p| p.into_inner());
    map.insert(domain, error);
}
