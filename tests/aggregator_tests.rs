// Aggregator behaviour with scripted collectors

mod common;

use common::*;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use sysmon::aggregator::Aggregator;
use sysmon::collectors::{Collector, CollectorRegistry};
use sysmon::error::CollectError;
use sysmon::models::{MetricDomain, MetricPayload};

fn aggregator_with(collectors: Vec<Arc<dyn Collector>>) -> Aggregator {
    Aggregator::new(CollectorRegistry::new(collectors))
}

#[tokio::test]
async fn test_failed_domain_is_reported_and_others_stored() {
    let aggregator = aggregator_with(vec![
        ScriptedCollector::ok(MetricDomain::Cpu),
        ScriptedCollector::failing(MetricDomain::Memory),
        ScriptedCollector::ok(MetricDomain::Disk),
    ]);

    let outcomes = aggregator.collect_all_concurrent().await;
    assert_eq!(
        outcomes.keys().copied().collect::<Vec<_>>(),
        vec![MetricDomain::Memory]
    );
    assert!(matches!(
        outcomes.get(&MetricDomain::Memory),
        Some(CollectError::Unavailable(_))
    ));

    let snapshot = aggregator.snapshot().await;
    assert_eq!(
        snapshot.keys().copied().collect::<Vec<_>>(),
        vec![MetricDomain::Cpu, MetricDomain::Disk]
    );
}

#[tokio::test]
async fn test_sequential_and_concurrent_rounds_fail_the_same_domains() {
    let build = || {
        aggregator_with(vec![
            ScriptedCollector::ok(MetricDomain::Cpu),
            ScriptedCollector::failing(MetricDomain::Memory),
            ScriptedCollector::ok(MetricDomain::Disk),
            ScriptedCollector::failing(MetricDomain::Network),
            ScriptedCollector::ok(MetricDomain::Host),
        ])
    };

    let sequential: BTreeSet<_> = build().collect_all_sequential().await.into_keys().collect();
    let concurrent: BTreeSet<_> = build().collect_all_concurrent().await.into_keys().collect();
    assert_eq!(sequential, concurrent);
    assert_eq!(
        sequential,
        BTreeSet::from([MetricDomain::Memory, MetricDomain::Network])
    );
}

#[tokio::test]
async fn test_all_successful_round_has_empty_outcome() {
    let aggregator = aggregator_with(vec![
        ScriptedCollector::ok(MetricDomain::Host),
        ScriptedCollector::ok(MetricDomain::User),
    ]);
    assert!(aggregator.collect_all_sequential().await.is_empty());
    assert_eq!(aggregator.snapshot().await.len(), 2);
}

#[tokio::test]
async fn test_failure_keeps_previous_value() {
    let cpu = ScriptedCollector::ok(MetricDomain::Cpu);
    let aggregator = aggregator_with(vec![cpu.clone()]);

    assert!(aggregator.collect_all_concurrent().await.is_empty());
    cpu.set_failing(true);
    let outcomes = aggregator.collect_all_concurrent().await;
    assert!(outcomes.contains_key(&MetricDomain::Cpu));

    let stored = aggregator.get(MetricDomain::Cpu).await.expect("stale value kept");
    assert_eq!(marker_of(&stored), "cpu-1");
    assert_eq!(cpu.calls(), 2);
}

#[tokio::test]
async fn test_collect_domain_failure_leaves_store_untouched() {
    let disk = ScriptedCollector::ok(MetricDomain::Disk);
    let aggregator = aggregator_with(vec![disk.clone()]);

    aggregator.collect_domain(MetricDomain::Disk).await.unwrap();
    disk.set_failing(true);
    let err = aggregator
        .collect_domain(MetricDomain::Disk)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("disk unavailable"));
    let stored = aggregator.get(MetricDomain::Disk).await.unwrap();
    assert_eq!(marker_of(&stored), "disk-1");
}

#[tokio::test]
async fn test_successful_recollection_replaces_value() {
    let host = ScriptedCollector::ok(MetricDomain::Host);
    let aggregator = aggregator_with(vec![host]);

    aggregator.collect_domain(MetricDomain::Host).await.unwrap();
    aggregator.collect_domain(MetricDomain::Host).await.unwrap();
    let stored = aggregator.get(MetricDomain::Host).await.unwrap();
    assert_eq!(marker_of(&stored), "host-2");
}

#[tokio::test]
async fn test_snapshot_is_an_independent_copy() {
    let aggregator = aggregator_with(vec![
        ScriptedCollector::ok(MetricDomain::Cpu),
        ScriptedCollector::ok(MetricDomain::User),
    ]);
    aggregator.collect_all_sequential().await;

    let mut copy = aggregator.snapshot().await;
    copy.remove(&MetricDomain::Cpu);
    if let Some(MetricPayload::User(u)) = copy.get_mut(&MetricDomain::User) {
        u.username = "mutated".into();
    }

    let fresh = aggregator.snapshot().await;
    assert_eq!(fresh.len(), 2);
    assert_eq!(marker_of(&fresh[&MetricDomain::User]), "user-1");
}

#[tokio::test]
async fn test_clear_empties_snapshot() {
    let aggregator = aggregator_with(vec![
        ScriptedCollector::ok(MetricDomain::Cpu),
        ScriptedCollector::ok(MetricDomain::Memory),
    ]);
    aggregator.collect_all_concurrent().await;
    assert_eq!(aggregator.snapshot().await.len(), 2);

    aggregator.clear().await;
    assert!(aggregator.snapshot().await.is_empty());
    assert!(aggregator.get(MetricDomain::Cpu).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_overlapping_collections_keep_the_last_to_finish() {
    // first call is slow, second is fast: the slow one completes last and wins
    let cpu = ScriptedCollector::with_delays(
        MetricDomain::Cpu,
        vec![Duration::from_millis(500), Duration::from_millis(10)],
    );
    let aggregator = aggregator_with(vec![cpu.clone()]);

    let slow = {
        let a = aggregator.clone();
        tokio::spawn(async move { a.collect_domain(MetricDomain::Cpu).await })
    };
    // let the slow call register itself before starting the fast one
    tokio::task::yield_now().await;
    let fast = {
        let a = aggregator.clone();
        tokio::spawn(async move { a.collect_domain(MetricDomain::Cpu).await })
    };

    fast.await.unwrap().unwrap();
    let after_fast = aggregator.get(MetricDomain::Cpu).await.unwrap();
    assert_eq!(marker_of(&after_fast), "cpu-10ms");

    slow.await.unwrap().unwrap();
    let after_slow = aggregator.get(MetricDomain::Cpu).await.unwrap();
    assert_eq!(marker_of(&after_slow), "cpu-500ms");
    assert_eq!(cpu.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_round_runs_collectors_in_parallel() {
    let second = Duration::from_secs(1);
    let aggregator = aggregator_with(vec![
        ScriptedCollector::with_delays(MetricDomain::Cpu, vec![second, second]),
        ScriptedCollector::with_delays(MetricDomain::Memory, vec![second, second]),
        ScriptedCollector::with_delays(MetricDomain::Disk, vec![second, second]),
    ]);

    let start = tokio::time::Instant::now();
    assert!(aggregator.collect_all_concurrent().await.is_empty());
    let concurrent = start.elapsed();

    let start = tokio::time::Instant::now();
    assert!(aggregator.collect_all_sequential().await.is_empty());
    let sequential = start.elapsed();

    assert!(concurrent < Duration::from_millis(1500), "{concurrent:?}");
    assert!(sequential >= Duration::from_secs(3), "{sequential:?}");
}

#[tokio::test]
async fn test_panicking_collector_is_recorded_as_task_failure() {
    let aggregator = aggregator_with(vec![
        ScriptedCollector::ok(MetricDomain::Cpu),
        Arc::new(PanickingCollector(MetricDomain::Network)),
    ]);

    let outcomes = aggregator.collect_all_concurrent().await;
    assert!(matches!(
        outcomes.get(&MetricDomain::Network),
        Some(CollectError::Task(_))
    ));
    assert_eq!(outcomes.len(), 1);
    assert!(aggregator.get(MetricDomain::Cpu).await.is_some());
    assert!(aggregator.get(MetricDomain::Network).await.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_never_observe_partial_payloads() {
    let aggregator = aggregator_with(vec![ConsistentCpuCollector::new()]);

    let writer = {
        let a = aggregator.clone();
        tokio::spawn(async move {
            let rounds: Vec<_> = (0..50)
                .map(|_| {
                    let a = a.clone();
                    tokio::spawn(async move { a.collect_all_concurrent().await })
                })
                .collect();
            for r in rounds {
                assert!(r.await.unwrap().is_empty());
            }
        })
    };

    let reader = {
        let a = aggregator.clone();
        tokio::spawn(async move {
            for _ in 0..200 {
                if let Some(MetricPayload::Cpu(c)) = a.get(MetricDomain::Cpu).await {
                    let n = c.physical_cores;
                    assert_eq!(c.model, format!("gen-{n}"));
                    assert_eq!(c.logical_cores, n * 2);
                    assert!(c.per_core_percent.iter().all(|p| *p == n as f64));
                    assert_eq!(c.average_percent, n as f64);
                }
                tokio::task::yield_now().await;
            }
        })
    };

    writer.await.unwrap();
    reader.await.unwrap();
    assert!(aggregator.get(MetricDomain::Cpu).await.is_some());
}

#[tokio::test]
async fn test_unregistered_domain_fails_without_touching_store() {
    let aggregator = aggregator_with(vec![ScriptedCollector::ok(MetricDomain::Cpu)]);
    let err = aggregator
        .collect_domain(MetricDomain::Kubernetes)
        .await
        .unwrap_err();
    assert!(matches!(err, CollectError::NotRegistered(MetricDomain::Kubernetes)));
    assert!(aggregator.snapshot().await.is_empty());
}

#[tokio::test]
async fn test_empty_registry_round_is_trivially_successful() {
    let aggregator = aggregator_with(vec![]);
    assert!(aggregator.collect_all_concurrent().await.is_empty());
    assert!(aggregator.collect_all_sequential().await.is_empty());
    assert!(aggregator.domains().is_empty());
}
