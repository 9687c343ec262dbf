// Refresh scheduler timing and shutdown (paused tokio clock)

mod common;

use common::*;
use std::time::Duration;
use sysmon::aggregator::Aggregator;
use sysmon::collectors::CollectorRegistry;
use sysmon::models::MetricDomain;
use sysmon::scheduler::RefreshScheduler;

const PERIOD: Duration = Duration::from_secs(30);

#[tokio::test(start_paused = true)]
async fn test_first_round_waits_one_full_interval() {
    let cpu = ScriptedCollector::ok(MetricDomain::Cpu);
    let aggregator = Aggregator::new(CollectorRegistry::new(vec![cpu.clone()]));
    let scheduler = RefreshScheduler::spawn(aggregator.clone(), PERIOD);

    tokio::time::sleep(Duration::from_secs(29)).await;
    assert_eq!(cpu.calls(), 0);
    assert!(aggregator.snapshot().await.is_empty());

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(cpu.calls(), 1);
    assert!(aggregator.get(MetricDomain::Cpu).await.is_some());

    scheduler.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_refreshes_every_interval_until_shutdown() {
    let cpu = ScriptedCollector::ok(MetricDomain::Cpu);
    let memory = ScriptedCollector::ok(MetricDomain::Memory);
    let aggregator = Aggregator::new(CollectorRegistry::new(vec![cpu.clone(), memory.clone()]));
    let scheduler = RefreshScheduler::spawn(aggregator.clone(), PERIOD);

    tokio::time::sleep(Duration::from_secs(95)).await;
    assert_eq!(cpu.calls(), 3);
    assert_eq!(memory.calls(), 3);
    let stored = aggregator.get(MetricDomain::Cpu).await.unwrap();
    assert_eq!(marker_of(&stored), "cpu-3");

    scheduler.shutdown().await;
    tokio::time::sleep(Duration::from_secs(300)).await;
    assert_eq!(cpu.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_failing_rounds_do_not_stop_the_loop() {
    let disk = ScriptedCollector::failing(MetricDomain::Disk);
    let aggregator = Aggregator::new(CollectorRegistry::new(vec![disk.clone()]));
    let scheduler = RefreshScheduler::spawn(aggregator.clone(), PERIOD);

    tokio::time::sleep(Duration::from_secs(65)).await;
    assert_eq!(disk.calls(), 2);
    assert!(aggregator.snapshot().await.is_empty());

    disk.set_failing(false);
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(disk.calls(), 3);
    assert!(aggregator.get(MetricDomain::Disk).await.is_some());

    scheduler.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_dropping_the_handle_stops_the_loop() {
    let host = ScriptedCollector::ok(MetricDomain::Host);
    let aggregator = Aggregator::new(CollectorRegistry::new(vec![host.clone()]));
    let scheduler = RefreshScheduler::spawn(aggregator, PERIOD);

    tokio::time::sleep(Duration::from_secs(31)).await;
    assert_eq!(host.calls(), 1);

    drop(scheduler);
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(host.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_start_collects_before_returning() {
    let cpu = ScriptedCollector::ok(MetricDomain::Cpu);
    let disk = ScriptedCollector::failing(MetricDomain::Disk);
    let aggregator = Aggregator::new(CollectorRegistry::new(vec![cpu.clone(), disk.clone()]));
    let scheduler = RefreshScheduler::start(aggregator.clone(), PERIOD).await;

    assert_eq!(cpu.calls(), 1);
    assert_eq!(disk.calls(), 1);
    let stored = aggregator.get(MetricDomain::Cpu).await.unwrap();
    assert_eq!(marker_of(&stored), "cpu-1");
    assert!(aggregator.get(MetricDomain::Disk).await.is_none());

    tokio::time::sleep(Duration::from_secs(29)).await;
    assert_eq!(cpu.calls(), 1);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(cpu.calls(), 2);
    let stored = aggregator.get(MetricDomain::Cpu).await.unwrap();
    assert_eq!(marker_of(&stored), "cpu-2");

    scheduler.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_zero_period_is_raised_to_minimum() {
    let cpu = ScriptedCollector::ok(MetricDomain::Cpu);
    let aggregator = Aggregator::new(CollectorRegistry::new(vec![cpu.clone()]));
    let scheduler = RefreshScheduler::spawn(aggregator.clone(), Duration::ZERO);

    tokio::time::sleep(Duration::from_millis(5)).await;
    assert!(cpu.calls() >= 1);
    assert!(aggregator.get(MetricDomain::Cpu).await.is_some());

    scheduler.shutdown().await;
}
