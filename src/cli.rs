// Command-line surface: `start` runs the dashboard, `get-metrics` prints tables

use crate::aggregator::Aggregator;
use crate::collectors::{CollectorOptions, CollectorRegistry, DEFAULT_REMOTE_TIMEOUT};
use crate::config::AppConfig;
use crate::models::{MetricDomain, UnknownDomain};
use crate::printer;
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

/// sysmon - host, Docker and Kubernetes telemetry
#[derive(Parser, Debug)]
#[command(name = "sysmon", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the web dashboard with background refresh
    Start(StartArgs),
    /// Collect the named metrics once (or repeatedly with --auto) and print them
    #[command(alias = "get_metrics")]
    GetMetrics(GetMetricsArgs),
}

#[derive(Args, Debug, Default)]
pub struct StartArgs {
    /// Bind address (overrides config file)
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port (overrides config file)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Collect Docker metrics
    #[arg(short, long)]
    pub docker: bool,

    /// Collect Kubernetes metrics
    #[arg(short, long)]
    pub kubernetes: bool,

    /// Kubeconfig to use; implies --kubernetes
    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,

    /// Path to configuration file (default: $CONFIG_FILE, then ./sysmon.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl StartArgs {
    pub fn load_config(&self) -> anyhow::Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load_from_path(path)?,
            None => AppConfig::load()?,
        };
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// CLI flags win over file values. Flags can only switch domains on.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if self.docker {
            config.docker.enabled = true;
        }
        if self.kubernetes {
            config.kubernetes.enabled = true;
        }
        if let Some(path) = &self.kubeconfig {
            config.kubernetes.enabled = true;
            config.kubernetes.kubeconfig_path = Some(path.clone());
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct GetMetricsArgs {
    /// Metric names (cpu, memory, disk, network, host, user, docker, kubernetes) or `all`
    pub names: Vec<String>,

    /// Keep refreshing until Ctrl-C
    #[arg(short, long)]
    pub auto: bool,

    /// Seconds between refreshes with --auto
    #[arg(short, long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    pub refresh: u64,

    /// Include Docker when `all` is requested
    #[arg(short, long)]
    pub docker: bool,

    /// Include Kubernetes when `all` is requested
    #[arg(short, long)]
    pub kubernetes: bool,

    /// Kubeconfig to use; implies --kubernetes
    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct DomainSelection {
    pub domains: Vec<MetricDomain>,
    pub unknown: Vec<UnknownDomain>,
}

/// Expands `all` and de-duplicates while keeping the order names were given in.
pub fn resolve_domains(names: &[String], docker: bool, kubernetes: bool) -> DomainSelection {
    fn push(d: MetricDomain, out: &mut Vec<MetricDomain>) {
        if !out.contains(&d) {
            out.push(d);
        }
    }

    let mut selection = DomainSelection::default();
    for name in names {
        if name.trim().eq_ignore_ascii_case("all") {
            for d in MetricDomain::HOST_LOCAL {
                push(d, &mut selection.domains);
            }
            if docker {
                push(MetricDomain::Docker, &mut selection.domains);
            }
            if kubernetes {
                push(MetricDomain::Kubernetes, &mut selection.domains);
            }
            continue;
        }
        match name.parse::<MetricDomain>() {
            Ok(d) => push(d, &mut selection.domains),
            Err(e) => selection.unknown.push(e),
        }
    }
    selection
}

fn valid_names() -> String {
    MetricDomain::ALL
        .iter()
        .map(|d| d.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub async fn get_metrics(args: GetMetricsArgs) -> anyhow::Result<()> {
    if args.names.is_empty() {
        tracing::info!(valid = %valid_names(), "no metrics requested; pass one or more names or `all`");
        return Ok(());
    }

    let kubernetes = args.kubernetes || args.kubeconfig.is_some();
    let selection = resolve_domains(&args.names, args.docker, kubernetes);
    for e in &selection.unknown {
        tracing::warn!(error = %e, "skipping metric");
    }
    anyhow::ensure!(
        !selection.domains.is_empty(),
        "no valid metric names given (expected one of: {}, all)",
        valid_names()
    );

    let options = CollectorOptions {
        enable_docker: selection.domains.contains(&MetricDomain::Docker),
        enable_kubernetes: selection.domains.contains(&MetricDomain::Kubernetes),
        kubeconfig_path: args.kubeconfig.clone(),
        remote_timeout: DEFAULT_REMOTE_TIMEOUT,
    };
    let aggregator = Aggregator::new(CollectorRegistry::for_domains(&selection.domains, &options));

    if !args.auto {
        return print_round(&aggregator).await;
    }

    let mut tick = tokio::time::interval(Duration::from_secs(args.refresh));
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            _ = tick.tick() => print_round(&aggregator).await?,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("stopping auto refresh");
                return Ok(());
            }
        }
    }
}

/// Collects every registered domain in order; failures are logged and skipped.
async fn print_round(aggregator: &Aggregator) -> anyhow::Result<()> {
    for domain in aggregator.domains() {
        if let Err(e) = aggregator.collect_domain(domain).await {
            tracing::warn!(domain = %domain, error = %e, "could not collect metric");
            continue;
        }
        if let Some(payload) = aggregator.get(domain).await {
            let mut stdout = std::io::stdout().lock();
            printer::write_payload(&mut stdout, &payload)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
