// Application config: toml file with serde defaults, validated on load

use crate::collectors::CollectorOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file picked up from the working directory when CONFIG_FILE is unset.
pub const DEFAULT_CONFIG_FILE: &str = "sysmon.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub collection: CollectionConfig,
    pub docker: DockerConfig,
    pub kubernetes: KubernetesConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    /// Seconds between background refresh rounds.
    pub refresh_interval_secs: u64,
    /// Upper bound for one docker or kubernetes collection.
    pub remote_timeout_secs: u64,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 30,
            remote_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DockerConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KubernetesConfig {
    pub enabled: bool,
    /// Explicit kubeconfig; the default kubeconfig resolution applies when unset.
    pub kubeconfig_path: Option<PathBuf>,
}

impl AppConfig {
    /// `$CONFIG_FILE` (must exist), else `sysmon.toml` when present, else defaults.
    pub fn load() -> anyhow::Result<Self> {
        if let Ok(path) = std::env::var("CONFIG_FILE") {
            return Self::load_from_path(Path::new(&path));
        }
        let fallback = Path::new(DEFAULT_CONFIG_FILE);
        if fallback.exists() {
            return Self::load_from_path(fallback);
        }
        let config = Self::default();
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading config {}: {}", path.display(), e))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.server.host.trim().is_empty(),
            "server.host must be non-empty"
        );
        anyhow::ensure!(
            self.collection.refresh_interval_secs > 0,
            "collection.refresh_interval_secs must be > 0, got {}",
            self.collection.refresh_interval_secs
        );
        anyhow::ensure!(
            self.collection.remote_timeout_secs > 0,
            "collection.remote_timeout_secs must be > 0, got {}",
            self.collection.remote_timeout_secs
        );
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.collection.refresh_interval_secs)
    }

    /// Kubernetes counts as enabled when a kubeconfig path is configured.
    pub fn collector_options(&self) -> CollectorOptions {
        CollectorOptions {
            enable_docker: self.docker.enabled,
            enable_kubernetes: self.kubernetes.enabled || self.kubernetes.kubeconfig_path.is_some(),
            kubeconfig_path: self.kubernetes.kubeconfig_path.clone(),
            remote_timeout: Duration::from_secs(self.collection.remote_timeout_secs),
        }
    }
}
