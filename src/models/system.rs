// CPU, memory, host identity and current-user models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuStats {
    pub model: String,
    pub physical_cores: u32,
    pub logical_cores: u32,
    /// Utilisation of each logical core, in core order.
    pub per_core_percent: Vec<f64>,
    pub average_percent: f64,
    pub processes: Vec<CpuProcess>,
}

/// A process above the CPU noise floor during the sample window.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuProcess {
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f64,
    pub threads: u32,
    pub parent_pid: Option<u32>,
    pub children: Vec<u32>,
    pub user: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMemory {
    pub total: u64,
    pub available: u64,
    pub used: u64,
    pub free: u64,
    pub used_percent: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapMemory {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub used_percent: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryProcess {
    pub pid: u32,
    pub name: String,
    pub memory_percent: f64,
    pub resident_bytes: u64,
    pub virtual_bytes: u64,
    pub threads: u32,
    pub parent_pid: Option<u32>,
    pub user: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStats {
    #[serde(rename = "virtual")]
    pub virtual_memory: VirtualMemory,
    pub swap: SwapMemory,
    pub processes: Vec<MemoryProcess>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostStats {
    pub os: String,
    pub platform: String,
    pub platform_version: String,
    pub kernel_version: String,
    pub hostname: String,
    pub uptime_secs: u64,
    /// Seconds since the Unix epoch.
    pub boot_time: u64,
    pub load_avg_1: f64,
    pub load_avg_5: f64,
    pub load_avg_15: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub username: String,
    pub full_name: String,
    pub home_dir: String,
    pub uid: Option<String>,
    pub os: String,
    pub arch: String,
}

/// Percentage of `part` in `total`, 0 when `total` is 0.
pub fn percent_of(part: u64, total: u64) -> f64 {
    if total > 0 {
        (part as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}
