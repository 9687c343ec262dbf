// Storage / disk models

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionStat {
    pub device: String,
    pub mount_point: String,
    #[serde(rename = "fsType")]
    pub fs_type: String,
    pub removable: bool,
    pub read_only: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskUsage {
    pub path: String,
    pub total: u64,
    pub free: u64,
    pub used: u64,
    pub used_percent: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskStats {
    pub partitions: Vec<PartitionStat>,
    /// Usage keyed by mount path.
    pub usage: BTreeMap<String, DiskUsage>,
}
