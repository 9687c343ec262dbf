// Host-local stats via sysinfo: cpu, memory, disk, network, host and current user

mod linux;

use crate::error::CollectError;
use crate::models::*;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use sysinfo::{Disks, Networks, ProcessRefreshKind, ProcessesToUpdate, System, Users};
use tracing::instrument;

pub use linux::parse_proc_net;

/// Processes below this CPU share are noise for the CPU table.
const CPU_PROCESS_FLOOR_PERCENT: f64 = 0.9;
/// Processes below this share of RAM are left out of the memory table.
const MEMORY_PROCESS_FLOOR_PERCENT: f64 = 1.0;

/// Owns the sysinfo sampling state. Each domain has its own lock so that a
/// concurrent round never serializes cpu sampling behind disk or network refreshes.
pub struct SysinfoRepo {
    cpu: Arc<Mutex<System>>,
    memory: Arc<Mutex<System>>,
    disks: Arc<Mutex<Disks>>,
    networks: Arc<Mutex<Networks>>,
    users: Arc<Mutex<Users>>,
}

impl Default for SysinfoRepo {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned(what: &str, e: impl std::fmt::Display) -> CollectError {
    CollectError::unavailable(format!("sysinfo {what} lock poisoned: {e}"))
}

fn user_name(users: &Users, process: &sysinfo::Process) -> String {
    process
        .user_id()
        .and_then(|uid| users.get_user_by_id(uid))
        .map(|u| u.name().to_string())
        .unwrap_or_default()
}

fn thread_count(process: &sysinfo::Process) -> u32 {
    process.tasks().map(|t| t.len()).unwrap_or(1).max(1) as u32
}

impl SysinfoRepo {
    pub fn new() -> Self {
        let mut cpu = System::new();
        cpu.refresh_cpu_all();
        Self {
            cpu: Arc::new(Mutex::new(cpu)),
            memory: Arc::new(Mutex::new(System::new())),
            disks: Arc::new(Mutex::new(Disks::new_with_refreshed_list())),
            networks: Arc::new(Mutex::new(Networks::new_with_refreshed_list())),
            users: Arc::new(Mutex::new(Users::new_with_refreshed_list())),
        }
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "get_cpu_stats"))]
    pub async fn get_cpu_stats(&self) -> Result<CpuStats, CollectError> {
        let sys = self.cpu.clone();
        let users = self.users.clone();
        tokio::task::spawn_blocking(move || {
            let mut sys = sys.lock().map_err(|e| poisoned("cpu", e))?;
            let refresh = ProcessRefreshKind::everything();
            sys.refresh_cpu_all();
            sys.refresh_processes_specifics(ProcessesToUpdate::All, true, refresh);
            std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
            sys.refresh_cpu_all();
            sys.refresh_processes_specifics(ProcessesToUpdate::All, true, refresh);

            let per_core_percent: Vec<f64> = sys
                .cpus()
                .iter()
                .map(|c| (c.cpu_usage() as f64).clamp(0.0, 100.0))
                .collect();
            let average_percent = if per_core_percent.is_empty() {
                0.0
            } else {
                per_core_percent.iter().sum::<f64>() / per_core_percent.len() as f64
            };
            let model = linux::read_cpu_model_linux()
                .or_else(|| {
                    sys.cpus()
                        .first()
                        .map(|c| c.brand().trim().to_string())
                        .filter(|s| !s.is_empty())
                })
                .unwrap_or_else(|| "Unknown".into());

            let mut children: HashMap<u32, Vec<u32>> = HashMap::new();
            for (pid, p) in sys.processes() {
                if let Some(parent) = p.parent() {
                    children.entry(parent.as_u32()).or_default().push(pid.as_u32());
                }
            }

            let users = users.lock().map_err(|e| poisoned("users", e))?;
            let mut processes: Vec<CpuProcess> = sys
                .processes()
                .iter()
                .filter(|(_, p)| p.cpu_usage() as f64 > CPU_PROCESS_FLOOR_PERCENT)
                .map(|(pid, p)| {
                    let mut kids = children.get(&pid.as_u32()).cloned().unwrap_or_default();
                    kids.sort_unstable();
                    CpuProcess {
                        pid: pid.as_u32(),
                        name: p.name().to_string_lossy().into_owned(),
                        cpu_percent: p.cpu_usage() as f64,
                        threads: thread_count(p),
                        parent_pid: p.parent().map(|pp| pp.as_u32()),
                        children: kids,
                        user: user_name(&users, p),
                    }
                })
                .collect();
            processes.sort_by(|a, b| b.cpu_percent.total_cmp(&a.cpu_percent));

            Ok(CpuStats {
                model,
                physical_cores: System::physical_core_count().unwrap_or(0) as u32,
                logical_cores: sys.cpus().len() as u32,
                per_core_percent,
                average_percent,
                processes,
            })
        })
        .await?
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "get_memory_stats"))]
    pub async fn get_memory_stats(&self) -> Result<MemoryStats, CollectError> {
        let sys = self.memory.clone();
        let users = self.users.clone();
        tokio::task::spawn_blocking(move || {
            let mut sys = sys.lock().map_err(|e| poisoned("memory", e))?;
            sys.refresh_memory();
            sys.refresh_processes_specifics(
                ProcessesToUpdate::All,
                true,
                ProcessRefreshKind::everything(),
            );

            let total = sys.total_memory();
            if total == 0 {
                return Err(CollectError::unavailable("total memory reported as 0"));
            }
            let available = sys.available_memory();
            let used = total.saturating_sub(available);
            let virtual_memory = VirtualMemory {
                total,
                available,
                used,
                free: sys.free_memory(),
                used_percent: percent_of(used, total),
            };
            let swap = SwapMemory {
                total: sys.total_swap(),
                used: sys.used_swap(),
                free: sys.free_swap(),
                used_percent: percent_of(sys.used_swap(), sys.total_swap()),
            };

            let users = users.lock().map_err(|e| poisoned("users", e))?;
            let mut processes: Vec<MemoryProcess> = sys
                .processes()
                .iter()
                .filter_map(|(pid, p)| {
                    let parent = p.parent()?;
                    let user = user_name(&users, p);
                    if user.is_empty() || user == "root" || user.starts_with('_') {
                        return None;
                    }
                    let memory_percent = percent_of(p.memory(), total);
                    if memory_percent <= MEMORY_PROCESS_FLOOR_PERCENT {
                        return None;
                    }
                    Some(MemoryProcess {
                        pid: pid.as_u32(),
                        name: p.name().to_string_lossy().into_owned(),
                        memory_percent,
                        resident_bytes: p.memory(),
                        virtual_bytes: p.virtual_memory(),
                        threads: thread_count(p),
                        parent_pid: Some(parent.as_u32()),
                        user,
                    })
                })
                .collect();
            processes.sort_by(|a, b| b.memory_percent.total_cmp(&a.memory_percent));

            Ok(MemoryStats {
                virtual_memory,
                swap,
                processes,
            })
        })
        .await?
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "get_disk_stats"))]
    pub async fn get_disk_stats(&self) -> Result<DiskStats, CollectError> {
        let disks = self.disks.clone();
        tokio::task::spawn_blocking(move || {
            let mut disks_guard = disks.lock().map_err(|e| poisoned("disks", e))?;
            disks_guard.refresh(true);
            if disks_guard.list().is_empty() {
                return Err(CollectError::unavailable("no mounted partitions found"));
            }

            let partitions: Vec<PartitionStat> = disks_guard
                .list()
                .iter()
                .map(|d| PartitionStat {
                    device: d.name().to_string_lossy().into_owned(),
                    mount_point: d.mount_point().to_string_lossy().into_owned(),
                    fs_type: d.file_system().to_string_lossy().into_owned(),
                    removable: d.is_removable(),
                    read_only: d.is_read_only(),
                })
                .collect();

            let usage: BTreeMap<String, DiskUsage> = disks_guard
                .list()
                .iter()
                .map(|d| {
                    let path = d.mount_point().to_string_lossy().into_owned();
                    let total = d.total_space();
                    let free = d.available_space();
                    let used = total.saturating_sub(free);
                    (
                        path.clone(),
                        DiskUsage {
                            path,
                            total,
                            free,
                            used,
                            used_percent: percent_of(used, total),
                        },
                    )
                })
                .collect();

            Ok(DiskStats { partitions, usage })
        })
        .await?
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "get_network_stats"))]
    pub async fn get_network_stats(&self) -> Result<NetworkStats, CollectError> {
        let networks = self.networks.clone();
        tokio::task::spawn_blocking(move || {
            let mut networks_guard = networks.lock().map_err(|e| poisoned("networks", e))?;
            networks_guard.refresh(true);
            let mut interfaces: Vec<InterfaceIo> = networks_guard
                .list()
                .iter()
                .map(|(name, data)| InterfaceIo {
                    name: name.clone(),
                    bytes_sent: data.total_transmitted(),
                    bytes_recv: data.total_received(),
                    packets_sent: data.total_packets_transmitted(),
                    packets_recv: data.total_packets_received(),
                    errors_in: data.total_errors_on_received(),
                    errors_out: data.total_errors_on_transmitted(),
                })
                .collect();
            interfaces.sort_by(|a, b| a.name.cmp(&b.name));
            drop(networks_guard);

            let sockets = linux::read_sockets_linux()
                .map_err(|e| CollectError::unavailable(format!("reading socket table: {e}")))?;
            let mut stats = summarize_sockets(sockets);
            stats.os = std::env::consts::OS.to_string();
            stats.interfaces = interfaces;
            Ok(stats)
        })
        .await?
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "get_host_stats"))]
    pub async fn get_host_stats(&self) -> Result<HostStats, CollectError> {
        tokio::task::spawn_blocking(|| {
            let load = System::load_average();
            Ok(HostStats {
                os: System::name().unwrap_or_else(|| std::env::consts::OS.into()),
                platform: System::long_os_version()
                    .or_else(linux::read_os_pretty_name_linux)
                    .unwrap_or_default(),
                platform_version: System::os_version().unwrap_or_default(),
                kernel_version: System::kernel_version().unwrap_or_default(),
                hostname: System::host_name().unwrap_or_default(),
                uptime_secs: System::uptime(),
                boot_time: System::boot_time(),
                load_avg_1: load.one,
                load_avg_5: load.five,
                load_avg_15: load.fifteen,
            })
        })
        .await?
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "get_user_stats"))]
    pub async fn get_user_stats(&self) -> Result<UserStats, CollectError> {
        let users = self.users.clone();
        tokio::task::spawn_blocking(move || {
            let pid = sysinfo::get_current_pid().map_err(CollectError::unavailable)?;
            let mut sys = System::new();
            sys.refresh_processes_specifics(
                ProcessesToUpdate::Some(&[pid]),
                false,
                ProcessRefreshKind::everything(),
            );
            let uid = sys.process(pid).and_then(|p| p.user_id()).cloned();

            let mut users = users.lock().map_err(|e| poisoned("users", e))?;
            users.refresh();
            let from_table = uid
                .as_ref()
                .and_then(|uid| users.get_user_by_id(uid))
                .map(|u| u.name().to_string());
            let username = from_table
                .or_else(|| std::env::var("USER").ok())
                .or_else(|| std::env::var("USERNAME").ok())
                .ok_or_else(|| CollectError::unavailable("cannot determine current user"))?;

            let passwd = linux::read_passwd_entry(&username);
            let home_dir = passwd
                .as_ref()
                .map(|p| p.home.clone())
                .filter(|h| !h.is_empty())
                .or_else(|| std::env::var("HOME").ok())
                .or_else(|| std::env::var("USERPROFILE").ok())
                .unwrap_or_default();

            Ok(UserStats {
                full_name: passwd.map(|p| p.full_name).unwrap_or_default(),
                home_dir,
                uid: uid.map(|u| u.to_string()),
                os: std::env::consts::OS.to_string(),
                arch: std::env::consts::ARCH.to_string(),
                username,
            })
        })
        .await?
    }
}

/// Splits a socket table into listening sockets and connections. Listening TCP
/// sockets and unconnected UDP sockets count as listening; everything else is a
/// connection and counts once towards the total.
pub fn summarize_sockets(sockets: Vec<ConnectionStat>) -> NetworkStats {
    let mut stats = NetworkStats::default();
    for s in sockets {
        match s.state.as_str() {
            "LISTEN" | "NONE" => stats.listening_sockets += 1,
            state => {
                if state == "ESTABLISHED" {
                    stats.established_connections += 1;
                }
                stats.total_connections += 1;
                stats.connections.push(s);
            }
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sock(state: &str) -> ConnectionStat {
        ConnectionStat {
            protocol: "tcp".into(),
            local_addr: "127.0.0.1:1".into(),
            remote_addr: "127.0.0.1:2".into(),
            state: state.into(),
        }
    }

    #[test]
    fn summarize_counts_each_connection_once() {
        let stats = summarize_sockets(vec![
            sock("LISTEN"),
            sock("ESTABLISHED"),
            sock("ESTABLISHED"),
            sock("TIME_WAIT"),
            sock("NONE"),
        ]);
        assert_eq!(stats.listening_sockets, 2);
        assert_eq!(stats.established_connections, 2);
        assert_eq!(stats.total_connections, 3);
        assert_eq!(stats.connections.len(), 3);
        assert!(stats.connections.iter().all(|c| c.state != "LISTEN"));
    }

    #[test]
    fn summarize_empty_table() {
        let stats = summarize_sockets(vec![]);
        assert_eq!(stats.total_connections, 0);
        assert_eq!(stats.established_connections, 0);
        assert!(stats.connections.is_empty());
    }

    #[tokio::test]
    async fn host_and_user_stats_are_populated() {
        let repo = SysinfoRepo::new();
        let host = repo.get_host_stats().await.unwrap();
        assert!(!host.os.is_empty());
        let user = repo.get_user_stats().await;
        if let Ok(user) = user {
            assert!(!user.username.is_empty());
            assert_eq!(user.arch, std::env::consts::ARCH);
        }
    }
}
