// Plain-text tables for the get-metrics command

use crate::models::*;
use bytesize::ByteSize;
use std::io::{self, Write};

/// `1536` -> `1.5 KiB`.
pub fn format_bytes(bytes: u64) -> String {
    ByteSize(bytes).to_string()
}

fn format_signed_bytes(bytes: i64) -> String {
    if bytes < 0 {
        "n/a".to_string()
    } else {
        format_bytes(bytes as u64)
    }
}

/// Column-aligned table; widths are computed from the widest cell.
struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Table {
    fn new(headers: &[&'static str]) -> Self {
        Self {
            headers: headers.to_vec(),
            rows: Vec::new(),
        }
    }

    fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    fn write(&self, out: &mut impl Write) -> io::Result<()> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.len()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(cell.chars().count());
                }
            }
        }
        let line = |cells: Vec<&str>| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{c:<width$}", width = *w))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };
        writeln!(out, "{}", line(self.headers.clone()))?;
        for row in &self.rows {
            writeln!(out, "{}", line(row.iter().map(String::as_str).collect()))?;
        }
        Ok(())
    }
}

fn summary(out: &mut impl Write, pairs: &[(&str, String)]) -> io::Result<()> {
    let width = pairs.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    for (k, v) in pairs {
        writeln!(out, "{:<width$}  {}", format!("{k}:"), v, width = width + 1)?;
    }
    Ok(())
}

fn heading(out: &mut impl Write, title: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "== {title} ==")
}

/// Prints one domain's payload as a summary block plus its item tables.
pub fn write_payload(out: &mut impl Write, payload: &MetricPayload) -> io::Result<()> {
    heading(out, &payload.domain().as_str().to_uppercase())?;
    match payload {
        MetricPayload::Cpu(cpu) => write_cpu(out, cpu),
        MetricPayload::Memory(mem) => write_memory(out, mem),
        MetricPayload::Disk(disk) => write_disk(out, disk),
        MetricPayload::Network(net) => write_network(out, net),
        MetricPayload::Host(host) => write_host(out, host),
        MetricPayload::User(user) => write_user(out, user),
        MetricPayload::Docker(docker) => write_docker(out, docker),
        MetricPayload::Kubernetes(kube) => write_kubernetes(out, kube),
    }
}

fn write_cpu(out: &mut impl Write, cpu: &CpuStats) -> io::Result<()> {
    summary(
        out,
        &[
            ("Model", cpu.model.clone()),
            ("Physical cores", cpu.physical_cores.to_string()),
            ("Logical cores", cpu.logical_cores.to_string()),
            ("Average usage", format!("{:.2}%", cpu.average_percent)),
        ],
    )?;
    writeln!(out)?;
    let mut cores = Table::new(&["CORE", "USAGE"]);
    for (i, p) in cpu.per_core_percent.iter().enumerate() {
        cores.row(vec![i.to_string(), format!("{p:.2}%")]);
    }
    cores.write(out)?;
    if !cpu.processes.is_empty() {
        writeln!(out)?;
        let mut procs = Table::new(&["PID", "NAME", "CPU", "THREADS", "PPID", "USER"]);
        for p in &cpu.processes {
            procs.row(vec![
                p.pid.to_string(),
                p.name.clone(),
                format!("{:.2}%", p.cpu_percent),
                p.threads.to_string(),
                p.parent_pid.map(|p| p.to_string()).unwrap_or_default(),
                p.user.clone(),
            ]);
        }
        procs.write(out)?;
    }
    Ok(())
}

fn write_memory(out: &mut impl Write, mem: &MemoryStats) -> io::Result<()> {
    let vm = &mem.virtual_memory;
    summary(
        out,
        &[
            ("Total", format_bytes(vm.total)),
            ("Available", format_bytes(vm.available)),
            ("Used", format!("{} ({:.2}%)", format_bytes(vm.used), vm.used_percent)),
            ("Free", format_bytes(vm.free)),
            ("Swap total", format_bytes(mem.swap.total)),
            (
                "Swap used",
                format!("{} ({:.2}%)", format_bytes(mem.swap.used), mem.swap.used_percent),
            ),
        ],
    )?;
    if !mem.processes.is_empty() {
        writeln!(out)?;
        let mut procs = Table::new(&["PID", "NAME", "MEM", "RSS", "VIRT", "USER"]);
        for p in &mem.processes {
            procs.row(vec![
                p.pid.to_string(),
                p.name.clone(),
                format!("{:.2}%", p.memory_percent),
                format_bytes(p.resident_bytes),
                format_bytes(p.virtual_bytes),
                p.user.clone(),
            ]);
        }
        procs.write(out)?;
    }
    Ok(())
}

fn write_disk(out: &mut impl Write, disk: &DiskStats) -> io::Result<()> {
    let mut parts = Table::new(&["DEVICE", "MOUNT", "FS", "TOTAL", "USED", "FREE", "USE%"]);
    for p in &disk.partitions {
        let usage = disk.usage.get(&p.mount_point);
        parts.row(vec![
            p.device.clone(),
            p.mount_point.clone(),
            p.fs_type.clone(),
            usage.map(|u| format_bytes(u.total)).unwrap_or_default(),
            usage.map(|u| format_bytes(u.used)).unwrap_or_default(),
            usage.map(|u| format_bytes(u.free)).unwrap_or_default(),
            usage
                .map(|u| format!("{:.1}%", u.used_percent))
                .unwrap_or_default(),
        ]);
    }
    parts.write(out)
}

fn write_network(out: &mut impl Write, net: &NetworkStats) -> io::Result<()> {
    summary(
        out,
        &[
            ("OS", net.os.clone()),
            ("Established", net.established_connections.to_string()),
            ("Connections", net.total_connections.to_string()),
            ("Listening", net.listening_sockets.to_string()),
        ],
    )?;
    writeln!(out)?;
    let mut ifaces = Table::new(&["INTERFACE", "SENT", "RECV", "PKTS OUT", "PKTS IN", "ERR IN", "ERR OUT"]);
    for i in &net.interfaces {
        ifaces.row(vec![
            i.name.clone(),
            format_bytes(i.bytes_sent),
            format_bytes(i.bytes_recv),
            i.packets_sent.to_string(),
            i.packets_recv.to_string(),
            i.errors_in.to_string(),
            i.errors_out.to_string(),
        ]);
    }
    ifaces.write(out)
}

fn write_host(out: &mut impl Write, host: &HostStats) -> io::Result<()> {
    summary(
        out,
        &[
            ("Hostname", host.hostname.clone()),
            ("OS", host.os.clone()),
            ("Platform", format!("{} {}", host.platform, host.platform_version)),
            ("Kernel", host.kernel_version.clone()),
            ("Uptime", format_uptime(host.uptime_secs)),
            (
                "Load average",
                format!(
                    "{:.2} {:.2} {:.2}",
                    host.load_avg_1, host.load_avg_5, host.load_avg_15
                ),
            ),
        ],
    )
}

fn format_uptime(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3600;
    let minutes = (secs % 3600) / 60;
    format!("{days}d {hours}h {minutes}m")
}

fn write_user(out: &mut impl Write, user: &UserStats) -> io::Result<()> {
    summary(
        out,
        &[
            ("Username", user.username.clone()),
            ("Full name", user.full_name.clone()),
            ("Home", user.home_dir.clone()),
            ("UID", user.uid.clone().unwrap_or_default()),
            ("OS", user.os.clone()),
            ("Arch", user.arch.clone()),
        ],
    )
}

fn write_docker(out: &mut impl Write, d: &DockerStats) -> io::Result<()> {
    summary(
        out,
        &[
            ("Engine", d.engine_name.clone()),
            ("Platform", d.platform_name.clone()),
            ("API version", d.api_version.clone()),
            ("OS/Arch", format!("{}/{}", d.os, d.arch)),
            ("CPUs", d.ncpu.to_string()),
            ("Memory", format_signed_bytes(d.mem_total)),
            (
                "Containers",
                format!(
                    "{} ({} running, {} paused, {} stopped)",
                    d.total_containers, d.containers_running, d.containers_paused, d.containers_stopped
                ),
            ),
            ("Images", d.total_images.to_string()),
            ("Volumes", d.total_volumes.to_string()),
            ("Containers disk", format_signed_bytes(d.containers_disk_usage)),
            ("Images disk", format_signed_bytes(d.images_disk_usage)),
        ],
    )?;
    writeln!(out)?;
    let mut containers = Table::new(&["ID", "NAME", "IMAGE", "STATE", "STATUS", "CPU", "MEM"]);
    for c in &d.containers {
        let usage = d.container_usage.get(&c.id);
        containers.row(vec![
            c.id.chars().take(12).collect(),
            c.names.first().cloned().unwrap_or_default(),
            c.image.clone(),
            format!("{:?}", c.state).to_lowercase(),
            c.status.clone(),
            usage
                .map(|u| format!("{:.2}%", u.cpu_percent))
                .unwrap_or_default(),
            usage
                .map(|u| format_bytes(u.memory_usage_bytes))
                .unwrap_or_default(),
        ]);
    }
    containers.write(out)?;
    writeln!(out)?;
    let mut images = Table::new(&["IMAGE", "TAGS", "SIZE", "CONTAINERS"]);
    for i in &d.images {
        images.row(vec![
            i.id.trim_start_matches("sha256:").chars().take(12).collect(),
            i.tags.join(","),
            format_signed_bytes(i.size_bytes),
            i.containers.to_string(),
        ]);
    }
    images.write(out)
}

fn write_kubernetes(out: &mut impl Write, k: &KubernetesStats) -> io::Result<()> {
    summary(
        out,
        &[
            ("Namespaces", k.namespaces.len().to_string()),
            ("Nodes", k.nodes.len().to_string()),
            ("Deployments", k.deployments.len().to_string()),
            ("Pods", k.pods.len().to_string()),
            ("Services", k.services.len().to_string()),
            ("Persistent volumes", k.persistent_volumes.len().to_string()),
            ("Volume claims", k.persistent_volume_claims.len().to_string()),
        ],
    )?;
    writeln!(out)?;
    let mut nodes = Table::new(&["NODE", "ADDRESSES", "SCHEDULABLE"]);
    for n in &k.nodes {
        nodes.row(vec![
            n.name.clone(),
            n.addresses
                .iter()
                .map(|a| a.address.as_str())
                .collect::<Vec<_>>()
                .join(","),
            (!n.unschedulable).to_string(),
        ]);
    }
    nodes.write(out)?;
    writeln!(out)?;
    let mut pods = Table::new(&["POD", "NAMESPACE", "PHASE", "NODE", "IP"]);
    for p in k.pods.iter().take(10) {
        pods.row(vec![
            p.name.clone(),
            p.namespace.clone(),
            p.phase.clone(),
            p.node_name.clone(),
            p.pod_ip.clone(),
        ]);
    }
    pods.write(out)?;
    if k.pods.len() > 10 {
        writeln!(out, "... and {} more pods", k.pods.len() - 10)?;
    }
    Ok(())
}
