// Section/metric/value rows shared by the CSV and PDF reports

use crate::models::{MetricDomain, MetricPayload, Snapshot};

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub section: &'static str,
    pub metric: String,
    pub value: String,
}

fn row(section: &'static str, metric: impl Into<String>, value: String) -> SummaryRow {
    SummaryRow {
        section,
        metric: metric.into(),
        value,
    }
}

fn gib(bytes: u64) -> f64 {
    bytes as f64 / GIB
}

/// CPU, memory and per-mount disk rows. Absent domains contribute nothing;
/// disk mounts come out sorted by path.
pub fn summary_rows(snapshot: &Snapshot) -> Vec<SummaryRow> {
    let mut rows = Vec::new();

    if let Some(MetricPayload::Cpu(cpu)) = snapshot.get(&MetricDomain::Cpu) {
        rows.push(row("CPU", "Average Load", format!("{:.2}%", cpu.average_percent)));
        rows.push(row("CPU", "Physical Cores", cpu.physical_cores.to_string()));
        rows.push(row("CPU", "Logical Cores", cpu.logical_cores.to_string()));
    }

    if let Some(MetricPayload::Memory(mem)) = snapshot.get(&MetricDomain::Memory) {
        let vm = &mem.virtual_memory;
        rows.push(row("Memory", "Used Percentage", format!("{:.2}%", vm.used_percent)));
        rows.push(row("Memory", "Total", format!("{:.2} GB", gib(vm.total))));
        rows.push(row("Memory", "Used", format!("{:.2} GB", gib(vm.used))));
    }

    if let Some(MetricPayload::Disk(disk)) = snapshot.get(&MetricDomain::Disk) {
        // BTreeMap iteration is already path-ordered
        for (path, usage) in &disk.usage {
            rows.push(row(
                "Disk",
                path.clone(),
                format!(
                    "{:.2} GB / {:.2} GB ({:.1}%)",
                    gib(usage.used),
                    gib(usage.total),
                    usage.used_percent
                ),
            ));
        }
    }

    rows
}
