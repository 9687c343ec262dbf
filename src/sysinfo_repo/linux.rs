// Linux-specific helpers: /proc/cpuinfo, /etc/os-release, /etc/passwd, /proc/net sockets.

use crate::models::ConnectionStat;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Read first "model name" from /proc/cpuinfo (Linux). Prefer over sysinfo when it returns "cpu0" etc.
pub(super) fn read_cpu_model_linux() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/proc/cpuinfo").ok()?;
        for line in content.lines() {
            if line.starts_with("model name") {
                let name = line
                    .find(": ")
                    .map(|i| line[i + 2..].trim())
                    .filter(|s| !s.is_empty() && *s != "cpu0")?;
                return Some(name.to_string());
            }
        }
    }
    None
}

/// PRETTY_NAME from /etc/os-release, used when sysinfo has no long OS version.
pub(super) fn read_os_pretty_name_linux() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/etc/os-release").ok()?;
        content
            .lines()
            .find_map(|l| l.strip_prefix("PRETTY_NAME="))
            .map(|v| v.trim_matches('"').to_string())
            .filter(|v| !v.is_empty())
    }
    #[cfg(not(target_os = "linux"))]
    None
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct PasswdEntry {
    pub full_name: String,
    pub home: String,
}

/// Look up `username` in /etc/passwd (Unix only).
pub(super) fn read_passwd_entry(username: &str) -> Option<PasswdEntry> {
    #[cfg(unix)]
    {
        let content = std::fs::read_to_string("/etc/passwd").ok()?;
        parse_passwd(&content, username)
    }
    #[cfg(not(unix))]
    {
        let _ = username;
        None
    }
}

#[cfg_attr(not(unix), allow(dead_code))]
fn parse_passwd(content: &str, username: &str) -> Option<PasswdEntry> {
    content.lines().find_map(|line| {
        let fields: Vec<&str> = line.split(':').collect();
        if fields.len() < 6 || fields[0] != username {
            return None;
        }
        // GECOS: "Full Name,room,phone,..."
        let full_name = fields[4].split(',').next().unwrap_or_default().to_string();
        Some(PasswdEntry {
            full_name,
            home: fields[5].to_string(),
        })
    })
}

/// Reads the TCP and UDP socket tables. Empty on hosts without /proc/net.
pub(super) fn read_sockets_linux() -> std::io::Result<Vec<ConnectionStat>> {
    #[cfg(target_os = "linux")]
    {
        let mut out = Vec::new();
        for protocol in ["tcp", "tcp6", "udp", "udp6"] {
            let path = format!("/proc/net/{protocol}");
            match std::fs::read_to_string(&path) {
                Ok(content) => out.extend(parse_proc_net(&content, protocol)),
                // tcp6/udp6 are missing when IPv6 is disabled
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(out)
    }
    #[cfg(not(target_os = "linux"))]
    Ok(Vec::new())
}

/// Parses one /proc/net/{tcp,tcp6,udp,udp6} table. Malformed rows are skipped.
pub fn parse_proc_net(content: &str, protocol: &str) -> Vec<ConnectionStat> {
    let is_v6 = protocol.ends_with('6');
    let is_udp = protocol.starts_with("udp");
    content
        .lines()
        .skip(1)
        .filter_map(|line| {
            let mut cols = line.split_whitespace();
            let _slot = cols.next()?;
            let local = parse_socket_addr(cols.next()?, is_v6)?;
            let remote = parse_socket_addr(cols.next()?, is_v6)?;
            let state = u8::from_str_radix(cols.next()?, 16).ok()?;
            Some(ConnectionStat {
                protocol: protocol.to_string(),
                local_addr: local,
                remote_addr: remote,
                state: socket_state(state, is_udp).to_string(),
            })
        })
        .collect()
}

fn socket_state(code: u8, is_udp: bool) -> &'static str {
    if is_udp {
        // UDP only distinguishes connected sockets
        return if code == 0x01 { "ESTABLISHED" } else { "NONE" };
    }
    match code {
        0x01 => "ESTABLISHED",
        0x02 => "SYN_SENT",
        0x03 => "SYN_RECV",
        0x04 => "FIN_WAIT1",
        0x05 => "FIN_WAIT2",
        0x06 => "TIME_WAIT",
        0x07 => "CLOSE",
        0x08 => "CLOSE_WAIT",
        0x09 => "LAST_ACK",
        0x0A => "LISTEN",
        0x0B => "CLOSING",
        _ => "UNKNOWN",
    }
}

/// `0100007F:0035` -> `127.0.0.1:53`. Address words are in host byte order,
/// the port is plain hex.
fn parse_socket_addr(s: &str, is_v6: bool) -> Option<String> {
    let (addr, port) = s.split_once(':')?;
    let port = u16::from_str_radix(port, 16).ok()?;
    if is_v6 {
        if addr.len() != 32 {
            return None;
        }
        let mut bytes = [0u8; 16];
        for (i, chunk) in bytes.chunks_mut(4).enumerate() {
            let word = u32::from_str_radix(addr.get(i * 8..i * 8 + 8)?, 16).ok()?;
            chunk.copy_from_slice(&word.to_ne_bytes());
        }
        Some(format!("[{}]:{}", Ipv6Addr::from(bytes), port))
    } else {
        let word = u32::from_str_radix(addr, 16).ok()?;
        Some(format!("{}:{}", Ipv4Addr::from(word.to_ne_bytes()), port))
    }
}
