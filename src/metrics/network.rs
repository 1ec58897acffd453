//! Network counters from /proc/net/dev and TCP sockets from /proc/net/tcp{,6}.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::Path;

/// Cumulative interface counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IoCountersStat {
    /// Interface name, or `all` for the combined record
    pub name: String,
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    pub packets_sent: u64,
    pub packets_recv: u64,
}

pub const COMBINED_NIC_NAME: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    Inet,
    Inet6,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionKind {
    Tcp,
    Tcp4,
    Tcp6,
}

impl ConnectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionKind::Tcp => "tcp",
            ConnectionKind::Tcp4 => "tcp4",
            ConnectionKind::Tcp6 => "tcp6",
        }
    }

    /// procfs tables backing this kind, relative to the proc root
    pub fn tables(&self) -> &'static [(&'static str, AddressFamily)] {
        match self {
            ConnectionKind::Tcp => &[("net/tcp", AddressFamily::Inet), ("net/tcp6", AddressFamily::Inet6)],
            ConnectionKind::Tcp4 => &[("net/tcp", AddressFamily::Inet)],
            ConnectionKind::Tcp6 => &[("net/tcp6", AddressFamily::Inet6)],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocketAddr {
    pub ip: String,
    pub port: u16,
}

/// A TCP socket and, when resolvable, the process holding it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionStat {
    pub family: AddressFamily,
    pub kind: ConnectionKind,
    pub local: SocketAddr,
    pub remote: SocketAddr,
    pub status: String,
    pub pid: Option<u32>,
}

pub const STATUS_ESTABLISHED: &str = "ESTABLISHED";

/// One row of /proc/net/tcp before owner resolution
#[derive(Debug, Clone, PartialEq)]
pub struct RawSocket {
    pub family: AddressFamily,
    pub local: SocketAddr,
    pub remote: SocketAddr,
    pub status: &'static str,
    pub inode: u64,
}

impl RawSocket {
    pub fn into_connection(self, kind: ConnectionKind, owners: &HashMap<u64, u32>) -> ConnectionStat {
        ConnectionStat {
            family: self.family,
            kind,
            local: self.local,
            remote: self.remote,
            status: self.status.to_string(),
            pid: owners.get(&self.inode).copied(),
        }
    }
}

/// Parses /proc/net/dev. Loopback is kept.
pub fn parse_net_dev(content: &str) -> Vec<IoCountersStat> {
    let mut counters = Vec::new();

    for line in content.lines().skip(2) {
        // Skip header lines
        let Some((name, values)) = line.split_once(':') else {
            continue;
        };
        let parts: Vec<u64> = values
            .split_whitespace()
            .map(|s| s.parse().unwrap_or(0))
            .collect();
        if parts.len() < 16 {
            continue;
        }

        counters.push(IoCountersStat {
            name: name.trim().to_string(),
            bytes_recv: parts[0],
            packets_recv: parts[1],
            bytes_sent: parts[8],
            packets_sent: parts[9],
        });
    }

    counters
}

/// Sums all interfaces into a single `all` record.
pub fn combine(counters: &[IoCountersStat]) -> IoCountersStat {
    counters.iter().fold(
        IoCountersStat {
            name: COMBINED_NIC_NAME.to_string(),
            ..Default::default()
        },
        |mut acc, c| {
            acc.bytes_sent += c.bytes_sent;
            acc.bytes_recv += c.bytes_recv;
            acc.packets_sent += c.packets_sent;
            acc.packets_recv += c.packets_recv;
            acc
        },
    )
}

fn tcp_state_name(hex: &str) -> &'static str {
    match u8::from_str_radix(hex, 16).unwrap_or(0) {
        0x01 => STATUS_ESTABLISHED,
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
        0x0C => "NEW_SYN_RECV",
        _ => "UNKNOWN",
    }
}

/// Decodes `ADDR:PORT` as printed by the kernel: the address is the raw
/// in-memory words in host byte order, the port is plain hex.
fn decode_addr(field: &str, family: AddressFamily) -> Option<SocketAddr> {
    let (addr, port) = field.split_once(':')?;
    let port = u16::from_str_radix(port, 16).ok()?;

    let ip = match family {
        AddressFamily::Inet => {
            let word = u32::from_str_radix(addr, 16).ok()?;
            IpAddr::V4(Ipv4Addr::from(word.to_ne_bytes()))
        }
        AddressFamily::Inet6 => {
            if addr.len() != 32 {
                return None;
            }
            let mut octets = [0u8; 16];
            for (i, chunk) in octets.chunks_mut(4).enumerate() {
                let word = u32::from_str_radix(addr.get(i * 8..i * 8 + 8)?, 16).ok()?;
                chunk.copy_from_slice(&word.to_ne_bytes());
            }
            IpAddr::V6(Ipv6Addr::from(octets))
        }
    };

    Some(SocketAddr {
        ip: ip.to_string(),
        port,
    })
}

pub fn parse_tcp_table(content: &str, family: AddressFamily) -> Vec<RawSocket> {
    content
        .lines()
        .skip(1)
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 10 {
                return None;
            }
            Some(RawSocket {
                family,
                local: decode_addr(parts[1], family)?,
                remote: decode_addr(parts[2], family)?,
                status: tcp_state_name(parts[3]),
                inode: parts[9].parse().ok()?,
            })
        })
        .collect()
}

/// Maps socket inodes to the pid holding them by walking `<root>/<pid>/fd`.
/// Processes whose descriptors cannot be read are skipped.
pub fn socket_owners(root: &Path) -> HashMap<u64, u32> {
    let mut owners = HashMap::new();
    let Ok(entries) = fs::read_dir(root) else {
        return owners;
    };

    for entry in entries.flatten() {
        let Some(pid) = entry.file_name().to_str().and_then(|s| s.parse::<u32>().ok()) else {
            continue;
        };
        let Ok(fds) = fs::read_dir(entry.path().join("fd")) else {
            continue;
        };
        for fd in fds.flatten() {
            let Ok(target) = fs::read_link(fd.path()) else {
                continue;
            };
            if let Some(inode) = socket_inode(&target.to_string_lossy()) {
                owners.entry(inode).or_insert(pid);
            }
        }
    }

    owners
}

fn socket_inode(link: &str) -> Option<u64> {
    link.strip_prefix("socket:[")?.strip_suffix(']')?.parse().ok()
}
