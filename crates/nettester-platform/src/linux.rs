//! Linux implementation of the platform services.
//!
//! Interfaces and rfkill state come from sysfs; addresses, link state, power
//! save and scans go through the `ip` and `iw` tools; reachability uses the
//! resolver and `ping`.

use std::fs;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use chrono::{Datelike, Local, Timelike};

use nettester_types::error::{NetTesterError, Result};

use crate::services::{
    AccessPoint, AddressFamily, AddressRecord, Interface, InterfaceInfo, InterfaceKind,
    InterfaceService, PowerService, ProcessOutput, ProcessService, RadioService, RadioState,
    ReachabilityService, SystemTime, TimeService,
};

const NULL_MAC: &str = "00:00:00:00:00:00";

/// Platform services for a Linux device (desktop or Raspberry Pi).
pub struct LinuxPlatform {
    sys_class_net: PathBuf,
    ping_timeout: Duration,
}

impl LinuxPlatform {
    pub fn new() -> Self {
        Self::with_sysfs_root("/sys/class/net")
    }

    /// Use a different `/sys/class/net` directory.
    pub fn with_sysfs_root(root: impl Into<PathBuf>) -> Self {
        Self {
            sys_class_net: root.into(),
            ping_timeout: Duration::from_secs(2),
        }
    }

    fn iface_dir(&self, iface: &str) -> PathBuf {
        self.sys_class_net.join(iface)
    }

    fn rfkill_dirs(&self, iface: &str) -> Result<Vec<PathBuf>> {
        let phy = self.iface_dir(iface).join("phy80211");
        if !phy.exists() {
            return Err(NetTesterError::Platform(format!(
                "{iface}: not a wireless device"
            )));
        }
        let mut dirs = Vec::new();
        for entry in fs::read_dir(&phy)? {
            let entry = entry?;
            if entry.file_name().to_string_lossy().starts_with("rfkill") {
                dirs.push(entry.path());
            }
        }
        Ok(dirs)
    }
}

impl Default for LinuxPlatform {
    fn default() -> Self {
        Self::new()
    }
}

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok().map(|s| s.trim().to_string())
}

/// Run a tool and fail unless it exits successfully.
fn run_checked(program: &str, args: &[&str]) -> Result<String> {
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .map_err(|e| NetTesterError::Platform(format!("starting {program}: {e}")))?;
    if !output.status.success() {
        return Err(NetTesterError::Platform(format!(
            "{program} {} exited with {}",
            args.join(" "),
            output.status
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

impl InterfaceService for LinuxPlatform {
    fn interfaces(&self) -> Result<Vec<Interface>> {
        let mut found = Vec::new();
        for entry in fs::read_dir(&self.sys_class_net)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == "lo" {
                continue;
            }
            let dir = entry.path();
            let Some(mac) = read_trimmed(&dir.join("address")) else {
                continue;
            };
            if mac.is_empty() || mac == NULL_MAC {
                continue;
            }
            let kind = if dir.join("wireless").exists() || dir.join("phy80211").exists() {
                InterfaceKind::Wireless
            } else {
                InterfaceKind::Wired
            };
            found.push(Interface {
                name,
                kind,
                mac: Some(mac),
            });
        }
        found.sort_by(|a, b| a.name.cmp(&b.name));
        log::debug!("Enumerated {} interfaces", found.len());
        Ok(found)
    }

    fn interface_info(&self, name: &str) -> Result<InterfaceInfo> {
        let dir = self.iface_dir(name);
        if !dir.exists() {
            return Err(NetTesterError::Interface(format!("{name}: no such device")));
        }
        let mac = read_trimmed(&dir.join("address"));
        let listing = run_checked("ip", &["-o", "addr", "show", "dev", name])
            .map_err(|e| NetTesterError::Interface(e.to_string()))?;
        Ok(InterfaceInfo {
            mac,
            addresses: parse_ip_addr(&listing),
        })
    }
}

impl RadioService for LinuxPlatform {
    fn radio_state(&self, iface: &str) -> Result<RadioState> {
        let mut state = RadioState::default();
        for dir in self.rfkill_dirs(iface)? {
            state.hard_blocked |= read_trimmed(&dir.join("hard")).as_deref() == Some("1");
            state.soft_blocked |= read_trimmed(&dir.join("soft")).as_deref() == Some("1");
        }
        Ok(state)
    }

    fn unblock(&self, iface: &str) -> Result<()> {
        for dir in self.rfkill_dirs(iface)? {
            fs::write(dir.join("soft"), "0")?;
        }
        Ok(())
    }

    fn link_up(&self, iface: &str) -> Result<()> {
        run_checked("ip", &["link", "set", "dev", iface, "up"]).map(|_| ())
    }

    fn set_power_save(&self, iface: &str, enabled: bool) -> Result<()> {
        let mode = if enabled { "on" } else { "off" };
        run_checked("iw", &["dev", iface, "set", "power_save", mode]).map(|_| ())
    }

    fn scan(&self, iface: &str) -> Result<Vec<AccessPoint>> {
        let listing = run_checked("iw", &["dev", iface, "scan"])
            .map_err(|e| NetTesterError::Probe(e.to_string()))?;
        Ok(parse_iw_scan(&listing))
    }
}

impl ReachabilityService for LinuxPlatform {
    fn resolve(&self, host: &str) -> Result<IpAddr> {
        let addrs: Vec<IpAddr> = (host, 0)
            .to_socket_addrs()
            .map_err(|e| NetTesterError::Probe(format!("resolving {host}: {e}")))?
            .map(|sa| sa.ip())
            .collect();
        addrs
            .iter()
            .find(|a| a.is_ipv4())
            .or_else(|| addrs.first())
            .copied()
            .ok_or_else(|| NetTesterError::Probe(format!("{host}: no addresses")))
    }

    fn ping(&self, addr: IpAddr) -> bool {
        let seconds = self.ping_timeout.as_secs().clamp(1, 30).to_string();
        let target = addr.to_string();
        Command::new("ping")
            .args(["-c", "1", "-W", &seconds, &target])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

impl ProcessService for LinuxPlatform {
    fn run(&self, argv: &[String]) -> Result<ProcessOutput> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| NetTesterError::Probe("empty command line".to_string()))?;
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|e| NetTesterError::Probe(format!("starting {program}: {e}")))?;
        log::debug!("{program} exited with {}", output.status);
        Ok(ProcessOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}

impl PowerService for LinuxPlatform {
    fn power_off(&self) -> Result<()> {
        log::info!("Requesting power-off");
        run_checked("sudo", &["poweroff"]).map(|_| ())
    }
}

impl TimeService for LinuxPlatform {
    fn now(&self) -> Result<SystemTime> {
        let now = Local::now();
        Ok(SystemTime {
            year: now.year().clamp(0, u16::MAX as i32) as u16,
            month: now.month() as u8,
            day: now.day() as u8,
            hour: now.hour() as u8,
            minute: now.minute() as u8,
            second: now.second() as u8,
        })
    }
}

// ---------------------------------------------------------------------------
// Output parsers
// ---------------------------------------------------------------------------

/// IPv4 netmask for a prefix length.
pub fn ipv4_netmask(prefix: u8) -> Ipv4Addr {
    let prefix = prefix.min(32) as u32;
    let bits = if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - prefix)
    };
    Ipv4Addr::from(bits)
}

/// IPv6 netmask for a prefix length, rendered as `mask/prefix`.
pub fn ipv6_netmask(prefix: u8) -> String {
    let p = prefix.min(128) as u32;
    let bits = if p == 0 { 0 } else { u128::MAX << (128 - p) };
    format!("{}/{p}", Ipv6Addr::from(bits))
}

/// Parse `ip -o addr show` output.
pub fn parse_ip_addr(listing: &str) -> Vec<AddressRecord> {
    let mut records = Vec::new();
    for line in listing.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(pos) = tokens.iter().position(|t| *t == "inet" || *t == "inet6") else {
            continue;
        };
        let family = if tokens[pos] == "inet" {
            AddressFamily::V4
        } else {
            AddressFamily::V6
        };
        let Some(cidr) = tokens.get(pos + 1) else {
            continue;
        };
        let (address, prefix) = match cidr.split_once('/') {
            Some((a, p)) => (a.to_string(), p.parse::<u8>().ok()),
            None => (cidr.to_string(), None),
        };
        let netmask = prefix.map(|p| match family {
            AddressFamily::V4 => ipv4_netmask(p).to_string(),
            AddressFamily::V6 => ipv6_netmask(p),
        });
        let broadcast = tokens
            .iter()
            .position(|t| *t == "brd")
            .and_then(|i| tokens.get(i + 1))
            .map(|s| s.to_string());
        records.push(AddressRecord {
            family,
            address,
            netmask,
            broadcast,
        });
    }
    records
}

/// Signal strength in dBm to a 0-100 quality figure.
pub fn dbm_to_quality(dbm: f32) -> u8 {
    (2.0 * (dbm + 100.0)).clamp(0.0, 100.0) as u8
}

#[derive(Default)]
struct BssBuilder {
    bssid: String,
    ssid: String,
    signal_dbm: Option<f32>,
    privacy: bool,
    wpa: bool,
    rsn: bool,
}

impl BssBuilder {
    fn finish(self) -> AccessPoint {
        let security = match (self.rsn, self.wpa, self.privacy) {
            (true, true, _) => "WPA/WPA2",
            (true, false, _) => "WPA2",
            (false, true, _) => "WPA",
            (false, false, true) => "WEP",
            _ => "Open",
        };
        AccessPoint {
            ssid: self.ssid,
            bssid: self.bssid,
            quality: self.signal_dbm.map(dbm_to_quality).unwrap_or(0),
            security: security.to_string(),
        }
    }
}

/// Parse `iw dev <iface> scan` output.
pub fn parse_iw_scan(listing: &str) -> Vec<AccessPoint> {
    let mut aps = Vec::new();
    let mut current: Option<BssBuilder> = None;
    for raw in listing.lines() {
        if let Some(rest) = raw.strip_prefix("BSS ") {
            if let Some(done) = current.take() {
                aps.push(done.finish());
            }
            let bssid = rest
                .split(|c: char| c == '(' || c.is_whitespace())
                .next()
                .unwrap_or_default();
            current = Some(BssBuilder {
                bssid: bssid.to_string(),
                ..BssBuilder::default()
            });
            continue;
        }
        let Some(bss) = current.as_mut() else {
            continue;
        };
        let line = raw.trim();
        if let Some(v) = line.strip_prefix("SSID:") {
            bss.ssid = v.trim().to_string();
        } else if let Some(v) = line.strip_prefix("signal:") {
            bss.signal_dbm = v
                .split_whitespace()
                .next()
                .and_then(|n| n.parse::<f32>().ok());
        } else if let Some(v) = line.strip_prefix("capability:") {
            bss.privacy |= v.split_whitespace().any(|w| w == "Privacy");
        } else if line.starts_with("RSN:") {
            bss.rsn = true;
        } else if line.starts_with("WPA:") {
            bss.wpa = true;
        }
    }
    if let Some(done) = current.take() {
        aps.push(done.finish());
    }
    aps
}
