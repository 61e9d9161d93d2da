//! Reachability probe: resolve and ping each configured remote.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::platform::ReachabilityService;
use crate::strings::Strings;
use crate::task::CancelToken;

/// What a configured remote turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteTarget {
    V4(Ipv4Addr),
    V6(Ipv6Addr),
    Hostname(String),
    Invalid,
}

fn is_hostname(s: &str) -> bool {
    let s = s.strip_suffix('.').unwrap_or(s);
    if s.is_empty() || s.len() > 253 {
        return false;
    }
    s.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

/// Classify a remote as an address literal or a syntactically valid hostname.
pub fn classify_remote(remote: &str) -> RemoteTarget {
    if let Ok(v4) = remote.parse::<Ipv4Addr>() {
        RemoteTarget::V4(v4)
    } else if let Ok(v6) = remote.parse::<Ipv6Addr>() {
        RemoteTarget::V6(v6)
    } else if is_hostname(remote) {
        RemoteTarget::Hostname(remote.to_string())
    } else {
        RemoteTarget::Invalid
    }
}

/// Check every remote in order. Hostnames add a `remote: <ip>` line before
/// the ping result. Returns `None` if cancelled between remotes.
pub fn check_remotes(
    platform: &(impl ReachabilityService + ?Sized),
    remotes: &[String],
    strings: &Strings,
    cancel: &CancelToken,
) -> Option<Vec<String>> {
    let mut lines = Vec::new();
    for remote in remotes {
        if cancel.is_cancelled() {
            return None;
        }
        let remote = remote.trim();
        let addr = match classify_remote(remote) {
            RemoteTarget::V4(a) => IpAddr::V4(a),
            RemoteTarget::V6(a) => IpAddr::V6(a),
            RemoteTarget::Hostname(host) => match platform.resolve(&host) {
                Ok(addr) => {
                    lines.push(format!("{remote}: {addr}"));
                    addr
                },
                Err(e) => {
                    log::debug!("Resolving {host} failed: {e}");
                    lines.push(format!("{remote}: {}", strings.invalid_target));
                    continue;
                },
            },
            RemoteTarget::Invalid => {
                lines.push(format!("{remote}: {}", strings.invalid_target));
                continue;
            },
        };
        let verdict = if platform.ping(addr) {
            strings.reachable
        } else {
            strings.unreachable
        };
        log::debug!("{remote} ({addr}): {verdict}");
        lines.push(format!("{remote}: {verdict}"));
    }
    Some(lines)
}
