//! Wifi scan probe.

use crate::platform::{AccessPoint, RadioService};
use crate::strings::Strings;
use crate::task::CancelToken;

/// Best-effort radio preparation. Failures are expected on cards that are
/// already up or lack power-save support.
fn prepare_radio(platform: &(impl RadioService + ?Sized), iface: &str) {
    if let Err(e) = platform.unblock(iface) {
        log::debug!("{iface}: unblock failed: {e}");
    }
    if let Err(e) = platform.link_up(iface) {
        log::debug!("{iface}: link up failed: {e}");
    }
    if let Err(e) = platform.set_power_save(iface, false) {
        log::debug!("{iface}: disabling power save failed: {e}");
    }
}

fn format_access_points(aps: &[AccessPoint], strings: &Strings) -> Vec<String> {
    if aps.is_empty() {
        return vec![strings.no_networks.to_string()];
    }
    let mut lines = Vec::with_capacity(aps.len() * 5);
    for ap in aps {
        lines.push(format!("SSID:     {}", ap.ssid));
        lines.push(format!("BSSID:    {}", ap.bssid));
        lines.push(format!("Signal:   {}", ap.quality));
        lines.push(format!("Security: {}", ap.security));
        lines.push(" ".to_string());
    }
    lines
}

/// Scan every wireless interface and list all access points seen.
///
/// Interfaces whose radio state cannot be read, or that are hard-blocked,
/// are skipped. Returns `None` if cancelled between interfaces.
pub fn scan_networks(
    platform: &(impl RadioService + ?Sized),
    interfaces: &[String],
    strings: &Strings,
    cancel: &CancelToken,
) -> Option<Vec<String>> {
    let mut access_points = Vec::new();
    for iface in interfaces {
        if cancel.is_cancelled() {
            return None;
        }
        match platform.radio_state(iface) {
            Ok(state) if state.hard_blocked => {
                log::info!("{iface}: radio hard-blocked, skipping");
                continue;
            },
            Ok(_) => {},
            Err(e) => {
                log::info!("{iface}: no usable radio: {e}");
                continue;
            },
        }
        prepare_radio(platform, iface);
        if cancel.is_cancelled() {
            return None;
        }
        match platform.scan(iface) {
            Ok(found) => {
                log::info!("{iface}: {} access points", found.len());
                access_points.extend(found);
            },
            Err(e) => log::warn!("{iface}: scan failed: {e}"),
        }
    }
    Some(format_access_points(&access_points, strings))
}
