//! Interface sets, selection, and the interface info text.

use crate::error::Result;
use crate::platform::{AddressFamily, Interface, InterfaceInfo, InterfaceKind};
use crate::strings::Strings;

/// Stand-in member for a kind with no interfaces.
pub const PLACEHOLDER_INTERFACE: &str = "None";

/// Interface names per kind, snapshotted at startup. Neither list is ever
/// empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceSet {
    wired: Vec<String>,
    wireless: Vec<String>,
}

impl InterfaceSet {
    pub fn new(interfaces: &[Interface]) -> Self {
        let names = |kind: InterfaceKind| {
            let mut v: Vec<String> = interfaces
                .iter()
                .filter(|i| i.kind == kind)
                .map(|i| i.name.clone())
                .collect();
            if v.is_empty() {
                v.push(PLACEHOLDER_INTERFACE.to_string());
            }
            v
        };
        Self {
            wired: names(InterfaceKind::Wired),
            wireless: names(InterfaceKind::Wireless),
        }
    }

    pub fn members(&self, kind: InterfaceKind) -> &[String] {
        match kind {
            InterfaceKind::Wired => &self.wired,
            InterfaceKind::Wireless => &self.wireless,
        }
    }

    /// Real wireless interfaces, without the placeholder.
    pub fn wireless_names(&self) -> Vec<String> {
        self.wireless
            .iter()
            .filter(|n| n.as_str() != PLACEHOLDER_INTERFACE)
            .cloned()
            .collect()
    }
}

/// Next interface when the button for a kind is pressed.
///
/// Pressing the button of the kind that is already shown advances to the
/// next member (wrapping); pressing the other kind's button returns to
/// whatever was last shown for that kind.
pub fn iterate<'a>(current: &str, interfaces: &'a [String], last: &'a str) -> &'a str {
    if current != last {
        return last;
    }
    match interfaces.iter().position(|i| i == last) {
        Some(idx) => &interfaces[(idx + 1) % interfaces.len()],
        None => interfaces.first().map_or(last, String::as_str),
    }
}

/// Which interface is shown, and the last one shown per kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceSelection {
    current: String,
    last_wired: String,
    last_wireless: String,
}

impl InterfaceSelection {
    /// Start on the first wired interface.
    pub fn new(set: &InterfaceSet) -> Self {
        let first = |kind| set.members(kind)[0].clone();
        Self {
            current: first(InterfaceKind::Wired),
            last_wired: first(InterfaceKind::Wired),
            last_wireless: first(InterfaceKind::Wireless),
        }
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    /// Apply [`iterate`] for `kind` and make the result current.
    pub fn switch_to(&mut self, set: &InterfaceSet, kind: InterfaceKind) -> &str {
        let last = match kind {
            InterfaceKind::Wired => &mut self.last_wired,
            InterfaceKind::Wireless => &mut self.last_wireless,
        };
        let next = iterate(&self.current, set.members(kind), last.as_str()).to_string();
        *last = next.clone();
        self.current = next;
        &self.current
    }
}

/// Text box lines describing one interface.
pub fn info_lines(info: Result<InterfaceInfo>, strings: &Strings) -> Vec<String> {
    let info = match info {
        Ok(info) => info,
        Err(e) => return vec![strings.not_available.to_string(), e.to_string()],
    };

    let mut lines = vec![format!("MAC:  {}", info.mac.as_deref().unwrap_or("-"))];
    for (family, label) in [(AddressFamily::V4, "IPv4"), (AddressFamily::V6, "IPv6")] {
        for record in info.addresses.iter().filter(|r| r.family == family) {
            lines.push(String::new());
            lines.push(format!("{label}: {}", record.address));
            if let Some(nm) = &record.netmask {
                lines.push(format!("  NM: {nm}"));
            }
            if let Some(bc) = &record.broadcast {
                lines.push(format!("  BC: {bc}"));
            }
        }
    }
    lines
}
