//! Platform service traits.
//!
//! Everything the kiosk needs from the operating system goes through these
//! traits so the controller and the probes can run against mocks in tests.
//! All methods take `&self`: one platform value is shared between the main
//! loop and the probe workers.

use std::fmt;
use std::net::IpAddr;

use nettester_types::error::Result;

// ---------------------------------------------------------------------------
// Interface service
// ---------------------------------------------------------------------------

/// Physical link type of a network interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterfaceKind {
    Wired,
    Wireless,
}

/// A network interface found at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    pub name: String,
    pub kind: InterfaceKind,
    /// Hardware address as `aa:bb:cc:dd:ee:ff`.
    pub mac: Option<String>,
}

/// Address family of an [`AddressRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFamily {
    V4,
    V6,
}

/// One configured address on an interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressRecord {
    pub family: AddressFamily,
    pub address: String,
    pub netmask: Option<String>,
    pub broadcast: Option<String>,
}

/// Live address information for one interface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterfaceInfo {
    pub mac: Option<String>,
    pub addresses: Vec<AddressRecord>,
}

/// Enumeration and address queries.
pub trait InterfaceService {
    /// All physical interfaces (loopback and interfaces without a hardware
    /// address are excluded).
    fn interfaces(&self) -> Result<Vec<Interface>>;

    /// Current addresses of `name`. Fails if the interface has disappeared.
    fn interface_info(&self, name: &str) -> Result<InterfaceInfo>;
}

// ---------------------------------------------------------------------------
// Radio service
// ---------------------------------------------------------------------------

/// rfkill state of a wireless card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RadioState {
    pub hard_blocked: bool,
    pub soft_blocked: bool,
}

/// An access point seen by a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPoint {
    pub ssid: String,
    pub bssid: String,
    /// Link quality, 0-100.
    pub quality: u8,
    pub security: String,
}

/// Wireless card control and scanning.
pub trait RadioService {
    /// Block state of the card behind `iface`. Fails if the card is gone.
    fn radio_state(&self, iface: &str) -> Result<RadioState>;

    /// Lift a soft block.
    fn unblock(&self, iface: &str) -> Result<()>;

    /// Bring the link administratively up.
    fn link_up(&self, iface: &str) -> Result<()>;

    /// Toggle power-save mode.
    fn set_power_save(&self, iface: &str, enabled: bool) -> Result<()>;

    /// Blocking scan for access points.
    fn scan(&self, iface: &str) -> Result<Vec<AccessPoint>>;
}

// ---------------------------------------------------------------------------
// Reachability service
// ---------------------------------------------------------------------------

/// DNS resolution and single-shot ping.
pub trait ReachabilityService {
    /// Resolve a hostname to one address (IPv4 preferred).
    fn resolve(&self, host: &str) -> Result<IpAddr>;

    /// Send one echo request. `true` if a reply arrived.
    fn ping(&self, addr: IpAddr) -> bool;
}

// ---------------------------------------------------------------------------
// Process service
// ---------------------------------------------------------------------------

/// Captured result of a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub success: bool,
    pub stdout: String,
}

/// Launching external programs without a shell.
pub trait ProcessService {
    /// Run `argv[0]` with `argv[1..]` and wait for it. Fails if the program
    /// could not be started.
    fn run(&self, argv: &[String]) -> Result<ProcessOutput>;
}

// ---------------------------------------------------------------------------
// Power service
// ---------------------------------------------------------------------------

/// Device power control.
pub trait PowerService {
    /// Request a privileged power-off.
    fn power_off(&self) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Time service
// ---------------------------------------------------------------------------

/// A simple wall-clock timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl SystemTime {
    /// `HH:MM:SS`, as shown in the titlebar.
    pub fn clock_text(&self) -> String {
        format!("{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

impl fmt::Display for SystemTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second,
        )
    }
}

/// Abstraction over platform time services.
pub trait TimeService {
    /// Current local wall-clock time.
    fn now(&self) -> Result<SystemTime>;
}

// ---------------------------------------------------------------------------
// Unified platform trait
// ---------------------------------------------------------------------------

/// Aggregate trait providing access to all platform services.
pub trait Platform:
    InterfaceService
    + RadioService
    + ReachabilityService
    + ProcessService
    + PowerService
    + TimeService
    + Send
    + Sync
{
}

impl<T> Platform for T where
    T: InterfaceService
        + RadioService
        + ReachabilityService
        + ProcessService
        + PowerService
        + TimeService
        + Send
        + Sync
{
}
