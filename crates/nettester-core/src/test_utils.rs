//! Shared test utilities.
//!
//! Provides a [`MockBackend`] that records all draw calls and replays queued
//! input, and a [`MockPlatform`] with scripted answers for every platform
//! service.

use std::collections::{HashMap, HashSet, VecDeque};
use std::net::IpAddr;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, mpsc};

use crate::backend::{Color, DisplayMode, InputBackend, Rect, RenderBackend, TextureId};
use crate::error::{NetTesterError, Result};
use crate::input::InputEvent;
use crate::platform::{
    AccessPoint, Interface, InterfaceInfo, InterfaceKind, InterfaceService, PowerService,
    ProcessOutput, ProcessService, RadioService, RadioState, ReachabilityService, SystemTime,
    TimeService,
};

// ---------------------------------------------------------------------------
// MockBackend
// ---------------------------------------------------------------------------

/// A recorded backend call.
#[derive(Debug, Clone, PartialEq)]
#[allow(dead_code)]
pub enum DrawCall {
    Clear(Color),
    FillRect {
        rect: Rect,
        color: Color,
    },
    Line {
        from: (i32, i32),
        to: (i32, i32),
        width: u32,
    },
    Text {
        text: String,
        x: i32,
        y: i32,
        font_size: u32,
        antialias: bool,
        mirrored: bool,
    },
    Blit {
        tex: TextureId,
        dst: Rect,
    },
    DisplayMode(DisplayMode),
    Cursor(bool),
    Swap,
    Shutdown,
}

/// A backend with deterministic font metrics: glyphs are `size * 6 / 10`
/// wide and lines are `size + size / 5` high.
pub struct MockBackend {
    pub calls: Vec<DrawCall>,
    /// File names `load_image` succeeds for.
    pub images: HashSet<String>,
    /// Make `swap_buffers` fail, as a lost display would.
    pub fail_swap: bool,
    next_texture: u64,
    textures: HashMap<TextureId, String>,
    input: VecDeque<Vec<InputEvent>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            images: HashSet::new(),
            fail_swap: false,
            next_texture: 1,
            textures: HashMap::new(),
            input: VecDeque::new(),
        }
    }

    /// Let `load_image` succeed for these file names.
    pub fn with_images(mut self, names: &[&str]) -> Self {
        self.images.extend(names.iter().map(|n| n.to_string()));
        self
    }

    /// Queue one batch of events, returned by one `poll_events` call.
    pub fn push_events(&mut self, events: Vec<InputEvent>) {
        self.input.push_back(events);
    }

    pub fn has_text(&self, needle: &str) -> bool {
        self.calls
            .iter()
            .any(|c| matches!(c, DrawCall::Text { text, .. } if text.contains(needle)))
    }

    pub fn texts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&DrawCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    pub fn reset(&mut self) {
        self.calls.clear();
    }
}

impl RenderBackend for MockBackend {
    fn clear(&mut self, color: Color) -> Result<()> {
        self.calls.push(DrawCall::Clear(color));
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<()> {
        self.calls.push(DrawCall::FillRect { rect, color });
        Ok(())
    }

    fn draw_line(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        width: u32,
        _color: Color,
    ) -> Result<()> {
        self.calls.push(DrawCall::Line {
            from: (x1, y1),
            to: (x2, y2),
            width,
        });
        Ok(())
    }

    fn draw_text(
        &mut self,
        text: &str,
        x: i32,
        y: i32,
        font_size: u32,
        _color: Color,
        antialias: bool,
    ) -> Result<()> {
        self.calls.push(DrawCall::Text {
            text: text.to_string(),
            x,
            y,
            font_size,
            antialias,
            mirrored: false,
        });
        Ok(())
    }

    fn draw_text_mirrored(
        &mut self,
        text: &str,
        x: i32,
        y: i32,
        font_size: u32,
        _color: Color,
        antialias: bool,
    ) -> Result<()> {
        self.calls.push(DrawCall::Text {
            text: text.to_string(),
            x,
            y,
            font_size,
            antialias,
            mirrored: true,
        });
        Ok(())
    }

    fn measure_text(&self, text: &str, font_size: u32) -> (u32, u32) {
        (text.chars().count() as u32 * font_size * 6 / 10, font_size)
    }

    fn line_height(&self, font_size: u32) -> u32 {
        font_size + font_size / 5
    }

    fn load_image(&mut self, path: &Path) -> Result<TextureId> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !self.images.contains(&name) {
            return Err(NetTesterError::Backend(format!(
                "image not found: {}",
                path.display()
            )));
        }
        let id = TextureId(self.next_texture);
        self.next_texture += 1;
        self.textures.insert(id, name);
        Ok(id)
    }

    fn texture_size(&self, tex: TextureId) -> Option<(u32, u32)> {
        self.textures.contains_key(&tex).then_some((400, 200))
    }

    fn blit(&mut self, tex: TextureId, dst: Rect) -> Result<()> {
        self.calls.push(DrawCall::Blit { tex, dst });
        Ok(())
    }

    fn set_display_mode(&mut self, mode: DisplayMode) -> Result<(u32, u32)> {
        self.calls.push(DrawCall::DisplayMode(mode));
        Ok(match mode {
            DisplayMode::Fullscreen { width, height } | DisplayMode::Windowed { width, height } => {
                (width, height)
            },
        })
    }

    fn show_cursor(&mut self, visible: bool) {
        self.calls.push(DrawCall::Cursor(visible));
    }

    fn swap_buffers(&mut self) -> Result<()> {
        if self.fail_swap {
            return Err(NetTesterError::Backend("display lost".into()));
        }
        self.calls.push(DrawCall::Swap);
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.calls.push(DrawCall::Shutdown);
        Ok(())
    }
}

impl InputBackend for MockBackend {
    fn poll_events(&mut self) -> Vec<InputEvent> {
        self.input.pop_front().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// MockPlatform
// ---------------------------------------------------------------------------

/// Scripted platform services. Configure with the `with_*` builders; inspect
/// what the code under test did with the accessors.
#[derive(Default)]
pub struct MockPlatform {
    interfaces: Vec<Interface>,
    infos: HashMap<String, InterfaceInfo>,
    radios: HashMap<String, RadioState>,
    missing_radios: HashSet<String>,
    failing_radio_setup: bool,
    scans: HashMap<String, Vec<AccessPoint>>,
    failing_scans: HashSet<String>,
    hosts: HashMap<String, IpAddr>,
    reachable: HashSet<IpAddr>,
    process: Option<ProcessOutput>,
    process_error: bool,
    power_off_error: bool,
    /// Blocks `run` until the paired sender sends or is dropped.
    run_gate: Option<Mutex<mpsc::Receiver<()>>>,
    /// Blocks `ping` the same way.
    ping_gate: Option<Mutex<mpsc::Receiver<()>>>,

    scanned: Mutex<Vec<String>>,
    argv: Mutex<Option<Vec<String>>>,
    runs: AtomicUsize,
    power_offs: AtomicUsize,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interface(mut self, name: &str, kind: InterfaceKind) -> Self {
        self.interfaces.push(Interface {
            name: name.to_string(),
            kind,
            mac: Some("02:00:00:00:00:01".to_string()),
        });
        self
    }

    pub fn with_info(mut self, name: &str, info: InterfaceInfo) -> Self {
        self.infos.insert(name.to_string(), info);
        self
    }

    pub fn with_radio_state(mut self, iface: &str, state: RadioState) -> Self {
        self.radios.insert(iface.to_string(), state);
        self
    }

    pub fn with_missing_radio(mut self, iface: &str) -> Self {
        self.missing_radios.insert(iface.to_string());
        self
    }

    pub fn with_failing_radio_setup(mut self) -> Self {
        self.failing_radio_setup = true;
        self
    }

    pub fn with_scan(mut self, iface: &str, aps: Vec<AccessPoint>) -> Self {
        self.scans.insert(iface.to_string(), aps);
        self
    }

    pub fn with_failing_scan(mut self, iface: &str) -> Self {
        self.failing_scans.insert(iface.to_string());
        self
    }

    pub fn with_host(mut self, host: &str, ip: &str) -> Self {
        if let Ok(ip) = ip.parse() {
            self.hosts.insert(host.to_string(), ip);
        }
        self
    }

    pub fn with_reachable(mut self, ips: &[&str]) -> Self {
        self.reachable
            .extend(ips.iter().filter_map(|ip| ip.parse::<IpAddr>().ok()));
        self
    }

    pub fn with_process_output(mut self, success: bool, stdout: &str) -> Self {
        self.process = Some(ProcessOutput {
            success,
            stdout: stdout.to_string(),
        });
        self
    }

    pub fn with_process_error(mut self) -> Self {
        self.process_error = true;
        self
    }

    pub fn with_power_off_error(mut self) -> Self {
        self.power_off_error = true;
        self
    }

    /// Make `run` block until the returned sender sends or is dropped.
    pub fn with_blocking_command(mut self) -> (Self, mpsc::Sender<()>) {
        let (tx, rx) = mpsc::channel();
        self.run_gate = Some(Mutex::new(rx));
        (self, tx)
    }

    /// Make `ping` block until the returned sender sends or is dropped.
    pub fn with_blocking_ping(mut self) -> (Self, mpsc::Sender<()>) {
        let (tx, rx) = mpsc::channel();
        self.ping_gate = Some(Mutex::new(rx));
        (self, tx)
    }

    pub fn scanned(&self, iface: &str) -> bool {
        self.scanned
            .lock()
            .map(|s| s.iter().any(|i| i == iface))
            .unwrap_or(false)
    }

    pub fn last_argv(&self) -> Option<Vec<String>> {
        self.argv.lock().ok().and_then(|a| a.clone())
    }

    pub fn run_count(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    pub fn power_off_count(&self) -> usize {
        self.power_offs.load(Ordering::SeqCst)
    }
}

impl InterfaceService for MockPlatform {
    fn interfaces(&self) -> Result<Vec<Interface>> {
        Ok(self.interfaces.clone())
    }

    fn interface_info(&self, name: &str) -> Result<InterfaceInfo> {
        self.infos
            .get(name)
            .cloned()
            .ok_or_else(|| NetTesterError::Interface(format!("{name}: no such device")))
    }
}

impl RadioService for MockPlatform {
    fn radio_state(&self, iface: &str) -> Result<RadioState> {
        if self.missing_radios.contains(iface) {
            return Err(NetTesterError::Platform(format!("{iface}: no rfkill entry")));
        }
        Ok(self.radios.get(iface).copied().unwrap_or_default())
    }

    fn unblock(&self, iface: &str) -> Result<()> {
        self.radio_setup(iface, "unblock")
    }

    fn link_up(&self, iface: &str) -> Result<()> {
        self.radio_setup(iface, "link up")
    }

    fn set_power_save(&self, iface: &str, _enabled: bool) -> Result<()> {
        self.radio_setup(iface, "power save")
    }

    fn scan(&self, iface: &str) -> Result<Vec<AccessPoint>> {
        if let Ok(mut scanned) = self.scanned.lock() {
            scanned.push(iface.to_string());
        }
        if self.failing_scans.contains(iface) {
            return Err(NetTesterError::Platform(format!("{iface}: scan aborted")));
        }
        Ok(self.scans.get(iface).cloned().unwrap_or_default())
    }
}

impl MockPlatform {
    fn radio_setup(&self, iface: &str, what: &str) -> Result<()> {
        if self.failing_radio_setup {
            Err(NetTesterError::Platform(format!("{iface}: {what} not permitted")))
        } else {
            Ok(())
        }
    }
}

impl ReachabilityService for MockPlatform {
    fn resolve(&self, host: &str) -> Result<IpAddr> {
        self.hosts
            .get(host)
            .copied()
            .ok_or_else(|| NetTesterError::Platform(format!("{host}: unknown host")))
    }

    fn ping(&self, addr: IpAddr) -> bool {
        if let Some(gate) = &self.ping_gate
            && let Ok(rx) = gate.lock()
        {
            let _ = rx.recv();
        }
        self.reachable.contains(&addr)
    }
}

impl ProcessService for MockPlatform {
    fn run(&self, argv: &[String]) -> Result<ProcessOutput> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.argv.lock() {
            *last = Some(argv.to_vec());
        }
        if let Some(gate) = &self.run_gate
            && let Ok(rx) = gate.lock()
        {
            let _ = rx.recv();
        }
        if self.process_error {
            return Err(NetTesterError::Platform(format!(
                "{}: No such file or directory",
                argv[0]
            )));
        }
        Ok(self.process.clone().unwrap_or(ProcessOutput {
            success: true,
            stdout: String::new(),
        }))
    }
}

impl PowerService for MockPlatform {
    fn power_off(&self) -> Result<()> {
        self.power_offs.fetch_add(1, Ordering::SeqCst);
        if self.power_off_error {
            return Err(NetTesterError::Platform("sudo: a password is required".into()));
        }
        Ok(())
    }
}

impl TimeService for MockPlatform {
    fn now(&self) -> Result<SystemTime> {
        Ok(SystemTime {
            year: 2026,
            month: 10,
            day: 15,
            hour: 12,
            minute: 34,
            second: 56,
        })
    }
}
