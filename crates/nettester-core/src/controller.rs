//! Interaction controller.
//!
//! Owns the application state. Input events are translated into
//! [`Command`]s and [`InteractionController::dispatch`] is the only place
//! that mutates state. Waiting for a probe is a phase checked once per
//! [`tick`](InteractionController::tick), so the main loop never blocks.

use std::sync::Arc;
use std::time::Duration;

use crate::backend::{DisplayMode, RenderBackend};
use crate::buttons::{ButtonBounds, ButtonTables, Command, hit_test};
use crate::config::Settings;
use crate::error::Result;
use crate::input::{InputEvent, Key};
use crate::layout::{LayoutGeometry, Resolution};
use crate::net::{InterfaceSelection, InterfaceSet, info_lines};
use crate::paginate::{Capacity, Paginator, ScrollDirection, TextMetrics};
use crate::platform::{InterfaceKind, Platform};
use crate::probe::ProbeContext;
use crate::strings::Strings;
use crate::task::{ProbeKind, TaskRunner, TaskState};

/// Window size used when fullscreen is switched off.
pub const WINDOWED_SIZE: (u32, u32) = (640, 480);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// Showing the wait placeholder until the probe publishes its result.
    AwaitingProbe(ProbeKind),
    /// A cancelled worker of this kind is still winding down; a fresh one
    /// is started once it has settled.
    RestartPending(ProbeKind),
}

/// Everything the screen shows, plus the loop's running flag.
#[derive(Debug, Clone)]
pub struct AppState {
    pub menu_open: bool,
    pub phase: Phase,
    pub title: String,
    pub paginator: Paginator,
    pub selection: InterfaceSelection,
    pub running: bool,
    pub fullscreen: bool,
}

pub struct InteractionController {
    state: AppState,
    platform: Arc<dyn Platform>,
    strings: &'static Strings,
    interfaces: InterfaceSet,
    tasks: TaskRunner,
    probes: ProbeContext,
    tables: ButtonTables,
    bounds: ButtonBounds,
    geometry: LayoutGeometry,
    capacity: Capacity,
    configured_resolution: Resolution,
    scale_correction: f32,
}

impl InteractionController {
    /// Snapshot the interfaces, lay out for `display` and show the first
    /// wired interface. Also starts the wifi pre-scan.
    pub fn new(
        settings: &Settings,
        platform: Arc<dyn Platform>,
        backend: &dyn RenderBackend,
        display: Resolution,
    ) -> Self {
        let strings = Strings::for_locale(settings.locale);
        let found = platform.interfaces().unwrap_or_else(|e| {
            log::warn!("Interface enumeration failed: {e}");
            Vec::new()
        });
        let interfaces = InterfaceSet::new(&found);
        log::info!(
            "Interfaces: wired {:?}, wireless {:?}",
            interfaces.members(InterfaceKind::Wired),
            interfaces.members(InterfaceKind::Wireless)
        );

        let selection = InterfaceSelection::new(&interfaces);
        let tables = ButtonTables::new(strings);
        let geometry = LayoutGeometry::compute(display, settings.font_size_correction);
        let probes = ProbeContext {
            platform: Arc::clone(&platform),
            strings,
            wireless_interfaces: interfaces.wireless_names(),
            remotes: settings.online_test_remotes.clone(),
            custom_command: settings.custom_command.clone(),
        };

        let mut controller = Self {
            state: AppState {
                menu_open: true,
                phase: Phase::Idle,
                title: String::new(),
                paginator: Paginator::new(),
                selection,
                running: true,
                fullscreen: settings.fullscreen,
            },
            platform,
            strings,
            interfaces,
            tasks: TaskRunner::new(strings.command_failed),
            probes,
            tables,
            bounds: ButtonBounds::default(),
            capacity: Capacity::new(geometry.textbox_rect, TextMetrics {
                glyph_width: 1,
                line_height: 1,
            }),
            geometry,
            configured_resolution: settings.resolution,
            scale_correction: settings.font_size_correction,
        };
        controller.relayout(display, backend);
        controller.show_current_interface();

        if let Err(e) = controller
            .tasks
            .start(ProbeKind::WifiScan, controller.probes.operation(ProbeKind::WifiScan))
        {
            log::warn!("Wifi pre-scan not started: {e}");
        }
        controller
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn geometry(&self) -> &LayoutGeometry {
        &self.geometry
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    pub fn tables(&self) -> &ButtonTables {
        &self.tables
    }

    pub fn bounds(&self) -> &ButtonBounds {
        &self.bounds
    }

    pub fn strings(&self) -> &'static Strings {
        self.strings
    }

    /// Titlebar clock text, empty if the clock is unavailable.
    pub fn clock_text(&self) -> String {
        self.platform
            .now()
            .map(|t| t.clock_text())
            .unwrap_or_default()
    }

    /// Recompute geometry, text capacity and all button bounds.
    pub fn relayout(&mut self, display: Resolution, backend: &dyn RenderBackend) {
        self.geometry = LayoutGeometry::compute(display, self.scale_correction);
        let font = self.geometry.text_font_size;
        self.capacity = Capacity::new(self.geometry.textbox_rect, TextMetrics {
            glyph_width: backend.measure_text("M", font).0,
            line_height: backend.line_height(font),
        });
        self.bounds = ButtonBounds::rebuild(&self.geometry, &self.tables, |text, size| {
            backend.measure_text(text, size)
        });
        log::info!(
            "Layout {}x{}: titlebar font {}px, text font {}px, {} chars x {} lines",
            display.width,
            display.height,
            self.geometry.titlebar_font_size,
            self.geometry.text_font_size,
            self.capacity.chars_per_line,
            self.capacity.lines_per_page,
        );
    }

    /// Translate an input event. Pointer releases are hit-tested against the
    /// titlebar first, then against the menu (menu open) or the paging zones
    /// (menu closed).
    pub fn command_for(&self, event: &InputEvent) -> Option<Command> {
        match event {
            InputEvent::Quit | InputEvent::KeyPress(Key::Escape) => Some(Command::Quit),
            InputEvent::KeyPress(Key::F11) => Some(Command::ToggleFullscreen),
            InputEvent::KeyPress(Key::PageUp) => Some(Command::Scroll(ScrollDirection::Up)),
            InputEvent::KeyPress(Key::PageDown) => Some(Command::Scroll(ScrollDirection::Down)),
            InputEvent::Resize { width, height } => Some(Command::Resize {
                width: *width,
                height: *height,
            }),
            _ => {
                let (x, y) = event.primary_release()?;
                let second = if self.state.menu_open {
                    &self.tables.menu
                } else {
                    &self.tables.paging
                };
                hit_test(&self.tables.titlebar, &self.bounds, x, y)
                    .or_else(|| hit_test(second, &self.bounds, x, y))
                    .map(|b| b.command)
            },
        }
    }

    pub fn handle_event(&mut self, event: &InputEvent, backend: &mut dyn RenderBackend) {
        if let Some(command) = self.command_for(event) {
            self.dispatch(command, backend);
        }
    }

    pub fn dispatch(&mut self, command: Command, backend: &mut dyn RenderBackend) {
        log::debug!("Dispatch {command:?}");
        match command {
            Command::ToggleMenu => self.toggle_menu(),
            Command::SelectInterface(kind) => self.select_interface(kind),
            Command::Shutdown => self.shutdown(),
            Command::RunProbe(kind) => self.launch_probe(kind),
            Command::Scroll(direction) => self.state.paginator.scroll(direction, self.capacity),
            Command::ToggleFullscreen => self.toggle_fullscreen(backend),
            Command::Resize { width, height } => match Resolution::new(width, height) {
                Ok(display) => self.relayout(display, backend),
                Err(e) => log::warn!("Ignoring resize: {e}"),
            },
            Command::Quit => {
                log::info!("Quit requested");
                self.state.running = false;
            },
        }
    }

    /// Advance the wait phase by one step.
    pub fn tick(&mut self) {
        let kind = match self.state.phase {
            Phase::Idle => return,
            Phase::RestartPending(kind) => {
                if !self.tasks.is_running(kind) {
                    self.restart_probe(kind);
                }
                return;
            },
            Phase::AwaitingProbe(kind) => kind,
        };
        if let Some(lines) = self.tasks.poll(kind) {
            self.state.paginator.set_text(lines);
            self.state.phase = Phase::Idle;
        } else if !self.tasks.is_running(kind) {
            log::debug!("{kind} ended without output");
            self.state.phase = Phase::Idle;
        }
    }

    /// Stop all probes, waiting at most `timeout`.
    pub fn teardown(&mut self, timeout: Duration) -> Vec<(ProbeKind, TaskState)> {
        log::info!("Stopping background tasks");
        self.state.running = false;
        let states = self.tasks.shutdown(timeout);
        for (kind, state) in &states {
            log::info!("{kind}: {state:?}");
        }
        states
    }

    fn show_current_interface(&mut self) {
        let name = self.state.selection.current().to_string();
        let lines = info_lines(self.platform.interface_info(&name), self.strings);
        self.state.title = name;
        self.state.paginator.set_text(lines);
    }

    fn toggle_menu(&mut self) {
        self.state.menu_open = !self.state.menu_open;
        match self.state.phase {
            Phase::AwaitingProbe(kind) => {
                self.tasks.cancel(kind);
                self.state.phase = Phase::Idle;
            },
            Phase::RestartPending(_) => self.state.phase = Phase::Idle,
            Phase::Idle => {},
        }
    }

    fn select_interface(&mut self, kind: InterfaceKind) {
        let name = self.state.selection.switch_to(&self.interfaces, kind);
        log::info!("Selected interface {name}");
        self.show_current_interface();
        self.state.menu_open = false;
    }

    fn shutdown(&mut self) {
        self.state.title = self.strings.goodbye.to_string();
        if let Err(e) = self.platform.power_off() {
            log::error!("Power off failed: {e}");
        }
        self.state.running = false;
    }

    fn probe_title(&self, kind: ProbeKind) -> &'static str {
        match kind {
            ProbeKind::WifiScan => self.strings.title_wifi_scan,
            ProbeKind::Reachability => self.strings.title_check_net,
            ProbeKind::CustomCommand => self.strings.title_custom_command,
        }
    }

    fn launch_probe(&mut self, kind: ProbeKind) {
        self.state.title = self.probe_title(kind).to_string();
        self.state.menu_open = false;

        self.state
            .paginator
            .set_text(vec![self.strings.please_wait.to_string()]);

        // Only the startup wifi scan leaves a result for a later request.
        let prescanned = kind == ProbeKind::WifiScan && self.tasks.has_pending_result(kind);
        if prescanned || (self.tasks.is_running(kind) && !self.tasks.is_cancelling(kind)) {
            log::info!("Awaiting existing {kind}");
            self.state.phase = Phase::AwaitingProbe(kind);
        } else if self.tasks.is_running(kind) {
            log::info!("Restarting {kind} once the cancelled run exits");
            self.state.phase = Phase::RestartPending(kind);
        } else {
            self.restart_probe(kind);
        }
    }

    /// Start a fresh worker for `kind` and wait for it.
    fn restart_probe(&mut self, kind: ProbeKind) {
        match self.start_probe(kind) {
            Ok(()) => self.state.phase = Phase::AwaitingProbe(kind),
            Err(e) => {
                log::error!("{e}");
                self.state
                    .paginator
                    .set_text(vec![self.strings.command_failed.to_string()]);
                self.state.phase = Phase::Idle;
            },
        }
    }

    fn start_probe(&mut self, kind: ProbeKind) -> Result<()> {
        let op = self.probes.operation(kind);
        self.tasks.start(kind, op)
    }

    fn toggle_fullscreen(&mut self, backend: &mut dyn RenderBackend) {
        let fullscreen = !self.state.fullscreen;
        let mode = if fullscreen {
            DisplayMode::Fullscreen {
                width: self.configured_resolution.width,
                height: self.configured_resolution.height,
            }
        } else {
            DisplayMode::Windowed {
                width: WINDOWED_SIZE.0,
                height: WINDOWED_SIZE.1,
            }
        };
        match backend
            .set_display_mode(mode)
            .and_then(|(w, h)| Resolution::new(w, h))
        {
            Ok(display) => {
                self.state.fullscreen = fullscreen;
                self.relayout(display, backend);
            },
            Err(e) => log::error!("Switching display mode failed: {e}"),
        }
    }
}
