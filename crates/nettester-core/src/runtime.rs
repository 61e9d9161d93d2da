//! Main loop: event pump, controller, tick, paint, present, frame limiter.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::backend::{DisplayMode, InputBackend, RenderBackend};
use crate::config::Settings;
use crate::controller::{InteractionController, WINDOWED_SIZE};
use crate::error::Result;
use crate::layout::Resolution;
use crate::platform::Platform;
use crate::render::Renderer;
use crate::task::{ProbeKind, SHUTDOWN_TIMEOUT, TaskState};

/// Frames per second of the main loop.
pub const FRAME_RATE: u32 = 60;

/// Fixed-rate frame limiter.
#[derive(Debug, Clone)]
pub struct FrameClock {
    period: Duration,
    next: Instant,
}

impl FrameClock {
    pub fn new(rate: u32) -> Self {
        let period = Duration::from_secs(1) / rate.max(1);
        Self {
            period,
            next: Instant::now() + period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Time left in the current frame slot as seen at `now`.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.next.saturating_duration_since(now)
    }

    /// Sleep until the next frame slot. A loop that fell behind is not made
    /// to catch up; the schedule restarts from now.
    pub fn wait(&mut self) {
        let now = Instant::now();
        let remaining = self.remaining(now);
        if remaining.is_zero() {
            self.next = now + self.period;
        } else {
            std::thread::sleep(remaining);
            self.next += self.period;
        }
    }
}

/// Owns the backend and drives the controller until it stops.
pub struct Runtime<B> {
    backend: B,
    controller: InteractionController,
    renderer: Renderer,
    clock: FrameClock,
}

impl<B: RenderBackend + InputBackend> Runtime<B> {
    /// Open the display, show the splash and build the controller.
    pub fn start(mut backend: B, settings: &Settings, platform: Arc<dyn Platform>) -> Result<Self> {
        let mode = if settings.fullscreen {
            DisplayMode::Fullscreen {
                width: settings.resolution.width,
                height: settings.resolution.height,
            }
        } else {
            DisplayMode::Windowed {
                width: WINDOWED_SIZE.0,
                height: WINDOWED_SIZE.1,
            }
        };
        let (width, height) = backend.set_display_mode(mode)?;
        let display = Resolution::new(width, height)?;
        backend.show_cursor(settings.show_mouse_cursor);
        log::info!("Display {width}x{height} ({mode:?})");

        let controller = InteractionController::new(settings, platform, &backend, display);
        let mut renderer = Renderer::new(settings.fg_color, settings.bg_color);
        renderer.load_resources(&mut backend, &settings.resource_dir, controller.tables());
        renderer.paint_splash(&mut backend, controller.geometry())?;
        backend.swap_buffers()?;

        Ok(Self {
            backend,
            controller,
            renderer,
            clock: FrameClock::new(FRAME_RATE),
        })
    }

    /// Run until the controller stops, then tear down background tasks and
    /// the backend. Teardown also happens when a frame fails; the frame's
    /// error is returned afterwards. Returns the final state of every probe
    /// kind.
    pub fn run(&mut self) -> Result<Vec<(ProbeKind, TaskState)>> {
        let mut frames = 0u64;
        let outcome = self.run_frames(&mut frames);
        match &outcome {
            Ok(()) => log::info!("Main loop stopped after {frames} frames"),
            Err(e) => log::error!("Main loop aborted after {frames} frames: {e}"),
        }

        let states = self.controller.teardown(SHUTDOWN_TIMEOUT);
        let closed = self.backend.shutdown();
        outcome?;
        closed?;
        log::info!("NetTester shut down cleanly");
        Ok(states)
    }

    fn run_frames(&mut self, frames: &mut u64) -> Result<()> {
        while self.controller.is_running() {
            for event in self.backend.poll_events() {
                self.controller.handle_event(&event, &mut self.backend);
                if !self.controller.is_running() {
                    break;
                }
            }
            self.controller.tick();
            self.renderer.paint_frame(&mut self.backend, &self.controller)?;
            self.backend.swap_buffers()?;
            *frames += 1;
            if self.controller.is_running() {
                self.clock.wait();
            }
        }
        Ok(())
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }
}
