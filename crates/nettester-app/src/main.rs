//! c't Net-Tester kiosk entry point.
//!
//! Usage: `nettester [CONFIG]`. The configuration path falls back to
//! `$NETTESTER_CONFIG`, then `./nettester.toml`. Escape quits, F11 toggles
//! fullscreen.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};

use nettester_backend_sdl::SdlBackend;
use nettester_core::config::{CONFIG_ENV_VAR, Settings, config_path};
use nettester_core::platform::LinuxPlatform;
use nettester_core::runtime::Runtime;
use nettester_core::task::TaskState;

const WINDOW_TITLE: &str = "c't Net-Tester";

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            eprintln!("nettester: {e:#}");
            ExitCode::FAILURE
        },
    }
}

fn run() -> Result<()> {
    let path = config_path(std::env::args().nth(1), std::env::var(CONFIG_ENV_VAR).ok());
    let settings = Settings::load(&path)
        .with_context(|| format!("cannot start without configuration {}", path.display()))?;
    log::info!(
        "Starting NetTester ({}x{}, {:?})",
        settings.resolution.width,
        settings.resolution.height,
        settings.locale,
    );

    let backend = SdlBackend::new(WINDOW_TITLE, &settings.resource_dir)
        .context("cannot open display")?;
    let platform = Arc::new(LinuxPlatform::new());

    let mut runtime = Runtime::start(backend, &settings, platform).context("startup failed")?;
    let states = runtime.run()?;

    let stragglers = states
        .iter()
        .filter(|(_, s)| *s == TaskState::TimedOut)
        .count();
    if stragglers > 0 {
        log::warn!("{stragglers} background task(s) were still running at exit");
    }
    Ok(())
}
