//! Configuration file loading.
//!
//! The file is TOML with a single `[nettester]` table. Values may be written
//! as strings (`show_mouse_cursor = "1"`) or as native TOML scalars
//! (`show_mouse_cursor = true`); both are accepted.
//!
//! ```toml
//! [nettester]
//! resolution = "800x480"
//! fg_color = "255,255,255"
//! bg_color = "0,0,0"
//! font_size_correction = "1.0"
//! show_mouse_cursor = "0"
//! online_test_remote = "8.8.8.8,2001:4860:4860::8888,heise.de"
//! custom_command = "uname -a"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::backend::Color;
use crate::error::{NetTesterError, Result};
use crate::layout::Resolution;
use crate::strings::Locale;

/// Default file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "nettester.toml";

/// Environment variable naming the configuration file.
pub const CONFIG_ENV_VAR: &str = "NETTESTER_CONFIG";

/// A scalar as written in the file.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    fn as_text(&self) -> String {
        match self {
            Scalar::Bool(b) => if *b { "1" } else { "0" }.to_string(),
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Str(s) => s.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    nettester: RawSettings,
}

#[derive(Debug, Deserialize)]
struct RawSettings {
    resolution: Scalar,
    fg_color: String,
    bg_color: String,
    font_size_correction: Scalar,
    show_mouse_cursor: Scalar,
    online_test_remote: String,
    custom_command: String,
    #[serde(default)]
    fullscreen: Option<Scalar>,
    #[serde(default)]
    resource_dir: Option<PathBuf>,
    #[serde(default)]
    language: Option<String>,
}

/// Validated runtime settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Fullscreen surface size.
    pub resolution: Resolution,
    pub fg_color: Color,
    pub bg_color: Color,
    /// Multiplier applied to all font sizes.
    pub font_size_correction: f32,
    pub show_mouse_cursor: bool,
    /// Hosts or address literals for the reachability check, in order.
    pub online_test_remotes: Vec<String>,
    /// Whitespace-separated argv for the custom command.
    pub custom_command: String,
    pub fullscreen: bool,
    /// Directory holding the logo, font and menu icons.
    pub resource_dir: PathBuf,
    pub locale: Locale,
}

fn parse_flag(key: &str, value: &Scalar) -> Result<bool> {
    match value.as_text().trim() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        other => Err(NetTesterError::Config(format!(
            "{key} must be \"0\" or \"1\", got {other:?}"
        ))),
    }
}

impl Settings {
    /// Parse and validate the contents of a configuration file.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(text)?;
        let raw = file.nettester;

        let resolution: Resolution = raw.resolution.as_text().parse()?;
        let fg_color: Color = raw.fg_color.parse()?;
        let bg_color: Color = raw.bg_color.parse()?;

        let correction_text = raw.font_size_correction.as_text();
        let font_size_correction: f32 = correction_text.trim().parse().map_err(|e| {
            NetTesterError::Config(format!(
                "font_size_correction {correction_text:?} is not a number: {e}"
            ))
        })?;
        if !font_size_correction.is_finite() || font_size_correction <= 0.0 {
            return Err(NetTesterError::Config(format!(
                "font_size_correction must be positive, got {font_size_correction}"
            )));
        }

        let show_mouse_cursor = parse_flag("show_mouse_cursor", &raw.show_mouse_cursor)?;
        let fullscreen = match &raw.fullscreen {
            Some(v) => parse_flag("fullscreen", v)?,
            None => true,
        };
        let locale = match raw.language.as_deref() {
            Some(l) => l.parse()?,
            None => Locale::default(),
        };

        Ok(Settings {
            resolution,
            fg_color,
            bg_color,
            font_size_correction,
            show_mouse_cursor,
            online_test_remotes: raw
                .online_test_remote
                .split(',')
                .map(|r| r.trim().to_string())
                .collect(),
            custom_command: raw.custom_command,
            fullscreen,
            resource_dir: raw.resource_dir.unwrap_or_else(|| PathBuf::from("res")),
            locale,
        })
    }

    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            NetTesterError::Config(format!("reading {}: {e}", path.display()))
        })?;
        let settings = Self::from_toml_str(&text)?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(settings)
    }
}

/// Pick the configuration file: CLI argument, then environment, then the
/// default name.
pub fn config_path(cli_arg: Option<String>, env_value: Option<String>) -> PathBuf {
    cli_arg
        .or(env_value)
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}
