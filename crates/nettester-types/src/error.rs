//! Error types for NetTester.

use std::io;

/// Errors produced by the NetTester framework.
#[derive(Debug, thiserror::Error)]
pub enum NetTesterError {
    #[error("backend error: {0}")]
    Backend(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("interface error: {0}")]
    Interface(String),

    #[error("probe error: {0}")]
    Probe(String),

    #[error("platform error: {0}")]
    Platform(String),

    #[error("task error: {0}")]
    Task(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, NetTesterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_display() {
        let e = NetTesterError::Backend("no display".into());
        assert_eq!(format!("{e}"), "backend error: no display");
    }

    #[test]
    fn config_error_display() {
        let e = NetTesterError::Config("missing key resolution".into());
        assert_eq!(format!("{e}"), "config error: missing key resolution");
    }

    #[test]
    fn interface_error_display() {
        let e = NetTesterError::Interface("eth9 vanished".into());
        assert_eq!(format!("{e}"), "interface error: eth9 vanished");
    }

    #[test]
    fn probe_error_display() {
        let e = NetTesterError::Probe("scan failed".into());
        assert_eq!(format!("{e}"), "probe error: scan failed");
    }

    #[test]
    fn platform_error_display() {
        let e = NetTesterError::Platform("poweroff refused".into());
        assert_eq!(format!("{e}"), "platform error: poweroff refused");
    }

    #[test]
    fn task_error_display() {
        let e = NetTesterError::Task("already running".into());
        assert_eq!(format!("{e}"), "task error: already running");
    }

    #[test]
    fn io_error_from_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let e: NetTesterError = io_err.into();
        let msg = format!("{e}");
        assert!(msg.contains("I/O error"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn toml_error_from_conversion() {
        let bad_toml = "this is [[[not valid toml";
        let toml_err = toml::from_str::<toml::Value>(bad_toml).unwrap_err();
        let e: NetTesterError = toml_err.into();
        assert!(format!("{e}").contains("TOML parse error"));
    }

    #[test]
    fn result_alias_err() {
        let r: Result<i32> = Err(NetTesterError::Probe("oops".into()));
        assert!(r.is_err());
    }
}
