//! User-visible text, per UI language.

use std::str::FromStr;

use crate::error::{NetTesterError, Result};

/// UI language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    German,
    English,
}

impl FromStr for Locale {
    type Err = NetTesterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "de" | "german" | "deutsch" => Ok(Locale::German),
            "en" | "english" => Ok(Locale::English),
            other => Err(NetTesterError::Config(format!("unknown language {other:?}"))),
        }
    }
}

/// Every string the kiosk displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Strings {
    pub menu: &'static str,
    pub wireless: &'static str,
    pub wired: &'static str,
    pub shutdown: &'static str,
    pub check_internet: &'static str,
    pub wifi_scan: &'static str,
    pub custom_command: &'static str,
    pub page_up: &'static str,
    pub page_down: &'static str,

    pub please_wait: &'static str,
    pub title_wifi_scan: &'static str,
    pub title_check_net: &'static str,
    pub title_custom_command: &'static str,
    pub goodbye: &'static str,

    pub not_available: &'static str,
    pub no_networks: &'static str,
    pub invalid_target: &'static str,
    pub reachable: &'static str,
    pub unreachable: &'static str,
    pub command_failed: &'static str,
}

impl Strings {
    pub const GERMAN: Strings = Strings {
        menu: "Menü",
        wireless: "Wireless",
        wired: "Wired",
        shutdown: "Shutdown",
        check_internet: "Check Internet",
        wifi_scan: "Wifi-Scan",
        custom_command: "Custom Command",
        page_up: "Up",
        page_down: "Down",
        please_wait: "Bitte warten",
        title_wifi_scan: "WiFi-Scan",
        title_check_net: "Netztest",
        title_custom_command: "Eigener Befehl",
        goodbye: "Auf Wiedersehen",
        not_available: "Not available:",
        no_networks: "Keine Netzwerke gefunden",
        invalid_target: "Gegenstelle ungültig",
        reachable: "erreichbar",
        unreachable: "NICHT erreichbar",
        command_failed: "Programmausführung fehlgeschlagen",
    };

    pub const ENGLISH: Strings = Strings {
        menu: "Menu",
        wireless: "Wireless",
        wired: "Wired",
        shutdown: "Shutdown",
        check_internet: "Check Internet",
        wifi_scan: "Wifi-Scan",
        custom_command: "Custom Command",
        page_up: "Up",
        page_down: "Down",
        please_wait: "Please wait",
        title_wifi_scan: "WiFi-Scan",
        title_check_net: "Net test",
        title_custom_command: "Custom command",
        goodbye: "Goodbye",
        not_available: "Not available:",
        no_networks: "No networks found",
        invalid_target: "invalid target",
        reachable: "reachable",
        unreachable: "NOT reachable",
        command_failed: "Command execution failed",
    };

    pub fn for_locale(locale: Locale) -> &'static Strings {
        match locale {
            Locale::German => &Self::GERMAN,
            Locale::English => &Self::ENGLISH,
        }
    }
}
