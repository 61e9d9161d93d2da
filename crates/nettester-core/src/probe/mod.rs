//! The three background probes.
//!
//! Each probe is a plain function over the platform services. Probes never
//! return errors: every failure is encoded as a text line for the text box.
//! [`ProbeContext`] packages what a probe needs so that the controller can
//! hand an owned operation to the [`TaskRunner`](crate::task::TaskRunner).

pub mod custom;
pub mod reach;
pub mod wifi;

use std::sync::Arc;

use crate::platform::Platform;
use crate::strings::Strings;
use crate::task::{CancelToken, ProbeKind};

pub use custom::run_custom_command;
pub use reach::{RemoteTarget, check_remotes, classify_remote};
pub use wifi::scan_networks;

/// An owned probe operation, ready to move onto a worker thread.
pub type ProbeOperation = Box<dyn FnOnce(&CancelToken) -> Option<Vec<String>> + Send>;

/// Inputs shared by all probes.
#[derive(Clone)]
pub struct ProbeContext {
    pub platform: Arc<dyn Platform>,
    pub strings: &'static Strings,
    /// Wireless interfaces to scan (placeholder excluded).
    pub wireless_interfaces: Vec<String>,
    pub remotes: Vec<String>,
    pub custom_command: String,
}

impl ProbeContext {
    /// Build the operation for `kind`. Everything it needs is cloned in.
    pub fn operation(&self, kind: ProbeKind) -> ProbeOperation {
        let platform = Arc::clone(&self.platform);
        let strings = self.strings;
        match kind {
            ProbeKind::WifiScan => {
                let interfaces = self.wireless_interfaces.clone();
                Box::new(move |cancel: &CancelToken| {
                    scan_networks(platform.as_ref(), &interfaces, strings, cancel)
                })
            },
            ProbeKind::Reachability => {
                let remotes = self.remotes.clone();
                Box::new(move |cancel: &CancelToken| {
                    check_remotes(platform.as_ref(), &remotes, strings, cancel)
                })
            },
            ProbeKind::CustomCommand => {
                let command = self.custom_command.clone();
                Box::new(move |_: &CancelToken| {
                    Some(run_custom_command(platform.as_ref(), &command, strings))
                })
            },
        }
    }
}
