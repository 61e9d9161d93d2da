//! Custom command probe.

use crate::platform::ProcessService;
use crate::strings::Strings;

/// Run the configured command without a shell and return its stdout lines.
///
/// An empty command, a launch failure, or a non-zero exit all produce exactly
/// one failure line.
pub fn run_custom_command(
    platform: &(impl ProcessService + ?Sized),
    command: &str,
    strings: &Strings,
) -> Vec<String> {
    let argv: Vec<String> = command.split_whitespace().map(String::from).collect();
    if argv.is_empty() {
        log::warn!("Custom command is empty");
        return vec![strings.command_failed.to_string()];
    }

    match platform.run(&argv) {
        Ok(out) if out.success => out.stdout.lines().map(String::from).collect(),
        Ok(_) => {
            log::warn!("Custom command {:?} exited unsuccessfully", argv[0]);
            vec![strings.command_failed.to_string()]
        },
        Err(e) => {
            log::warn!("Custom command {:?} failed: {e}", argv[0]);
            vec![strings.command_failed.to_string()]
        },
    }
}
