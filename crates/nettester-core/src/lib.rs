//! NetTester core.
//!
//! Platform-agnostic kiosk logic: layout geometry, text pagination, button
//! tables, background probes, the interaction controller, the frame painter
//! and the runtime loop. Drawing goes through the backend traits from
//! `nettester-types`; operating system access goes through the services in
//! `nettester-platform`.

// Re-exports from nettester-types (foundation types and traits).
pub use nettester_types::backend;
pub use nettester_types::error;
pub use nettester_types::input;

pub use nettester_platform as platform;

pub mod buttons;
pub mod config;
pub mod controller;
pub mod layout;
pub mod net;
pub mod paginate;
pub mod probe;
pub mod render;
pub mod runtime;
pub mod strings;
pub mod task;

#[cfg(test)]
pub(crate) mod test_utils;
