//! Platform service abstractions for NetTester.
//!
//! [`services`] defines the traits the core talks to; [`linux`] implements
//! them for a Linux device.

pub mod linux;
pub mod services;

pub use linux::LinuxPlatform;
pub use services::*;
