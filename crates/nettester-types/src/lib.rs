//! Foundation types and traits for NetTester.
//!
//! This crate contains the platform-agnostic types shared by all NetTester
//! crates: colors, rectangles, input events, the rendering/input backend
//! traits, and the error type.

pub mod backend;
pub mod error;
pub mod input;
