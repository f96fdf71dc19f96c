//! Test utilities for Rately services.
//!
//! Import in `#[cfg(test)]` blocks or test binaries only — never in
//! production code.

pub mod auth;
