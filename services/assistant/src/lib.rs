//! Auxilia Service Library Crate
//!
//! Configuration loading and the console speech engines used by the
//! `assistant` binary, which is a thin wrapper around this library and
//! `auxilia-core`.

pub mod config;
pub mod console;
