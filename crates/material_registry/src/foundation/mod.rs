//! Foundation module - Core utilities shared by the registry and its tools
//!
//! - Logging utilities

pub mod logging;
