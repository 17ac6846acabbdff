// Copyright 2025 Neurite Developers
// SPDX-License-Identifier: Apache-2.0

//! # neurite-observability
//!
//! Logging setup shared by the neurite crates and tools, with per-crate
//! debug flag support.
//!
//! ## Features
//! - `file-logging`: JSON log files in a timestamped run folder

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

// Re-export commonly used items
pub use cli::*;
pub use config::*;
pub use init::*;

/// Known neurite crate names for debug flags
///
/// These double as the `target` of every log line emitted by the crate.
pub const KNOWN_CRATES: &[&str] = &[
    "neurite",
    "neurite-config",
    "neurite-culture",
    "neurite-observability",
];
