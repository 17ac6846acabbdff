// Copyright 2025 Neurite Developers
// SPDX-License-Identifier: Apache-2.0

//! # Neurite - Spatial Neuron Culture Generator
//!
//! Neurite grows two-dimensional neuronal cultures: somas are scattered over a
//! chamber, each grows a collision-avoiding axon and a circular dendritic
//! field, and a directed edge is recorded whenever an axon crosses another
//! cell's dendritic field. The resulting network can be peeled into k-cores.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! neurite = "0.3"
//! ```
//!
//! ```rust,no_run
//! use neurite::prelude::*;
//!
//! let mut config = NeuriteConfig::default();
//! config.system.seed = Some(42);
//! config.culture.neurons = 2000;
//!
//! let mut culture = Culture::new(config)?;
//! culture.develop()?;
//! let cores = culture.k_core(EdgeDirection::Input)?;
//! println!("max core: {}", cores.max_core());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Crates
//!
//! - [`config`]: TOML configuration with environment and CLI overrides
//! - [`culture`]: lattice, placement, growth, connectivity and k-core
//! - [`observability`]: logging initialisation and `--debug-*` flags
//!
//! ## Feature Flags
//!
//! - **`file-logging`**: per-run JSON log files next to console output

/// Umbrella crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use neurite_config as config;
pub use neurite_culture as culture;
pub use neurite_observability as observability;

/// Commonly used types for building and analysing cultures
pub mod prelude {
    pub use neurite_config::{
        load_config, BoundaryConditions, ChamberShape, EdgeDirection, NeuriteConfig,
    };
    pub use neurite_culture::{
        Cell, CellIndex, Chamber, CoreDecomposition, Culture, CultureError, CultureResult,
        DevelopmentProgress, DevelopmentStage,
    };
}
