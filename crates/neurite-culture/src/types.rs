// Copyright 2025 Neurite Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Core types for culture generation.
*/

use std::path::PathBuf;

/// Stable index of a cell inside its chamber
pub type CellIndex = usize;

/// Result type for culture operations
pub type CultureResult<T> = Result<T, CultureError>;

/// Errors that can occur while building a culture
#[derive(Debug, thiserror::Error)]
pub enum CultureError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid map {}, line {line}: {reason}", .path.display())]
    InvalidMap {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Cell {index} out of range (culture has {count} cells)")]
    CellOutOfRange { index: CellIndex, count: usize },

    #[error("Stage {requested} cannot run after {current}")]
    StageOrder {
        requested: &'static str,
        current: &'static str,
    },

    #[error(transparent)]
    Config(#[from] neurite_config::ConfigError),
}

impl CultureError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CultureError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_map(path: impl Into<PathBuf>, line: usize, reason: impl Into<String>) -> Self {
        CultureError::InvalidMap {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }
}
