// Copyright 2025 Neurite Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Obstacle patterns.

A pattern is a raster of pixels over the chamber; every set pixel becomes a
Pattern-class rectangle in the lattice. Pixel `(x, y)` hangs from
`origin + (unit.x * x, -unit.y * y)`, so row 0 is the top of the chamber.
*/

use glam::DVec2;
use ndarray::Array2;
use std::fs;
use std::path::Path;

use crate::types::{CultureError, CultureResult};

/// Read-only view of a rasterised obstacle map
pub trait ObstaclePattern {
    /// True if the pixel at column `x`, row `y` is an obstacle
    fn check_pixel(&self, x: usize, y: usize) -> bool;

    /// Size of one pixel
    fn unit_size(&self) -> DVec2;

    /// Top-left corner of pixel `(0, 0)`
    fn origin(&self) -> DVec2;

    /// Pixel counts `(columns, rows)`
    fn size_count(&self) -> (usize, usize);

    /// Top-left corner of pixel `(x, y)`
    fn pixel_position(&self, x: usize, y: usize) -> DVec2 {
        let unit = self.unit_size();
        self.origin() + DVec2::new(unit.x * x as f64, -unit.y * y as f64)
    }

    /// Physical extent of the whole pattern
    fn size(&self) -> DVec2 {
        let (columns, rows) = self.size_count();
        self.unit_size() * DVec2::new(columns as f64, rows as f64)
    }
}

/// In-memory boolean raster, indexed `[x, y]`
#[derive(Debug, Clone, PartialEq)]
pub struct BitmapPattern {
    pixels: Array2<bool>,
    origin: DVec2,
    unit_size: DVec2,
}

impl BitmapPattern {
    /// Pattern stretched over a `width` x `height` area centred on the origin
    ///
    /// A non-positive `height` keeps the raster's aspect ratio.
    pub fn new(pixels: Array2<bool>, width: f64, height: f64) -> CultureResult<Self> {
        let (columns, rows) = pixels.dim();
        if columns == 0 || rows == 0 {
            return Err(CultureError::InvalidParameter(
                "pattern raster is empty".to_string(),
            ));
        }
        if !(width > 0.0) {
            return Err(CultureError::InvalidParameter(format!(
                "pattern width must be positive, got {}",
                width
            )));
        }
        let height = if height > 0.0 {
            height
        } else {
            width * rows as f64 / columns as f64
        };

        Ok(Self {
            origin: DVec2::new(-width / 2.0, height / 2.0),
            unit_size: DVec2::new(width / columns as f64, height / rows as f64),
            pixels,
        })
    }

    /// Pattern with an explicit origin and pixel size
    pub fn with_origin(pixels: Array2<bool>, origin: DVec2, unit_size: DVec2) -> Self {
        Self {
            pixels,
            origin,
            unit_size,
        }
    }

    /// Parse a plain-text raster
    ///
    /// One row per line, whitespace-separated grey levels; any level above
    /// zero is an obstacle. Blank lines and lines starting with `#` or `%`
    /// are skipped.
    pub fn parse(text: &str, source: &Path, width: f64, height: f64) -> CultureResult<Self> {
        let mut rows: Vec<Vec<bool>> = Vec::new();
        for (line_number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('%') {
                continue;
            }
            let row = line
                .split_whitespace()
                .map(|token| {
                    token.parse::<f64>().map(|level| level > 0.0).map_err(|_| {
                        CultureError::invalid_map(
                            source,
                            line_number + 1,
                            format!("invalid grey level '{}'", token),
                        )
                    })
                })
                .collect::<CultureResult<Vec<bool>>>()?;
            if let Some(first) = rows.first() {
                if first.len() != row.len() {
                    return Err(CultureError::invalid_map(
                        source,
                        line_number + 1,
                        format!("expected {} columns, found {}", first.len(), row.len()),
                    ));
                }
            }
            rows.push(row);
        }

        let columns = rows.first().map_or(0, Vec::len);
        let pixels = Array2::from_shape_fn((columns, rows.len()), |(x, y)| rows[y][x]);
        Self::new(pixels, width, height)
    }

    /// Load a plain-text raster from disk
    pub fn load(path: &Path, width: f64, height: f64) -> CultureResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| CultureError::io(path, e))?;
        Self::parse(&text, path, width, height)
    }

    /// Number of obstacle pixels
    pub fn obstacle_count(&self) -> usize {
        self.pixels.iter().filter(|set| **set).count()
    }
}

impl ObstaclePattern for BitmapPattern {
    fn check_pixel(&self, x: usize, y: usize) -> bool {
        self.pixels.get([x, y]).copied().unwrap_or(false)
    }

    fn unit_size(&self) -> DVec2 {
        self.unit_size
    }

    fn origin(&self) -> DVec2 {
        self.origin
    }

    fn size_count(&self) -> (usize, usize) {
        self.pixels.dim()
    }
}
