// Copyright 2025 Neurite Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Weighted placement map.

Each entry is the top-left corner of a map cell plus a weight. A draw picks a
cell with probability proportional to its weight, then jitters uniformly
inside the cell's footprint (right and down from the corner).
*/

use glam::DVec2;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use std::fs;
use std::path::Path;

use crate::types::{CultureError, CultureResult};

#[derive(Debug, Clone)]
pub struct DensityMap {
    cells: Vec<DVec2>,
    weights: Vec<f64>,
    index: WeightedIndex<f64>,
    cell_width: f64,
    cell_height: f64,
}

impl DensityMap {
    /// Build a map from `(corner, weight)` entries
    pub fn new(entries: Vec<(DVec2, f64)>, cell_width: f64, cell_height: f64) -> CultureResult<Self> {
        if !(cell_width > 0.0 && cell_height > 0.0) {
            return Err(CultureError::InvalidParameter(format!(
                "density map cell size must be positive, got {} x {}",
                cell_width, cell_height
            )));
        }
        let (cells, weights): (Vec<DVec2>, Vec<f64>) = entries.into_iter().unzip();
        let index = WeightedIndex::new(&weights).map_err(|e| {
            CultureError::InvalidParameter(format!("density map weights rejected: {}", e))
        })?;

        Ok(Self {
            cells,
            weights,
            index,
            cell_width,
            cell_height,
        })
    }

    /// Parse `x y weight` lines; `#`/`%` comments and blank lines are skipped
    pub fn parse(text: &str, source: &Path, cell_width: f64, cell_height: f64) -> CultureResult<Self> {
        let mut entries = Vec::new();
        for (line_number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('%') {
                continue;
            }
            let fields = line
                .split_whitespace()
                .map(str::parse::<f64>)
                .collect::<Result<Vec<f64>, _>>()
                .map_err(|e| CultureError::invalid_map(source, line_number + 1, e.to_string()))?;
            match fields.as_slice() {
                [x, y, weight] => entries.push((DVec2::new(*x, *y), *weight)),
                _ => {
                    return Err(CultureError::invalid_map(
                        source,
                        line_number + 1,
                        format!("expected 3 fields, found {}", fields.len()),
                    ))
                }
            }
        }
        if entries.is_empty() {
            return Err(CultureError::invalid_map(source, 0, "no entries"));
        }
        Self::new(entries, cell_width, cell_height)
    }

    pub fn load(path: &Path, cell_width: f64, cell_height: f64) -> CultureResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| CultureError::io(path, e))?;
        Self::parse(&text, path, cell_width, cell_height)
    }

    /// Draw a position: weighted cell choice, then uniform jitter inside it
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> DVec2 {
        let corner = self.cells[self.index.sample(rng)];
        let jitter_x: f64 = rng.gen();
        let jitter_y: f64 = rng.gen();
        DVec2::new(
            corner.x + jitter_x * self.cell_width,
            corner.y - jitter_y * self.cell_height,
        )
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn total_weight(&self) -> f64 {
        self.weights.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded_rng;

    #[test]
    fn test_single_entry_stays_in_cell() {
        let map = DensityMap::new(vec![(DVec2::ZERO, 1.0)], 0.02, 0.02).unwrap();
        let (mut rng, _) = seeded_rng(Some(11));
        for _ in 0..1000 {
            let p = map.sample(&mut rng);
            assert!((-0.01..=0.03).contains(&p.x), "x out of cell: {}", p.x);
            assert!((-0.03..=0.01).contains(&p.y), "y out of cell: {}", p.y);
        }
    }

    #[test]
    fn test_zero_weight_cells_never_drawn() {
        let text = "% x y weight\n0 0 0\n1 1 2.5\n";
        let map = DensityMap::parse(text, Path::new("density.txt"), 0.1, 0.1).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.total_weight(), 2.5);

        let (mut rng, _) = seeded_rng(Some(5));
        for _ in 0..200 {
            let p = map.sample(&mut rng);
            assert!(p.x >= 1.0 && p.y <= 1.0);
        }
    }

    #[test]
    fn test_malformed_line() {
        let err = DensityMap::parse("0 0 1\n0 1\n", Path::new("d.txt"), 0.1, 0.1).unwrap_err();
        assert!(matches!(err, CultureError::InvalidMap { line: 2, .. }));

        let err = DensityMap::parse("0 zero 1\n", Path::new("d.txt"), 0.1, 0.1).unwrap_err();
        assert!(matches!(err, CultureError::InvalidMap { line: 1, .. }));
    }

    #[test]
    fn test_all_zero_weights_rejected() {
        assert!(DensityMap::new(vec![(DVec2::ZERO, 0.0)], 0.1, 0.1).is_err());
    }
}
