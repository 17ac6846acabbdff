// Copyright 2025 Neurite Developers
// SPDX-License-Identifier: Apache-2.0

/*!
k-core decomposition.

Cells are peeled level by level. At level `k` every cell that survived level
`k - 1` is promoted to `k`, then cells with fewer than `k` neighbours at
level `k` are demoted back until nothing changes. The surviving population
of each level is recorded; peeling stops at the first level that promotes
nobody. Each cell ends with `core_index` equal to the highest level it
survived.

Neighbours are taken from inputs, outputs, or their union.
*/

use neurite_config::EdgeDirection;
use serde::Serialize;
use tracing::{debug, info};

use crate::models::Cell;
use crate::types::CellIndex;

/// Per-level survivor counts of one peel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoreDecomposition {
    pub direction: EdgeDirection,
    /// `populations[k - 1]` cells survived level `k`
    pub populations: Vec<usize>,
    /// Populations divided by the number of cells
    pub ratios: Vec<f64>,
}

impl CoreDecomposition {
    /// Highest non-empty level, 0 for a graph without edges
    pub fn max_core(&self) -> u32 {
        self.populations.len() as u32
    }
}

fn neighbors(cell: &Cell, direction: EdgeDirection) -> Vec<CellIndex> {
    match direction {
        EdgeDirection::Input => cell.inputs.clone(),
        EdgeDirection::Output => cell.outputs.clone(),
        EdgeDirection::Undirected => cell.undirected_neighbors(),
    }
}

/// Peel the culture graph, writing each cell's `core_index`
pub fn k_core(cells: &mut [Cell], direction: EdgeDirection) -> CoreDecomposition {
    info!(target: "neurite-culture", "🔬 Computing {} k-core over {} cells", direction.as_str(), cells.len());

    let adjacency: Vec<Vec<CellIndex>> = cells.iter().map(|cell| neighbors(cell, direction)).collect();
    for cell in cells.iter_mut() {
        cell.core_index = 0;
    }

    let mut populations = Vec::new();
    let mut current: u32 = 1;
    loop {
        let mut promoted = 0;
        for cell in cells.iter_mut().filter(|cell| cell.core_index == current - 1) {
            cell.core_index = current;
            promoted += 1;
        }
        if promoted == 0 {
            break;
        }

        let mut changed = true;
        while changed {
            changed = false;
            for index in 0..cells.len() {
                if cells[index].core_index != current {
                    continue;
                }
                let active = adjacency[index]
                    .iter()
                    .filter(|n| cells.get(**n).map_or(false, |c| c.core_index == current))
                    .count();
                if (active as u32) < current {
                    cells[index].core_index = current - 1;
                    changed = true;
                }
            }
        }

        let survivors = cells.iter().filter(|cell| cell.core_index == current).count();
        debug!(target: "neurite-culture", "k = {}: {} promoted, {} survived", current, promoted, survivors);
        if survivors > 0 {
            populations.push(survivors);
        }
        current += 1;
    }

    let total = cells.len().max(1) as f64;
    let ratios = populations.iter().map(|p| *p as f64 / total).collect();
    info!(target: "neurite-culture", "✅ {} k-core: {} levels", direction.as_str(), populations.len());

    CoreDecomposition {
        direction,
        populations,
        ratios,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    /// Cells wired from a directed edge list, inputs derived from outputs
    fn graph(count: usize, edges: &[(CellIndex, CellIndex)]) -> Vec<Cell> {
        let mut cells: Vec<Cell> = (0..count).map(|i| Cell::new(i, DVec2::ZERO, 0.01)).collect();
        for (source, target) in edges {
            cells[*source].outputs.push(*target);
        }
        crate::connectivity::invert_connections(&mut cells);
        cells
    }

    #[test]
    fn test_three_cycle_directed() {
        let mut cells = graph(3, &[(0, 1), (1, 2), (2, 0)]);
        for direction in [EdgeDirection::Input, EdgeDirection::Output] {
            let cores = k_core(&mut cells, direction);
            assert_eq!(cores.populations, vec![3]);
            assert_eq!(cores.ratios, vec![1.0]);
            assert!(cells.iter().all(|c| c.core_index == 1));
        }
    }

    #[test]
    fn test_three_cycle_undirected() {
        // A triangle is its own 2-core
        let mut cells = graph(3, &[(0, 1), (1, 2), (2, 0)]);
        let cores = k_core(&mut cells, EdgeDirection::Undirected);
        assert_eq!(cores.populations, vec![3, 3]);
        assert_eq!(cores.ratios, vec![1.0, 1.0]);
        assert_eq!(cores.max_core(), 2);
        assert!(cells.iter().all(|c| c.core_index == 2));
    }

    #[test]
    fn test_tail_is_peeled() {
        // Triangle 0-1-2 with a pendant 3 hanging off 0
        let mut cells = graph(4, &[(0, 1), (1, 2), (2, 0), (3, 0)]);
        let cores = k_core(&mut cells, EdgeDirection::Undirected);
        assert_eq!(cores.populations, vec![4, 3]);
        assert_eq!(cells[3].core_index, 1);
        assert_eq!(cells[0].core_index, 2);
        assert_eq!(cores.ratios, vec![1.0, 0.75]);
    }

    #[test]
    fn test_isolated_cells() {
        let mut cells = graph(5, &[]);
        let cores = k_core(&mut cells, EdgeDirection::Undirected);
        assert!(cores.populations.is_empty());
        assert_eq!(cores.max_core(), 0);
        assert!(cells.iter().all(|c| c.core_index == 0));

        let cores = k_core(&mut [], EdgeDirection::Input);
        assert!(cores.ratios.is_empty());
    }
}
