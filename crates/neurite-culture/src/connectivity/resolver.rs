// Copyright 2025 Neurite Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Synaptogenesis: axon to dendritic-field resolution.

A cell connects to every other cell whose dendritic field its axon crosses.
Candidates come from the lattice, walking the axon one segment at a time;
each candidate is then confirmed against the real dendritic disk, including
its periodic images.
*/

use std::collections::BTreeSet;
use tracing::trace;

use crate::models::Cell;
use crate::spatial::{ClassTag, Lattice};
use crate::types::CellIndex;

/// Targets of cell `origin`, sorted ascending
///
/// Requires every dendritic field to be in the lattice already.
pub fn find_output_connections(lattice: &Lattice, cells: &[Cell], origin: CellIndex) -> Vec<CellIndex> {
    let Some(source) = cells.get(origin) else {
        return Vec::new();
    };
    let points = &source.axon_segments;
    if points.is_empty() {
        return Vec::new();
    }

    let mut candidates = BTreeSet::new();
    let mut collect = |span: &[glam::DVec2]| {
        for primitive in lattice.query_range(span) {
            if !primitive.class.overlaps(ClassTag::DENDRITE) {
                continue;
            }
            if let Some(owner) = primitive.owner.filter(|owner| *owner != origin) {
                candidates.insert(owner);
            }
        }
    };
    if points.len() == 1 {
        collect(points);
    } else {
        for pair in points.windows(2) {
            collect(pair);
        }
    }

    let axon = source.axon_chain();
    let periodic = lattice.periodic_domain();
    let targets: Vec<CellIndex> = candidates
        .into_iter()
        .filter(|target| {
            cells
                .get(*target)
                .map_or(false, |cell| axon.intersects(&cell.dendrite_disk(), periodic))
        })
        .collect();

    trace!(target: "neurite-culture", "Cell {} -> {:?}", origin, targets);
    targets
}

/// Rebuild every input list as the inverse of the output lists
pub fn invert_connections(cells: &mut [Cell]) {
    let edges: Vec<(CellIndex, CellIndex)> = cells
        .iter()
        .flat_map(|cell| cell.outputs.iter().map(move |target| (cell.index, *target)))
        .collect();

    for cell in cells.iter_mut() {
        cell.inputs.clear();
    }
    // Sources are visited in ascending order, so inputs stay sorted
    for (source, target) in edges {
        if let Some(cell) = cells.get_mut(target) {
            cell.inputs.push(source);
        }
    }
}
