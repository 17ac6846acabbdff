// Copyright 2025 Neurite Developers
// SPDX-License-Identifier: Apache-2.0

/*!
A single neuron of the culture.

Cells refer to each other only by [`CellIndex`]; the chamber owns the cell
collection and the lattice that holds their geometry.
*/

use glam::DVec2;

use crate::spatial::{ClassTag, Primitive};
use crate::types::CellIndex;

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub index: CellIndex,
    pub position: DVec2,
    pub soma_radius: f64,
    /// Zero until the dendritic field has been grown
    pub dendrite_radius: f64,
    /// Sampled total axon length
    pub axon_length: f64,
    /// End point of every axon segment, in growth order
    pub axon_segments: Vec<DVec2>,
    /// Sorted, deduplicated
    pub inputs: Vec<CellIndex>,
    /// Sorted, deduplicated
    pub outputs: Vec<CellIndex>,
    /// Core level from the latest k-core peel
    pub core_index: u32,
    /// Dendritic radius drawn from the enhanced population
    pub enhanced: bool,
}

impl Cell {
    pub fn new(index: CellIndex, position: DVec2, soma_radius: f64) -> Self {
        Self {
            index,
            position,
            soma_radius,
            dendrite_radius: 0.0,
            axon_length: 0.0,
            axon_segments: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            core_index: 0,
            enhanced: false,
        }
    }

    pub fn soma_disk(&self) -> Primitive {
        Primitive::disk(self.position, self.soma_radius, ClassTag::SOMA, Some(self.index))
    }

    pub fn dendrite_disk(&self) -> Primitive {
        Primitive::disk(
            self.position,
            self.dendrite_radius,
            ClassTag::DENDRITE,
            Some(self.index),
        )
    }

    /// The axon as a chain of its segment end points
    pub fn axon_chain(&self) -> Primitive {
        Primitive::chain(self.axon_segments.clone(), ClassTag::AXON, Some(self.index))
    }

    /// Straight-line distance from the soma to the axon tip
    pub fn axon_end_to_end_distance(&self) -> f64 {
        self.axon_segments
            .last()
            .map_or(0.0, |tip| tip.distance(self.position))
    }

    /// Replace the axon geometry
    pub fn set_axon(&mut self, length: f64, segments: Vec<DVec2>) {
        self.axon_length = length;
        self.axon_segments = segments;
    }

    /// Union of inputs and outputs, each neighbour once
    pub fn undirected_neighbors(&self) -> Vec<CellIndex> {
        let mut neighbors: Vec<CellIndex> =
            self.inputs.iter().chain(self.outputs.iter()).copied().collect();
        neighbors.sort_unstable();
        neighbors.dedup();
        neighbors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::Shape;

    #[test]
    fn test_undirected_neighbors_deduplicated() {
        let mut cell = Cell::new(0, DVec2::ZERO, 0.01);
        cell.inputs = vec![2, 5];
        cell.outputs = vec![1, 2];
        assert_eq!(cell.undirected_neighbors(), vec![1, 2, 5]);
    }

    #[test]
    fn test_end_to_end_distance() {
        let mut cell = Cell::new(3, DVec2::new(1.0, 1.0), 0.01);
        assert_eq!(cell.axon_end_to_end_distance(), 0.0);

        cell.set_axon(0.7, vec![DVec2::new(1.3, 1.0), DVec2::new(1.3, 1.4)]);
        assert!((cell.axon_end_to_end_distance() - 0.5).abs() < 1e-12);
        assert_eq!(cell.axon_length, 0.7);
    }

    #[test]
    fn test_primitives_carry_owner_and_class() {
        let mut cell = Cell::new(7, DVec2::new(0.2, -0.1), 0.01);
        cell.dendrite_radius = 0.05;

        let dendrite = cell.dendrite_disk();
        assert_eq!(dendrite.owner, Some(7));
        assert_eq!(dendrite.class, ClassTag::DENDRITE);
        assert_eq!(
            dendrite.shape,
            Shape::Disk {
                center: DVec2::new(0.2, -0.1),
                radius: 0.05
            }
        );
        assert_eq!(cell.soma_disk().class, ClassTag::SOMA);
        assert_eq!(cell.axon_chain().class, ClassTag::AXON);
    }
}
