// Copyright 2025 Neurite Developers
// SPDX-License-Identifier: Apache-2.0

/*!
The culture chamber.

The chamber owns the lattice and the cell collection for one run. Geometry
is only ever appended to the lattice: somas on placement, obstacle pixels and
walls up front, dendritic fields once axons are grown. Axons themselves are
kept on their cells and never stored in the lattice.

Coordinates are millimetres with the chamber centred on the origin and `y`
pointing up; the lattice origin is the top-left corner `(-w/2, h/2)`.
*/

use glam::DVec2;
use neurite_config::{AxonConfig, ChamberShape, NeuriteConfig, RadiusDistribution};
use rand::Rng;
use std::f64::consts::TAU;
use tracing::{debug, info, warn};

use crate::connectivity::resolver::{find_output_connections, invert_connections};
use crate::density::DensityMap;
use crate::growth::{self, AxonGrowth};
use crate::models::Cell;
use crate::pattern::ObstaclePattern;
use crate::rng::uniform;
use crate::spatial::{BoundaryMode, ClassTag, Lattice, Primitive};
use crate::types::{CellIndex, CultureError, CultureResult};

/// Outline of the chamber floor
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChamberGeometry {
    Rectangular { width: f64, height: f64 },
    Circular { radius: f64 },
}

impl ChamberGeometry {
    pub fn from_config(config: &NeuriteConfig) -> Self {
        match config.chamber.shape {
            ChamberShape::Rectangular => ChamberGeometry::Rectangular {
                width: config.chamber.width,
                height: config.chamber.height,
            },
            ChamberShape::Circular => ChamberGeometry::Circular {
                radius: config.chamber.radius,
            },
        }
    }

    /// Width and height of the bounding rectangle
    pub fn extent(&self) -> (f64, f64) {
        match *self {
            ChamberGeometry::Rectangular { width, height } => (width, height),
            ChamberGeometry::Circular { radius } => (2.0 * radius, 2.0 * radius),
        }
    }

    /// Uniform draw over the chamber floor
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> DVec2 {
        match *self {
            ChamberGeometry::Rectangular { width, height } => DVec2::new(
                uniform(rng, -0.5, 0.5) * width,
                uniform(rng, -0.5, 0.5) * height,
            ),
            ChamberGeometry::Circular { radius } => {
                let r = radius * rng.gen::<f64>().sqrt();
                DVec2::from_angle(uniform(rng, 0.0, TAU)) * r
            }
        }
    }
}

/// Result of placing one soma
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub index: CellIndex,
    /// Accepted after the retry limit, possibly overlapping
    pub forced: bool,
    pub attempts: u32,
}

pub struct Chamber {
    geometry: ChamberGeometry,
    lattice: Lattice,
    cells: Vec<Cell>,
    density_map: Option<DensityMap>,
    placement_max_retries: u32,
    soma_radius: f64,
}

impl Chamber {
    /// Empty chamber with its lattice (and walls, when configured)
    pub fn new(config: &NeuriteConfig) -> CultureResult<Self> {
        let geometry = ChamberGeometry::from_config(config);
        let (width, height) = geometry.extent();
        let soma_radius = config.soma.radius;
        let bucket = config.chamber.bucket_size_factor * soma_radius;
        if !(bucket > 0.0) {
            return Err(CultureError::InvalidParameter(format!(
                "bucket size must be positive, got {}",
                bucket
            )));
        }
        let boundary = BoundaryMode::from(config.chamber.boundaries);
        let origin = DVec2::new(-width / 2.0, height / 2.0);
        let lattice = Lattice::new(boundary, origin, bucket, bucket, width, height)?;

        info!(
            target: "neurite-culture",
            "🧫 Chamber {:?} {:.3} x {:.3} mm, {} x {} buckets of {:.4} mm ({:?})",
            config.chamber.shape,
            width,
            height,
            lattice.width_count(),
            lattice.height_count(),
            bucket,
            boundary
        );

        let mut chamber = Self {
            geometry,
            lattice,
            cells: Vec::new(),
            density_map: None,
            placement_max_retries: config.culture.placement_max_retries,
            soma_radius,
        };

        if config.chamber.walls {
            if boundary == BoundaryMode::Clamped {
                chamber.insert_walls(bucket);
            } else {
                warn!(target: "neurite-culture", "Walls are ignored in a periodic chamber");
            }
        }

        Ok(chamber)
    }

    /// Frame the domain with Boundary rectangles of the given thickness
    fn insert_walls(&mut self, thickness: f64) {
        let (width, height) = self.geometry.extent();
        let (left, top) = (-width / 2.0, height / 2.0);
        let walls = [
            Primitive::rectangle(
                DVec2::new(left - thickness, top + thickness),
                width + 2.0 * thickness,
                thickness,
                ClassTag::BOUNDARY,
            ),
            Primitive::rectangle(
                DVec2::new(left - thickness, -top),
                width + 2.0 * thickness,
                thickness,
                ClassTag::BOUNDARY,
            ),
            Primitive::rectangle(
                DVec2::new(left - thickness, top),
                thickness,
                height,
                ClassTag::BOUNDARY,
            ),
            Primitive::rectangle(DVec2::new(-left, top), thickness, height, ClassTag::BOUNDARY),
        ];
        for wall in walls {
            self.lattice.insert(wall);
        }
        debug!(target: "neurite-culture", "Inserted 4 boundary walls");
    }

    /// Draw soma positions from `map` instead of uniformly
    pub fn set_density_map(&mut self, map: DensityMap) {
        info!(target: "neurite-culture", "Using density map with {} cells", map.len());
        self.density_map = Some(map);
    }

    /// Insert one Pattern rectangle per obstacle pixel; returns the count
    pub fn assign_pattern(&mut self, pattern: &dyn ObstaclePattern) -> usize {
        let (columns, rows) = pattern.size_count();
        let unit = pattern.unit_size();
        let mut inserted = 0;
        for x in 0..columns {
            for y in 0..rows {
                if pattern.check_pixel(x, y) {
                    self.lattice.insert(Primitive::rectangle(
                        pattern.pixel_position(x, y),
                        unit.x,
                        unit.y,
                        ClassTag::PATTERN,
                    ));
                    inserted += 1;
                }
            }
        }
        info!(target: "neurite-culture", "Assigned pattern: {} obstacle pixels of {}", inserted, columns * rows);
        inserted
    }

    fn sample_position<R: Rng + ?Sized>(&self, rng: &mut R) -> DVec2 {
        match &self.density_map {
            Some(map) => map.sample(rng),
            None => self.geometry.sample(rng),
        }
    }

    /// Place the next soma by rejection sampling
    ///
    /// After `placement_max_retries` rejected draws the last candidate is
    /// accepted anyway.
    pub fn place_cell<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Placement {
        let index = self.cells.len();
        let mut attempts = 0;
        loop {
            attempts += 1;
            let position = self.sample_position(rng);
            let soma = Primitive::disk(position, self.soma_radius, ClassTag::SOMA, Some(index));
            let collides = self.check_intersections(&soma);
            if !collides || attempts >= self.placement_max_retries {
                if collides {
                    warn!(target: "neurite-culture", "⚠️ Retry limit reached placing cell {} after {} attempts", index, attempts);
                }
                self.place_cell_at(position);
                return Placement {
                    index,
                    forced: collides,
                    attempts,
                };
            }
        }
    }

    /// Place the next soma at a fixed position, without collision checks
    pub fn place_cell_at(&mut self, position: DVec2) -> CellIndex {
        let index = self.cells.len();
        let cell = Cell::new(index, position, self.soma_radius);
        self.lattice.insert(cell.soma_disk());
        self.cells.push(cell);
        index
    }

    /// True if `primitive` intersects anything stored in the lattice
    pub fn check_intersections(&self, primitive: &Primitive) -> bool {
        collides(&self.lattice, primitive, None, None)
    }

    /// Like [`Chamber::check_intersections`], restricted to the classes in
    /// `mask` and ignoring primitives owned by `exclude_owner`
    pub fn check_collisions(
        &self,
        primitive: &Primitive,
        mask: ClassTag,
        exclude_owner: Option<CellIndex>,
    ) -> bool {
        collides(&self.lattice, primitive, Some(mask), exclude_owner)
    }

    /// Grow the axon of cell `index` around the configured obstacle classes
    pub fn grow_axon<R: Rng + ?Sized>(
        &mut self,
        index: CellIndex,
        params: &AxonConfig,
        rng: &mut R,
    ) -> CultureResult<AxonGrowth> {
        let count = self.cells.len();
        let mask: ClassTag = params.collide_with.iter().copied().map(ClassTag::from).collect();
        let lattice = &self.lattice;
        let cell = self
            .cells
            .get_mut(index)
            .ok_or(CultureError::CellOutOfRange { index, count })?;
        Ok(growth::grow_axon(cell, params, rng, |segment| {
            collides(lattice, segment, Some(mask), Some(index))
        }))
    }

    /// Replace the axon of cell `index` with pre-computed geometry
    pub fn set_axon(&mut self, index: CellIndex, length: f64, segments: Vec<DVec2>) -> CultureResult<()> {
        let count = self.cells.len();
        let cell = self
            .cells
            .get_mut(index)
            .ok_or(CultureError::CellOutOfRange { index, count })?;
        cell.set_axon(length, segments);
        Ok(())
    }

    /// Grow the dendritic field of cell `index` and store it in the lattice
    pub fn grow_dendrite<R: Rng + ?Sized>(
        &mut self,
        index: CellIndex,
        distribution: &RadiusDistribution,
        rng: &mut R,
    ) -> CultureResult<()> {
        let count = self.cells.len();
        let cell = self
            .cells
            .get_mut(index)
            .ok_or(CultureError::CellOutOfRange { index, count })?;
        let disk = growth::grow_dendrite(cell, distribution, rng);
        self.lattice.insert(disk);
        Ok(())
    }

    /// Resolve every axon against the dendritic fields
    ///
    /// Outputs are computed per cell; inputs are their inverse. Returns the
    /// number of directed edges.
    pub fn grow_connections(&mut self) -> usize {
        let outputs: Vec<Vec<CellIndex>> = (0..self.cells.len())
            .map(|index| find_output_connections(&self.lattice, &self.cells, index))
            .collect();
        for (cell, targets) in self.cells.iter_mut().zip(outputs) {
            cell.outputs = targets;
        }
        invert_connections(&mut self.cells);
        self.cells.iter().map(|cell| cell.outputs.len()).sum()
    }

    pub fn geometry(&self) -> ChamberGeometry {
        self.geometry
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    pub fn cell(&self, index: CellIndex) -> Option<&Cell> {
        self.cells.get(index)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Narrow-phase check of `primitive` against the lattice candidates
fn collides(
    lattice: &Lattice,
    primitive: &Primitive,
    mask: Option<ClassTag>,
    exclude_owner: Option<CellIndex>,
) -> bool {
    let periodic = lattice.periodic_domain();
    lattice
        .query_range(&primitive.bounding_box())
        .into_iter()
        .filter(|candidate| mask.map_or(true, |mask| candidate.class.overlaps(mask)))
        .filter(|candidate| exclude_owner.is_none() || candidate.owner != exclude_owner)
        .any(|candidate| candidate.intersects(primitive, periodic))
}
