// Copyright 2025 Neurite Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Uniform bucket lattice over the chamber.

Primitives live in an append-only arena; each bucket holds arena indices of
the primitives whose bounding box touches it. Queries return every primitive
referenced by the buckets spanned by a set of points, so results can contain
duplicates and false positives and must be confirmed with
[`Primitive::intersects`].

In periodic mode the lattice covers twice the domain in each direction and
every inserted primitive is stored together with three translated images, so
that lookups near one edge also see geometry from the opposite edge.
*/

use glam::{DMat2, DVec2};
use ndarray::Array2;
use neurite_config::BoundaryConditions;

use super::primitive::{PeriodicDomain, Primitive};
use crate::types::{CultureError, CultureResult};

/// Index into the lattice's primitive arena
pub type PrimitiveId = usize;

/// Edge behaviour of the lattice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryMode {
    Clamped,
    Periodic,
}

impl From<BoundaryConditions> for BoundaryMode {
    fn from(boundaries: BoundaryConditions) -> Self {
        match boundaries {
            BoundaryConditions::Clamped => BoundaryMode::Clamped,
            BoundaryConditions::Periodic => BoundaryMode::Periodic,
        }
    }
}

/// Bucketed spatial index
#[derive(Debug, Clone)]
pub struct Lattice {
    boundary: BoundaryMode,
    /// Top-left corner of the bucket grid
    origin: DVec2,
    e1: DVec2,
    e2: DVec2,
    to_basis: DMat2,
    domain: PeriodicDomain,
    /// `[e1 index, e2 index]`
    buckets: Array2<Vec<PrimitiveId>>,
    store: Vec<Primitive>,
}

impl Lattice {
    /// Axis-aligned lattice over a `width` x `height` domain whose top-left
    /// corner is `origin`
    pub fn new(
        boundary: BoundaryMode,
        origin: DVec2,
        unit_width: f64,
        unit_height: f64,
        width: f64,
        height: f64,
    ) -> CultureResult<Self> {
        Self::from_basis(
            boundary,
            origin,
            DVec2::new(unit_width, 0.0),
            DVec2::new(0.0, -unit_height),
            width,
            height,
        )
    }

    /// Lattice with an arbitrary unit cell spanned by `e1` and `e2`
    ///
    /// Bucket counts are taken along each basis vector so the grid covers
    /// `width` along `e1` and `height` along `e2`.
    pub fn from_basis(
        boundary: BoundaryMode,
        origin: DVec2,
        e1: DVec2,
        e2: DVec2,
        width: f64,
        height: f64,
    ) -> CultureResult<Self> {
        if !(width > 0.0 && height > 0.0) || !width.is_finite() || !height.is_finite() {
            return Err(CultureError::InvalidParameter(format!(
                "lattice domain must be positive, got {} x {}",
                width, height
            )));
        }
        let basis = DMat2::from_cols(e1, e2);
        if !(basis.determinant().abs() > f64::EPSILON) || !basis.is_finite() {
            return Err(CultureError::InvalidParameter(
                "lattice basis vectors are degenerate".to_string(),
            ));
        }

        let mut width_count = (width / e1.length()).ceil().max(1.0) as usize;
        let mut height_count = (height / e2.length()).ceil().max(1.0) as usize;
        let domain = PeriodicDomain {
            center: origin + e1.normalize() * (width / 2.0) + e2.normalize() * (height / 2.0),
            width,
            height,
        };

        let mut grid_origin = origin;
        if boundary == BoundaryMode::Periodic {
            // Double the extent, keeping the domain centred
            grid_origin = origin - e1.normalize() * (width / 2.0) - e2.normalize() * (height / 2.0);
            width_count *= 2;
            height_count *= 2;
        }

        Ok(Self {
            boundary,
            origin: grid_origin,
            e1,
            e2,
            to_basis: basis.inverse(),
            domain,
            buckets: Array2::from_elem((width_count, height_count), Vec::new()),
            store: Vec::new(),
        })
    }

    pub fn boundary(&self) -> BoundaryMode {
        self.boundary
    }

    /// Period information, present in periodic mode only
    pub fn periodic_domain(&self) -> Option<&PeriodicDomain> {
        match self.boundary {
            BoundaryMode::Periodic => Some(&self.domain),
            BoundaryMode::Clamped => None,
        }
    }

    /// Real (undoubled) domain width
    pub fn domain_width(&self) -> f64 {
        self.domain.width
    }

    /// Real (undoubled) domain height
    pub fn domain_height(&self) -> f64 {
        self.domain.height
    }

    pub fn domain_center(&self) -> DVec2 {
        self.domain.center
    }

    pub fn origin(&self) -> DVec2 {
        self.origin
    }

    pub fn basis(&self) -> (DVec2, DVec2) {
        (self.e1, self.e2)
    }

    pub fn width_count(&self) -> usize {
        self.buckets.dim().0
    }

    pub fn height_count(&self) -> usize {
        self.buckets.dim().1
    }

    /// Number of stored primitives, periodic images included
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn get(&self, id: PrimitiveId) -> Option<&Primitive> {
        self.store.get(id)
    }

    pub fn primitives(&self) -> impl Iterator<Item = &Primitive> {
        self.store.iter()
    }

    /// Store a primitive and reference it from every bucket it spans
    ///
    /// In periodic mode three translated images are stored as well. Returns
    /// the id of the original.
    pub fn insert(&mut self, primitive: Primitive) -> PrimitiveId {
        let images = self
            .periodic_domain()
            .map(|domain| domain.image_offsets(primitive.shape.anchor()));

        let id = self.register(primitive.clone());
        if let Some(offsets) = images {
            for offset in offsets {
                self.register(primitive.translated(offset));
            }
        }
        id
    }

    fn register(&mut self, primitive: Primitive) -> PrimitiveId {
        let id = self.store.len();
        let span = self.bucket_span(&primitive.bounding_box());
        self.store.push(primitive);
        if let Some(((min_e1, min_e2), (max_e1, max_e2))) = span {
            for i in min_e1..=max_e1 {
                for j in min_e2..=max_e2 {
                    self.buckets[[i, j]].push(id);
                }
            }
        }
        id
    }

    /// Bucket containing `point`, clamped onto the grid
    pub fn closest_bucket(&self, point: DVec2) -> (usize, usize) {
        let local = self.to_basis * (point - self.origin);
        let (width_count, height_count) = self.buckets.dim();
        (
            clamp_index(local.x.floor(), width_count),
            clamp_index(local.y.floor(), height_count),
        )
    }

    /// Inclusive bucket range covering all `points`
    fn bucket_span(&self, points: &[DVec2]) -> Option<((usize, usize), (usize, usize))> {
        let mut buckets = points.iter().map(|p| self.closest_bucket(*p));
        let first = buckets.next()?;
        Some(buckets.fold((first, first), |(min, max), (i, j)| {
            ((min.0.min(i), min.1.min(j)), (max.0.max(i), max.1.max(j)))
        }))
    }

    /// Ids of every primitive referenced by the buckets spanned by `points`
    ///
    /// May contain duplicates.
    pub fn query_ids(&self, points: &[DVec2]) -> Vec<PrimitiveId> {
        let Some(((min_e1, min_e2), (max_e1, max_e2))) = self.bucket_span(points) else {
            return Vec::new();
        };
        let mut ids = Vec::new();
        for i in min_e1..=max_e1 {
            for j in min_e2..=max_e2 {
                ids.extend_from_slice(&self.buckets[[i, j]]);
            }
        }
        ids
    }

    /// Candidate primitives around `points` (broad phase)
    pub fn query_range(&self, points: &[DVec2]) -> Vec<&Primitive> {
        self.query_ids(points)
            .into_iter()
            .map(|id| &self.store[id])
            .collect()
    }
}

fn clamp_index(value: f64, count: usize) -> usize {
    if value.is_nan() || value < 0.0 {
        0
    } else if value >= count as f64 {
        count - 1
    } else {
        value as usize
    }
}
