// Copyright 2025 Neurite Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Spatial indexing: geometric primitives and the bucket lattice that stores them.
*/

pub mod lattice;
pub mod primitive;

pub use lattice::{BoundaryMode, Lattice, PrimitiveId};
pub use primitive::{rectangle_corners, ClassTag, PeriodicDomain, Primitive, Shape};
