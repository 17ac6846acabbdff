// Copyright 2025 Neurite Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Geometric primitives stored in the lattice.

A primitive is a shape plus a class tag and an optional owning cell. Shapes
are built once and never mutated; periodic images are produced as translated
copies.

Only the shape pairs the generator produces are supported by
[`Primitive::intersects`]:

| pair | test |
|---|---|
| disk / disk | centre distance against the radius sum |
| disk / rectangle | containment, edge distance and corner distance |
| segment / rectangle | endpoint containment and edge crossing |
| segment / disk | point-to-segment distance |
| chain / disk | chain vertices against the disk and its periodic images |

Any other pair is an internal invariant violation and panics.
*/

use glam::DVec2;
use std::fmt;
use std::ops::BitOr;

use crate::types::CellIndex;

/// Bitmask of primitive classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ClassTag(u8);

impl ClassTag {
    pub const NONE: ClassTag = ClassTag(0x00);
    pub const SOMA: ClassTag = ClassTag(0x01);
    pub const AXON: ClassTag = ClassTag(0x02);
    pub const PATTERN: ClassTag = ClassTag(0x04);
    pub const BOUNDARY: ClassTag = ClassTag(0x08);
    pub const DENDRITE: ClassTag = ClassTag(0x10);

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// True if the two masks share at least one class
    pub const fn overlaps(self, other: ClassTag) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for ClassTag {
    type Output = ClassTag;

    fn bitor(self, rhs: ClassTag) -> ClassTag {
        ClassTag(self.0 | rhs.0)
    }
}

impl From<neurite_config::CollisionClass> for ClassTag {
    fn from(class: neurite_config::CollisionClass) -> Self {
        match class {
            neurite_config::CollisionClass::Soma => ClassTag::SOMA,
            neurite_config::CollisionClass::Pattern => ClassTag::PATTERN,
            neurite_config::CollisionClass::Boundary => ClassTag::BOUNDARY,
        }
    }
}

impl FromIterator<ClassTag> for ClassTag {
    fn from_iter<I: IntoIterator<Item = ClassTag>>(iter: I) -> Self {
        iter.into_iter().fold(ClassTag::NONE, |acc, tag| acc | tag)
    }
}

/// Shape of a primitive
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Disk { center: DVec2, radius: f64 },
    /// Axis-aligned rectangle hanging from its top-left `corner` (+x, -y)
    Rectangle { corner: DVec2, width: f64, height: f64 },
    Segment { start: DVec2, end: DVec2 },
    /// Polyline through `points`
    Chain { points: Vec<DVec2> },
}

impl Shape {
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Disk { .. } => "disk",
            Shape::Rectangle { .. } => "rectangle",
            Shape::Segment { .. } => "segment",
            Shape::Chain { .. } => "chain",
        }
    }

    /// First point of the shape; periodic images are chosen from it
    pub fn anchor(&self) -> DVec2 {
        match self {
            Shape::Disk { center, .. } => *center,
            Shape::Rectangle { corner, .. } => *corner,
            Shape::Segment { start, .. } => *start,
            Shape::Chain { points } => points.first().copied().unwrap_or_default(),
        }
    }

    /// Same shape moved by `offset`
    pub fn translated(&self, offset: DVec2) -> Shape {
        match self {
            Shape::Disk { center, radius } => Shape::Disk {
                center: *center + offset,
                radius: *radius,
            },
            Shape::Rectangle {
                corner,
                width,
                height,
            } => Shape::Rectangle {
                corner: *corner + offset,
                width: *width,
                height: *height,
            },
            Shape::Segment { start, end } => Shape::Segment {
                start: *start + offset,
                end: *end + offset,
            },
            Shape::Chain { points } => Shape::Chain {
                points: points.iter().map(|p| *p + offset).collect(),
            },
        }
    }
}

/// Period and centre of a wrapping domain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodicDomain {
    pub center: DVec2,
    pub width: f64,
    pub height: f64,
}

impl PeriodicDomain {
    /// Offsets of the three periodic images of a point
    ///
    /// Each axis shifts by one period towards the opposite side of the domain:
    /// x-only, y-only, then both.
    pub fn image_offsets(&self, anchor: DVec2) -> [DVec2; 3] {
        let dx = if anchor.x < self.center.x {
            self.width
        } else {
            -self.width
        };
        let dy = if anchor.y > self.center.y {
            -self.height
        } else {
            self.height
        };
        [DVec2::new(dx, 0.0), DVec2::new(0.0, dy), DVec2::new(dx, dy)]
    }
}

/// A placed shape with its class and owning cell
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub shape: Shape,
    pub class: ClassTag,
    pub owner: Option<CellIndex>,
}

impl Primitive {
    pub fn disk(center: DVec2, radius: f64, class: ClassTag, owner: Option<CellIndex>) -> Self {
        Self {
            shape: Shape::Disk { center, radius },
            class,
            owner,
        }
    }

    pub fn rectangle(corner: DVec2, width: f64, height: f64, class: ClassTag) -> Self {
        Self {
            shape: Shape::Rectangle {
                corner,
                width,
                height,
            },
            class,
            owner: None,
        }
    }

    pub fn segment(start: DVec2, end: DVec2, class: ClassTag, owner: Option<CellIndex>) -> Self {
        Self {
            shape: Shape::Segment { start, end },
            class,
            owner,
        }
    }

    pub fn chain(points: Vec<DVec2>, class: ClassTag, owner: Option<CellIndex>) -> Self {
        Self {
            shape: Shape::Chain { points },
            class,
            owner,
        }
    }

    /// Copy moved by `offset`, keeping class and owner
    pub fn translated(&self, offset: DVec2) -> Self {
        Self {
            shape: self.shape.translated(offset),
            class: self.class,
            owner: self.owner,
        }
    }

    /// Points spanning the shape's extent, for bucket lookup only
    ///
    /// Disks and chains give their axis-aligned box corners, rectangles their
    /// corners in clockwise order, segments their two endpoints.
    pub fn bounding_box(&self) -> Vec<DVec2> {
        match &self.shape {
            Shape::Disk { center, radius } => {
                let r = DVec2::splat(radius.abs());
                box_corners(*center - r, *center + r).to_vec()
            }
            Shape::Rectangle {
                corner,
                width,
                height,
            } => rectangle_corners(*corner, *width, *height).to_vec(),
            Shape::Segment { start, end } => vec![*start, *end],
            Shape::Chain { points } => {
                let Some(first) = points.first() else {
                    return Vec::new();
                };
                let (min, max) = points
                    .iter()
                    .fold((*first, *first), |(min, max), p| (min.min(*p), max.max(*p)));
                box_corners(min, max).to_vec()
            }
        }
    }

    /// Exact intersection test
    ///
    /// `periodic` is only consulted by the chain / disk pair; the lattice
    /// already stores periodic images of every other primitive.
    ///
    /// # Panics
    ///
    /// Panics on a shape pair the generator never produces.
    pub fn intersects(&self, other: &Primitive, periodic: Option<&PeriodicDomain>) -> bool {
        use Shape::*;
        match (&self.shape, &other.shape) {
            (Disk { center: c1, radius: r1 }, Disk { center: c2, radius: r2 }) => {
                c1.distance(*c2) <= (r1 + r2).abs()
            }
            (Disk { center, radius }, Rectangle { corner, width, height })
            | (Rectangle { corner, width, height }, Disk { center, radius }) => {
                disk_rectangle(*center, *radius, &rectangle_corners(*corner, *width, *height))
            }
            (Segment { start, end }, Rectangle { corner, width, height })
            | (Rectangle { corner, width, height }, Segment { start, end }) => {
                segment_rectangle(*start, *end, &rectangle_corners(*corner, *width, *height))
            }
            (Segment { start, end }, Disk { center, radius })
            | (Disk { center, radius }, Segment { start, end }) => {
                point_segment_distance(*center, *start, *end) <= *radius
            }
            (Chain { points }, Disk { center, radius })
            | (Disk { center, radius }, Chain { points }) => {
                chain_disk(points, *center, *radius, periodic)
            }
            (Rectangle { .. }, Rectangle { .. })
            | (Rectangle { .. }, Chain { .. })
            | (Chain { .. }, Rectangle { .. })
            | (Segment { .. }, Segment { .. })
            | (Segment { .. }, Chain { .. })
            | (Chain { .. }, Segment { .. })
            | (Chain { .. }, Chain { .. }) => panic!(
                "unsupported primitive pair: {} / {}",
                self.shape.kind(),
                other.shape.kind()
            ),
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (class {:#04x}", self.shape.kind(), self.class.bits())?;
        if let Some(owner) = self.owner {
            write!(f, ", cell {}", owner)?;
        }
        write!(f, ")")
    }
}

fn box_corners(min: DVec2, max: DVec2) -> [DVec2; 4] {
    [
        DVec2::new(min.x, max.y),
        max,
        DVec2::new(max.x, min.y),
        min,
    ]
}

/// Corners clockwise from the top-left anchor
pub fn rectangle_corners(corner: DVec2, width: f64, height: f64) -> [DVec2; 4] {
    [
        corner,
        corner + DVec2::new(width, 0.0),
        corner + DVec2::new(width, -height),
        corner + DVec2::new(0.0, -height),
    ]
}

fn edges(corners: &[DVec2; 4]) -> impl Iterator<Item = (DVec2, DVec2)> + '_ {
    (0..4).map(move |i| (corners[i], corners[(i + 1) % 4]))
}

/// Inside a clockwise polygon: every edge sees the point on its right
fn inside_polygon(point: DVec2, corners: &[DVec2; 4]) -> bool {
    edges(corners).all(|(start, end)| (end - start).perp_dot(point - start) <= 0.0)
}

fn disk_rectangle(center: DVec2, radius: f64, corners: &[DVec2; 4]) -> bool {
    if inside_polygon(center, corners) {
        return true;
    }
    edges(corners).any(|(start, end)| {
        let edge = end - start;
        let length_squared = edge.length_squared();
        if length_squared > 0.0 {
            let t = (center - start).dot(edge) / length_squared;
            if (0.0..=1.0).contains(&t) && (start + edge * t).distance(center) <= radius {
                return true;
            }
        }
        center.distance(start) < radius || center.distance(end) < radius
    })
}

fn segment_rectangle(p1: DVec2, p2: DVec2, corners: &[DVec2; 4]) -> bool {
    if inside_polygon(p1, corners) || inside_polygon(p2, corners) {
        return true;
    }
    edges(corners).any(|(p3, p4)| {
        let det = (p4.y - p3.y) * (p2.x - p1.x) - (p4.x - p3.x) * (p2.y - p1.y);
        if det == 0.0 {
            return false;
        }
        let along_edge = ((p4.x - p3.x) * (p1.y - p3.y) - (p4.y - p3.y) * (p1.x - p3.x)) / det;
        let along_segment = ((p2.x - p1.x) * (p1.y - p3.y) - (p2.y - p1.y) * (p1.x - p3.x)) / det;
        (0.0..=1.0).contains(&along_edge) && (0.0..=1.0).contains(&along_segment)
    })
}

fn point_segment_distance(point: DVec2, start: DVec2, end: DVec2) -> f64 {
    let edge = end - start;
    let length_squared = edge.length_squared();
    if length_squared == 0.0 {
        return point.distance(start);
    }
    let t = ((point - start).dot(edge) / length_squared).clamp(0.0, 1.0);
    point.distance(start + edge * t)
}

// Vertex sampling only: a long segment passing through the disk without a
// vertex inside it is not detected.
fn chain_disk(
    points: &[DVec2],
    center: DVec2,
    radius: f64,
    periodic: Option<&PeriodicDomain>,
) -> bool {
    let images = periodic.map(|domain| domain.image_offsets(center));
    points.iter().any(|vertex| {
        if vertex.distance(center) <= radius {
            return true;
        }
        images.map_or(false, |offsets| {
            offsets
                .iter()
                .any(|offset| vertex.distance(center + *offset) <= radius)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn soma(x: f64, y: f64, r: f64) -> Primitive {
        Primitive::disk(DVec2::new(x, y), r, ClassTag::SOMA, Some(0))
    }

    fn pixel(x: f64, y: f64, w: f64, h: f64) -> Primitive {
        Primitive::rectangle(DVec2::new(x, y), w, h, ClassTag::PATTERN)
    }

    #[test]
    fn test_class_tags() {
        let mask: ClassTag = [ClassTag::PATTERN, ClassTag::BOUNDARY].into_iter().collect();
        assert!(mask.overlaps(ClassTag::PATTERN));
        assert!(!mask.overlaps(ClassTag::SOMA));
        assert!(!ClassTag::NONE.overlaps(ClassTag::DENDRITE));
        assert_eq!(ClassTag::DENDRITE.bits(), 0x10);
        assert_eq!(
            ClassTag::from(neurite_config::CollisionClass::Soma),
            ClassTag::SOMA
        );
    }

    #[test]
    fn test_disk_disk() {
        assert!(soma(0.0, 0.0, 0.01).intersects(&soma(0.015, 0.0, 0.01), None));
        assert!(soma(0.0, 0.0, 0.01).intersects(&soma(0.02, 0.0, 0.01), None));
        assert!(!soma(0.0, 0.0, 0.01).intersects(&soma(0.0201, 0.0, 0.01), None));
    }

    #[test]
    fn test_disk_rectangle() {
        let rect = pixel(0.0, 0.0, 1.0, 1.0);
        // Centre inside
        assert!(soma(0.5, -0.5, 0.01).intersects(&rect, None));
        // Touching the top edge from above
        assert!(soma(0.5, 0.005, 0.01).intersects(&rect, None));
        // Near the top-right corner, outside edge projections
        assert!(soma(1.005, 0.005, 0.01).intersects(&rect, None));
        // Clear of the rectangle
        assert!(!soma(1.5, 0.5, 0.01).intersects(&rect, None));
        // Symmetric
        assert!(rect.intersects(&soma(0.5, -0.5, 0.01), None));
    }

    #[test]
    fn test_segment_rectangle() {
        let rect = pixel(0.0, 0.0, 1.0, 1.0);
        let crossing = Primitive::segment(
            DVec2::new(-0.5, -0.5),
            DVec2::new(1.5, -0.5),
            ClassTag::AXON,
            Some(1),
        );
        let inside = Primitive::segment(
            DVec2::new(0.2, -0.2),
            DVec2::new(0.3, -0.3),
            ClassTag::AXON,
            Some(1),
        );
        let outside = Primitive::segment(
            DVec2::new(-0.5, 0.5),
            DVec2::new(1.5, 0.5),
            ClassTag::AXON,
            Some(1),
        );
        assert!(crossing.intersects(&rect, None));
        assert!(inside.intersects(&rect, None));
        assert!(!outside.intersects(&rect, None));
    }

    #[test]
    fn test_segment_disk() {
        let seg = Primitive::segment(
            DVec2::new(-1.0, 0.0),
            DVec2::new(1.0, 0.0),
            ClassTag::AXON,
            Some(1),
        );
        assert!(seg.intersects(&soma(0.0, 0.05, 0.1), None));
        assert!(!seg.intersects(&soma(0.0, 0.2, 0.1), None));
        assert!(!seg.intersects(&soma(1.2, 0.0, 0.1), None));
    }

    #[test]
    fn test_chain_disk_vertex_sampling() {
        let chain = Primitive::chain(
            vec![DVec2::new(-1.0, 0.0), DVec2::new(1.0, 0.0)],
            ClassTag::AXON,
            Some(2),
        );
        let dendrite = Primitive::disk(DVec2::ZERO, 0.1, ClassTag::DENDRITE, Some(3));
        // The segment passes through the disk but no vertex lies inside it
        assert!(!chain.intersects(&dendrite, None));

        let dendrite = Primitive::disk(DVec2::new(0.95, 0.0), 0.1, ClassTag::DENDRITE, Some(3));
        assert!(chain.intersects(&dendrite, None));
    }

    #[test]
    fn test_chain_disk_periodic_image() {
        let domain = PeriodicDomain {
            center: DVec2::ZERO,
            width: 1.0,
            height: 1.0,
        };
        let chain = Primitive::chain(
            vec![DVec2::new(0.45, 0.0), DVec2::new(0.49, 0.0)],
            ClassTag::AXON,
            Some(0),
        );
        // Disk just across the left edge: its +x image lands at x = 0.52
        let dendrite = Primitive::disk(DVec2::new(-0.48, 0.0), 0.05, ClassTag::DENDRITE, Some(1));
        assert!(!chain.intersects(&dendrite, None));
        assert!(chain.intersects(&dendrite, Some(&domain)));
    }

    #[test]
    fn test_image_offsets() {
        let domain = PeriodicDomain {
            center: DVec2::ZERO,
            width: 2.0,
            height: 4.0,
        };
        let offsets = domain.image_offsets(DVec2::new(-0.5, 0.5));
        assert_eq!(offsets[0], DVec2::new(2.0, 0.0));
        assert_eq!(offsets[1], DVec2::new(0.0, -4.0));
        assert_eq!(offsets[2], DVec2::new(2.0, -4.0));

        let offsets = domain.image_offsets(DVec2::new(0.5, -0.5));
        assert_eq!(offsets[2], DVec2::new(-2.0, 4.0));
    }

    #[test]
    fn test_bounding_boxes() {
        let disk = soma(1.0, 1.0, 0.5).bounding_box();
        assert_eq!(disk.len(), 4);
        assert!(disk.contains(&DVec2::new(0.5, 0.5)));
        assert!(disk.contains(&DVec2::new(1.5, 1.5)));

        let chain = Primitive::chain(
            vec![DVec2::new(0.0, 0.0), DVec2::new(2.0, 1.0), DVec2::new(1.0, -1.0)],
            ClassTag::AXON,
            None,
        )
        .bounding_box();
        assert!(chain.contains(&DVec2::new(0.0, -1.0)));
        assert!(chain.contains(&DVec2::new(2.0, 1.0)));

        assert!(Primitive::chain(Vec::new(), ClassTag::AXON, None)
            .bounding_box()
            .is_empty());
    }

    #[test]
    #[should_panic(expected = "unsupported primitive pair")]
    fn test_unsupported_pair_panics() {
        let a = pixel(0.0, 0.0, 1.0, 1.0);
        let b = pixel(0.5, -0.5, 1.0, 1.0);
        a.intersects(&b, None);
    }
}
