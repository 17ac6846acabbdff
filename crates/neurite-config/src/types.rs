// Copyright 2025 Neurite Developers
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `neurite_configuration.toml`. Every section falls back to its defaults, so a
//! file only needs to list the parameters it changes.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NeuriteConfig {
    pub system: SystemConfig,
    pub chamber: ChamberConfig,
    pub culture: CultureConfig,
    pub soma: SomaConfig,
    pub dendrite: RadiusDistribution,
    pub axon: AxonConfig,
    pub density_map: DensityMapConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
}

impl NeuriteConfig {
    /// Convert chamber geometry to millimetres, the working unit of the generator.
    ///
    /// Cell parameters (soma, dendrite, axon) are always expressed in millimetres.
    pub fn normalized(mut self) -> Self {
        let multiplier = self.chamber.units.millimeters();
        self.chamber.width *= multiplier;
        self.chamber.height *= multiplier;
        self.chamber.radius *= multiplier;
        self.chamber.units = LengthUnit::Millimeters;
        self
    }
}

/// System-level configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SystemConfig {
    /// RNG seed. `None` derives one from the clock (and logs it).
    pub seed: Option<u64>,
    pub log_level: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            seed: None,
            log_level: "info".to_string(),
        }
    }
}

/// Overall shape of the culture chamber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChamberShape {
    #[default]
    Rectangular,
    Circular,
}

/// Length unit of the chamber geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthUnit {
    Centimeters,
    #[default]
    Millimeters,
    Micrometers,
    Nanometers,
}

impl LengthUnit {
    /// Number of millimetres in one unit
    pub fn millimeters(self) -> f64 {
        match self {
            LengthUnit::Centimeters => 10.0,
            LengthUnit::Millimeters => 1.0,
            LengthUnit::Micrometers => 1e-3,
            LengthUnit::Nanometers => 1e-6,
        }
    }
}

/// Behaviour of the spatial lattice at the chamber edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryConditions {
    /// Out-of-range lookups are clamped onto the edge buckets
    #[serde(alias = "reflective")]
    Clamped,
    /// The domain wraps; geometry near an edge is mirrored across it
    #[default]
    Periodic,
}

/// Chamber geometry and spatial index configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ChamberConfig {
    pub shape: ChamberShape,
    pub units: LengthUnit,
    pub width: f64,
    pub height: f64,
    /// Only used by circular chambers
    pub radius: f64,
    pub boundaries: BoundaryConditions,
    /// Lattice bucket edge, as a multiple of the soma radius
    pub bucket_size_factor: f64,
    /// Frame a clamped chamber with boundary rectangles
    pub walls: bool,
    /// Plain-text obstacle raster stretched over the chamber
    pub pattern_file: Option<PathBuf>,
}

impl Default for ChamberConfig {
    fn default() -> Self {
        Self {
            shape: ChamberShape::Rectangular,
            units: LengthUnit::Millimeters,
            width: 1.0,
            height: 1.0,
            radius: 0.5,
            boundaries: BoundaryConditions::Periodic,
            bucket_size_factor: 3.0,
            walls: false,
            pattern_file: None,
        }
    }
}

/// Culture population configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CultureConfig {
    pub neurons: usize,
    /// Rejection-sampling attempts before a soma is force-accepted
    pub placement_max_retries: u32,
}

impl Default for CultureConfig {
    fn default() -> Self {
        Self {
            neurons: 50,
            placement_max_retries: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SomaConfig {
    pub radius: f64,
}

impl Default for SomaConfig {
    fn default() -> Self {
        Self { radius: 0.0075 }
    }
}

/// Dendritic field radius distribution
///
/// ```toml
/// [dendrite]
/// distribution = "enhanced"
/// mean = 0.05
/// std = 0.02
/// fraction = 0.3
/// multiplier = 2.0
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "distribution", rename_all = "snake_case")]
pub enum RadiusDistribution {
    Delta { radius: f64 },
    Gaussian { mean: f64, std: f64 },
    Rayleigh { sigma: f64 },
    /// Two Gaussian populations; with probability `fraction` the mean is
    /// scaled by `multiplier`.
    Enhanced {
        mean: f64,
        std: f64,
        fraction: f64,
        multiplier: f64,
    },
}

impl Default for RadiusDistribution {
    fn default() -> Self {
        RadiusDistribution::Gaussian {
            mean: 0.05,
            std: 0.02,
        }
    }
}

impl RadiusDistribution {
    /// Whether cells record which population they were drawn from
    pub fn is_enhanced(&self) -> bool {
        matches!(self, RadiusDistribution::Enhanced { .. })
    }
}

/// Total axon length distribution
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "distribution", rename_all = "snake_case")]
pub enum LengthDistribution {
    Delta { length: f64 },
    Rayleigh { sigma: f64 },
    Gaussian { mean: f64, std: f64 },
    Uniform { min: f64, max: f64 },
}

impl Default for LengthDistribution {
    fn default() -> Self {
        LengthDistribution::Rayleigh { sigma: 0.2 }
    }
}

/// Turning angle between consecutive axon segments (radians)
///
/// The spread (`spread` or `std`) is multiplied by the growth trial counter.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "distribution", rename_all = "snake_case")]
pub enum AngleDistribution {
    Uniform { mean: f64, spread: f64 },
    Gaussian { mean: f64, std: f64 },
}

impl Default for AngleDistribution {
    fn default() -> Self {
        AngleDistribution::Gaussian {
            mean: 0.0,
            std: 0.1,
        }
    }
}

impl AngleDistribution {
    /// Base spread before trial scaling
    pub fn spread(&self) -> f64 {
        match self {
            AngleDistribution::Uniform { spread, .. } => *spread,
            AngleDistribution::Gaussian { std, .. } => *std,
        }
    }
}

/// How the axon length is cut into segments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Segmentation {
    /// Segments of `segment_length`; the last one takes the remainder
    #[default]
    FixedLength,
    /// Exactly `segment_count` segments of equal length
    FixedCount,
}

/// Primitive classes an axon segment can collide with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionClass {
    Soma,
    Pattern,
    Boundary,
}

/// Axon growth configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AxonConfig {
    pub length: LengthDistribution,
    pub turning: AngleDistribution,
    pub segmentation: Segmentation,
    pub segment_length: f64,
    pub segment_count: usize,
    /// Failed attempts at one spread before the spread is widened
    pub max_retries: u32,
    /// Once `spread * trial` reaches this, the candidate segment is forced
    pub max_angle_spread: f64,
    pub collide_with: Vec<CollisionClass>,
}

impl Default for AxonConfig {
    fn default() -> Self {
        Self {
            length: LengthDistribution::default(),
            turning: AngleDistribution::default(),
            segmentation: Segmentation::FixedLength,
            segment_length: 0.01,
            segment_count: 20,
            max_retries: 10,
            max_angle_spread: 3.2,
            collide_with: vec![CollisionClass::Pattern, CollisionClass::Boundary],
        }
    }
}

/// Weighted placement map
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DensityMapConfig {
    pub file: Option<PathBuf>,
    pub cell_width: f64,
    pub cell_height: f64,
}

impl Default for DensityMapConfig {
    fn default() -> Self {
        Self {
            file: None,
            cell_width: 0.02,
            cell_height: 0.02,
        }
    }
}

/// Pre-seeded geometry
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct InputConfig {
    pub positions_file: Option<PathBuf>,
    pub axons_file: Option<PathBuf>,
}

/// Which edges define a neighbour during k-core peeling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeDirection {
    Input,
    Output,
    Undirected,
}

impl EdgeDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeDirection::Input => "input",
            EdgeDirection::Output => "output",
            EdgeDirection::Undirected => "undirected",
        }
    }
}

/// Export file names, relative to `directory`. `None` disables a file.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub positions: Option<String>,
    pub axons: Option<String>,
    pub connections: Option<String>,
    pub sizes: Option<String>,
    pub enhanced: Option<String>,
    pub summary: Option<String>,
    pub kcore: Vec<EdgeDirection>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("output"),
            positions: Some("positions.txt".to_string()),
            axons: Some("axons.txt".to_string()),
            connections: Some("connections.txt".to_string()),
            sizes: Some("sizes.txt".to_string()),
            enhanced: Some("enhanced.txt".to_string()),
            summary: Some("summary.json".to_string()),
            kcore: vec![EdgeDirection::Input, EdgeDirection::Undirected],
        }
    }
}
