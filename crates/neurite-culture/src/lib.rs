// Copyright 2025 Neurite Developers
// SPDX-License-Identifier: Apache-2.0

/*!
# Neurite Culture

Spatial generator for two-dimensional neuronal cultures:
- Soma placement by rejection sampling (uniform, circular or density-map driven)
- Axon growth as a collision-avoiding random walk
- Dendritic fields with configurable radius distributions
- Geometric connectivity (axon crosses dendritic field)
- k-core decomposition of the resulting network

## Architecture

- `spatial`: geometric primitives and the bucket lattice that indexes them
- `chamber`: owns the lattice and the cells, places and grows them
- `growth`: per-cell axon and dendrite growth
- `connectivity`: edge resolution and k-core peeling
- `culture`: stage-by-stage orchestration of one run
- `maps`, `density`, `pattern`: plain-text inputs and outputs

```rust,no_run
use neurite_config::NeuriteConfig;
use neurite_culture::Culture;

let mut culture = Culture::new(NeuriteConfig::default())?;
let progress = culture.develop()?;
println!("{} edges", progress.edges);
# Ok::<(), neurite_culture::CultureError>(())
```
*/

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod chamber;
pub mod connectivity;
pub mod culture;
pub mod density;
pub mod growth;
pub mod maps;
pub mod models;
pub mod pattern;
pub mod rng;
pub mod spatial;
pub mod types;

pub use chamber::{Chamber, ChamberGeometry, Placement};
pub use connectivity::{find_output_connections, invert_connections, k_core, CoreDecomposition};
pub use culture::{Culture, DevelopmentProgress, DevelopmentStage};
pub use density::DensityMap;
pub use growth::{grow_axon, grow_dendrite, AxonGrowth};
pub use maps::{AxonRecord, CultureSummary};
pub use models::Cell;
pub use pattern::{BitmapPattern, ObstaclePattern};
pub use spatial::{BoundaryMode, ClassTag, Lattice, PeriodicDomain, Primitive, PrimitiveId, Shape};
pub use types::{CellIndex, CultureError, CultureResult};
