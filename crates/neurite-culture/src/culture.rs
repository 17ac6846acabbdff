// Copyright 2025 Neurite Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Culture development - from parameters to a wired network.

This module orchestrates one generation run. The stages run strictly in
order, each one reading the geometry committed by the previous:

1. **Placement**: somas are scattered by rejection sampling
2. **Axonogenesis**: every cell grows its axon around obstacles
3. **Dendritogenesis**: every cell grows its dendritic field
4. **Synaptogenesis**: axons are resolved against dendritic fields

Positional and axonal maps, when given, replace the generated geometry of
the cells they list during the matching stage.
*/

use ahash::AHashMap;
use glam::DVec2;
use neurite_config::{validate_config, EdgeDirection, NeuriteConfig};
use rand::rngs::StdRng;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

use crate::chamber::Chamber;
use crate::connectivity::{k_core, CoreDecomposition};
use crate::density::DensityMap;
use crate::maps::{self, AxonRecord, CultureSummary};
use crate::models::Cell;
use crate::pattern::BitmapPattern;
use crate::rng::seeded_rng;
use crate::types::{CellIndex, CultureError, CultureResult};

const PROGRESS_INTERVAL: usize = 1000;

/// Development stage tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevelopmentStage {
    /// Chamber built, no cells yet
    Initialization,
    /// Somas placed
    Placement,
    /// Axons grown
    Axonogenesis,
    /// Dendritic fields grown
    Dendritogenesis,
    /// Connections resolved
    Synaptogenesis,
    /// Development completed successfully
    Completed,
}

impl DevelopmentStage {
    pub fn as_str(self) -> &'static str {
        match self {
            DevelopmentStage::Initialization => "initialization",
            DevelopmentStage::Placement => "placement",
            DevelopmentStage::Axonogenesis => "axonogenesis",
            DevelopmentStage::Dendritogenesis => "dendritogenesis",
            DevelopmentStage::Synaptogenesis => "synaptogenesis",
            DevelopmentStage::Completed => "completed",
        }
    }
}

/// Development progress information
#[derive(Debug, Clone, PartialEq)]
pub struct DevelopmentProgress {
    /// Last stage that finished
    pub stage: DevelopmentStage,
    pub cells_placed: usize,
    /// Somas accepted past the retry limit
    pub forced_placements: usize,
    pub axons_grown: usize,
    /// Axon segments accepted past the spread limit
    pub forced_axon_segments: usize,
    pub dendrites_grown: usize,
    pub edges: usize,
    /// Wall time since the culture was created
    pub duration_ms: u64,
}

impl Default for DevelopmentProgress {
    fn default() -> Self {
        Self {
            stage: DevelopmentStage::Initialization,
            cells_placed: 0,
            forced_placements: 0,
            axons_grown: 0,
            forced_axon_segments: 0,
            dendrites_grown: 0,
            edges: 0,
            duration_ms: 0,
        }
    }
}

/// Generation run over one chamber
pub struct Culture {
    config: NeuriteConfig,
    chamber: Chamber,
    rng: StdRng,
    seed: u64,
    progress: DevelopmentProgress,
    positions: AHashMap<CellIndex, DVec2>,
    axons: AHashMap<CellIndex, AxonRecord>,
    start_time: Instant,
}

impl Culture {
    /// Validate `config`, seed the run and prepare the chamber
    ///
    /// Loads the density map, obstacle pattern and pre-seeding maps named in
    /// the configuration.
    pub fn new(config: NeuriteConfig) -> CultureResult<Self> {
        let config = config.normalized();
        validate_config(&config)?;

        let (rng, seed) = seeded_rng(config.system.seed);
        info!(target: "neurite-culture", "🧬 Starting culture of {} cells (seed {})", config.culture.neurons, seed);

        let mut chamber = Chamber::new(&config)?;

        if let Some(path) = &config.density_map.file {
            let map = DensityMap::load(
                path,
                config.density_map.cell_width,
                config.density_map.cell_height,
            )?;
            chamber.set_density_map(map);
        }

        if let Some(path) = &config.chamber.pattern_file {
            let (width, height) = chamber.geometry().extent();
            let pattern = BitmapPattern::load(path, width, height)?;
            chamber.assign_pattern(&pattern);
        }

        let positions = match &config.input.positions_file {
            Some(path) => maps::load_positional_map(path)?,
            None => AHashMap::new(),
        };
        let axons = match &config.input.axons_file {
            Some(path) => maps::load_axonal_map(path)?,
            None => AHashMap::new(),
        };

        let mut culture = Self {
            config,
            chamber,
            rng,
            seed,
            progress: DevelopmentProgress::default(),
            positions: AHashMap::new(),
            axons: AHashMap::new(),
            start_time: Instant::now(),
        };
        culture.set_position_overrides(positions)?;
        culture.set_axon_overrides(axons)?;
        Ok(culture)
    }

    fn check_indices<'a>(&self, indices: impl Iterator<Item = &'a CellIndex>) -> CultureResult<()> {
        let count = self.config.culture.neurons;
        match indices.copied().find(|index| *index >= count) {
            Some(index) => Err(CultureError::CellOutOfRange { index, count }),
            None => Ok(()),
        }
    }

    /// Fix the soma position of the listed cells
    pub fn set_position_overrides(&mut self, positions: AHashMap<CellIndex, DVec2>) -> CultureResult<()> {
        self.check_indices(positions.keys())?;
        if !positions.is_empty() {
            info!(target: "neurite-culture", "Pre-seeding positions of {} cells", positions.len());
        }
        self.positions = positions;
        Ok(())
    }

    /// Fix the axon geometry of the listed cells
    pub fn set_axon_overrides(&mut self, axons: AHashMap<CellIndex, AxonRecord>) -> CultureResult<()> {
        self.check_indices(axons.keys())?;
        if !axons.is_empty() {
            info!(target: "neurite-culture", "Pre-seeding axons of {} cells", axons.len());
        }
        self.axons = axons;
        Ok(())
    }

    fn enter(&self, requested: DevelopmentStage, after: DevelopmentStage) -> CultureResult<()> {
        if self.progress.stage == after {
            Ok(())
        } else {
            Err(CultureError::StageOrder {
                requested: requested.as_str(),
                current: self.progress.stage.as_str(),
            })
        }
    }

    fn finish(&mut self, stage: DevelopmentStage) {
        self.progress.stage = stage;
        self.progress.duration_ms = self.start_time.elapsed().as_millis() as u64;
    }

    /// Stage 1: place every soma
    pub fn place_cells(&mut self) -> CultureResult<()> {
        self.enter(DevelopmentStage::Placement, DevelopmentStage::Initialization)?;
        let total = self.config.culture.neurons;
        info!(target: "neurite-culture", "🧫 Placing {} cells", total);

        for index in 0..total {
            match self.positions.get(&index) {
                Some(position) => {
                    self.chamber.place_cell_at(*position);
                }
                None => {
                    let placement = self.chamber.place_cell(&mut self.rng);
                    if placement.forced {
                        self.progress.forced_placements += 1;
                    }
                }
            }
            self.progress.cells_placed += 1;
            if (index + 1) % PROGRESS_INTERVAL == 0 {
                info!(target: "neurite-culture", "  Placed {}/{} cells", index + 1, total);
            }
        }

        self.finish(DevelopmentStage::Placement);
        info!(target: "neurite-culture", "✅ Placement complete: {} cells, {} forced", self.progress.cells_placed, self.progress.forced_placements);
        Ok(())
    }

    /// Stage 2: grow every axon
    pub fn grow_axons(&mut self) -> CultureResult<()> {
        self.enter(DevelopmentStage::Axonogenesis, DevelopmentStage::Placement)?;
        let total = self.chamber.len();
        info!(target: "neurite-culture", "🌱 Growing {} axons", total);

        for index in 0..total {
            match self.axons.get(&index) {
                Some(record) => {
                    self.chamber
                        .set_axon(index, record.length, record.segments.clone())?;
                }
                None => {
                    let growth = self
                        .chamber
                        .grow_axon(index, &self.config.axon, &mut self.rng)?;
                    self.progress.forced_axon_segments += growth.forced_segments;
                    debug!(target: "neurite-culture", "Cell {}: {} segments in {} attempts", index, growth.segments, growth.attempts);
                }
            }
            self.progress.axons_grown += 1;
            if (index + 1) % PROGRESS_INTERVAL == 0 {
                info!(target: "neurite-culture", "  Grown {}/{} axons", index + 1, total);
            }
        }

        self.finish(DevelopmentStage::Axonogenesis);
        info!(target: "neurite-culture", "✅ Axonogenesis complete: {} forced segments", self.progress.forced_axon_segments);
        Ok(())
    }

    /// Stage 3: grow every dendritic field
    pub fn grow_dendrites(&mut self) -> CultureResult<()> {
        self.enter(DevelopmentStage::Dendritogenesis, DevelopmentStage::Axonogenesis)?;
        let total = self.chamber.len();
        info!(target: "neurite-culture", "🌿 Growing {} dendritic fields", total);

        for index in 0..total {
            self.chamber
                .grow_dendrite(index, &self.config.dendrite, &mut self.rng)?;
            self.progress.dendrites_grown += 1;
        }

        self.finish(DevelopmentStage::Dendritogenesis);
        Ok(())
    }

    /// Stage 4: resolve connections
    pub fn grow_connections(&mut self) -> CultureResult<()> {
        self.enter(DevelopmentStage::Synaptogenesis, DevelopmentStage::Dendritogenesis)?;
        info!(target: "neurite-culture", "🔗 Resolving connections");

        self.progress.edges = self.chamber.grow_connections();
        self.finish(DevelopmentStage::Synaptogenesis);

        let cells = self.chamber.len().max(1) as f64;
        info!(target: "neurite-culture", "✅ Synaptogenesis complete: {} edges ({:.2} per cell)", self.progress.edges, self.progress.edges as f64 / cells);
        self.finish(DevelopmentStage::Completed);
        Ok(())
    }

    /// Run every stage in order
    pub fn develop(&mut self) -> CultureResult<DevelopmentProgress> {
        self.place_cells()?;
        self.grow_axons()?;
        self.grow_dendrites()?;
        self.grow_connections()?;
        info!(target: "neurite-culture", "🎉 Culture developed in {} ms", self.progress.duration_ms);
        Ok(self.progress.clone())
    }

    /// Peel the finished network along `direction`
    pub fn k_core(&mut self, direction: EdgeDirection) -> CultureResult<CoreDecomposition> {
        self.enter(DevelopmentStage::Completed, DevelopmentStage::Completed)?;
        Ok(k_core(self.chamber.cells_mut(), direction))
    }

    pub fn summary(&self, kcore: Vec<CoreDecomposition>) -> CultureSummary {
        let cells = self.chamber.cells();
        let count = cells.len().max(1) as f64;
        CultureSummary {
            seed: self.seed,
            neurons: cells.len(),
            edges: self.progress.edges,
            forced_placements: self.progress.forced_placements,
            forced_axon_segments: self.progress.forced_axon_segments,
            mean_dendrite_radius: cells.iter().map(|c| c.dendrite_radius).sum::<f64>() / count,
            mean_axon_length: cells.iter().map(|c| c.axon_length).sum::<f64>() / count,
            kcore,
            generated_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Write every configured output file; returns the paths written
    pub fn export(&self, kcore: Vec<CoreDecomposition>) -> CultureResult<Vec<PathBuf>> {
        let output = &self.config.output;
        fs::create_dir_all(&output.directory).map_err(|e| CultureError::io(&output.directory, e))?;

        let cells = self.chamber.cells();
        let enhanced = self.config.dendrite.is_enhanced();
        let mut written = Vec::new();
        let target = |name: &Option<String>| name.as_ref().map(|n| output.directory.join(n));

        if let Some(path) = target(&output.positions) {
            maps::save(&path, |w| maps::write_positional_map(w, cells))?;
            written.push(path);
        }
        if let Some(path) = target(&output.axons) {
            maps::save(&path, |w| maps::write_axonal_map(w, cells))?;
            written.push(path);
        }
        if let Some(path) = target(&output.connections) {
            maps::save(&path, |w| maps::write_connections(w, cells, self.seed))?;
            written.push(path);
        }
        if let Some(path) = target(&output.sizes) {
            maps::save(&path, |w| maps::write_sizes(w, cells, enhanced))?;
            written.push(path);
        }
        if enhanced {
            if let Some(path) = target(&output.enhanced) {
                maps::save(&path, |w| maps::write_enhanced(w, cells))?;
                written.push(path);
            }
        }
        if let Some(path) = target(&output.summary) {
            let summary = self.summary(kcore);
            maps::save(&path, |w| maps::write_summary(w, &summary))?;
            written.push(path);
        }

        info!(target: "neurite-culture", "💾 Exported {} files to {}", written.len(), output.directory.display());
        Ok(written)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn progress(&self) -> &DevelopmentProgress {
        &self.progress
    }

    pub fn config(&self) -> &NeuriteConfig {
        &self.config
    }

    pub fn chamber(&self) -> &Chamber {
        &self.chamber
    }

    pub fn cells(&self) -> &[Cell] {
        self.chamber.cells()
    }
}
