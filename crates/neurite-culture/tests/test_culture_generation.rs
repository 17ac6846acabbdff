// Copyright 2025 Neurite Developers
// SPDX-License-Identifier: Apache-2.0

//! # Culture Generation Tests
//!
//! End-to-end runs through `Culture` and `Chamber`:
//! - somas accepted without forcing never overlap
//! - axon growth terminates under constant collisions
//! - input lists are the exact inverse of output lists
//! - a fixed seed reproduces the culture
//! - exported maps reload as overrides

use glam::DVec2;
use neurite_config::{
    AngleDistribution, AxonConfig, BoundaryConditions, CollisionClass, EdgeDirection,
    LengthDistribution, NeuriteConfig,
};
use neurite_culture::maps::{load_axonal_map, load_positional_map};
use neurite_culture::rng::seeded_rng;
use neurite_culture::{Chamber, ClassTag, Culture, DensityMap, DevelopmentStage, Primitive};

/// Small dense culture, deterministic
fn test_config(seed: u64, neurons: usize) -> NeuriteConfig {
    let mut config = NeuriteConfig::default();
    config.system.seed = Some(seed);
    config.culture.neurons = neurons;
    config.chamber.width = 0.8;
    config.chamber.height = 0.8;
    config
}

// ============================================================================
// TEST 1: Placement
// ============================================================================

#[test]
fn test_two_cells_check_intersections() {
    let mut config = test_config(1, 2);
    config.soma.radius = 0.01;
    config.chamber.boundaries = BoundaryConditions::Clamped;
    let mut chamber = Chamber::new(&config).unwrap();

    chamber.place_cell_at(DVec2::new(-0.05, 0.0));
    chamber.place_cell_at(DVec2::new(0.05, 0.0));

    // More than 0.02 from both cells
    let between = Primitive::disk(DVec2::ZERO, 0.01, ClassTag::SOMA, None);
    assert!(!chamber.check_intersections(&between));

    // 0.01 from the second cell
    let touching = Primitive::disk(DVec2::new(0.04, 0.0), 0.01, ClassTag::SOMA, None);
    assert!(chamber.check_intersections(&touching));
}

#[test]
fn test_unforced_placements_never_overlap() {
    let mut culture = Culture::new(test_config(11, 300)).unwrap();
    culture.place_cells().unwrap();
    assert_eq!(culture.progress().forced_placements, 0);

    let cells = culture.cells();
    for (i, a) in cells.iter().enumerate() {
        for b in &cells[i + 1..] {
            let d = a.position.distance(b.position);
            assert!(
                d > a.soma_radius + b.soma_radius,
                "cells {} and {} overlap ({})",
                a.index,
                b.index,
                d
            );
        }
    }
}

#[test]
fn test_density_map_placement_stays_in_cell() {
    let mut config = test_config(4, 0);
    config.soma.radius = 0.0005;
    config.chamber.width = 0.1;
    config.chamber.height = 0.1;
    let mut chamber = Chamber::new(&config).unwrap();
    chamber.set_density_map(DensityMap::new(vec![(DVec2::ZERO, 1.0)], 0.02, 0.02).unwrap());

    let (mut rng, _) = seeded_rng(Some(4));
    for _ in 0..100 {
        chamber.place_cell(&mut rng);
    }
    for cell in chamber.cells() {
        assert!((-0.01..=0.03).contains(&cell.position.x));
        assert!((-0.03..=0.01).contains(&cell.position.y));
    }
}

// ============================================================================
// TEST 2: Growth termination
// ============================================================================

#[test]
fn test_axon_growth_terminates_when_boxed_in() {
    let mut config = test_config(5, 0);
    config.chamber.boundaries = BoundaryConditions::Clamped;
    let mut chamber = Chamber::new(&config).unwrap();
    let index = chamber.place_cell_at(DVec2::ZERO);

    // 3 x 3 obstacle block with the soma in the free centre pixel
    let mut pattern = ndarray::Array2::from_elem((3, 3), true);
    pattern[[1, 1]] = false;
    let pattern = neurite_culture::BitmapPattern::with_origin(
        pattern,
        DVec2::new(-0.045, 0.045),
        DVec2::new(0.03, 0.03),
    );
    chamber.assign_pattern(&pattern);

    let params = AxonConfig {
        length: LengthDistribution::Delta { length: 0.2 },
        turning: AngleDistribution::Uniform {
            mean: 0.0,
            spread: 0.4,
        },
        segment_length: 0.02,
        max_retries: 5,
        max_angle_spread: 3.2,
        collide_with: vec![CollisionClass::Pattern],
        ..AxonConfig::default()
    };
    let (mut rng, _) = seeded_rng(Some(5));
    let growth = chamber.grow_axon(index, &params, &mut rng).unwrap();

    // ceil(3.2 / 0.4) = 8 trials of 5 retries, plus the forced attempt
    let bound = growth.segments * (8 * 5 + 1);
    assert_eq!(growth.segments, 10);
    assert!(growth.forced_segments > 0);
    assert!(growth.attempts <= bound, "{} attempts > {}", growth.attempts, bound);
}

// ============================================================================
// TEST 3: Full development
// ============================================================================

#[test]
fn test_inputs_are_inverse_of_outputs() {
    let mut culture = Culture::new(test_config(21, 120)).unwrap();
    let progress = culture.develop().unwrap();
    assert_eq!(progress.stage, DevelopmentStage::Completed);
    assert!(progress.edges > 0, "expected a connected culture");

    let cells = culture.cells();
    for a in cells {
        assert!(!a.outputs.contains(&a.index), "self loop on {}", a.index);
        for b in cells {
            assert_eq!(
                a.outputs.contains(&b.index),
                b.inputs.contains(&a.index),
                "edge {} -> {} not mirrored",
                a.index,
                b.index
            );
        }
    }
}

#[test]
fn test_same_seed_same_culture() {
    let mut first = Culture::new(test_config(99, 80)).unwrap();
    let mut second = Culture::new(test_config(99, 80)).unwrap();
    first.develop().unwrap();
    second.develop().unwrap();

    assert_eq!(first.cells(), second.cells());

    let mut third = Culture::new(test_config(100, 80)).unwrap();
    third.develop().unwrap();
    assert_ne!(first.cells()[0].position, third.cells()[0].position);
}

#[test]
fn test_kcore_after_development() {
    let mut culture = Culture::new(test_config(8, 100)).unwrap();
    culture.develop().unwrap();

    let cores = culture.k_core(EdgeDirection::Undirected).unwrap();
    assert!(cores.populations.windows(2).all(|w| w[0] >= w[1]));
    let max = culture.cells().iter().map(|c| c.core_index).max().unwrap_or(0);
    assert_eq!(max, cores.max_core());
}

// ============================================================================
// TEST 4: Export and pre-seeding
// ============================================================================

#[test]
fn test_exported_maps_reseed_a_culture() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(31, 60);
    config.output.directory = dir.path().to_path_buf();

    let mut original = Culture::new(config.clone()).unwrap();
    original.develop().unwrap();
    let cores = vec![original.k_core(EdgeDirection::Input).unwrap()];
    let written = original.export(cores).unwrap();
    // Enhanced flags are only written for the enhanced distribution
    assert_eq!(written.len(), 5);

    let positions_path = dir.path().join("positions.txt");
    let axons_path = dir.path().join("axons.txt");
    assert_eq!(load_positional_map(&positions_path).unwrap().len(), 60);
    assert_eq!(load_axonal_map(&axons_path).unwrap().len(), 60);

    let summary = std::fs::read_to_string(dir.path().join("summary.json")).unwrap();
    let summary: serde_json::Value = serde_json::from_str(&summary).unwrap();
    assert_eq!(summary["seed"], 31);
    assert_eq!(summary["neurons"], 60);

    // Replay the geometry under a different seed
    let mut replay_config = config;
    replay_config.system.seed = Some(7);
    replay_config.input.positions_file = Some(positions_path);
    replay_config.input.axons_file = Some(axons_path);
    let mut replay = Culture::new(replay_config).unwrap();
    replay.develop().unwrap();

    for (a, b) in original.cells().iter().zip(replay.cells()) {
        assert!(a.position.distance(b.position) < 1e-9);
        assert_eq!(a.axon_segments.len(), b.axon_segments.len());
        assert!((a.axon_length - b.axon_length).abs() < 1e-9);
    }
}
