// Copyright 2025 Neurite Developers
// SPDX-License-Identifier: Apache-2.0

//! # Generation Pipeline Tests
//!
//! Configuration file -> culture development -> k-core -> exported maps,
//! driven through the umbrella crate the way `generate_culture` does it.

use neurite::config::apply_cli_overrides;
use neurite::culture::maps::load_positional_map;
use neurite::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Data lines of an exported map (headers start with `%`)
fn data_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|l| !l.starts_with('%') && !l.trim().is_empty())
        .map(str::to_string)
        .collect()
}

fn write_config(dir: &Path, body: &str) -> std::path::PathBuf {
    let path = dir.join("culture.toml");
    fs::write(&path, body).unwrap();
    path
}

// ============================================================================
// TEST 1: Circular chamber from a TOML file
// ============================================================================

#[test]
fn test_circular_enhanced_culture_from_toml() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out");
    let config_path = write_config(
        dir.path(),
        &format!(
            r#"
            [system]
            seed = 2024

            [chamber]
            shape = "circular"
            units = "micrometers"
            radius = 400.0
            boundaries = "clamped"

            [culture]
            neurons = 120

            [dendrite]
            distribution = "enhanced"
            mean = 0.04
            std = 0.01
            fraction = 0.5
            multiplier = 2.0

            [output]
            directory = "{}"
            kcore = ["input", "undirected"]
            "#,
            output.display()
        ),
    );

    let config = load_config(Some(&config_path), None).unwrap();
    assert!((config.chamber.radius - 0.4).abs() < 1e-12);

    let mut culture = Culture::new(config).unwrap();
    let progress = culture.develop().unwrap();
    assert_eq!(progress.stage, DevelopmentStage::Completed);
    assert_eq!(progress.cells_placed, 120);

    for cell in culture.cells() {
        assert!(
            cell.position.length() <= 0.4 + 1e-9,
            "cell {} outside the chamber at {:?}",
            cell.index,
            cell.position
        );
        assert!(cell.dendrite_radius >= 2.0 * cell.soma_radius);
    }

    let cores = vec![
        culture.k_core(EdgeDirection::Input).unwrap(),
        culture.k_core(EdgeDirection::Undirected).unwrap(),
    ];
    let written = culture.export(cores).unwrap();
    assert_eq!(written.len(), 6);

    // Enhanced runs add a column to the size table
    let sizes = data_lines(&output.join("sizes.txt"));
    assert_eq!(sizes.len(), 120);
    assert!(sizes.iter().all(|l| l.split_whitespace().count() == 8));

    let enhanced = data_lines(&output.join("enhanced.txt"));
    assert_eq!(enhanced.len(), 120);
    assert!(enhanced
        .iter()
        .all(|l| l.ends_with(" 0") || l.ends_with(" 1")));

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(output.join("summary.json")).unwrap()).unwrap();
    assert_eq!(summary["seed"], 2024);
    assert_eq!(summary["kcore"].as_array().unwrap().len(), 2);
    assert_eq!(summary["edges"], progress.edges);
}

// ============================================================================
// TEST 2: CLI overrides and connection export
// ============================================================================

#[test]
fn test_cli_overrides_shape_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_config(
        dir.path(),
        r#"
        [system]
        seed = 1

        [culture]
        neurons = 500

        [chamber]
        width = 0.6
        height = 0.6
        "#,
    );

    let mut overrides = HashMap::new();
    overrides.insert("neurons".to_string(), "40".to_string());
    overrides.insert("seed".to_string(), "77".to_string());
    overrides.insert(
        "output_dir".to_string(),
        dir.path().join("run").display().to_string(),
    );

    let config = load_config(Some(&config_path), Some(&overrides)).unwrap();
    assert_eq!(config.culture.neurons, 40);
    assert_eq!(config.system.seed, Some(77));

    let mut culture = Culture::new(config).unwrap();
    assert_eq!(culture.seed(), 77);
    culture.develop().unwrap();
    culture.export(Vec::new()).unwrap();

    let positions = load_positional_map(&dir.path().join("run").join("positions.txt")).unwrap();
    assert_eq!(positions.len(), 40);

    // Every exported edge matches an output list entry
    let connections = data_lines(&dir.path().join("run").join("connections.txt"));
    let edges: usize = culture.cells().iter().map(|c| c.outputs.len()).sum();
    assert_eq!(connections.len(), edges);
    for line in &connections {
        let mut fields = line.split_whitespace().map(|f| f.parse::<CellIndex>().unwrap());
        let (source, target) = (fields.next().unwrap(), fields.next().unwrap());
        assert!(culture.cells()[source].outputs.contains(&target));
    }

    // Overrides applied after the fact win over the file as well
    let mut reloaded = load_config(Some(&config_path), None).unwrap();
    apply_cli_overrides(&mut reloaded, &overrides).unwrap();
    assert_eq!(reloaded.culture.neurons, 40);

    // A mistyped override stops the run instead of falling back to the file
    overrides.insert("neurons".to_string(), "2k".to_string());
    assert!(matches!(
        load_config(Some(&config_path), Some(&overrides)),
        Err(neurite::config::ConfigError::InvalidValue(_))
    ));
}

#[test]
fn test_example_configuration_matches_defaults() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("neurite_configuration.example.toml");
    let example = load_config(Some(&path), None).unwrap();
    assert_eq!(example, NeuriteConfig::default());
}

// ============================================================================
// TEST 3: Stage ordering
// ============================================================================

#[test]
fn test_kcore_requires_completed_culture() {
    let mut config = NeuriteConfig::default();
    config.system.seed = Some(3);
    config.culture.neurons = 10;

    let mut culture = Culture::new(config).unwrap();
    culture.place_cells().unwrap();
    assert!(matches!(
        culture.k_core(EdgeDirection::Undirected),
        Err(CultureError::StageOrder { .. })
    ));

    // Stages cannot be replayed out of order
    culture.grow_axons().unwrap();
    assert!(matches!(
        culture.place_cells(),
        Err(CultureError::StageOrder { .. })
    ));
}
