// Copyright 2025 Neurite Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Culture Generation Tool

Grows one culture from a configuration file and writes the configured maps.

Usage:
  cargo run --release --bin generate_culture -- [config.toml] [options]

Run with `--help` for the option list. `--debug-{crate}` flags are passed
through to the logging setup.

Without a config path the `neurite_configuration.toml` search is used; when no
file is found the built-in defaults apply.

Example:
  cargo run --release --bin generate_culture -- culture.toml --seed 42 --neurons 2000
*/

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use neurite::config::{apply_cli_overrides, apply_environment_overrides, load_config};
use neurite::config::{ConfigError, NeuriteConfig};
use neurite::culture::Culture;
use neurite::observability::{debug_flags_help, init_logging, parse_debug_flags, LoggingConfig};
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// Neurite Culture Generator - grows one culture and writes its maps
#[derive(Parser, Debug)]
#[command(name = "generate_culture", version, long_about = None, after_help = debug_flags_help())]
struct Args {
    /// Configuration file (default: search for neurite_configuration.toml)
    config: Option<PathBuf>,

    /// RNG seed (default: derived from the clock)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of cells
    #[arg(long)]
    neurons: Option<usize>,

    /// Lattice behaviour at the chamber edges
    #[arg(long, value_enum)]
    boundaries: Option<Boundaries>,

    /// Directory for the exported maps
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Base log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Boundaries {
    Periodic,
    Clamped,
}

impl Boundaries {
    fn as_str(self) -> &'static str {
        match self {
            Boundaries::Periodic => "periodic",
            Boundaries::Clamped => "clamped",
        }
    }
}

impl Args {
    /// Parse arguments, leaving `--debug-*` flags to the observability crate
    fn parse_without_debug_flags<I>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = String>,
    {
        Args::try_parse_from(args.into_iter().filter(|arg| !arg.starts_with("--debug-")))
    }

    /// Config overrides in the loader's key format
    fn overrides(&self) -> HashMap<String, String> {
        let mut overrides = HashMap::new();
        if let Some(seed) = self.seed {
            overrides.insert("seed".to_string(), seed.to_string());
        }
        if let Some(neurons) = self.neurons {
            overrides.insert("neurons".to_string(), neurons.to_string());
        }
        if let Some(boundaries) = self.boundaries {
            overrides.insert("boundaries".to_string(), boundaries.as_str().to_string());
        }
        if let Some(dir) = &self.output_dir {
            overrides.insert("output_dir".to_string(), dir.display().to_string());
        }
        if let Some(level) = &self.log_level {
            overrides.insert("log_level".to_string(), level.clone());
        }
        overrides
    }
}

fn resolve_config(args: &Args) -> Result<NeuriteConfig> {
    let overrides = args.overrides();
    match load_config(args.config.as_deref(), Some(&overrides)) {
        Ok(config) => Ok(config),
        Err(ConfigError::FileNotFound(_)) if args.config.is_none() => {
            let mut config = NeuriteConfig::default();
            apply_environment_overrides(&mut config).context("Invalid environment override")?;
            apply_cli_overrides(&mut config, &overrides).context("Invalid command-line override")?;
            Ok(config)
        }
        Err(e) => Err(e).with_context(|| match &args.config {
            Some(path) => format!("Failed to load {}", path.display()),
            None => "Failed to load configuration".to_string(),
        }),
    }
}

fn main() -> Result<()> {
    let args = Args::parse_without_debug_flags(env::args()).unwrap_or_else(|e| e.exit());

    let config = resolve_config(&args)?;
    let debug_flags = parse_debug_flags();
    let guard = init_logging(
        &debug_flags,
        &LoggingConfig::with_level(config.system.log_level.clone()),
    )?;
    if let Some(dir) = guard.log_dir() {
        info!(target: "neurite", "📝 Run logs in {}", dir.display());
    }

    println!("🧫 Neurite Culture Generator v{}", neurite::VERSION);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("🔢 Neurons:    {}", config.culture.neurons);
    println!("📐 Chamber:    {:?} ({:?})", config.chamber.shape, config.chamber.boundaries);
    println!("📂 Output:     {}", config.output.directory.display());
    println!();

    let started = Instant::now();
    let kcore_directions = config.output.kcore.clone();
    let mut culture = Culture::new(config).context("Failed to set up the culture")?;
    println!("🎲 Seed:       {}", culture.seed());

    let progress = culture.develop().context("Culture development failed")?;
    println!(
        "✅ Grown {} cells, {} edges ({} forced placements, {} forced axon segments)",
        progress.cells_placed, progress.edges, progress.forced_placements, progress.forced_axon_segments
    );

    let mut cores = Vec::with_capacity(kcore_directions.len());
    for direction in kcore_directions {
        let decomposition = culture
            .k_core(direction)
            .with_context(|| format!("k-core ({}) failed", direction.as_str()))?;
        println!(
            "🧅 k-core ({}): max core {}, levels {:?}",
            direction.as_str(),
            decomposition.max_core(),
            decomposition.populations
        );
        cores.push(decomposition);
    }

    let written = culture.export(cores).context("Failed to export culture")?;
    for path in &written {
        println!("💾 {}", path.display());
    }

    println!();
    println!("⏱️  Done in {:.2}s", started.elapsed().as_secs_f64());
    Ok(())
}
