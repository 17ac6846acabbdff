// Copyright 2025 Neurite Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Plain-text map import and export.

All text files are line oriented, whitespace separated, and start with a
block of `%` comment lines so they load directly into MATLAB / numpy.
Loaders skip `%` and `#` comments and blank lines.

| file | record |
|---|---|
| positional map | `cell x y` |
| axonal map | `cell length count x1 y1 ... xn yn` |
| connections | `source target` |
| sizes | `cell soma dendrite axon_length end_to_end inputs outputs [enhanced]` |
| enhanced | `cell enhanced` |

The run summary is JSON.
*/

use ahash::AHashMap;
use glam::DVec2;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::connectivity::CoreDecomposition;
use crate::models::Cell;
use crate::types::{CellIndex, CultureError, CultureResult};

const RULE: &str = "%-----------------------------------------------------------------";

/// Pre-computed axon of one cell
#[derive(Debug, Clone, PartialEq)]
pub struct AxonRecord {
    pub length: f64,
    pub segments: Vec<DVec2>,
}

/// Data lines with their 1-based line numbers
fn records(text: &str) -> impl Iterator<Item = (usize, Vec<&str>)> {
    text.lines().enumerate().filter_map(|(i, line)| {
        let line = line.trim();
        if line.is_empty() || line.starts_with('%') || line.starts_with('#') {
            None
        } else {
            Some((i + 1, line.split_whitespace().collect()))
        }
    })
}

fn field<T: std::str::FromStr>(source: &Path, line: usize, token: &str, name: &str) -> CultureResult<T> {
    token
        .parse()
        .map_err(|_| CultureError::invalid_map(source, line, format!("invalid {} '{}'", name, token)))
}

/// Parse `cell x y` records
pub fn parse_positional_map(text: &str, source: &Path) -> CultureResult<AHashMap<CellIndex, DVec2>> {
    let mut positions = AHashMap::new();
    for (line, fields) in records(text) {
        let [index, x, y] = fields.as_slice() else {
            return Err(CultureError::invalid_map(
                source,
                line,
                format!("expected 3 fields, found {}", fields.len()),
            ));
        };
        let index: CellIndex = field(source, line, index, "cell index")?;
        let position = DVec2::new(field(source, line, x, "x")?, field(source, line, y, "y")?);
        positions.insert(index, position);
    }
    Ok(positions)
}

pub fn load_positional_map(path: &Path) -> CultureResult<AHashMap<CellIndex, DVec2>> {
    let text = fs::read_to_string(path).map_err(|e| CultureError::io(path, e))?;
    parse_positional_map(&text, path)
}

/// Parse `cell length count (x y)*` records
pub fn parse_axonal_map(text: &str, source: &Path) -> CultureResult<AHashMap<CellIndex, AxonRecord>> {
    let mut axons = AHashMap::new();
    for (line, fields) in records(text) {
        if fields.len() < 3 {
            return Err(CultureError::invalid_map(
                source,
                line,
                format!("expected at least 3 fields, found {}", fields.len()),
            ));
        }
        let index: CellIndex = field(source, line, fields[0], "cell index")?;
        let length: f64 = field(source, line, fields[1], "axon length")?;
        let count: usize = field(source, line, fields[2], "segment count")?;
        let coordinates = &fields[3..];
        if coordinates.len() != 2 * count {
            return Err(CultureError::invalid_map(
                source,
                line,
                format!("{} segments need {} coordinates, found {}", count, 2 * count, coordinates.len()),
            ));
        }
        let segments = coordinates
            .chunks_exact(2)
            .map(|pair| -> CultureResult<DVec2> {
                Ok(DVec2::new(
                    field(source, line, pair[0], "x")?,
                    field(source, line, pair[1], "y")?,
                ))
            })
            .collect::<CultureResult<Vec<DVec2>>>()?;
        axons.insert(index, AxonRecord { length, segments });
    }
    Ok(axons)
}

pub fn load_axonal_map(path: &Path) -> CultureResult<AHashMap<CellIndex, AxonRecord>> {
    let text = fs::read_to_string(path).map_err(|e| CultureError::io(path, e))?;
    parse_axonal_map(&text, path)
}

fn header<W: Write>(out: &mut W, title: &str, format: &str, extra: &[String]) -> io::Result<()> {
    writeln!(out, "{}", RULE)?;
    writeln!(out, "% neurite {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(out, "{}", RULE)?;
    writeln!(out, "% {}", title)?;
    writeln!(out, "% Format: {}", format)?;
    writeln!(out, "{}", RULE)?;
    for line in extra {
        writeln!(out, "% {}", line)?;
    }
    if !extra.is_empty() {
        writeln!(out, "{}", RULE)?;
    }
    Ok(())
}

pub fn write_positional_map<W: Write>(out: &mut W, cells: &[Cell]) -> io::Result<()> {
    header(out, "Positional map", "cell | x | y", &[])?;
    for cell in cells {
        writeln!(out, "{} {} {}", cell.index, cell.position.x, cell.position.y)?;
    }
    Ok(())
}

pub fn write_axonal_map<W: Write>(out: &mut W, cells: &[Cell]) -> io::Result<()> {
    header(out, "Axonal map", "cell | axon length | segments | x y per segment", &[])?;
    for cell in cells {
        write!(out, "{} {} {}", cell.index, cell.axon_length, cell.axon_segments.len())?;
        for point in &cell.axon_segments {
            write!(out, " {} {}", point.x, point.y)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn write_connections<W: Write>(out: &mut W, cells: &[Cell], seed: u64) -> io::Result<()> {
    header(out, "Connection list", "source | target", &[format!("Seed: {}", seed)])?;
    for cell in cells {
        for target in &cell.outputs {
            writeln!(out, "{} {}", cell.index, target)?;
        }
    }
    Ok(())
}

/// Per-cell sizes; `enhanced` appends the population flag column
pub fn write_sizes<W: Write>(out: &mut W, cells: &[Cell], enhanced: bool) -> io::Result<()> {
    let mut format = String::from(
        "cell | soma radius | dendritic radius | axon length | axon end to end distance | inputs | outputs",
    );
    if enhanced {
        format.push_str(" | enhanced");
    }
    header(out, "Sizes, lengths and connection counts", &format, &[])?;
    for cell in cells {
        write!(
            out,
            "{} {} {} {} {} {} {}",
            cell.index,
            cell.soma_radius,
            cell.dendrite_radius,
            cell.axon_length,
            cell.axon_end_to_end_distance(),
            cell.inputs.len(),
            cell.outputs.len()
        )?;
        if enhanced {
            write!(out, " {}", u8::from(cell.enhanced))?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn write_enhanced<W: Write>(out: &mut W, cells: &[Cell]) -> io::Result<()> {
    header(out, "Enhanced dendritic population", "cell | enhanced", &[])?;
    for cell in cells {
        writeln!(out, "{} {}", cell.index, u8::from(cell.enhanced))?;
    }
    Ok(())
}

/// Machine-readable record of one run
#[derive(Debug, Clone, Serialize)]
pub struct CultureSummary {
    pub seed: u64,
    pub neurons: usize,
    pub edges: usize,
    pub forced_placements: usize,
    pub forced_axon_segments: usize,
    pub mean_dendrite_radius: f64,
    pub mean_axon_length: f64,
    pub kcore: Vec<CoreDecomposition>,
    pub generated_at: String,
}

pub fn write_summary<W: Write>(out: &mut W, summary: &CultureSummary) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, summary)?;
    writeln!(out)
}

/// Create `path` and fill it with `write`
pub fn save<F>(path: &Path, write: F) -> CultureResult<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let file = File::create(path).map_err(|e| CultureError::io(path, e))?;
    let mut out = BufWriter::new(file);
    write(&mut out)
        .and_then(|_| out.flush())
        .map_err(|e| CultureError::io(path, e))
}
