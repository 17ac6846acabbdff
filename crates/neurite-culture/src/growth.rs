// Copyright 2025 Neurite Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Neurite growth for a single cell.

# Axons

An axon is a greedy random walk of straight segments. The first segment
points in a uniformly random direction; every later one turns away from the
previous heading by an angle drawn from the configured turning distribution,
whose spread is multiplied by a trial counter. A segment that collides is
redrawn; after `max_retries` failures the trial counter grows, widening the
spread. Once `spread * trial` reaches `max_angle_spread` the candidate is
accepted regardless, so growth always terminates.

# Dendrites

A dendritic field is a disk around the soma whose radius is drawn once and
clamped to at least twice the soma radius.
*/

use glam::DVec2;
use neurite_config::{AngleDistribution, AxonConfig, LengthDistribution, RadiusDistribution, Segmentation};
use rand::Rng;
use std::f64::consts::TAU;
use tracing::{trace, warn};

use crate::models::Cell;
use crate::rng::{gaussian, rayleigh, uniform};
use crate::spatial::{ClassTag, Primitive};

/// Outcome of growing one axon
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AxonGrowth {
    pub segments: usize,
    /// Segments accepted despite a collision
    pub forced_segments: usize,
    /// Candidate segments drawn, accepted or not
    pub attempts: usize,
}

/// Relative slack when cutting an axon into whole segments
const PLAN_TOLERANCE: f64 = 1e-12;

/// Segment plan for one axon
#[derive(Debug, Clone, Copy, PartialEq)]
struct SegmentPlan {
    length: f64,
    count: usize,
    segment_length: f64,
    last_length: f64,
}

fn plan_segments(length: f64, params: &AxonConfig) -> SegmentPlan {
    match params.segmentation {
        Segmentation::FixedLength => {
            let segment_length = params.segment_length;
            let mut length = length;
            // Exact multiples must not round up to an extra empty segment
            let ratio = (length / segment_length) * (1.0 - PLAN_TOLERANCE);
            let mut count = ratio.ceil() as usize;
            // Axons always get at least one full segment past the soma
            if count <= 1 {
                length += segment_length;
                count += 1;
            }
            SegmentPlan {
                length,
                count,
                segment_length,
                last_length: length - (count - 1) as f64 * segment_length,
            }
        }
        Segmentation::FixedCount => {
            let count = params.segment_count.max(1);
            let segment_length = length / count as f64;
            SegmentPlan {
                length,
                count,
                segment_length,
                last_length: segment_length,
            }
        }
    }
}

fn sample_length<R: Rng + ?Sized>(distribution: &LengthDistribution, rng: &mut R) -> f64 {
    let length = match distribution {
        LengthDistribution::Delta { length } => *length,
        LengthDistribution::Rayleigh { sigma } => rayleigh(rng, *sigma),
        LengthDistribution::Gaussian { mean, std } => gaussian(rng, *mean, *std),
        LengthDistribution::Uniform { min, max } => uniform(rng, *min, *max),
    };
    length.max(0.0)
}

fn sample_turn<R: Rng + ?Sized>(distribution: &AngleDistribution, trial: u32, rng: &mut R) -> f64 {
    let trial = f64::from(trial);
    match distribution {
        AngleDistribution::Uniform { mean, spread } => mean + uniform(rng, -spread, *spread) * trial,
        AngleDistribution::Gaussian { mean, std } => mean + gaussian(rng, 0.0, std * trial),
    }
}

/// Grow the axon of `cell`, replacing any previous one
///
/// `collides` decides whether a candidate segment hits existing geometry.
pub fn grow_axon<R, F>(cell: &mut Cell, params: &AxonConfig, rng: &mut R, mut collides: F) -> AxonGrowth
where
    R: Rng + ?Sized,
    F: FnMut(&Primitive) -> bool,
{
    let plan = plan_segments(sample_length(&params.length, rng), params);
    let base_spread = params.turning.spread();

    let mut growth = AxonGrowth::default();
    let mut segments = Vec::with_capacity(plan.count);
    let mut start = cell.position;
    let mut heading = 0.0;

    for i in 0..plan.count {
        let length = if i + 1 == plan.count {
            plan.last_length
        } else {
            plan.segment_length
        };
        let mut trial: u32 = 1;
        let mut retry: u32 = 0;

        loop {
            growth.attempts += 1;
            let angle = if i == 0 {
                uniform(rng, 0.0, TAU)
            } else {
                heading + sample_turn(&params.turning, trial, rng)
            };
            let end = start + DVec2::from_angle(angle) * length;
            let candidate = Primitive::segment(start, end, ClassTag::AXON, Some(cell.index));

            if collides(&candidate) {
                let spread = base_spread * f64::from(trial);
                if base_spread > 0.0 && spread < params.max_angle_spread && trial < u32::MAX {
                    retry += 1;
                    if retry >= params.max_retries {
                        retry = 0;
                        trial = trial.saturating_add(1);
                        trace!(target: "neurite-culture", "Cell {} segment {}: widening turn spread to {:.3}", cell.index, i, base_spread * f64::from(trial));
                    }
                    continue;
                }
                growth.forced_segments += 1;
                warn!(target: "neurite-culture", "⚠️ Axon limit reached for cell {} at segment {} (spread {:.3})", cell.index, i, spread);
            }

            heading = angle;
            start = end;
            segments.push(end);
            break;
        }
    }

    growth.segments = segments.len();
    cell.set_axon(plan.length, segments);
    growth
}

/// Draw a dendritic radius; the flag marks the enhanced population
fn sample_dendrite_radius<R: Rng + ?Sized>(distribution: &RadiusDistribution, rng: &mut R) -> (f64, bool) {
    match distribution {
        RadiusDistribution::Delta { radius } => (*radius, false),
        RadiusDistribution::Gaussian { mean, std } => (gaussian(rng, *mean, *std), false),
        RadiusDistribution::Rayleigh { sigma } => (rayleigh(rng, *sigma), false),
        RadiusDistribution::Enhanced {
            mean,
            std,
            fraction,
            multiplier,
        } => {
            let enhanced = rng.gen::<f64>() <= *fraction;
            let scale = if enhanced { *multiplier } else { 1.0 };
            (mean * scale + gaussian(rng, 0.0, *std), enhanced)
        }
    }
}

/// Grow the dendritic field of `cell` and return its disk
pub fn grow_dendrite<R: Rng + ?Sized>(
    cell: &mut Cell,
    distribution: &RadiusDistribution,
    rng: &mut R,
) -> Primitive {
    let (radius, enhanced) = sample_dendrite_radius(distribution, rng);
    cell.dendrite_radius = radius.max(2.0 * cell.soma_radius);
    cell.enhanced = enhanced;
    cell.dendrite_disk()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded_rng;

    fn straight_axon(length: f64, segment_length: f64) -> AxonConfig {
        AxonConfig {
            length: LengthDistribution::Delta { length },
            turning: AngleDistribution::Gaussian { mean: 0.0, std: 0.0 },
            segment_length,
            ..AxonConfig::default()
        }
    }

    fn path_length(cell: &Cell) -> f64 {
        let mut previous = cell.position;
        let mut total = 0.0;
        for point in &cell.axon_segments {
            total += point.distance(previous);
            previous = *point;
        }
        total
    }

    #[test]
    fn test_fixed_length_plan() {
        let plan = plan_segments(0.105, &straight_axon(0.0, 0.01));
        assert_eq!(plan.count, 11);
        assert!((plan.last_length - 0.005).abs() < 1e-12);

        // Short axons get one extra full segment
        let plan = plan_segments(0.004, &straight_axon(0.0, 0.01));
        assert_eq!(plan.count, 2);
        assert!((plan.length - 0.014).abs() < 1e-12);
        assert!((plan.last_length - 0.004).abs() < 1e-12);

        let plan = plan_segments(0.0, &straight_axon(0.0, 0.01));
        assert_eq!(plan.count, 1);
        assert!((plan.last_length - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_exact_multiple_has_no_empty_tail() {
        // 0.07 / 0.01 evaluates to 7.000000000000001
        for (length, count) in [(0.07, 7), (0.3, 30), (0.05, 5), (0.1, 10)] {
            let plan = plan_segments(length, &straight_axon(0.0, 0.01));
            assert_eq!(plan.count, count, "length {}", length);
            assert!((plan.last_length - 0.01).abs() < 1e-9, "length {}", length);
        }

        let (mut rng, _) = seeded_rng(Some(3));
        let mut cell = Cell::new(0, DVec2::ZERO, 0.01);
        let growth = grow_axon(&mut cell, &straight_axon(0.07, 0.01), &mut rng, |_| false);
        assert_eq!(growth.segments, 7);
        assert_eq!(cell.axon_segments.len(), 7);
        let tail = cell.axon_segments[6].distance(cell.axon_segments[5]);
        assert!((tail - 0.01).abs() < 1e-9);
    }

    #[test]
    fn test_narrow_spread_still_terminates() {
        // 3.2 / 1e-3 = 3200 widening steps before the segment is forced
        let params = AxonConfig {
            length: LengthDistribution::Delta { length: 0.01 },
            turning: AngleDistribution::Uniform {
                mean: 0.0,
                spread: 1e-3,
            },
            segment_length: 0.01,
            max_retries: 1,
            ..AxonConfig::default()
        };
        let (mut rng, _) = seeded_rng(Some(6));
        let mut cell = Cell::new(0, DVec2::ZERO, 0.01);
        let growth = grow_axon(&mut cell, &params, &mut rng, |_| true);

        assert_eq!(growth.forced_segments, growth.segments);
        assert!(growth.attempts <= growth.segments * 3201);
    }

    #[test]
    fn test_fixed_count_plan() {
        let params = AxonConfig {
            segmentation: Segmentation::FixedCount,
            segment_count: 4,
            ..AxonConfig::default()
        };
        let plan = plan_segments(0.2, &params);
        assert_eq!(plan.count, 4);
        assert!((plan.segment_length - 0.05).abs() < 1e-12);
        assert_eq!(plan.last_length, plan.segment_length);
    }

    #[test]
    fn test_free_axon_is_straight_with_zero_turning() {
        let (mut rng, _) = seeded_rng(Some(9));
        let mut cell = Cell::new(0, DVec2::new(0.1, 0.2), 0.01);
        let growth = grow_axon(&mut cell, &straight_axon(0.1, 0.01), &mut rng, |_| false);

        assert_eq!(growth.segments, 10);
        assert_eq!(growth.forced_segments, 0);
        assert_eq!(growth.attempts, 10);
        assert!((path_length(&cell) - 0.1).abs() < 1e-9);
        assert!((cell.axon_end_to_end_distance() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_blocked_axon_terminates() {
        let params = AxonConfig {
            length: LengthDistribution::Delta { length: 0.05 },
            turning: AngleDistribution::Uniform {
                mean: 0.0,
                spread: 0.5,
            },
            segment_length: 0.01,
            max_retries: 3,
            max_angle_spread: 2.0,
            ..AxonConfig::default()
        };
        let (mut rng, _) = seeded_rng(Some(2));
        let mut cell = Cell::new(1, DVec2::ZERO, 0.01);
        let growth = grow_axon(&mut cell, &params, &mut rng, |_| true);

        assert_eq!(growth.segments, 5);
        assert_eq!(growth.forced_segments, 5);
        // Trials 1..=3 each fail max_retries times, trial 4 is forced
        assert_eq!(growth.attempts, 5 * (3 * 3 + 1));
    }

    #[test]
    fn test_zero_spread_forces_immediately() {
        let (mut rng, _) = seeded_rng(Some(4));
        let mut cell = Cell::new(2, DVec2::ZERO, 0.01);
        let growth = grow_axon(&mut cell, &straight_axon(0.03, 0.01), &mut rng, |_| true);
        assert_eq!(growth.forced_segments, growth.segments);
        assert_eq!(growth.attempts, growth.segments);
    }

    #[test]
    fn test_collision_steers_growth() {
        let params = AxonConfig {
            length: LengthDistribution::Delta { length: 0.05 },
            turning: AngleDistribution::Uniform {
                mean: 0.0,
                spread: 0.3,
            },
            segment_length: 0.01,
            ..AxonConfig::default()
        };
        let (mut rng, _) = seeded_rng(Some(8));
        let mut cell = Cell::new(0, DVec2::ZERO, 0.01);
        // Forbid any segment ending in the lower half plane
        let growth = grow_axon(&mut cell, &params, &mut rng, |p| match p.shape {
            crate::spatial::Shape::Segment { end, .. } => end.y < 0.0,
            _ => false,
        });

        if growth.forced_segments == 0 {
            assert!(cell.axon_segments.iter().all(|p| p.y >= 0.0));
        }
        assert_eq!(growth.segments, 5);
    }

    #[test]
    fn test_dendrite_clamped_to_twice_soma() {
        let (mut rng, _) = seeded_rng(Some(1));
        let mut cell = Cell::new(0, DVec2::ZERO, 0.01);
        let disk = grow_dendrite(&mut cell, &RadiusDistribution::Delta { radius: 0.001 }, &mut rng);
        assert_eq!(cell.dendrite_radius, 0.02);
        assert_eq!(disk.class, ClassTag::DENDRITE);
        assert!(!cell.enhanced);
    }

    #[test]
    fn test_enhanced_population_flag() {
        let (mut rng, _) = seeded_rng(Some(6));
        let always = RadiusDistribution::Enhanced {
            mean: 0.1,
            std: 0.0,
            fraction: 1.0,
            multiplier: 3.0,
        };
        let mut cell = Cell::new(0, DVec2::ZERO, 0.01);
        grow_dendrite(&mut cell, &always, &mut rng);
        assert!(cell.enhanced);
        assert!((cell.dendrite_radius - 0.3).abs() < 1e-12);

        let never = RadiusDistribution::Enhanced {
            mean: 0.1,
            std: 0.0,
            fraction: 0.0,
            multiplier: 3.0,
        };
        let mut enhanced = 0;
        for _ in 0..100 {
            grow_dendrite(&mut cell, &never, &mut rng);
            enhanced += usize::from(cell.enhanced);
        }
        assert_eq!(enhanced, 0);
        assert!((cell.dendrite_radius - 0.1).abs() < 1e-12);
    }
}
