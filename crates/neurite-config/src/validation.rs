// Copyright 2025 Neurite Developers
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Every violation is collected so a bad file is reported in one pass.

use crate::{
    AngleDistribution, ChamberShape, ConfigError, ConfigResult, LengthDistribution,
    NeuriteConfig, RadiusDistribution,
};

/// Validation errors that can occur during config validation
#[derive(Debug, Clone)]
pub enum ConfigValidationError {
    MissingRequired { field: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks chamber geometry, cell parameters, growth parameters and the
/// optional density map.
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` with details if validation fails
pub fn validate_config(config: &NeuriteConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_chamber(config, &mut errors);
    validate_cells(config, &mut errors);
    validate_axon(config, &mut errors);
    validate_density_map(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

/// Upper bound on `max_angle_spread / spread`, the widening steps per segment
const MAX_SPREAD_TRIALS: f64 = 10_000.0;

fn positive(field: &str, value: f64, errors: &mut Vec<ConfigValidationError>) {
    if !(value.is_finite() && value > 0.0) {
        errors.push(ConfigValidationError::InvalidValue {
            field: field.to_string(),
            reason: format!("must be positive (got {})", value),
        });
    }
}

fn non_negative(field: &str, value: f64, errors: &mut Vec<ConfigValidationError>) {
    if !(value.is_finite() && value >= 0.0) {
        errors.push(ConfigValidationError::InvalidValue {
            field: field.to_string(),
            reason: format!("must be zero or positive (got {})", value),
        });
    }
}

fn validate_chamber(config: &NeuriteConfig, errors: &mut Vec<ConfigValidationError>) {
    let chamber = &config.chamber;
    match chamber.shape {
        ChamberShape::Rectangular => {
            positive("chamber.width", chamber.width, errors);
            positive("chamber.height", chamber.height, errors);
        }
        ChamberShape::Circular => positive("chamber.radius", chamber.radius, errors),
    }
    positive("chamber.bucket_size_factor", chamber.bucket_size_factor, errors);
    if let Some(file) = &chamber.pattern_file {
        if file.as_os_str().is_empty() {
            errors.push(ConfigValidationError::MissingRequired {
                field: "chamber.pattern_file".to_string(),
            });
        }
    }
    if config.culture.placement_max_retries == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "culture.placement_max_retries".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
}

fn validate_cells(config: &NeuriteConfig, errors: &mut Vec<ConfigValidationError>) {
    positive("soma.radius", config.soma.radius, errors);

    match &config.dendrite {
        RadiusDistribution::Delta { radius } => non_negative("dendrite.radius", *radius, errors),
        RadiusDistribution::Gaussian { mean, std } => {
            non_negative("dendrite.mean", *mean, errors);
            non_negative("dendrite.std", *std, errors);
        }
        RadiusDistribution::Rayleigh { sigma } => positive("dendrite.sigma", *sigma, errors),
        RadiusDistribution::Enhanced {
            mean,
            std,
            fraction,
            multiplier,
        } => {
            non_negative("dendrite.mean", *mean, errors);
            non_negative("dendrite.std", *std, errors);
            non_negative("dendrite.multiplier", *multiplier, errors);
            if !(0.0..=1.0).contains(fraction) {
                errors.push(ConfigValidationError::InvalidValue {
                    field: "dendrite.fraction".to_string(),
                    reason: "must be between 0.0 and 1.0".to_string(),
                });
            }
        }
    }
}

fn validate_axon(config: &NeuriteConfig, errors: &mut Vec<ConfigValidationError>) {
    let axon = &config.axon;
    positive("axon.segment_length", axon.segment_length, errors);
    non_negative("axon.max_angle_spread", axon.max_angle_spread, errors);
    if axon.max_retries == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "axon.max_retries".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    if axon.segmentation == crate::Segmentation::FixedCount && axon.segment_count == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "axon.segment_count".to_string(),
            reason: "must be at least 1 with fixed_count segmentation".to_string(),
        });
    }

    match &axon.length {
        LengthDistribution::Delta { length } => non_negative("axon.length.length", *length, errors),
        LengthDistribution::Rayleigh { sigma } => positive("axon.length.sigma", *sigma, errors),
        LengthDistribution::Gaussian { mean, std } => {
            non_negative("axon.length.mean", *mean, errors);
            non_negative("axon.length.std", *std, errors);
        }
        LengthDistribution::Uniform { min, max } => {
            non_negative("axon.length.min", *min, errors);
            if max < min {
                errors.push(ConfigValidationError::InvalidValue {
                    field: "axon.length.max".to_string(),
                    reason: "must not be smaller than axon.length.min".to_string(),
                });
            }
        }
    }

    let spread = match &axon.turning {
        AngleDistribution::Uniform { spread, .. } => *spread,
        AngleDistribution::Gaussian { std, .. } => *std,
    };
    non_negative("axon.turning spread", spread, errors);
    if spread > 0.0 && axon.max_angle_spread / spread > MAX_SPREAD_TRIALS {
        errors.push(ConfigValidationError::InvalidValue {
            field: "axon.max_angle_spread".to_string(),
            reason: format!(
                "needs more than {} widening steps at turning spread {}",
                MAX_SPREAD_TRIALS, spread
            ),
        });
    }
}

fn validate_density_map(config: &NeuriteConfig, errors: &mut Vec<ConfigValidationError>) {
    let density = &config.density_map;
    if density.file.is_some() {
        positive("density_map.cell_width", density.cell_width, errors);
        positive("density_map.cell_height", density.cell_height, errors);
    }
    if let Some(file) = &density.file {
        if file.as_os_str().is_empty() {
            errors.push(ConfigValidationError::MissingRequired {
                field: "density_map.file".to_string(),
            });
        }
    }
}
