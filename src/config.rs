//! Configuration bundle for one particle system.
//!
//! A [`ParticleSystemConfig`] is plain data: it can be built in code,
//! loaded from JSON, and mutated in place between frames. The system reads
//! it fresh on every update and never snapshots it.
//!
//! ```ignore
//! let config = ParticleSystemConfig::from_json(r#"{
//!     "particle": { "type": "SPHERE", "start_size": 0.2, "time_to_live": 800 },
//!     "randomness": { "velocity": [1, 0, 1], "start_color": true },
//!     "offset": [0, 1, 0],
//!     "emitter": {
//!         "policy": { "type": "CONTINUOUS", "emission_frequency": 60 },
//!         "shape": { "shape": "CIRCLE", "radius": 2, "normal": [0, 1, 0], "edge": false }
//!     }
//! }"#)?;
//! ```

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::emitter::EmitterConfig;
use crate::error::ConfigError;
use crate::jitter::ParticleRandomness;
use crate::particle::ParticleParameters;

/// Template, jitter, offset and emitter for one system.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleSystemConfig {
    /// Template every spawned particle starts from.
    pub particle: ParticleParameters,
    /// Per-spawn jitter applied on top of `particle`.
    pub randomness: ParticleRandomness,
    /// Added to the emitter origin before sampling the shape.
    pub offset: Vec3,
    pub emitter: EmitterConfig,
}

impl Default for ParticleSystemConfig {
    fn default() -> Self {
        Self {
            particle: ParticleParameters {
                start_size: 0.1,
                time_to_live: 300.0,
                ..Default::default()
            },
            randomness: ParticleRandomness::default(),
            offset: Vec3::ZERO,
            emitter: EmitterConfig::default(),
        }
    }
}

impl ParticleSystemConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that every value describes something the simulation can run.
    ///
    /// Runtime paths tolerate bad values anyway (see the emitter's catch-up
    /// cap); this catches them up front.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.particle;
        finite_scalar("particle.start_size", p.start_size)?;
        if let Some(end) = p.end_size {
            finite_scalar("particle.end_size", end)?;
        }
        finite_scalar("particle.friction", p.friction)?;
        finite_scalar("particle.gravity", p.gravity)?;
        non_negative("particle.gravity_decay", p.gravity_decay)?;
        non_negative("particle.time_to_live", p.time_to_live)?;
        opacity("particle.start_opacity", p.start_opacity)?;
        if let Some(end) = p.end_opacity {
            opacity("particle.end_opacity", end)?;
        }
        finite_vectors(
            "particle",
            &[
                p.velocity,
                p.acceleration,
                p.gravity_center,
                p.start_color,
                p.chaotic_movement,
            ],
        )?;
        if let Some(position) = p.position {
            finite_vectors("particle.position", &[position])?;
        }
        if let Some(end) = p.end_color {
            finite_vectors("particle.end_color", &[end])?;
        }

        let r = &self.randomness;
        non_negative("randomness.start_size", r.start_size)?;
        non_negative("randomness.end_size", r.end_size)?;
        non_negative("randomness.time_to_live", r.time_to_live)?;
        finite_vectors("randomness.velocity", &[r.velocity])?;
        if let Some(chaos) = r.chaotic_movement {
            finite_vectors("randomness.chaotic_movement", &[chaos])?;
        }

        finite_vectors("offset", &[self.offset])?;
        self.emitter.validate()
    }
}

fn finite_scalar(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("expected a finite number, got {}", value)))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite_scalar(field, value)?;
    if value < 0.0 {
        return Err(ConfigError::invalid(
            field,
            format!("expected a non-negative number, got {}", value),
        ));
    }
    Ok(())
}

fn opacity(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite_scalar(field, value)?;
    if !(0.0..=100.0).contains(&value) {
        return Err(ConfigError::invalid(
            field,
            format!("opacity is on a 0-100 scale, got {}", value),
        ));
    }
    Ok(())
}

fn finite_vectors(field: &'static str, vectors: &[Vec3]) -> Result<(), ConfigError> {
    if vectors.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, "vector components must be finite"))
    }
}
