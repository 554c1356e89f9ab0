//! Emission policies: how many particles to spawn each frame, and where.
//!
//! An [`Emitter`] keeps one accumulator, the time since it last emitted, and
//! on every [`Emitter::update`] asks the [`ParticleManager`] for new particles
//! according to the configured [`EmissionPolicy`]. Spawn positions come from
//! the configured [`EmitterShape`], sampled around `origin + offset`.
//!
//! # Policies
//!
//! | Policy | Fires when | Spawns |
//! |--------|-----------|--------|
//! | [`EmissionPolicy::Continuous`] | every `1 / emission_frequency` seconds | 1 |
//! | [`EmissionPolicy::Burst`] | every `burst_delay` seconds | `burst_count` |
//! | [`EmissionPolicy::Constant`] | active population below `count` | up to `count` |
//!
//! The timed policies catch up: one long frame fires as many times as the
//! interval fits into the accumulated time, so the long-run rate holds after
//! a stall. Catch-up is capped at [`MAX_CATCH_UP_STEPS`] firings per update;
//! past that the backlog is dropped.
//!
//! # Example
//!
//! ```ignore
//! let config = ParticleSystemConfig {
//!     emitter: EmitterConfig {
//!         policy: EmissionPolicy::Burst { burst_count: 50, burst_delay: Some(0.5) },
//!         shape: EmitterShape::Sphere { radius: 1.0, shell: true },
//!     },
//!     ..Default::default()
//! };
//! ```

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::config::ParticleSystemConfig;
use crate::error::ConfigError;
use crate::jitter::{clock_seeded_rng, ParticleRandomness};
use crate::manager::{ParticleId, ParticleManager};
use crate::particle::ParticleParameters;
use crate::scene::Scene;
use crate::shapes::{EmitterShape, Sample, ShapeSampler};
use crate::time::Clock;

/// Upper bound on timed-policy firings in a single update.
pub const MAX_CATCH_UP_STEPS: u32 = 10_000;

/// Relative slack when comparing the accumulator against an interval, so
/// that `10 Hz * 1 s` fires exactly ten times despite rounding.
pub const CATCH_UP_TOLERANCE: f64 = 1e-9;

/// Rate of the default [`EmissionPolicy`].
pub const PRESET_FREQUENCY: f32 = 100.0;

/// Rate used when `emission_frequency` is absent or zero.
fn default_frequency() -> f32 {
    1.0
}

/// Rule deciding when particles are spawned.
///
/// Serialized with an internal `"type"` tag, e.g.
/// `{ "type": "BURST", "burst_count": 20, "burst_delay": 1.5 }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmissionPolicy {
    /// Keep the active population topped up to `count`.
    ///
    /// Ignores elapsed time.
    Constant {
        #[serde(default)]
        count: u32,
    },
    /// Spawn `burst_count` particles every `burst_delay` seconds.
    ///
    /// With no delay the burst never fires.
    Burst {
        #[serde(default)]
        burst_count: u32,
        #[serde(default)]
        burst_delay: Option<f32>,
    },
    /// Spawn one particle `emission_frequency` times per second.
    ///
    /// A missing or zero frequency is read as 1 Hz.
    Continuous {
        #[serde(default = "default_frequency")]
        emission_frequency: f32,
    },
}

impl Default for EmissionPolicy {
    fn default() -> Self {
        EmissionPolicy::Continuous {
            emission_frequency: PRESET_FREQUENCY,
        }
    }
}

impl EmissionPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            EmissionPolicy::Constant { .. } => "Constant",
            EmissionPolicy::Burst { .. } => "Burst",
            EmissionPolicy::Continuous { .. } => "Continuous",
        }
    }

    pub fn variants() -> &'static [&'static str] {
        &["Constant", "Burst", "Continuous"]
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            EmissionPolicy::Constant { .. } => Ok(()),
            EmissionPolicy::Burst { burst_delay, .. } => match burst_delay {
                Some(delay) if !(delay.is_finite() && delay > 0.0) => Err(ConfigError::invalid(
                    "emitter.policy.burst_delay",
                    format!("expected a positive number of seconds, got {}", delay),
                )),
                _ => Ok(()),
            },
            EmissionPolicy::Continuous { emission_frequency } => {
                if emission_frequency.is_finite() && emission_frequency >= 0.0 {
                    Ok(())
                } else {
                    Err(ConfigError::invalid(
                        "emitter.policy.emission_frequency",
                        format!("expected a finite, non-negative rate, got {}", emission_frequency),
                    ))
                }
            }
        }
    }
}

/// Emission policy paired with the region it emits from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    pub policy: EmissionPolicy,
    pub shape: EmitterShape,
}

impl EmitterConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        self.policy.validate()?;
        self.shape.validate()
    }
}

/// Interval in seconds between continuous emissions.
fn continuous_interval(frequency: f32) -> f64 {
    let frequency = if frequency.is_finite() && frequency > 0.0 {
        frequency
    } else {
        1.0
    };
    1.0 / frequency as f64
}

/// Whether `accumulated` has reached `interval`, within [`CATCH_UP_TOLERANCE`].
#[inline]
fn is_due(accumulated: f64, interval: f64) -> bool {
    accumulated + interval * CATCH_UP_TOLERANCE >= interval
}

/// Decides each frame how many particles to spawn and where.
///
/// The emitter never touches the pool directly; it only calls
/// [`ParticleManager::request`].
#[derive(Debug)]
pub struct Emitter {
    origin: Vec3,
    since_last_emission: f64,
    rng: SmallRng,
    batch: Vec<ParticleId>,
    warned_degenerate: bool,
}

impl Emitter {
    pub fn new(origin: Vec3) -> Self {
        Self {
            origin,
            since_last_emission: 0.0,
            rng: clock_seeded_rng(0x5851_f42d),
            batch: Vec::new(),
            warned_degenerate: false,
        }
    }

    /// Use a fixed RNG seed for shape sampling.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn set_origin(&mut self, origin: Vec3) {
        self.origin = origin;
    }

    /// Seconds accumulated since the last emission.
    #[inline]
    pub fn since_last_emission(&self) -> f64 {
        self.since_last_emission
    }

    /// Forget accumulated time.
    pub fn reset(&mut self) {
        self.since_last_emission = 0.0;
    }

    /// Particles spawned by the most recent [`update`](Self::update).
    pub fn last_batch(&self) -> &[ParticleId] {
        &self.batch
    }

    /// Advance by `dt` seconds and spawn whatever `config` calls for.
    ///
    /// Everything spawned is announced to `scene` as one batch. Returns the
    /// number of particles spawned.
    pub fn update<C: Clock>(
        &mut self,
        dt: f32,
        config: &ParticleSystemConfig,
        manager: &mut ParticleManager<C>,
        scene: &mut impl Scene,
    ) -> usize {
        self.batch.clear();

        if dt.is_finite() && dt >= 0.0 {
            self.since_last_emission += dt as f64;
        } else {
            log::warn!("ignoring invalid frame delta {}", dt);
        }

        let sampler = config.emitter.shape.sampler();
        let origin = self.origin + config.offset;
        let mut template = config.particle.clone();
        let randomness = &config.randomness;

        match config.emitter.policy {
            EmissionPolicy::Continuous { emission_frequency } => {
                let interval = continuous_interval(emission_frequency);
                self.catch_up(interval, |emitter| {
                    emitter.spawn(&sampler, origin, &mut template, randomness, manager);
                });
            }
            EmissionPolicy::Burst {
                burst_count,
                burst_delay,
            } => match burst_delay {
                Some(delay) if delay.is_finite() && delay > 0.0 => {
                    self.warned_degenerate = false;
                    self.catch_up(delay as f64, |emitter| {
                        for _ in 0..burst_count {
                            emitter.spawn(&sampler, origin, &mut template, randomness, manager);
                        }
                    });
                }
                Some(delay) => {
                    if !self.warned_degenerate {
                        log::warn!("burst delay {} never fires; use a positive delay", delay);
                        self.warned_degenerate = true;
                    }
                }
                None => {}
            },
            EmissionPolicy::Constant { count } => {
                while manager.len() < count as usize {
                    self.since_last_emission = 0.0;
                    self.spawn(&sampler, origin, &mut template, randomness, manager);
                }
            }
        }

        if !self.batch.is_empty() {
            log::trace!(
                "{} emitter spawned {} particles",
                config.emitter.policy.name(),
                self.batch.len()
            );
            scene.add(&self.batch);
        }
        self.batch.len()
    }

    /// Fire `emit` once per `interval` held in the accumulator.
    fn catch_up(&mut self, interval: f64, mut emit: impl FnMut(&mut Self)) {
        let mut steps = 0;
        while is_due(self.since_last_emission, interval) {
            if steps == MAX_CATCH_UP_STEPS {
                log::warn!(
                    "emission fell {:.3}s behind; dropping backlog after {} steps",
                    self.since_last_emission,
                    steps
                );
                self.since_last_emission = 0.0;
                break;
            }
            self.since_last_emission -= interval;
            emit(self);
            steps += 1;
        }
    }

    fn spawn<C: Clock>(
        &mut self,
        sampler: &ShapeSampler,
        origin: Vec3,
        template: &mut ParticleParameters,
        randomness: &ParticleRandomness,
        manager: &mut ParticleManager<C>,
    ) {
        template.position = Some(sampler.sample(origin, &mut self.rng));
        let id = manager.request(template, randomness);
        self.batch.push(id);
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}
