//! # motes - CPU particle effects
//!
//! Short-lived particles emitted from a configurable region, simulated every
//! frame and recycled through an object pool.
//!
//! motes owns the simulation only. Drawing is left to whoever implements
//! [`Scene`]: it is told which particles appeared and which went away, and
//! reads their state (or a ready-made [`ParticleInstance`] buffer) from the
//! [`ParticleManager`].
//!
//! ## Quick Start
//!
//! ```ignore
//! use motes::prelude::*;
//!
//! fn main() {
//!     let mut config = ParticleSystemConfig::default();
//!     config.emitter.shape = EmitterShape::Sphere { radius: 1.0, shell: true };
//!     config.particle.velocity = Vec3::Y;
//!     config.randomness.velocity = Vec3::splat(0.5);
//!
//!     let mut system = ParticleSystem::new(Vec3::ZERO, config);
//!     let mut time = Time::new();
//!     let mut instances = Vec::new();
//!
//!     loop {
//!         let dt = time.update();
//!         system.update(dt, &mut Headless);
//!         system.manager().write_instances(&mut instances);
//!         // upload bytemuck::cast_slice(&instances) ...
//!     }
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Emission
//!
//! An [`Emitter`] runs one of three [`EmissionPolicy`] variants:
//!
//! - `CONTINUOUS`: one particle every `1 / emission_frequency` seconds
//! - `BURST`: `burst_count` particles every `burst_delay` seconds
//! - `CONSTANT`: keep the population at `count`
//!
//! and places each particle with an [`EmitterShape`] sampled around the
//! system origin plus the config offset. See [`shapes`] for the fourteen
//! shapes.
//!
//! ### Particles
//!
//! A [`Particle`] integrates velocity, friction, acceleration, turbulence and
//! point gravity with an explicit Euler step, then interpolates size, color
//! and opacity over its lifetime. Spawn parameters come from the config's
//! [`ParticleParameters`] template, jittered per spawn by
//! [`ParticleRandomness`].
//!
//! ### Pooling
//!
//! Dead particles are never freed. The [`ParticleManager`] moves them to a
//! cache and hands them out again on the next request, so a steady effect
//! stops allocating once it reaches its peak population.
//!
//! ### Time
//!
//! Lifetimes are measured against a [`Clock`]. [`SystemClock`] is the
//! default; [`ManualClock`] makes lifetimes exact in tests.
//!
//! ## Feature Overview
//!
//! | Category | Items |
//! |----------|-------|
//! | Composition | [`ParticleSystem`], [`ParticleSystemConfig`] |
//! | Emission | [`Emitter`], [`EmissionPolicy`], [`EmitterConfig`] |
//! | Shapes | [`EmitterShape`], [`ShapeSampler`], [`Sample`] |
//! | Particles | [`Particle`], [`ParticleParameters`], [`GeometryKind`] |
//! | Jitter | [`ParticleRandomness`], [`randomize`] |
//! | Pool | [`ParticleManager`], [`ParticleId`] |
//! | Rendering | [`Scene`], [`Headless`], [`ParticleInstance`] |
//! | Time | [`Clock`], [`SystemClock`], [`ManualClock`], [`Time`] |

mod config;
mod emitter;
pub mod error;
pub mod jitter;
mod manager;
mod particle;
pub mod scene;
pub mod shapes;
mod system;
pub mod time;

pub use bytemuck;
pub use config::ParticleSystemConfig;
pub use emitter::{
    EmissionPolicy, Emitter, EmitterConfig, CATCH_UP_TOLERANCE, MAX_CATCH_UP_STEPS,
    PRESET_FREQUENCY,
};
pub use error::ConfigError;
pub use glam::Vec3;
pub use jitter::{randomize, ParticleRandomness};
pub use manager::{ParticleId, ParticleManager};
pub use particle::{
    GeometryKind, Particle, ParticleInstance, ParticleParameters, Transform, ACCELERATION_SCALE,
    GRAVITY_EPSILON,
};
pub use scene::{Headless, Scene};
pub use shapes::{EmitterShape, Sample, ShapeSampler};
pub use system::ParticleSystem;
pub use time::{Clock, ManualClock, SystemClock, Time};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use motes::prelude::*;
/// ```
///
/// This imports:
/// - [`ParticleSystem`] and [`ParticleSystemConfig`]
/// - [`EmissionPolicy`], [`EmitterConfig`] and [`EmitterShape`]
/// - [`ParticleParameters`], [`ParticleRandomness`] and [`GeometryKind`]
/// - [`Scene`], [`Headless`] and [`ParticleId`]
/// - [`Time`] - the frame clock
/// - [`Vec3`] - glam vector type
pub mod prelude {
    pub use crate::config::ParticleSystemConfig;
    pub use crate::emitter::{EmissionPolicy, EmitterConfig};
    pub use crate::jitter::ParticleRandomness;
    pub use crate::manager::ParticleId;
    pub use crate::particle::{GeometryKind, ParticleInstance, ParticleParameters};
    pub use crate::scene::{Headless, Scene};
    pub use crate::shapes::EmitterShape;
    pub use crate::system::ParticleSystem;
    pub use crate::time::Time;
    pub use glam::Vec3;
}
