//! Per-spawn parameter randomization.
//!
//! A [`ParticleRandomness`] block declares how far each field of a
//! [`ParticleParameters`] template may wander. [`randomize`] reads both and
//! returns a fresh, owned parameter set for one spawn; the template is never
//! touched.
//!
//! Numeric jitter `r` adds `U(-0.5, 0.5) * r`, so the spread is `r` wide and
//! centered on the template value. Vector jitter applies the same law per axis.
//!
//! ```ignore
//! let jitter = ParticleRandomness {
//!     start_size: 0.5,
//!     velocity: Vec3::new(2.0, 0.0, 2.0),
//!     start_color: true,
//!     ..Default::default()
//! };
//! let params = randomize(&template, &jitter, &mut rng);
//! ```

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::particle::ParticleParameters;
use crate::shapes::centered;

/// Jitter magnitudes applied at spawn time. Zero means "no jitter".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleRandomness {
    pub start_size: f32,
    pub end_size: f32,
    /// Per-axis velocity jitter.
    pub velocity: Vec3,
    /// Replace the start color with a random RGB triple.
    pub start_color: bool,
    /// Replace the end color with a random RGB triple.
    pub end_color: bool,
    /// Time-to-live jitter in milliseconds.
    pub time_to_live: f32,
    /// Turbulence amplitude. When set it replaces the template's
    /// `chaotic_movement`; the amplitude is already the random component.
    pub chaotic_movement: Option<Vec3>,
}

/// Produce one concrete parameter set from `template` and `jitter`.
pub fn randomize<R: Rng + ?Sized>(
    template: &ParticleParameters,
    jitter: &ParticleRandomness,
    rng: &mut R,
) -> ParticleParameters {
    let mut params = template.clone();

    params.start_size = jitter_scalar(template.start_size, jitter.start_size, rng);
    params.end_size = template
        .end_size
        .map(|size| jitter_scalar(size, jitter.end_size, rng));
    params.velocity = jitter_vector(template.velocity, jitter.velocity, rng);
    params.time_to_live = jitter_scalar(template.time_to_live, jitter.time_to_live, rng);

    if jitter.start_color {
        params.start_color = random_color(rng);
    }
    if jitter.end_color {
        params.end_color = Some(random_color(rng));
    }
    if let Some(chaos) = jitter.chaotic_movement {
        params.chaotic_movement = chaos;
    }

    params
}

/// `value + U(-0.5, 0.5) * spread`, or `value` untouched when `spread` is zero.
#[inline]
pub fn jitter_scalar<R: Rng + ?Sized>(value: f32, spread: f32, rng: &mut R) -> f32 {
    if spread == 0.0 {
        return value;
    }
    value + centered(rng) * spread
}

/// Per-axis [`jitter_scalar`]. A zero spread vector leaves `value` untouched.
#[inline]
pub fn jitter_vector<R: Rng + ?Sized>(value: Vec3, spread: Vec3, rng: &mut R) -> Vec3 {
    if spread == Vec3::ZERO {
        return value;
    }
    value + Vec3::new(centered(rng), centered(rng), centered(rng)) * spread
}

/// Random RGB color, each channel uniform in `[0, 1)`.
pub fn random_color<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    Vec3::new(rng.gen(), rng.gen(), rng.gen())
}

/// Fast RNG seeded from the wall clock: different every run, no
/// reproducibility promised. Components offer `with_seed` for tests.
pub(crate) fn clock_seeded_rng(salt: u64) -> SmallRng {
    let seed = salt
        ^ std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42);
    SmallRng::seed_from_u64(seed)
}
