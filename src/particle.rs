//! A single simulated particle and its per-frame integration step.
//!
//! # Update order
//!
//! Each call to [`Particle::update`] performs one explicit Euler step:
//!
//! 1. `position += velocity * dt`
//! 2. friction: `velocity -= velocity * friction * dt`
//! 3. constant acceleration: `velocity += acceleration * dt`
//! 4. turbulence: `velocity += dt * chaotic_movement * U3(-0.5, 0.5)`
//! 5. point gravity toward `gravity_center`, falling off as `1 / dist^decay`
//! 6. life fraction from the clock: `(now - created_at) / time_to_live`
//! 7. color, opacity and size interpolated by life fraction
//! 8. death once `now - created_at > time_to_live`
//!
//! The step is frame-rate dependent, friction in particular.
//!
//! Life fraction is not clamped. Values past 1.0 extrapolate the visual
//! interpolation until the death check retires the particle.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::shapes::centered;

/// Acceleration is configured in milli-units per second squared.
pub const ACCELERATION_SCALE: f32 = 0.001;

/// Below this distance from the gravity center the pull is skipped for the
/// step instead of dividing by (nearly) zero.
pub const GRAVITY_EPSILON: f32 = 1e-6;

/// Mesh family the renderer should use for a particle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GeometryKind {
    #[default]
    Cube,
    Sphere,
    Torus,
    Pyramid,
}

impl GeometryKind {
    pub fn name(&self) -> &'static str {
        match self {
            GeometryKind::Cube => "Cube",
            GeometryKind::Sphere => "Sphere",
            GeometryKind::Torus => "Torus",
            GeometryKind::Pyramid => "Pyramid",
        }
    }

    /// Stable index for GPU-side lookup tables.
    pub fn index(&self) -> u32 {
        *self as u32
    }
}

fn default_size() -> f32 {
    1.0
}

fn default_opacity() -> f32 {
    100.0
}

fn default_color() -> Vec3 {
    Vec3::ONE
}

fn default_time_to_live() -> f32 {
    1000.0
}

/// Everything needed to (re)spawn one particle.
///
/// `end_*` fields default to their `start_*` counterpart, which turns the
/// corresponding interpolation off.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleParameters {
    #[serde(rename = "type")]
    pub kind: GeometryKind,
    pub wireframe: bool,

    #[serde(default = "default_size")]
    pub start_size: f32,
    pub end_size: Option<f32>,

    /// Spawn position. The emitter always fills this in.
    pub position: Option<Vec3>,
    pub velocity: Vec3,
    /// Constant acceleration, scaled by [`ACCELERATION_SCALE`] on assignment.
    pub acceleration: Vec3,
    /// Linear velocity damping per second.
    pub friction: f32,
    /// Signed point-gravity strength. Positive pulls toward the center.
    pub gravity: f32,
    pub gravity_center: Vec3,
    /// Exponent of the distance falloff: 0 constant, 1 linear, 2 quadratic...
    pub gravity_decay: f32,

    /// RGB in `[0, 1]`.
    #[serde(default = "default_color")]
    pub start_color: Vec3,
    pub end_color: Option<Vec3>,

    /// Opacity on a 0-100 scale.
    #[serde(default = "default_opacity")]
    pub start_opacity: f32,
    pub end_opacity: Option<f32>,

    /// Lifetime in milliseconds. Zero means the particle never dies.
    #[serde(default = "default_time_to_live")]
    pub time_to_live: f32,

    /// Per-axis turbulence amplitude.
    pub chaotic_movement: Vec3,
}

impl Default for ParticleParameters {
    fn default() -> Self {
        Self {
            kind: GeometryKind::Cube,
            wireframe: false,
            start_size: default_size(),
            end_size: None,
            position: None,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            friction: 0.0,
            gravity: 0.0,
            gravity_center: Vec3::ZERO,
            gravity_decay: 0.0,
            start_color: default_color(),
            end_color: None,
            start_opacity: default_opacity(),
            end_opacity: None,
            time_to_live: default_time_to_live(),
            chaotic_movement: Vec3::ZERO,
        }
    }
}

/// Start/end pair interpolated over a particle's life.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Ramp<T> {
    start: T,
    end: T,
}

impl<T: Copy + PartialEq> Ramp<T> {
    fn new(start: T, end: Option<T>) -> Self {
        Self {
            start,
            end: end.unwrap_or(start),
        }
    }

    #[inline]
    fn is_constant(&self) -> bool {
        self.start == self.end
    }
}

impl Ramp<f32> {
    #[inline]
    fn at(&self, t: f32) -> f32 {
        self.start + (self.end - self.start) * t
    }
}

impl Ramp<Vec3> {
    #[inline]
    fn at(&self, t: f32) -> Vec3 {
        self.start.lerp(self.end, t)
    }
}

/// Placement a pooled particle returns to before new parameters are applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub size: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            size: 1.0,
        }
    }
}

/// GPU-friendly snapshot of one live particle.
///
/// Laid out for direct upload as an instance buffer:
/// `bytemuck::cast_slice(&instances)`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 3],
    pub size: f32,
    pub color: [f32; 3],
    /// `[0, 1]`.
    pub opacity: f32,
    /// [`GeometryKind::index`].
    pub kind: u32,
    /// 1 when drawn as wireframe.
    pub wireframe: u32,
    pub _pad: [u32; 2],
}

/// One simulated particle.
///
/// Constructed once per pool slot; [`Particle::reset`] is the real spawn.
#[derive(Clone, Debug)]
pub struct Particle {
    kind: GeometryKind,
    wireframe: bool,
    visible: bool,

    position: Vec3,
    velocity: Vec3,
    acceleration: Vec3,
    friction: f32,
    chaotic_movement: Vec3,

    gravity: f32,
    gravity_center: Vec3,
    gravity_decay: f32,

    size: f32,
    size_ramp: Ramp<f32>,
    color: Vec3,
    color_ramp: Ramp<Vec3>,
    opacity: f32,
    opacity_ramp: Ramp<f32>,

    created_at: Duration,
    time_to_live: f32,
    life_fraction: f32,
    /// Set once the particle outlives its time-to-live.
    pub is_dead: bool,

    reset_parameters: ParticleParameters,
    reset_transform: Transform,
}

impl Particle {
    /// Create a particle born at `now`, shaped as `parameters.kind`.
    pub fn new(parameters: ParticleParameters, now: Duration) -> Self {
        let transform = Transform::default();
        let mut particle = Self {
            kind: parameters.kind,
            wireframe: false,
            visible: true,
            position: transform.position,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            friction: 0.0,
            chaotic_movement: Vec3::ZERO,
            gravity: 0.0,
            gravity_center: Vec3::ZERO,
            gravity_decay: 0.0,
            size: transform.size,
            size_ramp: Ramp::new(1.0, None),
            color: Vec3::ONE,
            color_ramp: Ramp::new(Vec3::ONE, None),
            opacity: 1.0,
            opacity_ramp: Ramp::new(100.0, None),
            created_at: now,
            time_to_live: default_time_to_live(),
            life_fraction: 0.0,
            is_dead: false,
            reset_parameters: parameters.clone(),
            reset_transform: transform,
        };
        particle.apply(&parameters);
        particle
    }

    /// Respawn in place at `now`.
    ///
    /// `Some(parameters)` replaces the stored template; `None` replays the
    /// last one. The transform returns to its initial placement first.
    pub fn reset(&mut self, parameters: Option<ParticleParameters>, now: Duration) {
        if let Some(parameters) = parameters {
            self.reset_parameters = parameters;
        }

        self.position = self.reset_transform.position;
        self.size = self.reset_transform.size;
        self.velocity = Vec3::ZERO;
        self.acceleration = Vec3::ZERO;
        self.chaotic_movement = Vec3::ZERO;
        self.gravity_center = Vec3::ZERO;

        let parameters = self.reset_parameters.clone();
        self.apply(&parameters);

        self.is_dead = false;
        self.life_fraction = 0.0;
        self.created_at = now;
    }

    /// Swap the mesh family. Returns `true` if it changed.
    ///
    /// The stored template follows, so a later `reset(None)` keeps `kind`.
    pub fn change_geometry(&mut self, kind: GeometryKind) -> bool {
        if self.kind == kind {
            return false;
        }
        self.kind = kind;
        self.reset_parameters.kind = kind;
        true
    }

    fn apply(&mut self, p: &ParticleParameters) {
        // physics
        self.friction = p.friction;
        if let Some(position) = p.position {
            self.position = position;
        }
        self.velocity = p.velocity;
        self.acceleration = p.acceleration * ACCELERATION_SCALE;
        self.chaotic_movement = p.chaotic_movement;
        self.gravity = p.gravity;
        self.gravity_center = p.gravity_center;
        self.gravity_decay = p.gravity_decay;

        // visuals
        self.color_ramp = Ramp::new(p.start_color, p.end_color);
        self.color = self.color_ramp.start;
        self.size_ramp = Ramp::new(p.start_size, p.end_size);
        self.size = self.size_ramp.start;
        self.opacity_ramp = Ramp::new(p.start_opacity, p.end_opacity);
        self.opacity = self.opacity_ramp.start / 100.0;

        self.time_to_live = p.time_to_live;
        self.wireframe = p.wireframe;
    }

    /// Advance by `dt` seconds, with `now` from the caller's clock.
    pub fn update<R: Rng + ?Sized>(&mut self, dt: f32, now: Duration, rng: &mut R) {
        self.position += self.velocity * dt;

        self.velocity -= self.velocity * (self.friction * dt);

        self.velocity += self.acceleration * dt;

        if self.chaotic_movement != Vec3::ZERO {
            let jolt = Vec3::new(centered(rng), centered(rng), centered(rng));
            self.velocity += self.chaotic_movement * jolt * dt;
        }

        if self.gravity != 0.0 {
            let to_center = self.gravity_center - self.position;
            let distance = to_center.length();
            if distance > GRAVITY_EPSILON {
                let force = self.gravity / distance.powf(self.gravity_decay);
                self.velocity += (to_center / distance) * (force * dt);
            }
        }

        let age_ms = self.age_millis(now);
        self.life_fraction = if self.time_to_live != 0.0 {
            (age_ms / self.time_to_live as f64) as f32
        } else {
            0.0
        };

        let t = self.life_fraction;
        if !self.color_ramp.is_constant() {
            self.color = self.color_ramp.at(t);
        }
        if !self.opacity_ramp.is_constant() {
            self.opacity = self.opacity_ramp.at(t) / 100.0;
        }
        if !self.size_ramp.is_constant() {
            // Uniform scale about the particle's own center: position is untouched.
            self.size = self.size_ramp.at(t);
        }

        if self.time_to_live != 0.0 && age_ms > self.time_to_live as f64 {
            self.is_dead = true;
        }
    }

    fn age_millis(&self, now: Duration) -> f64 {
        now.saturating_sub(self.created_at).as_secs_f64() * 1000.0
    }

    #[inline]
    pub fn kind(&self) -> GeometryKind {
        self.kind
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    #[inline]
    pub fn size(&self) -> f32 {
        self.size
    }

    #[inline]
    pub fn color(&self) -> Vec3 {
        self.color
    }

    /// Current opacity in `[0, 1]` (configured on a 0-100 scale).
    #[inline]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    #[inline]
    pub fn is_wireframe(&self) -> bool {
        self.wireframe
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Fraction of the time-to-live elapsed at the last update. Not clamped.
    #[inline]
    pub fn life_fraction(&self) -> f32 {
        self.life_fraction
    }

    #[inline]
    pub fn created_at(&self) -> Duration {
        self.created_at
    }

    /// Lifetime in milliseconds.
    #[inline]
    pub fn time_to_live(&self) -> f32 {
        self.time_to_live
    }

    /// The parameters the next `reset(None)` will replay.
    pub fn parameters(&self) -> &ParticleParameters {
        &self.reset_parameters
    }

    /// Snapshot for instanced rendering.
    pub fn instance(&self) -> ParticleInstance {
        ParticleInstance {
            position: self.position.to_array(),
            size: self.size,
            color: self.color.to_array(),
            opacity: self.opacity,
            kind: self.kind.index(),
            wireframe: self.wireframe as u32,
            _pad: [0; 2],
        }
    }
}
