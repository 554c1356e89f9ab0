//! Emitter shapes: where in space a new particle is placed.
//!
//! An [`EmitterShape`] is the serializable description; [`EmitterShape::sampler`]
//! turns it into a [`ShapeSampler`] that holds the precomputed parameters
//! (unit axes, defaults for degenerate input) and draws one point per call.
//!
//! Every sampler is uniform over its stated domain: the surface when
//! `edge`/`shell` is set, the filled area or volume otherwise. Uniform means
//! uniform in space, not in the parameterization, so filled disks use the
//! `sqrt(u)` radius law and filled balls the `cbrt(u)` law.
//!
//! # Shapes
//!
//! | Shape | Parameters | Boundary flag |
//! |-------|------------|---------------|
//! | [`EmitterShape::Point`] | - | - |
//! | [`EmitterShape::Line`] | direction, optional length | - |
//! | [`EmitterShape::Circle`] | radius, normal | `edge` |
//! | [`EmitterShape::Square`] / [`EmitterShape::Rectangle`] | two side vectors | `edge` |
//! | [`EmitterShape::Ellipse`] | two semi-axes | `edge` |
//! | [`EmitterShape::Ring`] | inner/outer radius, normal | - |
//! | [`EmitterShape::Sphere`] | radius | `shell` |
//! | [`EmitterShape::Hemisphere`] | radius, normal | `shell` |
//! | [`EmitterShape::Ellipsoid`] | three semi-axes | `shell` |
//! | [`EmitterShape::Cylinder`] | radius, height, axis | `shell`, `closed` |
//! | [`EmitterShape::Capsule`] | radius, body height, axis | `shell` |
//! | [`EmitterShape::Cone`] | base radius, apex vector | `shell` |
//! | [`EmitterShape::Parallelepiped`] / [`EmitterShape::Cube`] | three edge vectors | `shell` |
//!
//! Zero-length normals and axes are replaced by `+Y` instead of failing.
//!
//! # Example
//!
//! ```ignore
//! let shape = EmitterShape::Sphere { radius: 2.0, shell: true };
//! let sampler = shape.sampler();
//! let p = sampler.sample(Vec3::ZERO, &mut rng);
//! assert!((p.length() - 2.0).abs() < 1e-4);
//! ```

mod flat;
mod solid;

pub use flat::{CircleSampler, EllipseSampler, LineSampler, RectangleSampler, RingSampler};
pub use solid::{
    CapsuleSampler, ConeSampler, CylinderSampler, EllipsoidSampler, HemisphereSampler,
    ParallelepipedSampler, SphereSampler,
};

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::error::ConfigError;

fn yes() -> bool {
    true
}

/// Geometric region particles are emitted from.
///
/// Serialized with an internal `"shape"` tag, e.g.
/// `{ "shape": "CIRCLE", "radius": 10.0, "normal": [0, 1, 0], "edge": false }`.
/// Omitted `edge`/`shell`/`closed` flags default to `true`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmitterShape {
    /// Every particle starts at the origin.
    Point,
    /// Segment starting at the origin.
    Line {
        /// Direction of the segment.
        direction: Vec3,
        /// Segment length. Defaults to `direction.length()`.
        #[serde(default)]
        length: Option<f32>,
    },
    /// Disk (or its rim when `edge`) in the plane orthogonal to `normal`.
    Circle {
        radius: f32,
        normal: Vec3,
        #[serde(default = "yes")]
        edge: bool,
    },
    /// Same as [`EmitterShape::Rectangle`], edited with equal sides.
    Square {
        dimensions: [Vec3; 2],
        #[serde(default = "yes")]
        edge: bool,
    },
    /// Parallelogram spanned by two side vectors, centered on the origin.
    Rectangle {
        dimensions: [Vec3; 2],
        #[serde(default = "yes")]
        edge: bool,
    },
    /// Ellipse with the two given semi-axis vectors.
    Ellipse {
        dimensions: [Vec3; 2],
        #[serde(default = "yes")]
        edge: bool,
    },
    /// Annulus between two radii in the plane orthogonal to `normal`.
    Ring {
        inner_radius: f32,
        outer_radius: f32,
        normal: Vec3,
    },
    Sphere {
        radius: f32,
        #[serde(default = "yes")]
        shell: bool,
    },
    /// Half ball on the side `normal` points to.
    Hemisphere {
        radius: f32,
        normal: Vec3,
        #[serde(default = "yes")]
        shell: bool,
    },
    /// Ellipsoid with the three given semi-axis vectors.
    Ellipsoid {
        dimensions: [Vec3; 3],
        #[serde(default = "yes")]
        shell: bool,
    },
    /// Cylinder centered on the origin, extending `height / 2` each way along `axis`.
    Cylinder {
        radius: f32,
        height: f32,
        axis: Vec3,
        #[serde(default = "yes")]
        shell: bool,
        /// Whether the end caps belong to the shell.
        #[serde(default = "yes")]
        closed: bool,
    },
    /// Cylinder body of length `height` with hemispherical caps of `radius`.
    Capsule {
        radius: f32,
        height: f32,
        axis: Vec3,
        #[serde(default = "yes")]
        shell: bool,
    },
    /// Cone with its base disk at the origin and its apex at `height`.
    Cone {
        radius: f32,
        height: Vec3,
        #[serde(default = "yes")]
        shell: bool,
    },
    /// Box spanned by three edge vectors, centered on the origin.
    Parallelepiped {
        dimensions: [Vec3; 3],
        #[serde(default = "yes")]
        shell: bool,
    },
    /// Same as [`EmitterShape::Parallelepiped`], edited as a cube.
    Cube {
        dimensions: [Vec3; 3],
        #[serde(default = "yes")]
        shell: bool,
    },
}

impl Default for EmitterShape {
    fn default() -> Self {
        EmitterShape::Point
    }
}

impl EmitterShape {
    pub fn name(&self) -> &'static str {
        match self {
            EmitterShape::Point => "Point",
            EmitterShape::Line { .. } => "Line",
            EmitterShape::Circle { .. } => "Circle",
            EmitterShape::Square { .. } => "Square",
            EmitterShape::Rectangle { .. } => "Rectangle",
            EmitterShape::Ellipse { .. } => "Ellipse",
            EmitterShape::Ring { .. } => "Ring",
            EmitterShape::Sphere { .. } => "Sphere",
            EmitterShape::Hemisphere { .. } => "Hemisphere",
            EmitterShape::Ellipsoid { .. } => "Ellipsoid",
            EmitterShape::Cylinder { .. } => "Cylinder",
            EmitterShape::Capsule { .. } => "Capsule",
            EmitterShape::Cone { .. } => "Cone",
            EmitterShape::Parallelepiped { .. } => "Parallelepiped",
            EmitterShape::Cube { .. } => "Cube",
        }
    }

    pub fn variants() -> &'static [&'static str] {
        &[
            "Point",
            "Line",
            "Circle",
            "Square",
            "Rectangle",
            "Ellipse",
            "Ring",
            "Sphere",
            "Hemisphere",
            "Ellipsoid",
            "Cylinder",
            "Capsule",
            "Cone",
            "Parallelepiped",
            "Cube",
        ]
    }

    /// Build the sampler for this shape.
    pub fn sampler(&self) -> ShapeSampler {
        match *self {
            EmitterShape::Point => ShapeSampler::Point,
            EmitterShape::Line { direction, length } => {
                ShapeSampler::Line(LineSampler::new(direction, length))
            }
            EmitterShape::Circle { radius, normal, edge } => {
                ShapeSampler::Circle(CircleSampler::new(radius, normal, edge))
            }
            EmitterShape::Square { dimensions, edge }
            | EmitterShape::Rectangle { dimensions, edge } => {
                ShapeSampler::Rectangle(RectangleSampler::new(dimensions[0], dimensions[1], edge))
            }
            EmitterShape::Ellipse { dimensions, edge } => {
                ShapeSampler::Ellipse(EllipseSampler::new(dimensions, edge))
            }
            EmitterShape::Ring {
                inner_radius,
                outer_radius,
                normal,
            } => ShapeSampler::Ring(RingSampler::new(inner_radius, outer_radius, normal)),
            EmitterShape::Sphere { radius, shell } => {
                ShapeSampler::Sphere(SphereSampler::new(radius, shell))
            }
            EmitterShape::Hemisphere { radius, normal, shell } => {
                ShapeSampler::Hemisphere(HemisphereSampler::new(radius, normal, shell))
            }
            EmitterShape::Ellipsoid { dimensions, shell } => {
                ShapeSampler::Ellipsoid(EllipsoidSampler::new(dimensions, shell))
            }
            EmitterShape::Cylinder {
                radius,
                height,
                axis,
                shell,
                closed,
            } => ShapeSampler::Cylinder(CylinderSampler::new(radius, height, axis, shell, closed)),
            EmitterShape::Capsule {
                radius,
                height,
                axis,
                shell,
            } => ShapeSampler::Capsule(CapsuleSampler::new(radius, height, axis, shell)),
            EmitterShape::Cone { radius, height, shell } => {
                ShapeSampler::Cone(ConeSampler::new(radius, height, shell))
            }
            EmitterShape::Parallelepiped { dimensions, shell }
            | EmitterShape::Cube { dimensions, shell } => {
                ShapeSampler::Parallelepiped(ParallelepipedSampler::new(dimensions, shell))
            }
        }
    }

    /// Reject dimensions that cannot describe a region.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::invalid(
                    field,
                    format!("expected a finite, non-negative number, got {}", value),
                ));
            }
            Ok(())
        }

        fn finite(field: &'static str, vectors: &[Vec3]) -> Result<(), ConfigError> {
            if vectors.iter().all(|v| v.is_finite()) {
                Ok(())
            } else {
                Err(ConfigError::invalid(field, "vector components must be finite"))
            }
        }

        match self {
            EmitterShape::Point => Ok(()),
            EmitterShape::Line { direction, length } => {
                finite("emitter.shape.direction", &[*direction])?;
                if let Some(length) = length {
                    non_negative("emitter.shape.length", *length)?;
                }
                Ok(())
            }
            EmitterShape::Circle { radius, normal, .. } => {
                finite("emitter.shape.normal", &[*normal])?;
                non_negative("emitter.shape.radius", *radius)
            }
            EmitterShape::Square { dimensions, .. }
            | EmitterShape::Rectangle { dimensions, .. }
            | EmitterShape::Ellipse { dimensions, .. } => {
                finite("emitter.shape.dimensions", dimensions)
            }
            EmitterShape::Ring {
                inner_radius,
                outer_radius,
                normal,
            } => {
                finite("emitter.shape.normal", &[*normal])?;
                non_negative("emitter.shape.inner_radius", *inner_radius)?;
                non_negative("emitter.shape.outer_radius", *outer_radius)?;
                if inner_radius > outer_radius {
                    return Err(ConfigError::invalid(
                        "emitter.shape.inner_radius",
                        format!(
                            "inner radius {} is larger than outer radius {}",
                            inner_radius, outer_radius
                        ),
                    ));
                }
                Ok(())
            }
            EmitterShape::Sphere { radius, .. } => non_negative("emitter.shape.radius", *radius),
            EmitterShape::Hemisphere { radius, normal, .. } => {
                finite("emitter.shape.normal", &[*normal])?;
                non_negative("emitter.shape.radius", *radius)
            }
            EmitterShape::Ellipsoid { dimensions, .. }
            | EmitterShape::Parallelepiped { dimensions, .. }
            | EmitterShape::Cube { dimensions, .. } => {
                finite("emitter.shape.dimensions", dimensions)
            }
            EmitterShape::Cylinder {
                radius, height, axis, ..
            }
            | EmitterShape::Capsule {
                radius, height, axis, ..
            } => {
                finite("emitter.shape.axis", &[*axis])?;
                non_negative("emitter.shape.radius", *radius)?;
                non_negative("emitter.shape.height", *height)
            }
            EmitterShape::Cone { radius, height, .. } => {
                finite("emitter.shape.height", &[*height])?;
                non_negative("emitter.shape.radius", *radius)
            }
        }
    }
}

/// Draws one point of a shape relative to a caller-supplied origin.
pub trait Sample {
    fn sample<R: Rng + ?Sized>(&self, origin: Vec3, rng: &mut R) -> Vec3;
}

/// A ready-to-use sampler for any [`EmitterShape`].
#[derive(Clone, Debug)]
pub enum ShapeSampler {
    Point,
    Line(LineSampler),
    Circle(CircleSampler),
    Rectangle(RectangleSampler),
    Ellipse(EllipseSampler),
    Ring(RingSampler),
    Sphere(SphereSampler),
    Hemisphere(HemisphereSampler),
    Ellipsoid(EllipsoidSampler),
    Cylinder(CylinderSampler),
    Capsule(CapsuleSampler),
    Cone(ConeSampler),
    Parallelepiped(ParallelepipedSampler),
}

impl Sample for ShapeSampler {
    fn sample<R: Rng + ?Sized>(&self, origin: Vec3, rng: &mut R) -> Vec3 {
        match self {
            ShapeSampler::Point => origin,
            ShapeSampler::Line(s) => s.sample(origin, rng),
            ShapeSampler::Circle(s) => s.sample(origin, rng),
            ShapeSampler::Rectangle(s) => s.sample(origin, rng),
            ShapeSampler::Ellipse(s) => s.sample(origin, rng),
            ShapeSampler::Ring(s) => s.sample(origin, rng),
            ShapeSampler::Sphere(s) => s.sample(origin, rng),
            ShapeSampler::Hemisphere(s) => s.sample(origin, rng),
            ShapeSampler::Ellipsoid(s) => s.sample(origin, rng),
            ShapeSampler::Cylinder(s) => s.sample(origin, rng),
            ShapeSampler::Capsule(s) => s.sample(origin, rng),
            ShapeSampler::Cone(s) => s.sample(origin, rng),
            ShapeSampler::Parallelepiped(s) => s.sample(origin, rng),
        }
    }
}

// ========== Shared random primitives ==========

/// Normalize `v`, substituting `+Y` for a zero or non-finite vector.
#[inline]
pub(crate) fn unit_or_up(v: Vec3) -> Vec3 {
    v.try_normalize().unwrap_or(Vec3::Y)
}

/// Uniform sample in `[-0.5, 0.5)`.
#[inline]
pub(crate) fn centered<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.gen::<f32>() - 0.5
}

/// Random unit vector, uniformly distributed on the unit sphere.
///
/// Uses the cylinder projection (Archimedes): uniform `z` in `[-1, 1]` and
/// uniform azimuth give a uniform surface density.
pub(crate) fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let z = rng.gen::<f32>() * 2.0 - 1.0;
    let theta = rng.gen::<f32>() * TAU;
    let r = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(r * theta.cos(), r * theta.sin(), z)
}

/// Random unit vector in the plane orthogonal to `normal` (which must be
/// unit length), uniform in angle.
///
/// Crossing a sphere-uniform vector with the normal yields a direction whose
/// angle around the normal is uniform.
pub(crate) fn random_planar_direction<R: Rng + ?Sized>(normal: Vec3, rng: &mut R) -> Vec3 {
    random_unit_vector(rng)
        .cross(normal)
        .try_normalize()
        .unwrap_or_else(|| normal.any_orthonormal_vector())
}

/// Radial fraction for an area-uniform disk: `sqrt(u)`.
#[inline]
pub(crate) fn disk_fraction<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.gen::<f32>().sqrt()
}

/// Radial fraction for a volume-uniform ball: `cbrt(u)`.
#[inline]
pub(crate) fn ball_fraction<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.gen::<f32>().cbrt()
}
