//! Three-dimensional emitter shapes.

use glam::Vec3;
use rand::Rng;

use super::{
    ball_fraction, centered, disk_fraction, random_planar_direction, random_unit_vector,
    unit_or_up, Sample,
};

/// Ball or sphere surface of `radius` around the origin.
#[derive(Clone, Copy, Debug)]
pub struct SphereSampler {
    radius: f32,
    shell: bool,
}

impl SphereSampler {
    pub fn new(radius: f32, shell: bool) -> Self {
        Self { radius, shell }
    }
}

impl Sample for SphereSampler {
    fn sample<R: Rng + ?Sized>(&self, origin: Vec3, rng: &mut R) -> Vec3 {
        let distance = if self.shell {
            self.radius
        } else {
            self.radius * ball_fraction(rng)
        };
        origin + random_unit_vector(rng) * distance
    }
}

/// Half ball on the side of `normal`.
///
/// The direction is a sphere-uniform vector with the normal added before
/// renormalizing. Every point lands in the right half-space, but density
/// is not uniform over the hemisphere: directions are concentrated around
/// the normal and thin out toward the rim.
#[derive(Clone, Copy, Debug)]
pub struct HemisphereSampler {
    radius: f32,
    normal: Vec3,
    shell: bool,
}

impl HemisphereSampler {
    pub fn new(radius: f32, normal: Vec3, shell: bool) -> Self {
        Self {
            radius,
            normal: unit_or_up(normal),
            shell,
        }
    }
}

impl Sample for HemisphereSampler {
    fn sample<R: Rng + ?Sized>(&self, origin: Vec3, rng: &mut R) -> Vec3 {
        let direction = (random_unit_vector(rng) + self.normal)
            .try_normalize()
            .unwrap_or(self.normal);
        let distance = if self.shell {
            self.radius
        } else {
            self.radius * ball_fraction(rng)
        };
        origin + direction * distance
    }
}

/// Ellipsoid with three semi-axis vectors.
///
/// The unit ball is mapped linearly onto the ellipsoid, which keeps the
/// filled distribution volume-uniform.
#[derive(Clone, Copy, Debug)]
pub struct EllipsoidSampler {
    axes: [Vec3; 3],
    shell: bool,
}

impl EllipsoidSampler {
    pub fn new(axes: [Vec3; 3], shell: bool) -> Self {
        Self { axes, shell }
    }
}

impl Sample for EllipsoidSampler {
    fn sample<R: Rng + ?Sized>(&self, origin: Vec3, rng: &mut R) -> Vec3 {
        let d = random_unit_vector(rng);
        let distance = if self.shell { 1.0 } else { ball_fraction(rng) };
        let point = self.axes[0] * d.x + self.axes[1] * d.y + self.axes[2] * d.z;
        origin + point * distance
    }
}

/// Cylinder centered on the origin along `axis`.
///
/// Shell mode picks the lateral surface with probability `h / (h + r)`
/// (its share of total area) when the cylinder is closed, otherwise always.
/// A cap is then chosen 50/50 and sampled as a filled disk.
#[derive(Clone, Copy, Debug)]
pub struct CylinderSampler {
    radius: f32,
    height: f32,
    axis: Vec3,
    shell: bool,
    closed: bool,
}

impl CylinderSampler {
    pub fn new(radius: f32, height: f32, axis: Vec3, shell: bool, closed: bool) -> Self {
        Self {
            radius,
            height,
            axis: unit_or_up(axis),
            shell,
            closed,
        }
    }

    fn lateral_probability(&self) -> f32 {
        if !self.closed {
            return 1.0;
        }
        let total = self.height + self.radius;
        if total > 0.0 {
            self.height / total
        } else {
            1.0
        }
    }
}

impl Sample for CylinderSampler {
    fn sample<R: Rng + ?Sized>(&self, origin: Vec3, rng: &mut R) -> Vec3 {
        let direction = random_planar_direction(self.axis, rng);

        let (radial, along) = if self.shell {
            if rng.gen::<f32>() < self.lateral_probability() {
                (self.radius, centered(rng) * self.height)
            } else {
                let cap = if rng.gen::<bool>() { 0.5 } else { -0.5 };
                (self.radius * disk_fraction(rng), cap * self.height)
            }
        } else {
            (self.radius * disk_fraction(rng), centered(rng) * self.height)
        };

        origin + direction * radial + self.axis * along
    }
}

/// Capsule: open cylinder body plus two hemispherical caps.
///
/// A uniform draw over the full extent `height + 2 * radius` along the axis
/// decides which part the point falls on.
#[derive(Clone, Copy, Debug)]
pub struct CapsuleSampler {
    radius: f32,
    height: f32,
    axis: Vec3,
    body: CylinderSampler,
    top: HemisphereSampler,
    bottom: HemisphereSampler,
}

impl CapsuleSampler {
    pub fn new(radius: f32, height: f32, axis: Vec3, shell: bool) -> Self {
        let axis = unit_or_up(axis);
        Self {
            radius,
            height,
            axis,
            body: CylinderSampler::new(radius, height, axis, shell, false),
            top: HemisphereSampler::new(radius, axis, shell),
            bottom: HemisphereSampler::new(radius, -axis, shell),
        }
    }
}

impl Sample for CapsuleSampler {
    fn sample<R: Rng + ?Sized>(&self, origin: Vec3, rng: &mut R) -> Vec3 {
        let extent = self.height + 2.0 * self.radius;
        let t = rng.gen::<f32>() * extent;
        let cap_offset = self.axis * (self.height / 2.0);

        if t < self.radius {
            self.bottom.sample(origin - cap_offset, rng)
        } else if t <= self.height + self.radius {
            self.body.sample(origin, rng)
        } else {
            self.top.sample(origin + cap_offset, rng)
        }
    }
}

/// Cone whose base disk sits on the origin and whose apex is at `height`.
///
/// A disk point is drawn in the base plane (area-uniform), then lifted along
/// the axis. The surface height at distance `d` from the axis is
/// `|height| * (1 - d / radius)`; shell mode uses that height exactly,
/// filled mode a uniform fraction of it.
#[derive(Clone, Copy, Debug)]
pub struct ConeSampler {
    radius: f32,
    length: f32,
    axis: Vec3,
    shell: bool,
}

impl ConeSampler {
    pub fn new(radius: f32, height: Vec3, shell: bool) -> Self {
        Self {
            radius,
            length: height.length(),
            axis: unit_or_up(height),
            shell,
        }
    }
}

impl Sample for ConeSampler {
    fn sample<R: Rng + ?Sized>(&self, origin: Vec3, rng: &mut R) -> Vec3 {
        let distance = self.radius * disk_fraction(rng);
        let disk_point = random_planar_direction(self.axis, rng) * distance;

        let ratio = if self.radius > 0.0 {
            1.0 - distance / self.radius
        } else {
            1.0
        };
        let surface_height = self.length * ratio;
        let lift = if self.shell {
            surface_height
        } else {
            rng.gen::<f32>() * surface_height
        };

        origin + disk_point + self.axis * lift
    }
}

/// Parallelepiped spanned by three edge vectors, centered on the origin.
///
/// Shell mode picks one of the six faces uniformly.
#[derive(Clone, Copy, Debug)]
pub struct ParallelepipedSampler {
    edges: [Vec3; 3],
    shell: bool,
}

impl ParallelepipedSampler {
    pub fn new(edges: [Vec3; 3], shell: bool) -> Self {
        Self { edges, shell }
    }
}

impl Sample for ParallelepipedSampler {
    fn sample<R: Rng + ?Sized>(&self, origin: Vec3, rng: &mut R) -> Vec3 {
        let mut local = [centered(rng), centered(rng), centered(rng)];
        if self.shell {
            // faces: 0 = -x, 1 = +x, 2 = -y, 3 = +y, 4 = -z, 5 = +z
            let face: usize = rng.gen_range(0..6);
            local[face / 2] = if face % 2 == 0 { -0.5 } else { 0.5 };
        }
        origin + self.edges[0] * local[0] + self.edges[1] * local[1] + self.edges[2] * local[2]
    }
}
