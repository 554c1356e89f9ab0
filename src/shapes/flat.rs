//! One- and two-dimensional emitter shapes.

use glam::Vec3;
use rand::Rng;
use std::f32::consts::TAU;

use super::{centered, disk_fraction, random_planar_direction, unit_or_up, Sample};

/// Uniform point on a segment from the origin along `direction`.
#[derive(Clone, Copy, Debug)]
pub struct LineSampler {
    unit: Vec3,
    length: f32,
}

impl LineSampler {
    /// `length` defaults to the magnitude of `direction`.
    pub fn new(direction: Vec3, length: Option<f32>) -> Self {
        Self {
            unit: direction.normalize_or_zero(),
            length: length.unwrap_or_else(|| direction.length()),
        }
    }
}

impl Sample for LineSampler {
    fn sample<R: Rng + ?Sized>(&self, origin: Vec3, rng: &mut R) -> Vec3 {
        origin + self.unit * (rng.gen::<f32>() * self.length)
    }
}

/// Disk or circle in the plane orthogonal to `normal`.
#[derive(Clone, Copy, Debug)]
pub struct CircleSampler {
    radius: f32,
    normal: Vec3,
    edge: bool,
}

impl CircleSampler {
    pub fn new(radius: f32, normal: Vec3, edge: bool) -> Self {
        Self {
            radius,
            normal: unit_or_up(normal),
            edge,
        }
    }

    /// Point on the circle of exactly `radius` around `origin`.
    pub(crate) fn at_radius<R: Rng + ?Sized>(&self, radius: f32, origin: Vec3, rng: &mut R) -> Vec3 {
        origin + random_planar_direction(self.normal, rng) * radius
    }
}

impl Sample for CircleSampler {
    fn sample<R: Rng + ?Sized>(&self, origin: Vec3, rng: &mut R) -> Vec3 {
        let radius = if self.edge {
            self.radius
        } else {
            self.radius * disk_fraction(rng)
        };
        self.at_radius(radius, origin, rng)
    }
}

/// Annulus in the plane orthogonal to `normal`.
#[derive(Clone, Copy, Debug)]
pub struct RingSampler {
    inner: f32,
    outer: f32,
    plane: CircleSampler,
}

impl RingSampler {
    pub fn new(inner: f32, outer: f32, normal: Vec3) -> Self {
        Self {
            inner,
            outer,
            plane: CircleSampler::new(outer, normal, false),
        }
    }
}

impl Sample for RingSampler {
    fn sample<R: Rng + ?Sized>(&self, origin: Vec3, rng: &mut R) -> Vec3 {
        let radius = self.inner + disk_fraction(rng) * (self.outer - self.inner);
        self.plane.at_radius(radius, origin, rng)
    }
}

/// Parallelogram spanned by `width` and `height`, centered on the origin.
///
/// In edge mode one of the four sides is picked uniformly, then a uniform
/// point along it.
#[derive(Clone, Copy, Debug)]
pub struct RectangleSampler {
    width: Vec3,
    height: Vec3,
    edge: bool,
}

impl RectangleSampler {
    pub fn new(width: Vec3, height: Vec3, edge: bool) -> Self {
        Self { width, height, edge }
    }
}

impl Sample for RectangleSampler {
    fn sample<R: Rng + ?Sized>(&self, origin: Vec3, rng: &mut R) -> Vec3 {
        let (u, v) = if self.edge {
            let along = centered(rng);
            match rng.gen_range(0..4) {
                0 => (-0.5, along),
                1 => (0.5, along),
                2 => (along, -0.5),
                _ => (along, 0.5),
            }
        } else {
            (centered(rng), centered(rng))
        };
        origin + self.width * u + self.height * v
    }
}

/// Ellipse with semi-axes `dimensions[0]` and `dimensions[1]`.
#[derive(Clone, Copy, Debug)]
pub struct EllipseSampler {
    axes: [Vec3; 2],
    edge: bool,
}

impl EllipseSampler {
    pub fn new(axes: [Vec3; 2], edge: bool) -> Self {
        Self { axes, edge }
    }
}

impl Sample for EllipseSampler {
    fn sample<R: Rng + ?Sized>(&self, origin: Vec3, rng: &mut R) -> Vec3 {
        let theta = rng.gen::<f32>() * TAU;
        let distance = if self.edge { 1.0 } else { disk_fraction(rng) };
        let point = self.axes[0] * theta.cos() + self.axes[1] * theta.sin();
        origin + point * distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    const N: usize = 20_000;

    #[test]
    fn test_line_default_length_is_direction_length() {
        let mut rng = SmallRng::seed_from_u64(10);
        let sampler = LineSampler::new(Vec3::new(0.0, 0.0, 4.0), None);
        let origin = Vec3::new(1.0, 1.0, 1.0);
        let mut max_t: f32 = 0.0;
        for _ in 0..N {
            let p = sampler.sample(origin, &mut rng) - origin;
            assert!(p.x.abs() < 1e-6 && p.y.abs() < 1e-6);
            assert!(p.z >= 0.0 && p.z <= 4.0);
            max_t = max_t.max(p.z);
        }
        assert!(max_t > 3.9);
    }

    #[test]
    fn test_line_explicit_length_overrides() {
        let mut rng = SmallRng::seed_from_u64(11);
        let sampler = LineSampler::new(Vec3::X * 10.0, Some(1.0));
        for _ in 0..1000 {
            let p = sampler.sample(Vec3::ZERO, &mut rng);
            assert!(p.x >= 0.0 && p.x <= 1.0);
        }
    }

    #[test]
    fn test_circle_edge_stays_on_rim_in_plane() {
        let mut rng = SmallRng::seed_from_u64(12);
        let normal = Vec3::new(0.0, 0.0, 1.0);
        let sampler = CircleSampler::new(3.0, normal, true);
        for _ in 0..N {
            let p = sampler.sample(Vec3::ZERO, &mut rng);
            assert!((p.length() - 3.0).abs() < 1e-4);
            assert!(p.dot(normal).abs() < 1e-4);
        }
    }

    #[test]
    fn test_filled_circle_is_area_uniform() {
        let mut rng = SmallRng::seed_from_u64(13);
        let sampler = CircleSampler::new(1.0, Vec3::Y, false);
        let inside_half = (0..N)
            .filter(|_| sampler.sample(Vec3::ZERO, &mut rng).length() < 0.5)
            .count();
        // Area-uniform: P(r < 0.5) = 0.25, radius-uniform would give 0.5
        let fraction = inside_half as f32 / N as f32;
        assert!((fraction - 0.25).abs() < 0.02, "fraction = {}", fraction);
    }

    #[test]
    fn test_circle_zero_normal_falls_back_to_up() {
        let mut rng = SmallRng::seed_from_u64(14);
        let sampler = CircleSampler::new(1.0, Vec3::ZERO, true);
        for _ in 0..100 {
            let p = sampler.sample(Vec3::ZERO, &mut rng);
            assert!(p.y.abs() < 1e-4);
        }
    }

    #[test]
    fn test_ring_stays_between_radii() {
        let mut rng = SmallRng::seed_from_u64(15);
        let sampler = RingSampler::new(4.0, 6.0, Vec3::Y);
        for _ in 0..N {
            let r = sampler.sample(Vec3::ZERO, &mut rng).length();
            assert!(r >= 4.0 - 1e-4 && r <= 6.0 + 1e-4);
        }
    }

    #[test]
    fn test_rectangle_edge_points_lie_on_border() {
        let mut rng = SmallRng::seed_from_u64(16);
        let sampler = RectangleSampler::new(Vec3::X * 2.0, Vec3::Z * 4.0, true);
        let mut sides = [0usize; 4];
        for _ in 0..N {
            let p = sampler.sample(Vec3::ZERO, &mut rng);
            let on_x = (p.x.abs() - 1.0).abs() < 1e-5;
            let on_z = (p.z.abs() - 2.0).abs() < 1e-5;
            assert!(on_x || on_z);
            assert!(p.x.abs() <= 1.0 + 1e-5 && p.z.abs() <= 2.0 + 1e-5);
            let side = match (on_x, p.x > 0.0, p.z > 0.0) {
                (true, false, _) => 0,
                (true, true, _) => 1,
                (false, _, false) => 2,
                (false, _, true) => 3,
            };
            sides[side] += 1;
        }
        for count in sides {
            assert!((count as f32 / N as f32 - 0.25).abs() < 0.02);
        }
    }

    #[test]
    fn test_rectangle_filled_stays_inside() {
        let mut rng = SmallRng::seed_from_u64(17);
        let origin = Vec3::new(0.0, 5.0, 0.0);
        let sampler = RectangleSampler::new(Vec3::X, Vec3::Z, false);
        for _ in 0..N {
            let p = sampler.sample(origin, &mut rng) - origin;
            assert!(p.x.abs() <= 0.5 && p.z.abs() <= 0.5 && p.y == 0.0);
        }
    }

    #[test]
    fn test_ellipse_edge_satisfies_equation() {
        let mut rng = SmallRng::seed_from_u64(18);
        let sampler = EllipseSampler::new([Vec3::X * 3.0, Vec3::Y * 1.5], true);
        for _ in 0..N {
            let p = sampler.sample(Vec3::ZERO, &mut rng);
            let e = (p.x / 3.0).powi(2) + (p.y / 1.5).powi(2);
            assert!((e - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_ellipse_filled_is_area_uniform() {
        let mut rng = SmallRng::seed_from_u64(19);
        let sampler = EllipseSampler::new([Vec3::X * 2.0, Vec3::Z], false);
        let inner = (0..N)
            .filter(|_| {
                let p = sampler.sample(Vec3::ZERO, &mut rng);
                (p.x / 2.0).powi(2) + p.z.powi(2) < 0.25
            })
            .count();
        assert!((inner as f32 / N as f32 - 0.25).abs() < 0.02);
    }
}
