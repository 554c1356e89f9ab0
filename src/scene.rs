//! Boundary to the rendering collaborator.
//!
//! The simulation never draws anything. It tells a [`Scene`] which pool
//! slots became visible and which went away; the renderer reads particle
//! state through [`ParticleManager`](crate::ParticleManager) and decides how
//! a [`GeometryKind`](crate::GeometryKind) maps to a mesh.

use crate::manager::ParticleId;

/// Receives visibility changes from a particle system.
pub trait Scene {
    /// Particles spawned by one emitter update, delivered together.
    fn add(&mut self, batch: &[ParticleId]);

    /// A particle was reclaimed into the pool and should stop being drawn.
    fn remove(&mut self, id: ParticleId);
}

/// Scene that ignores everything. Useful for headless simulation.
#[derive(Clone, Copy, Debug, Default)]
pub struct Headless;

impl Scene for Headless {
    #[inline]
    fn add(&mut self, _batch: &[ParticleId]) {}

    #[inline]
    fn remove(&mut self, _id: ParticleId) {}
}

impl<S: Scene + ?Sized> Scene for &mut S {
    fn add(&mut self, batch: &[ParticleId]) {
        (**self).add(batch)
    }

    fn remove(&mut self, id: ParticleId) {
        (**self).remove(id)
    }
}
