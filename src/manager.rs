//! Object pool of particles.
//!
//! Particles live in an arena of slots that is never shrunk. Each slot is
//! either *active* (simulated and visible) or *cached* (dead, hidden, ready
//! for reuse), never both. Two index lists track the partition:
//!
//! - `active` is unordered; reclaiming swaps the last entry into the hole,
//!   so removal is O(1).
//! - `cache` is a LIFO free list, so the slot disabled last is the one
//!   handed out next.
//!
//! Once the pool has grown to the peak population, spawning and reclaiming
//! allocate nothing.

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::fmt;
use std::time::Duration;

use crate::jitter::{clock_seeded_rng, randomize, ParticleRandomness};
use crate::particle::{Particle, ParticleInstance, ParticleParameters};
use crate::scene::Scene;
use crate::time::{Clock, SystemClock};

/// Stable handle to a pool slot.
///
/// A handle keeps pointing at the same slot across reuse, so it identifies
/// the renderable, not one particular lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId(u32);

impl ParticleId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct Slot {
    particle: Particle,
    /// Position in `active`, `None` while cached.
    active_index: Option<usize>,
}

/// Owns every particle ever created and advances the active ones.
pub struct ParticleManager<C: Clock = SystemClock> {
    slots: Vec<Slot>,
    active: Vec<ParticleId>,
    cache: Vec<ParticleId>,
    clock: C,
    rng: SmallRng,
}

impl ParticleManager<SystemClock> {
    /// Create an empty pool timed by the wall clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock::new())
    }
}

impl Default for ParticleManager<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> ParticleManager<C> {
    /// Create an empty pool timed by `clock`.
    pub fn with_clock(clock: C) -> Self {
        Self {
            slots: Vec::new(),
            active: Vec::new(),
            cache: Vec::new(),
            clock,
            rng: clock_seeded_rng(0x9e37_79b9),
        }
    }

    /// Use a fixed RNG seed for jitter and turbulence.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    /// Advance every active particle by `dt` seconds.
    ///
    /// Particles that die during this step are moved to the cache in the
    /// same pass and reported to `scene`.
    pub fn update(&mut self, dt: f32, scene: &mut impl Scene) {
        let now = self.clock.now();
        let mut i = 0;
        while i < self.active.len() {
            let id = self.active[i];
            let particle = &mut self.slots[id.index()].particle;
            particle.update(dt, now, &mut self.rng);
            if particle.is_dead {
                // the swapped-in particle now sits at `i` and is updated next
                self.reclaim(i, scene);
            } else {
                i += 1;
            }
        }
    }

    /// Spawn one particle from `template` with `jitter` applied.
    ///
    /// Reuses the most recently cached slot when there is one, otherwise
    /// grows the pool. Never fails.
    pub fn request(
        &mut self,
        template: &ParticleParameters,
        jitter: &ParticleRandomness,
    ) -> ParticleId {
        let parameters = randomize(template, jitter, &mut self.rng);
        let now = self.clock.now();

        let id = match self.cache.pop() {
            Some(id) => {
                let particle = &mut self.slots[id.index()].particle;
                if particle.change_geometry(parameters.kind) {
                    log::trace!("slot {} switched to {:?}", id, parameters.kind);
                }
                particle.reset(Some(parameters), now);
                id
            }
            None => {
                let id = ParticleId(self.slots.len() as u32);
                self.slots.push(Slot {
                    particle: Particle::new(parameters, now),
                    active_index: None,
                });
                if self.slots.len().is_power_of_two() {
                    log::debug!("particle pool grew to {} slots", self.slots.len());
                }
                id
            }
        };

        let slot = &mut self.slots[id.index()];
        slot.particle.set_visible(true);
        slot.active_index = Some(self.active.len());
        self.active.push(id);
        id
    }

    /// Hide a particle and return it to the cache.
    ///
    /// Returns `false` if `id` was not active.
    pub fn disable(&mut self, id: ParticleId, scene: &mut impl Scene) -> bool {
        match self.slots.get(id.index()).and_then(|slot| slot.active_index) {
            Some(i) => {
                self.reclaim(i, scene);
                true
            }
            None => false,
        }
    }

    /// Mark every active particle dead.
    ///
    /// They are reclaimed by the next [`update`](Self::update), not here.
    pub fn clear(&mut self) {
        for id in &self.active {
            self.slots[id.index()].particle.is_dead = true;
        }
    }

    fn reclaim(&mut self, i: usize, scene: &mut impl Scene) {
        let id = self.active.swap_remove(i);
        if let Some(&moved) = self.active.get(i) {
            self.slots[moved.index()].active_index = Some(i);
        }

        let slot = &mut self.slots[id.index()];
        slot.active_index = None;
        slot.particle.set_visible(false);
        self.cache.push(id);
        scene.remove(id);
    }

    /// Number of active particles.
    #[inline]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Number of dead particles waiting for reuse.
    #[inline]
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Total slots ever created (active + cached).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn get(&self, id: ParticleId) -> Option<&Particle> {
        self.slots.get(id.index()).map(|slot| &slot.particle)
    }

    pub fn get_mut(&mut self, id: ParticleId) -> Option<&mut Particle> {
        self.slots.get_mut(id.index()).map(|slot| &mut slot.particle)
    }

    pub fn is_active(&self, id: ParticleId) -> bool {
        self.slots
            .get(id.index())
            .is_some_and(|slot| slot.active_index.is_some())
    }

    /// Active particles in unspecified order.
    pub fn active(&self) -> impl Iterator<Item = (ParticleId, &Particle)> + '_ {
        self.active
            .iter()
            .map(move |&id| (id, &self.slots[id.index()].particle))
    }

    /// Active handles in unspecified order.
    pub fn active_ids(&self) -> &[ParticleId] {
        &self.active
    }

    /// Replace `out` with instance data for every active particle.
    ///
    /// Reuses `out`'s allocation.
    pub fn write_instances(&self, out: &mut Vec<ParticleInstance>) {
        out.clear();
        out.extend(self.active().map(|(_, particle)| particle.instance()));
    }

    /// Mean position of the active particles, or `None` when empty.
    pub fn centroid(&self) -> Option<Vec3> {
        if self.active.is_empty() {
            return None;
        }
        let sum: Vec3 = self.active().map(|(_, p)| p.position()).sum();
        Some(sum / self.active.len() as f32)
    }

    /// Current reading of the manager's clock.
    #[inline]
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

impl<C: Clock> fmt::Debug for ParticleManager<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParticleManager")
            .field("active", &self.active.len())
            .field("cached", &self.cache.len())
            .field("capacity", &self.slots.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::GeometryKind;
    use crate::scene::Headless;
    use crate::time::ManualClock;

    #[derive(Default)]
    struct Recorder {
        removed: Vec<ParticleId>,
    }

    impl Scene for Recorder {
        fn add(&mut self, _batch: &[ParticleId]) {}

        fn remove(&mut self, id: ParticleId) {
            self.removed.push(id);
        }
    }

    fn manager() -> (ParticleManager<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        (ParticleManager::with_clock(clock.clone()).with_seed(1), clock)
    }

    fn params(ttl: f32) -> ParticleParameters {
        ParticleParameters {
            time_to_live: ttl,
            ..Default::default()
        }
    }

    #[test]
    fn test_request_grows_pool() {
        let (mut pm, _) = manager();
        let jitter = ParticleRandomness::default();
        let a = pm.request(&params(100.0), &jitter);
        let b = pm.request(&params(100.0), &jitter);
        assert_ne!(a, b);
        assert_eq!(pm.len(), 2);
        assert_eq!(pm.capacity(), 2);
        assert_eq!(pm.cached_len(), 0);
        assert!(pm.get(a).unwrap().is_visible());
    }

    #[test]
    fn test_disable_then_request_reuses_slot() {
        let (mut pm, _) = manager();
        let jitter = ParticleRandomness::default();
        let _a = pm.request(&params(100.0), &jitter);
        let b = pm.request(&params(100.0), &jitter);

        assert!(pm.disable(b, &mut Headless));
        assert!(!pm.is_active(b));
        assert!(!pm.get(b).unwrap().is_visible());
        assert!(!pm.disable(b, &mut Headless));

        let c = pm.request(&params(100.0), &jitter);
        assert_eq!(c, b);
        assert_eq!(pm.capacity(), 2);
        assert!(pm.is_active(c));
    }

    #[test]
    fn test_reuse_switches_geometry_only_when_needed() {
        let (mut pm, _) = manager();
        let jitter = ParticleRandomness::default();
        let id = pm.request(&params(100.0), &jitter);
        pm.disable(id, &mut Headless);

        let sphere = ParticleParameters {
            kind: GeometryKind::Sphere,
            ..params(100.0)
        };
        let again = pm.request(&sphere, &jitter);
        assert_eq!(again, id);
        assert_eq!(pm.get(again).unwrap().kind(), GeometryKind::Sphere);
    }

    #[test]
    fn test_update_reclaims_dead_in_same_pass() {
        let (mut pm, clock) = manager();
        let jitter = ParticleRandomness::default();
        let short = pm.request(&params(100.0), &jitter);
        let long = pm.request(&params(1000.0), &jitter);
        let short2 = pm.request(&params(50.0), &jitter);

        clock.advance_millis(200);
        let mut scene = Recorder::default();
        pm.update(0.2, &mut scene);

        assert_eq!(pm.len(), 1);
        assert_eq!(pm.active_ids(), &[long]);
        assert_eq!(pm.cached_len(), 2);
        scene.removed.sort();
        let mut expected = vec![short, short2];
        expected.sort();
        assert_eq!(scene.removed, expected);
    }

    #[test]
    fn test_swap_remove_keeps_indices_consistent() {
        let (mut pm, _) = manager();
        let jitter = ParticleRandomness::default();
        let ids: Vec<_> = (0..5).map(|_| pm.request(&params(100.0), &jitter)).collect();

        pm.disable(ids[1], &mut Headless);
        pm.disable(ids[4], &mut Headless);
        pm.disable(ids[0], &mut Headless);

        for &id in pm.active_ids() {
            assert!(pm.is_active(id));
        }
        assert_eq!(pm.len(), 2);
        assert!(pm.disable(ids[2], &mut Headless));
        assert!(pm.disable(ids[3], &mut Headless));
        assert!(pm.is_empty());
        assert_eq!(pm.cached_len(), 5);
    }

    #[test]
    fn test_clear_defers_to_next_update() {
        let (mut pm, _) = manager();
        let jitter = ParticleRandomness::default();
        for _ in 0..3 {
            pm.request(&params(0.0), &jitter);
        }
        pm.clear();
        assert_eq!(pm.len(), 3);

        pm.update(0.016, &mut Headless);
        assert_eq!(pm.len(), 0);
        assert_eq!(pm.cached_len(), 3);
    }

    #[test]
    fn test_every_slot_in_exactly_one_collection() {
        let (mut pm, clock) = manager();
        let jitter = ParticleRandomness::default();
        for round in 0..20u64 {
            for _ in 0..(round % 7) {
                pm.request(&params(30.0 + round as f32), &jitter);
            }
            clock.advance_millis(17);
            pm.update(0.017, &mut Headless);
            assert_eq!(pm.len() + pm.cached_len(), pm.capacity());
        }
    }

    #[test]
    fn test_write_instances_reuses_buffer() {
        let (mut pm, _) = manager();
        let jitter = ParticleRandomness::default();
        for _ in 0..4 {
            pm.request(&params(100.0), &jitter);
        }
        let mut out = Vec::with_capacity(16);
        pm.write_instances(&mut out);
        assert_eq!(out.len(), 4);
        let ptr = out.as_ptr();
        pm.write_instances(&mut out);
        assert_eq!(out.as_ptr(), ptr);
    }

    #[test]
    fn test_centroid() {
        let (mut pm, _) = manager();
        assert!(pm.centroid().is_none());
        let jitter = ParticleRandomness::default();
        for x in [1.0, 3.0] {
            let p = ParticleParameters {
                position: Some(Vec3::new(x, 0.0, 0.0)),
                ..params(100.0)
            };
            pm.request(&p, &jitter);
        }
        assert_eq!(pm.centroid(), Some(Vec3::new(2.0, 0.0, 0.0)));
    }
}
