//! Composition root: one emitter, one particle pool, one live config.

use glam::Vec3;

use crate::config::ParticleSystemConfig;
use crate::emitter::Emitter;
use crate::manager::ParticleManager;
use crate::scene::Scene;
use crate::time::{Clock, SystemClock};

/// A complete particle effect.
///
/// # Example
///
/// ```ignore
/// let mut system = ParticleSystem::new(Vec3::ZERO, ParticleSystemConfig::default());
/// let mut time = Time::new();
/// loop {
///     let dt = time.update();
///     system.update(dt, &mut scene);
///     system.manager().write_instances(&mut instances);
/// }
/// ```
pub struct ParticleSystem<C: Clock = SystemClock> {
    config: ParticleSystemConfig,
    emitter: Emitter,
    manager: ParticleManager<C>,
}

impl ParticleSystem<SystemClock> {
    pub fn new(origin: Vec3, config: ParticleSystemConfig) -> Self {
        Self::with_clock(origin, config, SystemClock::new())
    }
}

impl<C: Clock> ParticleSystem<C> {
    /// Build a system whose particle lifetimes are measured by `clock`.
    pub fn with_clock(origin: Vec3, config: ParticleSystemConfig, clock: C) -> Self {
        if let Err(e) = config.validate() {
            log::warn!("particle system built from an invalid config: {}", e);
        }
        Self {
            config,
            emitter: Emitter::new(origin),
            manager: ParticleManager::with_clock(clock),
        }
    }

    /// Seed both the emitter and the pool RNGs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.emitter = self.emitter.with_seed(seed);
        self.manager = self.manager.with_seed(seed.wrapping_add(1));
        self
    }

    /// Move the emitter before the first update.
    pub fn with_origin(mut self, origin: Vec3) -> Self {
        self.emitter.set_origin(origin);
        self
    }

    /// Spawn, then age, everything by `dt` seconds.
    ///
    /// Particles spawned this frame receive this frame's aging step too.
    pub fn update(&mut self, dt: f32, scene: &mut impl Scene) {
        self.emitter
            .update(dt, &self.config, &mut self.manager, &mut *scene);
        self.manager.update(dt, scene);
    }

    /// Kill every active particle. They disappear on the next update.
    pub fn clear(&mut self) {
        self.manager.clear();
    }

    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.emitter.origin()
    }

    pub fn set_origin(&mut self, origin: Vec3) {
        self.emitter.set_origin(origin);
    }

    pub fn config(&self) -> &ParticleSystemConfig {
        &self.config
    }

    /// Live configuration. Edits apply from the next update.
    pub fn config_mut(&mut self) -> &mut ParticleSystemConfig {
        &mut self.config
    }

    pub fn manager(&self) -> &ParticleManager<C> {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut ParticleManager<C> {
        &mut self.manager
    }

    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    pub fn emitter_mut(&mut self) -> &mut Emitter {
        &mut self.emitter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::EmissionPolicy;
    use crate::scene::Headless;
    use crate::time::ManualClock;

    fn system(policy: EmissionPolicy, ttl: f32) -> (ParticleSystem<ManualClock>, ManualClock) {
        let mut config = ParticleSystemConfig::default();
        config.emitter.policy = policy;
        config.particle.time_to_live = ttl;
        let clock = ManualClock::new();
        let system = ParticleSystem::with_clock(Vec3::ZERO, config, clock.clone()).with_seed(9);
        (system, clock)
    }

    #[test]
    fn test_spawned_particles_age_same_frame() {
        let mut config = ParticleSystemConfig::default();
        config.emitter.policy = EmissionPolicy::Constant { count: 1 };
        config.particle.velocity = Vec3::X;
        config.particle.time_to_live = 0.0;
        let mut system =
            ParticleSystem::with_clock(Vec3::ZERO, config, ManualClock::new()).with_seed(1);
        system.update(0.5, &mut Headless);
        let (_, p) = system.manager().active().next().unwrap();
        assert!((p.position().x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_clear_then_update_reclaims() {
        let (mut system, clock) = system(EmissionPolicy::Constant { count: 10 }, 1000.0);
        system.update(0.016, &mut Headless);
        assert_eq!(system.manager().len(), 10);

        system.clear();
        assert_eq!(system.manager().len(), 10);

        // the dead still count toward the target, so nothing is topped up
        clock.advance_millis(16);
        system.update(0.016, &mut Headless);
        assert_eq!(system.manager().len(), 0);
        assert_eq!(system.manager().cached_len(), 10);
    }

    #[test]
    fn test_config_mutation_applies_next_update() {
        let (mut system, _) = system(
            EmissionPolicy::Continuous {
                emission_frequency: 10.0,
            },
            0.0,
        );
        system.update(1.0, &mut Headless);
        assert_eq!(system.manager().len(), 10);

        system.config_mut().emitter.policy = EmissionPolicy::Continuous {
            emission_frequency: 20.0,
        };
        system.update(1.0, &mut Headless);
        assert_eq!(system.manager().len(), 30);
    }

    #[test]
    fn test_origin_accessors() {
        let (system, _) = system(EmissionPolicy::default(), 100.0);
        let mut system = system.with_origin(Vec3::ONE);
        assert_eq!(system.origin(), Vec3::ONE);
        system.set_origin(Vec3::Z);
        assert_eq!(system.emitter().origin(), Vec3::Z);
    }
}
