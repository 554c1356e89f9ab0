//! # Headless Fountain
//!
//! Runs a particle fountain without a renderer and prints pool statistics
//! once per simulated second. A scene that only counts notifications stands
//! in for the renderer.
//!
//! Run with: `RUST_LOG=debug cargo run --example headless`
//!
//! Pass a JSON config file as the first argument to use it instead of the
//! built-in fountain.

use motes::prelude::*;

#[derive(Default)]
struct CountingScene {
    added: usize,
    removed: usize,
}

impl Scene for CountingScene {
    fn add(&mut self, batch: &[ParticleId]) {
        self.added += batch.len();
    }

    fn remove(&mut self, _id: ParticleId) {
        self.removed += 1;
    }
}

fn fountain() -> ParticleSystemConfig {
    let mut config = ParticleSystemConfig::default();
    config.emitter = EmitterConfig {
        policy: EmissionPolicy::Continuous {
            emission_frequency: 400.0,
        },
        shape: EmitterShape::Circle {
            radius: 0.25,
            normal: Vec3::Y,
            edge: false,
        },
    };
    config.particle = ParticleParameters {
        kind: GeometryKind::Sphere,
        start_size: 0.08,
        end_size: Some(0.01),
        velocity: Vec3::new(0.0, 4.0, 0.0),
        acceleration: Vec3::new(0.0, -9810.0, 0.0),
        friction: 0.2,
        start_color: Vec3::new(0.3, 0.6, 1.0),
        end_color: Some(Vec3::new(1.0, 1.0, 1.0)),
        end_opacity: Some(0.0),
        time_to_live: 1200.0,
        ..Default::default()
    };
    config.randomness = ParticleRandomness {
        velocity: Vec3::new(1.5, 1.0, 1.5),
        time_to_live: 400.0,
        ..Default::default()
    };
    config
}

fn load_config() -> ParticleSystemConfig {
    let Some(path) = std::env::args().nth(1) else {
        return fountain();
    };
    match std::fs::read_to_string(&path) {
        Ok(text) => match ParticleSystemConfig::from_json(&text) {
            Ok(config) => config,
            Err(e) => {
                log::error!("{}: {}", path, e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            log::error!("could not read {}: {}", path, e);
            std::process::exit(1);
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config();
    log::info!(
        "{} emitter, {} shape",
        config.emitter.policy.name(),
        config.emitter.shape.name()
    );

    let mut system = ParticleSystem::new(Vec3::ZERO, config);
    let mut time = Time::new().with_max_delta(0.1);
    time.set_fixed_delta(Some(1.0 / 60.0));

    let mut scene = CountingScene::default();
    let mut instances: Vec<ParticleInstance> = Vec::new();

    for frame in 1..=600u32 {
        let dt = time.update();
        system.update(dt, &mut scene);
        system.manager().write_instances(&mut instances);

        // keep the wall clock roughly in step with simulated time
        std::thread::sleep(std::time::Duration::from_secs_f32(dt));

        if frame % 60 == 0 {
            let manager = system.manager();
            println!(
                "t={:>5.2}s active={:>4} cached={:>4} pool={:>4} added={:>5} removed={:>5} upload={}B",
                time.elapsed(),
                manager.len(),
                manager.cached_len(),
                manager.capacity(),
                scene.added,
                scene.removed,
                std::mem::size_of_val(instances.as_slice()),
            );
        }

        if frame == 300 {
            log::info!("clearing");
            system.clear();
        }
    }
}
