//! Clocks for particle lifetimes and frame pacing.
//!
//! Two separate concerns live here:
//!
//! - [`Clock`] is the timestamp source particles are born and aged against.
//!   Life fraction and death are computed from `clock.now() - created_at`,
//!   so they do not depend on how the frame deltas were sliced.
//! - [`Time`] is a frame clock that turns wall time into the `dt` passed to
//!   [`ParticleSystem::update`](crate::ParticleSystem::update), with pause,
//!   time scale and a stall clamp.
//!
//! # Example
//!
//! ```ignore
//! use motes::time::Time;
//!
//! let mut time = Time::new().with_max_delta(0.25);
//!
//! loop {
//!     let dt = time.update();
//!     system.update(dt, &mut scene);
//! }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of "now" for particle creation timestamps and aging.
pub trait Clock {
    /// Time elapsed since an arbitrary, fixed epoch.
    fn now(&self) -> Duration;
}

/// Monotonic wall clock. The default for every particle system.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same underlying time, so a test can keep one handle
/// and give another to the system:
///
/// ```ignore
/// let clock = ManualClock::new();
/// let mut system = ParticleSystem::with_clock(Vec3::ZERO, config, clock.clone());
/// clock.advance(Duration::from_millis(500));
/// ```
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jump to an absolute time.
    pub fn set(&self, now: Duration) {
        self.nanos.store(now.as_nanos() as u64, Ordering::Relaxed);
    }

    /// Move forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        self.nanos
            .fetch_add(delta.as_nanos() as u64, Ordering::Relaxed);
    }

    /// Move forward by a whole number of milliseconds.
    pub fn advance_millis(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::Relaxed))
    }
}

/// Frame clock producing the per-frame delta in seconds.
///
/// Pausing stops the clock: `update` returns 0.0 and elapsed time freezes,
/// which is all "pause" means to a particle system (it simply receives no
/// time). A long stall (debugger, window drag) is clamped to `max_delta`
/// so the emitter's catch-up loop does not flood the pool afterwards.
#[derive(Debug)]
pub struct Time {
    last_frame: Instant,
    /// Scaled seconds accumulated while running.
    elapsed_secs: f64,
    delta_secs: f32,
    frame_count: u64,
    paused: bool,
    fixed_delta: Option<f32>,
    max_delta: Option<f32>,
    time_scale: f32,
}

impl Time {
    /// Create a running frame clock starting now.
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            paused: false,
            fixed_delta: None,
            max_delta: None,
            time_scale: 1.0,
        }
    }

    /// Clamp every delta to at most `seconds` (before time scaling).
    pub fn with_max_delta(mut self, seconds: f32) -> Self {
        self.max_delta = Some(seconds.max(0.0));
        self
    }

    /// Advance one frame and return the delta in seconds.
    pub fn update(&mut self) -> f32 {
        let now = Instant::now();
        let raw = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        if self.paused {
            self.delta_secs = 0.0;
            return 0.0;
        }

        let mut delta = self.fixed_delta.unwrap_or(raw);
        if let Some(max) = self.max_delta {
            if delta > max {
                log::debug!("frame delta {:.3}s clamped to {:.3}s", delta, max);
                delta = max;
            }
        }

        self.delta_secs = delta * self.time_scale;
        self.elapsed_secs += self.delta_secs as f64;
        self.frame_count += 1;
        self.delta_secs
    }

    /// Seconds of (scaled, unpaused) time since creation.
    #[inline]
    pub fn elapsed(&self) -> f64 {
        self.elapsed_secs
    }

    /// Delta returned by the last `update`.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Number of unpaused frames so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume after a pause. The paused interval is not reported as delta.
    pub fn resume(&mut self) {
        if self.paused {
            self.last_frame = Instant::now();
            self.paused = false;
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Use a constant delta instead of measured frame time. `None` restores
    /// real timing.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta;
    }

    /// Set time scale multiplier. Negative values clamp to 0.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}
