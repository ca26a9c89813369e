//! Clocks for debouncing and per-frame timing.
//!
//! Layout transitions are rate limited in wall-clock milliseconds, so the
//! state machine reads time through the [`Clock`] trait. Production code uses
//! [`MonotonicClock`]; tests drive a [`ManualClock`] so that debounce windows
//! are deterministic.
//!
//! [`FrameClock`] tracks elapsed time, delta time, frame count and FPS for the
//! render tick, fed from whichever clock the scene was built with.
//!
//! # Example
//!
//! ```ignore
//! use evergreen::clock::{Clock, FrameClock, ManualClock};
//!
//! let clock = ManualClock::new();
//! let mut frames = FrameClock::new();
//!
//! clock.advance(16);
//! frames.update(clock.now_ms());
//! println!("Elapsed: {:.2}s", frames.elapsed());
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// A monotonic millisecond time source.
pub trait Clock: Send + Sync {
    /// Milliseconds since an arbitrary, fixed origin.
    fn now_ms(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// Wall clock backed by [`Instant`], origin at construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// Clock that only moves when told to.
///
/// Shared through an `Arc` so a test can keep a handle while the scene owns
/// another.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(ms: u64) -> Self {
        Self {
            now: AtomicU64::new(ms),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Per-frame time tracking for the simulation tick.
///
/// Provides elapsed time, delta time, frame counting, and FPS. With a fixed
/// delta set, elapsed time advances by exactly that step per update, which
/// keeps headless runs reproducible regardless of scheduling jitter.
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// Timestamp of the first update.
    start_ms: Option<u64>,
    /// Timestamp of the previous update.
    last_ms: u64,
    /// Total elapsed time in seconds.
    elapsed_secs: f32,
    /// Time since last frame in seconds.
    delta_secs: f32,
    /// Total frames since start.
    frame_count: u64,
    /// Calculated FPS (updated periodically).
    fps: f32,
    /// Frame count at last FPS update.
    fps_frame_count: u64,
    /// Timestamp of last FPS calculation.
    fps_update_ms: u64,
    /// How often to update FPS calculation.
    fps_update_interval_ms: u64,
    /// Fixed delta time for deterministic updates (optional).
    fixed_delta: Option<f32>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            start_ms: None,
            last_ms: 0,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_ms: 0,
            fps_update_interval_ms: 500,
            fixed_delta: None,
        }
    }

    /// Advance to `now_ms`. Call once per tick.
    ///
    /// Returns `(elapsed_time, delta_time)` for convenience.
    pub fn update(&mut self, now_ms: u64) -> (f32, f32) {
        let start = match self.start_ms {
            Some(start) => start,
            None => {
                self.start_ms = Some(now_ms);
                self.last_ms = now_ms;
                self.fps_update_ms = now_ms;
                self.fps_frame_count = 1;
                now_ms
            }
        };

        let raw_delta = now_ms.saturating_sub(self.last_ms) as f32 / 1000.0;
        self.last_ms = now_ms;

        match self.fixed_delta {
            Some(step) => {
                self.delta_secs = step;
                self.elapsed_secs += step;
            }
            None => {
                self.delta_secs = raw_delta;
                self.elapsed_secs = now_ms.saturating_sub(start) as f32 / 1000.0;
            }
        }

        self.frame_count += 1;

        let since_fps = now_ms.saturating_sub(self.fps_update_ms);
        if since_fps >= self.fps_update_interval_ms && since_fps > 0 {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / (since_fps as f32 / 1000.0);
            self.fps_frame_count = self.frame_count;
            self.fps_update_ms = now_ms;
        }

        (self.elapsed_secs, self.delta_secs)
    }

    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Set a fixed delta time for deterministic updates.
    ///
    /// Pass `None` to use real frame timing.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta.filter(|d| d.is_finite() && *d >= 0.0);
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
