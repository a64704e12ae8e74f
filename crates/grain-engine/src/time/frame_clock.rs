use std::time::{Duration, Instant};

/// Elapsed time for one loop iteration.
///
/// `seconds()` is the scaled reading handed to per-layer update logic.
/// `unscaled_seconds()` is wall-clock time and ignores the clock's time scale.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Timestep {
    scaled: f32,
    raw: f32,
    total: f64,
    frame_index: u64,
}

impl Timestep {
    /// Builds a timestep from a raw delta and a time scale.
    pub fn new(raw: f32, time_scale: f32, total: f64, frame_index: u64) -> Self {
        Self {
            scaled: raw * time_scale,
            raw,
            total,
            frame_index,
        }
    }

    #[inline]
    pub fn seconds(&self) -> f32 {
        self.scaled
    }

    #[inline]
    pub fn millis(&self) -> f32 {
        self.scaled * 1000.0
    }

    #[inline]
    pub fn unscaled_seconds(&self) -> f32 {
        self.raw
    }

    /// Unscaled time since the clock started.
    #[inline]
    pub fn total_seconds(&self) -> f64 {
        self.total
    }

    #[inline]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}

/// Frame clock producing [`Timestep`] snapshots.
///
/// Owned by the application context rather than shared process-wide, so
/// several loops (or tests) never step on each other's time scale.
///
/// Delta time is unclamped by default. [`FrameClock::with_clamps`] bounds the
/// raw reading, which keeps simulations stable across debugger pauses.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    frame_index: u64,
    clamps: Option<(Duration, Duration)>,
    time_scale: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            frame_index: 0,
            clamps: None,
            time_scale: 1.0,
        }
    }

    /// Creates a clock with delta-time clamps applied to the raw reading.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            clamps: Some((dt_min, dt_max)),
            ..Self::new()
        }
    }

    /// Resets the delta baseline. Total time keeps counting from the original start.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Sets the multiplier applied to the scaled reading.
    ///
    /// Negative or non-finite values are rejected and the previous scale is kept.
    pub fn set_time_scale(&mut self, scale: f32) {
        if !scale.is_finite() || scale < 0.0 {
            log::warn!("ignoring invalid time scale {scale}");
            return;
        }
        self.time_scale = scale;
    }

    /// Advances the clock to now.
    pub fn tick(&mut self) -> Timestep {
        self.tick_at(Instant::now())
    }

    /// Advances the clock to `now`.
    pub fn tick_at(&mut self, now: Instant) -> Timestep {
        let mut dt = now.saturating_duration_since(self.last);
        if let Some((lo, hi)) = self.clamps {
            dt = dt.clamp(lo, hi);
        }
        self.last = now;

        let ts = Timestep::new(
            dt.as_secs_f32(),
            self.time_scale,
            now.saturating_duration_since(self.start).as_secs_f64(),
            self.frame_index,
        );

        self.frame_index = self.frame_index.wrapping_add(1);
        ts
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
