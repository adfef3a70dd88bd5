use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous tick, clamped.
    pub dt: f32,

    /// Sum of all clamped deltas since the clock started.
    pub elapsed: f32,

    pub frame_index: u64,
}

/// Per-window frame clock.
///
/// Delta time is clamped so a debugger pause or a minimized window does not
/// turn into one huge animation step.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    elapsed: f32,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            elapsed: 0.0,
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let dt = self.advance(now.saturating_duration_since(self.last));
        self.last = now;
        dt
    }

    fn advance(&mut self, raw: Duration) -> FrameTime {
        let dt = raw.clamp(self.dt_min, self.dt_max).as_secs_f32();
        self.elapsed += dt;

        let time = FrameTime {
            dt,
            elapsed: self.elapsed,
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        time
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts frames and reports the rate once per full second.
#[derive(Debug, Default, Clone)]
pub struct FpsCounter {
    frames: u32,
    window: f32,
}

impl FpsCounter {
    /// Records one frame of `dt` seconds. Returns the frame count of the
    /// second that just completed, if one did.
    pub fn frame(&mut self, dt: f32) -> Option<u32> {
        self.frames += 1;
        self.window += dt;
        if self.window < 1.0 {
            return None;
        }

        let fps = self.frames;
        self.window -= 1.0;
        self.frames = 0;
        Some(fps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_is_clamped_both_ways() {
        let mut clock =
            FrameClock::with_clamps(Duration::from_millis(1), Duration::from_millis(100));

        let short = clock.advance(Duration::ZERO);
        assert_eq!(short.dt, 0.001);

        let long = clock.advance(Duration::from_secs(5));
        assert_eq!(long.dt, 0.1);
        assert_eq!(long.frame_index, 1);
        assert!((long.elapsed - 0.101).abs() < 1e-6);
    }

    #[test]
    fn fps_reported_once_per_second() {
        let mut fps = FpsCounter::default();
        let reports: Vec<_> = (0..25).filter_map(|_| fps.frame(0.1)).collect();
        // 0.1 is not exact in f32, so the first second may close on frame 10 or 11.
        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|&n| (10..=11).contains(&n)));
    }
}
