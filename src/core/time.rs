//! Frame timing utilities

use std::time::{Duration, Instant};

/// Tracks frame timing and calculates FPS
#[derive(Debug)]
pub struct FrameTimer {
    last_frame: Instant,
    delta: Duration,
    frame_count: u64,
    fps_timer: Instant,
    fps: f32,
    fps_frame_count: u32,
    fps_updated: bool,
}

impl FrameTimer {
    /// Create a new frame timer
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last_frame: now,
            delta: Duration::ZERO,
            frame_count: 0,
            fps_timer: now,
            fps: 0.0,
            fps_frame_count: 0,
            fps_updated: false,
        }
    }

    /// Call once per frame to update timing
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    fn tick_at(&mut self, now: Instant) {
        // Clock can appear to go backwards on some platforms
        self.delta = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;
        self.frame_count += 1;
        self.fps_frame_count += 1;

        // Update FPS every second
        let fps_elapsed = now.saturating_duration_since(self.fps_timer);
        self.fps_updated = fps_elapsed >= Duration::from_secs(1);
        if self.fps_updated {
            self.fps = self.fps_frame_count as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = 0;
            self.fps_timer = now;
        }
    }

    /// Get delta time in seconds
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Get current FPS (updated every second)
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Whether the last tick refreshed the FPS value
    pub fn fps_updated(&self) -> bool {
        self.fps_updated
    }

    /// Get total frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_is_time_between_ticks() {
        let mut timer = FrameTimer::new();
        let start = timer.last_frame;
        timer.tick_at(start + Duration::from_millis(16));
        assert!((timer.delta_secs() - 0.016).abs() < 1e-6);
        timer.tick_at(start + Duration::from_millis(48));
        assert!((timer.delta_secs() - 0.032).abs() < 1e-6);
        assert_eq!(timer.frame_count(), 2);
    }

    #[test]
    fn test_fps_refreshes_each_second() {
        let mut timer = FrameTimer::new();
        let start = timer.last_frame;
        for i in 1..=30 {
            timer.tick_at(start + Duration::from_millis(i * 20));
        }
        // 600ms elapsed: not refreshed yet
        assert_eq!(timer.fps(), 0.0);
        for i in 31..=50 {
            timer.tick_at(start + Duration::from_millis(i * 20));
        }
        assert!(timer.fps_updated());
        assert!((timer.fps() - 50.0).abs() < 0.5);
    }
}
