//! Frame pacing for the headless runner.
//!
//! In real-time mode deltas are measured from the wall clock and the loop
//! sleeps off the rest of each frame budget. Otherwise every frame is exactly
//! one budget long and the loop never sleeps.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Largest measured delta handed to the simulation.
const MAX_DT: f32 = 0.25;

/// Frame pacing and timing statistics.
#[derive(Debug)]
pub struct FrameClock {
    /// Target frames per second
    target_fps: u32,
    /// Time budget per frame
    frame_budget: Duration,
    /// Time of last frame start
    last_frame: Instant,
    /// Measure and sleep, or step at a fixed rate
    real_time: bool,
    /// Recent frame deltas for averaging
    frame_times: VecDeque<f32>,
    /// Maximum samples for averaging
    max_samples: usize,
    /// Frames produced so far
    frames: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(60)
    }
}

impl FrameClock {
    /// Creates a fixed-step clock.
    #[must_use]
    pub fn new(target_fps: u32) -> Self {
        let target_fps = target_fps.max(1);
        Self {
            target_fps,
            frame_budget: Duration::from_secs_f64(1.0 / f64::from(target_fps)),
            last_frame: Instant::now(),
            real_time: false,
            frame_times: VecDeque::with_capacity(120),
            max_samples: 120,
            frames: 0,
        }
    }

    /// Switches between wall-clock and fixed stepping.
    #[must_use]
    pub fn with_real_time(mut self, real_time: bool) -> Self {
        self.real_time = real_time;
        self
    }

    /// Returns the fixed frame delta.
    #[must_use]
    pub fn fixed_dt(&self) -> f32 {
        self.frame_budget.as_secs_f32()
    }

    /// Returns the delta for the next frame.
    pub fn delta_time(&mut self) -> f32 {
        let dt = if self.real_time {
            let now = Instant::now();
            let measured = (now - self.last_frame).as_secs_f32();
            self.last_frame = now;
            measured.min(MAX_DT)
        } else {
            self.fixed_dt()
        };

        self.frame_times.push_back(dt);
        if self.frame_times.len() > self.max_samples {
            self.frame_times.pop_front();
        }
        self.frames += 1;

        dt
    }

    /// Sleeps for the remainder of the frame budget in real-time mode.
    pub fn sleep_remainder(&self) {
        if !self.real_time {
            return;
        }

        let elapsed = self.last_frame.elapsed();
        if elapsed < self.frame_budget {
            std::thread::sleep(self.frame_budget - elapsed);
        }
    }

    /// Returns the average frame time in milliseconds.
    #[must_use]
    pub fn average_frame_time_ms(&self) -> f32 {
        if self.frame_times.is_empty() {
            return 0.0;
        }

        (self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32) * 1000.0
    }

    /// Returns the target FPS.
    #[must_use]
    pub fn target_fps(&self) -> u32 {
        self.target_fps
    }

    /// Returns frames produced.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Resets timing (call after loading).
    pub fn reset(&mut self) {
        self.last_frame = Instant::now();
        self.frame_times.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_clock_creation() {
        let clock = FrameClock::new(60);
        assert_eq!(clock.target_fps(), 60);
        assert!((clock.fixed_dt() - 1.0 / 60.0).abs() < 0.001);
    }

    #[test]
    fn test_zero_fps_is_clamped() {
        let clock = FrameClock::new(0);
        assert_eq!(clock.target_fps(), 1);
        assert!((clock.fixed_dt() - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_fixed_mode_never_varies() {
        let mut clock = FrameClock::new(50);
        for _ in 0..10 {
            assert!((clock.delta_time() - 0.02).abs() < 1e-6);
        }
        assert_eq!(clock.frames(), 10);
        assert!((clock.average_frame_time_ms() - 20.0).abs() < 0.01);
    }

    #[test]
    fn test_real_time_delta() {
        let mut clock = FrameClock::new(60).with_real_time(true);

        std::thread::sleep(Duration::from_millis(16));
        let dt = clock.delta_time();
        assert!(dt >= 0.015);
        assert!(dt <= MAX_DT);
    }

    #[test]
    fn test_real_time_delta_is_capped() {
        let mut clock = FrameClock::new(60).with_real_time(true);

        std::thread::sleep(Duration::from_millis(300));
        let dt = clock.delta_time();

        assert!(dt <= MAX_DT);
    }

    #[test]
    fn test_reset_timing() {
        let mut clock = FrameClock::new(60);
        clock.delta_time();

        clock.reset();

        assert_eq!(clock.average_frame_time_ms(), 0.0);
    }
}
