//! Wall-clock timing for the frame loop.
//!
//! The loop only ever asks a [`TimeSource`] for monotonic elapsed seconds and
//! derives its own frame delta from consecutive readings. [`Time`] is the
//! `Instant`-backed source used by the viewer; it also keeps a frame counter
//! and a periodically refreshed FPS figure for the window title.

use std::time::{Duration, Instant};

/// Monotonic clock consumed by the frame loop.
pub trait TimeSource {
    /// Seconds since an arbitrary fixed origin. Never decreases.
    fn elapsed_seconds(&self) -> f64;
}

/// Frame timing backed by [`Instant`].
#[derive(Debug)]
pub struct Time {
    /// When the timer was created.
    start: Instant,
    /// Total frames presented since start.
    frame_count: u64,
    /// Calculated FPS (updated periodically).
    fps: f32,
    /// Frame count at last FPS update.
    fps_frame_count: u64,
    /// Time of last FPS calculation.
    fps_update_time: Instant,
    fps_update_interval: Duration,
}

impl Time {
    /// Create a new time tracker starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
        }
    }

    /// Record a presented frame. Returns `true` when the FPS figure changed.
    pub fn frame_presented(&mut self) -> bool {
        let now = Instant::now();
        self.frame_count += 1;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
            return true;
        }
        false
    }

    /// Total frames since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Calculated frames per second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for Time {
    fn elapsed_seconds(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_time_new() {
        let time = Time::new();
        assert_eq!(time.frame(), 0);
        assert_eq!(time.fps(), 0.0);
    }

    #[test]
    fn test_elapsed_is_monotonic() {
        let time = Time::new();
        let first = time.elapsed_seconds();
        thread::sleep(Duration::from_millis(5));
        let second = time.elapsed_seconds();
        assert!(first >= 0.0);
        assert!(second > first);
    }

    #[test]
    fn test_fps_refresh() {
        let mut time = Time::new();
        assert!(!time.frame_presented());
        assert_eq!(time.frame(), 1);

        thread::sleep(Duration::from_millis(510));
        assert!(time.frame_presented());
        assert!(time.fps() > 0.0);
    }
}
