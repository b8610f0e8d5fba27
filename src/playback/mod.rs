pub mod engine;
pub mod player;

pub use engine::{AutoPlayHandle, PlaybackSession};
pub use player::{Generation, Player};

use crate::core::{DeliveryMode, StateSnapshot, SurfaceDescription};
use crate::error::PlaybackError;
use std::time::Duration;

/// Delay between auto-play ticks at normal speed
pub const AUTO_RUN_INTERVAL: Duration = Duration::from_millis(500);

/// Step size of the fast forward/back controls
pub const FAST_FORWARD_STEP_SIZE: usize = 120;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

/// Playback configuration
#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    pub auto_run_interval: Duration,
    pub fast_forward_step: usize,
    pub speed: f64, // 1.0 = one tick per interval, 2.0 = twice as often
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            auto_run_interval: AUTO_RUN_INTERVAL,
            fast_forward_step: FAST_FORWARD_STEP_SIZE,
            speed: 1.0,
        }
    }
}

/// Clamp a speed multiplier to 0.1..=10, treating non-finite values as 1.0
pub fn normalize_speed(speed: f64) -> f64 {
    if speed.is_finite() {
        speed.clamp(0.1, 10.0)
    } else {
        1.0
    }
}

impl PlaybackConfig {
    /// Delay between auto-play ticks at the configured speed
    pub fn tick_interval(&self) -> Duration {
        self.auto_run_interval.div_f64(normalize_speed(self.speed))
    }
}

/// Receiver of playback output, implemented by the presentation layer
pub trait FrameSink {
    /// Static geometry of a newly loaded plan
    fn show_surface(&mut self, plan: &str, mode: DeliveryMode, surface: &SurfaceDescription);

    /// A state to display; `animate` is false for fast jumps
    fn show_state(&mut self, state: &StateSnapshot, animate: bool);

    /// An error to report to the user
    fn show_error(&mut self, error: &PlaybackError);
}

/// Sink that records everything it is shown
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub surfaces: Vec<String>,
    pub states: Vec<(StateSnapshot, bool)>,
    pub errors: Vec<PlaybackError>,
}

#[cfg(test)]
impl FrameSink for RecordingSink {
    fn show_surface(&mut self, plan: &str, _mode: DeliveryMode, _surface: &SurfaceDescription) {
        self.surfaces.push(plan.to_string());
    }

    fn show_state(&mut self, state: &StateSnapshot, animate: bool) {
        self.states.push((state.clone(), animate));
    }

    fn show_error(&mut self, error: &PlaybackError) {
        self.errors.push(error.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_interval_scales_with_speed() {
        let mut config = PlaybackConfig::default();
        assert_eq!(config.tick_interval(), Duration::from_millis(500));

        config.speed = 2.0;
        assert_eq!(config.tick_interval(), Duration::from_millis(250));

        config.speed = 100.0;
        assert_eq!(config.tick_interval(), Duration::from_millis(50));
    }

    #[test]
    fn test_non_finite_speed_plays_at_normal_rate() {
        for speed in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let config = PlaybackConfig {
                speed,
                ..PlaybackConfig::default()
            };
            assert_eq!(config.tick_interval(), AUTO_RUN_INTERVAL);
        }
    }
}
