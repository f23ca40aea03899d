//! Roadwise - road-safety driving quiz
//!
//! Core modules:
//! - `sim`: Deterministic simulation (road physics, curves, sign spawning, stats)
//! - `quiz`: Question model and remote question decoding
//! - `renderer`: Pseudo-3D road painter over an abstract drawing surface
//! - `driver`: Fixed-step game loop driver with a command queue
//! - `settings`: Data-driven configuration
//! - `assets`: Bundled image lookup

pub mod assets;
#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod driver;
pub mod quiz;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use driver::{FrameClock, GameDriver};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Simulation tick rate (ticks per second)
    pub const TICK_RATE: u32 = 60;
    /// Fixed simulation timestep in milliseconds
    pub const SIM_DT_MS: f64 = 1000.0 / TICK_RATE as f64;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;
    /// Longest frame delta the clock will try to catch up on
    pub const MAX_FRAME_DELTA_MS: f64 = 100.0;

    /// Virtual view dimensions (renderer scales to the real surface)
    pub const VIEW_WIDTH: f32 = 1000.0;
    pub const VIEW_HEIGHT: f32 = 600.0;
    /// Horizon line as a fraction of view height
    pub const HORIZON_RATIO: f32 = 0.4;

    /// Car speed limits and response
    pub const DEFAULT_MAX_SPEED: f32 = 6.0;
    pub const ACCELERATION: f32 = 0.1;
    /// Speed-proportional drag while accelerating
    pub const DRAG: f32 = 0.015;
    /// Coasting loss per tick
    pub const FRICTION: f32 = 0.04;
    pub const BRAKE: f32 = 0.15;

    /// Steering
    pub const MAX_TURN: f32 = 5.0;
    pub const TURN_STEP: f32 = 0.25;
    pub const TURN_DECAY: f32 = 0.5;
    pub const STEER_RATE: f32 = 1.5;
    /// Above this speed steering response falls off as 1/speed
    pub const STEER_REFERENCE_SPEED: f32 = 2.0;

    /// Lateral limits: outer wall and the road edge where the car parks
    pub const MAX_LATERAL_OFFSET: f32 = 550.0;
    pub const PARKING_OFFSET: f32 = 450.0;

    /// Road curvature
    pub const CURVE_RANGE: i32 = 50;
    pub const MIN_CURVE_CHANGE: i32 = 20;
    pub const MIN_SECTION_LENGTH: f32 = 1000.0;
    pub const MAX_SECTION_LENGTH: f32 = 9000.0;
    pub const INITIAL_SECTION_LENGTH: f32 = 1000.0;
    /// Curve smoothing step per unit of speed
    pub const CURVE_EASE: f32 = 0.05;
    /// Sideways pull of a curve on the car
    pub const CURVE_DRIFT: f32 = 0.0004;

    /// Scenery scrolling
    pub const STRIPE_SCROLL: f32 = 0.08;
    /// Stripe offset at which the ground bands shift by one band
    pub const STRIPE_PERIOD: f32 = 1.0;
    pub const BACKDROP_SCROLL: f32 = 0.01;

    /// Sign approach
    pub const SIGN_APPROACH_RATE: f32 = 0.5;
    /// Progress at which the sign reaches the viewer
    pub const SIGN_DISTANCE: f32 = 400.0;
    /// Perspective factor that brings up the question
    pub const SIGN_TRIGGER: f32 = 0.64;

    /// Quiz defaults
    pub const DEFAULT_LIVES: u8 = 3;
    pub const DEFAULT_QUESTION_SECS: u32 = 20;
    pub const DEFAULT_QUESTION_SCORE: u32 = 10;
}

/// Move `current` toward `target` by at most `step`, never overshooting
#[inline]
pub fn approach(current: f32, target: f32, step: f32) -> f32 {
    if current < target {
        (current + step).min(target)
    } else {
        (current - step).max(target)
    }
}

/// Convert seconds to whole simulation ticks (rounded)
#[inline]
pub fn secs_to_ticks(secs: f32) -> u32 {
    (secs.max(0.0) * consts::TICK_RATE as f32).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approach_never_overshoots() {
        assert_eq!(approach(0.0, 1.0, 5.0), 1.0);
        assert_eq!(approach(3.0, -1.0, 1.5), 1.5);
        assert_eq!(approach(2.0, 2.0, 0.3), 2.0);
    }

    #[test]
    fn seconds_round_to_ticks() {
        assert_eq!(secs_to_ticks(20.0), 1200);
        assert_eq!(secs_to_ticks(1.5), 90);
        assert_eq!(secs_to_ticks(-3.0), 0);
    }
}
