//! Umbra - visibility core of a top-down stealth game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (geometry, ray casting, shadows, doors, agents)
//! - `mask`: Renderer-facing light/shadow mask output (vertices + CPU scratch buffer)
//! - `level`: Level layout loading and the built-in demo level
//! - `settings`: Data-driven vision and movement tuning

pub mod error;
pub mod level;
pub mod mask;
pub mod settings;
pub mod sim;

pub use error::{LevelError, SettingsError};
pub use level::LevelData;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Collision radius of the player and guards
    pub const AGENT_RADIUS: f32 = 5.0;
    /// Radius of the circle a guard presents to other rays
    pub const GUARD_BLOCKER_RADIUS: f32 = 5.0;

    /// Player defaults
    pub const PLAYER_SPEED: f32 = 3.0;
    /// Degrees of heading change per millisecond of held turn input
    pub const PLAYER_TURN_DEG_PER_MS: f32 = 1.0 / 20.0;
    pub const PLAYER_FOV_DEG: f32 = 45.0;
    pub const PLAYER_RAY_COUNT: usize = 45;
    pub const PLAYER_VIEW_DISTANCE: f32 = 300.0;

    /// Guard defaults
    pub const GUARD_FOV_DEG: f32 = 45.0;
    pub const GUARD_RAY_COUNT: usize = 23;
    pub const GUARD_VIEW_DISTANCE: f32 = 150.0;
    /// Heading step applied each time a patrolling guard's timer elapses
    pub const GUARD_ROTATE_STEP_DEG: f32 = 2.0;
    pub const DETECTION_RANGE: f32 = 150.0;
    /// Anything this close is seen regardless of facing or walls
    pub const POINT_BLANK_RADIUS: f32 = 10.0;

    /// Milliseconds for a door to travel fully open or closed
    pub const DOOR_TRAVEL_MS: f32 = 1000.0;
    /// Number of button/door groups (override slots)
    pub const MAX_GROUPS: usize = 10;
    /// Interaction radius for buttons (squared distance <= 100)
    pub const BUTTON_REACH: f32 = 10.0;

    /// Distance unlit silhouette vertices are pushed away from the light
    pub const SHADOW_PROJECTION_DISTANCE: f32 = 10_000.0;
}

/// Sign with zero treated as positive: always returns -1.0 or 1.0
#[inline]
pub fn sign(x: f32) -> f32 {
    if x == 0.0 {
        1.0
    } else {
        1.0_f32.copysign(x)
    }
}

/// Rotate a vector by `degrees` (y-up counterclockwise, clockwise on screen)
#[inline]
pub fn rotate_deg(v: Vec2, degrees: f32) -> Vec2 {
    Vec2::from_angle(degrees.to_radians()).rotate(v)
}

/// Signed angle in degrees from `from` to `to`, in (-180, 180]
#[inline]
pub fn angle_between_deg(from: Vec2, to: Vec2) -> f32 {
    from.angle_to(to).to_degrees()
}
