//! Knight components and launch-state resources.
//!
//! All ECS components and Bevy resources describing the projectile and its
//! launch cycle live here.  Systems that mutate this state are in the sibling
//! module [`super::control`].

use bevy::prelude::*;

use crate::constants::{AIM_ANGLE_DEFAULT, LAUNCH_ORIGIN_X, LAUNCH_ORIGIN_Y};

// ── Components ────────────────────────────────────────────────────────────────

/// Marker for the launched projectile ("the knight").
#[derive(Component, Debug, Clone, Copy)]
pub struct Knight;

/// Marker for the invisible camera-follow anchor that trails the knight.
///
/// The camera chases this entity rather than the physics body directly, so
/// bounce jitter never reaches the viewport.
#[derive(Component, Debug, Clone, Copy)]
pub struct KnightFollower;

/// Marker for the ballista at the launch origin; anchors the aim indicator.
#[derive(Component, Debug, Clone, Copy)]
pub struct Ballista;

// ── Resources ─────────────────────────────────────────────────────────────────

/// The launch cycle: `Aiming → Charging → Launched → Stopped → (reset) → Aiming`.
///
/// Aiming/charging input is only honoured in the first two phases; in
/// `Launched` the only accepted input is the smash ability, and in `Stopped`
/// only the reset.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LaunchPhase {
    #[default]
    Aiming,
    Charging,
    Launched,
    Stopped,
}

/// Aim angle and accumulated power for the pending launch.
#[derive(Resource, Debug, Clone, Copy)]
pub struct LaunchControl {
    /// Degrees, clamped to [-90, 0]; -90 is straight up, 0 is flat.
    pub angle_deg: f32,
    /// Accumulated charge, clamped to `max_launch_power`.
    pub power: f32,
}

impl Default for LaunchControl {
    fn default() -> Self {
        Self {
            angle_deg: AIM_ANGLE_DEFAULT,
            power: 0.0,
        }
    }
}

/// Running score for the current run.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct RunScore {
    /// Monotonically increasing max horizontal distance from the origin.
    pub max_distance: u32,
    /// Coins banked mid-flight (enemy squashes); paid out when the run stops.
    pub coins_earned: u32,
}

/// Seconds elapsed since the launch; gates rest detection.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct FlightTimer {
    pub since_launch_secs: f32,
}

/// Remaining uses of the smash ability this flight.
///
/// Reset to the configured allotment at every `Launched` transition while
/// the Smash Shield is owned; zero otherwise.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SmashCharges {
    pub remaining: u32,
}

/// World position where the knight rests before launch.
pub fn launch_origin() -> Vec2 {
    Vec2::new(LAUNCH_ORIGIN_X, LAUNCH_ORIGIN_Y)
}
