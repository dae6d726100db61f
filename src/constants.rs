//! Centralised gameplay and physics constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place without source-diving across multiple modules.
//! [`crate::config::GameConfig`] mirrors every constant and can override any
//! subset from `assets/game.toml` without recompiling.

// ── World Bounds ──────────────────────────────────────────────────────────────

/// Total horizontal extent of a run's world (world units).
///
/// Obstacle and enemy definitions are distributed across this span; the
/// camera is clamped so it never scrolls past the right edge.
pub const WORLD_WIDTH: f32 = 6400.0;

/// Vertical extent of the playfield (world units).
pub const WORLD_HEIGHT: f32 = 600.0;

/// Y coordinate of the ground surface (top of the ground collider).
pub const GROUND_Y: f32 = 20.0;

/// Half-thickness of the ground collider box.
pub const GROUND_HALF_THICKNESS: f32 = 20.0;

/// Downward gravity acceleration (world units / second²).
pub const GRAVITY_Y: f32 = 300.0;

// ── World Generation ──────────────────────────────────────────────────────────

/// Number of enemy definitions generated per run.
pub const ENEMY_COUNT: usize = 20;

/// Number of tent obstacle definitions generated per run.
pub const TENT_COUNT: usize = 10;

/// Number of mud obstacle definitions generated per run.
pub const MUD_COUNT: usize = 5;

/// Leftmost x at which world entities may be placed.
///
/// Keeps the launch ramp area clear so the knight never spawns inside an
/// obstacle.
pub const MIN_SPAWN_X: f32 = 400.0;

/// Margin kept clear between the generation range and the right world edge.
pub const GEN_EDGE_MARGIN: f32 = 200.0;

/// Minimum horizontal separation enforced between obstacle definitions.
///
/// Enforced by rejection sampling; see [`MAX_OBSTACLE_ATTEMPTS`].
pub const MIN_OBSTACLE_DISTANCE: f32 = 150.0;

/// Retry budget for obstacle rejection sampling.
///
/// On exhaustion the last candidate is accepted anyway and a warning is
/// logged — separation is best-effort, not a hard guarantee.
pub const MAX_OBSTACLE_ATTEMPTS: u32 = 100;

// ── World Streaming ───────────────────────────────────────────────────────────

/// Streaming distance ahead of the viewport (past its right edge).
///
/// Together with [`DESPAWN_MARGIN`] this bounds the live band
/// `[viewport.left - DESPAWN_MARGIN, viewport.right + SPAWN_MARGIN]`: both
/// the spawn and despawn systems test against the same band, so an entity is
/// never created and destroyed within one tick.  Must stay strictly greater
/// than [`DESPAWN_MARGIN`] so the world streams in well ahead of the camera.
pub const SPAWN_MARGIN: f32 = 500.0;

/// Streaming distance behind the viewport (past its left edge).
///
/// Kept narrow so entities the knight has flown past are reclaimed quickly.
pub const DESPAWN_MARGIN: f32 = 200.0;

// ── Enemy Patrol ──────────────────────────────────────────────────────────────

/// Horizontal patrol speed (world units / second).
///
/// The original tuning was 1.5 u/frame at 60 Hz.
pub const ENEMY_PATROL_SPEED: f32 = 90.0;

/// Minimum patrol leg length (world units).
pub const PATROL_DISTANCE_MIN: f32 = 100.0;

/// Maximum patrol leg length (world units).
pub const PATROL_DISTANCE_MAX: f32 = 300.0;

// ── Collision Responses ───────────────────────────────────────────────────────

/// Ground bounce only fires when descending faster than this (u/s, downward).
pub const GROUND_BOUNCE_THRESHOLD: f32 = 0.5;

/// Vertical dampening applied on a ground bounce (`vy' = -vy * factor`).
pub const GROUND_BOUNCE_FACTOR: f32 = 0.8;

/// Uniform dampening applied to both axes on mud contact.
pub const MUD_SLOW_FACTOR: f32 = 0.3;

/// Multiplier applied to both axes on a tent bounce.
pub const TENT_BOOST_FACTOR: f32 = 1.5;

/// Minimum horizontal speed guaranteed by a tent bounce.
///
/// Together with [`TENT_MIN_BOOST_Y`] this ensures a tent always relaunches
/// the knight even from a near-standstill.
pub const TENT_MIN_BOOST_X: f32 = 10.0;

/// Minimum upward speed guaranteed by a tent bounce.
pub const TENT_MIN_BOOST_Y: f32 = 15.0;

/// Multiplier applied to both axes when the knight smashes through an enemy.
pub const ENEMY_BOOST_FACTOR: f32 = 1.4;

// ── Launch ────────────────────────────────────────────────────────────────────

/// X position of the ballista / launch origin; score is measured from here.
pub const LAUNCH_ORIGIN_X: f32 = 100.0;

/// Y position at which the knight rests on the ballista.
pub const LAUNCH_ORIGIN_Y: f32 = 70.0;

/// Steepest permitted aim angle (degrees; -90 is straight up).
pub const AIM_ANGLE_MIN: f32 = -90.0;

/// Shallowest permitted aim angle (degrees; 0 is flat).
pub const AIM_ANGLE_MAX: f32 = 0.0;

/// Aim angle adjustment per tick while an arrow key is held (degrees).
pub const AIM_ANGLE_STEP: f32 = 1.0;

/// Default aim angle at the start of a run (degrees).
pub const AIM_ANGLE_DEFAULT: f32 = -45.0;

/// Power accumulated per tick while the launch key is held.
pub const CHARGE_RATE: f32 = 2.0;

/// Maximum accumulated launch power.
pub const MAX_LAUNCH_POWER: f32 = 100.0;

/// Divisor converting accumulated power into launch speed
/// (`speed = power / LAUNCH_POWER_SCALE`).
///
/// At 0.125, full power gives 800 u/s: a 45° shot carries roughly a third of
/// the world before bounces extend it. Raise to shorten launches across the
/// board.
pub const LAUNCH_POWER_SCALE: f32 = 0.125;

// ── Rest Detection ────────────────────────────────────────────────────────────

/// Speed below which the knight counts as at rest (u/s).
pub const REST_SPEED_THRESHOLD: f32 = 0.1;

/// Minimum time after launch before rest detection is permitted (seconds).
///
/// A high-angle launch passes through near-zero speed at its apex; without
/// this delay that instant would be misread as the knight having stopped.
pub const SETTLE_DELAY_SECS: f32 = 0.5;

// ── Knight Body ───────────────────────────────────────────────────────────────

/// Half-extents of the knight's collider box.
pub const KNIGHT_HALF_WIDTH: f32 = 15.0;
pub const KNIGHT_HALF_HEIGHT: f32 = 25.0;

/// Knight restitution. Kept low so the scripted ground-bounce rule, not the
/// solver, owns the bounce feel.
pub const KNIGHT_RESTITUTION: f32 = 0.1;

/// Knight contact friction. Low, so horizontal momentum bleeds out slowly.
pub const KNIGHT_FRICTION: f32 = 0.1;

// ── Smash Shield ──────────────────────────────────────────────────────────────

/// Downward speed applied when the smash ability fires (u/s).
pub const SMASH_BOOST_SPEED: f32 = 120.0;

/// Smash uses granted per launch while the Smash Shield is owned.
pub const SMASH_CHARGES_PER_LAUNCH: u32 = 1;

// ── Camera ────────────────────────────────────────────────────────────────────

/// Per-tick lerp factor for the camera chasing the follower anchor.
pub const CAMERA_FOLLOW_LERP: f32 = 0.08;

/// Fallback viewport half-width used before the first projection readback.
pub const VIEWPORT_FALLBACK_HALF_WIDTH: f32 = 400.0;

// ── Economy ───────────────────────────────────────────────────────────────────

/// Distance per coin awarded at the end of a run.
pub const COINS_PER_DISTANCE: f32 = 50.0;

/// Coins awarded for each enemy squashed mid-flight.
pub const COINS_PER_ENEMY: u32 = 5;

// ── UI ────────────────────────────────────────────────────────────────────────

/// Font size for the HUD score and high-score lines.
pub const HUD_FONT_SIZE: f32 = 28.0;

/// Visual width of the charging power bar at full power (pixels).
pub const POWER_BAR_WIDTH: f32 = 160.0;
