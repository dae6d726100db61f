//! Runtime gameplay configuration loaded from `assets/game.toml`.
//!
//! [`GameConfig`] is a Bevy [`Resource`] that mirrors every constant in
//! [`crate::constants`].  At startup, [`load_game_config`] reads
//! `assets/game.toml` and overwrites the defaults with any values present in
//! the file.  Missing keys fall back to the compile-time defaults, so a
//! minimal TOML can override just the constants you care about.
//!
//! Add `config: Res<GameConfig>` to any system parameter list and read values
//! with `config.spawn_margin`, `config.launch_power_scale`, etc.
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `GameConfig::default()`.

use crate::constants::*;
use bevy::prelude::*;
use serde::Deserialize;

/// Runtime-tunable gameplay configuration.
///
/// All fields default to the corresponding compile-time constant from
/// `src/constants.rs`.  Override any subset by setting the value in
/// `assets/game.toml`.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // ── World Bounds ─────────────────────────────────────────────────────────
    pub world_width: f32,
    pub world_height: f32,
    pub ground_y: f32,
    pub gravity_y: f32,

    // ── World Generation ─────────────────────────────────────────────────────
    pub enemy_count: usize,
    pub tent_count: usize,
    pub mud_count: usize,
    pub min_spawn_x: f32,
    pub gen_edge_margin: f32,
    pub min_obstacle_distance: f32,
    pub max_obstacle_attempts: u32,
    /// Seed for the per-run world RNG. 0 means "draw from entropy".
    pub world_seed: u64,

    // ── World Streaming ──────────────────────────────────────────────────────
    pub spawn_margin: f32,
    pub despawn_margin: f32,

    // ── Enemy Patrol ─────────────────────────────────────────────────────────
    pub enemy_patrol_speed: f32,
    pub patrol_distance_min: f32,
    pub patrol_distance_max: f32,

    // ── Collision Responses ──────────────────────────────────────────────────
    pub ground_bounce_threshold: f32,
    pub ground_bounce_factor: f32,
    pub mud_slow_factor: f32,
    pub tent_boost_factor: f32,
    pub tent_min_boost_x: f32,
    pub tent_min_boost_y: f32,
    pub enemy_boost_factor: f32,

    // ── Launch ───────────────────────────────────────────────────────────────
    pub aim_angle_step: f32,
    pub charge_rate: f32,
    pub max_launch_power: f32,
    pub launch_power_scale: f32,

    // ── Rest Detection ───────────────────────────────────────────────────────
    pub rest_speed_threshold: f32,
    pub settle_delay_secs: f32,

    // ── Smash Shield ─────────────────────────────────────────────────────────
    pub smash_boost_speed: f32,
    pub smash_charges_per_launch: u32,

    // ── Camera ───────────────────────────────────────────────────────────────
    pub camera_follow_lerp: f32,

    // ── Economy ──────────────────────────────────────────────────────────────
    pub coins_per_distance: f32,
    pub coins_per_enemy: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            // World Bounds
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,
            ground_y: GROUND_Y,
            gravity_y: GRAVITY_Y,
            // World Generation
            enemy_count: ENEMY_COUNT,
            tent_count: TENT_COUNT,
            mud_count: MUD_COUNT,
            min_spawn_x: MIN_SPAWN_X,
            gen_edge_margin: GEN_EDGE_MARGIN,
            min_obstacle_distance: MIN_OBSTACLE_DISTANCE,
            max_obstacle_attempts: MAX_OBSTACLE_ATTEMPTS,
            world_seed: 0,
            // World Streaming
            spawn_margin: SPAWN_MARGIN,
            despawn_margin: DESPAWN_MARGIN,
            // Enemy Patrol
            enemy_patrol_speed: ENEMY_PATROL_SPEED,
            patrol_distance_min: PATROL_DISTANCE_MIN,
            patrol_distance_max: PATROL_DISTANCE_MAX,
            // Collision Responses
            ground_bounce_threshold: GROUND_BOUNCE_THRESHOLD,
            ground_bounce_factor: GROUND_BOUNCE_FACTOR,
            mud_slow_factor: MUD_SLOW_FACTOR,
            tent_boost_factor: TENT_BOOST_FACTOR,
            tent_min_boost_x: TENT_MIN_BOOST_X,
            tent_min_boost_y: TENT_MIN_BOOST_Y,
            enemy_boost_factor: ENEMY_BOOST_FACTOR,
            // Launch
            aim_angle_step: AIM_ANGLE_STEP,
            charge_rate: CHARGE_RATE,
            max_launch_power: MAX_LAUNCH_POWER,
            launch_power_scale: LAUNCH_POWER_SCALE,
            // Rest Detection
            rest_speed_threshold: REST_SPEED_THRESHOLD,
            settle_delay_secs: SETTLE_DELAY_SECS,
            // Smash Shield
            smash_boost_speed: SMASH_BOOST_SPEED,
            smash_charges_per_launch: SMASH_CHARGES_PER_LAUNCH,
            // Camera
            camera_follow_lerp: CAMERA_FOLLOW_LERP,
            // Economy
            coins_per_distance: COINS_PER_DISTANCE,
            coins_per_enemy: COINS_PER_ENEMY,
        }
    }
}

/// Startup system: attempt to load `assets/game.toml` and overwrite the
/// `GameConfig` resource with any values present in the file.
///
/// Missing keys retain their compiled defaults.  TOML parse errors are logged
/// but do not abort the game.  A missing file is silently ignored (defaults
/// are already in place from `insert_resource`).
pub fn load_game_config(mut config: ResMut<GameConfig>) {
    let path = "assets/game.toml";
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<GameConfig>(&contents) {
            Ok(loaded) => {
                *config = loaded;
                info!("Loaded game config from {path}");
            }
            Err(e) => {
                warn!("Failed to parse {path}: {e}; using defaults");
            }
        },
        Err(_) => {
            // File not present — defaults are already in place; not an error.
            info!("No {path} found; using compiled defaults");
        }
    }
}
