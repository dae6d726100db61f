//! Knight Launcher core library
//!
//! A side-scrolling "launch and roll" game: charge the ballista, fire the
//! knight, and bounce off tents, mud, and patrolling enemies for distance
//! and coins.

use bevy::prelude::*;

pub mod camera;
pub mod collision;
pub mod config;
pub mod constants;
pub mod enemy;
pub mod hud;
pub mod menu;
pub mod persistence;
pub mod player;
pub mod shop;
pub mod world;

/// Per-tick ordering of the gameplay components.
///
/// Each plugin places its `Update` systems in one of these sets;
/// [`configure_tick_order`] chains them so a tick always runs flight input →
/// camera/viewport → world streaming → enemy locomotion → collision
/// resolution, regardless of executor scheduling.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickSet {
    /// Launch input, flight scoring, rest detection, reset.
    Flight,
    /// Camera follow and the viewport readback the streamer consumes.
    Camera,
    /// World streaming spawn/despawn and squash-removal handling.
    Streaming,
    /// Enemy patrol velocities.
    Locomotion,
    /// Contact-event resolution into velocity rewrites.
    Collision,
}

/// Chain the gameplay sets into the fixed tick order.
pub fn configure_tick_order(app: &mut App) {
    app.configure_sets(
        Update,
        (
            TickSet::Flight,
            TickSet::Camera,
            TickSet::Streaming,
            TickSet::Locomotion,
            TickSet::Collision,
        )
            .chain(),
    );
}
