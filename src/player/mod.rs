//! The launched knight: components, launch-cycle resources, and the systems
//! driving aim, charge, flight, and reset.

pub mod control;
pub mod state;

use bevy::prelude::*;

use crate::menu::GameState;

use control::{
    aim_and_charge_system, flight_score_system, follower_sync_system, reset_system,
    rest_detection_system, run_payout_system, smash_system, spawn_knight, RunEnded,
};
use state::{FlightTimer, LaunchControl, LaunchPhase, RunScore, SmashCharges};

pub struct LaunchControllerPlugin;

impl Plugin for LaunchControllerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LaunchPhase>()
            .init_resource::<LaunchControl>()
            .init_resource::<RunScore>()
            .init_resource::<FlightTimer>()
            .init_resource::<SmashCharges>()
            .add_message::<RunEnded>()
            .add_systems(OnEnter(GameState::Playing), spawn_knight)
            .add_systems(
                Update,
                (
                    aim_and_charge_system,
                    smash_system,
                    follower_sync_system,
                    flight_score_system,
                    rest_detection_system,
                    run_payout_system,
                    reset_system,
                )
                    .chain()
                    .in_set(crate::TickSet::Flight)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}
