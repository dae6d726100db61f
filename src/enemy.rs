//! Enemy patrol locomotion.
//!
//! Live enemies walk back and forth along the ground at constant speed.
//! Each carries a [`Patrol`] component describing only the current leg —
//! direction and a target x — so there is no persistent memory beyond it.
//! When the enemy crosses its target in the direction of travel, a new random
//! direction and leg length are drawn from the world RNG.

use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use rand::rngs::StdRng;
use rand::Rng;

use crate::config::GameConfig;
use crate::menu::GameState;
use crate::world::{EnemyKnight, WorldRng};

/// Half-extent of the square enemy collider.
pub const ENEMY_HALF_EXTENT: f32 = 21.0;

/// The current patrol leg of a live enemy.
///
/// Mutated only by [`patrol_system`]; destroyed with the enemy instance.
#[derive(Component, Debug, Clone, Copy)]
pub struct Patrol {
    /// Direction of travel: -1.0 or +1.0.
    pub direction: f32,
    /// X coordinate at which the current leg ends.
    pub move_until_x: f32,
}

impl Patrol {
    /// Draw a random direction and leg length starting from `x`.
    pub fn random_leg(rng: &mut StdRng, x: f32, config: &GameConfig) -> Self {
        let direction = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        let distance = rng.gen_range(config.patrol_distance_min..=config.patrol_distance_max);
        Self {
            direction,
            move_until_x: x + distance * direction,
        }
    }

    /// Whether `x` has crossed the leg target in the direction of travel.
    pub fn leg_finished(&self, x: f32) -> bool {
        (self.direction > 0.0 && x >= self.move_until_x)
            || (self.direction < 0.0 && x <= self.move_until_x)
    }
}

pub struct EnemyLocomotionPlugin;

impl Plugin for EnemyLocomotionPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            patrol_system
                .in_set(crate::TickSet::Locomotion)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

/// Advance every live enemy's patrol: constant horizontal speed, zero
/// vertical velocity (enemies ignore gravity), retarget on leg completion.
pub fn patrol_system(
    mut q_enemies: Query<(&Transform, &mut Velocity, &mut Patrol), With<EnemyKnight>>,
    mut rng: ResMut<WorldRng>,
    config: Res<GameConfig>,
) {
    for (transform, mut velocity, mut patrol) in q_enemies.iter_mut() {
        let x = transform.translation.x;
        if patrol.leg_finished(x) {
            *patrol = Patrol::random_leg(&mut rng.0, x, &config);
        }
        velocity.linvel = Vec2::new(config.enemy_patrol_speed * patrol.direction, 0.0);
    }
}
