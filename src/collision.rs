//! Collision responses: maps contact pairs to scripted velocity rewrites.
//!
//! Every surface the knight can touch carries a [`Surface`] component — a
//! closed enum matched exhaustively, so adding a surface kind without a
//! response rule is a compile error.  Responses *overwrite* the knight's
//! velocity rather than accumulating force; when several contacts land in
//! the same physics step each is processed independently and the last write
//! wins.  That ordering dependence is deliberate, preserved from the
//! original behaviour.

use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

use crate::config::GameConfig;
use crate::menu::GameState;
use crate::player::state::{Knight, RunScore};
use crate::world::EnemySquashed;

/// Semantic label of a body the knight can collide with.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// The world-spanning floor: dampened vertical bounce while descending.
    Ground,
    /// Bouncy obstacle: strong boost with a guaranteed minimum.
    Tent,
    /// Sticky obstacle: uniform slow-down on both axes.
    Mud,
    /// Patrolling enemy: boost on both axes; the enemy is destroyed.
    Enemy,
}

pub struct CollisionResolverPlugin;

impl Plugin for CollisionResolverPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            collision_response_system
                .in_set(crate::TickSet::Collision)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

/// Apply the ground rule: reflect and dampen the vertical axis, but only
/// while descending faster than the threshold.  Horizontal is untouched.
pub fn ground_response(velocity: Vec2, config: &GameConfig) -> Vec2 {
    if velocity.y < -config.ground_bounce_threshold {
        Vec2::new(velocity.x, -velocity.y * config.ground_bounce_factor)
    } else {
        velocity
    }
}

/// Apply the mud rule: uniform dampening of both axes.
pub fn mud_response(velocity: Vec2, config: &GameConfig) -> Vec2 {
    velocity * config.mud_slow_factor
}

/// Apply the tent rule: boosted relaunch with guaranteed minimum speeds, so
/// even a near-standstill contact sends the knight flying again.
pub fn tent_response(velocity: Vec2, config: &GameConfig) -> Vec2 {
    Vec2::new(
        (velocity.x.abs() * config.tent_boost_factor).max(config.tent_min_boost_x),
        (velocity.y.abs() * config.tent_boost_factor).max(config.tent_min_boost_y),
    )
}

/// Apply the enemy rule: multiplicative boost on both axes, vertical forced
/// upward.
pub fn enemy_response(velocity: Vec2, config: &GameConfig) -> Vec2 {
    Vec2::new(
        velocity.x * config.enemy_boost_factor,
        (velocity.y * config.enemy_boost_factor).abs(),
    )
}

/// Consume this tick's contact-start events and resolve each pair involving
/// the knight to exactly one velocity rewrite.
///
/// Pairs without the knight are ignored.  Contacts referencing bodies that
/// were despawned earlier in the tick resolve to no-ops via the failed
/// `Surface` lookup.
pub fn collision_response_system(
    mut collision_events: MessageReader<CollisionEvent>,
    mut q_knight: Query<(Entity, &mut Velocity), With<Knight>>,
    q_surfaces: Query<&Surface>,
    mut squashed: MessageWriter<EnemySquashed>,
    mut score: ResMut<RunScore>,
    config: Res<GameConfig>,
) {
    let Ok((knight_entity, mut velocity)) = q_knight.single_mut() else {
        return;
    };

    for event in collision_events.read() {
        let (e1, e2) = match event {
            CollisionEvent::Started(e1, e2, _) => (*e1, *e2),
            CollisionEvent::Stopped(..) => continue,
        };

        let other = if e1 == knight_entity {
            e2
        } else if e2 == knight_entity {
            e1
        } else {
            continue;
        };

        let Ok(surface) = q_surfaces.get(other) else {
            continue;
        };

        let before = velocity.linvel;
        velocity.linvel = match surface {
            Surface::Ground => ground_response(before, &config),
            Surface::Mud => mud_response(before, &config),
            Surface::Tent => tent_response(before, &config),
            Surface::Enemy => {
                squashed.write(EnemySquashed { entity: other });
                score.coins_earned += config.coins_per_enemy;
                enemy_response(before, &config)
            }
        };
    }
}
