//! Launch-cycle systems: aiming, charging, flight scoring, rest detection,
//! the smash ability, and the full-run reset.
//!
//! ## Pipeline (runs in order every `Update` frame while Playing)
//!
//! 1. [`aim_and_charge_system`] — pre-launch input; performs the launch on
//!    release.
//! 2. [`follower_sync_system`] — keeps the camera anchor on the knight.
//! 3. [`flight_score_system`] — max-distance score + high-score feed.
//! 4. [`smash_system`] — mid-flight downward boost (if purchased).
//! 5. [`rest_detection_system`] — settle-gated stop; emits [`RunEnded`].
//! 6. [`run_payout_system`] — persists the profile after a run ends.
//! 7. [`reset_system`] — `Stopped` → fresh run.

use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

use crate::config::GameConfig;
use crate::constants::{AIM_ANGLE_MAX, AIM_ANGLE_MIN};
use crate::persistence::{persist_profile, PlayerProfile, ShopItem};
use crate::world::{
    despawn_all_world_entities, generate_definitions, EnemyDefIndex, ObstacleDefIndex,
    WorldDefs, WorldRng,
};

use super::state::{
    launch_origin, Ballista, FlightTimer, Knight, KnightFollower, LaunchControl, LaunchPhase,
    RunScore, SmashCharges,
};

/// Emitted once when the knight comes to rest; carries the final payout.
#[derive(Message, Debug, Clone, Copy)]
pub struct RunEnded {
    pub distance: u32,
    pub coins_awarded: u32,
}

/// Convert `(angle, power)` into the instantaneous launch velocity.
///
/// The angle convention is y-down-negative like the aim UI (-45° points
/// up-right), so the vertical component is negated for the y-up world.
pub fn launch_velocity(angle_deg: f32, power: f32, power_scale: f32) -> Vec2 {
    let radians = angle_deg.to_radians();
    let speed = power / power_scale;
    Vec2::new(speed * radians.cos(), -speed * radians.sin())
}

/// `OnEnter(Playing)`: spawn the ballista, the knight, and the follow anchor.
pub fn spawn_knight(mut commands: Commands, config: Res<GameConfig>) {
    let origin = launch_origin();

    commands.spawn((
        Ballista,
        Transform::from_xyz(origin.x, config.ground_y + 10.0, 0.2),
        GlobalTransform::default(),
        Visibility::default(),
    ));

    commands.spawn((
        Knight,
        RigidBody::Dynamic,
        Collider::cuboid(
            crate::constants::KNIGHT_HALF_WIDTH,
            crate::constants::KNIGHT_HALF_HEIGHT,
        ),
        Velocity::zero(),
        LockedAxes::ROTATION_LOCKED,
        Restitution::coefficient(crate::constants::KNIGHT_RESTITUTION),
        Friction::coefficient(crate::constants::KNIGHT_FRICTION),
        CollisionGroups::new(
            crate::world::GROUP_PLAYER,
            crate::world::GROUP_GROUND | crate::world::GROUP_OBSTACLE | crate::world::GROUP_ENEMY,
        ),
        ActiveEvents::COLLISION_EVENTS,
        Ccd { enabled: true },
        Transform::from_xyz(origin.x, origin.y, 0.3),
        GlobalTransform::default(),
        Visibility::default(),
    ));

    commands.spawn((
        KnightFollower,
        Transform::from_xyz(origin.x, origin.y, 0.0),
        GlobalTransform::default(),
    ));
}

/// Pre-launch input: arrows steer the aim, Space charges, release fires.
///
/// Does nothing once launched — there is no mid-flight aim or charge.
pub fn aim_and_charge_system(
    keys: Res<ButtonInput<KeyCode>>,
    mut phase: ResMut<LaunchPhase>,
    mut control: ResMut<LaunchControl>,
    mut timer: ResMut<FlightTimer>,
    mut charges: ResMut<SmashCharges>,
    profile: Res<PlayerProfile>,
    config: Res<GameConfig>,
    mut q_knight: Query<&mut Velocity, With<Knight>>,
) {
    match *phase {
        LaunchPhase::Aiming => {
            if keys.pressed(KeyCode::ArrowUp) {
                control.angle_deg =
                    (control.angle_deg - config.aim_angle_step).max(AIM_ANGLE_MIN);
            } else if keys.pressed(KeyCode::ArrowDown) {
                control.angle_deg =
                    (control.angle_deg + config.aim_angle_step).min(AIM_ANGLE_MAX);
            }

            if keys.just_pressed(KeyCode::Space) {
                control.power = 0.0;
                *phase = LaunchPhase::Charging;
            }
        }
        LaunchPhase::Charging => {
            if keys.pressed(KeyCode::Space) {
                control.power = (control.power + config.charge_rate).min(config.max_launch_power);
            } else {
                // Release fires: an instantaneous velocity set, not a force.
                let Ok(mut velocity) = q_knight.single_mut() else {
                    return;
                };
                velocity.linvel =
                    launch_velocity(control.angle_deg, control.power, config.launch_power_scale);
                timer.since_launch_secs = 0.0;
                charges.remaining = if profile.has_purchased(ShopItem::SmashShield) {
                    config.smash_charges_per_launch
                } else {
                    0
                };
                *phase = LaunchPhase::Launched;
                info!(
                    "Launched at {:.0}° with power {:.0}",
                    control.angle_deg, control.power
                );
            }
        }
        LaunchPhase::Launched | LaunchPhase::Stopped => {}
    }
}

/// While launched, pin the camera anchor to the knight's position.
pub fn follower_sync_system(
    phase: Res<LaunchPhase>,
    q_knight: Query<&Transform, With<Knight>>,
    mut q_follower: Query<&mut Transform, (With<KnightFollower>, Without<Knight>)>,
) {
    if *phase != LaunchPhase::Launched {
        return;
    }
    let Ok(knight) = q_knight.single() else {
        return;
    };
    let Ok(mut follower) = q_follower.single_mut() else {
        return;
    };
    follower.translation.x = knight.translation.x;
    follower.translation.y = knight.translation.y;
}

/// While launched, recompute the run score and feed the high score.
pub fn flight_score_system(
    phase: Res<LaunchPhase>,
    mut score: ResMut<RunScore>,
    mut profile: ResMut<PlayerProfile>,
    q_knight: Query<&Transform, With<Knight>>,
) {
    if *phase != LaunchPhase::Launched {
        return;
    }
    let Ok(transform) = q_knight.single() else {
        return;
    };

    let distance = (transform.translation.x - launch_origin().x).floor().max(0.0) as u32;
    if distance > score.max_distance {
        score.max_distance = distance;
        profile.update_high_score(distance);
    }
}

/// Mid-flight Space: smash downward, spending one charge.
///
/// Only available while the Smash Shield is owned; charges refill at launch.
pub fn smash_system(
    keys: Res<ButtonInput<KeyCode>>,
    phase: Res<LaunchPhase>,
    mut charges: ResMut<SmashCharges>,
    config: Res<GameConfig>,
    mut q_knight: Query<&mut Velocity, With<Knight>>,
) {
    if *phase != LaunchPhase::Launched || charges.remaining == 0 {
        return;
    }
    if !keys.just_pressed(KeyCode::Space) {
        return;
    }
    let Ok(mut velocity) = q_knight.single_mut() else {
        return;
    };
    velocity.linvel.y = -config.smash_boost_speed;
    charges.remaining -= 1;
}

/// While launched, declare rest once the knight is slow enough *and* the
/// settle delay has elapsed — a fresh vertical launch dips through near-zero
/// speed at its apex and must not count.
///
/// On the transition, banked coins are awarded and [`RunEnded`] is emitted.
pub fn rest_detection_system(
    time: Res<Time>,
    mut phase: ResMut<LaunchPhase>,
    mut timer: ResMut<FlightTimer>,
    score: Res<RunScore>,
    mut profile: ResMut<PlayerProfile>,
    config: Res<GameConfig>,
    q_knight: Query<&Velocity, With<Knight>>,
    mut run_ended: MessageWriter<RunEnded>,
) {
    if *phase != LaunchPhase::Launched {
        return;
    }
    timer.since_launch_secs += time.delta_secs();
    if timer.since_launch_secs < config.settle_delay_secs {
        return;
    }

    let Ok(velocity) = q_knight.single() else {
        return;
    };
    if velocity.linvel.length() >= config.rest_speed_threshold {
        return;
    }

    *phase = LaunchPhase::Stopped;

    let distance_coins = (score.max_distance as f32 / config.coins_per_distance) as u32;
    let payout = distance_coins + score.coins_earned;
    profile.add_coins(payout);
    run_ended.write(RunEnded {
        distance: score.max_distance,
        coins_awarded: payout,
    });
    info!(
        "Run over: distance {}, {} coins awarded",
        score.max_distance, payout
    );
}

/// Persist the profile once per finished run.
pub fn run_payout_system(
    mut run_ended: MessageReader<RunEnded>,
    profile: Res<PlayerProfile>,
) {
    for _ in run_ended.read() {
        persist_profile(&profile);
    }
}

/// In `Stopped`, Space starts a fresh run: launch state, knight pose, camera
/// scroll, and a newly generated world.
#[allow(clippy::too_many_arguments, clippy::type_complexity)]
pub fn reset_system(
    keys: Res<ButtonInput<KeyCode>>,
    mut commands: Commands,
    mut phase: ResMut<LaunchPhase>,
    mut control: ResMut<LaunchControl>,
    mut score: ResMut<RunScore>,
    mut timer: ResMut<FlightTimer>,
    mut charges: ResMut<SmashCharges>,
    mut defs: ResMut<WorldDefs>,
    mut rng: ResMut<WorldRng>,
    config: Res<GameConfig>,
    mut q_knight: Query<(&mut Transform, &mut Velocity), With<Knight>>,
    mut q_follower: Query<&mut Transform, (With<KnightFollower>, Without<Knight>)>,
    mut q_camera: Query<
        &mut Transform,
        (With<Camera2d>, Without<Knight>, Without<KnightFollower>),
    >,
    q_enemies: Query<Entity, With<EnemyDefIndex>>,
    q_obstacles: Query<Entity, With<ObstacleDefIndex>>,
) {
    if *phase != LaunchPhase::Stopped || !keys.just_pressed(KeyCode::Space) {
        return;
    }

    *control = LaunchControl::default();
    *score = RunScore::default();
    *timer = FlightTimer::default();
    *charges = SmashCharges::default();

    let origin = launch_origin();
    if let Ok((mut transform, mut velocity)) = q_knight.single_mut() {
        transform.translation.x = origin.x;
        transform.translation.y = origin.y;
        *velocity = Velocity::zero();
    }
    if let Ok(mut follower) = q_follower.single_mut() {
        follower.translation.x = origin.x;
        follower.translation.y = origin.y;
    }
    if let Ok(mut camera) = q_camera.single_mut() {
        camera.translation.x = crate::camera::CAMERA_START.x;
        camera.translation.y = crate::camera::CAMERA_START.y;
    }

    // The next draw from the run RNG reseeds the world layout.
    despawn_all_world_entities(&mut commands, &mut defs, &q_enemies, &q_obstacles);
    *defs = generate_definitions(&mut rng.0, &config);

    *phase = LaunchPhase::Aiming;
    info!("Run reset; fresh world generated");
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    fn control_app() -> App {
        let mut app = App::new();
        // TimePlugin is disabled so tests can drive the clock by hand.
        app.add_plugins(MinimalPlugins.build().disable::<bevy::time::TimePlugin>());
        app.init_resource::<Time>();
        app.add_message::<RunEnded>();
        app.insert_resource(GameConfig::default());
        app.insert_resource(LaunchPhase::default());
        app.insert_resource(LaunchControl::default());
        app.insert_resource(RunScore::default());
        app.insert_resource(FlightTimer::default());
        app.insert_resource(SmashCharges::default());
        app.insert_resource(PlayerProfile::default());
        app.insert_resource(ButtonInput::<KeyCode>::default());
        app
    }

    fn spawn_test_knight(app: &mut App) -> Entity {
        let origin = launch_origin();
        app.world_mut()
            .spawn((
                Knight,
                Velocity::zero(),
                Transform::from_xyz(origin.x, origin.y, 0.0),
            ))
            .id()
    }

    fn press(app: &mut App, key: KeyCode) {
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(key);
    }

    fn release(app: &mut App, key: KeyCode) {
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .release(key);
    }

    /// Ends the "frame" for the manually driven input resource.
    fn clear_input_edges(app: &mut App) {
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .clear();
    }

    #[test]
    fn launch_velocity_is_deterministic_and_matches_the_reference_values() {
        let a = launch_velocity(-45.0, 100.0, 300.0);
        let b = launch_velocity(-45.0, 100.0, 300.0);
        assert_eq!(a.x.to_bits(), b.x.to_bits());
        assert_eq!(a.y.to_bits(), b.y.to_bits());

        // power/k = 1/3 at 45°: both components ≈ 0.2357, vertical upward.
        assert!((a.x - 0.2357).abs() < 1e-3);
        assert!((a.y - 0.2357).abs() < 1e-3);
        assert!(a.y > 0.0, "negative aim angle must launch upward");
    }

    #[test]
    fn launch_velocity_respects_angle_extremes() {
        let up = launch_velocity(-90.0, 60.0, 1.0);
        assert!(up.x.abs() < 1e-4);
        assert!((up.y - 60.0).abs() < 1e-4);

        let flat = launch_velocity(0.0, 60.0, 1.0);
        assert!((flat.x - 60.0).abs() < 1e-4);
        assert!(flat.y.abs() < 1e-4);
    }

    #[test]
    fn aiming_clamps_the_angle_and_fire_starts_charging() {
        let mut app = control_app();
        app.add_systems(Update, aim_and_charge_system);
        spawn_test_knight(&mut app);

        // Hold ArrowUp far past the clamp.
        press(&mut app, KeyCode::ArrowUp);
        for _ in 0..200 {
            app.update();
        }
        assert_eq!(
            app.world().resource::<LaunchControl>().angle_deg,
            AIM_ANGLE_MIN
        );
        release(&mut app, KeyCode::ArrowUp);
        clear_input_edges(&mut app);

        press(&mut app, KeyCode::Space);
        app.update();
        assert_eq!(*app.world().resource::<LaunchPhase>(), LaunchPhase::Charging);
        assert_eq!(app.world().resource::<LaunchControl>().power, 0.0);
    }

    #[test]
    fn charging_clamps_power_and_release_launches() {
        let mut app = control_app();
        app.add_systems(Update, aim_and_charge_system);
        let knight = spawn_test_knight(&mut app);
        let config = GameConfig::default();

        press(&mut app, KeyCode::Space);
        app.update(); // Aiming → Charging on the press edge
        clear_input_edges(&mut app);
        press(&mut app, KeyCode::Space);
        for _ in 0..200 {
            app.update(); // power accumulates, clamped
        }
        assert_eq!(
            app.world().resource::<LaunchControl>().power,
            config.max_launch_power
        );
        assert_eq!(*app.world().resource::<LaunchPhase>(), LaunchPhase::Charging);

        release(&mut app, KeyCode::Space);
        app.update();

        assert_eq!(*app.world().resource::<LaunchPhase>(), LaunchPhase::Launched);
        let velocity = app.world().get::<Velocity>(knight).unwrap().linvel;
        let expected = launch_velocity(
            crate::constants::AIM_ANGLE_DEFAULT,
            config.max_launch_power,
            config.launch_power_scale,
        );
        assert!((velocity - expected).length() < 1e-4);
    }

    #[test]
    fn launch_grants_smash_charges_only_when_the_shield_is_owned() {
        let mut app = control_app();
        app.add_systems(Update, aim_and_charge_system);
        spawn_test_knight(&mut app);
        app.world_mut()
            .resource_mut::<PlayerProfile>()
            .purchase_item(ShopItem::SmashShield);

        press(&mut app, KeyCode::Space);
        app.update();
        clear_input_edges(&mut app);
        release(&mut app, KeyCode::Space);
        app.update();

        assert_eq!(*app.world().resource::<LaunchPhase>(), LaunchPhase::Launched);
        assert_eq!(
            app.world().resource::<SmashCharges>().remaining,
            GameConfig::default().smash_charges_per_launch
        );
    }

    #[test]
    fn smash_spends_one_charge_and_slams_downward() {
        let mut app = control_app();
        app.add_systems(Update, smash_system);
        let knight = spawn_test_knight(&mut app);
        app.insert_resource(LaunchPhase::Launched);
        app.insert_resource(SmashCharges { remaining: 1 });
        app.world_mut().get_mut::<Velocity>(knight).unwrap().linvel = Vec2::new(40.0, 25.0);

        press(&mut app, KeyCode::Space);
        app.update();

        let config = GameConfig::default();
        let velocity = app.world().get::<Velocity>(knight).unwrap().linvel;
        assert_eq!(velocity.y, -config.smash_boost_speed);
        assert_eq!(velocity.x, 40.0, "smash only rewrites the vertical axis");
        assert_eq!(app.world().resource::<SmashCharges>().remaining, 0);

        // A second press without charges does nothing.
        clear_input_edges(&mut app);
        press(&mut app, KeyCode::Space);
        app.update();
        assert_eq!(
            app.world().get::<Velocity>(knight).unwrap().linvel.y,
            -config.smash_boost_speed
        );
    }

    #[test]
    fn score_tracks_the_running_maximum_distance() {
        let mut app = control_app();
        app.add_systems(Update, flight_score_system);
        let knight = spawn_test_knight(&mut app);
        app.insert_resource(LaunchPhase::Launched);

        let positions = [350.5, 900.0, 600.0];
        let expected_max = [250, 800, 800];
        for (x, expected) in positions.iter().zip(expected_max) {
            app.world_mut()
                .get_mut::<Transform>(knight)
                .unwrap()
                .translation
                .x = *x;
            app.update();
            assert_eq!(app.world().resource::<RunScore>().max_distance, expected);
        }
        assert_eq!(app.world().resource::<PlayerProfile>().high_score(), 800);
    }

    #[test]
    fn rest_detection_requires_both_low_speed_and_the_settle_delay() {
        let mut app = control_app();
        app.add_systems(Update, rest_detection_system);
        let knight = spawn_test_knight(&mut app);
        app.insert_resource(LaunchPhase::Launched);

        // Drive the mock clock so each update advances ~0.2s.
        let speeds = [5.0, 2.0, 0.5, 0.05];
        for speed in speeds {
            app.world_mut().get_mut::<Velocity>(knight).unwrap().linvel = Vec2::new(speed, 0.0);
            app.world_mut()
                .resource_mut::<Time>()
                .advance_by(Duration::from_millis(200));
            app.update();

            if speed >= 0.1 {
                assert_eq!(
                    *app.world().resource::<LaunchPhase>(),
                    LaunchPhase::Launched,
                    "speed {speed} must not count as rest"
                );
            }
        }
        // Final tick: speed 0.05 with 0.8s elapsed ≥ 0.5s settle delay.
        assert_eq!(*app.world().resource::<LaunchPhase>(), LaunchPhase::Stopped);
    }

    #[test]
    fn rest_is_not_declared_during_the_settle_window() {
        let mut app = control_app();
        app.add_systems(Update, rest_detection_system);
        let knight = spawn_test_knight(&mut app);
        app.insert_resource(LaunchPhase::Launched);

        // Slow from the start (apex of a vertical launch), but well inside
        // the settle delay.
        app.world_mut().get_mut::<Velocity>(knight).unwrap().linvel = Vec2::new(0.0, 0.01);
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_millis(100));
        app.update();

        assert_eq!(*app.world().resource::<LaunchPhase>(), LaunchPhase::Launched);
    }

    #[test]
    fn stopping_awards_distance_and_banked_coins() {
        let mut app = control_app();
        app.add_systems(Update, rest_detection_system);
        let knight = spawn_test_knight(&mut app);
        app.insert_resource(LaunchPhase::Launched);
        app.insert_resource(RunScore {
            max_distance: 500,
            coins_earned: 10,
        });
        app.world_mut().get_mut::<Velocity>(knight).unwrap().linvel = Vec2::ZERO;

        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_secs(1));
        app.update();

        // 500 distance / 50 per coin = 10, plus 10 banked from squashes.
        assert_eq!(app.world().resource::<PlayerProfile>().coins(), 20);
    }

    #[test]
    fn reset_restores_launch_state_and_regenerates_the_world() {
        let mut app = control_app();
        app.add_systems(Update, reset_system);
        let knight = spawn_test_knight(&mut app);
        app.world_mut().spawn((
            KnightFollower,
            Transform::from_xyz(2000.0, 100.0, 0.0),
        ));

        app.insert_resource(LaunchPhase::Stopped);
        app.insert_resource(LaunchControl {
            angle_deg: -80.0,
            power: 60.0,
        });
        app.insert_resource(RunScore {
            max_distance: 1234,
            coins_earned: 5,
        });
        app.insert_resource(WorldDefs::default());
        app.insert_resource(WorldRng(StdRng::seed_from_u64(4)));
        app.world_mut()
            .get_mut::<Transform>(knight)
            .unwrap()
            .translation
            .x = 2000.0;

        press(&mut app, KeyCode::Space);
        app.update();

        assert_eq!(*app.world().resource::<LaunchPhase>(), LaunchPhase::Aiming);
        let control = app.world().resource::<LaunchControl>();
        assert_eq!(control.angle_deg, crate::constants::AIM_ANGLE_DEFAULT);
        assert_eq!(control.power, 0.0);
        assert_eq!(app.world().resource::<RunScore>().max_distance, 0);

        let origin = launch_origin();
        let transform = app.world().get::<Transform>(knight).unwrap();
        assert_eq!(transform.translation.x, origin.x);

        let defs = app.world().resource::<WorldDefs>();
        assert_eq!(defs.enemies.len(), GameConfig::default().enemy_count);
        assert!(defs.enemies.iter().all(|d| !d.spawned));
    }

    #[test]
    fn reset_is_ignored_outside_the_stopped_phase() {
        let mut app = control_app();
        app.add_systems(Update, reset_system);
        spawn_test_knight(&mut app);
        app.insert_resource(LaunchPhase::Launched);
        app.insert_resource(RunScore {
            max_distance: 700,
            coins_earned: 0,
        });
        app.insert_resource(WorldDefs::default());
        app.insert_resource(WorldRng(StdRng::seed_from_u64(4)));

        press(&mut app, KeyCode::Space);
        app.update();

        assert_eq!(*app.world().resource::<LaunchPhase>(), LaunchPhase::Launched);
        assert_eq!(app.world().resource::<RunScore>().max_distance, 700);
    }
}
