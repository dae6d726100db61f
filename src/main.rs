use bevy::prelude::*;
use bevy::window::WindowResolution;
use bevy_rapier2d::prelude::*;

use knight_launcher::camera::CameraRigPlugin;
use knight_launcher::collision::CollisionResolverPlugin;
use knight_launcher::config::{self, GameConfig};
use knight_launcher::enemy::EnemyLocomotionPlugin;
use knight_launcher::hud::HudPlugin;
use knight_launcher::menu::MainMenuPlugin;
use knight_launcher::persistence;
use knight_launcher::player::LaunchControllerPlugin;
use knight_launcher::shop::ShopPlugin;
use knight_launcher::world::WorldStreamerPlugin;

/// Configure Rapier physics: pull everything down at the tuned gravity.
fn setup_physics_config(mut rapier: Query<&mut RapierConfiguration>, config: Res<GameConfig>) {
    for mut cfg in rapier.iter_mut() {
        cfg.gravity = Vec2::new(0.0, -config.gravity_y);
    }
}

fn main() {
    let mut app = App::new();
    app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Knight Launcher".into(),
                resolution: WindowResolution::new(800, 600),
                ..Default::default()
            }),
            ..Default::default()
        }))
        .insert_resource(ClearColor(Color::BLACK))
        // Compiled defaults first; load_game_config overwrites them from
        // assets/game.toml (if present) in the Startup schedule.
        .insert_resource(GameConfig::default())
        // pixels_per_meter(1.0) keeps world units 1:1 with the tuning
        // constants, which are expressed in pixels.
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(1.0))
        // MainMenuPlugin registers GameState before every run_if that reads it.
        .add_plugins(MainMenuPlugin)
        .add_plugins(ShopPlugin)
        .add_plugins(CameraRigPlugin)
        .add_plugins(WorldStreamerPlugin)
        .add_plugins(EnemyLocomotionPlugin)
        .add_plugins(CollisionResolverPlugin)
        .add_plugins(LaunchControllerPlugin)
        .add_plugins(HudPlugin)
        .add_systems(
            Startup,
            (
                // Load config first so every other startup system sees the
                // final values.
                config::load_game_config,
                persistence::load_player_profile.after(config::load_game_config),
                setup_physics_config.after(config::load_game_config),
            ),
        );
    // Pin the per-tick component order: flight → camera → streaming →
    // locomotion → collision.
    knight_launcher::configure_tick_order(&mut app);
    app.run();
}
