//! In-run HUD and wireframe overlay.
//!
//! | Element             | Mechanism | Visibility                     |
//! |---------------------|-----------|--------------------------------|
//! | Score / high score  | UI text   | always while Playing           |
//! | Power bar           | UI node   | always; fills while charging   |
//! | Smash charges       | UI text   | always; counts remaining uses  |
//! | Reset hint          | UI text   | only in the `Stopped` phase    |
//! | Aim indicator       | Gizmos    | `Aiming` / `Charging` phases   |
//! | World wireframes    | Gizmos    | always while Playing           |

use bevy::prelude::*;

use crate::config::GameConfig;
use crate::constants::{HUD_FONT_SIZE, POWER_BAR_WIDTH};
use crate::menu::GameState;
use crate::persistence::PlayerProfile;
use crate::player::state::{
    launch_origin, Knight, LaunchControl, LaunchPhase, RunScore, SmashCharges,
};
use crate::world::{EnemyKnight, ObstacleDefIndex};

// ── Component markers ─────────────────────────────────────────────────────────

/// Root node of the HUD; despawned on `OnExit(Playing)`.
#[derive(Component)]
pub struct HudRoot;

#[derive(Component)]
pub struct ScoreText;

#[derive(Component)]
pub struct SmashText;

#[derive(Component)]
pub struct ResetHintText;

/// The filled portion of the power bar; its width tracks the charge.
#[derive(Component)]
pub struct PowerBarFill;

// ── Plugin ────────────────────────────────────────────────────────────────────

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Playing), setup_hud)
            .add_systems(OnExit(GameState::Playing), cleanup_hud)
            .add_systems(
                Update,
                (
                    update_score_text_system,
                    update_power_bar_system,
                    update_smash_text_system,
                    update_reset_hint_system,
                    aim_indicator_system,
                    world_wireframe_system,
                )
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

// ── Pure helpers ──────────────────────────────────────────────────────────────

/// Pixel width of the power-bar fill for the current charge.
pub fn power_bar_fill_px(power: f32, max_power: f32, bar_width: f32) -> f32 {
    if max_power <= 0.0 {
        return 0.0;
    }
    (power / max_power).clamp(0.0, 1.0) * bar_width
}

/// Unit direction of the aim line for a y-down-negative angle in degrees.
pub fn aim_direction(angle_deg: f32) -> Vec2 {
    let radians = angle_deg.to_radians();
    Vec2::new(radians.cos(), -radians.sin())
}

/// Wireframe footprint and colour for an obstacle's surface.
///
/// `None` for surfaces that never appear on obstacle instances; the match is
/// exhaustive so a new surface kind must choose a wireframe here.
pub fn obstacle_wireframe(surface: crate::collision::Surface) -> Option<(Vec2, Color)> {
    use crate::collision::Surface;
    use crate::world::ObstacleKind;
    match surface {
        Surface::Tent => Some((
            ObstacleKind::Tent.half_extents(),
            Color::srgb(0.30, 0.70, 0.35),
        )),
        Surface::Mud => Some((
            ObstacleKind::Mud.half_extents(),
            Color::srgb(0.45, 0.35, 0.20),
        )),
        Surface::Ground | Surface::Enemy => None,
    }
}

// ── OnEnter(Playing): spawn UI ────────────────────────────────────────────────

pub fn setup_hud(mut commands: Commands, profile: Res<PlayerProfile>) {
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                padding: UiRect::all(Val::Px(12.0)),
                ..default()
            },
            HudRoot,
        ))
        .with_children(|root| {
            root.spawn((
                Text::new(format!("Distance: 0   Best: {}", profile.high_score())),
                TextFont {
                    font_size: HUD_FONT_SIZE,
                    ..default()
                },
                TextColor(Color::srgb(0.95, 0.88, 0.45)),
                ScoreText,
            ));

            root.spawn((
                Text::new("Smash: -"),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(0.55, 0.75, 0.95)),
                SmashText,
            ));

            // Power bar: a bordered trough with a fill child.
            root.spawn((
                Node {
                    width: Val::Px(POWER_BAR_WIDTH),
                    height: Val::Px(14.0),
                    border: UiRect::all(Val::Px(1.0)),
                    margin: UiRect::top(Val::Px(6.0)),
                    ..default()
                },
                BackgroundColor(Color::srgb(0.10, 0.10, 0.12)),
                BorderColor::all(Color::srgb(0.45, 0.45, 0.50)),
            ))
            .with_children(|bar| {
                bar.spawn((
                    Node {
                        width: Val::Px(0.0),
                        height: Val::Percent(100.0),
                        ..default()
                    },
                    BackgroundColor(Color::srgb(0.85, 0.30, 0.20)),
                    PowerBarFill,
                ));
            });

            root.spawn((
                Text::new("Press SPACE to launch again"),
                TextFont {
                    font_size: 20.0,
                    ..default()
                },
                TextColor(Color::srgb(0.75, 1.0, 0.80)),
                Visibility::Hidden,
                ResetHintText,
            ));
        });
}

pub fn cleanup_hud(mut commands: Commands, query: Query<Entity, With<HudRoot>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn();
    }
}

// ── Update (Playing only) ─────────────────────────────────────────────────────

pub fn update_score_text_system(
    score: Res<RunScore>,
    profile: Res<PlayerProfile>,
    mut query: Query<&mut Text, With<ScoreText>>,
) {
    if !score.is_changed() && !profile.is_changed() {
        return;
    }
    for mut text in query.iter_mut() {
        *text = Text::new(format!(
            "Distance: {}   Best: {}",
            score.max_distance,
            profile.high_score()
        ));
    }
}

pub fn update_power_bar_system(
    control: Res<LaunchControl>,
    config: Res<GameConfig>,
    mut query: Query<&mut Node, With<PowerBarFill>>,
) {
    for mut node in query.iter_mut() {
        node.width = Val::Px(power_bar_fill_px(
            control.power,
            config.max_launch_power,
            POWER_BAR_WIDTH,
        ));
    }
}

pub fn update_smash_text_system(
    charges: Res<SmashCharges>,
    mut query: Query<&mut Text, With<SmashText>>,
) {
    if !charges.is_changed() {
        return;
    }
    for mut text in query.iter_mut() {
        *text = Text::new(format!("Smash: {}", charges.remaining));
    }
}

/// Show the reset hint only while the run is over.
pub fn update_reset_hint_system(
    phase: Res<LaunchPhase>,
    mut query: Query<&mut Visibility, With<ResetHintText>>,
) {
    for mut visibility in query.iter_mut() {
        *visibility = if *phase == LaunchPhase::Stopped {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };
    }
}

/// Draw the aim line from the launch origin; longer while charging.
pub fn aim_indicator_system(
    mut gizmos: Gizmos,
    phase: Res<LaunchPhase>,
    control: Res<LaunchControl>,
) {
    if !matches!(*phase, LaunchPhase::Aiming | LaunchPhase::Charging) {
        return;
    }
    let origin = launch_origin();
    let length = 60.0 + control.power;
    gizmos.line_2d(
        origin,
        origin + aim_direction(control.angle_deg) * length,
        Color::srgb(0.95, 0.88, 0.45),
    );
}

/// Wireframe rectangles for the knight, enemies, and obstacles.
#[allow(clippy::type_complexity)]
pub fn world_wireframe_system(
    mut gizmos: Gizmos,
    q_knight: Query<&Transform, With<Knight>>,
    q_enemies: Query<&Transform, (With<EnemyKnight>, Without<Knight>)>,
    q_obstacles: Query<(&Transform, &crate::collision::Surface), With<ObstacleDefIndex>>,
    config: Res<GameConfig>,
) {
    if let Ok(knight) = q_knight.single() {
        gizmos.rect_2d(
            Isometry2d::from_translation(knight.translation.truncate()),
            Vec2::new(
                crate::constants::KNIGHT_HALF_WIDTH * 2.0,
                crate::constants::KNIGHT_HALF_HEIGHT * 2.0,
            ),
            Color::WHITE,
        );
    }

    for transform in q_enemies.iter() {
        gizmos.rect_2d(
            Isometry2d::from_translation(transform.translation.truncate()),
            Vec2::splat(crate::enemy::ENEMY_HALF_EXTENT * 2.0),
            Color::srgb(0.85, 0.30, 0.20),
        );
    }

    for (transform, surface) in q_obstacles.iter() {
        let Some((half, color)) = obstacle_wireframe(*surface) else {
            continue;
        };
        gizmos.rect_2d(
            Isometry2d::from_translation(transform.translation.truncate()),
            half * 2.0,
            color,
        );
    }

    // Ground line across the world.
    gizmos.line_2d(
        Vec2::new(0.0, config.ground_y),
        Vec2::new(config.world_width, config.ground_y),
        Color::srgb(0.40, 0.40, 0.45),
    );
}
