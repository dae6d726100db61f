//! Main-menu splash screen — `GameState` definition and `MainMenuPlugin`.
//!
//! ## States
//!
//! | State      | Description                              |
//! |------------|------------------------------------------|
//! | `MainMenu` | Initial state; splash screen shown       |
//! | `Shop`     | Upgrade shop; spend coins between runs   |
//! | `Playing`  | A run in progress; all game systems live |
//!
//! ## Systems (registered by `MainMenuPlugin`)
//!
//! | System               | Schedule               | Purpose                         |
//! |----------------------|------------------------|---------------------------------|
//! | `setup_main_menu`    | `OnEnter(MainMenu)`    | Spawn full-screen menu UI       |
//! | `cleanup_main_menu`  | `OnExit(MainMenu)`     | Despawn menu UI entities        |
//! | `menu_button_system` | `Update / in MainMenu` | Handle Start / Shop / Quit      |

use bevy::ecs::system::EntityCommands;
use bevy::prelude::*;

use crate::persistence::PlayerProfile;

// ── Game state ────────────────────────────────────────────────────────────────

/// Top-level application state machine.
///
/// Every run system runs under `.run_if(in_state(GameState::Playing))`, so
/// nothing simulates while a menu is on screen.
#[derive(States, Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum GameState {
    /// Main-menu splash screen; shown on startup.
    #[default]
    MainMenu,
    /// The upgrade shop.
    Shop,
    /// Active gameplay.
    Playing,
}

// ── Component markers ─────────────────────────────────────────────────────────

/// Root node of the main-menu UI; entire tree is despawned on `OnExit(MainMenu)`.
#[derive(Component)]
pub struct MainMenuRoot;

/// Tags the "Start Game" button.
#[derive(Component)]
pub struct MenuStartButton;

/// Tags the "Shop" button.
#[derive(Component)]
pub struct MenuShopButton;

/// Tags the "Quit" button.
#[derive(Component)]
pub struct MenuQuitButton;

// ── Plugin ────────────────────────────────────────────────────────────────────

/// Registers `GameState`, the menu UI setup/teardown, and the button handler.
///
/// This plugin must be added to the app **before** any plugin that calls
/// `.run_if(in_state(GameState::Playing))`, so the state is always registered
/// first.
pub struct MainMenuPlugin;

impl Plugin for MainMenuPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .add_systems(OnEnter(GameState::MainMenu), setup_main_menu)
            .add_systems(OnExit(GameState::MainMenu), cleanup_main_menu)
            .add_systems(
                Update,
                menu_button_system.run_if(in_state(GameState::MainMenu)),
            );
    }
}

// ── Colour helpers ────────────────────────────────────────────────────────────

fn start_bg() -> Color {
    Color::srgb(0.08, 0.36, 0.14)
}
fn start_border() -> Color {
    Color::srgb(0.18, 0.72, 0.28)
}
fn start_text() -> Color {
    Color::srgb(0.75, 1.0, 0.80)
}
fn shop_bg() -> Color {
    Color::srgb(0.26, 0.20, 0.04)
}
fn shop_border() -> Color {
    Color::srgb(0.72, 0.58, 0.14)
}
fn shop_text() -> Color {
    Color::srgb(1.0, 0.90, 0.55)
}
fn quit_bg() -> Color {
    Color::srgb(0.28, 0.06, 0.06)
}
fn quit_border() -> Color {
    Color::srgb(0.60, 0.12, 0.12)
}
fn quit_text() -> Color {
    Color::srgb(1.0, 0.65, 0.65)
}
fn title_color() -> Color {
    Color::srgb(0.95, 0.88, 0.45)
}
fn subtitle_color() -> Color {
    Color::srgb(0.55, 0.55, 0.65)
}
fn hint_color() -> Color {
    Color::srgb(0.28, 0.28, 0.35)
}

// ── OnEnter(MainMenu): spawn UI ───────────────────────────────────────────────

/// Spawn the full-screen main-menu overlay.
///
/// Layout:
/// ```text
/// ┌─────────────────────────────────────────────┐
/// │            KNIGHT LAUNCHER                  │
/// │     Launch, bounce, and roll for coins      │
/// │                                             │
/// │            [ START GAME ]                   │
/// │               [ SHOP ]                      │
/// │               [ QUIT ]                      │
/// │                                             │
/// │        High score: 1234  ·  Coins: 56       │
/// └─────────────────────────────────────────────┘
/// ```
pub fn setup_main_menu(mut commands: Commands, profile: Res<PlayerProfile>) {
    // ── Full-screen background ────────────────────────────────────────────────
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                flex_direction: FlexDirection::Column,
                ..default()
            },
            BackgroundColor(Color::BLACK),
            MainMenuRoot,
        ))
        .with_children(|root| {
            // ── Title ─────────────────────────────────────────────────────────
            root.spawn((
                Text::new("KNIGHT LAUNCHER"),
                TextFont {
                    font_size: 56.0,
                    ..default()
                },
                TextColor(title_color()),
            ));

            spacer(root, 10.0);

            // ── Subtitle ──────────────────────────────────────────────────────
            root.spawn((
                Text::new("Launch, bounce, and roll for coins"),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(subtitle_color()),
            ));

            spacer(root, 52.0);

            menu_button(root, "START GAME", start_bg(), start_border(), start_text())
                .insert(MenuStartButton);
            spacer(root, 14.0);
            menu_button(root, "SHOP", shop_bg(), shop_border(), shop_text())
                .insert(MenuShopButton);
            spacer(root, 14.0);
            menu_button(root, "QUIT", quit_bg(), quit_border(), quit_text())
                .insert(MenuQuitButton);

            spacer(root, 52.0);

            // ── Profile footnote ──────────────────────────────────────────────
            root.spawn((
                Text::new(format!(
                    "High score: {}  ·  Coins: {}",
                    profile.high_score(),
                    profile.coins()
                )),
                TextFont {
                    font_size: 12.0,
                    ..default()
                },
                TextColor(hint_color()),
            ));
        });
}

/// Spawn a fixed-height invisible spacer node.
fn spacer(parent: &mut ChildSpawnerCommands<'_>, px: f32) {
    parent.spawn(Node {
        height: Val::Px(px),
        ..default()
    });
}

/// Spawn a standard menu button with a text child; the caller tags it.
fn menu_button<'a>(
    parent: &'a mut ChildSpawnerCommands<'_>,
    label: &str,
    bg: Color,
    border: Color,
    text: Color,
) -> EntityCommands<'a> {
    let mut button = parent.spawn((
        Button,
        Node {
            width: Val::Px(220.0),
            height: Val::Px(50.0),
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            border: UiRect::all(Val::Px(2.0)),
            ..default()
        },
        BackgroundColor(bg),
        BorderColor::all(border),
    ));
    button.with_children(|btn| {
        btn.spawn((
            Text::new(label.to_owned()),
            TextFont {
                font_size: 18.0,
                ..default()
            },
            TextColor(text),
        ));
    });
    button
}

// ── OnExit(MainMenu): despawn UI ──────────────────────────────────────────────

/// Recursively despawn all main-menu entities.
pub fn cleanup_main_menu(mut commands: Commands, query: Query<Entity, With<MainMenuRoot>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn();
    }
}

// ── Update (MainMenu only): button interaction ────────────────────────────────

/// Handle Start, Shop, and Quit button presses.
///
/// - **Start Game** → transitions to [`GameState::Playing`], which triggers
///   `OnEnter(Playing)` to spawn the world and the knight.
/// - **Shop** → transitions to [`GameState::Shop`].
/// - **Quit** → sends [`bevy::app::AppExit`] to gracefully shut down.
#[allow(clippy::type_complexity)]
pub fn menu_button_system(
    start_query: Query<(&Interaction, &Children), (Changed<Interaction>, With<MenuStartButton>)>,
    shop_query: Query<(&Interaction, &Children), (Changed<Interaction>, With<MenuShopButton>)>,
    quit_query: Query<(&Interaction, &Children), (Changed<Interaction>, With<MenuQuitButton>)>,
    mut btn_text: Query<&mut TextColor>,
    mut next_state: ResMut<NextState<GameState>>,
    mut exit: MessageWriter<bevy::app::AppExit>,
) {
    for (interaction, children) in start_query.iter() {
        // Tint button text on hover; trigger on press
        match interaction {
            Interaction::Pressed => {
                next_state.set(GameState::Playing);
            }
            Interaction::Hovered => tint_children(children, &mut btn_text, Color::WHITE),
            Interaction::None => tint_children(children, &mut btn_text, start_text()),
        }
    }

    for (interaction, children) in shop_query.iter() {
        match interaction {
            Interaction::Pressed => {
                next_state.set(GameState::Shop);
            }
            Interaction::Hovered => tint_children(children, &mut btn_text, Color::WHITE),
            Interaction::None => tint_children(children, &mut btn_text, shop_text()),
        }
    }

    for (interaction, children) in quit_query.iter() {
        match interaction {
            Interaction::Pressed => {
                exit.write(bevy::app::AppExit::Success);
            }
            Interaction::Hovered => tint_children(children, &mut btn_text, Color::WHITE),
            Interaction::None => tint_children(children, &mut btn_text, quit_text()),
        }
    }
}

fn tint_children(children: &Children, btn_text: &mut Query<&mut TextColor>, color: Color) {
    for child in children.iter() {
        if let Ok(mut text_color) = btn_text.get_mut(child) {
            *text_color = TextColor(color);
        }
    }
}
