//! The upgrade shop: one row per catalog item, a coin balance readout, and a
//! Back button.
//!
//! Purchase rules live in [`try_purchase`]; the UI systems only translate
//! clicks into calls and re-tint rows when the profile changes, so the rules
//! are testable without a render loop.

use bevy::prelude::*;

use crate::menu::GameState;
use crate::persistence::{persist_profile, PlayerProfile, ShopItem};

// ── Component markers ─────────────────────────────────────────────────────────

/// Root node of the shop UI; the tree is despawned on `OnExit(Shop)`.
#[derive(Component)]
pub struct ShopRoot;

/// Tags the coin-balance readout.
#[derive(Component)]
pub struct ShopCoinsText;

/// A purchase button for one catalog item.
#[derive(Component, Debug, Clone, Copy)]
pub struct BuyButton(pub ShopItem);

/// Tags the "Back" button.
#[derive(Component)]
pub struct ShopBackButton;

// ── Purchase rules ────────────────────────────────────────────────────────────

/// Attempt to buy `item`: rejected when already owned or unaffordable.
/// On success the cost is deducted and the item recorded.
pub fn try_purchase(profile: &mut PlayerProfile, item: ShopItem) -> bool {
    if profile.has_purchased(item) {
        return false;
    }
    if !profile.spend_coins(item.cost()) {
        return false;
    }
    profile.purchase_item(item);
    true
}

// ── Plugin ────────────────────────────────────────────────────────────────────

pub struct ShopPlugin;

impl Plugin for ShopPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Shop), setup_shop)
            .add_systems(OnExit(GameState::Shop), cleanup_shop)
            .add_systems(
                Update,
                (shop_button_system, sync_shop_ui_system)
                    .chain()
                    .run_if(in_state(GameState::Shop)),
            );
    }
}

// ── Colour helpers ────────────────────────────────────────────────────────────

fn buy_bg() -> Color {
    Color::srgb(0.08, 0.26, 0.36)
}
fn buy_border() -> Color {
    Color::srgb(0.18, 0.52, 0.72)
}
fn owned_bg() -> Color {
    Color::srgb(0.16, 0.16, 0.18)
}
fn row_text() -> Color {
    Color::srgb(0.85, 0.85, 0.90)
}
fn coins_color() -> Color {
    Color::srgb(0.95, 0.88, 0.45)
}
fn back_bg() -> Color {
    Color::srgb(0.28, 0.06, 0.06)
}
fn back_border() -> Color {
    Color::srgb(0.60, 0.12, 0.12)
}

// ── OnEnter(Shop): spawn UI ───────────────────────────────────────────────────

/// Spawn the shop overlay: title, coin balance, one row per catalog item,
/// and the Back button.
pub fn setup_shop(mut commands: Commands, profile: Res<PlayerProfile>) {
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
            ShopRoot,
        ))
        .with_children(|root| {
            root.spawn((
                Text::new("SHOP"),
                TextFont {
                    font_size: 44.0,
                    ..default()
                },
                TextColor(coins_color()),
            ));

            root.spawn((
                Text::new(format!("Coins: {}", profile.coins())),
                TextFont {
                    font_size: 20.0,
                    ..default()
                },
                TextColor(coins_color()),
                ShopCoinsText,
            ));

            for item in ShopItem::CATALOG {
                shop_row(root, item, &profile);
            }

            root.spawn((
                Button,
                Node {
                    width: Val::Px(160.0),
                    height: Val::Px(44.0),
                    justify_content: JustifyContent::Center,
                    align_items: AlignItems::Center,
                    border: UiRect::all(Val::Px(2.0)),
                    margin: UiRect::top(Val::Px(24.0)),
                    ..default()
                },
                BackgroundColor(back_bg()),
                BorderColor::all(back_border()),
                ShopBackButton,
            ))
            .with_children(|btn| {
                btn.spawn((
                    Text::new("BACK"),
                    TextFont {
                        font_size: 18.0,
                        ..default()
                    },
                    TextColor(row_text()),
                ));
            });
        });
}

/// One catalog row: `label · cost` beside its buy button.
fn shop_row(parent: &mut ChildSpawnerCommands<'_>, item: ShopItem, profile: &PlayerProfile) {
    let owned = profile.has_purchased(item);
    parent
        .spawn(Node {
            width: Val::Px(420.0),
            height: Val::Px(46.0),
            justify_content: JustifyContent::SpaceBetween,
            align_items: AlignItems::Center,
            margin: UiRect::top(Val::Px(8.0)),
            ..default()
        })
        .with_children(|row| {
            row.spawn((
                Text::new(format!("{}  ·  {} coins", item.label(), item.cost())),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(row_text()),
            ));

            row.spawn((
                Button,
                Node {
                    width: Val::Px(90.0),
                    height: Val::Px(36.0),
                    justify_content: JustifyContent::Center,
                    align_items: AlignItems::Center,
                    border: UiRect::all(Val::Px(2.0)),
                    ..default()
                },
                BackgroundColor(if owned { owned_bg() } else { buy_bg() }),
                BorderColor::all(buy_border()),
                BuyButton(item),
            ))
            .with_children(|btn| {
                btn.spawn((
                    Text::new(if owned { "OWNED" } else { "BUY" }),
                    TextFont {
                        font_size: 14.0,
                        ..default()
                    },
                    TextColor(row_text()),
                ));
            });
        });
}

// ── OnExit(Shop): despawn UI ──────────────────────────────────────────────────

pub fn cleanup_shop(mut commands: Commands, query: Query<Entity, With<ShopRoot>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn();
    }
}

// ── Update (Shop only): interaction + profile sync ────────────────────────────

/// Handle Buy and Back presses.  A successful purchase is persisted at once
/// so closing the game from the shop never loses it.
pub fn shop_button_system(
    buy_query: Query<(&Interaction, &BuyButton), Changed<Interaction>>,
    back_query: Query<&Interaction, (Changed<Interaction>, With<ShopBackButton>)>,
    mut profile: ResMut<PlayerProfile>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    for (interaction, buy) in buy_query.iter() {
        if *interaction != Interaction::Pressed {
            continue;
        }
        if try_purchase(&mut profile, buy.0) {
            info!("Purchased {} for {} coins", buy.0.label(), buy.0.cost());
            persist_profile(&profile);
        }
    }

    for interaction in back_query.iter() {
        if *interaction == Interaction::Pressed {
            next_state.set(GameState::MainMenu);
        }
    }
}

/// Re-tint the shop after any profile change: coin readout, and each buy
/// button flips to OWNED once purchased.
pub fn sync_shop_ui_system(
    profile: Res<PlayerProfile>,
    mut coins_query: Query<&mut Text, With<ShopCoinsText>>,
    mut buy_query: Query<(&BuyButton, &Children, &mut BackgroundColor), With<Button>>,
    mut labels: Query<&mut Text, Without<ShopCoinsText>>,
) {
    if !profile.is_changed() {
        return;
    }

    for mut text in coins_query.iter_mut() {
        *text = Text::new(format!("Coins: {}", profile.coins()));
    }

    for (buy, children, mut background) in buy_query.iter_mut() {
        if !profile.has_purchased(buy.0) {
            continue;
        }
        *background = BackgroundColor(owned_bg());
        for child in children.iter() {
            if let Ok(mut text) = labels.get_mut(child) {
                *text = Text::new("OWNED");
            }
        }
    }
}
