//! Persistent player profile: coins, high score, and shop purchases.
//!
//! [`PlayerProfile`] is an explicitly constructed resource inserted at app
//! startup — there is no global singleton.  Gameplay systems call its
//! methods; file I/O happens only through [`load_profile`] / [`save_profile`]
//! so corrupt or missing files degrade to defaults instead of crashing.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

const PROFILE_VERSION: u32 = 1;

/// Items purchasable in the shop.
///
/// Only [`ShopItem::SmashShield`] has a wired gameplay effect (the mid-flight
/// downward smash); the rest are cosmetic catalog entries carried over from
/// the shop screen.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub enum ShopItem {
    GreasyShield,
    FeatherTunic,
    SpikedHelmet,
    BouncingBoots,
    HeavyArmor,
    SmashShield,
}

impl ShopItem {
    pub fn label(self) -> &'static str {
        match self {
            ShopItem::GreasyShield => "Greasy Shield",
            ShopItem::FeatherTunic => "Feather-light Tunic",
            ShopItem::SpikedHelmet => "Spiked Helmet",
            ShopItem::BouncingBoots => "Boots of Bouncing",
            ShopItem::HeavyArmor => "Heavy Armor",
            ShopItem::SmashShield => "Smash Shield",
        }
    }

    pub fn cost(self) -> u32 {
        match self {
            ShopItem::GreasyShield => 50,
            ShopItem::FeatherTunic => 100,
            ShopItem::SpikedHelmet => 150,
            ShopItem::BouncingBoots => 200,
            ShopItem::HeavyArmor => 250,
            ShopItem::SmashShield => 250,
        }
    }

    /// Catalog order shown in the shop (cheapest first, original ordering).
    pub const CATALOG: [ShopItem; 6] = [
        ShopItem::GreasyShield,
        ShopItem::FeatherTunic,
        ShopItem::SpikedHelmet,
        ShopItem::BouncingBoots,
        ShopItem::HeavyArmor,
        ShopItem::SmashShield,
    ];
}

/// Persistent player data, serialized to `saves/profile.toml`.
#[derive(Resource, Serialize, Deserialize, Debug, Clone)]
pub struct PlayerProfile {
    pub version: u32,
    coins: u32,
    high_score: u32,
    purchased: BTreeSet<ShopItem>,
}

impl Default for PlayerProfile {
    fn default() -> Self {
        Self {
            version: PROFILE_VERSION,
            coins: 0,
            high_score: 0,
            purchased: BTreeSet::new(),
        }
    }
}

impl PlayerProfile {
    pub fn coins(&self) -> u32 {
        self.coins
    }

    /// Add coins; zero-amount additions are ignored.
    pub fn add_coins(&mut self, amount: u32) {
        self.coins = self.coins.saturating_add(amount);
    }

    /// Spend coins if the balance covers `amount`; returns whether it did.
    pub fn spend_coins(&mut self, amount: u32) -> bool {
        if self.coins >= amount {
            self.coins -= amount;
            true
        } else {
            false
        }
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    /// Record `score` if it beats the stored high score; returns whether it did.
    pub fn update_high_score(&mut self, score: u32) -> bool {
        if score > self.high_score {
            self.high_score = score;
            true
        } else {
            false
        }
    }

    pub fn has_purchased(&self, item: ShopItem) -> bool {
        self.purchased.contains(&item)
    }

    /// Mark `item` as owned. Idempotent; does not touch the coin balance —
    /// callers pair this with [`Self::spend_coins`].
    pub fn purchase_item(&mut self, item: ShopItem) {
        self.purchased.insert(item);
    }
}

fn save_dir() -> PathBuf {
    PathBuf::from("saves")
}

/// Default on-disk location of the profile.
pub fn profile_path() -> PathBuf {
    save_dir().join("profile.toml")
}

/// Load a profile from `path`, returning defaults when the file is absent.
///
/// A present-but-unreadable file is an `Err` so the caller can log it; the
/// startup system falls back to defaults either way.
pub fn load_profile(path: &Path) -> Result<PlayerProfile, String> {
    if !path.exists() {
        return Ok(PlayerProfile::default());
    }
    let contents = fs::read_to_string(path)
        .map_err(|err| format!("failed to read {}: {err}", path.display()))?;
    toml::from_str(&contents)
        .map_err(|err| format!("failed to parse profile TOML: {err}"))
}

/// Serialize `profile` to `path`, creating the parent directory if needed.
pub fn save_profile(path: &Path, profile: &PlayerProfile) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|err| format!("failed to create save dir: {err}"))?;
    }
    let serialized = toml::to_string_pretty(profile)
        .map_err(|err| format!("failed to serialize profile TOML: {err}"))?;
    fs::write(path, serialized)
        .map_err(|err| format!("failed to write {}: {err}", path.display()))
}

/// Startup system: construct the [`PlayerProfile`] resource from disk.
pub fn load_player_profile(mut commands: Commands) {
    let path = profile_path();
    let profile = match load_profile(&path) {
        Ok(profile) => profile,
        Err(err) => {
            warn!("Could not load player profile: {err}; starting fresh");
            PlayerProfile::default()
        }
    };
    commands.insert_resource(profile);
}

/// Write the current profile to disk, logging rather than propagating errors.
pub fn persist_profile(profile: &PlayerProfile) {
    match save_profile(&profile_path(), profile) {
        Ok(()) => info!("Player profile saved"),
        Err(err) => error!("Failed to save player profile: {err}"),
    }
}
