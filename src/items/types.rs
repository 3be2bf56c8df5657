use serde::{Deserialize, Serialize};

use crate::character::stats::CombatTraits;

pub type ItemId = String;

/// Ordinal rarity tier shared by enemies and items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common = 0,
    Uncommon = 1,
    Rare = 2,
    Epic = 3,
    Legendary = 4,
    Boss = 5,
}

impl Rarity {
    /// Returns the display name for this rarity tier.
    pub fn name(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
            Rarity::Boss => "Boss",
        }
    }

    pub fn all() -> [Rarity; 6] {
        [
            Rarity::Common,
            Rarity::Uncommon,
            Rarity::Rare,
            Rarity::Epic,
            Rarity::Legendary,
            Rarity::Boss,
        ]
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// One value per rarity tier. Used for drop chances and turn costs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RarityTable<T> {
    pub common: T,
    pub uncommon: T,
    pub rare: T,
    pub epic: T,
    pub legendary: T,
    pub boss: T,
}

impl<T: Copy> RarityTable<T> {
    pub fn from_array(values: [T; 6]) -> Self {
        Self {
            common: values[0],
            uncommon: values[1],
            rare: values[2],
            epic: values[3],
            legendary: values[4],
            boss: values[5],
        }
    }

    pub fn get(&self, rarity: Rarity) -> T {
        match rarity {
            Rarity::Common => self.common,
            Rarity::Uncommon => self.uncommon,
            Rarity::Rare => self.rare,
            Rarity::Epic => self.epic,
            Rarity::Legendary => self.legendary,
            Rarity::Boss => self.boss,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemSlot {
    Weapon,
    Armor,
    Trinket,
}

/// Catalog entry for an item that can drop or be equipped.
///
/// `power` feeds `weapon_bonus` for weapons and `armor_bonus` for armor.
/// Trinkets contribute only through their traits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub id: ItemId,
    pub name: String,
    pub rarity: Rarity,
    pub slot: ItemSlot,
    #[serde(default)]
    pub power: u32,
    #[serde(default)]
    pub traits: CombatTraits,
}

/// An item owned by a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub item_id: ItemId,
    pub rarity: Rarity,
    #[serde(default)]
    pub equipped: bool,
}

impl InventoryItem {
    pub fn new(item_id: impl Into<ItemId>, rarity: Rarity) -> Self {
        Self {
            item_id: item_id.into(),
            rarity,
            equipped: false,
        }
    }
}
