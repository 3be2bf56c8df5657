//! Persisted player record.
//!
//! This is the plain-data layout the external store owns. The engine takes a
//! record when a session starts and hands the updated record back when the
//! session terminates.
//!
//! IMPORTANT: When adding new fields, use `#[serde(default)]` so records
//! written by older hosts still load.

use serde::{Deserialize, Serialize};

use super::leveling::{apply_experience, LevelProgress, LevelUpOutcome};
use super::stats::{CombatTraits, Combatant};
use crate::combat::turns::TurnBudget;
use crate::core::config::{EngineConfig, LevelGrowth};
use crate::core::constants::{STARTING_CHARM, STARTING_DEFENSE, STARTING_HEALTH, STARTING_STRENGTH};
use crate::core::error::{EngineError, Result};
use crate::items::inventory::Inventory;
use crate::items::types::{InventoryItem, ItemDefinition, ItemSlot};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: String,
    pub name: String,
    pub health: u32,
    pub max_health: u32,
    pub level: u32,
    pub experience: u64,
    pub experience_to_next_level: u64,
    pub strength: u32,
    pub defense: u32,
    pub charm: u32,
    pub gold: u64,
    pub turns_remaining: u32,
    pub max_turns: u32,
    #[serde(default)]
    pub inventory: Vec<InventoryItem>,
    #[serde(default)]
    pub pending_drop: Option<InventoryItem>,
    #[serde(default)]
    pub death_count: u32,
}

impl PlayerRecord {
    /// A fresh level-1 character.
    pub fn new(id: impl Into<String>, name: impl Into<String>, config: &EngineConfig) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            health: STARTING_HEALTH,
            max_health: STARTING_HEALTH,
            level: 1,
            experience: 0,
            experience_to_next_level: config.leveling.starting_xp_to_next_level,
            strength: STARTING_STRENGTH,
            defense: STARTING_DEFENSE,
            charm: STARTING_CHARM,
            gold: 0,
            turns_remaining: config.turns.default_max_turns,
            max_turns: config.turns.default_max_turns,
            inventory: Vec::new(),
            pending_drop: None,
            death_count: 0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn turn_budget(&self) -> TurnBudget {
        TurnBudget::new(self.turns_remaining, self.max_turns)
    }

    pub fn set_turn_budget(&mut self, budget: TurnBudget) {
        self.turns_remaining = budget.remaining.min(budget.max);
        self.max_turns = budget.max;
    }

    pub fn level_progress(&self) -> LevelProgress {
        LevelProgress {
            level: self.level,
            experience: self.experience,
            experience_to_next_level: self.experience_to_next_level,
        }
    }

    pub fn inventory(&self, max_slots: usize) -> Inventory {
        Inventory {
            items: self.inventory.clone(),
            max_slots,
            pending: self.pending_drop.clone(),
        }
    }

    pub fn set_inventory(&mut self, inventory: Inventory) {
        self.inventory = inventory.items;
        self.pending_drop = inventory.pending;
    }

    /// Adds experience, applying stat growth for every level gained.
    ///
    /// A level-up restores health to the new maximum.
    pub fn gain_experience(&self, gained: u64, growth: &LevelGrowth) -> (PlayerRecord, LevelUpOutcome) {
        let outcome = apply_experience(self.level_progress(), gained, growth);
        let mut next = self.clone();
        next.level = outcome.progress.level;
        next.experience = outcome.progress.experience;
        next.experience_to_next_level = outcome.progress.experience_to_next_level;

        if outcome.level_ups > 0 {
            next.max_health = next.max_health.saturating_add(outcome.gains.max_health);
            next.strength = next.strength.saturating_add(outcome.gains.strength);
            next.defense = next.defense.saturating_add(outcome.gains.defense);
            next.charm = next.charm.saturating_add(outcome.gains.charm);
            next.health = next.max_health;
        }
        (next, outcome)
    }

    /// Builds the combat snapshot, folding equipped items into bonuses and traits.
    pub fn to_combatant(&self, catalog: &[ItemDefinition]) -> Result<Combatant> {
        let mut combatant = Combatant {
            id: self.id.clone(),
            name: self.name.clone(),
            level: self.level,
            health: self.health.min(self.max_health),
            max_health: self.max_health,
            strength: self.strength,
            defense: self.defense,
            charm: self.charm,
            weapon_bonus: 0,
            armor_bonus: 0,
            traits: CombatTraits::default(),
            status_effects: Default::default(),
        };

        for owned in self.inventory.iter().filter(|i| i.equipped) {
            let definition = catalog
                .iter()
                .find(|d| d.id == owned.item_id)
                .ok_or_else(|| EngineError::UnknownItem(owned.item_id.clone()))?;
            match definition.slot {
                ItemSlot::Weapon => {
                    combatant.weapon_bonus = combatant.weapon_bonus.saturating_add(definition.power)
                }
                ItemSlot::Armor => combatant.armor_bonus = combatant.armor_bonus.saturating_add(definition.power),
                ItemSlot::Trinket => {}
            }
            combatant.traits = combatant.traits.combine(&definition.traits);
        }

        Ok(combatant)
    }

    /// Writes health from a finished battle back into the record.
    pub fn absorb_health(&mut self, combatant: &Combatant) {
        self.health = combatant.health.min(self.max_health);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::default_content;
    use crate::items::types::Rarity;

    fn hero() -> PlayerRecord {
        PlayerRecord::new("hero-1", "Hero", &EngineConfig::default())
    }

    #[test]
    fn test_new_record_defaults() {
        let record = hero();
        assert_eq!(record.level, 1);
        assert_eq!(record.health, record.max_health);
        assert_eq!(record.turns_remaining, record.max_turns);
        assert_eq!(record.experience_to_next_level, 100);
    }

    #[test]
    fn test_gain_experience_applies_growth_and_heals() {
        let mut record = hero();
        record.health = 10;
        let growth = LevelGrowth::default();
        let (next, outcome) = record.gain_experience(100, &growth);
        assert_eq!(outcome.level_ups, 1);
        assert_eq!(next.level, 2);
        assert_eq!(next.max_health, record.max_health + growth.max_health);
        assert_eq!(next.strength, record.strength + growth.strength);
        assert_eq!(next.health, next.max_health);
    }

    #[test]
    fn test_gain_experience_without_level_keeps_health() {
        let mut record = hero();
        record.health = 10;
        let (next, _) = record.gain_experience(5, &LevelGrowth::default());
        assert_eq!(next.health, 10);
        assert_eq!(next.experience, 5);
    }

    #[test]
    fn test_equipped_items_become_bonuses() {
        let tables = default_content();
        let mut record = hero();
        let mut sword = InventoryItem::new("iron_sword", Rarity::Common);
        sword.equipped = true;
        let mut mail = InventoryItem::new("chain_mail", Rarity::Uncommon);
        mail.equipped = true;
        let bag_item = InventoryItem::new("vampiric_fang", Rarity::Rare);
        record.inventory = vec![sword, mail, bag_item];

        let combatant = record.to_combatant(&tables.items).unwrap();
        let sword_def = tables.item("iron_sword").unwrap();
        let mail_def = tables.item("chain_mail").unwrap();
        assert_eq!(combatant.weapon_bonus, sword_def.power);
        assert_eq!(combatant.armor_bonus, mail_def.power);
        assert_eq!(combatant.traits.healing_on_hit, 0, "unequipped fang must not count");
    }

    #[test]
    fn test_unknown_equipped_item_is_error() {
        let mut record = hero();
        let mut ghost = InventoryItem::new("ghost", Rarity::Common);
        ghost.equipped = true;
        record.inventory.push(ghost);
        assert_eq!(
            record.to_combatant(&[]).unwrap_err(),
            EngineError::UnknownItem("ghost".to_string())
        );
    }

    #[test]
    fn test_record_round_trips_inventory_view() {
        let mut record = hero();
        let mut inventory = record.inventory(1);
        inventory.receive(InventoryItem::new("a", Rarity::Common));
        inventory.receive(InventoryItem::new("b", Rarity::Common));
        record.set_inventory(inventory);
        assert_eq!(record.inventory.len(), 1);
        assert!(record.pending_drop.is_some());
    }
}
