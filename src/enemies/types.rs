use serde::{Deserialize, Serialize};

use crate::character::stats::CombatTraits;
use crate::combat::abilities::AbilityId;
use crate::items::types::{ItemId, Rarity};

pub type EnemyId = String;

/// Inclusive reward range rolled on victory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardRange {
    pub min: u64,
    pub max: u64,
}

impl RewardRange {
    pub fn new(min: u64, max: u64) -> Self {
        Self {
            min: min.min(max),
            max: max.max(min),
        }
    }

    pub fn fixed(value: u64) -> Self {
        Self::new(value, value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialAbility {
    pub id: AbilityId,
    /// Chance in percent that the ability fires on the enemy's step.
    pub trigger_chance: f64,
}

/// Only rolled once the player reaches `min_player_level`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RareSpawn {
    pub spawn_chance: f64,
    pub min_player_level: u32,
}

/// Immutable enemy template. Scaled per encounter into a `ScaledEnemy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyDefinition {
    pub id: EnemyId,
    pub name: String,
    pub rarity: Rarity,
    pub level: u32,
    pub max_health: u32,
    pub strength: u32,
    pub defense: u32,
    #[serde(default)]
    pub charm: u32,
    #[serde(default)]
    pub traits: CombatTraits,
    pub xp_reward: RewardRange,
    pub gold_reward: RewardRange,
    #[serde(default)]
    pub ability: Option<SpecialAbility>,
    #[serde(default)]
    pub drop_table: Vec<ItemId>,
    #[serde(default)]
    pub guaranteed_drop: bool,
    #[serde(default)]
    pub rare_spawn: Option<RareSpawn>,
}

impl EnemyDefinition {
    pub fn is_rare_spawn(&self) -> bool {
        self.rare_spawn.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reward_range_orders_bounds() {
        let range = RewardRange::new(10, 5);
        assert_eq!(range.min, 5);
        assert_eq!(range.max, 10);
    }

    #[test]
    fn test_enemy_definition_parses_with_defaults() {
        let json = r#"{
            "id": "slime",
            "name": "Slime",
            "rarity": "common",
            "level": 1,
            "max_health": 20,
            "strength": 3,
            "defense": 1,
            "xp_reward": { "min": 5, "max": 8 },
            "gold_reward": { "min": 1, "max": 3 }
        }"#;
        let enemy: EnemyDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(enemy.rarity, Rarity::Common);
        assert!(enemy.ability.is_none());
        assert!(enemy.drop_table.is_empty());
        assert!(!enemy.is_rare_spawn());
    }
}
