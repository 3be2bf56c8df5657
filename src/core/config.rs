//! Engine configuration and content tables.
//!
//! Every tunable number lives in `EngineConfig`; every data table lives in
//! `ContentTables`. Both load from JSON and default to the built-in values.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::constants::*;
use super::error::{ConfigError, EngineError, Result};
use crate::combat::abilities::AbilityDefinition;
use crate::combat::skills::SkillDefinition;
use crate::enemies::types::EnemyDefinition;
use crate::items::types::{ItemDefinition, RarityTable};
use crate::raid::types::BossDefinition;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConstants {
    pub critical_multiplier: f64,
    /// Base critical chance in percent before charm and equipment.
    pub base_critical_chance: f64,
    /// Charm counted toward critical chance is capped at this many points.
    pub critical_charm_cap: u32,
    pub flee_base_chance: f64,
    pub flee_chance_per_charm: f64,
    pub flee_max_chance: f64,
    pub combat_log_capacity: usize,
}

impl Default for CombatConstants {
    fn default() -> Self {
        Self {
            critical_multiplier: CRITICAL_MULTIPLIER,
            base_critical_chance: BASE_CRITICAL_CHANCE_PERCENT,
            critical_charm_cap: CRITICAL_CHARM_CAP,
            flee_base_chance: FLEE_BASE_CHANCE_PERCENT,
            flee_chance_per_charm: FLEE_CHANCE_PER_CHARM,
            flee_max_chance: FLEE_MAX_CHANCE_PERCENT,
            combat_log_capacity: COMBAT_LOG_CAPACITY,
        }
    }
}

/// Experience curve and fixed per-level stat growth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelGrowth {
    pub starting_xp_to_next_level: u64,
    pub xp_growth_factor: f64,
    pub max_health: u32,
    pub strength: u32,
    pub defense: u32,
    pub charm: u32,
}

impl Default for LevelGrowth {
    fn default() -> Self {
        Self {
            starting_xp_to_next_level: STARTING_XP_TO_NEXT_LEVEL,
            xp_growth_factor: XP_GROWTH_FACTOR,
            max_health: LEVEL_GROWTH_MAX_HEALTH,
            strength: LEVEL_GROWTH_STRENGTH,
            defense: LEVEL_GROWTH_DEFENSE,
            charm: LEVEL_GROWTH_CHARM,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeathRules {
    pub gold_loss_percent: u64,
    pub xp_loss_percent: u64,
    pub turn_cost: u32,
    pub respawn_health_percent: u32,
}

impl Default for DeathRules {
    fn default() -> Self {
        Self {
            gold_loss_percent: DEATH_GOLD_LOSS_PERCENT,
            xp_loss_percent: DEATH_XP_LOSS_PERCENT,
            turn_cost: DEATH_TURN_COST,
            respawn_health_percent: RESPAWN_HEALTH_PERCENT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnCostRules {
    pub base_cost: RarityTable<u32>,
    /// One extra turn per this many enemy levels.
    pub level_step: u32,
    pub default_max_turns: u32,
}

impl Default for TurnCostRules {
    fn default() -> Self {
        Self {
            base_cost: RarityTable::from_array(TURN_COST_BY_RARITY),
            level_step: TURN_COST_LEVEL_STEP,
            default_max_turns: DEFAULT_MAX_TURNS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropRules {
    /// Base drop chance in percent per enemy rarity.
    pub base_chance: RarityTable<f64>,
    pub charm_bonus_per_point: f64,
    /// Upper bound on the percentage points charm can add.
    pub charm_bonus_cap: f64,
}

impl Default for DropRules {
    fn default() -> Self {
        Self {
            base_chance: RarityTable::from_array(DROP_CHANCE_BY_RARITY),
            charm_bonus_per_point: DROP_CHARM_BONUS_PER_POINT,
            charm_bonus_cap: DROP_CHARM_BONUS_CAP,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalingRules {
    /// Added to the multiplier for every level the player is above the template.
    pub per_level: f64,
    pub max_multiplier: f64,
}

impl Default for ScalingRules {
    fn default() -> Self {
        Self {
            per_level: ENEMY_SCALING_PER_LEVEL,
            max_multiplier: ENEMY_SCALING_MAX_MULTIPLIER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaidRules {
    /// Damage a guarding member takes, as a percentage of the hit.
    pub guard_damage_percent: u32,
    /// Heal amount as a percentage of the target's max health.
    pub heal_percent_of_max: u32,
    /// The boss enrages and wipes the party when this round is reached.
    pub enrage_round: u32,
    pub max_party_size: usize,
}

impl Default for RaidRules {
    fn default() -> Self {
        Self {
            guard_damage_percent: RAID_GUARD_DAMAGE_PERCENT,
            heal_percent_of_max: RAID_HEAL_PERCENT_OF_MAX,
            enrage_round: RAID_ENRAGE_ROUND,
            max_party_size: RAID_MAX_PARTY_SIZE,
        }
    }
}

/// All engine constants, passed in at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub combat: CombatConstants,
    pub leveling: LevelGrowth,
    pub death: DeathRules,
    pub turns: TurnCostRules,
    pub drops: DropRules,
    pub max_inventory_slots: usize,
    pub scaling: ScalingRules,
    pub raid: RaidRules,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            combat: CombatConstants::default(),
            leveling: LevelGrowth::default(),
            death: DeathRules::default(),
            turns: TurnCostRules::default(),
            drops: DropRules::default(),
            max_inventory_slots: MAX_INVENTORY_SLOTS,
            scaling: ScalingRules::default(),
            raid: RaidRules::default(),
        }
    }
}

fn out_of_range(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::OutOfRange {
        field,
        reason: reason.into(),
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> std::result::Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.leveling.starting_xp_to_next_level == 0 {
            return Err(out_of_range(
                "leveling.starting_xp_to_next_level",
                "must be at least 1",
            ));
        }
        if self.leveling.xp_growth_factor < 1.0 {
            return Err(out_of_range(
                "leveling.xp_growth_factor",
                "must be at least 1.0",
            ));
        }
        if self.combat.critical_multiplier < 1.0 {
            return Err(out_of_range(
                "combat.critical_multiplier",
                "must be at least 1.0",
            ));
        }
        if self.death.gold_loss_percent > 100 || self.death.xp_loss_percent > 100 {
            return Err(out_of_range("death", "loss percentages must be <= 100"));
        }
        if self.death.respawn_health_percent > 100 {
            return Err(out_of_range(
                "death.respawn_health_percent",
                "must be <= 100",
            ));
        }
        if self.max_inventory_slots == 0 {
            return Err(out_of_range("max_inventory_slots", "must be at least 1"));
        }
        if self.raid.max_party_size < 2 {
            return Err(out_of_range("raid.max_party_size", "must be at least 2"));
        }
        if self.raid.enrage_round == 0 {
            return Err(out_of_range("raid.enrage_round", "must be at least 1"));
        }
        Ok(())
    }
}

/// Data tables the engine consults: enemies, abilities, items, skills, bosses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentTables {
    pub enemies: Vec<EnemyDefinition>,
    pub abilities: Vec<AbilityDefinition>,
    pub items: Vec<ItemDefinition>,
    pub skills: Vec<SkillDefinition>,
    pub bosses: Vec<BossDefinition>,
}

impl ContentTables {
    pub fn from_json_str(json: &str) -> std::result::Result<Self, ConfigError> {
        let tables: ContentTables = serde_json::from_str(json)?;
        tables.validate()?;
        Ok(tables)
    }

    pub fn enemy(&self, id: &str) -> Result<&EnemyDefinition> {
        self.enemies
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| EngineError::UnknownEnemy(id.to_string()))
    }

    pub fn ability(&self, id: &str) -> Result<&AbilityDefinition> {
        self.abilities
            .iter()
            .find(|a| a.id == id)
            .ok_or_else(|| EngineError::UnknownAbility(id.to_string()))
    }

    pub fn item(&self, id: &str) -> Result<&ItemDefinition> {
        self.items
            .iter()
            .find(|i| i.id == id)
            .ok_or_else(|| EngineError::UnknownItem(id.to_string()))
    }

    pub fn skill(&self, id: &str) -> Result<&SkillDefinition> {
        self.skills
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| EngineError::UnknownSkill(id.to_string()))
    }

    pub fn boss(&self, id: &str) -> Result<&BossDefinition> {
        self.bosses
            .iter()
            .find(|b| b.id == id)
            .ok_or_else(|| EngineError::UnknownBoss(id.to_string()))
    }

    /// Checks ids are unique and every cross-reference resolves.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        unique_ids("enemy", self.enemies.iter().map(|e| e.id.as_str()))?;
        unique_ids("ability", self.abilities.iter().map(|a| a.id.as_str()))?;
        unique_ids("item", self.items.iter().map(|i| i.id.as_str()))?;
        unique_ids("skill", self.skills.iter().map(|s| s.id.as_str()))?;
        unique_ids("boss", self.bosses.iter().map(|b| b.id.as_str()))?;

        for enemy in &self.enemies {
            self.validate_enemy(enemy)?;
        }
        for boss in &self.bosses {
            if boss.max_health == 0 {
                return Err(out_of_range("bosses.max_health", format!("boss `{}` has no health", boss.id)));
            }
            let mut previous = 101;
            for phase in &boss.phases {
                if phase.health_threshold_percent >= previous || phase.damage_reduction_percent > 100 {
                    return Err(out_of_range(
                        "bosses.phases",
                        format!(
                            "boss `{}` phases must have strictly descending thresholds <= 100",
                            boss.id
                        ),
                    ));
                }
                previous = phase.health_threshold_percent;
            }
            for item in &boss.drop_table {
                if self.item(item).is_err() {
                    return Err(ConfigError::DanglingItem {
                        owner: format!("boss `{}`", boss.id),
                        item: item.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Checks one enemy's ability and drop references.
    pub fn validate_enemy(&self, enemy: &EnemyDefinition) -> std::result::Result<(), ConfigError> {
        if let Some(ability) = &enemy.ability {
            if self.ability(&ability.id).is_err() {
                return Err(ConfigError::DanglingAbility {
                    enemy: enemy.id.clone(),
                    ability: ability.id.clone(),
                });
            }
        }
        for item in &enemy.drop_table {
            if self.item(item).is_err() {
                return Err(ConfigError::DanglingItem {
                    owner: format!("enemy `{}`", enemy.id),
                    item: item.clone(),
                });
            }
        }
        Ok(())
    }
}

fn unique_ids<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> std::result::Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ConfigError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::default_content;
    use crate::enemies::types::{RewardRange, SpecialAbility};
    use crate::items::types::Rarity;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = EngineConfig::from_json_str(r#"{ "max_inventory_slots": 4 }"#).unwrap();
        assert_eq!(config.max_inventory_slots, 4);
        assert_eq!(config.leveling, LevelGrowth::default());
    }

    #[test]
    fn test_zero_xp_threshold_rejected() {
        let json = r#"{ "leveling": { "starting_xp_to_next_level": 0 } }"#;
        assert!(matches!(
            EngineConfig::from_json_str(json),
            Err(ConfigError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert!(matches!(
            EngineConfig::from_json_str("{ nope"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_default_content_is_valid() {
        assert!(default_content().validate().is_ok());
    }

    fn bare_enemy(id: &str) -> EnemyDefinition {
        EnemyDefinition {
            id: id.to_string(),
            name: id.to_string(),
            rarity: Rarity::Common,
            level: 1,
            max_health: 10,
            strength: 2,
            defense: 0,
            charm: 0,
            traits: Default::default(),
            xp_reward: RewardRange::fixed(1),
            gold_reward: RewardRange::fixed(1),
            ability: None,
            drop_table: Vec::new(),
            guaranteed_drop: false,
            rare_spawn: None,
        }
    }

    #[test]
    fn test_duplicate_enemy_ids_rejected() {
        let tables = ContentTables {
            enemies: vec![bare_enemy("rat"), bare_enemy("rat")],
            ..Default::default()
        };
        assert_eq!(
            tables.validate(),
            Err(ConfigError::DuplicateId {
                kind: "enemy",
                id: "rat".to_string()
            })
        );
    }

    #[test]
    fn test_dangling_ability_rejected() {
        let mut enemy = bare_enemy("rat");
        enemy.ability = Some(SpecialAbility {
            id: "nonexistent".to_string(),
            trigger_chance: 10.0,
        });
        let tables = ContentTables {
            enemies: vec![enemy],
            ..Default::default()
        };
        assert!(matches!(
            tables.validate(),
            Err(ConfigError::DanglingAbility { .. })
        ));
    }

    #[test]
    fn test_dangling_drop_rejected() {
        let mut enemy = bare_enemy("rat");
        enemy.drop_table.push("ghost_item".to_string());
        let tables = ContentTables {
            enemies: vec![enemy],
            ..Default::default()
        };
        assert!(matches!(
            tables.validate(),
            Err(ConfigError::DanglingItem { .. })
        ));
    }

    #[test]
    fn test_boss_phases_must_descend() {
        let mut tables = default_content();
        let boss = &mut tables.bosses[0];
        boss.phases.reverse();
        assert!(matches!(
            tables.validate(),
            Err(ConfigError::OutOfRange { field: "bosses.phases", .. })
        ));
    }

    #[test]
    fn test_lookup_unknown_ids() {
        let tables = ContentTables::default();
        assert_eq!(
            tables.enemy("x").unwrap_err(),
            EngineError::UnknownEnemy("x".to_string())
        );
        assert_eq!(
            tables.ability("y").unwrap_err(),
            EngineError::UnknownAbility("y".to_string())
        );
    }
}
