use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::{EnemyDefinition, EnemyId};
use crate::character::stats::Combatant;
use crate::core::config::{ContentTables, ScalingRules};
use crate::core::error::{EngineError, Result};
use crate::core::rng::CombatRng;
use crate::items::types::Rarity;

/// Enemy template scaled to the player for one encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaledEnemy {
    pub definition_id: EnemyId,
    pub rarity: Rarity,
    pub multiplier: f64,
    pub combatant: Combatant,
}

/// Stat multiplier for a template met by a player of `player_level`.
pub fn scaling_multiplier(enemy_level: u32, player_level: u32, rules: &ScalingRules) -> f64 {
    let gap = player_level.saturating_sub(enemy_level) as f64;
    (1.0 + gap * rules.per_level).min(rules.max_multiplier.max(1.0))
}

fn scale(value: u32, multiplier: f64) -> u32 {
    (value as f64 * multiplier).round() as u32
}

pub fn scale_enemy(definition: &EnemyDefinition, player_level: u32, rules: &ScalingRules) -> ScaledEnemy {
    let multiplier = scaling_multiplier(definition.level, player_level, rules);
    let max_health = scale(definition.max_health, multiplier).max(1);

    let combatant = Combatant {
        id: definition.id.clone(),
        name: definition.name.clone(),
        level: definition.level.max(player_level),
        health: max_health,
        max_health,
        strength: scale(definition.strength, multiplier),
        defense: scale(definition.defense, multiplier),
        charm: definition.charm,
        weapon_bonus: 0,
        armor_bonus: 0,
        traits: definition.traits,
        status_effects: Default::default(),
    };

    ScaledEnemy {
        definition_id: definition.id.clone(),
        rarity: definition.rarity,
        multiplier,
        combatant,
    }
}

/// Picks the enemy for an encounter from a pool of ids.
///
/// Every id must exist in the tables. Rare spawns the player is high enough
/// for are rolled first, in pool order; the first success wins. Otherwise a
/// regular enemy is picked uniformly.
pub fn select_enemy<'a>(
    pool: &[EnemyId],
    player_level: u32,
    tables: &'a ContentTables,
    rng: &mut impl CombatRng,
) -> Result<&'a EnemyDefinition> {
    let definitions = pool
        .iter()
        .map(|id| tables.enemy(id))
        .collect::<Result<Vec<_>>>()?;

    for definition in &definitions {
        if let Some(spawn) = &definition.rare_spawn {
            if player_level >= spawn.min_player_level && rng.chance(spawn.spawn_chance) {
                debug!(enemy = %definition.id, "rare spawn");
                return Ok(definition);
            }
        }
    }

    let regular: Vec<&EnemyDefinition> = definitions
        .into_iter()
        .filter(|d| !d.is_rare_spawn())
        .collect();
    if regular.is_empty() {
        return Err(EngineError::EmptyEnemyPool);
    }
    Ok(regular[rng.roll_index(regular.len())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::default_content;
    use crate::core::rng::ScriptedRng;

    #[test]
    fn test_no_scaling_at_or_below_template_level() {
        let rules = ScalingRules::default();
        assert_eq!(scaling_multiplier(5, 5, &rules), 1.0);
        assert_eq!(scaling_multiplier(5, 1, &rules), 1.0);
    }

    #[test]
    fn test_scaling_is_capped() {
        let rules = ScalingRules::default();
        assert_eq!(scaling_multiplier(1, 1000, &rules), rules.max_multiplier);
    }

    #[test]
    fn test_scale_enemy_multiplies_stats() {
        let tables = default_content();
        let wolf = tables.enemy("dire_wolf").unwrap();
        let rules = ScalingRules {
            per_level: 0.5,
            max_multiplier: 3.0,
        };
        let scaled = scale_enemy(wolf, wolf.level + 2, &rules);
        assert_eq!(scaled.multiplier, 2.0);
        assert_eq!(scaled.combatant.max_health, wolf.max_health * 2);
        assert_eq!(scaled.combatant.health, scaled.combatant.max_health);
        assert_eq!(scaled.combatant.strength, wolf.strength * 2);
        assert_eq!(scaled.combatant.level, wolf.level + 2);
    }

    #[test]
    fn test_select_unknown_enemy_fails() {
        let tables = default_content();
        let pool = vec!["goblin".to_string(), "missing".to_string()];
        let err = select_enemy(&pool, 1, &tables, &mut ScriptedRng::constant(0.0)).unwrap_err();
        assert_eq!(err, EngineError::UnknownEnemy("missing".to_string()));
    }

    #[test]
    fn test_rare_spawn_requires_level() {
        let tables = default_content();
        let pool = vec!["golden_slime".to_string(), "goblin".to_string()];
        // Level 1 player: rare spawn is not rolled, so the only roll is the index.
        let picked = select_enemy(&pool, 1, &tables, &mut ScriptedRng::new([0.0])).unwrap();
        assert_eq!(picked.id, "goblin");
    }

    #[test]
    fn test_rare_spawn_rolls_once_eligible() {
        let tables = default_content();
        let pool = vec!["golden_slime".to_string(), "goblin".to_string()];
        let picked = select_enemy(&pool, 50, &tables, &mut ScriptedRng::new([0.0])).unwrap();
        assert_eq!(picked.id, "golden_slime");
    }

    #[test]
    fn test_pool_of_only_rare_spawns_can_be_empty() {
        let tables = default_content();
        let pool = vec!["golden_slime".to_string()];
        let err = select_enemy(&pool, 1, &tables, &mut ScriptedRng::constant(99.0)).unwrap_err();
        assert_eq!(err, EngineError::EmptyEnemyPool);
    }
}
