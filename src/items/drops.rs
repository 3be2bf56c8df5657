use tracing::debug;

use super::types::{ItemId, Rarity};
use crate::core::config::DropRules;
use crate::core::rng::CombatRng;
use crate::enemies::types::EnemyDefinition;

/// Percentage points charm adds to a drop chance, capped by the rules.
pub fn charm_bonus(charm: u32, rules: &DropRules) -> f64 {
    (charm as f64 * rules.charm_bonus_per_point).min(rules.charm_bonus_cap)
}

/// Drop chance in percent for an enemy of this rarity.
///
/// Charm is added to the base chance, never multiplied.
pub fn drop_chance(rarity: Rarity, charm: u32, rules: &DropRules) -> f64 {
    (rules.base_chance.get(rarity) + charm_bonus(charm, rules)).min(100.0)
}

/// Rolls for a drop after a kill. Returns at most one item.
///
/// `force_drop` skips the chance roll. An enemy with an empty drop table never
/// drops anything, forced or not.
pub fn roll_drop(
    enemy: &EnemyDefinition,
    charm: u32,
    force_drop: bool,
    rules: &DropRules,
    rng: &mut impl CombatRng,
) -> Option<ItemId> {
    roll_from_table(&enemy.drop_table, enemy.rarity, charm, force_drop, rules, rng)
}

/// Table-level drop roll shared by regular enemies and raid bosses.
pub fn roll_from_table(
    table: &[ItemId],
    rarity: Rarity,
    charm: u32,
    force_drop: bool,
    rules: &DropRules,
    rng: &mut impl CombatRng,
) -> Option<ItemId> {
    if table.is_empty() {
        return None;
    }

    if !force_drop && !rng.chance(drop_chance(rarity, charm, rules)) {
        return None;
    }

    let item = table[rng.roll_index(table.len())].clone();
    debug!(item = %item, ?rarity, force_drop, "item dropped");
    Some(item)
}
