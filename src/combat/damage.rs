//! Damage resolution shared by single combat and raids.
//!
//! These pure functions calculate hit outcomes without side effects. The
//! session applies the returned `DamageResult` to its own copies.

use serde::{Deserialize, Serialize};

use crate::character::stats::{CombatTraits, Combatant};
use crate::core::config::CombatConstants;
use crate::core::rng::CombatRng;

/// Attack-side modifiers for one hit, usually the attacker's combined traits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WeaponAdvantages {
    pub armor_penetration: u32,
    /// Critical chance in percent, before charm.
    pub critical_chance: f64,
    pub healing_on_hit: u32,
}

impl WeaponAdvantages {
    /// Builds advantages from the attacker's traits plus the base critical chance.
    pub fn for_attacker(attacker: &Combatant, constants: &CombatConstants) -> Self {
        Self::from_traits(&attacker.traits, constants.base_critical_chance)
    }

    pub fn from_traits(traits: &CombatTraits, base_critical_chance: f64) -> Self {
        Self {
            armor_penetration: traits.armor_penetration,
            critical_chance: base_critical_chance + traits.critical_chance,
            healing_on_hit: traits.healing_on_hit,
        }
    }
}

/// Result of a single resolved hit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageResult {
    /// Damage dealt to the defender (after crit multiplier if applicable).
    pub amount: u32,
    pub is_critical: bool,
    /// Damage bounced back to the attacker.
    pub reflected: u32,
    /// Health restored to the attacker by lifesteal.
    pub healed: u32,
}

impl DamageResult {
    /// Applies the hit: primary damage, then lifesteal, then reflection.
    ///
    /// Returns `(attacker, defender)` after the hit.
    pub fn apply(&self, attacker: &Combatant, defender: &Combatant) -> (Combatant, Combatant) {
        let defender = defender.take_damage(self.amount);
        let attacker = attacker.heal(self.healed).take_damage(self.reflected);
        (attacker, defender)
    }
}

/// Base damage before critical hits, floored at 1.
pub fn base_damage(attacker: &Combatant, defender: &Combatant, armor_penetration: u32) -> u32 {
    let offense = attacker.strength.saturating_add(attacker.weapon_bonus);
    let mitigation = defender.total_defense().saturating_sub(armor_penetration);
    offense.saturating_sub(mitigation).max(1)
}

/// Total critical chance: weapon chance plus charm, with charm capped.
pub fn critical_chance(attacker: &Combatant, advantages: &WeaponAdvantages, constants: &CombatConstants) -> f64 {
    advantages.critical_chance + attacker.charm.min(constants.critical_charm_cap) as f64
}

/// Roll for critical hit.
pub fn roll_crit(chance_percent: f64, rng: &mut impl CombatRng) -> bool {
    rng.chance(chance_percent)
}

/// Dodge is evaluated before `resolve` is called. A dodged attack deals nothing.
pub fn roll_dodge(defender: &Combatant, rng: &mut impl CombatRng) -> bool {
    defender.traits.dodge_chance > 0.0 && rng.chance(defender.traits.dodge_chance)
}

/// Damage to reflect back to the attacker.
pub fn calculate_damage_reflection(damage_taken: u32, reflection_percent: f64) -> u32 {
    if reflection_percent > 0.0 && damage_taken > 0 {
        (damage_taken as f64 * reflection_percent / 100.0).ceil() as u32
    } else {
        0
    }
}

/// Scales an amount by a percentage, floored at 1.
pub fn scale_amount(amount: u32, percent: f64) -> u32 {
    ((amount as f64 * percent / 100.0) as u32).max(1)
}

/// Resolves one hit from `attacker` against `defender`.
pub fn resolve(
    attacker: &Combatant,
    defender: &Combatant,
    advantages: &WeaponAdvantages,
    constants: &CombatConstants,
    rng: &mut impl CombatRng,
) -> DamageResult {
    let mut amount = base_damage(attacker, defender, advantages.armor_penetration);

    let is_critical = roll_crit(critical_chance(attacker, advantages, constants), rng);
    if is_critical {
        amount = ((amount as f64 * constants.critical_multiplier) as u32).max(1);
    }

    DamageResult {
        amount,
        is_critical,
        reflected: calculate_damage_reflection(amount, defender.traits.reflect_percent),
        healed: advantages.healing_on_hit,
    }
}

/// Applies a multiplier to an already resolved hit, keeping reflection in step.
pub fn amplify(result: DamageResult, multiplier: f64, defender: &Combatant) -> DamageResult {
    let amount = ((result.amount as f64 * multiplier) as u32).max(1);
    DamageResult {
        amount,
        reflected: calculate_damage_reflection(amount, defender.traits.reflect_percent),
        ..result
    }
}
