//! Stat model shared by players, enemies and raid participants.
//!
//! A `Combatant` is the per-turn snapshot every resolver reads. Resolvers never
//! mutate it in place; they return a new copy that the owning session stores.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    /// Skips the affected side's next action.
    Stunned,
    /// Strength was reduced for the rest of the battle.
    Weakened,
    /// Incoming damage is reduced until the guard expires.
    Guarding,
    /// Loses a fixed amount of health at the end of each exchange.
    Poisoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub kind: StatusKind,
    pub turns_remaining: u32,
    #[serde(default)]
    pub magnitude: u32,
}

impl StatusEffect {
    pub fn new(kind: StatusKind, turns_remaining: u32) -> Self {
        Self {
            kind,
            turns_remaining,
            magnitude: 0,
        }
    }

    pub fn with_magnitude(kind: StatusKind, turns_remaining: u32, magnitude: u32) -> Self {
        Self {
            kind,
            turns_remaining,
            magnitude,
        }
    }
}

/// Set of active status effects, at most one per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusEffects(Vec<StatusEffect>);

impl StatusEffects {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Adds an effect. Re-applying a kind refreshes it to the longer duration.
    pub fn apply(&mut self, effect: StatusEffect) {
        if let Some(existing) = self.0.iter_mut().find(|e| e.kind == effect.kind) {
            existing.turns_remaining = existing.turns_remaining.max(effect.turns_remaining);
            existing.magnitude = existing.magnitude.max(effect.magnitude);
        } else {
            self.0.push(effect);
        }
    }

    pub fn has(&self, kind: StatusKind) -> bool {
        self.0.iter().any(|e| e.kind == kind && e.turns_remaining > 0)
    }

    pub fn get(&self, kind: StatusKind) -> Option<&StatusEffect> {
        self.0.iter().find(|e| e.kind == kind && e.turns_remaining > 0)
    }

    /// Consumes one turn of `kind`. Returns true if the effect was active.
    pub fn consume(&mut self, kind: StatusKind) -> bool {
        let active = match self.0.iter_mut().find(|e| e.kind == kind) {
            Some(effect) if effect.turns_remaining > 0 => {
                effect.turns_remaining -= 1;
                true
            }
            _ => false,
        };
        self.0.retain(|e| e.turns_remaining > 0);
        active
    }

    pub fn remove(&mut self, kind: StatusKind) {
        self.0.retain(|e| e.kind != kind);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.0.iter()
    }
}

/// Equipment and innate traits that modify how a combatant attacks and defends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTraits {
    /// Ignores this much of the defender's defense.
    pub armor_penetration: u32,
    /// Extra critical chance in percentage points.
    pub critical_chance: f64,
    /// Health restored to the attacker on every landed hit.
    pub healing_on_hit: u32,
    /// Percentage of incoming damage reflected to the attacker.
    pub reflect_percent: f64,
    /// Chance in percent to avoid an incoming attack entirely.
    pub dodge_chance: f64,
}

impl CombatTraits {
    /// Stacks two sets of traits (innate + equipment).
    pub fn combine(&self, other: &CombatTraits) -> CombatTraits {
        CombatTraits {
            armor_penetration: self.armor_penetration.saturating_add(other.armor_penetration),
            critical_chance: self.critical_chance + other.critical_chance,
            healing_on_hit: self.healing_on_hit.saturating_add(other.healing_on_hit),
            reflect_percent: self.reflect_percent + other.reflect_percent,
            dodge_chance: self.dodge_chance + other.dodge_chance,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    MaxHealth,
    Strength,
    Defense,
    Charm,
}

/// Signed change to a combatant's stats. Applied with clamping at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatDelta {
    pub health: i64,
    pub max_health: i64,
    pub strength: i64,
    pub defense: i64,
    pub charm: i64,
}

impl StatDelta {
    pub fn health(amount: i64) -> Self {
        Self {
            health: amount,
            ..Default::default()
        }
    }

    pub fn stat(stat: Stat, amount: i64) -> Self {
        let mut delta = Self::default();
        match stat {
            Stat::MaxHealth => delta.max_health = amount,
            Stat::Strength => delta.strength = amount,
            Stat::Defense => delta.defense = amount,
            Stat::Charm => delta.charm = amount,
        }
        delta
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// Adds a signed delta to an unsigned value, clamping at 0 and `u32::MAX`.
pub fn offset(value: u32, delta: i64) -> u32 {
    (value as i64 + delta).clamp(0, u32::MAX as i64) as u32
}

/// Immutable-per-turn snapshot of a combatant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: String,
    pub name: String,
    pub level: u32,
    pub health: u32,
    pub max_health: u32,
    pub strength: u32,
    pub defense: u32,
    pub charm: u32,
    #[serde(default)]
    pub weapon_bonus: u32,
    #[serde(default)]
    pub armor_bonus: u32,
    #[serde(default)]
    pub traits: CombatTraits,
    #[serde(default)]
    pub status_effects: StatusEffects,
}

impl Combatant {
    pub fn new(id: impl Into<String>, name: impl Into<String>, level: u32, max_health: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            level,
            health: max_health,
            max_health,
            strength: 0,
            defense: 0,
            charm: 0,
            weapon_bonus: 0,
            armor_bonus: 0,
            traits: CombatTraits::default(),
            status_effects: StatusEffects::new(),
        }
    }

    pub fn with_stats(mut self, strength: u32, defense: u32, charm: u32) -> Self {
        self.strength = strength;
        self.defense = defense;
        self.charm = charm;
        self
    }

    pub fn with_traits(mut self, traits: CombatTraits) -> Self {
        self.traits = traits;
        self
    }

    pub fn is_defeated(&self) -> bool {
        self.health == 0
    }

    pub fn health_percent(&self) -> f64 {
        if self.max_health == 0 {
            return 0.0;
        }
        self.health as f64 * 100.0 / self.max_health as f64
    }

    pub fn total_defense(&self) -> u32 {
        self.defense.saturating_add(self.armor_bonus)
    }

    pub fn take_damage(&self, amount: u32) -> Combatant {
        let mut next = self.clone();
        next.health = next.health.saturating_sub(amount);
        next
    }

    pub fn heal(&self, amount: u32) -> Combatant {
        let mut next = self.clone();
        next.health = next.health.saturating_add(amount).min(next.max_health);
        next
    }

    /// Applies a signed stat delta, keeping `health` within `[0, max_health]`.
    pub fn apply_delta(&self, delta: &StatDelta) -> Combatant {
        let mut next = self.clone();
        next.max_health = offset(next.max_health, delta.max_health).max(1);
        next.strength = offset(next.strength, delta.strength);
        next.defense = offset(next.defense, delta.defense);
        next.charm = offset(next.charm, delta.charm);
        next.health = offset(next.health, delta.health).min(next.max_health);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fighter() -> Combatant {
        Combatant::new("p1", "Fighter", 1, 50).with_stats(10, 5, 2)
    }

    #[test]
    fn test_take_damage_clamps_at_zero() {
        let hit = fighter().take_damage(500);
        assert_eq!(hit.health, 0);
        assert!(hit.is_defeated());
    }

    #[test]
    fn test_heal_clamps_at_max() {
        let hurt = fighter().take_damage(20);
        assert_eq!(hurt.heal(100).health, 50);
    }

    #[test]
    fn test_apply_delta_never_underflows() {
        let delta = StatDelta {
            health: -1000,
            max_health: -1000,
            strength: -1000,
            defense: -3,
            charm: 4,
        };
        let next = fighter().apply_delta(&delta);
        assert_eq!(next.health, 0);
        assert_eq!(next.max_health, 1);
        assert_eq!(next.strength, 0);
        assert_eq!(next.defense, 2);
        assert_eq!(next.charm, 6);
    }

    #[test]
    fn test_stacked_traits_saturate() {
        let maxed = CombatTraits {
            armor_penetration: u32::MAX,
            healing_on_hit: u32::MAX,
            ..Default::default()
        };
        let stacked = maxed.combine(&maxed);
        assert_eq!(stacked.armor_penetration, u32::MAX);
        assert_eq!(stacked.healing_on_hit, u32::MAX);
    }

    #[test]
    fn test_max_health_cut_pulls_health_down() {
        let next = fighter().apply_delta(&StatDelta::stat(Stat::MaxHealth, -10));
        assert_eq!(next.max_health, 40);
        assert_eq!(next.health, 40);
    }

    #[test]
    fn test_status_effects_refresh_instead_of_stacking() {
        let mut effects = StatusEffects::new();
        effects.apply(StatusEffect::new(StatusKind::Stunned, 1));
        effects.apply(StatusEffect::new(StatusKind::Stunned, 2));
        assert_eq!(effects.iter().count(), 1);
        assert_eq!(effects.get(StatusKind::Stunned).unwrap().turns_remaining, 2);
    }

    #[test]
    fn test_status_consume_expires_effect() {
        let mut effects = StatusEffects::new();
        effects.apply(StatusEffect::new(StatusKind::Stunned, 1));
        assert!(effects.consume(StatusKind::Stunned));
        assert!(!effects.has(StatusKind::Stunned));
        assert!(!effects.consume(StatusKind::Stunned));
        assert!(effects.is_empty());
    }
}
