//! Enemy special abilities as data.
//!
//! Each ability is an `AbilityDefinition` whose `effect` is one of a closed set
//! of effect descriptors. `dispatch` looks the id up and interprets the
//! descriptor; adding an enemy or ability only extends the table.

use serde::{Deserialize, Serialize};

use crate::character::stats::{Combatant, Stat, StatDelta, StatusEffect, StatusKind};
use crate::core::error::{EngineError, Result};

pub type AbilityId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AbilityEffect {
    /// Multiplies the enemy's counter-attack.
    Empower { multiplier: f64 },
    /// Steals health from the player and heals the enemy by the same amount.
    Drain { amount: u32 },
    /// Stuns the player for a number of their turns.
    Stun { turns: u32 },
    /// Lowers one of the player's stats for the rest of the battle.
    Weaken { stat: Stat, amount: u32 },
    /// Cuts the player's max health by a percentage for the rest of the battle.
    Sap { percent: u32 },
    /// Poisons the player: fixed damage at the end of each exchange.
    Poison { damage: u32, turns: u32 },
    /// The enemy heals itself.
    Mend { amount: u32 },
    /// The enemy flees once its health is at or below the threshold.
    Escape { health_threshold_percent: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityDefinition {
    pub id: AbilityId,
    pub name: String,
    pub effect: AbilityEffect,
    /// When set, the ability takes the place of the normal counter-attack.
    #[serde(default)]
    pub replaces_attack: bool,
    /// Log line. `{enemy}`, `{player}` and `{amount}` are substituted.
    pub message: String,
}

/// How the enemy's counter-attack proceeds after an ability fired.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CounterAttack {
    Normal,
    Empowered(f64),
    Replaced,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityOutcome {
    pub ability_id: AbilityId,
    pub player_delta: StatDelta,
    pub enemy_health_delta: i64,
    pub status_applied: Option<StatusEffect>,
    pub counter_attack: CounterAttack,
    pub escaped: bool,
    pub log_message: String,
}

impl AbilityOutcome {
    /// Applies the outcome. Returns `(enemy, player)`.
    pub fn apply(&self, enemy: &Combatant, player: &Combatant) -> (Combatant, Combatant) {
        let enemy = enemy.apply_delta(&StatDelta::health(self.enemy_health_delta));
        let mut player = player.apply_delta(&self.player_delta);
        if let Some(status) = self.status_applied {
            player.status_effects.apply(status);
        }
        (enemy, player)
    }
}

fn render(template: &str, enemy: &Combatant, player: &Combatant, amount: i64) -> String {
    template
        .replace("{enemy}", &enemy.name)
        .replace("{player}", &player.name)
        .replace("{amount}", &amount.abs().to_string())
}

/// Resolves an ability id against the table.
///
/// Returns `Ok(None)` when the effect's own trigger condition is not met
/// (an escape ability above its health threshold).
pub fn dispatch(
    ability_id: &str,
    abilities: &[AbilityDefinition],
    enemy: &Combatant,
    player: &Combatant,
    enemy_health: u32,
) -> Result<Option<AbilityOutcome>> {
    let ability = abilities
        .iter()
        .find(|a| a.id == ability_id)
        .ok_or_else(|| EngineError::UnknownAbility(ability_id.to_string()))?;

    let mut player_delta = StatDelta::default();
    let mut enemy_health_delta = 0i64;
    let mut status_applied = None;
    let mut escaped = false;
    let mut counter_attack = if ability.replaces_attack {
        CounterAttack::Replaced
    } else {
        CounterAttack::Normal
    };
    let amount: i64;

    match &ability.effect {
        AbilityEffect::Empower { multiplier } => {
            if !ability.replaces_attack {
                counter_attack = CounterAttack::Empowered(*multiplier);
            }
            amount = 0;
        }
        AbilityEffect::Drain { amount: drain } => {
            let drained = (*drain).min(player.health) as i64;
            player_delta.health = -drained;
            enemy_health_delta = drained;
            amount = drained;
        }
        AbilityEffect::Stun { turns } => {
            status_applied = Some(StatusEffect::new(StatusKind::Stunned, *turns));
            amount = *turns as i64;
        }
        AbilityEffect::Weaken { stat, amount: reduction } => {
            player_delta = StatDelta::stat(*stat, -(*reduction as i64));
            status_applied = Some(StatusEffect::with_magnitude(
                StatusKind::Weakened,
                u32::MAX,
                *reduction,
            ));
            amount = *reduction as i64;
        }
        AbilityEffect::Sap { percent } => {
            let cut = (player.max_health as u64 * (*percent).min(100) as u64 / 100) as i64;
            player_delta = StatDelta::stat(Stat::MaxHealth, -cut);
            amount = cut;
        }
        AbilityEffect::Poison { damage, turns } => {
            status_applied = Some(StatusEffect::with_magnitude(
                StatusKind::Poisoned,
                *turns,
                *damage,
            ));
            amount = *damage as i64;
        }
        AbilityEffect::Mend { amount: heal } => {
            let missing = enemy.max_health.saturating_sub(enemy_health);
            enemy_health_delta = (*heal).min(missing) as i64;
            amount = enemy_health_delta;
        }
        AbilityEffect::Escape {
            health_threshold_percent,
        } => {
            let threshold = enemy.max_health as f64 * health_threshold_percent / 100.0;
            if enemy_health as f64 > threshold {
                return Ok(None);
            }
            escaped = true;
            counter_attack = CounterAttack::Replaced;
            amount = 0;
        }
    }

    Ok(Some(AbilityOutcome {
        ability_id: ability.id.clone(),
        player_delta,
        enemy_health_delta,
        status_applied,
        counter_attack,
        escaped,
        log_message: render(&ability.message, enemy, player, amount),
    }))
}
