use serde::{Deserialize, Serialize};

use super::record::PlayerRecord;
use crate::core::config::DeathRules;

/// Losses applied when the player is defeated. Computed, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathPenalty {
    pub gold_lost: u64,
    pub xp_lost: u64,
    pub turns_lost: u32,
    pub respawn_health: u32,
}

/// The values the penalty is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeathSnapshot {
    pub gold: u64,
    /// Experience earned toward the next level.
    pub level_progress_xp: u64,
    pub turns_remaining: u32,
    pub max_health: u32,
}

impl From<&PlayerRecord> for DeathSnapshot {
    fn from(record: &PlayerRecord) -> Self {
        Self {
            gold: record.gold,
            level_progress_xp: record.experience,
            turns_remaining: record.turns_remaining,
            max_health: record.max_health,
        }
    }
}

fn percent_of(value: u64, percent: u64) -> u64 {
    (value as u128 * percent.min(100) as u128 / 100) as u64
}

/// Computes the death penalty. Pure: the same snapshot always yields the same penalty.
pub fn resolve_death(snapshot: &DeathSnapshot, rules: &DeathRules) -> DeathPenalty {
    let respawn = percent_of(snapshot.max_health as u64, rules.respawn_health_percent as u64) as u32;

    DeathPenalty {
        gold_lost: percent_of(snapshot.gold, rules.gold_loss_percent),
        xp_lost: percent_of(snapshot.level_progress_xp, rules.xp_loss_percent),
        turns_lost: rules.turn_cost.min(snapshot.turns_remaining),
        respawn_health: respawn.max(1).min(snapshot.max_health),
    }
}

impl DeathPenalty {
    /// Applies the penalty as a state transition. Every subtraction clamps at zero.
    pub fn apply(&self, record: &PlayerRecord) -> PlayerRecord {
        let mut next = record.clone();
        next.gold = next.gold.saturating_sub(self.gold_lost);
        next.experience = next.experience.saturating_sub(self.xp_lost);
        next.turns_remaining = next.turns_remaining.saturating_sub(self.turns_lost);
        next.health = self.respawn_health.min(next.max_health);
        next.death_count = next.death_count.saturating_add(1);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(gold: u64, xp: u64, turns: u32, max_health: u32) -> DeathSnapshot {
        DeathSnapshot {
            gold,
            level_progress_xp: xp,
            turns_remaining: turns,
            max_health,
        }
    }

    #[test]
    fn test_standard_penalty() {
        let penalty = resolve_death(&snapshot(100, 80, 20, 120), &DeathRules::default());
        assert_eq!(penalty.gold_lost, 25);
        assert_eq!(penalty.xp_lost, 8);
        assert_eq!(penalty.turns_lost, 5);
        assert_eq!(penalty.respawn_health, 60);
    }

    #[test]
    fn test_turns_lost_clamped_to_remaining() {
        let penalty = resolve_death(&snapshot(100, 0, 1, 100), &DeathRules::default());
        assert_eq!(penalty.turns_lost, 1);
    }

    #[test]
    fn test_broke_player_loses_nothing() {
        let penalty = resolve_death(&snapshot(0, 0, 0, 100), &DeathRules::default());
        assert_eq!(penalty.gold_lost, 0);
        assert_eq!(penalty.xp_lost, 0);
        assert_eq!(penalty.turns_lost, 0);
    }

    #[test]
    fn test_respawn_health_at_least_one() {
        let penalty = resolve_death(&snapshot(0, 0, 0, 1), &DeathRules::default());
        assert_eq!(penalty.respawn_health, 1);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let snap = snapshot(1234, 77, 9, 140);
        let rules = DeathRules::default();
        assert_eq!(resolve_death(&snap, &rules), resolve_death(&snap, &rules));
    }
}
