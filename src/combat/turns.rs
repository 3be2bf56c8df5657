//! Per-character turn budget.
//!
//! Turns are charged once per full exchange, on the enemy's step. Reaching
//! zero forces the session to retreat after the current exchange resolves.

use serde::{Deserialize, Serialize};

use crate::core::config::TurnCostRules;
use crate::enemies::scaling::ScaledEnemy;
use crate::items::types::Rarity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnBudget {
    pub remaining: u32,
    pub max: u32,
}

impl TurnBudget {
    pub fn new(remaining: u32, max: u32) -> Self {
        Self {
            remaining: remaining.min(max),
            max,
        }
    }

    pub fn full(max: u32) -> Self {
        Self::new(max, max)
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Adds turns back, never above `max`.
    pub fn restore(&self, amount: u32) -> TurnBudget {
        TurnBudget::new(self.remaining.saturating_add(amount), self.max)
    }
}

/// Turn cost of engaging an enemy of this rarity and level. Always at least 1.
pub fn cost_for(rarity: Rarity, level: u32, rules: &TurnCostRules) -> u32 {
    let level_cost = if rules.level_step == 0 {
        0
    } else {
        level / rules.level_step
    };
    rules.base_cost.get(rarity).saturating_add(level_cost).max(1)
}

pub fn cost(enemy: &ScaledEnemy, rules: &TurnCostRules) -> u32 {
    cost_for(enemy.rarity, enemy.combatant.level, rules)
}

/// Spends `cost` turns, clamping at zero.
pub fn spend(budget: TurnBudget, cost: u32) -> TurnBudget {
    TurnBudget {
        remaining: budget.remaining.saturating_sub(cost),
        max: budget.max,
    }
}

pub fn is_exhausted(budget: &TurnBudget) -> bool {
    budget.is_exhausted()
}
