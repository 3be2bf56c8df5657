//! Player skills and their cooldowns.
//!
//! A skill with cooldown `n` cannot be used again for the next `n` turns on
//! which its owner acts. Turns where the owner is stunned or only inspects do
//! not count.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::error::{EngineError, Result};

pub type SkillId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SkillEffect {
    /// A normal attack with its damage multiplied.
    Strike { multiplier: f64 },
    /// Restores health to the user instead of attacking.
    Heal { amount: u32 },
    /// Attacks and stuns the target for `turns` of its actions.
    Stun { turns: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDefinition {
    pub id: SkillId,
    pub name: String,
    pub cooldown: u32,
    pub effect: SkillEffect,
}

/// Remaining cooldown per skill id. Absent means ready.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cooldowns(BTreeMap<SkillId, u32>);

impl Cooldowns {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn remaining(&self, skill_id: &str) -> u32 {
        self.0.get(skill_id).copied().unwrap_or(0)
    }

    pub fn is_ready(&self, skill_id: &str) -> bool {
        self.remaining(skill_id) == 0
    }

    pub fn check(&self, skill_id: &str) -> Result<()> {
        match self.remaining(skill_id) {
            0 => Ok(()),
            remaining => Err(EngineError::SkillOnCooldown {
                skill: skill_id.to_string(),
                remaining,
            }),
        }
    }

    /// Advances cooldowns for a turn on which the owner acted.
    ///
    /// Every running cooldown drops by one, then `used` (if any) starts its
    /// full cooldown.
    pub fn tick(&mut self, used: Option<&SkillDefinition>) {
        for remaining in self.0.values_mut() {
            *remaining = remaining.saturating_sub(1);
        }
        self.0.retain(|_, remaining| *remaining > 0);

        if let Some(skill) = used {
            if skill.cooldown > 0 {
                self.0.insert(skill.id.clone(), skill.cooldown);
            }
        }
    }
}

/// Looks a skill up in a table.
pub fn find_skill<'a>(skills: &'a [SkillDefinition], skill_id: &str) -> Result<&'a SkillDefinition> {
    skills
        .iter()
        .find(|s| s.id == skill_id)
        .ok_or_else(|| EngineError::UnknownSkill(skill_id.to_string()))
}
