//! Actions, states, events and results of a single combat session.
//!
//! IMPORTANT: `CombatResult` is consumed by external collaborators. When
//! adding new fields, use `#[serde(default)]` so older consumers keep parsing.

use serde::{Deserialize, Serialize};

use super::skills::SkillId;
use crate::character::death::DeathPenalty;
use crate::character::record::PlayerRecord;
use crate::combat::abilities::AbilityId;
use crate::enemies::types::EnemyId;
use crate::items::types::{InventoryItem, ItemId, Rarity};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerAction {
    Attack,
    Flee,
    UseSkill(SkillId),
    /// Looks at the enemy. Does not count as an exchange.
    Inspect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Idle,
    EnemyPresented,
    AwaitingPlayerAction,
    ResolvingExchange,
    EnemyDefeated,
    PlayerDefeated,
    Fled,
    Terminated,
}

impl SessionState {
    /// States that accept a player action.
    pub fn accepts_actions(&self) -> bool {
        matches!(
            self,
            SessionState::EnemyPresented | SessionState::AwaitingPlayerAction
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::EnemyDefeated
                | SessionState::PlayerDefeated
                | SessionState::Fled
                | SessionState::Terminated
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Player,
    Enemy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalReason {
    Victory,
    Defeat,
    Fled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatLogEntry {
    pub message: String,
    pub is_crit: bool,
    pub is_player_action: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    PlayerAttack {
        damage: u32,
        was_crit: bool,
    },
    EnemyAttack {
        damage: u32,
        was_crit: bool,
    },
    /// The defending side dodged; zero damage.
    Dodged {
        by: Side,
    },
    Lifesteal {
        side: Side,
        amount: u32,
    },
    Reflected {
        to: Side,
        amount: u32,
    },
    SkillUsed {
        skill_id: SkillId,
    },
    PlayerHealed {
        amount: u32,
    },
    Stunned {
        side: Side,
    },
    /// A stunned side lost its action.
    TurnSkipped {
        side: Side,
    },
    AbilityTriggered {
        ability_id: AbilityId,
        message: String,
    },
    PoisonTick {
        damage: u32,
    },
    FleeFailed,
    TurnsSpent {
        cost: u32,
        remaining: u32,
    },
    ForcedRetreat,
    EnemyEscaped,
    PlayerFled,
    EnemyDefeated,
    PlayerDefeated,
}

/// What `Inspect` reveals about the enemy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyReport {
    pub id: EnemyId,
    pub name: String,
    pub rarity: Rarity,
    pub level: u32,
    pub health: u32,
    pub max_health: u32,
    pub strength: u32,
    pub defense: u32,
    pub ability: Option<AbilityId>,
    pub turn_cost: u32,
}

/// Aggregate outcome of a finished encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatResult {
    pub player_id: String,
    pub enemy_id: EnemyId,
    pub gold_earned: u64,
    pub xp_earned: u64,
    pub level_ups: u32,
    pub drop: Option<ItemId>,
    /// Set when the drop arrived with a full inventory and awaits a decision.
    #[serde(default)]
    pub pending_drop: Option<InventoryItem>,
    pub terminal_reason: TerminalReason,
    #[serde(default)]
    pub fled_by: Option<Side>,
    #[serde(default)]
    pub forced_retreat: bool,
    pub death_penalty: Option<DeathPenalty>,
    pub exchanges: u32,
    /// UNIX timestamp (seconds).
    pub resolved_at: i64,
}

/// Terminal result plus the updated record handed back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatOutcome {
    pub result: CombatResult,
    pub record: PlayerRecord,
}

/// Returned by every accepted action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeResult {
    pub state: SessionState,
    pub events: Vec<CombatEvent>,
    pub player_health: u32,
    pub enemy_health: u32,
    pub turns_remaining: u32,
    #[serde(default)]
    pub inspection: Option<EnemyReport>,
    #[serde(default)]
    pub outcome: Option<CombatOutcome>,
}

impl ExchangeResult {
    pub fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_presented_and_awaiting_accept_actions() {
        assert!(SessionState::EnemyPresented.accepts_actions());
        assert!(SessionState::AwaitingPlayerAction.accepts_actions());
        assert!(!SessionState::Idle.accepts_actions());
        assert!(!SessionState::ResolvingExchange.accepts_actions());
        assert!(!SessionState::Terminated.accepts_actions());
    }

    #[test]
    fn test_terminal_states() {
        assert!(SessionState::EnemyDefeated.is_terminal());
        assert!(SessionState::Fled.is_terminal());
        assert!(!SessionState::AwaitingPlayerAction.is_terminal());
    }

    #[test]
    fn test_action_json_shape() {
        let json = serde_json::to_string(&PlayerAction::UseSkill("bash".to_string())).unwrap();
        assert_eq!(json, r#"{"use_skill":"bash"}"#);
        let attack: PlayerAction = serde_json::from_str(r#""attack""#).unwrap();
        assert_eq!(attack, PlayerAction::Attack);
    }
}
