//! Error types for the engine facade and configuration loading.

use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors surfaced to the caller of the engine.
///
/// `InvalidAction` and `SkillOnCooldown` are rejections: the session they were
/// submitted to is left exactly as it was. Unknown-id errors are configuration
/// errors and are only raised before a session enters play.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("action `{action}` is not accepted while the session is {state}")]
    InvalidAction { state: String, action: String },

    #[error("unknown enemy id `{0}`")]
    UnknownEnemy(String),

    #[error("unknown ability id `{0}`")]
    UnknownAbility(String),

    #[error("unknown item id `{0}`")]
    UnknownItem(String),

    #[error("unknown skill id `{0}`")]
    UnknownSkill(String),

    #[error("unknown boss id `{0}`")]
    UnknownBoss(String),

    #[error("no combat session for this handle")]
    UnknownSession,

    #[error("no raid for this handle")]
    UnknownRaid,

    #[error("enemy pool has no enemy the player can meet")]
    EmptyEnemyPool,

    #[error("player `{0}` is already in a live session")]
    SessionAlreadyActive(String),

    #[error("player has no turns remaining")]
    TurnsExhausted,

    #[error("invalid raid roster: {0}")]
    InvalidRoster(String),

    #[error("skill `{skill}` is on cooldown for {remaining} more turn(s)")]
    SkillOnCooldown { skill: String, remaining: u32 },

    #[error("a dropped item is waiting for a keep/discard/replace decision")]
    PendingDropUnresolved,

    #[error("no pending drop to resolve")]
    NoPendingDrop,

    #[error("inventory slot {0} is out of range")]
    InventorySlotOutOfRange(usize),

    #[error("inventory is full")]
    InventoryFull,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl EngineError {
    pub fn invalid_action(state: impl std::fmt::Debug, action: impl std::fmt::Debug) -> Self {
        EngineError::InvalidAction {
            state: format!("{state:?}"),
            action: format!("{action:?}"),
        }
    }

    /// True for rejections that leave the session untouched.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidAction { .. } | EngineError::SkillOnCooldown { .. }
        )
    }
}

/// Errors found while loading or validating configuration and content tables.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(String),

    #[error("duplicate {kind} id `{id}`")]
    DuplicateId { kind: &'static str, id: String },

    #[error("enemy `{enemy}` references unknown ability `{ability}`")]
    DanglingAbility { enemy: String, ability: String },

    #[error("{owner} references unknown item `{item}`")]
    DanglingItem { owner: String, item: String },

    #[error("{field} is out of range: {reason}")]
    OutOfRange { field: &'static str, reason: String },
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

/// Failure reported by an outcome sink. Logged by the engine, never propagated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("sink `{sink}` failed: {reason}")]
pub struct SinkError {
    pub sink: String,
    pub reason: String,
}

impl SinkError {
    pub fn new(sink: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            sink: sink.into(),
            reason: reason.into(),
        }
    }
}
