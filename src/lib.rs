//! Skirmish - turn-based combat, progression and raid engine.
//!
//! The library resolves single encounters and cooperative boss raids as
//! deterministic state machines over injected randomness. Rendering,
//! persistence and networking are left to the host application.

pub mod character;
pub mod combat;
pub mod content;
pub mod core;
pub mod enemies;
pub mod items;
pub mod raid;

pub use crate::character::record::PlayerRecord;
pub use crate::combat::types::{CombatResult, ExchangeResult, PlayerAction};
pub use crate::content::default_content;
pub use crate::core::config::{ContentTables, EngineConfig};
pub use crate::core::engine::{Engine, RaidHandle, SessionHandle};
pub use crate::core::error::{EngineError, Result};
pub use crate::core::rng::{CombatRng, RandomSource, ScriptedRng};
pub use crate::raid::types::{PartyMember, RaidAction, RaidResult};
