//! Combat: damage, enemy abilities, skills, turn economy and the session state machine.

#![allow(unused_imports)]

pub mod abilities;
pub mod damage;
pub mod session;
pub mod skills;
pub mod turns;
pub mod types;

pub use abilities::{AbilityDefinition, AbilityEffect, AbilityId, AbilityOutcome, CounterAttack};
pub use damage::{DamageResult, WeaponAdvantages};
pub use session::*;
pub use skills::*;
pub use turns::TurnBudget;
pub use types::*;
