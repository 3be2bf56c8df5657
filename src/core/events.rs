//! Outcome sinks: collaborators notified when a combat or raid finishes.
//!
//! Delivery is fire-and-forget. A failing sink is logged and skipped; it never
//! rolls back or fails the exchange that produced the result.

use tracing::warn;

use super::error::SinkError;
use crate::combat::types::CombatResult;
use crate::raid::types::RaidResult;

pub trait OutcomeSink {
    /// Short name used in logs.
    fn name(&self) -> &str;

    fn on_combat_result(&mut self, result: &CombatResult) -> Result<(), SinkError>;

    fn on_raid_result(&mut self, _result: &RaidResult) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Keeps every result it receives. Useful for tests and replays.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub combat_results: Vec<CombatResult>,
    pub raid_results: Vec<RaidResult>,
}

impl OutcomeSink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn on_combat_result(&mut self, result: &CombatResult) -> Result<(), SinkError> {
        self.combat_results.push(result.clone());
        Ok(())
    }

    fn on_raid_result(&mut self, result: &RaidResult) -> Result<(), SinkError> {
        self.raid_results.push(result.clone());
        Ok(())
    }
}

pub(crate) fn publish_combat(sinks: &mut [Box<dyn OutcomeSink>], result: &CombatResult) {
    for sink in sinks.iter_mut() {
        if let Err(err) = sink.on_combat_result(result) {
            warn!(sink = sink.name(), error = %err, player = %result.player_id, "dropping combat result");
        }
    }
}

pub(crate) fn publish_raid(sinks: &mut [Box<dyn OutcomeSink>], result: &RaidResult) {
    for sink in sinks.iter_mut() {
        if let Err(err) = sink.on_raid_result(result) {
            warn!(sink = sink.name(), error = %err, boss = %result.boss_id, "dropping raid result");
        }
    }
}
