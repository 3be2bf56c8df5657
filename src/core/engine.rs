//! Engine facade: owns configuration, content and every live session.
//!
//! Callers hand a `PlayerRecord` in when an encounter starts and get the
//! updated record back in the terminal `ExchangeResult`. While a session is
//! live the engine holds the only mutable copy, and a player may have at most
//! one live session or raid.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::config::{ContentTables, EngineConfig};
use super::error::{EngineError, Result};
use super::events::{publish_combat, publish_raid, OutcomeSink};
use super::rng::CombatRng;
use crate::character::record::PlayerRecord;
use crate::combat::session::CombatSession;
use crate::combat::types::{CombatOutcome, ExchangeResult, PlayerAction};
use crate::enemies::scaling::select_enemy;
use crate::enemies::types::EnemyId;
use crate::items::inventory::DropDecision;
use crate::raid::logic::RaidSession;
use crate::raid::types::{PartyMember, RaidAction, RaidExchangeResult};

/// Opaque reference to a live combat session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionHandle(Uuid);

/// Opaque reference to a live raid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RaidHandle(Uuid);

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

impl fmt::Display for RaidHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "raid-{}", self.0)
    }
}

pub struct Engine {
    config: EngineConfig,
    content: ContentTables,
    sessions: HashMap<SessionHandle, CombatSession>,
    raids: HashMap<RaidHandle, RaidSession>,
    busy_players: HashSet<String>,
    sinks: Vec<Box<dyn OutcomeSink>>,
}

impl Engine {
    /// Builds an engine after validating both config and content.
    pub fn new(config: EngineConfig, content: ContentTables) -> Result<Self> {
        config.validate()?;
        content.validate()?;
        Ok(Self {
            config,
            content,
            sessions: HashMap::new(),
            raids: HashMap::new(),
            busy_players: HashSet::new(),
            sinks: Vec::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn content(&self) -> &ContentTables {
        &self.content
    }

    pub fn add_sink(&mut self, sink: Box<dyn OutcomeSink>) {
        self.sinks.push(sink);
    }

    pub fn session(&self, handle: SessionHandle) -> Option<&CombatSession> {
        self.sessions.get(&handle)
    }

    pub fn raid(&self, handle: RaidHandle) -> Option<&RaidSession> {
        self.raids.get(&handle)
    }

    pub fn is_busy(&self, player_id: &str) -> bool {
        self.busy_players.contains(player_id)
    }

    pub fn live_sessions(&self) -> usize {
        self.sessions.len()
    }

    pub fn live_raids(&self) -> usize {
        self.raids.len()
    }

    fn ensure_free(&self, player_id: &str) -> Result<()> {
        if self.is_busy(player_id) {
            return Err(EngineError::SessionAlreadyActive(player_id.to_string()));
        }
        Ok(())
    }

    /// Selects an enemy from `enemy_pool` and opens a session for `record`.
    pub fn start_encounter(
        &mut self,
        record: PlayerRecord,
        enemy_pool: &[EnemyId],
        rng: &mut impl CombatRng,
    ) -> Result<SessionHandle> {
        self.ensure_free(&record.id)?;
        let definition = select_enemy(enemy_pool, record.level, &self.content, rng)?;
        let player_id = record.id.clone();
        let session = CombatSession::start(record, definition, &self.config, &self.content)?;

        let handle = SessionHandle(Uuid::new_v4());
        info!(player = %player_id, enemy = %session.enemy().definition_id, %handle, "encounter started");
        self.busy_players.insert(player_id);
        self.sessions.insert(handle, session);
        Ok(handle)
    }

    /// Resolves one player action. A terminal result closes the session and is
    /// published to every sink.
    pub fn submit_action(
        &mut self,
        handle: SessionHandle,
        action: PlayerAction,
        rng: &mut impl CombatRng,
    ) -> Result<ExchangeResult> {
        let session = self
            .sessions
            .get_mut(&handle)
            .ok_or(EngineError::UnknownSession)?;
        let result = session.submit(action, &self.config, &self.content, rng)?;

        if let Some(outcome) = &result.outcome {
            self.close_session(handle, outcome);
        }
        Ok(result)
    }

    /// Ends a live session as a retreat and hands the record back.
    pub fn abandon_encounter(&mut self, handle: SessionHandle) -> Result<CombatOutcome> {
        let session = self
            .sessions
            .get_mut(&handle)
            .ok_or(EngineError::UnknownSession)?;
        let outcome = session.abandon(&self.config)?;
        self.close_session(handle, &outcome);
        Ok(outcome)
    }

    fn close_session(&mut self, handle: SessionHandle, outcome: &CombatOutcome) {
        self.sessions.remove(&handle);
        self.busy_players.remove(&outcome.result.player_id);
        debug!(%handle, "session closed");
        publish_combat(&mut self.sinks, &outcome.result);
    }

    /// Applies a keep/discard/replace decision to the record's pending drop.
    pub fn resolve_drop(&self, record: &PlayerRecord, decision: DropDecision) -> Result<PlayerRecord> {
        self.ensure_free(&record.id)?;
        let mut inventory = record.inventory(self.config.max_inventory_slots);
        inventory.resolve_pending(decision)?;

        let mut next = record.clone();
        next.set_inventory(inventory);
        debug!(player = %record.id, ?decision, "pending drop resolved");
        Ok(next)
    }

    /// Forms a raid against `boss_id` and starts it.
    pub fn start_raid(&mut self, roster: Vec<PartyMember>, boss_id: &str) -> Result<RaidHandle> {
        let boss = self.content.boss(boss_id)?;
        for member in roster.iter().filter(|m| m.is_human()) {
            self.ensure_free(&member.id)?;
        }
        let raid = RaidSession::start(roster, boss, &self.config.raid)?;

        let handle = RaidHandle(Uuid::new_v4());
        for member in raid.state().party_members.iter().filter(|m| m.is_human()) {
            self.busy_players.insert(member.id.clone());
        }
        info!(boss = %boss_id, party = raid.state().party_members.len(), %handle, "raid started");
        self.raids.insert(handle, raid);
        Ok(handle)
    }

    pub fn submit_raid_action(
        &mut self,
        handle: RaidHandle,
        action: RaidAction,
        rng: &mut impl CombatRng,
    ) -> Result<RaidExchangeResult> {
        let raid = self.raids.get_mut(&handle).ok_or(EngineError::UnknownRaid)?;
        let result = raid.submit(action, &self.config, &self.content, rng)?;

        if let Some(summary) = &result.result {
            if let Some(raid) = self.raids.remove(&handle) {
                for member in raid.state().party_members.iter().filter(|m| m.is_human()) {
                    self.busy_players.remove(&member.id);
                }
            }
            debug!(%handle, "raid closed");
            publish_raid(&mut self.sinks, summary);
        }
        Ok(result)
    }
}
