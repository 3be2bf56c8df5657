//! Single combat session: one player against one scaled enemy.
//!
//! Each accepted action resolves one full exchange in a fixed order:
//! player action, ability roll, counter-attack, poison tick, turn decrement,
//! termination check. The exchange is computed on working copies and only
//! committed once it has fully resolved, so a rejected or failed action
//! leaves the session exactly as it was.

use std::collections::VecDeque;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::abilities::{dispatch, CounterAttack};
use super::damage::{self, DamageResult, WeaponAdvantages};
use super::skills::{find_skill, Cooldowns, SkillDefinition, SkillEffect};
use super::turns::{self, TurnBudget};
use super::types::{
    CombatEvent, CombatLogEntry, CombatOutcome, CombatResult, EnemyReport, ExchangeResult,
    PlayerAction, SessionState, Side, TerminalReason,
};
use crate::character::death::{resolve_death, DeathSnapshot};
use crate::character::record::PlayerRecord;
use crate::character::stats::{Combatant, StatusEffect, StatusKind};
use crate::core::config::{CombatConstants, ContentTables, EngineConfig};
use crate::core::error::{EngineError, Result};
use crate::core::rng::CombatRng;
use crate::enemies::scaling::{scale_enemy, ScaledEnemy};
use crate::enemies::types::EnemyDefinition;
use crate::items::drops::roll_drop;
use crate::items::inventory::Placement;
use crate::items::types::InventoryItem;

/// How a session ended, before it is folded into a `CombatResult`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ending {
    Victory,
    Defeat,
    PlayerFled,
    EnemyEscaped,
    ForcedRetreat,
}

impl Ending {
    fn state(self) -> SessionState {
        match self {
            Ending::Victory => SessionState::EnemyDefeated,
            Ending::Defeat => SessionState::PlayerDefeated,
            Ending::PlayerFled | Ending::EnemyEscaped | Ending::ForcedRetreat => SessionState::Fled,
        }
    }
}

/// Chance in percent that a flee attempt succeeds.
pub fn flee_chance(player: &Combatant, constants: &CombatConstants) -> f64 {
    (constants.flee_base_chance + player.charm as f64 * constants.flee_chance_per_charm)
        .min(constants.flee_max_chance)
}

/// One blow from `attacker` to `defender`. `None` when the defender dodged.
fn strike(
    attacker: &Combatant,
    defender: &Combatant,
    multiplier: f64,
    constants: &CombatConstants,
    rng: &mut impl CombatRng,
) -> (Combatant, Combatant, Option<DamageResult>) {
    if damage::roll_dodge(defender, rng) {
        return (attacker.clone(), defender.clone(), None);
    }
    let advantages = WeaponAdvantages::for_attacker(attacker, constants);
    let mut result = damage::resolve(attacker, defender, &advantages, constants, rng);
    if multiplier != 1.0 {
        result = damage::amplify(result, multiplier, defender);
    }
    let (attacker, defender) = result.apply(attacker, defender);
    (attacker, defender, Some(result))
}

/// Working copies for one exchange.
struct Exchange {
    player: Combatant,
    enemy: Combatant,
    cooldowns: Cooldowns,
    budget: TurnBudget,
    events: Vec<CombatEvent>,
    entries: Vec<CombatLogEntry>,
    ending: Option<Ending>,
}

impl Exchange {
    fn push(&mut self, event: CombatEvent, message: String, is_crit: bool, is_player_action: bool) {
        self.events.push(event);
        self.entries.push(CombatLogEntry {
            message,
            is_crit,
            is_player_action,
        });
    }

    fn player_strike(&mut self, multiplier: f64, constants: &CombatConstants, rng: &mut impl CombatRng) -> bool {
        let (player, enemy, result) = strike(&self.player, &self.enemy, multiplier, constants, rng);
        self.player = player;
        self.enemy = enemy;

        let Some(result) = result else {
            let message = format!("{} dodges the attack", self.enemy.name);
            self.push(CombatEvent::Dodged { by: Side::Enemy }, message, false, true);
            return false;
        };

        let message = if result.is_critical {
            format!("CRITICAL! {} hits {} for {} damage", self.player.name, self.enemy.name, result.amount)
        } else {
            format!("{} hits {} for {} damage", self.player.name, self.enemy.name, result.amount)
        };
        self.push(
            CombatEvent::PlayerAttack {
                damage: result.amount,
                was_crit: result.is_critical,
            },
            message,
            result.is_critical,
            true,
        );
        if result.healed > 0 {
            let message = format!("{} drains {} health", self.player.name, result.healed);
            self.push(
                CombatEvent::Lifesteal {
                    side: Side::Player,
                    amount: result.healed,
                },
                message,
                false,
                true,
            );
        }
        if result.reflected > 0 {
            let message = format!("{} reflects {} damage", self.enemy.name, result.reflected);
            self.push(
                CombatEvent::Reflected {
                    to: Side::Player,
                    amount: result.reflected,
                },
                message,
                false,
                false,
            );
        }
        true
    }

    fn enemy_strike(&mut self, multiplier: f64, constants: &CombatConstants, rng: &mut impl CombatRng) {
        let (enemy, player, result) = strike(&self.enemy, &self.player, multiplier, constants, rng);
        self.enemy = enemy;
        self.player = player;

        let Some(result) = result else {
            let message = format!("{} dodges the attack", self.player.name);
            self.push(CombatEvent::Dodged { by: Side::Player }, message, false, true);
            return;
        };

        let message = format!("{} hits {} for {} damage", self.enemy.name, self.player.name, result.amount);
        self.push(
            CombatEvent::EnemyAttack {
                damage: result.amount,
                was_crit: result.is_critical,
            },
            message,
            result.is_critical,
            false,
        );
        if result.healed > 0 {
            let message = format!("{} drains {} health", self.enemy.name, result.healed);
            self.push(
                CombatEvent::Lifesteal {
                    side: Side::Enemy,
                    amount: result.healed,
                },
                message,
                false,
                false,
            );
        }
        if result.reflected > 0 {
            let message = format!("{} reflects {} damage", self.player.name, result.reflected);
            self.push(
                CombatEvent::Reflected {
                    to: Side::Enemy,
                    amount: result.reflected,
                },
                message,
                false,
                true,
            );
        }
    }

    fn use_skill(&mut self, skill: &SkillDefinition, constants: &CombatConstants, rng: &mut impl CombatRng) {
        let message = format!("{} uses {}", self.player.name, skill.name);
        self.push(
            CombatEvent::SkillUsed {
                skill_id: skill.id.clone(),
            },
            message,
            false,
            true,
        );

        match &skill.effect {
            SkillEffect::Strike { multiplier } => {
                self.player_strike(*multiplier, constants, rng);
            }
            SkillEffect::Heal { amount } => {
                let before = self.player.health;
                self.player = self.player.heal(*amount);
                let healed = self.player.health - before;
                let message = format!("{} recovers {} health", self.player.name, healed);
                self.push(CombatEvent::PlayerHealed { amount: healed }, message, false, true);
            }
            SkillEffect::Stun { turns } => {
                if self.player_strike(1.0, constants, rng) && !self.enemy.is_defeated() {
                    self.enemy
                        .status_effects
                        .apply(StatusEffect::new(StatusKind::Stunned, *turns));
                    let message = format!("{} is stunned", self.enemy.name);
                    self.push(CombatEvent::Stunned { side: Side::Enemy }, message, false, true);
                }
            }
        }
    }

    /// Victory is checked before defeat.
    fn check_knockout(&mut self) -> bool {
        if self.enemy.is_defeated() {
            let message = format!("{} is defeated", self.enemy.name);
            self.push(CombatEvent::EnemyDefeated, message, false, true);
            self.ending = Some(Ending::Victory);
        } else if self.player.is_defeated() {
            let message = format!("{} has fallen", self.player.name);
            self.push(CombatEvent::PlayerDefeated, message, false, false);
            self.ending = Some(Ending::Defeat);
        }
        self.ending.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatSession {
    state: SessionState,
    /// The record as it was when the session started.
    record: PlayerRecord,
    player: Combatant,
    enemy: ScaledEnemy,
    definition: EnemyDefinition,
    budget: TurnBudget,
    cooldowns: Cooldowns,
    log: VecDeque<CombatLogEntry>,
    exchanges: u32,
}

impl CombatSession {
    /// Presents `definition` to the player. References are validated here so
    /// nothing can fail on a missing id mid-exchange.
    pub fn start(
        record: PlayerRecord,
        definition: &EnemyDefinition,
        config: &EngineConfig,
        content: &ContentTables,
    ) -> Result<Self> {
        content.validate_enemy(definition)?;
        if record.pending_drop.is_some() {
            return Err(EngineError::PendingDropUnresolved);
        }
        if record.turns_remaining == 0 {
            return Err(EngineError::TurnsExhausted);
        }
        if record.health == 0 {
            return Err(EngineError::invalid_action(SessionState::Idle, "start with zero health"));
        }

        let player = record.to_combatant(&content.items)?;
        let enemy = scale_enemy(definition, record.level, &config.scaling);
        let budget = record.turn_budget();

        debug!(
            player = %record.id,
            enemy = %definition.id,
            multiplier = enemy.multiplier,
            "session {:?} -> {:?}",
            SessionState::Idle,
            SessionState::EnemyPresented
        );

        let mut session = Self {
            state: SessionState::EnemyPresented,
            record,
            player,
            enemy,
            definition: definition.clone(),
            budget,
            cooldowns: Cooldowns::new(),
            log: VecDeque::new(),
            exchanges: 0,
        };
        let message = format!(
            "A wild {} (level {}) appears!",
            session.enemy.combatant.name, session.enemy.combatant.level
        );
        session.add_log_entry(message, false, false, config.combat.combat_log_capacity);
        Ok(session)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn player_id(&self) -> &str {
        &self.record.id
    }

    pub fn player(&self) -> &Combatant {
        &self.player
    }

    pub fn enemy(&self) -> &ScaledEnemy {
        &self.enemy
    }

    pub fn budget(&self) -> TurnBudget {
        self.budget
    }

    pub fn cooldowns(&self) -> &Cooldowns {
        &self.cooldowns
    }

    pub fn log(&self) -> &VecDeque<CombatLogEntry> {
        &self.log
    }

    pub fn exchanges(&self) -> u32 {
        self.exchanges
    }

    fn add_log_entry(&mut self, message: String, is_crit: bool, is_player_action: bool, capacity: usize) {
        if capacity == 0 {
            return;
        }
        while self.log.len() >= capacity {
            self.log.pop_front();
        }
        self.log.push_back(CombatLogEntry {
            message,
            is_crit,
            is_player_action,
        });
    }

    pub fn report(&self, config: &EngineConfig) -> EnemyReport {
        let enemy = &self.enemy.combatant;
        EnemyReport {
            id: self.definition.id.clone(),
            name: enemy.name.clone(),
            rarity: self.enemy.rarity,
            level: enemy.level,
            health: enemy.health,
            max_health: enemy.max_health,
            strength: enemy.strength,
            defense: enemy.defense,
            ability: self.definition.ability.as_ref().map(|a| a.id.clone()),
            turn_cost: turns::cost(&self.enemy, &config.turns),
        }
    }

    fn exchange_result(&self, state: SessionState, events: Vec<CombatEvent>) -> ExchangeResult {
        ExchangeResult {
            state,
            events,
            player_health: self.player.health,
            enemy_health: self.enemy.combatant.health,
            turns_remaining: self.budget.remaining,
            inspection: None,
            outcome: None,
        }
    }

    /// Resolves one player action.
    ///
    /// Rejected actions (wrong state, unknown skill, skill on cooldown) return
    /// an error and leave the session untouched.
    pub fn submit(
        &mut self,
        action: PlayerAction,
        config: &EngineConfig,
        content: &ContentTables,
        rng: &mut impl CombatRng,
    ) -> Result<ExchangeResult> {
        if !self.state.accepts_actions() {
            return Err(EngineError::invalid_action(self.state, &action));
        }

        if action == PlayerAction::Inspect {
            self.state = SessionState::AwaitingPlayerAction;
            let mut result = self.exchange_result(self.state, Vec::new());
            result.inspection = Some(self.report(config));
            return Ok(result);
        }

        let skill = match &action {
            PlayerAction::UseSkill(id) => Some(find_skill(&content.skills, id)?),
            _ => None,
        };
        let stunned = self.player.status_effects.has(StatusKind::Stunned);
        if let (Some(skill), false) = (skill, stunned) {
            self.cooldowns.check(&skill.id)?;
        }

        let previous = self.state;
        self.state = SessionState::ResolvingExchange;
        let exchange = match self.resolve_exchange(&action, skill, config, content, rng) {
            Ok(exchange) => exchange,
            Err(err) => {
                self.state = previous;
                return Err(err);
            }
        };

        self.player = exchange.player;
        self.enemy.combatant = exchange.enemy;
        self.cooldowns = exchange.cooldowns;
        self.budget = exchange.budget;
        self.exchanges += 1;
        let capacity = config.combat.combat_log_capacity;
        for entry in exchange.entries {
            self.add_log_entry(entry.message, entry.is_crit, entry.is_player_action, capacity);
        }

        let Some(ending) = exchange.ending else {
            self.state = SessionState::AwaitingPlayerAction;
            return Ok(self.exchange_result(self.state, exchange.events));
        };

        let terminal = ending.state();
        self.state = terminal;
        let mut outcome = self.conclude(ending, config);
        if matches!(ending, Ending::Victory | Ending::EnemyEscaped) {
            self.award(&mut outcome, config, content, rng);
        }
        info!(
            player = %outcome.result.player_id,
            enemy = %outcome.result.enemy_id,
            reason = ?outcome.result.terminal_reason,
            exchanges = outcome.result.exchanges,
            "combat finished"
        );

        let mut result = self.exchange_result(terminal, exchange.events);
        result.outcome = Some(outcome);
        self.state = SessionState::Terminated;
        Ok(result)
    }

    /// Resolves a live session as a retreat before it is discarded.
    pub fn abandon(&mut self, config: &EngineConfig) -> Result<CombatOutcome> {
        if !self.state.accepts_actions() {
            return Err(EngineError::invalid_action(self.state, "abandon"));
        }
        self.state = SessionState::Fled;
        let outcome = self.conclude(Ending::PlayerFled, config);
        debug!(player = %self.record.id, "session abandoned");
        self.state = SessionState::Terminated;
        Ok(outcome)
    }

    fn resolve_exchange(
        &self,
        action: &PlayerAction,
        skill: Option<&SkillDefinition>,
        config: &EngineConfig,
        content: &ContentTables,
        rng: &mut impl CombatRng,
    ) -> Result<Exchange> {
        let constants = &config.combat;
        let mut x = Exchange {
            player: self.player.clone(),
            enemy: self.enemy.combatant.clone(),
            cooldowns: self.cooldowns.clone(),
            budget: self.budget,
            events: Vec::new(),
            entries: Vec::new(),
            ending: None,
        };

        // Player step
        if x.player.status_effects.consume(StatusKind::Stunned) {
            let message = format!("{} is stunned and cannot act", x.player.name);
            x.push(CombatEvent::TurnSkipped { side: Side::Player }, message, false, true);
        } else {
            match (action, skill) {
                (PlayerAction::Flee, _) => {
                    x.cooldowns.tick(None);
                    if rng.chance(flee_chance(&x.player, constants)) {
                        let message = format!("{} escapes from {}", x.player.name, x.enemy.name);
                        x.push(CombatEvent::PlayerFled, message, false, true);
                        x.ending = Some(Ending::PlayerFled);
                        return Ok(x);
                    }
                    let message = format!("{} fails to escape", x.player.name);
                    x.push(CombatEvent::FleeFailed, message, false, true);
                }
                (PlayerAction::UseSkill(_), Some(skill)) => {
                    x.cooldowns.tick(Some(skill));
                    x.use_skill(skill, constants, rng);
                }
                _ => {
                    x.cooldowns.tick(None);
                    x.player_strike(1.0, constants, rng);
                }
            }
        }

        if x.check_knockout() {
            return Ok(x);
        }

        // Enemy step
        if x.enemy.status_effects.consume(StatusKind::Stunned) {
            let message = format!("{} is stunned and cannot act", x.enemy.name);
            x.push(CombatEvent::TurnSkipped { side: Side::Enemy }, message, false, false);
        } else {
            let mut counter = CounterAttack::Normal;
            if let Some(special) = &self.definition.ability {
                if rng.chance(special.trigger_chance) {
                    let outcome =
                        dispatch(&special.id, &content.abilities, &x.enemy, &x.player, x.enemy.health)?;
                    if let Some(outcome) = outcome {
                        debug!(ability = %outcome.ability_id, "ability triggered");
                        let (enemy, player) = outcome.apply(&x.enemy, &x.player);
                        x.enemy = enemy;
                        x.player = player;
                        x.push(
                            CombatEvent::AbilityTriggered {
                                ability_id: outcome.ability_id.clone(),
                                message: outcome.log_message.clone(),
                            },
                            outcome.log_message,
                            false,
                            false,
                        );
                        if outcome.escaped {
                            let message = format!("{} escapes!", x.enemy.name);
                            x.push(CombatEvent::EnemyEscaped, message, false, false);
                            x.ending = Some(Ending::EnemyEscaped);
                            return Ok(x);
                        }
                        counter = outcome.counter_attack;
                    }
                }
            }

            match counter {
                CounterAttack::Normal => x.enemy_strike(1.0, constants, rng),
                CounterAttack::Empowered(multiplier) => x.enemy_strike(multiplier, constants, rng),
                CounterAttack::Replaced => {}
            }
        }

        if let Some(poison) = x.player.status_effects.get(StatusKind::Poisoned).copied() {
            x.player = x.player.take_damage(poison.magnitude);
            x.player.status_effects.consume(StatusKind::Poisoned);
            let message = format!("{} takes {} poison damage", x.player.name, poison.magnitude);
            x.push(CombatEvent::PoisonTick { damage: poison.magnitude }, message, false, false);
        }

        let cost = turns::cost(&self.enemy, &config.turns);
        x.budget = turns::spend(x.budget, cost);
        x.events.push(CombatEvent::TurnsSpent {
            cost,
            remaining: x.budget.remaining,
        });

        if !x.check_knockout() && turns::is_exhausted(&x.budget) {
            let message = format!("{} is out of turns and retreats", x.player.name);
            x.push(CombatEvent::ForcedRetreat, message, false, true);
            x.ending = Some(Ending::ForcedRetreat);
        }
        Ok(x)
    }

    /// Builds the terminal result and record without rewards.
    fn conclude(&self, ending: Ending, config: &EngineConfig) -> CombatOutcome {
        let mut record = self.record.clone();
        record.set_turn_budget(self.budget);
        record.absorb_health(&self.player);

        let mut result = CombatResult {
            player_id: record.id.clone(),
            enemy_id: self.definition.id.clone(),
            gold_earned: 0,
            xp_earned: 0,
            level_ups: 0,
            drop: None,
            pending_drop: None,
            terminal_reason: TerminalReason::Fled,
            fled_by: None,
            forced_retreat: false,
            death_penalty: None,
            exchanges: self.exchanges,
            resolved_at: Utc::now().timestamp(),
        };

        match ending {
            Ending::Victory => result.terminal_reason = TerminalReason::Victory,
            Ending::Defeat => {
                record.health = 0;
                let penalty = resolve_death(&DeathSnapshot::from(&record), &config.death);
                record = penalty.apply(&record);
                result.terminal_reason = TerminalReason::Defeat;
                result.death_penalty = Some(penalty);
            }
            Ending::PlayerFled => result.fled_by = Some(Side::Player),
            Ending::EnemyEscaped => result.fled_by = Some(Side::Enemy),
            Ending::ForcedRetreat => {
                result.fled_by = Some(Side::Player);
                result.forced_retreat = true;
            }
        }

        CombatOutcome { result, record }
    }

    /// Reward roll, leveling, drop roll, inventory placement.
    fn award(
        &self,
        outcome: &mut CombatOutcome,
        config: &EngineConfig,
        content: &ContentTables,
        rng: &mut impl CombatRng,
    ) {
        let definition = &self.definition;
        let gold = rng.roll_between(definition.gold_reward.min, definition.gold_reward.max);
        let xp = rng.roll_between(definition.xp_reward.min, definition.xp_reward.max);

        outcome.record.gold = outcome.record.gold.saturating_add(gold);
        let (record, leveled) = outcome.record.gain_experience(xp, &config.leveling);
        outcome.record = record;
        if leveled.level_ups > 0 {
            info!(
                player = %outcome.record.id,
                level = outcome.record.level,
                level_ups = leveled.level_ups,
                "level up"
            );
        }

        let drop = roll_drop(
            definition,
            self.player.charm,
            definition.guaranteed_drop,
            &config.drops,
            rng,
        );
        if let Some(item_id) = &drop {
            let rarity = content
                .item(item_id)
                .map(|item| item.rarity)
                .unwrap_or(definition.rarity);
            let mut inventory = outcome.record.inventory(config.max_inventory_slots);
            if inventory.receive(InventoryItem::new(item_id.clone(), rarity)) == Placement::Pending {
                outcome.result.pending_drop = inventory.pending.clone();
            }
            outcome.record.set_inventory(inventory);
        }

        outcome.result.gold_earned = gold;
        outcome.result.xp_earned = xp;
        outcome.result.level_ups = leveled.level_ups;
        outcome.result.drop = drop;
    }
}
