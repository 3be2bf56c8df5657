//! Raid session: a party of human and simulated members against one boss.
//!
//! Members act round-robin by fixed index, skipping the dead. The boss acts
//! once after every member turn against a random living member. A call to
//! `submit` plays the acting human's turn plus every simulated turn up to the
//! next human turn, and is committed only once all of it has resolved.

use chrono::Utc;
use tracing::{debug, info};

use super::types::{
    BossDamageReport, BossDefinition, BossPhase, PartyMember, RaidAction, RaidEvent,
    RaidExchangeResult, RaidResult, RaidState, RaidStatus,
};
use crate::character::stats::{Combatant, StatusEffect, StatusEffects, StatusKind};
use crate::combat::damage::{self, WeaponAdvantages};
use crate::combat::skills::{find_skill, SkillEffect};
use crate::core::config::{CombatConstants, ContentTables, EngineConfig, RaidRules};
use crate::core::error::{EngineError, Result};
use crate::core::rng::CombatRng;
use crate::items::drops::roll_from_table;
use crate::items::types::Rarity;

/// Number of phase thresholds at or above the boss's current health percent.
pub fn phase_for_health(phases: &[BossPhase], health: u32, max_health: u32) -> usize {
    phases
        .iter()
        .filter(|p| health as u64 * 100 <= p.health_threshold_percent as u64 * max_health as u64)
        .count()
}

/// Checks a roster before a raid forms.
pub fn validate_roster(roster: &[PartyMember], rules: &RaidRules) -> Result<()> {
    if roster.is_empty() {
        return Err(EngineError::InvalidRoster("party is empty".to_string()));
    }
    if roster.len() > rules.max_party_size {
        return Err(EngineError::InvalidRoster(format!(
            "party of {} exceeds the limit of {}",
            roster.len(),
            rules.max_party_size
        )));
    }
    if !roster.iter().any(PartyMember::is_human) {
        return Err(EngineError::InvalidRoster(
            "party needs a human-controlled member".to_string(),
        ));
    }
    for (i, member) in roster.iter().enumerate() {
        if member.max_health == 0 || !member.is_alive() {
            return Err(EngineError::InvalidRoster(format!(
                "member `{}` has no health",
                member.id
            )));
        }
        if roster[..i].iter().any(|other| other.id == member.id) {
            return Err(EngineError::InvalidRoster(format!(
                "member `{}` appears twice",
                member.id
            )));
        }
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct RaidSession {
    state: RaidState,
    boss: BossDefinition,
}

impl RaidSession {
    /// An empty party facing `boss`.
    pub fn form(boss: &BossDefinition) -> Self {
        Self {
            state: RaidState {
                boss_id: boss.id.clone(),
                boss_health: boss.max_health.max(1),
                boss_max_health: boss.max_health.max(1),
                phase: 0,
                party_members: Vec::new(),
                turn_index: 0,
                status: RaidStatus::Forming,
                round: 1,
                boss_status_effects: StatusEffects::new(),
            },
            boss: boss.clone(),
        }
    }

    pub fn join(&mut self, member: PartyMember, rules: &RaidRules) -> Result<()> {
        if self.state.status != RaidStatus::Forming {
            return Err(EngineError::invalid_action(self.state.status, "join"));
        }
        // the human requirement is only checked when the raid begins
        if self.state.party_members.len() >= rules.max_party_size {
            return Err(EngineError::InvalidRoster(format!(
                "party is already at the limit of {}",
                rules.max_party_size
            )));
        }
        if member.max_health == 0 || !member.is_alive() {
            return Err(EngineError::InvalidRoster(format!(
                "member `{}` has no health",
                member.id
            )));
        }
        if self.state.party_members.iter().any(|m| m.id == member.id) {
            return Err(EngineError::InvalidRoster(format!(
                "member `{}` appears twice",
                member.id
            )));
        }
        self.state.party_members.push(member);
        Ok(())
    }

    /// Forming -> InProgress.
    pub fn begin(&mut self, rules: &RaidRules) -> Result<()> {
        if self.state.status != RaidStatus::Forming {
            return Err(EngineError::invalid_action(self.state.status, "begin"));
        }
        validate_roster(&self.state.party_members, rules)?;
        self.state.status = RaidStatus::InProgress;
        self.state.turn_index = 0;
        debug!(
            boss = %self.boss.id,
            party = self.state.party_members.len(),
            "raid {:?} -> {:?}",
            RaidStatus::Forming,
            RaidStatus::InProgress
        );
        Ok(())
    }

    pub fn start(roster: Vec<PartyMember>, boss: &BossDefinition, rules: &RaidRules) -> Result<Self> {
        validate_roster(&roster, rules)?;
        let mut raid = Self::form(boss);
        for member in roster {
            raid.join(member, rules)?;
        }
        raid.begin(rules)?;
        Ok(raid)
    }

    pub fn state(&self) -> &RaidState {
        &self.state
    }

    pub fn status(&self) -> RaidStatus {
        self.state.status
    }

    pub fn boss(&self) -> &BossDefinition {
        &self.boss
    }

    /// Index of the member whose turn it is.
    pub fn current_member(&self) -> Option<usize> {
        if self.state.status != RaidStatus::InProgress {
            return None;
        }
        self.state
            .party_members
            .get(self.state.turn_index)
            .filter(|m| m.is_alive())
            .map(|_| self.state.turn_index)
    }

    /// The human whose input the next `submit` consumes.
    pub fn acting_human(&self) -> Option<usize> {
        let len = self.state.party_members.len();
        (0..len)
            .map(|step| (self.state.turn_index + step) % len)
            .find(|&i| {
                let member = &self.state.party_members[i];
                member.is_human() && member.is_alive()
            })
    }

    fn current_phase(&self) -> Option<&BossPhase> {
        self.state
            .phase
            .checked_sub(1)
            .and_then(|i| self.boss.phases.get(i))
    }

    fn boss_combatant(&self) -> Combatant {
        let strength_bonus = self.current_phase().map_or(0, |p| p.strength_bonus);
        Combatant {
            id: self.boss.id.clone(),
            name: self.boss.name.clone(),
            level: self.boss.level,
            health: self.state.boss_health,
            max_health: self.state.boss_max_health,
            strength: self.boss.strength.saturating_add(strength_bonus),
            defense: self.boss.defense,
            charm: 0,
            weapon_bonus: 0,
            armor_bonus: 0,
            traits: self.boss.traits,
            status_effects: self.state.boss_status_effects.clone(),
        }
    }

    /// Applies damage to the boss and advances phases and status.
    ///
    /// Health clamps at zero. Phases only move forward, even if the boss is
    /// later healed above a threshold.
    pub fn apply_boss_damage(&mut self, amount: u32) -> BossDamageReport {
        let phase_before = self.state.phase;
        let applied = amount.min(self.state.boss_health);
        self.state.boss_health -= applied;

        let reached = phase_for_health(
            &self.boss.phases,
            self.state.boss_health,
            self.state.boss_max_health,
        );
        self.state.phase = self.state.phase.max(reached);
        if self.state.phase != phase_before {
            debug!(boss = %self.boss.id, phase = self.state.phase, "boss phase changed");
        }

        let victory = self.state.boss_defeated();
        if victory && self.state.status == RaidStatus::InProgress {
            self.state.status = RaidStatus::Victory;
        }

        BossDamageReport {
            applied,
            boss_health: self.state.boss_health,
            phase_before,
            phase_after: self.state.phase,
            victory,
        }
    }

    fn record_damage(&mut self, amount: u32, events: &mut Vec<RaidEvent>) {
        let report = self.apply_boss_damage(amount);
        for phase in report.phase_before + 1..=report.phase_after {
            let message = self
                .boss
                .phases
                .get(phase - 1)
                .map(|p| p.message.clone())
                .unwrap_or_default();
            events.push(RaidEvent::PhaseChanged { phase, message });
        }
    }

    /// Member `index` attacks the boss. Raids have no dodge rolls.
    fn member_strike(
        &mut self,
        index: usize,
        multiplier: f64,
        constants: &CombatConstants,
        rng: &mut impl CombatRng,
        events: &mut Vec<RaidEvent>,
    ) {
        let attacker = self.state.party_members[index].to_combatant();
        let boss = self.boss_combatant();
        let advantages = WeaponAdvantages::for_attacker(&attacker, constants);
        let mut result = damage::resolve(&attacker, &boss, &advantages, constants, rng);
        if multiplier != 1.0 {
            result = damage::amplify(result, multiplier, &boss);
        }
        if let Some(shield) = self.current_phase().map(|p| p.damage_reduction_percent.min(100)) {
            if shield > 0 {
                result.amount = damage::scale_amount(result.amount, (100 - shield) as f64);
                result.reflected =
                    damage::calculate_damage_reflection(result.amount, boss.traits.reflect_percent);
            }
        }

        let attacker = attacker.heal(result.healed).take_damage(result.reflected);
        self.state.party_members[index].absorb(&attacker);
        events.push(RaidEvent::MemberAttack {
            member: index,
            damage: result.amount,
            was_crit: result.is_critical,
        });
        if result.reflected > 0 {
            events.push(RaidEvent::Reflected {
                member: index,
                amount: result.reflected,
                to_boss: false,
            });
        }
        self.record_damage(result.amount, events);
        if !self.state.party_members[index].is_alive() {
            events.push(RaidEvent::MemberDown { member: index });
        }
    }

    /// `target` if it is standing, otherwise the healer.
    fn heal_target(&self, healer: usize, target: usize) -> usize {
        if self
            .state
            .party_members
            .get(target)
            .is_some_and(PartyMember::is_alive)
        {
            target
        } else {
            healer
        }
    }

    fn heal_member(&mut self, healer: usize, target: usize, amount: u32, events: &mut Vec<RaidEvent>) {
        let member = &mut self.state.party_members[target];
        let before = member.current_health;
        member.current_health = member.current_health.saturating_add(amount).min(member.max_health);
        events.push(RaidEvent::MemberHeal {
            member: healer,
            target,
            amount: member.current_health - before,
        });
    }

    fn raid_heal_amount(&self, target: usize, rules: &RaidRules) -> u32 {
        let max_health = self.state.party_members[target].max_health;
        ((max_health as u64 * rules.heal_percent_of_max as u64 / 100) as u32).max(1)
    }

    /// Living member with the lowest health percentage.
    fn most_wounded(&self) -> Option<usize> {
        self.state
            .living_members()
            .min_by(|(_, a), (_, b)| {
                let lhs = a.current_health as u64 * b.max_health as u64;
                let rhs = b.current_health as u64 * a.max_health as u64;
                lhs.cmp(&rhs)
            })
            .map(|(i, _)| i)
    }

    fn simulated_action(&self, index: usize, rng: &mut impl CombatRng) -> RaidAction {
        match rng.roll_index(3) {
            0 => RaidAction::Attack,
            1 => RaidAction::Guard,
            _ => RaidAction::Heal {
                target: self.most_wounded().unwrap_or(index),
            },
        }
    }

    fn validate_action(&self, actor: usize, action: &RaidAction, content: &ContentTables) -> Result<()> {
        let member = &self.state.party_members[actor];
        match action {
            RaidAction::UseSkill(skill_id) => {
                find_skill(&content.skills, skill_id)?;
                if !member.skills.contains(skill_id) {
                    return Err(EngineError::invalid_action(self.state.status, action));
                }
                member.cooldowns.check(skill_id)
            }
            RaidAction::Heal { target } => {
                if self
                    .state
                    .party_members
                    .get(*target)
                    .is_some_and(PartyMember::is_alive)
                {
                    Ok(())
                } else {
                    Err(EngineError::invalid_action(self.state.status, action))
                }
            }
            RaidAction::Attack | RaidAction::Guard => Ok(()),
        }
    }

    fn member_turn(
        &mut self,
        index: usize,
        action: &RaidAction,
        config: &EngineConfig,
        content: &ContentTables,
        rng: &mut impl CombatRng,
        events: &mut Vec<RaidEvent>,
    ) -> Result<()> {
        let constants = &config.combat;
        let skill = match action {
            RaidAction::UseSkill(id) => Some(find_skill(&content.skills, id)?),
            _ => None,
        };

        let member = &mut self.state.party_members[index];
        member.status_effects.remove(StatusKind::Guarding);
        if member.is_human() {
            member.cooldowns.tick(skill);
        }

        match (action, skill) {
            (RaidAction::Guard, _) => {
                member
                    .status_effects
                    .apply(StatusEffect::new(StatusKind::Guarding, 1));
                events.push(RaidEvent::MemberGuard { member: index });
            }
            (RaidAction::Heal { target }, _) => {
                let target = self.heal_target(index, *target);
                let amount = self.raid_heal_amount(target, &config.raid);
                self.heal_member(index, target, amount, events);
            }
            (RaidAction::UseSkill(_), Some(skill)) => {
                events.push(RaidEvent::SkillUsed {
                    member: index,
                    skill_id: skill.id.clone(),
                });
                match &skill.effect {
                    SkillEffect::Strike { multiplier } => {
                        self.member_strike(index, *multiplier, constants, rng, events);
                    }
                    SkillEffect::Heal { amount } => self.heal_member(index, index, *amount, events),
                    SkillEffect::Stun { turns } => {
                        self.member_strike(index, 1.0, constants, rng, events);
                        if !self.state.boss_defeated() {
                            self.state
                                .boss_status_effects
                                .apply(StatusEffect::new(StatusKind::Stunned, *turns));
                        }
                    }
                }
            }
            _ => self.member_strike(index, 1.0, constants, rng, events),
        }
        Ok(())
    }

    fn boss_turn(&mut self, config: &EngineConfig, rng: &mut impl CombatRng, events: &mut Vec<RaidEvent>) {
        if self.state.boss_status_effects.consume(StatusKind::Stunned) {
            events.push(RaidEvent::BossStunned);
            return;
        }
        let living: Vec<usize> = self.state.living_members().map(|(i, _)| i).collect();
        if living.is_empty() {
            return;
        }
        let target = living[rng.roll_index(living.len())];

        let constants = &config.combat;
        let boss = self.boss_combatant();
        let defender = self.state.party_members[target].to_combatant();
        let advantages = WeaponAdvantages::for_attacker(&boss, constants);
        let mut result = damage::resolve(&boss, &defender, &advantages, constants, rng);
        if defender.status_effects.has(StatusKind::Guarding) {
            result.amount = damage::scale_amount(result.amount, config.raid.guard_damage_percent as f64);
            result.reflected =
                damage::calculate_damage_reflection(result.amount, defender.traits.reflect_percent);
        }

        let defender_after = defender.take_damage(result.amount);
        self.state.party_members[target].absorb(&defender_after);
        events.push(RaidEvent::BossAttack {
            target,
            damage: result.amount,
            was_crit: result.is_critical,
        });
        if defender_after.is_defeated() {
            events.push(RaidEvent::MemberDown { member: target });
        }

        // lifesteal first, then reflection through the phase bookkeeping
        self.state.boss_health = self
            .state
            .boss_health
            .saturating_add(result.healed)
            .min(self.state.boss_max_health);
        if result.reflected > 0 {
            events.push(RaidEvent::Reflected {
                member: target,
                amount: result.reflected,
                to_boss: true,
            });
            self.record_damage(result.reflected, events);
        }
    }

    /// Moves `turn_index` to the next living member, counting rounds.
    fn advance(&mut self, rules: &RaidRules, events: &mut Vec<RaidEvent>) {
        let len = self.state.party_members.len();
        let mut index = self.state.turn_index;
        for _ in 0..len {
            index += 1;
            if index >= len {
                index = 0;
                self.state.round += 1;
            }
            if self.state.party_members[index].is_alive() {
                break;
            }
        }
        self.state.turn_index = index;

        if self.state.round >= rules.enrage_round {
            info!(boss = %self.boss.id, round = self.state.round, "boss enraged");
            for member in &mut self.state.party_members {
                member.current_health = 0;
            }
            self.state.status = RaidStatus::Defeat;
            events.push(RaidEvent::Enraged);
            events.push(RaidEvent::Defeat);
        }
    }

    /// Boss response and bookkeeping after one member turn.
    fn after_member_turn(&mut self, config: &EngineConfig, rng: &mut impl CombatRng, events: &mut Vec<RaidEvent>) {
        if self.state.boss_defeated() {
            self.state.status = RaidStatus::Victory;
            events.push(RaidEvent::Victory);
            return;
        }

        self.boss_turn(config, rng, events);

        // boss defeat is checked before the party wipe
        if self.state.boss_defeated() {
            self.state.status = RaidStatus::Victory;
            events.push(RaidEvent::Victory);
        } else if self.state.party_wiped() {
            self.state.status = RaidStatus::Defeat;
            events.push(RaidEvent::Defeat);
        } else {
            self.advance(&config.raid, events);
        }
    }

    /// Plays the acting human's turn and the simulated turns around it.
    ///
    /// If no human is left standing the raid is played out to its end and
    /// `action` is ignored.
    pub fn submit(
        &mut self,
        action: RaidAction,
        config: &EngineConfig,
        content: &ContentTables,
        rng: &mut impl CombatRng,
    ) -> Result<RaidExchangeResult> {
        if self.state.status != RaidStatus::InProgress {
            return Err(EngineError::invalid_action(self.state.status, &action));
        }
        let actor = self.acting_human();
        if let Some(actor) = actor {
            self.validate_action(actor, &action, content)?;
        }

        let mut next = self.clone();
        let mut events = Vec::new();
        let mut human_acted = false;

        while next.state.status == RaidStatus::InProgress {
            let Some(current) = next.current_member() else {
                break;
            };
            if next.state.party_members[current].is_human() {
                if human_acted || Some(current) != actor {
                    break;
                }
                next.member_turn(current, &action, config, content, rng, &mut events)?;
                human_acted = true;
            } else {
                let simulated = next.simulated_action(current, rng);
                next.member_turn(current, &simulated, config, content, rng, &mut events)?;
            }
            next.after_member_turn(config, rng, &mut events);
        }

        let terminal = next.state.status;
        let result = match terminal {
            RaidStatus::Victory | RaidStatus::Defeat => Some(next.conclude(config, rng)),
            _ => None,
        };

        *self = next;
        Ok(RaidExchangeResult {
            status: terminal,
            events,
            boss_health: self.state.boss_health,
            phase: self.state.phase,
            next_member: self.current_member(),
            result,
        })
    }

    fn conclude(&mut self, config: &EngineConfig, rng: &mut impl CombatRng) -> RaidResult {
        let outcome = self.state.status;
        let victory = outcome == RaidStatus::Victory;
        let (gold, xp, drop) = if victory {
            let gold = rng.roll_between(self.boss.gold_reward.min, self.boss.gold_reward.max);
            let xp = rng.roll_between(self.boss.xp_reward.min, self.boss.xp_reward.max);
            let drop = roll_from_table(&self.boss.drop_table, Rarity::Boss, 0, false, &config.drops, rng);
            (gold, xp, drop)
        } else {
            (0, 0, None)
        };

        let result = RaidResult {
            boss_id: self.boss.id.clone(),
            outcome,
            rounds: self.state.round,
            gold_earned: gold,
            xp_earned: xp,
            drop,
            survivors: self
                .state
                .living_members()
                .map(|(_, m)| m.id.clone())
                .collect(),
            resolved_at: Utc::now().timestamp(),
        };
        info!(boss = %result.boss_id, outcome = ?outcome, rounds = result.rounds, "raid finished");
        self.state.status = RaidStatus::Completed;
        result
    }
}
