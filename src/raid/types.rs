use serde::{Deserialize, Serialize};

use crate::character::stats::{CombatTraits, Combatant, StatusEffects};
use crate::combat::skills::{Cooldowns, SkillId};
use crate::enemies::types::RewardRange;
use crate::items::types::ItemId;

pub type BossId = String;

/// Boss behavior tier entered when health drops to or below the threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossPhase {
    pub health_threshold_percent: u32,
    /// Shield: incoming damage is reduced by this percentage.
    #[serde(default)]
    pub damage_reduction_percent: u32,
    #[serde(default)]
    pub strength_bonus: u32,
    pub message: String,
}

/// Raid boss template. `phases` are ordered by descending threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossDefinition {
    pub id: BossId,
    pub name: String,
    pub level: u32,
    pub max_health: u32,
    pub strength: u32,
    pub defense: u32,
    #[serde(default)]
    pub traits: CombatTraits,
    #[serde(default)]
    pub phases: Vec<BossPhase>,
    pub xp_reward: RewardRange,
    pub gold_reward: RewardRange,
    #[serde(default)]
    pub drop_table: Vec<ItemId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Tank,
    Healer,
    Damage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Controller {
    Human,
    Simulated,
}

/// One raid participant. Members are never removed; dead members are skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyMember {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub controller: Controller,
    pub level: u32,
    pub current_health: u32,
    pub max_health: u32,
    pub strength: u32,
    pub defense: u32,
    #[serde(default)]
    pub traits: CombatTraits,
    #[serde(default)]
    pub status_effects: StatusEffects,
    /// Skills a human member may use. Simulated members ignore this.
    #[serde(default)]
    pub skills: Vec<SkillId>,
    #[serde(default)]
    pub cooldowns: Cooldowns,
}

impl PartyMember {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        role: Role,
        controller: Controller,
        max_health: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
            controller,
            level: 1,
            current_health: max_health,
            max_health,
            strength: 0,
            defense: 0,
            traits: CombatTraits::default(),
            status_effects: StatusEffects::new(),
            skills: Vec::new(),
            cooldowns: Cooldowns::new(),
        }
    }

    pub fn with_stats(mut self, strength: u32, defense: u32) -> Self {
        self.strength = strength;
        self.defense = defense;
        self
    }

    pub fn with_skills(mut self, skills: impl IntoIterator<Item = impl Into<SkillId>>) -> Self {
        self.skills = skills.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_alive(&self) -> bool {
        self.current_health > 0
    }

    pub fn is_human(&self) -> bool {
        self.controller == Controller::Human
    }

    pub fn to_combatant(&self) -> Combatant {
        Combatant {
            id: self.id.clone(),
            name: self.name.clone(),
            level: self.level,
            health: self.current_health.min(self.max_health),
            max_health: self.max_health,
            strength: self.strength,
            defense: self.defense,
            charm: 0,
            weapon_bonus: 0,
            armor_bonus: 0,
            traits: self.traits,
            status_effects: self.status_effects.clone(),
        }
    }

    /// Takes health and status effects back from a resolved combatant.
    pub fn absorb(&mut self, combatant: &Combatant) {
        self.current_health = combatant.health.min(self.max_health);
        self.status_effects = combatant.status_effects.clone();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaidAction {
    Attack,
    /// Halves incoming boss damage until the member's next turn.
    Guard,
    /// Heals the party member at `target`.
    Heal { target: usize },
    UseSkill(SkillId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaidStatus {
    Forming,
    InProgress,
    Victory,
    Defeat,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaidState {
    pub boss_id: BossId,
    pub boss_health: u32,
    pub boss_max_health: u32,
    /// Number of phase thresholds crossed so far. Never decreases.
    pub phase: usize,
    pub party_members: Vec<PartyMember>,
    pub turn_index: usize,
    pub status: RaidStatus,
    pub round: u32,
    #[serde(default)]
    pub boss_status_effects: StatusEffects,
}

impl RaidState {
    pub fn living_members(&self) -> impl Iterator<Item = (usize, &PartyMember)> {
        self.party_members
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_alive())
    }

    pub fn party_wiped(&self) -> bool {
        self.party_members.iter().all(|m| !m.is_alive())
    }

    pub fn boss_defeated(&self) -> bool {
        self.boss_health == 0
    }
}

/// Bookkeeping for one application of damage to the boss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossDamageReport {
    pub applied: u32,
    pub boss_health: u32,
    pub phase_before: usize,
    pub phase_after: usize,
    pub victory: bool,
}

impl BossDamageReport {
    pub fn phase_changed(&self) -> bool {
        self.phase_after != self.phase_before
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RaidEvent {
    MemberAttack {
        member: usize,
        damage: u32,
        was_crit: bool,
    },
    MemberGuard {
        member: usize,
    },
    MemberHeal {
        member: usize,
        target: usize,
        amount: u32,
    },
    SkillUsed {
        member: usize,
        skill_id: SkillId,
    },
    BossAttack {
        target: usize,
        damage: u32,
        was_crit: bool,
    },
    BossStunned,
    /// Damage bounced between the boss and `member`.
    Reflected {
        member: usize,
        amount: u32,
        to_boss: bool,
    },
    PhaseChanged {
        phase: usize,
        message: String,
    },
    MemberDown {
        member: usize,
    },
    Enraged,
    Victory,
    Defeat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaidResult {
    pub boss_id: BossId,
    /// `Victory` or `Defeat`.
    pub outcome: RaidStatus,
    pub rounds: u32,
    pub gold_earned: u64,
    pub xp_earned: u64,
    pub drop: Option<ItemId>,
    /// Ids of members still standing at the end.
    pub survivors: Vec<String>,
    /// UNIX timestamp (seconds).
    pub resolved_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaidExchangeResult {
    pub status: RaidStatus,
    pub events: Vec<RaidEvent>,
    pub boss_health: u32,
    pub phase: usize,
    /// The member whose turn is next, if the raid goes on.
    pub next_member: Option<usize>,
    #[serde(default)]
    pub result: Option<RaidResult>,
}
