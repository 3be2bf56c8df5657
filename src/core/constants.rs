// Combat
pub const CRITICAL_MULTIPLIER: f64 = 2.0;
pub const BASE_CRITICAL_CHANCE_PERCENT: f64 = 5.0;
pub const CRITICAL_CHARM_CAP: u32 = 25;
pub const FLEE_BASE_CHANCE_PERCENT: f64 = 50.0;
pub const FLEE_CHANCE_PER_CHARM: f64 = 1.0;
pub const FLEE_MAX_CHANCE_PERCENT: f64 = 90.0;
pub const COMBAT_LOG_CAPACITY: usize = 32;

// New characters
pub const STARTING_HEALTH: u32 = 100;
pub const STARTING_STRENGTH: u32 = 10;
pub const STARTING_DEFENSE: u32 = 5;
pub const STARTING_CHARM: u32 = 5;

// XP and leveling
pub const STARTING_XP_TO_NEXT_LEVEL: u64 = 100;
pub const XP_GROWTH_FACTOR: f64 = 1.5;
pub const LEVEL_GROWTH_MAX_HEALTH: u32 = 10;
pub const LEVEL_GROWTH_STRENGTH: u32 = 2;
pub const LEVEL_GROWTH_DEFENSE: u32 = 1;
pub const LEVEL_GROWTH_CHARM: u32 = 1;

// Death penalty
pub const DEATH_GOLD_LOSS_PERCENT: u64 = 25;
pub const DEATH_XP_LOSS_PERCENT: u64 = 10;
pub const DEATH_TURN_COST: u32 = 5;
pub const RESPAWN_HEALTH_PERCENT: u32 = 50;

// Turn economy: base turns per encounter, indexed by rarity tier
pub const TURN_COST_BY_RARITY: [u32; 6] = [1, 1, 2, 3, 4, 5];
pub const TURN_COST_LEVEL_STEP: u32 = 10;
pub const DEFAULT_MAX_TURNS: u32 = 100;

// Item drops: base chance in percent, indexed by rarity tier
pub const DROP_CHANCE_BY_RARITY: [f64; 6] = [5.0, 3.0, 1.0, 2.0, 3.0, 50.0];
pub const DROP_CHARM_BONUS_PER_POINT: f64 = 0.2;
pub const DROP_CHARM_BONUS_CAP: f64 = 4.0;
pub const MAX_INVENTORY_SLOTS: usize = 20;

// Enemy scaling relative to player level
pub const ENEMY_SCALING_PER_LEVEL: f64 = 0.08;
pub const ENEMY_SCALING_MAX_MULTIPLIER: f64 = 3.0;

// Raids
pub const RAID_PHASE_THRESHOLDS_PERCENT: [u32; 2] = [50, 25];
pub const RAID_GUARD_DAMAGE_PERCENT: u32 = 50;
pub const RAID_HEAL_PERCENT_OF_MAX: u32 = 15;
pub const RAID_ENRAGE_ROUND: u32 = 100;
pub const RAID_MAX_PARTY_SIZE: usize = 6;
