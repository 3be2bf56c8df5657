use serde::{Deserialize, Serialize};

use crate::core::config::LevelGrowth;

/// Level and in-level experience of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelProgress {
    pub level: u32,
    pub experience: u64,
    pub experience_to_next_level: u64,
}

/// Stats gained across every level-up of one resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatGains {
    pub max_health: u32,
    pub strength: u32,
    pub defense: u32,
    pub charm: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUpOutcome {
    pub progress: LevelProgress,
    pub level_ups: u32,
    pub gains: StatGains,
}

/// Threshold for the level after one at `current`, floored, never shrinking.
pub fn next_threshold(current: u64, growth: &LevelGrowth) -> u64 {
    let current = current.max(1);
    ((current as f64 * growth.xp_growth_factor).floor() as u64).max(current)
}

/// Adds experience and processes any number of level-ups.
///
/// Each threshold crossed subtracts the current requirement, raises the level
/// and grows the requirement before the next comparison. A single award can
/// cross several thresholds.
pub fn apply_experience(progress: LevelProgress, gained: u64, growth: &LevelGrowth) -> LevelUpOutcome {
    let mut level = progress.level;
    let mut experience = progress.experience.saturating_add(gained);
    let mut to_next = progress.experience_to_next_level.max(1);
    let mut level_ups: u32 = 0;
    let mut gains = StatGains::default();

    while experience >= to_next {
        let grown = next_threshold(to_next, growth);
        // A threshold that stopped growing takes the rest of the award in one step.
        let steps = if grown == to_next { experience / to_next } else { 1 };
        experience -= steps * to_next;
        to_next = grown;

        let steps = u32::try_from(steps).unwrap_or(u32::MAX);
        level = level.saturating_add(steps);
        level_ups = level_ups.saturating_add(steps);
        gains.max_health = gains.max_health.saturating_add(growth.max_health.saturating_mul(steps));
        gains.strength = gains.strength.saturating_add(growth.strength.saturating_mul(steps));
        gains.defense = gains.defense.saturating_add(growth.defense.saturating_mul(steps));
        gains.charm = gains.charm.saturating_add(growth.charm.saturating_mul(steps));
    }

    LevelUpOutcome {
        progress: LevelProgress {
            level,
            experience,
            experience_to_next_level: to_next,
        },
        level_ups,
        gains,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(level: u32, experience: u64, to_next: u64) -> LevelProgress {
        LevelProgress {
            level,
            experience,
            experience_to_next_level: to_next,
        }
    }

    #[test]
    fn test_no_level_up_below_threshold() {
        let outcome = apply_experience(progress(1, 10, 100), 50, &LevelGrowth::default());
        assert_eq!(outcome.level_ups, 0);
        assert_eq!(outcome.progress, progress(1, 60, 100));
        assert_eq!(outcome.gains, StatGains::default());
    }

    #[test]
    fn test_exact_threshold_levels_up() {
        let outcome = apply_experience(progress(1, 0, 100), 100, &LevelGrowth::default());
        assert_eq!(outcome.level_ups, 1);
        assert_eq!(outcome.progress, progress(2, 0, 150));
    }

    #[test]
    fn test_single_award_crosses_two_thresholds() {
        // 95 + 205 = 300; 300 - 100 = 200 (level 5, next 150); 200 - 150 = 50 (level 6, next 225)
        let outcome = apply_experience(progress(4, 95, 100), 205, &LevelGrowth::default());
        assert_eq!(outcome.level_ups, 2);
        assert_eq!(outcome.progress, progress(6, 50, 225));
    }

    #[test]
    fn test_growth_accumulates_per_level() {
        let growth = LevelGrowth::default();
        let outcome = apply_experience(progress(1, 0, 100), 100 + 150 + 225, &growth);
        assert_eq!(outcome.level_ups, 3);
        assert_eq!(outcome.gains.max_health, growth.max_health * 3);
        assert_eq!(outcome.gains.strength, growth.strength * 3);
        assert_eq!(outcome.gains.defense, growth.defense * 3);
        assert_eq!(outcome.gains.charm, growth.charm * 3);
    }

    #[test]
    fn test_threshold_is_floored() {
        let growth = LevelGrowth::default();
        assert_eq!(next_threshold(101, &growth), 151);
        assert_eq!(next_threshold(0, &growth), 1);
    }

    #[test]
    fn test_flat_threshold_absorbs_huge_award() {
        let growth = LevelGrowth {
            xp_growth_factor: 1.0,
            ..LevelGrowth::default()
        };
        let outcome = apply_experience(progress(u32::MAX - 2, 0, 1), u64::MAX, &growth);
        assert_eq!(outcome.progress.level, u32::MAX);
        assert_eq!(outcome.progress.experience, 0);
        assert_eq!(outcome.level_ups, u32::MAX);
        assert_eq!(outcome.gains.max_health, u32::MAX);
    }

    #[test]
    fn test_threshold_of_one_stays_flat_under_floor() {
        let outcome = apply_experience(progress(1, 0, 1), 5, &LevelGrowth::default());
        assert_eq!(outcome.level_ups, 5);
        assert_eq!(outcome.progress, progress(6, 0, 1));
    }

    #[test]
    fn test_zero_threshold_record_does_not_loop() {
        let outcome = apply_experience(progress(1, 0, 0), 3, &LevelGrowth::default());
        assert!(outcome.level_ups >= 1);
        assert!(outcome.progress.experience < outcome.progress.experience_to_next_level);
    }
}
