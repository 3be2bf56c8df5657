//! Property tests for the resolver invariants.

use proptest::prelude::*;

use skirmish::character::death::{resolve_death, DeathSnapshot};
use skirmish::character::leveling::{apply_experience, LevelProgress};
use skirmish::character::stats::{CombatTraits, Combatant};
use skirmish::combat::damage::{resolve, WeaponAdvantages};
use skirmish::combat::turns::{spend, TurnBudget};
use skirmish::core::config::{CombatConstants, DeathRules, DropRules, LevelGrowth};
use skirmish::items::drops::roll_drop;
use skirmish::raid::logic::RaidSession;
use skirmish::raid::types::{Controller, Role};
use skirmish::{default_content, EngineConfig, PartyMember, RandomSource};

proptest! {
    /// Every landed hit deals at least one damage.
    #[test]
    fn prop_damage_is_at_least_one(
        strength in 0u32..10_000,
        weapon_bonus in 0u32..10_000,
        defense in 0u32..20_000,
        armor_bonus in 0u32..10_000,
        armor_penetration in 0u32..10_000,
        seed in any::<u64>()
    ) {
        let mut attacker = Combatant::new("a", "A", 1, 100).with_stats(strength, 0, 0);
        attacker.weapon_bonus = weapon_bonus;
        let mut defender = Combatant::new("d", "D", 1, 100).with_stats(0, defense, 0);
        defender.armor_bonus = armor_bonus;
        let advantages = WeaponAdvantages {
            armor_penetration,
            ..Default::default()
        };

        let result = resolve(
            &attacker,
            &defender,
            &advantages,
            &CombatConstants::default(),
            &mut RandomSource::seeded(seed),
        );
        prop_assert!(result.amount >= 1);
    }

    /// Experience never lowers the level and always ends below the threshold.
    #[test]
    fn prop_leveling_is_monotonic(
        level in 1u32..100,
        to_next in 1u64..100_000,
        start_fraction in 0.0f64..1.0,
        gained in 0u64..2_000_000
    ) {
        let experience = (to_next as f64 * start_fraction) as u64 % to_next;
        let progress = LevelProgress { level, experience, experience_to_next_level: to_next };
        let outcome = apply_experience(progress, gained, &LevelGrowth::default());

        prop_assert!(outcome.progress.level >= level);
        prop_assert_eq!(outcome.progress.level - level, outcome.level_ups);
        prop_assert!(outcome.progress.experience < outcome.progress.experience_to_next_level);
    }

    /// The death penalty never takes more than the player has, and is pure.
    #[test]
    fn prop_death_penalty_is_bounded_and_idempotent(
        gold in any::<u64>(),
        level_progress_xp in any::<u64>(),
        turns_remaining in any::<u32>(),
        max_health in 1u32..100_000
    ) {
        let snapshot = DeathSnapshot { gold, level_progress_xp, turns_remaining, max_health };
        let rules = DeathRules::default();
        let penalty = resolve_death(&snapshot, &rules);

        prop_assert!(penalty.gold_lost <= gold);
        prop_assert!(penalty.xp_lost <= level_progress_xp);
        prop_assert!(penalty.turns_lost <= turns_remaining);
        prop_assert!(penalty.respawn_health >= 1 && penalty.respawn_health <= max_health);
        prop_assert_eq!(penalty, resolve_death(&snapshot, &rules));
    }

    /// Spending any sequence of costs keeps the budget within bounds.
    #[test]
    fn prop_turn_budget_stays_in_bounds(
        max in 0u32..1_000,
        costs in proptest::collection::vec(0u32..50, 0..100)
    ) {
        let mut budget = TurnBudget::full(max);
        for cost in costs {
            budget = spend(budget, cost);
            prop_assert!(budget.remaining <= budget.max);
        }
        prop_assert_eq!(budget.max, max);
    }

    /// A kill yields at most one item, and only from the enemy's table.
    #[test]
    fn prop_drop_is_single_item_from_table(
        charm in 0u32..1_000,
        forced in any::<bool>(),
        seed in any::<u64>()
    ) {
        let content = default_content();
        let mut rng = RandomSource::seeded(seed);
        for enemy in &content.enemies {
            let drop = roll_drop(enemy, charm, forced, &DropRules::default(), &mut rng);
            if let Some(item) = drop {
                prop_assert!(enemy.drop_table.contains(&item));
            } else if forced {
                prop_assert!(enemy.drop_table.is_empty());
            }
        }
    }

    /// Boss phases only move forward and health never underflows.
    #[test]
    fn prop_boss_phase_is_monotonic(
        hits in proptest::collection::vec(0u32..1_500, 1..40)
    ) {
        let content = default_content();
        let boss = &content.bosses[0];
        let member = PartyMember::new("h", "H", Role::Damage, Controller::Human, 100);
        let mut raid = RaidSession::start(vec![member], boss, &EngineConfig::default().raid).unwrap();

        let mut phase = 0;
        for hit in hits {
            let report = raid.apply_boss_damage(hit);
            prop_assert!(report.phase_after >= phase);
            prop_assert!(report.boss_health <= boss.max_health);
            prop_assert_eq!(report.victory, report.boss_health == 0);
            phase = report.phase_after;
        }
    }

    /// Traits never push a resolved amount below the floor.
    #[test]
    fn prop_reflection_never_exceeds_hit(
        strength in 1u32..5_000,
        reflect_percent in 0.0f64..100.0,
        seed in any::<u64>()
    ) {
        let attacker = Combatant::new("a", "A", 1, 100).with_stats(strength, 0, 0);
        let defender = Combatant::new("d", "D", 1, 100).with_traits(CombatTraits {
            reflect_percent,
            ..Default::default()
        });
        let result = resolve(
            &attacker,
            &defender,
            &WeaponAdvantages::default(),
            &CombatConstants::default(),
            &mut RandomSource::seeded(seed),
        );
        prop_assert!(result.reflected <= result.amount);
    }
}
