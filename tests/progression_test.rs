//! Integration test: character progression
//!
//! Worked damage, leveling and death examples, plus a long run of
//! encounters where the player record is threaded from one session into the
//! next and its invariants are checked after every fight.

use skirmish::character::death::{resolve_death, DeathSnapshot};
use skirmish::character::stats::Combatant;
use skirmish::combat::damage::{resolve, WeaponAdvantages};
use skirmish::combat::types::TerminalReason;
use skirmish::core::config::{CombatConstants, DeathRules, LevelGrowth};
use skirmish::items::inventory::DropDecision;
use skirmish::{
    default_content, Engine, EngineConfig, EngineError, PlayerAction, PlayerRecord, RandomSource,
    ScriptedRng,
};

// =============================================================================
// Worked examples
// =============================================================================

#[test]
fn test_plain_hit_subtracts_defense() {
    let player = Combatant::new("p", "Player", 1, 100).with_stats(10, 5, 0);
    let enemy = Combatant::new("e", "Enemy", 1, 40).with_stats(4, 3, 0);
    let result = resolve(
        &player,
        &enemy,
        &WeaponAdvantages::default(),
        &CombatConstants::default(),
        &mut ScriptedRng::constant(99.0),
    );
    assert_eq!(result.amount, 7);
    assert!(!result.is_critical);
}

#[test]
fn test_big_award_levels_twice_and_heals() {
    let config = EngineConfig::default();
    let mut record = PlayerRecord::new("p", "Player", &config);
    record.level = 4;
    record.experience = 95;
    record.experience_to_next_level = 100;
    record.health = 10;

    let (next, outcome) = record.gain_experience(205, &LevelGrowth::default());
    assert_eq!(outcome.level_ups, 2);
    assert_eq!(next.level, 6);
    assert_eq!(next.experience, 50);
    assert_eq!(next.experience_to_next_level, 225);
    assert_eq!(next.max_health, record.max_health + 2 * config.leveling.max_health);
    assert_eq!(next.health, next.max_health);
}

#[test]
fn test_same_award_below_second_threshold_levels_once() {
    let mut record = PlayerRecord::new("p", "Player", &EngineConfig::default());
    record.level = 4;
    record.experience = 95;

    let (next, outcome) = record.gain_experience(150, &LevelGrowth::default());
    // 245 - 100 leaves 145, short of the grown 150 threshold
    assert_eq!(outcome.level_ups, 1);
    assert_eq!((next.level, next.experience), (5, 145));
}

#[test]
fn test_death_with_one_turn_left() {
    let snapshot = DeathSnapshot {
        gold: 100,
        level_progress_xp: 0,
        turns_remaining: 1,
        max_health: 100,
    };
    let penalty = resolve_death(&snapshot, &DeathRules::default());
    assert_eq!(penalty.gold_lost, 25);
    assert_eq!(penalty.turns_lost, 1);

    let mut record = PlayerRecord::new("p", "Player", &EngineConfig::default());
    record.gold = 100;
    record.turns_remaining = 1;
    let after = penalty.apply(&record);
    assert_eq!(after.turns_remaining, 0);
    assert_eq!(after.gold, 75);
}

// =============================================================================
// Threading the record through many encounters
// =============================================================================

#[test]
fn test_record_survives_a_long_campaign() {
    let mut engine = Engine::new(EngineConfig::default(), default_content()).unwrap();
    let pool: Vec<String> = ["goblin", "dire_wolf", "marsh_spider", "golden_slime"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let mut rng = RandomSource::seeded(2024);
    let mut record = PlayerRecord::new("p", "Player", engine.config());
    let mut victories = 0;

    for _ in 0..200 {
        if record.pending_drop.is_some() {
            record = engine.resolve_drop(&record, DropDecision::Discard).unwrap();
        }
        let handle = match engine.start_encounter(record.clone(), &pool, &mut rng) {
            Ok(handle) => handle,
            Err(EngineError::TurnsExhausted) => break,
            Err(other) => panic!("unexpected error: {other}"),
        };

        let mut outcome = None;
        for _ in 0..200 {
            let result = engine.submit_action(handle, PlayerAction::Attack, &mut rng).unwrap();
            assert!(result.turns_remaining <= record.max_turns);
            if let Some(done) = result.outcome {
                outcome = Some(done);
                break;
            }
        }
        let outcome = outcome.expect("encounter should end");
        let next = outcome.record;

        assert!(next.level >= record.level, "level never decreases");
        assert!(next.experience < next.experience_to_next_level);
        assert!(next.health <= next.max_health);
        assert!(next.turns_remaining <= next.max_turns);
        assert!(next.inventory.len() <= engine.config().max_inventory_slots);
        if outcome.result.terminal_reason == TerminalReason::Victory {
            victories += 1;
            assert!(next.gold >= record.gold);
        }
        if next.health == 0 {
            break;
        }
        record = next;
    }

    assert!(victories > 0);
    assert!(record.level > 1, "a campaign this long should level the player");
}
