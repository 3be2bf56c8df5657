//! Integration test: auditable replays
//!
//! A revealed fair seed must reproduce an encounter exactly, and a different
//! nonce must produce an independent roll stream.

use skirmish::core::fairness::FairSeed;
use skirmish::{default_content, Engine, EngineConfig, ExchangeResult, PlayerAction, PlayerRecord};

fn play(seed: &FairSeed) -> Vec<ExchangeResult> {
    let mut engine = Engine::new(EngineConfig::default(), default_content()).unwrap();
    let record = PlayerRecord::new("auditor", "Auditor", engine.config());
    let pool: Vec<String> = vec!["goblin".to_string(), "dire_wolf".to_string()];
    let mut rng = seed.rng();

    let handle = engine.start_encounter(record, &pool, &mut rng).unwrap();
    let mut results = Vec::new();
    for _ in 0..100 {
        let result = engine.submit_action(handle, PlayerAction::Attack, &mut rng).unwrap();
        let done = result.is_terminal();
        results.push(result);
        if done {
            break;
        }
    }
    results
}

/// Strips wall-clock timestamps so runs can be compared.
fn normalized(mut results: Vec<ExchangeResult>) -> Vec<ExchangeResult> {
    for result in &mut results {
        if let Some(outcome) = &mut result.outcome {
            outcome.result.resolved_at = 0;
        }
    }
    results
}

#[test]
fn test_revealed_seed_replays_identically() {
    let seed = FairSeed::new("server-secret", "player-chosen", 1);
    let commitment = seed.commitment();

    let first = normalized(play(&seed));
    assert!(first.last().unwrap().is_terminal());

    let revealed = FairSeed::new("server-secret", "player-chosen", 1);
    assert!(revealed.verify(&commitment));
    assert_eq!(normalized(play(&revealed)), first);
}

#[test]
fn test_tampered_seed_fails_verification() {
    let commitment = FairSeed::new("server-secret", "c", 0).commitment();
    assert!(!FairSeed::new("other-secret", "c", 0).verify(&commitment));
}
