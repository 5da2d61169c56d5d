//! Runner, messages and replay through the public API.

use tenbou_core::game_loop::{FirstActionSelector, GameRunner, RandomActionSelector, SelectorAgent};
use tenbou_core::message::ObservationMessage;
use tenbou_core::replay;
use tenbou_core::seeding::SessionRng;
use tenbou_engine::round_log::{GameLog, RoundEvent};
use tenbou_engine::{GameConfig, GameMode, GameRule};

#[test]
fn game_runner_completes() {
    let mut runner = GameRunner::new(GameConfig::new(42, GameMode::East)).unwrap();
    runner
        .run_to_completion(&mut SelectorAgent::new(FirstActionSelector))
        .unwrap();
    assert!(runner.is_done());
    assert!(runner.total_actions() > 20);
    assert!(runner.rounds_played() > 0);
}

#[test]
fn every_round_ends_once() {
    let mut runner = GameRunner::new(GameConfig::new(7, GameMode::Half)).unwrap();
    runner
        .run_to_completion(&mut SelectorAgent::new(RandomActionSelector::new(7)))
        .unwrap();
    let events = runner.state().log().events();
    let deals = events.iter().filter(|e| matches!(e.event, RoundEvent::Deal { .. })).count();
    let ends = events.iter().filter(|e| matches!(e.event, RoundEvent::RoundEnd { .. })).count();
    assert_eq!(deals, ends);
    assert_eq!(ends as u32, runner.rounds_played());
}

#[test]
fn observation_message_is_json() {
    let runner = GameRunner::new(GameConfig::new(5, GameMode::East)).unwrap();
    let obs = ObservationMessage::new(runner.state(), 0);
    let back = ObservationMessage::from_json(&obs.to_json().unwrap()).unwrap();
    assert_eq!(back, obs);
    // The dealer has drawn, so the view holds 14 tiles.
    assert_eq!(back.observation.hand.len(), 14);
    assert_eq!(back.observation.hand.len(), runner.state().hand(0).concealed().len());
    assert!(back.observation.drawn_tile.is_some());
}

fn recorded(seed: u64, mode: GameMode, rule: GameRule) -> (GameConfig, GameLog) {
    let config = GameConfig::new(seed, mode).with_rule(rule);
    let mut runner = GameRunner::new(config.clone()).unwrap();
    runner
        .run_to_completion(&mut SelectorAgent::new(RandomActionSelector::new(seed ^ 0x5eed)))
        .unwrap();
    (config, runner.into_state().log().clone())
}

#[test]
fn replay_reproduces_log() {
    for seed in 0..6 {
        let (config, log) = recorded(seed, GameMode::East, GameRule::default());
        let state = replay::verify(config, &log).unwrap();
        assert_eq!(
            state.log().to_json_lines().unwrap(),
            log.to_json_lines().unwrap()
        );
    }
}

#[test]
fn replay_from_exported_lines() {
    let (config, log) = recorded(11, GameMode::Single, GameRule::default_head_bump());
    let text = log.to_json_lines().unwrap();
    let parsed = GameLog::from_json_lines(log.seed, &text).unwrap();
    assert_eq!(parsed, log);
    replay::verify(config, &parsed).unwrap();
}

#[test]
fn tampered_log_is_detected() {
    let (config, mut log) = recorded(2, GameMode::Single, GameRule::default());
    let i = log
        .events
        .iter()
        .position(|e| matches!(e.event, RoundEvent::Discard { .. }))
        .unwrap();
    if let RoundEvent::Discard { seat, .. } = &mut log.events[i].event {
        *seat = (*seat + 1) % 4;
    }
    assert!(replay::verify(config, &log).is_err());
}

#[test]
fn session_games_differ() {
    let mut session = SessionRng::from_u64(1);
    let a = GameRunner::new_with_session(&mut session, GameMode::East).unwrap();
    let b = GameRunner::new_with_session(&mut session, GameMode::East).unwrap();
    assert_ne!(a.state().config().seed, b.state().config().seed);
    assert_ne!(a.state().wall().tiles(), b.state().wall().tiles());
}
