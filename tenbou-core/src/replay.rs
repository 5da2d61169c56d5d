//! Replays a recorded game.
//!
//! A round log holds every decision that changed the table: discards (with
//! the riichi flag), calls and kans, and the way each round ended. Feeding
//! those decisions back into a fresh state on the same seed and rules must
//! reproduce the log exactly. Seats that do not appear in the log at a
//! reaction window passed.

use std::collections::VecDeque;

use anyhow::{anyhow, bail, ensure, Context};
use log::debug;
use tenbou_engine::round_log::{GameLog, RoundEvent};
use tenbou_engine::types::MeldKind;
use tenbou_engine::{AbortReason, Action, ActionKind, GameConfig, GameState, Phase, RoundOutcome};

/// Decisions of a logged game in the order the table took them.
pub fn decisions(log: &GameLog) -> anyhow::Result<VecDeque<Action>> {
    let mut out = VecDeque::new();
    let mut last_drawer = None;
    for logged in log.events() {
        match &logged.event {
            RoundEvent::Deal { .. } | RoundEvent::DoraReveal { .. } | RoundEvent::RiichiDeclared { .. } => {}
            RoundEvent::Draw { seat, .. } => last_drawer = Some(*seat),
            RoundEvent::Discard { seat, tile, riichi, .. } => {
                if *riichi {
                    out.push_back(Action::riichi(*seat));
                }
                out.push_back(Action::discard(*seat, *tile));
            }
            RoundEvent::Call { seat, meld } => {
                let seat = *seat;
                let meld = meld.clone();
                out.push_back(match meld.kind {
                    MeldKind::Chi => Action::chi(seat, meld),
                    MeldKind::Pon => Action::pon(seat, meld),
                    MeldKind::Daiminkan => Action::daiminkan(seat, meld),
                    MeldKind::Ankan => Action::ankan(seat, meld),
                    MeldKind::Kakan => Action::kakan(seat, meld),
                });
            }
            RoundEvent::RoundEnd { outcome, .. } => match outcome {
                RoundOutcome::Tsumo { winner } => out.push_back(Action::tsumo(*winner)),
                RoundOutcome::Ron { winners, .. } => out.extend(winners.iter().map(|&w| Action::ron(w))),
                RoundOutcome::AbortiveDraw {
                    reason: AbortReason::NineTerminals,
                } => {
                    let seat = last_drawer.ok_or_else(|| anyhow!("nine terminals declared before any draw"))?;
                    out.push_back(Action::nine_terminals(seat));
                }
                _ => {}
            },
        }
    }
    Ok(out)
}

/// Replays `log` under `config` (whose seed is replaced by the log's) and
/// returns the final state.
pub fn replay(config: GameConfig, log: &GameLog) -> anyhow::Result<GameState> {
    let config = GameConfig {
        seed: log.seed,
        record_log: true,
        ..config
    };
    let mut script = decisions(log)?;
    let mut state = GameState::new(config).context("configuring replay")?;
    state.start().context("starting replay")?;

    loop {
        match state.phase() {
            Phase::GameOver => break,
            Phase::RoundOver if script.is_empty() => break,
            Phase::RoundOver => state.start_next_round().context("starting the next round")?,
            Phase::RoundInProgress(_) => play_window(&mut state, &mut script)?,
            Phase::NotStarted => bail!("replayed game fell back to not started"),
        }
    }
    ensure!(script.is_empty(), "{} logged decisions were never reached", script.len());
    debug!("replayed game {} over {} rounds", log.seed, state.score().round);
    Ok(state)
}

/// Replays `log` and checks the new log matches it event for event.
pub fn verify(config: GameConfig, log: &GameLog) -> anyhow::Result<GameState> {
    let state = replay(config, log)?;
    let replayed = state.log().events();
    if let Some(i) = replayed.iter().zip(log.events()).position(|(a, b)| a != b) {
        bail!(
            "replay diverges at event {}: logged {:?}, replayed {:?}",
            i,
            log.events()[i],
            replayed[i]
        );
    }
    ensure!(
        replayed.len() == log.events().len(),
        "replay produced {} events, log has {}",
        replayed.len(),
        log.events().len()
    );
    Ok(state)
}

/// Answers one decision window from the script.
fn play_window(state: &mut GameState, script: &mut VecDeque<Action>) -> anyhow::Result<()> {
    let pending = state.pending_seats();
    if state.phase() != Phase::RoundInProgress(tenbou_engine::TurnPhase::AwaitingDiscardReactions) {
        let next = script
            .pop_front()
            .ok_or_else(|| anyhow!("log ends while seat {} is on turn", state.current_seat()))?;
        return state
            .submit(next.clone())
            .with_context(|| format!("replaying {}", next));
    }

    // Leading reactions in the script belong to this window.
    let mut answers = Vec::new();
    while let Some(next) = script.front() {
        let reaction = matches!(
            next.kind(),
            ActionKind::Ron | ActionKind::Chi | ActionKind::Pon | ActionKind::Daiminkan
        );
        let seat = next.seat();
        if !reaction || !pending.contains(&seat) || answers.iter().any(|a: &Action| a.seat() == seat) {
            break;
        }
        if !next.is_valid(&state.legal_actions(seat)) {
            break;
        }
        if let Some(action) = script.pop_front() {
            answers.push(action);
        }
    }
    for &seat in &pending {
        if !answers.iter().any(|a| a.seat() == seat) {
            answers.push(Action::pass(seat));
        }
    }
    state
        .step(&answers)
        .with_context(|| format!("replaying reactions {:?}", answers))
}
