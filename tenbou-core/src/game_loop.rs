//! Game loop runner.
//!
//! `GameRunner` owns one `GameState` and drives it to the end by asking
//! agents for decisions: the seat on turn while a turn is open, every seat
//! with options while a discard waits for reactions. Rejected answers are
//! sent back to the agent with the reason, a bounded number of times.

use anyhow::{anyhow, bail, Context};
use log::{debug, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tenbou_engine::{Action, GameConfig, GameMode, GameState, Phase, RoundResult};

use crate::message::{ActionMessage, ObservationMessage};
use crate::seeding::SessionRng;

/// Anything that answers observations: a policy, a remote process, a test.
pub trait Agent {
    fn act(&mut self, obs: &ObservationMessage) -> ActionMessage;
}

/// Picks from a legal set. Implemented by random agents, learned models, etc.
pub trait ActionSelector {
    /// `seat` must act and `legal_actions` is never empty.
    fn select_action(&mut self, seat: u8, legal_actions: &[Action]) -> Action;
}

/// Always picks the first legal action.
pub struct FirstActionSelector;

impl ActionSelector for FirstActionSelector {
    fn select_action(&mut self, _seat: u8, legal_actions: &[Action]) -> Action {
        legal_actions[0].clone()
    }
}

/// Uniform choice over the legal set, reproducible from its seed.
pub struct RandomActionSelector {
    rng: ChaCha8Rng,
}

impl RandomActionSelector {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl ActionSelector for RandomActionSelector {
    fn select_action(&mut self, _seat: u8, legal_actions: &[Action]) -> Action {
        let idx = self.rng.random_range(0..legal_actions.len());
        legal_actions[idx].clone()
    }
}

/// Adapts a selector to the message boundary.
pub struct SelectorAgent<S> {
    selector: S,
}

impl<S: ActionSelector> SelectorAgent<S> {
    pub fn new(selector: S) -> Self {
        Self { selector }
    }
}

impl<S: ActionSelector> Agent for SelectorAgent<S> {
    fn act(&mut self, obs: &ObservationMessage) -> ActionMessage {
        let action = self.selector.select_action(obs.seat, obs.legal_actions());
        obs.reply(action)
    }
}

/// Answers an agent may get wrong in a row before the run is abandoned.
pub const MAX_RESUBMITS: u32 = 3;

/// Upper bound on decisions in one game.
const MAX_STEPS: u32 = 50_000;

pub struct GameRunner {
    state: GameState,
    total_actions: u32,
    rejected_actions: u32,
    results: Vec<RoundResult>,
}

impl GameRunner {
    /// A started game.
    pub fn new(config: GameConfig) -> anyhow::Result<Self> {
        let seed = config.seed;
        let mut state = GameState::new(config).with_context(|| format!("configuring game {}", seed))?;
        state.start().with_context(|| format!("starting game {}", seed))?;
        Ok(Self {
            state,
            total_actions: 0,
            rejected_actions: 0,
            results: Vec::new(),
        })
    }

    /// A started game whose seed comes from the session.
    pub fn new_with_session(session: &mut SessionRng, mode: GameMode) -> anyhow::Result<Self> {
        Self::new(GameConfig::new(session.next_game_seed(), mode))
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn into_state(self) -> GameState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state.is_game_over()
    }

    pub fn total_actions(&self) -> u32 {
        self.total_actions
    }

    /// Answers the engine turned down.
    pub fn rejected_actions(&self) -> u32 {
        self.rejected_actions
    }

    pub fn rounds_played(&self) -> u32 {
        self.results.len() as u32
    }

    /// Results of the finished rounds, in order.
    pub fn results(&self) -> &[RoundResult] {
        &self.results
    }

    pub fn scores(&self) -> [i32; 4] {
        self.state.score().scores
    }
}

type Ask<'a> = dyn FnMut(&ObservationMessage) -> ActionMessage + 'a;

impl GameRunner {
    /// Advances the game by one decision round with one agent answering for
    /// every seat: one answer from each seat the state waits for, or the
    /// start of the next round. Returns false once the game is over.
    pub fn step_once(&mut self, agent: &mut dyn Agent) -> anyhow::Result<bool> {
        self.advance(&mut |obs: &ObservationMessage| agent.act(obs))
    }

    /// Like [`GameRunner::step_once`] with an agent per seat.
    pub fn step_seats(&mut self, agents: &mut [&mut dyn Agent; 4]) -> anyhow::Result<bool> {
        self.advance(&mut |obs: &ObservationMessage| agents[obs.seat as usize].act(obs))
    }

    /// Plays the game to the end with one agent answering for every seat.
    pub fn run_to_completion(&mut self, agent: &mut dyn Agent) -> anyhow::Result<()> {
        while self.step_once(agent)? {}
        Ok(())
    }

    /// Plays the game to the end with an agent per seat.
    pub fn run_seats(&mut self, agents: &mut [&mut dyn Agent; 4]) -> anyhow::Result<()> {
        while self.step_seats(agents)? {}
        Ok(())
    }

    fn advance(&mut self, ask: &mut Ask<'_>) -> anyhow::Result<bool> {
        match self.state.phase() {
            Phase::GameOver => {
                self.record_result()?;
                return Ok(false);
            }
            Phase::RoundOver => {
                self.record_result()?;
                self.state.start_next_round().context("starting the next round")?;
                return Ok(true);
            }
            _ => {}
        }
        if self.total_actions >= MAX_STEPS {
            bail!("game {} exceeded {} decisions", self.state.config().seed, MAX_STEPS);
        }

        for seat in self.state.pending_seats() {
            // An earlier answer in this loop may have closed the window.
            if self.state.legal_actions(seat).is_empty() {
                continue;
            }
            self.decide(seat, ask)?;
        }
        if self.state.is_round_over() || self.state.is_game_over() {
            self.record_result()?;
        }
        Ok(!self.state.is_game_over())
    }

    /// Asks for seat `seat` until the engine accepts an answer.
    fn decide(&mut self, seat: u8, ask: &mut Ask<'_>) -> anyhow::Result<()> {
        let mut obs = ObservationMessage::new(&self.state, seat);
        for _ in 0..=MAX_RESUBMITS {
            let answer = ask(&obs);
            let outcome = answer
                .into_action(&obs)
                .and_then(|action| self.state.submit(action).map_err(anyhow::Error::from));
            match outcome {
                Ok(()) => {
                    self.total_actions += 1;
                    return Ok(());
                }
                Err(err) => {
                    if let Some(fatal) = self.state.fatal_error() {
                        return Err(anyhow!(fatal.clone()))
                            .with_context(|| format!("game {} halted", self.state.config().seed));
                    }
                    self.rejected_actions += 1;
                    warn!("seat {} answer rejected: {:#}", seat, err);
                    obs.last_error = Some(format!("{:#}", err));
                }
            }
        }
        bail!("seat {} gave no acceptable answer in {} tries", seat, MAX_RESUBMITS + 1)
    }

    fn record_result(&mut self) -> anyhow::Result<()> {
        let finished = self.state.score().round as usize;
        if self.results.len() < finished {
            let result = self
                .state
                .last_result()
                .ok_or_else(|| anyhow!("round {} ended without a result", finished))?;
            debug!("round {} over: {:?}", finished, result.outcome);
            self.results.push(result.clone());
        }
        Ok(())
    }
}
