//! Round and game state machine.
//!
//! One [`GameState`] owns the table for a whole game: the score table
//! persists, while the wall, hands and rivers are rebuilt every round.
//! Seats act through [`GameState::submit`]; anything outside the set from
//! [`GameState::legal_actions`] is rejected without touching the state.

use std::sync::Arc;

use log::{debug, error, trace, warn};
use serde::{Deserialize, Serialize};

use crate::action::{Action, ActionKind};
use crate::errors::{EngineError, EngineResult};
use crate::observation::Observation;
use crate::round_log::{EventMeta, GameLog, RoundEvent};
use crate::rule::{ClaimTieBreak, RonPolicy};
use crate::score::Score;
use crate::tile::{kind_is_wind, Tile, NUM_TILES};
use crate::types::{seat_distance, Meld, MeldKind, Wind, NUM_SEATS};
use crate::winning_score::WinningScore;
use crate::yaku::WinContext;

pub mod game_mode;
pub mod hand;
pub mod legal_actions;
pub mod result;
pub mod river;
pub mod wall;

use game_mode::{GameConfig, TENPAI_POOL};
use hand::{swap_call_kinds, Hand};
use legal_actions::GameStateLegalActions;
use result::{tenpai_deltas, AbortReason, RoundOutcome, RoundResult, WinRecord};
use river::River;
use wall::{derive_round_seed, Wall};

pub const RIICHI_DEPOSIT: i32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    /// The current seat holds 14 tiles and must act.
    Drawing,
    /// A discard or an added kan is on the table; seats with options answer.
    AwaitingDiscardReactions,
    /// All answers are in and priority resolution runs.
    AwaitingCallResolution,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    NotStarted,
    RoundInProgress(TurnPhase),
    RoundOver,
    GameOver,
}

/// Facts fixed for a round, shared by every observation of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundContext {
    pub game_id: u64,
    pub round: u32,
    pub dealer: u8,
    /// 0 = east, 1 = south, ...
    pub round_wind: u8,
    pub honba: u8,
}

/// A tile other seats may react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingTile {
    pub discarder: u8,
    pub tile: Tile,
    /// `None` for the tile of an added kan.
    pub river_index: Option<usize>,
    pub chankan: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WinKind {
    Tsumo,
    Ron,
    Chankan,
}

/// Picks the call that takes the tile. Pon and kan beat chi; between
/// claims of equal strength the tie-break decides by seat distance.
pub fn pick_call(calls: &[Action], discarder: u8, tie_break: ClaimTieBreak) -> Option<&Action> {
    calls
        .iter()
        .filter(|a| matches!(a.kind(), ActionKind::Chi | ActionKind::Pon | ActionKind::Daiminkan))
        .max_by_key(|a| {
            let distance = seat_distance(discarder, a.seat());
            let proximity = match tie_break {
                ClaimTieBreak::ClosestToDiscarder => NUM_SEATS as u8 - distance,
                ClaimTieBreak::FurthestFromDiscarder => distance,
            };
            (a.kind().claim_priority(), proximity)
        })
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub(crate) config: GameConfig,
    phase: Phase,
    score: Score,
    wall: Wall,
    hands: [Hand; NUM_SEATS],
    rivers: [River; NUM_SEATS],
    round_ctx: Arc<RoundContext>,
    current_seat: u8,

    pending: Option<PendingTile>,
    claims: [Vec<Action>; NUM_SEATS],
    responses: [Option<Action>; NUM_SEATS],

    /// Seat that declared riichi and still owes the declaring discard.
    riichi_declaring: Option<u8>,
    /// Riichi discard on the table; the deposit is taken once it survives.
    riichi_pending: Option<u8>,
    double_riichi: [bool; NUM_SEATS],
    ippatsu: [bool; NUM_SEATS],
    temp_furiten: [bool; NUM_SEATS],
    riichi_furiten: [bool; NUM_SEATS],
    /// No call has been made this round.
    uninterrupted: bool,
    /// The current seat's last draw was a replacement tile.
    after_kan: bool,

    last_result: Option<RoundResult>,
    pub(crate) log: GameLog,
    fatal: Option<EngineError>,
}

impl GameState {
    pub fn new(config: GameConfig) -> EngineResult<Self> {
        config.validate()?;
        let score = Score::new(config.starting_score);
        let round_ctx = Arc::new(RoundContext {
            game_id: config.seed,
            round: 0,
            dealer: 0,
            round_wind: 0,
            honba: 0,
        });
        Ok(Self {
            wall: Wall::new(derive_round_seed(config.seed, 0, 0)),
            log: GameLog::new(config.seed),
            config,
            phase: Phase::NotStarted,
            score,
            hands: Default::default(),
            rivers: Default::default(),
            round_ctx,
            current_seat: 0,
            pending: None,
            claims: Default::default(),
            responses: Default::default(),
            riichi_declaring: None,
            riichi_pending: None,
            double_riichi: [false; NUM_SEATS],
            ippatsu: [false; NUM_SEATS],
            temp_furiten: [false; NUM_SEATS],
            riichi_furiten: [false; NUM_SEATS],
            uninterrupted: true,
            after_kan: false,
            last_result: None,
            fatal: None,
        })
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    pub fn wall(&self) -> &Wall {
        &self.wall
    }

    pub fn hand(&self, seat: u8) -> &Hand {
        &self.hands[seat as usize % NUM_SEATS]
    }

    pub fn river(&self, seat: u8) -> &River {
        &self.rivers[seat as usize % NUM_SEATS]
    }

    pub fn current_seat(&self) -> u8 {
        self.current_seat
    }

    pub fn round_context(&self) -> &Arc<RoundContext> {
        &self.round_ctx
    }

    /// Settlement of the most recently finished round.
    pub fn last_result(&self) -> Option<&RoundResult> {
        self.last_result.as_ref()
    }

    pub fn log(&self) -> &GameLog {
        &self.log
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn is_round_over(&self) -> bool {
        matches!(self.phase, Phase::RoundOver | Phase::GameOver)
    }

    /// The fatal error this state was poisoned with, if any.
    pub fn fatal_error(&self) -> Option<&EngineError> {
        self.fatal.as_ref()
    }

    pub(crate) fn event_meta(&self) -> EventMeta {
        EventMeta {
            round: self.score.round,
            dealer: self.score.dealer,
            honba: self.score.honba,
        }
    }

    // -----------------------------------------------------------------
    // Round lifecycle
    // -----------------------------------------------------------------

    /// Deals the first round.
    pub fn start(&mut self) -> EngineResult<()> {
        if self.phase != Phase::NotStarted {
            return Err(EngineError::invariant("game already started"));
        }
        self.start_seeded_round()
    }

    /// Deals the round after a finished one.
    pub fn start_next_round(&mut self) -> EngineResult<()> {
        if self.phase != Phase::RoundOver {
            return Err(EngineError::invariant(format!(
                "next round requested in phase {:?}",
                self.phase
            )));
        }
        self.start_seeded_round()
    }

    /// Deals a round from a prepared wall instead of the seeded shuffle.
    pub fn start_round_with_wall(&mut self, wall: Wall) -> EngineResult<()> {
        if !matches!(self.phase, Phase::NotStarted | Phase::RoundOver) {
            return Err(EngineError::invariant(format!(
                "round start requested in phase {:?}",
                self.phase
            )));
        }
        self.begin_round(wall)
    }

    fn start_seeded_round(&mut self) -> EngineResult<()> {
        let seed = derive_round_seed(self.config.seed, self.score.round, self.score.honba);
        self.begin_round(Wall::new(seed))
    }

    fn begin_round(&mut self, wall: Wall) -> EngineResult<()> {
        let dealer = self.score.dealer;
        self.wall = wall;
        self.hands = self.wall.deal(dealer).map(Hand::new);
        self.rivers = Default::default();
        self.round_ctx = Arc::new(RoundContext {
            game_id: self.config.seed,
            round: self.score.round,
            dealer,
            round_wind: self.score.round_wind,
            honba: self.score.honba,
        });
        self.pending = None;
        self.claims = Default::default();
        self.responses = Default::default();
        self.riichi_declaring = None;
        self.riichi_pending = None;
        self.double_riichi = [false; NUM_SEATS];
        self.ippatsu = [false; NUM_SEATS];
        self.temp_furiten = [false; NUM_SEATS];
        self.riichi_furiten = [false; NUM_SEATS];
        self.uninterrupted = true;
        self.after_kan = false;
        self.last_result = None;

        debug!(
            "round {} start: dealer {} wind {} honba {} sticks {}",
            self.score.round, dealer, self.score.round_wind, self.score.honba, self.score.riichi_sticks
        );
        round_event!(
            self,
            RoundEvent::Deal {
                hands: std::array::from_fn(|s| self.hands[s].concealed().to_vec()),
                dora_indicator: self.wall.dora_indicators()[0],
                scores: self.score.scores,
            }
        );
        self.draw_for(dealer, false)?;
        self.verify_invariants()
    }

    // -----------------------------------------------------------------
    // Legality and observation
    // -----------------------------------------------------------------

    /// The only enumeration of legal actions. Empty for seats that are not
    /// asked to act.
    pub fn legal_actions(&self, seat: u8) -> Vec<Action> {
        if self.fatal.is_some() || seat as usize >= NUM_SEATS {
            return Vec::new();
        }
        match self.phase {
            Phase::RoundInProgress(TurnPhase::Drawing) if seat == self.current_seat => self.turn_actions(seat),
            Phase::RoundInProgress(TurnPhase::AwaitingDiscardReactions) if self.responses[seat as usize].is_none() => {
                self.claims[seat as usize].clone()
            }
            _ => Vec::new(),
        }
    }

    /// Seats whose answer the state is waiting for.
    pub fn pending_seats(&self) -> Vec<u8> {
        (0..NUM_SEATS as u8)
            .filter(|&s| !self.legal_actions(s).is_empty())
            .collect()
    }

    pub fn observe(&self, seat: u8) -> Observation {
        Observation::build(seat, self)
    }

    // -----------------------------------------------------------------
    // Action entry points
    // -----------------------------------------------------------------

    /// Applies one seat's action.
    pub fn submit(&mut self, action: Action) -> EngineResult<()> {
        if let Some(err) = &self.fatal {
            return Err(err.clone());
        }
        let seat = action.seat();
        let legal = self.legal_actions(seat);
        if !action.is_valid(&legal) {
            let err = match action.kind() {
                ActionKind::Tsumo | ActionKind::Ron if !legal.is_empty() => EngineError::InvalidWinClaim {
                    seat,
                    message: "hand is not a winning hand with a yaku".to_string(),
                },
                _ => EngineError::illegal(seat, format!("{} is not in the legal set", action)),
            };
            warn!("rejected action: {}", err);
            return Err(err);
        }

        let outcome = self.apply(action).and_then(|()| self.verify_invariants());
        if let Err(err) = &outcome {
            if err.is_fatal() {
                error!("game {} poisoned: {}", self.config.seed, err);
                self.fatal = Some(err.clone());
            }
        }
        outcome
    }

    /// Applies one decision per pending seat. Every action is checked
    /// before any is applied.
    pub fn step(&mut self, actions: &[Action]) -> EngineResult<()> {
        if let Some(err) = &self.fatal {
            return Err(err.clone());
        }
        let mut seen = [false; NUM_SEATS];
        for action in actions {
            let seat = action.seat();
            if seat as usize >= NUM_SEATS || std::mem::replace(&mut seen[seat as usize], true) {
                return Err(EngineError::illegal(seat, "one action per seat per step"));
            }
            if !action.is_valid(&self.legal_actions(seat)) {
                warn!("rejected step: {} is not legal", action);
                return Err(EngineError::illegal(seat, format!("{} is not in the legal set", action)));
            }
        }
        for action in actions {
            self.submit(action.clone())?;
        }
        Ok(())
    }

    fn apply(&mut self, action: Action) -> EngineResult<()> {
        match self.phase {
            Phase::RoundInProgress(TurnPhase::Drawing) => self.apply_turn_action(action),
            Phase::RoundInProgress(TurnPhase::AwaitingDiscardReactions) => {
                trace!("{}", action);
                let seat = action.seat() as usize;
                self.responses[seat] = Some(action);
                let waiting = (0..NUM_SEATS).any(|s| !self.claims[s].is_empty() && self.responses[s].is_none());
                if waiting {
                    Ok(())
                } else {
                    self.resolve_reactions()
                }
            }
            phase => Err(EngineError::invariant(format!("{} applied in phase {:?}", action, phase))),
        }
    }

    fn apply_turn_action(&mut self, action: Action) -> EngineResult<()> {
        let seat = action.seat();
        match action {
            Action::Discard { tile, .. } => self.discard(seat, tile),
            Action::Riichi { .. } => {
                debug!("seat {} declares riichi", seat);
                self.riichi_declaring = Some(seat);
                Ok(())
            }
            Action::Tsumo { .. } => self.settle_tsumo(seat),
            Action::Ankan { meld, .. } => self.declare_closed_kan(seat, meld),
            Action::Kakan { meld, .. } => self.declare_added_kan(seat, meld),
            Action::NineTerminals { .. } => self.finish_round(
                RoundOutcome::AbortiveDraw {
                    reason: AbortReason::NineTerminals,
                },
                [0; NUM_SEATS],
                [0; NUM_SEATS],
                Vec::new(),
            ),
            other => Err(EngineError::invariant(format!("{} cannot be applied on a turn", other))),
        }
    }

    // -----------------------------------------------------------------
    // Turn flow
    // -----------------------------------------------------------------

    fn draw_for(&mut self, seat: u8, replacement: bool) -> EngineResult<()> {
        self.current_seat = seat;
        let tile = if replacement {
            self.wall
                .draw_replacement()
                .map_err(|e| EngineError::invariant(format!("replacement draw after a legal kan failed: {}", e)))?
        } else {
            match self.wall.draw() {
                Ok(t) => t,
                Err(EngineError::WallExhausted) => return self.exhaustive_draw(),
                Err(e) => return Err(e),
            }
        };
        self.hands[seat as usize].draw(tile)?;
        self.after_kan = replacement;
        self.phase = Phase::RoundInProgress(TurnPhase::Drawing);
        trace!("seat {} draws {}{}", seat, tile, if replacement { " (replacement)" } else { "" });
        round_event!(
            self,
            RoundEvent::Draw {
                seat,
                tile,
                replacement
            }
        );
        Ok(())
    }

    fn discard(&mut self, seat: u8, tile: Tile) -> EngineResult<()> {
        let s = seat as usize;
        let tsumogiri = self.hands[s].drawn_tile() == Some(tile);
        let declaring = self.riichi_declaring == Some(seat);
        if declaring {
            if self.rivers[s].is_empty() && self.uninterrupted {
                self.double_riichi[s] = true;
            }
            self.hands[s].declare_riichi();
            self.riichi_declaring = None;
            self.riichi_pending = Some(seat);
        } else {
            self.ippatsu[s] = false;
        }
        self.hands[s].discard(tile)?;
        self.temp_furiten[s] = false;
        self.after_kan = false;
        let index = self.rivers[s].append(tile, declaring, tsumogiri);
        trace!("seat {} discards {}", seat, tile);
        round_event!(
            self,
            RoundEvent::Discard {
                seat,
                tile,
                tsumogiri,
                riichi: declaring,
            }
        );
        self.pending = Some(PendingTile {
            discarder: seat,
            tile,
            river_index: Some(index),
            chankan: false,
        });
        self.open_reactions()
    }

    fn declare_closed_kan(&mut self, seat: u8, meld: Meld) -> EngineResult<()> {
        self.hands[seat as usize].apply_meld(&meld)?;
        self.uninterrupted = false;
        self.ippatsu = [false; NUM_SEATS];
        debug!("seat {} declares a closed kan of {}", seat, meld.tiles[0]);
        round_event!(self, RoundEvent::Call { seat, meld });
        self.complete_kan(seat)
    }

    fn declare_added_kan(&mut self, seat: u8, meld: Meld) -> EngineResult<()> {
        let added = meld
            .added_tile
            .ok_or_else(|| EngineError::invariant("added kan without its added tile"))?;
        self.hands[seat as usize].apply_meld(&meld)?;
        self.uninterrupted = false;
        debug!("seat {} extends a pon with {}", seat, added);
        round_event!(self, RoundEvent::Call { seat, meld });
        self.pending = Some(PendingTile {
            discarder: seat,
            tile: added,
            river_index: None,
            chankan: true,
        });
        self.open_reactions()
    }

    /// Kan dora and replacement draw for the seat that just made a kan.
    /// An added kan only ends ippatsu here, once nobody robbed it.
    fn complete_kan(&mut self, seat: u8) -> EngineResult<()> {
        self.ippatsu = [false; NUM_SEATS];
        let indicator = self.wall.reveal_dora()?;
        round_event!(self, RoundEvent::DoraReveal { indicator });
        self.draw_for(seat, true)
    }

    fn open_reactions(&mut self) -> EngineResult<()> {
        let pending = self
            .pending
            .clone()
            .ok_or_else(|| EngineError::invariant("no tile to react to"))?;
        let mut anyone = false;
        for seat in 0..NUM_SEATS as u8 {
            let options = if seat == pending.discarder {
                Vec::new()
            } else {
                self.reaction_actions(seat, &pending)
            };
            anyone |= !options.is_empty();
            self.claims[seat as usize] = options;
            self.responses[seat as usize] = None;
        }
        if anyone {
            self.phase = Phase::RoundInProgress(TurnPhase::AwaitingDiscardReactions);
            return Ok(());
        }
        self.pending = None;
        if pending.chankan {
            self.complete_kan(pending.discarder)
        } else {
            self.advance_after_discard(pending.discarder)
        }
    }

    fn resolve_reactions(&mut self) -> EngineResult<()> {
        self.phase = Phase::RoundInProgress(TurnPhase::AwaitingCallResolution);
        let pending = self
            .pending
            .take()
            .ok_or_else(|| EngineError::invariant("reactions collected without a pending tile"))?;
        let claims = std::mem::take(&mut self.claims);
        let responses = std::mem::take(&mut self.responses);

        for s in 0..NUM_SEATS {
            let offered_ron = claims[s].iter().any(|a| a.kind() == ActionKind::Ron);
            let took_ron = responses[s].as_ref().is_some_and(|a| a.kind() == ActionKind::Ron);
            if offered_ron && !took_ron {
                self.temp_furiten[s] = true;
                if self.hands[s].is_riichi() {
                    self.riichi_furiten[s] = true;
                }
            }
        }

        let mut rons: Vec<u8> = responses
            .iter()
            .flatten()
            .filter(|a| a.kind() == ActionKind::Ron)
            .map(Action::seat)
            .collect();
        if !rons.is_empty() {
            rons.sort_by_key(|&s| seat_distance(pending.discarder, s));
            if self.config.rule.ron_policy == RonPolicy::HeadBump {
                rons.truncate(1);
            }
            return self.settle_ron(&rons, &pending);
        }
        if pending.chankan {
            return self.complete_kan(pending.discarder);
        }
        if self.four_kan_abort_due() {
            return self.advance_after_discard(pending.discarder);
        }

        let calls: Vec<Action> = responses.into_iter().flatten().collect();
        match pick_call(&calls, pending.discarder, self.config.rule.claim_tie_break) {
            Some(call) => {
                let call = call.clone();
                self.apply_call(call, &pending)
            }
            None => self.advance_after_discard(pending.discarder),
        }
    }

    fn apply_call(&mut self, call: Action, pending: &PendingTile) -> EngineResult<()> {
        let seat = call.seat();
        let meld = call
            .meld()
            .cloned()
            .ok_or_else(|| EngineError::invariant(format!("{} carries no meld", call)))?;
        let index = pending
            .river_index
            .ok_or_else(|| EngineError::invariant("call on a tile outside any river"))?;

        self.accept_riichi();
        self.rivers[pending.discarder as usize].mark_called(index)?;
        self.hands[seat as usize].apply_meld(&meld)?;
        self.uninterrupted = false;
        self.ippatsu = [false; NUM_SEATS];
        if self.config.rule.kuikae_forbidden {
            self.hands[seat as usize].forbid(swap_call_kinds(&meld));
        }
        self.current_seat = seat;
        debug!("seat {} calls {:?} on {} from seat {}", seat, meld.kind, pending.tile, pending.discarder);
        let kind = meld.kind;
        round_event!(self, RoundEvent::Call { seat, meld });

        if kind == MeldKind::Daiminkan {
            self.complete_kan(seat)
        } else {
            self.after_kan = false;
            self.phase = Phase::RoundInProgress(TurnPhase::Drawing);
            Ok(())
        }
    }

    fn advance_after_discard(&mut self, discarder: u8) -> EngineResult<()> {
        self.accept_riichi();
        if let Some(reason) = self.abort_reason() {
            return self.finish_round(
                RoundOutcome::AbortiveDraw { reason },
                [0; NUM_SEATS],
                [0; NUM_SEATS],
                Vec::new(),
            );
        }
        self.draw_for((discarder + 1) % NUM_SEATS as u8, false)
    }

    fn accept_riichi(&mut self) {
        if let Some(seat) = self.riichi_pending.take() {
            self.score.take_deposit(seat);
            self.ippatsu[seat as usize] = true;
            debug!("seat {} riichi accepted", seat);
            round_event!(self, RoundEvent::RiichiDeclared { seat });
        }
    }

    fn abort_reason(&self) -> Option<AbortReason> {
        let rule = &self.config.rule;
        if rule.four_wind_abort && self.uninterrupted && self.rivers.iter().all(|r| r.len() == 1) {
            let firsts: Vec<u8> = self.rivers.iter().filter_map(|r| r.last()).map(|e| e.tile.kind()).collect();
            if firsts.len() == NUM_SEATS && kind_is_wind(firsts[0]) && firsts.iter().all(|&k| k == firsts[0]) {
                return Some(AbortReason::FourWinds);
            }
        }
        if self.four_kan_abort_due() {
            return Some(AbortReason::FourKans);
        }
        if rule.four_riichi_abort && self.hands.iter().all(Hand::is_riichi) {
            return Some(AbortReason::FourRiichi);
        }
        None
    }

    /// Four kans split over more than one seat: the round ends once the
    /// next discard is not won on.
    pub(crate) fn four_kan_abort_due(&self) -> bool {
        self.config.rule.four_kan_abort
            && self.total_kans() == 4
            && self.hands.iter().filter(|h| h.kan_count() > 0).count() > 1
    }

    pub(crate) fn total_kans(&self) -> usize {
        self.hands.iter().map(Hand::kan_count).sum()
    }

    // -----------------------------------------------------------------
    // Settlement
    // -----------------------------------------------------------------

    pub(crate) fn win_context(&self, seat: u8, kind: WinKind) -> WinContext {
        let s = seat as usize;
        let is_tsumo = kind == WinKind::Tsumo;
        let last_tile = self.wall.live_remaining() == 0;
        WinContext {
            is_tsumo,
            riichi: self.hands[s].is_riichi(),
            double_riichi: self.double_riichi[s],
            ippatsu: self.ippatsu[s],
            haitei: is_tsumo && last_tile && !self.after_kan,
            houtei: kind == WinKind::Ron && last_tile,
            rinshan: is_tsumo && self.after_kan,
            chankan: kind == WinKind::Chankan,
            first_draw: is_tsumo && self.uninterrupted && self.rivers[s].is_empty(),
            is_dealer: seat == self.score.dealer,
            seat_wind: Wind::of_seat(seat, self.score.dealer).kind(),
            round_wind: Wind::from(self.score.round_wind).kind(),
            dora_indicators: self.wall.dora_indicators().to_vec(),
            ura_indicators: Vec::new(),
        }
    }

    /// Context with ura indicators, which only settlement may see.
    fn settlement_context(&self, seat: u8, kind: WinKind) -> WinContext {
        let mut ctx = self.win_context(seat, kind);
        if ctx.riichi {
            ctx.ura_indicators = self.wall.ura_indicators().to_vec();
        }
        ctx
    }

    fn invalid_win(seat: u8, message: &str) -> EngineError {
        EngineError::InvalidWinClaim {
            seat,
            message: message.to_string(),
        }
    }

    fn settle_tsumo(&mut self, seat: u8) -> EngineResult<()> {
        let s = seat as usize;
        let ctx = self.settlement_context(seat, WinKind::Tsumo);
        let win_tile = self.hands[s]
            .drawn_tile()
            .ok_or_else(|| Self::invalid_win(seat, "no drawn tile to win on"))?;
        let score = self.hands[s]
            .evaluate_tsumo(&ctx)
            .filter(WinningScore::is_complete)
            .ok_or_else(|| Self::invalid_win(seat, "hand is not a winning hand with a yaku"))?;
        let dealer = self.score.dealer;
        let payment = score
            .payment(seat == dealer, true, self.score.honba as u32)
            .ok_or_else(|| Self::invalid_win(seat, "winning score is incomplete"))?;

        let mut deltas = [0; NUM_SEATS];
        for payer in 0..NUM_SEATS as u8 {
            if payer == seat {
                continue;
            }
            let amount = if payer == dealer {
                payment.tsumo_dealer
            } else {
                payment.tsumo_non_dealer
            } as i32;
            deltas[payer as usize] -= amount;
            deltas[s] += amount;
        }
        let mut deposit_payout = [0; NUM_SEATS];
        deposit_payout[s] = self.score.pay_out_deposits(seat);
        let wins = vec![WinRecord {
            seat,
            from_seat: None,
            win_tile,
            score,
            payment,
        }];
        self.finish_round(RoundOutcome::Tsumo { winner: seat }, deltas, deposit_payout, wins)
    }

    /// `winners` are ordered clockwise from the discarder. Only the first
    /// collects the repeat bonus and the deposits.
    fn settle_ron(&mut self, winners: &[u8], pending: &PendingTile) -> EngineResult<()> {
        let kind = if pending.chankan { WinKind::Chankan } else { WinKind::Ron };
        let dealer = self.score.dealer;
        let discarder = pending.discarder as usize;
        let mut deltas = [0; NUM_SEATS];
        let mut wins = Vec::with_capacity(winners.len());
        for (i, &seat) in winners.iter().enumerate() {
            let ctx = self.settlement_context(seat, kind);
            let score = self.hands[seat as usize]
                .evaluate_ron(pending.tile, &ctx)
                .filter(WinningScore::is_complete)
                .ok_or_else(|| Self::invalid_win(seat, "hand does not win on this tile"))?;
            let honba = if i == 0 { self.score.honba as u32 } else { 0 };
            let payment = score
                .payment(seat == dealer, false, honba)
                .ok_or_else(|| Self::invalid_win(seat, "winning score is incomplete"))?;
            deltas[discarder] -= payment.ron as i32;
            deltas[seat as usize] += payment.ron as i32;
            wins.push(WinRecord {
                seat,
                from_seat: Some(pending.discarder),
                win_tile: pending.tile,
                score,
                payment,
            });
        }
        let mut deposit_payout = [0; NUM_SEATS];
        if let Some(&first) = winners.first() {
            deposit_payout[first as usize] = self.score.pay_out_deposits(first);
        }
        self.finish_round(
            RoundOutcome::Ron {
                winners: winners.to_vec(),
                discarder: pending.discarder,
            },
            deltas,
            deposit_payout,
            wins,
        )
    }

    fn exhaustive_draw(&mut self) -> EngineResult<()> {
        let tenpai: [bool; NUM_SEATS] = std::array::from_fn(|s| self.hands[s].is_tenpai());
        let deltas = tenpai_deltas(&tenpai, TENPAI_POOL);
        self.finish_round(RoundOutcome::ExhaustiveDraw { tenpai }, deltas, [0; NUM_SEATS], Vec::new())
    }

    fn finish_round(
        &mut self,
        outcome: RoundOutcome,
        deltas: [i32; NUM_SEATS],
        deposit_payout: [i32; NUM_SEATS],
        wins: Vec<WinRecord>,
    ) -> EngineResult<()> {
        self.score.apply_deltas(&deltas);
        let dealer = self.score.dealer;
        let dealer_repeats = match &outcome {
            RoundOutcome::Tsumo { winner } => *winner == dealer,
            RoundOutcome::Ron { winners, .. } => winners.contains(&dealer),
            RoundOutcome::ExhaustiveDraw { tenpai } => {
                self.config.rule.dealer_tenpai_repeats && tenpai[dealer as usize]
            }
            RoundOutcome::AbortiveDraw { .. } => true,
        };
        debug!("round {} over: {:?} deltas {:?}", self.score.round, outcome, deltas);
        round_event!(
            self,
            RoundEvent::RoundEnd {
                outcome: outcome.clone(),
                deltas,
            }
        );

        let is_draw = outcome.is_draw();
        self.last_result = Some(RoundResult {
            outcome,
            deltas,
            deposit_payout,
            wins,
            dealer_repeats,
        });
        self.score.advance(dealer_repeats, is_draw);
        self.pending = None;
        self.claims = Default::default();
        self.responses = Default::default();
        self.riichi_declaring = None;
        self.riichi_pending = None;
        self.phase = if self.score.is_game_over(self.config.mode) {
            debug!("game {} over: {:?}", self.config.seed, self.score.scores);
            Phase::GameOver
        } else {
            Phase::RoundOver
        };
        Ok(())
    }

    // -----------------------------------------------------------------
    // Invariants
    // -----------------------------------------------------------------

    /// Tile ownership, hand sizes and the point total.
    pub fn verify_invariants(&self) -> EngineResult<()> {
        if self.phase == Phase::NotStarted {
            return Ok(());
        }
        let mut seen = [false; NUM_TILES];
        let mut own = |tile: Tile, place: &str| -> EngineResult<()> {
            if std::mem::replace(&mut seen[tile.id() as usize], true) {
                return Err(EngineError::invariant(format!("tile {} owned twice (again in {})", tile, place)));
            }
            Ok(())
        };
        for tile in self.wall.undrawn() {
            own(tile, "wall")?;
        }
        for (seat, hand) in self.hands.iter().enumerate() {
            let count = hand.tile_count();
            if count != 13 && count != 14 {
                return Err(EngineError::invariant(format!("seat {} holds {} tiles", seat, count)));
            }
            for tile in hand.all_tiles() {
                own(tile, "hand")?;
            }
        }
        for river in &self.rivers {
            for entry in river.entries().iter().filter(|e| !e.called) {
                own(entry.tile, "river")?;
            }
        }
        if let Some(missing) = seen.iter().position(|&s| !s) {
            return Err(EngineError::invariant(format!("tile id {} is unaccounted for", missing)));
        }
        let expected = self.config.starting_score as i64 * NUM_SEATS as i64;
        if self.score.table_total() != expected {
            return Err(EngineError::invariant(format!(
                "table holds {} points, expected {}",
                self.score.table_total(),
                expected
            )));
        }
        Ok(())
    }
}
