//! Table-level scenarios driven through `GameState`.

use crate::action::{Action, ActionKind};
use crate::errors::EngineError;
use crate::parser::{parse_tile, TilePicker};
use crate::round_log::RoundEvent;
use crate::rule::GameRule;
use crate::state::game_mode::{GameConfig, GameMode};
use crate::state::result::{AbortReason, RoundOutcome};
use crate::state::legal_actions::GameStateLegalActions;
use crate::state::wall::{derive_round_seed, Wall, DEAL_END, HAND_SIZE, LIVE_END};
use crate::state::{GameState, Phase, TurnPhase, WinKind};
use crate::tile::{Tile, NUM_TILES};
use crate::types::MeldKind;
use crate::yaku::Yaku;

/// Lays out a wall by hand: dealt hands (dealer 0) and the first live
/// draws. Every other slot gets the lowest unused tile.
struct WallBuilder {
    picker: TilePicker,
    slots: Vec<Option<Tile>>,
}

impl WallBuilder {
    fn new() -> Self {
        Self {
            picker: TilePicker::new(),
            slots: vec![None; NUM_TILES],
        }
    }

    fn place(mut self, start: usize, text: &str) -> Self {
        let tiles = self.picker.parse(text).unwrap();
        for (i, t) in tiles.into_iter().enumerate() {
            assert!(self.slots[start + i].is_none(), "slot {} used twice", start + i);
            self.slots[start + i] = Some(t);
        }
        self
    }

    fn hands(self, hands: [&str; 4]) -> Self {
        let mut builder = self;
        for (seat, text) in hands.iter().enumerate() {
            builder = builder.place(seat * HAND_SIZE, text);
        }
        builder
    }

    fn draws(self, text: &str) -> Self {
        self.place(DEAL_END, text)
    }

    fn replacements(self, text: &str) -> Self {
        self.place(LIVE_END, text)
    }

    fn build(self) -> Wall {
        let mut spare = Tile::all().filter(|t| !self.picker.is_used(*t));
        let tiles: Vec<Tile> = self
            .slots
            .into_iter()
            .map(|slot| slot.or_else(|| spare.next()).unwrap())
            .collect();
        Wall::from_tiles(tiles).unwrap()
    }
}

fn rigged(wall: Wall, rule: GameRule) -> GameState {
    let config = GameConfig::new(1, GameMode::East).with_rule(rule);
    let mut state = GameState::new(config).unwrap();
    state.start_round_with_wall(wall).unwrap();
    state
}

fn find(state: &GameState, seat: u8, kind: ActionKind) -> Action {
    state
        .legal_actions(seat)
        .into_iter()
        .find(|a| a.kind() == kind)
        .unwrap_or_else(|| panic!("seat {} has no {:?}", seat, kind))
}

fn discard_drawn(state: &mut GameState) {
    let seat = state.current_seat();
    let tile = state.hand(seat).drawn_tile().unwrap();
    state.submit(Action::discard(seat, tile)).unwrap();
}

fn kind_of(text: &str) -> u8 {
    parse_tile(text).unwrap().kind()
}

fn discard_kind(state: &mut GameState, seat: u8, text: &str) {
    let kind = kind_of(text);
    let tile = *state
        .hand(seat)
        .concealed()
        .iter()
        .find(|t| t.kind() == kind)
        .unwrap_or_else(|| panic!("seat {} holds no {}", seat, text));
    state.submit(Action::discard(seat, tile)).unwrap();
}

fn pass_all(state: &mut GameState) {
    while state.phase() == Phase::RoundInProgress(TurnPhase::AwaitingDiscardReactions) {
        for seat in state.pending_seats() {
            state.submit(Action::pass(seat)).unwrap();
        }
    }
}

fn play_first_legal(seed: u64, mode: GameMode) -> GameState {
    let mut state = GameState::new(GameConfig::new(seed, mode)).unwrap();
    state.start().unwrap();
    for _ in 0..200_000 {
        match state.phase() {
            Phase::GameOver => return state,
            Phase::RoundOver => {
                let result = state.last_result().unwrap();
                assert_eq!(result.deltas.iter().sum::<i32>(), 0);
                state.start_next_round().unwrap();
            }
            _ => {
                for seat in state.pending_seats() {
                    let action = state.legal_actions(seat)[0].clone();
                    state.submit(action).unwrap();
                }
            }
        }
    }
    panic!("game {} did not finish", seed);
}

#[test]
fn first_draw_is_wall_index_52() {
    let mut state = GameState::new(GameConfig::new(9999, GameMode::East)).unwrap();
    state.start().unwrap();
    let wall = Wall::new(derive_round_seed(9999, 0, 0));
    assert_eq!(state.hand(0).drawn_tile(), Some(wall.tiles()[52]));
    assert_eq!(state.wall().tiles(), wall.tiles());

    let mut again = GameState::new(GameConfig::new(9999, GameMode::East)).unwrap();
    again.start().unwrap();
    assert_eq!(again, state);
}

#[test]
fn noten_hand_gets_no_win() {
    let wall = WallBuilder::new()
        .hands(["13579m2468p1357s", "2468m1357p2468s1z", "13579p3m3s9s23456z", "68m468s1177z5566z"])
        .draws("9s")
        .build();
    let mut state = rigged(wall, GameRule::default());
    let legal = state.legal_actions(0);
    assert!(legal.iter().all(|a| a.kind() != ActionKind::Tsumo));

    let before = state.clone();
    let err = state.submit(Action::tsumo(0)).unwrap_err();
    assert!(matches!(err, EngineError::InvalidWinClaim { seat: 0, .. }));
    assert_eq!(state, before);

    discard_drawn(&mut state);
    for seat in 0..4 {
        assert!(state.legal_actions(seat).iter().all(|a| a.kind() != ActionKind::Ron));
    }
}

#[test]
fn four_kans_by_different_seats_abort() {
    let wall = WallBuilder::new()
        .hands(["111122m58m258p25s", "369m1111369p369s", "479m479p1111479s", "1111223344556z"])
        .draws("6z6z7z7z")
        .replacements("9m9p9s2m")
        .build();
    let mut state = rigged(wall, GameRule::default());
    for seat in 0..4u8 {
        assert_eq!(state.current_seat(), seat);
        let kan = find(&state, seat, ActionKind::Ankan);
        state.submit(kan).unwrap();
        assert_eq!(state.hand(seat).kan_count(), 1);
        assert_eq!(state.wall().dora_indicators().len(), seat as usize + 2);
        discard_drawn(&mut state);
        if seat < 3 {
            pass_all(&mut state);
        }
    }

    // Seat 0 holds a pair of the last discard but gets no pon.
    let pair = state.hand(0).concealed().iter().filter(|t| t.kind() == kind_of("2m")).count();
    assert_eq!(pair, 2);
    assert_eq!(state.phase(), Phase::RoundOver);
    assert!(state.hand(0).melds().iter().all(|m| m.kind == MeldKind::Ankan));

    let result = state.last_result().unwrap();
    assert_eq!(
        result.outcome,
        RoundOutcome::AbortiveDraw {
            reason: AbortReason::FourKans
        }
    );
    assert_eq!(result.deltas, [0; 4]);
    assert!(result.dealer_repeats);
    assert_eq!(state.score().scores, [25000; 4]);
    assert_eq!(state.score().dealer, 0);
    assert_eq!(state.score().honba, 1);
}

#[test]
fn illegal_discard_changes_nothing() {
    let mut state = GameState::new(GameConfig::new(77, GameMode::East)).unwrap();
    state.start().unwrap();
    let foreign = state.hand(1).concealed()[0];
    let before = state.clone();

    let err = state.submit(Action::discard(0, foreign)).unwrap_err();
    assert!(matches!(err, EngineError::IllegalAction { seat: 0, .. }));
    assert!(err.is_recoverable());
    assert_eq!(state, before);

    let own = state.hand(1).concealed()[0];
    assert!(state.submit(Action::discard(1, own)).is_err());
    assert!(state.step(&[Action::pass(2)]).is_err());
    assert_eq!(state, before);
}

fn double_ron_wall() -> Wall {
    WallBuilder::new()
        .hands(["1199m1199p1199s1z", "234567m234678s5p", "345678m345456s5p", "22223333p4567z9m"])
        .draws("5p")
        .build()
}

#[test]
fn double_ron_settles_both() {
    let mut state = rigged(double_ron_wall(), GameRule::default());
    discard_drawn(&mut state);
    assert_eq!(state.phase(), Phase::RoundInProgress(TurnPhase::AwaitingDiscardReactions));
    state.submit(Action::ron(2)).unwrap();
    state.submit(Action::ron(1)).unwrap();

    let result = state.last_result().unwrap().clone();
    assert_eq!(
        result.outcome,
        RoundOutcome::Ron {
            winners: vec![1, 2],
            discarder: 0
        }
    );
    assert_eq!(result.wins.len(), 2);
    assert_eq!(result.deltas.iter().sum::<i32>(), 0);
    assert!(result.deltas[1] > 0 && result.deltas[2] > 0);
    assert_eq!(result.deltas[0], -(result.deltas[1] + result.deltas[2]));
    assert!(result.wins.iter().all(|w| w.score.fan().contains_key(&Yaku::Tanyao)));
    assert!(!result.dealer_repeats);
    assert_eq!(state.score().dealer, 1);
}

#[test]
fn head_bump_keeps_closest_winner() {
    let mut state = rigged(double_ron_wall(), GameRule::default_head_bump());
    discard_drawn(&mut state);
    state.submit(Action::ron(1)).unwrap();
    state.submit(Action::ron(2)).unwrap();
    let result = state.last_result().unwrap();
    assert_eq!(
        result.outcome,
        RoundOutcome::Ron {
            winners: vec![1],
            discarder: 0
        }
    );
    assert_eq!(result.deltas[2], 0);
}

#[test]
fn pass_on_win_then_other_ron() {
    let mut state = rigged(double_ron_wall(), GameRule::default());
    discard_drawn(&mut state);
    state.submit(Action::pass(1)).unwrap();
    state.submit(Action::ron(2)).unwrap();
    let result = state.last_result().unwrap();
    assert_eq!(result.outcome.winners(), vec![2]);
}

#[test]
fn pon_takes_priority_over_chi() {
    let wall = WallBuilder::new()
        .hands(["1199m2233p45677z", "46m1199p1199s123z", "1379m1379p1379s7z", "55m2468p2468s135z"])
        .draws("5m")
        .build();
    let mut state = rigged(wall, GameRule::default());
    discard_drawn(&mut state);
    assert_eq!(state.pending_seats(), vec![1, 3]);

    let chi = find(&state, 1, ActionKind::Chi);
    let pon = find(&state, 3, ActionKind::Pon);
    state.step(&[chi, pon]).unwrap();

    assert_eq!(state.current_seat(), 3);
    assert_eq!(state.phase(), Phase::RoundInProgress(TurnPhase::Drawing));
    assert_eq!(state.hand(3).melds().len(), 1);
    assert_eq!(state.hand(3).melds()[0].kind, MeldKind::Pon);
    assert!(state.hand(1).melds().is_empty());
    assert!(state.river(0).entries()[0].called);
    assert_eq!(state.hand(3).tile_count(), 14);
    assert!(state.legal_actions(3).iter().all(|a| a.kind() == ActionKind::Discard));
}

#[test]
fn riichi_takes_deposit_after_discard() {
    let wall = WallBuilder::new()
        .hands(["234m567p34567s88p", "1379m1379p1379s7z", "2468m2468p2468s5z", "1199m1199p1199s6z"])
        .draws("1z")
        .build();
    let mut state = rigged(wall, GameRule::default());
    state.submit(Action::riichi(0)).unwrap();
    let legal = state.legal_actions(0);
    assert!(legal.iter().all(|a| a.kind() == ActionKind::Discard));
    assert!(state.submit(Action::riichi(0)).is_err());

    discard_drawn(&mut state);
    pass_all(&mut state);
    assert!(state.hand(0).is_riichi());
    assert_eq!(state.score().scores[0], 24000);
    assert_eq!(state.score().riichi_sticks, 1);
    assert_eq!(state.score().table_total(), 100_000);
    assert!(state.river(0).entries()[0].riichi);
    assert!(state
        .log()
        .events()
        .iter()
        .any(|e| e.event == RoundEvent::RiichiDeclared { seat: 0 }));
    assert_eq!(state.current_seat(), 1);
}

#[test]
fn dealer_first_draw_tsumo_is_tenhou() {
    let wall = WallBuilder::new()
        .hands(["234m567p34567s88p", "1379m1379p1379s7z", "2468m2468p2468s5z", "1199m1199p1199s6z"])
        .draws("5s")
        .build();
    let mut state = rigged(wall, GameRule::default());
    state.submit(Action::tsumo(0)).unwrap();
    let result = state.last_result().unwrap();
    assert_eq!(result.outcome, RoundOutcome::Tsumo { winner: 0 });
    assert_eq!(result.deltas, [48000, -16000, -16000, -16000]);
    assert_eq!(result.wins[0].score.yakuman().collect::<Vec<_>>(), vec![Yaku::Tenhou]);
    assert!(result.dealer_repeats);
}

/// Seat 1 pons 9p, seat 2 declares riichi waiting on 6p-9p, and one turn
/// later seat 1 extends the pon with the last 9p.
fn chankan_wall() -> Wall {
    WallBuilder::new()
        .hands(["1379m137p1379s67z", "99p147m258s23467z", "123456m789s7p55s1z", "2468m2468p2468s5z"])
        .draws("9p8p5m9m9p")
        .replacements("6p")
        .build()
}

fn open_chankan_window(state: &mut GameState) {
    discard_drawn(state);
    let pon = find(state, 1, ActionKind::Pon);
    state.submit(pon).unwrap();
    discard_kind(state, 1, "7z");
    pass_all(state);

    state.submit(Action::riichi(2)).unwrap();
    discard_kind(state, 2, "1z");
    pass_all(state);
    assert!(state.hand(2).is_riichi());

    discard_drawn(state);
    pass_all(state);
    discard_drawn(state);
    pass_all(state);

    assert_eq!(state.current_seat(), 1);
    let kakan = find(state, 1, ActionKind::Kakan);
    state.submit(kakan).unwrap();
}

#[test]
fn robbing_an_added_kan_keeps_ippatsu() {
    let mut state = rigged(chankan_wall(), GameRule::default());
    open_chankan_window(&mut state);
    assert_eq!(state.pending_seats(), vec![2]);
    assert_eq!(state.legal_actions(2), vec![Action::ron(2), Action::pass(2)]);

    state.submit(Action::ron(2)).unwrap();
    let result = state.last_result().unwrap();
    assert_eq!(
        result.outcome,
        RoundOutcome::Ron {
            winners: vec![2],
            discarder: 1
        }
    );
    let fan = result.wins[0].score.fan();
    for yaku in [Yaku::Riichi, Yaku::Ippatsu, Yaku::Chankan] {
        assert!(fan.contains_key(&yaku), "missing {:?}", yaku);
    }
    assert!(result.deltas[2] > 0);
    assert_eq!(result.deltas[1], -result.deltas[2]);
}

#[test]
fn passing_on_chankan_completes_the_kan() {
    let mut state = rigged(chankan_wall(), GameRule::default());
    open_chankan_window(&mut state);
    state.submit(Action::pass(2)).unwrap();

    assert_eq!(state.phase(), Phase::RoundInProgress(TurnPhase::Drawing));
    assert_eq!(state.current_seat(), 1);
    assert_eq!(state.hand(1).melds()[0].kind, MeldKind::Kakan);
    assert_eq!(state.hand(1).tile_count(), 14);
    assert_eq!(state.wall().dora_indicators().len(), 2);
    assert_eq!(state.wall().replacements_drawn(), 1);
    assert_eq!(state.hand(1).drawn_tile().map(|t| t.kind()), Some(kind_of("6p")));
    assert!(matches!(
        state.log().events().last().map(|e| &e.event),
        Some(RoundEvent::Draw {
            seat: 1,
            replacement: true,
            ..
        })
    ));
    assert!(state.win_context(1, WinKind::Tsumo).rinshan);
    assert!(!state.win_context(2, WinKind::Ron).ippatsu);

    // The riichi seat passed on its winning tile and stays furiten.
    assert!(state.is_furiten(2));
    discard_drawn(&mut state);
    assert_eq!(state.phase(), Phase::RoundInProgress(TurnPhase::Drawing));
    assert_eq!(state.current_seat(), 2);
    discard_drawn(&mut state);
    pass_all(&mut state);
    assert!(state.is_furiten(2));
}

#[test]
fn passed_ron_is_furiten_until_own_discard() {
    let wall = WallBuilder::new()
        .hands(["1199m1199p1199s1z", "234567m234678s5p", "345678m345456s5p", "22223333p4567z9m"])
        .draws("5p0p7z")
        .build();
    let mut state = rigged(wall, GameRule::default());
    discard_drawn(&mut state);
    assert_eq!(state.pending_seats(), vec![1, 2]);
    state.submit(Action::pass(1)).unwrap();
    state.submit(Action::pass(2)).unwrap();
    assert!(state.is_furiten(1));
    assert!(state.is_furiten(2));

    // Furiten does not block a self-drawn win.
    assert_eq!(state.current_seat(), 1);
    find(&state, 1, ActionKind::Tsumo);
    discard_drawn(&mut state);

    // Seat 2 waits on the red five just discarded but is not asked.
    assert_eq!(state.phase(), Phase::RoundInProgress(TurnPhase::Drawing));
    assert_eq!(state.current_seat(), 2);
    assert!(state.legal_actions(2).iter().all(|a| a.kind() != ActionKind::Ron));
    assert!(state.is_furiten(2));

    discard_drawn(&mut state);
    pass_all(&mut state);
    assert!(!state.is_furiten(2));
}

#[test]
fn swap_call_kinds_are_not_discardable() {
    let wall = WallBuilder::new()
        .hands(["1379m1379p1379s7z", "2345m1199p1199s1z", "68m2468p2468s156z", "59m35p359s334467z"])
        .draws("2m")
        .build();
    let mut state = rigged(wall, GameRule::default());
    discard_drawn(&mut state);
    assert_eq!(state.pending_seats(), vec![1]);
    let chi = find(&state, 1, ActionKind::Chi);
    state.submit(chi).unwrap();

    let forbidden = [kind_of("2m"), kind_of("5m")];
    let mut kinds = state.hand(1).forbidden_kinds().to_vec();
    kinds.sort();
    assert_eq!(kinds, forbidden);
    for kind in forbidden {
        assert!(state.hand(1).concealed().iter().any(|t| t.kind() == kind));
    }

    let legal = state.legal_actions(1);
    assert!(legal.iter().all(|a| a.kind() == ActionKind::Discard));
    assert!(legal
        .iter()
        .all(|a| !matches!(a, Action::Discard { tile, .. } if forbidden.contains(&tile.kind()))));
    assert!(legal
        .iter()
        .any(|a| matches!(a, Action::Discard { tile, .. } if tile.kind() == kind_of("1z"))));

    discard_kind(&mut state, 1, "1z");
    assert!(state.hand(1).forbidden_kinds().is_empty());
}

/// Dealer and seat 1 are tenpai; everyone throws every draw to the end.
fn exhaust(rule: GameRule) -> GameState {
    let wall = WallBuilder::new()
        .hands(["234m567p34567s88p", "123456m789s78p55s", "1379m1379p1379s7z", "2468m2468p2468s5z"])
        .build();
    let mut state = rigged(wall, rule);
    while state.phase() == Phase::RoundInProgress(TurnPhase::Drawing) {
        discard_drawn(&mut state);
        pass_all(&mut state);
    }
    assert_eq!(state.wall().live_remaining(), 0);
    state
}

#[test]
fn exhaustive_draw_pays_tenpai_seats() {
    let state = exhaust(GameRule::default());
    let result = state.last_result().unwrap();
    assert_eq!(
        result.outcome,
        RoundOutcome::ExhaustiveDraw {
            tenpai: [true, true, false, false]
        }
    );
    assert_eq!(result.deltas, [1500, 1500, -1500, -1500]);
    assert!(!result.dealer_repeats);
    assert_eq!(state.score().scores, [26500, 26500, 23500, 23500]);
    assert_eq!(state.score().dealer, 1);
    assert_eq!(state.score().honba, 1);
    assert_eq!(state.phase(), Phase::RoundOver);
}

#[test]
fn tenpai_dealer_repeats_when_the_rule_says_so() {
    let state = exhaust(GameRule::default_tenhou());
    let result = state.last_result().unwrap();
    assert_eq!(result.deltas, [1500, 1500, -1500, -1500]);
    assert!(result.dealer_repeats);
    assert_eq!(state.score().dealer, 0);
    assert_eq!(state.score().honba, 1);
}

#[test]
fn nine_terminals_aborts_the_round() {
    let wall = WallBuilder::new().place(0, "19m19p1s12345z258m").draws("5s").build();
    let mut state = rigged(wall, GameRule::default());
    let declare = find(&state, 0, ActionKind::NineTerminals);
    state.submit(declare).unwrap();

    let result = state.last_result().unwrap();
    assert_eq!(
        result.outcome,
        RoundOutcome::AbortiveDraw {
            reason: AbortReason::NineTerminals
        }
    );
    assert_eq!(result.deltas, [0; 4]);
    assert!(result.dealer_repeats);
    assert_eq!(state.score().dealer, 0);
    assert_eq!(state.score().honba, 1);
}

#[test]
fn same_wind_four_times_aborts() {
    let wall = WallBuilder::new().draws("1z1z1z1z").build();
    let mut state = rigged(wall, GameRule::default());
    for seat in 0..4u8 {
        assert_eq!(state.current_seat(), seat);
        discard_drawn(&mut state);
        pass_all(&mut state);
    }
    let result = state.last_result().unwrap();
    assert_eq!(
        result.outcome,
        RoundOutcome::AbortiveDraw {
            reason: AbortReason::FourWinds
        }
    );
    assert_eq!(result.deltas, [0; 4]);
    assert_eq!(state.score().dealer, 0);
}

#[test]
fn four_riichi_abort_leaves_deposits() {
    let wall = WallBuilder::new()
        .hands(["234m567p34567s88p", "123456m789s78p55s", "222888m22p99p678s", "333444p1555777z"])
        .draws("9m1p6z7m")
        .build();
    let mut state = rigged(wall, GameRule::default());
    for seat in 0..4u8 {
        assert_eq!(state.current_seat(), seat);
        state.submit(Action::riichi(seat)).unwrap();
        discard_drawn(&mut state);
        pass_all(&mut state);
    }
    let result = state.last_result().unwrap().clone();
    assert_eq!(
        result.outcome,
        RoundOutcome::AbortiveDraw {
            reason: AbortReason::FourRiichi
        }
    );
    assert_eq!(result.deltas, [0; 4]);
    assert!(result.dealer_repeats);
    assert_eq!(state.score().scores, [24000; 4]);
    assert_eq!(state.score().riichi_sticks, 4);
    assert_eq!(state.score().table_total(), 100_000);

    state.start_next_round().unwrap();
    assert_eq!(state.score().riichi_sticks, 4);
    assert_eq!(state.score().honba, 1);
}

#[test]
fn whole_game_first_legal_policy() {
    let state = play_first_legal(2024, GameMode::East);
    assert!(state.is_game_over());
    assert_eq!(state.score().table_total(), 100_000);
    assert!(state.fatal_error().is_none());
    let ends = state
        .log()
        .events()
        .iter()
        .filter(|e| matches!(e.event, RoundEvent::RoundEnd { .. }))
        .count();
    assert_eq!(ends as u32, state.score().round);
}

#[test]
fn same_seed_same_log() {
    let a = play_first_legal(31, GameMode::Single);
    let b = play_first_legal(31, GameMode::Single);
    assert_eq!(a.log().to_json_lines().unwrap(), b.log().to_json_lines().unwrap());
    assert_eq!(a.score(), b.score());
}

#[test]
fn disabled_log_stays_empty() {
    let mut config = GameConfig::new(8, GameMode::Single);
    config.record_log = false;
    let mut state = GameState::new(config).unwrap();
    state.start().unwrap();
    assert!(state.log().is_empty());
}
