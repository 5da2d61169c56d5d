//! Hand evaluator: picks the best reading of a complete hand and fills a
//! [`WinningScore`].

use serde::{Deserialize, Serialize};

use crate::agari::{self, Division, Mentsu};
use crate::tile::{
    kind_counts, kind_is_dragon, kind_is_honor, kind_is_terminal, kind_is_wind, kind_is_yaochuu,
    next_dora_kind, Suit, Tile, CHUN, HAKU, HATSU, NUM_KINDS,
};
use crate::types::{Meld, MeldKind};
use crate::winning_score::WinningScore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Yaku {
    Riichi,
    DoubleRiichi,
    Ippatsu,
    MenzenTsumo,
    Tanyao,
    Pinfu,
    Iipeikou,
    Ryanpeikou,
    Haku,
    Hatsu,
    Chun,
    SeatWind,
    RoundWind,
    Haitei,
    Houtei,
    Rinshan,
    Chankan,
    Chiitoitsu,
    Toitoi,
    Sanankou,
    Sankantsu,
    SanshokuDoujun,
    SanshokuDoukou,
    Ittsu,
    Chanta,
    Junchan,
    Honroutou,
    Shousangen,
    Honitsu,
    Chinitsu,
    Dora,
    AkaDora,
    UraDora,
    KokushiMusou,
    Suuankou,
    Daisangen,
    Tsuuiisou,
    Ryuuiisou,
    Chinroutou,
    Daisuushii,
    Shousuushii,
    Suukantsu,
    Tenhou,
    Chiihou,
}

impl Yaku {
    pub fn is_dora(self) -> bool {
        matches!(self, Yaku::Dora | Yaku::AkaDora | Yaku::UraDora)
    }

    pub fn is_yakuman(self) -> bool {
        self >= Yaku::KokushiMusou
    }
}

/// Everything about a win that the tiles alone do not tell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WinContext {
    pub is_tsumo: bool,
    pub riichi: bool,
    pub double_riichi: bool,
    pub ippatsu: bool,
    pub haitei: bool,
    pub houtei: bool,
    pub rinshan: bool,
    pub chankan: bool,
    /// Tsumo on the uninterrupted first draw.
    pub first_draw: bool,
    pub is_dealer: bool,
    /// Honor kinds (27-30).
    pub seat_wind: u8,
    pub round_wind: u8,
    pub dora_indicators: Vec<Tile>,
    /// Only consulted for riichi hands.
    pub ura_indicators: Vec<Tile>,
}

#[derive(Debug, Clone, Copy)]
struct Group {
    base: u8,
    seq: bool,
    kan: bool,
    open: bool,
}

impl Group {
    fn has_yaochuu(&self) -> bool {
        if self.seq {
            self.base % 9 == 0 || self.base % 9 == 6
        } else {
            kind_is_yaochuu(self.base)
        }
    }
}

/// Scores a complete hand. `concealed` includes the winning tile. Returns
/// `None` when the tiles do not form a winning shape; a shape without yaku
/// comes back with [`WinningScore::require_fan`] set.
pub fn evaluate(concealed: &[Tile], melds: &[Meld], win_tile: Tile, ctx: &WinContext) -> Option<WinningScore> {
    let counts = kind_counts(concealed);
    if !agari::is_agari(&counts) {
        return None;
    }
    let mut all_tiles: Vec<Tile> = concealed.to_vec();
    for m in melds {
        all_tiles.extend_from_slice(&m.tiles);
    }
    let full = kind_counts(&all_tiles);
    let closed = melds.iter().all(|m| !m.is_open());

    let mut best: Option<WinningScore> = None;
    let mut consider = |ws: WinningScore| {
        let better = match &best {
            Some(b) => ws.value() > b.value(),
            None => true,
        };
        if better {
            best = Some(ws);
        }
    };

    if melds.is_empty() && agari::is_kokushi(&counts) {
        let mut ws = WinningScore::new();
        ws.add_yakuman(Yaku::KokushiMusou);
        add_first_draw(&mut ws, ctx);
        consider(ws);
    }
    if melds.is_empty() && agari::is_chiitoitsu(&counts) {
        consider(score_chiitoitsu(&full, &all_tiles, ctx));
    }
    let win_kind = win_tile.kind();
    for div in agari::find_divisions(&counts) {
        for win_idx in win_groups(&div, win_kind) {
            consider(score_standard(&div, win_idx, melds, closed, win_kind, &full, &all_tiles, ctx));
        }
    }
    best
}

/// Groups the winning tile can complete. `None` stands for the pair.
fn win_groups(div: &Division, win_kind: u8) -> Vec<Option<usize>> {
    let mut choices = Vec::new();
    if div.head == win_kind {
        choices.push(None);
    }
    for (idx, m) in div.body.iter().enumerate() {
        let hit = match *m {
            Mentsu::Koutsu(k) => k == win_kind,
            Mentsu::Shuntsu(s) => win_kind >= s && win_kind <= s + 2,
        };
        if hit {
            choices.push(Some(idx));
        }
    }
    choices
}

fn add_first_draw(ws: &mut WinningScore, ctx: &WinContext) {
    if ctx.first_draw && ctx.is_tsumo {
        ws.add_yakuman(if ctx.is_dealer { Yaku::Tenhou } else { Yaku::Chiihou });
    }
}

fn add_color_yakuman(ws: &mut WinningScore, full: &[u8; NUM_KINDS]) {
    let present = || (0..NUM_KINDS as u8).filter(|&k| full[k as usize] > 0);
    if present().all(kind_is_honor) {
        ws.add_yakuman(Yaku::Tsuuiisou);
    }
    if present().all(|k| matches!(k, 19 | 20 | 21 | 23 | 25 | HATSU)) {
        ws.add_yakuman(Yaku::Ryuuiisou);
    }
    if present().all(kind_is_terminal) {
        ws.add_yakuman(Yaku::Chinroutou);
    }
}

fn add_situational(ws: &mut WinningScore, ctx: &WinContext, closed: bool) {
    if ctx.double_riichi {
        ws.add_yaku(Yaku::DoubleRiichi, 2);
    } else if ctx.riichi {
        ws.add_yaku(Yaku::Riichi, 1);
    }
    if ctx.ippatsu && (ctx.riichi || ctx.double_riichi) {
        ws.add_yaku(Yaku::Ippatsu, 1);
    }
    if closed && ctx.is_tsumo {
        ws.add_yaku(Yaku::MenzenTsumo, 1);
    }
    if ctx.haitei {
        ws.add_yaku(Yaku::Haitei, 1);
    }
    if ctx.houtei {
        ws.add_yaku(Yaku::Houtei, 1);
    }
    if ctx.rinshan {
        ws.add_yaku(Yaku::Rinshan, 1);
    }
    if ctx.chankan {
        ws.add_yaku(Yaku::Chankan, 1);
    }
}

fn add_tile_yaku(ws: &mut WinningScore, full: &[u8; NUM_KINDS], closed: bool) {
    let present: Vec<u8> = (0..NUM_KINDS as u8).filter(|&k| full[k as usize] > 0).collect();
    if present.iter().all(|&k| !kind_is_yaochuu(k)) {
        ws.add_yaku(Yaku::Tanyao, 1);
    }
    let mut suits = present.iter().map(|&k| Suit::of_kind(k)).filter(|&s| s != Suit::Honor);
    let first = suits.next();
    let single_suit = first.is_some() && suits.all(|s| Some(s) == first);
    let has_honor = present.iter().any(|&k| kind_is_honor(k));
    if single_suit {
        if has_honor {
            ws.add_yaku(Yaku::Honitsu, if closed { 3 } else { 2 });
        } else {
            ws.add_yaku(Yaku::Chinitsu, if closed { 6 } else { 5 });
        }
    }
}

fn add_dora(ws: &mut WinningScore, all_tiles: &[Tile], ctx: &WinContext) {
    let count_for = |indicators: &[Tile]| -> u8 {
        indicators
            .iter()
            .map(|ind| {
                let target = next_dora_kind(ind.kind());
                all_tiles.iter().filter(|t| t.kind() == target).count() as u8
            })
            .sum()
    };
    ws.add_yaku(Yaku::Dora, count_for(&ctx.dora_indicators));
    ws.add_yaku(Yaku::AkaDora, all_tiles.iter().filter(|t| t.is_red()).count() as u8);
    if ctx.riichi || ctx.double_riichi {
        ws.add_yaku(Yaku::UraDora, count_for(&ctx.ura_indicators));
    }
}

fn score_chiitoitsu(full: &[u8; NUM_KINDS], all_tiles: &[Tile], ctx: &WinContext) -> WinningScore {
    let mut ws = WinningScore::new();
    add_color_yakuman(&mut ws, full);
    add_first_draw(&mut ws, ctx);
    if ws.yakuman_count() > 0 {
        return ws;
    }
    ws.add_yaku(Yaku::Chiitoitsu, 2);
    add_situational(&mut ws, ctx, true);
    add_tile_yaku(&mut ws, full, true);
    if (0..NUM_KINDS).all(|k| full[k] == 0 || kind_is_yaochuu(k as u8)) {
        ws.add_yaku(Yaku::Honroutou, 2);
    }
    ws.set_fu(25);
    add_dora(&mut ws, all_tiles, ctx);
    ws
}

#[allow(clippy::too_many_arguments)]
fn score_standard(
    div: &Division,
    win_idx: Option<usize>,
    melds: &[Meld],
    closed: bool,
    win_kind: u8,
    full: &[u8; NUM_KINDS],
    all_tiles: &[Tile],
    ctx: &WinContext,
) -> WinningScore {
    let mut groups: Vec<Group> = div
        .body
        .iter()
        .enumerate()
        .map(|(i, m)| match *m {
            // A triplet finished by someone else's tile counts as open.
            Mentsu::Koutsu(k) => Group {
                base: k,
                seq: false,
                kan: false,
                open: !ctx.is_tsumo && win_idx == Some(i),
            },
            Mentsu::Shuntsu(s) => Group {
                base: s,
                seq: true,
                kan: false,
                open: false,
            },
        })
        .collect();
    for m in melds {
        groups.push(Group {
            base: m.base_kind(),
            seq: m.kind == MeldKind::Chi,
            kan: m.kind.is_kan(),
            open: m.is_open(),
        });
    }

    let triplets: Vec<&Group> = groups.iter().filter(|g| !g.seq).collect();
    let concealed_triplets = triplets.iter().filter(|g| !g.open).count();
    let kans = groups.iter().filter(|g| g.kan).count();
    let dragon_triplets = triplets.iter().filter(|g| kind_is_dragon(g.base)).count();
    let wind_triplets = triplets.iter().filter(|g| kind_is_wind(g.base)).count();

    let mut ws = WinningScore::new();
    if concealed_triplets == 4 {
        ws.add_yakuman(Yaku::Suuankou);
    }
    if dragon_triplets == 3 {
        ws.add_yakuman(Yaku::Daisangen);
    }
    if wind_triplets == 4 {
        ws.add_yakuman(Yaku::Daisuushii);
    } else if wind_triplets == 3 && kind_is_wind(div.head) {
        ws.add_yakuman(Yaku::Shousuushii);
    }
    if kans == 4 {
        ws.add_yakuman(Yaku::Suukantsu);
    }
    add_color_yakuman(&mut ws, full);
    add_first_draw(&mut ws, ctx);
    if ws.yakuman_count() > 0 {
        return ws;
    }

    add_situational(&mut ws, ctx, closed);
    add_tile_yaku(&mut ws, full, closed);

    let is_value_kind = |k: u8| kind_is_dragon(k) || k == ctx.seat_wind || k == ctx.round_wind;
    let ryanmen = match win_idx {
        Some(i) if groups[i].seq => {
            let s = groups[i].base;
            (win_kind == s && s % 9 != 6) || (win_kind == s + 2 && s % 9 != 0)
        }
        _ => false,
    };
    let pinfu = closed && melds.is_empty() && groups.iter().all(|g| g.seq) && !is_value_kind(div.head) && ryanmen;
    if pinfu {
        ws.add_yaku(Yaku::Pinfu, 1);
    }

    if closed {
        let mut seq_counts = [0u8; NUM_KINDS];
        for g in groups.iter().filter(|g| g.seq) {
            seq_counts[g.base as usize] += 1;
        }
        let pairs: u8 = seq_counts.iter().map(|c| c / 2).sum();
        if pairs >= 2 {
            ws.add_yaku(Yaku::Ryanpeikou, 3);
        } else if pairs == 1 {
            ws.add_yaku(Yaku::Iipeikou, 1);
        }
    }

    for g in &triplets {
        match g.base {
            HAKU => ws.add_yaku(Yaku::Haku, 1),
            HATSU => ws.add_yaku(Yaku::Hatsu, 1),
            CHUN => ws.add_yaku(Yaku::Chun, 1),
            _ => {}
        }
        if g.base == ctx.seat_wind {
            ws.add_yaku(Yaku::SeatWind, 1);
        }
        if g.base == ctx.round_wind {
            ws.add_yaku(Yaku::RoundWind, 1);
        }
    }

    if triplets.len() == 4 {
        ws.add_yaku(Yaku::Toitoi, 2);
    }
    if concealed_triplets == 3 {
        ws.add_yaku(Yaku::Sanankou, 2);
    }
    if kans == 3 {
        ws.add_yaku(Yaku::Sankantsu, 2);
    }

    let has_seq = |base: u8| groups.iter().any(|g| g.seq && g.base == base);
    let has_triplet = |base: u8| triplets.iter().any(|g| g.base == base);
    if (0..7).any(|s| has_seq(s) && has_seq(s + 9) && has_seq(s + 18)) {
        ws.add_yaku(Yaku::SanshokuDoujun, if closed { 2 } else { 1 });
    }
    if (0..9).any(|r| has_triplet(r) && has_triplet(r + 9) && has_triplet(r + 18)) {
        ws.add_yaku(Yaku::SanshokuDoukou, 2);
    }
    if [0u8, 9, 18].iter().any(|&st| has_seq(st) && has_seq(st + 3) && has_seq(st + 6)) {
        ws.add_yaku(Yaku::Ittsu, if closed { 2 } else { 1 });
    }

    if groups.iter().all(|g| g.has_yaochuu()) && kind_is_yaochuu(div.head) {
        let any_seq = groups.iter().any(|g| g.seq);
        let any_honor = (0..NUM_KINDS).any(|k| full[k] > 0 && kind_is_honor(k as u8));
        if !any_seq {
            ws.add_yaku(Yaku::Honroutou, 2);
        } else if any_honor {
            ws.add_yaku(Yaku::Chanta, if closed { 2 } else { 1 });
        } else {
            ws.add_yaku(Yaku::Junchan, if closed { 3 } else { 2 });
        }
    }

    if dragon_triplets == 2 && kind_is_dragon(div.head) {
        ws.add_yaku(Yaku::Shousangen, 2);
    }

    let fu = if pinfu {
        if ctx.is_tsumo {
            20
        } else {
            30
        }
    } else {
        standard_fu(&groups, div.head, win_idx, win_kind, closed, ctx)
    };
    ws.set_fu(fu);
    add_dora(&mut ws, all_tiles, ctx);
    ws
}

fn standard_fu(
    groups: &[Group],
    head: u8,
    win_idx: Option<usize>,
    win_kind: u8,
    closed: bool,
    ctx: &WinContext,
) -> u8 {
    let mut fu: u32 = 20;
    if closed && !ctx.is_tsumo {
        fu += 10;
    }
    if ctx.is_tsumo {
        fu += 2;
    }
    for g in groups.iter().filter(|g| !g.seq) {
        let mut f = if kind_is_yaochuu(g.base) { 4 } else { 2 };
        if !g.open {
            f *= 2;
        }
        if g.kan {
            f *= 4;
        }
        fu += f;
    }
    if kind_is_dragon(head) {
        fu += 2;
    }
    if head == ctx.seat_wind {
        fu += 2;
    }
    if head == ctx.round_wind {
        fu += 2;
    }
    match win_idx {
        None => fu += 2,
        Some(i) if groups[i].seq => {
            let s = groups[i].base;
            let kanchan = win_kind == s + 1;
            let penchan = (win_kind == s && s % 9 == 6) || (win_kind == s + 2 && s % 9 == 0);
            if kanchan || penchan {
                fu += 2;
            }
        }
        Some(_) => {}
    }
    let rounded = fu.div_ceil(10) * 10;
    if rounded == 20 {
        30
    } else {
        rounded.min(110) as u8
    }
}
