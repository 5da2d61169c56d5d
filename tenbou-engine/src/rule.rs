use serde::{Deserialize, Serialize};

/// How simultaneous ron claims on one discard are settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RonPolicy {
    /// Every claimant wins and the discarder pays each of them.
    #[default]
    Multiple,
    /// Only the claimant closest clockwise to the discarder wins.
    HeadBump,
}

/// Which of several equally ranked call claims is honored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimTieBreak {
    #[default]
    ClosestToDiscarder,
    FurthestFromDiscarder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRule {
    pub ron_policy: RonPolicy,
    pub claim_tie_break: ClaimTieBreak,

    /// Forbids discarding the called kind (and the flank of a chi) right
    /// after a call.
    pub kuikae_forbidden: bool,

    /// Whether a tenpai dealer keeps the seat after an exhaustive draw.
    /// Off by default: the dealer then repeats only after a win or an
    /// abortive draw.
    pub dealer_tenpai_repeats: bool,

    pub four_kan_abort: bool,
    pub four_wind_abort: bool,
    pub four_riichi_abort: bool,
    pub nine_terminals_abort: bool,
}

impl Default for GameRule {
    fn default() -> Self {
        Self {
            dealer_tenpai_repeats: false,
            ..Self::default_tenhou()
        }
    }
}

impl GameRule {
    pub fn default_tenhou() -> Self {
        Self {
            ron_policy: RonPolicy::Multiple,
            claim_tie_break: ClaimTieBreak::ClosestToDiscarder,
            kuikae_forbidden: true,
            dealer_tenpai_repeats: true,
            four_kan_abort: true,
            four_wind_abort: true,
            four_riichi_abort: true,
            nine_terminals_abort: true,
        }
    }

    /// Single ron with no abortive draws except the ones that end the wall.
    pub fn default_head_bump() -> Self {
        Self {
            ron_policy: RonPolicy::HeadBump,
            four_wind_abort: false,
            four_riichi_abort: false,
            nine_terminals_abort: false,
            ..Self::default()
        }
    }
}
