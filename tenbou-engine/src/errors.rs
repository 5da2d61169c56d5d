use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// 設定エラー（シード・持ち点・ルール・山の並びの不正）
    Configuration { message: String },
    /// 牌文字列・手牌文字列のパースエラー
    Parse { input: String, message: String },
    /// 合法手集合に含まれないアクション
    IllegalAction { seat: u8, message: String },
    /// 役なし・形不成立などの和了宣言
    InvalidWinClaim { seat: u8, message: String },
    /// 山（ツモ山）が尽きた
    WallExhausted,
    /// 嶺上牌が尽きた
    NoReplacementTilesLeft,
    /// 牌の所有・枚数などの内部不整合（致命的）
    InvariantViolation { message: String },
    /// シリアライズ/デシリアライズの失敗
    Serialization { message: String },
}

impl EngineError {
    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        EngineError::InvariantViolation {
            message: message.into(),
        }
    }

    pub(crate) fn illegal(seat: u8, message: impl Into<String>) -> Self {
        EngineError::IllegalAction {
            seat,
            message: message.into(),
        }
    }

    /// Fatal errors end the game: a configuration that cannot start, or a
    /// state that no longer satisfies its ownership invariants.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            EngineError::Configuration { .. } | EngineError::InvariantViolation { .. }
        )
    }

    /// Errors an agent can recover from by submitting another action.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::IllegalAction { .. } | EngineError::InvalidWinClaim { .. }
        )
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Configuration { message } => {
                write!(f, "Configuration error: {}", message)
            }
            EngineError::Parse { input, message } => {
                write!(f, "Parse error on '{}': {}", input, message)
            }
            EngineError::IllegalAction { seat, message } => {
                write!(f, "Illegal action from seat {}: {}", seat, message)
            }
            EngineError::InvalidWinClaim { seat, message } => {
                write!(f, "Invalid win claim from seat {}: {}", seat, message)
            }
            EngineError::WallExhausted => write!(f, "Wall exhausted"),
            EngineError::NoReplacementTilesLeft => write!(f, "No replacement tiles left"),
            EngineError::InvariantViolation { message } => {
                write!(f, "Invariant violation: {}", message)
            }
            EngineError::Serialization { message } => {
                write!(f, "Serialization error: {}", message)
            }
        }
    }
}

impl std::error::Error for EngineError {}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Serialization {
            message: err.to_string(),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
