use hg_core::ID;

/// Stable, machine-readable error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Precondition,
    Storage,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation_error",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Precondition => "precondition_failed",
            Self::Storage => "storage_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entity named by a [`LedgerError::NotFound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Game,
    Participant,
    Player,
    BuyIn,
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Game => f.write_str("game"),
            Self::Participant => f.write_str("participant"),
            Self::Player => f.write_str("player"),
            Self::BuyIn => f.write_str("buy-in"),
        }
    }
}

/// Everything a ledger operation can fail with.
///
/// No variant implies partial success: a failed operation leaves no
/// durable trace.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
    #[error("{entity} {id} not found")]
    NotFound { entity: Entity, id: uuid::Uuid },

    #[error("player already participates in this game")]
    DuplicateParticipant,
    #[error("participant has already cashed out")]
    DuplicateCashout,
    #[error("game is already completed")]
    GameAlreadyCompleted,

    #[error("game cannot be completed before its minimum cashout time")]
    CashoutBeforeMinimumTime,
    #[error("buy-in is dated before the game started")]
    BuyInBeforeGameStart,
    #[error("game start time is too far in the future")]
    StartTimeInFuture,
    #[error("minimum cashout time precedes the game start time")]
    MinCashoutBeforeStart,
    #[error("game has no participants")]
    EmptyParticipantSet,
    #[error("{0} participant(s) have no cashout")]
    MissingCashouts(usize),

    #[error("storage failure: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::DuplicateParticipant => ErrorKind::Conflict,
            Self::DuplicateCashout => ErrorKind::Conflict,
            Self::GameAlreadyCompleted => ErrorKind::Conflict,
            Self::CashoutBeforeMinimumTime => ErrorKind::Precondition,
            Self::BuyInBeforeGameStart => ErrorKind::Precondition,
            Self::StartTimeInFuture => ErrorKind::Precondition,
            Self::MinCashoutBeforeStart => ErrorKind::Precondition,
            Self::EmptyParticipantSet => ErrorKind::Precondition,
            Self::MissingCashouts(_) => ErrorKind::Precondition,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
    pub fn missing<T>(entity: Entity, id: ID<T>) -> Self {
        Self::NotFound {
            entity,
            id: id.inner(),
        }
    }
}

#[cfg(feature = "database")]
impl From<tokio_postgres::Error> for LedgerError {
    fn from(e: tokio_postgres::Error) -> Self {
        Self::Storage(Box::new(e))
    }
}
