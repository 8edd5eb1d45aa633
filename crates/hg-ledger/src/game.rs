use super::*;
use hg_core::*;

/// Game lifecycle. Transitions only forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    InProgress,
    Completed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
        }
    }
}

impl TryFrom<&str> for Status {
    type Error = LedgerError;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::Completed),
            other => Err(LedgerError::invalid("status", other.to_string())),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bounded cash-game session.
///
/// Invariants: `minimum_cashout >= start`; `end` is present exactly when the
/// game is completed, and then lies after `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    id: ID<Self>,
    location: Option<Location>,
    start: Timestamp,
    minimum_cashout: Timestamp,
    end: Option<Timestamp>,
    status: Status,
    notes: Option<Notes>,
}

impl Game {
    /// Opens a new game, rejecting start times beyond `now + skew` and
    /// times outside the storable range.
    pub fn open(
        location: Option<Location>,
        start: Timestamp,
        minimum_cashout: Timestamp,
        now: Timestamp,
        skew: std::time::Duration,
    ) -> Result<Self, LedgerError> {
        if !storable(start) {
            return Err(LedgerError::invalid("start_time", OUT_OF_RANGE));
        }
        if !storable(minimum_cashout) {
            return Err(LedgerError::invalid("minimum_cashout_time", OUT_OF_RANGE));
        }
        if minimum_cashout < start {
            return Err(LedgerError::MinCashoutBeforeStart);
        }
        if start > now + skew {
            return Err(LedgerError::StartTimeInFuture);
        }
        Ok(Self {
            id: ID::default(),
            location,
            start,
            minimum_cashout,
            end: None,
            status: Status::InProgress,
            notes: None,
        })
    }
    /// Rebuilds a game from storage.
    pub fn new(
        id: ID<Self>,
        location: Option<Location>,
        start: Timestamp,
        minimum_cashout: Timestamp,
        end: Option<Timestamp>,
        status: Status,
        notes: Option<Notes>,
    ) -> Self {
        Self {
            id,
            location,
            start,
            minimum_cashout,
            end,
            status,
            notes,
        }
    }
    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }
    pub fn start(&self) -> Timestamp {
        self.start
    }
    pub fn minimum_cashout(&self) -> Timestamp {
        self.minimum_cashout
    }
    pub fn end(&self) -> Option<Timestamp> {
        self.end
    }
    pub fn status(&self) -> Status {
        self.status
    }
    pub fn notes(&self) -> Option<&Notes> {
        self.notes.as_ref()
    }
    /// Guard for every ledger mutation.
    pub fn ensure_open(&self) -> Result<(), LedgerError> {
        match self.status {
            Status::InProgress => Ok(()),
            Status::Completed => Err(LedgerError::GameAlreadyCompleted),
        }
    }
    /// Whether cashouts may be finalized at `now`.
    pub fn ensure_cashable(&self, now: Timestamp) -> Result<(), LedgerError> {
        match now >= self.minimum_cashout && now > self.start {
            true => Ok(()),
            false => Err(LedgerError::CashoutBeforeMinimumTime),
        }
    }
    /// Flips the game to COMPLETED at `now`.
    pub fn complete(&mut self, now: Timestamp, notes: Option<Notes>) -> Result<(), LedgerError> {
        self.ensure_open()?;
        self.ensure_cashable(now)?;
        self.status = Status::Completed;
        self.end = Some(now);
        self.notes = notes;
        Ok(())
    }
}

/// Reason given for timestamps outside `0..=MAX_EPOCH_MILLIS`.
pub const OUT_OF_RANGE: &str = "must lie between 1970-01-01 and 9999-12-31";

impl Unique for Game {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use hg_pg::*;

    impl Schema for Game {
        fn name() -> &'static str {
            GAMES
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                GAMES,
                " (
                    id               UUID PRIMARY KEY,
                    location         VARCHAR(128),
                    start_time       TIMESTAMPTZ NOT NULL,
                    min_cashout_time TIMESTAMPTZ NOT NULL,
                    end_time         TIMESTAMPTZ,
                    status           TEXT NOT NULL DEFAULT 'IN_PROGRESS'
                                     CHECK (status IN ('IN_PROGRESS', 'COMPLETED')),
                    notes            VARCHAR(1000),
                    CHECK (min_cashout_time >= start_time),
                    CHECK ((status = 'COMPLETED') = (end_time IS NOT NULL)),
                    CHECK (end_time IS NULL OR end_time > start_time)
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_games_status ON ",
                GAMES,
                " (status);"
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const HOUR: Duration = Duration::from_secs(3600);

    fn now() -> Timestamp {
        std::time::SystemTime::now()
    }

    #[test]
    fn opens_in_progress() {
        let t = now();
        let game = Game::open(None, t - HOUR, t, t, CLOCK_SKEW).unwrap();
        assert_eq!(game.status(), Status::InProgress);
        assert_eq!(game.end(), None);
    }

    #[test]
    fn minimum_cashout_before_start() {
        let t = now();
        let err = Game::open(None, t, t - HOUR, t, CLOCK_SKEW).unwrap_err();
        assert!(matches!(err, LedgerError::MinCashoutBeforeStart));
    }

    #[test]
    fn start_within_skew_is_accepted() {
        let t = now();
        assert!(Game::open(None, t + Duration::from_secs(60), t + HOUR, t, CLOCK_SKEW).is_ok());
        let err = Game::open(None, t + HOUR, t + HOUR, t, CLOCK_SKEW).unwrap_err();
        assert!(matches!(err, LedgerError::StartTimeInFuture));
    }

    #[test]
    fn historical_start_is_accepted() {
        let t = now();
        let year = Duration::from_secs(365 * 24 * 3600);
        assert!(Game::open(None, t - year, t - year, t, CLOCK_SKEW).is_ok());
    }

    #[test]
    fn unstorable_times_are_rejected() {
        let t = now();
        let far = std::time::UNIX_EPOCH + Duration::from_millis(MAX_EPOCH_MILLIS as u64 + 1);
        let err = Game::open(None, t - HOUR, far, t, CLOCK_SKEW).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Validation { field: "minimum_cashout_time", .. }
        ));
        let early = std::time::UNIX_EPOCH - HOUR;
        let err = Game::open(None, early, t, t, CLOCK_SKEW).unwrap_err();
        assert!(matches!(err, LedgerError::Validation { field: "start_time", .. }));
    }

    #[test]
    fn completion_is_terminal() {
        let t = now();
        let mut game = Game::open(None, t - HOUR, t - HOUR, t, CLOCK_SKEW).unwrap();
        game.complete(t, None).unwrap();
        assert_eq!(game.status(), Status::Completed);
        assert_eq!(game.end(), Some(t));
        assert!(matches!(
            game.complete(t, None).unwrap_err(),
            LedgerError::GameAlreadyCompleted
        ));
        assert!(game.ensure_open().is_err());
    }

    #[test]
    fn completion_waits_for_minimum_cashout() {
        let t = now();
        let mut game = Game::open(None, t - HOUR, t + HOUR, t, CLOCK_SKEW).unwrap();
        let err = game.complete(t, None).unwrap_err();
        assert!(matches!(err, LedgerError::CashoutBeforeMinimumTime));
        assert_eq!(game.status(), Status::InProgress);
    }

    #[test]
    fn status_names() {
        assert_eq!(Status::try_from("COMPLETED").unwrap(), Status::Completed);
        assert_eq!(Status::InProgress.to_string(), "IN_PROGRESS");
        assert!(Status::try_from("paused").is_err());
    }
}
