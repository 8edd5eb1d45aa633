use super::*;
use hg_core::*;

/// The single final amount a participant leaves with. Immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cashout {
    id: ID<Self>,
    participant: ID<Participant>,
    amount: CashoutAmount,
    time: Timestamp,
}

impl Cashout {
    pub fn new(
        id: ID<Self>,
        participant: ID<Participant>,
        amount: CashoutAmount,
        time: Timestamp,
    ) -> Self {
        Self {
            id,
            participant,
            amount,
            time,
        }
    }
    pub fn participant(&self) -> ID<Participant> {
        self.participant
    }
    pub fn amount(&self) -> CashoutAmount {
        self.amount
    }
    pub fn time(&self) -> Timestamp {
        self.time
    }
}

impl Unique for Cashout {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use hg_pg::*;

    /// `participant_id` is UNIQUE: concurrent cashouts for the same
    /// participant race on this constraint and exactly one wins.
    impl Schema for Cashout {
        fn name() -> &'static str {
            CASHOUTS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                CASHOUTS,
                " (
                    id              UUID PRIMARY KEY,
                    participant_id  UUID NOT NULL REFERENCES ",
                PARTICIPANTS,
                "(id),
                    amount          BIGINT NOT NULL CHECK (amount BETWEEN 0 AND 1000000),
                    created_at      TIMESTAMPTZ NOT NULL,
                    CONSTRAINT ",
                CASHOUTS_UNIQUE,
                " UNIQUE (participant_id)
                );"
            )
        }
        fn indices() -> &'static str {
            ""
        }
    }
}
