use super::*;
use hg_core::*;

/// Chips bought by a participant at a point in time. Re-buys are
/// separate records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuyIn {
    id: ID<Self>,
    participant: ID<Participant>,
    amount: BuyInAmount,
    time: Timestamp,
}

impl BuyIn {
    pub fn new(
        id: ID<Self>,
        participant: ID<Participant>,
        amount: BuyInAmount,
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
    pub fn amount(&self) -> BuyInAmount {
        self.amount
    }
    pub fn time(&self) -> Timestamp {
        self.time
    }
    /// Corrects the amount. Only legal while the game is in progress.
    pub fn amend(&mut self, amount: BuyInAmount) {
        self.amount = amount;
    }
}

impl Unique for BuyIn {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use hg_pg::*;

    impl Schema for BuyIn {
        fn name() -> &'static str {
            BUYINS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                BUYINS,
                " (
                    id              UUID PRIMARY KEY,
                    participant_id  UUID NOT NULL REFERENCES ",
                PARTICIPANTS,
                "(id),
                    amount          BIGINT NOT NULL CHECK (amount BETWEEN 1 AND 1000000),
                    created_at      TIMESTAMPTZ NOT NULL
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_buyins_participant ON ",
                BUYINS,
                " (participant_id);"
            )
        }
    }
}
