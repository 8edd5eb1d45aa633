use super::*;
use hg_core::*;

/// A persisted debt: the payer owes the payee the given amount for one game.
/// Written only by completion; never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    id: ID<Self>,
    game: ID<Game>,
    transfer: Transfer,
}

impl Settlement {
    pub fn new(id: ID<Self>, game: ID<Game>, transfer: Transfer) -> Self {
        Self { id, game, transfer }
    }
    pub fn game(&self) -> ID<Game> {
        self.game
    }
    pub fn payer(&self) -> ID<Player> {
        self.transfer.payer()
    }
    pub fn payee(&self) -> ID<Player> {
        self.transfer.payee()
    }
    pub fn amount(&self) -> Chips {
        self.transfer.amount()
    }
    pub fn transfer(&self) -> &Transfer {
        &self.transfer
    }
}

impl Unique for Settlement {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

impl std::fmt::Display for Settlement {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.transfer)
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use hg_pg::*;

    impl Schema for Settlement {
        fn name() -> &'static str {
            SETTLEMENTS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                SETTLEMENTS,
                " (
                    id              UUID PRIMARY KEY,
                    game_id         UUID NOT NULL REFERENCES ",
                GAMES,
                "(id),
                    from_player_id  UUID NOT NULL REFERENCES ",
                PLAYERS,
                "(id),
                    to_player_id    UUID NOT NULL REFERENCES ",
                PLAYERS,
                "(id),
                    amount          BIGINT NOT NULL CHECK (amount >= 1),
                    CHECK (from_player_id <> to_player_id)
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_settlements_game ON ",
                SETTLEMENTS,
                " (game_id);"
            )
        }
    }
}
