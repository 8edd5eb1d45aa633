use super::*;
use hg_core::*;

/// A player's membership in one game.
/// Unique per (game, player); never deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    id: ID<Self>,
    game: ID<Game>,
    player: ID<Player>,
    joined: Timestamp,
}

impl Participant {
    pub fn new(id: ID<Self>, game: ID<Game>, player: ID<Player>, joined: Timestamp) -> Self {
        Self {
            id,
            game,
            player,
            joined,
        }
    }
    pub fn game(&self) -> ID<Game> {
        self.game
    }
    pub fn player(&self) -> ID<Player> {
        self.player
    }
    pub fn joined(&self) -> Timestamp {
        self.joined
    }
}

impl Unique for Participant {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use hg_pg::*;

    impl Schema for Participant {
        fn name() -> &'static str {
            PARTICIPANTS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                PARTICIPANTS,
                " (
                    id          UUID PRIMARY KEY,
                    game_id     UUID NOT NULL REFERENCES ",
                GAMES,
                "(id),
                    player_id   UUID NOT NULL REFERENCES ",
                PLAYERS,
                "(id),
                    joined_at   TIMESTAMPTZ NOT NULL,
                    CONSTRAINT ",
                PARTICIPANTS_UNIQUE,
                " UNIQUE (game_id, player_id)
                );"
            )
        }
        fn indices() -> &'static str {
            const_format::concatcp!(
                "CREATE INDEX IF NOT EXISTS idx_participants_player ON ",
                PARTICIPANTS,
                " (player_id);"
            )
        }
    }
}
