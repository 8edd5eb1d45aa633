use super::*;
use hg_core::ID;
use hg_core::Unique;

/// Registry view of a person. Owned by the external player registry;
/// the ledger only ever reads it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Player {
    id: ID<Self>,
    name: String,
    deleted: bool,
}

impl Player {
    pub fn new(id: ID<Self>, name: String, deleted: bool) -> Self {
        Self { id, name, deleted }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    /// Soft-deleted players cannot join new games.
    pub fn deleted(&self) -> bool {
        self.deleted
    }
}

impl Unique for Player {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

/// Read-only player lookup.
#[allow(async_fn_in_trait)]
pub trait Registry {
    async fn find_player(&self, id: ID<Player>) -> Result<Option<Player>, LedgerError>;
}

#[cfg(feature = "database")]
mod schema {
    use super::*;
    use hg_pg::*;

    /// The registry owns this table; the ledger only creates it when absent.
    impl Schema for Player {
        fn name() -> &'static str {
            PLAYERS
        }
        fn creates() -> &'static str {
            const_format::concatcp!(
                "CREATE TABLE IF NOT EXISTS ",
                PLAYERS,
                " (
                    id            UUID PRIMARY KEY,
                    display_name  VARCHAR(64) NOT NULL,
                    deleted       BOOLEAN NOT NULL DEFAULT FALSE
                );"
            )
        }
        fn indices() -> &'static str {
            ""
        }
    }
}
