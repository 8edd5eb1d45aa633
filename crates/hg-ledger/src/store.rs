use super::*;
use hg_core::ID;

/// Source of units of work.
///
/// Every ledger operation runs inside exactly one [`Unit`], so each
/// operation either commits as a whole or leaves no trace.
#[allow(async_fn_in_trait)]
pub trait Store {
    type Unit<'a>: Unit
    where
        Self: 'a;
    async fn begin(&self) -> Result<Self::Unit<'_>, LedgerError>;
}

/// A single transaction over the five ledger tables.
///
/// Writes become visible to other units only on [`Unit::commit`].
/// Dropping a unit without committing discards all of its writes.
///
/// Implementations enforce uniqueness themselves, at the point of insert:
/// a second participant row for the same (game, player) fails with
/// [`LedgerError::DuplicateParticipant`] and a second cashout for the same
/// participant fails with [`LedgerError::DuplicateCashout`].
#[allow(async_fn_in_trait)]
pub trait Unit {
    async fn commit(self) -> Result<(), LedgerError>;

    async fn game(&mut self, id: ID<Game>) -> Result<Option<Game>, LedgerError>;
    /// Reads a game and holds it exclusively until the unit ends.
    /// Serializes every mutation of one game's ledger.
    async fn lock_game(&mut self, id: ID<Game>) -> Result<Option<Game>, LedgerError>;
    async fn insert_game(&mut self, game: &Game) -> Result<(), LedgerError>;
    /// Persists status, end time, and notes of a completed game.
    async fn finish_game(&mut self, game: &Game) -> Result<(), LedgerError>;

    async fn participant(
        &mut self,
        id: ID<Participant>,
    ) -> Result<Option<Participant>, LedgerError>;
    /// Participants of a game, in join order.
    async fn participants(&mut self, game: ID<Game>) -> Result<Vec<Participant>, LedgerError>;
    async fn insert_participant(&mut self, participant: &Participant) -> Result<(), LedgerError>;

    async fn buyin(&mut self, id: ID<BuyIn>) -> Result<Option<BuyIn>, LedgerError>;
    /// Buy-ins of every participant of a game.
    async fn buyins(&mut self, game: ID<Game>) -> Result<Vec<BuyIn>, LedgerError>;
    async fn insert_buyin(&mut self, buyin: &BuyIn) -> Result<(), LedgerError>;
    async fn update_buyin(&mut self, buyin: &BuyIn) -> Result<(), LedgerError>;
    async fn delete_buyin(&mut self, id: ID<BuyIn>) -> Result<(), LedgerError>;

    /// Cashouts of every participant of a game.
    async fn cashouts(&mut self, game: ID<Game>) -> Result<Vec<Cashout>, LedgerError>;
    async fn insert_cashout(&mut self, cashout: &Cashout) -> Result<(), LedgerError>;

    async fn settlements(&mut self, game: ID<Game>) -> Result<Vec<Settlement>, LedgerError>;
    async fn insert_settlement(&mut self, settlement: &Settlement) -> Result<(), LedgerError>;
}
