use super::*;
use hg_core::*;
use std::sync::Arc;

/// Game Session Manager: opens games and reads them back.
pub struct Sessions<S> {
    store: Arc<S>,
    config: Arc<Config>,
}

impl<S> Sessions<S>
where
    S: Store,
{
    pub fn new(store: Arc<S>, config: Arc<Config>) -> Self {
        Self { store, config }
    }
    /// Opens a game in progress.
    pub async fn create_game(
        &self,
        start: Timestamp,
        minimum_cashout: Timestamp,
        location: Option<Location>,
    ) -> Result<Game, LedgerError> {
        let now = std::time::SystemTime::now();
        let game = Game::open(location, start, minimum_cashout, now, self.config.clock_skew)?;
        let mut unit = self.store.begin().await?;
        unit.insert_game(&game).await?;
        unit.commit().await?;
        log::info!(
            "[sessions] opened game {} at {}",
            game.id(),
            game.location().map(Location::as_str).unwrap_or("unknown location")
        );
        Ok(game)
    }
    pub async fn get_game(&self, id: ID<Game>) -> Result<Game, LedgerError> {
        let mut unit = self.store.begin().await?;
        let game = unit.game(id).await?;
        unit.commit().await?;
        game.ok_or_else(|| LedgerError::missing(Entity::Game, id))
    }
}
