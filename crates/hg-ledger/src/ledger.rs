use super::*;
use hg_core::*;
use std::sync::Arc;
use std::time::SystemTime;

/// Participant Ledger: seats, buy-ins, and cashouts of games in progress.
///
/// Every mutation locks its game first, so it either lands before a
/// concurrent completion or fails with [`LedgerError::GameAlreadyCompleted`].
pub struct Ledger<S, R> {
    store: Arc<S>,
    registry: Arc<R>,
    config: Arc<Config>,
}

impl<S, R> Ledger<S, R>
where
    S: Store,
    R: Registry,
{
    pub fn new(store: Arc<S>, registry: Arc<R>, config: Arc<Config>) -> Self {
        Self {
            store,
            registry,
            config,
        }
    }

    pub async fn add_participant(
        &self,
        game: ID<Game>,
        player: ID<Player>,
    ) -> Result<Participant, LedgerError> {
        let mut unit = self.store.begin().await?;
        Self::open(&mut unit, game).await?;
        match self.registry.find_player(player).await? {
            Some(p) if !p.deleted() => {}
            _ => return Err(LedgerError::missing(Entity::Player, player)),
        }
        let participant = Participant::new(ID::default(), game, player, SystemTime::now());
        unit.insert_participant(&participant).await?;
        unit.commit().await?;
        log::info!("[ledger] player {} joined game {}", player, game);
        Ok(participant)
    }

    pub async fn record_buyin(
        &self,
        participant: ID<Participant>,
        amount: BuyInAmount,
        time: Option<Timestamp>,
    ) -> Result<BuyIn, LedgerError> {
        let now = SystemTime::now();
        let time = time.unwrap_or(now);
        let mut unit = self.store.begin().await?;
        let seat = Self::seat(&mut unit, participant).await?;
        let game = Self::open(&mut unit, seat.game()).await?;
        if time < game.start() {
            return Err(LedgerError::BuyInBeforeGameStart);
        }
        if time > now + self.config.clock_skew {
            return Err(LedgerError::invalid("timestamp", "too far in the future"));
        }
        let buyin = BuyIn::new(ID::default(), participant, amount, time);
        unit.insert_buyin(&buyin).await?;
        unit.commit().await?;
        log::info!("[ledger] participant {} bought in for {}", participant, amount);
        Ok(buyin)
    }

    pub async fn update_buyin(
        &self,
        id: ID<BuyIn>,
        amount: BuyInAmount,
    ) -> Result<BuyIn, LedgerError> {
        let mut unit = self.store.begin().await?;
        let mut buyin = Self::find(&mut unit, id).await?;
        let seat = Self::seat(&mut unit, buyin.participant()).await?;
        Self::open(&mut unit, seat.game()).await?;
        buyin.amend(amount);
        unit.update_buyin(&buyin).await?;
        let reconciliation = Self::reconcile(&mut unit, seat.game()).await?;
        unit.commit().await?;
        log::info!(
            "[ledger] buy-in {} amended to {} ({})",
            id,
            amount,
            reconciliation.status()
        );
        Ok(buyin)
    }

    pub async fn delete_buyin(&self, id: ID<BuyIn>) -> Result<(), LedgerError> {
        let mut unit = self.store.begin().await?;
        let buyin = Self::find(&mut unit, id).await?;
        let seat = Self::seat(&mut unit, buyin.participant()).await?;
        Self::open(&mut unit, seat.game()).await?;
        unit.delete_buyin(id).await?;
        let reconciliation = Self::reconcile(&mut unit, seat.game()).await?;
        unit.commit().await?;
        log::info!("[ledger] buy-in {} deleted ({})", id, reconciliation.status());
        Ok(())
    }

    /// Uniqueness is left to the insert, never to a prior read.
    pub async fn record_cashout(
        &self,
        participant: ID<Participant>,
        amount: CashoutAmount,
    ) -> Result<Cashout, LedgerError> {
        let mut unit = self.store.begin().await?;
        let seat = Self::seat(&mut unit, participant).await?;
        Self::open(&mut unit, seat.game()).await?;
        let cashout = Cashout::new(ID::default(), participant, amount, SystemTime::now());
        unit.insert_cashout(&cashout).await?;
        unit.commit().await?;
        log::info!("[ledger] participant {} cashed out {}", participant, amount);
        Ok(cashout)
    }

    /// Read-only view of one game's books.
    pub async fn game_ledger(&self, game: ID<Game>) -> Result<GameLedger, LedgerError> {
        let mut unit = self.store.begin().await?;
        let record = unit
            .game(game)
            .await?
            .ok_or_else(|| LedgerError::missing(Entity::Game, game))?;
        let participants = unit.participants(game).await?;
        let buyins = unit.buyins(game).await?;
        let cashouts = unit.cashouts(game).await?;
        let settlements = unit.settlements(game).await?;
        unit.commit().await?;
        Ok(GameLedger::new(
            record,
            participants,
            buyins,
            cashouts,
            settlements,
        ))
    }
}

impl<S, R> Ledger<S, R>
where
    S: Store,
{
    async fn open<U: Unit>(unit: &mut U, id: ID<Game>) -> Result<Game, LedgerError> {
        let game = unit
            .lock_game(id)
            .await?
            .ok_or_else(|| LedgerError::missing(Entity::Game, id))?;
        game.ensure_open()?;
        Ok(game)
    }
    async fn seat<U: Unit>(
        unit: &mut U,
        id: ID<Participant>,
    ) -> Result<Participant, LedgerError> {
        unit.participant(id)
            .await?
            .ok_or_else(|| LedgerError::missing(Entity::Participant, id))
    }
    async fn find<U: Unit>(unit: &mut U, id: ID<BuyIn>) -> Result<BuyIn, LedgerError> {
        unit.buyin(id)
            .await?
            .ok_or_else(|| LedgerError::missing(Entity::BuyIn, id))
    }
    async fn reconcile<U: Unit>(
        unit: &mut U,
        game: ID<Game>,
    ) -> Result<Reconciliation, LedgerError> {
        let participants = unit.participants(game).await?;
        let buyins = unit.buyins(game).await?;
        let cashouts = unit.cashouts(game).await?;
        let reconciliation = Reconciliation::new(&participants, &buyins, &cashouts);
        log::debug!("[ledger] game {} {}", game, reconciliation);
        Ok(reconciliation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const HOUR: Duration = Duration::from_secs(3600);

    struct Table {
        store: Arc<Memory>,
        ledger: Ledger<Memory, Memory>,
        game: Game,
    }

    async fn table() -> Table {
        let store = Arc::new(Memory::new());
        let config = Arc::new(Config::default());
        let ledger = Ledger::new(store.clone(), store.clone(), config);
        let now = SystemTime::now();
        let game = Game::open(None, now - HOUR, now - HOUR, now, CLOCK_SKEW).unwrap();
        let mut unit = store.begin().await.unwrap();
        unit.insert_game(&game).await.unwrap();
        unit.commit().await.unwrap();
        Table {
            store,
            ledger,
            game,
        }
    }

    async fn player(store: &Memory, deleted: bool) -> ID<Player> {
        let player = Player::new(ID::default(), "someone".to_string(), deleted);
        let id = player.id();
        store.enroll(player).await;
        id
    }

    async fn seat(table: &Table) -> Participant {
        let player = player(&table.store, false).await;
        table
            .ledger
            .add_participant(table.game.id(), player)
            .await
            .unwrap()
    }

    async fn finish(table: &Table) {
        let mut unit = table.store.begin().await.unwrap();
        let mut game = unit.game(table.game.id()).await.unwrap().unwrap();
        game.complete(SystemTime::now(), None).unwrap();
        unit.finish_game(&game).await.unwrap();
        unit.commit().await.unwrap();
    }

    fn buy(chips: Chips) -> BuyInAmount {
        BuyInAmount::try_from(chips).unwrap()
    }

    fn cash(chips: Chips) -> CashoutAmount {
        CashoutAmount::try_from(chips).unwrap()
    }

    #[tokio::test]
    async fn participants_are_unique_per_game() {
        let table = table().await;
        let player = player(&table.store, false).await;
        let game = table.game.id();
        table.ledger.add_participant(game, player).await.unwrap();
        let err = table.ledger.add_participant(game, player).await.unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateParticipant));
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn unknown_or_deleted_players_cannot_join() {
        let table = table().await;
        let game = table.game.id();
        let err = table
            .ledger
            .add_participant(game, ID::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let deleted = player(&table.store, true).await;
        let err = table.ledger.add_participant(game, deleted).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = table
            .ledger
            .add_participant(ID::default(), deleted)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn rebuys_accumulate() {
        let table = table().await;
        let seat = seat(&table).await;
        table.ledger.record_buyin(seat.id(), buy(100), None).await.unwrap();
        table.ledger.record_buyin(seat.id(), buy(50), None).await.unwrap();
        let books = table.ledger.game_ledger(table.game.id()).await.unwrap();
        assert_eq!(books.standings()[0].buyins(), 150);
        assert_eq!(books.standings()[0].count(), 2);
        assert_eq!(books.transactions().len(), 2);
    }

    #[tokio::test]
    async fn buyin_time_is_bounded() {
        let table = table().await;
        let seat = seat(&table).await;
        let early = table.game.start() - HOUR;
        let err = table
            .ledger
            .record_buyin(seat.id(), buy(10), Some(early))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::BuyInBeforeGameStart));
        let late = SystemTime::now() + HOUR;
        let err = table
            .ledger
            .record_buyin(seat.id(), buy(10), Some(late))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        let at_start = table.game.start();
        let buyin = table
            .ledger
            .record_buyin(seat.id(), buy(10), Some(at_start))
            .await
            .unwrap();
        assert_eq!(buyin.time(), at_start);
    }

    #[tokio::test]
    async fn buyins_can_be_amended_and_removed() {
        let table = table().await;
        let seat = seat(&table).await;
        let buyin = table
            .ledger
            .record_buyin(seat.id(), buy(100), None)
            .await
            .unwrap();
        let amended = table.ledger.update_buyin(buyin.id(), buy(80)).await.unwrap();
        assert_eq!(amended.amount().chips(), 80);
        let books = table.ledger.game_ledger(table.game.id()).await.unwrap();
        assert_eq!(books.reconciliation().total_buyins(), 80);
        table.ledger.delete_buyin(buyin.id()).await.unwrap();
        let books = table.ledger.game_ledger(table.game.id()).await.unwrap();
        assert_eq!(books.reconciliation().total_buyins(), 0);
        let err = table.ledger.delete_buyin(buyin.id()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn second_cashout_conflicts() {
        let table = table().await;
        let seat = seat(&table).await;
        table.ledger.record_cashout(seat.id(), cash(40)).await.unwrap();
        let err = table
            .ledger
            .record_cashout(seat.id(), cash(0))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateCashout));
    }

    #[tokio::test]
    async fn concurrent_cashouts_yield_one_winner() {
        let table = table().await;
        let seat = seat(&table).await;
        let (a, b) = tokio::join!(
            table.ledger.record_cashout(seat.id(), cash(40)),
            table.ledger.record_cashout(seat.id(), cash(60)),
        );
        let wins = [&a, &b].iter().filter(|r| r.is_ok()).count();
        let conflicts = [a, b]
            .into_iter()
            .filter_map(Result::err)
            .filter(|e| e.kind() == ErrorKind::Conflict)
            .count();
        assert_eq!(wins, 1);
        assert_eq!(conflicts, 1);
        let books = table.ledger.game_ledger(table.game.id()).await.unwrap();
        assert_eq!(books.transactions().len(), 1);
    }

    #[tokio::test]
    async fn completed_games_are_frozen() {
        let table = table().await;
        let seat = seat(&table).await;
        let buyin = table
            .ledger
            .record_buyin(seat.id(), buy(100), None)
            .await
            .unwrap();
        finish(&table).await;
        let late = player(&table.store, false).await;
        let errs = [
            table
                .ledger
                .add_participant(table.game.id(), late)
                .await
                .unwrap_err(),
            table
                .ledger
                .record_buyin(seat.id(), buy(10), None)
                .await
                .unwrap_err(),
            table
                .ledger
                .update_buyin(buyin.id(), buy(10))
                .await
                .unwrap_err(),
            table.ledger.delete_buyin(buyin.id()).await.unwrap_err(),
            table
                .ledger
                .record_cashout(seat.id(), cash(10))
                .await
                .unwrap_err(),
        ];
        for err in errs {
            assert!(matches!(err, LedgerError::GameAlreadyCompleted));
        }
    }

    #[tokio::test]
    async fn unknown_participant() {
        let table = table().await;
        let err = table
            .ledger
            .record_buyin(ID::default(), buy(10), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = table
            .ledger
            .record_cashout(ID::default(), cash(10))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
