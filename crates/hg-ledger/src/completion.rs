use super::*;
use hg_core::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::SystemTime;

/// One participant's final chip count, as submitted at completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalCount {
    pub participant: ID<Participant>,
    pub amount: CashoutAmount,
}

/// Everything a completion produced.
#[derive(Debug, Clone)]
pub struct Outcome {
    game: Game,
    settlements: Vec<Settlement>,
    reconciliation: Reconciliation,
}

impl Outcome {
    pub fn game(&self) -> &Game {
        &self.game
    }
    pub fn settlements(&self) -> &[Settlement] {
        &self.settlements
    }
    pub fn reconciliation(&self) -> &Reconciliation {
        &self.reconciliation
    }
}

/// Completion Orchestrator.
///
/// Cashouts, settlements, and the status flip share one unit: an observer
/// sees either the game in progress with none of them, or completed with all.
pub struct Completion<S> {
    store: Arc<S>,
    config: Arc<Config>,
}

impl<S> Completion<S>
where
    S: Store,
{
    pub fn new(store: Arc<S>, config: Arc<Config>) -> Self {
        Self { store, config }
    }

    pub async fn complete_game(
        &self,
        id: ID<Game>,
        counts: Vec<FinalCount>,
        notes: Option<Notes>,
    ) -> Result<Outcome, LedgerError> {
        let now = SystemTime::now();
        let mut unit = self.store.begin().await?;
        let mut game = unit
            .lock_game(id)
            .await?
            .ok_or_else(|| LedgerError::missing(Entity::Game, id))?;
        game.ensure_open()?;
        game.ensure_cashable(now)?;

        let participants = unit.participants(id).await?;
        if participants.is_empty() {
            return Err(LedgerError::EmptyParticipantSet);
        }
        let seated = participants.iter().map(|p| p.id()).collect::<HashSet<_>>();
        let mut named = HashSet::with_capacity(counts.len());
        for count in counts.iter() {
            if !seated.contains(&count.participant) {
                return Err(LedgerError::invalid(
                    "cashouts",
                    format!("participant {} is not in this game", count.participant),
                ));
            }
            if !named.insert(count.participant) {
                return Err(LedgerError::invalid(
                    "cashouts",
                    format!("participant {} is listed twice", count.participant),
                ));
            }
        }
        let cashed = unit
            .cashouts(id)
            .await?
            .iter()
            .map(|c| c.participant())
            .collect::<HashSet<_>>();
        if named.iter().any(|p| cashed.contains(p)) {
            return Err(LedgerError::DuplicateCashout);
        }
        let omitted = seated
            .iter()
            .filter(|p| !named.contains(p) && !cashed.contains(p))
            .copied()
            .collect::<Vec<_>>();

        let mut cashouts = counts
            .iter()
            .map(|c| Cashout::new(ID::default(), c.participant, c.amount, now))
            .collect::<Vec<_>>();
        match (self.config.omitted, omitted.len()) {
            (_, 0) => {}
            (Omitted::Reject, n) => {
                log::warn!("[completion] game {} rejected: {} without cashout", id, n);
                return Err(LedgerError::MissingCashouts(n));
            }
            (Omitted::RecordZero, n) => {
                log::info!("[completion] game {} records {} zero cashouts", id, n);
                cashouts.extend(
                    omitted
                        .into_iter()
                        .map(|p| Cashout::new(ID::default(), p, CashoutAmount::zero(), now)),
                );
            }
        }
        for cashout in cashouts.iter() {
            unit.insert_cashout(cashout).await?;
        }

        let buyins = unit.buyins(id).await?;
        let recorded = unit.cashouts(id).await?;
        let reconciliation = Reconciliation::new(&participants, &buyins, &recorded);
        let netting = Netting::from(reconciliation.balances());
        let residual = netting.residual();
        let settlements = netting
            .settle()
            .into_iter()
            .map(|t| Settlement::new(ID::default(), id, t))
            .collect::<Vec<_>>();
        for settlement in settlements.iter() {
            unit.insert_settlement(settlement).await?;
        }

        game.complete(now, notes)?;
        unit.finish_game(&game).await?;
        unit.commit().await?;

        log::info!(
            "[completion] game {} completed: {} cashouts, {} settlements, {}",
            id,
            cashouts.len(),
            settlements.len(),
            reconciliation
        );
        if reconciliation.status() == BalanceStatus::Red {
            log::warn!(
                "[completion] game {} cashed out {} more than bought in",
                id,
                reconciliation.discrepancy()
            );
        }
        if residual != 0 {
            log::debug!("[completion] game {} left {} unsettled", id, residual);
        }
        Ok(Outcome {
            game,
            settlements,
            reconciliation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const HOUR: Duration = Duration::from_secs(3600);

    struct Table {
        store: Arc<Memory>,
        game: Game,
        seats: Vec<Participant>,
    }

    /// A game past its minimum cashout time, one seat per entry in `buyins`.
    async fn table(buyins: &[Chips]) -> Table {
        let store = Arc::new(Memory::new());
        let now = SystemTime::now();
        let game = Game::open(None, now - 2 * HOUR, now - HOUR, now, CLOCK_SKEW).unwrap();
        let mut unit = store.begin().await.unwrap();
        unit.insert_game(&game).await.unwrap();
        let mut seats = Vec::new();
        for chips in buyins {
            let seat = Participant::new(ID::default(), game.id(), ID::default(), now);
            unit.insert_participant(&seat).await.unwrap();
            if *chips > 0 {
                let amount = BuyInAmount::try_from(*chips).unwrap();
                let buyin = BuyIn::new(ID::default(), seat.id(), amount, now);
                unit.insert_buyin(&buyin).await.unwrap();
            }
            seats.push(seat);
        }
        unit.commit().await.unwrap();
        Table { store, game, seats }
    }

    fn completion(table: &Table, omitted: Omitted) -> Completion<Memory> {
        let config = Config {
            omitted,
            ..Config::default()
        };
        Completion::new(table.store.clone(), Arc::new(config))
    }

    fn counts(table: &Table, cashouts: &[Chips]) -> Vec<FinalCount> {
        table
            .seats
            .iter()
            .zip(cashouts)
            .map(|(seat, chips)| FinalCount {
                participant: seat.id(),
                amount: CashoutAmount::try_from(*chips).unwrap(),
            })
            .collect()
    }

    async fn books(table: &Table) -> GameLedger {
        let ledger = Ledger::new(
            table.store.clone(),
            table.store.clone(),
            Arc::new(Config::default()),
        );
        ledger.game_ledger(table.game.id()).await.unwrap()
    }

    #[tokio::test]
    async fn losers_pay_the_winner() {
        let table = table(&[100, 100, 0]).await;
        let (a, b, c) = (&table.seats[0], &table.seats[1], &table.seats[2]);
        let notes = Notes::parse("counted twice").unwrap();
        let outcome = completion(&table, Omitted::Reject)
            .complete_game(table.game.id(), counts(&table, &[50, 30, 120]), notes)
            .await
            .unwrap();
        let transfers = outcome
            .settlements()
            .iter()
            .map(|s| (s.payer(), s.payee(), s.amount()))
            .collect::<Vec<_>>();
        assert_eq!(
            transfers,
            vec![
                (b.player(), c.player(), 70),
                (a.player(), c.player(), 50),
            ]
        );
        assert_eq!(outcome.reconciliation().status(), BalanceStatus::Green);
        assert_eq!(outcome.reconciliation().total_buyins(), 200);
        assert_eq!(outcome.game().status(), Status::Completed);
        assert!(outcome.game().end().is_some());
        assert_eq!(outcome.game().notes().map(Notes::as_str), Some("counted twice"));

        let books = books(&table).await;
        assert_eq!(books.game().status(), Status::Completed);
        assert_eq!(books.settlements().len(), 2);
        assert_eq!(books.transactions().len(), 5);
    }

    #[tokio::test]
    async fn shortfall_is_yellow_and_unsettled() {
        let table = table(&[100, 100, 100]).await;
        let outcome = completion(&table, Omitted::Reject)
            .complete_game(table.game.id(), counts(&table, &[0, 80, 200]), None)
            .await
            .unwrap();
        assert_eq!(outcome.reconciliation().discrepancy(), -20);
        assert_eq!(outcome.reconciliation().status(), BalanceStatus::Yellow);
        let paid = outcome.settlements().iter().map(|s| s.amount()).sum::<Chips>();
        assert_eq!(paid, 100);
    }

    #[tokio::test]
    async fn surplus_is_red() {
        let table = table(&[100, 100, 100]).await;
        let outcome = completion(&table, Omitted::Reject)
            .complete_game(table.game.id(), counts(&table, &[50, 100, 170]), None)
            .await
            .unwrap();
        assert_eq!(outcome.reconciliation().discrepancy(), 20);
        assert_eq!(outcome.reconciliation().status(), BalanceStatus::Red);
        assert_eq!(outcome.game().status(), Status::Completed);
    }

    #[tokio::test]
    async fn failed_settlement_write_leaves_no_trace() {
        let table = table(&[100, 100, 0]).await;
        table.store.inject(Fault::Settlement);
        let err = completion(&table, Omitted::Reject)
            .complete_game(table.game.id(), counts(&table, &[50, 30, 120]), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage);
        let books = books(&table).await;
        assert_eq!(books.game().status(), Status::InProgress);
        assert_eq!(books.game().end(), None);
        assert!(books.settlements().is_empty());
        assert_eq!(books.reconciliation().total_cashouts(), 0);
        assert!(books.standings().iter().all(|s| s.cashout().is_none()));
    }

    #[tokio::test]
    async fn failed_status_flip_leaves_no_trace() {
        let table = table(&[100, 100, 0]).await;
        table.store.inject(Fault::Finish);
        let completion = completion(&table, Omitted::Reject);
        let err = completion
            .complete_game(table.game.id(), counts(&table, &[50, 30, 120]), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage);
        let books = books(&table).await;
        assert_eq!(books.game().status(), Status::InProgress);
        assert!(books.settlements().is_empty());
        assert!(books.transactions().iter().all(|t| matches!(t, Transaction::BuyIn(_))));
        let retried = completion
            .complete_game(table.game.id(), counts(&table, &[50, 30, 120]), None)
            .await
            .unwrap();
        assert_eq!(retried.settlements().len(), 2);
    }

    #[tokio::test]
    async fn omitted_participants_are_rejected_by_default() {
        let table = table(&[100, 100, 0]).await;
        let err = completion(&table, Omitted::Reject)
            .complete_game(table.game.id(), counts(&table, &[200]), None)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::MissingCashouts(2)));
        assert_eq!(err.kind(), ErrorKind::Precondition);
        assert_eq!(books(&table).await.game().status(), Status::InProgress);
    }

    #[tokio::test]
    async fn omitted_participants_can_cash_out_zero() {
        let table = table(&[100, 100, 0]).await;
        let outcome = completion(&table, Omitted::RecordZero)
            .complete_game(table.game.id(), counts(&table, &[200]), None)
            .await
            .unwrap();
        let a = table.seats[0].player();
        let transfers = outcome
            .settlements()
            .iter()
            .map(|s| (s.payer(), s.payee(), s.amount()))
            .collect::<Vec<_>>();
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].1, a);
        assert_eq!(transfers[0].2, 100);
        let books = books(&table).await;
        assert!(books.standings().iter().all(|s| s.cashout().is_some()));
    }

    #[tokio::test]
    async fn earlier_cashouts_cover_their_participant() {
        let covered = table(&[100, 100]).await;
        let mut unit = covered.store.begin().await.unwrap();
        let early = Cashout::new(
            ID::default(),
            covered.seats[0].id(),
            CashoutAmount::try_from(150 as Chips).unwrap(),
            SystemTime::now(),
        );
        unit.insert_cashout(&early).await.unwrap();
        unit.commit().await.unwrap();
        let rest = vec![FinalCount {
            participant: covered.seats[1].id(),
            amount: CashoutAmount::try_from(50 as Chips).unwrap(),
        }];
        let outcome = completion(&covered, Omitted::Reject)
            .complete_game(covered.game.id(), rest, None)
            .await
            .unwrap();
        assert_eq!(outcome.settlements().len(), 1);
        assert_eq!(outcome.settlements()[0].amount(), 50);

        let repeated = table(&[100, 100]).await;
        let mut unit = repeated.store.begin().await.unwrap();
        let early = Cashout::new(
            ID::default(),
            repeated.seats[0].id(),
            CashoutAmount::zero(),
            SystemTime::now(),
        );
        unit.insert_cashout(&early).await.unwrap();
        unit.commit().await.unwrap();
        let err = completion(&repeated, Omitted::Reject)
            .complete_game(repeated.game.id(), counts(&repeated, &[0, 200]), None)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateCashout));
    }

    #[tokio::test]
    async fn payload_must_name_seated_participants_once() {
        let table = table(&[100, 100]).await;
        let completion = completion(&table, Omitted::Reject);
        let mut twice = counts(&table, &[100, 100]);
        twice.push(twice[0]);
        let err = completion
            .complete_game(table.game.id(), twice, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        let mut stranger = counts(&table, &[100, 100]);
        stranger.push(FinalCount {
            participant: ID::default(),
            amount: CashoutAmount::zero(),
        });
        let err = completion
            .complete_game(table.game.id(), stranger, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn completion_is_gated() {
        let empty = table(&[]).await;
        let err = completion(&empty, Omitted::Reject)
            .complete_game(empty.game.id(), vec![], None)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::EmptyParticipantSet));

        let err = completion(&empty, Omitted::Reject)
            .complete_game(ID::default(), vec![], None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let done = table(&[100]).await;
        let twice = completion(&done, Omitted::Reject);
        twice
            .complete_game(done.game.id(), counts(&done, &[100]), None)
            .await
            .unwrap();
        let err = twice
            .complete_game(done.game.id(), vec![], None)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::GameAlreadyCompleted));
    }

    #[tokio::test]
    async fn too_early_to_cash_out() {
        let store = Arc::new(Memory::new());
        let now = SystemTime::now();
        let game = Game::open(None, now - HOUR, now + HOUR, now, CLOCK_SKEW).unwrap();
        let seat = Participant::new(ID::default(), game.id(), ID::default(), now);
        let mut unit = store.begin().await.unwrap();
        unit.insert_game(&game).await.unwrap();
        unit.insert_participant(&seat).await.unwrap();
        unit.commit().await.unwrap();
        let completion = Completion::new(store, Arc::new(Config::default()));
        let count = FinalCount {
            participant: seat.id(),
            amount: CashoutAmount::zero(),
        };
        let err = completion
            .complete_game(game.id(), vec![count], None)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::CashoutBeforeMinimumTime));
    }

    #[tokio::test]
    async fn buyin_racing_completion_is_counted_or_refused() {
        for buyin_first in [true, false] {
            let racing = table(&[100, 100]).await;
            let ledger = Ledger::new(
                racing.store.clone(),
                racing.store.clone(),
                Arc::new(Config::default()),
            );
            let closer = completion(&racing, Omitted::Reject);
            let rebuy = ledger.record_buyin(
                racing.seats[0].id(),
                BuyInAmount::try_from(100 as Chips).unwrap(),
                None,
            );
            let close = closer.complete_game(racing.game.id(), counts(&racing, &[150, 150]), None);
            let (bought, outcome) = match buyin_first {
                true => tokio::join!(rebuy, close),
                false => {
                    let (outcome, bought) = tokio::join!(close, rebuy);
                    (bought, outcome)
                }
            };
            let outcome = outcome.unwrap();
            let expected = match bought {
                Ok(_) => 300,
                Err(LedgerError::GameAlreadyCompleted) => 200,
                Err(e) => panic!("unexpected {:?}", e),
            };
            assert_eq!(outcome.reconciliation().total_buyins(), expected);
            let books = books(&racing).await;
            assert_eq!(books.reconciliation().total_buyins(), expected);
            assert_eq!(
                books.reconciliation().total_buyins(),
                outcome.reconciliation().total_buyins()
            );
        }
    }
}
