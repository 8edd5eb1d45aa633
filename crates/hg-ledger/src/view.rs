use super::*;
use hg_core::*;

/// One row of a game's chip movement history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    BuyIn(BuyIn),
    Cashout(Cashout),
}

impl Transaction {
    pub fn time(&self) -> Timestamp {
        match self {
            Self::BuyIn(b) => b.time(),
            Self::Cashout(c) => c.time(),
        }
    }
    pub fn participant(&self) -> ID<Participant> {
        match self {
            Self::BuyIn(b) => b.participant(),
            Self::Cashout(c) => c.participant(),
        }
    }
    /// Positive chips moved, in or out.
    pub fn amount(&self) -> Chips {
        match self {
            Self::BuyIn(b) => b.amount().chips(),
            Self::Cashout(c) => c.amount().chips(),
        }
    }
    /// Orders buy-ins before cashouts at equal times, then by id.
    fn key(&self) -> (Timestamp, u8, uuid::Uuid) {
        match self {
            Self::BuyIn(b) => (b.time(), 0, b.id().inner()),
            Self::Cashout(c) => (c.time(), 1, c.id().inner()),
        }
    }
}

/// Everything known about one game, reconciled.
#[derive(Debug, Clone)]
pub struct GameLedger {
    game: Game,
    participants: Vec<Participant>,
    transactions: Vec<Transaction>,
    settlements: Vec<Settlement>,
    reconciliation: Reconciliation,
}

impl GameLedger {
    pub fn new(
        game: Game,
        participants: Vec<Participant>,
        buyins: Vec<BuyIn>,
        cashouts: Vec<Cashout>,
        settlements: Vec<Settlement>,
    ) -> Self {
        let reconciliation = Reconciliation::new(&participants, &buyins, &cashouts);
        let mut transactions = buyins
            .into_iter()
            .map(Transaction::BuyIn)
            .chain(cashouts.into_iter().map(Transaction::Cashout))
            .collect::<Vec<Transaction>>();
        transactions.sort_by_key(Transaction::key);
        Self {
            game,
            participants,
            transactions,
            settlements,
            reconciliation,
        }
    }
    pub fn game(&self) -> &Game {
        &self.game
    }
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }
    /// Per-participant totals, aligned with [`Self::participants`].
    pub fn standings(&self) -> &[Standing] {
        self.reconciliation.standings()
    }
    /// Buy-ins and cashouts, oldest first.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }
    pub fn settlements(&self) -> &[Settlement] {
        &self.settlements
    }
    pub fn reconciliation(&self) -> &Reconciliation {
        &self.reconciliation
    }
    pub fn discrepancy(&self) -> Chips {
        self.reconciliation.discrepancy()
    }
    pub fn status(&self) -> BalanceStatus {
        self.reconciliation.status()
    }
}
