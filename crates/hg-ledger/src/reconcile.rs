use super::*;
use hg_core::*;
use std::collections::HashMap;

/// How well chips out match chips in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BalanceStatus {
    /// Exact accounting.
    Green,
    /// Fewer chips out than in. Usually benign: losers rarely count to the chip.
    Yellow,
    /// More chips out than in. Someone miscounted; the operator must look.
    Red,
}

impl BalanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Green => "GREEN",
            Self::Yellow => "YELLOW",
            Self::Red => "RED",
        }
    }
}

impl From<Chips> for BalanceStatus {
    fn from(discrepancy: Chips) -> Self {
        match discrepancy {
            0 => Self::Green,
            d if d < 0 => Self::Yellow,
            _ => Self::Red,
        }
    }
}

impl std::fmt::Display for BalanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One participant's totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    participant: ID<Participant>,
    player: ID<Player>,
    buyins: Chips,
    count: usize,
    cashout: Option<Chips>,
}

impl Standing {
    pub fn participant(&self) -> ID<Participant> {
        self.participant
    }
    pub fn player(&self) -> ID<Player> {
        self.player
    }
    /// Sum of all buy-ins and re-buys.
    pub fn buyins(&self) -> Chips {
        self.buyins
    }
    /// Number of buy-in records.
    pub fn count(&self) -> usize {
        self.count
    }
    /// Recorded cashout, if any.
    pub fn cashout(&self) -> Option<Chips> {
        self.cashout
    }
    /// Cashout (zero when absent) minus buy-ins.
    pub fn profit_loss(&self) -> Chips {
        self.cashout.unwrap_or(0) - self.buyins
    }
}

/// Aggregate view of a game's ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    standings: Vec<Standing>,
}

impl Reconciliation {
    /// Folds ledger rows into per-participant standings, in participant
    /// order. Rows for participants outside `participants` are ignored.
    pub fn new(participants: &[Participant], buyins: &[BuyIn], cashouts: &[Cashout]) -> Self {
        let index = participants
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id(), i))
            .collect::<HashMap<ID<Participant>, usize>>();
        let mut standings = participants
            .iter()
            .map(|p| Standing {
                participant: p.id(),
                player: p.player(),
                buyins: 0,
                count: 0,
                cashout: None,
            })
            .collect::<Vec<Standing>>();
        for buyin in buyins {
            if let Some(&i) = index.get(&buyin.participant()) {
                standings[i].buyins += buyin.amount().chips();
                standings[i].count += 1;
            }
        }
        for cashout in cashouts {
            if let Some(&i) = index.get(&cashout.participant()) {
                standings[i].cashout = Some(cashout.amount().chips());
            }
        }
        Self { standings }
    }
    pub fn standings(&self) -> &[Standing] {
        &self.standings
    }
    pub fn total_buyins(&self) -> Chips {
        self.standings.iter().map(Standing::buyins).sum()
    }
    pub fn total_cashouts(&self) -> Chips {
        self.standings.iter().filter_map(Standing::cashout).sum()
    }
    /// Cashouts minus buy-ins; zero for a perfectly counted table.
    pub fn discrepancy(&self) -> Chips {
        self.total_cashouts() - self.total_buyins()
    }
    pub fn status(&self) -> BalanceStatus {
        BalanceStatus::from(self.discrepancy())
    }
    /// Net balance per player, the input to [`Netting`].
    pub fn balances(&self) -> Vec<(ID<Player>, Chips)> {
        self.standings
            .iter()
            .map(|s| (s.player(), s.profit_loss()))
            .collect()
    }
}

impl std::fmt::Display for Reconciliation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "in {} out {} ({:+}) {}",
            self.total_buyins(),
            self.total_cashouts(),
            self.discrepancy(),
            self.status()
        )
    }
}
