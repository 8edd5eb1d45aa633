use super::*;
use hg_core::*;
use std::collections::BTreeMap;

/// A directed payment from a net loser to a net winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Transfer {
    payer: ID<Player>,
    payee: ID<Player>,
    amount: Chips,
}

impl Transfer {
    pub fn new(payer: ID<Player>, payee: ID<Player>, amount: Chips) -> Self {
        Self {
            payer,
            payee,
            amount,
        }
    }
    pub fn payer(&self) -> ID<Player> {
        self.payer
    }
    pub fn payee(&self) -> ID<Player> {
        self.payee
    }
    pub fn amount(&self) -> Chips {
        self.amount
    }
}

impl std::fmt::Display for Transfer {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} -> {} : {}", self.payer, self.payee, self.amount)
    }
}

/// Debt netting over a game's final balances.
///
/// Winners are ordered largest first and losers most negative first, both
/// with ties broken by ascending player id, so output is reproducible.
/// A greedy two-pointer sweep then pairs them off; every step retires at
/// least one side, giving at most `winners + losers - 1` transfers.
///
/// If winnings and losses do not cancel (a miscounted table), the sweep
/// stops when either side runs out. The leftover is a table discrepancy,
/// not anyone's debt, and appears in no transfer.
#[derive(Debug, Clone, Default)]
pub struct Netting {
    winners: Vec<(ID<Player>, Chips)>,
    losers: Vec<(ID<Player>, Chips)>,
}

impl Netting {
    pub fn winners(&self) -> &[(ID<Player>, Chips)] {
        &self.winners
    }
    pub fn losers(&self) -> &[(ID<Player>, Chips)] {
        &self.losers
    }
    /// Net of all balances; nonzero when the table miscounted.
    pub fn residual(&self) -> Chips {
        self.winners
            .iter()
            .chain(self.losers.iter())
            .map(|(_, balance)| balance)
            .sum()
    }
    pub fn settle(self) -> Vec<Transfer> {
        let mut transfers = Vec::with_capacity(self.winners.len() + self.losers.len());
        let mut owed = self.winners.iter().map(|(_, b)| *b).collect::<Vec<_>>();
        let mut owes = self.losers.iter().map(|(_, b)| *b).collect::<Vec<_>>();
        let (mut w, mut l) = (0, 0);
        while w < owed.len() && l < owes.len() {
            let amount = owed[w].min(-owes[l]);
            if amount > 0 {
                transfers.push(Transfer::new(self.losers[l].0, self.winners[w].0, amount));
            }
            owed[w] -= amount;
            owes[l] += amount;
            if owed[w] == 0 {
                w += 1;
            }
            if owes[l] == 0 {
                l += 1;
            }
        }
        transfers
    }
}

/// Balances are summed per player first, so a player is never both a
/// winner and a loser. Zero balances neither pay nor receive.
impl From<Vec<(ID<Player>, Chips)>> for Netting {
    fn from(balances: Vec<(ID<Player>, Chips)>) -> Self {
        let mut merged = BTreeMap::<ID<Player>, Chips>::new();
        for (player, balance) in balances {
            *merged.entry(player).or_default() += balance;
        }
        let (mut winners, mut losers): (Vec<_>, Vec<_>) = merged
            .into_iter()
            .filter(|(_, balance)| *balance != 0)
            .partition(|(_, balance)| *balance > 0);
        winners.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        losers.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));
        Self { winners, losers }
    }
}
