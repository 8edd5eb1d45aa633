use super::*;
use hg_core::*;

/// Chips paid in by a single buy-in, within `[MIN_BUYIN, MAX_AMOUNT]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BuyInAmount(Chips);

/// Chips taken home by a participant, within `[MIN_CASHOUT, MAX_AMOUNT]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CashoutAmount(Chips);

impl BuyInAmount {
    pub fn chips(&self) -> Chips {
        self.0
    }
}

impl CashoutAmount {
    pub fn chips(&self) -> Chips {
        self.0
    }
    pub fn zero() -> Self {
        Self(MIN_CASHOUT)
    }
}

impl TryFrom<Chips> for BuyInAmount {
    type Error = LedgerError;
    fn try_from(chips: Chips) -> Result<Self, Self::Error> {
        match chips {
            MIN_BUYIN..=MAX_AMOUNT => Ok(Self(chips)),
            _ => Err(LedgerError::invalid(
                "amount",
                format!("buy-in must be between {} and {}", MIN_BUYIN, MAX_AMOUNT),
            )),
        }
    }
}

impl TryFrom<Chips> for CashoutAmount {
    type Error = LedgerError;
    fn try_from(chips: Chips) -> Result<Self, Self::Error> {
        match chips {
            MIN_CASHOUT..=MAX_AMOUNT => Ok(Self(chips)),
            _ => Err(LedgerError::invalid(
                "amount",
                format!("cashout must be between {} and {}", MIN_CASHOUT, MAX_AMOUNT),
            )),
        }
    }
}

impl From<BuyInAmount> for Chips {
    fn from(amount: BuyInAmount) -> Self {
        amount.0
    }
}

impl From<CashoutAmount> for Chips {
    fn from(amount: CashoutAmount) -> Self {
        amount.0
    }
}

impl std::fmt::Display for BuyInAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for CashoutAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
