use hg_core::*;
use hg_ledger::*;
use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// REQUESTS
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateGame {
    pub start_time: i64,
    pub minimum_cashout_time: i64,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddParticipant {
    pub player_id: uuid::Uuid,
}

#[derive(Debug, Deserialize)]
pub struct RecordBuyIn {
    pub amount: Chips,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBuyIn {
    pub amount: Chips,
}

#[derive(Debug, Deserialize)]
pub struct RecordCashout {
    pub amount: Chips,
}

#[derive(Debug, Deserialize)]
pub struct CompleteGame {
    pub cashouts: Vec<FinalCountBody>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FinalCountBody {
    pub participant_id: uuid::Uuid,
    pub amount: Chips,
}

impl TryFrom<&FinalCountBody> for FinalCount {
    type Error = LedgerError;
    fn try_from(body: &FinalCountBody) -> Result<Self, Self::Error> {
        Ok(Self {
            participant: ID::from(body.participant_id),
            amount: CashoutAmount::try_from(body.amount)?,
        })
    }
}

// ============================================================================
// RESPONSES
// ============================================================================

/// Error body shared by every failing route.
#[derive(Debug, Serialize)]
pub struct Failure {
    pub kind: &'static str,
    pub message: String,
}

impl From<&LedgerError> for Failure {
    fn from(e: &LedgerError) -> Self {
        Self {
            kind: e.kind().as_str(),
            message: e.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GameInfo {
    pub id: String,
    pub location: Option<String>,
    pub start_time: i64,
    pub minimum_cashout_time: i64,
    pub end_time: Option<i64>,
    pub status: &'static str,
    pub notes: Option<String>,
}

impl From<&Game> for GameInfo {
    fn from(game: &Game) -> Self {
        Self {
            id: game.id().to_string(),
            location: game.location().map(|l| l.as_str().to_string()),
            start_time: millis(game.start()),
            minimum_cashout_time: millis(game.minimum_cashout()),
            end_time: game.end().map(millis),
            status: game.status().as_str(),
            notes: game.notes().map(|n| n.as_str().to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ParticipantInfo {
    pub id: String,
    pub game_id: String,
    pub player_id: String,
    pub joined_at: i64,
}

impl From<&Participant> for ParticipantInfo {
    fn from(p: &Participant) -> Self {
        Self {
            id: p.id().to_string(),
            game_id: p.game().to_string(),
            player_id: p.player().to_string(),
            joined_at: millis(p.joined()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BuyInInfo {
    pub id: String,
    pub participant_id: String,
    pub amount: Chips,
    pub timestamp: i64,
}

impl From<&BuyIn> for BuyInInfo {
    fn from(b: &BuyIn) -> Self {
        Self {
            id: b.id().to_string(),
            participant_id: b.participant().to_string(),
            amount: b.amount().chips(),
            timestamp: millis(b.time()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CashoutInfo {
    pub id: String,
    pub participant_id: String,
    pub amount: Chips,
    pub timestamp: i64,
}

impl From<&Cashout> for CashoutInfo {
    fn from(c: &Cashout) -> Self {
        Self {
            id: c.id().to_string(),
            participant_id: c.participant().to_string(),
            amount: c.amount().chips(),
            timestamp: millis(c.time()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SettlementInfo {
    pub id: String,
    pub game_id: String,
    pub from_player_id: String,
    pub to_player_id: String,
    pub amount: Chips,
}

impl From<&Settlement> for SettlementInfo {
    fn from(s: &Settlement) -> Self {
        Self {
            id: s.id().to_string(),
            game_id: s.game().to_string(),
            from_player_id: s.payer().to_string(),
            to_player_id: s.payee().to_string(),
            amount: s.amount(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StandingInfo {
    pub participant_id: String,
    pub player_id: String,
    pub total_buyins: Chips,
    pub buyin_count: usize,
    pub cashout: Option<Chips>,
    pub profit_loss: Chips,
}

impl From<&Standing> for StandingInfo {
    fn from(s: &Standing) -> Self {
        Self {
            participant_id: s.participant().to_string(),
            player_id: s.player().to_string(),
            total_buyins: s.buyins(),
            buyin_count: s.count(),
            cashout: s.cashout(),
            profit_loss: s.profit_loss(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TransactionInfo {
    pub kind: &'static str,
    pub id: String,
    pub participant_id: String,
    pub amount: Chips,
    pub timestamp: i64,
}

impl From<&Transaction> for TransactionInfo {
    fn from(t: &Transaction) -> Self {
        let (kind, id) = match t {
            Transaction::BuyIn(b) => ("BUY_IN", b.id().to_string()),
            Transaction::Cashout(c) => ("CASHOUT", c.id().to_string()),
        };
        Self {
            kind,
            id,
            participant_id: t.participant().to_string(),
            amount: t.amount(),
            timestamp: millis(t.time()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LedgerInfo {
    pub game: GameInfo,
    pub participants: Vec<StandingInfo>,
    pub transactions: Vec<TransactionInfo>,
    pub settlements: Vec<SettlementInfo>,
    pub total_buyins: Chips,
    pub total_cashouts: Chips,
    pub balance_discrepancy: Chips,
    pub balance_status: &'static str,
}

impl From<&GameLedger> for LedgerInfo {
    fn from(ledger: &GameLedger) -> Self {
        Self {
            game: GameInfo::from(ledger.game()),
            participants: ledger.standings().iter().map(StandingInfo::from).collect(),
            transactions: ledger
                .transactions()
                .iter()
                .map(TransactionInfo::from)
                .collect(),
            settlements: ledger
                .settlements()
                .iter()
                .map(SettlementInfo::from)
                .collect(),
            total_buyins: ledger.reconciliation().total_buyins(),
            total_cashouts: ledger.reconciliation().total_cashouts(),
            balance_discrepancy: ledger.discrepancy(),
            balance_status: ledger.status().as_str(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CompletionInfo {
    pub game: GameInfo,
    pub settlements: Vec<SettlementInfo>,
    pub total_buyins: Chips,
    pub total_cashouts: Chips,
    pub balance_discrepancy: Chips,
    pub balance_status: &'static str,
}

impl From<&Outcome> for CompletionInfo {
    fn from(outcome: &Outcome) -> Self {
        Self {
            game: GameInfo::from(outcome.game()),
            settlements: outcome
                .settlements()
                .iter()
                .map(SettlementInfo::from)
                .collect(),
            total_buyins: outcome.reconciliation().total_buyins(),
            total_cashouts: outcome.reconciliation().total_cashouts(),
            balance_discrepancy: outcome.reconciliation().discrepancy(),
            balance_status: outcome.reconciliation().status().as_str(),
        }
    }
}
