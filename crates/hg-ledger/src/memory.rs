use super::*;
use hg_core::*;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tokio::sync::MutexGuard;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default)]
struct Tables {
    games: HashMap<ID<Game>, Game>,
    participants: Vec<Participant>,
    buyins: Vec<BuyIn>,
    cashouts: Vec<Cashout>,
    settlements: Vec<Settlement>,
}

impl Tables {
    fn seated(&self, game: ID<Game>) -> Vec<ID<Participant>> {
        self.participants
            .iter()
            .filter(|p| p.game() == game)
            .map(|p| p.id())
            .collect()
    }
}

/// Write points at which tests can make a unit fail.
#[cfg_attr(not(test), allow(dead_code))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fault {
    Settlement,
    Finish,
}

/// In-process store and player registry.
///
/// Units are fully serialized: a unit holds the table lock from `begin`
/// until it commits or drops, working on a private copy that replaces the
/// shared tables on commit.
#[derive(Debug, Default)]
pub struct Memory {
    tables: Mutex<Tables>,
    players: RwLock<HashMap<ID<Player>, Player>>,
    fault: std::sync::Mutex<Option<Fault>>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }
    /// Adds or replaces a registry entry.
    pub async fn enroll(&self, player: Player) {
        self.players.write().await.insert(player.id(), player);
    }
    /// Arms a one-shot failure for the next unit that reaches `fault`.
    #[cfg(test)]
    pub(crate) fn inject(&self, fault: Fault) {
        if let Ok(mut slot) = self.fault.lock() {
            *slot = Some(fault);
        }
    }
    fn armed(&self) -> Option<Fault> {
        self.fault.lock().ok().and_then(|mut slot| slot.take())
    }
}

impl Registry for Memory {
    async fn find_player(&self, id: ID<Player>) -> Result<Option<Player>, LedgerError> {
        Ok(self.players.read().await.get(&id).cloned())
    }
}

impl Store for Memory {
    type Unit<'a> = MemoryUnit<'a>;
    async fn begin(&self) -> Result<MemoryUnit<'_>, LedgerError> {
        let shared = self.tables.lock().await;
        let staged = shared.clone();
        Ok(MemoryUnit {
            shared,
            staged,
            fault: self.armed(),
        })
    }
}

/// Unit of work over [`Memory`].
pub struct MemoryUnit<'a> {
    shared: MutexGuard<'a, Tables>,
    staged: Tables,
    fault: Option<Fault>,
}

impl MemoryUnit<'_> {
    fn trip(&self, point: Fault) -> Result<(), LedgerError> {
        match self.fault {
            Some(fault) if fault == point => Err(LedgerError::Storage(
                format!("injected failure at {:?}", point).into(),
            )),
            _ => Ok(()),
        }
    }
}

impl Unit for MemoryUnit<'_> {
    async fn commit(self) -> Result<(), LedgerError> {
        let Self {
            mut shared, staged, ..
        } = self;
        *shared = staged;
        Ok(())
    }

    async fn game(&mut self, id: ID<Game>) -> Result<Option<Game>, LedgerError> {
        Ok(self.staged.games.get(&id).cloned())
    }
    async fn lock_game(&mut self, id: ID<Game>) -> Result<Option<Game>, LedgerError> {
        self.game(id).await
    }
    async fn insert_game(&mut self, game: &Game) -> Result<(), LedgerError> {
        self.staged.games.insert(game.id(), game.clone());
        Ok(())
    }
    async fn finish_game(&mut self, game: &Game) -> Result<(), LedgerError> {
        self.trip(Fault::Finish)?;
        match self.staged.games.get_mut(&game.id()) {
            Some(stored) => Ok(*stored = game.clone()),
            None => Err(LedgerError::missing(Entity::Game, game.id())),
        }
    }

    async fn participant(
        &mut self,
        id: ID<Participant>,
    ) -> Result<Option<Participant>, LedgerError> {
        Ok(self
            .staged
            .participants
            .iter()
            .find(|p| p.id() == id)
            .cloned())
    }
    async fn participants(&mut self, game: ID<Game>) -> Result<Vec<Participant>, LedgerError> {
        Ok(self
            .staged
            .participants
            .iter()
            .filter(|p| p.game() == game)
            .cloned()
            .collect())
    }
    async fn insert_participant(&mut self, participant: &Participant) -> Result<(), LedgerError> {
        if self
            .staged
            .participants
            .iter()
            .any(|p| p.game() == participant.game() && p.player() == participant.player())
        {
            return Err(LedgerError::DuplicateParticipant);
        }
        self.staged.participants.push(participant.clone());
        Ok(())
    }

    async fn buyin(&mut self, id: ID<BuyIn>) -> Result<Option<BuyIn>, LedgerError> {
        Ok(self.staged.buyins.iter().find(|b| b.id() == id).cloned())
    }
    async fn buyins(&mut self, game: ID<Game>) -> Result<Vec<BuyIn>, LedgerError> {
        let seated = self.staged.seated(game);
        Ok(self
            .staged
            .buyins
            .iter()
            .filter(|b| seated.contains(&b.participant()))
            .cloned()
            .collect())
    }
    async fn insert_buyin(&mut self, buyin: &BuyIn) -> Result<(), LedgerError> {
        self.staged.buyins.push(buyin.clone());
        Ok(())
    }
    async fn update_buyin(&mut self, buyin: &BuyIn) -> Result<(), LedgerError> {
        match self.staged.buyins.iter_mut().find(|b| b.id() == buyin.id()) {
            Some(stored) => Ok(*stored = buyin.clone()),
            None => Err(LedgerError::missing(Entity::BuyIn, buyin.id())),
        }
    }
    async fn delete_buyin(&mut self, id: ID<BuyIn>) -> Result<(), LedgerError> {
        let before = self.staged.buyins.len();
        self.staged.buyins.retain(|b| b.id() != id);
        match self.staged.buyins.len() < before {
            true => Ok(()),
            false => Err(LedgerError::missing(Entity::BuyIn, id)),
        }
    }

    async fn cashouts(&mut self, game: ID<Game>) -> Result<Vec<Cashout>, LedgerError> {
        let seated = self.staged.seated(game);
        Ok(self
            .staged
            .cashouts
            .iter()
            .filter(|c| seated.contains(&c.participant()))
            .cloned()
            .collect())
    }
    async fn insert_cashout(&mut self, cashout: &Cashout) -> Result<(), LedgerError> {
        if self
            .staged
            .cashouts
            .iter()
            .any(|c| c.participant() == cashout.participant())
        {
            return Err(LedgerError::DuplicateCashout);
        }
        self.staged.cashouts.push(cashout.clone());
        Ok(())
    }

    async fn settlements(&mut self, game: ID<Game>) -> Result<Vec<Settlement>, LedgerError> {
        Ok(self
            .staged
            .settlements
            .iter()
            .filter(|s| s.game() == game)
            .cloned()
            .collect())
    }
    async fn insert_settlement(&mut self, settlement: &Settlement) -> Result<(), LedgerError> {
        self.trip(Fault::Settlement)?;
        self.staged.settlements.push(settlement.clone());
        Ok(())
    }
}
