use super::*;
use std::sync::Arc;

/// The three ledger services over one shared store and registry.
pub struct Books<S, R> {
    sessions: Sessions<S>,
    ledger: Ledger<S, R>,
    completion: Completion<S>,
}

impl<S, R> Books<S, R>
where
    S: Store,
    R: Registry,
{
    pub fn new(store: Arc<S>, registry: Arc<R>, config: Config) -> Self {
        let config = Arc::new(config);
        Self {
            sessions: Sessions::new(store.clone(), config.clone()),
            ledger: Ledger::new(store.clone(), registry, config.clone()),
            completion: Completion::new(store, config),
        }
    }
    pub fn sessions(&self) -> &Sessions<S> {
        &self.sessions
    }
    pub fn ledger(&self) -> &Ledger<S, R> {
        &self.ledger
    }
    pub fn completion(&self) -> &Completion<S> {
        &self.completion
    }
}
