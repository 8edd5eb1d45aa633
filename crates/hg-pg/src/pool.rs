use super::*;
use tokio::sync::Mutex;
use tokio::sync::Semaphore;
use tokio::sync::SemaphorePermit;

/// Idle connections kept around between units of work.
const IDLE_LIMIT: usize = 16;
/// Connections handed out at once. Further callers wait for a release.
const LEASE_LIMIT: usize = 32;

/// Minimal connection reuse.
///
/// Each unit of work owns one [`Lease`] for the whole of its transaction.
/// Leases are handed back with [`Pool::release`] only after a clean
/// `COMMIT`; a lease abandoned mid-transaction is simply dropped, which
/// closes its connection and frees its slot.
///
/// At most `LEASE_LIMIT` connections are leased and at most `IDLE_LIMIT`
/// sit idle, so the pool never holds more than their sum.
pub struct Pool {
    url: String,
    idle: Mutex<Vec<Client>>,
    slots: Semaphore,
}

/// A pooled connection. Holds one of the pool's slots until dropped or
/// released.
pub struct Lease<'a> {
    client: Client,
    slot: Option<SemaphorePermit<'a>>,
}

impl std::ops::Deref for Lease<'_> {
    type Target = Client;
    fn deref(&self) -> &Client {
        &self.client
    }
}

impl Pool {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            idle: Mutex::new(Vec::new()),
            slots: Semaphore::new(LEASE_LIMIT),
        }
    }
    /// Pool over the `DB_URL` environment variable.
    pub fn from_env() -> Result<Self, std::env::VarError> {
        std::env::var("DB_URL").map(Self::new)
    }
    /// Slots not currently leased.
    pub fn available(&self) -> usize {
        self.slots.available_permits()
    }
    /// Waits for a free slot, then takes an idle connection or opens a
    /// fresh one.
    pub async fn acquire(&self) -> Result<Lease<'_>, PgErr> {
        // the semaphore is never closed
        let slot = self.slots.acquire().await.ok();
        loop {
            match self.idle.lock().await.pop() {
                Some(client) if client.is_closed() => continue,
                Some(client) => return Ok(Lease { client, slot }),
                None => break,
            }
        }
        log::debug!("[pg] opening connection");
        let client = connect(&self.url).await?;
        Ok(Lease { client, slot })
    }
    /// Returns a connection that has no open transaction and frees its slot.
    pub async fn release(&self, lease: Lease<'_>) {
        let Lease { client, slot } = lease;
        drop(slot);
        if client.is_closed() {
            return;
        }
        let mut idle = self.idle.lock().await;
        if idle.len() < IDLE_LIMIT {
            idle.push(client);
        }
    }
}
