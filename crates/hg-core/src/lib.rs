//! Core type aliases, identifiers, and constants for the home game ledger.
//!
//! This crate provides the foundational types and policy parameters
//! used throughout the workspace.

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Chip (or money) amounts. Signed so that net balances can go negative.
pub type Chips = i64;
/// Wall-clock instant for game times, buy-ins, and cashouts.
pub type Timestamp = std::time::SystemTime;

// ============================================================================
// TRAITS
// ============================================================================
/// Unique identifier trait for domain entities.
pub trait Unique<T = Self> {
    fn id(&self) -> ID<T>;
}

// ============================================================================
// IDENTITY TYPES
// ============================================================================
use std::cmp::Ordering;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::hash::Hash;
use std::hash::Hasher;
use std::marker::PhantomData;

/// Generic ID wrapper providing compile-time type safety over uuid::Uuid.
pub struct ID<T> {
    inner: uuid::Uuid,
    marker: PhantomData<T>,
}

impl<T> ID<T> {
    pub fn inner(&self) -> uuid::Uuid {
        self.inner
    }
    /// Cast ID<T> to ID<U> while preserving the underlying UUID.
    pub fn cast<U>(self) -> ID<U> {
        ID {
            inner: self.inner,
            marker: PhantomData,
        }
    }
}

impl<T> From<ID<T>> for uuid::Uuid {
    fn from(id: ID<T>) -> Self {
        id.inner()
    }
}
impl<T> From<uuid::Uuid> for ID<T> {
    fn from(inner: uuid::Uuid) -> Self {
        Self {
            inner,
            marker: PhantomData,
        }
    }
}

impl<T> std::str::FromStr for ID<T> {
    type Err = uuid::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::parse_str(s).map(Self::from)
    }
}

/// Fresh time-ordered (v7) identifier.
impl<T> Default for ID<T> {
    fn default() -> Self {
        Self {
            inner: uuid::Uuid::now_v7(),
            marker: PhantomData,
        }
    }
}

impl<T> Copy for ID<T> {}
impl<T> Clone for ID<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Eq for ID<T> {}
impl<T> PartialEq for ID<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> Ord for ID<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<T> PartialOrd for ID<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Hash for ID<T> {
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        self.inner.hash(state);
    }
}

impl<T> Debug for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ID").field(&self.inner).finish()
    }
}
impl<T> Display for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

// ============================================================================
// LEDGER LIMITS
// ============================================================================
/// Smallest accepted buy-in.
pub const MIN_BUYIN: Chips = 1;
/// Smallest accepted cashout (busting out is a zero cashout).
pub const MIN_CASHOUT: Chips = 0;
/// Largest accepted buy-in or cashout.
pub const MAX_AMOUNT: Chips = 1_000_000;
/// Longest accepted table location, in characters.
pub const MAX_LOCATION_LEN: usize = 128;
/// Longest accepted discrepancy note, in characters.
pub const MAX_NOTES_LEN: usize = 1000;

// ============================================================================
// CLOCK POLICY
// ============================================================================
/// Default tolerance for future-dated timestamps (client clock skew).
pub const CLOCK_SKEW: std::time::Duration = std::time::Duration::from_secs(5 * 60);

/// Latest storable instant, 9999-12-31T23:59:59.999Z, in epoch milliseconds.
pub const MAX_EPOCH_MILLIS: i64 = 253_402_300_799_999;

/// Milliseconds since the Unix epoch. Instants before the epoch map to
/// negatives; anything past the `i64` range saturates.
pub fn millis(time: Timestamp) -> i64 {
    match time.duration_since(std::time::UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_millis()).unwrap_or(i64::MAX),
        Err(before) => i64::try_from(before.duration().as_millis())
            .map(|ms| -ms)
            .unwrap_or(i64::MIN),
    }
}

/// Inverse of [`millis`] over `0..=MAX_EPOCH_MILLIS`; `None` outside it.
pub fn instant(millis: i64) -> Option<Timestamp> {
    match millis {
        0..=MAX_EPOCH_MILLIS => {
            Some(std::time::UNIX_EPOCH + std::time::Duration::from_millis(millis as u64))
        }
        _ => None,
    }
}

/// Whether a timestamp falls within the storable range.
pub fn storable(time: Timestamp) -> bool {
    (0..=MAX_EPOCH_MILLIS).contains(&millis(time))
}

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
#[cfg(feature = "server")]
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

/// Register Ctrl+C handler for immediate (non-graceful) termination.
/// In-flight transactions are rolled back by the database when connections drop.
#[cfg(feature = "server")]
pub fn kys() {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!();
            log::warn!("interrupt received, exiting immediately");
            std::process::exit(0);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Thing;

    #[test]
    fn ids_are_distinct() {
        let a = ID::<Thing>::default();
        let b = ID::<Thing>::default();
        assert_ne!(a, b);
    }

    #[test]
    fn id_parses_its_display() {
        let id = ID::<Thing>::default();
        let parsed = id.to_string().parse::<ID<Thing>>().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn millis_roundtrip_within_range() {
        for ms in [0, 1, 1_760_000_000_000, MAX_EPOCH_MILLIS] {
            assert_eq!(instant(ms).map(millis), Some(ms));
        }
    }

    #[test]
    fn instant_rejects_out_of_range_millis() {
        for ms in [i64::MIN, -1, MAX_EPOCH_MILLIS + 1, i64::MAX] {
            assert_eq!(instant(ms), None);
        }
    }

    #[test]
    fn millis_saturates_at_the_extremes() {
        let far = std::time::Duration::from_secs(u64::MAX / 1000);
        let past = std::time::UNIX_EPOCH.checked_sub(far);
        let future = std::time::UNIX_EPOCH.checked_add(far);
        if let Some(past) = past {
            assert_eq!(millis(past), i64::MIN);
            assert!(!storable(past));
        }
        if let Some(future) = future {
            assert_eq!(millis(future), i64::MAX);
            assert!(!storable(future));
        }
        let before = std::time::UNIX_EPOCH - std::time::Duration::from_millis(1);
        assert_eq!(millis(before), -1);
        assert!(storable(std::time::UNIX_EPOCH));
    }
}
