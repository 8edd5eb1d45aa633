//! Buy-in ledger, balance reconciliation, and debt settlement for home games.
//!
//! A game is opened, participants join and buy in (possibly several times),
//! and at the end every participant cashes out. Completing a game writes the
//! final cashouts, reconciles chips in against chips out, and nets everyone's
//! position into the fewest peer-to-peer transfers, all in one transaction.
//!
//! ## Records
//!
//! - [`Game`] — Session with a two-state lifecycle
//! - [`Participant`] — A player's seat in one game
//! - [`BuyIn`] / [`Cashout`] — Chips in, chips out
//! - [`Settlement`] — Persisted debt from a loser to a winner
//!
//! ## Engines
//!
//! - [`Reconciliation`] — Totals, profit/loss, and discrepancy status
//! - [`Netting`] — Greedy two-pointer debt minimization
//!
//! ## Services
//!
//! - [`Sessions`] — Creates and reads games
//! - [`Ledger`] — Participants, buy-ins, and cashouts
//! - [`Completion`] — Atomic IN_PROGRESS → COMPLETED transition
//! - [`Books`] — All of the above over one shared store
//!
//! ## Persistence
//!
//! - [`Store`] / [`Unit`] — Unit-of-work abstraction
//! - [`Registry`] — Read-only player lookup
//! - [`Memory`] — In-process store
//! - `Postgres` — Database store (feature `database`)
mod amount;
mod books;
mod buyin;
mod cashout;
mod completion;
mod config;
mod error;
mod game;
mod ledger;
mod memo;
mod memory;
mod netting;
mod participant;
mod player;
mod reconcile;
mod sessions;
mod settlement;
mod store;
mod view;

pub use amount::*;
pub use books::*;
pub use buyin::*;
pub use cashout::*;
pub use completion::*;
pub use config::*;
pub use error::*;
pub use game::*;
pub use ledger::*;
pub use memo::*;
pub use memory::*;
pub use netting::*;
pub use participant::*;
pub use player::*;
pub use reconcile::*;
pub use sessions::*;
pub use settlement::*;
pub use store::*;
pub use view::*;

#[cfg(feature = "database")]
mod repository;
#[cfg(feature = "database")]
pub use repository::*;
