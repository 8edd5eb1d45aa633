//! PostgreSQL connectivity and schema metadata.
//!
//! ## Connectivity
//!
//! - [`Pool`] / [`Lease`] — Capped, reusable connections, one per unit of work
//! - [`connect()`] — Opens a single connection and drives it in the background
//!
//! ## Serialization
//!
//! - [`Schema`] — Table metadata and DDL generation
//!
//! ## Table Names
//!
//! Constants for all persistent entities: games, participants,
//! buy-ins, cashouts, settlements, and the player registry.
//!
//! ## Constraint Names
//!
//! Unique constraints whose violations map to domain conflicts.
mod pool;
mod schema;

pub use pool::*;
pub use schema::*;

use tokio_postgres::Client;

/// PostgreSQL error type alias.
pub type PgErr = tokio_postgres::Error;

/// Opens a connection to `url` and spawns its I/O driver.
///
/// The driver task ends when the returned [`Client`] is dropped, at which
/// point the server rolls back any transaction left open on it.
pub async fn connect(url: &str) -> Result<Client, PgErr> {
    let tls = tokio_postgres::tls::NoTls;
    let (client, connection) = tokio_postgres::connect(url, tls).await?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            log::error!("[pg] connection closed with error: {}", e);
        }
    });
    client
        .execute("SET client_min_messages TO WARNING", &[])
        .await?;
    Ok(client)
}

/// Table for game sessions.
#[rustfmt::skip]
pub const GAMES:        &str = "games";
/// Table for player membership in games.
#[rustfmt::skip]
pub const PARTICIPANTS: &str = "participants";
/// Table for buy-ins and re-buys.
#[rustfmt::skip]
pub const BUYINS:       &str = "buyins";
/// Table for final cashouts (one per participant).
#[rustfmt::skip]
pub const CASHOUTS:     &str = "cashouts";
/// Table for computed peer-to-peer debts.
#[rustfmt::skip]
pub const SETTLEMENTS:  &str = "settlements";
/// Table for the player registry (read-only from the ledger).
#[rustfmt::skip]
pub const PLAYERS:      &str = "players";

/// One seat per player per game.
pub const PARTICIPANTS_UNIQUE: &str = "participants_game_player_key";
/// One cashout per participant.
pub const CASHOUTS_UNIQUE: &str = "cashouts_participant_key";
