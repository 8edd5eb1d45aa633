//! Home Game Ledger Binary
//!
//! Serves the ledger API on BIND_ADDR (e.g. 0.0.0.0:8888) against DB_URL.
//! CLOCK_SKEW_SECS and OMITTED_CASHOUTS tune the ledger policy.

#[tokio::main]
async fn main() {
    hg_core::log();
    hg_core::kys();
    if let Err(e) = hg_server::run().await {
        log::error!("server exited: {:#}", e);
        std::process::exit(1);
    }
}
