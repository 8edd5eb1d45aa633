//! HTTP surface for the home game ledger.
//!
//! Every ledger operation is one route; bodies are JSON and times are epoch
//! milliseconds. Failures render as `{"kind", "message"}` with a status
//! chosen by the error kind.
//!
//! ## Submodules
//!
//! - [`dto`] — Request and response bodies
//! - [`handlers`] — One handler per ledger operation
pub mod dto;
pub mod handlers;

pub use dto::*;

use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use actix_web::error::InternalError;
use actix_web::middleware::Logger;
use actix_web::web;
use anyhow::Context;
use hg_ledger::*;
use std::sync::Arc;

/// Malformed bodies and path ids are validation failures like any other.
fn malformed(err: impl std::fmt::Display + std::fmt::Debug + 'static) -> actix_web::Error {
    let body = Failure {
        kind: ErrorKind::Validation.as_str(),
        message: err.to_string(),
    };
    InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
}

/// Registers every ledger route over one [`Books`].
#[rustfmt::skip]
pub fn routes<S, R>(cfg: &mut web::ServiceConfig)
where
    S: Store + 'static,
    R: Registry + 'static,
{
    cfg.app_data(web::JsonConfig::default().error_handler(|e, _| malformed(e)))
        .app_data(web::PathConfig::default().error_handler(|e, _| malformed(e)))
        .service(
            web::scope("/games")
                .route("", web::post().to(handlers::create_game::<S, R>))
                .route("/{id}", web::get().to(handlers::get_game::<S, R>))
                .route("/{id}/ledger", web::get().to(handlers::game_ledger::<S, R>))
                .route("/{id}/participants", web::post().to(handlers::add_participant::<S, R>))
                .route("/{id}/complete", web::post().to(handlers::complete_game::<S, R>)),
        )
        .service(
            web::scope("/participants")
                .route("/{id}/buyins", web::post().to(handlers::record_buyin::<S, R>))
                .route("/{id}/cashout", web::post().to(handlers::record_cashout::<S, R>)),
        )
        .service(
            web::scope("/buyins")
                .route("/{id}", web::patch().to(handlers::update_buyin::<S, R>))
                .route("/{id}", web::delete().to(handlers::delete_buyin::<S, R>)),
        );
}

async fn health(store: web::Data<Arc<Postgres>>) -> impl Responder {
    let ping = async {
        let client = store.pool().acquire().await?;
        client.execute("SELECT 1", &[]).await?;
        store.pool().release(client).await;
        Ok::<_, hg_pg::PgErr>(())
    };
    match ping
        .await
        .inspect_err(|e| log::error!("health check failed: {}", e))
    {
        Ok(()) => HttpResponse::Ok().body("ok"),
        Err(_) => HttpResponse::ServiceUnavailable().body("database unavailable"),
    }
}

/// Migrates the schema, then serves on `BIND_ADDR` against `DB_URL`.
#[rustfmt::skip]
pub async fn run() -> anyhow::Result<()> {
    let pool = hg_pg::Pool::from_env().context("DB_URL must be set")?;
    let client = pool.acquire().await.context("connect to database")?;
    hg_ledger::migrate(&client).await.context("migrate schema")?;
    pool.release(client).await;
    let addr = std::env::var("BIND_ADDR").context("BIND_ADDR must be set")?;
    let store = Arc::new(Postgres::new(pool));
    let books = web::Data::new(Books::new(store.clone(), store.clone(), Config::from_env()));
    let store = web::Data::new(store);
    log::info!("[server] listening on {}", addr);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%r %s %Ts"))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header(),
            )
            .app_data(books.clone())
            .app_data(store.clone())
            .route("/health", web::get().to(health))
            .configure(routes::<Postgres, Postgres>)
    })
    .workers(4)
    .bind(addr)?
    .run()
    .await?;
    Ok(())
}
