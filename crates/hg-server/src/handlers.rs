use super::*;
use actix_web::HttpResponse;
use actix_web::web;
use hg_core::*;
use hg_ledger::*;

/// Renders a ledger error with the status its kind maps to.
pub fn failure(e: LedgerError) -> HttpResponse {
    let body = Failure::from(&e);
    match e.kind() {
        ErrorKind::Validation => HttpResponse::BadRequest().json(body),
        ErrorKind::NotFound => HttpResponse::NotFound().json(body),
        ErrorKind::Conflict => HttpResponse::Conflict().json(body),
        ErrorKind::Precondition => HttpResponse::UnprocessableEntity().json(body),
        ErrorKind::Storage => {
            log::error!("[server] storage failure: {}", e);
            HttpResponse::ServiceUnavailable().json(body)
        }
    }
}

/// Epoch milliseconds from a request body, bounded to the storable range.
fn moment(field: &'static str, ms: i64) -> Result<Timestamp, LedgerError> {
    instant(ms).ok_or_else(|| LedgerError::invalid(field, OUT_OF_RANGE))
}

pub async fn create_game<S, R>(
    books: web::Data<Books<S, R>>,
    req: web::Json<CreateGame>,
) -> HttpResponse
where
    S: Store + 'static,
    R: Registry + 'static,
{
    let location = match Location::parse(req.location.as_deref().unwrap_or_default()) {
        Ok(location) => location,
        Err(e) => return failure(e),
    };
    let start = match moment("start_time", req.start_time) {
        Ok(start) => start,
        Err(e) => return failure(e),
    };
    let minimum_cashout = match moment("minimum_cashout_time", req.minimum_cashout_time) {
        Ok(minimum_cashout) => minimum_cashout,
        Err(e) => return failure(e),
    };
    match books
        .sessions()
        .create_game(start, minimum_cashout, location)
        .await
    {
        Ok(game) => HttpResponse::Created().json(GameInfo::from(&game)),
        Err(e) => failure(e),
    }
}

pub async fn get_game<S, R>(
    books: web::Data<Books<S, R>>,
    path: web::Path<uuid::Uuid>,
) -> HttpResponse
where
    S: Store + 'static,
    R: Registry + 'static,
{
    match books.sessions().get_game(ID::from(path.into_inner())).await {
        Ok(game) => HttpResponse::Ok().json(GameInfo::from(&game)),
        Err(e) => failure(e),
    }
}

pub async fn game_ledger<S, R>(
    books: web::Data<Books<S, R>>,
    path: web::Path<uuid::Uuid>,
) -> HttpResponse
where
    S: Store + 'static,
    R: Registry + 'static,
{
    match books.ledger().game_ledger(ID::from(path.into_inner())).await {
        Ok(ledger) => HttpResponse::Ok().json(LedgerInfo::from(&ledger)),
        Err(e) => failure(e),
    }
}

pub async fn add_participant<S, R>(
    books: web::Data<Books<S, R>>,
    path: web::Path<uuid::Uuid>,
    req: web::Json<AddParticipant>,
) -> HttpResponse
where
    S: Store + 'static,
    R: Registry + 'static,
{
    let game = ID::from(path.into_inner());
    let player = ID::from(req.player_id);
    match books.ledger().add_participant(game, player).await {
        Ok(participant) => HttpResponse::Created().json(ParticipantInfo::from(&participant)),
        Err(e) => failure(e),
    }
}

pub async fn record_buyin<S, R>(
    books: web::Data<Books<S, R>>,
    path: web::Path<uuid::Uuid>,
    req: web::Json<RecordBuyIn>,
) -> HttpResponse
where
    S: Store + 'static,
    R: Registry + 'static,
{
    let amount = match BuyInAmount::try_from(req.amount) {
        Ok(amount) => amount,
        Err(e) => return failure(e),
    };
    let time = match req.timestamp.map(|ms| moment("timestamp", ms)).transpose() {
        Ok(time) => time,
        Err(e) => return failure(e),
    };
    match books
        .ledger()
        .record_buyin(ID::from(path.into_inner()), amount, time)
        .await
    {
        Ok(buyin) => HttpResponse::Created().json(BuyInInfo::from(&buyin)),
        Err(e) => failure(e),
    }
}

pub async fn update_buyin<S, R>(
    books: web::Data<Books<S, R>>,
    path: web::Path<uuid::Uuid>,
    req: web::Json<UpdateBuyIn>,
) -> HttpResponse
where
    S: Store + 'static,
    R: Registry + 'static,
{
    let amount = match BuyInAmount::try_from(req.amount) {
        Ok(amount) => amount,
        Err(e) => return failure(e),
    };
    match books
        .ledger()
        .update_buyin(ID::from(path.into_inner()), amount)
        .await
    {
        Ok(buyin) => HttpResponse::Ok().json(BuyInInfo::from(&buyin)),
        Err(e) => failure(e),
    }
}

pub async fn delete_buyin<S, R>(
    books: web::Data<Books<S, R>>,
    path: web::Path<uuid::Uuid>,
) -> HttpResponse
where
    S: Store + 'static,
    R: Registry + 'static,
{
    match books.ledger().delete_buyin(ID::from(path.into_inner())).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => failure(e),
    }
}

pub async fn record_cashout<S, R>(
    books: web::Data<Books<S, R>>,
    path: web::Path<uuid::Uuid>,
    req: web::Json<RecordCashout>,
) -> HttpResponse
where
    S: Store + 'static,
    R: Registry + 'static,
{
    let amount = match CashoutAmount::try_from(req.amount) {
        Ok(amount) => amount,
        Err(e) => return failure(e),
    };
    match books
        .ledger()
        .record_cashout(ID::from(path.into_inner()), amount)
        .await
    {
        Ok(cashout) => HttpResponse::Created().json(CashoutInfo::from(&cashout)),
        Err(e) => failure(e),
    }
}

pub async fn complete_game<S, R>(
    books: web::Data<Books<S, R>>,
    path: web::Path<uuid::Uuid>,
    req: web::Json<CompleteGame>,
) -> HttpResponse
where
    S: Store + 'static,
    R: Registry + 'static,
{
    let counts = match req
        .cashouts
        .iter()
        .map(FinalCount::try_from)
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(counts) => counts,
        Err(e) => return failure(e),
    };
    let notes = match Notes::parse(req.notes.as_deref().unwrap_or_default()) {
        Ok(notes) => notes,
        Err(e) => return failure(e),
    };
    match books
        .completion()
        .complete_game(ID::from(path.into_inner()), counts, notes)
        .await
    {
        Ok(outcome) => HttpResponse::Ok().json(CompletionInfo::from(&outcome)),
        Err(e) => failure(e),
    }
}
