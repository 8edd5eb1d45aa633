use super::*;
use hg_core::*;
use hg_pg::*;
use tokio_postgres::Client;
use tokio_postgres::Row;
use tokio_postgres::error::SqlState;

/// Name, table DDL, and index DDL of one table.
fn ddl<T: Schema>() -> (&'static str, &'static str, &'static str) {
    (T::name(), T::creates(), T::indices())
}

/// Every ledger table in foreign-key order.
fn tables() -> [(&'static str, &'static str, &'static str); 6] {
    [
        ddl::<Player>(),
        ddl::<Game>(),
        ddl::<Participant>(),
        ddl::<BuyIn>(),
        ddl::<Cashout>(),
        ddl::<Settlement>(),
    ]
}

/// Creates every ledger table in foreign-key order.
pub async fn migrate(client: &Client) -> Result<(), PgErr> {
    for (name, creates, indices) in tables() {
        log::debug!("[migrate] {}", name);
        client.batch_execute(creates).await?;
        client.batch_execute(indices).await?;
    }
    log::info!("[migrate] schema ready");
    Ok(())
}

/// PostgreSQL-backed store and player registry.
///
/// Each unit is one pooled connection inside `BEGIN … COMMIT`. Game rows are
/// locked with `FOR UPDATE`; uniqueness comes from table constraints.
pub struct Postgres {
    pool: Pool,
}

impl Postgres {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
    pub fn pool(&self) -> &Pool {
        &self.pool
    }
}

impl Registry for Postgres {
    async fn find_player(&self, id: ID<Player>) -> Result<Option<Player>, LedgerError> {
        let client = self.pool.acquire().await?;
        let row = client
            .query_opt(
                const_format::concatcp!(
                    "SELECT id, display_name, deleted FROM ",
                    PLAYERS,
                    " WHERE id = $1"
                ),
                &[&id.inner()],
            )
            .await?;
        self.pool.release(client).await;
        Ok(row.map(|row| {
            Player::new(
                ID::from(row.get::<_, uuid::Uuid>(0)),
                row.get::<_, String>(1),
                row.get::<_, bool>(2),
            )
        }))
    }
}

impl Store for Postgres {
    type Unit<'a> = PostgresUnit<'a>;
    async fn begin(&self) -> Result<PostgresUnit<'_>, LedgerError> {
        let client = self.pool.acquire().await?;
        client.batch_execute("BEGIN").await?;
        log::debug!("[pg] unit begins");
        Ok(PostgresUnit {
            pool: &self.pool,
            client,
        })
    }
}

/// Unit of work over [`Postgres`].
///
/// Dropping it drops the connection, and the server rolls back.
pub struct PostgresUnit<'a> {
    pool: &'a Pool,
    client: Lease<'a>,
}

impl Unit for PostgresUnit<'_> {
    async fn commit(self) -> Result<(), LedgerError> {
        self.client.batch_execute("COMMIT").await?;
        log::debug!("[pg] unit commits");
        self.pool.release(self.client).await;
        Ok(())
    }

    async fn game(&mut self, id: ID<Game>) -> Result<Option<Game>, LedgerError> {
        self.client
            .query_opt(
                const_format::concatcp!(
                    "SELECT id, location, start_time, min_cashout_time, end_time, status, notes ",
                    "FROM ",
                    GAMES,
                    " WHERE id = $1"
                ),
                &[&id.inner()],
            )
            .await?
            .map(|row| decode::game(&row))
            .transpose()
    }
    async fn lock_game(&mut self, id: ID<Game>) -> Result<Option<Game>, LedgerError> {
        self.client
            .query_opt(
                const_format::concatcp!(
                    "SELECT id, location, start_time, min_cashout_time, end_time, status, notes ",
                    "FROM ",
                    GAMES,
                    " WHERE id = $1 FOR UPDATE"
                ),
                &[&id.inner()],
            )
            .await?
            .map(|row| decode::game(&row))
            .transpose()
    }
    async fn insert_game(&mut self, game: &Game) -> Result<(), LedgerError> {
        self.client
            .execute(
                const_format::concatcp!(
                    "INSERT INTO ",
                    GAMES,
                    " (id, location, start_time, min_cashout_time, end_time, status, notes) ",
                    "VALUES ($1, $2, $3, $4, $5, $6, $7)"
                ),
                &[
                    &game.id().inner(),
                    &game.location().map(Location::as_str),
                    &game.start(),
                    &game.minimum_cashout(),
                    &game.end(),
                    &game.status().as_str(),
                    &game.notes().map(Notes::as_str),
                ],
            )
            .await?;
        Ok(())
    }
    async fn finish_game(&mut self, game: &Game) -> Result<(), LedgerError> {
        let n = self
            .client
            .execute(
                const_format::concatcp!(
                    "UPDATE ",
                    GAMES,
                    " SET status = $2, end_time = $3, notes = $4 WHERE id = $1"
                ),
                &[
                    &game.id().inner(),
                    &game.status().as_str(),
                    &game.end(),
                    &game.notes().map(Notes::as_str),
                ],
            )
            .await?;
        match n {
            0 => Err(LedgerError::missing(Entity::Game, game.id())),
            _ => Ok(()),
        }
    }

    async fn participant(
        &mut self,
        id: ID<Participant>,
    ) -> Result<Option<Participant>, LedgerError> {
        Ok(self
            .client
            .query_opt(
                const_format::concatcp!(
                    "SELECT id, game_id, player_id, joined_at FROM ",
                    PARTICIPANTS,
                    " WHERE id = $1"
                ),
                &[&id.inner()],
            )
            .await?
            .map(|row| decode::participant(&row)))
    }
    async fn participants(&mut self, game: ID<Game>) -> Result<Vec<Participant>, LedgerError> {
        Ok(self
            .client
            .query(
                const_format::concatcp!(
                    "SELECT id, game_id, player_id, joined_at FROM ",
                    PARTICIPANTS,
                    " WHERE game_id = $1 ORDER BY joined_at, id"
                ),
                &[&game.inner()],
            )
            .await?
            .iter()
            .map(decode::participant)
            .collect())
    }
    async fn insert_participant(&mut self, participant: &Participant) -> Result<(), LedgerError> {
        self.client
            .execute(
                const_format::concatcp!(
                    "INSERT INTO ",
                    PARTICIPANTS,
                    " (id, game_id, player_id, joined_at) VALUES ($1, $2, $3, $4)"
                ),
                &[
                    &participant.id().inner(),
                    &participant.game().inner(),
                    &participant.player().inner(),
                    &participant.joined(),
                ],
            )
            .await
            .map_err(|e| unique(e, PARTICIPANTS_UNIQUE, LedgerError::DuplicateParticipant))?;
        Ok(())
    }

    async fn buyin(&mut self, id: ID<BuyIn>) -> Result<Option<BuyIn>, LedgerError> {
        self.client
            .query_opt(
                const_format::concatcp!(
                    "SELECT id, participant_id, amount, created_at FROM ",
                    BUYINS,
                    " WHERE id = $1"
                ),
                &[&id.inner()],
            )
            .await?
            .map(|row| decode::buyin(&row))
            .transpose()
    }
    async fn buyins(&mut self, game: ID<Game>) -> Result<Vec<BuyIn>, LedgerError> {
        self.client
            .query(
                const_format::concatcp!(
                    "SELECT b.id, b.participant_id, b.amount, b.created_at FROM ",
                    BUYINS,
                    " b JOIN ",
                    PARTICIPANTS,
                    " p ON p.id = b.participant_id ",
                    "WHERE p.game_id = $1 ORDER BY b.created_at, b.id"
                ),
                &[&game.inner()],
            )
            .await?
            .iter()
            .map(decode::buyin)
            .collect()
    }
    async fn insert_buyin(&mut self, buyin: &BuyIn) -> Result<(), LedgerError> {
        self.client
            .execute(
                const_format::concatcp!(
                    "INSERT INTO ",
                    BUYINS,
                    " (id, participant_id, amount, created_at) VALUES ($1, $2, $3, $4)"
                ),
                &[
                    &buyin.id().inner(),
                    &buyin.participant().inner(),
                    &buyin.amount().chips(),
                    &buyin.time(),
                ],
            )
            .await?;
        Ok(())
    }
    async fn update_buyin(&mut self, buyin: &BuyIn) -> Result<(), LedgerError> {
        let n = self
            .client
            .execute(
                const_format::concatcp!("UPDATE ", BUYINS, " SET amount = $2 WHERE id = $1"),
                &[&buyin.id().inner(), &buyin.amount().chips()],
            )
            .await?;
        match n {
            0 => Err(LedgerError::missing(Entity::BuyIn, buyin.id())),
            _ => Ok(()),
        }
    }
    async fn delete_buyin(&mut self, id: ID<BuyIn>) -> Result<(), LedgerError> {
        let n = self
            .client
            .execute(
                const_format::concatcp!("DELETE FROM ", BUYINS, " WHERE id = $1"),
                &[&id.inner()],
            )
            .await?;
        match n {
            0 => Err(LedgerError::missing(Entity::BuyIn, id)),
            _ => Ok(()),
        }
    }

    async fn cashouts(&mut self, game: ID<Game>) -> Result<Vec<Cashout>, LedgerError> {
        self.client
            .query(
                const_format::concatcp!(
                    "SELECT c.id, c.participant_id, c.amount, c.created_at FROM ",
                    CASHOUTS,
                    " c JOIN ",
                    PARTICIPANTS,
                    " p ON p.id = c.participant_id ",
                    "WHERE p.game_id = $1 ORDER BY c.created_at, c.id"
                ),
                &[&game.inner()],
            )
            .await?
            .iter()
            .map(decode::cashout)
            .collect()
    }
    async fn insert_cashout(&mut self, cashout: &Cashout) -> Result<(), LedgerError> {
        self.client
            .execute(
                const_format::concatcp!(
                    "INSERT INTO ",
                    CASHOUTS,
                    " (id, participant_id, amount, created_at) VALUES ($1, $2, $3, $4)"
                ),
                &[
                    &cashout.id().inner(),
                    &cashout.participant().inner(),
                    &cashout.amount().chips(),
                    &cashout.time(),
                ],
            )
            .await
            .map_err(|e| unique(e, CASHOUTS_UNIQUE, LedgerError::DuplicateCashout))?;
        Ok(())
    }

    async fn settlements(&mut self, game: ID<Game>) -> Result<Vec<Settlement>, LedgerError> {
        Ok(self
            .client
            .query(
                const_format::concatcp!(
                    "SELECT id, game_id, from_player_id, to_player_id, amount FROM ",
                    SETTLEMENTS,
                    " WHERE game_id = $1 ORDER BY id"
                ),
                &[&game.inner()],
            )
            .await?
            .iter()
            .map(decode::settlement)
            .collect())
    }
    async fn insert_settlement(&mut self, settlement: &Settlement) -> Result<(), LedgerError> {
        self.client
            .execute(
                const_format::concatcp!(
                    "INSERT INTO ",
                    SETTLEMENTS,
                    " (id, game_id, from_player_id, to_player_id, amount) ",
                    "VALUES ($1, $2, $3, $4, $5)"
                ),
                &[
                    &settlement.id().inner(),
                    &settlement.game().inner(),
                    &settlement.payer().inner(),
                    &settlement.payee().inner(),
                    &settlement.amount(),
                ],
            )
            .await?;
        Ok(())
    }
}

/// Maps a violation of `constraint` to its domain conflict.
fn unique(e: PgErr, constraint: &str, conflict: LedgerError) -> LedgerError {
    let violated = e.as_db_error().is_some_and(|db| {
        db.code() == &SqlState::UNIQUE_VIOLATION && db.constraint() == Some(constraint)
    });
    match violated {
        true => conflict,
        false => LedgerError::from(e),
    }
}

/// Row decoding. Column order follows the SELECT lists above.
mod decode {
    use super::*;

    pub fn game(row: &Row) -> Result<Game, LedgerError> {
        let location = row
            .get::<_, Option<String>>(1)
            .map(|s| Location::parse(&s))
            .transpose()?
            .flatten();
        let notes = row
            .get::<_, Option<String>>(6)
            .map(|s| Notes::parse(&s))
            .transpose()?
            .flatten();
        Ok(Game::new(
            ID::from(row.get::<_, uuid::Uuid>(0)),
            location,
            row.get::<_, Timestamp>(2),
            row.get::<_, Timestamp>(3),
            row.get::<_, Option<Timestamp>>(4),
            Status::try_from(row.get::<_, &str>(5))?,
            notes,
        ))
    }
    pub fn participant(row: &Row) -> Participant {
        Participant::new(
            ID::from(row.get::<_, uuid::Uuid>(0)),
            ID::from(row.get::<_, uuid::Uuid>(1)),
            ID::from(row.get::<_, uuid::Uuid>(2)),
            row.get::<_, Timestamp>(3),
        )
    }
    pub fn buyin(row: &Row) -> Result<BuyIn, LedgerError> {
        Ok(BuyIn::new(
            ID::from(row.get::<_, uuid::Uuid>(0)),
            ID::from(row.get::<_, uuid::Uuid>(1)),
            BuyInAmount::try_from(row.get::<_, i64>(2))?,
            row.get::<_, Timestamp>(3),
        ))
    }
    pub fn cashout(row: &Row) -> Result<Cashout, LedgerError> {
        Ok(Cashout::new(
            ID::from(row.get::<_, uuid::Uuid>(0)),
            ID::from(row.get::<_, uuid::Uuid>(1)),
            CashoutAmount::try_from(row.get::<_, i64>(2))?,
            row.get::<_, Timestamp>(3),
        ))
    }
    pub fn settlement(row: &Row) -> Settlement {
        Settlement::new(
            ID::from(row.get::<_, uuid::Uuid>(0)),
            ID::from(row.get::<_, uuid::Uuid>(1)),
            Transfer::new(
                ID::from(row.get::<_, uuid::Uuid>(2)),
                ID::from(row.get::<_, uuid::Uuid>(3)),
                row.get::<_, i64>(4),
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creates(name: &str) -> &'static str {
        tables()
            .into_iter()
            .find(|(table, _, _)| *table == name)
            .map(|(_, creates, _)| creates)
            .unwrap()
    }

    #[test]
    fn migration_covers_every_table_in_dependency_order() {
        let names = tables().map(|(name, _, _)| name);
        assert_eq!(
            names,
            [PLAYERS, GAMES, PARTICIPANTS, BUYINS, CASHOUTS, SETTLEMENTS]
        );
        for (name, creates, _) in tables() {
            let head = format!("CREATE TABLE IF NOT EXISTS {} (", name);
            assert!(creates.starts_with(&head), "{}", creates);
        }
    }

    #[test]
    fn tables_reference_only_earlier_tables() {
        for (i, (_, creates, _)) in tables().iter().enumerate() {
            for (later, _, _) in tables()[i + 1..].iter() {
                let reference = format!("REFERENCES {}(", later);
                assert!(!creates.contains(&reference), "{}", creates);
            }
        }
    }

    #[test]
    fn conflict_constraints_exist_in_the_schema() {
        assert!(creates(PARTICIPANTS).contains(&format!(
            "CONSTRAINT {} UNIQUE (game_id, player_id)",
            PARTICIPANTS_UNIQUE
        )));
        assert!(creates(CASHOUTS).contains(&format!(
            "CONSTRAINT {} UNIQUE (participant_id)",
            CASHOUTS_UNIQUE
        )));
    }

    #[test]
    fn amounts_and_lifecycle_are_checked_by_the_schema() {
        let checks = [
            (GAMES, "CHECK (status IN ('IN_PROGRESS', 'COMPLETED'))"),
            (GAMES, "CHECK (min_cashout_time >= start_time)"),
            (GAMES, "CHECK ((status = 'COMPLETED') = (end_time IS NOT NULL))"),
            (GAMES, "CHECK (end_time IS NULL OR end_time > start_time)"),
            (BUYINS, "CHECK (amount BETWEEN 1 AND 1000000)"),
            (CASHOUTS, "CHECK (amount BETWEEN 0 AND 1000000)"),
            (SETTLEMENTS, "CHECK (amount >= 1)"),
            (SETTLEMENTS, "CHECK (from_player_id <> to_player_id)"),
        ];
        for (table, check) in checks {
            assert!(creates(table).contains(check), "{} lacks {}", table, check);
        }
        assert_eq!((MIN_BUYIN, MIN_CASHOUT, MAX_AMOUNT), (1, 0, 1_000_000));
    }

    #[test]
    fn game_text_columns_match_validation_limits() {
        let games = creates(GAMES);
        assert!(games.contains(&format!("VARCHAR({})", MAX_LOCATION_LEN)));
        assert!(games.contains(&format!("VARCHAR({})", MAX_NOTES_LEN)));
    }
}
