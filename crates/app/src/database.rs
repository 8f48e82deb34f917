//! Database connection management

use std::time::Duration;

use sqlx::{
    PgPool, Postgres, Row, Transaction,
    migrate::MigrateError,
    postgres::{PgPoolOptions, PgRow},
    query,
};

/// SQL used to bound how long a single statement inside a transaction may run.
pub const SET_STATEMENT_TIMEOUT_SQL: &str = "SELECT set_config('statement_timeout', $1, true)";

/// SQL used to bound how long a statement waits for a row lock.
pub const SET_LOCK_TIMEOUT_SQL: &str = "SELECT set_config('lock_timeout', $1, true)";

/// Pool and per-transaction limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbSettings {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub statement_timeout: Option<Duration>,
    pub lock_timeout: Option<Duration>,
}

impl Default for DbSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout: Duration::from_secs(5),
            statement_timeout: None,
            lock_timeout: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
    statement_timeout: Option<Duration>,
    lock_timeout: Option<Duration>,
}

impl Db {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            statement_timeout: None,
            lock_timeout: None,
        }
    }

    #[must_use]
    pub fn with_settings(pool: PgPool, settings: &DbSettings) -> Self {
        Self {
            pool,
            statement_timeout: settings.statement_timeout,
            lock_timeout: settings.lock_timeout,
        }
    }

    /// Begin a transaction with the configured statement and lock timeouts applied.
    ///
    /// # Errors
    ///
    /// Returns an error when starting the transaction or applying the timeouts fails.
    pub async fn begin_transaction(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        if let Some(timeout) = self.statement_timeout {
            query(SET_STATEMENT_TIMEOUT_SQL)
                .bind(as_setting(timeout))
                .execute(&mut *tx)
                .await?;
        }

        if let Some(timeout) = self.lock_timeout {
            query(SET_LOCK_TIMEOUT_SQL)
                .bind(as_setting(timeout))
                .execute(&mut *tx)
                .await?;
        }

        Ok(tx)
    }
}

/// Postgres timeout settings are plain millisecond strings.
fn as_setting(timeout: Duration) -> String {
    timeout.as_millis().to_string()
}

/// Connect to `PostgreSQL`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str, settings: &DbSettings) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout)
        .connect(database_url)
        .await
}

/// Apply pending migrations.
///
/// # Errors
///
/// Returns an error if a migration fails to apply.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}

/// Read a non-negative `BIGINT` money or stock column.
pub(crate) fn try_get_amount(row: &PgRow, col: &str) -> Result<u64, sqlx::Error> {
    let amount_i64: i64 = row.try_get(col)?;

    u64::try_from(amount_i64).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

/// Largest price, stock level or total a `BIGINT` column can hold.
pub const MAX_AMOUNT: u64 = i64::MAX.unsigned_abs();

/// Convert an amount into the signed `BIGINT` representation Postgres stores.
pub(crate) fn to_db_amount(amount: u64, col: &str) -> Result<i64, sqlx::Error> {
    i64::try_from(amount).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}
