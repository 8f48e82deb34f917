//! Database Config

use std::time::Duration;

use clap::Args;

use storefront_app::database::DbSettings;

/// Database settings.
#[derive(Debug, Args)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: String,

    /// Maximum pooled connections.
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 10_u32)]
    pub db_max_connections: u32,

    /// How long to wait for a pooled connection, in milliseconds.
    #[arg(long, env = "DB_ACQUIRE_TIMEOUT_MS", default_value_t = 5_000_u64)]
    pub db_acquire_timeout_ms: u64,

    /// Per-statement timeout in milliseconds; 0 disables it.
    #[arg(long, env = "DB_STATEMENT_TIMEOUT_MS", default_value_t = 5_000_u64)]
    pub db_statement_timeout_ms: u64,

    /// Row lock wait timeout in milliseconds; 0 disables it.
    #[arg(long, env = "DB_LOCK_TIMEOUT_MS", default_value_t = 2_000_u64)]
    pub db_lock_timeout_ms: u64,

    /// Apply pending migrations on startup.
    #[arg(long, env = "DB_RUN_MIGRATIONS", default_value_t = false)]
    pub db_run_migrations: bool,
}

impl DatabaseConfig {
    /// Pool and transaction limits for the app crate.
    #[must_use]
    pub fn settings(&self) -> DbSettings {
        DbSettings {
            max_connections: self.db_max_connections,
            acquire_timeout: Duration::from_millis(self.db_acquire_timeout_ms),
            statement_timeout: non_zero_millis(self.db_statement_timeout_ms),
            lock_timeout: non_zero_millis(self.db_lock_timeout_ms),
        }
    }
}

fn non_zero_millis(millis: u64) -> Option<Duration> {
    (millis > 0).then(|| Duration::from_millis(millis))
}
