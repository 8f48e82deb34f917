//! App Context

use std::{sync::Arc, time::Duration};

use sqlx::migrate::MigrateError;
use thiserror::Error;

use crate::{
    database::{self, Db, DbSettings},
    domain::{
        baskets::{BasketsService, PgBasketsService},
        checkout::{CheckoutService, PgCheckoutService, PgSettlementStore},
        products::{PgProductsService, ProductsService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply database migrations")]
    Migrate(#[source] MigrateError),
}

#[derive(Clone)]
pub struct AppContext {
    pub products: Arc<dyn ProductsService>,
    pub baskets: Arc<dyn BasketsService>,
    pub checkout: Arc<dyn CheckoutService>,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// When `run_migrations` is set, pending migrations are applied before
    /// any service is handed out.
    ///
    /// # Errors
    ///
    /// Returns an error when connecting or migrating fails.
    pub async fn from_database_url(
        url: &str,
        settings: &DbSettings,
        settlement_deadline: Duration,
        run_migrations: bool,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(url, settings)
            .await
            .map_err(AppInitError::Database)?;

        if run_migrations {
            database::migrate(&pool)
                .await
                .map_err(AppInitError::Migrate)?;
        }

        let db = Db::with_settings(pool, settings);

        Ok(Self {
            products: Arc::new(PgProductsService::new(db.clone())),
            baskets: Arc::new(PgBasketsService::new(db.clone())),
            checkout: Arc::new(PgCheckoutService::new(
                PgSettlementStore::new(db),
                settlement_deadline,
            )),
        })
    }
}
