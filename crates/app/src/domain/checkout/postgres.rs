//! Postgres-backed settlement store.
//!
//! A settlement is one transaction. The basket row is locked first, then each
//! product row in ascending id order, so two settlements touching the same
//! products always queue instead of deadlocking.

use std::fmt::{Debug, Formatter, Result as FmtResult};

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};

use crate::{
    database::Db,
    domain::{
        baskets::{
            models::{BasketHeader, BasketLine, BasketUuid, NewBasketLine},
            repositories::{PgBasketLinesRepository, PgBasketsRepository},
        },
        checkout::{
            errors::StoreError,
            models::{CatalogEntry, Decrement},
            ports::{BasketLedger, CatalogLookup, SettlementStore, SettlementUnit, StockLedger},
        },
        products::{models::ProductUuid, repository::PgProductsRepository},
    },
};

#[derive(Debug, Clone)]
pub struct PgSettlementStore {
    db: Db,
}

impl PgSettlementStore {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SettlementStore for PgSettlementStore {
    type Unit = PgSettlement;

    async fn begin(&self) -> Result<Self::Unit, StoreError> {
        Ok(PgSettlement {
            tx: self.db.begin_transaction().await?,
            products: PgProductsRepository::new(),
            baskets: PgBasketsRepository::new(),
            lines: PgBasketLinesRepository::new(),
        })
    }
}

/// One open settlement transaction. Dropping it rolls back.
pub struct PgSettlement {
    tx: Transaction<'static, Postgres>,
    products: PgProductsRepository,
    baskets: PgBasketsRepository,
    lines: PgBasketLinesRepository,
}

impl Debug for PgSettlement {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("PgSettlement").finish_non_exhaustive()
    }
}

#[async_trait]
impl CatalogLookup for PgSettlement {
    async fn resolve(&mut self, product: ProductUuid) -> Result<Option<CatalogEntry>, StoreError> {
        let locked = self.products.lock_product(&mut self.tx, product).await?;

        Ok(locked.map(|locked| CatalogEntry {
            product: locked.uuid,
            price: locked.price,
            original_price: locked.original_price,
            available: locked.quantity,
        }))
    }
}

#[async_trait]
impl StockLedger for PgSettlement {
    async fn decrement(
        &mut self,
        product: ProductUuid,
        amount: u64,
    ) -> Result<Decrement, StoreError> {
        if let Some(remaining) = self
            .products
            .decrement_stock(&mut self.tx, product, amount)
            .await?
        {
            return Ok(Decrement::Applied { remaining });
        }

        let available = self
            .products
            .get_stock(&mut self.tx, product)
            .await?
            .unwrap_or_default();

        Ok(Decrement::Insufficient { available })
    }
}

#[async_trait]
impl BasketLedger for PgSettlement {
    async fn lock_basket(
        &mut self,
        basket: BasketUuid,
    ) -> Result<Option<BasketHeader>, StoreError> {
        Ok(self.baskets.lock_basket(&mut self.tx, basket).await?)
    }

    async fn append_lines(
        &mut self,
        basket: BasketUuid,
        lines: &[NewBasketLine],
    ) -> Result<Vec<BasketLine>, StoreError> {
        let mut created = Vec::with_capacity(lines.len());

        for line in lines {
            created.push(
                self.lines
                    .create_basket_line(&mut self.tx, basket, line)
                    .await?,
            );
        }

        Ok(created)
    }

    async fn set_total(&mut self, basket: BasketUuid, total: u64) -> Result<(), StoreError> {
        let rows_affected = self.baskets.set_total(&mut self.tx, basket, total).await?;

        if rows_affected == 0 {
            return Err(StoreError::Sql(sqlx::Error::RowNotFound));
        }

        Ok(())
    }
}

#[async_trait]
impl SettlementUnit for PgSettlement {
    async fn commit(self) -> Result<(), StoreError> {
        Ok(self.tx.commit().await?)
    }
}
