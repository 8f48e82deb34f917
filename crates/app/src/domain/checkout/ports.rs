//! Collaborators consumed by the checkout engine.
//!
//! A settlement runs against one [`SettlementUnit`]: a unit of work that is
//! at once the catalog, the stock ledger and the basket ledger. Nothing a
//! unit does is visible to anyone else until [`SettlementUnit::commit`];
//! dropping a unit without committing discards all of it.

use async_trait::async_trait;

use crate::domain::{
    baskets::models::{BasketHeader, BasketLine, BasketUuid, NewBasketLine},
    checkout::{
        errors::StoreError,
        models::{CatalogEntry, Decrement},
    },
    products::models::ProductUuid,
};

#[async_trait]
pub trait CatalogLookup: Send {
    /// Current price and availability, or `None` for an unknown product.
    ///
    /// Repeated reads within one unit return the same snapshot.
    async fn resolve(&mut self, product: ProductUuid) -> Result<Option<CatalogEntry>, StoreError>;
}

#[async_trait]
pub trait StockLedger: Send {
    /// Take `amount` units only if that leaves the quantity on hand at zero
    /// or above.
    async fn decrement(
        &mut self,
        product: ProductUuid,
        amount: u64,
    ) -> Result<Decrement, StoreError>;
}

#[async_trait]
pub trait BasketLedger: Send {
    /// Read a basket header, serializing settlements of the same basket.
    async fn lock_basket(&mut self, basket: BasketUuid)
    -> Result<Option<BasketHeader>, StoreError>;

    async fn append_lines(
        &mut self,
        basket: BasketUuid,
        lines: &[NewBasketLine],
    ) -> Result<Vec<BasketLine>, StoreError>;

    async fn set_total(&mut self, basket: BasketUuid, total: u64) -> Result<(), StoreError>;
}

#[async_trait]
pub trait SettlementUnit: CatalogLookup + StockLedger + BasketLedger + Sized {
    async fn commit(self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait SettlementStore: Send + Sync {
    type Unit: SettlementUnit + 'static;

    async fn begin(&self) -> Result<Self::Unit, StoreError>;
}
