//! Checkout engine.

use std::{
    num::NonZeroU32,
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use mockall::automock;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::domain::{
    baskets::models::{BasketLineUuid, BasketUuid, NewBasketLine},
    checkout::{
        errors::{CheckoutError, SettlementStage, StoreError},
        models::{CatalogEntry, CheckoutRequest, Decrement, Settlement, Shortfall},
        ports::{BasketLedger, CatalogLookup, SettlementStore, SettlementUnit, StockLedger},
        pricing,
    },
};

/// How long a settlement may run when no deadline is configured.
pub const DEFAULT_SETTLEMENT_DEADLINE: Duration = Duration::from_secs(10);

/// Settles checkout requests against a [`SettlementStore`].
///
/// Each settlement resolves every requested product, refuses the whole
/// request if any line is unknown or short, then takes stock, appends the
/// basket lines and moves the basket total inside a single unit of work.
#[derive(Debug, Clone)]
pub struct CheckoutEngine<S> {
    store: S,
    deadline: Duration,
}

impl<S: SettlementStore> CheckoutEngine<S> {
    #[must_use]
    pub fn new(store: S, deadline: Duration) -> Self {
        Self { store, deadline }
    }

    #[must_use]
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    async fn run_settlement(
        &self,
        basket: BasketUuid,
        request: &CheckoutRequest,
        mutating: &AtomicBool,
    ) -> Result<Settlement, CheckoutError> {
        let aborted = |stage, source| abort(basket, request, stage, source);

        let mut unit = self
            .store
            .begin()
            .await
            .map_err(CheckoutError::Unavailable)?;

        let header = unit
            .lock_basket(basket)
            .await
            .map_err(CheckoutError::Unavailable)?
            .ok_or(CheckoutError::BasketNotFound(basket))?;

        let resolved = resolve_all(&mut unit, request).await?;

        let quote = pricing::quote(&resolved)?;

        let basket_total = pricing::storable(header.total.checked_add(quote.total))
            .ok_or(CheckoutError::TotalOverflow(basket))?;

        mutating.store(true, Ordering::Release);

        let mut conflicts = Vec::new();

        for line in &quote.lines {
            let units = u64::from(line.quantity.get());

            match unit.decrement(line.product, units).await {
                Ok(Decrement::Applied { .. }) => {}
                Ok(Decrement::Insufficient { available }) => conflicts.push(Shortfall {
                    product: line.product,
                    requested: line.quantity.get(),
                    available,
                }),
                Err(source) => return Err(aborted(SettlementStage::Decrement, source)),
            }
        }

        if !conflicts.is_empty() {
            // Dropping the unit on return undoes the decrements that did apply.
            warn!(
                basket_uuid = %basket,
                conflicts = conflicts.len(),
                "stock moved between resolution and decrement"
            );

            return Err(CheckoutError::InsufficientStock(conflicts));
        }

        let new_lines: Vec<NewBasketLine> = quote
            .lines
            .iter()
            .map(|line| NewBasketLine {
                uuid: BasketLineUuid::new(),
                product_uuid: line.product,
                quantity: line.quantity,
                unit_price: line.unit_price,
            })
            .collect();

        let lines = unit
            .append_lines(basket, &new_lines)
            .await
            .map_err(|source| aborted(SettlementStage::AppendLines, source))?;

        unit.set_total(basket, basket_total)
            .await
            .map_err(|source| aborted(SettlementStage::SetTotal, source))?;

        unit.commit()
            .await
            .map_err(|source| aborted(SettlementStage::Commit, source))?;

        info!(
            basket_uuid = %basket,
            lines = lines.len(),
            total = quote.total,
            basket_total,
            "settled basket"
        );

        Ok(Settlement {
            basket,
            lines,
            total: quote.total,
            savings: quote.savings,
            basket_total,
        })
    }
}

impl<S> CheckoutEngine<S>
where
    S: SettlementStore + Clone + 'static,
{
    /// Run a settlement on its own task, bounded by the engine deadline.
    ///
    /// The settlement keeps running if the caller stops waiting for it.
    async fn settle_detached(
        &self,
        basket: BasketUuid,
        request: CheckoutRequest,
    ) -> Result<Settlement, CheckoutError> {
        let engine = self.clone();
        let deadline = self.deadline;

        let handle = tokio::spawn(async move {
            let mutating = AtomicBool::new(false);

            match timeout(deadline, engine.run_settlement(basket, &request, &mutating)).await {
                Ok(outcome) => outcome,
                Err(_elapsed) if mutating.load(Ordering::Acquire) => Err(abort(
                    basket,
                    &request,
                    SettlementStage::Deadline,
                    StoreError::TimedOut(deadline),
                )),
                Err(_elapsed) => Err(CheckoutError::Unavailable(StoreError::TimedOut(deadline))),
            }
        });

        match handle.await {
            Ok(outcome) => outcome,
            Err(join_error) => {
                error!(
                    basket_uuid = %basket,
                    stage = %SettlementStage::Interrupted,
                    error = %join_error,
                    "settlement task stopped; stock and basket need reconciling"
                );

                Err(CheckoutError::SettlementAborted {
                    basket,
                    stage: SettlementStage::Interrupted,
                    source: StoreError::Interrupted(join_error),
                })
            }
        }
    }
}

#[automock]
#[async_trait]
pub trait CheckoutService: Send + Sync {
    /// Settle `request` against `basket`, all or nothing.
    async fn settle(
        &self,
        basket: BasketUuid,
        request: CheckoutRequest,
    ) -> Result<Settlement, CheckoutError>;
}

#[async_trait]
impl<S> CheckoutService for CheckoutEngine<S>
where
    S: SettlementStore + Clone + 'static,
{
    async fn settle(
        &self,
        basket: BasketUuid,
        request: CheckoutRequest,
    ) -> Result<Settlement, CheckoutError> {
        self.settle_detached(basket, request).await
    }
}

async fn resolve_all<U: CatalogLookup>(
    unit: &mut U,
    request: &CheckoutRequest,
) -> Result<Vec<(CatalogEntry, NonZeroU32)>, CheckoutError> {
    let mut resolved = Vec::with_capacity(request.len());
    let mut unknown = Vec::new();

    for (product, quantity) in request.lines() {
        match unit
            .resolve(product)
            .await
            .map_err(CheckoutError::Unavailable)?
        {
            Some(entry) => resolved.push((entry, quantity)),
            None => unknown.push(product),
        }
    }

    if !unknown.is_empty() {
        return Err(CheckoutError::UnknownProducts(unknown));
    }

    Ok(resolved)
}

fn abort(
    basket: BasketUuid,
    request: &CheckoutRequest,
    stage: SettlementStage,
    source: StoreError,
) -> CheckoutError {
    let lines: Vec<(String, u32)> = request
        .lines()
        .map(|(product, quantity)| (product.to_string(), quantity.get()))
        .collect();

    error!(
        basket_uuid = %basket,
        %stage,
        ?lines,
        error = %source,
        "settlement aborted; stock and basket need reconciling"
    );

    CheckoutError::SettlementAborted {
        basket,
        stage,
        source,
    }
}
