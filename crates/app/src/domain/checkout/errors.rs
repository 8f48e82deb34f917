//! Checkout errors.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    time::Duration,
};

use thiserror::Error;
use tokio::task::JoinError;

use crate::domain::{
    baskets::models::BasketUuid,
    checkout::models::Shortfall,
    products::models::ProductUuid,
};

/// Where a settlement was when it stopped after stock began to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementStage {
    Decrement,
    AppendLines,
    SetTotal,
    Commit,
    Deadline,
    Interrupted,
}

impl SettlementStage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Decrement => "decrement",
            Self::AppendLines => "append_lines",
            Self::SetTotal => "set_total",
            Self::Commit => "commit",
            Self::Deadline => "deadline",
            Self::Interrupted => "interrupted",
        }
    }
}

impl Display for SettlementStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Failures raised by a settlement store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage error")]
    Sql(#[from] sqlx::Error),

    #[error("settlement did not finish within {0:?}")]
    TimedOut(Duration),

    #[error("settlement task stopped before finishing")]
    Interrupted(#[source] JoinError),
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("checkout request has no lines")]
    EmptyRequest,

    #[error("requested quantity for product {0} must be positive")]
    ZeroQuantity(ProductUuid),

    #[error("basket {0} not found")]
    BasketNotFound(BasketUuid),

    #[error("unknown products: {0:?}")]
    UnknownProducts(Vec<ProductUuid>),

    #[error("insufficient stock for {} line(s)", .0.len())]
    InsufficientStock(Vec<Shortfall>),

    #[error("price of product {0} overflows")]
    PriceOverflow(ProductUuid),

    #[error("total of basket {0} overflows")]
    TotalOverflow(BasketUuid),

    /// Nothing was changed; the store could not be reached or timed out
    /// before any stock moved.
    #[error("settlement store unavailable")]
    Unavailable(#[source] StoreError),

    /// Stock may or may not have moved. Callers must not retry blindly.
    #[error("settlement of basket {basket} aborted during {stage}; outcome unknown")]
    SettlementAborted {
        basket: BasketUuid,
        stage: SettlementStage,
        #[source]
        source: StoreError,
    },
}

impl CheckoutError {
    /// True for refusals the caller can correct and resubmit.
    #[must_use]
    pub fn is_refusal(&self) -> bool {
        !matches!(
            self,
            Self::Unavailable(_) | Self::SettlementAborted { .. }
        )
    }

    /// Short label used for logs and metrics.
    #[must_use]
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::EmptyRequest | Self::ZeroQuantity(_) => "invalid_request",
            Self::BasketNotFound(_) => "basket_not_found",
            Self::UnknownProducts(_) => "unknown_product",
            Self::InsufficientStock(_) => "insufficient_stock",
            Self::PriceOverflow(_) | Self::TotalOverflow(_) => "overflow",
            Self::Unavailable(_) => "unavailable",
            Self::SettlementAborted { .. } => "aborted",
        }
    }
}
