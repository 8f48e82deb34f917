//! Checkout Models

use std::{collections::BTreeMap, num::NonZeroU32};

use crate::domain::{
    baskets::models::{BasketLine, BasketUuid},
    checkout::errors::CheckoutError,
    products::models::ProductUuid,
};

/// Requested quantities keyed by product.
///
/// Ordered by product id so that resolution, locking and refusal reporting
/// never depend on the order the caller listed the products in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    lines: BTreeMap<ProductUuid, NonZeroU32>,
}

impl CheckoutRequest {
    /// Validate a product to quantity mapping.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyRequest`] for an empty mapping and
    /// [`CheckoutError::ZeroQuantity`] for the first product (by id) asking
    /// for nothing.
    pub fn new(requested: BTreeMap<ProductUuid, u32>) -> Result<Self, CheckoutError> {
        if requested.is_empty() {
            return Err(CheckoutError::EmptyRequest);
        }

        let lines = requested
            .into_iter()
            .map(|(product, quantity)| {
                NonZeroU32::new(quantity)
                    .map(|quantity| (product, quantity))
                    .ok_or(CheckoutError::ZeroQuantity(product))
            })
            .collect::<Result<_, _>>()?;

        Ok(Self { lines })
    }

    /// A request for a single product.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::ZeroQuantity`] when `quantity` is zero.
    pub fn single(product: ProductUuid, quantity: u32) -> Result<Self, CheckoutError> {
        Self::new(BTreeMap::from([(product, quantity)]))
    }

    /// Requested lines in ascending product order.
    pub fn lines(&self) -> impl ExactSizeIterator<Item = (ProductUuid, NonZeroU32)> + '_ {
        self.lines
            .iter()
            .map(|(product, quantity)| (*product, *quantity))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl TryFrom<BTreeMap<ProductUuid, u32>> for CheckoutRequest {
    type Error = CheckoutError;

    fn try_from(requested: BTreeMap<ProductUuid, u32>) -> Result<Self, Self::Error> {
        Self::new(requested)
    }
}

/// What the catalog knows about a product at settlement time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub product: ProductUuid,
    pub price: u64,
    pub original_price: u64,
    pub available: u64,
}

/// Outcome of a conditional stock decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decrement {
    /// Stock was taken; `remaining` units are left.
    Applied { remaining: u64 },

    /// Fewer than the requested units were on hand; nothing was taken.
    Insufficient { available: u64 },
}

/// A line that cannot be satisfied from current stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortfall {
    pub product: ProductUuid,
    pub requested: u32,
    pub available: u64,
}

/// One priced line of a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotedLine {
    pub product: ProductUuid,
    pub quantity: NonZeroU32,
    pub unit_price: u64,
    pub original_price: u64,
    pub line_total: u64,
}

/// Prices for a feasible request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub lines: Vec<QuotedLine>,
    pub total: u64,
    pub savings: u64,
}

/// A committed settlement.
#[derive(Debug, Clone)]
pub struct Settlement {
    pub basket: BasketUuid,
    pub lines: Vec<BasketLine>,
    /// Sum of this settlement's lines.
    pub total: u64,
    /// How much less than the original prices this settlement cost.
    pub savings: u64,
    /// Basket total after this settlement, including earlier settlements.
    pub basket_total: u64,
}
