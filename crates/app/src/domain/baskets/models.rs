//! Basket Models

use std::num::NonZeroU32;

use jiff::Timestamp;

use crate::{domain::products::models::ProductUuid, uuids::TypedUuid};

/// Basket UUID
pub type BasketUuid = TypedUuid<Basket>;

/// Basket Line UUID
pub type BasketLineUuid = TypedUuid<BasketLine>;

/// Customer marker; customers are managed outside this service.
#[derive(Debug)]
pub struct Customer;

/// Customer UUID
pub type CustomerUuid = TypedUuid<Customer>;

/// Basket Model
///
/// `total` always equals the sum of `unit_price * quantity` over every
/// committed line.
#[derive(Debug, Clone)]
pub struct Basket {
    pub uuid: BasketUuid,
    pub customer_uuid: CustomerUuid,
    pub total: u64,
    pub lines: Vec<BasketLine>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// New Basket Model
#[derive(Debug, Clone, PartialEq)]
pub struct NewBasket {
    pub uuid: BasketUuid,
    pub customer_uuid: CustomerUuid,
}

impl NewBasket {
    /// An empty basket with a freshly generated id.
    #[must_use]
    pub fn for_customer(customer_uuid: CustomerUuid) -> Self {
        Self {
            uuid: BasketUuid::new(),
            customer_uuid,
        }
    }
}

/// Basket header as seen while a settlement holds its lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasketHeader {
    pub uuid: BasketUuid,
    pub total: u64,
}

/// BasketLine Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasketLine {
    pub uuid: BasketLineUuid,
    pub basket_uuid: BasketUuid,
    pub product_uuid: ProductUuid,
    pub quantity: u32,
    pub unit_price: u64,
    pub created_at: Timestamp,
}

impl BasketLine {
    /// `unit_price * quantity`, or `None` on overflow.
    #[must_use]
    pub fn line_total(&self) -> Option<u64> {
        self.unit_price.checked_mul(u64::from(self.quantity))
    }
}

/// NewBasketLine Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBasketLine {
    pub uuid: BasketLineUuid,
    pub product_uuid: ProductUuid,
    pub quantity: NonZeroU32,
    pub unit_price: u64,
}
