//! Product Models

use jiff::Timestamp;

use crate::uuids::TypedUuid;

/// Product UUID
pub type ProductUuid = TypedUuid<Product>;

/// Category marker; categories are owned elsewhere and only referenced here.
#[derive(Debug)]
pub struct Category;

/// Category UUID
pub type CategoryUuid = TypedUuid<Category>;

/// Product Model
///
/// Prices are minor currency units. `quantity` is the quantity on hand and is
/// only ever changed by restocking or by a basket settlement.
#[derive(Debug, Clone)]
pub struct Product {
    pub uuid: ProductUuid,
    pub name: String,
    pub price: u64,
    pub original_price: u64,
    pub quantity: u64,
    pub category_uuid: Option<CategoryUuid>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// New Product Model
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub uuid: ProductUuid,
    pub name: String,
    pub price: u64,
    pub original_price: u64,
    pub quantity: u64,
    pub category_uuid: Option<CategoryUuid>,
}

/// Product Update Model
#[derive(Debug, Clone, PartialEq)]
pub struct ProductUpdate {
    pub name: String,
    pub price: u64,
    pub original_price: u64,
    pub category_uuid: Option<CategoryUuid>,
}
