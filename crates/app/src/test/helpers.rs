//! Test Helpers

use crate::domain::products::models::{NewProduct, ProductUuid};

/// A product sold at its original price with no category.
pub(crate) fn new_product(uuid: ProductUuid, name: &str, price: u64, quantity: u64) -> NewProduct {
    NewProduct {
        uuid,
        name: name.to_string(),
        price,
        original_price: price,
        quantity,
        category_uuid: None,
    }
}
