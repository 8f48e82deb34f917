//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};

use storefront_app::{
    context::AppContext,
    domain::{
        baskets::{
            MockBasketsService,
            models::{Basket, BasketUuid, CustomerUuid},
        },
        checkout::MockCheckoutService,
        products::{
            MockProductsService,
            models::{Product, ProductUuid},
        },
    },
};

use crate::state::State;

fn strict_products_mock() -> MockProductsService {
    let mut products = MockProductsService::new();

    products.expect_list_products().never();
    products.expect_get_product().never();
    products.expect_create_product().never();
    products.expect_update_product().never();
    products.expect_restock().never();
    products.expect_delete_product().never();

    products
}

fn strict_baskets_mock() -> MockBasketsService {
    let mut baskets = MockBasketsService::new();

    baskets.expect_get_basket().never();
    baskets.expect_create_basket().never();
    baskets.expect_delete_basket().never();

    baskets
}

fn strict_checkout_mock() -> MockCheckoutService {
    let mut checkout = MockCheckoutService::new();

    checkout.expect_settle().never();

    checkout
}

fn state(
    products: MockProductsService,
    baskets: MockBasketsService,
    checkout: MockCheckoutService,
) -> Arc<State> {
    State::shared(AppContext {
        products: Arc::new(products),
        baskets: Arc::new(baskets),
        checkout: Arc::new(checkout),
    })
}

fn service_with(state: Arc<State>, route: Router) -> Service {
    Service::new(Router::new().hoop(inject(state)).push(route))
}

pub(crate) fn products_service(products: MockProductsService, route: Router) -> Service {
    service_with(
        state(products, strict_baskets_mock(), strict_checkout_mock()),
        route,
    )
}

pub(crate) fn baskets_service(baskets: MockBasketsService, route: Router) -> Service {
    service_with(
        state(strict_products_mock(), baskets, strict_checkout_mock()),
        route,
    )
}

pub(crate) fn checkout_service(checkout: MockCheckoutService, route: Router) -> Service {
    service_with(
        state(strict_products_mock(), strict_baskets_mock(), checkout),
        route,
    )
}

pub(crate) fn make_product(uuid: ProductUuid) -> Product {
    Product {
        uuid,
        name: "Espresso Cup".to_string(),
        price: 100,
        original_price: 100,
        quantity: 10,
        category_uuid: None,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_basket(uuid: BasketUuid) -> Basket {
    Basket {
        uuid,
        customer_uuid: CustomerUuid::from_uuid(uuid::Uuid::nil()),
        total: 0,
        lines: Vec::new(),
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}
