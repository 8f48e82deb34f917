//! Restock Product Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    extensions::*,
    products::{errors::into_status_error, get::ProductResponse},
    state::State,
};

/// Restock Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RestockRequest {
    /// Units to add to the quantity on hand; must be positive
    pub amount: u64,
}

/// Restock Product Handler
///
/// Adds stock to a product and returns it with its new quantity.
#[endpoint(
    tags("products"),
    summary = "Restock Product",
    responses(
        (status_code = StatusCode::OK, description = "Product restocked"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "products.restock",
    skip(product, json, depot),
    fields(
        product_uuid = tracing::field::Empty,
        amount = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    json: JsonBody<RestockRequest>,
    depot: &mut Depot,
) -> Result<Json<ProductResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let product = product.into_inner();
    let amount = json.into_inner().amount;

    let span = tracing::Span::current();

    span.record("product_uuid", tracing::field::display(product));
    span.record("amount", amount);

    let restocked = state
        .app
        .products
        .restock(product.into(), amount)
        .await
        .map_err(into_status_error)?;

    Ok(Json(restocked.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use storefront_app::domain::products::{
        MockProductsService, ProductsServiceError, models::ProductUuid,
    };

    use crate::test_helpers::{make_product, products_service};

    use super::*;

    fn make_service(repo: MockProductsService) -> Service {
        products_service(
            repo,
            Router::with_path("products/{product}/restock").post(handler),
        )
    }

    #[tokio::test]
    async fn test_restock_returns_new_quantity() -> TestResult {
        let uuid = ProductUuid::new();

        let mut product = make_product(uuid);

        product.quantity = 15;

        let mut repo = MockProductsService::new();

        repo.expect_restock()
            .once()
            .withf(move |u, amount| *u == uuid && *amount == 5)
            .return_once(move |_, _| Ok(product));

        repo.expect_get_product().never();
        repo.expect_create_product().never();
        repo.expect_list_products().never();
        repo.expect_update_product().never();
        repo.expect_delete_product().never();

        let mut res = TestClient::post(format!("http://example.com/products/{uuid}/restock"))
            .json(&json!({ "amount": 5 }))
            .send(&make_service(repo))
            .await;

        let body: ProductResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.quantity, 15);

        Ok(())
    }

    #[tokio::test]
    async fn test_restock_zero_returns_400() -> TestResult {
        let uuid = ProductUuid::new();

        let mut repo = MockProductsService::new();

        repo.expect_restock()
            .once()
            .withf(move |u, amount| *u == uuid && *amount == 0)
            .return_once(|_, _| Err(ProductsServiceError::InvalidData));

        repo.expect_get_product().never();
        repo.expect_create_product().never();
        repo.expect_list_products().never();
        repo.expect_update_product().never();
        repo.expect_delete_product().never();

        let res = TestClient::post(format!("http://example.com/products/{uuid}/restock"))
            .json(&json!({ "amount": 0 }))
            .send(&make_service(repo))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_restock_unknown_product_returns_404() -> TestResult {
        let uuid = ProductUuid::new();

        let mut repo = MockProductsService::new();

        repo.expect_restock()
            .once()
            .return_once(|_, _| Err(ProductsServiceError::NotFound));

        repo.expect_get_product().never();
        repo.expect_create_product().never();
        repo.expect_list_products().never();
        repo.expect_update_product().never();
        repo.expect_delete_product().never();

        let res = TestClient::post(format!("http://example.com/products/{uuid}/restock"))
            .json(&json!({ "amount": 3 }))
            .send(&make_service(repo))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
