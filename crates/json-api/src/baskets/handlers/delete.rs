//! Delete Basket Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{baskets::errors::into_status_error, extensions::*, state::State};

/// Delete Basket Handler
///
/// Removes the basket together with its lines. Stock already taken by
/// settlements is not returned.
#[endpoint(
    tags("baskets"),
    summary = "Delete Basket",
    responses(
        (status_code = StatusCode::OK, description = "Basket deleted"),
        (status_code = StatusCode::NOT_FOUND, description = "Basket not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "baskets.delete",
    skip(basket, depot),
    fields(basket_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    basket: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let basket = basket.into_inner();

    tracing::Span::current().record("basket_uuid", tracing::field::display(basket));

    state
        .app
        .baskets
        .delete_basket(basket.into())
        .await
        .map_err(into_status_error)?;

    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use salvo::test::TestClient;
    use testresult::TestResult;

    use storefront_app::domain::baskets::{
        BasketsServiceError, MockBasketsService, models::BasketUuid,
    };

    use crate::test_helpers::baskets_service;

    use super::*;

    fn make_service(repo: MockBasketsService) -> Service {
        baskets_service(repo, Router::with_path("baskets/{basket}").delete(handler))
    }

    #[tokio::test]
    async fn test_delete_basket_success() -> TestResult {
        let uuid = BasketUuid::new();

        let mut repo = MockBasketsService::new();

        repo.expect_delete_basket()
            .once()
            .withf(move |u| *u == uuid)
            .return_once(|_| Ok(()));

        repo.expect_get_basket().never();
        repo.expect_create_basket().never();

        let res = TestClient::delete(format!("http://example.com/baskets/{uuid}"))
            .send(&make_service(repo))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_basket_invalid_uuid_returns_400() -> TestResult {
        let mut repo = MockBasketsService::new();

        repo.expect_get_basket().never();
        repo.expect_create_basket().never();
        repo.expect_delete_basket().never();

        let res = TestClient::delete("http://example.com/baskets/123")
            .send(&make_service(repo))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_basket_not_found_returns_404() -> TestResult {
        let uuid = BasketUuid::new();

        let mut repo = MockBasketsService::new();

        repo.expect_delete_basket()
            .once()
            .return_once(|_| Err(BasketsServiceError::NotFound));

        repo.expect_get_basket().never();
        repo.expect_create_basket().never();

        let res = TestClient::delete(format!("http://example.com/baskets/{uuid}"))
            .send(&make_service(repo))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
