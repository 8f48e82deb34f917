//! Baskets service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::baskets::{
        errors::BasketsServiceError,
        models::{Basket, BasketUuid, NewBasket},
        repositories::{PgBasketLinesRepository, PgBasketsRepository},
    },
};

#[derive(Debug, Clone)]
pub struct PgBasketsService {
    db: Db,
    baskets_repository: PgBasketsRepository,
    lines_repository: PgBasketLinesRepository,
}

impl PgBasketsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            baskets_repository: PgBasketsRepository::new(),
            lines_repository: PgBasketLinesRepository::new(),
        }
    }
}

#[async_trait]
impl BasketsService for PgBasketsService {
    async fn get_basket(&self, uuid: BasketUuid) -> Result<Basket, BasketsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let mut basket = self.baskets_repository.get_basket(&mut tx, uuid).await?;

        let lines = self
            .lines_repository
            .get_basket_lines(&mut tx, uuid)
            .await?;

        tx.commit().await?;

        basket.lines.extend(lines);

        Ok(basket)
    }

    async fn create_basket(&self, basket: NewBasket) -> Result<Basket, BasketsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let created = self
            .baskets_repository
            .create_basket(&mut tx, basket)
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn delete_basket(&self, uuid: BasketUuid) -> Result<(), BasketsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let rows_affected = self.baskets_repository.delete_basket(&mut tx, uuid).await?;

        if rows_affected == 0 {
            return Err(BasketsServiceError::NotFound);
        }

        tx.commit().await?;

        info!(basket_uuid = %uuid, "deleted basket and its lines");

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait BasketsService: Send + Sync {
    /// Retrieve a single basket together with its committed lines.
    async fn get_basket(&self, uuid: BasketUuid) -> Result<Basket, BasketsServiceError>;

    /// Creates a new, empty basket.
    async fn create_basket(&self, basket: NewBasket) -> Result<Basket, BasketsServiceError>;

    /// Deletes a basket and every line committed against it.
    async fn delete_basket(&self, uuid: BasketUuid) -> Result<(), BasketsServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::{
            baskets::models::CustomerUuid,
            checkout::{CheckoutService, models::CheckoutRequest},
            products::{ProductsService, models::ProductUuid},
        },
        test::{TestContext, helpers::new_product},
    };

    use super::*;

    #[tokio::test]
    #[ignore = "needs Docker for the Postgres testcontainer"]
    async fn create_basket_starts_empty() -> TestResult {
        let ctx = TestContext::new().await;
        let customer = CustomerUuid::new();
        let new = NewBasket::for_customer(customer);
        let uuid = new.uuid;

        let basket = ctx.baskets.create_basket(new).await?;

        assert_eq!(basket.uuid, uuid);
        assert_eq!(basket.customer_uuid, customer);
        assert_eq!(basket.total, 0);
        assert!(basket.lines.is_empty());

        Ok(())
    }

    #[tokio::test]
    #[ignore = "needs Docker for the Postgres testcontainer"]
    async fn get_basket_unknown_uuid_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.baskets.get_basket(BasketUuid::new()).await;

        assert!(
            matches!(result, Err(BasketsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    #[ignore = "needs Docker for the Postgres testcontainer"]
    async fn create_basket_duplicate_uuid_returns_already_exists() -> TestResult {
        let ctx = TestContext::new().await;
        let new = NewBasket::for_customer(CustomerUuid::new());

        ctx.baskets.create_basket(new.clone()).await?;

        let result = ctx.baskets.create_basket(new).await;

        assert!(
            matches!(result, Err(BasketsServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    #[ignore = "needs Docker for the Postgres testcontainer"]
    async fn get_basket_returns_settled_lines_and_total() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ProductUuid::new();

        ctx.products
            .create_product(new_product(product, "Mug", 800, 5))
            .await?;

        let basket = ctx
            .baskets
            .create_basket(NewBasket::for_customer(CustomerUuid::new()))
            .await?;

        ctx.checkout
            .settle(basket.uuid, CheckoutRequest::single(product, 3)?)
            .await?;

        let basket = ctx.baskets.get_basket(basket.uuid).await?;

        assert_eq!(basket.total, 2_400);
        assert_eq!(basket.lines.len(), 1);

        let line_sum: u64 = basket.lines.iter().filter_map(|l| l.line_total()).sum();

        assert_eq!(line_sum, basket.total, "total should equal the sum of lines");

        Ok(())
    }

    #[tokio::test]
    #[ignore = "needs Docker for the Postgres testcontainer"]
    async fn delete_basket_removes_lines_too() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ProductUuid::new();

        ctx.products
            .create_product(new_product(product, "Mug", 800, 5))
            .await?;

        let basket = ctx
            .baskets
            .create_basket(NewBasket::for_customer(CustomerUuid::new()))
            .await?;

        ctx.checkout
            .settle(basket.uuid, CheckoutRequest::single(product, 1)?)
            .await?;

        ctx.baskets.delete_basket(basket.uuid).await?;

        let remaining: i64 =
            sqlx::query_scalar("SELECT count(*) FROM basket_lines WHERE basket_uuid = $1")
                .bind(basket.uuid.into_uuid())
                .fetch_one(ctx.db.pool())
                .await?;

        assert_eq!(remaining, 0, "lines should be deleted with their basket");

        Ok(())
    }

    #[tokio::test]
    #[ignore = "needs Docker for the Postgres testcontainer"]
    async fn delete_basket_unknown_uuid_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.baskets.delete_basket(BasketUuid::new()).await;

        assert!(
            matches!(result, Err(BasketsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }
}
