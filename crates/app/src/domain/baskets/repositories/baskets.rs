//! Baskets Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::{
    database::{to_db_amount, try_get_amount},
    domain::baskets::models::{Basket, BasketHeader, BasketUuid, CustomerUuid, NewBasket},
};

const GET_BASKET_SQL: &str = include_str!("../sql/get_basket.sql");
const CREATE_BASKET_SQL: &str = include_str!("../sql/create_basket.sql");
const DELETE_BASKET_SQL: &str = include_str!("../sql/delete_basket.sql");
const LOCK_BASKET_SQL: &str = include_str!("../sql/lock_basket.sql");
const SET_BASKET_TOTAL_SQL: &str = include_str!("../sql/set_basket_total.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgBasketsRepository;

impl PgBasketsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_basket(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        basket: BasketUuid,
    ) -> Result<Basket, sqlx::Error> {
        query_as::<Postgres, Basket>(GET_BASKET_SQL)
            .bind(basket.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_basket(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        basket: NewBasket,
    ) -> Result<Basket, sqlx::Error> {
        query_as::<Postgres, Basket>(CREATE_BASKET_SQL)
            .bind(basket.uuid.into_uuid())
            .bind(basket.customer_uuid.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Delete a basket; its lines go with it.
    pub(crate) async fn delete_basket(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        basket: BasketUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_BASKET_SQL)
            .bind(basket.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Read the basket header and hold its row lock until the transaction ends.
    pub(crate) async fn lock_basket(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        basket: BasketUuid,
    ) -> Result<Option<BasketHeader>, sqlx::Error> {
        let row = query(LOCK_BASKET_SQL)
            .bind(basket.into_uuid())
            .fetch_optional(&mut **tx)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(BasketHeader {
            uuid: BasketUuid::from_uuid(row.try_get::<Uuid, _>("uuid")?),
            total: try_get_amount(&row, "total")?,
        }))
    }

    pub(crate) async fn set_total(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        basket: BasketUuid,
        total: u64,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(SET_BASKET_TOTAL_SQL)
            .bind(basket.into_uuid())
            .bind(to_db_amount(total, "total")?)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for Basket {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let basket_lines_count: i64 = row.try_get("basket_lines_count")?;

        Ok(Self {
            uuid: BasketUuid::from_uuid(row.try_get("uuid")?),
            customer_uuid: CustomerUuid::from_uuid(row.try_get("customer_uuid")?),
            total: try_get_amount(row, "total")?,
            lines: Vec::with_capacity(usize::try_from(basket_lines_count).unwrap_or_default()),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
