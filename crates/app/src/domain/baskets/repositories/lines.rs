//! Basket Lines Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::{
    database::{to_db_amount, try_get_amount},
    domain::{
        baskets::models::{BasketLine, BasketLineUuid, BasketUuid, NewBasketLine},
        products::models::ProductUuid,
    },
};

const GET_BASKET_LINES_SQL: &str = include_str!("../sql/get_basket_lines.sql");
const CREATE_BASKET_LINE_SQL: &str = include_str!("../sql/create_basket_line.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgBasketLinesRepository;

impl PgBasketLinesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_basket_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        basket: BasketUuid,
    ) -> Result<Vec<BasketLine>, sqlx::Error> {
        query_as::<Postgres, BasketLine>(GET_BASKET_LINES_SQL)
            .bind(basket.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn create_basket_line(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        basket: BasketUuid,
        line: &NewBasketLine,
    ) -> Result<BasketLine, sqlx::Error> {
        query_as::<Postgres, BasketLine>(CREATE_BASKET_LINE_SQL)
            .bind(line.uuid.into_uuid())
            .bind(basket.into_uuid())
            .bind(line.product_uuid.into_uuid())
            .bind(i64::from(line.quantity.get()))
            .bind(to_db_amount(line.unit_price, "unit_price")?)
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for BasketLine {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let quantity_i64: i64 = row.try_get("quantity")?;

        let quantity = u32::try_from(quantity_i64).map_err(|e| sqlx::Error::ColumnDecode {
            index: "quantity".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            uuid: BasketLineUuid::from_uuid(row.try_get("uuid")?),
            basket_uuid: BasketUuid::from_uuid(row.try_get("basket_uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            quantity,
            unit_price: try_get_amount(row, "unit_price")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
