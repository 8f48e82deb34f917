//! Products Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::{
    database::{to_db_amount, try_get_amount},
    domain::products::models::{CategoryUuid, NewProduct, Product, ProductUpdate, ProductUuid},
};

const LIST_PRODUCTS_SQL: &str = include_str!("sql/list_products.sql");
const GET_PRODUCT_SQL: &str = include_str!("sql/get_product.sql");
const CREATE_PRODUCT_SQL: &str = include_str!("sql/create_product.sql");
const UPDATE_PRODUCT_SQL: &str = include_str!("sql/update_product.sql");
const RESTOCK_PRODUCT_SQL: &str = include_str!("sql/restock_product.sql");
const DELETE_PRODUCT_SQL: &str = include_str!("sql/delete_product.sql");
const LOCK_PRODUCT_SQL: &str = include_str!("sql/lock_product.sql");
const DECREMENT_STOCK_SQL: &str = include_str!("sql/decrement_stock.sql");
const GET_STOCK_SQL: &str = include_str!("sql/get_stock.sql");

/// Price and stock of a product, read under a row lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LockedProduct {
    pub(crate) uuid: ProductUuid,
    pub(crate) price: u64,
    pub(crate) original_price: u64,
    pub(crate) quantity: u64,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgProductsRepository;

impl PgProductsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<Product>, sqlx::Error> {
        query_as::<Postgres, Product>(LIST_PRODUCTS_SQL)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn get_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<Product, sqlx::Error> {
        query_as::<Postgres, Product>(GET_PRODUCT_SQL)
            .bind(product.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: NewProduct,
    ) -> Result<Product, sqlx::Error> {
        query_as::<Postgres, Product>(CREATE_PRODUCT_SQL)
            .bind(product.uuid.into_uuid())
            .bind(product.name)
            .bind(to_db_amount(product.price, "price")?)
            .bind(to_db_amount(product.original_price, "original_price")?)
            .bind(to_db_amount(product.quantity, "quantity")?)
            .bind(product.category_uuid.map(CategoryUuid::into_uuid))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        update: ProductUpdate,
    ) -> Result<Product, sqlx::Error> {
        query_as::<Postgres, Product>(UPDATE_PRODUCT_SQL)
            .bind(product.into_uuid())
            .bind(update.name)
            .bind(to_db_amount(update.price, "price")?)
            .bind(to_db_amount(update.original_price, "original_price")?)
            .bind(update.category_uuid.map(CategoryUuid::into_uuid))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn restock_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        amount: u64,
    ) -> Result<Product, sqlx::Error> {
        query_as::<Postgres, Product>(RESTOCK_PRODUCT_SQL)
            .bind(product.into_uuid())
            .bind(to_db_amount(amount, "quantity")?)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_PRODUCT_SQL)
            .bind(product.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Read a product's price and stock, holding its row lock until the
    /// transaction ends.
    pub(crate) async fn lock_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<Option<LockedProduct>, sqlx::Error> {
        let row = query(LOCK_PRODUCT_SQL)
            .bind(product.into_uuid())
            .fetch_optional(&mut **tx)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(LockedProduct {
            uuid: ProductUuid::from_uuid(row.try_get::<Uuid, _>("uuid")?),
            price: try_get_amount(&row, "price")?,
            original_price: try_get_amount(&row, "original_price")?,
            quantity: try_get_amount(&row, "quantity")?,
        }))
    }

    /// Conditionally take `amount` units of stock.
    ///
    /// Returns the remaining quantity, or `None` when the product holds fewer
    /// than `amount` units (or no longer exists).
    pub(crate) async fn decrement_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        amount: u64,
    ) -> Result<Option<u64>, sqlx::Error> {
        let row = query(DECREMENT_STOCK_SQL)
            .bind(product.into_uuid())
            .bind(to_db_amount(amount, "quantity")?)
            .fetch_optional(&mut **tx)
            .await?;

        row.map(|row| try_get_amount(&row, "quantity")).transpose()
    }

    pub(crate) async fn get_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<Option<u64>, sqlx::Error> {
        let row = query(GET_STOCK_SQL)
            .bind(product.into_uuid())
            .fetch_optional(&mut **tx)
            .await?;

        row.map(|row| try_get_amount(&row, "quantity")).transpose()
    }
}

impl<'r> FromRow<'r, PgRow> for Product {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ProductUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            price: try_get_amount(row, "price")?,
            original_price: try_get_amount(row, "original_price")?,
            quantity: try_get_amount(row, "quantity")?,
            category_uuid: row
                .try_get::<Option<Uuid>, _>("category_uuid")?
                .map(CategoryUuid::from_uuid),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
