//! Get Basket Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use storefront_app::domain::baskets::models::{Basket, BasketLine};

use crate::{baskets::errors::into_status_error, extensions::*, state::State};

/// Basket Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct BasketResponse {
    /// The unique identifier of the basket
    pub uuid: Uuid,

    /// The customer the basket belongs to
    pub customer_uuid: Uuid,

    /// Sum of every committed line, in minor currency units
    pub total: u64,

    /// Committed lines, oldest first
    pub lines: Vec<BasketLineResponse>,

    /// The date and time the basket was created
    pub created_at: String,

    /// The date and time the basket was last updated
    pub updated_at: String,
}

impl TryFrom<Basket> for BasketResponse {
    type Error = LineTotalOverflow;

    fn try_from(basket: Basket) -> Result<Self, Self::Error> {
        Ok(BasketResponse {
            uuid: basket.uuid.into(),
            customer_uuid: basket.customer_uuid.into(),
            total: basket.total,
            lines: basket
                .lines
                .into_iter()
                .map(BasketLineResponse::try_from)
                .collect::<Result<_, _>>()?,
            created_at: basket.created_at.to_string(),
            updated_at: basket.updated_at.to_string(),
        })
    }
}

/// A stored line whose `unit_price * quantity` does not fit in `u64`.
#[derive(Debug, Error)]
#[error("total of basket line {line} overflows")]
pub(crate) struct LineTotalOverflow {
    line: Uuid,
}

/// Basket Line Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct BasketLineResponse {
    /// The unique identifier of the line
    pub uuid: Uuid,

    /// The product sold on this line
    pub product_uuid: Uuid,

    /// Units sold
    pub quantity: u32,

    /// Price per unit at the moment of settlement
    pub unit_price: u64,

    /// `unit_price * quantity`
    pub line_total: u64,

    /// The date and time the line was committed
    pub created_at: String,
}

impl TryFrom<BasketLine> for BasketLineResponse {
    type Error = LineTotalOverflow;

    fn try_from(line: BasketLine) -> Result<Self, Self::Error> {
        let line_total = line.line_total().ok_or(LineTotalOverflow {
            line: line.uuid.into(),
        })?;

        Ok(Self {
            line_total,
            uuid: line.uuid.into(),
            product_uuid: line.product_uuid.into(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            created_at: line.created_at.to_string(),
        })
    }
}

/// Get Basket Handler
///
/// Returns a basket with its committed lines.
#[endpoint(
    tags("baskets"),
    summary = "Get Basket",
    responses(
        (status_code = StatusCode::OK, description = "Basket found"),
        (status_code = StatusCode::NOT_FOUND, description = "Basket not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
    ),
)]
pub(crate) async fn handler(
    basket: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<BasketResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let basket = state
        .app
        .baskets
        .get_basket(basket.into_inner().into())
        .await
        .map_err(into_status_error)?;

    let response = BasketResponse::try_from(basket).or_500("failed to render basket")?;

    Ok(Json(response))
}
