//! Checkout Handler

use std::{
    collections::{BTreeMap, btree_map::Entry},
    sync::Arc,
    time::Instant,
};

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use storefront_app::domain::{
    checkout::{
        CheckoutError,
        models::{CheckoutRequest, Settlement},
    },
    products::models::ProductUuid,
};

use crate::{
    baskets::get::{BasketLineResponse, LineTotalOverflow},
    checkout::errors::CheckoutFailure,
    extensions::*,
    observability::observe_settlement,
    state::State,
};

/// One requested product.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CheckoutLineRequest {
    pub product_uuid: Uuid,
    pub quantity: u32,
}

/// Checkout Request
///
/// Each product may appear at most once.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CheckoutRequestBody {
    pub lines: Vec<CheckoutLineRequest>,
}

impl TryFrom<CheckoutRequestBody> for CheckoutRequest {
    type Error = CheckoutFailure;

    fn try_from(body: CheckoutRequestBody) -> Result<Self, Self::Error> {
        let mut requested = BTreeMap::new();

        for line in body.lines {
            match requested.entry(ProductUuid::from(line.product_uuid)) {
                Entry::Vacant(entry) => {
                    entry.insert(line.quantity);
                }
                Entry::Occupied(_) => {
                    return Err(CheckoutFailure::duplicate_product(line.product_uuid));
                }
            }
        }

        Ok(CheckoutRequest::new(requested)?)
    }
}

/// Settlement Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SettlementResponse {
    /// The settled basket
    pub basket_uuid: Uuid,

    /// Lines committed by this settlement, in product order
    pub lines: Vec<BasketLineResponse>,

    /// Sum of this settlement's lines
    pub total: u64,

    /// Difference from original prices across this settlement
    pub savings: u64,

    /// Basket total after this settlement
    pub basket_total: u64,
}

impl TryFrom<Settlement> for SettlementResponse {
    type Error = LineTotalOverflow;

    fn try_from(settlement: Settlement) -> Result<Self, Self::Error> {
        Ok(Self {
            basket_uuid: settlement.basket.into(),
            lines: settlement
                .lines
                .into_iter()
                .map(BasketLineResponse::try_from)
                .collect::<Result<_, _>>()?,
            total: settlement.total,
            savings: settlement.savings,
            basket_total: settlement.basket_total,
        })
    }
}

/// Checkout Handler
///
/// Settles the requested quantities against the basket, all or nothing.
#[endpoint(tags("baskets"), summary = "Checkout Basket")]
#[tracing::instrument(
    name = "baskets.checkout",
    skip(basket, json, depot),
    fields(
        basket_uuid = tracing::field::Empty,
        lines = tracing::field::Empty,
        outcome = tracing::field::Empty
    )
)]
pub(crate) async fn handler(
    basket: PathParam<Uuid>,
    json: JsonBody<CheckoutRequestBody>,
    depot: &mut Depot,
) -> Result<Json<SettlementResponse>, CheckoutFailure> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let basket = basket.into_inner();

    let span = tracing::Span::current();

    span.record("basket_uuid", tracing::field::display(basket));

    let request = match CheckoutRequest::try_from(json.into_inner()) {
        Ok(request) => request,
        Err(failure) => {
            span.record("outcome", "invalid_request");
            observe_settlement("invalid_request", None);

            return Err(failure);
        }
    };

    span.record("lines", request.len());

    let started = Instant::now();
    let result = state.app.checkout.settle(basket.into(), request).await;
    let elapsed = started.elapsed();

    match result {
        Ok(settlement) => {
            span.record("outcome", "settled");
            observe_settlement("settled", Some(elapsed));

            info!(
                basket_uuid = %basket,
                total = settlement.total,
                basket_total = settlement.basket_total,
                "checkout settled"
            );

            let response =
                SettlementResponse::try_from(settlement).or_500("failed to render settlement")?;

            Ok(Json(response))
        }
        Err(error) => {
            let outcome = error.outcome();

            span.record("outcome", outcome);
            observe_settlement(outcome, Some(elapsed));

            if error.is_refusal() {
                info!(basket_uuid = %basket, outcome, "checkout refused: {error}");
            } else if matches!(error, CheckoutError::Unavailable(_)) {
                warn!(basket_uuid = %basket, outcome, "checkout unavailable: {error}");
            }

            Err(error.into())
        }
    }
}
