//! Create Basket Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::domain::baskets::models::{BasketUuid, NewBasket};

use crate::{baskets::errors::into_status_error, extensions::*, state::State};

/// Create Basket Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateBasketRequest {
    /// Client-chosen id; generated when omitted
    pub uuid: Option<Uuid>,
    pub customer_uuid: Uuid,
}

impl From<CreateBasketRequest> for NewBasket {
    fn from(request: CreateBasketRequest) -> Self {
        NewBasket {
            uuid: request.uuid.map_or_else(BasketUuid::new, Into::into),
            customer_uuid: request.customer_uuid.into(),
        }
    }
}

/// Basket Created Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct BasketCreatedResponse {
    /// Created basket UUID
    pub uuid: Uuid,
}

/// Create Basket Handler
#[endpoint(
    tags("baskets"),
    summary = "Create Basket",
    responses(
        (status_code = StatusCode::CREATED, description = "Basket created"),
        (status_code = StatusCode::CONFLICT, description = "Basket already exists"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CreateBasketRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<BasketCreatedResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let uuid = state
        .app
        .baskets
        .create_basket(json.into_inner().into())
        .await
        .map_err(into_status_error)?
        .uuid;

    res.add_header(LOCATION, format!("/baskets/{uuid}"), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(BasketCreatedResponse { uuid: uuid.into() }))
}
