//! Checkout failure responses.
//!
//! Refusals carry enough detail for the client to correct the whole order in
//! one round trip. An aborted settlement is reported with `state: "unknown"`
//! because stock may already have moved.

use salvo::{
    http::{StatusCode, StatusError},
    oapi::{self, Components, EndpointOutRegister, Operation, ToSchema},
    prelude::{Json, Response},
    writing::Scribe,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::domain::checkout::{CheckoutError, models::Shortfall};

/// A line that could not be covered by stock on hand.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ShortfallResponse {
    pub product_uuid: Uuid,
    pub requested: u32,
    pub available: u64,
}

impl From<Shortfall> for ShortfallResponse {
    fn from(shortfall: Shortfall) -> Self {
        Self {
            product_uuid: shortfall.product.into(),
            requested: shortfall.requested,
            available: shortfall.available,
        }
    }
}

/// Checkout Failure Body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CheckoutFailureBody {
    /// Machine-readable failure code
    pub code: String,

    /// Human-readable description
    pub message: String,

    /// Products the failure refers to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub products: Vec<Uuid>,

    /// Every line that exceeds stock on hand
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shortfalls: Vec<ShortfallResponse>,

    /// Settlement step that was running when it aborted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,

    /// `unknown` when the settlement may or may not have been applied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl CheckoutFailureBody {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_owned(),
            message: message.into(),
            products: Vec::new(),
            shortfalls: Vec::new(),
            stage: None,
            state: None,
        }
    }
}

/// A checkout that did not settle, rendered as a status code and JSON body.
#[derive(Debug)]
pub(crate) struct CheckoutFailure {
    pub(crate) status: StatusCode,
    pub(crate) body: CheckoutFailureBody,
}

impl CheckoutFailure {
    pub(crate) fn duplicate_product(product: Uuid) -> Self {
        let mut body = CheckoutFailureBody::new(
            "duplicate_product",
            format!("product {product} is listed more than once"),
        );

        body.products.push(product);

        Self {
            status: StatusCode::BAD_REQUEST,
            body,
        }
    }
}

impl From<CheckoutError> for CheckoutFailure {
    fn from(error: CheckoutError) -> Self {
        let message = error.to_string();

        let (status, body) = match error {
            CheckoutError::EmptyRequest => (
                StatusCode::BAD_REQUEST,
                CheckoutFailureBody::new("empty_request", message),
            ),
            CheckoutError::ZeroQuantity(product) => {
                let mut body = CheckoutFailureBody::new("zero_quantity", message);

                body.products.push(product.into());

                (StatusCode::BAD_REQUEST, body)
            }
            CheckoutError::BasketNotFound(_) => (
                StatusCode::NOT_FOUND,
                CheckoutFailureBody::new("basket_not_found", message),
            ),
            CheckoutError::UnknownProducts(products) => {
                let mut body = CheckoutFailureBody::new("unknown_products", message);

                body.products = products.into_iter().map(Into::into).collect();

                (StatusCode::UNPROCESSABLE_ENTITY, body)
            }
            CheckoutError::InsufficientStock(shortfalls) => {
                let mut body = CheckoutFailureBody::new("insufficient_stock", message);

                body.shortfalls = shortfalls.into_iter().map(Into::into).collect();

                (StatusCode::CONFLICT, body)
            }
            CheckoutError::PriceOverflow(product) => {
                let mut body = CheckoutFailureBody::new("price_overflow", message);

                body.products.push(product.into());

                (StatusCode::UNPROCESSABLE_ENTITY, body)
            }
            CheckoutError::TotalOverflow(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                CheckoutFailureBody::new("total_overflow", message),
            ),
            CheckoutError::Unavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                CheckoutFailureBody::new(
                    "unavailable",
                    "settlement could not start; nothing was changed",
                ),
            ),
            CheckoutError::SettlementAborted { stage, .. } => {
                let mut body = CheckoutFailureBody::new("settlement_aborted", message);

                body.stage = Some(stage.as_str().to_owned());
                body.state = Some("unknown".to_owned());

                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
        };

        Self { status, body }
    }
}

impl From<StatusError> for CheckoutFailure {
    fn from(error: StatusError) -> Self {
        Self {
            status: error.code,
            body: CheckoutFailureBody::new("internal_error", error.brief),
        }
    }
}

impl Scribe for CheckoutFailure {
    fn render(self, res: &mut Response) {
        res.status_code(self.status);
        res.render(Json(self.body));
    }
}

impl EndpointOutRegister for CheckoutFailure {
    fn register(components: &mut Components, operation: &mut Operation) {
        for (status, description) in [
            (StatusCode::BAD_REQUEST, "Empty, zero-quantity or duplicate lines"),
            (StatusCode::NOT_FOUND, "Basket not found"),
            (StatusCode::CONFLICT, "Insufficient stock; every short line is listed"),
            (StatusCode::UNPROCESSABLE_ENTITY, "Unknown products or amount overflow"),
            (StatusCode::SERVICE_UNAVAILABLE, "Settlement could not start; nothing changed"),
            (StatusCode::INTERNAL_SERVER_ERROR, "Settlement aborted; outcome unknown"),
        ] {
            operation.responses.insert(
                status.as_str(),
                oapi::Response::new(description)
                    .add_content("application/json", CheckoutFailureBody::to_schema(components)),
            );
        }
    }
}
