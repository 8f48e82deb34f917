//! Errors

use salvo::http::StatusError;
use tracing::error;

use storefront_app::domain::baskets::BasketsServiceError;

pub(crate) fn into_status_error(error: BasketsServiceError) -> StatusError {
    match error {
        BasketsServiceError::AlreadyExists => {
            StatusError::conflict().brief("Basket already exists")
        }
        BasketsServiceError::InvalidReference
        | BasketsServiceError::MissingRequiredData
        | BasketsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid basket payload")
        }
        BasketsServiceError::Sql(source) => {
            error!("basket storage error: {source}");

            StatusError::internal_server_error()
        }
        BasketsServiceError::NotFound => StatusError::not_found().brief("Basket not found"),
    }
}
