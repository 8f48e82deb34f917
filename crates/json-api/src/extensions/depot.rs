//! Depot helper extensions.

use std::any::{Any, type_name};

use salvo::prelude::{Depot, StatusError};
use tracing::error;

/// Typed depot access for handlers.
pub(crate) trait DepotExt {
    /// Fetch a value injected by a hoop. A missing value is a wiring bug, so
    /// the request fails with a 500.
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>().map_err(|_missing| {
            error!(type_name = type_name::<T>(), "depot value missing");

            StatusError::internal_server_error()
        })
    }
}
