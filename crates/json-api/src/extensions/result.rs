//! Result helper extensions for HTTP handlers.

use std::fmt::Display;

use salvo::prelude::StatusError;
use tracing::error;

/// Collapse an unexpected failure into a 500, keeping the cause in the logs
/// and out of the response.
pub(crate) trait ResultExt<T> {
    fn or_500(self, context: &'static str) -> Result<T, StatusError>;
}

impl<T, E: Display> ResultExt<T> for Result<T, E> {
    fn or_500(self, context: &'static str) -> Result<T, StatusError> {
        self.map_err(|cause| {
            error!(context, %cause, "unexpected handler failure");

            StatusError::internal_server_error()
        })
    }
}

#[cfg(test)]
mod tests {
    use salvo::http::StatusCode;

    use super::*;

    #[test]
    fn failures_become_opaque_500s() {
        let result: Result<(), String> = Err("connection reset by peer".to_owned());

        let error = result.or_500("failed to load basket").err();

        assert_eq!(error.as_ref().map(|e| e.code), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(
            error.is_some_and(|e| !e.brief.contains("connection reset")),
            "cause should not leak into the response"
        );
    }
}
