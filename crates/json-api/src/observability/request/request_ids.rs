//! Request ID resolution and response header helpers.

use salvo::{
    http::{StatusCode, header::HeaderValue},
    prelude::Response,
};
use tracing::warn;
use uuid::Uuid;

pub(super) const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_REQUEST_ID_LEN: usize = 128;

/// Reuse the caller's request id when it is short printable ASCII, otherwise
/// mint a fresh one.
pub(super) fn resolve_request_id(header_value: Option<String>) -> String {
    header_value
        .map(|value| value.trim().to_owned())
        .filter(|value| is_acceptable(value))
        .unwrap_or_else(|| Uuid::now_v7().to_string())
}

fn is_acceptable(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_REQUEST_ID_LEN
        && value.bytes().all(|byte| byte.is_ascii_graphic())
}

pub(super) fn set_request_id_header(res: &mut Response, request_id: &str) {
    match HeaderValue::from_str(request_id) {
        Ok(value) => {
            res.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        Err(source) => warn!(request_id, "could not encode request id header: {source}"),
    }
}

pub(super) fn response_status_or_ok(status_code: Option<StatusCode>) -> StatusCode {
    status_code.unwrap_or(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_ids_are_kept_when_printable() {
        let id = resolve_request_id(Some("  checkout-42  ".to_owned()));

        assert_eq!(id, "checkout-42");
    }

    #[test]
    fn unusable_caller_ids_are_replaced() {
        for supplied in [
            None,
            Some(String::new()),
            Some("has spaces inside".to_owned()),
            Some("é".to_owned()),
            Some("x".repeat(MAX_REQUEST_ID_LEN + 1)),
        ] {
            let id = resolve_request_id(supplied.clone());

            assert!(
                Uuid::parse_str(&id).is_ok(),
                "expected a generated uuid for {supplied:?}, got {id}"
            );
        }
    }
}
