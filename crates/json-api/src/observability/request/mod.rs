//! Per-request span, request ID and access logging middleware.

mod parent_context;
mod request_ids;
mod spans;

use std::time::{Duration, Instant};

use salvo::{
    Request, handler,
    http::StatusCode,
    prelude::{Depot, FlowCtrl, Response},
};
use tracing::{Instrument as _, Span, error, info, warn};
use tracing_opentelemetry::OpenTelemetrySpanExt as _;

use super::{metrics, settings};

const REQUEST_ID_DEPOT_KEY: &str = "request_id";

/// Health checks and scrapes that would drown out real traffic.
const UNOBSERVED_PATHS: [&str; 2] = ["/metrics", "/healthcheck"];

#[handler]
pub(crate) async fn request_logging(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    if UNOBSERVED_PATHS.contains(&req.uri().path()) {
        ctrl.call_next(req, depot, res).await;
        return;
    }

    let started = Instant::now();
    let _in_flight = metrics::InFlightRequestGuard::track();

    let request_id =
        request_ids::resolve_request_id(req.header::<String>(request_ids::REQUEST_ID_HEADER));

    depot.insert(REQUEST_ID_DEPOT_KEY, request_id.clone());
    request_ids::set_request_id_header(res, &request_id);

    let access = AccessLog {
        request_id,
        method: req.method().to_string(),
        path: req.uri().path().to_owned(),
    };

    let names = spans::request_span_name(&access.method, &access.path);

    let span = tracing::info_span!(
        parent: None,
        "http.request",
        otel.name = %names.otel_span_name,
        otel.kind = "server",
        request_id = %access.request_id,
        method = %access.method,
        route = %names.otel_path,
        path = %access.path,
        remote_addr = %req.remote_addr(),
        status = tracing::field::Empty,
        duration_ms = tracing::field::Empty
    );

    if settings::otel_parent_propagation_enabled()
        && let Some(parent) = parent_context::extract_parent_context(req.headers())
        && let Err(source) = span.set_parent(parent)
    {
        warn!("failed to attach parent context to request span: {source}");
    }

    ctrl.call_next(req, depot, res)
        .instrument(span.clone())
        .await;

    let elapsed = started.elapsed();
    let status = request_ids::response_status_or_ok(res.status_code);

    metrics::observe_request(&access.method, &names.otel_path, status.as_u16(), elapsed);

    access.finish(&span, status, elapsed);
}

#[derive(Debug)]
struct AccessLog {
    request_id: String,
    method: String,
    path: String,
}

impl AccessLog {
    fn finish(&self, span: &Span, status: StatusCode, elapsed: Duration) {
        let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let threshold_ms = settings::slow_request_threshold_ms();
        let status = status.as_u16();

        span.record("status", status);
        span.record("duration_ms", duration_ms);

        let Self {
            request_id,
            method,
            path,
        } = self;

        span.in_scope(|| {
            info!(status, duration_ms, "request.completed");

            match status {
                500.. => error!(status, %method, %path, %request_id, "server error response"),
                400..500 => warn!(status, %method, %path, %request_id, "client error response"),
                _ => {}
            }

            if duration_ms > threshold_ms {
                warn!(
                    %method,
                    %path,
                    %request_id,
                    duration_ms,
                    threshold_ms,
                    "slow request detected"
                );
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use salvo::{Router, Service, test::TestClient};

    use super::*;

    #[handler]
    async fn echo_request_id(depot: &mut Depot, res: &mut Response) {
        let request_id = depot
            .get::<String>(REQUEST_ID_DEPOT_KEY)
            .cloned()
            .unwrap_or_default();

        res.render(request_id);
    }

    #[handler]
    async fn conflict(res: &mut Response) {
        res.status_code(StatusCode::CONFLICT);
    }

    fn service() -> Service {
        Service::new(
            Router::new()
                .hoop(request_logging)
                .push(Router::with_path("echo").get(echo_request_id))
                .push(Router::with_path("healthcheck").get(echo_request_id))
                .push(Router::with_path("conflict").get(conflict)),
        )
    }

    #[tokio::test]
    async fn caller_request_id_is_echoed() {
        let res = TestClient::get("http://example.com/echo")
            .add_header(request_ids::REQUEST_ID_HEADER, "order-7", true)
            .send(&service())
            .await;

        let header = res
            .headers()
            .get(request_ids::REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok());

        assert_eq!(header, Some("order-7"));
    }

    #[tokio::test]
    async fn handler_status_passes_through() {
        let res = TestClient::get("http://example.com/conflict")
            .send(&service())
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));
        assert!(
            res.headers().contains_key(request_ids::REQUEST_ID_HEADER),
            "expected a generated request id"
        );
    }

    #[tokio::test]
    async fn healthchecks_are_not_observed() {
        let res = TestClient::get("http://example.com/healthcheck")
            .send(&service())
            .await;

        assert!(
            !res.headers().contains_key(request_ids::REQUEST_ID_HEADER),
            "healthchecks should bypass request logging"
        );
    }
}
