//! Parent trace context extraction from W3C trace headers.

use opentelemetry::{Context, global, propagation::Extractor, trace::TraceContextExt as _};
use salvo::http::HeaderMap;

const TRACE_HEADERS: [&str; 2] = ["traceparent", "tracestate"];

/// The caller's span context, if it sent a valid `traceparent`.
pub(super) fn extract_parent_context(headers: &HeaderMap) -> Option<Context> {
    let trace_headers = TraceHeaders::from_headers(headers);

    if trace_headers.is_empty() {
        return None;
    }

    global::get_text_map_propagator(|propagator| {
        // A fresh base context keeps requests without a valid parent from
        // joining whatever span happens to be active in-process.
        let context = propagator.extract_with_context(&Context::new(), &trace_headers);

        context
            .span()
            .span_context()
            .is_valid()
            .then(|| context.clone())
    })
}

#[derive(Debug, Default)]
struct TraceHeaders<'a> {
    values: Vec<(&'static str, &'a str)>,
}

impl<'a> TraceHeaders<'a> {
    fn from_headers(headers: &'a HeaderMap) -> Self {
        let values = TRACE_HEADERS
            .into_iter()
            .filter_map(|name| {
                let value = headers.get(name)?.to_str().ok()?;

                Some((name, value))
            })
            .collect();

        Self { values }
    }

    fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Extractor for TraceHeaders<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| *value)
    }

    fn keys(&self) -> Vec<&str> {
        self.values.iter().map(|(name, _)| *name).collect()
    }
}
