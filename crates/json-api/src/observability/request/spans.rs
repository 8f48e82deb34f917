//! HTTP span naming.
//!
//! Span names and metric labels use the route template rather than the raw
//! path, so `/baskets/<uuid>/checkout` is reported as
//! `/baskets/{basket}/checkout` and label cardinality stays bounded.

use uuid::Uuid;

#[derive(Debug, Clone)]
pub(super) struct RequestSpanName {
    pub(super) otel_path: String,
    pub(super) otel_span_name: String,
}

pub(super) fn request_span_name(method: &str, path: &str) -> RequestSpanName {
    let otel_path = route_template(path);
    let otel_span_name = format!("{method} {otel_path}");

    RequestSpanName {
        otel_path,
        otel_span_name,
    }
}

fn route_template(path: &str) -> String {
    let mut template = String::new();
    let mut previous = "";

    for segment in path.split('/').filter(|segment| !segment.is_empty()) {
        template.push('/');

        if Uuid::parse_str(segment).is_ok() {
            template.push_str(parameter_for(previous));
        } else {
            template.push_str(segment);
        }

        previous = segment;
    }

    if template.is_empty() {
        template.push('/');
    }

    template
}

fn parameter_for(collection: &str) -> &'static str {
    match collection {
        "products" => "{product}",
        "baskets" => "{basket}",
        _ => "{uuid}",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_become_route_parameters() {
        let basket = Uuid::now_v7();
        let product = Uuid::now_v7();

        assert_eq!(
            route_template(&format!("/baskets/{basket}/checkout")),
            "/baskets/{basket}/checkout"
        );
        assert_eq!(
            route_template(&format!("/products/{product}/restock")),
            "/products/{product}/restock"
        );
    }

    #[test]
    fn static_paths_are_unchanged() {
        assert_eq!(route_template("/"), "/");
        assert_eq!(route_template("/products"), "/products");
        assert_eq!(route_template("/products/"), "/products");
    }

    #[test]
    fn span_name_prefixes_the_method() {
        let names = request_span_name("POST", &format!("/baskets/{}/checkout", Uuid::now_v7()));

        assert_eq!(names.otel_span_name, "POST /baskets/{basket}/checkout");
    }
}
