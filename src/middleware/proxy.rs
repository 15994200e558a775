//! API Gateway `{proxy+}` integration.
//!
//! The gateway forwards `/<stage>/<base>/seed-many` with a `proxy` path
//! parameter of `seed-many`. The Router only knows the bare route, so the
//! request path is replaced by `/{proxy}` (query string kept).

use axum::http::Uri;
use lambda_http::{Request, RequestExt};

pub fn rewrite_proxy_path(mut req: Request) -> Request {
    let Some(proxy) = req
        .path_parameters_ref()
        .and_then(|params| params.first("proxy"))
        .map(|p| p.trim_start_matches('/').to_string())
    else {
        return req;
    };

    let path_and_query = match req.uri().query() {
        Some(query) => format!("/{proxy}?{query}"),
        None => format!("/{proxy}"),
    };

    let mut parts = req.uri().clone().into_parts();
    match path_and_query.parse() {
        Ok(pq) => parts.path_and_query = Some(pq),
        Err(e) => {
            tracing::warn!(%proxy, error = %e, "proxy path is not a valid uri; keeping original");
            return req;
        }
    }

    match Uri::from_parts(parts) {
        Ok(uri) => *req.uri_mut() = uri,
        Err(e) => tracing::warn!(%proxy, error = %e, "cannot rebuild uri; keeping original"),
    }

    req
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn request(uri: &str, proxy: Option<&str>) -> Request {
        let mut req = Request::default();
        *req.uri_mut() = uri.parse().unwrap();
        match proxy {
            Some(p) => req.with_path_parameters(HashMap::from([(
                "proxy".to_string(),
                p.to_string(),
            )])),
            None => req,
        }
    }

    #[test]
    fn path_is_replaced_by_proxy_parameter() {
        let req = rewrite_proxy_path(request(
            "https://api.example.com/prod/modules/seed-many",
            Some("seed-many"),
        ));
        assert_eq!(req.uri().path(), "/seed-many");
        assert_eq!(req.uri().host(), Some("api.example.com"));
    }

    #[test]
    fn query_string_is_kept() {
        let req = rewrite_proxy_path(request(
            "/prod/seed-one-byrandid?debug=1",
            Some("/seed-one-byrandid"),
        ));
        assert_eq!(req.uri().path(), "/seed-one-byrandid");
        assert_eq!(req.uri().query(), Some("debug=1"));
    }

    #[test]
    fn request_without_proxy_parameter_is_untouched() {
        let req = rewrite_proxy_path(request("/seed-many", None));
        assert_eq!(req.uri().path(), "/seed-many");
    }
}
