use axum::{
    body::Body,
    extract::{OriginalUri, Request, State},
    http::{HeaderValue, Method, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::state::SharedAppState;

pub const CACHE_STATUS_HEADER: &str = "x-cache";

const CACHEABLE_BODY_LIMIT: usize = 8 * 1024 * 1024;

/// Cache key: the path and query as the client sent them, before any
/// nesting strips the prefix.
fn cache_key(req: &Request) -> String {
    let uri = req
        .extensions()
        .get::<OriginalUri>()
        .map(|OriginalUri(uri)| uri)
        .unwrap_or(req.uri());

    uri.path_and_query()
        .map(|path_and_query| path_and_query.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string())
}

#[tracing::instrument(name = "[MIDDLEWARE] response cache", skip_all, fields(key))]
pub async fn cache_middleware(
    State(app_state): State<SharedAppState>,
    req: Request,
    next: Next,
) -> Response {
    if !app_state.config.cache.enabled || req.method() != Method::GET {
        return next.run(req).await;
    }

    let key = cache_key(&req);
    tracing::Span::current().record("key", tracing::field::display(&key));

    if let Some(body) = app_state.cache.get(&key) {
        tracing::debug!("Serving cached response");

        return (
            [
                (
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                ),
                (
                    header::HeaderName::from_static(CACHE_STATUS_HEADER),
                    HeaderValue::from_static("hit"),
                ),
            ],
            body,
        )
            .into_response();
    }

    let response = next.run(req).await;
    if response.status() != StatusCode::OK {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    match axum::body::to_bytes(body, CACHEABLE_BODY_LIMIT).await {
        Ok(bytes) => {
            app_state.cache.insert(key, bytes.clone());
            parts.headers.insert(
                header::HeaderName::from_static(CACHE_STATUS_HEADER),
                HeaderValue::from_static("miss"),
            );

            Response::from_parts(parts, Body::from(bytes))
        }
        Err(error) => {
            tracing::error!(err.msg = %error, "Failed to buffer response for caching");

            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
