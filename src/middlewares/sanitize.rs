use axum::{
    body::Body,
    extract::Request,
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::error::Error;

pub const JSON_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Removes `<` and `>` and surrounding whitespace.
pub fn sanitize_str(value: &str) -> String {
    value.replace(['<', '>'], "").trim().to_string()
}

/// Applies [`sanitize_str`] to every string inside `value`.
pub fn sanitize_value(value: &mut Value) {
    match value {
        Value::String(text) => *text = sanitize_str(text),
        Value::Array(items) => items.iter_mut().for_each(sanitize_value),
        Value::Object(fields) => fields.values_mut().for_each(sanitize_value),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

fn is_json(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"))
}

/// Rewrites JSON request bodies through [`sanitize_value`]. Bodies that do
/// not parse are forwarded untouched for the extractor to reject.
pub async fn sanitize_middleware(req: Request, next: Next) -> Result<Response, Error> {
    if !is_json(&req) {
        return Ok(next.run(req).await);
    }

    let (mut parts, body) = req.into_parts();
    let bytes = match axum::body::to_bytes(body, JSON_BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(_) => {
            return Ok(StatusCode::PAYLOAD_TOO_LARGE.into_response());
        }
    };

    let body = match serde_json::from_slice::<Value>(&bytes) {
        Ok(mut value) => {
            sanitize_value(&mut value);
            parts.headers.remove(header::CONTENT_LENGTH);
            let sanitized = serde_json::to_vec(&value)
                .map_err(|e| Error::Other(anyhow::Error::new(e).context("re-encode body")))?;
            Body::from(sanitized)
        }
        Err(_) => Body::from(bytes),
    };

    Ok(next.run(Request::from_parts(parts, body)).await)
}
