use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};

use crate::{error::Error, state::SharedAppState};

/// Rate-limit key of the caller, attached for handlers that reset it.
#[derive(Clone, Debug)]
pub struct ClientKey(pub String);

/// First `X-Forwarded-For` hop, else the peer address.
pub fn client_key(req: &Request) -> String {
    let forwarded = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    if let Some(forwarded) = forwarded {
        return forwarded.to_string();
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(address)| address.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[tracing::instrument(name = "[MIDDLEWARE] login rate limit", skip_all, fields(client))]
pub async fn login_rate_limit_middleware(
    State(app_state): State<SharedAppState>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, Error> {
    let client = client_key(&req);
    tracing::Span::current().record("client", tracing::field::display(&client));

    if let Err(retry_after) = app_state.login_limiter.hit(&client) {
        tracing::warn!(retry_after = ?retry_after, "Too many login attempts");

        return Err(Error::RateLimited(retry_after));
    }

    req.extensions_mut().insert(ClientKey(client));

    Ok(next.run(req).await)
}
