use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::{
    auth::{decode_jwt, error::AuthError},
    db::user::get_user_by_id_optional,
    error::Error,
    model::UserProfile,
    state::SharedAppState,
};

fn bearer_token(headers: &HeaderMap) -> Result<&str, Error> {
    let auth_header = match headers.get(axum::http::header::AUTHORIZATION) {
        Some(header) => header
            .to_str()
            .map_err(|_| Error::Auth(AuthError::TokenMissing))?,
        None => {
            return Err(Error::Auth(AuthError::TokenMissing));
        }
    };

    let mut header = auth_header.split_whitespace();
    let (bearer_option, token_option) = (header.next(), header.next());

    let bearer = match bearer_option {
        Some(value) => value.to_lowercase(),
        None => {
            return Err(Error::Auth(AuthError::TokenMissing));
        }
    };

    if bearer != *"bearer" {
        return Err(Error::Auth(AuthError::TokenMissing));
    }

    match token_option {
        Some(value) => Ok(value),
        None => Err(Error::Auth(AuthError::TokenMissing)),
    }
}

async fn authenticate(app_state: &SharedAppState, headers: &HeaderMap) -> Result<UserProfile, Error> {
    let token = bearer_token(headers)?;
    let token_data = decode_jwt(token, &app_state.config.jwt)?;

    match get_user_by_id_optional(&app_state.db, token_data.claims.id).await? {
        Some(user) => Ok(UserProfile::from(&user)),
        None => Err(Error::Auth(AuthError::Unauthenticated)),
    }
}

/// Attaches the token's user to the request. With `require_auth` off,
/// requests without a usable token continue anonymously.
#[tracing::instrument(name = "[MIDDLEWARE] jwt auth", skip_all)]
pub async fn jwt_auth_middleware(
    State(app_state): State<SharedAppState>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, Error> {
    match authenticate(&app_state, req.headers()).await {
        Ok(user) => {
            req.extensions_mut().insert(Arc::new(user));
        }
        Err(Error::Auth(error)) if !app_state.config.application.require_auth => {
            tracing::debug!(err.msg = %error, "Continuing without identity");
        }
        Err(error) => return Err(error),
    }

    Ok(next.run(req).await)
}
