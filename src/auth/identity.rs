use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{error::Error, model::UserProfile};

use super::error::AuthError;

/// The authenticated caller. Rejects with 401 when the auth middleware did
/// not attach a user.
pub struct CurrentUser(pub Arc<UserProfile>);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Arc<UserProfile>>()
            .cloned()
            .map(CurrentUser)
            .ok_or(Error::Auth(AuthError::Unauthenticated))
    }
}

/// The caller if a valid token was presented. Only differs from
/// [`CurrentUser`] when auth enforcement is switched off.
pub struct MaybeUser(pub Option<Arc<UserProfile>>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(parts.extensions.get::<Arc<UserProfile>>().cloned()))
    }
}
