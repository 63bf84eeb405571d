use axum::{Json, body::Bytes, extract::State};
use serde::{Deserialize, Serialize};

use crate::{
    auth::{MaybeUser, error::AuthError},
    db::lending::{get_lending_status, return_manga as release_manga, use_manga as take_manga},
    error::Error,
    extract::PathParam,
    model::MangaLending,
    state::SharedAppState,
};

#[derive(Deserialize, Default)]
struct ActingUserBody {
    #[serde(rename = "userId")]
    user_id: Option<i64>,
}

#[derive(Serialize, Deserialize)]
pub struct LendingResponse {
    pub message: String,
    pub status: MangaLending,
}

/// Resolves who is taking or returning the manga. The token's user wins;
/// a `userId` in the body is only honoured while auth is not enforced.
fn acting_user(app_state: &SharedAppState, user: MaybeUser, body: &Bytes) -> Result<i64, Error> {
    if let MaybeUser(Some(user)) = user {
        return Ok(user.id);
    }

    if app_state.config.application.require_auth {
        return Err(Error::Auth(AuthError::Unauthenticated));
    }

    let body: ActingUserBody = if body.is_empty() {
        ActingUserBody::default()
    } else {
        serde_json::from_slice(body)
            .map_err(|error| Error::BadRequest(format!("Invalid request body: {error}")))?
    };

    body.user_id
        .ok_or(Error::Auth(AuthError::Unauthenticated))
}

#[tracing::instrument(name = "[GET] manga/{id}/status", skip_all, fields(manga_id))]
pub async fn status(
    State(app_state): State<SharedAppState>,
    PathParam(manga_id): PathParam<i64>,
) -> Result<Json<MangaLending>, Error> {
    tracing::Span::current().record("manga_id", manga_id);

    let status = get_lending_status(&app_state.db, manga_id).await?;

    Ok(Json(status))
}

#[tracing::instrument(name = "[POST] manga/{id}/use", skip_all, fields(manga_id, user_id))]
pub async fn use_manga(
    State(app_state): State<SharedAppState>,
    PathParam(manga_id): PathParam<i64>,
    user: MaybeUser,
    body: Bytes,
) -> Result<Json<LendingResponse>, Error> {
    let user_id = acting_user(&app_state, user, &body)?;
    tracing::Span::current()
        .record("manga_id", manga_id)
        .record("user_id", user_id);

    let status = take_manga(&app_state.db, manga_id, user_id).await?;

    Ok(Json(LendingResponse {
        message: "Manga marked as in use".to_string(),
        status,
    }))
}

#[tracing::instrument(name = "[POST] manga/{id}/return", skip_all, fields(manga_id, user_id))]
pub async fn return_manga(
    State(app_state): State<SharedAppState>,
    PathParam(manga_id): PathParam<i64>,
    user: MaybeUser,
    body: Bytes,
) -> Result<Json<LendingResponse>, Error> {
    let user_id = acting_user(&app_state, user, &body)?;
    tracing::Span::current()
        .record("manga_id", manga_id)
        .record("user_id", user_id);

    let status = release_manga(&app_state.db, manga_id, user_id).await?;

    Ok(Json(LendingResponse {
        message: "Manga returned and available again".to_string(),
        status,
    }))
}
