use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::{
    auth::CurrentUser,
    db::reading::{
        add_to_reading, complete_reading, get_completed, get_history, get_reading,
        remove_from_reading, update_progress,
    },
    error::Error,
    extract::{JsonBody, PathParam},
    model::{CompletedReading, ReadingHistoryEntry, ReadingTask},
    state::SharedAppState,
};

#[derive(Deserialize, Debug)]
pub struct AddReadingRequest {
    #[serde(rename = "mangaId")]
    pub manga_id: i64,
}

/// Chapters are unsigned, so a negative `capitulo` fails at deserialization.
#[derive(Deserialize, Debug)]
pub struct ProgressRequest {
    pub capitulo: u32,
}

#[derive(Serialize, Deserialize)]
pub struct ReadingResponse<T> {
    pub message: String,
    pub manga: T,
}

#[tracing::instrument(name = "[GET] leitura/em-leitura", skip_all, fields(user_id = user.id))]
pub async fn index(
    State(app_state): State<SharedAppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<ReadingTask>>, Error> {
    let result = get_reading(&app_state.db, user.id).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[POST] leitura/adicionar", skip_all, fields(user_id = user.id, manga_id = request.manga_id))]
pub async fn store(
    State(app_state): State<SharedAppState>,
    CurrentUser(user): CurrentUser,
    JsonBody(request): JsonBody<AddReadingRequest>,
) -> Result<(StatusCode, Json<ReadingResponse<ReadingTask>>), Error> {
    let task = add_to_reading(&app_state.db, user.id, request.manga_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(ReadingResponse {
            message: "Manga added to the reading list".to_string(),
            manga: task,
        }),
    ))
}

#[tracing::instrument(name = "[PUT] leitura/progresso/{id}", skip_all, fields(user_id = user.id, manga_id))]
pub async fn progress(
    State(app_state): State<SharedAppState>,
    CurrentUser(user): CurrentUser,
    PathParam(manga_id): PathParam<i64>,
    JsonBody(request): JsonBody<ProgressRequest>,
) -> Result<Json<ReadingResponse<ReadingTask>>, Error> {
    tracing::Span::current().record("manga_id", manga_id);

    let task = update_progress(&app_state.db, user.id, manga_id, request.capitulo).await?;

    Ok(Json(ReadingResponse {
        message: "Reading progress updated".to_string(),
        manga: task,
    }))
}

#[tracing::instrument(name = "[POST] leitura/concluir/{id}", skip_all, fields(user_id = user.id, manga_id))]
pub async fn complete(
    State(app_state): State<SharedAppState>,
    CurrentUser(user): CurrentUser,
    PathParam(manga_id): PathParam<i64>,
) -> Result<Json<ReadingResponse<CompletedReading>>, Error> {
    tracing::Span::current().record("manga_id", manga_id);

    let completed = complete_reading(&app_state.db, user.id, manga_id).await?;

    Ok(Json(ReadingResponse {
        message: "Manga marked as read".to_string(),
        manga: completed,
    }))
}

#[tracing::instrument(name = "[DELETE] leitura/remover/{id}", skip_all, fields(user_id = user.id, manga_id))]
pub async fn destroy(
    State(app_state): State<SharedAppState>,
    CurrentUser(user): CurrentUser,
    PathParam(manga_id): PathParam<i64>,
) -> Result<Json<ReadingResponse<ReadingTask>>, Error> {
    tracing::Span::current().record("manga_id", manga_id);

    let removed = remove_from_reading(&app_state.db, user.id, manga_id).await?;

    Ok(Json(ReadingResponse {
        message: "Manga removed from the reading list".to_string(),
        manga: removed,
    }))
}

#[tracing::instrument(name = "[GET] leitura/lidos", skip_all, fields(user_id = user.id))]
pub async fn completed(
    State(app_state): State<SharedAppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<CompletedReading>>, Error> {
    let result = get_completed(&app_state.db, user.id).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[GET] leitura/historico", skip_all, fields(user_id = user.id))]
pub async fn history(
    State(app_state): State<SharedAppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<ReadingHistoryEntry>>, Error> {
    let result = get_history(&app_state.db, user.id).await?;

    Ok(Json(result))
}
