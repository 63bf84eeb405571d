use axum::{
    body::Body,
    http::{self, Request, StatusCode},
};
use manga_library::{
    controllers::reading::ReadingResponse,
    model::{CompletedReading, ReadingHistoryEntry, ReadingTask},
};
use serde_json::json;

use crate::{AppStateTest, body_json, json_request};

fn authorized(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

async fn add(test_state: &AppStateTest, token: &str, manga_id: i64) -> StatusCode {
    let request = json_request(
        "POST",
        "/api/leitura/adicionar",
        Some(token),
        &json!({ "mangaId": manga_id }),
    );

    test_state.generate_response(request).await.status()
}

#[tokio::test]
async fn adds_manga_to_reading_list() {
    let test_state = AppStateTest::new().await;
    let (user, token) = test_state.generate_jwt_with_user().await;
    let manga = test_state.insert_fake_manga().await;

    let request = json_request(
        "POST",
        "/api/leitura/adicionar",
        Some(&token),
        &json!({ "mangaId": manga.id }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: ReadingResponse<ReadingTask> = body_json(response).await;
    assert_eq!(body.manga.manga_id, manga.id);
    assert_eq!(body.manga.user_id, user.id);
    assert_eq!(body.manga.last_chapter, 0);

    let response = test_state
        .generate_response(authorized("GET", "/api/leitura/em-leitura", &token))
        .await;
    let reading: Vec<ReadingTask> = body_json(response).await;
    assert_eq!(reading, vec![body.manga]);
}

#[tokio::test]
async fn adding_twice_or_unknown_manga_fails() {
    let test_state = AppStateTest::new().await;
    let (_, token) = test_state.generate_jwt_with_user().await;
    let manga = test_state.insert_fake_manga().await;

    assert_eq!(add(&test_state, &token, manga.id).await, StatusCode::CREATED);
    assert_eq!(add(&test_state, &token, manga.id).await, StatusCode::BAD_REQUEST);
    assert_eq!(add(&test_state, &token, 999).await, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reading_lists_are_scoped_to_the_user() {
    let test_state = AppStateTest::new().await;
    let (_, first_token) = test_state.generate_jwt_with_user().await;
    let (_, second_token) = test_state.generate_jwt_with_user().await;
    let manga = test_state.insert_fake_manga().await;

    assert_eq!(add(&test_state, &first_token, manga.id).await, StatusCode::CREATED);
    assert_eq!(add(&test_state, &second_token, manga.id).await, StatusCode::CREATED);

    let response = test_state
        .generate_response(authorized(
            "DELETE",
            &format!("/api/leitura/remover/{}", manga.id),
            &first_token,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = test_state
        .generate_response(authorized("GET", "/api/leitura/em-leitura", &second_token))
        .await;
    let reading: Vec<ReadingTask> = body_json(response).await;
    assert_eq!(reading.len(), 1);
}

#[tokio::test]
async fn updates_progress() {
    let test_state = AppStateTest::new().await;
    let (_, token) = test_state.generate_jwt_with_user().await;
    let manga = test_state.insert_fake_manga().await;
    add(&test_state, &token, manga.id).await;

    let request = json_request(
        "PUT",
        &format!("/api/leitura/progresso/{}", manga.id),
        Some(&token),
        &json!({ "capitulo": 42 }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: ReadingResponse<ReadingTask> = body_json(response).await;
    assert_eq!(body.manga.last_chapter, 42);
    assert!(body.manga.updated_at.is_some());
}

#[tokio::test]
async fn progress_rejects_negative_chapter_and_unknown_task() {
    let test_state = AppStateTest::new().await;
    let (_, token) = test_state.generate_jwt_with_user().await;
    let manga = test_state.insert_fake_manga().await;
    add(&test_state, &token, manga.id).await;

    let request = json_request(
        "PUT",
        &format!("/api/leitura/progresso/{}", manga.id),
        Some(&token),
        &json!({ "capitulo": -1 }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let request = json_request(
        "PUT",
        "/api/leitura/progresso/999",
        Some(&token),
        &json!({ "capitulo": 1 }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn completing_moves_task_to_completed_and_history() {
    let test_state = AppStateTest::new().await;
    let (_, token) = test_state.generate_jwt_with_user().await;
    let manga = test_state.insert_fake_manga().await;
    add(&test_state, &token, manga.id).await;

    let response = test_state
        .generate_response(authorized(
            "POST",
            &format!("/api/leitura/concluir/{}", manga.id),
            &token,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = test_state
        .generate_response(authorized("GET", "/api/leitura/em-leitura", &token))
        .await;
    let reading: Vec<ReadingTask> = body_json(response).await;
    assert!(reading.is_empty());

    let response = test_state
        .generate_response(authorized("GET", "/api/leitura/lidos", &token))
        .await;
    let completed: Vec<CompletedReading> = body_json(response).await;
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].task.manga_id, manga.id);

    let response = test_state
        .generate_response(authorized("GET", "/api/leitura/historico", &token))
        .await;
    let history: Vec<ReadingHistoryEntry> = body_json(response).await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].completed, completed[0]);
}

#[tokio::test]
async fn completing_or_removing_unknown_task_is_not_found() {
    let test_state = AppStateTest::new().await;
    let (_, token) = test_state.generate_jwt_with_user().await;

    let response = test_state
        .generate_response(authorized("POST", "/api/leitura/concluir/1", &token))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = test_state
        .generate_response(authorized("DELETE", "/api/leitura/remover/1", &token))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reading_routes_require_identity_even_without_enforcement() {
    let test_state = AppStateTest::with_config(|config| {
        config.application.require_auth = false;
    })
    .await;

    let request = Request::builder()
        .uri("/api/leitura/em-leitura")
        .body(Body::empty())
        .unwrap();
    let response = test_state.generate_response(request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
