use axum::{
    body::Body,
    http::{self, Request, StatusCode},
};
use manga_library::{
    controllers::auth::AuthResponse, db::user::get_user_by_email, error::ErrorResponse,
    model::UserProfile,
};
use serde_json::json;

use crate::{AppStateTest, body_json, helper::TEST_PASSWORD, json_request};

#[tokio::test]
async fn register_creates_user_and_returns_token() {
    let test_state = AppStateTest::new().await;

    let request = json_request(
        "POST",
        "/api/auth/register",
        None,
        &json!({ "nome": "Leitora", "email": "leitora@example.com", "senha": "Senha@123" }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: AuthResponse = body_json(response).await;
    assert!(!body.token.is_empty());
    assert_eq!(body.user.email, "leitora@example.com");
    assert_eq!(body.user.name, "Leitora");

    let stored = get_user_by_email(&test_state.state.db, "leitora@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_ne!(stored.password_hash, "Senha@123");
}

#[tokio::test]
async fn register_never_exposes_password_hash() {
    let test_state = AppStateTest::new().await;

    let request = json_request(
        "POST",
        "/api/auth/register",
        None,
        &json!({ "nome": "Leitora", "email": "leitora@example.com", "senha": "Senha@123" }),
    );
    let response = test_state.generate_response(request).await;

    let body: serde_json::Value = body_json(response).await;
    assert!(body["user"].get("senha").is_none());
}

#[tokio::test]
async fn register_rejects_duplicate_email_without_appending() {
    let test_state = AppStateTest::new().await;
    test_state.create_user("repetido@example.com").await;

    let request = json_request(
        "POST",
        "/api/auth/register",
        None,
        &json!({ "nome": "Outro", "email": "repetido@example.com", "senha": "Senha@123" }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let users = test_state.state.db.users.read().await.unwrap().users;
    assert_eq!(users.len(), 1);
}

#[tokio::test]
async fn register_reports_every_invalid_field() {
    let test_state = AppStateTest::new().await;

    let request = json_request(
        "POST",
        "/api/auth/register",
        None,
        &json!({ "nome": "Al", "email": "not-an-email", "senha": "fraca" }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: ErrorResponse = body_json(response).await;
    let fields: Vec<&str> = body.errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, vec!["email", "nome", "senha"]);
}

#[tokio::test]
async fn register_without_body_is_bad_request() {
    let test_state = AppStateTest::new().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/register")
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(Body::empty())
        .unwrap();
    let response = test_state.generate_response(request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_without_json_content_type_is_unsupported() {
    let test_state = AppStateTest::new().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/register")
        .body(Body::from(r#"{"nome":"Leitora"}"#))
        .unwrap();
    let response = test_state.generate_response(request).await;

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn login_returns_token_for_valid_credentials() {
    let test_state = AppStateTest::new().await;
    let user = test_state.create_user("leitor@example.com").await;

    let request = json_request(
        "POST",
        "/api/auth/login",
        None,
        &json!({ "email": "leitor@example.com", "senha": TEST_PASSWORD }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: AuthResponse = body_json(response).await;
    assert_eq!(body.user, UserProfile::from(&user));

    let request = Request::builder()
        .uri("/api/auth/user")
        .header(http::header::AUTHORIZATION, format!("Bearer {}", body.token))
        .body(Body::empty())
        .unwrap();
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_gives_same_answer_for_unknown_email_and_wrong_password() {
    let test_state = AppStateTest::new().await;
    test_state.create_user("leitor@example.com").await;

    let wrong_password = json_request(
        "POST",
        "/api/auth/login",
        None,
        &json!({ "email": "leitor@example.com", "senha": "Errada@123" }),
    );
    let response = test_state.generate_response(wrong_password).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let wrong_password: ErrorResponse = body_json(response).await;

    let unknown_email = json_request(
        "POST",
        "/api/auth/login",
        None,
        &json!({ "email": "ninguem@example.com", "senha": TEST_PASSWORD }),
    );
    let response = test_state.generate_response(unknown_email).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let unknown_email: ErrorResponse = body_json(response).await;

    assert_eq!(wrong_password.message, unknown_email.message);
}

#[tokio::test]
async fn login_requires_both_fields() {
    let test_state = AppStateTest::new().await;

    let request = json_request(
        "POST",
        "/api/auth/login",
        None,
        &json!({ "email": "", "senha": "" }),
    );
    let response = test_state.generate_response(request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_accepts_bcrypt_hash_and_upgrades_it() {
    let test_state = AppStateTest::new().await;
    let legacy_hash = bcrypt::hash_with_result(TEST_PASSWORD, 4)
        .unwrap()
        .format_for_version(bcrypt::Version::TwoA);
    let document = json!({
        "users": [{
            "id": 1700000000000i64,
            "nome": "Leitora Antiga",
            "email": "antiga@example.com",
            "senha": legacy_hash,
            "avatar": "/uploads/avatars/default-avatar.png",
            "dataCadastro": "2023-11-14T22:13:20.000Z"
        }]
    });
    tokio::fs::write(
        test_state.state.db.users.path(),
        serde_json::to_vec(&document).unwrap(),
    )
    .await
    .unwrap();

    let request = json_request(
        "POST",
        "/api/auth/login",
        None,
        &json!({ "email": "antiga@example.com", "senha": "Errada@123" }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = json_request(
        "POST",
        "/api/auth/login",
        None,
        &json!({ "email": "antiga@example.com", "senha": TEST_PASSWORD }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: AuthResponse = body_json(response).await;
    assert_eq!(body.user.id, 1700000000000);

    let stored = get_user_by_email(&test_state.state.db, "antiga@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(stored.password_hash.starts_with("$argon2id$"));

    let request = json_request(
        "POST",
        "/api/auth/login",
        None,
        &json!({ "email": "antiga@example.com", "senha": TEST_PASSWORD }),
    );
    let response = test_state.generate_response(request).await;
    assert_eq!(response.status(), StatusCode::OK);
}
