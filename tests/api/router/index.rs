use manga_library::controllers::{auth::AuthResponse, home::HomeResponse};
use serde_json::json;

use crate::spawn_app;

#[tokio::test]
async fn home_page_should_return_ok() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .get(format!("{}/", app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    assert!(response.headers().contains_key("x-request-id"));

    let body: HomeResponse = response.json().await.unwrap();
    assert!(body.message.contains("manga library"));
}

#[tokio::test]
async fn register_then_login_over_tcp() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .post(format!("{}/api/auth/register", app.address))
        .json(&json!({ "nome": "Leitora", "email": "tcp@example.com", "senha": "Senha@123" }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(response.status().as_u16(), 201);

    let response = app
        .api_client
        .post(format!("{}/api/auth/login", app.address))
        .json(&json!({ "email": "tcp@example.com", "senha": "Senha@123" }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert!(response.status().is_success());

    let body: AuthResponse = response.json().await.unwrap();
    assert_eq!(body.user.email, "tcp@example.com");
}

#[tokio::test]
async fn cors_preflight_is_answered() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .request(reqwest::Method::OPTIONS, format!("{}/api/mangas", app.address))
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "POST")
        .send()
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}
