use axum::{
    Router,
    body::Body,
    http::{self, Request, Response},
};
use fake::{Fake, faker::internet::en::SafeEmail};
use http_body_util::BodyExt;
use manga_library::{
    auth::encode_jwt,
    config::Config,
    db::{
        manga::insert_manga,
        user::{NewUser, create_user},
    },
    model::{Manga, User},
    routes::init_router,
    state::AppState,
};
use serde::{Serialize, de::DeserializeOwned};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tower::ServiceExt;

use crate::fake::fake_manga_draft;

pub const TEST_PASSWORD: &str = "Senha@123";

/// Application state over a throwaway data directory.
pub struct AppStateTest {
    pub state: AppState,
    data_dir: TempDir,
}

fn test_config(data_dir: &TempDir) -> Config {
    let mut config = Config::new().expect("Failed to read configuration");
    config.application.data_dir = data_dir.path().join("data");
    config.application.static_dir = data_dir.path().join("img");
    config.application.upload_dir = data_dir.path().join("uploads");
    config
}

impl AppStateTest {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(customize: impl FnOnce(&mut Config)) -> Self {
        let data_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut config = test_config(&data_dir);
        customize(&mut config);

        let state = AppState::init(config)
            .await
            .expect("Failed to initialize state");

        AppStateTest { state, data_dir }
    }

    pub fn root(&self) -> &std::path::Path {
        self.data_dir.path()
    }

    pub fn router(&self) -> Router {
        init_router(self.state.clone())
    }

    pub async fn generate_response(&self, request: Request<Body>) -> Response<Body> {
        self.router().oneshot(request).await.unwrap()
    }

    pub async fn create_user(&self, email: &str) -> User {
        create_user(
            &self.state.db,
            NewUser {
                name: "Leitor Teste".to_string(),
                email: email.to_string(),
                password: TEST_PASSWORD.into(),
                avatar: None,
            },
        )
        .await
        .unwrap()
    }

    pub async fn generate_jwt_with_user(&self) -> (User, String) {
        let email: String = SafeEmail().fake();
        let user = self.create_user(&email).await;
        let token = encode_jwt(user.id, &user.email, &self.state.config.jwt).unwrap();

        (user, token)
    }

    pub async fn insert_fake_manga(&self) -> Manga {
        insert_manga(&self.state.db, fake_manga_draft()).await.unwrap()
    }
}

pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: &impl Serialize,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json");

    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
    }

    builder
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

pub async fn body_json<T: DeserializeOwned>(response: Response<Body>) -> T {
    let body = response.into_body().collect().await.unwrap().to_bytes();

    serde_json::from_slice(&body).unwrap()
}

pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    _state: AppStateTest,
}

/// Serves the router on a random local port.
pub async fn spawn_app() -> TestApp {
    let test_state = AppStateTest::new().await;
    let router = test_state.router();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<std::net::SocketAddr>(),
        )
        .await
        .unwrap();
    });

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .cookie_store(true)
        .build()
        .unwrap();

    TestApp {
        address,
        api_client: client,
        _state: test_state,
    }
}
