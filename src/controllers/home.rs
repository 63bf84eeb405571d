use axum::Json;
use serde::Serialize;

#[derive(Serialize, serde::Deserialize)]
pub struct HomeResponse {
    pub message: String,
}

#[tracing::instrument(name = "[GET] home")]
pub async fn index() -> Json<HomeResponse> {
    Json(HomeResponse {
        message: "Welcome to the manga library API".to_string(),
    })
}
