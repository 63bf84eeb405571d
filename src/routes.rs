use std::{path::Path, sync::Arc, time::Duration};

use axum::{
    Router,
    body::Body,
    extract::{DefaultBodyLimit, MatchedPath},
    http::{HeaderName, HeaderValue, Method, Request, header},
    middleware,
    routing::{delete, get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    set_header::{SetResponseHeader, SetResponseHeaderLayer},
    trace::TraceLayer,
};

use crate::{
    config::Cors,
    controllers::{auth, home, lending, manga, me, reading, upload},
    middlewares::{
        cache_middleware, jwt_auth_middleware, login_rate_limit_middleware, sanitize_middleware,
    },
    state::AppState,
};

const REQUEST_ID_HEADER: &str = "x-request-id";
const STATIC_CACHE_CONTROL: &str = "public, max-age=31536000";
/// Room for the text fields sent alongside the image.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

fn cors_layer(cors: &Cors) -> CorsLayer {
    let origins = if cors.allowed_origins.iter().any(|origin| origin == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(cors.allowed_origins.iter().filter_map(|origin| {
            match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            }
        }))
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(cors.max_age_secs))
}

fn static_files(dir: &Path) -> SetResponseHeader<ServeDir, HeaderValue> {
    ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static(STATIC_CACHE_CONTROL),
        ))
        .service(ServeDir::new(dir))
}

pub fn init_router(app_state: AppState) -> Router {
    let state = Arc::new(app_state);
    let application = state.config.application.clone();

    let app = Router::new().route("/", get(home::index));

    let catalogue_route = Router::new()
        .route("/", get(manga::index))
        .route("/search", get(manga::search))
        .route("/{id}", get(manga::show))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            cache_middleware,
        ));

    let catalogue_write_route = Router::new()
        .route("/", post(manga::store))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    let donate_route = Router::new()
        .route("/donate", post(manga::donate))
        .layer(DefaultBodyLimit::max(
            application.max_upload_bytes + MULTIPART_OVERHEAD,
        ));

    let manga_route = catalogue_route
        .merge(catalogue_write_route)
        .merge(donate_route);

    let lending_route = Router::new()
        .route("/{id}/use", post(lending::use_manga))
        .route("/{id}/return", post(lending::return_manga))
        .route("/{id}/available", post(lending::return_manga))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ))
        .route("/{id}/status", get(lending::status));

    let auth_route = Router::new()
        .route("/login", post(auth::login))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            login_rate_limit_middleware,
        ))
        .route("/register", post(auth::register));

    let me_route = Router::new()
        .route("/user", get(me::show).put(me::update))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    let upload_route = Router::new()
        .route("/avatar", post(upload::avatar))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ))
        .layer(DefaultBodyLimit::max(
            application.max_upload_bytes + MULTIPART_OVERHEAD,
        ));

    let reading_route = Router::new()
        .route("/em-leitura", get(reading::index))
        .route("/adicionar", post(reading::store))
        .route("/progresso/{id}", put(reading::progress))
        .route("/concluir/{id}", post(reading::complete))
        .route("/remover/{id}", delete(reading::destroy))
        .route("/lidos", get(reading::completed))
        .route("/historico", get(reading::history))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    let x_request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);
    let request_id_middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(
            x_request_id_header.clone(),
            MakeRequestUuid,
        ))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|val| val.to_str().ok())
                    .unwrap_or("");
                let user_agent = request
                    .headers()
                    .get(header::USER_AGENT)
                    .and_then(|val| val.to_str().ok())
                    .unwrap_or("");

                let matched_path = request
                    .extensions()
                    .get::<MatchedPath>()
                    .map(MatchedPath::as_str);

                tracing::info_span!(
                    "http_request",
                    request_id,
                    method = ?request.method(),
                    uri = ?request.uri(),
                    path = matched_path,
                    version = ?request.version(),
                    user_agent,
                )
            }),
        )
        .layer(PropagateRequestIdLayer::new(x_request_id_header));

    app.nest("/api/mangas", manga_route)
        .nest("/api/manga", lending_route)
        .nest("/api/auth", auth_route.merge(me_route))
        .nest("/api/leitura", reading_route)
        .nest("/api/upload", upload_route)
        .nest_service("/img", static_files(&application.static_dir))
        .nest_service("/uploads", static_files(&application.upload_dir))
        .layer(middleware::from_fn(sanitize_middleware))
        .layer(cors_layer(&state.config.cors))
        .layer(CompressionLayer::new())
        .layer(request_id_middleware)
        .with_state(state)
}
