use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::{Field, MultipartRejection},
    },
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_option_number_from_string;
use validator::Validate;

use crate::{
    auth::CurrentUser,
    db::manga::{get_manga_by_id, insert_manga, search_mangas},
    error::Error,
    extract::{JsonBody, PathParam, QueryParams},
    middlewares::sanitize::sanitize_str,
    model::{Manga, MangaDraft},
    state::SharedAppState,
    util::{Page, paginate},
};

use super::upload::{field_error, multipart_error, read_image, save_upload};

/// Cache keys under this prefix are dropped whenever the catalogue changes.
pub const CATALOGUE_PREFIX: &str = "/api/mangas";

const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Deserialize, Serialize, Debug, Validate)]
pub struct Pagination {
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    page: Option<usize>,

    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    limit: Option<usize>,

    search: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct SearchQuery {
    query: Option<String>,
}

#[derive(Deserialize, Debug, Validate)]
pub struct NewMangaRequest {
    #[validate(length(min = 3, max = 200, message = "Title must be between 3 and 200 characters"))]
    pub titulo: String,

    #[validate(length(min = 3, max = 100, message = "Author must be between 3 and 100 characters"))]
    pub autor: String,

    pub status: Option<String>,

    #[validate(range(min = 0.0, max = 10.0, message = "Rating must be between 0 and 10"))]
    pub nota: Option<f64>,

    pub capitulos: Option<u32>,

    #[serde(default)]
    #[validate(length(min = 1, message = "At least one genre is required"))]
    pub generos: Vec<String>,

    #[serde(default)]
    #[validate(length(min = 10, message = "Synopsis must have at least 10 characters"))]
    pub sinopse: String,

    pub imagem: Option<String>,
}

impl From<NewMangaRequest> for MangaDraft {
    fn from(request: NewMangaRequest) -> Self {
        MangaDraft {
            title: request.titulo,
            author: request.autor,
            status: request.status,
            rating: request.nota,
            chapters: request.capitulos,
            genres: request.generos,
            synopsis: request.sinopse,
            image: request.imagem,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct MangaCreatedResponse {
    pub message: String,
    pub manga: Manga,
}

#[tracing::instrument(name = "[GET] mangas", skip_all, fields(parameters = ?pagination))]
pub async fn index(
    State(app_state): State<SharedAppState>,
    QueryParams(pagination): QueryParams<Pagination>,
) -> Result<Json<Page<Manga>>, Error> {
    pagination.validate().map_err(Error::Validation)?;

    let mangas = search_mangas(&app_state.db, pagination.search.as_deref()).await?;

    Ok(Json(paginate(
        mangas,
        pagination.page.unwrap_or(1),
        pagination.limit.unwrap_or(DEFAULT_PAGE_SIZE),
    )))
}

#[tracing::instrument(name = "[GET] mangas/search", skip_all)]
pub async fn search(
    State(app_state): State<SharedAppState>,
    QueryParams(search): QueryParams<SearchQuery>,
) -> Result<Json<Vec<Manga>>, Error> {
    let result = search_mangas(&app_state.db, search.query.as_deref()).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[GET] mangas/{id}", skip_all, fields(id))]
pub async fn show(
    State(app_state): State<SharedAppState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<Manga>, Error> {
    tracing::Span::current().record("id", id);

    let result = get_manga_by_id(&app_state.db, id).await?;

    Ok(Json(result))
}

#[tracing::instrument(name = "[POST] mangas", skip_all, fields(user_id = user.id))]
pub async fn store(
    State(app_state): State<SharedAppState>,
    CurrentUser(user): CurrentUser,
    JsonBody(request): JsonBody<NewMangaRequest>,
) -> Result<(StatusCode, Json<MangaCreatedResponse>), Error> {
    request.validate().map_err(Error::Validation)?;

    let manga = insert_manga(&app_state.db, request.into()).await?;
    app_state.cache.invalidate_prefix(CATALOGUE_PREFIX);

    Ok((
        StatusCode::CREATED,
        Json(MangaCreatedResponse {
            message: "Manga registered successfully".to_string(),
            manga,
        }),
    ))
}

async fn text(field: Field<'_>) -> Result<String, Error> {
    let value = field.text().await.map_err(multipart_error)?;

    Ok(sanitize_str(&value))
}

fn parse_number<T: std::str::FromStr>(
    value: &str,
    field: &'static str,
    message: &'static str,
) -> Result<Option<T>, Error> {
    if value.is_empty() {
        return Ok(None);
    }

    value
        .parse()
        .map(Some)
        .map_err(|_| Error::Validation(field_error(field, "number", message)))
}

/// Multipart donation form. Genres may be sent as repeated `generos` fields
/// or as one comma separated value.
#[tracing::instrument(name = "[POST] mangas/donate", skip_all)]
pub async fn donate(
    State(app_state): State<SharedAppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<MangaCreatedResponse>), Error> {
    let mut multipart =
        multipart.map_err(|rejection| Error::BadRequest(rejection.body_text()))?;

    let mut request = NewMangaRequest {
        titulo: String::new(),
        autor: String::new(),
        status: None,
        nota: None,
        capitulos: None,
        generos: Vec::new(),
        sinopse: String::new(),
        imagem: None,
    };
    let mut upload = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "titulo" => request.titulo = text(field).await?,
            "autor" => request.autor = text(field).await?,
            "status" => request.status = Some(text(field).await?).filter(|s| !s.is_empty()),
            "sinopse" => request.sinopse = text(field).await?,
            "nota" => {
                request.nota = parse_number(&text(field).await?, "nota", "Rating must be a number")?
            }
            "capitulos" => {
                request.capitulos = parse_number(
                    &text(field).await?,
                    "capitulos",
                    "Chapters must be a whole number",
                )?
            }
            "generos" | "generos[]" => request.generos.extend(
                text(field)
                    .await?
                    .split(',')
                    .map(str::trim)
                    .filter(|genre| !genre.is_empty())
                    .map(str::to_string),
            ),
            "imagem" => upload = read_image(&app_state, field, "imagem").await?,
            other => tracing::debug!(field = other, "Ignoring unknown form field"),
        }
    }

    request.validate().map_err(Error::Validation)?;

    if let Some((extension, bytes)) = upload {
        request.imagem = Some(save_upload(&app_state, None, extension, &bytes).await?);
    }

    let manga = insert_manga(&app_state.db, request.into()).await?;
    app_state.cache.invalidate_prefix(CATALOGUE_PREFIX);

    Ok((
        StatusCode::CREATED,
        Json(MangaCreatedResponse {
            message: "Manga donated successfully".to_string(),
            manga,
        }),
    ))
}
