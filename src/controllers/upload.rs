use std::borrow::Cow;

use anyhow::Context;
use axum::{
    Json,
    body::Bytes,
    extract::{
        Multipart, State,
        multipart::{Field, MultipartError, MultipartRejection},
    },
};
use serde::{Deserialize, Serialize};
use validator::{ValidationError, ValidationErrors};

use crate::{
    auth::{CurrentUser, error::AuthError},
    db::{error::DatabaseError, user::update_avatar},
    error::Error,
    model::UserProfile,
    state::SharedAppState,
};

/// Avatars live under `<upload_dir>/avatars`, next to the default one.
const AVATAR_DIR: &str = "avatars";

#[derive(Serialize, Deserialize)]
pub struct AvatarResponse {
    pub message: String,
    #[serde(rename = "avatarUrl")]
    pub avatar_url: String,
    pub user: UserProfile,
}

pub(crate) fn multipart_error(error: MultipartError) -> Error {
    Error::Rejection(error.status(), error.body_text())
}

pub(crate) fn field_error(
    field: &'static str,
    code: &'static str,
    message: &'static str,
) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add(field, ValidationError::new(code).with_message(Cow::from(message)));
    errors
}

pub(crate) fn image_extension(content_type: Option<&str>) -> Option<&'static str> {
    match content_type? {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

/// Reads an image part, enforcing the accepted types and the configured
/// size limit. An empty part counts as no file.
pub(crate) async fn read_image(
    app_state: &SharedAppState,
    field: Field<'_>,
    name: &'static str,
) -> Result<Option<(&'static str, Bytes)>, Error> {
    let extension = image_extension(field.content_type()).ok_or_else(|| {
        Error::Validation(field_error(
            name,
            "file_type",
            "Only jpeg, png and gif images are accepted",
        ))
    })?;

    let bytes = field.bytes().await.map_err(multipart_error)?;
    let max_upload_bytes = app_state.config.application.max_upload_bytes;
    if bytes.len() > max_upload_bytes {
        return Err(Error::PayloadTooLarge(format!(
            "Image exceeds the {max_upload_bytes} byte limit"
        )));
    }

    Ok(Some((extension, bytes)).filter(|(_, bytes)| !bytes.is_empty()))
}

/// Stores `bytes` under a fresh name and returns its public path.
#[tracing::instrument(name = "save upload", skip_all, fields(extension = extension))]
pub(crate) async fn save_upload(
    app_state: &SharedAppState,
    subdir: Option<&str>,
    extension: &str,
    bytes: &[u8],
) -> Result<String, Error> {
    let upload_root = &app_state.config.application.upload_dir;
    let upload_dir = match subdir {
        Some(subdir) => upload_root.join(subdir),
        None => upload_root.clone(),
    };
    let file_name = format!("{}.{}", uuid::Uuid::new_v4(), extension);

    tokio::fs::create_dir_all(&upload_dir)
        .await
        .with_context(|| format!("create upload directory {}", upload_dir.display()))
        .map_err(Error::Other)?;
    tokio::fs::write(upload_dir.join(&file_name), bytes)
        .await
        .with_context(|| format!("write upload {file_name}"))
        .map_err(Error::Other)?;

    Ok(match subdir {
        Some(subdir) => format!("/uploads/{subdir}/{file_name}"),
        None => format!("/uploads/{file_name}"),
    })
}

/// Replaces the caller's avatar with the uploaded `avatar` image.
#[tracing::instrument(name = "[POST] upload/avatar", skip_all, fields(user_id = user.id))]
pub async fn avatar(
    State(app_state): State<SharedAppState>,
    CurrentUser(user): CurrentUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AvatarResponse>, Error> {
    let mut multipart =
        multipart.map_err(|rejection| Error::BadRequest(rejection.body_text()))?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("avatar") {
            tracing::debug!(field = ?field.name(), "Ignoring unknown form field");
            continue;
        }

        upload = read_image(&app_state, field, "avatar").await?;
    }

    let (extension, bytes) =
        upload.ok_or_else(|| Error::BadRequest("No file uploaded".to_string()))?;
    let avatar_url = save_upload(&app_state, Some(AVATAR_DIR), extension, &bytes).await?;

    let updated = update_avatar(&app_state.db, user.id, avatar_url.clone())
        .await
        .map_err(|error| match error {
            Error::Database(DatabaseError::NotFound) => Error::Auth(AuthError::UserNotFound),
            error => error,
        })?;

    Ok(Json(AvatarResponse {
        message: "Avatar updated successfully".to_string(),
        avatar_url,
        user: UserProfile::from(&updated),
    }))
}
