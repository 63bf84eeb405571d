use std::time::Duration;

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use validator::ValidationErrors;

use crate::{
    auth::error::AuthError,
    db::{error::DatabaseError, reading::ReadingError},
    model::LendingError,
};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Database error")]
    Database(DatabaseError),

    #[error("Auth error")]
    Auth(AuthError),

    #[error("Validation error")]
    Validation(ValidationErrors),

    #[error("Lending error")]
    Lending(LendingError),

    #[error("Reading error")]
    Reading(ReadingError),

    #[error("{1}")]
    Rejection(StatusCode, String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("Too many login attempts")]
    RateLimited(Duration),

    #[error("Other error: {0}")]
    Other(anyhow::Error),
}

impl From<DatabaseError> for Error {
    fn from(value: DatabaseError) -> Self {
        Self::Database(value)
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
                Self::Rejection(StatusCode::BAD_REQUEST, rejection.body_text())
            }
            rejection => Self::Rejection(rejection.status(), rejection.body_text()),
        }
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Self::Rejection(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Self::Rejection(rejection.status(), rejection.body_text())
    }
}

#[derive(Serialize, serde::Deserialize, Debug)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Body of every error response.
#[derive(Serialize, serde::Deserialize, Debug)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

fn message(status: StatusCode, message: impl Into<String>) -> Response {
    let body = ErrorResponse {
        message: message.into(),
        errors: Vec::new(),
    };

    (status, Json(body)).into_response()
}

fn internal_error() -> Response {
    message(StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong")
}

fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errors)| {
            let field = field.to_string();
            errors.iter().map(move |error| FieldError {
                field: field.clone(),
                message: error
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| error.code.to_string()),
            })
        })
        .collect();

    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Database(database_error) => match database_error {
                DatabaseError::NotFound => message(StatusCode::NOT_FOUND, "Record not found"),
                error => {
                    tracing::error!(err.msg = %error, err.details = ?error, "Database Error");

                    internal_error()
                }
            },
            Error::Auth(auth_error) => match auth_error {
                AuthError::TokenMissing | AuthError::Unauthenticated => {
                    message(StatusCode::UNAUTHORIZED, auth_error.to_string())
                }
                AuthError::TokenInvalid(ref error) => {
                    tracing::debug!(err.msg = %error, "Rejected token");

                    message(StatusCode::FORBIDDEN, auth_error.to_string())
                }
                AuthError::JwtError(error) => {
                    tracing::error!(err.msg = %error, err.details = ?error, "JWT Error");

                    internal_error()
                }
                AuthError::PasswordError(error) => {
                    tracing::error!(err.msg = %error, err.details = ?error, "Password Hash Error");

                    internal_error()
                }
                AuthError::LegacyHashError(error) => {
                    tracing::error!(err.msg = %error, err.details = ?error, "Legacy Password Hash Error");

                    internal_error()
                }
                AuthError::UserNotFound => message(StatusCode::NOT_FOUND, auth_error.to_string()),
                AuthError::IncorrectCredential => {
                    message(StatusCode::UNAUTHORIZED, auth_error.to_string())
                }
                AuthError::EmailTaken => message(StatusCode::BAD_REQUEST, auth_error.to_string()),
            },
            Error::Validation(validation_error) => {
                tracing::warn!(err.msg = %validation_error, "Validation Error");

                let body = ErrorResponse {
                    message: "Validation error".to_string(),
                    errors: field_errors(&validation_error),
                };

                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            Error::Lending(lending_error) => {
                let status = match lending_error {
                    LendingError::NotFound(_) => StatusCode::NOT_FOUND,
                    LendingError::AlreadyInUse { .. } | LendingError::NotInUse => {
                        StatusCode::BAD_REQUEST
                    }
                    LendingError::HeldByAnotherUser => StatusCode::FORBIDDEN,
                };

                message(status, lending_error.to_string())
            }
            Error::Reading(reading_error) => {
                let status = match reading_error {
                    ReadingError::NotFound => StatusCode::NOT_FOUND,
                    ReadingError::AlreadyReading => StatusCode::BAD_REQUEST,
                };

                message(status, reading_error.to_string())
            }
            Error::Rejection(status, text) => message(status, text),
            Error::BadRequest(text) => message(StatusCode::BAD_REQUEST, text),
            Error::PayloadTooLarge(text) => message(StatusCode::PAYLOAD_TOO_LARGE, text),
            Error::RateLimited(retry_after) => {
                let seconds = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
                let mut response = message(
                    StatusCode::TOO_MANY_REQUESTS,
                    format!("Too many login attempts. Try again in {seconds} seconds."),
                );
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, header::HeaderValue::from(seconds));

                response
            }
            Error::Other(error) => {
                tracing::error!(err.msg = %error, err.details = ?error, "Other Error");

                internal_error()
            }
        }
    }
}
