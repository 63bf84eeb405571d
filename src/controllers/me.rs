use axum::{Json, extract::State};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use validator::ValidationErrors;

use crate::{
    auth::{CurrentUser, error::AuthError},
    db::{
        error::DatabaseError,
        user::{get_user_by_id_optional, update_user},
    },
    error::Error,
    extract::JsonBody,
    model::UserProfile,
    state::SharedAppState,
};

use super::auth::{check_name, check_password};

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub nome: Option<String>,
    pub senha: Option<SecretString>,
}

impl UpdateUserRequest {
    fn validate_with(&self, rules: &crate::config::Validation) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(name) = &self.nome {
            check_name(&mut errors, name);
        }
        if let Some(password) = &self.senha {
            check_password(&mut errors, password.expose_secret(), rules);
        }

        if !errors.errors().is_empty() {
            return Err(errors);
        }

        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
pub struct UpdateUserResponse {
    pub message: String,
    pub user: UserProfile,
}

#[tracing::instrument(name = "[GET] auth/user", skip_all, fields(user_id = user.id))]
pub async fn show(
    State(app_state): State<SharedAppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<UserProfile>, Error> {
    let user = get_user_by_id_optional(&app_state.db, user.id)
        .await?
        .ok_or(Error::Auth(AuthError::UserNotFound))?;

    Ok(Json(UserProfile::from(&user)))
}

#[tracing::instrument(name = "[PUT] auth/user", skip_all, fields(user_id = user.id))]
pub async fn update(
    State(app_state): State<SharedAppState>,
    CurrentUser(user): CurrentUser,
    JsonBody(request): JsonBody<UpdateUserRequest>,
) -> Result<Json<UpdateUserResponse>, Error> {
    request
        .validate_with(&app_state.config.validation)
        .map_err(Error::Validation)?;

    let updated = update_user(&app_state.db, user.id, request.nome, request.senha)
        .await
        .map_err(|error| match error {
            Error::Database(DatabaseError::NotFound) => Error::Auth(AuthError::UserNotFound),
            error => error,
        })?;

    Ok(Json(UpdateUserResponse {
        message: "User updated successfully".to_string(),
        user: UserProfile::from(&updated),
    }))
}
