use std::borrow::Cow;

use anyhow::Context;
use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateEmail, ValidateLength, ValidationError, ValidationErrors};

use crate::{
    auth::{
        encode_jwt, error::AuthError, is_legacy_hash, is_strong_password, verify_password_hash,
    },
    config,
    db::user::{NewUser, create_user, get_user_by_email, update_user},
    error::Error,
    extract::JsonBody,
    middlewares::rate_limit::ClientKey,
    model::{User, UserProfile},
    state::SharedAppState,
    telemetry::spawn_blocking_with_tracing,
};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub nome: String,
    pub email: String,
    pub senha: SecretString,
    pub avatar: Option<String>,
}

pub(crate) fn add_error(errors: &mut ValidationErrors, field: &'static str, code: &'static str, message: String) {
    errors.add(
        field,
        ValidationError::new(code).with_message(Cow::from(message)),
    );
}

pub(crate) fn check_name(errors: &mut ValidationErrors, name: &str) {
    if !name.validate_length(Some(3), Some(100), None) {
        add_error(
            errors,
            "nome",
            "nome_length",
            "Name must be between 3 and 100 characters".to_string(),
        );
    }
}

pub(crate) fn check_password(errors: &mut ValidationErrors, password: &str, rules: &config::Validation) {
    if !is_strong_password(password, rules.password_min_length) {
        add_error(
            errors,
            "senha",
            "senha_strength",
            format!(
                "Password must have at least {} characters, including upper and lower case letters, digits and one of @$!%*?&",
                rules.password_min_length
            ),
        );
    }
}

impl RegisterRequest {
    pub fn validate_with(&self, rules: &config::Validation) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        check_name(&mut errors, &self.nome);

        if !self.email.validate_email() {
            add_error(
                &mut errors,
                "email",
                "email_email",
                "Incorrect email format".to_string(),
            );
        }

        check_password(&mut errors, self.senha.expose_secret(), rules);

        if !errors.errors().is_empty() {
            return Err(errors);
        }

        Ok(())
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub senha: SecretString,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if !self.email.validate_length(Some(1), Some(100), None) {
            add_error(
                &mut errors,
                "email",
                "email_length",
                "Email length must be between 1 and 100".to_string(),
            );
        }
        if self.senha.expose_secret().is_empty() {
            add_error(
                &mut errors,
                "senha",
                "senha_required",
                "Password is required".to_string(),
            );
        }

        if !errors.errors().is_empty() {
            return Err(errors);
        }

        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: UserProfile,
}

async fn issue_token(app_state: SharedAppState, user: &User) -> Result<String, Error> {
    let (user_id, email) = (user.id, user.email.clone());

    spawn_blocking_with_tracing(move || encode_jwt(user_id, &email, &app_state.config.jwt))
        .await
        .context("encode jwt")
        .map_err(Error::Other)?
}

#[tracing::instrument(name = "[POST] auth/register", skip_all)]
pub async fn register(
    State(app_state): State<SharedAppState>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), Error> {
    request
        .validate_with(&app_state.config.validation)
        .map_err(Error::Validation)?;

    let user = create_user(
        &app_state.db,
        NewUser {
            name: request.nome,
            email: request.email,
            password: request.senha,
            avatar: request.avatar,
        },
    )
    .await?;

    let token = issue_token(app_state.clone(), &user).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            token,
            user: UserProfile::from(&user),
        }),
    ))
}

#[tracing::instrument(name = "[POST] auth/login", skip_all)]
pub async fn login(
    State(app_state): State<SharedAppState>,
    Extension(client): Extension<ClientKey>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<AuthResponse>, Error> {
    request.validate().map_err(Error::Validation)?;

    let user = get_user_by_email(&app_state.db, &request.email)
        .await?
        .ok_or(Error::Auth(AuthError::IncorrectCredential))?;

    let hashed_password = user.password_hash.clone();
    let password = request.senha.clone();
    spawn_blocking_with_tracing(move || verify_password_hash(hashed_password, password))
        .await
        .context("verify password hash")
        .map_err(Error::Other)?
        .map_err(|_| Error::Auth(AuthError::IncorrectCredential))?;

    app_state.login_limiter.reset(&client.0);

    if is_legacy_hash(&user.password_hash) {
        tracing::info!(user_id = user.id, "Upgrading legacy password hash");
        update_user(&app_state.db, user.id, None, Some(request.senha)).await?;
    }

    let token = issue_token(app_state.clone(), &user).await?;

    Ok(Json(AuthResponse {
        message: "Logged in successfully".to_string(),
        token,
        user: UserProfile::from(&user),
    }))
}
