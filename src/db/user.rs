use anyhow::Context;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::{
    auth::{compute_password_hash, error::AuthError},
    error::Error,
    model::User,
    telemetry::spawn_blocking_with_tracing,
};

use super::{Database, error::DatabaseError, next_id};

#[derive(Serialize, Deserialize, Default, Debug)]
pub struct UsersDocument {
    #[serde(default)]
    pub users: Vec<User>,
}

pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: SecretString,
    pub avatar: Option<String>,
}

#[tracing::instrument(name = "hash password", skip_all)]
async fn hash_password(password: SecretString) -> Result<String, Error> {
    spawn_blocking_with_tracing(move || compute_password_hash(password))
        .await
        .context("compute password hash")
        .map_err(Error::Other)?
}

#[tracing::instrument(name = "create user", skip_all, fields(email = %new_user.email))]
pub async fn create_user(db: &Database, new_user: NewUser) -> Result<User, Error> {
    let password_hashed = hash_password(new_user.password).await?;

    db.users
        .update(|document| {
            if document
                .users
                .iter()
                .any(|user| user.email == new_user.email)
            {
                return Err(Error::Auth(AuthError::EmailTaken));
            }

            let user = User {
                id: next_id(document.users.iter().map(|user| user.id)),
                name: new_user.name,
                email: new_user.email,
                password_hash: password_hashed,
                avatar: new_user
                    .avatar
                    .unwrap_or_else(|| crate::model::user::DEFAULT_AVATAR.to_string()),
                created_at: chrono::Utc::now(),
            };
            document.users.push(user.clone());

            Ok(user)
        })
        .await
}

#[tracing::instrument(name = "get user by email", skip_all)]
pub async fn get_user_by_email(db: &Database, email: &str) -> Result<Option<User>, Error> {
    let document = db.users.read().await?;

    Ok(document.users.into_iter().find(|user| user.email == email))
}

#[tracing::instrument(name = "get user by id", skip_all, fields(user_id = user_id))]
pub async fn get_user_by_id_optional(db: &Database, user_id: i64) -> Result<Option<User>, Error> {
    let document = db.users.read().await?;

    Ok(document.users.into_iter().find(|user| user.id == user_id))
}

#[tracing::instrument(name = "update user", skip_all, fields(user_id = user_id))]
pub async fn update_user(
    db: &Database,
    user_id: i64,
    name: Option<String>,
    password: Option<SecretString>,
) -> Result<User, Error> {
    let password_hashed = match password {
        Some(password) => Some(hash_password(password).await?),
        None => None,
    };

    db.users
        .update(|document| {
            let user = document
                .users
                .iter_mut()
                .find(|user| user.id == user_id)
                .ok_or(Error::Database(DatabaseError::NotFound))?;

            if let Some(name) = name {
                user.name = name;
            }
            if let Some(password_hashed) = password_hashed {
                user.password_hash = password_hashed;
            }

            Ok(user.clone())
        })
        .await
}

#[tracing::instrument(name = "update avatar", skip_all, fields(user_id = user_id))]
pub async fn update_avatar(db: &Database, user_id: i64, avatar: String) -> Result<User, Error> {
    db.users
        .update(|document| {
            let user = document
                .users
                .iter_mut()
                .find(|user| user.id == user_id)
                .ok_or(Error::Database(DatabaseError::NotFound))?;
            user.avatar = avatar;

            Ok(user.clone())
        })
        .await
}
