use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_AVATAR: &str = "/uploads/avatars/default-avatar.png";

fn default_avatar() -> String {
    DEFAULT_AVATAR.to_string()
}

/// A stored account. `password_hash` is an argon2 PHC string.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "senha")]
    pub password_hash: String,
    #[serde(default = "default_avatar")]
    pub avatar: String,
    #[serde(rename = "dataCadastro")]
    pub created_at: DateTime<Utc>,
}

/// What the API exposes about a user.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    pub avatar: String,
    #[serde(rename = "dataCadastro")]
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        UserProfile {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            avatar: user.avatar.clone(),
            created_at: user.created_at,
        }
    }
}
