#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Auth token is missing")]
    TokenMissing,
    #[error("Auth token is invalid or expired")]
    TokenInvalid(jsonwebtoken::errors::Error),
    #[error("Jwt error")]
    JwtError(jsonwebtoken::errors::Error),
    #[error("Password error")]
    PasswordError(argon2::password_hash::Error),
    #[error("Legacy password hash error")]
    LegacyHashError(bcrypt::BcryptError),
    #[error("Unauthenticated")]
    Unauthenticated,
    #[error("User not found")]
    UserNotFound,
    #[error("Invalid email or password")]
    IncorrectCredential,
    #[error("Email already registered")]
    EmailTaken,
}
