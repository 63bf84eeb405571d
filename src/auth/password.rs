use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::{SaltString, rand_core::OsRng},
};
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

use super::error::AuthError;

const PASSWORD_SPECIALS: &str = "@$!%*?&";
const BCRYPT_PREFIXES: [&str; 3] = ["$2a$", "$2b$", "$2y$"];

/// True for bcrypt hashes left in `users.json` by the previous backend.
/// They still verify, and are replaced with Argon2id on the next login.
pub fn is_legacy_hash(password_hashed: &str) -> bool {
    BCRYPT_PREFIXES
        .iter()
        .any(|prefix| password_hashed.starts_with(prefix))
}

#[tracing::instrument(name = "compute password hash", skip_all)]
pub fn compute_password_hash(password: SecretString) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    let params = Params::new(15000, 2, 1, None)
        .map_err(|e| Error::Auth(AuthError::PasswordError(e.into())))?;

    let password_hash = Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(password.expose_secret().as_bytes(), &salt)
        .map_err(|e| Error::Auth(AuthError::PasswordError(e)))?
        .to_string();

    Ok(password_hash)
}

#[tracing::instrument(name = "verify password hash", skip_all)]
pub fn verify_password_hash(password_hashed: String, password: SecretString) -> Result<(), Error> {
    if is_legacy_hash(&password_hashed) {
        return match bcrypt::verify(password.expose_secret(), &password_hashed) {
            Ok(true) => Ok(()),
            Ok(false) => Err(Error::Auth(AuthError::IncorrectCredential)),
            Err(e) => Err(Error::Auth(AuthError::LegacyHashError(e))),
        };
    }

    let expected_password_hash = PasswordHash::new(&password_hashed)
        .map_err(|e| Error::Auth(AuthError::PasswordError(e)))?;

    Argon2::default()
        .verify_password(password.expose_secret().as_bytes(), &expected_password_hash)
        .map_err(|e| Error::Auth(AuthError::PasswordError(e)))
}

/// At least `min_length` characters drawn from letters, digits and
/// `@$!%*?&`, with one of each: lowercase, uppercase, digit, special.
pub fn is_strong_password(password: &str, min_length: usize) -> bool {
    let is_special = |c: char| PASSWORD_SPECIALS.contains(c);

    password.chars().count() >= min_length
        && password
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || is_special(c))
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(is_special)
}
