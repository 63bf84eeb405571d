pub mod error;
pub mod identity;
pub mod jwt;
pub mod password;

pub use identity::{CurrentUser, MaybeUser};
pub use jwt::{decode_jwt, encode_jwt};
pub use password::{
    compute_password_hash, is_legacy_hash, is_strong_password, verify_password_hash,
};
