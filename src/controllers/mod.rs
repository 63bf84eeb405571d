pub mod auth;
pub mod home;
pub mod lending;
pub mod manga;
pub mod me;
pub mod reading;
pub mod upload;
