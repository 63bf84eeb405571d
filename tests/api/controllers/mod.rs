mod auth;
mod reading;
