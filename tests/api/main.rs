mod controllers;
mod fake;
mod helper;
mod router;

pub use helper::{AppStateTest, body_json, json_request, spawn_app};
