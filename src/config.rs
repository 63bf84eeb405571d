use std::{path::PathBuf, time::Duration};

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use secrecy::SecretString;
use serde_aux::field_attributes::deserialize_number_from_string;

#[derive(serde::Deserialize, Debug, Clone)]
pub struct Config {
    pub application: Application,
    pub jwt: Jwt,
    pub cors: Cors,
    pub validation: Validation,
    pub cache: Cache,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct Application {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    /// When false, protected routes let anonymous requests through.
    pub require_auth: bool,
    pub data_dir: PathBuf,
    pub static_dir: PathBuf,
    pub upload_dir: PathBuf,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_upload_bytes: usize,
}

impl Application {
    pub fn get_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct Jwt {
    pub secret: SecretString,
    pub iss: String,
    pub aud: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub expiration_hours: i64,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct Cors {
    pub allowed_origins: Vec<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_age_secs: u64,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct Validation {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub password_min_length: usize,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_login_attempts: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub login_timeout_secs: u64,
}

impl Validation {
    pub fn login_timeout(&self) -> Duration {
        Duration::from_secs(self.login_timeout_secs)
    }
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct Cache {
    pub enabled: bool,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub ttl_secs: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_items: usize,
}

impl Cache {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}

impl Config {
    pub fn new() -> Result<Self, anyhow::Error> {
        let base_path = std::env::current_dir()?;
        let config_directory = base_path.join("configuration");

        let environment: Environment = std::env::var("APP_ENVIRONMENT")
            .unwrap_or_else(|_| "local".into())
            .try_into()
            .map_err(anyhow::Error::msg)?;

        let environment_filename = format!("{}.yaml", environment.as_str());

        let config = Figment::new()
            .merge(Yaml::file(config_directory.join("base.yaml")))
            .merge(Yaml::file(config_directory.join(environment_filename)))
            .merge(Env::raw().split("__"))
            .extract()?;

        Ok(config)
    }
}
