//! Application settings.
//!
//! Read from `settings.toml` in the working directory, with `ALCANCIA__*`
//! environment variables layered on top (secrets usually arrive that way).

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    /// Log level passed to the tracing env-filter.
    pub level: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
    pub jwt_secret: Option<String>,
    pub jwt_admin_secret: Option<String>,
    /// Base URL of the frontend, used to compose password-reset links.
    pub frontend_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Assistant {
    pub api_url: Option<String>,
    pub api_key: String,
    pub model: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub assistant: Option<Assistant>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings"))
            .add_source(Environment::with_prefix("ALCANCIA").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
