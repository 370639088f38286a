use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

const DEFAULT_ENV: &str = "local";
const ENV_VAR_NAME: &str = "SHELF_ENV";
const CONFIG_DIR_ENV: &str = "SHELF_CONFIG_DIR";
const ENV_PREFIX: &str = "SHELF";

/// Deployment environment the application is running in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

impl Environment {
    fn parse(value: &str) -> anyhow::Result<Self> {
        match value {
            "local" => Ok(Environment::Local),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(anyhow!(
                "unsupported environment '{}'; expected local/staging/production",
                other
            )),
        }
    }
}

/// Top-level configuration structure loaded from layered sources.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

impl Settings {
    /// Load configuration by layering `.env`, base file, and environment overlay.
    pub fn load() -> anyhow::Result<Self> {
        // Allow missing `.env` files without failing.
        let _ = dotenvy::dotenv();

        let environment = std::env::var(ENV_VAR_NAME).unwrap_or_else(|_| DEFAULT_ENV.to_string());
        let config_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => std::env::current_dir()
                .map(|cwd| cwd.join("config"))
                .with_context(|| "unable to resolve current directory")?,
        };

        Self::load_from(&environment, &config_dir)
    }

    /// Load `base.toml` then `{environment}.toml` from `config_dir`, with
    /// `SHELF_*` environment variables on top (`__` separates nested keys).
    pub fn load_from(environment: &str, config_dir: &Path) -> anyhow::Result<Self> {
        let parsed_environment = Environment::parse(environment)?;

        let base_path = config_dir.join("base.toml");
        let environment_path = config_dir.join(format!("{}.toml", environment));

        let builder = config::Config::builder()
            .add_source(config::File::from(base_path).required(false))
            .add_source(config::File::from(environment_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            );

        let cfg = builder
            .build()
            .with_context(|| "failed to build configuration")?;

        let mut settings: Settings = cfg
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;

        settings.environment = parsed_environment;

        Ok(settings)
    }

    /// Copy of the settings that is safe to print.
    pub fn redacted(&self) -> Self {
        let mut settings = self.clone();
        if let DatabaseAuth::Password { password, .. } = &mut settings.database.auth {
            *password = "********".to_string();
        }
        settings
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "ServerSettings::default_host")]
    pub host: String,
    #[serde(default = "ServerSettings::default_port")]
    pub port: u16,
    #[serde(default = "ServerSettings::default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ServerSettings {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        5000
    }

    fn default_request_timeout_ms() -> u64 {
        15000
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            request_timeout_ms: Self::default_request_timeout_ms(),
        }
    }
}

/// Database engine the connection string is rendered for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseDriver {
    #[default]
    Sqlite,
    Postgres,
}

/// How the application authenticates against the database server.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum DatabaseAuth {
    /// No credentials in the connection string; the server trusts the OS identity.
    #[default]
    Integrated,
    Password { username: String, password: String },
}

impl fmt::Debug for DatabaseAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseAuth::Integrated => f.write_str("Integrated"),
            DatabaseAuth::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &"********")
                .finish(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default)]
    pub driver: DatabaseDriver,
    #[serde(default = "DatabaseSettings::default_server")]
    pub server: String,
    /// Database name, or the file path for SQLite.
    #[serde(default = "DatabaseSettings::default_database")]
    pub database: String,
    #[serde(default)]
    pub auth: DatabaseAuth,
}

impl DatabaseSettings {
    fn default_server() -> String {
        "localhost".to_string()
    }

    fn default_database() -> String {
        "shelf.db".to_string()
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            driver: DatabaseDriver::default(),
            server: Self::default_server(),
            database: Self::default_database(),
            auth: DatabaseAuth::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetrySettings {
    #[serde(default)]
    pub log_format: LogFormat,
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    #[serde(default = "TelemetrySettings::default_filter")]
    pub filter: String,
}

impl TelemetrySettings {
    fn default_filter() -> String {
        "info".to_string()
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            filter: Self::default_filter(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}
