//! Layered server configuration.
//!
//! Sources, lowest precedence first: built-in defaults, the YAML file given with
//! `--config`, `CARELINK__*` environment variables (`__` separates nesting, e.g.
//! `CARELINK__AUTH__JWT_SECRET`), then CLI overrides.

use std::path::Path;

use anyhow::Context;
use care_coordination::{CareConfig, CareModuleConfig, RateLimitConfig, ReminderConfig};
use carelink_auth::AuthConfig;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};

pub const ENV_PREFIX: &str = "CARELINK__";
pub const MOCK_DSN: &str = "sqlite::memory:";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8087,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct DatabaseConfig {
    pub dsn: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            dsn: "sqlite://carelink.db?mode=rwc".to_owned(),
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` wins when set.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub rate_limit: RateLimitConfig,
    pub reminders: ReminderConfig,
    pub care: CareConfig,
    pub logging: LoggingConfig,
}

/// CLI flags that override the loaded configuration.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub port: Option<u16>,
    pub verbose: u8,
    pub mock: bool,
}

impl AppConfig {
    /// Defaults, then `path` (if any), then the environment.
    ///
    /// # Errors
    /// If the file cannot be read or a value has the wrong shape.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file_exact(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("invalid configuration")
    }

    pub fn apply_cli_overrides(&mut self, cli: &CliOverrides) {
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if cli.mock {
            self.database.dsn = MOCK_DSN.to_owned();
        }
        match cli.verbose {
            0 => {}
            1 => "info".clone_into(&mut self.logging.level),
            2 => "debug".clone_into(&mut self.logging.level),
            _ => "trace".clone_into(&mut self.logging.level),
        }
    }

    /// The part of the configuration the care-coordination module consumes.
    #[must_use]
    pub fn module_config(&self) -> CareModuleConfig {
        CareModuleConfig {
            auth: self.auth.clone(),
            rate_limit: self.rate_limit.clone(),
            reminders: self.reminders.clone(),
            care: self.care.clone(),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Pretty JSON with the JWT secret masked.
    ///
    /// # Errors
    /// If serialization fails.
    pub fn to_redacted_json(&self) -> anyhow::Result<String> {
        let mut shown = self.clone();
        "***".clone_into(&mut shown.auth.jwt_secret);
        serde_json::to_string_pretty(&shown).context("failed to render configuration")
    }
}
