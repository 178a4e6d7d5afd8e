//! TOML-based configuration for Strata.
//!
//! Supports a config file (strata.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! backend = "sqlite"
//!
//! [sqlite]
//! path = "./data/warehouse.db"
//! catalog = "warehouse"
//!
//! [postgres]
//! url = "postgres://localhost:5432/analytics"
//! user = "strata"
//! password = "${PG_PASSWORD}"
//!
//! [bigquery]
//! project_id = "my-project"
//! location = "US"
//! credentials_key = "${BQ_CREDENTIALS}"
//!
//! [couchbase]
//! jdbc_url = "jdbc:couchbase:"
//! server = "couchbase://localhost"
//! user = "admin"
//! password = "${CB_PASSWORD}"
//!
//! [logging]
//! filter = "strata=debug"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::backend::BackendKind;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Unsupported backend: {0}. Supported: bigquery, postgres, couchbase, duckdb, snowflake, sqlite")]
    UnsupportedBackend(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type SettingsResult<T> = Result<T, SettingsError>;

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Active backend; drives dialect, type mapping and caching.
    pub backend: BackendKind,

    pub sqlite: SqliteSettings,

    // The remaining backend sections are read by external
    // `ConnectorFactory` implementations; the bundled factory only
    // builds SQLite.
    pub postgres: PostgresSettings,

    pub bigquery: BigQuerySettings,

    pub couchbase: CouchbaseSettings,

    pub logging: LoggingSettings,
}

/// SQLite connector settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SqliteSettings {
    /// Database file (supports ${ENV_VAR} expansion). `:memory:` opens a
    /// fresh in-memory database per connection.
    pub path: String,

    /// Catalog name reported by schema introspection.
    pub catalog: String,
}

impl Default for SqliteSettings {
    fn default() -> Self {
        Self {
            path: ":memory:".to_string(),
            catalog: "memory".to_string(),
        }
    }
}

impl SqliteSettings {
    /// Get the database path with environment variables expanded.
    pub fn resolved_path(&self) -> SettingsResult<String> {
        expand_env_vars(&self.path)
    }
}

/// Postgres connection settings, for a connector supplied outside this crate.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PostgresSettings {
    pub url: Option<String>,
    pub user: Option<String>,
    /// Supports ${ENV_VAR} expansion.
    pub password: Option<String>,
}

impl PostgresSettings {
    pub fn resolved_password(&self) -> SettingsResult<Option<String>> {
        expand_optional(self.password.as_deref())
    }
}

/// BigQuery settings, for a connector supplied outside this crate.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BigQuerySettings {
    pub project_id: Option<String>,
    pub location: Option<String>,
    /// Base64 service account key (supports ${ENV_VAR} expansion).
    pub credentials_key: Option<String>,
}

impl BigQuerySettings {
    pub fn resolved_credentials_key(&self) -> SettingsResult<Option<String>> {
        expand_optional(self.credentials_key.as_deref())
    }
}

/// Couchbase JDBC settings, for a connector supplied outside this crate.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CouchbaseSettings {
    pub jdbc_url: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub server: Option<String>,
    pub n1ql_port: Option<String>,
    pub use_ssl: bool,
}

impl CouchbaseSettings {
    pub fn resolved_password(&self) -> SettingsResult<Option<String>> {
        expand_optional(self.password.as_deref())
    }
}

impl Default for CouchbaseSettings {
    fn default() -> Self {
        Self {
            jdbc_url: "jdbc:couchbase:".to_string(),
            user: None,
            password: None,
            server: None,
            n1ql_port: None,
            use_ssl: true,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing-subscriber` filter directive, e.g. `info` or `strata=debug`.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl Settings {
    /// Parse settings from a TOML string.
    pub fn from_toml(content: &str) -> SettingsResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> SettingsResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `STRATA_CONFIG`
    /// 2. `./strata.toml`
    /// 3. `~/.config/strata/config.toml`
    pub fn load() -> SettingsResult<Self> {
        if let Ok(path) = env::var("STRATA_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("strata.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("strata").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax. A `$` not followed by a name is
/// kept as is.
pub fn expand_env_vars(s: &str) -> SettingsResult<String> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.next_if_eq(&'{').is_some() {
            let name: String = chars.by_ref().take_while(|&ch| ch != '}').collect();
            if name.is_empty() {
                return Err(SettingsError::InvalidConfig(format!(
                    "empty variable reference in {s:?}"
                )));
            }
            name
        } else {
            let mut name = String::new();
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                name.push(ch);
            }
            if name.is_empty() {
                result.push('$');
                continue;
            }
            name
        };

        let value = env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name))?;
        result.push_str(&value);
    }

    Ok(result)
}

fn expand_optional(value: Option<&str>) -> SettingsResult<Option<String>> {
    value.map(expand_env_vars).transpose()
}
