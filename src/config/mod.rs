//! Configuration module for Strata.
//!
//! Handles backend selection, connector settings and environment variables.

mod backend;
mod settings;

pub use backend::BackendKind;
pub use settings::{
    expand_env_vars, BigQuerySettings, CouchbaseSettings, LoggingSettings, PostgresSettings,
    Settings, SettingsError, SettingsResult, SqliteSettings,
};
