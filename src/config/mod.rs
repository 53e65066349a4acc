//! Configuration module for schemascope.
//!
//! Handles the config file, environment variables, and settings.

mod settings;

pub use settings::{
    expand_env_vars, ConnectionSettings, DiagramSettings, LinkSettings, LoaderSettings, Settings,
    SettingsError, CONFIG_ENV_VAR,
};
