//! Client configuration and the runtime environment it is derived from.
//!
//! # Design
//! `ClientConfig::resolve` is a pure function of an `Environment` value, so
//! the factory can be tested for every mode without touching process state.
//! `Environment::from_env` is the single place that reads the process
//! environment, and it never fails.

use std::env;
use std::time::Duration;

/// Base URL used in development. A local proxy forwards `/api` to the
/// backend, which keeps requests same-origin.
pub const DEV_PROXY_BASE_URL: &str = "/api";

/// Flat per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

const APP_MODE_VAR: &str = "APP_MODE";
const API_BASE_URL_VAR: &str = "API_BASE_URL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuntimeMode {
    Development,
    #[default]
    Production,
}

impl RuntimeMode {
    /// Exactly `"development"` selects development; everything else is
    /// production.
    pub fn parse(value: &str) -> Self {
        if value == "development" {
            RuntimeMode::Development
        } else {
            RuntimeMode::Production
        }
    }
}

/// Runtime inputs the client factory depends on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Environment {
    pub mode: RuntimeMode,
    /// Absolute backend URL used outside development.
    pub api_base_url: String,
}

impl Environment {
    pub fn development() -> Self {
        Self {
            mode: RuntimeMode::Development,
            api_base_url: String::new(),
        }
    }

    pub fn production(api_base_url: impl Into<String>) -> Self {
        Self {
            mode: RuntimeMode::Production,
            api_base_url: api_base_url.into(),
        }
    }

    /// Read `APP_MODE` and `API_BASE_URL`. Unset values fall back to
    /// production and an empty base URL.
    pub fn from_env() -> Self {
        let mode = env::var(APP_MODE_VAR)
            .map(|v| RuntimeMode::parse(&v))
            .unwrap_or_default();
        let api_base_url = env::var(API_BASE_URL_VAR).unwrap_or_default();
        Self { mode, api_base_url }
    }
}

/// Resolved, immutable client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub default_headers: Vec<(String, String)>,
    pub with_credentials: bool,
}

impl ClientConfig {
    pub fn resolve(env: &Environment) -> Self {
        let (base_url, with_credentials) = match env.mode {
            RuntimeMode::Development => (DEV_PROXY_BASE_URL.to_string(), false),
            RuntimeMode::Production => (env.api_base_url.clone(), true),
        };
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
            default_headers: vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Accept".to_string(), "application/json".to_string()),
            ],
            with_credentials,
        }
    }

    /// Join `path` onto the base URL with exactly one `/` between them.
    pub fn url_for(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            return base.to_string();
        }
        format!("{base}/{path}")
    }
}
