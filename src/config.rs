//! Explicit configuration handed to the report pipeline at construction time.

use std::path::PathBuf;

use thiserror::Error;

/// Default location of the bundled report font relative to the working directory.
pub const DEFAULT_FONT_PATH: &str = "public/fonts/RobotoMono-Regular.ttf";

/// Errors raised while validating a [`ReportConfig`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must not be empty")]
    Missing(&'static str),

    #[error("{field} must be an http(s) URL, got '{value}'")]
    InvalidUrl { field: &'static str, value: String },
}

/// Settings for the row store and the font sources.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportConfig {
    /// Base URL of the hosted database, e.g. `https://project.supabase.co`.
    pub store_url: String,
    /// API key sent as both `apikey` and bearer token.
    pub store_key: String,
    /// Base URL serving `/fonts/<file>`; remote font lookup is skipped when unset.
    pub font_base_url: Option<String>,
    /// Local path of the report font.
    pub font_path: PathBuf,
}

impl ReportConfig {
    pub fn new(store_url: impl Into<String>, store_key: impl Into<String>) -> Self {
        Self {
            store_url: store_url.into(),
            store_key: store_key.into(),
            font_base_url: None,
            font_path: PathBuf::from(DEFAULT_FONT_PATH),
        }
    }

    /// Sets the remote font base URL and returns the updated configuration.
    pub fn with_font_base_url(mut self, url: impl Into<Option<String>>) -> Self {
        self.font_base_url = url.into().filter(|url| !url.trim().is_empty());
        self
    }

    /// Sets the local font path and returns the updated configuration.
    pub fn with_font_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.font_path = path.into();
        self
    }

    /// Checks that the store coordinates are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store_url.trim().is_empty() {
            return Err(ConfigError::Missing("store_url"));
        }
        ensure_http_url("store_url", &self.store_url)?;

        if self.store_key.trim().is_empty() {
            return Err(ConfigError::Missing("store_key"));
        }

        if let Some(url) = &self.font_base_url {
            ensure_http_url("font_base_url", url)?;
        }

        Ok(())
    }
}

fn ensure_http_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    let value = value.trim();
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidUrl {
            field,
            value: value.to_owned(),
        })
    }
}
