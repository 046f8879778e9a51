//! Font resolution for report rendering.
//!
//! The deployment environment does not guarantee any usable font, so the
//! resolver walks a fixed chain of sources and settles on the first one that
//! yields a parseable TrueType face:
//!
//! 1. the local asset file (`public/fonts/RobotoMono-Regular.ttf` by default),
//! 2. `<font base URL>/fonts/RobotoMono-Regular.ttf` over HTTP,
//! 3. the PDF writer's built-in Courier face.
//!
//! The last step cannot fail, so resolution always produces a [`ResolvedFont`].

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use genpdf::fonts::FontData;
use log::{debug, warn};
use thiserror::Error;

use crate::config::ReportConfig;

/// File name of the report font, both on disk and on the font host.
pub const FONT_FILE_NAME: &str = "RobotoMono-Regular.ttf";

/// Name recorded for the built-in fallback face.
pub const BUILTIN_FONT_NAME: &str = "Courier";

/// Why a single source in the chain did not produce a font.
#[derive(Debug, Error)]
pub enum FontSourceError {
    #[error("not found at {0}")]
    Missing(PathBuf),

    #[error("unreadable at {path}: {source}")]
    Unreadable { path: PathBuf, source: io::Error },

    #[error("fetch from {url} failed: {source}")]
    Fetch { url: String, source: reqwest::Error },

    #[error("{origin} is not a usable TrueType font: {reason}")]
    Invalid { origin: String, reason: String },
}

/// A place a font may be loaded from, tried in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FontSource {
    /// A file on the local filesystem.
    LocalFile(PathBuf),
    /// A URL serving the raw font bytes.
    Remote(String),
}

impl fmt::Display for FontSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontSource::LocalFile(path) => write!(f, "{}", path.display()),
            FontSource::Remote(url) => f.write_str(url),
        }
    }
}

/// The font handed to the renderer.
#[derive(Clone)]
pub enum ResolvedFont {
    /// Validated TrueType bytes loaded from `origin`.
    Custom { origin: String, data: Vec<u8> },
    /// The writer's built-in face; plain style only.
    Builtin,
}

impl ResolvedFont {
    /// Whether a custom face is active, as opposed to the built-in fallback.
    pub fn is_custom(&self) -> bool {
        matches!(self, ResolvedFont::Custom { .. })
    }

    /// Human readable name of the font source.
    pub fn origin(&self) -> &str {
        match self {
            ResolvedFont::Custom { origin, .. } => origin,
            ResolvedFont::Builtin => BUILTIN_FONT_NAME,
        }
    }
}

impl fmt::Debug for ResolvedFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedFont::Custom { origin, data } => f
                .debug_struct("Custom")
                .field("origin", origin)
                .field("bytes", &data.len())
                .finish(),
            ResolvedFont::Builtin => f.write_str("Builtin"),
        }
    }
}

/// Produces the font used for one render. Implementations must not fail.
#[async_trait]
pub trait ResolveFont: Send + Sync {
    async fn resolve(&self) -> ResolvedFont;
}

/// Default [`ResolveFont`] walking the local/remote/built-in chain.
#[derive(Clone, Debug)]
pub struct FontResolver {
    sources: Vec<FontSource>,
    client: reqwest::Client,
}

impl FontResolver {
    /// Resolver trying exactly `sources` before the built-in face.
    pub fn new(sources: Vec<FontSource>) -> Self {
        Self {
            sources,
            client: reqwest::Client::new(),
        }
    }

    /// Resolver for the configured font path and optional font host.
    pub fn from_config(config: &ReportConfig) -> Self {
        let mut sources = vec![FontSource::LocalFile(config.font_path.clone())];
        if let Some(base) = &config.font_base_url {
            sources.push(FontSource::Remote(remote_font_url(base)));
        }
        Self::new(sources)
    }

    pub fn sources(&self) -> &[FontSource] {
        &self.sources
    }

    async fn load(&self, source: &FontSource) -> Result<Vec<u8>, FontSourceError> {
        let data = match source {
            FontSource::LocalFile(path) => read_local(path).await?,
            FontSource::Remote(url) => self.fetch(url).await?,
        };
        validate(&source.to_string(), data)
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FontSourceError> {
        let fetch_error = |source| FontSourceError::Fetch {
            url: url.to_owned(),
            source,
        };
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(fetch_error)?;
        let bytes = response.bytes().await.map_err(fetch_error)?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ResolveFont for FontResolver {
    async fn resolve(&self) -> ResolvedFont {
        let mut attempts = Vec::new();

        for source in &self.sources {
            match self.load(source).await {
                Ok(data) => {
                    debug!("using report font from {} ({} bytes)", source, data.len());
                    return ResolvedFont::Custom {
                        origin: source.to_string(),
                        data,
                    };
                }
                Err(err) => attempts.push(err.to_string()),
            }
        }

        let summary = if attempts.is_empty() {
            "no font sources configured".to_owned()
        } else {
            attempts.join("; ")
        };
        warn!(
            "No custom report font available ({}); falling back to built-in '{}'.",
            summary, BUILTIN_FONT_NAME
        );
        ResolvedFont::Builtin
    }
}

/// `<base>/fonts/<file>` with a single separating slash.
pub fn remote_font_url(base: &str) -> String {
    format!("{}/fonts/{}", base.trim_end_matches('/'), FONT_FILE_NAME)
}

async fn read_local(path: &Path) -> Result<Vec<u8>, FontSourceError> {
    match tokio::fs::read(path).await {
        Ok(data) => Ok(data),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            Err(FontSourceError::Missing(path.to_path_buf()))
        }
        Err(source) => Err(FontSourceError::Unreadable {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Rejects bytes the layout engine would not be able to measure.
fn validate(origin: &str, data: Vec<u8>) -> Result<Vec<u8>, FontSourceError> {
    let invalid = |reason: String| FontSourceError::Invalid {
        origin: origin.to_owned(),
        reason,
    };

    if data.is_empty() {
        return Err(invalid("empty file".to_owned()));
    }

    FontData::new(data.clone(), None).map_err(|err| invalid(err.to_string()))?;
    Ok(data)
}
