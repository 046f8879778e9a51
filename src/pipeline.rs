//! The per-request export pipeline: fetch rows, resolve a font, render.
//!
//! ```text
//! FETCHING -> (empty -> NOT_FOUND) -> RESOLVING_FONT -> RENDERING -> DONE
//!     \__________________________________________\_______-> FAILED
//! ```
//!
//! Every stage is awaited in sequence and nothing is shared between
//! concurrent exports besides the read-only collaborators.

use std::sync::Arc;

use chrono::{DateTime, Local};
use log::{debug, info};
use thiserror::Error;

use crate::config::ReportConfig;
use crate::fonts::{FontResolver, ResolveFont};
use crate::layout::ReportLayout;
use crate::model::ReportKind;
use crate::render::{PdfRenderer, RenderDocument, RenderError};
use crate::store::{self, RestRowStore, RowStore, StoreError};

/// Terminal failures of an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The row store rejected or could not answer the query.
    #[error(transparent)]
    Query(#[from] StoreError),

    /// The document could not be produced.
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// A finished report.
#[derive(Clone, Debug)]
pub struct RenderedReport {
    pub kind: ReportKind,
    pub bytes: Vec<u8>,
    /// Whether a custom font was used rather than the built-in fallback.
    pub custom_font: bool,
}

impl RenderedReport {
    pub fn file_name(&self) -> &'static str {
        self.kind.file_name()
    }
}

/// Successful outcomes of an export.
#[derive(Clone, Debug)]
pub enum ExportOutcome {
    /// The table had no rows; nothing was rendered.
    NoData,
    Rendered(RenderedReport),
}

/// Wires the row store, font resolver and renderer together.
#[derive(Clone)]
pub struct ReportPipeline {
    store: Arc<dyn RowStore>,
    fonts: Arc<dyn ResolveFont>,
    renderer: Arc<dyn RenderDocument>,
}

impl ReportPipeline {
    pub fn new(
        store: Arc<dyn RowStore>,
        fonts: Arc<dyn ResolveFont>,
        renderer: Arc<dyn RenderDocument>,
    ) -> Self {
        Self {
            store,
            fonts,
            renderer,
        }
    }

    /// Production pipeline for `config`: REST row store, font chain, PDF renderer.
    pub fn from_config(config: &ReportConfig) -> Result<Self, StoreError> {
        Ok(Self::new(
            Arc::new(RestRowStore::new(config)?),
            Arc::new(FontResolver::from_config(config)),
            Arc::new(PdfRenderer),
        ))
    }

    /// The row store shared with other read endpoints.
    pub fn store(&self) -> Arc<dyn RowStore> {
        Arc::clone(&self.store)
    }

    /// Exports `kind` stamped with the current local time.
    pub async fn export(&self, kind: ReportKind) -> Result<ExportOutcome, ExportError> {
        self.export_at(kind, Local::now()).await
    }

    /// Exports `kind` with an explicit generation time.
    pub async fn export_at(
        &self,
        kind: ReportKind,
        generated_at: DateTime<Local>,
    ) -> Result<ExportOutcome, ExportError> {
        debug!("{} export: fetching rows", kind);
        let records = store::fetch_records(self.store.as_ref(), kind).await?;
        if records.is_empty() {
            info!("{} export: no rows, nothing to render", kind);
            return Ok(ExportOutcome::NoData);
        }

        debug!("{} export: resolving font", kind);
        let font = self.fonts.resolve().await;

        debug!("{} export: rendering {} records", kind, records.len());
        let layout = ReportLayout::build(&records, generated_at);
        let renderer = Arc::clone(&self.renderer);
        let custom_font = font.is_custom();
        let bytes = tokio::task::spawn_blocking(move || renderer.render(&layout, &font))
            .await
            .map_err(|err| RenderError::Task(err.to_string()))??;

        debug!("{} export: done ({} bytes)", kind, bytes.len());
        Ok(ExportOutcome::Rendered(RenderedReport {
            kind,
            bytes,
            custom_font,
        }))
    }
}
