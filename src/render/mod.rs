//! Turns a [`ReportLayout`] into PDF bytes.
//!
//! Two backends share the layout: [`styled`] lays the report out with
//! `genpdf` when a custom TrueType face was resolved, and [`builtin`] draws
//! it directly with `printpdf`'s built-in Courier when no font is available.
//! Both write into a [`DocumentSink`], which is drained into a single buffer
//! once the document is complete.

pub mod builtin;
pub mod elements;
pub mod styled;

use std::io::{self, BufWriter, Write};

use log::debug;
use thiserror::Error;

use crate::fonts::ResolvedFont;
use crate::layout::ReportLayout;

/// Signature every finished document starts with.
pub const PDF_SIGNATURE: &[u8] = b"%PDF-";

/// Failures while producing a document.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("layout failed: {0}")]
    Layout(#[from] genpdf::error::Error),

    #[error("pdf writer failed: {0}")]
    Writer(String),

    #[error("could not drain document sink: {0}")]
    Sink(#[from] io::Error),

    #[error("document is incomplete ({0} bytes without a PDF header)")]
    Incomplete(usize),

    #[error("render task failed: {0}")]
    Task(String),
}

/// Buffered in-memory destination for one document.
///
/// Writers stream into the sink; [`DocumentSink::finish`] flushes it and
/// hands back every byte written.
#[derive(Debug)]
pub struct DocumentSink {
    writer: BufWriter<Vec<u8>>,
}

impl DocumentSink {
    pub fn new() -> Self {
        Self {
            writer: BufWriter::new(Vec::new()),
        }
    }

    /// The underlying buffered writer, for APIs that require a `BufWriter`.
    pub fn writer(&mut self) -> &mut BufWriter<Vec<u8>> {
        &mut self.writer
    }

    /// Flushes pending output and returns the complete document.
    pub fn finish(self) -> Result<Vec<u8>, RenderError> {
        let bytes = self
            .writer
            .into_inner()
            .map_err(|err| RenderError::Sink(err.into_error()))?;

        if !bytes.starts_with(PDF_SIGNATURE) {
            return Err(RenderError::Incomplete(bytes.len()));
        }
        Ok(bytes)
    }
}

impl Default for DocumentSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for DocumentSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Renders a layout with a resolved font into a finished document.
pub trait RenderDocument: Send + Sync {
    fn render(&self, layout: &ReportLayout, font: &ResolvedFont) -> Result<Vec<u8>, RenderError>;
}

/// The production renderer, dispatching on the resolved font.
#[derive(Clone, Copy, Debug, Default)]
pub struct PdfRenderer;

impl RenderDocument for PdfRenderer {
    fn render(&self, layout: &ReportLayout, font: &ResolvedFont) -> Result<Vec<u8>, RenderError> {
        let mut sink = DocumentSink::new();
        match font {
            ResolvedFont::Custom { data, .. } => styled::render(layout, data, &mut sink)?,
            ResolvedFont::Builtin => builtin::render(layout, &mut sink)?,
        }

        let bytes = sink.finish()?;
        debug!(
            "rendered '{}' with {} ({} bytes)",
            layout.title(),
            font.origin(),
            bytes.len()
        );
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_returns_everything_written() {
        let mut sink = DocumentSink::new();
        sink.write_all(b"%PDF-1.3\n").expect("write header");
        sink.write_all(&[b'x'; 10_000]).expect("write body");

        let bytes = sink.finish().expect("finish sink");
        assert_eq!(bytes.len(), 9 + 10_000);
        assert!(bytes.starts_with(PDF_SIGNATURE));
    }

    #[test]
    fn sink_rejects_output_without_header() {
        let mut sink = DocumentSink::new();
        sink.write_all(b"partial").expect("write");
        assert!(matches!(sink.finish(), Err(RenderError::Incomplete(7))));
    }
}
