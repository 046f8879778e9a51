//! Fallback backend drawing the report with `printpdf`'s built-in Courier.
//!
//! Built-in faces need no font program, so this path works even when no
//! TrueType file could be resolved.  Courier is monospaced (every glyph
//! advances 0.6 em), which makes centering and word wrapping exact without
//! glyph metrics.  Only plain style is used and text is limited to ASCII.

use printpdf::{
    BuiltinFont, Color, CustomPdfConformance, IndirectFontRef, Line, Mm, PdfConformance,
    PdfDocument, PdfDocumentReference, PdfLayerReference, Point, Rgb,
};

use super::styled::{BODY_FONT_SIZE, HEADING_FONT_SIZE, MUTED_FONT_SIZE, TITLE_FONT_SIZE};
use super::{DocumentSink, RenderError};
use crate::layout::{Block, ReportLayout};

const PAGE_WIDTH_MM: f64 = 210.0;
const PAGE_HEIGHT_MM: f64 = 297.0;
const MARGIN_MM: f64 = 18.0;
const FOOTER_BASELINE_MM: f64 = 10.0;
const FOOTER_FONT_SIZE: f64 = 8.0;
const PT_TO_MM: f64 = 0.352_778;
const GLYPH_ADVANCE_EM: f64 = 0.6;
const LINE_SPACING: f64 = 1.2;
const LAYER_NAME: &str = "Report";

/// Draws `layout` with Courier and saves the document into `sink`.
pub fn render(layout: &ReportLayout, sink: &mut DocumentSink) -> Result<(), RenderError> {
    let (document, page, layer) = PdfDocument::new(
        ascii_only(layout.title()),
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        LAYER_NAME,
    );
    // Same minimal conformance genpdf applies: no ICC profile, no XMP packet.
    let document = document.with_conformance(PdfConformance::Custom(CustomPdfConformance {
        requires_icc_profile: false,
        requires_xmp_metadata: false,
        ..Default::default()
    }));
    let font = document
        .add_builtin_font(BuiltinFont::Courier)
        .map_err(|err| RenderError::Writer(err.to_string()))?;

    {
        let first = document.get_page(page).get_layer(layer);
        let mut writer = PageWriter::new(&document, font, first);
        for block in layout.blocks() {
            writer.draw(block);
        }
    }

    document
        .save(sink.writer())
        .map_err(|err| RenderError::Writer(err.to_string()))
}

/// Cursor over the pages of a document being drawn top to bottom.
struct PageWriter<'a> {
    document: &'a PdfDocumentReference,
    font: IndirectFontRef,
    layer: PdfLayerReference,
    /// Baseline of the next line, in mm from the bottom edge.
    cursor: f64,
    page: usize,
}

impl<'a> PageWriter<'a> {
    fn new(document: &'a PdfDocumentReference, font: IndirectFontRef, first: PdfLayerReference) -> Self {
        let writer = Self {
            document,
            font,
            layer: first,
            cursor: PAGE_HEIGHT_MM - MARGIN_MM,
            page: 1,
        };
        writer.footer();
        writer
    }

    fn draw(&mut self, block: &Block) {
        match block {
            Block::Title(text) => {
                for line in wrap(text, TITLE_FONT_SIZE.into()) {
                    let x = (PAGE_WIDTH_MM - text_width(&line, TITLE_FONT_SIZE.into())) / 2.0;
                    self.line(&line, TITLE_FONT_SIZE.into(), x.max(MARGIN_MM));
                }
            }
            Block::Line(text) => self.paragraph(text, BODY_FONT_SIZE.into()),
            Block::Muted(text) => {
                self.layer.set_fill_color(gray());
                self.paragraph(text, MUTED_FONT_SIZE.into());
                self.layer.set_fill_color(black());
            }
            Block::Heading(text) => {
                let size = f64::from(HEADING_FONT_SIZE);
                let text = ascii_only(text);
                self.line(&text, size, MARGIN_MM);
                self.underline(MARGIN_MM, text_width(&text, size));
            }
            Block::Gap(lines) => {
                self.cursor -= lines * line_height(BODY_FONT_SIZE.into());
            }
        }
    }

    fn paragraph(&mut self, text: &str, size: f64) {
        for line in wrap(text, size) {
            self.line(&line, size, MARGIN_MM);
        }
    }

    fn line(&mut self, text: &str, size: f64, x: f64) {
        let height = line_height(size);
        if self.cursor - height < MARGIN_MM {
            self.next_page();
        }
        self.cursor -= height;
        self.layer
            .use_text(text, size, Mm(x), Mm(self.cursor), &self.font);
    }

    fn underline(&self, x: f64, width: f64) {
        let y = self.cursor - 1.0;
        self.layer.set_outline_thickness(0.5);
        self.layer.add_shape(Line {
            points: vec![
                (Point::new(Mm(x), Mm(y)), false),
                (Point::new(Mm(x + width), Mm(y)), false),
            ],
            is_closed: false,
            has_fill: false,
            has_stroke: true,
            is_clipping_path: false,
        });
    }

    fn next_page(&mut self) {
        let (page, layer) = self
            .document
            .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME);
        self.layer = self.document.get_page(page).get_layer(layer);
        self.cursor = PAGE_HEIGHT_MM - MARGIN_MM;
        self.page += 1;
        self.footer();
    }

    fn footer(&self) {
        let label = format!("Page {}", self.page);
        let x = PAGE_WIDTH_MM - MARGIN_MM - text_width(&label, FOOTER_FONT_SIZE);
        self.layer.set_fill_color(gray());
        self.layer
            .use_text(label, FOOTER_FONT_SIZE, Mm(x), Mm(FOOTER_BASELINE_MM), &self.font);
        self.layer.set_fill_color(black());
    }
}

fn gray() -> Color {
    Color::Rgb(Rgb::new(0.5, 0.5, 0.5, None))
}

fn black() -> Color {
    Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None))
}

fn line_height(size: f64) -> f64 {
    size * LINE_SPACING * PT_TO_MM
}

fn text_width(text: &str, size: f64) -> f64 {
    text.chars().count() as f64 * size * GLYPH_ADVANCE_EM * PT_TO_MM
}

/// Number of Courier glyphs that fit between the margins at `size`.
fn chars_per_line(size: f64) -> usize {
    let usable = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
    ((usable / (size * GLYPH_ADVANCE_EM * PT_TO_MM)).floor() as usize).max(1)
}

/// Replaces everything the built-in encoding cannot show with `?`.
fn ascii_only(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '?' })
        .collect()
}

/// Greedy word wrap; words longer than a line are split.
fn wrap(text: &str, size: f64) -> Vec<String> {
    let width = chars_per_line(size);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in ascii_only(text).split_whitespace() {
        let mut word = word.to_owned();
        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(width);
            lines.push(word);
            word = rest;
        }

        if current.is_empty() {
            current = word;
        } else if current.len() + 1 + word.len() <= width {
            current.push(' ');
            current.push_str(&word);
        } else {
            lines.push(std::mem::replace(&mut current, word));
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}
