//! `genpdf` backend used when a custom TrueType face was resolved.

use genpdf::elements::{Break, Paragraph};
use genpdf::error::{Error, ErrorKind};
use genpdf::fonts::{FontData, FontFamily};
use genpdf::style::{Color, Style};
use genpdf::{Alignment, Element, Margins, Mm, PageDecorator, Position};

use super::elements::{mm_from_f64, UnderlinedHeading};
use super::{DocumentSink, RenderError};
use crate::layout::{Block, ReportLayout};

pub(crate) const TITLE_FONT_SIZE: u8 = 18;
pub(crate) const HEADING_FONT_SIZE: u8 = 14;
pub(crate) const BODY_FONT_SIZE: u8 = 12;
pub(crate) const MUTED_FONT_SIZE: u8 = 10;
const FOOTER_FONT_SIZE: u8 = 8;
const FOOTER_HEIGHT_MM: f64 = 8.0;
const LINE_SPACING: f64 = 1.2;
const MUTED_GRAY: Color = Color::Rgb(128, 128, 128);

/// Lays `layout` out with the face in `font` and writes it to `sink`.
///
/// The single face backs every style slot of the family, so bold or italic
/// requests degrade to the regular glyphs instead of failing.
pub fn render(layout: &ReportLayout, font: &[u8], sink: &mut DocumentSink) -> Result<(), RenderError> {
    let data = FontData::new(font.to_vec(), None)?;
    let family = FontFamily {
        regular: data.clone(),
        bold: data.clone(),
        italic: data.clone(),
        bold_italic: data,
    };

    let mut document = genpdf::Document::new(family);
    document.set_title(layout.title());
    document.set_minimal_conformance();
    document.set_font_size(BODY_FONT_SIZE);
    document.set_line_spacing(LINE_SPACING);
    document.set_page_decorator(ReportPageDecorator::new(Margins::trbl(18, 18, 10, 18)));

    for block in layout.blocks() {
        match block {
            Block::Title(text) => document.push(
                Paragraph::new(text.as_str())
                    .aligned(Alignment::Center)
                    .styled(Style::new().with_font_size(TITLE_FONT_SIZE)),
            ),
            Block::Line(text) => document.push(Paragraph::new(text.as_str())),
            Block::Muted(text) => document.push(
                Paragraph::new(text.as_str()).styled(
                    Style::new()
                        .with_font_size(MUTED_FONT_SIZE)
                        .with_color(MUTED_GRAY),
                ),
            ),
            Block::Heading(text) => document.push(
                UnderlinedHeading::new(text.as_str())
                    .with_underline_offset(mm_from_f64(0.8))
                    .styled(Style::new().with_font_size(HEADING_FONT_SIZE)),
            ),
            Block::Gap(lines) => document.push(Break::new(*lines)),
        }
    }

    document.render(sink)?;
    Ok(())
}

/// Applies page margins and prints a `Page N` footer on every page.
struct ReportPageDecorator {
    page: usize,
    margins: Margins,
    footer_height: Mm,
}

impl ReportPageDecorator {
    fn new(margins: Margins) -> Self {
        Self {
            page: 0,
            margins,
            footer_height: mm_from_f64(FOOTER_HEIGHT_MM),
        }
    }
}

impl PageDecorator for ReportPageDecorator {
    fn decorate_page<'a>(
        &mut self,
        context: &genpdf::Context,
        mut area: genpdf::render::Area<'a>,
        style: Style,
    ) -> Result<genpdf::render::Area<'a>, Error> {
        self.page += 1;
        area.add_margins(self.margins);

        let available = area.size().height;
        if self.footer_height > available {
            return Err(Error::new(
                "Footer height exceeds available space",
                ErrorKind::InvalidData,
            ));
        }

        let mut footer_area = area.clone();
        footer_area.add_offset(Position::new(0, available - self.footer_height));
        let mut footer = Paragraph::new(format!("Page {}", self.page))
            .aligned(Alignment::Right)
            .styled(
                Style::new()
                    .with_font_size(FOOTER_FONT_SIZE)
                    .with_color(MUTED_GRAY),
            );
        let result = footer.render(context, footer_area, style)?;
        if result.has_more {
            return Err(Error::new(
                "Page footer does not fit into the reserved space",
                ErrorKind::PageSizeExceeded,
            ));
        }

        area.set_height(available - self.footer_height);
        Ok(area)
    }
}
