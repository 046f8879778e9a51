//! Custom `genpdf` elements used by the styled report backend.

use genpdf::error::Error;
use genpdf::style::{Style, StyledString};
use genpdf::{render, Element, Mm, Position, RenderResult, Size};

const DEFAULT_UNDERLINE_OFFSET_MM: f64 = 0.6;

pub(crate) fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

/// A single left-aligned line of text with a thin stroke underneath.
///
/// `genpdf` styles have no underline attribute, so the stroke is drawn
/// manually below the glyphs once the text has been printed.
pub struct UnderlinedHeading {
    text: String,
    underline_offset: Mm,
}

impl UnderlinedHeading {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            underline_offset: mm_from_f64(DEFAULT_UNDERLINE_OFFSET_MM),
        }
    }

    /// Sets the distance between the glyphs and the underline stroke.
    pub fn with_underline_offset(mut self, offset: Mm) -> Self {
        self.underline_offset = offset;
        self
    }
}

impl Element for UnderlinedHeading {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let mut result = RenderResult::default();
        let line_height = style.line_height(&context.font_cache);
        if line_height > area.size().height {
            result.has_more = true;
            return Ok(result);
        }

        let string = StyledString::new(self.text.clone(), style);
        let width = string.width(&context.font_cache);

        match area.text_section(&context.font_cache, Position::new(0, 0), style) {
            Some(mut section) => section.print_str(&string.s, string.style)?,
            None => {
                result.has_more = true;
                return Ok(result);
            }
        }

        let baseline = style
            .font(&context.font_cache)
            .glyph_height(style.font_size())
            + self.underline_offset;
        let mut line_style = Style::new();
        if let Some(color) = style.color() {
            line_style = line_style.with_color(color);
        }
        area.draw_line(
            vec![Position::new(0, baseline), Position::new(width, baseline)],
            line_style,
        );

        result.size = Size::new(width, line_height);
        Ok(result)
    }
}
