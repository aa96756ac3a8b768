//! Utilities for working with styled text fragments.
//!
//! A [`Span`] is the smallest unit of estimate text: a run of characters that shares one set of
//! inline attributes.  Spans stay independent of the renderer so that the document model can be
//! inspected in tests, and are turned into [`genpdf`][genpdf] styled strings only when the PDF is
//! laid out.
//!
//! [genpdf]: https://docs.rs/genpdf/

use genpdf::style::{Color, Style, StyledString};

/// A slice of text together with inline style attributes.
///
/// The attributes mirror what the estimate needs from a word processor run: bold labels such as
/// `Backend: `, colored heading text and explicit point sizes for the title block.  A `None` font
/// size means the span inherits the size of the surrounding element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Span {
    text: String,
    bold: bool,
    color: Option<Color>,
    font_size: Option<u8>,
}

impl Span {
    /// Creates a new span with the provided text and no styles applied.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Returns the raw text contained in this span.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns whether the span should be rendered in bold.
    pub fn is_bold(&self) -> bool {
        self.bold
    }

    /// Returns the configured color for the span, if any.
    pub fn color(&self) -> Option<Color> {
        self.color
    }

    /// Returns the explicit font size in points, if any.
    pub fn font_size(&self) -> Option<u8> {
        self.font_size
    }

    /// Sets the bold flag and returns the updated span.
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    /// Sets the span color and returns the updated span.
    pub fn with_color(mut self, color: Option<Color>) -> Self {
        self.color = color;
        self
    }

    /// Sets the font size in points and returns the updated span.
    pub fn with_font_size(mut self, font_size: impl Into<Option<u8>>) -> Self {
        self.font_size = font_size.into();
        self
    }

    /// Convenience shorthand that marks the span as bold.
    pub fn bold(self) -> Self {
        self.with_bold(true)
    }

    /// Convenience shorthand that assigns a color to the span.
    pub fn colored(self, color: Color) -> Self {
        self.with_color(Some(color))
    }

    /// Convenience shorthand that assigns a font size to the span.
    pub fn sized(self, font_size: u8) -> Self {
        self.with_font_size(Some(font_size))
    }

    /// Builds a [`Style`] representation for the span.
    fn to_style(&self) -> Style {
        let mut style = Style::new();
        if let Some(color) = self.color {
            style.set_color(color);
        }
        if self.bold {
            style.set_bold();
        }
        if let Some(size) = self.font_size {
            style.set_font_size(size);
        }
        style
    }

    /// Converts the span to a [`StyledString`].
    pub fn to_styled_string(&self) -> StyledString {
        StyledString::new(self.text.clone(), self.to_style())
    }
}

impl From<&Span> for StyledString {
    fn from(span: &Span) -> Self {
        span.to_styled_string()
    }
}

/// Splits a run of spans into visual lines at every `\n`.
///
/// Word processors treat an embedded newline as a line break inside the same paragraph, while
/// `genpdf` paragraphs only wrap on width.  Each returned line keeps the attributes of the span the
/// fragment came from; empty fragments are dropped but an empty line is still produced, so
/// `"a\n\nb"` yields three lines.
pub fn split_lines<'a, I>(spans: I) -> Vec<Vec<Span>>
where
    I: IntoIterator<Item = &'a Span>,
{
    let mut lines = vec![Vec::new()];

    for span in spans {
        for (index, fragment) in span.text.split('\n').enumerate() {
            if index > 0 {
                lines.push(Vec::new());
            }
            if !fragment.is_empty() {
                let mut piece = span.clone();
                piece.text = fragment.to_owned();
                if let Some(line) = lines.last_mut() {
                    line.push(piece);
                }
            }
        }
    }

    lines
}

/// Joins the text of all spans without any styling.
pub fn plain_text<'a, I>(spans: I) -> String
where
    I: IntoIterator<Item = &'a Span>,
{
    spans.into_iter().map(Span::text).collect()
}
