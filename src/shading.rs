//! Background fills for table cells.

use std::fmt;

use genpdf::style::Color;

use crate::model::TableCell;

/// Errors produced while parsing a hexadecimal fill color.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShadingError {
    input: String,
    message: &'static str,
}

impl ShadingError {
    fn new(input: &str, message: &'static str) -> Self {
        Self {
            input: input.to_owned(),
            message,
        }
    }

    /// The rejected color string.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Human-readable description of the problem.
    pub fn message(&self) -> &str {
        self.message
    }
}

impl fmt::Display for ShadingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid shading color `{}`: {}", self.input, self.message)
    }
}

impl std::error::Error for ShadingError {}

/// An opaque RGB cell fill.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Shading {
    r: u8,
    g: u8,
    b: u8,
}

impl Shading {
    /// Creates a fill from its RGB components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses a six digit hexadecimal color such as `E8E8E8` or `#4472c4`.
    pub fn from_hex(input: &str) -> Result<Self, ShadingError> {
        let trimmed = input.trim();
        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);

        if hex.len() != 6 {
            return Err(ShadingError::new(input, "expected 6 hexadecimal digits"));
        }
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ShadingError::new(
                input,
                "use hexadecimal digits only (0-9, A-F)",
            ));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|_| ShadingError::new(input, "channel out of range"))
        };

        Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Returns the fill as uppercase hex without a leading `#`.
    pub fn to_hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Returns `true` for fills dark enough that automatic text color switches to white.
    pub fn is_dark(self) -> bool {
        let luma = 299 * u32::from(self.r) + 587 * u32::from(self.g) + 114 * u32::from(self.b);
        luma < 128_000
    }

    /// Converts the fill into a `genpdf` color.
    pub fn color(self) -> Color {
        Color::Rgb(self.r, self.g, self.b)
    }
}

/// Applies a background fill color to a table cell.
///
/// The color is parsed before the cell is touched, so a rejected color leaves the cell exactly as
/// it was.
pub fn set_cell_shading(cell: &mut TableCell, color: &str) -> Result<(), ShadingError> {
    let shading = Shading::from_hex(color)?;
    cell.set_shading(Some(shading));
    Ok(())
}
