//! Data structures describing the logical content of the estimate.
//!
//! The types in this module mirror the handful of building blocks a word processor offers
//! (headings, paragraphs, grid tables with shaded cells) and intentionally avoid referencing the
//! rendering crate, so the assembled document can be inspected in tests without loading fonts or
//! producing PDF bytes.  [`crate::builder::PdfBuilder`] maps them onto `genpdf` elements.

use crate::error::{EstimateError, Result};
use crate::richtext::{self, Span};
use crate::shading::Shading;

/// Horizontal placement of paragraphs, headings and tables.
///
/// The variants map directly to [`genpdf::Alignment`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HorizontalAlignment {
    /// Left aligned content.
    #[default]
    Left,
    /// Center aligned content.
    Center,
    /// Right aligned content.
    Right,
}

/// Rich text paragraph carrying inline styling information and alignment metadata.
///
/// Newlines inside span text are line breaks within the paragraph, see
/// [`richtext::split_lines`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RichParagraph {
    spans: Vec<Span>,
    alignment: HorizontalAlignment,
}

impl RichParagraph {
    /// Creates a paragraph from the provided spans using left alignment.
    pub fn new(spans: impl Into<Vec<Span>>) -> Self {
        Self {
            spans: spans.into(),
            ..Self::default()
        }
    }

    /// Creates a paragraph holding a single unstyled span.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(vec![Span::new(text)])
    }

    /// Returns the spans that make up the paragraph.
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Returns the configured alignment.
    pub fn alignment(&self) -> HorizontalAlignment {
        self.alignment
    }

    /// Returns the paragraph text without styling.
    pub fn text(&self) -> String {
        richtext::plain_text(&self.spans)
    }

    /// Appends a span in place.
    pub fn push(&mut self, span: Span) {
        self.spans.push(span);
    }

    /// Sets the alignment and returns the updated paragraph.
    pub fn with_alignment(mut self, alignment: HorizontalAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Returns `true` if the paragraph carries no visible text.
    pub fn is_empty(&self) -> bool {
        self.spans.iter().all(|span| span.text().is_empty())
    }
}

/// A heading line.  Level `0` is the document title, level `1` starts a numbered section.
#[derive(Clone, Debug, PartialEq)]
pub struct Heading {
    level: u8,
    content: RichParagraph,
}

impl Heading {
    /// Creates a heading from styled content.
    pub fn new(level: u8, content: RichParagraph) -> Self {
        Self { level, content }
    }

    /// Returns the heading level.
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Returns the styled heading content.
    pub fn content(&self) -> &RichParagraph {
        &self.content
    }

    /// Returns the heading text without styling.
    pub fn text(&self) -> String {
        self.content.text()
    }
}

/// A single table cell.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableCell {
    content: RichParagraph,
    shading: Option<Shading>,
    bold: bool,
}

impl TableCell {
    /// Creates a cell holding plain text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            content: RichParagraph::plain(text),
            ..Self::default()
        }
    }

    /// Returns the cell text without styling.
    pub fn text(&self) -> String {
        self.content.text()
    }

    /// Returns the styled cell content.
    pub fn content(&self) -> &RichParagraph {
        &self.content
    }

    /// Replaces the cell content with plain text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.content = RichParagraph::plain(text);
    }

    /// Returns the background fill, if any.
    pub fn shading(&self) -> Option<Shading> {
        self.shading
    }

    /// Sets or clears the background fill.
    pub fn set_shading(&mut self, shading: Option<Shading>) {
        self.shading = shading;
    }

    /// Returns whether every run in the cell is rendered bold.
    pub fn is_bold(&self) -> bool {
        self.bold
    }

    /// Marks every run in the cell as bold.
    pub fn set_bold(&mut self, bold: bool) {
        self.bold = bold;
    }
}

/// An ordered row of cells.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableRow {
    cells: Vec<TableCell>,
}

impl TableRow {
    fn with_columns(columns: usize) -> Self {
        Self {
            cells: vec![TableCell::default(); columns],
        }
    }

    /// Returns the cells of the row.
    pub fn cells(&self) -> &[TableCell] {
        &self.cells
    }

    /// Returns mutable access to the cells of the row.
    pub fn cells_mut(&mut self) -> &mut [TableCell] {
        &mut self.cells
    }

    /// Returns the texts of all cells.
    pub fn texts(&self) -> Vec<String> {
        self.cells.iter().map(TableCell::text).collect()
    }
}

/// A grid table whose rows always have exactly [`Table::column_count`] cells.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    rows: Vec<TableRow>,
    columns: usize,
    column_weights: Vec<usize>,
    alignment: HorizontalAlignment,
}

impl Table {
    /// Creates a table with `rows` rows of `columns` empty cells.
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows: (0..rows).map(|_| TableRow::with_columns(columns)).collect(),
            columns,
            column_weights: vec![1; columns],
            alignment: HorizontalAlignment::Left,
        }
    }

    /// Returns the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns
    }

    /// Returns all rows.
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    /// Returns the row at `index`, if any.
    pub fn row(&self, index: usize) -> Option<&TableRow> {
        self.rows.get(index)
    }

    /// Appends a row of empty cells and returns it for filling.
    pub fn add_row(&mut self) -> &mut TableRow {
        self.rows.push(TableRow::with_columns(self.columns));
        let last = self.rows.len() - 1;
        &mut self.rows[last]
    }

    /// Returns the cell at the given coordinate, if any.
    pub fn cell(&self, row: usize, column: usize) -> Option<&TableCell> {
        self.rows.get(row).and_then(|r| r.cells.get(column))
    }

    /// Returns mutable access to the cell at the given coordinate.
    pub fn cell_mut(&mut self, row: usize, column: usize) -> Result<&mut TableCell> {
        let (rows, columns) = (self.rows.len(), self.columns);
        self.rows
            .get_mut(row)
            .and_then(|r| r.cells.get_mut(column))
            .ok_or_else(|| {
                EstimateError::layout(format!(
                    "cell ({row}, {column}) is outside a {rows}x{columns} table"
                ))
            })
    }

    /// Replaces the text of the cell at the given coordinate.
    pub fn set_text(&mut self, row: usize, column: usize, text: impl Into<String>) -> Result<()> {
        self.cell_mut(row, column)?.set_text(text);
        Ok(())
    }

    /// Returns the relative column widths.
    pub fn column_weights(&self) -> &[usize] {
        &self.column_weights
    }

    /// Sets the relative column widths; there must be one non-zero weight per column.
    pub fn set_column_weights(&mut self, weights: Vec<usize>) -> Result<()> {
        if weights.len() != self.columns || weights.contains(&0) {
            return Err(EstimateError::layout(format!(
                "expected {} non-zero column weights, got {:?}",
                self.columns, weights
            )));
        }
        self.column_weights = weights;
        Ok(())
    }

    /// Returns the table alignment on the page.
    pub fn alignment(&self) -> HorizontalAlignment {
        self.alignment
    }

    /// Sets the table alignment on the page.
    pub fn set_alignment(&mut self, alignment: HorizontalAlignment) {
        self.alignment = alignment;
    }
}

/// Individual content blocks in emission order.
#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    /// Title or section heading.
    Heading(Heading),
    /// Styled paragraph content.
    Paragraph(RichParagraph),
    /// Grid table.
    Table(Table),
    /// An empty paragraph used for vertical spacing.
    Spacer,
}

impl Block {
    /// Convenience helper for building a plain heading block.
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Self::Heading(Heading::new(level, RichParagraph::plain(text)))
    }
}

/// The whole document: a title for the PDF metadata plus the ordered blocks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    title: String,
    blocks: Vec<Block>,
}

impl Document {
    /// Creates an empty document with the given metadata title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            blocks: Vec::new(),
        }
    }

    /// Returns the metadata title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the blocks in emission order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Appends a block.
    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Appends a block and returns the updated document.
    pub fn with_block(mut self, block: Block) -> Self {
        self.push(block);
        self
    }

    /// Iterates over all tables in emission order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Table(table) => Some(table),
            _ => None,
        })
    }

    /// Iterates over all headings in emission order.
    pub fn headings(&self) -> impl Iterator<Item = &Heading> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Heading(heading) => Some(heading),
            _ => None,
        })
    }

    /// Returns the section titles, i.e. the text of every level-1 heading.
    pub fn section_titles(&self) -> Vec<String> {
        self.headings()
            .filter(|heading| heading.level() == 1)
            .map(Heading::text)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_table_has_requested_shape() {
        let table = Table::new(4, 2);
        assert_eq!(table.row_count(), 4);
        assert_eq!(table.column_count(), 2);
        assert!(table.rows().iter().all(|row| row.cells().len() == 2));
    }

    #[test]
    fn add_row_matches_column_count() {
        let mut table = Table::new(1, 4);
        let row = table.add_row();
        assert_eq!(row.cells().len(), 4);
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn cell_out_of_range_is_a_layout_error() {
        let mut table = Table::new(3, 2);
        let err = table.set_text(3, 0, "대표:").unwrap_err();
        assert!(matches!(err, EstimateError::Layout(_)));
        assert!(table.set_text(0, 2, "x").is_err());
        assert!(table.set_text(2, 1, "대표:").is_ok());
    }

    #[test]
    fn column_weights_must_match_columns() {
        let mut table = Table::new(1, 4);
        assert!(table.set_column_weights(vec![1, 2]).is_err());
        assert!(table.set_column_weights(vec![1, 0, 1, 1]).is_err());
        assert!(table.set_column_weights(vec![3, 6, 2, 3]).is_ok());
        assert_eq!(table.column_weights(), &[3, 6, 2, 3]);
    }

    #[test]
    fn section_titles_skip_the_document_title() {
        let document = Document::new("doc")
            .with_block(Block::heading(0, "Title"))
            .with_block(Block::heading(1, "1. Intro"))
            .with_block(Block::Spacer)
            .with_block(Block::heading(1, "2. Body"));
        assert_eq!(document.section_titles(), vec!["1. Intro", "2. Body"]);
    }

    #[test]
    fn empty_paragraph_detection() {
        assert!(RichParagraph::default().is_empty());
        assert!(RichParagraph::plain("").is_empty());
        assert!(!RichParagraph::plain("합계").is_empty());
    }
}
