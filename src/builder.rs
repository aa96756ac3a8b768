//! Document construction and rendering for the estimate.
//!
//! [`DocumentBuilder`] prepares an empty `genpdf::Document` (fonts, paper, margins, page
//! decorator).  [`PdfBuilder`] walks a [`model::Document`](crate::model::Document) and pushes one
//! `genpdf` element per block.

use genpdf::elements::{Break, FrameCellDecorator, LinearLayout, Paragraph};
use genpdf::error::Error;
use genpdf::fonts::{FontData, FontFamily};
use genpdf::style::{self, Color, Style, StyledString};
use genpdf::{self, Alignment, Element, Margins, PageDecorator, PaperSize, Size};
use log::{debug, info};

use crate::elements::{mm_from_f64, PageMarked, PageTracker, ShadedTable, TableCellText};
use crate::error::{EstimateError, Result};
use crate::fonts;
use crate::model::{
    Block, Document, Heading, HorizontalAlignment, RichParagraph, Table, TableCell,
};
use crate::richtext::{self, Span};

/// Base font size of body text, in points.
pub const BODY_FONT_SIZE: u8 = 10;

/// Font size of numbered section headings, in points.
pub const SECTION_FONT_SIZE: u8 = 14;

const LINE_SPACING: f64 = 1.25;
const PAGE_MARGIN_MM: f64 = 20.0;
const CELL_PADDING_MM: f64 = 1.5;

const TITLE_COLOR: Color = Color::Rgb(0x17, 0x36, 0x5D);
const SECTION_HEADING_COLOR: Color = Color::Rgb(0x36, 0x5F, 0x91);
const AUTO_TEXT_ON_DARK: Color = Color::Rgb(0xFF, 0xFF, 0xFF);

/// Builder for `genpdf::Document` instances pre-configured with the estimate defaults.
pub struct DocumentBuilder {
    paper_size: Size,
    margins: Margins,
    font_family: Option<FontFamily<FontData>>,
    tracker: PageTracker,
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self {
            paper_size: PaperSize::A4.into(),
            margins: Margins::all(mm_from_f64(PAGE_MARGIN_MM)),
            font_family: None,
            tracker: PageTracker::default(),
        }
    }
}

impl DocumentBuilder {
    /// Creates a new builder instance with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses an already loaded font family instead of resolving one from disk.
    pub fn with_font_family(mut self, family: FontFamily<FontData>) -> Self {
        self.font_family = Some(family);
        self
    }

    /// Reports page starts to `tracker`.
    pub fn with_page_tracker(mut self, tracker: PageTracker) -> Self {
        self.tracker = tracker;
        self
    }

    /// Builds a fully configured `genpdf::Document` instance.
    pub fn build(self, title: &str) -> Result<genpdf::Document> {
        let font_family = match self.font_family {
            Some(family) => family,
            None => fonts::default_font_family().map_err(EstimateError::FontLoad)?,
        };

        let mut document = genpdf::Document::new(font_family);
        document.set_title(title);
        document.set_paper_size(self.paper_size);
        document.set_font_size(BODY_FONT_SIZE);
        document.set_line_spacing(LINE_SPACING);
        document.set_page_decorator(TrackingPageDecorator {
            margins: self.margins,
            tracker: self.tracker,
        });

        Ok(document)
    }
}

struct TrackingPageDecorator {
    margins: Margins,
    tracker: PageTracker,
}

impl PageDecorator for TrackingPageDecorator {
    fn decorate_page<'a>(
        &mut self,
        _context: &genpdf::Context,
        mut area: genpdf::render::Area<'a>,
        _style: style::Style,
    ) -> std::result::Result<genpdf::render::Area<'a>, Error> {
        let page = self.tracker.start_page();
        debug!("Starting page {page}");
        area.add_margins(self.margins);
        Ok(area)
    }
}

/// The rendered estimate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedPdf {
    /// Serialized PDF.
    pub bytes: Vec<u8>,
    /// Number of pages.
    pub pages: usize,
    /// Page each section heading started on, in section order.
    pub section_pages: Vec<Option<usize>>,
}

fn alignment(value: HorizontalAlignment) -> Alignment {
    match value {
        HorizontalAlignment::Left => Alignment::Left,
        HorizontalAlignment::Center => Alignment::Center,
        HorizontalAlignment::Right => Alignment::Right,
    }
}

fn line_paragraph(spans: &[Span], align: Alignment) -> Paragraph {
    let mut paragraph = Paragraph::default();
    for span in spans {
        paragraph.push(span);
    }
    paragraph.set_alignment(align);
    paragraph
}

/// Lays out a rich paragraph as one `genpdf` paragraph per visual line.
fn paragraph_layout(content: &RichParagraph) -> LinearLayout {
    let align = alignment(content.alignment());
    let mut layout = LinearLayout::vertical();
    for line in richtext::split_lines(content.spans()) {
        if line.is_empty() {
            layout.push(Break::new(1));
        } else {
            layout.push(line_paragraph(&line, align));
        }
    }
    layout
}

/// Lays out a heading.  Section headings get a leading break; `mark` records the page the heading
/// text itself lands on, so a page break right before the text is not attributed to the old page.
fn heading_element(heading: &Heading, mark: Option<(&PageTracker, usize)>) -> LinearLayout {
    let mut style = Style::new();
    match heading.level() {
        0 => style.set_color(TITLE_COLOR),
        _ => {
            style.set_bold();
            style.set_font_size(SECTION_FONT_SIZE);
            style.set_color(SECTION_HEADING_COLOR);
        }
    }

    let mut layout = LinearLayout::vertical();
    if heading.level() > 0 {
        layout.push(Break::new(0.5));
    }
    let text = paragraph_layout(heading.content()).styled(style);
    match mark {
        Some((tracker, slot)) => layout.push(PageMarked::new(text, tracker.clone(), slot)),
        None => layout.push(text),
    }
    layout.push(Break::new(0.5));
    layout
}

fn cell_text(cell: &TableCell) -> TableCellText {
    let mut style = Style::new();
    if cell.is_bold() {
        style.set_bold();
    }
    if cell.shading().is_some_and(|shading| shading.is_dark()) {
        style.set_color(AUTO_TEXT_ON_DARK);
    }

    let content = cell.content();
    let lines: Vec<Vec<StyledString>> = richtext::split_lines(content.spans())
        .iter()
        .map(|line| line.iter().map(StyledString::from).collect::<Vec<_>>())
        .collect();
    let text = TableCellText::new(lines)
        .with_alignment(alignment(content.alignment()))
        .with_style(style);

    match cell.shading() {
        Some(shading) => text.with_fill(shading.color()),
        None => text,
    }
}

/// Builds a grid table.  Tables span the text width, so the model's alignment does not move them.
fn table_element(table: &Table) -> Result<ShadedTable> {
    let mut layout = ShadedTable::new(table.column_weights().to_vec());
    layout.set_padding(mm_from_f64(CELL_PADDING_MM));
    layout.set_cell_decorator(FrameCellDecorator::new(true, true, false));

    for (index, row) in table.rows().iter().enumerate() {
        if row.cells().len() != table.column_count() {
            return Err(EstimateError::layout(format!(
                "row {index} has {} cells, expected {}",
                row.cells().len(),
                table.column_count()
            )));
        }
        layout
            .push_row(row.cells().iter().map(cell_text).collect())
            .map_err(EstimateError::Render)?;
    }

    Ok(layout)
}

/// Renders a [`Document`] to PDF bytes.
pub struct PdfBuilder<'a> {
    document: &'a Document,
    builder: DocumentBuilder,
}

impl<'a> PdfBuilder<'a> {
    /// Creates a renderer for `document` with the default page setup.
    pub fn new(document: &'a Document) -> Self {
        Self {
            document,
            builder: DocumentBuilder::new(),
        }
    }

    /// Replaces the page setup.
    pub fn with_document_builder(mut self, builder: DocumentBuilder) -> Self {
        self.builder = builder;
        self
    }

    /// Lays out every block and serializes the PDF.
    pub fn render(self) -> Result<RenderedPdf> {
        let sections = self.document.section_titles().len();
        let tracker = PageTracker::new(sections);
        let mut pdf = self
            .builder
            .with_page_tracker(tracker.clone())
            .build(self.document.title())?;

        let mut section_slot = 0;
        for block in self.document.blocks() {
            match block {
                Block::Heading(heading) if heading.level() == 1 => {
                    pdf.push(heading_element(heading, Some((&tracker, section_slot))));
                    section_slot += 1;
                }
                Block::Heading(heading) => pdf.push(heading_element(heading, None)),
                Block::Paragraph(paragraph) => {
                    let mut layout = paragraph_layout(paragraph);
                    layout.push(Break::new(0.5));
                    pdf.push(layout);
                }
                Block::Table(table) => pdf.push(table_element(table)?),
                Block::Spacer => pdf.push(Break::new(1)),
            }
        }

        let mut bytes = Vec::new();
        pdf.render(&mut bytes).map_err(EstimateError::Render)?;

        let rendered = RenderedPdf {
            bytes,
            pages: tracker.pages(),
            section_pages: tracker.marks(),
        };
        info!(
            "Rendered {} ({} pages, {} bytes)",
            self.document.title(),
            rendered.pages,
            rendered.bytes.len()
        );
        Ok(rendered)
    }

    /// Renders the document and adds one outline entry per section heading.
    #[cfg(feature = "bookmarks")]
    pub fn render_with_bookmarks(self) -> Result<RenderedPdf> {
        let titles = self.document.section_titles();
        let mut rendered = self.render()?;
        rendered.bytes = crate::bookmarks::apply_section_bookmarks(
            &rendered.bytes,
            &titles,
            &rendered.section_pages,
        )?;
        Ok(rendered)
    }
}
