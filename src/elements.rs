//! Element implementations built on top of `genpdf` primitives.
//!
//! `genpdf` has no notion of cell backgrounds or of "which page did this land on", both of which the
//! estimate needs.  [`ShadedTable`] lays out a grid whose cells may carry a fill and
//! [`PageMarked`] reports the page an element started on to a shared [`PageTracker`].

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use genpdf::elements::{Break, CellDecorator, Paragraph};
use genpdf::error::{Error, ErrorKind};
use genpdf::style::{Color, Style, StyledString};
use genpdf::{render, Alignment, Context, Element, Margins, Mm, Position, RenderResult};

const FILL_STROKE_STEP_MM: f64 = 0.25;

pub(crate) fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

pub(crate) fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

/// Vertical offsets of the horizontal strokes that fill a band of the given height.
///
/// `genpdf` can only stroke lines, so a fill is drawn as closely spaced strokes whose default
/// width slightly exceeds the step.
fn fill_offsets(height_mm: f64) -> Vec<f64> {
    let mut offsets = Vec::new();
    let mut y = FILL_STROKE_STEP_MM / 2.0;
    while y < height_mm {
        offsets.push(y);
        y += FILL_STROKE_STEP_MM;
    }
    offsets
}

fn fill_area(area: &render::Area<'_>, fill: Color, height: Mm) {
    let width = area.size().width;
    let stroke = Style::new().with_color(fill);
    for y in fill_offsets(mm_to_f64(height)) {
        let y = mm_from_f64(y);
        area.draw_line(vec![Position::new(0, y), Position::new(width, y)], stroke);
    }
}

/// Splits styled strings into words the same way `genpdf` paragraphs do: after every space.
fn words<'a>(line: &'a [StyledString], style: Style) -> impl Iterator<Item = StyledString> + 'a {
    line.iter().flat_map(move |s| {
        let word_style = style.and(s.style);
        s.s.split_inclusive(' ')
            .map(move |word| StyledString::new(word, word_style))
    })
}

/// Counts the lines a paragraph holding `line` wraps into at the given width.
///
/// Mirrors the greedy wrapping of `genpdf::elements::Paragraph` without hyphenation.
fn wrapped_line_count(context: &Context, line: &[StyledString], style: Style, width: Mm) -> usize {
    let mut lines = 0;
    let mut x = Mm::default();
    for word in words(line, style) {
        let word_width = word.width(&context.font_cache);
        if lines > 0 && x + word_width > width {
            lines += 1;
            x = word_width;
        } else {
            if lines == 0 {
                lines = 1;
            }
            x += word_width;
        }
    }
    lines
}

/// Text content of one [`ShadedTable`] cell.
///
/// Each entry of `lines` is one visual line that may wrap further; an empty entry is a blank
/// line.  Keeping the text instead of a finished element lets the table measure a row before
/// anything is drawn.
#[derive(Clone, Debug, Default)]
pub struct TableCellText {
    lines: Vec<Vec<StyledString>>,
    alignment: Alignment,
    style: Style,
    fill: Option<Color>,
}

impl TableCellText {
    /// Creates a cell from its visual lines.
    pub fn new(lines: Vec<Vec<StyledString>>) -> Self {
        Self {
            lines,
            ..Self::default()
        }
    }

    /// Sets the alignment of every line.
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Sets the style merged into the table style for this cell.
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Paints the cell background with `fill`.
    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = Some(fill);
        self
    }

    fn content_height(&self, context: &Context, style: Style, width: Mm) -> Mm {
        let mut style = style;
        style.merge(self.style);
        let line_height = style.line_height(&context.font_cache);

        let count: usize = self
            .lines
            .iter()
            .map(|line| wrapped_line_count(context, line, style, width).max(1))
            .sum();
        line_height * count.max(1) as f64
    }

    fn render_content(
        &self,
        context: &Context,
        mut area: render::Area<'_>,
        style: Style,
    ) -> Result<(), Error> {
        let mut style = style;
        style.merge(self.style);

        for line in &self.lines {
            let result = if line.is_empty() {
                Break::new(1).render(context, area.clone(), style)?
            } else {
                let mut paragraph = Paragraph::default();
                for s in line {
                    paragraph.push(s.clone());
                }
                paragraph.set_alignment(self.alignment);
                paragraph.render(context, area.clone(), style)?
            };
            area.add_offset(Position::new(0, result.size.height));
        }
        Ok(())
    }
}

/// A grid table whose cells can be painted with a background color, the way shaded
/// word-processor cells look.
///
/// Every row is measured first.  Fills then cover the full row height, the text is drawn on top of
/// them and the cell decorator frames the cells last.  Rows are never split across pages.
pub struct ShadedTable {
    column_weights: Vec<usize>,
    rows: Vec<Vec<TableCellText>>,
    padding: Mm,
    render_idx: usize,
    cell_decorator: Option<Box<dyn CellDecorator>>,
}

impl ShadedTable {
    /// Creates an empty table with the given relative column widths.
    pub fn new(column_weights: Vec<usize>) -> Self {
        Self {
            column_weights,
            rows: Vec::new(),
            padding: Mm::default(),
            render_idx: 0,
            cell_decorator: None,
        }
    }

    /// Sets the padding between the cell edges and the text.
    pub fn set_padding(&mut self, padding: impl Into<Mm>) {
        self.padding = padding.into();
    }

    /// Sets the decorator drawn over every cell once its row is complete.
    pub fn set_cell_decorator(&mut self, decorator: impl CellDecorator + 'static) {
        self.cell_decorator = Some(Box::new(decorator));
    }

    /// Appends a row; it must hold one cell per column.
    pub fn push_row(&mut self, row: Vec<TableCellText>) -> Result<(), Error> {
        if row.len() != self.column_weights.len() {
            return Err(Error::new(
                format!(
                    "Expected {} cells in table row, received {}",
                    self.column_weights.len(),
                    row.len()
                ),
                ErrorKind::InvalidData,
            ));
        }
        self.rows.push(row);
        Ok(())
    }

    fn row_height(&self, context: &Context, areas: &[render::Area<'_>], style: Style) -> Mm {
        let padding = self.padding * 2.0;
        self.rows[self.render_idx]
            .iter()
            .zip(areas)
            .map(|(cell, area)| {
                cell.content_height(context, style, area.size().width - padding) + padding
            })
            .fold(Mm::default(), Mm::max)
    }
}

impl Element for ShadedTable {
    fn render(
        &mut self,
        context: &Context,
        mut area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let mut result = RenderResult::default();
        if self.column_weights.is_empty() {
            return Ok(result);
        }
        if let Some(decorator) = &mut self.cell_decorator {
            decorator.set_table_size(self.column_weights.len(), self.rows.len());
        }

        while self.render_idx < self.rows.len() {
            let areas = area.split_horizontally(&self.column_weights);
            let height = self.row_height(context, &areas, style);
            if height > area.size().height {
                result.has_more = true;
                break;
            }

            let row = &self.rows[self.render_idx];
            for (cell, cell_area) in row.iter().zip(&areas) {
                if let Some(fill) = cell.fill {
                    fill_area(cell_area, fill, height);
                }
            }
            for (cell, cell_area) in row.iter().zip(&areas) {
                let mut content_area = cell_area.clone();
                content_area.add_margins(Margins::all(self.padding));
                cell.render_content(context, content_area, style)?;
            }
            if let Some(decorator) = &mut self.cell_decorator {
                for (column, mut cell_area) in areas.into_iter().enumerate() {
                    cell_area.set_height(height);
                    decorator.decorate_cell(column, self.render_idx, false, cell_area, style);
                }
            }

            result.size.width = area.size().width;
            result.size.height += height;
            area.add_offset(Position::new(0, height));
            self.render_idx += 1;
        }
        Ok(result)
    }
}

/// Shared page bookkeeping between the page decorator and [`PageMarked`] elements.
///
/// The decorator calls [`PageTracker::start_page`] before anything is laid out on a page, so the
/// current page number is always the page elements are being rendered onto.
#[derive(Clone, Debug, Default)]
pub struct PageTracker {
    current: Rc<Cell<usize>>,
    marks: Rc<RefCell<Vec<Option<usize>>>>,
}

impl PageTracker {
    /// Creates a tracker with room for `slots` marked elements.
    pub fn new(slots: usize) -> Self {
        Self {
            current: Rc::new(Cell::new(0)),
            marks: Rc::new(RefCell::new(vec![None; slots])),
        }
    }

    /// Advances to the next page and returns its 1-based number.
    pub fn start_page(&self) -> usize {
        let page = self.current.get() + 1;
        self.current.set(page);
        page
    }

    /// Returns the number of pages started so far.
    pub fn pages(&self) -> usize {
        self.current.get()
    }

    /// Records the current page for `slot` unless the slot already has one.
    pub fn mark(&self, slot: usize) {
        let page = self.current.get();
        let mut marks = self.marks.borrow_mut();
        if let Some(entry) = marks.get_mut(slot) {
            entry.get_or_insert(page);
        }
    }

    /// Returns the recorded page for every slot.
    pub fn marks(&self) -> Vec<Option<usize>> {
        self.marks.borrow().clone()
    }
}

/// Wraps an element and records the page its first visible part was rendered on.
pub struct PageMarked<E: Element> {
    inner: E,
    tracker: PageTracker,
    slot: usize,
}

impl<E: Element> PageMarked<E> {
    /// Wraps `inner`, reporting into `slot` of `tracker`.
    pub fn new(inner: E, tracker: PageTracker, slot: usize) -> Self {
        Self {
            inner,
            tracker,
            slot,
        }
    }
}

impl<E: Element> Element for PageMarked<E> {
    fn render(
        &mut self,
        context: &Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let result = self.inner.render(context, area, style)?;
        if result.size.height > Mm::default() {
            self.tracker.mark(self.slot);
        }
        Ok(result)
    }
}
