use std::path::PathBuf;

use chrono::NaiveDate;
use estimate_pdf::builder::{DocumentBuilder, PdfBuilder, RenderedPdf, BODY_FONT_SIZE};
use estimate_pdf::estimate::build_estimate;
use estimate_pdf::fonts;
use estimate_pdf::model::{Block, Document, Table};
use estimate_pdf::output::{build_and_save, GenerationOptions};
use estimate_pdf::{set_cell_shading, EstimateError};
use genpdf::fonts::{FontCache, FontData, FontFamily};
use genpdf::style::Style;
use lopdf::content::{Content, Operation};
use sha2::{Digest, Sha256};

const SKIP_HINT: &str =
    "Korean fonts missing. Set ESTIMATE_FONTS_DIR or copy malgun.ttf/malgunbd.ttf into assets/fonts.";

const ANY_FONT_HINT: &str = "no TrueType font found. Set ESTIMATE_TEST_FONT to a .ttf file.";

/// Height of the text area of an A4 page with the default 20 mm margins.
const TEXT_HEIGHT_MM: f64 = 257.0;

fn system_ttf_files() -> Vec<PathBuf> {
    let mut pending: Vec<PathBuf> = [
        "/usr/share/fonts",
        "/usr/local/share/fonts",
        "/Library/Fonts",
        "C:\\Windows\\Fonts",
    ]
    .iter()
    .map(PathBuf::from)
    .collect();

    let mut files = Vec::new();
    while let Some(dir) = pending.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for path in entries.flatten().map(|entry| entry.path()) {
            if path.is_dir() {
                pending.push(path);
            } else if path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("ttf"))
            {
                files.push(path);
            }
        }
    }
    files.sort();
    files
}

/// The Korean family when installed, otherwise the first TrueType face that loads from
/// `ESTIMATE_TEST_FONT` or the usual system font directories.
fn any_font_family() -> Option<FontFamily<FontData>> {
    if let Ok(family) = fonts::default_font_family() {
        return Some(family);
    }

    let mut candidates: Vec<PathBuf> = std::env::var_os("ESTIMATE_TEST_FONT")
        .map(PathBuf::from)
        .into_iter()
        .collect();
    candidates.extend(system_ttf_files());

    candidates.into_iter().find_map(|path| {
        let face = FontData::load(&path, None).ok()?;
        Some(FontFamily {
            regular: face.clone(),
            bold: face.clone(),
            italic: face.clone(),
            bold_italic: face,
        })
    })
}

fn render_with(document: &Document, family: FontFamily<FontData>) -> RenderedPdf {
    PdfBuilder::new(document)
        .with_document_builder(DocumentBuilder::new().with_font_family(family))
        .render()
        .expect("render document")
}

fn render_with_any_font(document: &Document) -> Option<RenderedPdf> {
    any_font_family().map(|family| render_with(document, family))
}

fn page_operations(bytes: &[u8]) -> Vec<Vec<Operation>> {
    let pdf = lopdf::Document::load_mem(bytes).expect("reload rendered pdf");
    pdf.get_pages()
        .values()
        .map(|page_id| {
            let content = pdf.get_page_content(*page_id).expect("page content");
            Content::decode(&content)
                .expect("decode page content")
                .operations
        })
        .collect()
}

/// Indices of the `S` operations stroked in a color other than black.
fn colored_strokes(operations: &[Operation]) -> Vec<usize> {
    let mut colored = false;
    let mut strokes = Vec::new();
    for (index, operation) in operations.iter().enumerate() {
        match operation.operator.as_str() {
            "RG" => {
                colored = operation
                    .operands
                    .iter()
                    .any(|value| value.as_float().is_ok_and(|component| component > 0.0));
            }
            "S" if colored => strokes.push(index),
            _ => {}
        }
    }
    strokes
}

fn text_operations(operations: &[Operation]) -> Vec<usize> {
    operations
        .iter()
        .enumerate()
        .filter(|(_, operation)| matches!(operation.operator.as_str(), "Tj" | "TJ"))
        .map(|(index, _)| index)
        .collect()
}

fn labelled_row(value: &str) -> Document {
    let mut table = Table::new(1, 2);
    table.set_text(0, 0, "Label").unwrap();
    table.set_text(0, 1, value).unwrap();
    set_cell_shading(table.cell_mut(0, 0).unwrap(), "E8E8E8").unwrap();
    Document::new("Rows").with_block(Block::Table(table))
}

fn issued() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 14).unwrap()
}

fn render_estimate_pdf(date: NaiveDate) -> Option<Vec<u8>> {
    if !fonts::default_fonts_available() {
        return None;
    }

    let document = build_estimate(date).expect("assemble estimate");
    let rendered = PdfBuilder::new(&document)
        .render()
        .expect("render estimate pdf");
    Some(rendered.bytes)
}

/// Blanks out the value following each `marker` up to `terminator`, keeping the byte length.
fn blank_after(data: &mut [u8], marker: &[u8], terminator: &[u8], keep: &[u8]) {
    let mut offset = 0;
    while let Some(found) = data[offset..]
        .windows(marker.len())
        .position(|window| window == marker)
    {
        let start = offset + found + marker.len();
        let Some(length) = data[start..]
            .windows(terminator.len())
            .position(|window| window == terminator)
        else {
            break;
        };
        for byte in &mut data[start..start + length] {
            if !keep.contains(byte) {
                *byte = b'0';
            }
        }
        offset = start + length + terminator.len();
    }
}

fn scrub_pdf(bytes: &[u8]) -> Vec<u8> {
    const WHITESPACE: &[u8] = b" \n\r\t";
    let mut normalized = bytes.to_vec();

    blank_after(&mut normalized, b"/CreationDate(", b")", b"");
    blank_after(&mut normalized, b"/ModDate(", b")", b"");
    blank_after(&mut normalized, b"/Producer(", b")", b"");
    blank_after(&mut normalized, b"/ID[", b"]", b"<> \n\r\t");

    for tag in [
        "xmp:CreateDate",
        "xmp:ModifyDate",
        "xmp:MetadataDate",
        "xmpMM:DocumentID",
        "xmpMM:InstanceID",
        "xmpMM:VersionID",
    ] {
        let open = format!("<{tag}>");
        let close = format!("</{tag}>");
        blank_after(&mut normalized, open.as_bytes(), close.as_bytes(), WHITESPACE);
    }

    normalized
}

fn normalized_hash(bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(scrub_pdf(bytes)).into()
}

#[test]
fn scrubbing_keeps_length_and_blanks_dates() {
    let raw = b"<< /CreationDate(D:20250714) /ID[<ab> <cd>] >>";
    let scrubbed = scrub_pdf(raw);
    assert_eq!(scrubbed.len(), raw.len());
    assert_eq!(scrubbed, b"<< /CreationDate(0000000000) /ID[<00> <00>] >>".to_vec());
}

#[test]
fn renders_a_pdf() {
    let Some(bytes) = render_estimate_pdf(issued()) else {
        eprintln!("Skipping renders_a_pdf: {SKIP_HINT}");
        return;
    };
    assert!(bytes.starts_with(b"%PDF"), "output should carry a PDF header");
}

#[test]
fn rendering_is_deterministic() {
    let (Some(bytes_a), Some(bytes_b)) = (render_estimate_pdf(issued()), render_estimate_pdf(issued()))
    else {
        eprintln!("Skipping rendering_is_deterministic: {SKIP_HINT}");
        return;
    };

    assert_eq!(bytes_a.len(), bytes_b.len(), "PDF sizes should match");
    assert_eq!(
        normalized_hash(&bytes_a),
        normalized_hash(&bytes_b),
        "PDF renders must be deterministic after metadata normalization"
    );
}

#[test]
fn sections_are_tracked_to_pages() {
    if !fonts::default_fonts_available() {
        eprintln!("Skipping sections_are_tracked_to_pages: {SKIP_HINT}");
        return;
    }

    let document = build_estimate(issued()).unwrap();
    let rendered = PdfBuilder::new(&document).render().unwrap();
    assert!(rendered.pages >= 1);
    assert_eq!(rendered.section_pages.len(), 7);
    let pages: Vec<usize> = rendered
        .section_pages
        .iter()
        .map(|page| page.expect("every section lands on a page"))
        .collect();
    assert_eq!(pages[0], 1);
    assert!(pages.windows(2).all(|pair| pair[0] <= pair[1]));
    assert!(pages.iter().all(|page| *page <= rendered.pages));
}

#[test]
fn saving_into_a_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("no-such-dir").join("개발견적서_참신한게시대.pdf");
    let options = GenerationOptions::new(&target).with_issue_date(issued());

    let err = build_and_save(&options).unwrap_err();
    assert!(matches!(err, EstimateError::Io { .. }), "unexpected error: {err}");
    assert!(!target.exists());
    assert!(!dir.path().join("no-such-dir").exists());
}

#[test]
fn saving_overwrites_the_output_file() {
    if !fonts::default_fonts_available() {
        eprintln!("Skipping saving_overwrites_the_output_file: {SKIP_HINT}");
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("개발견적서_참신한게시대.pdf");
    std::fs::write(&target, b"stale").unwrap();

    let options = GenerationOptions::new(&target).with_issue_date(issued());
    let report = build_and_save(&options).expect("generate estimate");

    let written = std::fs::read(&target).unwrap();
    assert_eq!(report.bytes, written.len());
    assert!(written.starts_with(b"%PDF"));
    assert_eq!(
        report.completion_message(),
        "견적서 생성 완료: 개발견적서_참신한게시대.pdf"
    );
}

#[test]
fn cell_fill_is_painted_before_cell_text() {
    let mut table = Table::new(1, 1);
    table.set_text(0, 0, "HEADER").unwrap();
    let cell = table.cell_mut(0, 0).unwrap();
    set_cell_shading(cell, "4472C4").unwrap();
    cell.set_bold(true);
    let document = Document::new("Shading").with_block(Block::Table(table));

    let Some(rendered) = render_with_any_font(&document) else {
        eprintln!("Skipping cell_fill_is_painted_before_cell_text: {ANY_FONT_HINT}");
        return;
    };

    let pages = page_operations(&rendered.bytes);
    assert_eq!(pages.len(), 1);
    let fills = colored_strokes(&pages[0]);
    let texts = text_operations(&pages[0]);
    assert!(!fills.is_empty(), "the cell background should be stroked");
    assert!(!texts.is_empty(), "the cell text should be drawn");
    let strokes_after_text = fills.iter().filter(|fill| **fill > texts[0]).count();
    assert_eq!(strokes_after_text, 0, "fill strokes must not cover the text");
}

#[test]
fn fill_stretches_to_the_tallest_cell_in_the_row() {
    let (Some(short), Some(tall)) = (
        render_with_any_font(&labelled_row("one")),
        render_with_any_font(&labelled_row("one\ntwo\nthree")),
    ) else {
        eprintln!("Skipping fill_stretches_to_the_tallest_cell_in_the_row: {ANY_FONT_HINT}");
        return;
    };

    let short = colored_strokes(&page_operations(&short.bytes)[0]).len();
    let tall = colored_strokes(&page_operations(&tall.bytes)[0]).len();
    assert!(short > 0);
    assert!(
        tall >= 2 * short,
        "a three-line neighbour should stretch the label fill: {short} vs {tall} strokes"
    );
}

#[test]
fn section_page_is_where_the_heading_text_lands() {
    let Some(family) = any_font_family() else {
        eprintln!("Skipping section_page_is_where_the_heading_text_lands: {ANY_FONT_HINT}");
        return;
    };

    let cache = FontCache::new(family.clone());
    let line: f64 = Style::new()
        .with_font_size(BODY_FONT_SIZE)
        .with_line_spacing(1.25)
        .line_height(&cache)
        .into();
    let per_page = (TEXT_HEIGHT_MM / line) as usize;

    // Walks the heading across the page boundary, including the case where only its leading
    // break still fits on the first page.
    for spacers in per_page.saturating_sub(3)..=per_page + 1 {
        let mut document = Document::new("Pages");
        for _ in 0..spacers {
            document.push(Block::Spacer);
        }
        document.push(Block::heading(1, "1. Section"));

        let rendered = render_with(&document, family.clone());
        let text_page = page_operations(&rendered.bytes)
            .iter()
            .position(|operations| !text_operations(operations).is_empty())
            .map(|index| index + 1);
        assert!(text_page.is_some());
        assert_eq!(
            rendered.section_pages,
            vec![text_page],
            "heading after {spacers} spacers"
        );
    }
}

#[cfg(feature = "bookmarks")]
#[test]
fn bookmarks_add_one_outline_entry_per_section() {
    let Some(family) = any_font_family() else {
        eprintln!("Skipping bookmarks_add_one_outline_entry_per_section: {ANY_FONT_HINT}");
        return;
    };

    let document = build_estimate(issued()).unwrap();
    let rendered = PdfBuilder::new(&document)
        .with_document_builder(DocumentBuilder::new().with_font_family(family))
        .render_with_bookmarks()
        .expect("render estimate with bookmarks");
    assert!(rendered.section_pages.iter().all(Option::is_some));

    let pdf = lopdf::Document::load_mem(&rendered.bytes).expect("reload bookmarked pdf");
    let catalog = pdf.catalog().expect("catalog");
    assert_eq!(
        catalog.get(b"PageMode").and_then(|mode| mode.as_name_str()).ok(),
        Some("UseOutlines")
    );

    let outlines_id = catalog
        .get(b"Outlines")
        .and_then(|outlines| outlines.as_reference())
        .expect("outlines reference");
    let outlines = pdf.get_dictionary(outlines_id).expect("outlines dictionary");
    assert_eq!(outlines.get(b"Count").and_then(|count| count.as_i64()).ok(), Some(7));

    let mut titles = 0;
    let mut next = outlines.get(b"First").and_then(|first| first.as_reference()).ok();
    while let Some(id) = next {
        let entry = pdf.get_dictionary(id).expect("outline entry");
        assert!(entry.get(b"Dest").is_ok());
        titles += 1;
        next = entry.get(b"Next").and_then(|n| n.as_reference()).ok();
    }
    assert_eq!(titles, 7);
}
