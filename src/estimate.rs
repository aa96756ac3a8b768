//! The web-application development estimate (견적서) and its assembly.
//!
//! All wording and amounts are fixed.  The only inputs are the issue date and the derived total of
//! the pricing table.

use chrono::NaiveDate;

use crate::error::Result;
use crate::model::{Block, Document, Heading, HorizontalAlignment, RichParagraph, Table};
use crate::richtext::Span;
use crate::shading::set_cell_shading;

/// Document title shown at the top of the first page.
pub const TITLE: &str = "웹 애플리케이션 개발 견적서";

/// Project name used as subtitle and in the metadata table.
pub const PROJECT_NAME: &str = "참신한 게시대 - 현수막 게시대 관리 시스템";

/// File name of the generated estimate.
pub const OUTPUT_FILE_NAME: &str = "개발견적서_참신한게시대.pdf";

/// Directory the estimate is written to when no output path is given.
pub const DEFAULT_OUTPUT_DIR: &str = "/mnt/c/GITHUB/카카오행잉배너/KakaoHangingBanner";

/// Font size of the title run, in points.
pub const TITLE_FONT_SIZE: u8 = 24;

/// Font size of the subtitle run, in points.
pub const SUBTITLE_FONT_SIZE: u8 = 14;

/// Fill of the metadata labels and the signature header row.
pub const LABEL_SHADING: &str = "E8E8E8";

/// Fill of the pricing table header row.
pub const HEADER_SHADING: &str = "4472C4";

/// Fill of the pricing table total row.
pub const TOTAL_SHADING: &str = "FFF2CC";

/// Labels of the metadata table, top to bottom.
pub const METADATA_LABELS: [&str; 4] = ["프로젝트명", "작성일", "견적 유효기간", "개발 기간"];

/// Column headers of the pricing table.
pub const PRICING_HEADERS: [&str; 4] = ["구분", "기능 상세", "작업일", "금액(원)"];

/// Label of the pricing total row.
pub const TOTAL_LABEL: &str = "합계";

const PRICING_COLUMN_WEIGHTS: [usize; 4] = [3, 6, 2, 3];

/// One line item of the pricing table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PricingItem {
    /// Category shown in the first column.
    pub category: &'static str,
    /// Feature breakdown, one entry per line.
    pub details: &'static [&'static str],
    /// Working days; left blank in the estimate.
    pub workdays: &'static str,
    /// Price in won.
    pub amount: u64,
}

/// Line items of the pricing table, in display order.
pub const PRICING_ITEMS: [PricingItem; 5] = [
    PricingItem {
        category: "1. 핵심 시스템",
        details: &[
            "사용자 인증 (JWT)",
            "다중 지도 시스템",
            "게시대 관리 (CRUD)",
            "마커/라벨 시스템",
            "역지오코딩",
        ],
        workdays: "",
        amount: 1_600_000,
    },
    PricingItem {
        category: "2. 로드뷰 기능",
        details: &["네이버 로드뷰 연동", "선택/토글 모드", "미니맵 연동"],
        workdays: "",
        amount: 100_000,
    },
    PricingItem {
        category: "3. 관리자 페이지",
        details: &["버튼 링크 관리", "Hero 이미지 관리", "팝업 메시지 관리"],
        workdays: "",
        amount: 150_000,
    },
    PricingItem {
        category: "4. 캘린더 기능",
        details: &["월별 일정 관리", "일정 CRUD", "색상 코드 구분"],
        workdays: "",
        amount: 50_000,
    },
    PricingItem {
        category: "5. 장소 검색 기능",
        details: &["카카오 Places API 연동", "키워드 검색", "검색 결과 드롭다운"],
        workdays: "",
        amount: 100_000,
    },
];

const OVERVIEW: &str = "경상북도와 경상남도 지역의 현수막 게시대 위치를 관리하고, 지도에서 쉽게 찾을 수 있는 웹 애플리케이션입니다.";

const TECH_STACK: [(&str, &str); 3] = [
    (
        "Backend: ",
        "Spring Boot 3.5.3, Java 17, Spring Security, JWT, JPA, MySQL",
    ),
    (
        "Frontend: ",
        "React 18.3.1, React Router 6, Leaflet, Kakao Maps, Naver Maps",
    ),
    ("외부 API: ", "카카오맵 API, 네이버맵 API, VWorld API"),
];

const PAYMENT_TERMS: [(&str, &str); 3] = [
    ("• 계약금: ", "30% (계약 시)"),
    ("• 중도금: ", "40% (개발 50% 완료 시)"),
    ("• 잔금: ", "30% (최종 납품 시)"),
];

const INCLUSIONS: [&str; 4] = [
    "소스코드 전체 제공",
    "설치 및 배포 가이드 문서",
    "1개월 무상 유지보수",
    "사용자 매뉴얼",
];

const EXCLUSIONS: [&str; 4] = [
    "서버 호스팅 비용",
    "도메인 비용",
    "외부 API 사용료 (카카오맵, 네이버맵 등)",
    "1개월 이후 유지보수 (별도 협의)",
];

const REMARKS: [&str; 3] = [
    "본 견적은 현재 구현된 기능 기준입니다.",
    "추가 기능 요청 시 별도 견적이 필요합니다.",
    "개발 기간은 요구사항 확정 후 조정될 수 있습니다.",
];

const SIGNATURE_ROWS: [(&str, &str); 3] = [
    ("발주처", "수주처"),
    ("상호:", "상호:"),
    ("대표:", "대표:"),
];

/// Formats the issue date as `YYYY년 MM월 DD일`.
pub fn format_issue_date(date: NaiveDate) -> String {
    date.format("%Y년 %m월 %d일").to_string()
}

/// Formats an amount of won with comma thousands separators.
pub fn format_won(amount: u64) -> String {
    let digits = amount.to_string();
    let mut formatted = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(digit);
    }
    formatted
}

/// Sums the amounts of the given line items.
pub fn pricing_total(items: &[PricingItem]) -> u64 {
    items.iter().map(|item| item.amount).sum()
}

fn bulleted(lines: &[&str]) -> String {
    lines
        .iter()
        .map(|line| format!("• {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn labelled_lines(entries: &[(&str, &str)]) -> RichParagraph {
    let mut paragraph = RichParagraph::default();
    for (index, (label, value)) in entries.iter().enumerate() {
        paragraph.push(Span::new(*label).bold());
        if index + 1 < entries.len() {
            paragraph.push(Span::new(format!("{value}\n")));
        } else {
            paragraph.push(Span::new(*value));
        }
    }
    paragraph
}

fn section(document: &mut Document, title: &str) {
    document.push(Block::heading(1, title));
}

fn metadata_table(issued: NaiveDate) -> Result<Table> {
    let values = [
        PROJECT_NAME.to_owned(),
        format_issue_date(issued),
        "발행일로부터 30일".to_owned(),
        "약 4~6주 (협의 가능)".to_owned(),
    ];

    let mut table = Table::new(METADATA_LABELS.len(), 2);
    for (row, (label, value)) in METADATA_LABELS.iter().zip(values).enumerate() {
        table.set_text(row, 0, *label)?;
        table.set_text(row, 1, value)?;
        set_cell_shading(table.cell_mut(row, 0)?, LABEL_SHADING)?;
    }
    Ok(table)
}

fn pricing_table(items: &[PricingItem]) -> Result<Table> {
    let mut table = Table::new(1, PRICING_HEADERS.len());
    table.set_alignment(HorizontalAlignment::Center);
    table.set_column_weights(PRICING_COLUMN_WEIGHTS.to_vec())?;

    for (column, header) in PRICING_HEADERS.iter().enumerate() {
        let cell = table.cell_mut(0, column)?;
        cell.set_text(*header);
        set_cell_shading(cell, HEADER_SHADING)?;
        cell.set_bold(true);
    }

    for item in items {
        let texts = [
            item.category.to_owned(),
            item.details.join("\n"),
            item.workdays.to_owned(),
            format_won(item.amount),
        ];
        for (cell, text) in table.add_row().cells_mut().iter_mut().zip(texts) {
            cell.set_text(text);
        }
    }

    let totals = [
        TOTAL_LABEL.to_owned(),
        String::new(),
        String::new(),
        format_won(pricing_total(items)),
    ];
    for (cell, text) in table.add_row().cells_mut().iter_mut().zip(totals) {
        cell.set_text(text);
        set_cell_shading(cell, TOTAL_SHADING)?;
        cell.set_bold(true);
    }

    Ok(table)
}

fn signature_table() -> Result<Table> {
    let mut table = Table::new(SIGNATURE_ROWS.len(), 2);
    for (row, (left, right)) in SIGNATURE_ROWS.iter().enumerate() {
        table.set_text(row, 0, *left)?;
        table.set_text(row, 1, *right)?;
        if row == 0 {
            set_cell_shading(table.cell_mut(row, 0)?, LABEL_SHADING)?;
            set_cell_shading(table.cell_mut(row, 1)?, LABEL_SHADING)?;
        }
    }
    Ok(table)
}

/// Assembles the complete estimate for the given issue date.
///
/// Blocks are emitted in a fixed order: title and subtitle, the metadata table, the seven
/// numbered sections (the pricing table sits in section 3) and finally the two-party signature
/// table.
pub fn build_estimate(issued: NaiveDate) -> Result<Document> {
    let mut document = Document::new(TITLE);

    document.push(Block::Heading(Heading::new(
        0,
        RichParagraph::new(vec![Span::new(TITLE).sized(TITLE_FONT_SIZE)])
            .with_alignment(HorizontalAlignment::Center),
    )));
    document.push(Block::Paragraph(
        RichParagraph::new(vec![Span::new(PROJECT_NAME).sized(SUBTITLE_FONT_SIZE)])
            .with_alignment(HorizontalAlignment::Center),
    ));
    document.push(Block::Spacer);

    document.push(Block::Table(metadata_table(issued)?));
    document.push(Block::Spacer);

    section(&mut document, "1. 프로젝트 개요");
    document.push(Block::Paragraph(RichParagraph::plain(OVERVIEW)));

    section(&mut document, "2. 기술 스택");
    document.push(Block::Paragraph(labelled_lines(&TECH_STACK)));

    section(&mut document, "3. 상세 기능 및 견적");
    document.push(Block::Table(pricing_table(&PRICING_ITEMS)?));
    document.push(Block::Spacer);

    section(&mut document, "4. 결제 조건");
    document.push(Block::Paragraph(labelled_lines(&PAYMENT_TERMS)));

    section(&mut document, "5. 포함 사항");
    document.push(Block::Paragraph(RichParagraph::plain(bulleted(&INCLUSIONS))));

    section(&mut document, "6. 불포함 사항");
    document.push(Block::Paragraph(RichParagraph::plain(bulleted(&EXCLUSIONS))));

    section(&mut document, "7. 특이사항");
    document.push(Block::Paragraph(RichParagraph::plain(bulleted(&REMARKS))));

    document.push(Block::Spacer);
    document.push(Block::Spacer);
    document.push(Block::Table(signature_table()?));

    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_won_with_separators() {
        assert_eq!(format_won(0), "0");
        assert_eq!(format_won(999), "999");
        assert_eq!(format_won(50_000), "50,000");
        assert_eq!(format_won(1_600_000), "1,600,000");
        assert_eq!(format_won(12_345_678_901), "12,345,678,901");
    }

    #[test]
    fn formats_issue_date_with_zero_padding() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(format_issue_date(date), "2025년 03월 07일");
    }

    #[test]
    fn total_is_the_sum_of_items() {
        assert_eq!(pricing_total(&PRICING_ITEMS), 2_000_000);
        assert_eq!(pricing_total(&[]), 0);
    }

    #[test]
    fn labelled_lines_bold_only_labels() {
        let paragraph = labelled_lines(&PAYMENT_TERMS);
        let bold: Vec<_> = paragraph
            .spans()
            .iter()
            .filter(|span| span.is_bold())
            .map(|span| span.text())
            .collect();
        assert_eq!(bold, vec!["• 계약금: ", "• 중도금: ", "• 잔금: "]);
        assert!(paragraph.text().ends_with("30% (최종 납품 시)"));
    }

    #[test]
    fn bulleted_prefixes_each_line() {
        assert_eq!(bulleted(&["a", "b"]), "• a\n• b");
    }
}
