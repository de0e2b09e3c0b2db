// src/services/pdf_service.rs
//! Renders a `ReportDocument` as an A4 PDF.
//!
//! Text uses the standard Helvetica fonts, so widths are estimated rather
//! than measured; wrapping is by word with a hard break for over-long words.

use crate::{
    error::{AppError, AppResult},
    models::report::{ReportDocument, ReportRow},
    services::report_service::format_report_date,
};
use lopdf::{
    content::{Content, Operation},
    dictionary, Document, Object, Stream,
};

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 40.0;
const TABLE_TOP: f32 = PAGE_HEIGHT - 128.0;
const TABLE_FONT_SIZE: f32 = 8.0;
const CELL_PADDING: f32 = 4.0;
const LINE_HEIGHT: f32 = 10.0;
const SIGNATURE_BLOCK_HEIGHT: f32 = 120.0;
const HEADER_GRAY: f32 = 0.78;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource_name(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

// Widths add up to the printable width (515pt). Text fitting assumes about
// 0.5em per character (see `text_width`), so a bold header in a narrow
// column can run slightly past its cell.
const COLUMNS: [(&str, f32, Align); 6] = [
    ("No", 28.0, Align::Center),
    ("Nama Siswa", 84.0, Align::Left),
    ("Kelas", 42.0, Align::Center),
    ("Total Insiden", 56.0, Align::Center),
    ("Jenis Pelanggaran", 167.0, Align::Left),
    ("Catatan", 138.0, Align::Left),
];

/// Collects drawing operations page by page.
struct PageWriter {
    pages: Vec<Vec<Operation>>,
    current: Vec<Operation>,
    y: f32,
    /// No table body row has been drawn on the current page yet.
    fresh: bool,
}

impl PageWriter {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
            fresh: true,
        }
    }

    fn new_page(&mut self) {
        let finished = std::mem::take(&mut self.current);
        self.pages.push(finished);
        self.y = PAGE_HEIGHT - MARGIN;
        self.fresh = true;
    }

    fn fits(&self, height: f32) -> bool {
        self.y - height >= MARGIN
    }

    /// Table lines that still fit above the bottom margin.
    fn lines_that_fit(&self) -> usize {
        ((self.y - MARGIN - 2.0 * CELL_PADDING) / LINE_HEIGHT)
            .floor()
            .max(0.0) as usize
    }

    fn text(&mut self, font: Font, size: f32, x: f32, y: f32, text: &str) {
        self.current.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![font.resource_name().into(), size.into()]),
            Operation::new("Td", vec![x.into(), y.into()]),
            Operation::new("Tj", vec![Object::string_literal(encode_win_ansi(text))]),
            Operation::new("ET", vec![]),
        ]);
    }

    fn centered_text(&mut self, font: Font, size: f32, center_x: f32, y: f32, text: &str) {
        let x = center_x - text_width(text, size) / 2.0;
        self.text(font, size, x, y, text);
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.current.extend([
            Operation::new("w", vec![0.5f32.into()]),
            Operation::new("m", vec![x1.into(), y1.into()]),
            Operation::new("l", vec![x2.into(), y2.into()]),
            Operation::new("S", vec![]),
        ]);
    }

    /// Outlined rectangle, optionally filled with a gray level.
    fn cell(&mut self, x: f32, y: f32, width: f32, height: f32, fill: Option<f32>) {
        self.current.push(Operation::new("w", vec![0.5f32.into()]));
        if let Some(gray) = fill {
            self.current.push(Operation::new("g", vec![gray.into()]));
        }
        self.current.push(Operation::new(
            "re",
            vec![x.into(), y.into(), width.into(), height.into()],
        ));
        self.current.push(Operation::new(if fill.is_some() { "B" } else { "S" }, vec![]));
        if fill.is_some() {
            self.current.push(Operation::new("g", vec![0.0f32.into()]));
        }
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        self.pages.push(self.current);
        self.pages
    }
}

/// Average Helvetica advance is roughly half the font size.
fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5
}

/// Splits `text` into lines no wider than `width`.
fn wrap(text: &str, width: f32, size: f32) -> Vec<String> {
    let max_chars = ((width / (size * 0.5)).floor() as usize).max(1);
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let word: String = word.into_iter().collect();
        let needed = if line.is_empty() {
            word.chars().count()
        } else {
            line.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(&word);
    }
    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}

/// WinAnsi bytes for the standard fonts; characters outside Latin-1 become '?'.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

fn row_height(line_count: usize) -> f32 {
    line_count as f32 * LINE_HEIGHT + 2.0 * CELL_PADDING
}

/// Draws one table row. A row that does not fit moves to a new page; a row
/// taller than a whole page is split, with the header repeated above each
/// continuation.
fn draw_row(w: &mut PageWriter, cells: [String; 6], header: bool) {
    let font = if header { Font::Bold } else { Font::Regular };
    let mut wrapped: Vec<Vec<String>> = cells
        .iter()
        .zip(COLUMNS.iter())
        .map(|(cell, (_, width, _))| wrap(cell, width - 2.0 * CELL_PADDING, TABLE_FONT_SIZE))
        .collect();

    loop {
        let line_count = wrapped.iter().map(Vec::len).max().unwrap_or(1).max(1);
        if w.fits(row_height(line_count)) {
            draw_lines(w, &wrapped, line_count, font, header);
            return;
        }
        if header || !w.fresh {
            w.new_page();
            if !header {
                draw_header(w);
            }
            continue;
        }

        let room = w.lines_that_fit().max(1);
        let rest: Vec<Vec<String>> = wrapped
            .iter_mut()
            .map(|lines| lines.split_off(room.min(lines.len())))
            .collect();
        draw_lines(w, &wrapped, room, font, header);
        wrapped = rest;
        w.new_page();
        draw_header(w);
    }
}

fn draw_lines(
    w: &mut PageWriter,
    columns: &[Vec<String>],
    line_count: usize,
    font: Font,
    header: bool,
) {
    let height = row_height(line_count);
    let top = w.y;
    let mut x = MARGIN;
    for (lines, (_, width, align)) in columns.iter().zip(COLUMNS.iter()) {
        w.cell(x, top - height, *width, height, header.then_some(HEADER_GRAY));
        for (i, line) in lines.iter().enumerate() {
            let baseline = top - CELL_PADDING - (i as f32 + 1.0) * LINE_HEIGHT + 2.0;
            let text_x = match align {
                Align::Left => x + CELL_PADDING,
                Align::Center => x + (width - text_width(line, TABLE_FONT_SIZE)) / 2.0,
            };
            w.text(font, TABLE_FONT_SIZE, text_x, baseline, line);
        }
        x += width;
    }
    w.y = top - height;
    if !header {
        w.fresh = false;
    }
}

fn draw_header(w: &mut PageWriter) {
    let cells = COLUMNS.map(|(title, _, _)| title.to_string());
    draw_row(w, cells, true);
}

fn row_cells(row: &ReportRow) -> [String; 6] {
    [
        row.no.to_string(),
        row.student_name.clone(),
        row.class_name.clone(),
        row.total_incidents.to_string(),
        row.violation_types.clone(),
        row.notes.clone(),
    ]
}

fn draw_signatures(w: &mut PageWriter, report: &ReportDocument) {
    if !w.fits(SIGNATURE_BLOCK_HEIGHT) {
        w.new_page();
    }
    let label_y = w.y - 40.0;
    let line_y = label_y - 60.0;
    let name_y = line_y - 14.0;
    let left = PAGE_WIDTH / 4.0;
    let right = PAGE_WIDTH / 4.0 * 3.0;

    let principal = non_blank_or(&report.signatures.principal, "Nama Kepala Sekolah");
    let teacher = non_blank_or(&report.signatures.supervising_teacher, "Nama Guru Piket");

    for (center, label, name) in [
        (left, "Kepala Sekolah", principal),
        (right, "Guru Piket", teacher),
    ] {
        w.centered_text(Font::Regular, 10.0, center, label_y, label);
        w.line(center - 70.0, line_y, center + 70.0, line_y);
        w.centered_text(Font::Regular, 10.0, center, name_y, name);
    }
    w.y = name_y;
}

fn non_blank_or<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.trim().is_empty() {
        placeholder
    } else {
        value
    }
}

/// Draws the report and returns the encoded PDF file.
pub fn render_report(report: &ReportDocument) -> AppResult<Vec<u8>> {
    let mut w = PageWriter::new();
    let center = PAGE_WIDTH / 2.0;

    w.centered_text(Font::Bold, 18.0, center, PAGE_HEIGHT - 57.0, &report.title);
    w.centered_text(
        Font::Regular,
        10.0,
        center,
        PAGE_HEIGHT - 79.0,
        &format!("Tanggal Cetak: {}", format_report_date(report.printed_on)),
    );
    if !report.filters_applied.is_empty() {
        w.centered_text(
            Font::Regular,
            10.0,
            center,
            PAGE_HEIGHT - 99.0,
            &format!("Filter: {}", report.filters_applied),
        );
    }

    w.y = TABLE_TOP;
    draw_header(&mut w);
    for row in &report.rows {
        draw_row(&mut w, row_cells(row), false);
    }
    draw_signatures(&mut w, report);

    build_document(w.finish())
}

fn build_document(pages: Vec<Vec<Operation>>) -> AppResult<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations };
        let encoded = content.encode().map_err(|e| AppError::Pdf(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let media_box: Vec<Object> = vec![
        0.into(),
        0.into(),
        (PAGE_WIDTH as i64).into(),
        (PAGE_HEIGHT as i64).into(),
    ];
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => media_box,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).map_err(|e| {
        tracing::error!("Failed to write PDF: {:?}", e);
        AppError::Pdf(e.to_string())
    })?;
    Ok(buffer)
}
