//! PDF rendering of a [`MemberReport`].
//!
//! Rendering runs in two passes. The content pass lays sections out top to
//! bottom and breaks pages whenever the cursor would cross the bottom limit.
//! The total page count is only known afterwards, so the footer pass then
//! stamps "Page X of Y" onto every finished page.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream, StringFormat};
use tracing::{debug, warn};

use super::images::ImageSource;
use super::layout::{CellValue, MemberReport, ReportSection};
use super::RenderError;

const REGULAR_FONT: &str = "F1";
const BOLD_FONT: &str = "F2";
const CELL_PADDING: f32 = 4.0;
const SERIAL_COLUMN: f32 = 36.0;
const LABEL_COLUMN: f32 = 170.0;
const PHOTO_PLACEHOLDER: &str = "Photo";

/// Page size and spacing, in PDF points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    /// Content never extends below this line; the footer lives underneath.
    pub bottom_limit: f32,
    pub font_size: f32,
    pub line_height: f32,
    pub photo_size: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            width: 595.28,
            height: 841.89,
            margin: 40.0,
            bottom_limit: 60.0,
            font_size: 9.0,
            line_height: 12.0,
            photo_size: 64.0,
        }
    }
}

impl PageGeometry {
    fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }
}

#[derive(Debug, Default)]
pub(crate) struct PageDraft {
    operations: Vec<Operation>,
    images: Vec<(String, Stream)>,
}

enum Cell {
    Text(String),
    Photo(String),
}

#[derive(Debug)]
pub struct PdfRenderer<'a> {
    images: &'a dyn ImageSource,
    geometry: PageGeometry,
}

impl<'a> PdfRenderer<'a> {
    pub fn new(images: &'a dyn ImageSource) -> Self {
        Self::with_geometry(images, PageGeometry::default())
    }

    pub fn with_geometry(images: &'a dyn ImageSource, geometry: PageGeometry) -> Self {
        Self { images, geometry }
    }

    pub fn render(&self, report: &MemberReport) -> Result<Vec<u8>, RenderError> {
        let pages = self.compose(report);
        let pages = stamp_page_numbers(pages, &self.geometry);
        debug!(pages = pages.len(), member = %report.member_name, "pdf layout complete");
        assemble(pages, &self.geometry)
    }

    pub(crate) fn compose(&self, report: &MemberReport) -> Vec<PageDraft> {
        let mut composer = PageComposer::new(self.geometry, self.images);
        composer.heading(report);
        for section in &report.sections {
            composer.section(section, &report.placeholder);
        }
        composer.finish()
    }
}

struct PageComposer<'a> {
    geometry: PageGeometry,
    images: &'a dyn ImageSource,
    finished: Vec<PageDraft>,
    current: PageDraft,
    cursor: f32,
    image_count: usize,
}

impl<'a> PageComposer<'a> {
    fn new(geometry: PageGeometry, images: &'a dyn ImageSource) -> Self {
        let mut composer = Self {
            geometry,
            images,
            finished: Vec::new(),
            current: PageDraft::default(),
            cursor: 0.0,
            image_count: 0,
        };
        composer.reset_cursor();
        composer
    }

    fn finish(mut self) -> Vec<PageDraft> {
        self.finished.push(self.current);
        self.finished
    }

    fn reset_cursor(&mut self) {
        self.cursor = self.geometry.height - self.geometry.margin;
        self.current
            .operations
            .push(Operation::new("w", vec![real(0.5)]));
    }

    fn new_page(&mut self) {
        let page = std::mem::take(&mut self.current);
        self.finished.push(page);
        self.reset_cursor();
    }

    /// Breaks the page when `height` more points would cross the bottom limit.
    fn ensure_room(&mut self, height: f32) -> bool {
        if self.cursor - height < self.geometry.bottom_limit {
            self.new_page();
            return true;
        }
        false
    }

    fn heading(&mut self, report: &MemberReport) {
        let x = self.geometry.margin;
        let size = self.geometry.font_size;

        self.cursor -= 16.0;
        self.text(BOLD_FONT, 14.0, x, self.cursor, "Member Dossier Report");
        self.cursor -= 16.0;
        self.text(BOLD_FONT, 11.0, x, self.cursor, &report.member_name);
        self.cursor -= self.geometry.line_height;
        let summary = format!(
            "Category: {}   |   View: {}   |   Occupation: {}   |   Generated: {}",
            report.selector_label,
            report.view.label(),
            report.occupation.label(),
            report.generated_at.format("%d/%m/%Y %H:%M"),
        );
        self.text(REGULAR_FONT, size, x, self.cursor, &summary);
        self.cursor -= self.geometry.line_height;
    }

    fn section(&mut self, section: &ReportSection, placeholder: &str) {
        let band = self.geometry.line_height + 2.0 * CELL_PADDING;
        // Keep the title with its table header and first row.
        self.ensure_room(band * 3.0);
        self.cursor -= 8.0;
        self.band(section.title);

        if !section.rows.is_empty() {
            let widths = [
                SERIAL_COLUMN,
                LABEL_COLUMN,
                self.geometry.content_width() - SERIAL_COLUMN - LABEL_COLUMN,
            ];
            let header = ["S.No.", "Field", "Value"];
            self.header_row(&widths, &header);
            for row in &section.rows {
                let value = match &row.value {
                    CellValue::Text(text) => Cell::Text(text.clone()),
                    CellValue::Missing => Cell::Text(placeholder.to_string()),
                    CellValue::Image(url) => Cell::Photo(url.clone()),
                };
                let cells = [
                    Cell::Text(row.serial.to_string()),
                    Cell::Text(row.label.clone()),
                    value,
                ];
                self.body_row(&widths, &cells, &header);
            }
        }

        if !section.family_members.is_empty() {
            let rest = self.geometry.content_width() - SERIAL_COLUMN;
            let widths = [SERIAL_COLUMN, rest * 0.45, rest * 0.25, rest * 0.30];
            let header = ["S.No.", "Name", "Membership No.", "Relation"];
            self.ensure_room(band * 2.0);
            self.cursor -= 4.0;
            self.header_row(&widths, &header);
            for member in &section.family_members {
                let cells = [
                    Cell::Text(member.serial.to_string()),
                    Cell::Text(member.name.clone()),
                    Cell::Text(member.membership_no.clone()),
                    Cell::Text(member.relation.clone()),
                ];
                self.body_row(&widths, &cells, &header);
            }
        }
    }

    fn band(&mut self, title: &str) {
        let height = self.geometry.line_height + 2.0 * CELL_PADDING;
        let x = self.geometry.margin;
        let bottom = self.cursor - height;
        self.fill_rect(x, bottom, self.geometry.content_width(), height, 0.88);
        self.text(
            BOLD_FONT,
            self.geometry.font_size + 1.0,
            x + CELL_PADDING,
            bottom + CELL_PADDING + 2.0,
            title,
        );
        self.cursor = bottom;
    }

    fn header_row(&mut self, widths: &[f32], titles: &[&str]) {
        let height = self.geometry.line_height + 2.0 * CELL_PADDING;
        let bottom = self.cursor - height;
        let mut x = self.geometry.margin;
        self.fill_rect(x, bottom, widths.iter().sum(), height, 0.95);
        for (width, title) in widths.iter().zip(titles) {
            self.stroke_rect(x, bottom, *width, height);
            self.text(
                BOLD_FONT,
                self.geometry.font_size,
                x + CELL_PADDING,
                bottom + CELL_PADDING + 2.0,
                title,
            );
            x += width;
        }
        self.cursor = bottom;
    }

    fn body_row(&mut self, widths: &[f32], cells: &[Cell], header: &[&str]) {
        let size = self.geometry.font_size;
        let wrapped: Vec<Option<Vec<String>>> = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| match cell {
                Cell::Text(text) => Some(wrap_text(text, width - 2.0 * CELL_PADDING, size)),
                Cell::Photo(_) => None,
            })
            .collect();

        let line_height = self.geometry.line_height;
        let header_height = line_height + 2.0 * CELL_PADDING;
        let fresh_page_room = self.geometry.height
            - self.geometry.margin
            - self.geometry.bottom_limit
            - header_height;

        if cells.iter().any(|cell| matches!(cell, Cell::Photo(_))) {
            let height = (max_lines(&wrapped) as f32 * line_height + 2.0 * CELL_PADDING)
                .max(self.geometry.photo_size + 2.0 * CELL_PADDING);
            if self.ensure_room(height) {
                self.header_row(widths, header);
            }
            self.draw_cells(widths, cells, &wrapped, height);
            return;
        }

        let mut wrapped = wrapped;
        let mut fresh = false;
        loop {
            let remaining = max_lines(&wrapped);
            let height = remaining as f32 * line_height + 2.0 * CELL_PADDING;
            if self.cursor - height >= self.geometry.bottom_limit {
                self.draw_cells(widths, cells, &wrapped, height);
                return;
            }

            // Keep rows whole when a fresh page can hold them.
            if !fresh && height <= fresh_page_room {
                self.new_page();
                self.header_row(widths, header);
                fresh = true;
                continue;
            }

            let room = self.cursor - self.geometry.bottom_limit - 2.0 * CELL_PADDING;
            let mut fit = (room / line_height).floor().max(0.0) as usize;
            if fit == 0 {
                if !fresh {
                    self.new_page();
                    self.header_row(widths, header);
                    fresh = true;
                    continue;
                }
                fit = 1;
            }

            let head: Vec<Option<Vec<String>>> = wrapped
                .iter_mut()
                .map(|lines| {
                    lines.as_mut().map(|lines| {
                        let rest = lines.split_off(fit.min(lines.len()));
                        std::mem::replace(lines, rest)
                    })
                })
                .collect();
            self.draw_cells(
                widths,
                cells,
                &head,
                fit as f32 * line_height + 2.0 * CELL_PADDING,
            );
            self.new_page();
            self.header_row(widths, header);
            fresh = true;
        }
    }

    fn draw_cells(
        &mut self,
        widths: &[f32],
        cells: &[Cell],
        wrapped: &[Option<Vec<String>>],
        height: f32,
    ) {
        let size = self.geometry.font_size;
        let top = self.cursor;
        let bottom = top - height;
        let mut x = self.geometry.margin;
        for ((cell, lines), width) in cells.iter().zip(wrapped).zip(widths) {
            self.stroke_rect(x, bottom, *width, height);
            match (cell, lines) {
                (_, Some(lines)) => {
                    let mut baseline = top - CELL_PADDING - size;
                    for line in lines {
                        self.text(REGULAR_FONT, size, x + CELL_PADDING, baseline, line);
                        baseline -= self.geometry.line_height;
                    }
                }
                (Cell::Photo(url), None) => {
                    self.photo(url, x + CELL_PADDING, bottom + CELL_PADDING);
                }
                (Cell::Text(_), None) => {}
            }
            x += width;
        }
        self.cursor = bottom;
    }

    /// Embeds the photo at `url`, or draws a labelled placeholder box when it
    /// cannot be fetched or decoded.
    fn photo(&mut self, url: &str, x: f32, y: f32) {
        let size = self.geometry.photo_size;
        let stream = self
            .images
            .fetch(url)
            .map_err(|err| err.to_string())
            .and_then(|bytes| lopdf::xobject::image_from(bytes).map_err(|err| err.to_string()));

        match stream {
            Ok(stream) => {
                let (width, height) = fit_within(&stream, size);
                self.image_count += 1;
                let name = format!("Im{}", self.image_count);
                let ops = &mut self.current.operations;
                ops.push(Operation::new("q", vec![]));
                ops.push(Operation::new(
                    "cm",
                    vec![
                        real(width),
                        real(0.0),
                        real(0.0),
                        real(height),
                        real(x),
                        real(y + size - height),
                    ],
                ));
                ops.push(Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]));
                ops.push(Operation::new("Q", vec![]));
                self.current.images.push((name, stream));
            }
            Err(reason) => {
                warn!(%url, %reason, "photo unavailable; drawing placeholder");
                self.stroke_rect(x, y, size, size);
                let label_width = text_width(PHOTO_PLACEHOLDER, self.geometry.font_size);
                self.text(
                    REGULAR_FONT,
                    self.geometry.font_size,
                    x + (size - label_width) / 2.0,
                    y + size / 2.0 - 3.0,
                    PHOTO_PLACEHOLDER,
                );
            }
        }
    }

    fn text(&mut self, font: &str, size: f32, x: f32, y: f32, text: &str) {
        push_text(&mut self.current.operations, font, size, x, y, text);
    }

    fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let ops = &mut self.current.operations;
        ops.push(Operation::new(
            "re",
            vec![real(x), real(y), real(width), real(height)],
        ));
        ops.push(Operation::new("S", vec![]));
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, gray: f32) {
        let ops = &mut self.current.operations;
        ops.push(Operation::new("g", vec![real(gray)]));
        ops.push(Operation::new(
            "re",
            vec![real(x), real(y), real(width), real(height)],
        ));
        ops.push(Operation::new("f", vec![]));
        ops.push(Operation::new("g", vec![real(0.0)]));
    }
}

/// Footer pass: numbering needs the final page count.
pub(crate) fn stamp_page_numbers(
    mut pages: Vec<PageDraft>,
    geometry: &PageGeometry,
) -> Vec<PageDraft> {
    let total = pages.len();
    for (index, page) in pages.iter_mut().enumerate() {
        let footer = format!("Page {} of {}", index + 1, total);
        let x = (geometry.width - text_width(&footer, geometry.font_size)) / 2.0;
        push_text(
            &mut page.operations,
            REGULAR_FONT,
            geometry.font_size,
            x,
            geometry.bottom_limit / 2.0,
            &footer,
        );
    }
    pages
}

fn assemble(pages: Vec<PageDraft>, geometry: &PageGeometry) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let regular = doc.add_object(font_dictionary("Helvetica"));
    let bold = doc.add_object(font_dictionary("Helvetica-Bold"));

    let mut kids = Vec::with_capacity(pages.len());
    for page in pages {
        let mut xobjects = Dictionary::new();
        for (name, stream) in page.images {
            let image_id = doc.add_object(stream);
            xobjects.set(name.into_bytes(), image_id);
        }

        let resources = dictionary! {
            "Font" => dictionary! {
                REGULAR_FONT => regular,
                BOLD_FONT => bold,
            },
            "XObject" => xobjects,
        };

        let content = Content {
            operations: page.operations,
        };
        let encoded = content
            .encode()
            .map_err(|err| RenderError::Pdf(err.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources,
            "MediaBox" => vec![real(0.0), real(0.0), real(geometry.width), real(geometry.height)],
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|err| RenderError::Pdf(err.to_string()))?;
    Ok(bytes)
}

// Standard 14 fonts only cover WinAnsi; see `encode_win_ansi`.
fn font_dictionary(base_font: &str) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    }
}

fn push_text(ops: &mut Vec<Operation>, font: &str, size: f32, x: f32, y: f32, text: &str) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "Tf",
        vec![Object::Name(font.as_bytes().to_vec()), real(size)],
    ));
    ops.push(Operation::new("Td", vec![real(x), real(y)]));
    ops.push(Operation::new(
        "Tj",
        vec![Object::String(encode_win_ansi(text), StringFormat::Hexadecimal)],
    ));
    ops.push(Operation::new("ET", vec![]));
}

fn max_lines(wrapped: &[Option<Vec<String>>]) -> usize {
    wrapped.iter().flatten().map(Vec::len).max().unwrap_or(1).max(1)
}

fn real(value: f32) -> Object {
    value.into()
}

fn dimension(stream: &Stream, key: &[u8]) -> Option<f32> {
    stream
        .dict
        .get(key)
        .and_then(Object::as_i64)
        .ok()
        .filter(|value| *value > 0)
        .map(|value| value as f32)
}

fn fit_within(stream: &Stream, size: f32) -> (f32, f32) {
    match (dimension(stream, b"Width"), dimension(stream, b"Height")) {
        (Some(width), Some(height)) => {
            let scale = (size / width).min(size / height);
            (width * scale, height * scale)
        }
        _ => (size, size),
    }
}

/// Helvetica averages roughly half an em per glyph.
fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5
}

pub(crate) fn wrap_text(text: &str, width: f32, size: f32) -> Vec<String> {
    let max_chars = ((width / (size * 0.5)).floor() as usize).max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
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
        if !line.is_empty() {
            lines.push(line);
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Maps text onto the WinAnsi code page used by the standard Type 1 fonts.
///
/// Characters outside that code page, such as Devanagari or the rupee sign,
/// print as `?`.
pub(crate) fn encode_win_ansi(text: &str) -> Vec<u8> {
    let mut replaced = 0usize;
    let bytes = text
        .chars()
        .map(|ch| {
            win_ansi_byte(ch).unwrap_or_else(|| {
                replaced += 1;
                b'?'
            })
        })
        .collect();
    if replaced > 0 {
        debug!(
            replaced,
            text_len = text.chars().count(),
            "characters outside WinAnsi printed as '?'"
        );
    }
    bytes
}

fn win_ansi_byte(ch: char) -> Option<u8> {
    match ch {
        '\u{2014}' => Some(0x97),
        '\u{2013}' => Some(0x96),
        '\u{2018}' => Some(0x91),
        '\u{2019}' => Some(0x92),
        '\u{201C}' => Some(0x93),
        '\u{201D}' => Some(0x94),
        '\u{2022}' => Some(0x95),
        '\u{20AC}' => Some(0x80),
        ch if (ch as u32) < 0x80 => Some(ch as u8),
        ch if (0xA0..=0xFF).contains(&(ch as u32)) => Some(ch as u32 as u8),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dossier::catalog::Category;
    use crate::dossier::occupation::OccupationType;
    use crate::dossier::projection::ViewType;
    use crate::report::images::{ImageFetchError, OfflineImageSource};
    use crate::report::layout::{FamilyMemberRow, ReportRow};
    use chrono::NaiveDate;

    /// A 1x1 RGB PNG.
    const TINY_PNG: [u8; 69] = [
        0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d,
        0x49, 0x48, 0x44, 0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01,
        0x08, 0x02, 0x00, 0x00, 0x00, 0x90, 0x77, 0x53, 0xde, 0x00, 0x00, 0x00,
        0x0c, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0x38, 0xe0, 0xa0, 0x00,
        0x00, 0x02, 0xe4, 0x01, 0x21, 0x81, 0x25, 0xc8, 0xc8, 0x00, 0x00, 0x00,
        0x00, 0x49, 0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
    ];

    #[derive(Debug)]
    struct PngImages;

    impl ImageSource for PngImages {
        fn fetch(&self, _url: &str) -> Result<Vec<u8>, ImageFetchError> {
            Ok(TINY_PNG.to_vec())
        }
    }

    #[derive(Debug)]
    struct CorruptImages;

    impl ImageSource for CorruptImages {
        fn fetch(&self, _url: &str) -> Result<Vec<u8>, ImageFetchError> {
            Ok(b"definitely not an image".to_vec())
        }
    }

    fn report(rows: usize) -> MemberReport {
        let rows = (1..=rows)
            .map(|serial| ReportRow {
                serial,
                path: "personalDetails.phoneNo1",
                label: format!("Field {serial}"),
                value: CellValue::Text(format!("value {serial}")),
            })
            .collect();

        MemberReport {
            member_name: "Shri Hari Dutt".to_string(),
            selector: "all",
            selector_label: "All Categories",
            view: ViewType::All,
            occupation: OccupationType::Unknown,
            generated_at: NaiveDate::from_ymd_opt(2025, 3, 14)
                .expect("valid date")
                .and_hms_opt(9, 0, 0)
                .expect("valid time"),
            placeholder: "\u{2014}".to_string(),
            sections: vec![ReportSection {
                category: Category::Personal,
                title: Category::Personal.label(),
                rows,
                family_members: Vec::new(),
            }],
        }
    }

    fn page_texts(page: &PageDraft) -> Vec<String> {
        page.operations
            .iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| match op.operands.first() {
                Some(Object::String(bytes, _)) => Some(String::from_utf8_lossy(bytes).into_owned()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn long_reports_break_pages_and_number_every_page() {
        let renderer = PdfRenderer::new(&OfflineImageSource);
        let pages = renderer.compose(&report(120));
        assert!(pages.len() > 1, "expected multiple pages, got {}", pages.len());

        let total = pages.len();
        let pages = stamp_page_numbers(pages, &PageGeometry::default());
        for (index, page) in pages.iter().enumerate() {
            let texts = page_texts(page);
            assert_eq!(
                texts.last().map(String::as_str),
                Some(format!("Page {} of {}", index + 1, total).as_str())
            );
        }
    }

    #[test]
    fn table_header_repeats_after_page_break() {
        let renderer = PdfRenderer::new(&OfflineImageSource);
        let pages = renderer.compose(&report(120));
        assert!(page_texts(&pages[1]).iter().any(|text| text == "S.No."));
    }

    #[test]
    fn unavailable_photos_become_placeholder_boxes() {
        let mut report = report(1);
        report.sections[0].rows.push(ReportRow {
            serial: 2,
            path: "documents.passportSize",
            label: "Passport Size Photo".to_string(),
            value: CellValue::Image("https://cdn.example.org/missing.jpg".to_string()),
        });

        for source in [&OfflineImageSource as &dyn ImageSource, &CorruptImages] {
            let pages = PdfRenderer::new(source).compose(&report);
            let texts = page_texts(&pages[0]);
            assert!(texts.iter().any(|text| text == PHOTO_PLACEHOLDER));
            assert!(!texts.iter().any(|text| text.contains("cdn.example.org")));
            assert!(pages[0].images.is_empty());
        }
    }

    #[test]
    fn family_members_render_as_a_table() {
        let mut report = report(0);
        report.sections[0].category = Category::Family;
        report.sections[0].family_members = vec![FamilyMemberRow {
            serial: 1,
            name: "Sita".to_string(),
            membership_no: "M-11".to_string(),
            relation: "Wife".to_string(),
        }];

        let pages = PdfRenderer::new(&OfflineImageSource).compose(&report);
        let texts = page_texts(&pages[0]);
        for expected in ["Membership No.", "Relation", "Sita", "M-11", "Wife"] {
            assert!(texts.iter().any(|text| text == expected), "missing {expected}");
        }
    }

    #[test]
    fn rendered_bytes_are_a_loadable_pdf() {
        let bytes = PdfRenderer::new(&OfflineImageSource)
            .render(&report(80))
            .expect("pdf renders");
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let document = Document::load_mem(&bytes).expect("pdf parses");
        assert!(document.get_pages().len() >= 2);
    }

    #[test]
    fn wrap_text_splits_on_words_and_long_tokens() {
        // 24pt at size 6 holds eight characters.
        let lines = wrap_text("alpha beta gamma", 24.0, 6.0);
        assert_eq!(lines, vec!["alpha", "beta", "gamma"]);

        let lines = wrap_text("alpha beta gamma", 30.0, 6.0);
        assert_eq!(lines, vec!["alpha beta", "gamma"]);

        let lines = wrap_text("abcdefghijkl", 30.0, 6.0);
        assert_eq!(lines, vec!["abcdefghij", "kl"]);

        assert_eq!(wrap_text("", 30.0, 6.0), vec![String::new()]);
    }

    #[test]
    fn win_ansi_encoding_maps_dashes() {
        assert_eq!(encode_win_ansi("a\u{2014}b"), vec![b'a', 0x97, b'b']);
        assert_eq!(encode_win_ansi("\u{20B9}"), vec![b'?']);
    }

    #[test]
    fn characters_outside_win_ansi_print_as_question_marks() {
        assert_eq!(
            encode_win_ansi("R\u{00E9}m \u{0930}\u{093E}\u{092E}"),
            b"R\xE9m ???".to_vec()
        );
    }

    #[test]
    fn fetched_photos_are_embedded_as_image_xobjects() {
        let mut report = report(1);
        report.sections[0].rows.push(ReportRow {
            serial: 2,
            path: "documents.passportSize",
            label: "Passport Size Photo".to_string(),
            value: CellValue::Image("https://cdn.example.org/kamla.png".to_string()),
        });

        let renderer = PdfRenderer::new(&PngImages);
        let pages = renderer.compose(&report);
        assert_eq!(pages[0].images.len(), 1);
        assert_eq!(pages[0].images[0].0, "Im1");
        assert!(pages[0].operations.iter().any(|op| op.operator == "Do"));
        assert!(!page_texts(&pages[0]).iter().any(|text| text == PHOTO_PLACEHOLDER));

        let bytes = renderer.render(&report).expect("pdf renders");
        let document = Document::load_mem(&bytes).expect("pdf parses");
        assert_eq!(document.get_pages().len(), 1);
    }

    #[test]
    fn rows_taller_than_a_page_continue_on_the_next() {
        let mut report = report(1);
        let account = "State Bank of India, Mandi branch, account 30412255019, IFSC SBIN0000123";
        report.sections[0].rows[0].value = CellValue::Text(vec![account; 60].join(" | "));

        let geometry = PageGeometry::default();
        let pages = PdfRenderer::new(&OfflineImageSource).compose(&report);
        assert!(pages.len() >= 2, "expected a continuation page, got {}", pages.len());

        for (index, page) in pages.iter().enumerate() {
            for op in page.operations.iter().filter(|op| op.operator == "Td") {
                let y = op.operands[1].as_float().expect("numeric y");
                assert!(y >= geometry.bottom_limit, "page {index}: text at y={y}");
            }
            for op in page.operations.iter().filter(|op| op.operator == "re") {
                let y = op.operands[1].as_float().expect("numeric y");
                assert!(y >= geometry.bottom_limit - 0.01, "page {index}: rect at y={y}");
            }
        }
        assert!(page_texts(&pages[1]).iter().any(|text| text == "S.No."));
        assert!(page_texts(&pages[1]).iter().any(|text| text.contains("SBIN0000123")));
    }
}
