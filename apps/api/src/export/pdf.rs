//! PDF export via `lopdf`, using only the base-14 Helvetica faces so no font
//! program is embedded.
//!
//! Layout is a single top-down pass: a cursor `y` walks down the page and a new
//! page starts whenever the next block would cross the bottom margin.
//! Text is WinAnsi-encoded; characters outside that code page print as `?`.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use crate::errors::AppError;
use crate::export::font_metrics::{wrap_text, FontFace};
use crate::export::{
    contact_line, custom_items, entry_heading, section_plan, skill_lines, Section,
};
use crate::models::resume::{EducationEntry, ExperienceEntry, ProjectEntry, ResumeDocument};

// US Letter, in points.
const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 50.0;
const CONTENT_LEFT: f32 = MARGIN;
const CONTENT_RIGHT: f32 = PAGE_WIDTH - MARGIN;
const CONTENT_WIDTH: f32 = CONTENT_RIGHT - CONTENT_LEFT;

const NAME_SIZE: f32 = 24.0;
const CONTACT_SIZE: f32 = 10.0;
const SECTION_TITLE_SIZE: f32 = 12.0;
const ENTRY_TITLE_SIZE: f32 = 11.0;
const BODY_SIZE: f32 = 10.0;
const TECH_SIZE: f32 = 9.0;

const BODY_INDENT: f32 = 20.0;
const LEADING: f32 = 1.25;
const SECTION_GAP: f32 = 10.0;
const ENTRY_GAP: f32 = 6.0;
/// Minimum gap between an entry title and its right-aligned dates.
const DATE_GUTTER: f32 = 12.0;

/// Renders the document as a PDF byte vector.
pub fn render(document: &ResumeDocument) -> Result<Vec<u8>, AppError> {
    let mut writer = PageWriter::new();

    write_header(&mut writer, document);
    for section in section_plan(document) {
        write_section(&mut writer, &section);
    }

    assemble(writer.finish())
}

// ────────────────────────────────────────────────────────────────────────────
// Content layout
// ────────────────────────────────────────────────────────────────────────────

fn write_header(writer: &mut PageWriter, document: &ResumeDocument) {
    let info = &document.personal_info;
    let name = info.name.trim();
    if !name.is_empty() {
        writer.centered(name, FontFace::Bold, NAME_SIZE);
    }
    let contact = contact_line(info);
    if !contact.is_empty() {
        for line in wrap_text(&contact, FontFace::Regular, CONTACT_SIZE, CONTENT_WIDTH) {
            writer.centered(&line, FontFace::Regular, CONTACT_SIZE);
        }
    }
    writer.gap(SECTION_GAP);
}

fn write_section(writer: &mut PageWriter, section: &Section<'_>) {
    writer.section_title(&section.title());

    match section {
        Section::Summary(summary) => {
            writer.paragraph(summary, FontFace::Regular, BODY_SIZE, 0.0);
        }
        Section::Education(entries) => {
            for entry in entries.iter() {
                write_education(writer, entry);
            }
        }
        Section::Experience(entries) => {
            for entry in entries.iter() {
                write_experience(writer, entry);
            }
        }
        Section::Projects(entries) => {
            for entry in entries.iter() {
                write_project(writer, entry);
            }
        }
        Section::Skills(skills) => {
            for (label, values) in skill_lines(skills) {
                writer.paragraph(&format!("{label}: {values}"), FontFace::Regular, BODY_SIZE, 0.0);
            }
        }
        Section::Custom(custom) => {
            for item in custom_items(custom) {
                writer.bullet(&format!("● {item}"));
            }
        }
    }

    writer.gap(SECTION_GAP);
}

fn write_education(writer: &mut PageWriter, entry: &EducationEntry) {
    writer.entry_title(&entry_heading(&[entry.degree.as_str(), entry.institution.as_str()]), &entry.dates);
    if let Some(details) = entry.details.as_deref() {
        writer.paragraph(details, FontFace::Regular, BODY_SIZE, BODY_INDENT);
    }
    writer.gap(ENTRY_GAP);
}

fn write_experience(writer: &mut PageWriter, entry: &ExperienceEntry) {
    writer.entry_title(&entry_heading(&[entry.position.as_str(), entry.company.as_str()]), &entry.dates);
    for bullet in &entry.description {
        writer.bullet(bullet);
    }
    writer.gap(ENTRY_GAP);
}

fn write_project(writer: &mut PageWriter, entry: &ProjectEntry) {
    let link = entry.link.as_deref().unwrap_or_default();
    writer.entry_title(&entry_heading(&[entry.name.as_str(), link]), &entry.dates);
    for bullet in &entry.description {
        writer.bullet(bullet);
    }
    if !entry.technologies.is_empty() {
        let technologies = format!("Technologies: {}", entry.technologies.join(", "));
        writer.paragraph(&technologies, FontFace::Oblique, TECH_SIZE, BODY_INDENT);
    }
    writer.gap(ENTRY_GAP);
}

// ────────────────────────────────────────────────────────────────────────────
// Page writer
// ────────────────────────────────────────────────────────────────────────────

/// Accumulates content-stream operations page by page, tracking the baseline cursor.
struct PageWriter {
    pages: Vec<Vec<Operation>>,
    current: Vec<Operation>,
    /// Top of the next line, in PDF user space (origin bottom-left).
    y: f32,
}

impl PageWriter {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        self.pages.push(self.current);
        self.pages
    }

    /// Starts a new page if `height` points don't fit above the bottom margin.
    fn reserve(&mut self, height: f32) {
        if self.y - height < MARGIN && !self.current.is_empty() {
            self.pages.push(std::mem::take(&mut self.current));
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }

    fn gap(&mut self, height: f32) {
        self.y -= height;
    }

    /// Advances one line of `size` and returns its baseline.
    fn next_baseline(&mut self, size: f32) -> f32 {
        self.reserve(size * LEADING);
        let baseline = self.y - size;
        self.y -= size * LEADING;
        baseline
    }

    fn text(&mut self, x: f32, baseline: f32, face: FontFace, size: f32, text: &str) {
        self.current.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![face.resource_name().into(), size.into()]),
            Operation::new("Td", vec![x.into(), baseline.into()]),
            Operation::new("Tj", vec![Object::string_literal(encode_win_ansi(text))]),
            Operation::new("ET", vec![]),
        ]);
    }

    fn centered(&mut self, text: &str, face: FontFace, size: f32) {
        let width = face.metrics().width_pt(text, size);
        let x = CONTENT_LEFT + ((CONTENT_WIDTH - width) / 2.0).max(0.0);
        let baseline = self.next_baseline(size);
        self.text(x, baseline, face, size, text);
    }

    fn section_title(&mut self, title: &str) {
        // Keep the title with at least its rule and one body line.
        self.reserve(SECTION_TITLE_SIZE * LEADING + 4.0 + BODY_SIZE * LEADING);
        let baseline = self.next_baseline(SECTION_TITLE_SIZE);
        self.text(CONTENT_LEFT, baseline, FontFace::Bold, SECTION_TITLE_SIZE, title);

        let rule_y = baseline - 3.0;
        self.current.extend([
            Operation::new("w", vec![0.5_f32.into()]),
            Operation::new("m", vec![CONTENT_LEFT.into(), rule_y.into()]),
            Operation::new("l", vec![CONTENT_RIGHT.into(), rule_y.into()]),
            Operation::new("S", vec![]),
        ]);
        self.gap(4.0);
    }

    /// Bold title on the left, dates right-aligned on the first title baseline.
    fn entry_title(&mut self, title: &str, dates: &str) {
        let dates = dates.trim();
        let date_width = FontFace::Regular.metrics().width_pt(dates, BODY_SIZE);
        let title_width = if dates.is_empty() {
            CONTENT_WIDTH
        } else {
            CONTENT_WIDTH - date_width - DATE_GUTTER
        };

        let mut lines = wrap_text(title, FontFace::Bold, ENTRY_TITLE_SIZE, title_width);
        if lines.is_empty() && !dates.is_empty() {
            lines.push(String::new());
        }

        for (i, line) in lines.iter().enumerate() {
            let baseline = self.next_baseline(ENTRY_TITLE_SIZE);
            if !line.is_empty() {
                self.text(CONTENT_LEFT, baseline, FontFace::Bold, ENTRY_TITLE_SIZE, line);
            }
            if i == 0 && !dates.is_empty() {
                let x = CONTENT_RIGHT - date_width;
                self.text(x, baseline, FontFace::Regular, BODY_SIZE, dates);
            }
        }
    }

    /// Wrapped text block starting at `indent`.
    fn paragraph(&mut self, text: &str, face: FontFace, size: f32, indent: f32) {
        for line in wrap_text(text, face, size, CONTENT_WIDTH - indent) {
            let baseline = self.next_baseline(size);
            self.text(CONTENT_LEFT + indent, baseline, face, size, &line);
        }
    }

    /// A `"● text"` bullet with a hanging indent: continuation lines align with
    /// the text, not the marker.
    fn bullet(&mut self, bullet: &str) {
        let (marker, body) = split_marker(bullet);
        let marker_x = CONTENT_LEFT + BODY_INDENT;
        let marker_width = if marker.is_empty() {
            0.0
        } else {
            FontFace::Regular.metrics().width_pt(&format!("{marker} "), BODY_SIZE)
        };
        let text_x = marker_x + marker_width;

        let lines = wrap_text(body, FontFace::Regular, BODY_SIZE, CONTENT_RIGHT - text_x);
        for (i, line) in lines.iter().enumerate() {
            let baseline = self.next_baseline(BODY_SIZE);
            if i == 0 && !marker.is_empty() {
                self.text(marker_x, baseline, FontFace::Regular, BODY_SIZE, marker);
            }
            self.text(text_x, baseline, FontFace::Regular, BODY_SIZE, line);
        }
    }
}

/// Splits a leading `●`/`•` marker off a bullet; anything else is all body.
fn split_marker(bullet: &str) -> (&str, &str) {
    match bullet.split_once(' ') {
        Some((marker, body)) if matches!(marker, "●" | "•") => (marker, body),
        _ => ("", bullet),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Document assembly
// ────────────────────────────────────────────────────────────────────────────

fn assemble(pages: Vec<Vec<Operation>>) -> Result<Vec<u8>, AppError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let fonts = [FontFace::Regular, FontFace::Bold, FontFace::Oblique]
        .into_iter()
        .map(|face| {
            let font_id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => face.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            (face.resource_name(), font_id)
        })
        .collect::<Vec<(&str, ObjectId)>>();

    let mut font_dict = lopdf::Dictionary::new();
    for (name, id) in fonts {
        font_dict.set(name, id);
    }
    let resources_id = doc.add_object(dictionary! { "Font" => font_dict });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations };
        let encoded = content
            .encode()
            .map_err(|e| AppError::RenderFailure(format!("PDF content encoding failed: {e}")))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count,
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            PAGE_WIDTH.into(),
            PAGE_HEIGHT.into(),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| AppError::RenderFailure(format!("PDF serialization failed: {e}")))?;
    Ok(bytes)
}

/// Encodes text for a WinAnsiEncoding font. Bullet glyphs map to 0x95; other
/// characters outside the code page become `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '●' | '•' => 0x95,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '–' => 0x96,
            '—' => 0x97,
            '…' => 0x85,
            '€' => 0x80,
            '\t' => b' ',
            c if (' '..='~').contains(&c) => c as u8,
            c if ('\u{A0}'..='\u{FF}').contains(&c) => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::fixtures::sample_document;

    /// Every `Tj` string in page order, decoded as Latin-1 (with 0x95 shown as `●`).
    fn shown_text(bytes: &[u8]) -> Vec<Vec<String>> {
        let doc = Document::load_mem(bytes).unwrap();
        doc.get_pages()
            .values()
            .map(|&page_id| {
                let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
                content
                    .operations
                    .iter()
                    .filter(|op| op.operator == "Tj")
                    .filter_map(|op| match op.operands.first() {
                        Some(Object::String(bytes, _)) => Some(
                            bytes
                                .iter()
                                .map(|&b| if b == 0x95 { '●' } else { b as char })
                                .collect(),
                        ),
                        _ => None,
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_pdf_has_header_and_sections_in_order() {
        let bytes = render(&sample_document()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let pages = shown_text(&bytes);
        assert_eq!(pages.len(), 1);
        let text = &pages[0];
        assert_eq!(text[0], "Ada Lovelace");
        assert_eq!(text[1], "ada@example.com | 555-0100 | https://github.com/ada");

        let position = |needle: &str| text.iter().position(|t| t == needle).unwrap();
        assert!(position("EDUCATION") < position("PROFESSIONAL EXPERIENCE"));
        assert!(position("PROFESSIONAL EXPERIENCE") < position("PROJECTS"));
        assert!(position("PROJECTS") < position("TECHNICAL SKILLS"));
        assert!(position("TECHNICAL SKILLS") < position("AWARDS"));
        assert!(text.contains(&"Lead Programmer | Analytical Engines Ltd".to_string()));
        assert!(text.contains(&"1842 - 1843".to_string()));
        assert!(text.contains(&"Languages: Mathematics, French".to_string()));
        assert!(text.contains(&"Technologies: Analytical Engine, Punch cards".to_string()));
        assert!(text.iter().any(|t| t == "●"));
    }

    #[test]
    fn test_pdf_omits_empty_sections() {
        let mut doc = sample_document();
        doc.education.clear();
        doc.custom_sections.clear();
        let text = shown_text(&render(&doc).unwrap()).concat();
        assert!(!text.contains(&"EDUCATION".to_string()));
        assert!(!text.contains(&"AWARDS".to_string()));
        assert!(text.contains(&"PROJECTS".to_string()));
    }

    #[test]
    fn test_pdf_is_deterministic() {
        let doc = sample_document();
        assert_eq!(render(&doc).unwrap(), render(&doc).unwrap());
    }

    #[test]
    fn test_long_resume_breaks_across_pages() {
        let mut doc = sample_document();
        let entry = doc.experience[0].clone();
        doc.experience = vec![entry; 25];
        let pages = shown_text(&render(&doc).unwrap());
        assert!(pages.len() > 1);
        assert!(pages.iter().all(|page| !page.is_empty()));
    }

    #[test]
    fn test_minimal_document_still_renders() {
        let bytes = render(&ResumeDocument::default()).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_only_bullet_glyphs_are_split_off_as_markers() {
        assert_eq!(split_marker("● Led a team"), ("●", "Led a team"));
        assert_eq!(split_marker("• Led a team"), ("•", "Led a team"));
        assert_eq!(split_marker("I led a team"), ("", "I led a team"));
        assert_eq!(split_marker("A"), ("", "A"));

        let mut doc = sample_document();
        doc.experience[0].description = vec!["I led a team of four".to_string()];
        let text = shown_text(&render(&doc).unwrap()).concat();
        assert!(text.contains(&"I led a team of four".to_string()));
    }

    #[test]
    fn test_win_ansi_encoding() {
        assert_eq!(encode_win_ansi("● A"), vec![0x95, b' ', b'A']);
        assert_eq!(encode_win_ansi("José"), vec![b'J', b'o', b's', 0xE9]);
        assert_eq!(encode_win_ansi("1–2"), vec![b'1', 0x96, b'2']);
        assert_eq!(encode_win_ansi("日"), vec![b'?']);
    }
}
