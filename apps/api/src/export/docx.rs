//! DOCX export: a minimal WordprocessingML package written with `zip`.
//!
//! The package holds only `[Content_Types].xml`, `_rels/.rels` and
//! `word/document.xml`; formatting is inline run/paragraph properties.
//! Entry timestamps are pinned so identical documents zip to identical bytes.

use std::io::{Cursor, Write};

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::errors::AppError;
use crate::export::{
    contact_line, custom_items, entry_heading, section_plan, skill_lines, Section,
};
use crate::models::resume::{EducationEntry, ExperienceEntry, ProjectEntry, ResumeDocument};

// Sizes are in half-points, lengths in twentieths of a point.
const NAME_SIZE: u32 = 32;
const CONTACT_SIZE: u32 = 20;
const SECTION_TITLE_SIZE: u32 = 24;
const ENTRY_TITLE_SIZE: u32 = 20;
const BODY_SIZE: u32 = 18;

const PAGE_WIDTH_TWIPS: u32 = 12240;
const PAGE_HEIGHT_TWIPS: u32 = 15840;
const MARGIN_TWIPS: u32 = 1000;
/// Right tab stop for dates, at the right margin.
const RIGHT_TAB_TWIPS: u32 = PAGE_WIDTH_TWIPS - 2 * MARGIN_TWIPS;
const BODY_INDENT_TWIPS: u32 = 400;
const HANGING_TWIPS: u32 = 200;

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

/// Renders the document as a DOCX byte vector.
pub fn render(document: &ResumeDocument) -> Result<Vec<u8>, AppError> {
    let body = document_body(document);
    package(&[
        ("[Content_Types].xml", CONTENT_TYPES_XML),
        ("_rels/.rels", RELS_XML),
        ("word/document.xml", &document_xml(&body)),
    ])
}

// ────────────────────────────────────────────────────────────────────────────
// Body
// ────────────────────────────────────────────────────────────────────────────

fn document_body(document: &ResumeDocument) -> String {
    let mut body = BodyBuilder::default();

    let info = &document.personal_info;
    if !info.name.trim().is_empty() {
        body.centered(info.name.trim(), NAME_SIZE, true);
    }
    let contact = contact_line(info);
    if !contact.is_empty() {
        body.centered(&contact, CONTACT_SIZE, false);
    }

    for section in section_plan(document) {
        body.section_title(&section.title());
        match section {
            Section::Summary(summary) => body.detail(summary, false),
            Section::Education(entries) => entries.iter().for_each(|e| education(&mut body, e)),
            Section::Experience(entries) => entries.iter().for_each(|e| experience(&mut body, e)),
            Section::Projects(entries) => entries.iter().for_each(|e| project(&mut body, e)),
            Section::Skills(skills) => {
                for (label, values) in skill_lines(skills) {
                    body.labelled(label, &values);
                }
            }
            Section::Custom(custom) => {
                for item in custom_items(custom) {
                    body.bullet(&format!("● {item}"));
                }
            }
        }
    }

    body.xml
}

fn education(body: &mut BodyBuilder, entry: &EducationEntry) {
    body.entry_title(
        &entry_heading(&[entry.degree.as_str(), entry.institution.as_str()]),
        &entry.dates,
    );
    if let Some(details) = entry.details.as_deref() {
        body.detail(details, false);
    }
}

fn experience(body: &mut BodyBuilder, entry: &ExperienceEntry) {
    body.entry_title(
        &entry_heading(&[entry.position.as_str(), entry.company.as_str()]),
        &entry.dates,
    );
    for bullet in &entry.description {
        body.bullet(bullet);
    }
}

fn project(body: &mut BodyBuilder, entry: &ProjectEntry) {
    let link = entry.link.as_deref().unwrap_or_default();
    body.entry_title(&entry_heading(&[entry.name.as_str(), link]), &entry.dates);
    for bullet in &entry.description {
        body.bullet(bullet);
    }
    if !entry.technologies.is_empty() {
        body.detail(&format!("Technologies: {}", entry.technologies.join(", ")), true);
    }
}

/// Appends `<w:p>` elements to a document body.
#[derive(Default)]
struct BodyBuilder {
    xml: String,
}

impl BodyBuilder {
    /// `properties` must list `w:pPr` children in schema order
    /// (keepNext, pBdr, tabs, spacing, ind, jc); Word rejects other orders.
    fn paragraph(&mut self, properties: &str, runs: &str) {
        self.xml.push_str("<w:p><w:pPr>");
        self.xml.push_str(properties);
        self.xml.push_str("</w:pPr>");
        self.xml.push_str(runs);
        self.xml.push_str("</w:p>");
    }

    fn centered(&mut self, text: &str, size: u32, bold: bool) {
        self.paragraph(
            r#"<w:spacing w:after="60"/><w:jc w:val="center"/>"#,
            &run(text, size, bold, false),
        );
    }

    /// Bold title with a bottom border standing in for a horizontal rule.
    fn section_title(&mut self, title: &str) {
        self.paragraph(
            r#"<w:keepNext/><w:pBdr><w:bottom w:val="single" w:sz="6" w:space="1" w:color="000000"/></w:pBdr><w:spacing w:before="240" w:after="80"/>"#,
            &run(title, SECTION_TITLE_SIZE, true, false),
        );
    }

    /// Bold title, then the dates on a right-aligned tab stop.
    fn entry_title(&mut self, title: &str, dates: &str) {
        let mut runs = run(title, ENTRY_TITLE_SIZE, true, false);
        let dates = dates.trim();
        if !dates.is_empty() {
            runs.push_str("<w:r><w:tab/></w:r>");
            runs.push_str(&run(dates, BODY_SIZE, false, false));
        }
        self.paragraph(
            &format!(
                r#"<w:keepNext/><w:tabs><w:tab w:val="right" w:pos="{RIGHT_TAB_TWIPS}"/></w:tabs><w:spacing w:before="120" w:after="40"/>"#
            ),
            &runs,
        );
    }

    fn bullet(&mut self, text: &str) {
        self.paragraph(
            &format!(
                r#"<w:spacing w:after="20"/><w:ind w:left="{BODY_INDENT_TWIPS}" w:hanging="{HANGING_TWIPS}"/>"#
            ),
            &run(text, BODY_SIZE, false, false),
        );
    }

    fn detail(&mut self, text: &str, italic: bool) {
        self.paragraph(
            &format!(r#"<w:spacing w:after="40"/><w:ind w:left="{BODY_INDENT_TWIPS}"/>"#),
            &run(text, BODY_SIZE, false, italic),
        );
    }

    /// `Label: values`, with the label in bold.
    fn labelled(&mut self, label: &str, values: &str) {
        let runs = run(&format!("{label}: "), BODY_SIZE, true, false) + &run(values, BODY_SIZE, false, false);
        self.paragraph(r#"<w:spacing w:after="20"/>"#, &runs);
    }
}

fn run(text: &str, size: u32, bold: bool, italic: bool) -> String {
    let mut props = String::new();
    if bold {
        props.push_str("<w:b/>");
    }
    if italic {
        props.push_str("<w:i/>");
    }
    format!(
        r#"<w:r><w:rPr>{props}<w:sz w:val="{size}"/><w:szCs w:val="{size}"/></w:rPr><w:t xml:space="preserve">{}</w:t></w:r>"#,
        escape_xml(text)
    )
}

fn document_xml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}<w:sectPr><w:pgSz w:w="{PAGE_WIDTH_TWIPS}" w:h="{PAGE_HEIGHT_TWIPS}"/><w:pgMar w:top="{MARGIN_TWIPS}" w:right="{MARGIN_TWIPS}" w:bottom="{MARGIN_TWIPS}" w:left="{MARGIN_TWIPS}" w:header="720" w:footer="720" w:gutter="0"/></w:sectPr></w:body></w:document>"#
    )
}

/// Escapes XML text content and drops characters XML 1.0 cannot carry.
fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\t' | '\n' | '\r' => out.push(' '),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Packaging
// ────────────────────────────────────────────────────────────────────────────

fn package(parts: &[(&str, &str)]) -> Result<Vec<u8>, AppError> {
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default());

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in parts {
        zip.start_file(*name, options).map_err(zip_failure)?;
        zip.write_all(content.as_bytes())
            .map_err(|e| AppError::RenderFailure(format!("DOCX write failed: {e}")))?;
    }
    let cursor = zip.finish().map_err(zip_failure)?;
    Ok(cursor.into_inner())
}

fn zip_failure(e: zip::result::ZipError) -> AppError {
    AppError::RenderFailure(format!("DOCX packaging failed: {e}"))
}
