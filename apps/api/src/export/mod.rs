//! Export — renders a canonical resume document into a downloadable artifact.
//!
//! Renderers are pure functions of the document: no clock, no randomness,
//! so the same document and format always produce the same bytes.
//! PDF and DOCX share the section plan below so their order and omissions match.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;

use crate::errors::AppError;
use crate::models::resume::{
    CustomSection, EducationEntry, ExperienceEntry, PersonalInfo, ProjectEntry, ResumeDocument,
    Skills,
};

pub mod docx;
pub mod font_metrics;
pub mod handlers;
pub mod json;
pub mod pdf;

// ────────────────────────────────────────────────────────────────────────────
// Format + artifact
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Pdf,
    Docx,
}

impl ExportFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = AppError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "pdf" => Ok(ExportFormat::Pdf),
            "docx" => Ok(ExportFormat::Docx),
            _ => Err(AppError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A rendered export, ready to be sent as a download.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub bytes: Bytes,
    pub mime_type: &'static str,
    pub filename: String,
}

/// Renders `document` in `format`. CPU-bound; async callers should run it on
/// the blocking pool.
pub fn render_export(
    document: &ResumeDocument,
    format: ExportFormat,
) -> Result<ExportArtifact, AppError> {
    let bytes = match format {
        ExportFormat::Json => json::render(document)?,
        ExportFormat::Pdf => pdf::render(document)?,
        ExportFormat::Docx => docx::render(document)?,
    };

    Ok(ExportArtifact {
        bytes: Bytes::from(bytes),
        mime_type: format.mime_type(),
        filename: export_filename(&document.personal_info, format),
    })
}

/// `<name>_resume.<ext>`, with `resume` standing in for a blank name. Quotes,
/// slashes and control characters are dropped so the name is header-safe.
pub fn export_filename(info: &PersonalInfo, format: ExportFormat) -> String {
    let cleaned: String = info
        .name
        .chars()
        .filter(|c| !matches!(c, '"' | '/' | '\\') && !c.is_control())
        .collect();
    let stem = match cleaned.trim() {
        "" => "resume",
        name => name,
    };
    format!("{stem}_resume.{}", format.extension())
}

// ────────────────────────────────────────────────────────────────────────────
// Section plan (shared by PDF and DOCX)
// ────────────────────────────────────────────────────────────────────────────

/// One populated section of the rendered resume, in render order.
#[derive(Debug, Clone, Copy)]
pub enum Section<'a> {
    Summary(&'a str),
    Education(&'a [EducationEntry]),
    Experience(&'a [ExperienceEntry]),
    Projects(&'a [ProjectEntry]),
    Skills(&'a Skills),
    Custom(&'a CustomSection),
}

impl Section<'_> {
    pub fn title(&self) -> String {
        match self {
            Section::Summary(_) => "PROFESSIONAL SUMMARY".to_string(),
            Section::Education(_) => "EDUCATION".to_string(),
            Section::Experience(_) => "PROFESSIONAL EXPERIENCE".to_string(),
            Section::Projects(_) => "PROJECTS".to_string(),
            Section::Skills(_) => "TECHNICAL SKILLS".to_string(),
            Section::Custom(section) => section.title.trim().to_uppercase(),
        }
    }
}

/// Summary, Education, Experience, Projects, Skills, then custom sections.
/// Empty sections are left out.
pub fn section_plan(document: &ResumeDocument) -> Vec<Section<'_>> {
    let mut plan = Vec::new();

    if let Some(summary) = document.summary.as_deref().map(str::trim) {
        if !summary.is_empty() {
            plan.push(Section::Summary(summary));
        }
    }
    if !document.education.is_empty() {
        plan.push(Section::Education(&document.education));
    }
    if !document.experience.is_empty() {
        plan.push(Section::Experience(&document.experience));
    }
    if !document.projects.is_empty() {
        plan.push(Section::Projects(&document.projects));
    }
    if !document.skills.is_empty() {
        plan.push(Section::Skills(&document.skills));
    }
    for section in &document.custom_sections {
        if !section.title.trim().is_empty() && !custom_items(section).is_empty() {
            plan.push(Section::Custom(section));
        }
    }

    plan
}

/// `email | phone | link…`, skipping blanks. Links follow key order.
pub fn contact_line(info: &PersonalInfo) -> String {
    [info.email.as_str(), info.phone.as_str()]
        .into_iter()
        .chain(info.links.values().map(String::as_str))
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Joins the non-blank parts of an entry heading with `" | "`.
pub fn entry_heading(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" | ")
}

/// `(label, "a, b, c")` for each non-empty skill category.
pub fn skill_lines(skills: &Skills) -> Vec<(&'static str, String)> {
    skills
        .categories()
        .into_iter()
        .filter(|(_, values)| !values.is_empty())
        .map(|(key, values)| (skill_label(key), values.join(", ")))
        .collect()
}

fn skill_label(key: &str) -> &'static str {
    match key {
        "languages" => "Languages",
        "frameworks" => "Frameworks",
        "tools" => "Tools",
        "databases" => "Databases",
        _ => "APIs",
    }
}

/// Non-blank items of a custom section, trimmed.
pub fn custom_items(section: &CustomSection) -> Vec<&str> {
    section
        .items
        .iter()
        .map(|i| i.trim())
        .filter(|i| !i.is_empty())
        .collect()
}


#[cfg(test)]
mod tests {
    use super::fixtures::sample_document;
    use super::*;

    #[test]
    fn test_format_parsing_is_case_insensitive() {
        assert_eq!("PDF".parse::<ExportFormat>().unwrap(), ExportFormat::Pdf);
        assert_eq!(" Docx ".parse::<ExportFormat>().unwrap(), ExportFormat::Docx);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
    }

    #[test]
    fn test_unknown_format_is_unsupported() {
        for raw in ["txt", "", "pdfx", "doc"] {
            assert!(matches!(
                raw.parse::<ExportFormat>(),
                Err(AppError::UnsupportedFormat(_))
            ));
        }
    }

    #[test]
    fn test_every_format_renders_with_its_mime_type() {
        let doc = sample_document();
        for (format, mime) in [
            (ExportFormat::Json, "application/json"),
            (ExportFormat::Pdf, "application/pdf"),
            (
                ExportFormat::Docx,
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            ),
        ] {
            let artifact = render_export(&doc, format).unwrap();
            assert!(!artifact.bytes.is_empty(), "{format} rendered no bytes");
            assert_eq!(artifact.mime_type, mime);
            assert_eq!(artifact.filename, format!("Ada Lovelace_resume.{format}"));
        }
    }

    #[test]
    fn test_format_case_does_not_change_bytes() {
        let doc = sample_document();
        let upper = render_export(&doc, "PDF".parse().unwrap()).unwrap();
        let lower = render_export(&doc, "pdf".parse().unwrap()).unwrap();
        assert_eq!(upper.bytes, lower.bytes);
    }

    #[test]
    fn test_filename_falls_back_and_is_sanitized() {
        let mut info = PersonalInfo::default();
        assert_eq!(export_filename(&info, ExportFormat::Pdf), "resume_resume.pdf");

        info.name = "  ".to_string();
        assert_eq!(export_filename(&info, ExportFormat::Json), "resume_resume.json");

        info.name = "Ada \"The Countess\" L/ove\\lace\r\n".to_string();
        assert_eq!(
            export_filename(&info, ExportFormat::Docx),
            "Ada The Countess Lovelace_resume.docx"
        );
    }

    #[test]
    fn test_section_plan_order_and_omission() {
        let mut doc = sample_document();
        doc.summary = Some("Mathematician and writer.".to_string());
        let titles: Vec<String> = section_plan(&doc).iter().map(Section::title).collect();
        assert_eq!(
            titles,
            vec![
                "PROFESSIONAL SUMMARY",
                "EDUCATION",
                "PROFESSIONAL EXPERIENCE",
                "PROJECTS",
                "TECHNICAL SKILLS",
                "AWARDS"
            ]
        );

        doc.summary = Some("   ".to_string());
        doc.education.clear();
        doc.skills = Skills::default();
        doc.custom_sections[0].items = vec!["  ".to_string()];
        let titles: Vec<String> = section_plan(&doc).iter().map(Section::title).collect();
        assert_eq!(titles, vec!["PROFESSIONAL EXPERIENCE", "PROJECTS"]);
    }

    #[test]
    fn test_contact_line_skips_blanks() {
        let mut info = sample_document().personal_info;
        assert_eq!(
            contact_line(&info),
            "ada@example.com | 555-0100 | https://github.com/ada"
        );
        info.phone.clear();
        info.links.clear();
        assert_eq!(contact_line(&info), "ada@example.com");
    }

    #[test]
    fn test_skill_lines_skip_empty_categories() {
        let lines = skill_lines(&sample_document().skills);
        assert_eq!(
            lines,
            vec![
                ("Languages", "Mathematics, French".to_string()),
                ("Tools", "Difference Engine".to_string()),
                ("APIs", "REST APIs".to_string()),
            ]
        );
    }

    #[test]
    fn test_entry_heading_skips_blank_parts() {
        assert_eq!(entry_heading(&["BSc", "MIT"]), "BSc | MIT");
        assert_eq!(entry_heading(&["", "MIT"]), "MIT");
    }
}
