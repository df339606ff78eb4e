// Prompt construction for the enhancement call.
// Pure and deterministic: the same draft always yields the same prompt.

use serde_json::{json, Value};

use crate::models::resume::DraftResume;

/// Enhancement prompt template. Replace: {personal_info_json}, {draft_json}
pub const ENHANCEMENT_PROMPT_TEMPLATE: &str = r#"You are a professional resume writer specializing in ATS-optimized resumes.
Convert the resume data under INPUT into an enhanced, structured resume.

CRITICAL REQUIREMENTS:
1. Every experience and project entry MUST have exactly 3-4 bullet points in its "description" array.
2. Every bullet point MUST:
   - Start with the "●" character followed by a single space
   - Contain no other bullet markers or prefixes: no "•", "▪", "*", "-", "%" or emoji
   - Begin with a strong action verb
   - Mention concrete technologies and quantifiable results where the input supports them
3. Do NOT invent employers, institutions, job titles, dates, or links that are not in the input.
4. Group skills under the categories languages, frameworks, tools, databases and apis.
5. Respond with a single JSON object ONLY. No markdown code fences, no commentary.

OUTPUT FORMAT (follow this structure exactly):
{
  "personalInfo": {personal_info_json},
  "education": [
    {
      "institution": "University name",
      "degree": "Degree and major",
      "dates": "2019 - 2023",
      "details": "Relevant coursework or honors"
    }
  ],
  "experience": [
    {
      "company": "Company name",
      "position": "Job title",
      "dates": "Jan 2022 - Present",
      "description": [
        "● Engineered a feature that reduced processing time by 30%",
        "● Led a migration to a new service architecture serving 10k users",
        "● Automated deployment pipelines, cutting release time from hours to minutes"
      ]
    }
  ],
  "projects": [
    {
      "name": "Project name",
      "description": [
        "● Built a full-stack application with real-time updates",
        "● Designed a REST API handling 1,000+ requests per minute",
        "● Implemented authentication and role-based access control"
      ],
      "technologies": ["Technology 1", "Technology 2"],
      "link": "https://example.com/project",
      "dates": "2023"
    }
  ],
  "skills": {
    "languages": ["Language 1"],
    "frameworks": ["Framework 1"],
    "tools": ["Tool 1"],
    "databases": ["Database 1"],
    "apis": ["API 1"]
  }
}

INPUT:
{draft_json}"#;

/// Builds the enhancement prompt for `draft`. Never fails; absent fields render empty.
pub fn build_enhancement_prompt(draft: &DraftResume) -> String {
    fill_template(
        ENHANCEMENT_PROMPT_TEMPLATE,
        &[
            ("{personal_info_json}", &personal_info_skeleton(draft)),
            ("{draft_json}", &pretty(&json!(draft))),
        ],
    )
}

/// `personalInfo` pre-filled from the draft so the model echoes real contact details.
fn personal_info_skeleton(draft: &DraftResume) -> String {
    let basics = &draft.basics;
    let skeleton = json!({
        "name": basics.full_name(),
        "email": basics.email,
        "phone": basics.phone,
        "links": basics.links,
    });
    // Indent nested lines to sit under the "personalInfo" key.
    pretty(&skeleton).replace('\n', "\n  ")
}

fn pretty(value: &Value) -> String {
    // Serializing a `Value` cannot fail.
    serde_json::to_string_pretty(value).unwrap_or_default()
}

/// Single-pass placeholder substitution: inserted values are never rescanned,
/// so user text that happens to contain a placeholder stays literal.
fn fill_template(template: &str, slots: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some((pos, key, value)) = slots
        .iter()
        .filter_map(|&(key, value)| rest.find(key).map(|pos| (pos, key, value)))
        .min_by_key(|&(pos, _, _)| pos)
    {
        out.push_str(&rest[..pos]);
        out.push_str(value);
        rest = &rest[pos + key.len()..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::DraftBasics;

    fn draft() -> DraftResume {
        serde_json::from_value(json!({
            "basics": {
                "firstName": "Ada",
                "lastName": "Lovelace",
                "email": "ada@example.com",
                "phone": "555-0100",
                "links": { "github": "https://github.com/ada" }
            },
            "experience": [{ "company": "Engines Ltd", "role": "Engineer", "description": "Built things." }]
        }))
        .unwrap()
    }

    #[test]
    fn test_prompt_is_deterministic() {
        assert_eq!(build_enhancement_prompt(&draft()), build_enhancement_prompt(&draft()));
    }

    #[test]
    fn test_prompt_embeds_rules_and_input() {
        let prompt = build_enhancement_prompt(&draft());
        assert!(prompt.contains("exactly 3-4 bullet points"));
        assert!(prompt.contains("\"●\""));
        assert!(prompt.contains("INPUT:\n{"));
        assert!(prompt.contains("\"company\": \"Engines Ltd\""));
        assert!(!prompt.contains("{draft_json}"));
        assert!(!prompt.contains("{personal_info_json}"));
    }

    #[test]
    fn test_personal_info_skeleton_is_prefilled() {
        let prompt = build_enhancement_prompt(&draft());
        assert!(prompt.contains("\"name\": \"Ada Lovelace\""));
        assert!(prompt.contains("\"github\": \"https://github.com/ada\""));
    }

    #[test]
    fn test_empty_draft_renders_empty_fields() {
        let prompt = build_enhancement_prompt(&DraftResume::default());
        assert!(prompt.contains("\"name\": \"\""));
        assert!(prompt.contains("\"email\": \"\""));
    }

    #[test]
    fn test_user_values_are_json_escaped() {
        let draft = DraftResume {
            basics: DraftBasics {
                first_name: "Robert \"Bobby\"".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let prompt = build_enhancement_prompt(&draft);
        assert!(prompt.contains(r#""name": "Robert \"Bobby\"""#));
    }

    #[test]
    fn test_placeholder_text_in_user_data_stays_literal() {
        let draft = DraftResume {
            basics: DraftBasics {
                first_name: "{draft_json}".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let prompt = build_enhancement_prompt(&draft);
        assert!(prompt.contains("\"name\": \"{draft_json}\""));
    }

    #[test]
    fn test_fill_template_replaces_every_occurrence() {
        let out = fill_template("{a}-{b}-{a}", &[("{a}", "1"), ("{b}", "{a}")]);
        assert_eq!(out, "1-{a}-1");
    }
}
