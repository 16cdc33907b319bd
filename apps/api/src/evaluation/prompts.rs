//! Evaluation prompt: fixed output-format header + vacancy block + résumé block.
//!
//! `build_prompt` is pure and never fails. Empty fields render as empty text,
//! and every free-text field is capped so the prompt size stays bounded.

use crate::models::application::{Resume, Vacancy, WorkExperience};

/// Longest rendering of any single free-text field, in characters.
pub const MAX_FIELD_CHARS: usize = 4000;
/// Work-experience entries beyond this count are not sent to the model.
pub const MAX_WORK_EXPERIENCE_ENTRIES: usize = 20;

pub const NO_WORK_EXPERIENCE: &str = "No work experience provided.";

/// Output-format header. The model must answer with exactly one JSON object.
pub const EVALUATION_INSTRUCTIONS: &str = r#"Compare the job vacancy with the candidate's resume and evaluate how well the candidate fits the vacancy.

Return a SINGLE valid JSON object with EXACTLY these keys:
- "result": one of "Passed", "Failed" or "Pending".
- "comments": a short string explaining the evaluation.
- "strengths": array of at most 5 strings with the candidate's strengths for this vacancy.
- "weaknesses": array of at most 5 strings with the candidate's weaknesses or gaps.
- "score": optional integer from 0 to 100 indicating the degree of fit (100 = perfect).
- "reasons": optional array of strings with the most important reasons (audit only).

Example of a valid response:
{"result": "Passed", "comments": "Good technical fit for the role", "strengths": ["Matching skills in Go and SQL", "5 years in the sector"], "weaknesses": ["No cloud certification"], "score": 78, "reasons": ["Skills match the requirements", "Relevant sector experience"]}

Do NOT include any text outside the JSON object. Do NOT wrap it in markdown code fences."#;

/// Renders the full evaluation prompt for one vacancy/résumé pair.
pub fn build_prompt(vacancy: &Vacancy, resume: &Resume) -> String {
    let mut prompt = String::with_capacity(4096);
    prompt.push_str(EVALUATION_INSTRUCTIONS);
    prompt.push_str("\n\n");
    render_vacancy(&mut prompt, vacancy);
    prompt.push('\n');
    render_resume(&mut prompt, resume);
    prompt
}

fn render_vacancy(out: &mut String, vacancy: &Vacancy) {
    out.push_str(&format!(
        "Vacancy:\nTitle: {}\nDescription: {}\nRequirements: {}\nLocation: {}\n",
        bounded(&vacancy.title),
        bounded(&vacancy.description),
        bounded(&vacancy.requirements),
        bounded(&vacancy.location),
    ));
}

fn render_resume(out: &mut String, resume: &Resume) {
    out.push_str(&format!(
        "Resume:\nProfileSummary: {}\nAcademicTraining: {}\nSkills: {}\nLanguages: {}\nWorkExperience:\n{}\n",
        bounded(&resume.profile_summary),
        bounded(&resume.academic_training),
        bounded(&resume.skills),
        bounded(&resume.languages),
        render_work_experience(&resume.work_experience),
    ));
}

fn render_work_experience(entries: &[WorkExperience]) -> String {
    if entries.is_empty() {
        return NO_WORK_EXPERIENCE.to_string();
    }

    entries
        .iter()
        .take(MAX_WORK_EXPERIENCE_ENTRIES)
        .map(render_work_entry)
        .collect::<Vec<_>>()
        .join("\n")
}

/// `- <position> at <company> (<YYYY-MM> - <YYYY-MM|Present>): <description>`
fn render_work_entry(entry: &WorkExperience) -> String {
    let end = entry
        .end_date
        .map(|d| d.format("%Y-%m").to_string())
        .unwrap_or_else(|| "Present".to_string());

    format!(
        "- {} at {} ({} - {}): {}",
        bounded(&entry.position),
        bounded(&entry.company_name),
        entry.start_date.format("%Y-%m"),
        end,
        bounded(&entry.description),
    )
}

/// Caps a field at `MAX_FIELD_CHARS` characters, marking the cut with `…`.
fn bounded(text: &str) -> String {
    match text.char_indices().nth(MAX_FIELD_CHARS) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}
