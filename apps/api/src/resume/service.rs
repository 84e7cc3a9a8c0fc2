//! Résumé services: PDF text extraction, LLM structuring, translation, cover letters.
//! All LLM calls go through llm_client.

use anyhow::anyhow;
use bytes::Bytes;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, NO_INVENTION_INSTRUCTION};
use crate::llm_client::LlmClient;
use crate::resume::models::Resume;
use crate::resume::prompts::{
    COVER_LETTER_PROMPT, COVER_LETTER_SYSTEM, RESUME_PARSE_PROMPT, RESUME_PARSE_SYSTEM,
    TAILOR_PROMPT, TAILOR_SYSTEM, TRANSLATE_PROMPT,
};

/// Longer texts are cut before prompting; résumés rarely get near it.
pub const MAX_PROMPT_TEXT_CHARS: usize = 30_000;
const DEFAULT_TONE: &str = "professional";
/// Accepted range for the per-bullet word limit of a tailored résumé.
pub const BULLET_WORD_LIMITS: std::ops::RangeInclusive<u32> = 5..=100;

/// Knobs for regenerating a résumé against a job offer.
#[derive(Debug, Clone, Default)]
pub struct TailorOptions {
    pub job_description: Option<String>,
    pub ats_optimized: bool,
    pub bullet_word_limit: Option<u32>,
    /// Output language; `None` keeps the résumé's own language.
    pub language: Option<String>,
}

impl TailorOptions {
    /// Blank strings count as absent.
    pub fn normalized(self) -> Self {
        let non_blank = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            job_description: non_blank(self.job_description),
            language: non_blank(self.language),
            ..self
        }
    }
}

/// Runs pdf-extract on the blocking pool and normalizes the result.
pub async fn extract_resume_text(bytes: Bytes) -> Result<String, AppError> {
    let raw = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| AppError::Internal(anyhow!("Text extraction task failed: {e}")))?
        .map_err(|e| AppError::Processing {
            message: format!("Error processing file: {e}"),
            details: None,
        })?;

    let text = normalize_text(&raw);
    debug!("Extracted {} chars of résumé text", text.len());
    Ok(text)
}

/// Trims every line, collapses runs of blank lines to one and truncates on a char boundary.
pub fn normalize_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len().min(MAX_PROMPT_TEXT_CHARS));
    let mut blank_run = 0;

    for line in raw.lines().map(str::trim) {
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 || out.is_empty() {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }

    let trimmed = out.trim_end();
    match trimmed.char_indices().nth(MAX_PROMPT_TEXT_CHARS) {
        Some((cut, _)) => trimmed[..cut].to_string(),
        None => trimmed.to_string(),
    }
}

pub fn build_parse_prompt(resume_text: &str) -> String {
    RESUME_PARSE_PROMPT.replace("{resume_text}", resume_text)
}

pub async fn structure_resume(text: &str, llm: &LlmClient) -> Result<Resume, AppError> {
    let resume: Resume = llm
        .call_json(&build_parse_prompt(text), RESUME_PARSE_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Failed to structure résumé: {e}")))?;

    info!(
        "Structured résumé: {} experience, {} education, {} project entries",
        resume.experience.len(),
        resume.education.len(),
        resume.projects.len()
    );
    Ok(resume)
}

pub fn build_translate_prompt(resume: &Resume, language: &str) -> Result<String, AppError> {
    let resume_json = serde_json::to_string_pretty(resume)
        .map_err(|e| AppError::Internal(anyhow!("Failed to serialize résumé: {e}")))?;
    Ok(TRANSLATE_PROMPT
        .replace("{language}", language)
        .replace("{resume_json}", &resume_json))
}

pub async fn translate_resume(
    resume: &Resume,
    language: &str,
    llm: &LlmClient,
) -> Result<Resume, AppError> {
    let prompt = build_translate_prompt(resume, language)?;
    llm.call_json(&prompt, JSON_ONLY_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Failed to translate résumé into {language}: {e}")))
}

pub fn build_cover_letter_prompt(
    resume: &Resume,
    job_description: &str,
    tone: Option<&str>,
) -> Result<String, AppError> {
    let resume_json = serde_json::to_string_pretty(resume)
        .map_err(|e| AppError::Internal(anyhow!("Failed to serialize résumé: {e}")))?;
    let tone = tone
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TONE);
    Ok(COVER_LETTER_PROMPT
        .replace("{tone}", tone)
        .replace("{job_description}", job_description.trim())
        .replace("{resume_json}", &resume_json))
}

pub async fn write_cover_letter(
    resume: &Resume,
    job_description: &str,
    tone: Option<&str>,
    llm: &LlmClient,
) -> Result<String, AppError> {
    let prompt = build_cover_letter_prompt(resume, job_description, tone)?;
    let system = format!("{COVER_LETTER_SYSTEM} {NO_INVENTION_INSTRUCTION}");
    llm.call_text(&prompt, &system)
        .await
        .map_err(|e| AppError::Llm(format!("Failed to generate cover letter: {e}")))
}

pub fn build_tailor_prompt(resume: &Resume, options: &TailorOptions) -> Result<String, AppError> {
    let resume_json = serde_json::to_string_pretty(resume)
        .map_err(|e| AppError::Internal(anyhow!("Failed to serialize résumé: {e}")))?;

    let mut instructions = vec![
        "Highlight the skills, experience and achievements that matter most.".to_string(),
        "Use strong action verbs and quantify achievements where the data allows.".to_string(),
        "Remove redundancy and keep a logical, consistent structure.".to_string(),
    ];
    if options.ats_optimized {
        instructions.push(
            "Optimize for applicant tracking systems: plain wording, standard section names, \
             keywords from the job description."
                .to_string(),
        );
    }
    if options.job_description.is_some() {
        instructions.push(
            "Tailor the résumé to the job description by emphasizing the relevant qualifications."
                .to_string(),
        );
    }
    if let Some(limit) = options.bullet_word_limit {
        instructions.push(format!(
            "Keep each bullet point within approximately {limit} words."
        ));
    }
    instructions.push(match &options.language {
        Some(language) => format!("Write the résumé in {language}."),
        None => "Keep the language the résumé is written in.".to_string(),
    });
    instructions.push(NO_INVENTION_INSTRUCTION.trim().to_string());

    let instructions = instructions
        .iter()
        .enumerate()
        .map(|(i, line)| format!("{}. {line}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");
    let job_section = options
        .job_description
        .as_deref()
        .map(|jd| format!("JOB DESCRIPTION:\n{jd}\n\n"))
        .unwrap_or_default();

    Ok(TAILOR_PROMPT
        .replace("{ats}", if options.ats_optimized { ", ATS-optimized" } else { "" })
        .replace("{job_section}", &job_section)
        .replace("{instructions}", &instructions)
        .replace("{resume_json}", &resume_json))
}

/// Regenerates the résumé against a job offer. Without a job description there is nothing
/// to tailor to and the résumé comes back unchanged, with `false`.
pub async fn tailor_resume(
    resume: &Resume,
    options: &TailorOptions,
    llm: &LlmClient,
) -> Result<(Resume, bool), AppError> {
    if options.job_description.is_none() {
        debug!("No job description given; returning résumé untouched");
        return Ok((resume.clone(), false));
    }

    let prompt = build_tailor_prompt(resume, options)?;
    let tailored: Resume = llm
        .call_json(&prompt, TAILOR_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Failed to tailor résumé: {e}")))?;

    info!(
        "Tailored résumé (ats: {}, language: {})",
        options.ats_optimized,
        options.language.as_deref().unwrap_or("unchanged")
    );
    Ok((tailored, true))
}
