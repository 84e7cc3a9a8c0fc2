// Résumé LLM prompt templates.
// All prompts for the resume module are defined here.

pub const RESUME_PARSE_SYSTEM: &str = "\
You are a precise résumé data extractor. \
Convert raw résumé text into the JSON schema you are given. \
You MUST respond with valid JSON only: no markdown fences, no explanations.";

pub const RESUME_PARSE_PROMPT: &str = r#"Extract the résumé below into JSON.

RÉSUMÉ TEXT:
{resume_text}

OUTPUT SCHEMA (camelCase keys, use "" or [] for anything missing):
{
  "personalInfo": {"fullName": "", "email": "", "phone": "", "location": "", "linkedin": "", "website": "", "github": "", "portfolio": ""},
  "professionalSummary": "",
  "skills": {"technical": [], "soft": [], "languages": []},
  "tools": [],
  "experience": [{"title": "", "company": "", "location": "", "startDate": "", "endDate": "", "responsibilities": []}],
  "education": [{"degree": "", "institution": "", "location": "", "graduationYear": "", "relevantCourses": []}],
  "certifications": [{"name": "", "issuer": "", "year": ""}],
  "publications": [{"title": "", "publicationType": "", "year": "", "link": ""}],
  "awards": [{"name": "", "year": "", "description": ""}],
  "volunteerExperience": [{"role": "", "organization": "", "startDate": "", "endDate": "", "description": ""}],
  "projects": [{"title": "", "description": "", "technologiesUsed": [], "github": "", "role": ""}],
  "onlinePresence": {"twitter": "", "stackOverflow": "", "medium": ""},
  "hobbies": []
}"#;

pub const TRANSLATE_PROMPT: &str = r#"Translate every human-readable value of this résumé JSON into {language}.
Keep the keys, structure, names, e-mail addresses, URLs and dates unchanged.
Return the translated JSON document only.

RÉSUMÉ JSON:
{resume_json}"#;

pub const COVER_LETTER_SYSTEM: &str = "\
You write concise, specific cover letters. \
Respond with the letter text only: no subject line, no placeholders in brackets.";

pub const COVER_LETTER_PROMPT: &str = r#"Write a cover letter of at most 350 words in a {tone} tone.

JOB DESCRIPTION:
{job_description}

CANDIDATE RÉSUMÉ (JSON):
{resume_json}"#;

pub const TAILOR_SYSTEM: &str = "\
You are a professional résumé writer. \
You rewrite résumé JSON documents and return the same schema, as valid JSON only.";

/// `{instructions}` is a numbered list assembled per request.
pub const TAILOR_PROMPT: &str = r#"Rewrite the résumé below into a polished, modern{ats} résumé.

{job_section}INSTRUCTIONS:
{instructions}

SPECIAL HANDLING:
- Drop placeholders such as "[Your LinkedIn Profile URL]", "N/A", "null" or "Not Provided".
- Leave a section as "" or [] when it has no valid data.

Return the résumé in exactly this JSON schema (same keys, same nesting):
{resume_json}"#;
