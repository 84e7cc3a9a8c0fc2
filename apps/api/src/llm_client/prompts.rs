// Shared prompt constants.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Keeps résumé-derived output honest.
pub const NO_INVENTION_INSTRUCTION: &str = "\
    Use only facts present in the provided résumé data. \
    Do NOT invent employers, dates, degrees, metrics or skills. \
    Leave a field empty rather than guessing.";
