// Résumé API: structure an uploaded PDF through the LLM, translate it, write cover letters.
// All LLM calls go through llm_client.

pub mod handlers;
pub mod models;
pub mod prompts;
pub mod service;
