//! AI rewrite of one resume section through the LLM client.
//!
//! The call is advisory: it returns new text and never touches the workspace.

pub mod handlers;
pub mod prompts;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::enhance::prompts::{build_enhance_prompt, enhance_system_prompt};
use crate::llm_client::{LlmClient, LlmError};

/// The only enhancement failure text ever shown to a user.
pub const ENHANCE_FAILED_MESSAGE: &str = "Failed to enhance content. Please try again.";

#[derive(Debug, Error)]
pub enum EnhanceError {
    #[error("section text cannot be empty")]
    EmptyText,

    #[error("text enhancement is not configured")]
    Unavailable,

    #[error("enhancement call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("model returned an empty rewrite")]
    EmptyRewrite,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnhanceOutput {
    optimized_content: String,
}

/// Rewrites `text` (a section labelled e.g. "Professional Summary").
pub async fn enhance_section(
    llm: Option<&LlmClient>,
    text: &str,
    section_label: &str,
) -> Result<String, EnhanceError> {
    if text.trim().is_empty() {
        return Err(EnhanceError::EmptyText);
    }
    let llm = llm.ok_or(EnhanceError::Unavailable)?;

    let label = if section_label.trim().is_empty() {
        "Resume Section"
    } else {
        section_label.trim()
    };
    let output: EnhanceOutput = llm
        .call_json(&build_enhance_prompt(text, label), &enhance_system_prompt())
        .await?;

    let rewritten = output.optimized_content.trim();
    if rewritten.is_empty() {
        return Err(EnhanceError::EmptyRewrite);
    }
    info!(
        section = label,
        before = text.len(),
        after = rewritten.len(),
        "section enhanced"
    );
    Ok(rewritten.to_string())
}
