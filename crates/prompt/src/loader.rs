//! Loader for user-supplied prompt templates.

use crate::builder::render_template;
use crate::types::{PromptTemplate, PromptVars, SYSTEM_INSTRUCTION};
use brandrag_core::{AppError, AppResult};
use std::path::Path;

/// Placeholders every template must render.
const REQUIRED_PLACEHOLDERS: [&str; 2] = ["{{context}}", "{{question}}"];

/// Load a template override from a plain-text Handlebars file.
///
/// The file replaces the user message only; the system instruction stays fixed.
pub fn load_template(path: &Path) -> AppResult<PromptTemplate> {
    tracing::debug!("Loading prompt template from: {:?}", path);

    if !path.exists() {
        return Err(AppError::Prompt(format!(
            "Prompt template not found: {:?}",
            path
        )));
    }

    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::Prompt(format!("Failed to read prompt template {:?}: {}", path, e))
    })?;

    validate_template(&contents, path)?;

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("custom")
        .to_string();

    tracing::info!("Loaded prompt template: {}", name);

    Ok(PromptTemplate {
        name,
        template: contents,
        system: SYSTEM_INSTRUCTION.to_string(),
    })
}

fn validate_template(contents: &str, path: &Path) -> AppResult<()> {
    if contents.trim().is_empty() {
        return Err(AppError::Prompt(format!(
            "Prompt template {:?} is empty",
            path
        )));
    }

    for placeholder in REQUIRED_PLACEHOLDERS {
        if !contents.contains(placeholder) {
            return Err(AppError::Prompt(format!(
                "Prompt template {:?} must contain {}",
                path, placeholder
            )));
        }
    }

    // Fail at load time rather than on the first question
    let probe = PromptVars {
        context: "",
        question: "",
        refusal_text: "",
    };
    render_template(contents, &probe)?;

    Ok(())
}
