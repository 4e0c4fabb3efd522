//! Prompt builder for rendering templates and injecting context.

use crate::types::{BuiltPrompt, PromptTemplate, PromptVars};
use brandrag_core::{AppError, AppResult};
use handlebars::Handlebars;
use serde::Serialize;

/// Build a prompt from a template and the retrieval variables.
///
/// The context is injected verbatim; no HTML escaping is applied.
///
/// # Example
/// ```
/// use brandrag_prompt::{build_prompt, PromptTemplate, PromptVars};
///
/// let vars = PromptVars {
///     context: "Our tone is playful.",
///     question: "What is our tone?",
///     refusal_text: "Not enough info in the docs.",
/// };
/// let built = build_prompt(&PromptTemplate::grounded(), &vars).unwrap();
/// assert!(built.user.contains("QUESTION: What is our tone?"));
/// ```
pub fn build_prompt(template: &PromptTemplate, vars: &PromptVars<'_>) -> AppResult<BuiltPrompt> {
    tracing::debug!(
        "Building prompt '{}' with {} context chars",
        template.name,
        vars.context.chars().count()
    );

    let user = render_template(&template.template, vars)?;

    Ok(BuiltPrompt {
        system: template.system.clone(),
        user,
    })
}

/// Render a Handlebars template with variables.
pub(crate) fn render_template<T: Serialize>(template: &str, variables: &T) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Disable HTML escaping for plain text
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    let rendered = handlebars
        .render("prompt", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

    Ok(rendered)
}
