//! Prompt types.

use serde::{Deserialize, Serialize};

/// System instruction sent with every grounded answer request.
pub const SYSTEM_INSTRUCTION: &str =
    "You are a careful, brand-safe assistant that never invents facts.";

/// Built-in grounded answer template.
pub const GROUNDED_TEMPLATE: &str = "You are a brand-safe marketing assistant.
Use ONLY the provided CONTEXT. If the answer is not present, reply exactly: {{refusal_text}}

Respond concisely in an on-brand tone. Cite sources as [source: <filename>].

CONTEXT:
{{context}}

QUESTION: {{question}}

ANSWER:";

/// A user-prompt template plus the system instruction that accompanies it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptTemplate {
    /// Template identifier, used in logs
    pub name: String,

    /// Handlebars template for the user message
    pub template: String,

    /// System instruction
    pub system: String,
}

impl PromptTemplate {
    /// The built-in grounded template.
    pub fn grounded() -> Self {
        Self {
            name: "grounded".to_string(),
            template: GROUNDED_TEMPLATE.to_string(),
            system: SYSTEM_INSTRUCTION.to_string(),
        }
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::grounded()
    }
}

/// Variables available to a template.
#[derive(Debug, Clone, Serialize)]
pub struct PromptVars<'a> {
    pub context: &'a str,
    pub question: &'a str,
    pub refusal_text: &'a str,
}

/// A fully built prompt ready for LLM execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuiltPrompt {
    /// System message
    pub system: String,

    /// User message
    pub user: String,
}
