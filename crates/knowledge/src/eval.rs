//! Evaluation harness.
//!
//! Cases are JSONL lines `{"q": "...", "ref": "..."}`. A `ref` of `REFUSE`
//! expects the refusal text; anything else is a case-insensitive regex the
//! answer must match.

use crate::rag::Pipeline;
use brandrag_core::{AppError, AppResult};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Reference value meaning "the pipeline should refuse".
pub const REFUSE: &str = "REFUSE";

/// One evaluation question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalCase {
    pub q: String,
    #[serde(rename = "ref")]
    pub reference: String,
}

/// What an answer must look like to pass.
#[derive(Debug, Clone)]
pub enum Expectation {
    Refuse,
    Pattern(Regex),
}

impl Expectation {
    pub fn parse(reference: &str) -> AppResult<Self> {
        if reference == REFUSE {
            return Ok(Self::Refuse);
        }
        RegexBuilder::new(reference)
            .case_insensitive(true)
            .build()
            .map(Self::Pattern)
            .map_err(|e| AppError::Config(format!("Invalid eval regex '{}': {}", reference, e)))
    }

    pub fn judge(&self, answer: &str, refusal_text: &str) -> bool {
        match self {
            Self::Refuse => answer
                .to_lowercase()
                .contains(&refusal_text.to_lowercase()),
            Self::Pattern(re) => re.is_match(answer),
        }
    }
}

/// Result of one case.
#[derive(Debug, Clone, Serialize)]
pub struct EvalOutcome {
    pub question: String,
    pub reference: String,
    pub answer: String,
    pub passed: bool,
    pub latency: f64,
    pub sources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of a run.
#[derive(Debug, Clone, Serialize)]
pub struct EvalReport {
    pub outcomes: Vec<EvalOutcome>,
    pub passed: usize,
    pub total: usize,
}

/// Parse JSONL cases, skipping blank lines.
pub fn parse_cases(contents: &str) -> AppResult<Vec<EvalCase>> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|e| {
                AppError::Serialization(format!("Invalid eval case on line {}: {}", i + 1, e))
            })
        })
        .collect()
}

/// Read cases from a JSONL file.
pub fn load_cases(path: &Path) -> AppResult<Vec<EvalCase>> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::Config(format!("Failed to read eval file {:?}: {}", path, e))
    })?;
    let cases = parse_cases(&contents)?;
    tracing::info!("Loaded {} eval cases from {:?}", cases.len(), path);
    Ok(cases)
}

/// Ask every case and judge the answers.
///
/// All references are compiled before the first question, so a bad regex
/// fails the run up front. A failing `ask` only fails its own case.
pub async fn run_eval(pipeline: &Pipeline, cases: &[EvalCase]) -> AppResult<EvalReport> {
    let expectations = cases
        .iter()
        .map(|case| Expectation::parse(&case.reference))
        .collect::<AppResult<Vec<_>>>()?;

    let refusal_text = &pipeline.config().refusal_text;
    let mut outcomes = Vec::with_capacity(cases.len());

    for (case, expectation) in cases.iter().zip(&expectations) {
        let outcome = match pipeline.ask(&case.q).await {
            Ok(result) => EvalOutcome {
                question: case.q.clone(),
                reference: case.reference.clone(),
                passed: expectation.judge(&result.answer, refusal_text),
                answer: result.answer,
                latency: result.latency,
                sources: result.sources,
                error: None,
            },
            Err(e) => {
                tracing::warn!("Eval question failed: {}: {}", case.q, e);
                EvalOutcome {
                    question: case.q.clone(),
                    reference: case.reference.clone(),
                    answer: String::new(),
                    passed: false,
                    latency: 0.0,
                    sources: Vec::new(),
                    error: Some(e.to_string()),
                }
            }
        };
        tracing::debug!("PASS: {} | {}", outcome.passed, outcome.question);
        outcomes.push(outcome);
    }

    let passed = outcomes.iter().filter(|o| o.passed).count();
    tracing::info!("Eval score: {}/{}", passed, outcomes.len());

    Ok(EvalReport {
        total: outcomes.len(),
        passed,
        outcomes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::TrigramProvider;
    use crate::rag::answer::tests::{trigram_index, ScriptedLlm};
    use brandrag_core::RagConfig;
    use brandrag_prompt::PromptTemplate;
    use std::sync::Arc;

    #[test]
    fn test_parse_cases_skips_blank_lines() {
        let contents = r#"{"q": "What is our tone?", "ref": "playful"}

{"q": "Who is the CEO?", "ref": "REFUSE"}
"#;
        let cases = parse_cases(contents).unwrap();
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[1].reference, "REFUSE");
    }

    #[test]
    fn test_parse_cases_reports_line_number() {
        let contents = "{\"q\": \"ok\", \"ref\": \"x\"}\n\n{\"q\": \"missing ref\"}\n";
        match parse_cases(contents).unwrap_err() {
            AppError::Serialization(msg) => assert!(msg.contains("line 3"), "{}", msg),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_refuse_expectation() {
        let exp = Expectation::parse("REFUSE").unwrap();
        let refusal = "Not enough info in the docs.";

        assert!(exp.judge("NOT ENOUGH INFO IN THE DOCS.", refusal));
        assert!(exp.judge("Sorry. Not enough info in the docs.", refusal));
        assert!(!exp.judge("The CEO is Ada.", refusal));
    }

    #[test]
    fn test_regex_expectation_is_case_insensitive() {
        let exp = Expectation::parse("playful|warm").unwrap();

        assert!(exp.judge("Our tone is PLAYFUL.", "n/a"));
        assert!(!exp.judge("Our tone is formal.", "n/a"));
    }

    #[test]
    fn test_invalid_regex_is_config_error() {
        let err = Expectation::parse("(unclosed").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[tokio::test]
    async fn test_run_eval_scores_cases() {
        let long_voice = "Our tone is playful and warm, like a friendly neighbour. ".repeat(5);
        let index = trigram_index(&[("voice.md", long_voice.as_str())]).await;
        let pipeline = Pipeline::from_parts(
            Arc::new(RagConfig::default()),
            Arc::new(index),
            Arc::new(TrigramProvider::default()),
            Arc::new(ScriptedLlm::replying("Playful and warm. [source: voice.md]")),
            PromptTemplate::grounded(),
        );

        let cases = vec![
            EvalCase {
                q: "What is our tone?".to_string(),
                reference: "playful".to_string(),
            },
            EvalCase {
                q: "Who is the CEO?".to_string(),
                reference: "REFUSE".to_string(),
            },
        ];

        let report = run_eval(&pipeline, &cases).await.unwrap();

        assert_eq!(report.total, 2);
        assert_eq!(report.passed, 1);
        assert!(report.outcomes[0].passed);
        assert!(!report.outcomes[1].passed);
        assert_eq!(report.outcomes[0].sources, vec!["voice.md".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_ask_counts_as_failed_case() {
        let long_voice = "Our tone is playful and warm, like a friendly neighbour. ".repeat(5);
        let index = trigram_index(&[("voice.md", long_voice.as_str())]).await;
        let pipeline = Pipeline::from_parts(
            Arc::new(RagConfig::default()),
            Arc::new(index),
            Arc::new(TrigramProvider::default()),
            Arc::new(ScriptedLlm::failing()),
            PromptTemplate::grounded(),
        );

        let cases = vec![EvalCase {
            q: "What is our tone?".to_string(),
            reference: "playful".to_string(),
        }];

        let report = run_eval(&pipeline, &cases).await.unwrap();
        assert_eq!(report.passed, 0);
        assert!(report.outcomes[0]
            .error
            .as_deref()
            .unwrap()
            .contains("connection refused"));
    }
}
