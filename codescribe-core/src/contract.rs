//! # contract: shared types and the model client interface
//!
//! Plain data passed between pipeline stages, and the [`ModelClient`] trait that
//! abstracts the generation backend so the orchestrator can be driven by the real
//! Ollama client or by a mock.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`; `MockModelClient` is exported with the
//!   `test-export-mocks` feature (on by default) so dependent crates can use it too.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::ollama::ModelError;

/// What the model is asked to do with the source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Time and space complexity in exactly three lines.
    Complexity,
    /// Prose documentation, exported as plain text.
    Documentation,
    /// Documentation formatted as Markdown, exported through HTML.
    DocumentationMarkdown,
}

impl Task {
    pub fn as_str(&self) -> &'static str {
        match self {
            Task::Complexity => "complexity",
            Task::Documentation => "documentation",
            Task::DocumentationMarkdown => "documentation-markdown",
        }
    }

    /// Placeholder shown when the model's envelope carries no completion.
    pub fn sentinel(&self) -> &'static str {
        match self {
            Task::Complexity => "No complexity analysis found in the response.",
            Task::Documentation | Task::DocumentationMarkdown => {
                "No documentation found in the response."
            }
        }
    }

    /// The export variant that matches the shape of this task's output.
    pub fn export_format(&self) -> ExportFormat {
        match self {
            Task::Complexity | Task::Documentation => ExportFormat::PlainText,
            Task::DocumentationMarkdown => ExportFormat::Markdown,
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Task {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "complexity" => Ok(Task::Complexity),
            "documentation" | "docs" | "doc" => Ok(Task::Documentation),
            "documentation-markdown" | "markdown" | "md" => Ok(Task::DocumentationMarkdown),
            other => Err(format!(
                "unknown task '{other}' (expected complexity, documentation or documentation-markdown)"
            )),
        }
    }
}

/// How displayed text is turned into a PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Text laid out as-is in a fixed-width font.
    PlainText,
    /// Text interpreted as Markdown, converted to HTML and rendered externally.
    Markdown,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "plain" | "plaintext" => Ok(ExportFormat::PlainText),
            "markdown" | "md" | "html" => Ok(ExportFormat::Markdown),
            other => Err(format!("unknown export format '{other}' (expected text or markdown)")),
        }
    }
}

/// The raw content of a loaded file. Never modified after loading.
#[derive(Debug, Clone)]
pub struct SourceText {
    pub path: PathBuf,
    pub content: String,
}

/// A fully built prompt, ready to send.
#[derive(Debug, Clone)]
pub struct Prompt {
    pub task: Task,
    pub text: String,
}

/// The envelope returned by a generation call.
///
/// Only `response` is consumed; the remaining fields are logged when present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelResponse {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub done: Option<bool>,
    #[serde(default)]
    pub total_duration: Option<u64>,
    #[serde(default)]
    pub eval_count: Option<u64>,
}

impl ModelResponse {
    /// Envelope carrying just a completion, mostly useful for tests and mocks.
    pub fn with_response(text: impl Into<String>) -> Self {
        Self {
            response: Some(text.into()),
            ..Self::default()
        }
    }
}

/// What the extractor found in an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The model's answer, trimmed.
    Text(String),
    /// The field was absent; carries the task's sentinel string.
    Missing(&'static str),
}

impl Completion {
    pub fn as_str(&self) -> &str {
        match self {
            Completion::Text(text) => text,
            Completion::Missing(sentinel) => sentinel,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Completion::Missing(_))
    }
}

/// Trait for sending a prompt to a generation backend.
/// Implemented by [`crate::ollama::OllamaClient`] and by mocks in tests.
///
/// One call is one request: implementations must not retry.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send the prompt and wait for the complete (non-streamed) envelope.
    async fn generate(&self, prompt: &Prompt) -> Result<ModelResponse, ModelError>;
}
