//! Application state shared by the user-facing actions.
//!
//! A [`Session`] owns the single displayed document. Handlers receive it
//! explicitly; nothing else mutates the text.

use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::analyse::{analyse, Analysis, AnalyseError, AnalyseSettings};
use crate::config::ExportConfig;
use crate::contract::{ExportFormat, ModelClient, Task};
use crate::export::{export_pdf, ExportError, ExportReport};

/// The text currently shown, and where it came from.
#[derive(Debug, Clone, Default)]
pub struct RenderedDocument {
    text: String,
    task: Option<Task>,
    source: Option<PathBuf>,
}

impl RenderedDocument {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn task(&self) -> Option<Task> {
        self.task
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    task: Task,
    document: RenderedDocument,
}

impl Session {
    pub fn new(task: Task) -> Self {
        Self {
            task,
            document: RenderedDocument::default(),
        }
    }

    pub fn task(&self) -> Task {
        self.task
    }

    pub fn set_task(&mut self, task: Task) {
        info!(task = %task, "Session task changed");
        self.task = task;
    }

    pub fn document(&self) -> &RenderedDocument {
        &self.document
    }

    /// Replace the displayed text wholesale.
    pub fn show(&mut self, text: impl Into<String>, task: Option<Task>, source: Option<PathBuf>) {
        self.document = RenderedDocument {
            text: text.into(),
            task,
            source,
        };
    }

    pub fn clear(&mut self) {
        info!("Clearing displayed document");
        self.document = RenderedDocument::default();
    }

    /// Analyse `path` with the session's task and display the result.
    ///
    /// On any error the displayed document is left as it was.
    pub async fn open<C>(
        &mut self,
        client: &C,
        path: &Path,
        settings: &AnalyseSettings,
        cancel: &CancellationToken,
    ) -> Result<Analysis, AnalyseError>
    where
        C: ModelClient + ?Sized,
    {
        let analysis = analyse(client, path, self.task, settings, cancel).await?;
        self.show(
            analysis.completion.as_str(),
            Some(analysis.task),
            Some(analysis.source.clone()),
        );
        Ok(analysis)
    }

    /// Format matching the task that produced the displayed text.
    pub fn export_format(&self) -> ExportFormat {
        self.document.task.unwrap_or(self.task).export_format()
    }

    /// Export the displayed text. The document is never modified.
    pub fn export(
        &self,
        output: Option<&Path>,
        format: Option<ExportFormat>,
        config: &ExportConfig,
    ) -> Result<ExportReport, ExportError> {
        let format = format.unwrap_or_else(|| self.export_format());
        export_pdf(&self.document.text, format, output, config)
    }
}
