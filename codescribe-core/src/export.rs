//! # export: displayed text to PDF on disk
//!
//! Two variants, picked by [`ExportFormat`]:
//! - `PlainText`: laid out in-process by [`crate::code_to_pdf`].
//! - `Markdown`: converted to HTML by [`crate::markdown`], written to a temporary
//!   file and rendered by the external executable named in [`ExportConfig`].
//!
//! Every failure is an [`ExportError`]; [`ExportError::kind`] tells validation,
//! conversion and I/O failures apart. Exporting only reads the text it is given.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::code_to_pdf::{text_to_pdf_file, CodeToPdfError};
use crate::config::ExportConfig;
use crate::contract::ExportFormat;
use crate::markdown::markdown_to_html;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Nothing to export: the document is empty")]
    EmptyContent,

    #[error("No output path was given")]
    MissingOutputPath,

    #[error("PDF conversion failed: {0}")]
    Conversion(String),

    #[error("HTML renderer {renderer:?} could not be started: {source}")]
    RendererUnavailable {
        renderer: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("HTML renderer {renderer:?} failed ({status}): {stderr}")]
    RendererFailed {
        renderer: PathBuf,
        status: String,
        stderr: String,
    },

    #[error("I/O error while exporting: {0}")]
    Io(#[from] io::Error),
}

/// Coarse classification of an [`ExportError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportErrorKind {
    /// Bad input from the user; nothing was attempted.
    Validation,
    /// A converter or renderer failed.
    Conversion,
    /// Reading or writing files failed.
    Io,
}

impl ExportError {
    pub fn kind(&self) -> ExportErrorKind {
        match self {
            ExportError::EmptyContent | ExportError::MissingOutputPath => {
                ExportErrorKind::Validation
            }
            ExportError::Conversion(_)
            | ExportError::RendererUnavailable { .. }
            | ExportError::RendererFailed { .. } => ExportErrorKind::Conversion,
            ExportError::Io(_) => ExportErrorKind::Io,
        }
    }

    /// Validation failures are shown as warnings rather than errors.
    pub fn is_warning(&self) -> bool {
        self.kind() == ExportErrorKind::Validation
    }
}

impl From<CodeToPdfError> for ExportError {
    fn from(e: CodeToPdfError) -> Self {
        match e {
            CodeToPdfError::EmptyInput => ExportError::EmptyContent,
            CodeToPdfError::Io(e) => ExportError::Io(e),
            CodeToPdfError::Font(desc) => ExportError::Conversion(format!("font error: {desc}")),
        }
    }
}

/// What an export produced.
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub path: PathBuf,
    pub format: ExportFormat,
    pub bytes: u64,
}

/// Write `text` as a PDF at `output` using `format`.
pub fn export_pdf(
    text: &str,
    format: ExportFormat,
    output: Option<&Path>,
    config: &ExportConfig,
) -> Result<ExportReport, ExportError> {
    if text.trim().is_empty() {
        warn!("No content to export");
        return Err(ExportError::EmptyContent);
    }
    let output = match output {
        Some(path) if !path.as_os_str().is_empty() => path,
        _ => {
            warn!("Export requested without an output path");
            return Err(ExportError::MissingOutputPath);
        }
    };
    let title = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "codescribe".to_string());

    info!(path = %output.display(), ?format, "Exporting document to PDF");
    let result = match format {
        ExportFormat::PlainText => export_plain_text(text, &title, output),
        ExportFormat::Markdown => export_markdown(text, &title, output, &config.html_renderer),
    };

    match &result {
        Ok(bytes) => info!(path = %output.display(), size = *bytes, "Export completed"),
        Err(e) => error!(error = %e, path = %output.display(), "Export failed"),
    }
    Ok(ExportReport {
        path: output.to_path_buf(),
        format,
        bytes: result?,
    })
}

fn export_plain_text(text: &str, title: &str, output: &Path) -> Result<u64, ExportError> {
    Ok(text_to_pdf_file(text, title, output)?)
}

fn export_markdown(
    text: &str,
    title: &str,
    output: &Path,
    renderer: &Path,
) -> Result<u64, ExportError> {
    let html = markdown_to_html(text, title);

    let mut html_file = tempfile::Builder::new()
        .prefix("codescribe-")
        .suffix(".html")
        .tempfile()?;
    html_file.write_all(html.as_bytes())?;
    html_file.flush()?;
    debug!(path = %html_file.path().display(), bytes = html.len(), "Wrote intermediate HTML");

    render_html_to_pdf(renderer, html_file.path(), output)?;
    Ok(std::fs::metadata(output)?.len())
}

/// Run the external renderer as `<renderer> <html> <staging>` and move the
/// result to `output` once it is known to be good.
///
/// The staging file sits next to `output`, so a stale file already at `output`
/// is never mistaken for fresh output and is left intact when rendering fails.
pub fn render_html_to_pdf(renderer: &Path, html: &Path, output: &Path) -> Result<(), ExportError> {
    let dir = match output.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let staging = tempfile::Builder::new()
        .prefix(".codescribe-")
        .suffix(".pdf")
        .tempfile_in(dir)?;

    info!(renderer = %renderer.display(), "Invoking HTML renderer");
    let out = Command::new(renderer)
        .arg(html)
        .arg(staging.path())
        .output()
        .map_err(|e| {
            error!(error = ?e, renderer = %renderer.display(), "Failed to launch HTML renderer");
            ExportError::RendererUnavailable {
                renderer: renderer.to_path_buf(),
                source: e,
            }
        })?;

    if !out.status.success() {
        return Err(ExportError::RendererFailed {
            renderer: renderer.to_path_buf(),
            status: out.status.to_string(),
            stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
        });
    }
    let written = std::fs::metadata(staging.path()).map(|m| m.len()).unwrap_or(0);
    if written == 0 {
        return Err(ExportError::RendererFailed {
            renderer: renderer.to_path_buf(),
            status: out.status.to_string(),
            stderr: "renderer exited successfully but wrote no output".to_string(),
        });
    }
    debug!(bytes = written, "Renderer output complete");

    staging.persist(output).map_err(|e| ExportError::Io(e.error))?;
    Ok(())
}
