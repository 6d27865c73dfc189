//! High-level pipeline: load → prompt → generate → extract for one source file.
//!
//! This module provides the orchestration behind a single "analysis run". It:
//!   - Loads the file with [`crate::loader`]
//!   - Builds the task prompt with [`crate::prompt`]
//!   - Sends it through any [`ModelClient`], bounded by an optional timeout and a
//!     cancellation token
//!   - Extracts the completion with [`crate::extract`]
//!
//! # Outcomes
//! - `Ok(Analysis)` whose [`Completion`] is either the model's text or the task's
//!   sentinel when the envelope had no completion field.
//! - `Err(AnalyseError)` for load failures, model/service failures, timeouts and
//!   cancellation, each as its own variant.
//!
//! Fail-fast: a failing stage returns immediately and later stages never run.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::contract::{Completion, ModelClient, Task};
use crate::extract::extract_completion;
use crate::loader::{load_source, LoadError};
use crate::ollama::ModelError;
use crate::prompt::build_prompt;

#[derive(Debug, Error)]
pub enum AnalyseError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Model did not answer within {after:?}")]
    TimedOut { after: Duration },

    #[error("Analysis was cancelled")]
    Cancelled,
}

/// Knobs for a single run.
#[derive(Debug, Clone, Default)]
pub struct AnalyseSettings {
    /// Upper bound on the generation call; `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub task: Task,
    pub source: PathBuf,
    pub completion: Completion,
    pub elapsed: Duration,
}

/// Run the whole pipeline for `path`.
pub async fn analyse<C>(
    client: &C,
    path: &Path,
    task: Task,
    settings: &AnalyseSettings,
    cancel: &CancellationToken,
) -> Result<Analysis, AnalyseError>
where
    C: ModelClient + ?Sized,
{
    info!(path = %path.display(), task = %task, "[ANALYSE] Starting analysis");

    let source = load_source(path)?;
    let prompt = build_prompt(&source, task);

    let started = Instant::now();
    let generation = async {
        match settings.timeout {
            Some(limit) => match tokio::time::timeout(limit, client.generate(&prompt)).await {
                Ok(result) => result.map_err(AnalyseError::from),
                Err(_) => Err(AnalyseError::TimedOut { after: limit }),
            },
            None => client.generate(&prompt).await.map_err(AnalyseError::from),
        }
    };

    let response = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            warn!(path = %path.display(), "[ANALYSE] Cancelled while waiting for the model");
            return Err(AnalyseError::Cancelled);
        }
        result = generation => match result {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, path = %path.display(), "[ANALYSE][ERROR] Generation failed");
                return Err(e);
            }
        },
    };
    let elapsed = started.elapsed();

    let completion = extract_completion(&response, task);
    info!(
        path = %path.display(),
        task = %task,
        elapsed_secs = elapsed.as_secs_f64(),
        missing = completion.is_missing(),
        "[ANALYSE] Done"
    );

    Ok(Analysis {
        task,
        source: source.path,
        completion,
        elapsed,
    })
}
