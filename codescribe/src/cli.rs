//!
//! This module implements the CLI interface for codescribe: command parsing,
//! the async entrypoint and user-visible output.
//!
//! All pipeline logic (loading, prompting, model calls, export) lives in the
//! [`codescribe-core`] crate. This module is CLI glue and orchestration only.
//!
//! ## How To Use
//! - From the command line: `codescribe --help`.
//! - Programmatically or in integration tests: call [`run`] with a constructed [`Cli`].
//!
//! [`codescribe-core`]: ../../codescribe-core/
use crate::load_config::load_config;
use crate::shell::{forward_interrupts, interrupt_token, run_shell};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use codescribe_core::analyse::AnalyseSettings;
use codescribe_core::config::Config;
use codescribe_core::contract::{ExportFormat, ModelClient, Task};
use codescribe_core::ollama::OllamaClient;
use codescribe_core::session::Session;
use std::path::{Path, PathBuf};
use tokio::io::BufReader;

/// CLI for codescribe: ask a local model about a source file.
#[derive(Parser)]
#[clap(
    name = "codescribe",
    version,
    about = "Analyse code complexity or generate documentation with a locally hosted model"
)]
pub struct Cli {
    /// Path to a YAML config file; defaults and environment variables apply without it
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyse one source file and print the model's answer
    Analyze {
        /// Source file to send to the model
        file: PathBuf,
        /// complexity, documentation or documentation-markdown
        #[clap(long, short, default_value = "complexity")]
        task: Task,
        /// Also save the answer as a PDF at this path
        #[clap(long)]
        pdf: Option<PathBuf>,
        /// Export variant: text or markdown (defaults to the task's variant)
        #[clap(long)]
        format: Option<ExportFormat>,
    },
    /// Interactive session with open, clear and save commands
    Shell {
        /// Task used by `open` until changed with `task`
        #[clap(long, short, default_value = "documentation")]
        task: Task,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    let config = load_config(cli.config.as_deref())?;
    config.trace_loaded();
    let client = OllamaClient::new(&config.model).context("Failed to construct model client")?;
    tracing::info!(endpoint = client.endpoint(), model = client.model(), "Model client ready");
    let settings = AnalyseSettings {
        timeout: config.model.timeout(),
    };

    match cli.command {
        Commands::Analyze {
            file,
            task,
            pdf,
            format,
        } => {
            tracing::info!(command = "analyze", file = %file.display(), task = %task, "Starting analysis");
            analyze(&client, &config, &settings, &file, task, pdf.as_deref(), format).await
        }
        Commands::Shell { task } => {
            tracing::info!(command = "shell", task = %task, "Starting interactive session");
            let input = BufReader::new(tokio::io::stdin());
            run_shell(
                &client,
                &config,
                &settings,
                Session::new(task),
                input,
                tokio::io::stdout(),
                forward_interrupts(),
            )
            .await?;
            Ok(())
        }
    }
}

async fn analyze<C>(
    client: &C,
    config: &Config,
    settings: &AnalyseSettings,
    file: &Path,
    task: Task,
    pdf: Option<&Path>,
    format: Option<ExportFormat>,
) -> Result<()>
where
    C: ModelClient + ?Sized,
{
    let mut session = Session::new(task);
    let (cancel, _watch) = interrupt_token();

    eprintln!("Analysing {} ({task})...", file.display());
    let analysis = match session.open(client, file, settings, &cancel).await {
        Ok(analysis) => analysis,
        Err(e) => {
            tracing::error!(command = "analyze", error = %e, "Analysis failed");
            return Err(e).with_context(|| format!("Analysis of {} failed", file.display()));
        }
    };
    eprintln!("Time taken: {:.2} seconds", analysis.elapsed.as_secs_f64());
    println!("{}", session.document().text());

    let Some(pdf) = pdf else {
        return Ok(());
    };
    match session.export(Some(pdf), format, &config.export) {
        Ok(report) => {
            eprintln!("Saved PDF to {} ({} bytes)", report.path.display(), report.bytes);
            Ok(())
        }
        Err(e) => {
            if e.is_warning() {
                tracing::warn!(command = "analyze", error = %e, "PDF not saved");
            } else {
                tracing::error!(command = "analyze", error = %e, "PDF export failed");
            }
            Err(e).context("Failed to save PDF")
        }
    }
}
