//! Interactive session: one command per line, handled one at a time.
//!
//! Commands mirror the actions of a small desktop window:
//! `open <file>`, `clear`, `save <file.pdf>`, plus `show`, `task <name>`, `help` and `quit`.
//! Failures are reported and the loop continues; only I/O errors on the terminal
//! itself end the session early. Ctrl-C cancels a running analysis, and at the
//! prompt it ends the session.

use std::path::PathBuf;

use anyhow::Result;
use codescribe_core::analyse::AnalyseSettings;
use codescribe_core::config::Config;
use codescribe_core::contract::{ModelClient, Task};
use codescribe_core::session::Session;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{info, warn};

const HELP: &str = "Commands:
  open <file>      analyse a source file and show the result
  clear            clear the displayed result
  save <file.pdf>  save the displayed result as a PDF
  show             print the displayed result again
  task <name>      switch task: complexity, documentation, documentation-markdown
  help             show this help
  quit             leave the session (Ctrl-C at the prompt does the same)

Ctrl-C while an analysis is running cancels it and returns to the prompt.
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Open(PathBuf),
    Clear,
    Save(Option<PathBuf>),
    Show,
    Task(Task),
    Help,
    Quit,
}

impl ShellCommand {
    /// Parse one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (verb, arg) = match line.split_once(char::is_whitespace) {
            Some((verb, arg)) => (verb, unquote(arg.trim())),
            None => (line, ""),
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "open" if arg.is_empty() => return Err("open needs a file path".to_string()),
            "open" => ShellCommand::Open(PathBuf::from(arg)),
            "clear" => ShellCommand::Clear,
            "save" | "download" => {
                ShellCommand::Save((!arg.is_empty()).then(|| PathBuf::from(arg)))
            }
            "show" => ShellCommand::Show,
            "task" => ShellCommand::Task(arg.parse()?),
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" => ShellCommand::Quit,
            other => return Err(format!("unknown command '{other}'")),
        };
        Ok(Some(command))
    }
}

fn unquote(arg: &str) -> &str {
    arg.strip_prefix('"')
        .and_then(|a| a.strip_suffix('"'))
        .unwrap_or(arg)
}

/// A token cancelled on Ctrl-C, for as long as the returned guard lives.
pub fn interrupt_token() -> (CancellationToken, DropGuard) {
    let token = CancellationToken::new();
    let stop = CancellationToken::new();

    let on_interrupt = token.clone();
    let stopped = stop.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = stopped.cancelled() => {}
            res = tokio::signal::ctrl_c() => {
                if res.is_ok() {
                    warn!("Interrupt received, cancelling generation");
                    on_interrupt.cancel();
                }
            }
        }
    });

    (token, stop.drop_guard())
}

/// Forward every Ctrl-C to the returned receiver.
///
/// Once a Ctrl-C listener is installed the default SIGINT handling is gone for
/// the rest of the process, so the shell listens for the whole session instead
/// of only while a generation runs.
pub fn forward_interrupts() -> UnboundedReceiver<()> {
    let (tx, rx) = unbounded_channel();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if tx.send(()).is_err() {
                break;
            }
        }
    });
    rx
}

async fn say<W: AsyncWrite + Unpin>(out: &mut W, text: &str) -> std::io::Result<()> {
    out.write_all(text.as_bytes()).await?;
    if !text.ends_with('\n') {
        out.write_all(b"\n").await?;
    }
    out.flush().await
}

/// Run the session loop until `quit`, end of input or an interrupt at the
/// prompt, returning the final state. Each message on `interrupts` is one Ctrl-C.
pub async fn run_shell<C, R, W>(
    client: &C,
    config: &Config,
    settings: &AnalyseSettings,
    mut session: Session,
    input: R,
    mut output: W,
    mut interrupts: UnboundedReceiver<()>,
) -> Result<Session>
where
    C: ModelClient + ?Sized,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    say(
        &mut output,
        &format!("codescribe shell (task: {}). Type 'help' for commands.", session.task()),
    )
    .await?;

    let mut lines = input.lines();
    loop {
        output.write_all(b"> ").await?;
        output.flush().await?;
        let line = tokio::select! {
            line = lines.next_line() => line?,
            Some(()) = interrupts.recv() => {
                say(&mut output, "\nInterrupted.").await?;
                break;
            }
        };
        let Some(line) = line else {
            break;
        };

        let command = match ShellCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                say(&mut output, &format!("[ERROR] {e}; type 'help' for commands")).await?;
                continue;
            }
        };
        info!(?command, "Shell command received");

        match command {
            ShellCommand::Open(path) => {
                say(&mut output, &format!("Analysing {} ({})...", path.display(), session.task())).await?;
                let cancel = CancellationToken::new();
                let result = {
                    let open = session.open(client, &path, settings, &cancel);
                    tokio::pin!(open);
                    loop {
                        tokio::select! {
                            result = &mut open => break result,
                            Some(()) = interrupts.recv() => {
                                warn!("Interrupt received, cancelling generation");
                                cancel.cancel();
                            }
                        }
                    }
                };
                match result {
                    Ok(analysis) => {
                        say(&mut output, session.document().text()).await?;
                        say(
                            &mut output,
                            &format!("(Time taken: {:.2} seconds)", analysis.elapsed.as_secs_f64()),
                        )
                        .await?;
                    }
                    Err(e) => say(&mut output, &format!("[ERROR] {e}")).await?,
                }
            }
            ShellCommand::Clear => {
                session.clear();
                say(&mut output, "Results cleared.").await?;
            }
            ShellCommand::Save(path) => {
                match session.export(path.as_deref(), None, &config.export) {
                    Ok(report) => {
                        say(&mut output, &format!("Saved PDF to {}", report.path.display())).await?
                    }
                    Err(e) if e.is_warning() => say(&mut output, &format!("[WARNING] {e}")).await?,
                    Err(e) => say(&mut output, &format!("[ERROR] Failed to save PDF: {e}")).await?,
                }
            }
            ShellCommand::Show => {
                let document = session.document();
                let text = if document.is_empty() { "(nothing to show)" } else { document.text() };
                say(&mut output, text).await?;
            }
            ShellCommand::Task(task) => {
                session.set_task(task);
                say(&mut output, &format!("Task set to {task}.")).await?;
            }
            ShellCommand::Help => say(&mut output, HELP).await?,
            ShellCommand::Quit => break,
        }
    }

    info!("Shell session ended");
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_and_arguments() {
        assert_eq!(
            ShellCommand::parse("open  \"my file.py\" ").unwrap(),
            Some(ShellCommand::Open(PathBuf::from("my file.py")))
        );
        assert_eq!(ShellCommand::parse("CLEAR").unwrap(), Some(ShellCommand::Clear));
        assert_eq!(ShellCommand::parse("save").unwrap(), Some(ShellCommand::Save(None)));
        assert_eq!(
            ShellCommand::parse("task md").unwrap(),
            Some(ShellCommand::Task(Task::DocumentationMarkdown))
        );
        assert_eq!(ShellCommand::parse("   ").unwrap(), None);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(ShellCommand::parse("open").is_err());
        assert!(ShellCommand::parse("task haiku").is_err());
        assert!(ShellCommand::parse("frobnicate").is_err());
    }
}
