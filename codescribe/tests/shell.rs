use std::time::Duration;

use async_trait::async_trait;
use codescribe::shell::run_shell;
use codescribe_core::analyse::AnalyseSettings;
use codescribe_core::config::Config;
use codescribe_core::contract::{MockModelClient, ModelClient, ModelResponse, Prompt, Task};
use codescribe_core::ollama::ModelError;
use codescribe_core::session::Session;
use tempfile::tempdir;
use tokio::sync::mpsc::unbounded_channel;

struct SlowClient;

#[async_trait]
impl ModelClient for SlowClient {
    async fn generate(&self, _prompt: &Prompt) -> Result<ModelResponse, ModelError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(ModelResponse::with_response("too late"))
    }
}

async fn drive(client: &MockModelClient, session: Session, script: &str) -> (Session, String) {
    let mut output: Vec<u8> = Vec::new();
    let (_interrupt, interrupts) = unbounded_channel();
    let session = run_shell(
        client,
        &Config::default(),
        &AnalyseSettings::default(),
        session,
        script.as_bytes(),
        &mut output,
        interrupts,
    )
    .await
    .expect("shell should run to completion");
    (session, String::from_utf8(output).unwrap())
}

#[tokio::test]
async fn test_shell_open_show_clear_flow() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("fib.py");
    std::fs::write(&file, "def fib(n):\n    return n if n < 2 else fib(n-1) + fib(n-2)\n").unwrap();

    let mut client = MockModelClient::new();
    client
        .expect_generate()
        .withf(|prompt: &Prompt| prompt.task == Task::Complexity && prompt.text.contains("def fib"))
        .times(1)
        .returning(|_| {
            Ok(ModelResponse::with_response(
                "- Time Complexity: O(2^n)\n- Space Complexity: O(n)\n- Explanation: two calls per level.",
            ))
        });

    let script = format!("open {}\nshow\nclear\nshow\nquit\n", file.display());
    let (session, out) = drive(&client, Session::new(Task::Complexity), &script).await;

    assert!(out.contains("- Time Complexity: O(2^n)"), "got: {out}");
    assert!(out.contains("Time taken:"));
    assert!(out.contains("Results cleared."));
    assert!(out.contains("(nothing to show)"));
    assert_eq!(session.document().text(), "");
}

#[tokio::test]
async fn test_shell_reports_errors_and_keeps_going() {
    let dir = tempdir().unwrap();
    let mut client = MockModelClient::new();
    client.expect_generate().never();

    let script = format!(
        "bogus\nopen {}\nsave\ntask haiku\ntask markdown\n",
        dir.path().join("missing.py").display()
    );
    let (session, out) = drive(&client, Session::new(Task::Documentation), &script).await;

    assert!(out.contains("[ERROR] unknown command 'bogus'"), "got: {out}");
    assert!(out.contains("[ERROR] Failed to read"));
    // Saving an empty document is a warning, not an error.
    assert!(out.contains("[WARNING] Nothing to export"));
    assert!(out.contains("[ERROR] unknown task 'haiku'"));
    assert!(out.contains("Task set to documentation-markdown."));
    // End of input ends the session like `quit`.
    assert_eq!(session.task(), Task::DocumentationMarkdown);
}

#[tokio::test]
async fn test_shell_save_writes_pdf_of_displayed_text() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("lib.rs");
    std::fs::write(&file, "pub fn add(a: i32, b: i32) -> i32 { a + b }\n").unwrap();
    let pdf = dir.path().join("lib.pdf");

    let mut client = MockModelClient::new();
    client
        .expect_generate()
        .returning(|_| Ok(ModelResponse::with_response("Adds two integers.")));

    let script = format!("open {}\nsave {}\nquit\n", file.display(), pdf.display());
    let (session, out) = drive(&client, Session::new(Task::Documentation), &script).await;

    assert!(out.contains("Saved PDF to"), "got: {out}");
    let bytes = std::fs::read(&pdf).expect("PDF should exist");
    assert_eq!(&bytes[0..4], b"%PDF");
    assert_eq!(session.document().text(), "Adds two integers.");
}

#[tokio::test]
async fn test_shell_interrupt_at_prompt_ends_session() {
    let mut client = MockModelClient::new();
    client.expect_generate().never();
    // Keep the writer alive so input never reaches end of file.
    let (_keyboard, terminal) = tokio::io::duplex(64);
    let (interrupt, interrupts) = unbounded_channel();
    interrupt.send(()).unwrap();

    let mut output: Vec<u8> = Vec::new();
    let session = tokio::time::timeout(
        Duration::from_secs(5),
        run_shell(
            &client,
            &Config::default(),
            &AnalyseSettings::default(),
            Session::new(Task::Complexity),
            tokio::io::BufReader::new(terminal),
            &mut output,
            interrupts,
        ),
    )
    .await
    .expect("an interrupt at the prompt should end the session")
    .unwrap();

    assert_eq!(session.task(), Task::Complexity);
    assert!(String::from_utf8(output).unwrap().contains("Interrupted."));
}

#[tokio::test]
async fn test_shell_interrupt_cancels_running_analysis_and_continues() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("slow.py");
    std::fs::write(&file, "x = 1\n").unwrap();

    let (interrupt, interrupts) = unbounded_channel();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        let _ = interrupt.send(());
    });

    let mut session = Session::new(Task::Documentation);
    session.show("previous result", None, None);
    let script = format!("open {}\nshow\n", file.display());
    let mut output: Vec<u8> = Vec::new();
    let session = tokio::time::timeout(
        Duration::from_secs(10),
        run_shell(
            &SlowClient,
            &Config::default(),
            &AnalyseSettings::default(),
            session,
            script.as_bytes(),
            &mut output,
            interrupts,
        ),
    )
    .await
    .expect("the interrupt should cancel the analysis")
    .unwrap();

    let out = String::from_utf8(output).unwrap();
    assert!(out.contains("[ERROR] Analysis was cancelled"), "got: {out}");
    // The session keeps running and the displayed text is untouched.
    assert!(out.matches("previous result").count() == 1, "got: {out}");
    assert_eq!(session.document().text(), "previous result");
}
