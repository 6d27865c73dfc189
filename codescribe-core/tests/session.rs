use codescribe_core::analyse::{AnalyseError, AnalyseSettings};
use codescribe_core::config::ExportConfig;
use codescribe_core::contract::{ExportFormat, MockModelClient, ModelResponse, Task};
use codescribe_core::export::ExportError;
use codescribe_core::ollama::ModelError;
use codescribe_core::session::Session;
use tempfile::tempdir;
use tokio_util::sync::CancellationToken;

fn answering(text: &'static str) -> MockModelClient {
    let mut client = MockModelClient::new();
    client
        .expect_generate()
        .returning(move |_| Ok(ModelResponse::with_response(text)));
    client
}

#[test]
fn test_clear_always_empties_document() {
    let mut session = Session::new(Task::Complexity);
    session.clear();
    assert_eq!(session.document().text(), "");

    session.show("previous result", Some(Task::Complexity), None);
    session.clear();
    assert_eq!(session.document().text(), "");
    assert!(session.document().task().is_none());
    assert!(session.document().source().is_none());
}

#[tokio::test]
async fn test_open_replaces_document_wholesale() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("main.rs");
    std::fs::write(&path, "fn main() {}\n").unwrap();

    let mut session = Session::new(Task::Documentation);
    session.show("stale text that must disappear", None, None);

    let client = answering("  Prints nothing.  ");
    session
        .open(&client, &path, &AnalyseSettings::default(), &CancellationToken::new())
        .await
        .expect("open should succeed");

    assert_eq!(session.document().text(), "Prints nothing.");
    assert_eq!(session.document().task(), Some(Task::Documentation));
    assert_eq!(session.document().source(), Some(path.as_path()));
}

#[tokio::test]
async fn test_failed_open_keeps_displayed_text() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("main.rs");
    std::fs::write(&path, "fn main() {}\n").unwrap();

    let mut session = Session::new(Task::Complexity);
    session.show("earlier analysis", Some(Task::Complexity), None);

    let mut client = MockModelClient::new();
    client.expect_generate().returning(|_| {
        Err(ModelError::Status {
            status: 503,
            message: "loading model".to_string(),
        })
    });

    let err = session
        .open(&client, &path, &AnalyseSettings::default(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, AnalyseError::Model(_)));
    assert_eq!(session.document().text(), "earlier analysis");
}

#[tokio::test]
async fn test_export_uses_task_format_and_preserves_text() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lib.rs");
    std::fs::write(&path, "pub fn f() {}\n").unwrap();

    let mut session = Session::new(Task::DocumentationMarkdown);
    let client = answering("# lib.rs\n\nDefines `f`.");
    session
        .open(&client, &path, &AnalyseSettings::default(), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(session.export_format(), ExportFormat::Markdown);

    // No renderer is installed under this name, so the markdown export fails...
    let config = ExportConfig {
        html_renderer: dir.path().join("missing-renderer"),
    };
    let output = dir.path().join("lib.pdf");
    let err = session.export(Some(output.as_path()), None, &config).unwrap_err();
    assert!(matches!(err, ExportError::RendererUnavailable { .. }));
    // ...and the displayed text survives the failure.
    assert_eq!(session.document().text(), "# lib.rs\n\nDefines `f`.");

    // Forcing the plain-text variant still works.
    session
        .export(Some(output.as_path()), Some(ExportFormat::PlainText), &config)
        .expect("plain text export should succeed");
    assert!(output.exists());
}

#[test]
fn test_export_of_empty_session_is_a_warning() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("nothing.pdf");
    let session = Session::new(Task::Documentation);

    let err = session
        .export(Some(output.as_path()), None, &ExportConfig::default())
        .unwrap_err();
    assert!(err.is_warning());
    assert!(!output.exists());
}
