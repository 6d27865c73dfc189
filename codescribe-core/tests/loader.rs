use codescribe_core::loader::{load_source, LoadError};
use std::fs::File;
use std::io::Write;
use tempfile::tempdir;

#[test]
fn test_load_source_returns_file_content_verbatim() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sample.py");
    let content = "def área(r):\n\treturn 3.14 * r * r  # π r²\r\n";
    {
        let mut f = File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
    }

    let source = load_source(&path).expect("Loading a readable file should succeed");
    assert_eq!(source.content, content);
    assert_eq!(source.path, path);
}

#[test]
fn test_load_source_reports_missing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("does_not_exist.rs");

    let err = load_source(&path).unwrap_err();
    assert!(matches!(err, LoadError::Read { .. }), "got {err:?}");
    assert!(err.to_string().contains("Failed to read"));
}

#[test]
fn test_load_source_rejects_invalid_utf8() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("binary.bin");
    std::fs::write(&path, [0x66, 0x6f, 0xff, 0xfe, 0x6f]).unwrap();

    let err = load_source(&path).unwrap_err();
    assert!(matches!(err, LoadError::Decode { .. }), "got {err:?}");
}

#[test]
fn test_load_source_halts_on_empty_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.py");
    File::create(&path).unwrap();

    let err = load_source(&path).unwrap_err();
    assert!(matches!(err, LoadError::Empty { .. }), "got {err:?}");
}
