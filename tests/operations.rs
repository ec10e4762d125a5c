//! PDF operation validation in front of the backend.

mod common;

use common::{touch, FakeBackend};
use convctl::{ConvertError, PdfOperations};
use std::path::PathBuf;

#[test]
fn merge_needs_two_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let only = touch(dir.path(), "a.pdf");
    let backend = FakeBackend::new();

    let err = PdfOperations::new(&backend)
        .merge(&[only], &dir.path().join("out.pdf"))
        .unwrap_err();

    assert!(matches!(err, ConvertError::NotEnoughInputs { count: 1 }), "{err}");
    assert!(backend.calls().is_empty());
}

#[test]
fn merge_rejects_missing_inputs_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let a = touch(dir.path(), "a.pdf");
    let missing = dir.path().join("missing.pdf");
    let output = dir.path().join("out.pdf");
    let backend = FakeBackend::new();

    let err = PdfOperations::new(&backend)
        .merge(&[a, missing.clone()], &output)
        .unwrap_err();

    match err {
        ConvertError::FileNotFound { path } => assert_eq!(path, missing),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!output.exists());
}

#[test]
fn merge_keeps_argument_order() {
    let dir = tempfile::tempdir().unwrap();
    let inputs: Vec<PathBuf> = ["c.pdf", "a.pdf", "b.pdf"]
        .iter()
        .map(|n| touch(dir.path(), n))
        .collect();
    let backend = FakeBackend::new();

    PdfOperations::new(&backend)
        .merge(&inputs, &dir.path().join("all.pdf"))
        .unwrap();

    assert_eq!(backend.calls()[0].inputs, inputs);
}

#[test]
fn rotate_passes_normalised_degrees() {
    let dir = tempfile::tempdir().unwrap();
    let input = touch(dir.path(), "scan.pdf");
    let backend = FakeBackend::new();
    let ops = PdfOperations::new(&backend);

    for (requested, applied) in [(-90, 270), (450, 90), (45, 0), (180, 180)] {
        assert_eq!(
            ops.rotate(&input, &dir.path().join("out.pdf"), requested).unwrap(),
            applied
        );
    }

    let details: Vec<_> = backend
        .calls()
        .into_iter()
        .map(|c| c.detail.unwrap())
        .collect();
    assert_eq!(details, vec!["270", "90", "0", "180"]);
}

#[test]
fn watermark_rejects_blank_text() {
    let dir = tempfile::tempdir().unwrap();
    let input = touch(dir.path(), "doc.pdf");
    let backend = FakeBackend::new();

    let err = PdfOperations::new(&backend)
        .watermark(&input, &dir.path().join("out.pdf"), "   ")
        .unwrap_err();

    assert!(matches!(err, ConvertError::InvalidInput(_)), "{err}");
    assert!(backend.calls().is_empty());
}

#[test]
fn watermark_forwards_text() {
    let dir = tempfile::tempdir().unwrap();
    let input = touch(dir.path(), "doc.pdf");
    let backend = FakeBackend::new();

    PdfOperations::new(&backend)
        .watermark(&input, &dir.path().join("out.pdf"), "CONFIDENTIAL")
        .unwrap();

    assert_eq!(backend.calls()[0].detail.as_deref(), Some("CONFIDENTIAL"));
}

#[test]
fn split_returns_page_count() {
    let dir = tempfile::tempdir().unwrap();
    let input = touch(dir.path(), "book.pdf");
    let backend = FakeBackend::new().with_pages(7);

    let pages = PdfOperations::new(&backend)
        .split(&input, &dir.path().join("pages"))
        .unwrap();

    assert_eq!(pages, 7);
    assert_eq!(backend.calls()[0].output, dir.path().join("pages"));
}

#[test]
fn compress_checks_input_first() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FakeBackend::new();

    let err = PdfOperations::new(&backend)
        .compress(&dir.path().join("nope.pdf"), &dir.path().join("out.pdf"))
        .unwrap_err();

    assert!(matches!(err, ConvertError::FileNotFound { .. }));
    assert!(backend.calls().is_empty());
}

#[test]
fn backend_errors_surface_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let input = touch(dir.path(), "doc.pdf");
    let backend = FakeBackend::new().failing_on("compress_pdf");

    let err = PdfOperations::new(&backend)
        .compress(&input, &dir.path().join("out.pdf"))
        .unwrap_err();

    assert_eq!(err.to_string(), "Fake conversion failed: compress_pdf failed on purpose");
}
