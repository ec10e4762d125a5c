//! Routing behaviour against a recording backend: which handlers run, in
//! what order, and what is left on disk afterwards.

mod common;

use common::{listing, touch, FakeBackend};
use convctl::{ConversionKey, ConversionProgressCallback, ConvertError, FormatRouter, Route};
use std::sync::{Arc, Mutex};

#[test]
fn direct_pair_runs_one_handler_and_leaves_no_temp_files() {
    let dir = tempfile::tempdir().unwrap();
    let input = touch(dir.path(), "report.docx");
    let output = dir.path().join("report.pdf");
    let backend = FakeBackend::new();

    let report = FormatRouter::new(&backend).convert(&input, &output).unwrap();

    assert_eq!(backend.ops(), vec!["office_to_pdf"]);
    assert!(matches!(report.route, Route::Direct { .. }));
    assert_eq!(report.steps_completed, 1);
    assert_eq!(report.outputs, vec![output.clone()]);
    assert_eq!(listing(dir.path()), vec!["report.docx", "report.pdf"]);
}

#[test]
fn pdf_to_docx_is_direct() {
    let dir = tempfile::tempdir().unwrap();
    let input = touch(dir.path(), "slide.pdf");
    let backend = FakeBackend::new();

    FormatRouter::new(&backend)
        .convert(&input, &dir.path().join("slide.docx"))
        .unwrap();

    assert_eq!(backend.ops(), vec!["pdf_to_docx"]);
}

#[test]
fn chain_writes_one_intermediate_and_removes_it() {
    let dir = tempfile::tempdir().unwrap();
    let input = touch(dir.path(), "notes.txt");
    let output = dir.path().join("notes.docx");
    let backend = FakeBackend::new();

    let report = FormatRouter::new(&backend).convert(&input, &output).unwrap();

    let calls = backend.calls();
    assert_eq!(backend.ops(), vec!["text_to_pdf", "pdf_to_docx"]);
    let intermediate = dir.path().join("notes.tmp_0.pdf");
    assert_eq!(calls[0].output, intermediate);
    assert_eq!(calls[1].inputs, vec![intermediate.clone()]);
    assert!(calls[1].inputs_existed, "second hop must see the intermediate");
    assert_eq!(calls[1].output, output);

    assert_eq!(report.route.intermediate(), Some("pdf"));
    assert_eq!(report.steps_completed, 2);
    assert!(!intermediate.exists());
    assert_eq!(listing(dir.path()), vec!["notes.docx", "notes.txt"]);
}

#[test]
fn failure_on_second_hop_still_removes_intermediate() {
    let dir = tempfile::tempdir().unwrap();
    let input = touch(dir.path(), "report.docx");
    let output = dir.path().join("report.jpg");
    let backend = FakeBackend::new().failing_on("pdf_to_images");

    let err = FormatRouter::new(&backend)
        .convert(&input, &output)
        .unwrap_err();

    match err {
        ConvertError::ToolFailed { stderr, .. } => {
            assert_eq!(stderr, "pdf_to_images failed on purpose")
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(backend.ops(), vec!["office_to_pdf", "pdf_to_images"]);
    assert_eq!(listing(dir.path()), vec!["report.docx"]);
}

#[test]
fn partial_first_hop_output_is_removed() {
    let dir = tempfile::tempdir().unwrap();
    let input = touch(dir.path(), "readme.md");
    let output = dir.path().join("readme.png");
    let backend = FakeBackend::new()
        .failing_on("markdown_to_pdf")
        .leaving_partial_output();

    assert!(FormatRouter::new(&backend).convert(&input, &output).is_err());

    assert_eq!(backend.ops(), vec!["markdown_to_pdf"]);
    assert_eq!(listing(dir.path()), vec!["readme.md"]);
}

#[test]
fn unsupported_pair_names_both_formats_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = touch(dir.path(), "photo.heic");
    let backend = FakeBackend::new();

    let err = FormatRouter::new(&backend)
        .convert(&input, &dir.path().join("photo.png"))
        .unwrap_err();

    assert_eq!(err.to_string(), "Unsupported conversion: heic -> png");
    assert!(backend.calls().is_empty());
    assert_eq!(listing(dir.path()), vec!["photo.heic"]);
}

#[test]
fn same_format_pair_round_trips_through_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let input = touch(dir.path(), "draft.docx");
    let output = dir.path().join("clean.docx");
    let backend = FakeBackend::new();

    let report = FormatRouter::new(&backend).convert(&input, &output).unwrap();

    assert_eq!(backend.ops(), vec!["office_to_pdf", "pdf_to_docx"]);
    assert_eq!(report.route.to_string(), "docx → pdf → docx");
    assert!(!dir.path().join("draft.tmp_0.pdf").exists());
    assert_eq!(listing(dir.path()), vec!["clean.docx", "draft.docx"]);
}

#[test]
fn matching_ignores_case_and_folds_jpeg() {
    let dir = tempfile::tempdir().unwrap();
    let input = touch(dir.path(), "PHOTO.JPEG");
    let backend = FakeBackend::new();

    FormatRouter::new(&backend)
        .convert(&input, &dir.path().join("photo.Png"))
        .unwrap();

    assert_eq!(backend.ops(), vec!["convert_image"]);
}

#[test]
fn missing_input_is_reported_before_any_handler() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FakeBackend::new();

    let err = FormatRouter::new(&backend)
        .convert(&dir.path().join("ghost.docx"), &dir.path().join("ghost.pdf"))
        .unwrap_err();

    assert!(matches!(err, ConvertError::FileNotFound { .. }), "{err}");
    assert!(backend.calls().is_empty());
    assert!(listing(dir.path()).is_empty());
}

#[test]
fn rasterised_chain_reports_every_page() {
    let dir = tempfile::tempdir().unwrap();
    let input = touch(dir.path(), "deck.docx");
    let backend = FakeBackend::new().with_pages(3);

    let report = FormatRouter::new(&backend)
        .convert(&input, &dir.path().join("deck.png"))
        .unwrap();

    assert_eq!(report.outputs.len(), 3);
    assert_eq!(
        listing(dir.path()),
        vec!["deck.docx", "deck_001.png", "deck_002.png", "deck_003.png"]
    );
}

#[test]
fn plan_does_not_touch_the_backend() {
    let backend = FakeBackend::new();
    let router = FormatRouter::new(&backend);

    let route = router
        .plan("in.bmp".as_ref(), "out.jpg".as_ref())
        .unwrap();

    assert_eq!(route.to_string(), "bmp → pdf → jpg");
    assert!(backend.calls().is_empty());
}

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<String>>,
}

impl ConversionProgressCallback for Recorder {
    fn on_conversion_start(&self, total_steps: usize) {
        self.events.lock().unwrap().push(format!("start {total_steps}"));
    }
    fn on_step_start(&self, step: usize, _total: usize, key: &ConversionKey) {
        self.events.lock().unwrap().push(format!("step {step} {key}"));
    }
    fn on_step_complete(&self, step: usize, _total: usize) {
        self.events.lock().unwrap().push(format!("done {step}"));
    }
    fn on_step_error(&self, step: usize, _total: usize, _error: &str) {
        self.events.lock().unwrap().push(format!("error {step}"));
    }
    fn on_conversion_complete(&self, total_steps: usize) {
        self.events.lock().unwrap().push(format!("complete {total_steps}"));
    }
}

#[test]
fn progress_follows_each_step() {
    let dir = tempfile::tempdir().unwrap();
    let input = touch(dir.path(), "a.webp");
    let backend = FakeBackend::new();
    let recorder = Arc::new(Recorder::default());

    FormatRouter::new(&backend)
        .with_progress(recorder.clone())
        .convert(&input, &dir.path().join("a.docx"))
        .unwrap();

    assert_eq!(
        *recorder.events.lock().unwrap(),
        vec![
            "start 2",
            "step 1 webp -> pdf",
            "done 1",
            "step 2 pdf -> docx",
            "done 2",
            "complete 2",
        ]
    );
}

#[test]
fn progress_reports_the_failing_step() {
    let dir = tempfile::tempdir().unwrap();
    let input = touch(dir.path(), "clip.mp4");
    let backend = FakeBackend::new().failing_on("transcode");
    let recorder = Arc::new(Recorder::default());

    let _ = FormatRouter::new(&backend)
        .with_progress(recorder.clone())
        .convert(&input, &dir.path().join("clip.mp3"));

    assert_eq!(
        *recorder.events.lock().unwrap(),
        vec!["start 1", "step 1 mp4 -> mp3", "error 1"]
    );
}
