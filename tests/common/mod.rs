//! A recording [`Backend`] for integration tests.
//!
//! Every operation writes a small placeholder to each path it is supposed to
//! produce, so chained steps see a real intermediate on disk, and logs the
//! call. A single operation can be told to fail, optionally after leaving a
//! partial output behind the way a crashing tool would.

#![allow(dead_code)]

use convctl::format::page_image_path;
use convctl::{Backend, ConvertError};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub op: &'static str,
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    /// Whether every input existed when the call was made.
    pub inputs_existed: bool,
    pub detail: Option<String>,
}

#[derive(Default)]
pub struct FakeBackend {
    calls: RefCell<Vec<Call>>,
    fail_on: Option<&'static str>,
    leave_partial_output: bool,
    pages: usize,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            pages: 1,
            ..Self::default()
        }
    }

    /// Make `op` fail with a tool error.
    pub fn failing_on(mut self, op: &'static str) -> Self {
        self.fail_on = Some(op);
        self
    }

    /// Failing operations write their output before erroring.
    pub fn leaving_partial_output(mut self) -> Self {
        self.leave_partial_output = true;
        self
    }

    /// Page count reported by PDF rasterisation and split.
    pub fn with_pages(mut self, pages: usize) -> Self {
        self.pages = pages;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn ops(&self) -> Vec<&'static str> {
        self.calls.borrow().iter().map(|c| c.op).collect()
    }

    fn record(
        &self,
        op: &'static str,
        inputs: &[&Path],
        output: &Path,
        detail: Option<String>,
    ) -> Result<(), ConvertError> {
        self.calls.borrow_mut().push(Call {
            op,
            inputs: inputs.iter().map(|p| p.to_path_buf()).collect(),
            output: output.to_path_buf(),
            inputs_existed: inputs.iter().all(|p| p.exists()),
            detail,
        });

        if self.fail_on == Some(op) {
            if self.leave_partial_output {
                fs::write(output, b"partial").ok();
            }
            return Err(ConvertError::ToolFailed {
                tool: "Fake".to_string(),
                stderr: format!("{op} failed on purpose"),
            });
        }
        Ok(())
    }

    fn simple(&self, op: &'static str, input: &Path, output: &Path) -> Result<(), ConvertError> {
        self.record(op, &[input], output, None)?;
        fs::write(output, op.as_bytes()).map_err(|e| ConvertError::OutputWriteFailed {
            path: output.to_path_buf(),
            source: e,
        })
    }
}

impl Backend for FakeBackend {
    fn office_to_pdf(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        self.simple("office_to_pdf", input, output)
    }

    fn pdf_to_docx(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        self.simple("pdf_to_docx", input, output)
    }

    fn markdown_to_pdf(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        self.simple("markdown_to_pdf", input, output)
    }

    fn text_to_pdf(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        self.simple("text_to_pdf", input, output)
    }

    fn image_to_pdf(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        self.simple("image_to_pdf", input, output)
    }

    fn convert_image(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        self.simple("convert_image", input, output)
    }

    fn pdf_to_images(&self, input: &Path, output: &Path) -> Result<Vec<PathBuf>, ConvertError> {
        self.record("pdf_to_images", &[input], output, None)?;
        let pages: Vec<PathBuf> = (1..=self.pages)
            .map(|page| page_image_path(output, page))
            .collect();
        for page in &pages {
            fs::write(page, b"png").map_err(|e| ConvertError::OutputWriteFailed {
                path: page.clone(),
                source: e,
            })?;
        }
        Ok(pages)
    }

    fn transcode(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        self.simple("transcode", input, output)
    }

    fn merge_pdfs(&self, inputs: &[PathBuf], output: &Path) -> Result<(), ConvertError> {
        let refs: Vec<&Path> = inputs.iter().map(PathBuf::as_path).collect();
        self.record("merge_pdfs", &refs, output, None)?;
        fs::write(output, b"merged").ok();
        Ok(())
    }

    fn split_pdf(&self, input: &Path, outdir: &Path) -> Result<usize, ConvertError> {
        self.record("split_pdf", &[input], outdir, None)?;
        Ok(self.pages)
    }

    fn compress_pdf(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        self.simple("compress_pdf", input, output)
    }

    fn rotate_pdf(&self, input: &Path, output: &Path, degrees: u16) -> Result<(), ConvertError> {
        self.record("rotate_pdf", &[input], output, Some(degrees.to_string()))
    }

    fn watermark_pdf(&self, input: &Path, output: &Path, text: &str) -> Result<(), ConvertError> {
        self.record("watermark_pdf", &[input], output, Some(text.to_string()))
    }
}

/// Create `name` with some bytes inside `dir`.
pub fn touch(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"input").expect("write fixture");
    path
}

/// Sorted file names in `dir`.
pub fn listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read dir")
        .map(|e| e.expect("dir entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
