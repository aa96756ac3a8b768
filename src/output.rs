//! Rendering the estimate to its output file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use log::{debug, info};

use crate::builder::{DocumentBuilder, PdfBuilder};
use crate::error::{EstimateError, Result};
use crate::estimate::{self, DEFAULT_OUTPUT_DIR, OUTPUT_FILE_NAME};

/// Returns the fixed default destination of the estimate.
pub fn default_output_path() -> PathBuf {
    Path::new(DEFAULT_OUTPUT_DIR).join(OUTPUT_FILE_NAME)
}

/// Returns today's date in local time.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// What to generate and where to put it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationOptions {
    output: PathBuf,
    issued: NaiveDate,
    #[cfg(feature = "bookmarks")]
    bookmarks: bool,
}

impl GenerationOptions {
    /// Targets `output`, issued today.
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            issued: today(),
            #[cfg(feature = "bookmarks")]
            bookmarks: false,
        }
    }

    /// Overrides the issue date printed in the metadata table.
    pub fn with_issue_date(mut self, issued: NaiveDate) -> Self {
        self.issued = issued;
        self
    }

    /// Adds one PDF outline entry per section.
    #[cfg(feature = "bookmarks")]
    pub fn with_bookmarks(mut self, bookmarks: bool) -> Self {
        self.bookmarks = bookmarks;
        self
    }

    /// Returns the destination path.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Returns the issue date.
    pub fn issued(&self) -> NaiveDate {
        self.issued
    }
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self::new(default_output_path())
    }
}

/// Outcome of a successful run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationReport {
    /// File that was written.
    pub path: PathBuf,
    /// Size of the written file.
    pub bytes: usize,
    /// Number of pages.
    pub pages: usize,
}

impl GenerationReport {
    /// The message printed after the file was saved.
    pub fn completion_message(&self) -> String {
        let name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string());
        format!("견적서 생성 완료: {name}")
    }
}

/// Fails when the directory that should receive `path` does not exist.
///
/// The directory is never created, so a mistyped destination cannot leave a file somewhere
/// unexpected.
pub fn ensure_output_directory(path: &Path) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => return Ok(()),
    };

    if parent.is_dir() {
        Ok(())
    } else {
        Err(EstimateError::io(
            path,
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("output directory {} does not exist", parent.display()),
            ),
        ))
    }
}

/// Writes the PDF bytes to `path`, replacing any existing file.
pub fn write_pdf(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).map_err(|err| EstimateError::io(path, err))?;
    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// Assembles, renders and saves the estimate.
pub fn build_and_save(options: &GenerationOptions) -> Result<GenerationReport> {
    build_and_save_with(options, DocumentBuilder::new())
}

/// Like [`build_and_save`], with a custom page setup (for example preloaded fonts).
pub fn build_and_save_with(
    options: &GenerationOptions,
    page_setup: DocumentBuilder,
) -> Result<GenerationReport> {
    ensure_output_directory(&options.output)?;

    let document = estimate::build_estimate(options.issued)?;
    info!(
        "Assembled {} blocks for {}",
        document.blocks().len(),
        estimate::format_issue_date(options.issued)
    );

    let renderer = PdfBuilder::new(&document).with_document_builder(page_setup);

    #[cfg(feature = "bookmarks")]
    let rendered = if options.bookmarks {
        renderer.render_with_bookmarks()?
    } else {
        renderer.render()?
    };
    #[cfg(not(feature = "bookmarks"))]
    let rendered = renderer.render()?;

    write_pdf(&options.output, &rendered.bytes)?;

    Ok(GenerationReport {
        path: options.output.clone(),
        bytes: rendered.bytes.len(),
        pages: rendered.pages,
    })
}
