//! Error types for the onenote2md library.
//!
//! Three error types reflect three distinct failure modes:
//!
//! * [`ExportError`] — **Fatal**: the export cannot proceed (OneNote is not
//!   reachable, pandoc is missing, the converter produced a document of an
//!   unexpected shape, the disk refused a write). Returned as
//!   `Err(ExportError)` from the top-level `export*` functions.
//!
//! * [`HostError`] — a failure reported by the OneNote automation layer.
//!   The [`HostError::Automation`] variant is the only error the exporter
//!   tolerates on a per-page basis.
//!
//! * [`PageError`] — **Non-fatal**: a single page could not be published.
//!   Stored inside [`crate::output::PageResult`] so callers can see which
//!   pages were skipped while the rest of the notebook was exported.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the onenote2md library.
#[derive(Debug, Error)]
pub enum ExportError {
    // ── Host errors ───────────────────────────────────────────────────────
    /// The initial hierarchy query failed; nothing can be exported.
    #[error(
        "OneNote automation is unavailable: {detail}\n\
Hint: make sure OneNote is open first; run OneNote and the shell as Administrator."
    )]
    HostUnavailable { detail: String },

    /// A host call failed outside of per-page processing.
    #[error(transparent)]
    Host(#[from] HostError),

    /// The hierarchy XML could not be parsed.
    #[error("Malformed OneNote hierarchy: {detail}")]
    MalformedHierarchy { detail: String },

    // ── Converter errors ──────────────────────────────────────────────────
    /// The document converter executable could not be started.
    #[error("Converter '{program}' not found.\nInstall pandoc or pass --pandoc <PATH>.")]
    ConverterNotFound { program: String },

    /// The document converter exited with a failure status.
    #[error("Converter '{program}' failed ({status}) on '{input}': {stderr}")]
    ConverterFailed {
        program: String,
        input: PathBuf,
        status: String,
        stderr: String,
    },

    /// The converter output does not have the header lines the header
    /// rewrite relies on.
    #[error("Converter output has {lines} lines; header rewrite needs at least {expected}")]
    UnexpectedConverterOutput { lines: usize, expected: usize },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Image extraction needs the pdfium shared library. You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium.\n\
  • Place the library in the working directory.\n\
  • Install it on the system library path.\n"
    )]
    PdfiumBindingFailed(String),

    /// The intermediate PDF could not be opened.
    #[error("Failed to open PDF '{path}': {detail}")]
    PdfOpenFailed { path: PathBuf, detail: String },

    /// An embedded picture could not be decoded or written.
    #[error("Image extraction failed for '{path}': {detail}")]
    ImageExtractionFailed { path: PathBuf, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// A filesystem operation failed.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExportError {
    /// Wrap an `std::io::Error` together with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExportError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised by a [`crate::host::NotebookHost`].
#[derive(Debug, Clone, Error)]
pub enum HostError {
    /// The automation process could not be started at all.
    #[error("Failed to launch '{program}': {detail}")]
    Launch { program: String, detail: String },

    /// The automation call ran and reported a failure.
    #[error("OneNote {operation} failed: {detail}")]
    Automation { operation: String, detail: String },
}

/// A non-fatal error for a single page.
///
/// The export continues with the next page.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// Publishing the page through the automation interface failed.
    #[error("Page '{page}': automation failed: {detail}")]
    AutomationFailed { page: String, detail: String },
}
