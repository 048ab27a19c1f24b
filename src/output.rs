//! Result types of an export run.

use crate::error::PageError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything an export run produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportOutput {
    /// One entry per page attempted, in traversal order.
    pub pages: Vec<PageResult>,
    pub stats: ExportStats,
}

impl ExportOutput {
    /// Pages that were skipped because of an automation failure.
    pub fn failed_pages(&self) -> impl Iterator<Item = &PageResult> {
        self.pages.iter().filter(|p| p.error.is_some())
    }
}

/// Outcome of one page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    /// Sanitised directory path of the section, relative to the export root.
    pub section_path: PathBuf,
    /// Page title as shown in OneNote.
    pub title: String,
    /// Position of the page in its section.
    pub index: usize,
    /// Absolute path of the Markdown file (written only on success).
    pub markdown_path: PathBuf,
    /// Extracted asset file names, in placeholder order.
    pub images: Vec<String>,
    /// Set when the page was skipped.
    pub error: Option<PageError>,
}

/// Counters for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportStats {
    pub notebooks: usize,
    pub section_groups: usize,
    pub sections: usize,
    pub pages_exported: usize,
    pub pages_failed: usize,
    pub images_extracted: usize,
    pub total_duration_ms: u64,
}
