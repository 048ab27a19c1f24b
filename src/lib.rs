//! # onenote2md
//!
//! Export Microsoft OneNote notebooks to Markdown for note-taking tools such
//! as Obsidian, with embedded pictures extracted as PNG assets.
//!
//! ## Pipeline Overview
//!
//! ```text
//! OneNote
//!  │
//!  ├─ 1. Walk     notebooks → section groups → sections → pages
//!  ├─ 2. Publish  each page as .docx and .pdf through the automation API
//!  ├─ 3. Convert  .docx → Markdown with pandoc
//!  ├─ 4. Images   embedded pictures from the .pdf → assets/*.png (pdfium)
//!  ├─ 5. Polish   header, image links, sizes, escapes, blank lines
//!  └─ 6. Output   one .md per page, written atomically
//! ```
//!
//! The output tree mirrors the hierarchy:
//!
//! ```text
//! OneNoteExport/
//! └── Work/
//!     └── Inbox/
//!         ├── 000 Todo.md
//!         ├── 001 Meeting notes.md
//!         └── assets/
//!             └── 001_Meeting_notes_000.png
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use onenote2md::{export, ExportConfig, PowerShellHost};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExportConfig::builder().notebook("Work").build()?;
//!     let output = export(Arc::new(PowerShellHost::default()), &config).await?;
//!     eprintln!("{} pages exported", output.stats.pages_exported);
//!     Ok(())
//! }
//! ```
//!
//! The Markdown cleanup is usable on its own:
//!
//! ```rust
//! use onenote2md::{clean_markdown, PostProcessOptions};
//!
//! let raw = "Title\n\nMonday\n\n09:00\n\nBody\n";
//! let md = clean_markdown(raw, &[], &PostProcessOptions::default()).unwrap();
//! assert!(md.starts_with("# Title\n"));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `onenote2md` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod export;
pub mod hierarchy;
pub mod host;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod sanitize;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConverterConfig, ExportConfig, ExportConfigBuilder, NotebookFilter, PostProcessOptions};
pub use error::{ExportError, HostError, PageError};
pub use export::{export, export_sync, list_hierarchy};
pub use hierarchy::{HierarchyEntry, HierarchyNode, NodeKind};
pub use host::{HierarchyScope, NotebookHost, PowerShellHost, PublishFormat};
pub use output::{ExportOutput, ExportStats, PageResult};
pub use pipeline::postprocess::{clean_markdown, clean_markdown_file};
pub use progress::{ExportProgressCallback, NoopProgressCallback, ProgressCallback};
pub use sanitize::{replace_whitespace, safe_name};
