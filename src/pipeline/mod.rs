//! Per-page pipeline stages.
//!
//! Each submodule implements exactly one step of turning a published
//! OneNote page into a Markdown file plus PNG assets.
//!
//! ## Data Flow
//!
//! ```text
//! .docx ──▶ pandoc ──▶ .md ─────────────┐
//!                                       ├──▶ postprocess ──▶ write
//! .pdf  ──▶ images ──▶ [a_000.png, …] ──┘
//! ```
//!
//! 1. [`pandoc`]      — run the external converter on the Word document
//! 2. [`images`]      — extract embedded pictures from the PDF via pdfium;
//!    runs in `spawn_blocking`
//! 3. [`postprocess`] — deterministic text-cleanup rules for pandoc's output
//! 4. [`write`]       — temp-file-then-rename output

pub mod images;
pub mod pandoc;
pub mod postprocess;
pub mod write;
