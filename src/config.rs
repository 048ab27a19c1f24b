//! Configuration types for OneNote-to-Markdown export.
//!
//! All export behaviour is controlled through [`ExportConfig`], built via its
//! [`ExportConfigBuilder`]. The Markdown cleanup toggles live in a separate
//! [`PostProcessOptions`] value so the post-processor can be driven on its
//! own (for example by `onenote2md --clean`) without a full export config.

use crate::error::ExportError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Tag line written in place of the fourth line of every page by default.
pub const DEFAULT_CONVERSION_TAG: &str = "#onenote-import";

/// Pixel density used to turn inch dimensions into pixels.
pub const DEFAULT_PIXELS_PER_INCH: u32 = 96;

/// Pandoc output format: plain pipe tables only, so Obsidian can render them.
pub const DEFAULT_PANDOC_FORMAT: &str = "markdown-simple_tables-multiline_tables-grid_tables";

/// Configuration for a OneNote export run.
///
/// Built via [`ExportConfig::builder()`] or using [`ExportConfig::default()`].
///
/// # Example
/// ```rust
/// use onenote2md::ExportConfig;
///
/// let config = ExportConfig::builder()
///     .output_dir("/tmp/export")
///     .notebook("Work")
///     .keep_intermediate(true)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExportConfig {
    /// Root directory of the exported tree.
    ///
    /// Defaults to `~/OneDrive/Desktop/OneNoteExport` when the desktop is
    /// synced through OneDrive, otherwise `~/Desktop/OneNoteExport`.
    pub output_dir: PathBuf,

    /// Name of the per-section directory holding extracted PNGs. Default: `assets`.
    pub assets_dir: String,

    /// Export the `OneNote_RecycleBin` section groups too. Default: false.
    pub process_recycle_bin: bool,

    /// Keep the intermediate `.docx` and `.pdf` next to the Markdown. Default: false.
    pub keep_intermediate: bool,

    /// Which notebooks to export. Default: all of them.
    pub notebook: NotebookFilter,

    /// Markdown cleanup toggles.
    pub postprocess: PostProcessOptions,

    /// External document converter invocation.
    pub converter: ConverterConfig,

    /// Per-page progress events. Default: None.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            assets_dir: "assets".to_string(),
            process_recycle_bin: false,
            keep_intermediate: false,
            notebook: NotebookFilter::default(),
            postprocess: PostProcessOptions::default(),
            converter: ConverterConfig::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportConfig")
            .field("output_dir", &self.output_dir)
            .field("assets_dir", &self.assets_dir)
            .field("process_recycle_bin", &self.process_recycle_bin)
            .field("keep_intermediate", &self.keep_intermediate)
            .field("notebook", &self.notebook)
            .field("postprocess", &self.postprocess)
            .field("converter", &self.converter)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ExportProgressCallback>"),
            )
            .finish()
    }
}

impl ExportConfig {
    /// Create a new builder for `ExportConfig`.
    pub fn builder() -> ExportConfigBuilder {
        ExportConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Resolve the default export root from the user's home directory.
pub fn default_output_dir() -> PathBuf {
    let home = std::env::var_os("USERPROFILE")
        .or_else(|| std::env::var_os("HOME"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let onedrive_desktop = home.join("OneDrive").join("Desktop");
    if onedrive_desktop.exists() {
        onedrive_desktop.join("OneNoteExport")
    } else {
        home.join("Desktop").join("OneNoteExport")
    }
}

/// Builder for [`ExportConfig`].
#[derive(Debug)]
pub struct ExportConfigBuilder {
    config: ExportConfig,
}

impl ExportConfigBuilder {
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn assets_dir(mut self, name: impl Into<String>) -> Self {
        self.config.assets_dir = name.into();
        self
    }

    pub fn process_recycle_bin(mut self, v: bool) -> Self {
        self.config.process_recycle_bin = v;
        self
    }

    pub fn keep_intermediate(mut self, v: bool) -> Self {
        self.config.keep_intermediate = v;
        self
    }

    /// Restrict the export to one notebook; `"all"` (any case) exports everything.
    pub fn notebook(mut self, name: impl AsRef<str>) -> Self {
        self.config.notebook = NotebookFilter::parse(name.as_ref());
        self
    }

    pub fn postprocess(mut self, options: PostProcessOptions) -> Self {
        self.config.postprocess = options;
        self
    }

    pub fn pixels_per_inch(mut self, ppi: u32) -> Self {
        self.config.postprocess.pixels_per_inch = ppi;
        self
    }

    pub fn converter_program(mut self, program: impl Into<String>) -> Self {
        self.config.converter.program = program.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExportConfig, ExportError> {
        let c = &self.config;
        if c.postprocess.pixels_per_inch == 0 {
            return Err(ExportError::InvalidConfig(
                "Pixel density must be ≥ 1".into(),
            ));
        }
        if c.assets_dir.trim().is_empty() {
            return Err(ExportError::InvalidConfig(
                "Assets directory name must not be empty".into(),
            ));
        }
        if c.converter.program.trim().is_empty() {
            return Err(ExportError::InvalidConfig(
                "Converter program must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Post-processing options ──────────────────────────────────────────────

/// Toggles for the Markdown cleanup pipeline.
///
/// A disabled step is skipped entirely. Image reference renaming has no
/// toggle: with an empty image list it leaves the text untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostProcessOptions {
    /// Rewrite the title/date/time header block emitted by pandoc. Default: true.
    pub fix_header: bool,

    /// Tag line written by the header rewrite; `None` leaves that line as-is.
    /// Default: [`DEFAULT_CONVERSION_TAG`].
    pub conversion_tag: Option<String>,

    /// Turn pandoc's `{width=… height=…}` attributes into `![alt|WxH](…)`. Default: true.
    pub fix_image_dimensions: bool,

    /// Undo pandoc's `\"`, `\'` and `\...` escapes. Default: true.
    pub fix_backslashes: bool,

    /// Delete U+00A0 characters. Default: true.
    pub remove_nbsp: bool,

    /// Drop the blank lines pandoc puts between paragraphs. Default: true.
    pub collapse_blank_lines: bool,

    /// Convert CRLF to LF. Default: true.
    pub normalize_line_endings: bool,

    /// Pixels per inch for dimension conversion. Default: 96.
    pub pixels_per_inch: u32,
}

impl Default for PostProcessOptions {
    fn default() -> Self {
        Self {
            fix_header: true,
            conversion_tag: Some(DEFAULT_CONVERSION_TAG.to_string()),
            fix_image_dimensions: true,
            fix_backslashes: true,
            remove_nbsp: true,
            collapse_blank_lines: true,
            normalize_line_endings: true,
            pixels_per_inch: DEFAULT_PIXELS_PER_INCH,
        }
    }
}

impl PostProcessOptions {
    /// Options with every optional step switched off.
    ///
    /// Only image reference renaming still applies.
    pub fn none() -> Self {
        Self {
            fix_header: false,
            conversion_tag: None,
            fix_image_dimensions: false,
            fix_backslashes: false,
            remove_nbsp: false,
            collapse_blank_lines: false,
            normalize_line_endings: false,
            pixels_per_inch: DEFAULT_PIXELS_PER_INCH,
        }
    }
}

// ── Converter ────────────────────────────────────────────────────────────

/// How to invoke the external Word-to-Markdown converter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Executable name or path. Default: `pandoc`.
    pub program: String,

    /// Value passed to `-t`. Default: [`DEFAULT_PANDOC_FORMAT`].
    pub target_format: String,

    /// Extra arguments appended after the output path. Default: `--wrap=none`.
    pub extra_args: Vec<String>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            program: "pandoc".to_string(),
            target_format: DEFAULT_PANDOC_FORMAT.to_string(),
            extra_args: vec!["--wrap=none".to_string()],
        }
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Selects which top-level notebooks are exported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotebookFilter {
    /// Export every notebook (default).
    #[default]
    All,
    /// Export only the notebook with this exact display name.
    Named(String),
}

impl NotebookFilter {
    /// Parse a CLI value: `all` (case-insensitive) or a notebook name.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            NotebookFilter::All
        } else {
            NotebookFilter::Named(s.to_string())
        }
    }

    /// Whether a notebook with this display name should be exported.
    pub fn matches(&self, name: &str) -> bool {
        match self {
            NotebookFilter::All => true,
            NotebookFilter::Named(n) => n == name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = ExportConfig::default();
        assert_eq!(c.assets_dir, "assets");
        assert!(!c.process_recycle_bin);
        assert!(!c.keep_intermediate);
        assert_eq!(c.notebook, NotebookFilter::All);
        assert_eq!(c.postprocess.pixels_per_inch, 96);
        assert_eq!(c.converter.program, "pandoc");
        assert!(c.output_dir.ends_with("OneNoteExport"));
    }

    #[test]
    fn builder_rejects_zero_ppi() {
        let err = ExportConfig::builder().pixels_per_inch(0).build().unwrap_err();
        assert!(matches!(err, ExportError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_empty_assets_dir() {
        assert!(ExportConfig::builder().assets_dir("  ").build().is_err());
    }

    #[test]
    fn notebook_filter_parse() {
        assert_eq!(NotebookFilter::parse("all"), NotebookFilter::All);
        assert_eq!(NotebookFilter::parse("ALL"), NotebookFilter::All);
        assert_eq!(
            NotebookFilter::parse(" Work "),
            NotebookFilter::Named("Work".into())
        );
    }

    #[test]
    fn notebook_filter_matches_exact_name() {
        let f = NotebookFilter::Named("Work".into());
        assert!(f.matches("Work"));
        assert!(!f.matches("work"));
        assert!(NotebookFilter::All.matches("anything"));
    }

    #[test]
    fn none_options_disable_every_step() {
        let o = PostProcessOptions::none();
        assert!(!o.fix_header && !o.fix_image_dimensions && !o.fix_backslashes);
        assert!(!o.remove_nbsp && !o.collapse_blank_lines && !o.normalize_line_endings);
        assert!(o.conversion_tag.is_none());
    }
}
