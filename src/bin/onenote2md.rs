//! CLI binary for onenote2md.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExportConfig`, drives OneNote through PowerShell and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use onenote2md::sanitize::truncate_middle;
use onenote2md::{
    clean_markdown_file, export, list_hierarchy, ExportConfig, ExportProgressCallback,
    NodeKind, NotebookHost, PostProcessOptions, PowerShellHost, ProgressCallback,
};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

/// Width of the page path shown next to the bar.
const STATUS_WIDTH: usize = 48;

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a spinner while OneNote lists its notebooks,
/// then a bar over the page count with one log line per page.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Reading OneNote hierarchy…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:32.green/238}] {pos:>3}/{len} pages  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Exporting");
        self.bar.reset_eta();
    }
}

impl ExportProgressCallback for CliProgressCallback {
    fn on_export_start(&self, pages: usize) {
        self.activate_bar(pages);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Exporting {pages} pages…"))
        ));
    }

    fn on_notebook_start(&self, name: &str) {
        self.bar
            .println(format!("{} {}", cyan("▸"), bold(&format!("Notebook {name}"))));
    }

    fn on_page_start(&self, page: &str) {
        self.bar.set_message(truncate_middle(page, STATUS_WIDTH));
    }

    fn on_page_complete(&self, page: &str, images: usize) {
        self.bar.println(format!(
            "  {} {}  {}",
            green("✓"),
            page,
            dim(&format!("{images} images")),
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page: &str, error: &str) {
        self.bar.println(format!(
            "  {} {}  {}",
            red("✗"),
            page,
            red(&truncate_middle(error, 80)),
        ));
        self.bar.inc(1);
    }

    fn on_export_complete(&self, exported: usize, failed: usize) {
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} pages exported successfully",
                green("✔"),
                bold(&exported.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} pages exported  ({} failed)",
                if exported == 0 { red("✘") } else { cyan("⚠") },
                bold(&exported.to_string()),
                exported + failed,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Export every notebook to ~/Desktop/OneNoteExport
  onenote2md

  # Export a single notebook somewhere else
  onenote2md --notebook Work --output-dir D:\Notes

  # Show what would be exported
  onenote2md --list

  # Re-run the Markdown cleanup on an existing file
  onenote2md --clean "000 Todo.md" --images 000_Todo_000.png

  # Keep the .docx/.pdf intermediates for debugging
  onenote2md --keep-intermediate -v

REQUIREMENTS:
  OneNote (desktop) must be installed and open.
  pandoc must be on PATH (or pass --pandoc).
  libpdfium must be next to the binary, on the library path, or named
  by PDFIUM_LIB_PATH.

ENVIRONMENT VARIABLES:
  ONENOTE2MD_*     Every flag can be set this way, e.g. ONENOTE2MD_NOTEBOOK
  PDFIUM_LIB_PATH  Path to the libpdfium shared library file
  RUST_LOG         Overrides the console log filter
"#;

/// Export OneNote notebooks to Markdown.
#[derive(Parser, Debug)]
#[command(
    name = "onenote2md",
    version,
    about = "Export OneNote notebooks to Markdown with PNG image assets",
    long_about = "Walk every OneNote notebook, publish each page as Word and PDF, convert \
the Word file with pandoc, extract the page's pictures with pdfium, and clean the Markdown \
for Obsidian-style note-taking tools.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Root directory of the exported tree.
    #[arg(short, long, env = "ONENOTE2MD_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Name of the per-section image folder.
    #[arg(long, env = "ONENOTE2MD_ASSETS_DIR", default_value = "assets")]
    assets_dir: String,

    /// Notebook to export, or "all".
    #[arg(short, long, env = "ONENOTE2MD_NOTEBOOK", default_value = "all")]
    notebook: String,

    /// Also export pages in the OneNote recycle bin.
    #[arg(long, env = "ONENOTE2MD_INCLUDE_RECYCLE_BIN")]
    include_recycle_bin: bool,

    /// Keep the intermediate .docx and .pdf files.
    #[arg(long, env = "ONENOTE2MD_KEEP_INTERMEDIATE")]
    keep_intermediate: bool,

    /// Leave pandoc's title/date/time header alone.
    #[arg(long, env = "ONENOTE2MD_NO_FIX_HEADER")]
    no_fix_header: bool,

    /// Tag line written into the header.
    #[arg(long, env = "ONENOTE2MD_CONVERSION_TAG", default_value = "#onenote-import")]
    conversion_tag: String,

    /// Do not write the tag line.
    #[arg(long, env = "ONENOTE2MD_NO_CONVERSION_TAG")]
    no_conversion_tag: bool,

    /// Keep pandoc's {width=… height=…} image attributes.
    #[arg(long, env = "ONENOTE2MD_NO_FIX_DIMENSIONS")]
    no_fix_dimensions: bool,

    /// Keep pandoc's backslash escapes.
    #[arg(long, env = "ONENOTE2MD_NO_FIX_BACKSLASHES")]
    no_fix_backslashes: bool,

    /// Keep non-breaking spaces.
    #[arg(long, env = "ONENOTE2MD_KEEP_NBSP")]
    keep_nbsp: bool,

    /// Pixels per inch for image sizes.
    #[arg(long, env = "ONENOTE2MD_PPI", default_value_t = 96,
          value_parser = clap::value_parser!(u32).range(1..))]
    ppi: u32,

    /// pandoc executable.
    #[arg(long, env = "ONENOTE2MD_PANDOC", default_value = "pandoc")]
    pandoc: String,

    /// PowerShell executable used to reach OneNote.
    #[arg(long, env = "ONENOTE2MD_POWERSHELL", default_value = "powershell")]
    powershell: String,

    /// Append logs to this file.
    #[arg(long, env = "ONENOTE2MD_LOG_FILE", default_value = "onenote_to_markdown.log")]
    log_file: PathBuf,

    /// Do not write a log file.
    #[arg(long, env = "ONENOTE2MD_NO_LOG_FILE")]
    no_log_file: bool,

    /// Print the hierarchy that would be exported, then exit.
    #[arg(long, conflicts_with = "clean")]
    list: bool,

    /// Clean an existing Markdown file in place, then exit.
    #[arg(long, value_name = "FILE")]
    clean: Option<PathBuf>,

    /// Image file names for --clean, in placeholder order.
    #[arg(long, value_delimiter = ',', requires = "clean")]
    images: Vec<String>,

    /// Print the result as JSON (ExportOutput, or the hierarchy with --list).
    #[arg(long, env = "ONENOTE2MD_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "ONENOTE2MD_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "ONENOTE2MD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "ONENOTE2MD_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let show_progress =
        !cli.quiet && !cli.no_progress && !cli.json && !cli.list && cli.clean.is_none();
    init_logging(&cli, show_progress)?;

    let options = postprocess_options(&cli);

    // ── Clean mode ───────────────────────────────────────────────────────
    if let Some(ref path) = cli.clean {
        clean_markdown_file(path, &cli.images, &options)
            .with_context(|| format!("Failed to clean {}", path.display()))?;
        if !cli.quiet {
            eprintln!("{} cleaned {}", green("✔"), bold(&path.display().to_string()));
        }
        return Ok(());
    }

    let host: Arc<dyn NotebookHost> = Arc::new(PowerShellHost::new(cli.powershell.clone()));

    // ── List mode ────────────────────────────────────────────────────────
    if cli.list {
        let config = build_config(&cli, options, None)?;
        let entries = list_hierarchy(host, &config)
            .await
            .context("Failed to read the OneNote hierarchy")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&entries).context("Failed to serialise hierarchy")?
            );
        } else {
            for entry in &entries {
                let indent = "  ".repeat(entry.depth);
                let label = match entry.node.kind {
                    NodeKind::Page => dim(&format!("{:03}", entry.index)),
                    kind => cyan(&kind.to_string()),
                };
                println!("{indent}{label} {}", entry.node.name);
            }
        }
        return Ok(());
    }

    // ── Export ───────────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn ExportProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, options, progress_cb)?;
    let output = export(host, &config).await.context("Export failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if !cli.quiet {
        let stats = &output.stats;
        if !show_progress {
            eprintln!(
                "Exported {}/{} pages in {}ms",
                stats.pages_exported,
                stats.pages_exported + stats.pages_failed,
                stats.total_duration_ms
            );
            for page in output.failed_pages() {
                if let Some(ref e) = page.error {
                    eprintln!("  {} {}", red("✗"), e);
                }
            }
        }
        eprintln!(
            "   {} notebooks  /  {} sections  /  {} images  →  {}",
            dim(&stats.notebooks.to_string()),
            dim(&stats.sections.to_string()),
            dim(&stats.images_extracted.to_string()),
            bold(&config.output_dir.display().to_string()),
        );
    }

    Ok(())
}

/// Console logs go to stderr; the log file gets every INFO (or DEBUG with
/// `-v`) record without colours.
fn init_logging(cli: &Cli, show_progress: bool) -> Result<()> {
    let console_level = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };
    let console = fmt::layer().with_writer(std::io::stderr).with_filter(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(console_level)),
    );

    let file = if cli.no_log_file {
        None
    } else {
        let log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&cli.log_file)
            .with_context(|| format!("Failed to open log file {}", cli.log_file.display()))?;
        let level = if cli.verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        };
        Some(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(log))
                .with_filter(level),
        )
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .init();
    Ok(())
}

/// Map the cleanup flags to `PostProcessOptions`.
fn postprocess_options(cli: &Cli) -> PostProcessOptions {
    PostProcessOptions {
        fix_header: !cli.no_fix_header,
        conversion_tag: if cli.no_conversion_tag {
            None
        } else {
            Some(cli.conversion_tag.clone())
        },
        fix_image_dimensions: !cli.no_fix_dimensions,
        fix_backslashes: !cli.no_fix_backslashes,
        remove_nbsp: !cli.keep_nbsp,
        pixels_per_inch: cli.ppi,
        ..PostProcessOptions::default()
    }
}

/// Map CLI args to `ExportConfig`.
fn build_config(
    cli: &Cli,
    options: PostProcessOptions,
    progress: Option<ProgressCallback>,
) -> Result<ExportConfig> {
    let mut builder = ExportConfig::builder()
        .assets_dir(cli.assets_dir.clone())
        .notebook(&cli.notebook)
        .process_recycle_bin(cli.include_recycle_bin)
        .keep_intermediate(cli.keep_intermediate)
        .postprocess(options)
        .converter_program(cli.pandoc.clone());

    if let Some(ref dir) = cli.output_dir {
        builder = builder.output_dir(dir.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
