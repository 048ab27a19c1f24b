//! Export entry points: walk the OneNote hierarchy and convert every page.
//!
//! The run has two phases. First the hierarchy is collected depth-first, in
//! the order OneNote lists it, applying the notebook filter and skipping
//! recycle bins. Then each page is processed, one after the other:
//!
//! ```text
//! publish .docx ─▶ pandoc ─▶ publish .pdf ─▶ extract images ─▶ clean .md
//! ```
//!
//! An automation failure while publishing a page skips that page and is
//! recorded in its [`PageResult`]. Every other error ends the run.

use crate::config::ExportConfig;
use crate::error::{ExportError, HostError, PageError};
use crate::hierarchy::{parse_hierarchy, HierarchyEntry, HierarchyNode, NodeKind};
use crate::host::{HierarchyScope, NotebookHost, PublishFormat};
use crate::output::{ExportOutput, ExportStats, PageResult};
use crate::pipeline::{images, pandoc, postprocess};
use crate::sanitize::safe_name;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Export every selected notebook below `config.output_dir`.
///
/// # Returns
/// `Ok(ExportOutput)` when the run completes, even if some pages were
/// skipped (check `output.stats.pages_failed`).
///
/// # Errors
/// Returns `Err(ExportError)` for fatal errors:
/// - OneNote cannot be reached or returns malformed hierarchy XML
/// - pandoc is missing or fails
/// - pandoc output is too short for the header rewrite
/// - pdfium cannot be loaded, or a file cannot be written
pub async fn export(
    host: Arc<dyn NotebookHost>,
    config: &ExportConfig,
) -> Result<ExportOutput, ExportError> {
    let start = Instant::now();
    info!("Starting export into {}", config.output_dir.display());

    // ── Step 1: Collect hierarchy ────────────────────────────────────────
    let entries = collect_hierarchy(&host, config).await?;
    let page_count = entries
        .iter()
        .filter(|e| e.node.kind == NodeKind::Page)
        .count();
    info!("Found {} pages", page_count);

    if let Some(ref cb) = config.progress_callback {
        cb.on_export_start(page_count);
    }

    // ── Step 2: Export pages ─────────────────────────────────────────────
    let mut stats = ExportStats::default();
    let mut pages = Vec::with_capacity(page_count);

    for entry in &entries {
        match entry.node.kind {
            NodeKind::Notebook => {
                stats.notebooks += 1;
                if let Some(ref cb) = config.progress_callback {
                    cb.on_notebook_start(&entry.node.name);
                }
            }
            NodeKind::SectionGroup => stats.section_groups += 1,
            NodeKind::Section => stats.sections += 1,
            NodeKind::Page => {
                let result = export_page(&host, entry, config).await?;
                if result.error.is_some() {
                    stats.pages_failed += 1;
                } else {
                    stats.pages_exported += 1;
                    stats.images_extracted += result.images.len();
                }
                pages.push(result);
            }
        }
    }

    stats.total_duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Export complete: {} pages exported, {} failed, {}ms",
        stats.pages_exported, stats.pages_failed, stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_export_complete(stats.pages_exported, stats.pages_failed);
    }

    Ok(ExportOutput { pages, stats })
}

/// Synchronous wrapper around [`export`].
///
/// Creates a temporary tokio runtime internally.
pub fn export_sync(
    host: Arc<dyn NotebookHost>,
    config: &ExportConfig,
) -> Result<ExportOutput, ExportError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ExportError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(export(host, config))
}

/// List the notebooks, section groups, sections and pages an export with
/// `config` would visit, without publishing anything.
pub async fn list_hierarchy(
    host: Arc<dyn NotebookHost>,
    config: &ExportConfig,
) -> Result<Vec<HierarchyEntry>, ExportError> {
    collect_hierarchy(&host, config).await
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Run a host call on the blocking pool.
async fn on_host<T, F>(
    host: &Arc<dyn NotebookHost>,
    call: F,
) -> Result<Result<T, HostError>, ExportError>
where
    T: Send + 'static,
    F: FnOnce(&dyn NotebookHost) -> Result<T, HostError> + Send + 'static,
{
    let host = Arc::clone(host);
    tokio::task::spawn_blocking(move || call(host.as_ref()))
        .await
        .map_err(|e| ExportError::Internal(format!("Host task panicked: {}", e)))
}

async fn children_of(
    host: &Arc<dyn NotebookHost>,
    id: &str,
    scope: HierarchyScope,
) -> Result<Vec<HierarchyNode>, ExportError> {
    let id = id.to_string();
    let xml = on_host(host, move |h| h.get_hierarchy(&id, scope)).await??;
    parse_hierarchy(&xml)
}

/// Depth-first, document-order walk of the selected notebooks.
async fn collect_hierarchy(
    host: &Arc<dyn NotebookHost>,
    config: &ExportConfig,
) -> Result<Vec<HierarchyEntry>, ExportError> {
    let xml = on_host(host, |h| h.get_hierarchy("", HierarchyScope::Notebooks))
        .await?
        .map_err(|e| ExportError::HostUnavailable {
            detail: e.to_string(),
        })?;

    let notebooks: Vec<HierarchyNode> = parse_hierarchy(&xml)?
        .into_iter()
        .filter(|n| n.kind == NodeKind::Notebook)
        .filter(|n| {
            let keep = config.notebook.matches(&n.name);
            if !keep {
                debug!("Skipping notebook '{}' (filtered)", n.name);
            }
            keep
        })
        .collect();

    let mut stack: Vec<HierarchyEntry> = notebooks
        .into_iter()
        .enumerate()
        .rev()
        .map(|(index, node)| HierarchyEntry {
            node,
            depth: 0,
            path: PathBuf::new(),
            index,
        })
        .collect();

    let mut entries = Vec::new();
    while let Some(entry) = stack.pop() {
        if entry.node.is_recycle_bin() && !config.process_recycle_bin {
            info!("Skipping recycle bin in {}", entry.path.display());
            continue;
        }

        if let Some(scope) = entry.node.kind.child_scope() {
            let children = children_of(host, &entry.node.id, scope).await?;
            let dir = entry.path.join(safe_name(&entry.node.name));
            stack.extend(
                children
                    .into_iter()
                    .enumerate()
                    .rev()
                    .map(|(index, node)| HierarchyEntry {
                        node,
                        depth: entry.depth + 1,
                        path: dir.clone(),
                        index,
                    }),
            );
        }

        entries.push(entry);
    }

    Ok(entries)
}

/// Export a single page; automation failures become a [`PageError`].
async fn export_page(
    host: &Arc<dyn NotebookHost>,
    entry: &HierarchyEntry,
    config: &ExportConfig,
) -> Result<PageResult, ExportError> {
    let section_dir = config.output_dir.join(&entry.path);
    std::fs::create_dir_all(&section_dir).map_err(|e| ExportError::io(&section_dir, e))?;

    let base = safe_name(&format!("{:03} {}", entry.index, entry.node.name));
    let docx = section_dir.join(format!("{base}.{}", PublishFormat::Word.extension()));
    let pdf = section_dir.join(format!("{base}.{}", PublishFormat::Pdf.extension()));
    let markdown = section_dir.join(format!("{base}.md"));
    let assets = section_dir.join(&config.assets_dir);
    let label = entry.path.join(format!("{base}.md")).display().to_string();

    // OneNote refuses to publish over an existing file.
    remove_if_exists(&docx)?;
    remove_if_exists(&pdf)?;

    if let Some(ref cb) = config.progress_callback {
        cb.on_page_start(&label);
    }

    let outcome = process_page(host, &entry.node.id, &docx, &pdf, &markdown, &assets, &base, config)
        .await;

    if !config.keep_intermediate {
        remove_if_exists(&docx)?;
        remove_if_exists(&pdf)?;
    }

    let mut result = PageResult {
        section_path: entry.path.clone(),
        title: entry.node.name.clone(),
        index: entry.index,
        markdown_path: markdown,
        images: Vec::new(),
        error: None,
    };

    match outcome {
        Ok(images) => {
            if let Some(ref cb) = config.progress_callback {
                cb.on_page_complete(&label, images.len());
            }
            result.images = images;
        }
        Err(ExportError::Host(HostError::Automation { operation, detail })) => {
            warn!("Page failed: {} ({} failed: {})", label, operation, detail);
            let error = PageError::AutomationFailed {
                page: label.clone(),
                detail: format!("{operation}: {detail}"),
            };
            if let Some(ref cb) = config.progress_callback {
                cb.on_page_error(&label, &error.to_string());
            }
            result.error = Some(error);
        }
        Err(e) => return Err(e),
    }

    Ok(result)
}

#[allow(clippy::too_many_arguments)]
async fn process_page(
    host: &Arc<dyn NotebookHost>,
    page_id: &str,
    docx: &Path,
    pdf: &Path,
    markdown: &Path,
    assets: &Path,
    base: &str,
    config: &ExportConfig,
) -> Result<Vec<String>, ExportError> {
    publish(host, page_id, docx, PublishFormat::Word).await?;

    info!("Generating markdown: {}", markdown.display());
    pandoc::docx_to_markdown(docx, markdown, &config.converter).await?;

    publish(host, page_id, pdf, PublishFormat::Pdf).await?;
    let image_names = images::extract_pdf_images(pdf, assets, base).await?;

    postprocess::clean_markdown_file(markdown, &image_names, &config.postprocess)?;
    Ok(image_names)
}

async fn publish(
    host: &Arc<dyn NotebookHost>,
    page_id: &str,
    target: &Path,
    format: PublishFormat,
) -> Result<(), ExportError> {
    let id = page_id.to_string();
    let path = target.to_path_buf();
    debug!("Publishing {} as {:?}", id, format);
    on_host(host, move |h| h.publish(&id, &path, format)).await??;
    Ok(())
}

fn remove_if_exists(path: &Path) -> Result<(), ExportError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ExportError::io(path, e)),
    }
}
