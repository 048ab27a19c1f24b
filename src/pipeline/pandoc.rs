//! Word → Markdown conversion by running pandoc.
//!
//! pandoc is asked for Markdown without simple, multiline and grid tables so
//! every table comes out as a pipe table, and with `--wrap=none` so
//! paragraphs stay on one line. Embedded pictures are left as
//! `media/imageN.ext` references; [`super::postprocess`] renames them.

use crate::config::ConverterConfig;
use crate::error::ExportError;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

/// Convert `docx` into Markdown at `markdown`.
///
/// There is no timeout: a hung converter hangs the export.
pub async fn docx_to_markdown(
    docx: &Path,
    markdown: &Path,
    converter: &ConverterConfig,
) -> Result<(), ExportError> {
    let mut cmd = Command::new(&converter.program);
    cmd.arg(docx)
        .arg("-o")
        .arg(markdown)
        .arg("-t")
        .arg(&converter.target_format)
        .args(&converter.extra_args);
    debug!("Running {:?}", cmd.as_std());

    let output = cmd.output().await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ExportError::ConverterNotFound {
                program: converter.program.clone(),
            }
        } else {
            ExportError::io(&converter.program, e)
        }
    })?;

    if !output.status.success() {
        return Err(ExportError::ConverterFailed {
            program: converter.program.clone(),
            input: docx.to_path_buf(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(())
}
