//! The OneNote automation seam.
//!
//! Everything the exporter needs from OneNote goes through two calls of the
//! `OneNote.Application` COM object: `GetHierarchy` and `Publish`. They are
//! modelled by the [`NotebookHost`] trait so the traversal and page pipeline
//! can be exercised with a scripted host in tests.
//!
//! [`PowerShellHost`] is the production implementation. It drives the COM
//! object through a `powershell` subprocess, which keeps the crate free of
//! platform-specific COM bindings. Both calls are blocking; the exporter runs
//! them in `spawn_blocking`.

use crate::error::HostError;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// OneNote `HierarchyScope` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum HierarchyScope {
    /// The node itself.
    Self_ = 0,
    /// Direct children only.
    Children = 1,
    /// All notebooks.
    Notebooks = 2,
    /// Sections and section groups.
    Sections = 3,
    /// Down to pages.
    Pages = 4,
}

/// OneNote `PublishFormat` values used by the exporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PublishFormat {
    Pdf = 3,
    Word = 5,
}

impl PublishFormat {
    /// File extension of the published document.
    pub fn extension(self) -> &'static str {
        match self {
            PublishFormat::Pdf => "pdf",
            PublishFormat::Word => "docx",
        }
    }
}

/// Access to a running OneNote instance.
///
/// Implementations must be `Send + Sync`: the exporter moves calls onto the
/// blocking thread pool.
pub trait NotebookHost: Send + Sync {
    /// Return the hierarchy XML below `start_id` (empty for the root).
    fn get_hierarchy(&self, start_id: &str, scope: HierarchyScope) -> Result<String, HostError>;

    /// Publish the page `page_id` to `target` in `format`.
    fn publish(&self, page_id: &str, target: &Path, format: PublishFormat)
        -> Result<(), HostError>;
}

/// Drives `OneNote.Application` through PowerShell.
#[derive(Debug, Clone)]
pub struct PowerShellHost {
    program: String,
}

impl Default for PowerShellHost {
    fn default() -> Self {
        Self::new("powershell")
    }
}

impl PowerShellHost {
    /// Use `program` (e.g. `powershell` or `pwsh`) to run the scripts.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, operation: &str, script: &str) -> Result<String, HostError> {
        debug!("{}: running {} ({} byte script)", operation, self.program, script.len());
        let output = Command::new(&self.program)
            .args(["-NoProfile", "-NonInteractive", "-Command", script])
            .output()
            .map_err(|e| HostError::Launch {
                program: self.program.clone(),
                detail: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(HostError::Automation {
                operation: operation.to_string(),
                detail: if stderr.is_empty() {
                    format!("exit status {}", output.status)
                } else {
                    stderr
                },
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl NotebookHost for PowerShellHost {
    fn get_hierarchy(&self, start_id: &str, scope: HierarchyScope) -> Result<String, HostError> {
        let script = hierarchy_script(start_id, scope);
        let xml = self.run("GetHierarchy", &script)?;
        Ok(xml.trim_start_matches('\u{FEFF}').trim().to_string())
    }

    fn publish(
        &self,
        page_id: &str,
        target: &Path,
        format: PublishFormat,
    ) -> Result<(), HostError> {
        let script = publish_script(page_id, &target.to_string_lossy(), format);
        self.run("Publish", &script).map(|_| ())
    }
}

// ── Script construction ──────────────────────────────────────────────────

const SCRIPT_PRELUDE: &str = "$ErrorActionPreference = 'Stop'\n\
[Console]::OutputEncoding = [System.Text.Encoding]::UTF8\n\
$app = New-Object -ComObject OneNote.Application\n";

/// Quote `s` as a PowerShell single-quoted string literal.
pub fn ps_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn hierarchy_script(start_id: &str, scope: HierarchyScope) -> String {
    format!(
        "{SCRIPT_PRELUDE}[string]$xml = ''\n$app.GetHierarchy({}, {}, [ref]$xml)\n$xml\n",
        ps_quote(start_id),
        scope as u8
    )
}

fn publish_script(page_id: &str, target: &str, format: PublishFormat) -> String {
    format!(
        "{SCRIPT_PRELUDE}$app.Publish({}, {}, {}, '')\n",
        ps_quote(page_id),
        ps_quote(target),
        format as u8
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_escapes_single_quotes() {
        assert_eq!(ps_quote("plain"), "'plain'");
        assert_eq!(ps_quote("it's"), "'it''s'");
        assert_eq!(ps_quote(""), "''");
    }

    #[test]
    fn hierarchy_script_uses_scope_value() {
        let s = hierarchy_script("{ID}", HierarchyScope::Pages);
        assert!(s.contains("$app.GetHierarchy('{ID}', 4, [ref]$xml)"), "got: {s}");
        assert!(s.starts_with("$ErrorActionPreference = 'Stop'"));
    }

    #[test]
    fn publish_script_quotes_path() {
        let s = publish_script("p1", r"C:\Out\Bob's page.docx", PublishFormat::Word);
        assert!(s.contains(r"$app.Publish('p1', 'C:\Out\Bob''s page.docx', 5, '')"));
    }

    #[test]
    fn publish_format_extensions() {
        assert_eq!(PublishFormat::Word.extension(), "docx");
        assert_eq!(PublishFormat::Pdf.extension(), "pdf");
        assert_eq!(PublishFormat::Pdf as u8, 3);
    }

    #[test]
    fn missing_program_is_launch_error() {
        let host = PowerShellHost::new("definitely-not-a-real-powershell-binary");
        let err = host
            .get_hierarchy("", HierarchyScope::Notebooks)
            .unwrap_err();
        assert!(matches!(err, HostError::Launch { .. }));
    }
}
