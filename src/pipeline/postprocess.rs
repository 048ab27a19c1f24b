//! Post-processing: deterministic cleanup of pandoc-generated Markdown.
//!
//! ## Why is post-processing necessary?
//!
//! pandoc turns the Word document OneNote publishes into faithful but
//! awkward Markdown for a note-taking tool:
//!
//! - the page title, date and time come out as three loose paragraphs
//! - pictures point at `media/imageN.ext` files that never exist on disk
//! - picture sizes are pandoc attributes (`{width="2in" …}`) that Obsidian
//!   ignores
//! - quotes and ellipses are backslash-escaped, spaces are often U+00A0
//! - every paragraph is separated by a blank line
//!
//! ## Rule Order
//!
//! The header rewrite must see pandoc's raw line layout, so it runs first.
//! Image references are renamed before their dimension attributes are
//! folded into the alt text. Blank lines are collapsed before line endings
//! are normalised; the collapse pattern tolerates a stray `\r`.

use crate::config::PostProcessOptions;
use crate::error::ExportError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::debug;

/// Apply the enabled cleanup rules to the raw converter output.
///
/// `image_names` is index-aligned with pandoc's `media/image1…N`
/// placeholders. Placeholders without a matching name are left as they are.
///
/// Rules (applied in order):
/// 1. Rewrite the title/date/time header block
/// 2. Rename image references to the extracted asset files
/// 3. Convert inch dimensions to `![alt|WxH](…)`
/// 4. Undo backslash escapes for quotes and ellipses
/// 5. Remove non-breaking spaces
/// 6. Collapse blank lines, except before table rows
/// 7. Normalise line endings (CRLF → LF)
pub fn clean_markdown(
    input: &str,
    image_names: &[String],
    options: &PostProcessOptions,
) -> Result<String, ExportError> {
    let mut s = if options.fix_header {
        rewrite_header(input, options.conversion_tag.as_deref())?
    } else {
        input.to_string()
    };

    s = rename_image_references(&s, image_names);
    if options.fix_image_dimensions {
        s = convert_image_dimensions(&s, options.pixels_per_inch);
    }
    if options.fix_backslashes {
        s = unescape_backslashes(&s);
    }
    if options.remove_nbsp {
        s = remove_nbsp(&s);
    }
    if options.collapse_blank_lines {
        s = collapse_blank_lines(&s);
    }
    if options.normalize_line_endings {
        s = crlf_to_lf(&s);
    }
    Ok(s)
}

/// Clean a Markdown file in place.
///
/// The result is written to a temporary file in the same directory and then
/// renamed over `path`, so the file is never observed half-written.
pub fn clean_markdown_file(
    path: &Path,
    image_names: &[String],
    options: &PostProcessOptions,
) -> Result<(), ExportError> {
    let raw = std::fs::read_to_string(path).map_err(|e| ExportError::io(path, e))?;
    let cleaned = clean_markdown(&raw, image_names, options)?;
    super::write::write_atomic(path, &cleaned)?;
    debug!(
        "Cleaned {} ({} → {} bytes)",
        path.display(),
        raw.len(),
        cleaned.len()
    );
    Ok(())
}

// ── Rule 1: Header rewrite ───────────────────────────────────────────────────
//
// pandoc renders the top of a published OneNote page as:
//
//   0  Title
//   1
//   2  Monday, 4 March 2024
//   3
//   4  10:15
//
// These indices are a contract with that layout, nothing more.

const TITLE_LINE: usize = 0;
const DATE_LINE: usize = 2;
const TAG_LINE: usize = 3;
const TIME_LINE: usize = 4;

/// Minimum number of lines the header rewrite needs.
pub const HEADER_LINES: usize = TIME_LINE + 1;

/// Horizontal rule that replaces the time line.
pub const HEADER_RULE: &str = "___";

/// Turn pandoc's page header into `# Title`, `date time`, tag, rule.
///
/// Fails with [`ExportError::UnexpectedConverterOutput`] on documents
/// shorter than [`HEADER_LINES`] lines.
pub fn rewrite_header(input: &str, tag: Option<&str>) -> Result<String, ExportError> {
    let mut lines: Vec<String> = input.split('\n').map(str::to_string).collect();
    // A trailing newline yields an empty last segment; it is not a line.
    let line_count = if input.ends_with('\n') {
        lines.len() - 1
    } else {
        lines.len()
    };
    if line_count < HEADER_LINES {
        return Err(ExportError::UnexpectedConverterOutput {
            lines: line_count,
            expected: HEADER_LINES,
        });
    }

    lines[TITLE_LINE].insert_str(0, "# ");

    let date = lines[DATE_LINE].trim_end_matches('\r');
    lines[DATE_LINE] = format!("{} {}", date, lines[TIME_LINE]);

    if let Some(tag) = tag {
        lines[TAG_LINE] = tag.to_string();
    }
    lines[TIME_LINE] = HEADER_RULE.to_string();

    Ok(lines.join("\n"))
}

// ── Rule 2: Image reference rename ───────────────────────────────────────────

static RE_MEDIA_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"media/image([1-9][0-9]*)\.[a-zA-Z]+").unwrap());

/// Replace `media/imageN.ext` with `image_names[N - 1]`.
pub fn rename_image_references(input: &str, image_names: &[String]) -> String {
    if image_names.is_empty() {
        return input.to_string();
    }
    RE_MEDIA_PLACEHOLDER
        .replace_all(input, |caps: &regex::Captures<'_>| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|n| image_names.get(n - 1))
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

// ── Rule 3: Image dimension conversion ───────────────────────────────────────

static RE_IMAGE_DIMENSIONS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"!\[([^\]]*)\]\(([^)]*)\)\{width="([0-9]+(?:\.[0-9]+)?)in" height="([0-9]+(?:\.[0-9]+)?)in"\}"#,
    )
    .unwrap()
});

/// Rewrite `![alt](name){width="Win" height="Hin"}` to `![alt|WxH](name)`.
pub fn convert_image_dimensions(input: &str, pixels_per_inch: u32) -> String {
    RE_IMAGE_DIMENSIONS
        .replace_all(input, |caps: &regex::Captures<'_>| {
            let (Ok(w), Ok(h)) = (caps[3].parse::<f64>(), caps[4].parse::<f64>()) else {
                return caps[0].to_string();
            };
            let ppi = f64::from(pixels_per_inch);
            format!(
                "![{}|{}x{}]({})",
                &caps[1],
                (w * ppi) as u64,
                (h * ppi) as u64,
                &caps[2]
            )
        })
        .into_owned()
}

// ── Rule 4: Backslash unescaping ─────────────────────────────────────────────

/// Undo `\"`, `\'` and `\...`; any other backslash is kept.
pub fn unescape_backslashes(input: &str) -> String {
    input
        .replace("\\\"", "\"")
        .replace("\\'", "'")
        .replace("\\...", "...")
}

// ── Rule 5: Non-breaking spaces ──────────────────────────────────────────────

/// Delete every U+00A0 character.
pub fn remove_nbsp(input: &str) -> String {
    input.replace('\u{00A0}', "")
}

// ── Rule 6: Blank-line collapsing ────────────────────────────────────────────

// A line break, then a line holding nothing or only a `\>` marker, then the
// next line break.
static RE_BLANK_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t\r]*(?:\\>[ \t\r]*)?\n").unwrap());

/// Remove blank lines between paragraphs, keeping the one before a table.
///
/// A blank line directly followed by a line starting with `|` survives;
/// without it Markdown would read the table as part of the paragraph above.
/// Runs of blank lines collapse completely, so a second pass is a no-op.
pub fn collapse_blank_lines(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut copied = 0;
    let mut pos = 0;

    while let Some(m) = RE_BLANK_LINE.find_at(input, pos) {
        // The closing line break is kept and may open the next blank line.
        let closing = m.end() - 1;
        if input[m.end()..].starts_with('|') {
            pos = closing;
            continue;
        }
        out.push_str(&input[copied..m.start()]);
        copied = closing;
        pos = closing;
    }
    out.push_str(&input[copied..]);
    out
}

// ── Rule 7: Line endings ─────────────────────────────────────────────────────

static RE_CRLF: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r+\n").unwrap());

/// Turn every CRLF (including a doubled `\r\r\n`) into LF; lone `\r` is kept.
pub fn crlf_to_lf(input: &str) -> String {
    RE_CRLF.replace_all(input, "\n").into_owned()
}

// ── Tests ────────────────────────────────────────────────────────────────────
