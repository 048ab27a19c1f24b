//! The OneNote hierarchy: notebooks, section groups, sections and pages.
//!
//! The automation interface answers a hierarchy query with an XML document
//! whose root is the queried container and whose direct children are the
//! nodes we descend into:
//!
//! ```xml
//! <one:Notebook xmlns:one="http://schemas.microsoft.com/office/onenote/2013/onenote"
//!               name="Work" ID="{A1…}">
//!   <one:Section name="Inbox" ID="{B2…}"/>
//!   <one:SectionGroup name="Archive" ID="{C3…}">…</one:SectionGroup>
//! </one:Notebook>
//! ```
//!
//! Only those direct children are read; deeper levels are fetched with a
//! fresh query when the traversal gets there.

use crate::error::ExportError;
use crate::host::HierarchyScope;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Name prefix OneNote gives the deleted-items section group of a notebook.
pub const RECYCLE_BIN_PREFIX: &str = "OneNote_RecycleBin";

/// The four node types the export cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Notebook,
    SectionGroup,
    Section,
    Page,
}

impl NodeKind {
    fn from_local_name(name: &[u8]) -> Option<Self> {
        match name {
            b"Notebook" => Some(NodeKind::Notebook),
            b"SectionGroup" => Some(NodeKind::SectionGroup),
            b"Section" => Some(NodeKind::Section),
            b"Page" => Some(NodeKind::Page),
            _ => None,
        }
    }

    /// Scope of the query that lists this node's children; `None` for pages.
    pub fn child_scope(self) -> Option<HierarchyScope> {
        match self {
            NodeKind::Notebook => Some(HierarchyScope::Children),
            NodeKind::SectionGroup => Some(HierarchyScope::Sections),
            NodeKind::Section => Some(HierarchyScope::Pages),
            NodeKind::Page => None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeKind::Notebook => "notebook",
            NodeKind::SectionGroup => "section group",
            NodeKind::Section => "section",
            NodeKind::Page => "page",
        };
        f.write_str(s)
    }
}

/// One element of a hierarchy query result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub kind: NodeKind,
    /// OneNote object ID, e.g. `{1A2B…}{1}{B0}`.
    pub id: String,
    /// Display name (page title for pages).
    pub name: String,
    /// Set from the `isRecycleBin` attribute.
    #[serde(default)]
    pub recycle_bin: bool,
}

impl HierarchyNode {
    pub fn new(kind: NodeKind, id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            name: name.into(),
            recycle_bin: false,
        }
    }

    /// Whether this is a notebook's recycle-bin section group.
    pub fn is_recycle_bin(&self) -> bool {
        self.kind == NodeKind::SectionGroup
            && (self.recycle_bin || self.name.starts_with(RECYCLE_BIN_PREFIX))
    }
}

/// A node visited by [`crate::export::list_hierarchy`], with its position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyEntry {
    pub node: HierarchyNode,
    /// 0 for notebooks.
    pub depth: usize,
    /// Sanitised directory path of the containing folder, relative to the
    /// export root.
    pub path: PathBuf,
    /// Position among its siblings.
    pub index: usize,
}

/// Parse the direct children of the root element of a hierarchy document.
pub fn parse_hierarchy(xml: &str) -> Result<Vec<HierarchyNode>, ExportError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut nodes = Vec::new();
    let mut depth: usize = 0;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                if depth == 1 {
                    nodes.extend(node_from_element(e)?);
                }
                depth += 1;
            }
            Ok(Event::Empty(ref e)) => {
                if depth == 1 {
                    nodes.extend(node_from_element(e)?);
                }
            }
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExportError::MalformedHierarchy {
                    detail: format!("at byte {}: {}", reader.error_position(), e),
                })
            }
            _ => {}
        }
    }

    Ok(nodes)
}

fn node_from_element(e: &BytesStart<'_>) -> Result<Option<HierarchyNode>, ExportError> {
    let local = e.local_name();
    let Some(kind) = NodeKind::from_local_name(local.as_ref()) else {
        return Ok(None);
    };

    let malformed = |detail: String| ExportError::MalformedHierarchy { detail };

    let mut id = None;
    let mut name = None;
    let mut recycle_bin = false;
    for attr in e.attributes() {
        let attr = attr.map_err(|e| malformed(e.to_string()))?;
        let key = attr.key.local_name();
        match key.as_ref() {
            b"ID" => id = Some(unescaped(&attr)?),
            b"name" => name = Some(unescaped(&attr)?),
            b"isRecycleBin" => recycle_bin = attr.value.as_ref() == b"true",
            _ => {}
        }
    }

    match (id, name) {
        (Some(id), Some(name)) => Ok(Some(HierarchyNode {
            kind,
            id,
            name,
            recycle_bin,
        })),
        (None, _) => Err(malformed(format!("{kind} element without an ID attribute"))),
        (_, None) => Err(malformed(format!("{kind} element without a name attribute"))),
    }
}

fn unescaped(attr: &Attribute<'_>) -> Result<String, ExportError> {
    attr.unescape_value()
        .map(|v| v.into_owned())
        .map_err(|e| ExportError::MalformedHierarchy {
            detail: e.to_string(),
        })
}
