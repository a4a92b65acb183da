//! Snapshot rendering.
//!
//! A snapshot serializes the document as currently known. Elements that are
//! still open get a closing tag right after their last known child, so every
//! snapshot is well-formed. This is a read-only traversal: the document's
//! `closed` flags are never touched.

use crate::dom::{Document, Node, NodeKey};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapshotStatus {
    /// The root element exists and its end tag has been seen.
    Finished,
    /// No root yet, or the root is still open.
    Unfinished,
}

impl SnapshotStatus {
    pub fn marker(self) -> &'static str {
        match self {
            SnapshotStatus::Finished => "FINISHED",
            SnapshotStatus::Unfinished => "UNFINISHED",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub status: SnapshotStatus,
    pub markup: String,
}

impl Snapshot {
    pub fn is_finished(&self) -> bool {
        self.status == SnapshotStatus::Finished
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":: {}: {}", self.status.marker(), self.markup)
    }
}

enum Visit {
    Open(NodeKey),
    Close(NodeKey),
}

pub fn render(document: &Document) -> Snapshot {
    let status = if document.is_finished() {
        SnapshotStatus::Finished
    } else {
        SnapshotStatus::Unfinished
    };
    let mut markup = String::new();
    if let Some(root) = document.root() {
        write_subtree(document, root, &mut markup);
    }
    Snapshot { status, markup }
}

// Explicit stack: nesting depth is bounded only by the input.
fn write_subtree(document: &Document, root: NodeKey, out: &mut String) {
    let mut stack = vec![Visit::Open(root)];
    while let Some(visit) = stack.pop() {
        match visit {
            Visit::Open(key) => match document.node(key) {
                Node::Element(element) => {
                    out.push('<');
                    out.push_str(&element.name);
                    out.push('>');
                    stack.push(Visit::Close(key));
                    stack.extend(element.children.iter().rev().map(|&child| Visit::Open(child)));
                }
                Node::Text(run) => out.push_str(run.rendered()),
            },
            Visit::Close(key) => {
                if let Some(element) = document.element(key) {
                    out.push_str("</");
                    out.push_str(&element.name);
                    out.push('>');
                }
            }
        }
    }
}

/// `true` when every `<name>` in `markup` is closed by a matching `</name>`
/// in nesting order.
///
/// Every `<` starts a tag, so text holding a literal `<` fails the check.
/// Rendered markup never contains one unless `MismatchPolicy::LiteralText`
/// put it there.
pub fn is_well_formed(markup: &str) -> bool {
    let mut open: Vec<&str> = Vec::new();
    let mut rest = markup;
    while let Some(lt) = rest.find('<') {
        let after = &rest[lt + 1..];
        let Some(gt) = after.find('>') else {
            return false;
        };
        let tag = &after[..gt];
        match tag.strip_prefix('/') {
            Some(name) => {
                if open.pop() != Some(name) {
                    return false;
                }
            }
            None if tag.is_empty() => return false,
            None => open.push(tag),
        }
        rest = &after[gt + 1..];
    }
    open.is_empty()
}
