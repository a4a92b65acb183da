//! Incremental whitespace trimming for text runs.
//!
//! Leading whitespace is dropped before the run exists: the run node is only
//! created once a non-whitespace character arrives. Trailing whitespace is
//! kept while the run can still grow and stripped when a tag or end of input
//! terminates it. Whitespace between two non-whitespace characters is kept
//! verbatim.

use crate::dom::{Document, NodeKey};

fn is_space(c: char) -> bool {
    c.is_ascii_whitespace()
}

/// The text run currently being appended to, if any.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct TextCursor {
    current: Option<NodeKey>,
}

impl TextCursor {
    /// Append `text` under `parent`. Returns the run it went into, or `None`
    /// when everything was leading whitespace.
    pub(crate) fn append(
        &mut self,
        doc: &mut Document,
        parent: NodeKey,
        text: &str,
    ) -> Option<NodeKey> {
        if let Some(key) = self.current {
            if let Some(run) = doc.text_run_mut(key) {
                run.text.push_str(text);
                return Some(key);
            }
        }
        let trimmed = text.trim_start_matches(is_space);
        if trimmed.is_empty() {
            return None;
        }
        let key = doc.append_text(parent, trimmed.to_string());
        self.current = Some(key);
        Some(key)
    }

    /// End the current run and strip its trailing whitespace.
    pub(crate) fn terminate(&mut self, doc: &mut Document) {
        let Some(key) = self.current.take() else {
            return;
        };
        if let Some(run) = doc.text_run_mut(key) {
            let keep = run.text.trim_end_matches(is_space).len();
            run.text.truncate(keep);
            run.terminated = true;
        }
    }

    #[cfg(test)]
    pub(crate) fn current(&self) -> Option<NodeKey> {
        self.current
    }
}
