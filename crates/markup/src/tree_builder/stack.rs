//! Stack of open elements.

use crate::dom::NodeKey;

/// Open elements from the root (bottom) to the innermost (top).
///
/// While the root is open the stack is exactly the path from the root to the
/// element new content attaches to. It is empty before the root opens and
/// again once the root has closed.
#[derive(Clone, Debug, Default)]
pub(crate) struct OpenElementsStack {
    items: Vec<NodeKey>,
    max_depth: usize,
}

impl OpenElementsStack {
    pub(crate) fn push(&mut self, key: NodeKey) {
        self.items.push(key);
        self.max_depth = self.max_depth.max(self.items.len());
    }

    pub(crate) fn pop(&mut self) -> Option<NodeKey> {
        self.items.pop()
    }

    pub(crate) fn current(&self) -> Option<NodeKey> {
        self.items.last().copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Index (from the bottom) of the innermost entry matching `pred`.
    pub(crate) fn rposition(&self, mut pred: impl FnMut(NodeKey) -> bool) -> Option<usize> {
        self.items.iter().rposition(|key| pred(*key))
    }

    /// Pop every entry at or above `index`, innermost first.
    pub(crate) fn pop_to(&mut self, index: usize) -> impl Iterator<Item = NodeKey> + '_ {
        self.items.drain(index..).rev()
    }

    pub(crate) fn iter(&self) -> impl DoubleEndedIterator<Item = NodeKey> + '_ {
        self.items.iter().copied()
    }
}
