//! In-progress document tree.
//!
//! Nodes live in an arena owned by the [`Document`] and refer to each other by
//! [`NodeKey`]. Only the tree builder mutates the document; everything else
//! reads it.

/// Arena handle for a node of one document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeKey(usize);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(TextRun),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub children: Vec<NodeKey>,
    /// Set when the matching end tag was seen. Rendering never sets it.
    pub closed: bool,
}

/// A run of character data with leading whitespace already dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    /// Set once a tag (or end of input) ends the run; trailing whitespace has
    /// been stripped from `text` at that point.
    pub terminated: bool,
}

impl TextRun {
    /// Text as it appears in a snapshot.
    ///
    /// A run that may still grow keeps its trailing whitespace in storage but
    /// does not show it: the next increment decides whether it is internal.
    pub fn rendered(&self) -> &str {
        if self.terminated {
            &self.text
        } else {
            self.text.trim_end_matches(|c: char| c.is_ascii_whitespace())
        }
    }
}

#[derive(Debug, Default)]
pub struct Document {
    nodes: Vec<Node>,
    root: Option<NodeKey>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<NodeKey> {
        self.root
    }

    pub fn has_root(&self) -> bool {
        self.root.is_some()
    }

    /// `true` once the root element exists and is closed.
    pub fn is_finished(&self) -> bool {
        self.root
            .and_then(|key| self.element(key))
            .is_some_and(|root| root.closed)
    }

    pub fn node(&self, key: NodeKey) -> &Node {
        &self.nodes[key.0]
    }

    pub fn element(&self, key: NodeKey) -> Option<&Element> {
        match self.nodes.get(key.0) {
            Some(Node::Element(element)) => Some(element),
            _ => None,
        }
    }

    pub fn text_run(&self, key: NodeKey) -> Option<&TextRun> {
        match self.nodes.get(key.0) {
            Some(Node::Text(run)) => Some(run),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn create_root(&mut self, name: &str) -> NodeKey {
        debug_assert!(self.root.is_none(), "document already has a root");
        let key = self.push(Node::Element(Element {
            name: name.to_string(),
            children: Vec::new(),
            closed: false,
        }));
        self.root = Some(key);
        key
    }

    pub(crate) fn append_element(&mut self, parent: NodeKey, name: &str) -> NodeKey {
        let key = self.push(Node::Element(Element {
            name: name.to_string(),
            children: Vec::new(),
            closed: false,
        }));
        self.attach(parent, key);
        key
    }

    pub(crate) fn append_text(&mut self, parent: NodeKey, text: String) -> NodeKey {
        let key = self.push(Node::Text(TextRun {
            text,
            terminated: false,
        }));
        self.attach(parent, key);
        key
    }

    pub(crate) fn element_mut(&mut self, key: NodeKey) -> Option<&mut Element> {
        match self.nodes.get_mut(key.0) {
            Some(Node::Element(element)) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn text_run_mut(&mut self, key: NodeKey) -> Option<&mut TextRun> {
        match self.nodes.get_mut(key.0) {
            Some(Node::Text(run)) => Some(run),
            _ => None,
        }
    }

    fn push(&mut self, node: Node) -> NodeKey {
        let key = NodeKey(self.nodes.len());
        self.nodes.push(node);
        key
    }

    fn attach(&mut self, parent: NodeKey, child: NodeKey) {
        match self.nodes.get_mut(parent.0) {
            Some(Node::Element(element)) => element.children.push(child),
            _ => debug_assert!(false, "parent {parent:?} is not an element"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Document, Node, TextRun};

    #[test]
    fn unterminated_run_hides_trailing_whitespace() {
        let open = TextRun {
            text: "Some text \t".to_string(),
            terminated: false,
        };
        assert_eq!(open.rendered(), "Some text");
        let closed = TextRun {
            text: "Some text".to_string(),
            terminated: true,
        };
        assert_eq!(closed.rendered(), "Some text");
    }

    #[test]
    fn finished_follows_root_closed_flag() {
        let mut doc = Document::new();
        assert!(!doc.is_finished());
        let root = doc.create_root("top");
        let child = doc.append_element(root, "foo");
        doc.append_text(child, "x".to_string());
        assert!(!doc.is_finished());
        doc.element_mut(root).unwrap().closed = true;
        assert!(doc.is_finished());
        assert_eq!(doc.len(), 3);
        assert!(matches!(doc.node(child), Node::Element(e) if e.children.len() == 1));
    }
}
