//! Tree builder.
//!
//! Consumes lexer tokens and mutates a single in-progress [`Document`] through
//! an explicit stack of open elements. All state lives in the builder, so it
//! resumes between increments with no active call frames.

use crate::dom::{Document, NodeKey};
use crate::shared::{DocumentParseContext, ParseErrorCode, Span, Token};
use stack::OpenElementsStack;
use text::TextCursor;

mod stack;
mod text;

/// What to do with an end tag that does not match the innermost open element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MismatchPolicy {
    /// Keep the closer as character data (`</name>`) in the current element.
    ///
    /// Snapshots then contain the raw closer and are no longer properly
    /// nested tag strings.
    LiteralText,
    /// Drop the closer.
    #[default]
    Discard,
    /// Close every element down to the innermost one with that name; drop the
    /// closer if no open element has that name.
    PopToMatch,
}

#[derive(Clone, Debug, Default)]
pub struct TreeBuilderConfig {
    pub mismatch_policy: MismatchPolicy,
}

/// Effect of one token on the document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeBuilderStep {
    /// The token changed the tree (or would have, for leading whitespace).
    Applied,
    /// The token has no effect on the tree and nothing was wrong with it.
    Ignored,
    /// The token was malformed in context; an error was recorded and the
    /// builder recovered.
    Recovered,
}

pub struct TreeBuilder {
    config: TreeBuilderConfig,
    document: Document,
    open: OpenElementsStack,
    text: TextCursor,
    /// Open elements of a discarded second top-level element, outermost first.
    discarded: Vec<String>,
    finished: bool,
}

impl TreeBuilder {
    pub fn new(config: TreeBuilderConfig) -> Self {
        Self {
            config,
            document: Document::new(),
            open: OpenElementsStack::default(),
            text: TextCursor::default(),
            discarded: Vec::new(),
            finished: false,
        }
    }

    pub fn push_token(
        &mut self,
        token: &Token,
        span: Span,
        ctx: &mut DocumentParseContext,
    ) -> TreeBuilderStep {
        assert!(
            !self.finished,
            "TreeBuilder::push_token called after finish()"
        );
        #[cfg(any(test, feature = "debug-stats"))]
        log::trace!(
            target: "markup.tree_builder",
            "token {token:?} @{}..{} depth={}",
            span.start,
            span.end,
            self.open.len()
        );
        match token {
            Token::StartTag { name, self_closing } => {
                self.start_tag(name, *self_closing, span, ctx)
            }
            Token::EndTag { name } => self.end_tag(name, span, ctx),
            Token::Text { text } => self.text(text, span, ctx),
            Token::ProcessingInstruction { .. } => TreeBuilderStep::Ignored,
        }
    }

    /// End of input: terminate the current text run and report every element
    /// still open, innermost first. Open elements stay open.
    pub fn finish(&mut self, ctx: &mut DocumentParseContext, position: usize) {
        if self.finished {
            return;
        }
        self.text.terminate(&mut self.document);
        for key in self.open.iter().rev() {
            let name = self
                .document
                .element(key)
                .map(|element| element.name.clone());
            ctx.record_error(ParseErrorCode::UnclosedElement, position, name);
        }
        self.finished = true;
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn open_depth(&self) -> usize {
        self.open.len()
    }

    pub fn max_open_depth(&self) -> usize {
        self.open.max_depth()
    }

    /// Names of the open elements, root first.
    pub fn open_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.open
            .iter()
            .filter_map(|key| self.document.element(key))
            .map(|element| element.name.as_str())
    }

    fn start_tag(
        &mut self,
        name: &str,
        self_closing: bool,
        span: Span,
        ctx: &mut DocumentParseContext,
    ) -> TreeBuilderStep {
        self.text.terminate(&mut self.document);

        if !self.discarded.is_empty() {
            if !self_closing {
                self.discarded.push(name.to_string());
            }
            return TreeBuilderStep::Ignored;
        }

        let key = match self.open.current() {
            Some(parent) => self.document.append_element(parent, name),
            None if self.document.has_root() => {
                ctx.record_error(
                    ParseErrorCode::MultipleRoots,
                    span.start,
                    Some(name.to_string()),
                );
                if !self_closing {
                    self.discarded.push(name.to_string());
                }
                return TreeBuilderStep::Recovered;
            }
            None => self.document.create_root(name),
        };

        if self_closing {
            self.close(key);
        } else {
            self.open.push(key);
        }
        TreeBuilderStep::Applied
    }

    fn end_tag(
        &mut self,
        name: &str,
        span: Span,
        ctx: &mut DocumentParseContext,
    ) -> TreeBuilderStep {
        if !self.discarded.is_empty() {
            // A closer ends the innermost discarded element with its name and
            // everything inside it. Other closers are dropped.
            if let Some(index) = self.discarded.iter().rposition(|open| open == name) {
                self.discarded.truncate(index);
            }
            return TreeBuilderStep::Ignored;
        }

        let Some(top) = self.open.current() else {
            ctx.record_error(
                ParseErrorCode::UnexpectedEndTag,
                span.start,
                Some(name.to_string()),
            );
            return TreeBuilderStep::Recovered;
        };

        if self.is_named(top, name) {
            self.text.terminate(&mut self.document);
            self.open.pop();
            self.close(top);
            return TreeBuilderStep::Applied;
        }

        ctx.record_error(
            ParseErrorCode::UnexpectedEndTag,
            span.start,
            Some(name.to_string()),
        );
        match self.config.mismatch_policy {
            MismatchPolicy::LiteralText => {
                let literal = format!("</{name}>");
                self.text.append(&mut self.document, top, &literal);
            }
            MismatchPolicy::Discard => {}
            MismatchPolicy::PopToMatch => {
                let document = &self.document;
                let found = self.open.rposition(|key| {
                    document
                        .element(key)
                        .is_some_and(|element| element.name == name)
                });
                if let Some(index) = found {
                    self.text.terminate(&mut self.document);
                    let popped: Vec<NodeKey> = self.open.pop_to(index).collect();
                    for key in popped {
                        self.close(key);
                    }
                }
            }
        }
        TreeBuilderStep::Recovered
    }

    fn text(&mut self, text: &str, span: Span, ctx: &mut DocumentParseContext) -> TreeBuilderStep {
        if !self.discarded.is_empty() {
            return TreeBuilderStep::Ignored;
        }
        match self.open.current() {
            Some(parent) => {
                self.text.append(&mut self.document, parent, text);
                TreeBuilderStep::Applied
            }
            None => {
                let Some(offset) = text.find(|c: char| !c.is_ascii_whitespace()) else {
                    return TreeBuilderStep::Ignored;
                };
                ctx.record_error(
                    ParseErrorCode::TextOutsideRoot,
                    span.start + offset,
                    Some(text.trim().to_string()),
                );
                TreeBuilderStep::Recovered
            }
        }
    }

    fn is_named(&self, key: NodeKey, name: &str) -> bool {
        self.document
            .element(key)
            .is_some_and(|element| element.name == name)
    }

    fn close(&mut self, key: NodeKey) {
        if let Some(element) = self.document.element_mut(key) {
            element.closed = true;
        }
        #[cfg(any(test, feature = "debug-stats"))]
        log::trace!(target: "markup.tree_builder", "closed {key:?}, depth={}", self.open.len());
    }
}
