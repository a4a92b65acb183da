//! Recoverable parse errors.
//!
//! None of these stop parsing; they are recorded on the session context and the
//! parser keeps producing snapshots.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParseErrorCode {
    /// A complete `<...>` lexeme with no usable name, e.g. `<>` or `</ >`.
    MalformedTag,
    /// An end tag that does not match the innermost open element.
    UnexpectedEndTag,
    /// A start tag after the root element has closed.
    MultipleRoots,
    /// Non-whitespace text before the root opens or after it closes.
    TextOutsideRoot,
    /// Input ended inside a tag lexeme.
    UnterminatedTag,
    /// Input ended with this element still open.
    UnclosedElement,
}

impl ParseErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ParseErrorCode::MalformedTag => "malformed-tag",
            ParseErrorCode::UnexpectedEndTag => "unexpected-end-tag",
            ParseErrorCode::MultipleRoots => "multiple-roots",
            ParseErrorCode::TextOutsideRoot => "text-outside-root",
            ParseErrorCode::UnterminatedTag => "unterminated-tag",
            ParseErrorCode::UnclosedElement => "unclosed-element",
        }
    }
}

impl fmt::Display for ParseErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub code: ParseErrorCode,
    /// Byte offset into the logical input stream.
    pub position: usize,
    /// Offending tag name or lexeme, when there is one.
    pub detail: Option<String>,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at byte {}", self.code, self.position)?;
        if let Some(detail) = &self.detail {
            write!(f, ": {detail:?}")?;
        }
        Ok(())
    }
}
