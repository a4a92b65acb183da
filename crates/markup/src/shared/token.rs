//! Token model.

/// Token produced by the lexer.
///
/// Names and text are the raw characters of the input; nothing is unescaped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// `<name>`, or `<name/>` with `self_closing` set.
    StartTag { name: String, self_closing: bool },
    /// `</name>`.
    EndTag { name: String },
    /// A run of character data.
    ///
    /// One logical run may arrive as several tokens when it spans increments;
    /// consumers concatenate adjacent text tokens.
    Text { text: String },
    /// `<?body?>`. Carried through the token stream but never part of the tree.
    ProcessingInstruction { body: String },
}
