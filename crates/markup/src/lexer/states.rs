//! Lexer state machine definitions.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LexerState {
    /// Between lexemes; everything up to the next `<` is character data.
    Data,
    /// Only the `<` of a lexeme has been seen.
    TagOpen,
    /// Inside a start or end tag, waiting for `>`.
    Tag,
    /// Inside `<?...`, waiting for `?>`.
    ProcessingInstruction,
}
