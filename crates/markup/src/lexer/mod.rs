//! Streaming lexer.
//!
//! The lexer consumes increments of text and emits tokens in batches. It is an
//! explicit state machine and resumes at any increment boundary, including in
//! the middle of a tag.
//!
//! Invariants:
//! - At most one tag lexeme is pending at a time. It is kept verbatim (leading
//!   `<` included) until its `>` arrives; no token is emitted for it before then.
//! - Characters already moved into the pending lexeme are never scanned again.
//! - Text is flushed at every `<` and at the end of every increment, so one
//!   logical text run may arrive as several adjacent `Text` tokens.
//! - Chunk equivalence: any split of the same input yields the same token
//!   sequence once adjacent text tokens are concatenated.

use crate::shared::{DocumentParseContext, ParseErrorCode, Span, Token};
use memchr::memchr;
use states::LexerState;

mod emit;
mod states;
mod token_fmt;

pub use token_fmt::{escape_text, format_token};

const PI_OPEN: &str = "<?";
const PI_CLOSE: &str = "?>";

/// Configuration for the lexer.
#[derive(Clone, Debug)]
pub struct LexerConfig {
    /// Lex `<?...?>` as a processing instruction. When disabled, `<?...>` is an
    /// ordinary tag lexeme ending at the first `>`.
    pub processing_instructions: bool,
}

impl Default for LexerConfig {
    fn default() -> Self {
        Self {
            processing_instructions: true,
        }
    }
}

/// Result of pushing an increment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LexResult {
    /// At least one token is ready in the next batch.
    Progress,
    /// Nothing new to emit; a tag lexeme may still be pending.
    NeedMoreInput,
    /// `finish()` has run; no further input is accepted.
    EndOfStream,
}

/// Minimal lexer instrumentation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LexerStats {
    pub increments: u64,
    pub tokens_emitted: u64,
    pub state_transitions: u64,
    /// Increments that ended inside a tag lexeme.
    pub carried_lexemes: u64,
}

/// Tokens drained from the lexer, in source order.
#[derive(Debug, Default)]
pub struct TokenBatch {
    entries: Vec<(Token, Span)>,
}

impl TokenBatch {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Token, Span)> + '_ {
        self.entries.iter().map(|(token, span)| (token, *span))
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.entries.into_iter().map(|(token, _)| token).collect()
    }
}

/// Incremental lexer for the tag markup.
pub struct Lexer {
    config: LexerConfig,
    state: LexerState,
    /// Verbatim tag lexeme carried across increments.
    pending: String,
    pending_start: usize,
    /// Character data seen in the current increment.
    text: String,
    text_start: usize,
    /// Bytes consumed from the logical input stream.
    offset: usize,
    tokens: Vec<(Token, Span)>,
    end_of_stream: bool,
    stats: LexerStats,
}

impl Lexer {
    pub fn new(config: LexerConfig) -> Self {
        Self {
            config,
            state: LexerState::Data,
            pending: String::new(),
            pending_start: 0,
            text: String::new(),
            text_start: 0,
            offset: 0,
            tokens: Vec::new(),
            end_of_stream: false,
            stats: LexerStats::default(),
        }
    }

    /// Consume one increment.
    ///
    /// A tag lexeme left open by the previous increment continues with the
    /// first character of this one; there is no token boundary at the seam.
    pub fn push_str(&mut self, chunk: &str, ctx: &mut DocumentParseContext) -> LexResult {
        assert!(
            !self.end_of_stream,
            "Lexer::push_str called after finish(); this violates the end-of-stream contract"
        );
        self.stats.increments = self.stats.increments.saturating_add(1);
        let initial_tokens = self.tokens.len();

        let mut rest = chunk;
        while !rest.is_empty() {
            let consumed = match self.state {
                LexerState::Data => self.step_data(rest, ctx),
                LexerState::TagOpen => self.step_tag_open(rest, ctx),
                LexerState::Tag => self.step_tag(rest, ctx),
                LexerState::ProcessingInstruction => self.step_processing_instruction(rest, ctx),
            };
            debug_assert!(consumed > 0, "lexer step must make progress");
            debug_assert!(rest.is_char_boundary(consumed));
            rest = &rest[consumed..];
        }
        // Text has no terminator; hand it over now so the caller can render it.
        self.flush_text(ctx);

        if self.state != LexerState::Data {
            self.stats.carried_lexemes = self.stats.carried_lexemes.saturating_add(1);
            #[cfg(any(test, feature = "debug-stats"))]
            log::trace!(
                target: "markup.lexer",
                "increment ended inside lexeme {:?} (state {:?})",
                self.pending,
                self.state
            );
        }

        if self.tokens.len() > initial_tokens {
            LexResult::Progress
        } else {
            LexResult::NeedMoreInput
        }
    }

    /// Mark end of stream.
    ///
    /// Pending text is flushed. A pending tag lexeme is dropped: it never
    /// becomes a token and is recorded as `UnterminatedTag`.
    pub fn finish(&mut self, ctx: &mut DocumentParseContext) -> LexResult {
        if self.end_of_stream {
            return LexResult::EndOfStream;
        }
        self.flush_text(ctx);
        if !self.pending.is_empty() {
            let lexeme = std::mem::take(&mut self.pending);
            ctx.record_error(
                ParseErrorCode::UnterminatedTag,
                self.pending_start,
                Some(lexeme),
            );
            self.transition_to(LexerState::Data);
        }
        self.end_of_stream = true;
        LexResult::EndOfStream
    }

    /// Drain the tokens produced so far.
    pub fn next_batch(&mut self) -> TokenBatch {
        TokenBatch {
            entries: std::mem::take(&mut self.tokens),
        }
    }

    /// The tag lexeme begun but not yet closed, verbatim.
    pub fn pending_lexeme(&self) -> Option<&str> {
        if self.pending.is_empty() {
            None
        } else {
            Some(&self.pending)
        }
    }

    /// Total bytes consumed so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn stats(&self) -> LexerStats {
        self.stats
    }

    fn transition_to(&mut self, next: LexerState) {
        if self.state == next {
            return;
        }
        #[cfg(any(test, feature = "debug-stats"))]
        log::trace!(
            target: "markup.lexer",
            "state {:?} -> {:?} @{}",
            self.state,
            next,
            self.offset
        );
        self.state = next;
        self.stats.state_transitions = self.stats.state_transitions.saturating_add(1);
    }

    fn step_data(&mut self, rest: &str, ctx: &mut DocumentParseContext) -> usize {
        match memchr(b'<', rest.as_bytes()) {
            Some(idx) => {
                self.push_text(&rest[..idx]);
                self.flush_text(ctx);
                self.pending_start = self.offset;
                self.pending.push('<');
                self.offset += 1;
                self.transition_to(LexerState::TagOpen);
                idx + 1
            }
            None => {
                self.push_text(rest);
                rest.len()
            }
        }
    }

    /// Only `<` has been seen; decide between a tag and a processing instruction.
    fn step_tag_open(&mut self, rest: &str, ctx: &mut DocumentParseContext) -> usize {
        if self.config.processing_instructions && rest.starts_with('?') {
            self.pending.push('?');
            self.offset += 1;
            self.transition_to(LexerState::ProcessingInstruction);
            return 1;
        }
        self.transition_to(LexerState::Tag);
        self.step_tag(rest, ctx)
    }

    fn step_tag(&mut self, rest: &str, ctx: &mut DocumentParseContext) -> usize {
        let consumed = self.scan_tag(rest);
        if self.pending.ends_with('>') {
            self.emit_tag_lexeme(ctx);
            self.transition_to(LexerState::Data);
        }
        consumed
    }

    /// Move characters up to and including the next `>` into the pending lexeme.
    fn scan_tag(&mut self, rest: &str) -> usize {
        let end = match memchr(b'>', rest.as_bytes()) {
            Some(idx) => idx + 1,
            None => rest.len(),
        };
        self.pending.push_str(&rest[..end]);
        self.offset += end;
        end
    }

    fn step_processing_instruction(
        &mut self,
        rest: &str,
        ctx: &mut DocumentParseContext,
    ) -> usize {
        let consumed = self.scan_tag(rest);
        // `<?>` is still open: the `?` belongs to the opener.
        if self.pending.len() >= PI_OPEN.len() + PI_CLOSE.len() && self.pending.ends_with(PI_CLOSE)
        {
            let lexeme = std::mem::take(&mut self.pending);
            let body = lexeme[PI_OPEN.len()..lexeme.len() - PI_CLOSE.len()].to_string();
            let span = Span::new(self.pending_start, self.offset);
            self.emit_token(Token::ProcessingInstruction { body }, span, ctx);
            self.transition_to(LexerState::Data);
        }
        consumed
    }

    fn emit_tag_lexeme(&mut self, ctx: &mut DocumentParseContext) {
        let lexeme = std::mem::take(&mut self.pending);
        let span = Span::new(self.pending_start, self.offset);
        debug_assert!(lexeme.starts_with('<') && lexeme.ends_with('>'));
        let inner = &lexeme[1..lexeme.len() - 1];

        let token = match inner.strip_prefix('/') {
            Some(body) => {
                let name = tag_name(body);
                (!name.is_empty()).then(|| Token::EndTag {
                    name: name.to_string(),
                })
            }
            None => {
                let (body, self_closing) = match inner.strip_suffix('/') {
                    Some(body) => (body, true),
                    None => (inner, false),
                };
                let name = tag_name(body);
                (!name.is_empty()).then(|| Token::StartTag {
                    name: name.to_string(),
                    self_closing,
                })
            }
        };

        match token {
            Some(token) => self.emit_token(token, span, ctx),
            // A lexeme without a name never reaches the tree.
            None => ctx.record_error(ParseErrorCode::MalformedTag, span.start, Some(lexeme)),
        }
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.text.is_empty() {
            self.text_start = self.offset;
        }
        self.text.push_str(text);
        self.offset += text.len();
    }

    fn flush_text(&mut self, ctx: &mut DocumentParseContext) {
        if self.text.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.text);
        let span = Span::new(self.text_start, self.text_start + text.len());
        self.emit_token(Token::Text { text }, span, ctx);
    }
}

/// Tag name: everything up to the first whitespace or `/`.
///
/// Whatever follows the name before `>` is skipped, never interpreted. A
/// lexeme whose first character is whitespace has no name.
fn tag_name(body: &str) -> &str {
    let end = body
        .find(|ch: char| ch.is_ascii_whitespace() || ch == '/')
        .unwrap_or(body.len());
    &body[..end]
}
