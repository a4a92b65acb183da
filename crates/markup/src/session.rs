//! Parse session: one document, fed increment by increment.
//!
//! Owns the lexer, the tree builder and the shared parse context, and renders
//! a snapshot on demand. One increment is fully lexed and built before the
//! next is accepted.

use crate::dom::Document;
use crate::lexer::{LexResult, Lexer, LexerConfig};
use crate::shared::{Counters, DocumentParseContext, ParseError};
use crate::snapshot::{Snapshot, render};
use crate::tree_builder::{TreeBuilder, TreeBuilderConfig};
use tools::utf8::Utf8Decoder;

#[derive(Clone, Debug, Default)]
pub struct SessionConfig {
    pub lexer: LexerConfig,
    pub builder: TreeBuilderConfig,
}

/// State at end of input.
#[derive(Clone, Debug)]
pub struct FinishReport {
    /// Rendering after the final text run was terminated.
    pub snapshot: Snapshot,
    /// Elements left open, root first.
    pub unclosed: Vec<String>,
    /// Tag lexeme that never saw its `>`, verbatim.
    pub unterminated_lexeme: Option<String>,
    pub errors: Vec<ParseError>,
}

impl FinishReport {
    pub fn is_clean(&self) -> bool {
        self.snapshot.is_finished() && self.errors.is_empty()
    }
}

pub struct ParseSession {
    ctx: DocumentParseContext,
    decoder: Utf8Decoder,
    scratch: String,
    lexer: Lexer,
    builder: TreeBuilder,
}

impl ParseSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            ctx: DocumentParseContext::new(),
            decoder: Utf8Decoder::new(),
            scratch: String::new(),
            lexer: Lexer::new(config.lexer),
            builder: TreeBuilder::new(config.builder),
        }
    }

    /// Feed one increment of text. Empty increments are allowed and change
    /// nothing.
    pub fn push_str(&mut self, chunk: &str) -> LexResult {
        self.ctx.counters.increments = self.ctx.counters.increments.saturating_add(1);
        let result = self.lexer.push_str(chunk, &mut self.ctx);
        self.pump();
        result
    }

    /// Feed one increment of raw bytes. A multi-byte character split across
    /// increments is held back until it is complete.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> LexResult {
        let mut text = std::mem::take(&mut self.scratch);
        text.clear();
        self.decoder.push(bytes, &mut text);
        let result = self.push_str(&text);
        self.scratch = text;
        result
    }

    pub fn snapshot(&self) -> Snapshot {
        render(self.builder.document())
    }

    pub fn is_finished(&self) -> bool {
        self.builder.document().is_finished()
    }

    pub fn document(&self) -> &Document {
        self.builder.document()
    }

    pub fn pending_lexeme(&self) -> Option<&str> {
        self.lexer.pending_lexeme()
    }

    pub fn open_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.builder.open_names()
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.ctx.errors
    }

    pub fn counters(&self) -> &Counters {
        &self.ctx.counters
    }

    /// End of input. Further pushes panic; calling `finish` again is harmless.
    pub fn finish(&mut self) -> FinishReport {
        let mut tail = String::new();
        self.decoder.finish(&mut tail);
        if !tail.is_empty() {
            self.lexer.push_str(&tail, &mut self.ctx);
        }
        let unterminated_lexeme = self.lexer.pending_lexeme().map(str::to_string);
        self.lexer.finish(&mut self.ctx);
        self.pump();
        let position = self.lexer.offset();
        self.builder.finish(&mut self.ctx, position);

        let report = FinishReport {
            snapshot: self.snapshot(),
            unclosed: self.builder.open_names().map(str::to_string).collect(),
            unterminated_lexeme,
            errors: self.ctx.errors.clone(),
        };
        log::debug!(
            target: "markup.session",
            "finished: {} ({} errors, {} unclosed)",
            report.snapshot.status.marker(),
            report.errors.len(),
            report.unclosed.len()
        );
        report
    }

    fn pump(&mut self) {
        let batch = self.lexer.next_batch();
        for (token, span) in batch.iter() {
            self.builder.push_token(token, span, &mut self.ctx);
        }
    }
}
