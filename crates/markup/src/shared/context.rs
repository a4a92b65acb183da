//! Document-level parse context (shared resources).

use super::{Counters, ParseError, ParseErrorCode};

/// Document-level parse context shared by the lexer and tree builder.
///
/// Owns session-lifetime bookkeeping: counters and the recorded parse errors.
#[derive(Debug, Default)]
pub struct DocumentParseContext {
    pub counters: Counters,
    pub errors: Vec<ParseError>,
}

impl DocumentParseContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_error(
        &mut self,
        code: ParseErrorCode,
        position: usize,
        detail: Option<String>,
    ) {
        log::debug!(
            target: "markup.errors",
            "parse error {code} at byte {position} ({detail:?})"
        );
        self.counters.parse_errors = self.counters.parse_errors.saturating_add(1);
        self.errors.push(ParseError {
            code,
            position,
            detail,
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
