//! Token emission helpers.

use crate::lexer::Lexer;
use crate::shared::{DocumentParseContext, Span, Token};

impl Lexer {
    pub(super) fn emit_token(&mut self, token: Token, span: Span, ctx: &mut DocumentParseContext) {
        #[cfg(any(test, feature = "debug-stats"))]
        log::trace!(target: "markup.lexer", "emit token: {token:?} @{}..{}", span.start, span.end);
        self.tokens.push((token, span));
        self.stats.tokens_emitted = self.stats.tokens_emitted.saturating_add(1);
        ctx.counters.tokens_emitted = ctx.counters.tokens_emitted.saturating_add(1);
    }
}
