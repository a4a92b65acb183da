//! Deterministic token formatting for golden tests and diagnostics.

use crate::shared::Token;

/// One line per token, stable across releases.
pub fn format_token(token: &Token) -> String {
    match token {
        Token::StartTag { name, self_closing } => {
            format!("START name={name} self_closing={self_closing}")
        }
        Token::EndTag { name } => format!("END name={name}"),
        Token::Text { text } => format!("TEXT text=\"{}\"", escape_text(text)),
        Token::ProcessingInstruction { body } => format!("PI body=\"{}\"", escape_text(body)),
    }
}

/// Escape control characters, quotes and backslashes so a token fits on one line.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{{{:04X}}}", c as u32)),
            c => out.push(c),
        }
    }
    out
}
