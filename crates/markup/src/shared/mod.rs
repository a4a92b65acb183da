//! Types shared by the lexer, tree builder and session.
//!
//! The module itself is private; consumers import these through the crate root.

mod context;
mod counters;
mod error;
mod span;
mod token;

pub use context::DocumentParseContext;
pub use counters::Counters;
pub use error::{ParseError, ParseErrorCode};
pub use span::Span;
pub use token::Token;
