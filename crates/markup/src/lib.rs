//! Streaming parser and renderer for a small nested-tag markup.
//!
//! Input arrives in increments of any size. After each one the current
//! document can be rendered as a well-formed snapshot in which every element
//! still open is closed virtually.
//!
//! ```
//! use markup::{ParseSession, SessionConfig};
//!
//! let mut session = ParseSession::new(SessionConfig::default());
//! session.push_str("<foo><bar>Bar");
//! assert_eq!(
//!     session.snapshot().to_string(),
//!     ":: UNFINISHED: <foo><bar>Bar</bar></foo>"
//! );
//! session.push_str("</bar></fo");
//! session.push_str("o>");
//! assert!(session.is_finished());
//! ```

pub mod chunker;
pub mod dom;
pub mod driver;
pub mod lexer;
pub mod session;
pub mod snapshot;
pub mod tree_builder;

mod shared;

#[cfg(test)]
mod streaming_parity;

pub use dom::{Document, Element, Node, NodeKey, TextRun};
pub use driver::{DriverConfig, DriverError, Framing, IncrementDriver};
pub use lexer::{LexResult, Lexer, LexerConfig, LexerStats, TokenBatch};
pub use session::{FinishReport, ParseSession, SessionConfig};
pub use shared::{Counters, DocumentParseContext, ParseError, ParseErrorCode, Span, Token};
pub use snapshot::{Snapshot, SnapshotStatus, is_well_formed, render};
pub use tree_builder::{MismatchPolicy, TreeBuilder, TreeBuilderConfig, TreeBuilderStep};
