//! tagstream: render a live markup stream one increment at a time.
//!
//! Reads increments from stdin (or a file), one per line by default, and
//! writes one `:: FINISHED: ` / `:: UNFINISHED: ` snapshot line per increment.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use markup::{
    DriverConfig, Framing, IncrementDriver, LexerConfig, MismatchPolicy, SessionConfig,
    TreeBuilderConfig,
};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::num::NonZeroUsize;
use std::path::PathBuf;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mismatch {
    /// Keep a mismatched end tag as text. Output is no longer properly nested.
    Literal,
    /// Drop a mismatched end tag.
    Discard,
    /// Close open elements down to the matching one.
    Pop,
}

impl From<Mismatch> for MismatchPolicy {
    fn from(value: Mismatch) -> Self {
        match value {
            Mismatch::Literal => MismatchPolicy::LiteralText,
            Mismatch::Discard => MismatchPolicy::Discard,
            Mismatch::Pop => MismatchPolicy::PopToMatch,
        }
    }
}

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Read increments from this file instead of stdin
    #[arg(long)]
    input: Option<PathBuf>,

    /// Cut input into increments of N bytes instead of lines
    #[arg(long, value_name = "N")]
    chunk_bytes: Option<NonZeroUsize>,

    /// How to treat an end tag that does not match the innermost open element
    #[arg(long, value_enum, default_value_t = Mismatch::Discard)]
    mismatch: Mismatch,

    /// Lex `<?...?>` as an ordinary tag
    #[arg(long = "no-processing-instructions", action = ArgAction::SetTrue)]
    no_processing_instructions: bool,

    /// Print one more snapshot line after end of input
    #[arg(long, action = ArgAction::SetTrue)]
    final_snapshot: bool,

    /// Report parse errors on stderr at end of input
    #[arg(long, action = ArgAction::SetTrue)]
    diagnostics: bool,
}

impl Cli {
    fn driver_config(&self) -> DriverConfig {
        DriverConfig {
            session: SessionConfig {
                lexer: LexerConfig {
                    processing_instructions: !self.no_processing_instructions,
                },
                builder: TreeBuilderConfig {
                    mismatch_policy: self.mismatch.into(),
                },
            },
            framing: self.chunk_bytes.map_or(Framing::Lines, Framing::Bytes),
            final_snapshot: self.final_snapshot,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let input: Box<dyn BufRead> = match &cli.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(io::stdin().lock()),
    };
    let stdout = io::stdout().lock();

    let mut driver = IncrementDriver::new(cli.driver_config());
    let report = driver
        .run(input, stdout)
        .context("failed to stream snapshots")?;

    if cli.diagnostics {
        for error in &report.errors {
            eprintln!("error: {error}");
        }
        if let Some(lexeme) = &report.unterminated_lexeme {
            eprintln!("note: dropped unterminated lexeme {lexeme:?}");
        }
        if !report.unclosed.is_empty() {
            eprintln!("note: still open at end of input: {}", report.unclosed.join(" > "));
        }
        eprintln!(
            "{} with {} parse errors",
            report.snapshot.status.marker(),
            report.errors.len()
        );
    }
    Ok(())
}
