//! Increment driver.
//!
//! Reads increments from a byte source, feeds each to a [`ParseSession`] and
//! writes exactly one snapshot line per increment. Output is flushed after
//! every line so an interactive peer sees it before sending the next
//! increment.

use crate::session::{FinishReport, ParseSession, SessionConfig};
use std::io::{self, BufRead, Write};
use std::num::NonZeroUsize;
use thiserror::Error;

/// How the input stream is cut into increments.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Framing {
    /// One increment per line; the `\n` or `\r\n` terminator is not part of it.
    #[default]
    Lines,
    /// Increments of at most this many bytes, split wherever they fall.
    Bytes(NonZeroUsize),
}

#[derive(Clone, Debug, Default)]
pub struct DriverConfig {
    pub session: SessionConfig,
    pub framing: Framing,
    /// Write one more line with the state after end of input.
    pub final_snapshot: bool,
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("failed to read increment {index}")]
    Read {
        index: u64,
        #[source]
        source: io::Error,
    },
    #[error("failed to write snapshot for increment {index}")]
    Write {
        index: u64,
        #[source]
        source: io::Error,
    },
}

pub struct IncrementDriver {
    config: DriverConfig,
}

impl IncrementDriver {
    pub fn new(config: DriverConfig) -> Self {
        Self { config }
    }

    /// Drive one session to end of input (a zero-length read).
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        mut input: R,
        mut output: W,
    ) -> Result<FinishReport, DriverError> {
        let mut session = ParseSession::new(self.config.session.clone());
        let mut buf = Vec::new();
        let mut index: u64 = 0;

        loop {
            buf.clear();
            let read = read_increment(&mut input, &mut buf, self.config.framing)
                .map_err(|source| DriverError::Read { index, source })?;
            if read == 0 {
                break;
            }
            session.push_bytes(&buf);
            let snapshot = session.snapshot();
            log::debug!(
                target: "markup.driver",
                "increment {index}: {} bytes -> {}",
                buf.len(),
                snapshot.status.marker()
            );
            write_line(&mut output, &snapshot)
                .map_err(|source| DriverError::Write { index, source })?;
            index += 1;
        }

        let report = session.finish();
        if self.config.final_snapshot {
            write_line(&mut output, &report.snapshot)
                .map_err(|source| DriverError::Write { index, source })?;
        }

        if report.errors.is_empty() {
            log::info!(
                target: "markup.driver",
                "end of input after {index} increments: {}",
                report.snapshot.status.marker()
            );
        } else {
            log::warn!(
                target: "markup.driver",
                "end of input after {index} increments: {} with {} parse errors",
                report.snapshot.status.marker(),
                report.errors.len()
            );
        }
        Ok(report)
    }
}

/// Read one increment into `buf`. Returns the number of bytes consumed from
/// the source, which is zero only at end of input.
fn read_increment<R: BufRead>(input: &mut R, buf: &mut Vec<u8>, framing: Framing) -> io::Result<usize> {
    match framing {
        Framing::Lines => {
            let read = input.read_until(b'\n', buf)?;
            if buf.last() == Some(&b'\n') {
                buf.pop();
                if buf.last() == Some(&b'\r') {
                    buf.pop();
                }
            }
            Ok(read)
        }
        Framing::Bytes(limit) => {
            let available = loop {
                match input.fill_buf() {
                    Ok(available) => break available,
                    Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                    Err(err) => return Err(err),
                }
            };
            let take = available.len().min(limit.get());
            buf.extend_from_slice(&available[..take]);
            input.consume(take);
            Ok(take)
        }
    }
}

fn write_line<W: Write>(output: &mut W, line: &impl std::fmt::Display) -> io::Result<()> {
    writeln!(output, "{line}")?;
    output.flush()
}
