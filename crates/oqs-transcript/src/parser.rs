use std::io::BufRead;

use crate::entry::{Entry, PendingEntry};
use crate::error::{ParseError, ParseFailure, ReadFailure};
use crate::sentinel;

// ── State Machine ──

/// Parser state between two input lines.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum State {
    /// Looking for the next command line.
    #[default]
    SeekCommand,
    /// Accumulating output until a line containing the pending token appears.
    AwaitSentinel(PendingEntry),
}

/// Streaming transcript parser, fed one line at a time.
///
/// After [`Parser::feed`] returns an error the transcript is considered
/// corrupt and the parser should not be fed further.
#[derive(Debug, Default)]
pub struct Parser {
    state: State,
    line: usize,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Number of lines fed so far.
    pub fn lines_seen(&self) -> usize {
        self.line
    }

    /// Consume one line. Returns the entry it closed, if any.
    pub fn feed(&mut self, line: &str) -> Result<Option<Entry>, ParseError> {
        self.line += 1;
        let line = line.trim_end_matches(['\n', '\r']);

        match std::mem::take(&mut self.state) {
            State::SeekCommand => Ok(self.seek_command(line)),
            State::AwaitSentinel(pending) => self.await_sentinel(pending, line),
        }
    }

    fn seek_command(&mut self, line: &str) -> Option<Entry> {
        match sentinel::match_signature(line) {
            Some(sig) => {
                tracing::trace!(line = self.line, token = %sig.token, command = sig.command, "command opened");
                self.state = State::AwaitSentinel(PendingEntry::new(sig.command, sig.token));
                None
            }
            None => Some(Entry::passthrough(line)),
        }
    }

    fn await_sentinel(
        &mut self,
        mut pending: PendingEntry,
        line: &str,
    ) -> Result<Option<Entry>, ParseError> {
        let found = if sentinel::skips_token_search(line) {
            None
        } else {
            line.find(pending.token())
        };

        let Some(i) = found else {
            pending.push_output(line);
            self.state = State::AwaitSentinel(pending);
            return Ok(None);
        };

        let suffix = line[i + pending.token().len()..].trim();
        match sentinel::decode_return_code(suffix) {
            Ok(code) => {
                tracing::trace!(line = self.line, token = pending.token(), code, "command closed");
                Ok(Some(pending.close(code)))
            }
            Err(reason) => {
                let err = ParseError::ReturnCode {
                    line: self.line,
                    token: pending.token().to_string(),
                    suffix: suffix.to_string(),
                    reason,
                };
                self.state = State::AwaitSentinel(pending);
                Err(err)
            }
        }
    }

    /// End of stream. Returns the unterminated entry, which is never emitted.
    pub fn finish(self) -> Option<PendingEntry> {
        match self.state {
            State::SeekCommand => None,
            State::AwaitSentinel(pending) => {
                tracing::debug!(
                    command = pending.command(),
                    output_lines = pending.output_lines(),
                    "transcript ends inside a command, dropping it"
                );
                Some(pending)
            }
        }
    }
}

// ── Whole-Transcript Helpers ──

/// Parse a complete sequence of lines.
///
/// On a return-code decode error, the entries closed before the offending
/// line are returned inside the [`ParseFailure`].
pub fn parse<I>(lines: I) -> Result<Vec<Entry>, ParseFailure>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut parser = Parser::new();
    let mut entries = Vec::new();
    for line in lines {
        match parser.feed(line.as_ref()) {
            Ok(Some(entry)) => entries.push(entry),
            Ok(None) => {}
            Err(error) => return Err(ParseFailure { entries, error }),
        }
    }
    parser.finish();
    Ok(entries)
}

/// Parse a transcript from a reader, splitting on `\n` and tolerating
/// invalid UTF-8 (replaced lossily).
pub fn parse_reader<R: BufRead>(mut reader: R) -> Result<Vec<Entry>, ReadFailure> {
    let mut parser = Parser::new();
    let mut entries = Vec::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(source) => {
                return Err(ReadFailure::Io {
                    line: parser.lines_seen(),
                    source,
                    entries,
                })
            }
        }
        let line = String::from_utf8_lossy(&buf);
        match parser.feed(&line) {
            Ok(Some(entry)) => entries.push(entry),
            Ok(None) => {}
            Err(error) => return Err(ParseFailure { entries, error }.into()),
        }
    }
    let lines = parser.lines_seen();
    parser.finish();
    tracing::debug!(entries = entries.len(), lines, "transcript parsed");
    Ok(entries)
}
