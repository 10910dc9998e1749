use std::io;

use thiserror::Error;

use crate::Entry;

/// Why the text after a matched sentinel token is not a `-<digits>-` suffix.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReturnCodeError {
    #[error("return code suffix is too short")]
    TooShort,

    #[error("return code suffix does not start with '-'")]
    MissingPrefix,

    #[error("return code suffix does not end with '-'")]
    MissingSuffix,

    #[error("exit status is not a decimal number")]
    NotDecimal,

    #[error("exit status is out of range")]
    OutOfRange,
}

/// Parser error. A matched sentinel without a decodable exit status is the
/// only malformed input that aborts parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: invalid return code {suffix:?} after token {token}: {reason}")]
    ReturnCode {
        /// 1-based input line number of the sentinel line.
        line: usize,
        token: String,
        suffix: String,
        reason: ReturnCodeError,
    },
}

/// A failed parse, together with every entry closed before the failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{error}")]
pub struct ParseFailure {
    pub entries: Vec<Entry>,
    pub error: ParseError,
}

/// Failure of [`crate::parse_reader`].
#[derive(Error, Debug)]
pub enum ReadFailure {
    #[error("I/O error after line {line}")]
    Io {
        line: usize,
        source: io::Error,
        entries: Vec<Entry>,
    },

    #[error(transparent)]
    Parse(#[from] ParseFailure),
}

impl ReadFailure {
    /// Entries closed before the failure.
    pub fn entries(&self) -> &[Entry] {
        match self {
            ReadFailure::Io { entries, .. } => entries,
            ReadFailure::Parse(failure) => &failure.entries,
        }
    }

    pub fn into_entries(self) -> Vec<Entry> {
        match self {
            ReadFailure::Io { entries, .. } => entries,
            ReadFailure::Parse(failure) => failure.entries,
        }
    }
}
