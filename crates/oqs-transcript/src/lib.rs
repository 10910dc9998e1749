//! Reconstructs commands, their output and exit status from an openQA
//! serial terminal transcript.
//!
//! openQA's `script_run` appends `; echo <token>-$?-` to every command it
//! types on the serial console. The shell then prints `<token>-<status>-`
//! once the command finishes, which is what closes an [`Entry`].

mod entry;
mod error;
mod parser;
mod sentinel;

pub use entry::{Entry, PendingEntry};
pub use error::{ParseError, ParseFailure, ReadFailure, ReturnCodeError};
pub use parser::{parse, parse_reader, Parser, State};
