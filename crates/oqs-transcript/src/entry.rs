use serde::Serialize;

/// One reconstructed record of a serial terminal transcript.
///
/// Structured entries carry the command, its captured output and its exit
/// status. Passthrough entries are lines that did not follow the
/// sentinel-echo convention and are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    command: String,
    output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    return_code: Option<i32>,
    passthrough: bool,
}

impl Entry {
    /// A closed command with its exit status.
    pub fn command(command: impl Into<String>, output: impl Into<String>, return_code: i32) -> Self {
        Self {
            command: command.into(),
            output: output.into(),
            return_code: Some(return_code),
            passthrough: false,
        }
    }

    /// A line kept verbatim, without output or exit status.
    pub fn passthrough(line: impl Into<String>) -> Self {
        Self {
            command: line.into(),
            output: String::new(),
            return_code: None,
            passthrough: true,
        }
    }

    /// Command text, or the raw line for passthrough entries.
    pub fn command_text(&self) -> &str {
        &self.command
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    /// Exit status; `None` for passthrough entries.
    pub fn return_code(&self) -> Option<i32> {
        self.return_code
    }

    pub fn is_passthrough(&self) -> bool {
        self.passthrough
    }

    /// True for structured entries that exited with status 0.
    pub fn succeeded(&self) -> bool {
        self.return_code == Some(0)
    }
}

/// A command whose closing sentinel line has not been seen yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEntry {
    command: String,
    token: String,
    output: String,
    output_lines: usize,
}

impl PendingEntry {
    pub(crate) fn new(command: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            token: token.into(),
            output: String::new(),
            output_lines: 0,
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Sentinel token that closes this entry.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    /// Number of output lines captured so far.
    pub fn output_lines(&self) -> usize {
        self.output_lines
    }

    /// Append one output line. Joins by line count, so leading blank lines
    /// are kept rather than merged into the first non-empty one.
    pub(crate) fn push_output(&mut self, line: &str) {
        if self.output_lines > 0 {
            self.output.push('\n');
        }
        self.output.push_str(line);
        self.output_lines += 1;
    }

    /// Finalize into an [`Entry`]; the token is dropped here.
    pub(crate) fn close(self, return_code: i32) -> Entry {
        Entry::command(self.command, self.output, return_code)
    }
}
