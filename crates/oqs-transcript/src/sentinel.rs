use std::sync::LazyLock;

use regex::Regex;

use crate::error::ReturnCodeError;

/// `; echo Gi8yV-$?-` as appended by openQA's `script_run` to every command.
static SENTINEL_ECHO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r";[ ]+echo ([a-zA-Z0-9~_]{5})-\$\?-.*").unwrap());

/// A command line carrying the sentinel-echo signature.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Signature<'a> {
    pub command: &'a str,
    pub token: String,
}

/// Match the sentinel-echo signature in `line`.
///
/// Everything before the signature is the command; the echoed token closes it.
pub(crate) fn match_signature(line: &str) -> Option<Signature<'_>> {
    let caps = SENTINEL_ECHO.captures(line)?;
    let whole = caps.get(0)?;
    let token = caps.get(1)?;
    Some(Signature {
        command: line[..whole.start()].trim(),
        token: clean_token(&line[whole.start()..token.end()]),
    })
}

/// Strip leading `;`, surrounding whitespace and the `echo ` keyword.
fn clean_token(fragment: &str) -> String {
    let token = fragment.trim_start_matches(';').trim();
    let token = token.strip_prefix("echo ").unwrap_or(token);
    token.trim().to_string()
}

/// Continuation prompts and heredoc delimiters are never searched for the token.
pub(crate) fn skips_token_search(line: &str) -> bool {
    line.starts_with('>') || line.contains("_EOT") || line.contains("EOT_")
}

/// Decode the `-<digits>-` suffix that follows a matched token.
pub(crate) fn decode_return_code(suffix: &str) -> Result<i32, ReturnCodeError> {
    if suffix.len() < 3 {
        return Err(ReturnCodeError::TooShort);
    }
    let inner = suffix
        .strip_prefix('-')
        .ok_or(ReturnCodeError::MissingPrefix)?
        .strip_suffix('-')
        .ok_or(ReturnCodeError::MissingSuffix)?;
    if !inner.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ReturnCodeError::NotDecimal);
    }
    inner.parse().map_err(|_| ReturnCodeError::OutOfRange)
}
