use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// openQA asset holding the serial terminal transcript of a job.
pub const SERIAL_TERMINAL_ASSET: &str = "serial_terminal.txt";

/// Default HTTP timeout for fetching a transcript.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ── Errors ──

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("{}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("{url}")]
    Http { url: String, source: Box<ureq::Error> },

    #[error("{url}: http status code {status}")]
    Status { url: String, status: u16 },
}

impl SourceError {
    /// True for failures talking to a remote server.
    pub fn is_http(&self) -> bool {
        matches!(self, SourceError::Http { .. } | SourceError::Status { .. })
    }
}

// ── Input ──

/// Where a transcript comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    File(PathBuf),
    Stdin,
    /// Normalized URL of the transcript asset.
    Url(String),
}

/// Options for remote inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Input {
    /// Classify a command-line input argument.
    ///
    /// `-` is stdin, anything with `://` is a URL, the rest is a file path.
    /// Links to an openQA job (with or without a `#tab` fragment) resolve to
    /// the job's serial terminal asset.
    pub fn parse(arg: &str) -> Self {
        if arg == "-" {
            Input::Stdin
        } else if arg.contains("://") {
            Input::Url(asset_url(arg))
        } else {
            Input::File(PathBuf::from(arg))
        }
    }

    /// Open the input for line-wise reading.
    pub fn open(&self, opts: &FetchOptions) -> Result<Box<dyn BufRead>, SourceError> {
        match self {
            Input::File(path) => {
                let file = File::open(path).map_err(|source| SourceError::Io {
                    path: path.clone(),
                    source,
                })?;
                tracing::debug!(path = %path.display(), "reading transcript file");
                Ok(Box::new(BufReader::new(file)))
            }
            Input::Stdin => Ok(Box::new(io::stdin().lock())),
            Input::Url(url) => fetch(url, opts),
        }
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::File(path) => write!(f, "{}", path.display()),
            Input::Stdin => f.write_str("<stdin>"),
            Input::Url(url) => f.write_str(url),
        }
    }
}

/// Drop the `#fragment` and point at the serial terminal asset unless the
/// URL already names a file of the job.
fn asset_url(url: &str) -> String {
    let url = match url.find('#') {
        Some(i) if i > 0 => &url[..i],
        _ => url,
    };
    if url.contains("/file/") {
        url.to_string()
    } else {
        format!("{}/file/{SERIAL_TERMINAL_ASSET}", url.trim_end_matches('/'))
    }
}

// ── HTTP ──

fn fetch(url: &str, opts: &FetchOptions) -> Result<Box<dyn BufRead>, SourceError> {
    tracing::info!(%url, timeout_secs = opts.timeout.as_secs(), "fetching transcript");
    let agent = ureq::Agent::config_builder()
        .timeout_global(Some(opts.timeout))
        .http_status_as_error(false)
        .build()
        .new_agent();
    let response = agent.get(url).call().map_err(|e| SourceError::Http {
        url: url.to_string(),
        source: Box::new(e),
    })?;

    let status = response.status().as_u16();
    if status != 200 {
        return Err(SourceError::Status {
            url: url.to_string(),
            status,
        });
    }
    Ok(Box::new(BufReader::new(response.into_body().into_reader())))
}
