mod cmd_read;
mod config;
mod logging;

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use oqs_render::{OutputFormat, RenderConfig};
use oqs_source::{FetchOptions, Input, SourceError};
use oqs_transcript::{ParseFailure, ReadFailure};

use crate::cmd_read::ReadParams;
use crate::config::Settings;

/// Bad arguments, unreadable input, HTTP failure.
const EXIT_INPUT: u8 = 1;
/// Transcript with an undecodable return code.
const EXIT_PARSE: u8 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "openqa-serial",
    version,
    about = "openQA serial terminal reader",
    long_about = "Small helper to make the serial terminal better readable.\n\n\
                  INPUT supports links to openQA jobs and file names. You can point to any \
                  openQA job or the serial_terminal.txt (or any other) asset file therein. \
                  Use `-` to read from stdin."
)]
struct Cli {
    /// openQA job URL, asset URL, transcript file, or `-` for stdin
    input: String,
    /// Don't display command numbers
    #[arg(short = 'n', long = "no-numbers", alias = "nonumbers")]
    no_numbers: bool,
    /// Don't color commands by exit status
    #[arg(long)]
    no_color: bool,
    /// Output as JSON lines (one entry per line)
    #[arg(long)]
    json: bool,
    /// HTTP timeout in seconds for URL inputs
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
}

impl Cli {
    /// Flags take precedence over config file and environment.
    fn read_params(&self, settings: &Settings) -> anyhow::Result<ReadParams> {
        if self.input.is_empty() {
            anyhow::bail!("no input given");
        }
        let timeout = self
            .timeout
            .map(Duration::from_secs)
            .unwrap_or_else(|| settings.timeout());
        Ok(ReadParams {
            input: Input::parse(&self.input),
            fetch: FetchOptions { timeout },
            render: RenderConfig {
                numbers: settings.numbers && !self.no_numbers,
                colors: settings.colors && !self.no_color,
                format: if self.json {
                    OutputFormat::Json
                } else {
                    OutputFormat::Text
                },
            },
        })
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help / --version
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            // nothing left to report to if stderr is gone
            e.print().ok();
            return ExitCode::from(EXIT_INPUT);
        }
    };
    logging::init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let (code, prefix) = classify(&err);
            eprintln!("{prefix}: {err:#}");
            ExitCode::from(code)
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let settings = Settings::load()?;
    let params = cli.read_params(&settings)?;
    cmd_read::execute(&params, std::io::stdout().lock())
}

/// Exit status and message prefix for a failed run.
fn classify(err: &anyhow::Error) -> (u8, &'static str) {
    if err.is::<ParseFailure>() {
        return (EXIT_PARSE, "parse error");
    }
    match err.downcast_ref::<SourceError>() {
        Some(e) if e.is_http() => (EXIT_INPUT, "http error"),
        Some(_) => (EXIT_INPUT, "error reading"),
        None if err.is::<ReadFailure>() => (EXIT_INPUT, "error reading"),
        None => (EXIT_INPUT, "error"),
    }
}
