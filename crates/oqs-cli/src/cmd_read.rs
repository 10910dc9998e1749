use std::io::{self, Write};

use oqs_render::RenderConfig;
use oqs_source::{FetchOptions, Input};
use oqs_transcript::{Entry, ReadFailure};

pub struct ReadParams {
    pub input: Input,
    pub fetch: FetchOptions,
    pub render: RenderConfig,
}

/// `openqa-serial <INPUT>`
///
/// On a return-code decode error the entries closed before it are still
/// written, then the [`oqs_transcript::ParseFailure`] is returned.
pub fn execute<W: Write>(params: &ReadParams, out: W) -> anyhow::Result<()> {
    let reader = params.input.open(&params.fetch)?;
    tracing::debug!(input = %params.input, "parsing transcript");

    match oqs_transcript::parse_reader(reader) {
        Ok(entries) => write_entries(&entries, &params.render, out),
        Err(ReadFailure::Parse(failure)) => {
            write_entries(&failure.entries, &params.render, out)?;
            Err(failure.into())
        }
        Err(err @ ReadFailure::Io { .. }) => Err(err.into()),
    }
}

fn write_entries<W: Write>(entries: &[Entry], config: &RenderConfig, out: W) -> anyhow::Result<()> {
    match oqs_render::render(entries, config, out) {
        // reader went away (`| head`)
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => Ok(other?),
    }
}
