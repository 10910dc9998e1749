//! Display of parsed transcript entries.
//!
//! Rendering takes an explicit [`RenderConfig`]; nothing here reads global
//! state or the environment.

use std::io::{self, Write};

use oqs_transcript::Entry;
use serde::Serialize;

// ── ANSI ──

const ANSI_RED: &str = "\u{1b}[31m";
const ANSI_GREEN: &str = "\u{1b}[32m";
const ANSI_RESET: &str = "\u{1b}[0m";

/// Indent of output lines when command numbers are shown (`"{:6} "`).
const NUMBER_INDENT: &str = "       ";

// ── Config ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Numbered, colored listing for humans.
    #[default]
    Text,
    /// One JSON object per entry and line.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderConfig {
    /// Prefix commands with their index.
    pub numbers: bool,
    /// Green for exit status 0, red otherwise. Text format only.
    pub colors: bool,
    pub format: OutputFormat,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            numbers: true,
            colors: true,
            format: OutputFormat::Text,
        }
    }
}

// ── Rendering ──

/// Write `entries` to `out` according to `config`.
pub fn render<W: Write>(entries: &[Entry], config: &RenderConfig, mut out: W) -> io::Result<()> {
    match config.format {
        OutputFormat::Text => {
            for (i, entry) in entries.iter().enumerate() {
                write_text_entry(&mut out, i, entry, config)?;
            }
        }
        OutputFormat::Json => {
            for (index, entry) in entries.iter().enumerate() {
                serde_json::to_writer(&mut out, &JsonEntry { index, entry })?;
                out.write_all(b"\n")?;
            }
        }
    }
    out.flush()
}

fn write_text_entry<W: Write>(
    out: &mut W,
    index: usize,
    entry: &Entry,
    config: &RenderConfig,
) -> io::Result<()> {
    let color = config.colors && !entry.is_passthrough();
    if color {
        out.write_all(status_color(entry).as_bytes())?;
    }
    if config.numbers {
        write!(out, "{index:6} ")?;
    }
    writeln!(out, "{}", entry.command_text())?;

    if !entry.is_passthrough() {
        for line in entry.output().split('\n') {
            if config.numbers {
                out.write_all(NUMBER_INDENT.as_bytes())?;
            }
            writeln!(out, "{line}")?;
        }
    }
    if color {
        out.write_all(ANSI_RESET.as_bytes())?;
    }
    Ok(())
}

fn status_color(entry: &Entry) -> &'static str {
    if entry.succeeded() {
        ANSI_GREEN
    } else {
        ANSI_RED
    }
}

#[derive(Serialize)]
struct JsonEntry<'a> {
    index: usize,
    #[serde(flatten)]
    entry: &'a Entry,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_to_string(entries: &[Entry], config: RenderConfig) -> String {
        let mut buf = Vec::new();
        render(entries, &config, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn plain() -> RenderConfig {
        RenderConfig {
            numbers: true,
            colors: false,
            format: OutputFormat::Text,
        }
    }

    #[test]
    fn numbered_listing() {
        let entries = vec![
            Entry::passthrough("boot"),
            Entry::command("cat f", "line one\nline two", 2),
        ];
        let out = render_to_string(&entries, plain());
        assert_eq!(
            out,
            "     0 boot\n     1 cat f\n       line one\n       line two\n"
        );
    }

    #[test]
    fn empty_output_prints_one_blank_line() {
        let out = render_to_string(&[Entry::command("ls", "", 0)], plain());
        assert_eq!(out, "     0 ls\n       \n");
    }

    #[test]
    fn without_numbers() {
        let config = RenderConfig {
            numbers: false,
            ..plain()
        };
        let out = render_to_string(&[Entry::command("uname", "Linux", 0)], config);
        assert_eq!(out, "uname\nLinux\n");
    }

    #[test]
    fn colors_follow_exit_status() {
        let config = RenderConfig {
            numbers: false,
            colors: true,
            format: OutputFormat::Text,
        };
        let ok = render_to_string(&[Entry::command("true", "", 0)], config);
        assert_eq!(ok, format!("{ANSI_GREEN}true\n\n{ANSI_RESET}"));

        let failed = render_to_string(&[Entry::command("false", "", 1)], config);
        assert!(failed.starts_with(ANSI_RED));
        assert!(failed.ends_with(ANSI_RESET));
    }

    #[test]
    fn passthrough_is_never_colored() {
        let out = render_to_string(&[Entry::passthrough("login:")], RenderConfig::default());
        assert_eq!(out, "     0 login:\n");
    }

    #[test]
    fn json_lines() {
        let config = RenderConfig {
            format: OutputFormat::Json,
            ..RenderConfig::default()
        };
        let out = render_to_string(
            &[Entry::passthrough("boot"), Entry::command("ls", "a\nb", 0)],
            config,
        );
        let lines: Vec<serde_json::Value> = out
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(
            lines[0],
            serde_json::json!({"index": 0, "command": "boot", "output": "", "passthrough": true})
        );
        assert_eq!(
            lines[1],
            serde_json::json!({"index": 1, "command": "ls", "output": "a\nb", "return_code": 0, "passthrough": false})
        );
        assert!(!out.contains('\u{1b}'));
    }
}
