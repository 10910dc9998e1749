use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

/// Env var naming an explicit config file.
pub const CONFIG_ENV: &str = "OPENQA_SERIAL_CONFIG";

/// Display and fetch defaults, layered: built-ins, config file, env, CLI flags.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub numbers: bool,
    pub colors: bool,
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            numbers: true,
            colors: true,
            timeout_secs: oqs_source::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl Settings {
    /// Load from the config file and the process environment.
    pub fn load() -> anyhow::Result<Self> {
        let lookup = |key: &str| std::env::var(key).ok();
        let mut settings = match config_path(lookup) {
            Some(path) => Self::load_file(&path)?,
            None => Self::default(),
        };
        settings.apply_env(lookup)?;
        Ok(settings)
    }

    /// Read a JSON config file. A missing file yields the defaults.
    pub fn load_file(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let settings = serde_json::from_str(&content)
            .with_context(|| format!("invalid config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(settings)
    }

    /// Override from `OPENQA_SERIAL_*` variables and `NO_COLOR`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(v) = lookup("OPENQA_SERIAL_NUMBERS") {
            self.numbers = parse_bool("OPENQA_SERIAL_NUMBERS", &v)?;
        }
        if let Some(v) = lookup("OPENQA_SERIAL_COLORS") {
            self.colors = parse_bool("OPENQA_SERIAL_COLORS", &v)?;
        }
        if let Some(v) = lookup("OPENQA_SERIAL_TIMEOUT") {
            self.timeout_secs = v
                .trim()
                .parse()
                .with_context(|| format!("OPENQA_SERIAL_TIMEOUT: not a number of seconds: {v}"))?;
        }
        // https://no-color.org
        if lookup("NO_COLOR").is_some_and(|v| !v.is_empty()) {
            self.colors = false;
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `$OPENQA_SERIAL_CONFIG`, else `<config dir>/openqa-serial/config.json`.
fn config_path(lookup: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    match lookup(CONFIG_ENV) {
        Some(p) if !p.is_empty() => Some(PathBuf::from(p)),
        _ => dirs::config_dir().map(|d| d.join("openqa-serial").join("config.json")),
    }
}

fn parse_bool(key: &str, value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => anyhow::bail!("{key}: expected true/false, got {value:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert!(s.numbers);
        assert!(s.colors);
        assert_eq!(s.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn load_missing_file_returns_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let s = Settings::load_file(&tmp.path().join("config.json")).unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn load_partial_file_keeps_other_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, r#"{"numbers": false, "unknown_key": 1}"#).unwrap();
        let s = Settings::load_file(&path).unwrap();
        assert!(!s.numbers);
        assert!(s.colors);
        assert_eq!(s.timeout_secs, 30);
    }

    #[test]
    fn load_malformed_file_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = Settings::load_file(&path).unwrap_err();
        assert!(err.to_string().contains("invalid config"));
    }

    #[test]
    fn env_overrides_file() {
        let mut s = Settings {
            numbers: false,
            colors: true,
            timeout_secs: 5,
        };
        s.apply_env(env(&[
            ("OPENQA_SERIAL_NUMBERS", "yes"),
            ("OPENQA_SERIAL_COLORS", "0"),
            ("OPENQA_SERIAL_TIMEOUT", "120"),
        ]))
        .unwrap();
        assert!(s.numbers);
        assert!(!s.colors);
        assert_eq!(s.timeout_secs, 120);
    }

    #[test]
    fn no_color_disables_colors() {
        let mut s = Settings::default();
        s.apply_env(env(&[("NO_COLOR", "1")])).unwrap();
        assert!(!s.colors);

        let mut s = Settings::default();
        s.apply_env(env(&[("NO_COLOR", "")])).unwrap();
        assert!(s.colors);
    }

    #[test]
    fn bad_env_values_are_errors() {
        let mut s = Settings::default();
        assert!(s.apply_env(env(&[("OPENQA_SERIAL_COLORS", "maybe")])).is_err());
        assert!(s.apply_env(env(&[("OPENQA_SERIAL_TIMEOUT", "soon")])).is_err());
    }

    #[test]
    fn config_path_prefers_env() {
        let path = config_path(env(&[(CONFIG_ENV, "/etc/oqs.json")]));
        assert_eq!(path, Some(PathBuf::from("/etc/oqs.json")));
    }
}
