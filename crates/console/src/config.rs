use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_DOWNLOAD_PATH: &str = "output_download.txt";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct ConsoleConfig {
    pub(crate) backend_url: String,
    pub(crate) download_path: PathBuf,
    pub(crate) color_scheme: ColorScheme,
    pub(crate) form: FormDefaults,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ColorScheme {
    Dark,
    Light,
}

/// Initial values for the run-config form; every save/run rebuilds the
/// `RunConfig` from the live form, so these are starting points only.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct FormDefaults {
    pub(crate) input_file: String,
    pub(crate) output_file: String,
    pub(crate) topk: u32,
    pub(crate) time_range: u32,
    pub(crate) normalize: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            download_path: PathBuf::from(DEFAULT_DOWNLOAD_PATH),
            color_scheme: ColorScheme::Dark,
            form: FormDefaults::default(),
        }
    }
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            input_file: "input/input.txt".to_string(),
            output_file: "output/output.txt".to_string(),
            topk: 10,
            time_range: 5,
            normalize: false,
        }
    }
}

pub(crate) fn load_config(path: Option<&Path>) -> anyhow::Result<ConsoleConfig> {
    let Some(path) = path else {
        return Ok(ConsoleConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: ConsoleConfig = toml::from_str(&raw)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_config_file() {
        let config = load_config(None).expect("defaults");
        assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
        assert_eq!(config.color_scheme, ColorScheme::Dark);
        assert_eq!(config.form.topk, 10);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: ConsoleConfig = toml::from_str(
            r#"
            backend_url = "http://10.0.0.2:9000"
            color_scheme = "light"
            [form]
            time_range = 2
            "#,
        )
        .expect("parse");
        assert_eq!(config.backend_url, "http://10.0.0.2:9000");
        assert_eq!(config.color_scheme, ColorScheme::Light);
        assert_eq!(config.form.time_range, 2);
        assert_eq!(config.form.topk, 10);
    }
}
