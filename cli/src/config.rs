use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use renderer::CommandRenderer;
use serde::Deserialize;

use crate::logging::LogLevel;

/// Looked up in the current directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "mdrender.toml";

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub render: RenderConfig,
    pub clean: CleanConfig,
    pub log: LogConfig,
    /// Extra external renderers, keyed by language.
    pub renderers: BTreeMap<String, CustomRendererConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub languages: Vec<String>,
    pub output_dir: Option<PathBuf>,
    pub link_prefix: Option<String>,
    /// Seconds before a renderer is killed. 0 disables the timeout.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CleanConfig {
    pub image_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub level: Option<LogLevel>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomRendererConfig {
    pub command: String,
    /// Arguments producing SVG on stdout.
    #[serde(default)]
    pub args: Vec<String>,
    /// Arguments producing PNG on stdout, if supported.
    #[serde(default)]
    pub png_args: Option<Vec<String>>,
}

impl CustomRendererConfig {
    pub fn to_renderer(&self, timeout: Option<Duration>) -> CommandRenderer {
        let renderer = CommandRenderer::new(self.command.clone(), self.args.clone());
        let renderer = match &self.png_args {
            Some(args) => renderer.with_png_args(args.clone()),
            None => renderer,
        };
        renderer.with_timeout(timeout)
    }
}

impl Config {
    pub fn parse(text: &str) -> Result<Config, String> {
        toml::from_str(text).map_err(|e| format!("TOML parse error: {}", e))
    }

    /// Load an explicit config file, or the default one if it exists.
    pub fn load(explicit: Option<&Path>) -> Result<Config, String> {
        let path = match explicit {
            Some(path) => path,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    return Ok(Config::default());
                }
                default
            }
        };
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;
        Config::parse(&text).map_err(|e| format!("{}: {}", path.display(), e))
    }

    /// Renderer timeout: the CLI value wins over the file, 0 means none.
    pub fn timeout(&self, cli_secs: Option<u64>) -> Option<Duration> {
        let secs = cli_secs
            .or(self.render.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        (secs > 0).then(|| Duration::from_secs(secs))
    }
}
