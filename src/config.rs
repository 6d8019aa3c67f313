//! Settings for the model backend and the terminal surface.
//!
//! Resolution order: built-in defaults, then `franky.toml` (or the file named
//! by `--config` / `FRANKY_CONFIG`), then environment variables.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use crate::types::GuideMode;

pub(crate) const DEFAULT_CONFIG_FILENAME: &str = "franky.toml";
pub(crate) const ENV_CONFIG_FILE: &str = "FRANKY_CONFIG";
const ENV_BASE_URL: &str = "ANTHROPIC_BASE_URL";
const ENV_API_KEY: &str = "ANTHROPIC_AUTH_TOKEN";
const ENV_MODEL: &str = "ANTHROPIC_DEFAULT_SONNET_MODEL";
const ENV_TIMEOUT_MS: &str = "API_TIMEOUT_MS";
const ENV_PROXY: &str = "HTTP_PROXY";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    pub base_url: String,
    /// Only required once the HTTP backend is built.
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    /// Whole-request timeout; none means the client never gives up.
    pub timeout_ms: Option<u64>,
    pub proxy: Option<String>,
    /// `"steps"` or `"tree"`.
    pub mode: String,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://api.anthropic.com".to_string(),
            api_key: None,
            model: "claude-sonnet-4-5".to_string(),
            max_tokens: 4096,
            timeout_ms: None,
            proxy: None,
            mode: GuideMode::Steps.as_str().to_string(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load from an explicit file (must exist) or from the default file in
    /// the working directory (optional), then apply environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let from_env = std::env::var(ENV_CONFIG_FILE).ok().map(PathBuf::from);
        let text = match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => Some(
                fs::read_to_string(&path)
                    .with_context(|| format!("read config {}", path.display()))?,
            ),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILENAME);
                if path.exists() {
                    Some(
                        fs::read_to_string(path)
                            .with_context(|| format!("read config {}", path.display()))?,
                    )
                } else {
                    None
                }
            }
        };
        Self::from_sources(text.as_deref(), |key| std::env::var(key).ok())
    }

    pub fn from_sources(
        toml_text: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let mut cfg: Config = match toml_text {
            Some(text) => toml::from_str(text).context("parse config TOML")?,
            None => Config::default(),
        };

        if let Some(url) = env(ENV_BASE_URL) {
            cfg.base_url = url;
        }
        if let Some(key) = env(ENV_API_KEY) {
            cfg.api_key = Some(key);
        }
        if let Some(model) = env(ENV_MODEL) {
            cfg.model = model;
        }
        if let Some(ms) = env(ENV_TIMEOUT_MS).and_then(|v| v.parse::<u64>().ok()) {
            cfg.timeout_ms = Some(ms);
        }
        if let Some(proxy) = env(ENV_PROXY) {
            cfg.proxy = Some(proxy);
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_tokens == 0 {
            return Err(anyhow!("max_tokens must be > 0"));
        }
        if self.base_url.trim().is_empty() {
            return Err(anyhow!("base_url must not be empty"));
        }
        self.guide_mode()?;
        Ok(())
    }

    pub fn guide_mode(&self) -> Result<GuideMode> {
        match self.mode.as_str() {
            "steps" => Ok(GuideMode::Steps),
            "tree" => Ok(GuideMode::Tree),
            other => Err(anyhow!("mode must be \"steps\" or \"tree\", got {other:?}")),
        }
    }

    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .with_context(|| format!("{ENV_API_KEY} env var not set"))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::Config;
    use crate::types::GuideMode;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_file_or_env() {
        let cfg = Config::from_sources(None, env_of(&[])).expect("defaults");
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.guide_mode().unwrap(), GuideMode::Steps);
        assert!(cfg.require_api_key().is_err());
    }

    #[test]
    fn file_values_are_overridden_by_env() {
        let toml = r#"
            model = "from-file"
            max_tokens = 1024
            mode = "tree"
        "#;
        let env = env_of(&[
            ("ANTHROPIC_DEFAULT_SONNET_MODEL", "from-env"),
            ("ANTHROPIC_AUTH_TOKEN", "secret"),
            ("API_TIMEOUT_MS", "30000"),
        ]);
        let cfg = Config::from_sources(Some(toml), env).expect("config");
        assert_eq!(cfg.model, "from-env");
        assert_eq!(cfg.max_tokens, 1024);
        assert_eq!(cfg.timeout_ms, Some(30_000));
        assert_eq!(cfg.guide_mode().unwrap(), GuideMode::Tree);
        assert_eq!(cfg.require_api_key().unwrap(), "secret");
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(Config::from_sources(Some("max_tokens = 0"), env_of(&[])).is_err());
        assert!(Config::from_sources(Some("mode = \"outline\""), env_of(&[])).is_err());
        assert!(Config::from_sources(Some("not toml ="), env_of(&[])).is_err());
    }

    #[test]
    fn unparsable_timeout_env_is_ignored() {
        let cfg = Config::from_sources(None, env_of(&[("API_TIMEOUT_MS", "soon")]))
            .expect("config");
        assert_eq!(cfg.timeout_ms, None);
    }

    #[test]
    fn explicit_file_is_loaded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "model = \"custom\"\n").expect("write");
        let cfg = Config::load(Some(&path)).expect("load");
        assert_eq!(cfg.max_tokens, 4096);
        assert!(!cfg.model.is_empty());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(Config::load(Some(&dir.path().join("absent.toml"))).is_err());
    }
}
