//! Server configuration: an optional TOML file overlaid with environment
//! variables.
//!
//! ```toml
//! bind = "0.0.0.0:8000"
//! database_url = "sqlite:arena.db"
//! default_engine = "openai"
//!
//! [openai]
//! base_url = "https://api.openai.com"
//!
//! [pipeline.decoding]
//! timeout_ms = 15000
//!
//! [pipeline.engines]
//! openai = [{ provider = "openai", model = "gpt-4o-mini" }]
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use llm_engine::{GeminiProvider, MovePipeline, OpenAiProvider, PipelineConfig};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("default engine `{0}` has no chain in [pipeline.engines]")]
    UnknownDefaultEngine(String),
}

/// Credentials and endpoint for one hosted provider.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub bind: String,
    pub database_url: String,
    /// Engine used when neither the request nor the game names one.
    pub default_engine: String,
    pub openai: ProviderSettings,
    pub gemini: ProviderSettings,
    pub pipeline: PipelineConfig,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            database_url: "sqlite:arena.db".to_string(),
            default_engine: "random".to_string(),
            openai: ProviderSettings::default(),
            gemini: ProviderSettings::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl ArenaConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: ArenaConfig = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reads `path` if it exists, defaults otherwise.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Overrides file values with `DATABASE_URL`, `ARENA_BIND` and the
    /// provider key and base-url variables.
    pub fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |slot: &mut String, key: &str| {
            if let Some(v) = var(key) {
                *slot = v;
            }
        };
        set(&mut self.database_url, "DATABASE_URL");
        set(&mut self.bind, "ARENA_BIND");

        let set_opt = |slot: &mut Option<String>, key: &str| {
            if let Some(v) = var(key).filter(|v| !v.trim().is_empty()) {
                *slot = Some(v);
            }
        };
        set_opt(&mut self.openai.api_key, "OPENAI_API_KEY");
        set_opt(&mut self.openai.base_url, "OPENAI_BASE_URL");
        set_opt(&mut self.gemini.api_key, "GEMINI_API_KEY");
        set_opt(&mut self.gemini.base_url, "GEMINI_BASE_URL");
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.pipeline.chain(&self.default_engine).is_none() {
            return Err(ConfigError::UnknownDefaultEngine(
                self.default_engine.clone(),
            ));
        }
        Ok(())
    }

    /// Builds the pipeline with a provider for every configured API key.
    pub fn build_pipeline(&self) -> MovePipeline {
        let mut pipeline = MovePipeline::new(self.pipeline.clone());

        match &self.openai.api_key {
            Some(key) => {
                let mut provider = OpenAiProvider::new(key.clone());
                if let Some(url) = &self.openai.base_url {
                    provider = provider.with_base_url(url.clone());
                }
                pipeline = pipeline.with_provider(Arc::new(provider));
            }
            None => warn!("OPENAI_API_KEY not set, openai entries will be skipped"),
        }
        match &self.gemini.api_key {
            Some(key) => {
                let mut provider = GeminiProvider::new(key.clone());
                if let Some(url) = &self.gemini.base_url {
                    provider = provider.with_base_url(url.clone());
                }
                pipeline = pipeline.with_provider(Arc::new(provider));
            }
            None => warn!("GEMINI_API_KEY not set, gemini entries will be skipped"),
        }
        pipeline
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use llm_engine::ProviderKind;

    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = ArenaConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, ArenaConfig::default());
        assert!(cfg.pipeline.chain("random").is_some());
    }

    #[test]
    fn file_values_and_pipeline_table() {
        let cfg = ArenaConfig::from_toml_str(
            r#"
            bind = "0.0.0.0:9000"
            default_engine = "fast"

            [pipeline.decoding]
            timeout_ms = 5000

            [pipeline.engines]
            fast = [{ provider = "gemini", model = "gemini-1.5-flash" }]
            "#,
        )
        .unwrap();
        assert_eq!(cfg.bind, "0.0.0.0:9000");
        assert_eq!(cfg.pipeline.decoding.timeout_ms, 5000);
        assert_eq!(
            cfg.pipeline.chain("fast").unwrap()[0].provider,
            ProviderKind::Gemini
        );
    }

    #[test]
    fn default_engine_must_exist() {
        let err = ArenaConfig::from_toml_str(r#"default_engine = "stockfish""#).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownDefaultEngine(_)));
    }

    #[test]
    fn environment_wins_over_file() {
        let env: HashMap<&str, &str> = [
            ("DATABASE_URL", "sqlite::memory:"),
            ("OPENAI_API_KEY", "sk-env"),
            ("GEMINI_API_KEY", "  "),
        ]
        .into_iter()
        .collect();
        let mut cfg = ArenaConfig::default();
        cfg.apply_env(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(cfg.database_url, "sqlite::memory:");
        assert_eq!(cfg.bind, "127.0.0.1:8000");
        assert_eq!(cfg.openai.api_key.as_deref(), Some("sk-env"));
        assert_eq!(cfg.gemini.api_key, None);

        let pipeline = cfg.build_pipeline();
        assert!(pipeline.has_provider(ProviderKind::OpenAi));
        assert!(!pipeline.has_provider(ProviderKind::Gemini));
    }
}
