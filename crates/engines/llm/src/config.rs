use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Backends a chain entry can name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Gemini,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Gemini => "gemini",
        })
    }
}

/// One (provider, model) step of a fallback chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainEntry {
    pub provider: ProviderKind,
    pub model: String,
}

impl ChainEntry {
    pub fn new(provider: ProviderKind, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodingConfig {
    pub temperature: f32,
    pub max_tokens: u32,
    /// Upper bound for a single provider call.
    pub timeout_ms: u64,
}

impl Default for DecodingConfig {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            max_tokens: 60,
            timeout_ms: 20_000,
        }
    }
}

impl DecodingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Decoding parameters plus the chain for every AI engine id.
///
/// ```toml
/// [decoding]
/// temperature = 0.1
///
/// [[engines.openai]]
/// provider = "openai"
/// model = "gpt-4o-mini"
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub decoding: DecodingConfig,
    pub engines: BTreeMap<String, Vec<ChainEntry>>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        use ProviderKind::{Gemini, OpenAi};

        let mut engines = BTreeMap::new();
        engines.insert(
            "openai".to_string(),
            vec![
                ChainEntry::new(OpenAi, "gpt-4o-mini"),
                ChainEntry::new(OpenAi, "gpt-3.5-turbo"),
                ChainEntry::new(Gemini, "gemini-1.5-flash"),
            ],
        );
        engines.insert(
            "gemini".to_string(),
            vec![
                ChainEntry::new(Gemini, "gemini-1.5-flash"),
                ChainEntry::new(Gemini, "gemini-pro"),
                ChainEntry::new(OpenAi, "gpt-4o-mini"),
            ],
        );
        engines.insert("random".to_string(), Vec::new());

        Self {
            decoding: DecodingConfig::default(),
            engines,
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn chain(&self, engine_id: &str) -> Option<&[ChainEntry]> {
        self.engines.get(engine_id).map(Vec::as_slice)
    }

    pub fn engine_ids(&self) -> impl Iterator<Item = &str> {
        self.engines.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_the_three_engines() {
        let config = PipelineConfig::default();
        assert_eq!(
            config.engine_ids().collect::<Vec<_>>(),
            vec!["gemini", "openai", "random"]
        );
        assert_eq!(config.chain("random"), Some(&[][..]));
        assert_eq!(config.chain("openai").map(<[_]>::len), Some(3));
        assert!(config.chain("stockfish").is_none());
    }

    #[test]
    fn toml_chain_overrides_defaults() {
        let config = PipelineConfig::from_toml_str(
            r#"
            [decoding]
            timeout_ms = 500

            [[engines.fast]]
            provider = "gemini"
            model = "gemini-1.5-flash"

            [[engines.fast]]
            provider = "openai"
            model = "gpt-4o-mini"
            "#,
        )
        .unwrap();

        assert_eq!(config.decoding.timeout_ms, 500);
        assert_eq!(config.decoding.temperature, 0.1);
        assert_eq!(
            config.chain("fast").unwrap(),
            &[
                ChainEntry::new(ProviderKind::Gemini, "gemini-1.5-flash"),
                ChainEntry::new(ProviderKind::OpenAi, "gpt-4o-mini"),
            ]
        );
        assert!(config.chain("openai").is_none());
    }
}
