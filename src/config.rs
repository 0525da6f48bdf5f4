use anyhow::{bail, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Where English definitions come from in the lexical-database strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionSource {
    /// Offline WordNet glosses
    WordNet,
    /// dictionaryapi.dev over HTTP
    FreeDictionary,
}

impl DefinitionSource {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "wordnet" => Ok(DefinitionSource::WordNet),
            "free-dictionary" | "freedictionary" => Ok(DefinitionSource::FreeDictionary),
            other => bail!(
                "Unknown DEFINITION_SOURCE '{}' (expected 'wordnet' or 'free-dictionary')",
                other
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // OpenAI
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_api_url: String,

    // Translation
    pub translate_api_url: String,

    // Lexical data
    pub definition_source: DefinitionSource,
    pub free_dictionary_api_url: String,
    pub wordnet_dir: PathBuf,
    pub cmudict_path: PathBuf,
    pub dictionary_dir: PathBuf,

    // Enrichment
    pub min_synonyms: usize,

    // HTTP behaviour
    pub request_timeout: Duration,
    pub max_attempts: u32,

    // Web surface
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // OpenAI - optional; generation is disabled without a key
            openai_api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            openai_model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| "gpt-3.5-turbo".to_string()),
            openai_api_url: std::env::var("OPENAI_API_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string()),

            // Translation
            translate_api_url: std::env::var("TRANSLATE_API_URL").unwrap_or_else(|_| {
                "https://translate.googleapis.com/translate_a/single".to_string()
            }),

            // Lexical data
            definition_source: match std::env::var("DEFINITION_SOURCE") {
                Ok(value) => DefinitionSource::parse(&value)?,
                Err(_) => DefinitionSource::WordNet,
            },
            free_dictionary_api_url: std::env::var("FREE_DICTIONARY_API_URL").unwrap_or_else(
                |_| "https://api.dictionaryapi.dev/api/v2/entries/en".to_string(),
            ),
            wordnet_dir: std::env::var("WORDNET_DIR")
                .unwrap_or_else(|_| "data/wordnet".to_string())
                .into(),
            cmudict_path: std::env::var("CMUDICT_PATH")
                .unwrap_or_else(|_| "data/cmudict.dict".to_string())
                .into(),
            dictionary_dir: std::env::var("DICTIONARY_DIR")
                .unwrap_or_else(|_| "data/dictionaries".to_string())
                .into(),

            // Enrichment
            min_synonyms: std::env::var("MIN_SYNONYMS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),

            // HTTP behaviour
            request_timeout: Duration::from_secs(
                std::env::var("REQUEST_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
            ),
            max_attempts: std::env::var("MAX_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),

            // Web surface
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
        })
    }

    /// Replace the credential, e.g. with one entered at the startup prompt.
    /// Blank input leaves generation disabled.
    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        self.openai_api_key = key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.openai_api_key.is_some()
    }
}
