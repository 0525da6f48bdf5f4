//! Definition sources for the lexical-database strategy.

use crate::error::ServiceError;
use crate::lexicon::WordNet;
use crate::retry::{with_retry_if, RetryConfig};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

const SERVICE: &str = "Free Dictionary";

/// Definitions of a word for one part of speech.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meaning {
    pub part_of_speech: String,
    pub definitions: Vec<String>,
}

/// Word to meanings, in the order the source lists them.
/// An unknown word is an empty list, not an error.
#[async_trait]
pub trait DefinitionLookup: Send + Sync {
    async fn meanings(&self, word: &str) -> Result<Vec<Meaning>, ServiceError>;
}

/// First definition of the first part of speech listed.
pub fn first_definition(meanings: &[Meaning]) -> Option<(&str, &str)> {
    let meaning = meanings.iter().find(|m| !m.definitions.is_empty())?;
    Some((
        meaning.part_of_speech.as_str(),
        meaning.definitions[0].as_str(),
    ))
}

/// Offline definitions from WordNet glosses.
pub struct WordNetDefinitions {
    wordnet: Arc<WordNet>,
}

impl WordNetDefinitions {
    pub fn new(wordnet: Arc<WordNet>) -> Self {
        Self { wordnet }
    }
}

#[async_trait]
impl DefinitionLookup for WordNetDefinitions {
    async fn meanings(&self, word: &str) -> Result<Vec<Meaning>, ServiceError> {
        Ok(self
            .wordnet
            .definitions(word)
            .into_iter()
            .map(|(pos, definitions)| Meaning {
                part_of_speech: pos.name().to_string(),
                definitions,
            })
            .collect())
    }
}

// -- Free Dictionary API (dictionaryapi.dev) --

#[derive(Debug, Deserialize)]
struct FreeDictEntry {
    #[serde(default)]
    meanings: Vec<FreeDictMeaning>,
}

#[derive(Debug, Deserialize)]
struct FreeDictMeaning {
    #[serde(rename = "partOfSpeech")]
    part_of_speech: String,
    #[serde(default)]
    definitions: Vec<FreeDictDefinition>,
}

#[derive(Debug, Deserialize)]
struct FreeDictDefinition {
    definition: String,
}

pub struct FreeDictionaryClient {
    client: reqwest::Client,
    base_url: String,
    retry: RetryConfig,
}

impl FreeDictionaryClient {
    /// `base_url` is the per-language entries endpoint, e.g.
    /// `https://api.dictionaryapi.dev/api/v2/entries/en`.
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, retry: RetryConfig) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry,
        }
    }

    async fn send(&self, word: &str) -> Result<Vec<Meaning>, ServiceError> {
        let url = format!("{}/{}", self.base_url, urlencoding::encode(word.trim()));

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ServiceError::transport(SERVICE, e))?;

        if response.status().as_u16() == 404 {
            return Ok(Vec::new());
        }

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            return Err(ServiceError::Status {
                service: SERVICE,
                status,
                body,
            });
        }

        let entries: Vec<FreeDictEntry> = response
            .json()
            .await
            .map_err(|e| ServiceError::malformed(SERVICE, format!("invalid JSON body: {}", e)))?;

        let mut meanings: Vec<Meaning> = Vec::new();
        for meaning in entries.into_iter().flat_map(|e| e.meanings) {
            let definitions: Vec<String> = meaning
                .definitions
                .into_iter()
                .map(|d| d.definition)
                .collect();

            match meanings
                .iter_mut()
                .find(|m| m.part_of_speech == meaning.part_of_speech)
            {
                Some(existing) => existing.definitions.extend(definitions),
                None => meanings.push(Meaning {
                    part_of_speech: meaning.part_of_speech,
                    definitions,
                }),
            }
        }

        Ok(meanings)
    }
}

#[async_trait]
impl DefinitionLookup for FreeDictionaryClient {
    async fn meanings(&self, word: &str) -> Result<Vec<Meaning>, ServiceError> {
        with_retry_if(
            &self.retry,
            "Dictionary lookup",
            || self.send(word),
            ServiceError::is_retryable,
        )
        .await
    }
}
