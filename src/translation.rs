use crate::config::Config;
use crate::error::{ServiceError, TranslationError};
use crate::language::SupportedLanguage;
use crate::retry::{with_retry_if, RetryConfig};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

const SERVICE: &str = "Google Translate";

/// Pairwise text translation between 2-letter language codes.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate_text(&self, text: &str, from: &str, to: &str) -> Result<String, ServiceError>;
}

/// Client for the public `translate_a/single` endpoint.
pub struct GoogleTranslator {
    client: reqwest::Client,
    api_url: String,
    retry: RetryConfig,
}

impl GoogleTranslator {
    pub fn new(client: reqwest::Client, api_url: impl Into<String>, retry: RetryConfig) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            retry,
        }
    }

    pub fn from_config(client: reqwest::Client, config: &Config) -> Self {
        Self::new(
            client,
            config.translate_api_url.clone(),
            RetryConfig::api_call(config.max_attempts),
        )
    }

    async fn send(&self, text: &str, from: &str, to: &str) -> Result<String, ServiceError> {
        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("client", "gtx"),
                ("sl", from),
                ("tl", to),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| ServiceError::transport(SERVICE, e))?;

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

        let json: Value = response
            .json()
            .await
            .map_err(|e| ServiceError::malformed(SERVICE, format!("invalid JSON body: {}", e)))?;

        extract_translation(&json)
    }
}

/// The translated text is split into segments at `json[0][i][0]`.
fn extract_translation(json: &Value) -> Result<String, ServiceError> {
    let segments = json
        .get(0)
        .and_then(|v| v.as_array())
        .ok_or_else(|| ServiceError::malformed(SERVICE, "missing translation segments"))?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(|v| v.as_str()))
        .collect();

    if translated.is_empty() {
        return Err(ServiceError::malformed(SERVICE, "empty translation"));
    }

    Ok(translated)
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate_text(&self, text: &str, from: &str, to: &str) -> Result<String, ServiceError> {
        with_retry_if(
            &self.retry,
            &format!("Translation {} -> {}", from, to),
            || self.send(text, from, to),
            ServiceError::is_retryable,
        )
        .await
    }
}

/// One translated rendition of the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Translation {
    pub language: SupportedLanguage,
    pub text: String,
}

/// Translations of one input into every supported language except the source.
/// Only [`translate`] builds one; it is read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationSet {
    source: SupportedLanguage,
    translations: Vec<Translation>,
}

impl TranslationSet {
    pub(crate) fn new(source: SupportedLanguage, pairs: Vec<(SupportedLanguage, String)>) -> Self {
        Self {
            source,
            translations: pairs
                .into_iter()
                .map(|(language, text)| Translation { language, text })
                .collect(),
        }
    }

    pub fn source(&self) -> SupportedLanguage {
        self.source
    }

    pub fn get(&self, language: SupportedLanguage) -> Option<&str> {
        self.translations
            .iter()
            .find(|t| t.language == language)
            .map(|t| t.text.as_str())
    }

    pub fn languages(&self) -> Vec<SupportedLanguage> {
        self.translations.iter().map(|t| t.language).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Translation> {
        self.translations.iter()
    }

    pub fn len(&self) -> usize {
        self.translations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.translations.is_empty()
    }
}

/// Translate `text` from `source` into the other supported languages.
///
/// An unsupported source yields an empty set. The first failing pair aborts
/// the whole set; partial results are never returned.
pub async fn translate(
    translator: &dyn Translator,
    text: &str,
    source: SupportedLanguage,
) -> Result<TranslationSet, TranslationError> {
    if text.trim().is_empty() {
        return Err(TranslationError::EmptyInput);
    }

    let mut pairs = Vec::new();

    if let Some(from) = source.code() {
        for target in source.translation_targets() {
            let Some(to) = target.code() else {
                continue;
            };

            let translated = translator
                .translate_text(text, from, to)
                .await
                .map_err(|e| {
                    warn!("Translation {} -> {} failed: {}", from, to, e);
                    TranslationError::Service { from, to, source: e }
                })?;

            debug!("Translated into {}: {:?}", target, translated);
            pairs.push((target, translated));
        }
    }

    Ok(TranslationSet::new(source, pairs))
}
