//! Request orchestration: detect, correct, translate, enrich.
//!
//! Every stage failure is captured in the [`Report`] so the rest of the
//! result still renders; only empty or oversized input rejects a request
//! outright.

use crate::config::{Config, DefinitionSource};
use crate::enrichment::{
    Enricher, Enrichment, EnrichmentService, GenerativeEnricher, LexicalEnricher,
};
use crate::error::RequestError;
use crate::language::{DictionaryAwareDetector, LanguageDetector, SupportedLanguage};
use crate::lexicon::{
    DefinitionLookup, FreeDictionaryClient, PronouncingDictionary, WordNet, WordNetDefinitions,
};
use crate::openai::OpenAiClient;
use crate::retry::RetryConfig;
use crate::spelling::{Corrector, DictionaryCorrector};
use crate::translation::{translate, GoogleTranslator, TranslationSet, Translator};
use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Longest accepted submission, in characters.
pub const MAX_INPUT_CHARS: usize = 500;

/// Result of one stage: its value, or the message shown in its place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome<T> {
    Ready(T),
    Failed(String),
}

impl<T> Outcome<T> {
    fn from_result<E: std::fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Outcome::Ready(value),
            Err(e) => Outcome::Failed(e.to_string()),
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Outcome::Ready(value) => Some(value),
            Outcome::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichmentTable {
    pub language: SupportedLanguage,
    pub word: String,
    pub rows: Outcome<Enrichment>,
}

/// Everything produced for one submission. Built once, then rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub input: String,
    pub language: SupportedLanguage,
    /// Set only when the corrector changed the input
    pub correction: Option<String>,
    /// Text passed to translation and enrichment
    pub text: String,
    pub translations: Outcome<TranslationSet>,
    /// Source language first, then one table per translation
    pub enrichments: Vec<EnrichmentTable>,
}

impl Report {
    pub fn enrichment(&self, language: SupportedLanguage) -> Option<&EnrichmentTable> {
        self.enrichments.iter().find(|t| t.language == language)
    }
}

pub struct Pipeline {
    detector: Arc<dyn LanguageDetector>,
    corrector: Arc<dyn Corrector>,
    translator: Arc<dyn Translator>,
    enricher: Arc<dyn Enricher>,
}

impl Pipeline {
    pub fn new(
        detector: Arc<dyn LanguageDetector>,
        corrector: Arc<dyn Corrector>,
        translator: Arc<dyn Translator>,
        enricher: Arc<dyn Enricher>,
    ) -> Self {
        Self {
            detector,
            corrector,
            translator,
            enricher,
        }
    }

    /// Wire up the production collaborators. Missing local data disables
    /// the features that need it instead of failing startup.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        let corrector = Arc::new(DictionaryCorrector::from_dir(&config.dictionary_dir));
        let translator = GoogleTranslator::from_config(client.clone(), config);
        let enricher = build_enrichment_service(client, config);

        Ok(Self::new(
            Arc::new(DictionaryAwareDetector::new(corrector.clone())),
            corrector,
            Arc::new(translator),
            Arc::new(enricher),
        ))
    }

    pub async fn process(&self, input: &str) -> Result<Report, RequestError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(RequestError::EmptyInput);
        }
        if input.chars().count() > MAX_INPUT_CHARS {
            return Err(RequestError::InputTooLong {
                limit: MAX_INPUT_CHARS,
            });
        }

        // Step 1: Detect language
        let language = self.detector.detect(input);
        info!("Detected language: {}", language);

        // Step 2: Correct spelling
        let correction = self.corrector.correct(input, language);
        if let Some(corrected) = &correction {
            info!("Corrected {:?} to {:?}", input, corrected);
        }
        let text = correction.clone().unwrap_or_else(|| input.to_string());

        // Step 3: Translate
        let translations = Outcome::from_result(
            translate(self.translator.as_ref(), &text, language).await,
        );
        if let Outcome::Failed(e) = &translations {
            warn!("Translation stage failed: {}", e);
        }

        // Step 4: Enrich the source text and every translation
        let mut words = Vec::new();
        if language.is_supported() {
            words.push((language, text.clone()));
        }
        if let Some(set) = translations.ready() {
            words.extend(set.iter().map(|t| (t.language, t.text.clone())));
        }

        let mut enrichments = Vec::with_capacity(words.len());
        for (language, word) in words {
            let rows = Outcome::from_result(self.enricher.enrich(&word, language).await);
            match &rows {
                Outcome::Failed(e) => warn!("Enrichment for {} failed: {}", language, e),
                Outcome::Ready(table) if !table.rejected.is_empty() => warn!(
                    "Enrichment for {} skipped {} malformed lines",
                    language,
                    table.rejected.len()
                ),
                Outcome::Ready(_) => {}
            }
            enrichments.push(EnrichmentTable {
                language,
                word,
                rows,
            });
        }

        Ok(Report {
            input: input.to_string(),
            language,
            correction,
            text,
            translations,
            enrichments,
        })
    }
}

fn build_enrichment_service(client: reqwest::Client, config: &Config) -> EnrichmentService {
    let mut service = EnrichmentService::new(config.min_synonyms);

    match WordNet::load(&config.wordnet_dir) {
        Ok(wordnet) => {
            let wordnet = Arc::new(wordnet);
            let pronunciations = match PronouncingDictionary::load(&config.cmudict_path) {
                Ok(dictionary) => Some(Arc::new(dictionary)),
                Err(e) => {
                    warn!("IPA transcriptions disabled: {:#}", e);
                    None
                }
            };
            let definitions: Arc<dyn DefinitionLookup> = match config.definition_source {
                DefinitionSource::WordNet => Arc::new(WordNetDefinitions::new(wordnet.clone())),
                DefinitionSource::FreeDictionary => Arc::new(FreeDictionaryClient::new(
                    client.clone(),
                    config.free_dictionary_api_url.clone(),
                    RetryConfig::api_call(config.max_attempts),
                )),
            };
            service =
                service.with_lexical(LexicalEnricher::new(wordnet, pronunciations, definitions));
        }
        Err(e) => warn!("Lexical database strategy disabled: {:#}", e),
    }

    match OpenAiClient::from_config(client, config) {
        Some(generator) => {
            service = service.with_generative(GenerativeEnricher::new(
                Arc::new(generator),
                config.min_synonyms.max(3),
            ));
        }
        None => info!("No OpenAI API key configured, synonym generation disabled"),
    }

    service
}
