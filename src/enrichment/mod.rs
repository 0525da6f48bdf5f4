//! Synonym tables for a (word, language) pair.
//!
//! Two strategies sit behind the [`Enricher`] contract: the lexical database
//! (English only) and free-text generation (any supported language).
//! [`EnrichmentService`] picks one per language and pads short tables.

mod generative;
mod lexical;

pub use generative::{
    build_synonym_prompt, parse_synonym_table, GenerativeEnricher, RejectReason, RejectedLine,
};
pub use lexical::LexicalEnricher;

use crate::error::EnrichError;
use crate::language::SupportedLanguage;
use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

/// One line of a synonym table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichmentRow {
    pub synonym: String,
    pub definition: Option<String>,
    /// IPA transcription; `None` when the word is not in the pronunciation dictionary
    pub phonetic: Option<String>,
    pub part_of_speech: Option<String>,
}

impl EnrichmentRow {
    pub fn synonym_only(synonym: impl Into<String>) -> Self {
        Self {
            synonym: synonym.into(),
            definition: None,
            phonetic: None,
            part_of_speech: None,
        }
    }

    pub fn with_definition(synonym: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            definition: Some(definition.into()),
            ..Self::synonym_only(synonym)
        }
    }
}

/// A synonym table plus the source lines that could not be turned into rows.
/// Only generated tables can have rejected lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Enrichment {
    pub rows: Vec<EnrichmentRow>,
    pub rejected: Vec<RejectedLine>,
}

impl Enrichment {
    pub fn from_rows(rows: Vec<EnrichmentRow>) -> Self {
        Self {
            rows,
            rejected: Vec::new(),
        }
    }
}

#[async_trait]
pub trait Enricher: Send + Sync {
    async fn enrich(
        &self,
        word: &str,
        language: SupportedLanguage,
    ) -> Result<Enrichment, EnrichError>;
}

/// Repeat `word` as a bare synonym until the table has `min_rows` rows.
pub fn pad_rows(mut rows: Vec<EnrichmentRow>, word: &str, min_rows: usize) -> Vec<EnrichmentRow> {
    if rows.len() < min_rows {
        debug!(
            "Padding {} synonym rows for {:?} up to {}",
            rows.len(),
            word,
            min_rows
        );
    }
    while rows.len() < min_rows {
        rows.push(EnrichmentRow::synonym_only(word));
    }
    rows
}

/// Chooses a strategy per language: the lexical database for English when
/// loaded, otherwise generation when a credential was configured.
pub struct EnrichmentService {
    lexical: Option<Box<dyn Enricher>>,
    generative: Option<Box<dyn Enricher>>,
    min_rows: usize,
}

impl EnrichmentService {
    pub fn new(min_rows: usize) -> Self {
        Self {
            lexical: None,
            generative: None,
            min_rows,
        }
    }

    pub fn with_lexical(mut self, enricher: impl Enricher + 'static) -> Self {
        self.lexical = Some(Box::new(enricher));
        self
    }

    pub fn with_generative(mut self, enricher: impl Enricher + 'static) -> Self {
        self.generative = Some(Box::new(enricher));
        self
    }

    fn strategy_for(&self, language: SupportedLanguage) -> Option<&dyn Enricher> {
        match (language, &self.lexical, &self.generative) {
            (SupportedLanguage::Unsupported, _, _) => None,
            (SupportedLanguage::English, Some(lexical), _) => Some(lexical.as_ref()),
            (_, _, Some(generative)) => Some(generative.as_ref()),
            _ => None,
        }
    }
}

#[async_trait]
impl Enricher for EnrichmentService {
    async fn enrich(
        &self,
        word: &str,
        language: SupportedLanguage,
    ) -> Result<Enrichment, EnrichError> {
        if !language.is_supported() {
            return Err(EnrichError::UnsupportedLanguage(language));
        }

        let strategy = self
            .strategy_for(language)
            .ok_or(EnrichError::Unavailable(language))?;

        let word = word.trim();
        let enrichment = strategy.enrich(word, language).await?;
        Ok(Enrichment {
            rows: pad_rows(enrichment.rows, word, self.min_rows),
            rejected: enrichment.rejected,
        })
    }
}
