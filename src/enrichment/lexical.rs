use super::{Enricher, Enrichment, EnrichmentRow};
use crate::error::EnrichError;
use crate::language::SupportedLanguage;
use crate::lexicon::{first_definition, DefinitionLookup, PronouncingDictionary, WordNet};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// English synonyms from WordNet, with IPA from CMUdict and a definition per
/// synonym from the configured definition source.
pub struct LexicalEnricher {
    wordnet: Arc<WordNet>,
    pronunciations: Option<Arc<PronouncingDictionary>>,
    definitions: Arc<dyn DefinitionLookup>,
}

impl LexicalEnricher {
    pub fn new(
        wordnet: Arc<WordNet>,
        pronunciations: Option<Arc<PronouncingDictionary>>,
        definitions: Arc<dyn DefinitionLookup>,
    ) -> Self {
        Self {
            wordnet,
            pronunciations,
            definitions,
        }
    }

    async fn row_for(&self, synonym: String) -> EnrichmentRow {
        let phonetic = self
            .pronunciations
            .as_ref()
            .and_then(|dictionary| dictionary.ipa(&synonym));

        let (part_of_speech, definition) = match self.definitions.meanings(&synonym).await {
            Ok(meanings) => match first_definition(&meanings) {
                Some((pos, definition)) => (Some(pos.to_string()), Some(definition.to_string())),
                None => (None, None),
            },
            Err(e) => {
                warn!("Definition lookup for {:?} failed: {}", synonym, e);
                (None, None)
            }
        };

        EnrichmentRow {
            synonym,
            definition,
            phonetic,
            part_of_speech,
        }
    }
}

#[async_trait]
impl Enricher for LexicalEnricher {
    async fn enrich(
        &self,
        word: &str,
        language: SupportedLanguage,
    ) -> Result<Enrichment, EnrichError> {
        if language != SupportedLanguage::English {
            return Err(EnrichError::UnsupportedLanguage(language));
        }

        let synonyms = self.wordnet.synonyms(word);
        debug!("WordNet returned {} synonyms for {:?}", synonyms.len(), word);

        let mut rows = Vec::with_capacity(synonyms.len());
        for synonym in synonyms {
            rows.push(self.row_for(synonym).await);
        }

        Ok(Enrichment::from_rows(rows))
    }
}
