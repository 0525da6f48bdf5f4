use super::{Enricher, Enrichment, EnrichmentRow};
use crate::error::EnrichError;
use crate::language::SupportedLanguage;
use crate::openai::TextGenerator;
use async_trait::async_trait;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

/// `- `, `* `, `• `, `1. ` or `1) ` in front of a row
static LIST_MARKER: OnceLock<Regex> = OnceLock::new();

fn list_marker() -> &'static Regex {
    LIST_MARKER.get_or_init(|| {
        Regex::new(r"^(?:[-*•]|\d+[.)])\s+").expect("list marker pattern is valid")
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    MissingColon,
    EmptySynonym,
    EmptyDefinition,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RejectReason::MissingColon => "no ':' separator",
            RejectReason::EmptySynonym => "empty synonym",
            RejectReason::EmptyDefinition => "empty definition",
        })
    }
}

/// A non-blank response line that does not match the row grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedLine {
    /// 1-based
    pub line_number: usize,
    pub text: String,
    pub reason: RejectReason,
}

/// Build the prompt asking for at least `count` synonyms with definitions,
/// one `synonym: definition` pair per line.
pub fn build_synonym_prompt(word: &str, language: SupportedLanguage, count: usize) -> String {
    format!(
        "List at least {count} synonyms for the {language} word or phrase \"{word}\", \
         each with a short definition written in {language}.\n\
         Format the answer as a two-column table with exactly one synonym per line, \
         written as:\n\
         synonym: definition\n\
         Do not add a header, numbering, or any other text.",
        count = count,
        language = language.name(),
        word = word,
    )
}

fn clean_synonym(raw: &str) -> &str {
    raw.trim()
        .trim_matches(|c| c == '*' || c == '"' || c == '\'' || c == '`')
        .trim()
}

/// Parse a generation response with the grammar
///
/// ```text
/// row = [marker] synonym ":" definition
/// ```
///
/// Blank lines are skipped. Every other line that is not a row is returned
/// in `rejected` with its reason. The definition is everything after the
/// first colon and may itself contain colons.
pub fn parse_synonym_table(response: &str) -> Enrichment {
    let mut table = Enrichment::default();

    for (i, line) in response.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let body = list_marker().replace(trimmed, "");
        let reject = |reason| RejectedLine {
            line_number: i + 1,
            text: trimmed.to_string(),
            reason,
        };

        let Some((synonym, definition)) = body.split_once(':') else {
            table.rejected.push(reject(RejectReason::MissingColon));
            continue;
        };

        let synonym = clean_synonym(synonym);
        let definition = definition.trim();

        if synonym.is_empty() {
            table.rejected.push(reject(RejectReason::EmptySynonym));
        } else if definition.is_empty() {
            table.rejected.push(reject(RejectReason::EmptyDefinition));
        } else {
            table
                .rows
                .push(EnrichmentRow::with_definition(synonym, definition));
        }
    }

    table
}

/// Asks the language model for synonyms and parses its answer.
pub struct GenerativeEnricher {
    generator: Arc<dyn TextGenerator>,
    requested: usize,
}

impl GenerativeEnricher {
    pub fn new(generator: Arc<dyn TextGenerator>, requested: usize) -> Self {
        Self {
            generator,
            requested,
        }
    }
}

#[async_trait]
impl Enricher for GenerativeEnricher {
    async fn enrich(
        &self,
        word: &str,
        language: SupportedLanguage,
    ) -> Result<Enrichment, EnrichError> {
        if !language.is_supported() {
            return Err(EnrichError::UnsupportedLanguage(language));
        }

        let prompt = build_synonym_prompt(word, language, self.requested);
        let response = self.generator.generate(&prompt).await?;

        let table = parse_synonym_table(&response);
        for rejected in &table.rejected {
            warn!(
                "Rejected line {} of {} synonym response ({}): {:?}",
                rejected.line_number, language, rejected.reason, rejected.text
            );
        }
        debug!(
            "Parsed {} synonym rows for {:?} ({})",
            table.rows.len(),
            word,
            language
        );

        Ok(table)
    }
}
