//! Spelling correction against word-frequency dictionaries.
//!
//! English and French are corrected word by word and rejoined with single
//! spaces. Thai has no whitespace word boundaries, so the whole string is
//! corrected as one unit.

mod symspell;

pub use symspell::{edit_distance, SymSpell, MAX_WORD_CHARS};

use crate::language::SupportedLanguage;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

const MAX_EDIT_DISTANCE: usize = 2;

/// Dictionaries smaller than this are not loaded from disk: too many valid
/// words would be missing and get rewritten into neighbours.
pub const MIN_TRUSTED_WORDS: usize = 1000;

/// Proposes a corrected spelling. `None` means "no correction".
pub trait Corrector: Send + Sync {
    fn correct(&self, text: &str, language: SupportedLanguage) -> Option<String>;
}

/// Known words with their corpus frequencies.
#[derive(Debug, Clone)]
pub struct FrequencyDictionary {
    frequencies: HashMap<String, u64>,
    index: SymSpell,
}

impl FrequencyDictionary {
    /// Parse `word<whitespace>count` lines. Blank lines and `#` comments are
    /// skipped; a missing or unparseable count counts as 1.
    pub fn parse(contents: &str) -> Self {
        let mut frequencies: HashMap<String, u64> = HashMap::new();
        let mut index = SymSpell::new(MAX_EDIT_DISTANCE);

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut fields = line.split_whitespace();
            let Some(word) = fields.next() else {
                continue;
            };
            let count = fields.next().and_then(|c| c.parse().ok()).unwrap_or(1);
            let word = word.to_lowercase();

            if !frequencies.contains_key(&word) {
                index.add_word(&word);
            }
            *frequencies.entry(word).or_insert(0) += count;
        }

        Self { frequencies, index }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dictionary {}", path.display()))?;
        Ok(Self::parse(&contents))
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.frequencies.contains_key(&word.to_lowercase())
    }

    pub fn frequency(&self, word: &str) -> u64 {
        self.frequencies
            .get(&word.to_lowercase())
            .copied()
            .unwrap_or(0)
    }

    /// Best known word within the edit-distance limit with its distance:
    /// smallest distance, then highest frequency, then lexical order.
    pub fn closest(&self, word: &str) -> Option<(&str, usize)> {
        let word = word.to_lowercase();
        self.index.lookup(&word).into_iter().min_by(|(a, da), (b, db)| {
            da.cmp(db)
                .then_with(|| self.frequency(b).cmp(&self.frequency(a)))
                .then_with(|| a.cmp(b))
        })
    }

    pub fn best_candidate(&self, word: &str) -> Option<&str> {
        self.closest(word).map(|(candidate, _)| candidate)
    }
}

/// Dictionary-backed corrector with one optional dictionary per language.
/// A language without a dictionary is never corrected.
#[derive(Debug, Default)]
pub struct DictionaryCorrector {
    dictionaries: HashMap<SupportedLanguage, FrequencyDictionary>,
}

impl DictionaryCorrector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dictionary(mut self, language: SupportedLanguage, dictionary: FrequencyDictionary) -> Self {
        self.dictionaries.insert(language, dictionary);
        self
    }

    /// Load `en.txt`, `fr.txt` and `th.txt` from `dir`. Missing files and
    /// lists with fewer than [`MIN_TRUSTED_WORDS`] entries are logged and
    /// leave that language uncorrected.
    pub fn from_dir(dir: &Path) -> Self {
        let mut corrector = Self::new();

        for language in SupportedLanguage::ALL {
            let Some(code) = language.code() else {
                continue;
            };
            let path = dir.join(format!("{}.txt", code));
            match FrequencyDictionary::load(&path) {
                Ok(dictionary) if dictionary.len() < MIN_TRUSTED_WORDS => warn!(
                    "{} spelling correction disabled: {} has only {} words",
                    language,
                    path.display(),
                    dictionary.len()
                ),
                Ok(dictionary) => {
                    info!(
                        "Loaded {} dictionary with {} words",
                        language,
                        dictionary.len()
                    );
                    corrector.dictionaries.insert(language, dictionary);
                }
                Err(e) => warn!("{} spelling correction disabled: {:#}", language, e),
            }
        }

        corrector
    }

    pub fn has_dictionary(&self, language: SupportedLanguage) -> bool {
        self.dictionaries.contains_key(&language)
    }

    pub fn dictionary(&self, language: SupportedLanguage) -> Option<&FrequencyDictionary> {
        self.dictionaries.get(&language)
    }

    /// A candidate `distance` edits away is only taken when the word has
    /// more than twice that many characters, so short valid words are not
    /// rewritten into unrelated neighbours.
    fn correct_word(dictionary: &FrequencyDictionary, word: &str) -> String {
        if !word.chars().any(char::is_alphabetic) || dictionary.contains(word) {
            return word.to_string();
        }

        match dictionary.closest(word) {
            Some((candidate, distance)) if word.chars().count() > 2 * distance => {
                debug!("Corrected {:?} to {:?}", word, candidate);
                match_case(word, candidate)
            }
            _ => word.to_string(),
        }
    }
}

/// Carry the casing of `original` over to the lowercase `candidate`:
/// all-caps stays all-caps, a leading capital stays capitalised.
fn match_case(original: &str, candidate: &str) -> String {
    let letters: Vec<char> = original.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.len() > 1 && letters.iter().all(|c| c.is_uppercase()) {
        return candidate.to_uppercase();
    }

    let mut chars = candidate.chars();
    match (original.chars().next(), chars.next()) {
        (Some(first), Some(lead)) if first.is_uppercase() => {
            lead.to_uppercase().chain(chars).collect()
        }
        _ => candidate.to_string(),
    }
}

impl Corrector for DictionaryCorrector {
    fn correct(&self, text: &str, language: SupportedLanguage) -> Option<String> {
        let dictionary = self.dictionaries.get(&language)?;

        let corrected = match language {
            SupportedLanguage::English | SupportedLanguage::French => text
                .split_whitespace()
                .map(|word| Self::correct_word(dictionary, word))
                .collect::<Vec<_>>()
                .join(" "),
            SupportedLanguage::Thai => Self::correct_word(dictionary, text.trim()),
            SupportedLanguage::Unsupported => return None,
        };

        if corrected == text {
            None
        } else {
            Some(corrected)
        }
    }
}
