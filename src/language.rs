//! Language tags and detection.
//!
//! The pipeline only knows three languages. Whatever the classifier says is
//! mapped through a fixed table onto [`SupportedLanguage`]; everything else is
//! `Unsupported`.

use crate::spelling::{DictionaryCorrector, FrequencyDictionary};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use whatlang::{Lang, Script};

/// Inputs with at most this many words are decided by dictionary evidence
/// first; trigram statistics are unreliable on them.
const SHORT_INPUT_WORDS: usize = 3;

/// Closed set of languages the pipeline can work with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportedLanguage {
    English,
    French,
    Thai,
    Unsupported,
}

impl SupportedLanguage {
    /// The three languages that can be translated between.
    pub const ALL: [SupportedLanguage; 3] = [
        SupportedLanguage::English,
        SupportedLanguage::French,
        SupportedLanguage::Thai,
    ];

    /// Map a 2-letter code onto the closed set. Unknown codes are `Unsupported`.
    pub fn from_code(code: &str) -> SupportedLanguage {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => SupportedLanguage::English,
            "fr" => SupportedLanguage::French,
            "th" => SupportedLanguage::Thai,
            _ => SupportedLanguage::Unsupported,
        }
    }

    /// ISO 639-1 code used on the wire, `None` for `Unsupported`.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            SupportedLanguage::English => Some("en"),
            SupportedLanguage::French => Some("fr"),
            SupportedLanguage::Thai => Some("th"),
            SupportedLanguage::Unsupported => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SupportedLanguage::English => "English",
            SupportedLanguage::French => "French",
            SupportedLanguage::Thai => "Thai",
            SupportedLanguage::Unsupported => "Unsupported",
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, SupportedLanguage::Unsupported)
    }

    /// Fixed routing table: every supported language translates into the other two.
    pub fn translation_targets(&self) -> Vec<SupportedLanguage> {
        if !self.is_supported() {
            return Vec::new();
        }
        Self::ALL.iter().copied().filter(|lang| lang != self).collect()
    }
}

impl fmt::Display for SupportedLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classifies raw text into a [`SupportedLanguage`].
pub trait LanguageDetector: Send + Sync {
    fn detect(&self, text: &str) -> SupportedLanguage;
}

/// Trigram-based detector backed by `whatlang`.
///
/// No confidence threshold is applied: the top classification wins.
pub struct WhatlangDetector {
    detector: whatlang::Detector,
}

impl Default for WhatlangDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl WhatlangDetector {
    pub fn new() -> Self {
        Self {
            detector: whatlang::Detector::new(),
        }
    }

    /// The mapped classification and whether whatlang considers it reliable.
    pub fn classify(&self, text: &str) -> (SupportedLanguage, bool) {
        let Some(info) = self.detector.detect(text) else {
            debug!("No classification for {:?}", text);
            return (SupportedLanguage::Unsupported, false);
        };

        debug!(
            "Classified {:?} as {} (confidence {:.2})",
            text,
            info.lang().code(),
            info.confidence()
        );

        let language = match info.lang() {
            Lang::Eng => SupportedLanguage::English,
            Lang::Fra => SupportedLanguage::French,
            Lang::Tha => SupportedLanguage::Thai,
            _ => SupportedLanguage::Unsupported,
        };
        (language, info.is_reliable())
    }
}

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, text: &str) -> SupportedLanguage {
        self.classify(text).0
    }
}

/// Production detector: whatlang, backed by the spelling dictionaries for
/// the word-or-two lookups whatlang cannot classify.
///
/// 1. Thai script is Thai.
/// 2. Short input, or long input whatlang is unsure about, goes to a
///    dictionary vote between English and French.
/// 3. Otherwise, or when the vote is undecided, whatlang's answer stands.
pub struct DictionaryAwareDetector {
    statistical: WhatlangDetector,
    dictionaries: Arc<DictionaryCorrector>,
}

impl DictionaryAwareDetector {
    pub fn new(dictionaries: Arc<DictionaryCorrector>) -> Self {
        Self {
            statistical: WhatlangDetector::new(),
            dictionaries,
        }
    }

    /// Known word scores 2, a word one edit from a known word scores 1.
    /// A language wins when it beats the other and averages at least one
    /// point per word.
    fn vote(&self, words: &[String]) -> Option<SupportedLanguage> {
        let score = |language| {
            self.dictionaries
                .dictionary(language)
                .map(|dictionary| words.iter().map(|w| word_score(dictionary, w)).sum::<usize>())
                .unwrap_or(0)
        };
        let english = score(SupportedLanguage::English);
        let french = score(SupportedLanguage::French);
        debug!("Dictionary vote: English {}, French {}", english, french);

        let (winner, best, other) = if english >= french {
            (SupportedLanguage::English, english, french)
        } else {
            (SupportedLanguage::French, french, english)
        };
        (best > other && best >= words.len()).then_some(winner)
    }
}

fn word_score(dictionary: &FrequencyDictionary, word: &str) -> usize {
    if dictionary.contains(word) {
        return 2;
    }
    match dictionary.closest(word) {
        Some((_, 1)) if word.chars().count() > 2 => 1,
        _ => 0,
    }
}

/// Lowercased words with surrounding punctuation removed.
fn words_of(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphabetic()).to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

impl LanguageDetector for DictionaryAwareDetector {
    fn detect(&self, text: &str) -> SupportedLanguage {
        if whatlang::detect_script(text) == Some(Script::Thai) {
            return SupportedLanguage::Thai;
        }

        let words = words_of(text);
        if words.is_empty() {
            return SupportedLanguage::Unsupported;
        }

        let short = words.len() <= SHORT_INPUT_WORDS;
        let (classified, reliable) = self.statistical.classify(text);
        if reliable && !short {
            return classified;
        }

        match self.vote(&words) {
            Some(language) => {
                debug!("Dictionary vote picked {} for {:?}", language, text);
                language
            }
            None => classified,
        }
    }
}
