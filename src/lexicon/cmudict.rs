//! CMU Pronouncing Dictionary lookups with ARPAbet to IPA conversion.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

#[derive(Debug, Default)]
pub struct PronouncingDictionary {
    /// word -> pronunciation variants in file order, each a space-separated phone string
    entries: HashMap<String, Vec<String>>,
}

impl PronouncingDictionary {
    /// Parse cmudict text. Accepts both the classic `WORD  PH PH` layout with
    /// `;;;` comments and the `word(2) ph ph # comment` layout of cmudict.dict.
    pub fn parse(contents: &str) -> Self {
        let mut entries: HashMap<String, Vec<String>> = HashMap::new();

        for line in contents.lines() {
            let line = line.split(" #").next().unwrap_or(line).trim();
            if line.is_empty() || line.starts_with(";;;") {
                continue;
            }

            let Some((head, phones)) = line.split_once(char::is_whitespace) else {
                continue;
            };
            let phones = phones.split_whitespace().collect::<Vec<_>>().join(" ");
            if phones.is_empty() {
                continue;
            }

            let word = match head.find('(') {
                Some(i) if head.ends_with(')') => &head[..i],
                _ => head,
            };
            entries.entry(word.to_lowercase()).or_default().push(phones);
        }

        Self { entries }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pronouncing dictionary {}", path.display()))?;
        let dictionary = Self::parse(&contents);
        info!(
            "Loaded pronouncing dictionary from {} ({} words)",
            path.display(),
            dictionary.len()
        );
        Ok(dictionary)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All pronunciation variants of `word`, empty if unknown.
    pub fn phones_for_word(&self, word: &str) -> &[String] {
        self.entries
            .get(&word.trim().to_lowercase())
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// IPA for the first pronunciation variant. Multi-word input is
    /// transcribed word by word and fails if any word is unknown.
    pub fn ipa(&self, text: &str) -> Option<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            return None;
        }

        let transcriptions = words
            .iter()
            .map(|word| self.phones_for_word(word).first().map(|p| arpabet_to_ipa(p)))
            .collect::<Option<Vec<_>>>()?;

        Some(transcriptions.join(" "))
    }
}

fn split_stress(phone: &str) -> (&str, Option<char>) {
    match phone.chars().last() {
        Some(c @ '0'..='2') => (&phone[..phone.len() - 1], Some(c)),
        _ => (phone, None),
    }
}

fn ipa_symbol(base: &str, stress: Option<char>) -> Option<&'static str> {
    let symbol = match base {
        "AA" => "ɑ",
        "AE" => "æ",
        "AH" if stress == Some('0') => "ə",
        "AH" => "ʌ",
        "AO" => "ɔ",
        "AW" => "aʊ",
        "AY" => "aɪ",
        "EH" => "ɛ",
        "ER" if stress == Some('0') => "ɚ",
        "ER" => "ɝ",
        "EY" => "eɪ",
        "IH" => "ɪ",
        "IY" => "i",
        "OW" => "oʊ",
        "OY" => "ɔɪ",
        "UH" => "ʊ",
        "UW" => "u",
        "B" => "b",
        "CH" => "tʃ",
        "D" => "d",
        "DH" => "ð",
        "F" => "f",
        "G" => "ɡ",
        "HH" => "h",
        "JH" => "dʒ",
        "K" => "k",
        "L" => "l",
        "M" => "m",
        "N" => "n",
        "NG" => "ŋ",
        "P" => "p",
        "R" => "ɹ",
        "S" => "s",
        "SH" => "ʃ",
        "T" => "t",
        "TH" => "θ",
        "V" => "v",
        "W" => "w",
        "Y" => "j",
        "Z" => "z",
        "ZH" => "ʒ",
        _ => return None,
    };
    Some(symbol)
}

/// Convert an ARPAbet phone string (`HH AH0 L OW1`) to IPA (`həˈloʊ`).
///
/// Stress marks go before the syllable onset: all leading consonants for the
/// first syllable, otherwise the single consonant preceding the vowel.
/// Unknown phones are kept in lowercase.
pub fn arpabet_to_ipa(phones: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut seen_vowel = false;
    // position in `out` right after the last vowel
    let mut onset_start = 0;

    for phone in phones.split_whitespace() {
        let (base, stress) = split_stress(phone);
        let symbol = ipa_symbol(base, stress)
            .map(str::to_string)
            .unwrap_or_else(|| base.to_lowercase());

        let Some(stress) = stress else {
            out.push(symbol);
            continue;
        };

        let mark = match stress {
            '1' => Some("ˈ"),
            '2' => Some("ˌ"),
            _ => None,
        };
        if let Some(mark) = mark {
            let insert_at = if !seen_vowel {
                onset_start
            } else if out.len() > onset_start {
                out.len() - 1
            } else {
                out.len()
            };
            out.insert(insert_at, mark.to_string());
        }

        out.push(symbol);
        seen_vowel = true;
        onset_start = out.len();
    }

    out.concat()
}
