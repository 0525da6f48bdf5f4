//! Reader for the WordNet database files (`index.<pos>` / `data.<pos>`).
//!
//! Data lines are keyed by their leading offset field instead of being
//! fetched by seeking, so trimmed or regenerated files work as long as every
//! offset referenced from an index line has a matching data line.

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Adverb,
}

impl PartOfSpeech {
    /// Lookup order for synsets: noun, verb, adjective, adverb.
    pub const ALL: [PartOfSpeech; 4] = [
        PartOfSpeech::Noun,
        PartOfSpeech::Verb,
        PartOfSpeech::Adjective,
        PartOfSpeech::Adverb,
    ];

    fn file_suffix(&self) -> &'static str {
        match self {
            PartOfSpeech::Noun => "noun",
            PartOfSpeech::Verb => "verb",
            PartOfSpeech::Adjective => "adj",
            PartOfSpeech::Adverb => "adv",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PartOfSpeech::Noun => "noun",
            PartOfSpeech::Verb => "verb",
            PartOfSpeech::Adjective => "adjective",
            PartOfSpeech::Adverb => "adverb",
        }
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synset {
    pub offset: String,
    pub part_of_speech: PartOfSpeech,
    /// Lemma names as stored, with underscores for spaces.
    pub lemmas: Vec<String>,
    pub gloss: String,
}

impl Synset {
    /// The gloss without its quoted usage examples.
    pub fn definition(&self) -> &str {
        self.gloss
            .split("; \"")
            .next()
            .unwrap_or(&self.gloss)
            .trim()
    }
}

#[derive(Debug, Default)]
struct PosTables {
    /// lemma -> synset offsets in sense order
    index: HashMap<String, Vec<String>>,
    /// offset -> synset
    data: HashMap<String, Synset>,
}

#[derive(Debug, Default)]
pub struct WordNet {
    tables: HashMap<PartOfSpeech, PosTables>,
}

impl WordNet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every part of speech found in `dir`. Fails only if none is present.
    pub fn load(dir: &Path) -> Result<Self> {
        let mut wordnet = Self::new();

        for pos in PartOfSpeech::ALL {
            let index_path = dir.join(format!("index.{}", pos.file_suffix()));
            let data_path = dir.join(format!("data.{}", pos.file_suffix()));
            if !index_path.exists() || !data_path.exists() {
                debug!("WordNet {} files not found in {}", pos, dir.display());
                continue;
            }

            let index = std::fs::read_to_string(&index_path)
                .with_context(|| format!("Failed to read {}", index_path.display()))?;
            let data = std::fs::read_to_string(&data_path)
                .with_context(|| format!("Failed to read {}", data_path.display()))?;
            wordnet = wordnet.with_part_of_speech(pos, &index, &data);
        }

        if wordnet.tables.is_empty() {
            bail!("No WordNet database files found in {}", dir.display());
        }

        info!(
            "Loaded WordNet from {} ({} lemmas)",
            dir.display(),
            wordnet.lemma_count()
        );
        Ok(wordnet)
    }

    /// Add one part of speech from the contents of its index and data files.
    /// License header lines (leading whitespace) and unparseable lines are skipped.
    pub fn with_part_of_speech(mut self, pos: PartOfSpeech, index: &str, data: &str) -> Self {
        let tables = self.tables.entry(pos).or_default();

        for line in index.lines().filter(|l| !l.starts_with(' ')) {
            if let Some((lemma, offsets)) = parse_index_line(line) {
                tables.index.insert(lemma, offsets);
            }
        }

        for line in data.lines().filter(|l| !l.starts_with(' ')) {
            if let Some(synset) = parse_data_line(line, pos) {
                tables.data.insert(synset.offset.clone(), synset);
            }
        }

        self
    }

    pub fn lemma_count(&self) -> usize {
        self.tables.values().map(|t| t.index.len()).sum()
    }

    /// All synsets containing `word`, noun first, in sense order.
    pub fn synsets(&self, word: &str) -> Vec<&Synset> {
        let key = normalize(word);
        let mut synsets = Vec::new();

        for pos in PartOfSpeech::ALL {
            let Some(tables) = self.tables.get(&pos) else {
                continue;
            };
            let Some(offsets) = tables.index.get(&key) else {
                continue;
            };
            synsets.extend(offsets.iter().filter_map(|offset| tables.data.get(offset)));
        }

        synsets
    }

    /// Lemmas of every synset of `word`, deduplicated in first-seen order,
    /// with underscores rendered as spaces.
    pub fn synonyms(&self, word: &str) -> Vec<String> {
        let mut synonyms: Vec<String> = Vec::new();

        for synset in self.synsets(word) {
            for lemma in &synset.lemmas {
                let lemma = lemma.replace('_', " ");
                if !synonyms.contains(&lemma) {
                    synonyms.push(lemma);
                }
            }
        }

        synonyms
    }

    /// Glosses of `word` grouped by part of speech, in lookup order.
    pub fn definitions(&self, word: &str) -> Vec<(PartOfSpeech, Vec<String>)> {
        let mut grouped: Vec<(PartOfSpeech, Vec<String>)> = Vec::new();

        for synset in self.synsets(word) {
            let definition = synset.definition().to_string();
            match grouped.iter_mut().find(|(pos, _)| *pos == synset.part_of_speech) {
                Some((_, definitions)) => definitions.push(definition),
                None => grouped.push((synset.part_of_speech, vec![definition])),
            }
        }

        grouped
    }
}

fn normalize(word: &str) -> String {
    word.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// `lemma pos synset_cnt p_cnt [ptr_symbol...] sense_cnt tagsense_cnt synset_offset...`
fn parse_index_line(line: &str) -> Option<(String, Vec<String>)> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let lemma = fields.first()?;
    let synset_cnt: usize = fields.get(2)?.parse().ok()?;
    if synset_cnt == 0 || fields.len() < 4 + synset_cnt {
        return None;
    }

    let offsets = fields[fields.len() - synset_cnt..]
        .iter()
        .map(|o| o.to_string())
        .collect();
    Some((lemma.to_string(), offsets))
}

/// `offset lex_filenum ss_type w_cnt word lex_id [word lex_id...] p_cnt ... | gloss`
fn parse_data_line(line: &str, pos: PartOfSpeech) -> Option<Synset> {
    let (head, gloss) = line.split_once('|')?;
    let fields: Vec<&str> = head.split_whitespace().collect();

    let offset = fields.first()?.to_string();
    let word_count = usize::from_str_radix(fields.get(3)?, 16).ok()?;

    let lemmas = (0..word_count)
        .filter_map(|i| fields.get(4 + i * 2))
        .map(|word| strip_adjective_marker(word).to_string())
        .collect::<Vec<_>>();

    if lemmas.len() != word_count {
        return None;
    }

    Some(Synset {
        offset,
        part_of_speech: pos,
        lemmas,
        gloss: gloss.trim().to_string(),
    })
}

/// Adjectives may carry a syntactic marker such as `glad(a)` or `galore(ip)`.
fn strip_adjective_marker(word: &str) -> &str {
    match word.find('(') {
        Some(i) if word.ends_with(')') => &word[..i],
        _ => word,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX_ADJ: &str = "  1 This software and database is being provided
happy a 4 6 ! & ^ = + ; 4 4 01148283 01051956 01048406 02565583
glad a 4 3 ! & ^ 4 3 01148283 01367008 01811941 00867618
";

    const DATA_ADJ: &str = "  1 This software and database is being provided
01148283 00 a 01 happy 0 012 | enjoying or showing or marked by joy or pleasure; \"a happy smile\"
01051956 00 s 02 felicitous 0 happy 0 001 | marked by good fortune; \"a felicitous life\"
01048406 00 s 02 glad(a) 0 happy(a) 0 001 | eagerly disposed to act or to be of service; \"glad to help\"
02565583 00 s 02 happy 0 well-chosen 0 001 | well expressed and to the point; \"a happy turn of phrase\"
01367008 00 s 01 glad 0 000 | showing or causing joy and pleasure
01811941 00 s 01 beaming 0 000 | cheerful and bright
00867618 00 s 01 glad 0 000 | feeling happy appreciation
";

    const INDEX_NOUN: &str = "hello n 1 1 @ 1 0 06628861
ice_cream n 1 1 @ 1 0 07614500
";

    const DATA_NOUN: &str = "06628861 10 n 05 hello 0 hullo 0 hi 0 howdy 0 how-do-you-do 0 001 @ 06628000 n 0000 | an expression of greeting; \"every morning they exchanged polite hellos\"
07614500 13 n 01 ice_cream 0 001 @ 07612996 n 0000 | frozen dessert containing cream and sugar and flavoring
";

    fn wordnet() -> WordNet {
        WordNet::new()
            .with_part_of_speech(PartOfSpeech::Adjective, INDEX_ADJ, DATA_ADJ)
            .with_part_of_speech(PartOfSpeech::Noun, INDEX_NOUN, DATA_NOUN)
    }

    #[test]
    fn test_parse_index_line_takes_trailing_offsets() {
        let (lemma, offsets) =
            parse_index_line("happy a 4 6 ! & ^ = + ; 4 4 01148283 01051956 01048406 02565583")
                .expect("should parse");
        assert_eq!(lemma, "happy");
        assert_eq!(
            offsets,
            vec!["01148283", "01051956", "01048406", "02565583"]
        );
    }

    #[test]
    fn test_parse_index_line_rejects_garbage() {
        assert!(parse_index_line("").is_none());
        assert!(parse_index_line("word n many").is_none());
    }

    #[test]
    fn test_parse_data_line_reads_hex_word_count() {
        let line = "06628861 10 n 05 hello 0 hullo 0 hi 0 howdy 0 how-do-you-do 0 001 @ 06628000 n 0000 | an expression of greeting";
        let synset = parse_data_line(line, PartOfSpeech::Noun).expect("should parse");
        assert_eq!(synset.offset, "06628861");
        assert_eq!(
            synset.lemmas,
            vec!["hello", "hullo", "hi", "howdy", "how-do-you-do"]
        );
        assert_eq!(synset.gloss, "an expression of greeting");
    }

    #[test]
    fn test_parse_data_line_strips_adjective_markers() {
        let line = "01048406 00 s 02 glad(a) 0 happy(a) 0 001 | eagerly disposed";
        let synset = parse_data_line(line, PartOfSpeech::Adjective).expect("should parse");
        assert_eq!(synset.lemmas, vec!["glad", "happy"]);
    }

    #[test]
    fn test_definition_drops_examples() {
        let wordnet = wordnet();
        let synsets = wordnet.synsets("happy");
        assert_eq!(
            synsets[0].definition(),
            "enjoying or showing or marked by joy or pleasure"
        );
    }

    #[test]
    fn test_synonyms_are_deduplicated_in_order() {
        assert_eq!(
            wordnet().synonyms("happy"),
            vec!["happy", "felicitous", "glad", "well-chosen"]
        );
    }

    #[test]
    fn test_synonyms_lookup_is_case_insensitive() {
        assert_eq!(wordnet().synonyms("Hello")[..3], ["hello", "hullo", "hi"]);
    }

    #[test]
    fn test_multiword_lemmas_use_spaces() {
        assert_eq!(wordnet().synonyms("ice cream"), vec!["ice cream"]);
    }

    #[test]
    fn test_unknown_word_has_no_synonyms() {
        assert!(wordnet().synonyms("qwertyuiop").is_empty());
    }

    #[test]
    fn test_definitions_grouped_by_part_of_speech() {
        let definitions = wordnet().definitions("glad");
        assert_eq!(definitions.len(), 1);
        assert_eq!(definitions[0].0, PartOfSpeech::Adjective);
        assert_eq!(definitions[0].1.len(), 4);
        assert_eq!(
            definitions[0].1[0],
            "enjoying or showing or marked by joy or pleasure"
        );
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("index.noun"), INDEX_NOUN).expect("write");
        std::fs::write(dir.path().join("data.noun"), DATA_NOUN).expect("write");

        let wordnet = WordNet::load(dir.path()).expect("should load");
        assert_eq!(wordnet.lemma_count(), 2);
        assert!(wordnet.synonyms("hello").contains(&"hi".to_string()));
    }

    #[test]
    fn test_load_empty_directory_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(WordNet::load(dir.path()).is_err());
    }
}
