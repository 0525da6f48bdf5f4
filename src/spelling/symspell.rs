use std::collections::{HashMap, HashSet};

/// Longest word, in `char`s, that is indexed or looked up. Delete variants
/// grow cubically with length, so longer tokens never get candidates.
pub const MAX_WORD_CHARS: usize = 24;

/// Symmetric-delete candidate index.
///
/// Every dictionary word is stored under all of its delete variants up to
/// `max_edit_distance`. A lookup generates the deletes of the input and
/// collects the words they point back to, so the cost depends on the input
/// length, not on the dictionary size. Edits operate on `char`s, which keeps
/// Thai and accented Latin text intact.
#[derive(Debug, Clone)]
pub struct SymSpell {
    deletes: HashMap<String, Vec<String>>,
    max_edit_distance: usize,
}

impl SymSpell {
    pub fn new(max_edit_distance: usize) -> Self {
        Self {
            deletes: HashMap::new(),
            max_edit_distance,
        }
    }

    pub fn max_edit_distance(&self) -> usize {
        self.max_edit_distance
    }

    /// Words longer than [`MAX_WORD_CHARS`] are not indexed.
    pub fn add_word(&mut self, word: &str) {
        if word.chars().count() > MAX_WORD_CHARS {
            return;
        }
        for edit in self.generate_edits(word) {
            let words = self.deletes.entry(edit).or_default();
            if !words.iter().any(|w| w == word) {
                words.push(word.to_string());
            }
        }
    }

    /// Words whose true edit distance to `input` is within the limit,
    /// paired with that distance. Empty for input longer than [`MAX_WORD_CHARS`].
    pub fn lookup(&self, input: &str) -> Vec<(&str, usize)> {
        if input.chars().count() > MAX_WORD_CHARS {
            return Vec::new();
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let mut candidates = Vec::new();

        for edit in self.generate_edits(input) {
            let Some(words) = self.deletes.get(&edit) else {
                continue;
            };
            for word in words {
                if !seen.insert(word.as_str()) {
                    continue;
                }
                let distance = edit_distance(input, word);
                if distance <= self.max_edit_distance {
                    candidates.push((word.as_str(), distance));
                }
            }
        }

        candidates
    }

    /// All unique variants reachable by deleting up to `max_edit_distance`
    /// characters, including the word itself.
    fn generate_edits(&self, word: &str) -> HashSet<String> {
        let mut edits = HashSet::new();
        edits.insert(word.to_string());

        let mut current: Vec<Vec<char>> = vec![word.chars().collect()];

        for _ in 0..self.max_edit_distance {
            let mut next = Vec::new();
            for chars in &current {
                for i in 0..chars.len() {
                    let mut variant = chars.clone();
                    variant.remove(i);
                    if edits.insert(variant.iter().collect()) {
                        next.push(variant);
                    }
                }
            }
            current = next;
        }

        edits
    }
}

/// Optimal string alignment distance (Damerau-Levenshtein restricted to
/// non-overlapping transpositions), counted in `char`s.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let width = b.len() + 1;
    let mut d = vec![0usize; (a.len() + 1) * width];

    for i in 0..=a.len() {
        d[i * width] = i;
    }
    for j in 0..=b.len() {
        d[j] = j;
    }

    for i in 1..=a.len() {
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            let mut best = (d[(i - 1) * width + j] + 1)
                .min(d[i * width + j - 1] + 1)
                .min(d[(i - 1) * width + j - 1] + cost);

            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                best = best.min(d[(i - 2) * width + j - 2] + 1);
            }

            d[i * width + j] = best;
        }
    }

    d[a.len() * width + b.len()]
}
