//! Entity recognition
//!
//! Names come from a lexicon (usually the narrative store's known entities),
//! matched case-insensitively on token boundaries. Without a lexicon the
//! recognizer falls back to runs of capitalized words.

use canon_domain::text::{is_stopword, tokens};
use std::collections::BTreeSet;

/// Capitalized words that never start or form a name
const NAME_STOPLIST: &[&str] = &[
    "chapter", "part", "book", "volume", "prologue", "epilogue", "later", "meanwhile", "yesterday",
    "today", "tomorrow", "years", "months", "days", "one", "two", "three", "first", "finally",
    "however", "still", "yet", "now", "soon", "never", "not", "no", "yes", "because", "since",
    "due", "mr", "mrs", "ms", "dr", "monsieur", "madame", "mademoiselle", "sir", "lady", "lord",
];

#[derive(Debug, Clone)]
struct LexiconEntry {
    name: String,
    tokens: Vec<String>,
}

/// Finds subject entities in a piece of text
#[derive(Debug, Clone, Default)]
pub struct EntityRecognizer {
    lexicon: Vec<LexiconEntry>,
    capitalized_fallback: bool,
}

impl EntityRecognizer {
    /// Create a recognizer; `capitalized_fallback` applies only while the lexicon is empty
    pub fn new(capitalized_fallback: bool) -> Self {
        Self {
            lexicon: Vec::new(),
            capitalized_fallback,
        }
    }

    /// Replace the lexicon
    ///
    /// Longer names are tried first so "Edmond Dantès" wins over "Edmond".
    pub fn with_lexicon<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut lexicon: Vec<LexiconEntry> = names
            .into_iter()
            .filter_map(|name| {
                let name: String = name.into();
                let entry = LexiconEntry {
                    tokens: tokens(&name),
                    name: name.trim().to_string(),
                };
                (!entry.tokens.is_empty()).then_some(entry)
            })
            .collect();
        lexicon.sort_by(|a, b| {
            b.tokens
                .len()
                .cmp(&a.tokens.len())
                .then_with(|| a.tokens.cmp(&b.tokens))
                .then_with(|| a.name.cmp(&b.name))
        });
        lexicon.dedup_by(|a, b| a.tokens == b.tokens);
        self.lexicon = lexicon;
        self
    }

    /// Number of lexicon names
    pub fn lexicon_len(&self) -> usize {
        self.lexicon.len()
    }

    /// Entities named in `text`
    pub fn recognize(&self, text: &str) -> BTreeSet<String> {
        if !self.lexicon.is_empty() {
            return self.match_lexicon(text);
        }
        if self.capitalized_fallback {
            return capitalized_names(text);
        }
        BTreeSet::new()
    }

    fn match_lexicon(&self, text: &str) -> BTreeSet<String> {
        let words = tokens(text);
        let mut taken = vec![false; words.len()];
        let mut found = BTreeSet::new();

        for entry in &self.lexicon {
            let n = entry.tokens.len();
            if n > words.len() {
                continue;
            }
            for start in 0..=(words.len() - n) {
                if taken[start..start + n].iter().any(|t| *t) {
                    continue;
                }
                if words[start..start + n] == entry.tokens[..] {
                    taken[start..start + n].iter_mut().for_each(|t| *t = true);
                    found.insert(entry.name.clone());
                }
            }
        }
        found
    }
}

/// Runs of capitalized words, skipping function words and the stop list
///
/// A run breaks at punctuation, so "Anna, Pierre" gives two names.
pub fn capitalized_names(text: &str) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    let mut run: Vec<&str> = Vec::new();

    for raw in text.split_whitespace() {
        let word = raw.trim_matches(|c: char| !c.is_alphanumeric());
        let word = word
            .strip_suffix("'s")
            .or_else(|| word.strip_suffix("\u{2019}s"))
            .unwrap_or(word);
        let breaks_after = raw
            .chars()
            .last()
            .map_or(false, |c| !c.is_alphanumeric());

        if is_name_word(word) {
            run.push(word);
        } else {
            flush(&mut run, &mut found);
        }
        if breaks_after {
            flush(&mut run, &mut found);
        }
    }
    flush(&mut run, &mut found);
    found
}

fn is_name_word(word: &str) -> bool {
    let starts_upper = word.chars().next().map_or(false, char::is_uppercase);
    if !starts_upper {
        return false;
    }
    let lower = word.to_lowercase();
    !is_stopword(&lower) && !NAME_STOPLIST.contains(&lower.as_str())
}

fn flush(run: &mut Vec<&str>, found: &mut BTreeSet<String>) {
    if !run.is_empty() {
        found.insert(run.join(" "));
        run.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(set: BTreeSet<String>) -> Vec<String> {
        set.into_iter().collect()
    }

    #[test]
    fn test_lexicon_is_case_insensitive() {
        let recognizer = EntityRecognizer::new(true).with_lexicon(["Anna", "Pierre"]);
        assert_eq!(names(recognizer.recognize("later ANNA met pierre's brother")), vec!["Anna", "Pierre"]);
    }

    #[test]
    fn test_lexicon_prefers_longest_name() {
        let recognizer = EntityRecognizer::new(false).with_lexicon(["Edmond", "Edmond Dantès"]);
        assert_eq!(names(recognizer.recognize("Edmond Dantès sailed")), vec!["Edmond Dantès"]);
        assert_eq!(names(recognizer.recognize("Edmond sailed")), vec!["Edmond"]);
    }

    #[test]
    fn test_lexicon_disables_fallback() {
        let recognizer = EntityRecognizer::new(true).with_lexicon(["Anna"]);
        assert!(recognizer.recognize("Pierre sold bread").is_empty());
    }

    #[test]
    fn test_capitalized_fallback() {
        let recognizer = EntityRecognizer::new(true);
        assert_eq!(
            names(recognizer.recognize("After the war, Edmond Dantès met Mercédès in Marseille.")),
            vec!["Edmond Dantès", "Marseille", "Mercédès"]
        );
    }

    #[test]
    fn test_capitalized_skips_stoplist() {
        assert!(capitalized_names("The ship sailed. Chapter one. Later she returned.").is_empty());
    }

    #[test]
    fn test_punctuation_breaks_runs() {
        assert_eq!(names(capitalized_names("Anna, Pierre and Marie")), vec!["Anna", "Marie", "Pierre"]);
    }

    #[test]
    fn test_no_fallback_no_lexicon() {
        assert!(EntityRecognizer::new(false).recognize("Anna left").is_empty());
    }
}
