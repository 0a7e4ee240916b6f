//! Text normalization shared by extraction, retrieval and checking
//!
//! Everything here is a pure function over `&str`; no locale or model state.

/// Function words ignored when comparing claim and evidence content
const STOPWORDS: &[&str] = &[
    "a", "about", "after", "again", "all", "also", "an", "and", "any", "are", "as", "at", "be",
    "been", "before", "being", "but", "by", "could", "did", "do", "does", "during", "each", "for",
    "from", "had", "has", "have", "he", "her", "hers", "him", "his", "i", "if", "in", "into", "is",
    "it", "its", "of", "on", "once", "or", "our", "she", "so", "some", "than", "that", "the",
    "their", "them", "then", "there", "these", "they", "this", "those", "to", "too", "until",
    "upon", "very", "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom",
    "why", "will", "with", "would", "you", "your",
];

/// Words that flip the polarity of the clause they appear in
const NEGATIONS: &[&str] = &[
    "no", "not", "never", "nor", "none", "nobody", "nothing", "neither", "nowhere", "cannot",
    "without",
];

/// Conjunctions that open a new clause
const CLAUSE_CONJUNCTIONS: &[&str] = &["and", "but", "yet", "while", "whereas", "although", "though"];

/// Collapse whitespace and strip trailing sentence punctuation
///
/// # Examples
///
/// ```
/// use canon_domain::text::normalize;
///
/// assert_eq!(normalize("  Anna   left\nhome. "), "Anna left home");
/// ```
pub fn normalize(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_end_matches(|c: char| matches!(c, '.' | '!' | '?' | ';' | ':' | ','))
        .trim()
        .to_string()
}

/// Lowercase word tokens, splitting on anything that is not alphanumeric.
///
/// Contractions ending in "n't" yield an extra "not" token.
pub fn tokens(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    for raw in text.split(|c: char| !(c.is_alphanumeric() || c == '\'')) {
        let word = raw.trim_matches('\'').to_lowercase();
        if word.is_empty() {
            continue;
        }
        if let Some(stem) = word.strip_suffix("n't") {
            if !stem.is_empty() {
                out.push(stem.to_string());
            }
            out.push("not".to_string());
            continue;
        }
        let word = word.strip_suffix("'s").unwrap_or(&word).to_string();
        out.push(word);
    }
    out
}

/// True for function words
pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

/// True for negation markers
pub fn is_negation(word: &str) -> bool {
    NEGATIONS.contains(&word)
}

/// Distinct content words in order of first appearance
///
/// Stopwords and negations are dropped; negation is tracked separately by
/// [`is_negated`].
pub fn content_words(text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for word in tokens(text) {
        if is_stopword(&word) || is_negation(&word) {
            continue;
        }
        if !out.contains(&word) {
            out.push(word);
        }
    }
    out
}

/// True when the text carries an odd number of negation markers
pub fn is_negated(text: &str) -> bool {
    tokens(text).iter().filter(|w| is_negation(w)).count() % 2 == 1
}

/// Clauses of `text`, split on `,` `;` `:` and on clause-opening conjunctions
///
/// Empty pieces are dropped; with no separators the whole text is one clause.
///
/// # Examples
///
/// ```
/// use canon_domain::text::clauses;
///
/// assert_eq!(
///     clauses("Anna fled the city at night, carrying nothing"),
///     vec!["Anna fled the city at night", "carrying nothing"]
/// );
/// ```
pub fn clauses(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    for piece in text.split(|c: char| matches!(c, ',' | ';' | ':')) {
        let mut current: Vec<&str> = Vec::new();
        for word in piece.split_whitespace() {
            let bare = word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase();
            if CLAUSE_CONJUNCTIONS.contains(&bare.as_str()) && !current.is_empty() {
                out.push(current.join(" "));
                current.clear();
            }
            current.push(word);
        }
        if !current.is_empty() {
            out.push(current.join(" "));
        }
    }
    out
}

/// Fraction of `needle` words that also occur in `haystack` (0.0 when empty)
pub fn overlap(needle: &[String], haystack: &[String]) -> f64 {
    if needle.is_empty() {
        return 0.0;
    }
    let hits = needle.iter().filter(|w| haystack.contains(w)).count();
    hits as f64 / needle.len() as f64
}
