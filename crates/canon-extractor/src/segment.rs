//! Sentence and clause segmentation with byte spans

use canon_domain::{Span, TemporalOrder};

/// Abbreviations whose trailing period does not end a sentence
const ABBREVIATIONS: &[&str] = &["mr", "mrs", "ms", "dr", "st", "mme", "mlle", "capt", "col", "gen", "lt", "rev"];

/// A piece of the backstory with its location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    /// Byte span in the backstory
    pub span: Span,
    /// The text covered by `span`
    pub text: &'a str,
}

impl<'a> Segment<'a> {
    /// Sub-segment of `self` at local byte range `[start, end)`, trimmed of whitespace.
    /// `None` when nothing word-like remains.
    fn sub(&self, start: usize, end: usize) -> Option<Segment<'a>> {
        let raw = self.text.get(start..end)?;
        let lead = raw.len() - raw.trim_start().len();
        let trimmed = raw.trim();
        if !trimmed.chars().any(char::is_alphanumeric) {
            return None;
        }
        let abs = self.span.start + start + lead;
        Some(Segment {
            span: Span::new(abs, abs + trimmed.len()),
            text: trimmed,
        })
    }

    /// Number of whitespace-separated words
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// True if the segment ends with a question mark
    pub fn is_question(&self) -> bool {
        self.text.trim_end().ends_with('?')
    }
}

/// Split text into sentences
///
/// A sentence ends at `.`, `!` or `?` followed by whitespace or end of text,
/// or at a blank line. Spans are trimmed of surrounding whitespace.
pub fn sentences(text: &str) -> Vec<Segment<'_>> {
    let whole = Segment {
        span: Span::new(0, text.len()),
        text,
    };
    let mut out = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let next = chars.peek().map(|&(_, n)| n);
        let end = i + c.len_utf8();

        let boundary = match c {
            '.' => next.map_or(true, char::is_whitespace) && !ends_with_abbreviation(&text[start..i]),
            '!' | '?' => next.map_or(true, char::is_whitespace),
            '\n' => blank_line_follows(&text[end..]),
            _ => false,
        };

        if boundary {
            if let Some(segment) = whole.sub(start, end) {
                out.push(segment);
            }
            start = end;
        }
    }

    if let Some(segment) = whole.sub(start, text.len()) {
        out.push(segment);
    }
    out
}

fn blank_line_follows(rest: &str) -> bool {
    for c in rest.chars() {
        if c == '\n' {
            return true;
        }
        if !c.is_whitespace() {
            return false;
        }
    }
    false
}

fn ends_with_abbreviation(before: &str) -> bool {
    before
        .rsplit(|c: char| !c.is_alphabetic())
        .next()
        .map(|word| ABBREVIATIONS.contains(&word.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Link between the two clauses of a compound sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    /// "because", "since", "due to"
    Causal,
    /// "before", "after"
    Temporal(TemporalOrder),
}

const CONNECTIVES: &[(&str, Connective)] = &[
    ("because", Connective::Causal),
    ("since", Connective::Causal),
    ("due to", Connective::Causal),
    ("before", Connective::Temporal(TemporalOrder::Before)),
    ("after", Connective::Temporal(TemporalOrder::After)),
];

/// A compound sentence split into its dependent clause X and antecedent clause Y
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compound<'a> {
    /// The clause that depends on the other ("Anna fled")
    pub dependent: Segment<'a>,
    /// The clause depended upon ("the fire")
    pub antecedent: Segment<'a>,
    /// How the clauses relate
    pub connective: Connective,
}

/// Split `sentence` at its first connective
///
/// Handles the infix form "X conn Y" and the prefix form "Conn Y, X".
/// Returns `None` when there is no connective or one side would be empty.
pub fn split_compound<'a>(sentence: &Segment<'a>) -> Option<Compound<'a>> {
    let (at, word, connective) = first_connective(sentence.text)?;
    let after = at + word.len();

    if at == 0 {
        let comma = sentence.text[after..].find(',')? + after;
        let antecedent = sentence.sub(skip_of(sentence.text, after), comma)?;
        let dependent = sentence.sub(comma + 1, sentence.text.len())?;
        return Some(Compound { dependent, antecedent, connective });
    }

    let dependent = sentence.sub(0, at)?;
    let antecedent = sentence.sub(skip_of(sentence.text, after), sentence.text.len())?;
    Some(Compound { dependent, antecedent, connective })
}

/// Earliest whole-word connective in `text`, case-insensitive
fn first_connective(text: &str) -> Option<(usize, &'static str, Connective)> {
    text.char_indices()
        .filter(|&(i, _)| i == 0 || !is_word_char(text[..i].chars().next_back()))
        .find_map(|(i, _)| {
            CONNECTIVES.iter().find_map(|&(word, connective)| {
                let candidate = text.get(i..i + word.len())?;
                let followed = text[i + word.len()..].chars().next();
                (candidate.eq_ignore_ascii_case(word) && !is_word_char(followed))
                    .then_some((i, word, connective))
            })
        })
}

/// Skip a leading "of" after "because" ("because of the war")
fn skip_of(text: &str, from: usize) -> usize {
    let rest = &text[from..];
    let trimmed = rest.trim_start();
    let offset = from + (rest.len() - trimmed.len());
    match trimmed.get(..3) {
        Some(head) if head.eq_ignore_ascii_case("of ") => offset + 3,
        _ => from,
    }
}

fn is_word_char(c: Option<char>) -> bool {
    c.map_or(false, |c| c.is_alphanumeric() || c == '\'')
}
