//! Rule-based phrase chunking and entity tagging for English text.
//!
//! Noun phrases are approximated as runs of content words between stopwords,
//! verb-like words, and clause punctuation. Entities come from capitalized
//! runs plus date, money, percent, and number patterns.

use trendscope_core::Entity;

use super::{EntityRecognizer, PhraseChunker};

const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "even",
    "few", "for", "from", "further", "get", "gets", "got", "had", "has", "have", "having", "he",
    "her", "here", "hers", "him", "his", "how", "i", "if", "in", "into", "is", "it", "its",
    "just", "like", "many", "may", "me", "might", "more", "most", "much", "must", "my", "no",
    "nor", "not", "now", "of", "off", "on", "once", "only", "or", "other", "our", "ours", "out",
    "over", "own", "said", "same", "say", "says", "she", "should", "so", "some", "still", "such",
    "than", "that", "the", "their", "theirs", "them", "then", "there", "these", "they", "this",
    "those", "through", "to", "too", "under", "until", "up", "us", "very", "was", "we", "were",
    "what", "when", "where", "which", "while", "who", "whom", "why", "will", "with", "would",
    "yes", "yet", "you", "your", "yours",
];

const MONTHS: &[&str] = &[
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december", "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep",
    "sept", "oct", "nov", "dec",
];

const WEEKDAYS: &[&str] = &[
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
];

const RELATIVE_DAYS: &[&str] = &["today", "tomorrow", "yesterday", "tonight"];

const MAGNITUDES: &[&str] = &["thousand", "million", "billion", "trillion"];

const ORG_SUFFIXES: &[&str] = &[
    "agency", "association", "bank", "club", "co", "committee", "company", "corp",
    "corporation", "council", "department", "fc", "foundation", "group", "inc", "institute",
    "league", "llc", "ltd", "ministry", "organization", "party", "plc", "university",
];

/// Prepositions that mark the following capitalized run as a place.
const LOCATION_CUES: &[&str] = &["in", "at", "from", "to", "near", "across", "around"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    None,
    Clause,
    Sentence,
}

#[derive(Debug)]
struct Token {
    word: String,
    lower: String,
    boundary: Boundary,
}

fn tokenize(text: &str) -> Vec<Token> {
    text.split_whitespace()
        .map(|raw| {
            let body = raw.trim_end_matches(|c: char| {
                matches!(c, '.' | ',' | '!' | '?' | ';' | ':' | ')' | '"' | '\'')
            });
            let tail = &raw[body.len()..];
            let boundary = if tail.contains(['.', '!', '?']) {
                Boundary::Sentence
            } else if tail.contains([',', ';', ':']) {
                Boundary::Clause
            } else {
                Boundary::None
            };
            let word = body.trim_start_matches(['(', '"', '\'']).to_string();
            Token {
                lower: word.to_lowercase(),
                word,
                boundary,
            }
        })
        .collect()
}

fn is_stopword(lower: &str) -> bool {
    STOPWORDS.contains(&lower)
}

fn is_verb_like(lower: &str) -> bool {
    lower.len() > 4 && (lower.ends_with("ing") || lower.ends_with("ed") || lower.ends_with("ly"))
}

fn is_capitalized(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase)
}

fn is_acronym(word: &str) -> bool {
    (2..=5).contains(&word.len()) && word.chars().all(|c| c.is_ascii_uppercase())
}

fn is_number(word: &str) -> bool {
    word.chars().next().is_some_and(|c| c.is_ascii_digit())
        && word.chars().all(|c| c.is_ascii_digit() || c == ',' || c == '.')
}

fn is_year(word: &str) -> bool {
    word.len() == 4 && word.parse::<u32>().is_ok_and(|y| (1900..=2099).contains(&y))
}

/// Day-of-month (`3`, `21st`) or year following a month name.
fn is_date_number(lower: &str) -> bool {
    let digits = lower.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    let suffix = &lower[digits.len()..];
    !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit())
        && ((digits.len() <= 2 && matches!(suffix, "" | "st" | "nd" | "rd" | "th"))
            || (suffix.is_empty() && is_year(digits)))
}

fn is_calendar_word(token: &Token) -> bool {
    is_capitalized(&token.word)
        && (MONTHS.contains(&token.lower.as_str()) || WEEKDAYS.contains(&token.lower.as_str()))
}

fn join(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.word.as_str()).collect::<Vec<_>>().join(" ")
}

/// Rule-based chunker and recognizer; needs no model files.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedNlp;

impl PhraseChunker for RuleBasedNlp {
    fn noun_phrases(&self, text: &str) -> Vec<String> {
        let mut phrases = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let tokens = tokenize(text);

        for token in &tokens {
            let content = token.word.chars().any(char::is_alphabetic)
                && !is_stopword(&token.lower)
                && !is_verb_like(&token.lower);
            if content {
                current.push(&token.word);
            } else if !current.is_empty() {
                phrases.push(current.join(" "));
                current.clear();
            }
            if token.boundary != Boundary::None && !current.is_empty() {
                phrases.push(current.join(" "));
                current.clear();
            }
        }
        if !current.is_empty() {
            phrases.push(current.join(" "));
        }
        phrases
    }
}

impl EntityRecognizer for RuleBasedNlp {
    fn entities(&self, text: &str) -> Vec<Entity> {
        let tokens = tokenize(text);
        let mut entities = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            let (next, span) = match_entity(&tokens, i);
            if let Some(span) = span {
                entities.push(Entity {
                    text: join(&tokens[span.start..span.end]),
                    label: span.label.to_string(),
                });
            }
            i = next.max(i + 1);
        }
        entities
    }
}

/// Token range of a tagged entity.
struct Span {
    start: usize,
    end: usize,
    label: &'static str,
}

/// Match an entity starting at `i`.
///
/// Returns the index to resume scanning from and the entity found, if any.
fn match_entity(tokens: &[Token], i: usize) -> (usize, Option<Span>) {
    let token = &tokens[i];
    let lower = token.lower.as_str();
    if token.word.is_empty() {
        return (i + 1, None);
    }

    if is_calendar_word(token) {
        let mut end = i + 1;
        while end < tokens.len()
            && tokens[end - 1].boundary != Boundary::Sentence
            && is_date_number(&tokens[end].lower)
        {
            end += 1;
        }
        return (end, Some(Span { start: i, end, label: "DATE" }));
    }
    if is_year(lower) || RELATIVE_DAYS.contains(&lower) {
        return (i + 1, Some(Span { start: i, end: i + 1, label: "DATE" }));
    }

    if let Some(amount) = lower.strip_prefix('$') {
        if is_number(amount) {
            let end = absorb_magnitude(tokens, i);
            return (end, Some(Span { start: i, end, label: "MONEY" }));
        }
    }
    if let Some(amount) = lower.strip_suffix('%') {
        if is_number(amount) {
            return (i + 1, Some(Span { start: i, end: i + 1, label: "PERCENT" }));
        }
    }
    if is_number(lower) {
        if tokens.get(i + 1).is_some_and(|next| next.lower == "percent") && token.boundary == Boundary::None {
            return (i + 2, Some(Span { start: i, end: i + 2, label: "PERCENT" }));
        }
        let end = absorb_magnitude(tokens, i);
        return (end, Some(Span { start: i, end, label: "CARDINAL" }));
    }

    if is_capitalized(&token.word) {
        return match_capitalized_run(tokens, i);
    }
    (i + 1, None)
}

fn absorb_magnitude(tokens: &[Token], i: usize) -> usize {
    match tokens.get(i + 1) {
        Some(next) if tokens[i].boundary == Boundary::None && MAGNITUDES.contains(&next.lower.as_str()) => i + 2,
        _ => i + 1,
    }
}

fn match_capitalized_run(tokens: &[Token], i: usize) -> (usize, Option<Span>) {
    let mut end = i;
    while end < tokens.len() && is_capitalized(&tokens[end].word) && !is_calendar_word(&tokens[end]) {
        end += 1;
        if tokens[end - 1].boundary != Boundary::None {
            break;
        }
    }
    if end == i {
        return (i + 1, None);
    }

    let mut start = i;
    while start < end && is_stopword(&tokens[start].lower) {
        start += 1;
    }
    let mut stop = end;
    while stop > start && is_stopword(&tokens[stop - 1].lower) {
        stop -= 1;
    }
    if start == stop {
        return (end, None);
    }

    let run = &tokens[start..stop];
    let sentence_initial = start == 0 || tokens[start - 1].boundary == Boundary::Sentence;
    if run.len() == 1 && sentence_initial && !is_acronym(&run[0].word) {
        return (end, None);
    }

    let last = run[run.len() - 1].lower.as_str();
    let label = if ORG_SUFFIXES.contains(&last) || run.iter().any(|t| is_acronym(&t.word)) {
        "ORG"
    } else if start > 0 && LOCATION_CUES.contains(&tokens[start - 1].lower.as_str()) {
        "LOC"
    } else if (2..=3).contains(&run.len()) {
        "PERSON"
    } else {
        "MISC"
    };
    (end, Some(Span { start, end: stop, label }))
}
