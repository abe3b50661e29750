//! Turns free-form LLM text into [`RecommendationRecord`]s.
//!
//! Parsing is a chain of [`ParseStrategy`] implementations tried in order:
//! numbered list, bullet list, then a single-block fallback that accepts any
//! non-empty text. The chain therefore never fails; the worst case is one
//! record holding the whole response.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// `name_hint` for list items whose first line yields no name.
pub const LIST_NAME_SENTINEL: &str = "Restaurant";

/// `name_hint` for the single-block fallback when no name-like phrase is found.
pub const FALLBACK_NAME_SENTINEL: &str = "See response";

static NUMBERED_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:\*\*)?\d{1,3}[.)](?:\s+|$)").expect("numbered marker pattern is valid")
});

static BULLET_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)[-•*]\s+").expect("bullet marker pattern is valid"));

static CAPITALIZED_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Z][\w'&]*(?:[ \t]+[A-Z][\w'&]*)*").expect("capitalized phrase pattern is valid")
});

/// Capitalized words that open a sentence without being part of a name.
const LEADING_WORDS: &[&str] = &[
    "A", "An", "Based", "Check", "Consider", "Enjoy", "For", "Go", "Head", "Here", "I", "If",
    "It", "My", "No", "Our", "Please", "Sorry", "The", "There", "This", "Try", "Unfortunately",
    "Visit", "We", "You",
];

/// One recommendation extracted from the LLM's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub raw_text: String,
    /// Best-effort restaurant name; never empty.
    pub name_hint: String,
}

impl RecommendationRecord {
    pub fn new(raw_text: impl Into<String>, name_hint: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            name_hint: name_hint.into(),
        }
    }
}

/// One way of recognising recommendation blocks in text.
pub trait ParseStrategy: Send + Sync {
    /// Identifier used in logs.
    fn id(&self) -> &str;

    /// `None` when the text does not have this strategy's shape.
    fn parse(&self, raw: &str) -> Option<Vec<RecommendationRecord>>;
}

/// Items introduced by `1.`, `2)` and so on at line starts.
pub struct NumberedListStrategy;

impl ParseStrategy for NumberedListStrategy {
    fn id(&self) -> &str {
        "numbered_list"
    }

    fn parse(&self, raw: &str) -> Option<Vec<RecommendationRecord>> {
        let starts: Vec<bool> = raw
            .lines()
            .map(|line| NUMBERED_MARKER.is_match(line))
            .collect();
        split_blocks(raw, &NUMBERED_MARKER, &starts)
    }
}

/// Items introduced by `-`, `•` or `*`; only the shallowest bullets start items,
/// deeper ones stay inside the current item.
pub struct BulletListStrategy;

impl ParseStrategy for BulletListStrategy {
    fn id(&self) -> &str {
        "bullet_list"
    }

    fn parse(&self, raw: &str) -> Option<Vec<RecommendationRecord>> {
        let indents: Vec<Option<usize>> = raw
            .lines()
            .map(|line| {
                BULLET_MARKER
                    .captures(line)
                    .and_then(|caps| caps.get(1))
                    .map(|indent| indent.as_str().chars().count())
            })
            .collect();
        let top_level = indents.iter().flatten().min().copied()?;
        let starts: Vec<bool> = indents
            .iter()
            .map(|indent| *indent == Some(top_level))
            .collect();
        split_blocks(raw, &BULLET_MARKER, &starts)
    }
}

/// The whole text as one record.
pub struct SingleBlockStrategy;

impl ParseStrategy for SingleBlockStrategy {
    fn id(&self) -> &str {
        "single_block"
    }

    fn parse(&self, raw: &str) -> Option<Vec<RecommendationRecord>> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }
        let name_hint = name_from_prose(text).unwrap_or_else(|| FALLBACK_NAME_SENTINEL.to_string());
        Some(vec![RecommendationRecord::new(text, name_hint)])
    }
}

/// Ordered strategy chain.
pub struct ResponseParser {
    strategies: Vec<Box<dyn ParseStrategy>>,
}

impl ResponseParser {
    pub fn new(strategies: Vec<Box<dyn ParseStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn parse(&self, raw: &str) -> Vec<RecommendationRecord> {
        if raw.trim().is_empty() {
            return Vec::new();
        }
        for strategy in &self.strategies {
            if let Some(records) = strategy.parse(raw) {
                tracing::debug!(
                    strategy = strategy.id(),
                    records = records.len(),
                    "Parsed LLM response"
                );
                return records;
            }
        }
        Vec::new()
    }
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new(vec![
            Box::new(NumberedListStrategy),
            Box::new(BulletListStrategy),
            Box::new(SingleBlockStrategy),
        ])
    }
}

/// Parse with the default strategy chain.
pub fn parse_recommendations(raw: &str) -> Vec<RecommendationRecord> {
    ResponseParser::default().parse(raw)
}

/// Group lines into blocks, a new block beginning at every line flagged in
/// `starts`. Text before the first block is dropped.
fn split_blocks(raw: &str, marker: &Regex, starts: &[bool]) -> Option<Vec<RecommendationRecord>> {
    let mut blocks: Vec<Vec<String>> = Vec::new();

    for (line, &is_start) in raw.lines().zip(starts) {
        if is_start {
            let content = marker.replace(line, "").trim().to_string();
            blocks.push(vec![content]);
        } else if let Some(block) = blocks.last_mut() {
            let line = line.trim();
            if !line.is_empty() {
                block.push(line.to_string());
            }
        }
    }

    let records: Vec<RecommendationRecord> = blocks
        .into_iter()
        .filter_map(|lines| {
            let lines: Vec<String> = lines.into_iter().filter(|line| !line.is_empty()).collect();
            let first = lines.first()?;
            let name_hint = name_from_list_item(first);
            Some(RecommendationRecord::new(lines.join("\n"), name_hint))
        })
        .collect();

    (!records.is_empty()).then_some(records)
}

/// Text before the first separator of an item's first line, without bold markup.
pub fn name_from_list_item(line: &str) -> String {
    let cleaned = line.replace("**", "").replace("__", "");
    let name = match separator_index(&cleaned) {
        Some(index) => &cleaned[..index],
        None => cleaned.as_str(),
    };
    let name = name
        .trim()
        .trim_matches(|c: char| c == '*' || c == '#' || c == '"')
        .trim();

    if name.is_empty() {
        LIST_NAME_SENTINEL.to_string()
    } else {
        name.to_string()
    }
}

/// Byte index of the first `:`, `–`, `—`, or `-` that is not joining two
/// word characters (so hyphenated names survive).
fn separator_index(text: &str) -> Option<usize> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    chars.iter().enumerate().find_map(|(pos, &(index, c))| match c {
        ':' | '–' | '—' => Some(index),
        '-' => {
            let before = pos.checked_sub(1).map(|p| chars[p].1);
            let after = chars.get(pos + 1).map(|&(_, c)| c);
            let joins_word = before.is_some_and(char::is_alphanumeric)
                && after.is_some_and(char::is_alphanumeric);
            (!joins_word).then_some(index)
        }
        _ => None,
    })
}

/// First capitalized phrase of the first sentence, ignoring an opening word
/// like "Try" or "The".
fn name_from_prose(text: &str) -> Option<String> {
    let first_line = text.lines().next()?.trim();
    let sentence_end = first_line
        .find(". ")
        .or_else(|| first_line.find(['!', '?']))
        .unwrap_or(first_line.len());
    let sentence = first_line[..sentence_end].replace("**", "");

    CAPITALIZED_PHRASE.find_iter(&sentence).find_map(|phrase| {
        let mut words: Vec<&str> = phrase.as_str().split_whitespace().collect();
        if phrase.start() == 0 && words.first().is_some_and(|word| LEADING_WORDS.contains(word)) {
            words.remove(0);
        }
        (!words.is_empty()).then(|| words.join(" "))
    })
}
