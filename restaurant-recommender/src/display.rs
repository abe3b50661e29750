//! Terminal rendering of recommendations, statistics and errors.

use crate::error::RecommendError;
use crate::input::UserInput;
use crate::parser::{FALLBACK_NAME_SENTINEL, LIST_NAME_SENTINEL, RecommendationRecord};
use crate::recommender::RecommendationResult;

/// Cards rendered per report.
pub const DEFAULT_MAX_RECOMMENDATIONS: usize = 5;

const BOX_WIDTH: usize = 62;

/// Lines beginning with these are details, not names.
const DETAIL_PREFIXES: &[&str] = &["Why", "Standout", "Cost", "Note", "•", "-", "*"];
const INDENTED_PREFIXES: &[&str] = &["Why it's", "Standout", "Note", "Budget", "-", "•"];

const TIPS: &[&str] = &[
    "Call ahead to confirm availability and current prices",
    "Check restaurant hours before visiting",
    "Consider booking for popular restaurants, especially on weekends",
    "Payment methods may vary - check beforehand",
    "These recommendations are AI-generated based on your preferences",
];

const SUGGESTIONS: &[&str] = &[
    "Try increasing your budget range",
    "Consider nearby areas or different city names",
    "Check if dietary preferences are too restrictive",
    "Look for restaurants in neighboring locations",
];

#[derive(Debug, Clone, Copy)]
pub struct RecommendationDisplay {
    max_recommendations: usize,
}

impl Default for RecommendationDisplay {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RECOMMENDATIONS)
    }
}

impl RecommendationDisplay {
    pub fn new(max_recommendations: usize) -> Self {
        Self {
            max_recommendations,
        }
    }

    pub fn max_recommendations(&self) -> usize {
        self.max_recommendations
    }

    /// Full report: header, one card per record (capped), tips footer.
    pub fn format_recommendations(
        &self,
        result: &RecommendationResult,
        user_input: &UserInput,
    ) -> String {
        if result.recommendations.is_empty() {
            return self.format_no_recommendations(user_input);
        }

        let cards = result
            .recommendations
            .iter()
            .take(self.max_recommendations)
            .enumerate()
            .map(|(index, record)| format_card(index + 1, record))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "{header}\n\n{cards}\n\n{footer}",
            header = build_header(user_input, result.recommendations.len()),
            footer = build_footer(),
        )
    }

    pub fn format_no_recommendations(&self, user_input: &UserInput) -> String {
        let suggestions = SUGGESTIONS
            .iter()
            .map(|line| format!("• {line}"))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "\n{banner}\n\nSorry, we couldn't find any restaurants matching your criteria:\n\n\
             Location: {city}\nBudget: Rs.{price} for two people\nDiet: {diet}\n\n\
             Suggestions:\n{suggestions}\n\nPlease adjust your filters and try again!\n",
            banner = banner("NO RECOMMENDATIONS FOUND"),
            city = user_input.city(),
            price = user_input.price(),
            diet = user_input.diet(),
        )
    }

    pub fn format_statistics(
        &self,
        total_restaurants: usize,
        filtered_restaurants: usize,
        recommendations_count: usize,
    ) -> String {
        let match_rate = if total_restaurants > 0 {
            filtered_restaurants as f64 / total_restaurants as f64 * 100.0
        } else {
            0.0
        };

        format!(
            "\nRECOMMENDATION STATISTICS:\n\
             \x20  Total restaurants analyzed: {total}\n\
             \x20  Restaurants matching your criteria: {filtered}\n\
             \x20  Match rate: {match_rate:.1}%\n\
             \x20  AI recommendations generated: {recommendations_count}\n",
            total = group_thousands(total_restaurants),
            filtered = group_thousands(filtered_restaurants),
        )
    }

    /// Error block; validation problems get input hints, everything else a
    /// service hint.
    pub fn format_error(&self, error: &RecommendError) -> String {
        let hint = match error {
            RecommendError::Validation(_) => {
                "Please check your input:\n\
                 • City must not be empty\n\
                 • Budget must be a positive number (Rs. for two people)\n\
                 • Diet must be 'veg' or 'non-veg'"
            }
            RecommendError::MissingCredential => {
                "Set GROQ_API_KEY (or pass --api-key) and try again."
            }
            RecommendError::Gateway { .. } => {
                "The recommendation service could not be reached. Please try again in a moment."
            }
            RecommendError::Dataset(_) | RecommendError::Config(_) => {
                "Check the application configuration and dataset path."
            }
        };

        format!(
            "\n{banner}\n\n{error}\n\n{hint}\n",
            banner = banner("ERROR OCCURRED"),
        )
    }
}

fn banner(title: &str) -> String {
    let rule = "═".repeat(BOX_WIDTH);
    format!("╔{rule}╗\n║{title:^width$}║\n╚{rule}╝", width = BOX_WIDTH)
}

fn build_header(user_input: &UserInput, count: usize) -> String {
    format!(
        "\n{banner}\n\nYour Preferences:\n   Location: {city}\n   Budget: Rs.{price} for two people\n   \
         Diet: {diet}\n\nFound {count} recommendation(s) for you!",
        banner = banner("ZOMATO AI RESTAURANT RECOMMENDATIONS"),
        city = user_input.city(),
        price = user_input.price(),
        diet = user_input.diet(),
    )
}

fn build_footer() -> String {
    format!(
        "{banner}\n\n{tips}\n\nThank you for using Zomato AI Recommendation System!\n",
        banner = banner("TIPS & NOTES"),
        tips = TIPS.join("\n"),
    )
}

fn format_card(position: usize, record: &RecommendationRecord) -> String {
    let name = display_name(record);
    let content = clean_content(&record.raw_text, &name);
    let rule = "─".repeat(BOX_WIDTH - 1);
    let body = content
        .lines()
        .map(|line| format!("│ {line}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "┌{rule}┐\n│ RECOMMENDATION {position}: {title}\n├{rule}┤\n{body}\n└{rule}┘",
        title = name.to_uppercase(),
    )
}

/// `name_hint` unless it is the fallback sentinel, in which case the first
/// line that reads like a name.
fn display_name(record: &RecommendationRecord) -> String {
    if !record.name_hint.is_empty() && record.name_hint != FALLBACK_NAME_SENTINEL {
        return record.name_hint.clone();
    }

    record
        .raw_text
        .lines()
        .map(str::trim)
        .map(|line| line.replace("**", "").trim().to_string())
        .filter(|line| !DETAIL_PREFIXES.iter().any(|prefix| line.starts_with(prefix)))
        .find(|line| line.chars().count() > 2)
        .unwrap_or_else(|| LIST_NAME_SENTINEL.to_string())
}

/// Strips emphasis markers and a leading repeat of the name, indents detail
/// lines. Lines that held nothing but the name are dropped.
fn clean_content(content: &str, name: &str) -> String {
    content
        .lines()
        .map(|line| line.replace('*', ""))
        .filter_map(|line| {
            let line = strip_name_prefix(line.trim(), name).trim();
            if line.is_empty() {
                None
            } else if INDENTED_PREFIXES.iter().any(|prefix| line.starts_with(prefix)) {
                Some(format!("   {line}"))
            } else {
                Some(line.to_string())
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `"1. Pasta Hub - Cosy place"` becomes `"Cosy place"`; lines that do not
/// open with the name come back unchanged.
fn strip_name_prefix<'a>(line: &'a str, name: &str) -> &'a str {
    let unnumbered = line.trim_start_matches(|c: char| c.is_ascii_digit());
    let unnumbered = if unnumbered.len() < line.len() {
        unnumbered.trim_start_matches(['.', ')']).trim_start()
    } else {
        line
    };

    let name = name.trim();
    let Some(rest) = unnumbered
        .get(..name.len())
        .filter(|head| !name.is_empty() && head.eq_ignore_ascii_case(name))
        .map(|_| &unnumbered[name.len()..])
    else {
        return line;
    };
    if rest.starts_with(char::is_alphanumeric) {
        return line;
    }
    rest.trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '-' | ':' | ',' | '–' | '—'))
}

fn group_thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
