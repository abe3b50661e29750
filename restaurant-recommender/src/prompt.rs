//! Renders the candidate set into the text sent to the LLM.
//!
//! The prompt depends on the [`IntegrationContext`] alone, so the same context
//! always yields the same prompt.

use std::fmt::Write;

use crate::context::IntegrationContext;
use crate::dataset::RestaurantRow;

/// Upper bound on restaurants listed in one prompt.
pub const MAX_ROWS: usize = 20;

/// Emitted instead of a restaurant list when nothing matched.
pub const NO_RESTAURANTS_SENTINEL: &str = "No restaurants found matching the criteria.";

/// Static role description sent as the system message.
pub const SYSTEM_PROMPT: &str = "You are a friendly restaurant recommendation writer for Zomato. \
You recommend restaurants only from the list you are given, respect the diner's budget and \
dietary preference, and explain each pick in one or two sentences.";

const NOT_AVAILABLE: &str = "N/A";

pub fn build_prompt(context: &IntegrationContext) -> String {
    build_prompt_with_limit(context, MAX_ROWS)
}

pub fn build_prompt_with_limit(context: &IntegrationContext, max_rows: usize) -> String {
    let input = context.user_input();
    let summary = if context.is_empty() {
        NO_RESTAURANTS_SENTINEL.to_string()
    } else {
        build_restaurant_summary(context.filtered_rows(), max_rows)
    };
    let shown = context.total_matches().min(max_rows);

    format!(
        r#"A diner is looking for a restaurant.

Preferences:
- City: {city}
- Budget: Rs.{price} for two people
- Diet: {diet}

Matching restaurants ({shown} of {total} shown):
{summary}

Recommend up to 5 restaurants from the list above that best fit these preferences.
Answer as a numbered list, one restaurant per item, in the form:
1. Restaurant Name - why it is a good choice, standout dishes, and cost for two.
If no restaurants are listed, say so and suggest how the diner could adjust the budget, diet or city."#,
        city = input.city(),
        price = input.price(),
        diet = input.diet(),
        total = context.total_matches(),
    )
}

/// Numbered one-line summaries of the first `max_rows` rows.
pub fn build_restaurant_summary(rows: &[RestaurantRow], max_rows: usize) -> String {
    if rows.is_empty() {
        return NO_RESTAURANTS_SENTINEL.to_string();
    }

    let mut summary = String::new();
    for (index, row) in rows.iter().take(max_rows).enumerate() {
        if index > 0 {
            summary.push('\n');
        }
        // Writing to a String cannot fail.
        let _ = write!(summary, "{}. {}", index + 1, summarize_row(row));
    }
    summary
}

/// `name — rating — cost — cuisines — signature dishes — restaurant type`
pub fn summarize_row(row: &RestaurantRow) -> String {
    let cost = match row.approx_cost_for_two.as_deref().map(str::trim) {
        Some(cost) if !cost.is_empty() => format!("Rs.{cost} for two"),
        _ => NOT_AVAILABLE.to_string(),
    };
    let name = if row.name.trim().is_empty() {
        "Unnamed restaurant"
    } else {
        row.name.trim()
    };

    format!(
        "{name} — Rating: {rating} — Cost: {cost} — Cuisines: {cuisines} — Signature dishes: {dishes} — Type: {kind}",
        rating = or_na(row.rating.as_deref()),
        cuisines = or_na(row.cuisines.as_deref()),
        dishes = or_na(row.dishes_liked.as_deref()),
        kind = or_na(row.restaurant_type.as_deref()),
    )
}

fn or_na(value: Option<&str>) -> &str {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => value,
        _ => NOT_AVAILABLE,
    }
}
