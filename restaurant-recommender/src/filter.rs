use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::context::IntegrationContext;
use crate::dataset::{Dataset, RestaurantRow};
use crate::input::{Diet, UserInput};

/// Words that disqualify a row for vegetarian diners when they appear in its
/// cuisines or liked dishes.
pub const NON_VEG_KEYWORDS: &[&str] = &[
    "chicken", "mutton", "lamb", "beef", "pork", "bacon", "ham", "meat", "fish", "prawn",
    "shrimp", "crab", "lobster", "seafood", "egg", "kebab", "keema", "biryani", "bbq",
    "steak", "sausage", "salami", "tuna",
];

static NON_VEG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives = NON_VEG_KEYWORDS.join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternatives})(?:e?s)?\b"))
        .expect("non-veg keyword pattern is valid")
});

/// Select the rows matching city, diet and budget, in dataset order.
pub fn filter(dataset: &Dataset, user_input: &UserInput) -> IntegrationContext {
    let city_matches: Vec<&RestaurantRow> = dataset
        .rows()
        .iter()
        .filter(|row| matches_city(row, user_input.city()))
        .collect();

    let diet_matches: Vec<&RestaurantRow> = city_matches
        .iter()
        .copied()
        .filter(|row| matches_diet(row, user_input.diet()))
        .collect();

    let filtered_rows: Vec<RestaurantRow> = diet_matches
        .iter()
        .copied()
        .filter(|row| within_budget(row, user_input.price()))
        .cloned()
        .collect();

    debug!(
        city = %user_input.city(),
        dataset_rows = dataset.len(),
        city_matches = city_matches.len(),
        diet_matches = diet_matches.len(),
        budget_matches = filtered_rows.len(),
        "Filtered dataset"
    );

    IntegrationContext::new(filtered_rows, user_input.clone())
}

/// Case-insensitive membership of `city` in the row's city list. The whole
/// field also counts, so a city written with a comma can still match.
pub fn matches_city(row: &RestaurantRow, city: &str) -> bool {
    let target = city.trim().to_lowercase();
    let whole_field = row.city.as_deref().unwrap_or_default().trim();
    whole_field.to_lowercase() == target
        || row.cities().any(|candidate| candidate.to_lowercase() == target)
}

/// Vegetarians keep rows with no meat/fish keywords; non-vegetarians keep everything.
pub fn matches_diet(row: &RestaurantRow, diet: Diet) -> bool {
    match diet {
        Diet::NonVeg => true,
        Diet::Veg => [row.cuisines.as_deref(), row.dishes_liked.as_deref()]
            .into_iter()
            .flatten()
            .all(|text| !NON_VEG_PATTERN.is_match(text)),
    }
}

/// Rows without a parseable cost never fit a budget.
pub fn within_budget(row: &RestaurantRow, price: u64) -> bool {
    row.cost().is_some_and(|cost| cost <= price as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bangalore_dataset() -> Dataset {
        Dataset::from_rows(vec![
            RestaurantRow::new("Saffron Court")
                .with_cost("800")
                .with_cuisines("North Indian, Chinese")
                .with_dishes_liked("Butter Chicken, Naan")
                .with_city("Bangalore"),
            RestaurantRow::new("Green Palace")
                .with_cost("600")
                .with_cuisines("South Indian")
                .with_dishes_liked("Dosa, Idli")
                .with_city("Bangalore"),
            RestaurantRow::new("Kebab Corner")
                .with_cost("500")
                .with_cuisines("Mughlai")
                .with_dishes_liked("Seekh Kebabs")
                .with_city("bangalore"),
            RestaurantRow::new("Pasta Hub")
                .with_cost("400")
                .with_cuisines("Italian")
                .with_city(" Bangalore ; Mysore"),
            RestaurantRow::new("No Price")
                .with_cost("NEW")
                .with_cuisines("Cafe")
                .with_city("Bangalore"),
            RestaurantRow::new("Mumbai Cafe")
                .with_cost("300")
                .with_cuisines("Cafe")
                .with_city("Mumbai"),
        ])
    }

    fn names(context: &IntegrationContext) -> Vec<&str> {
        context
            .filtered_rows()
            .iter()
            .map(|row| row.name.as_str())
            .collect()
    }

    #[test]
    fn test_veg_filter_keeps_order_and_budget() {
        let input = UserInput::new("Bangalore", 700, "veg").unwrap();
        let context = filter(&bangalore_dataset(), &input);

        assert_eq!(names(&context), vec!["Green Palace", "Pasta Hub"]);
        assert_eq!(context.total_matches(), context.filtered_rows().len());
        for row in context.filtered_rows() {
            assert!(row.cost().unwrap() <= 700.0);
            assert!(matches_city(row, "Bangalore"));
        }
    }

    #[test]
    fn test_non_veg_does_not_exclude_by_keywords() {
        let input = UserInput::new("  BANGALORE ", 1000, "non-veg").unwrap();
        let context = filter(&bangalore_dataset(), &input);

        assert_eq!(
            names(&context),
            vec!["Saffron Court", "Green Palace", "Kebab Corner", "Pasta Hub"]
        );
    }

    #[test]
    fn test_multi_value_city_field() {
        let input = UserInput::new("mysore", 1000, "veg").unwrap();
        let context = filter(&bangalore_dataset(), &input);
        assert_eq!(names(&context), vec!["Pasta Hub"]);
    }

    #[test]
    fn test_city_containing_comma_matches_whole_field() {
        let dataset = Dataset::from_rows(vec![
            RestaurantRow::new("Udupi Grand")
                .with_cost("300")
                .with_cuisines("South Indian")
                .with_city("Bangalore, Karnataka"),
        ]);

        let input = UserInput::new(" bangalore, KARNATAKA ", 500, "veg").unwrap();
        let context = filter(&dataset, &input);
        assert_eq!(context.total_matches(), 1);
        assert_eq!(names(&context), vec!["Udupi Grand"]);

        let input = UserInput::new("Karnataka", 500, "veg").unwrap();
        assert_eq!(filter(&dataset, &input).total_matches(), 1);
    }

    #[test]
    fn test_budget_beyond_u32_range() {
        let row = RestaurantRow::new("Palace").with_cost("4,500,000,000");
        assert!(within_budget(&row, 5_000_000_000));
        assert!(!within_budget(&row, 4_000_000_000));
    }

    #[test]
    fn test_no_match_is_empty_context() {
        let input = UserInput::new("Delhi", 1000, "veg").unwrap();
        let context = filter(&bangalore_dataset(), &input);

        assert_eq!(context.total_matches(), 0);
        assert!(context.filtered_rows().is_empty());
        assert!(context.is_empty());
    }

    #[test]
    fn test_unparseable_cost_is_excluded() {
        let input = UserInput::new("Bangalore", 100_000, "non-veg").unwrap();
        let context = filter(&bangalore_dataset(), &input);
        assert!(!names(&context).contains(&"No Price"));
    }

    #[test]
    fn test_non_veg_keywords_match_whole_words() {
        let plural = RestaurantRow::new("A").with_dishes_liked("Grilled Prawns");
        assert!(!matches_diet(&plural, Diet::Veg));

        let eggplant = RestaurantRow::new("B").with_dishes_liked("Eggplant Parmesan");
        assert!(matches_diet(&eggplant, Diet::Veg));

        let empty = RestaurantRow::new("C");
        assert!(matches_diet(&empty, Diet::Veg));
    }
}
